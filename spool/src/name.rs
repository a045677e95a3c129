//! Newtypes for the strings a class file is made of.
//!
//! Keeping these apart stops a method descriptor from ending up where a
//! field name belongs. All of them are thin wrappers around [`String`]
//! and deref to [`str`], so they can be looked up in maps keyed by
//! either form.

use crate::macros::make_name_type;

make_name_type!(
	/// A class name in internal, `/`-separated form, e.g. `java/lang/String`.
	///
	/// In a few places class files use an array *descriptor* (like
	/// `[Ljava/lang/Object;`) where a class name is expected; such values
	/// are carried in this type too and callers that care must check for a
	/// leading `[`.
	ClassName
);

make_name_type!(
	/// A field name.
	FieldName
);

make_name_type!(
	/// A method name. `<init>` and `<clinit>` are valid method names.
	MethodName
);

make_name_type!(
	/// A field (type) descriptor, e.g. `I` or `Ljava/lang/String;` or `[[D`.
	FieldDescriptor
);

make_name_type!(
	/// A method descriptor, e.g. `(ILjava/lang/String;)V`.
	MethodDescriptor
);

impl ClassName {
	pub const JAVA_LANG_OBJECT: &'static str = "java/lang/Object";

	/// `true` if this is actually an array descriptor posing as a class name.
	pub fn is_array(&self) -> bool {
		self.as_str().starts_with('[')
	}

	/// The part after the last `/` and `$`, i.e. the simple name used by
	/// the `InnerClasses` attribute.
	pub fn simple_name(&self) -> &str {
		let s = self.as_str();
		let s = s.rsplit('/').next().unwrap_or(s);
		s.rsplit('$').next().unwrap_or(s)
	}
}

impl FieldDescriptor {
	/// Builds the descriptor `L<class>;` of a (non-array) class name.
	pub fn from_class(class: &ClassName) -> FieldDescriptor {
		if class.is_array() {
			// array "class names" already are descriptors
			FieldDescriptor::from(class.as_str())
		} else {
			FieldDescriptor::from(format!("L{};", class.as_str()))
		}
	}
}

impl MethodName {
	/// Constructors and class initializers never take part in renaming.
	pub fn is_special(&self) -> bool {
		self.as_str() == "<init>" || self.as_str() == "<clinit>"
	}
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use super::*;

	#[test]
	fn simple_names() {
		assert_eq!(ClassName::from("a/b/Outer$Inner").simple_name(), "Inner");
		assert_eq!(ClassName::from("a/b/Plain").simple_name(), "Plain");
		assert_eq!(ClassName::from("NoPackage").simple_name(), "NoPackage");
	}

	#[test]
	fn descriptor_from_class() {
		assert_eq!(FieldDescriptor::from_class(&ClassName::from("java/lang/Object")).as_str(), "Ljava/lang/Object;");
		assert_eq!(FieldDescriptor::from_class(&ClassName::from("[[I")).as_str(), "[[I");
	}

	#[test]
	fn special_method_names() {
		assert!(MethodName::from("<init>").is_special());
		assert!(MethodName::from("<clinit>").is_special());
		assert!(!MethodName::from("init").is_special());
	}
}
