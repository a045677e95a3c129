//! Remappers for class names, descriptors, fields and methods.
//!
//! A remapper answers the question "what is the name of X in namespace
//! Y?". For remapping just classes, descriptors and signatures, use a
//! [`TypeRemapper`]; to also remap field and method names through class
//! hierarchies, use a [`MemberRemapper`]. Implementations for a given
//! `(from, to)` namespace pair come from [`Mappings::type_remapper`] and
//! [`Mappings::member_remapper`].

use anyhow::Result;
use indexmap::IndexMap;
use spool::desc;
use spool::name::{ClassName, FieldName, MethodDescriptor, MethodName};
use crate::inheritance::{find_in_hierarchy, SuperClassProvider};
use crate::tree::mappings::Mappings;
use crate::tree::names::Namespace;

/// Remaps class names, and through them descriptors and signatures.
pub trait TypeRemapper {
	fn map_class_opt(&self, class: &str) -> Result<Option<ClassName>>;

	/// An unmapped class keeps its name.
	fn map_class(&self, class: &str) -> Result<ClassName> {
		Ok(self.map_class_opt(class)?.unwrap_or_else(|| ClassName::from(class)))
	}

	/// Like [`TypeRemapper::map_class`], but also accepts array
	/// descriptors posing as class names, like `[La;` in an `anewarray`.
	fn map_class_any(&self, class: &str) -> Result<ClassName> {
		let mapped = desc::map_class_or_array(class, &mut |name| Ok(self.map_class(name)?.into_string()))?;
		Ok(ClassName::from(mapped))
	}

	/// Maps a type descriptor.
	fn map_desc(&self, desc: &str) -> Result<String> {
		desc::map_type_desc(desc, &mut |name| Ok(self.map_class(name)?.into_string()))
	}

	/// Maps a method descriptor.
	fn map_method_desc(&self, desc: &str) -> Result<String> {
		desc::map_method_desc(desc, &mut |name| Ok(self.map_class(name)?.into_string()))
	}

	/// Maps a generic signature string.
	fn map_signature(&self, signature: &str) -> Result<String> {
		desc::map_signature(signature, &mut |name| Ok(self.map_class(name)?.into_string()))
	}
}

#[derive(Debug)]
pub struct TypeRemapperImpl<'a> {
	classes: IndexMap<&'a str, &'a ClassName>,
}

impl TypeRemapper for TypeRemapperImpl<'_> {
	fn map_class_opt(&self, class: &str) -> Result<Option<ClassName>> {
		Ok(self.classes.get(class).map(|&class| class.clone()))
	}
}

impl Mappings {
	/// Builds a class-level remapper between two namespaces. Classes
	/// missing a name on either side don't take part.
	pub fn type_remapper(&self, from: Namespace, to: Namespace) -> Result<TypeRemapperImpl<'_>> {
		let mut classes = IndexMap::new();
		for class in self.classes.values() {
			if let (Some(from), Some(to)) = (&class.names[from], &class.names[to]) {
				classes.insert(from.as_str(), to);
			}
		}
		Ok(TypeRemapperImpl { classes })
	}
}

/// Remaps field and method names as well as classes and descriptors.
///
/// Member lookups resolve through the inheritance graph: a member mapped
/// on an ancestor renames the same member referenced via a subclass.
pub trait MemberRemapper: TypeRemapper {
	fn map_field_name_opt(&self, owner: &str, name: &str) -> Result<Option<FieldName>>;

	fn map_field_name(&self, owner: &str, name: &str) -> Result<FieldName> {
		Ok(self.map_field_name_opt(owner, name)?.unwrap_or_else(|| FieldName::from(name)))
	}

	fn map_method_name_opt(&self, owner: &str, name: &str, desc: &str) -> Result<Option<MethodName>>;

	/// Constructors and class initializers always keep their name.
	fn map_method_name(&self, owner: &str, name: &str, desc: &str) -> Result<MethodName> {
		if name == "<init>" || name == "<clinit>" {
			return Ok(MethodName::from(name));
		}
		Ok(self.map_method_name_opt(owner, name, desc)?.unwrap_or_else(|| MethodName::from(name)))
	}

	/// Record components rename like fields.
	fn map_record_component_name(&self, owner: &str, name: &str) -> Result<FieldName> {
		self.map_field_name(owner, name)
	}
}

#[derive(Debug)]
struct MemberRemapperClass<'a> {
	name: &'a ClassName,
	fields: IndexMap<&'a str, &'a FieldName>,
	methods: IndexMap<(&'a str, MethodDescriptor), &'a MethodName>,
}

#[derive(Debug)]
pub struct MemberRemapperImpl<'a, 'p, P> {
	mappings: &'a Mappings,
	from: Namespace,
	to: Namespace,
	classes: IndexMap<&'a str, MemberRemapperClass<'a>>,
	provider: &'p P,
}

impl<P> TypeRemapper for MemberRemapperImpl<'_, '_, P> {
	fn map_class_opt(&self, class: &str) -> Result<Option<ClassName>> {
		Ok(self.classes.get(class).map(|class| class.name.clone()))
	}
}

impl<P: SuperClassProvider> MemberRemapper for MemberRemapperImpl<'_, '_, P> {
	fn map_field_name_opt(&self, owner: &str, name: &str) -> Result<Option<FieldName>> {
		find_in_hierarchy(self.provider, owner, |class| {
			self.classes.get(class)
				.and_then(|class| class.fields.get(name))
				.map(|&field| field.clone())
		})
	}

	fn map_method_name_opt(&self, owner: &str, name: &str, desc: &str) -> Result<Option<MethodName>> {
		if name == "<init>" || name == "<clinit>" {
			return Ok(None);
		}

		let key = (name, MethodDescriptor::from(desc));
		find_in_hierarchy(self.provider, owner, |class| {
			self.classes.get(class)
				.and_then(|class| class.methods.get(&key))
				.map(|&method| method.clone())
		})
	}
}

impl<'a, 'p, P: SuperClassProvider> MemberRemapperImpl<'a, 'p, P> {
	/// The same mappings and provider with `from` and `to` swapped.
	pub fn reverse(&self) -> Result<MemberRemapperImpl<'a, 'p, P>> {
		self.mappings.member_remapper(self.to, self.from, self.provider)
	}
}

impl Mappings {
	/// Builds a member-level remapper between two namespaces.
	///
	/// Member tables are keyed by their `from` names with descriptors
	/// pre-composed into the `from` namespace by a sibling class-level
	/// remapper (`namespace 0 → from`), so stored namespace-0 descriptors
	/// match the descriptors a caller passes in.
	pub fn member_remapper<'a, 'p, P>(&'a self, from: Namespace, to: Namespace, provider: &'p P) -> Result<MemberRemapperImpl<'a, 'p, P>>
	where
		P: SuperClassProvider,
	{
		let desc_remapper = self.type_remapper(Namespace::FIRST, from)?;

		let mut classes = IndexMap::new();
		for class in self.classes.values() {
			if let (Some(name_from), Some(name_to)) = (&class.names[from], &class.names[to]) {
				let mut fields = IndexMap::new();
				for field in class.fields.values() {
					if let (Some(field_from), Some(field_to)) = (&field.names[from], &field.names[to]) {
						fields.insert(field_from.as_str(), field_to);
					}
				}

				let mut methods = IndexMap::new();
				for method in class.methods.values() {
					if let (Some(method_from), Some(method_to)) = (&method.names[from], &method.names[to]) {
						let desc_from = desc_remapper.map_method_desc(&method.desc)?;
						methods.insert((method_from.as_str(), MethodDescriptor::from(desc_from)), method_to);
					}
				}

				classes.insert(name_from.as_str(), MemberRemapperClass {
					name: name_to,
					fields,
					methods,
				});
			}
		}

		Ok(MemberRemapperImpl {
			mappings: self,
			from,
			to,
			classes,
			provider,
		})
	}
}
