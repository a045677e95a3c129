use anyhow::{bail, Result};
use indexmap::IndexMap;
use indexmap::map::Entry;
use spool::name::{ClassName, FieldDescriptor, FieldName, MethodDescriptor, MethodName};
use crate::tree::names::{Names, Namespace, Namespaces};

/// The textual format a mappings document came from. Carried for
/// serialization purposes only; no operation depends on it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MappingFormat {
	Srg,
	Tsrg,
	Tsrg2,
	TinyV1,
	TinyV2,
	Proguard,
}

impl MappingFormat {
	pub fn from_file_name(name: &str) -> Option<MappingFormat> {
		Some(match name.rsplit('.').next()? {
			"srg" => MappingFormat::Srg,
			"tsrg" => MappingFormat::Tsrg,
			"tiny" => MappingFormat::TinyV2,
			"txt" | "map" => MappingFormat::Proguard,
			_ => return None,
		})
	}
}

/// A multi-namespace symbol table for classes, fields and methods.
///
/// Immutable once constructed: each operation in [`crate::action`]
/// returns a fresh value and leaves its input untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Mappings {
	pub info: MappingInfo,
	pub classes: IndexMap<ClassName, ClassMapping>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MappingInfo {
	pub namespaces: Namespaces,
	pub format: MappingFormat,
}

impl Mappings {
	pub fn new(info: MappingInfo) -> Mappings {
		Mappings {
			info,
			classes: IndexMap::new(),
		}
	}

	pub fn get_namespace(&self, name: &str) -> Result<Namespace> {
		self.info.namespaces.get_namespace(name)
	}

	pub fn add_class(&mut self, child: ClassMapping) -> Result<&mut ClassMapping> {
		let key = child.names.first_name()?.clone();
		match self.classes.entry(key) {
			Entry::Occupied(e) => {
				bail!("cannot add class {child:?} for key {:?}, as there's already one: {:?}", e.key(), e.get());
			},
			Entry::Vacant(e) => Ok(e.insert(child)),
		}
	}

	/// The flat `from → to` view: classes keyed by their `from` name,
	/// fields by `owner.name`, methods by `owner.name<descriptor>` with
	/// the descriptor in namespace 0. Entities missing a name on either
	/// side are skipped.
	pub fn as_flat_map(&self, from: Namespace, to: Namespace, include_methods: bool, include_fields: bool) -> Result<IndexMap<String, String>> {
		let mut map = IndexMap::new();

		for class in self.classes.values() {
			let (Some(owner), Some(class_to)) = (&class.names[from], &class.names[to]) else {
				continue;
			};
			map.insert(owner.as_str().to_owned(), class_to.as_str().to_owned());

			if include_fields {
				for field in class.fields.values() {
					if let (Some(name), Some(name_to)) = (&field.names[from], &field.names[to]) {
						map.insert(format!("{owner}.{name}"), name_to.as_str().to_owned());
					}
				}
			}

			if include_methods {
				for method in class.methods.values() {
					if let (Some(name), Some(name_to)) = (&method.names[from], &method.names[to]) {
						map.insert(format!("{owner}.{name}{}", method.desc), name_to.as_str().to_owned());
					}
				}
			}
		}

		Ok(map)
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassMapping {
	pub names: Names<ClassName>,
	pub comments: Vec<String>,
	pub fields: IndexMap<FieldName, FieldMapping>,
	pub methods: IndexMap<MethodKey, MethodMapping>,
}

impl ClassMapping {
	pub fn new(names: Names<ClassName>) -> ClassMapping {
		ClassMapping {
			names,
			comments: Vec::new(),
			fields: IndexMap::new(),
			methods: IndexMap::new(),
		}
	}

	/// Within one class no two fields share a first-namespace name.
	pub fn add_field(&mut self, child: FieldMapping) -> Result<&mut FieldMapping> {
		let key = child.names.first_name()?.clone();
		match self.fields.entry(key) {
			Entry::Occupied(e) => {
				bail!("cannot add field {child:?} for key {:?}, as there's already one: {:?}", e.key(), e.get());
			},
			Entry::Vacant(e) => Ok(e.insert(child)),
		}
	}

	/// Within one class no two methods share a first-namespace name and
	/// descriptor.
	pub fn add_method(&mut self, child: MethodMapping) -> Result<&mut MethodMapping> {
		let key = MethodKey {
			name: child.names.first_name()?.clone(),
			desc: child.desc.clone(),
		};
		match self.methods.entry(key) {
			Entry::Occupied(e) => {
				bail!("cannot add method {child:?} for key {:?}, as there's already one: {:?}", e.key(), e.get());
			},
			Entry::Vacant(e) => Ok(e.insert(child)),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodKey {
	pub name: MethodName,
	pub desc: MethodDescriptor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldMapping {
	/// The type descriptor in the first namespace; some formats don't
	/// record field descriptors at all.
	pub desc: Option<FieldDescriptor>,
	pub names: Names<FieldName>,
	pub comments: Vec<String>,
}

impl FieldMapping {
	pub fn new(desc: Option<FieldDescriptor>, names: Names<FieldName>) -> FieldMapping {
		FieldMapping {
			desc,
			names,
			comments: Vec::new(),
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodMapping {
	/// The method descriptor in the first namespace.
	pub desc: MethodDescriptor,
	pub names: Names<MethodName>,
	pub comments: Vec<String>,
	pub parameters: IndexMap<usize, ParameterMapping>,
	pub variables: Vec<LocalMapping>,
}

impl MethodMapping {
	pub fn new(desc: MethodDescriptor, names: Names<MethodName>) -> MethodMapping {
		MethodMapping {
			desc,
			names,
			comments: Vec::new(),
			parameters: IndexMap::new(),
			variables: Vec::new(),
		}
	}

	pub fn add_parameter(&mut self, child: ParameterMapping) -> Result<&mut ParameterMapping> {
		match self.parameters.entry(child.index) {
			Entry::Occupied(e) => {
				bail!("cannot add parameter {child:?} for index {:?}, as there's already one: {:?}", e.key(), e.get());
			},
			Entry::Vacant(e) => Ok(e.insert(child)),
		}
	}
}

/// A method parameter, identified by its local variable index.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterMapping {
	pub index: usize,
	pub names: Names<String>,
	pub comments: Vec<String>,
}

/// A local variable, identified by local variable index, start offset
/// and (optionally) its position in the local variable table.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalMapping {
	pub index: usize,
	pub start: usize,
	pub table_index: Option<usize>,
	pub names: Names<String>,
	pub comments: Vec<String>,
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use anyhow::Result;
	use super::*;

	#[test]
	fn duplicate_classes_rejected() -> Result<()> {
		let info = MappingInfo {
			namespaces: ["a", "b"].try_into()?,
			format: MappingFormat::TinyV2,
		};
		let mut mappings = Mappings::new(info);

		let names: Names<ClassName> = vec![ClassName::from("x"), ClassName::from("y")].into();
		mappings.add_class(ClassMapping::new(names.clone()))?;
		assert!(mappings.add_class(ClassMapping::new(names)).is_err());

		Ok(())
	}

	#[test]
	fn flat_map_shape() -> Result<()> {
		let info = MappingInfo {
			namespaces: ["obf", "named"].try_into()?,
			format: MappingFormat::TinyV2,
		};
		let mut mappings = Mappings::new(info);

		let class = mappings.add_class(ClassMapping::new(
			vec![ClassName::from("a"), ClassName::from("Foo")].into()
		))?;
		class.add_field(FieldMapping::new(
			Some(FieldDescriptor::from("I")),
			vec![FieldName::from("f"), FieldName::from("count")].into(),
		))?;
		class.add_method(MethodMapping::new(
			MethodDescriptor::from("(La;)V"),
			vec![MethodName::from("m"), MethodName::from("setup")].into(),
		))?;

		let from = mappings.get_namespace("obf")?;
		let to = mappings.get_namespace("named")?;
		let flat = mappings.as_flat_map(from, to, true, true)?;

		assert_eq!(flat.get("a").map(String::as_str), Some("Foo"));
		assert_eq!(flat.get("a.f").map(String::as_str), Some("count"));
		assert_eq!(flat.get("a.m(La;)V").map(String::as_str), Some("setup"));

		Ok(())
	}
}
