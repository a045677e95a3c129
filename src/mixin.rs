//! String-encoded member references inside mixin annotations.
//!
//! Mixin annotations carry `owner.name(desc)` references as plain
//! strings, which a bytecode-level rewrite would miss. The rules here
//! reinterpret the string values of known keys. Values that don't parse
//! are logged and passed through untouched: user mixins routinely
//! contain garbage and must not abort a rewrite.

use anyhow::{bail, Result};
use log::warn;
use spool::class::{AttributeInfo, Annotation, ElementValue};
use spool::desc;
use spool::name::ClassName;
use spool::pool::Pool;
use weft::remapper::MemberRemapper;

/// Annotation descriptors starting with this prefix take part in mixin
/// rewriting.
pub(crate) const MIXIN_PREFIX: &str = "Lnet/weavemc/api/mixin";

/// Finds the target class of a mixin: the first class literal inside a
/// class-level annotation whose descriptor has the mixin prefix, e.g.
/// `@Mixin({Lsome/Target;})`.
pub(crate) fn find_target(pool: &Pool, attributes: &[AttributeInfo]) -> Result<Option<ClassName>> {
	for attribute in attributes {
		if let AttributeInfo::Annotations { annotations, .. } = attribute {
			for annotation in annotations {
				if pool.utf8(annotation.type_index)?.starts_with(MIXIN_PREFIX) {
					if let Some(target) = target_of(pool, annotation)? {
						return Ok(Some(target));
					}
				}
			}
		}
	}
	Ok(None)
}

fn target_of(pool: &Pool, annotation: &Annotation) -> Result<Option<ClassName>> {
	for pair in &annotation.element_value_pairs {
		if let Some(target) = class_literal(pool, &pair.value)? {
			return Ok(Some(target));
		}
	}
	Ok(None)
}

fn class_literal(pool: &Pool, value: &ElementValue) -> Result<Option<ClassName>> {
	Ok(match value {
		ElementValue::Class { class_info_index } => {
			let desc = pool.utf8(*class_info_index)?;
			desc.strip_prefix('L')
				.and_then(|desc| desc.strip_suffix(';'))
				.map(ClassName::from)
		},
		ElementValue::Array(values) => match values.first() {
			Some(value) => class_literal(pool, value)?,
			None => None,
		},
		_ => None,
	})
}

/// Rewrites one string value of a mixin annotation, keyed by its element
/// name. Unknown keys and unparseable values come back unchanged.
pub(crate) fn rewrite_value(remapper: &impl MemberRemapper, target: &ClassName, key: &str, value: &str) -> String {
	match try_rewrite_value(remapper, target, key, value) {
		Ok(Some(rewritten)) => rewritten,
		Ok(None) => value.to_owned(),
		Err(error) => {
			warn!("leaving mixin annotation value {value:?} for key {key:?} unchanged: {error:#}");
			value.to_owned()
		},
	}
}

fn try_rewrite_value(remapper: &impl MemberRemapper, target: &ClassName, key: &str, value: &str) -> Result<Option<String>> {
	Ok(match key {
		// a method of the mixin target: `name(params)ret`
		"method" => {
			let (name, method_desc) = desc::parse_method_decl(value)?;
			let new_name = remapper.map_method_name(target, &name, &method_desc)?;
			let new_desc = remapper.map_method_desc(&method_desc)?;
			Some(format!("{new_name}{new_desc}"))
		},
		// a field of the mixin target, as a bare name
		"field" => {
			if value.contains('(') {
				bail!("field reference {value:?} contains a '('");
			}
			Some(remapper.map_field_name(target, value)?.into_string())
		},
		// a member reference carrying its own owner; the descriptor-style
		// owner prefix (`Lowner;member`) stays, the dotted one is dropped
		"target" => {
			let descriptor_owner = value.starts_with('L') && value.contains(';');
			let (owner, name, method_desc) = desc::parse_target(value)?;

			match method_desc {
				Some(method_desc) => {
					let new_name = remapper.map_method_name(&owner, &name, &method_desc)?;
					let new_desc = remapper.map_method_desc(&method_desc)?;
					if descriptor_owner {
						let new_owner = remapper.map_class(&owner)?;
						Some(format!("L{new_owner};{new_name}{new_desc}"))
					} else {
						Some(format!("{new_name}{new_desc}"))
					}
				},
				None => {
					let new_name = remapper.map_field_name(&owner, &name)?;
					if descriptor_owner {
						let new_owner = remapper.map_class(&owner)?;
						Some(format!("L{new_owner};{new_name}"))
					} else {
						Some(new_name.into_string())
					}
				},
			}
		},
		_ => None,
	})
}
