//! Rewriting a single class through a remapper.
//!
//! Rewriting never re-encodes method code: instructions address the
//! constant pool by index, so renaming means patching pool entries and
//! the index slots of members and attributes. `Class` and `MethodType`
//! entries change uniformly and are rewritten in place; field and
//! method refs are instead repointed at fresh name-and-type entries,
//! since a shared `NameAndType` may map differently per owner. All
//! reads go against a snapshot of the original pool, so patch order
//! can't influence the result.

use anyhow::{anyhow, Context, Result};
use spool::access;
use spool::class::{AttributeInfo, Annotation, ClassFile, ElementValue, MemberInfo};
use spool::desc;
use spool::name::{ClassName, FieldName, MethodName};
use spool::pool::{Pool, PoolEntry};
use weft::remapper::MemberRemapper;
use crate::mixin;

const LAMBDA_METAFACTORY: &str = "java/lang/invoke/LambdaMetafactory";

#[derive(Debug, Clone, Default)]
pub struct RewriteOptions {
	/// Make the class and every member public and non-final before
	/// remapping.
	pub widen_access: bool,
	/// Rewrite string-encoded member references inside mixin
	/// annotations.
	pub remap_mixins: bool,
}

/// Rewrites every symbolic reference in the given class. The returned
/// bytes depend only on the input, the remapper and the (stable)
/// answers of its inheritance provider.
pub fn rewrite_class(bytes: &[u8], remapper: &impl MemberRemapper, options: &RewriteOptions) -> Result<Vec<u8>> {
	let mut class = ClassFile::parse(bytes)?;

	if options.widen_access {
		widen(&mut class);
	}

	remap(&mut class, remapper, options)
		.context("failed to remap class")?;

	class.to_bytes()
}

fn widen(class: &mut ClassFile) {
	class.access_flags = access::widen_class(class.access_flags);
	for field in &mut class.fields {
		field.access_flags = access::widen_field(field.access_flags);
	}
	for method in &mut class.methods {
		method.access_flags = access::widen_method(method.access_flags);
	}
}

fn remap(class: &mut ClassFile, remapper: &impl MemberRemapper, options: &RewriteOptions) -> Result<()> {
	let orig = class.pool.clone();
	let this_name = ClassName::from(orig.class_name(class.this_class)?);

	let bootstrap = resolve_bootstrap_methods(&orig, &class.attributes)?;

	// the mixin target has to be known before anything gets patched
	let mixin_target = if options.remap_mixins {
		mixin::find_target(&orig, &class.attributes)?
	} else {
		None
	};

	let rewriter = Rewriter {
		remapper,
		orig: &orig,
		this_name,
		bootstrap,
		mixin_target,
		remap_mixins: options.remap_mixins,
	};

	rewriter.patch_pool(&mut class.pool)?;

	for field in &mut class.fields {
		rewriter.patch_field(&mut class.pool, field)
			.context("failed to remap a field")?;
	}
	for method in &mut class.methods {
		rewriter.patch_method(&mut class.pool, method)
			.context("failed to remap a method")?;
	}

	rewriter.patch_attributes(&mut class.pool, &mut class.attributes, false)
		.context("failed to remap class attributes")?;

	Ok(())
}

#[derive(Debug, Clone)]
struct BootstrapInfo {
	/// The erased descriptor of the functional interface method, taken
	/// from the first bootstrap argument; `Some` only for the lambda
	/// metafactories.
	lambda_sam_desc: Option<String>,
}

fn resolve_bootstrap_methods(pool: &Pool, attributes: &[AttributeInfo]) -> Result<Vec<BootstrapInfo>> {
	for attribute in attributes {
		if let AttributeInfo::BootstrapMethods { methods, .. } = attribute {
			return methods.iter()
				.map(|method| {
					let lambda_sam_desc = if is_lambda_metafactory(pool, method.method_ref)? {
						method.arguments.first()
							.map(|&argument| sam_descriptor(pool, argument))
							.transpose()?
							.flatten()
					} else {
						None
					};
					Ok(BootstrapInfo { lambda_sam_desc })
				})
				.collect();
		}
	}
	Ok(Vec::new())
}

fn is_lambda_metafactory(pool: &Pool, method_handle: u16) -> Result<bool> {
	let &PoolEntry::MethodHandle { reference_index, .. } = pool.get(method_handle)? else {
		return Ok(false);
	};

	let (&PoolEntry::MethodRef { class_index, name_and_type_index }
	| &PoolEntry::InterfaceMethodRef { class_index, name_and_type_index }) = pool.get(reference_index)? else {
		return Ok(false);
	};

	let owner = pool.class_name(class_index)?;
	let (name, _) = pool.name_and_type(name_and_type_index)?;

	Ok(owner == LAMBDA_METAFACTORY && (name == "metafactory" || name == "altMetafactory"))
}

fn sam_descriptor(pool: &Pool, argument: u16) -> Result<Option<String>> {
	Ok(match pool.get(argument)? {
		&PoolEntry::MethodType { descriptor_index } => Some(pool.utf8(descriptor_index)?.to_owned()),
		_ => None,
	})
}

struct Rewriter<'a, R> {
	remapper: &'a R,
	/// Snapshot of the pool before any patching; all name lookups read
	/// from here.
	orig: &'a Pool,
	this_name: ClassName,
	bootstrap: Vec<BootstrapInfo>,
	mixin_target: Option<ClassName>,
	remap_mixins: bool,
}

impl<R: MemberRemapper> Rewriter<'_, R> {
	fn patch_pool(&self, pool: &mut Pool) -> Result<()> {
		for (index, entry) in self.orig.iter() {
			match *entry {
				PoolEntry::Class { .. } => {
					let name = self.orig.class_name(index)?;
					let mapped = self.remapper.map_class_any(name)?;
					if mapped != name {
						let name_index = pool.put_utf8(mapped.as_str())?;
						if let PoolEntry::Class { name_index: slot } = pool.get_mut(index)? {
							*slot = name_index;
						}
					}
				},
				PoolEntry::MethodType { descriptor_index } => {
					let method_desc = self.orig.utf8(descriptor_index)?;
					let mapped = self.remapper.map_method_desc(method_desc)?;
					if mapped != method_desc {
						let descriptor_index = pool.put_utf8(&mapped)?;
						if let PoolEntry::MethodType { descriptor_index: slot } = pool.get_mut(index)? {
							*slot = descriptor_index;
						}
					}
				},
				PoolEntry::FieldRef { class_index, name_and_type_index } => {
					let owner = self.orig.class_name(class_index)?;
					let (name, field_desc) = self.orig.name_and_type(name_and_type_index)?;

					// array owners have no fields of their own to rename
					let new_name = if owner.starts_with('[') {
						FieldName::from(name)
					} else {
						self.remapper.map_field_name(owner, name)?
					};
					let new_desc = self.remapper.map_desc(field_desc)?;

					if new_name != name || new_desc != field_desc {
						let name_and_type = pool.put_name_and_type(new_name.as_str(), &new_desc)?;
						if let PoolEntry::FieldRef { name_and_type_index: slot, .. } = pool.get_mut(index)? {
							*slot = name_and_type;
						}
					}
				},
				PoolEntry::MethodRef { class_index, name_and_type_index }
				| PoolEntry::InterfaceMethodRef { class_index, name_and_type_index } => {
					let owner = self.orig.class_name(class_index)?;
					let (name, method_desc) = self.orig.name_and_type(name_and_type_index)?;

					// `clone()` and friends on array types keep their name
					let new_name = if owner.starts_with('[') {
						MethodName::from(name)
					} else {
						self.remapper.map_method_name(owner, name, method_desc)?
					};
					let new_desc = self.remapper.map_method_desc(method_desc)?;

					if new_name != name || new_desc != method_desc {
						let name_and_type = pool.put_name_and_type(new_name.as_str(), &new_desc)?;
						match pool.get_mut(index)? {
							PoolEntry::MethodRef { name_and_type_index: slot, .. }
							| PoolEntry::InterfaceMethodRef { name_and_type_index: slot, .. } => {
								*slot = name_and_type;
							},
							_ => {},
						}
					}
				},
				PoolEntry::InvokeDynamic { bootstrap_method_attr_index, name_and_type_index } => {
					let (name, method_desc) = self.orig.name_and_type(name_and_type_index)?;

					let new_name = self.invoke_dynamic_name(bootstrap_method_attr_index, name, method_desc)?;
					let new_desc = self.remapper.map_method_desc(method_desc)?;

					if new_name != name || new_desc != method_desc {
						let name_and_type = pool.put_name_and_type(new_name.as_str(), &new_desc)?;
						if let PoolEntry::InvokeDynamic { name_and_type_index: slot, .. } = pool.get_mut(index)? {
							*slot = name_and_type;
						}
					}
				},
				PoolEntry::Dynamic { name_and_type_index, .. } => {
					let (name, field_desc) = self.orig.name_and_type(name_and_type_index)?;
					let new_desc = self.remapper.map_desc(field_desc)?;

					if new_desc != field_desc {
						let name_and_type = pool.put_name_and_type(name, &new_desc)?;
						if let PoolEntry::Dynamic { name_and_type_index: slot, .. } = pool.get_mut(index)? {
							*slot = name_and_type;
						}
					}
				},
				_ => {},
			}
		}

		Ok(())
	}

	/// The name of an `invokedynamic` call site produced by the lambda
	/// metafactories is the implemented method of the functional
	/// interface given by the return type of the call site descriptor;
	/// it is resolved against the erased descriptor carried in the first
	/// bootstrap argument. Any other bootstrap keeps its name.
	fn invoke_dynamic_name(&self, bootstrap_index: u16, name: &str, method_desc: &str) -> Result<MethodName> {
		let info = self.bootstrap.get(bootstrap_index as usize);

		if let Some(sam_desc) = info.and_then(|info| info.lambda_sam_desc.as_ref()) {
			if let Some(interface) = desc::return_type_internal(method_desc)? {
				return self.remapper.map_method_name(&interface, name, sam_desc);
			}
		}

		Ok(MethodName::from(name))
	}

	fn patch_field(&self, pool: &mut Pool, field: &mut MemberInfo) -> Result<()> {
		let name = self.orig.utf8(field.name_index)?;
		let field_desc = self.orig.utf8(field.descriptor_index)?;

		let new_name = self.remapper.map_field_name(&self.this_name, name)?;
		let new_desc = self.remapper.map_desc(field_desc)?;

		if new_name != name {
			field.name_index = pool.put_utf8(new_name.as_str())?;
		}
		if new_desc != field_desc {
			field.descriptor_index = pool.put_utf8(&new_desc)?;
		}

		self.patch_attributes(pool, &mut field.attributes, false)
	}

	fn patch_method(&self, pool: &mut Pool, method: &mut MemberInfo) -> Result<()> {
		let name = self.orig.utf8(method.name_index)?;
		let method_desc = self.orig.utf8(method.descriptor_index)?;

		let new_name = self.remapper.map_method_name(&self.this_name, name, method_desc)?;
		let new_desc = self.remapper.map_method_desc(method_desc)?;

		if new_name != name {
			method.name_index = pool.put_utf8(new_name.as_str())?;
		}
		if new_desc != method_desc {
			method.descriptor_index = pool.put_utf8(&new_desc)?;
		}

		self.patch_attributes(pool, &mut method.attributes, true)
	}

	fn patch_attributes(&self, pool: &mut Pool, attributes: &mut Vec<AttributeInfo>, in_method: bool) -> Result<()> {
		// an empty signature string means "no signature"; drop the
		// attribute instead of carrying the broken form along
		attributes.retain(|attribute| match attribute {
			AttributeInfo::Signature { signature_index, .. } => {
				!self.orig.utf8(*signature_index).map(str::is_empty).unwrap_or(false)
			},
			_ => true,
		});

		for attribute in attributes.iter_mut() {
			match attribute {
				AttributeInfo::Signature { signature_index, .. } => {
					let signature = self.orig.utf8(*signature_index)?;
					let mapped = self.remapper.map_signature(signature)
						.with_context(|| anyhow!("failed to remap signature {signature:?}"))?;
					if mapped != signature {
						*signature_index = pool.put_utf8(&mapped)?;
					}
				},
				AttributeInfo::Code { attributes, .. } => {
					// exception handler classes and stack map entries are
					// `Class` references, already rewritten in place
					self.patch_attributes(pool, attributes, in_method)?;
				},
				AttributeInfo::LocalVariableTable { entries, .. } => {
					for entry in entries {
						let field_desc = self.orig.utf8(entry.descriptor_index)?;
						let mapped = self.remapper.map_desc(field_desc)?;
						if mapped != field_desc {
							entry.descriptor_index = pool.put_utf8(&mapped)?;
						}
					}
				},
				AttributeInfo::LocalVariableTypeTable { entries, .. } => {
					for entry in entries {
						let signature = self.orig.utf8(entry.descriptor_index)?;
						let mapped = self.remapper.map_signature(signature)?;
						if mapped != signature {
							entry.descriptor_index = pool.put_utf8(&mapped)?;
						}
					}
				},
				AttributeInfo::Annotations { annotations, .. } => {
					for annotation in annotations {
						self.patch_annotation(pool, annotation, in_method)?;
					}
				},
				AttributeInfo::ParameterAnnotations { parameters, .. } => {
					for annotations in parameters {
						for annotation in annotations {
							self.patch_annotation(pool, annotation, in_method)?;
						}
					}
				},
				AttributeInfo::TypeAnnotations { annotations, .. } => {
					for annotation in annotations {
						self.patch_annotation(pool, &mut annotation.annotation, in_method)?;
					}
				},
				AttributeInfo::AnnotationDefault { value, .. } => {
					self.patch_element_value(pool, value, in_method, None)?;
				},
				AttributeInfo::EnclosingMethod { class_index, method_index, .. } => {
					// the class entry is rewritten in place; the method
					// name-and-type resolves against the enclosing class
					if *method_index != 0 {
						let owner = self.orig.class_name(*class_index)?;
						let (name, method_desc) = self.orig.name_and_type(*method_index)?;

						let new_name = self.remapper.map_method_name(owner, name, method_desc)?;
						let new_desc = self.remapper.map_method_desc(method_desc)?;

						if new_name != name || new_desc != method_desc {
							*method_index = pool.put_name_and_type(new_name.as_str(), &new_desc)?;
						}
					}
				},
				AttributeInfo::InnerClasses { classes, .. } => {
					// the simple name is derived from the mapped inner name,
					// so reflection doesn't see the old name
					for entry in classes {
						if entry.inner_name_index != 0 {
							let inner = self.orig.class_name(entry.inner_class_info_index)?;
							let mapped = self.remapper.map_class(inner)?;
							let simple = mapped.simple_name().to_owned();

							if simple != self.orig.utf8(entry.inner_name_index)? {
								entry.inner_name_index = pool.put_utf8(&simple)?;
							}
						}
					}
				},
				AttributeInfo::Record { components, .. } => {
					for component in components {
						let name = self.orig.utf8(component.name_index)?;
						let field_desc = self.orig.utf8(component.descriptor_index)?;

						let new_name = self.remapper.map_record_component_name(&self.this_name, name)?;
						let new_desc = self.remapper.map_desc(field_desc)?;

						if new_name != name {
							component.name_index = pool.put_utf8(new_name.as_str())?;
						}
						if new_desc != field_desc {
							component.descriptor_index = pool.put_utf8(&new_desc)?;
						}

						self.patch_attributes(pool, &mut component.attributes, false)?;
					}
				},
				// bootstrap arguments are method handles and method types,
				// both already rewritten at the pool level
				AttributeInfo::BootstrapMethods { .. } => {},
				AttributeInfo::Other { .. } => {},
			}
		}

		Ok(())
	}

	fn patch_annotation(&self, pool: &mut Pool, annotation: &mut Annotation, in_method: bool) -> Result<()> {
		let type_desc = self.orig.utf8(annotation.type_index)?;
		let is_mixin = self.remap_mixins && type_desc.starts_with(mixin::MIXIN_PREFIX);

		let mapped = self.remapper.map_desc(type_desc)?;
		if mapped != type_desc {
			annotation.type_index = pool.put_utf8(&mapped)?;
		}

		for pair in &mut annotation.element_value_pairs {
			let mixin_key = if is_mixin && in_method {
				Some(self.orig.utf8(pair.name_index)?)
			} else {
				None
			};
			self.patch_element_value(pool, &mut pair.value, in_method, mixin_key)?;
		}

		Ok(())
	}

	fn patch_element_value(&self, pool: &mut Pool, value: &mut ElementValue, in_method: bool, mixin_key: Option<&str>) -> Result<()> {
		match value {
			ElementValue::Const { tag: b's', value_index } => {
				if let (Some(key), Some(target)) = (mixin_key, &self.mixin_target) {
					let string = self.orig.utf8(*value_index)?;
					let rewritten = mixin::rewrite_value(self.remapper, target, key, string);
					if rewritten != string {
						*value_index = pool.put_utf8(&rewritten)?;
					}
				}
			},
			ElementValue::Const { .. } => {},
			ElementValue::Enum { type_name_index, .. } => {
				let type_desc = self.orig.utf8(*type_name_index)?;
				let mapped = self.remapper.map_desc(type_desc)?;
				if mapped != type_desc {
					*type_name_index = pool.put_utf8(&mapped)?;
				}
			},
			ElementValue::Class { class_info_index } => {
				// a return descriptor, so `V` can show up here
				let return_desc = self.orig.utf8(*class_info_index)?;
				let mapped = self.remapper.map_desc(return_desc)?;
				if mapped != return_desc {
					*class_info_index = pool.put_utf8(&mapped)?;
				}
			},
			ElementValue::Annotation(annotation) => {
				self.patch_annotation(pool, annotation, in_method)?;
			},
			ElementValue::Array(values) => {
				for value in values {
					self.patch_element_value(pool, value, in_method, mixin_key)?;
				}
			},
		}
		Ok(())
	}
}
