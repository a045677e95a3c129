//! An index-level class file model.
//!
//! Members and attributes hold constant pool indices, not resolved
//! strings, and method code stays a raw byte array. Attributes the
//! rewriting passes must see inside are parsed structurally; everything
//! else round-trips as [`AttributeInfo::Other`].
//!
//! Reading then writing an untouched class reproduces it byte for byte,
//! except that attribute bodies are re-emitted with recomputed lengths.

use anyhow::{anyhow, bail, Context, Result};
use std::io::{Read, Write};
use crate::io::{ReadBytes, WriteBytes};
use crate::name::ClassName;
use crate::pool::Pool;

pub const MAGIC: u32 = 0xCAFE_BABE;

#[derive(Debug, Clone, PartialEq)]
pub struct ClassFile {
	pub minor_version: u16,
	pub major_version: u16,
	pub pool: Pool,
	pub access_flags: u16,
	pub this_class: u16,
	pub super_class: u16,
	pub interfaces: Vec<u16>,
	pub fields: Vec<MemberInfo>,
	pub methods: Vec<MemberInfo>,
	pub attributes: Vec<AttributeInfo>,
}

/// `field_info` and `method_info` share one layout.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberInfo {
	pub access_flags: u16,
	pub name_index: u16,
	pub descriptor_index: u16,
	pub attributes: Vec<AttributeInfo>,
}

impl ClassFile {
	pub fn read(reader: &mut impl Read) -> Result<ClassFile> {
		let magic = reader.read_u32()?;
		if magic != MAGIC {
			bail!("class file magic didn't match up: {magic:x}");
		}

		let minor_version = reader.read_u16()?;
		let major_version = reader.read_u16()?;

		let pool = Pool::read(reader)
			.context("failed to parse constant pool")?;

		let access_flags = reader.read_u16()?;
		let this_class = reader.read_u16()?;
		let super_class = reader.read_u16()?;

		let interfaces = reader.read_vec(
			|r| r.read_u16_as_usize(),
			|r| r.read_u16(),
		)?;

		let fields = reader.read_vec(
			|r| r.read_u16_as_usize(),
			|r| MemberInfo::read(r, &pool).context("failed to parse a field"),
		)?;

		let methods = reader.read_vec(
			|r| r.read_u16_as_usize(),
			|r| MemberInfo::read(r, &pool).context("failed to parse a method"),
		)?;

		let attributes = read_attributes(reader, &pool)
			.context("failed to parse class attributes")?;

		let mut end = [0u8];
		if reader.read(&mut end)? != 0 {
			bail!("expected end of class file");
		}

		Ok(ClassFile {
			minor_version,
			major_version,
			pool,
			access_flags,
			this_class,
			super_class,
			interfaces,
			fields,
			methods,
			attributes,
		})
	}

	pub fn parse(bytes: &[u8]) -> Result<ClassFile> {
		ClassFile::read(&mut std::io::Cursor::new(bytes))
	}

	pub fn write(&self, writer: &mut impl Write) -> Result<()> {
		writer.write_u32(MAGIC)?;
		writer.write_u16(self.minor_version)?;
		writer.write_u16(self.major_version)?;

		self.pool.write(writer)?;

		writer.write_u16(self.access_flags)?;
		writer.write_u16(self.this_class)?;
		writer.write_u16(self.super_class)?;

		writer.write_usize_as_u16(self.interfaces.len())?;
		for interface in &self.interfaces {
			writer.write_u16(*interface)?;
		}

		writer.write_usize_as_u16(self.fields.len())?;
		for field in &self.fields {
			field.write(writer)?;
		}

		writer.write_usize_as_u16(self.methods.len())?;
		for method in &self.methods {
			method.write(writer)?;
		}

		write_attributes(writer, &self.attributes)?;

		Ok(())
	}

	pub fn to_bytes(&self) -> Result<Vec<u8>> {
		let mut vec = Vec::new();
		self.write(&mut vec)?;
		Ok(vec)
	}
}

impl MemberInfo {
	fn read(reader: &mut impl Read, pool: &Pool) -> Result<MemberInfo> {
		Ok(MemberInfo {
			access_flags: reader.read_u16()?,
			name_index: reader.read_u16()?,
			descriptor_index: reader.read_u16()?,
			attributes: read_attributes(reader, pool)?,
		})
	}

	fn write(&self, writer: &mut impl Write) -> Result<()> {
		writer.write_u16(self.access_flags)?;
		writer.write_u16(self.name_index)?;
		writer.write_u16(self.descriptor_index)?;
		write_attributes(writer, &self.attributes)
	}
}

/// The supertype information of a class, from a parse that stops right
/// after the interfaces table.
#[derive(Debug, Clone, PartialEq)]
pub struct Hierarchy {
	pub name: ClassName,
	pub super_class: Option<ClassName>,
	pub interfaces: Vec<ClassName>,
}

/// Parses only as far as needed for inheritance walking.
pub fn read_hierarchy(bytes: &[u8]) -> Result<Hierarchy> {
	let reader = &mut std::io::Cursor::new(bytes);

	let magic = reader.read_u32()?;
	if magic != MAGIC {
		bail!("class file magic didn't match up: {magic:x}");
	}

	let _minor_version = reader.read_u16()?;
	let _major_version = reader.read_u16()?;

	let pool = Pool::read(reader)
		.context("failed to parse constant pool")?;

	let _access_flags = reader.read_u16()?;
	let this_class = reader.read_u16()?;
	let super_class = reader.read_u16()?;

	let interfaces = reader.read_vec(
		|r| r.read_u16_as_usize(),
		|r| {
			let index = r.read_u16()?;
			Ok(ClassName::from(pool.class_name(index)?))
		},
	)?;

	Ok(Hierarchy {
		name: ClassName::from(pool.class_name(this_class)?),
		super_class: pool.opt_class_name(super_class)?.map(ClassName::from),
		interfaces,
	})
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeInfo {
	Code {
		name_index: u16,
		max_stack: u16,
		max_locals: u16,
		/// Raw instruction bytes. Instructions address the pool by index,
		/// so pool edits never invalidate them.
		code: Vec<u8>,
		exception_table: Vec<ExceptionTableEntry>,
		attributes: Vec<AttributeInfo>,
	},
	Signature {
		name_index: u16,
		signature_index: u16,
	},
	InnerClasses {
		name_index: u16,
		classes: Vec<InnerClassEntry>,
	},
	EnclosingMethod {
		name_index: u16,
		class_index: u16,
		method_index: u16,
	},
	LocalVariableTable {
		name_index: u16,
		entries: Vec<LocalVariableEntry>,
	},
	/// Same layout as `LocalVariableTable`, except the descriptor slot
	/// holds a generic signature.
	LocalVariableTypeTable {
		name_index: u16,
		entries: Vec<LocalVariableEntry>,
	},
	/// `RuntimeVisibleAnnotations` and `RuntimeInvisibleAnnotations`;
	/// the name entry tells them apart.
	Annotations {
		name_index: u16,
		annotations: Vec<Annotation>,
	},
	ParameterAnnotations {
		name_index: u16,
		parameters: Vec<Vec<Annotation>>,
	},
	TypeAnnotations {
		name_index: u16,
		annotations: Vec<TypeAnnotation>,
	},
	AnnotationDefault {
		name_index: u16,
		value: ElementValue,
	},
	BootstrapMethods {
		name_index: u16,
		methods: Vec<BootstrapMethod>,
	},
	Record {
		name_index: u16,
		components: Vec<RecordComponent>,
	},
	/// Any attribute without structure we need to see inside. These only
	/// reference the pool via `Class` and plain utf8 entries that are
	/// rewritten in place, so their bytes stay valid across a rewrite.
	Other {
		name_index: u16,
		info: Vec<u8>,
	},
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExceptionTableEntry {
	pub start_pc: u16,
	pub end_pc: u16,
	pub handler_pc: u16,
	pub catch_type: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InnerClassEntry {
	pub inner_class_info_index: u16,
	pub outer_class_info_index: u16,
	pub inner_name_index: u16,
	pub inner_class_access_flags: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocalVariableEntry {
	pub start_pc: u16,
	pub length: u16,
	pub name_index: u16,
	pub descriptor_index: u16,
	pub index: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BootstrapMethod {
	pub method_ref: u16,
	pub arguments: Vec<u16>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordComponent {
	pub name_index: u16,
	pub descriptor_index: u16,
	pub attributes: Vec<AttributeInfo>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
	pub type_index: u16,
	pub element_value_pairs: Vec<ElementValuePair>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementValuePair {
	pub name_index: u16,
	pub value: ElementValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
	/// Tags `B C D F I J S Z s`; `s` points at a utf8 entry, the others
	/// at primitive entries.
	Const { tag: u8, value_index: u16 },
	Enum { type_name_index: u16, const_name_index: u16 },
	Class { class_info_index: u16 },
	Annotation(Annotation),
	Array(Vec<ElementValue>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeAnnotation {
	pub target_type: u8,
	/// The target info, raw; its length is determined by `target_type`
	/// and nothing in it needs rewriting.
	pub target_info: Vec<u8>,
	/// `path_length` pairs of `(type_path_kind, type_argument_index)`.
	pub type_path: Vec<(u8, u8)>,
	pub annotation: Annotation,
}

pub(crate) fn read_attributes(reader: &mut impl Read, pool: &Pool) -> Result<Vec<AttributeInfo>> {
	reader.read_vec(
		|r| r.read_u16_as_usize(),
		|r| AttributeInfo::read(r, pool),
	)
}

pub(crate) fn write_attributes(writer: &mut impl Write, attributes: &[AttributeInfo]) -> Result<()> {
	writer.write_usize_as_u16(attributes.len())?;
	for attribute in attributes {
		attribute.write(writer)?;
	}
	Ok(())
}

impl AttributeInfo {
	fn read(reader: &mut impl Read, pool: &Pool) -> Result<AttributeInfo> {
		let name_index = reader.read_u16()?;
		let length = reader.read_u32_as_usize()?;
		let info = reader.read_bytes(length)?;

		let name = pool.utf8(name_index)
			.with_context(|| anyhow!("attribute name index {name_index} doesn't resolve"))?;

		AttributeInfo::parse_body(name_index, name, info, pool)
			.with_context(|| anyhow!("failed to parse {name:?} attribute"))
	}

	fn parse_body(name_index: u16, name: &str, info: Vec<u8>, pool: &Pool) -> Result<AttributeInfo> {
		let r = &mut std::io::Cursor::new(info.as_slice());

		let attribute = match name {
			"Code" => AttributeInfo::Code {
				name_index,
				max_stack: r.read_u16()?,
				max_locals: r.read_u16()?,
				code: {
					let length = r.read_u32_as_usize()?;
					r.read_bytes(length)?
				},
				exception_table: r.read_vec(
					|r| r.read_u16_as_usize(),
					|r| Ok(ExceptionTableEntry {
						start_pc: r.read_u16()?,
						end_pc: r.read_u16()?,
						handler_pc: r.read_u16()?,
						catch_type: r.read_u16()?,
					}),
				)?,
				attributes: read_attributes(r, pool)?,
			},
			"Signature" => AttributeInfo::Signature {
				name_index,
				signature_index: r.read_u16()?,
			},
			"InnerClasses" => AttributeInfo::InnerClasses {
				name_index,
				classes: r.read_vec(
					|r| r.read_u16_as_usize(),
					|r| Ok(InnerClassEntry {
						inner_class_info_index: r.read_u16()?,
						outer_class_info_index: r.read_u16()?,
						inner_name_index: r.read_u16()?,
						inner_class_access_flags: r.read_u16()?,
					}),
				)?,
			},
			"EnclosingMethod" => AttributeInfo::EnclosingMethod {
				name_index,
				class_index: r.read_u16()?,
				method_index: r.read_u16()?,
			},
			"LocalVariableTable" => AttributeInfo::LocalVariableTable {
				name_index,
				entries: read_local_variables(r)?,
			},
			"LocalVariableTypeTable" => AttributeInfo::LocalVariableTypeTable {
				name_index,
				entries: read_local_variables(r)?,
			},
			"RuntimeVisibleAnnotations" | "RuntimeInvisibleAnnotations" => AttributeInfo::Annotations {
				name_index,
				annotations: r.read_vec(
					|r| r.read_u16_as_usize(),
					|r| Annotation::read(r),
				)?,
			},
			"RuntimeVisibleParameterAnnotations" | "RuntimeInvisibleParameterAnnotations" => AttributeInfo::ParameterAnnotations {
				name_index,
				parameters: r.read_vec(
					|r| Ok(r.read_u8()? as usize),
					|r| r.read_vec(
						|r| r.read_u16_as_usize(),
						|r| Annotation::read(r),
					),
				)?,
			},
			"RuntimeVisibleTypeAnnotations" | "RuntimeInvisibleTypeAnnotations" => AttributeInfo::TypeAnnotations {
				name_index,
				annotations: r.read_vec(
					|r| r.read_u16_as_usize(),
					|r| TypeAnnotation::read(r),
				)?,
			},
			"AnnotationDefault" => AttributeInfo::AnnotationDefault {
				name_index,
				value: ElementValue::read(r)?,
			},
			"BootstrapMethods" => AttributeInfo::BootstrapMethods {
				name_index,
				methods: r.read_vec(
					|r| r.read_u16_as_usize(),
					|r| Ok(BootstrapMethod {
						method_ref: r.read_u16()?,
						arguments: r.read_vec(
							|r| r.read_u16_as_usize(),
							|r| r.read_u16(),
						)?,
					}),
				)?,
			},
			"Record" => AttributeInfo::Record {
				name_index,
				components: r.read_vec(
					|r| r.read_u16_as_usize(),
					|r| Ok(RecordComponent {
						name_index: r.read_u16()?,
						descriptor_index: r.read_u16()?,
						attributes: read_attributes(r, pool)?,
					}),
				)?,
			},
			_ => {
				return Ok(AttributeInfo::Other { name_index, info });
			},
		};

		if (r.position() as usize) != info.len() {
			bail!("attribute of length {} has {} unparsed trailing bytes", info.len(), info.len() - r.position() as usize);
		}

		Ok(attribute)
	}

	pub fn name_index(&self) -> u16 {
		match self {
			AttributeInfo::Code { name_index, .. }
			| AttributeInfo::Signature { name_index, .. }
			| AttributeInfo::InnerClasses { name_index, .. }
			| AttributeInfo::EnclosingMethod { name_index, .. }
			| AttributeInfo::LocalVariableTable { name_index, .. }
			| AttributeInfo::LocalVariableTypeTable { name_index, .. }
			| AttributeInfo::Annotations { name_index, .. }
			| AttributeInfo::ParameterAnnotations { name_index, .. }
			| AttributeInfo::TypeAnnotations { name_index, .. }
			| AttributeInfo::AnnotationDefault { name_index, .. }
			| AttributeInfo::BootstrapMethods { name_index, .. }
			| AttributeInfo::Record { name_index, .. }
			| AttributeInfo::Other { name_index, .. } => *name_index,
		}
	}

	fn write(&self, writer: &mut impl Write) -> Result<()> {
		writer.write_u16(self.name_index())?;

		let mut body = Vec::new();
		self.write_body(&mut body)?;

		writer.write_usize_as_u32(body.len())
			.context("attribute body too long")?;
		writer.write_all(&body)?;
		Ok(())
	}

	fn write_body(&self, w: &mut Vec<u8>) -> Result<()> {
		match self {
			AttributeInfo::Code { max_stack, max_locals, code, exception_table, attributes, .. } => {
				w.write_u16(*max_stack)?;
				w.write_u16(*max_locals)?;
				w.write_usize_as_u32(code.len())?;
				w.write_all(code)?;
				w.write_usize_as_u16(exception_table.len())?;
				for entry in exception_table {
					w.write_u16(entry.start_pc)?;
					w.write_u16(entry.end_pc)?;
					w.write_u16(entry.handler_pc)?;
					w.write_u16(entry.catch_type)?;
				}
				write_attributes(w, attributes)?;
			},
			AttributeInfo::Signature { signature_index, .. } => {
				w.write_u16(*signature_index)?;
			},
			AttributeInfo::InnerClasses { classes, .. } => {
				w.write_usize_as_u16(classes.len())?;
				for entry in classes {
					w.write_u16(entry.inner_class_info_index)?;
					w.write_u16(entry.outer_class_info_index)?;
					w.write_u16(entry.inner_name_index)?;
					w.write_u16(entry.inner_class_access_flags)?;
				}
			},
			AttributeInfo::EnclosingMethod { class_index, method_index, .. } => {
				w.write_u16(*class_index)?;
				w.write_u16(*method_index)?;
			},
			AttributeInfo::LocalVariableTable { entries, .. }
			| AttributeInfo::LocalVariableTypeTable { entries, .. } => {
				w.write_usize_as_u16(entries.len())?;
				for entry in entries {
					w.write_u16(entry.start_pc)?;
					w.write_u16(entry.length)?;
					w.write_u16(entry.name_index)?;
					w.write_u16(entry.descriptor_index)?;
					w.write_u16(entry.index)?;
				}
			},
			AttributeInfo::Annotations { annotations, .. } => {
				w.write_usize_as_u16(annotations.len())?;
				for annotation in annotations {
					annotation.write(w)?;
				}
			},
			AttributeInfo::ParameterAnnotations { parameters, .. } => {
				let Ok(count) = u8::try_from(parameters.len()) else {
					bail!("too many parameters for a parameter annotations attribute: {}", parameters.len());
				};
				w.write_u8(count)?;
				for annotations in parameters {
					w.write_usize_as_u16(annotations.len())?;
					for annotation in annotations {
						annotation.write(w)?;
					}
				}
			},
			AttributeInfo::TypeAnnotations { annotations, .. } => {
				w.write_usize_as_u16(annotations.len())?;
				for annotation in annotations {
					annotation.write(w)?;
				}
			},
			AttributeInfo::AnnotationDefault { value, .. } => {
				value.write(w)?;
			},
			AttributeInfo::BootstrapMethods { methods, .. } => {
				w.write_usize_as_u16(methods.len())?;
				for method in methods {
					w.write_u16(method.method_ref)?;
					w.write_usize_as_u16(method.arguments.len())?;
					for argument in &method.arguments {
						w.write_u16(*argument)?;
					}
				}
			},
			AttributeInfo::Record { components, .. } => {
				w.write_usize_as_u16(components.len())?;
				for component in components {
					w.write_u16(component.name_index)?;
					w.write_u16(component.descriptor_index)?;
					write_attributes(w, &component.attributes)?;
				}
			},
			AttributeInfo::Other { info, .. } => {
				w.write_all(info)?;
			},
		}
		Ok(())
	}
}

fn read_local_variables(reader: &mut impl Read) -> Result<Vec<LocalVariableEntry>> {
	reader.read_vec(
		|r| r.read_u16_as_usize(),
		|r| Ok(LocalVariableEntry {
			start_pc: r.read_u16()?,
			length: r.read_u16()?,
			name_index: r.read_u16()?,
			descriptor_index: r.read_u16()?,
			index: r.read_u16()?,
		}),
	)
}

impl Annotation {
	fn read(reader: &mut impl Read) -> Result<Annotation> {
		Ok(Annotation {
			type_index: reader.read_u16()?,
			element_value_pairs: reader.read_vec(
				|r| r.read_u16_as_usize(),
				|r| Ok(ElementValuePair {
					name_index: r.read_u16()?,
					value: ElementValue::read(r)?,
				}),
			)?,
		})
	}

	fn write(&self, w: &mut Vec<u8>) -> Result<()> {
		w.write_u16(self.type_index)?;
		w.write_usize_as_u16(self.element_value_pairs.len())?;
		for pair in &self.element_value_pairs {
			w.write_u16(pair.name_index)?;
			pair.value.write(w)?;
		}
		Ok(())
	}
}

impl ElementValue {
	fn read(reader: &mut impl Read) -> Result<ElementValue> {
		let tag = reader.read_u8()?;
		Ok(match tag {
			b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' | b's' => ElementValue::Const {
				tag,
				value_index: reader.read_u16()?,
			},
			b'e' => ElementValue::Enum {
				type_name_index: reader.read_u16()?,
				const_name_index: reader.read_u16()?,
			},
			b'c' => ElementValue::Class {
				class_info_index: reader.read_u16()?,
			},
			b'@' => ElementValue::Annotation(Annotation::read(reader)?),
			b'[' => ElementValue::Array(reader.read_vec(
				|r| r.read_u16_as_usize(),
				|r| ElementValue::read(r),
			)?),
			tag => bail!("unknown element value tag {:?}", tag as char),
		})
	}

	fn write(&self, w: &mut Vec<u8>) -> Result<()> {
		match self {
			ElementValue::Const { tag, value_index } => {
				w.write_u8(*tag)?;
				w.write_u16(*value_index)?;
			},
			ElementValue::Enum { type_name_index, const_name_index } => {
				w.write_u8(b'e')?;
				w.write_u16(*type_name_index)?;
				w.write_u16(*const_name_index)?;
			},
			ElementValue::Class { class_info_index } => {
				w.write_u8(b'c')?;
				w.write_u16(*class_info_index)?;
			},
			ElementValue::Annotation(annotation) => {
				w.write_u8(b'@')?;
				annotation.write(w)?;
			},
			ElementValue::Array(values) => {
				w.write_u8(b'[')?;
				w.write_usize_as_u16(values.len())?;
				for value in values {
					value.write(w)?;
				}
			},
		}
		Ok(())
	}
}

impl TypeAnnotation {
	fn read(reader: &mut impl Read) -> Result<TypeAnnotation> {
		let target_type = reader.read_u8()?;

		// JVMS table 4.7.20-A/B/C: the target info layout per target type
		let target_info = match target_type {
			0x00 | 0x01 => reader.read_bytes(1)?,
			0x10 => reader.read_bytes(2)?,
			0x11 | 0x12 => reader.read_bytes(2)?,
			0x13..=0x15 => Vec::new(),
			0x16 => reader.read_bytes(1)?,
			0x17 => reader.read_bytes(2)?,
			0x40 | 0x41 => {
				let table_length = reader.read_u16_as_usize()?;
				let mut bytes = (table_length as u16).to_be_bytes().to_vec();
				bytes.extend(reader.read_bytes(table_length * 6)?);
				bytes
			},
			0x42 => reader.read_bytes(2)?,
			0x43..=0x46 => reader.read_bytes(2)?,
			0x47..=0x4B => reader.read_bytes(3)?,
			other => bail!("unknown type annotation target type {other:#x}"),
		};

		let type_path = reader.read_vec(
			|r| Ok(r.read_u8()? as usize),
			|r| Ok((r.read_u8()?, r.read_u8()?)),
		)?;

		Ok(TypeAnnotation {
			target_type,
			target_info,
			type_path,
			annotation: Annotation::read(reader)?,
		})
	}

	fn write(&self, w: &mut Vec<u8>) -> Result<()> {
		w.write_u8(self.target_type)?;
		w.write_all(&self.target_info)?;

		let Ok(path_length) = u8::try_from(self.type_path.len()) else {
			bail!("type path too long: {}", self.type_path.len());
		};
		w.write_u8(path_length)?;
		for (kind, argument_index) in &self.type_path {
			w.write_u8(*kind)?;
			w.write_u8(*argument_index)?;
		}

		self.annotation.write(w)
	}
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use anyhow::Result;
	use super::*;
	use crate::access;

	#[test]
	fn minimal_class_round_trip() -> Result<()> {
		let mut pool = Pool::new();
		let this_utf8 = pool.put_class("org/example/Main")?;
		let super_utf8 = pool.put_class("java/lang/Object")?;

		let class = ClassFile {
			minor_version: 0,
			major_version: 52,
			pool,
			access_flags: access::ACC_SUPER,
			this_class: this_utf8,
			super_class: super_utf8,
			interfaces: vec![],
			fields: vec![],
			methods: vec![],
			attributes: vec![],
		};

		let bytes = class.to_bytes()?;
		let read_back = ClassFile::parse(&bytes)?;
		assert_eq!(class, read_back);

		let bytes_again = read_back.to_bytes()?;
		assert_eq!(bytes, bytes_again);

		Ok(())
	}

	#[test]
	fn hierarchy_parse_stops_early() -> Result<()> {
		let mut pool = Pool::new();
		let this_class = pool.put_class("a/Child")?;
		let super_class = pool.put_class("a/Parent")?;
		let interface = pool.put_class("a/Iface")?;

		let class = ClassFile {
			minor_version: 0,
			major_version: 52,
			pool,
			access_flags: access::ACC_SUPER,
			this_class,
			super_class,
			interfaces: vec![interface],
			fields: vec![],
			methods: vec![],
			attributes: vec![],
		};

		let hierarchy = read_hierarchy(&class.to_bytes()?)?;
		assert_eq!(hierarchy, Hierarchy {
			name: ClassName::from("a/Child"),
			super_class: Some(ClassName::from("a/Parent")),
			interfaces: vec![ClassName::from("a/Iface")],
		});

		Ok(())
	}
}
