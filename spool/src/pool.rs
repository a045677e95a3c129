//! The constant pool, kept close to its on-disk layout.
//!
//! Entries keep their index across edits: rewriting happens either in
//! place (same index, new contents) or by appending new entries at the
//! end. Code arrays referencing the pool therefore never need touching.

use anyhow::{anyhow, bail, Context, Result};
use std::io::{Read, Write};
use crate::io::{ReadBytes, WriteBytes};

pub mod tag {
	pub const UTF8: u8 = 1;
	pub const INTEGER: u8 = 3;
	pub const FLOAT: u8 = 4;
	pub const LONG: u8 = 5;
	pub const DOUBLE: u8 = 6;
	pub const CLASS: u8 = 7;
	pub const STRING: u8 = 8;
	pub const FIELD_REF: u8 = 9;
	pub const METHOD_REF: u8 = 10;
	pub const INTERFACE_METHOD_REF: u8 = 11;
	pub const NAME_AND_TYPE: u8 = 12;
	pub const METHOD_HANDLE: u8 = 15;
	pub const METHOD_TYPE: u8 = 16;
	pub const DYNAMIC: u8 = 17;
	pub const INVOKE_DYNAMIC: u8 = 18;
	pub const MODULE: u8 = 19;
	pub const PACKAGE: u8 = 20;
}

#[derive(Debug, Clone, PartialEq)]
pub enum PoolEntry {
	Utf8(String),
	Integer(i32),
	/// Stored as raw bits; `f32` has no `Eq`.
	Float { bits: u32 },
	Long(i64),
	/// Stored as raw bits; `f64` has no `Eq`.
	Double { bits: u64 },
	Class { name_index: u16 },
	String { string_index: u16 },
	FieldRef { class_index: u16, name_and_type_index: u16 },
	MethodRef { class_index: u16, name_and_type_index: u16 },
	InterfaceMethodRef { class_index: u16, name_and_type_index: u16 },
	NameAndType { name_index: u16, descriptor_index: u16 },
	MethodHandle { reference_kind: u8, reference_index: u16 },
	MethodType { descriptor_index: u16 },
	Dynamic { bootstrap_method_attr_index: u16, name_and_type_index: u16 },
	InvokeDynamic { bootstrap_method_attr_index: u16, name_and_type_index: u16 },
	Module { name_index: u16 },
	Package { name_index: u16 },
}

impl PoolEntry {
	/// Long and double entries occupy two pool slots.
	fn is_wide(&self) -> bool {
		matches!(self, PoolEntry::Long(_) | PoolEntry::Double { .. })
	}

	fn read(reader: &mut impl Read) -> Result<PoolEntry> {
		Ok(match reader.read_u8()? {
			tag::UTF8 => {
				let length = reader.read_u16_as_usize()?;
				let bytes = reader.read_bytes(length)?;
				let string = String::from_utf8(bytes)
					.context("only utf8 constant pool strings are supported")?;
				PoolEntry::Utf8(string)
			},
			tag::INTEGER => PoolEntry::Integer(reader.read_i32()?),
			tag::FLOAT => PoolEntry::Float { bits: reader.read_u32()? },
			tag::LONG => PoolEntry::Long(reader.read_i64()?),
			tag::DOUBLE => PoolEntry::Double { bits: u64::from_be_bytes(reader.read_n()?) },
			tag::CLASS => PoolEntry::Class { name_index: reader.read_u16()? },
			tag::STRING => PoolEntry::String { string_index: reader.read_u16()? },
			tag::FIELD_REF => PoolEntry::FieldRef {
				class_index: reader.read_u16()?,
				name_and_type_index: reader.read_u16()?,
			},
			tag::METHOD_REF => PoolEntry::MethodRef {
				class_index: reader.read_u16()?,
				name_and_type_index: reader.read_u16()?,
			},
			tag::INTERFACE_METHOD_REF => PoolEntry::InterfaceMethodRef {
				class_index: reader.read_u16()?,
				name_and_type_index: reader.read_u16()?,
			},
			tag::NAME_AND_TYPE => PoolEntry::NameAndType {
				name_index: reader.read_u16()?,
				descriptor_index: reader.read_u16()?,
			},
			tag::METHOD_HANDLE => PoolEntry::MethodHandle {
				reference_kind: reader.read_u8()?,
				reference_index: reader.read_u16()?,
			},
			tag::METHOD_TYPE => PoolEntry::MethodType { descriptor_index: reader.read_u16()? },
			tag::DYNAMIC => PoolEntry::Dynamic {
				bootstrap_method_attr_index: reader.read_u16()?,
				name_and_type_index: reader.read_u16()?,
			},
			tag::INVOKE_DYNAMIC => PoolEntry::InvokeDynamic {
				bootstrap_method_attr_index: reader.read_u16()?,
				name_and_type_index: reader.read_u16()?,
			},
			tag::MODULE => PoolEntry::Module { name_index: reader.read_u16()? },
			tag::PACKAGE => PoolEntry::Package { name_index: reader.read_u16()? },
			tag => bail!("unknown constant pool tag {tag}"),
		})
	}

	fn write(&self, writer: &mut impl Write) -> Result<()> {
		match self {
			PoolEntry::Utf8(string) => {
				writer.write_u8(tag::UTF8)?;
				writer.write_usize_as_u16(string.len())
					.context("failed to write length of string")?;
				writer.write_all(string.as_bytes())?;
			},
			PoolEntry::Integer(value) => {
				writer.write_u8(tag::INTEGER)?;
				writer.write_i32(*value)?;
			},
			PoolEntry::Float { bits } => {
				writer.write_u8(tag::FLOAT)?;
				writer.write_u32(*bits)?;
			},
			PoolEntry::Long(value) => {
				writer.write_u8(tag::LONG)?;
				writer.write_i64(*value)?;
			},
			PoolEntry::Double { bits } => {
				writer.write_u8(tag::DOUBLE)?;
				writer.write_all(&bits.to_be_bytes())?;
			},
			PoolEntry::Class { name_index } => {
				writer.write_u8(tag::CLASS)?;
				writer.write_u16(*name_index)?;
			},
			PoolEntry::String { string_index } => {
				writer.write_u8(tag::STRING)?;
				writer.write_u16(*string_index)?;
			},
			PoolEntry::FieldRef { class_index, name_and_type_index } => {
				writer.write_u8(tag::FIELD_REF)?;
				writer.write_u16(*class_index)?;
				writer.write_u16(*name_and_type_index)?;
			},
			PoolEntry::MethodRef { class_index, name_and_type_index } => {
				writer.write_u8(tag::METHOD_REF)?;
				writer.write_u16(*class_index)?;
				writer.write_u16(*name_and_type_index)?;
			},
			PoolEntry::InterfaceMethodRef { class_index, name_and_type_index } => {
				writer.write_u8(tag::INTERFACE_METHOD_REF)?;
				writer.write_u16(*class_index)?;
				writer.write_u16(*name_and_type_index)?;
			},
			PoolEntry::NameAndType { name_index, descriptor_index } => {
				writer.write_u8(tag::NAME_AND_TYPE)?;
				writer.write_u16(*name_index)?;
				writer.write_u16(*descriptor_index)?;
			},
			PoolEntry::MethodHandle { reference_kind, reference_index } => {
				writer.write_u8(tag::METHOD_HANDLE)?;
				writer.write_u8(*reference_kind)?;
				writer.write_u16(*reference_index)?;
			},
			PoolEntry::MethodType { descriptor_index } => {
				writer.write_u8(tag::METHOD_TYPE)?;
				writer.write_u16(*descriptor_index)?;
			},
			PoolEntry::Dynamic { bootstrap_method_attr_index, name_and_type_index } => {
				writer.write_u8(tag::DYNAMIC)?;
				writer.write_u16(*bootstrap_method_attr_index)?;
				writer.write_u16(*name_and_type_index)?;
			},
			PoolEntry::InvokeDynamic { bootstrap_method_attr_index, name_and_type_index } => {
				writer.write_u8(tag::INVOKE_DYNAMIC)?;
				writer.write_u16(*bootstrap_method_attr_index)?;
				writer.write_u16(*name_and_type_index)?;
			},
			PoolEntry::Module { name_index } => {
				writer.write_u8(tag::MODULE)?;
				writer.write_u16(*name_index)?;
			},
			PoolEntry::Package { name_index } => {
				writer.write_u8(tag::PACKAGE)?;
				writer.write_u16(*name_index)?;
			},
		}
		Ok(())
	}
}

/// A parsed constant pool.
///
/// Slot 0 is unused, and the slot after a long or double entry is
/// unused; both are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Pool {
	entries: Vec<Option<PoolEntry>>,
}

impl Default for Pool {
	fn default() -> Self {
		Pool::new()
	}
}

impl Pool {
	pub fn new() -> Pool {
		Pool { entries: vec![None] }
	}

	pub fn read(reader: &mut impl Read) -> Result<Pool> {
		let count = reader.read_u16_as_usize()?;
		let mut entries = Vec::with_capacity(count);

		entries.push(None); // indexing starts at 1

		while entries.len() < count {
			let entry = PoolEntry::read(reader)
				.with_context(|| anyhow!("failed to parse constant pool entry number {}", entries.len()))?;
			let wide = entry.is_wide();

			entries.push(Some(entry));
			if wide {
				entries.push(None);
			}
		}

		if entries.len() != count {
			bail!("constant pool of count {count} ends with the upper half of a long or double");
		}

		Ok(Pool { entries })
	}

	pub fn write(&self, writer: &mut impl Write) -> Result<()> {
		writer.write_usize_as_u16(self.entries.len())
			.context("constant pool count overflowed")?;

		let mut prev_wide = false;
		for (index, entry) in self.entries.iter().enumerate().skip(1) {
			match entry {
				Some(entry) => {
					entry.write(writer)?;
					prev_wide = entry.is_wide();
				},
				None => {
					if !prev_wide {
						bail!("empty constant pool slot {index} not preceded by a long or double");
					}
					prev_wide = false;
				},
			}
		}

		Ok(())
	}

	/// The value written as `constant_pool_count`, i.e. one more than the
	/// largest valid index.
	pub fn count(&self) -> usize {
		self.entries.len()
	}

	pub fn get(&self, index: u16) -> Result<&PoolEntry> {
		self.entries.get(index as usize)
			.and_then(|slot| slot.as_ref())
			.ok_or_else(|| anyhow!("no constant pool entry at index {index} (count {})", self.entries.len()))
	}

	pub fn get_mut(&mut self, index: u16) -> Result<&mut PoolEntry> {
		let count = self.entries.len();
		self.entries.get_mut(index as usize)
			.and_then(|slot| slot.as_mut())
			.ok_or_else(|| anyhow!("no constant pool entry at index {index} (count {count})"))
	}

	/// Iterates the occupied slots along with their indices.
	pub fn iter(&self) -> impl Iterator<Item = (u16, &PoolEntry)> {
		self.entries.iter()
			.enumerate()
			.filter_map(|(index, slot)| Some((index as u16, slot.as_ref()?)))
	}

	pub fn utf8(&self, index: u16) -> Result<&str> {
		match self.get(index)? {
			PoolEntry::Utf8(string) => Ok(string),
			other => bail!("expected a utf8 entry at index {index}, got {other:?}"),
		}
	}

	pub fn class_name(&self, index: u16) -> Result<&str> {
		match self.get(index)? {
			PoolEntry::Class { name_index } => self.utf8(*name_index),
			other => bail!("expected a class entry at index {index}, got {other:?}"),
		}
	}

	/// Like [`Pool::class_name`], with index 0 meaning "no class" (as in
	/// `super_class` of `java/lang/Object`).
	pub fn opt_class_name(&self, index: u16) -> Result<Option<&str>> {
		if index == 0 {
			Ok(None)
		} else {
			self.class_name(index).map(Some)
		}
	}

	pub fn name_and_type(&self, index: u16) -> Result<(&str, &str)> {
		match self.get(index)? {
			&PoolEntry::NameAndType { name_index, descriptor_index } => {
				Ok((self.utf8(name_index)?, self.utf8(descriptor_index)?))
			},
			other => bail!("expected a name-and-type entry at index {index}, got {other:?}"),
		}
	}

	fn push(&mut self, entry: PoolEntry) -> Result<u16> {
		let index = self.entries.len();
		let wide = entry.is_wide();

		// the resulting count must still fit the u16 count field
		if index + if wide { 2 } else { 1 } > u16::MAX as usize {
			bail!("constant pool overflowed while adding entry {entry:?}");
		}
		let index = index as u16;

		self.entries.push(Some(entry));
		if wide {
			self.entries.push(None);
		}

		Ok(index)
	}

	/// Appends an entry without deduplication, for building pools from
	/// scratch. Returns the new entry's index.
	pub fn add(&mut self, entry: PoolEntry) -> Result<u16> {
		self.push(entry)
	}

	/// Returns the index of a utf8 entry with the given contents, adding
	/// one at the end if none exists yet.
	pub fn put_utf8(&mut self, value: &str) -> Result<u16> {
		for (index, entry) in self.iter() {
			if matches!(entry, PoolEntry::Utf8(s) if s == value) {
				return Ok(index);
			}
		}
		self.push(PoolEntry::Utf8(value.to_owned()))
	}

	/// Returns the index of a class entry with the given name, adding
	/// entries at the end as needed.
	pub fn put_class(&mut self, name: &str) -> Result<u16> {
		let name_index = self.put_utf8(name)?;
		for (index, entry) in self.iter() {
			if matches!(entry, PoolEntry::Class { name_index: n } if *n == name_index) {
				return Ok(index);
			}
		}
		self.push(PoolEntry::Class { name_index })
	}

	/// Returns the index of a name-and-type entry, adding entries at the
	/// end as needed.
	pub fn put_name_and_type(&mut self, name: &str, descriptor: &str) -> Result<u16> {
		let name_index = self.put_utf8(name)?;
		let descriptor_index = self.put_utf8(descriptor)?;
		for (index, entry) in self.iter() {
			if matches!(entry,
				PoolEntry::NameAndType { name_index: n, descriptor_index: d }
					if *n == name_index && *d == descriptor_index)
			{
				return Ok(index);
			}
		}
		self.push(PoolEntry::NameAndType { name_index, descriptor_index })
	}
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use anyhow::Result;
	use super::*;

	#[test]
	fn put_deduplicates() -> Result<()> {
		let mut pool = Pool::new();

		let a = pool.put_utf8("hello")?;
		let b = pool.put_utf8("world")?;
		let c = pool.put_utf8("hello")?;
		assert_eq!(a, c);
		assert_ne!(a, b);

		let x = pool.put_name_and_type("hello", "world")?;
		let y = pool.put_name_and_type("hello", "world")?;
		assert_eq!(x, y);

		let k = pool.put_class("hello")?;
		let l = pool.put_class("hello")?;
		assert_eq!(k, l);

		Ok(())
	}

	#[test]
	fn round_trip() -> Result<()> {
		let mut pool = Pool::new();
		pool.put_utf8("a")?;
		pool.push(PoolEntry::Long(-5))?;
		pool.push(PoolEntry::Double { bits: 1.5f64.to_bits() })?;
		pool.put_class("a")?;
		pool.put_name_and_type("a", "a")?;
		pool.push(PoolEntry::MethodHandle { reference_kind: 6, reference_index: 4 })?;

		let mut bytes = Vec::new();
		pool.write(&mut bytes)?;

		let read_back = Pool::read(&mut bytes.as_slice())?;
		assert_eq!(pool, read_back);

		Ok(())
	}

	#[test]
	fn wide_entries_take_two_slots() -> Result<()> {
		let mut pool = Pool::new();
		let long = pool.push(PoolEntry::Long(7))?;
		let next = pool.put_utf8("after")?;
		assert_eq!(long, 1);
		assert_eq!(next, 3);
		assert!(pool.get(2).is_err());
		Ok(())
	}
}
