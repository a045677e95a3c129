//! Big-endian read/write helpers for the class file format.

use anyhow::{bail, Result};
use std::io::{Read, Write};

pub trait ReadBytes: Read {
	fn read_n<const N: usize>(&mut self) -> Result<[u8; N]> {
		let mut buf = [0u8; N];
		self.read_exact(&mut buf)?;
		Ok(buf)
	}

	fn read_u8(&mut self) -> Result<u8> {
		Ok(u8::from_be_bytes(self.read_n()?))
	}

	fn read_u16(&mut self) -> Result<u16> {
		Ok(u16::from_be_bytes(self.read_n()?))
	}

	fn read_u32(&mut self) -> Result<u32> {
		Ok(u32::from_be_bytes(self.read_n()?))
	}

	fn read_i32(&mut self) -> Result<i32> {
		Ok(i32::from_be_bytes(self.read_n()?))
	}

	fn read_i64(&mut self) -> Result<i64> {
		Ok(i64::from_be_bytes(self.read_n()?))
	}

	fn read_u16_as_usize(&mut self) -> Result<usize> {
		Ok(self.read_u16()? as usize)
	}

	fn read_u32_as_usize(&mut self) -> Result<usize> {
		Ok(self.read_u32()? as usize)
	}

	fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
		let mut buf = vec![0u8; n];
		self.read_exact(&mut buf)?;
		Ok(buf)
	}

	fn read_vec<T, S, E>(&mut self, get_size: S, get_element: E) -> Result<Vec<T>>
	where
		S: FnOnce(&mut Self) -> Result<usize>,
		E: Fn(&mut Self) -> Result<T>,
	{
		let size = get_size(self)?;
		let mut vec = Vec::with_capacity(size.min(1024));
		for _ in 0..size {
			vec.push(get_element(self)?);
		}
		Ok(vec)
	}
}

impl<T: Read> ReadBytes for T {}

pub trait WriteBytes: Write {
	fn write_u8(&mut self, value: u8) -> Result<()> {
		self.write_all(&value.to_be_bytes())?;
		Ok(())
	}

	fn write_u16(&mut self, value: u16) -> Result<()> {
		self.write_all(&value.to_be_bytes())?;
		Ok(())
	}

	fn write_u32(&mut self, value: u32) -> Result<()> {
		self.write_all(&value.to_be_bytes())?;
		Ok(())
	}

	fn write_i32(&mut self, value: i32) -> Result<()> {
		self.write_all(&value.to_be_bytes())?;
		Ok(())
	}

	fn write_i64(&mut self, value: i64) -> Result<()> {
		self.write_all(&value.to_be_bytes())?;
		Ok(())
	}

	fn write_usize_as_u16(&mut self, value: usize) -> Result<()> {
		let Ok(value) = u16::try_from(value) else {
			bail!("value {value} doesn't fit into a u16 length field");
		};
		self.write_u16(value)
	}

	fn write_usize_as_u32(&mut self, value: usize) -> Result<()> {
		let Ok(value) = u32::try_from(value) else {
			bail!("value {value} doesn't fit into a u32 length field");
		};
		self.write_u32(value)
	}
}

impl<T: Write> WriteBytes for T {}
