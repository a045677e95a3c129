//! Class path access for inheritance walking.
//!
//! These are the stock implementations of
//! [`weft::inheritance::ClassBytesLoader`]: a jar, a chain of loaders
//! forming a class path, and the empty loader for mappings-only work.
//! No file paths leak through the interface; a [`JarLoader`] is built
//! from a path or any `Read + Seek`.

use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use std::sync::Mutex;
use anyhow::{anyhow, Context, Result};
use zip::result::ZipError;
use zip::ZipArchive;
use weft::inheritance::ClassBytesLoader;

/// Serves class bytes out of a jar (or any zip). The archive sits
/// behind a lock, so one loader can back parallel per-class rewrites.
pub struct JarLoader<R> {
	archive: Mutex<ZipArchive<R>>,
}

impl JarLoader<File> {
	pub fn open(path: impl AsRef<Path>) -> Result<JarLoader<File>> {
		let file = File::open(&path)
			.with_context(|| anyhow!("failed to open jar {:?}", path.as_ref()))?;
		JarLoader::new(file)
	}
}

impl<R: Read + Seek> JarLoader<R> {
	pub fn new(reader: R) -> Result<JarLoader<R>> {
		Ok(JarLoader {
			archive: Mutex::new(ZipArchive::new(reader)?),
		})
	}
}

impl<R: Read + Seek> ClassBytesLoader for JarLoader<R> {
	fn load_class_bytes(&self, name: &str) -> Result<Option<Vec<u8>>> {
		let mut archive = self.archive.lock()
			.map_err(|_| anyhow!("jar loader lock poisoned"))?;

		let mut file = match archive.by_name(&format!("{name}.class")) {
			Ok(file) => file,
			Err(ZipError::FileNotFound) => return Ok(None),
			Err(error) => return Err(error.into()),
		};

		let mut bytes = Vec::new();
		file.read_to_end(&mut bytes)?;
		Ok(Some(bytes))
	}
}

/// A class path: the first loader that knows a class answers.
#[derive(Default)]
pub struct MultiLoader {
	loaders: Vec<Box<dyn ClassBytesLoader + Send + Sync>>,
}

impl MultiLoader {
	pub fn new() -> MultiLoader {
		MultiLoader::default()
	}

	pub fn push(&mut self, loader: impl ClassBytesLoader + Send + Sync + 'static) {
		self.loaders.push(Box::new(loader));
	}
}

impl ClassBytesLoader for MultiLoader {
	fn load_class_bytes(&self, name: &str) -> Result<Option<Vec<u8>>> {
		for loader in &self.loaders {
			if let Some(bytes) = loader.load_class_bytes(name)? {
				return Ok(Some(bytes));
			}
		}
		Ok(None)
	}
}

/// Knows no classes at all; every class is a hierarchy leaf.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLoader;

impl ClassBytesLoader for NoLoader {
	fn load_class_bytes(&self, _name: &str) -> Result<Option<Vec<u8>>> {
		Ok(None)
	}
}
