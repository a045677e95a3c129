//! Rewriting every class of a jar.

use std::io::{Read, Seek, Write};
use anyhow::{anyhow, Context, Result};
use log::debug;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};
use weft::remapper::MemberRemapper;
use crate::rewrite::{rewrite_class, RewriteOptions};

/// Rewrites every `.class` entry through the remapper, renaming the
/// entry to the mapped class name; everything else is copied verbatim.
/// Entry order is preserved.
pub fn rewrite_jar(
	reader: impl Read + Seek,
	writer: impl Write + Seek,
	remapper: &impl MemberRemapper,
	options: &RewriteOptions,
) -> Result<()> {
	let mut archive = ZipArchive::new(reader)?;
	let mut out = ZipWriter::new(writer);

	for index in 0..archive.len() {
		let mut file = archive.by_index(index)?;
		let name = file.name().to_owned();

		if file.is_dir() {
			out.add_directory(name, SimpleFileOptions::default())?;
			continue;
		}

		let mut bytes = Vec::new();
		file.read_to_end(&mut bytes)?;

		if let Some(internal) = name.strip_suffix(".class") {
			let rewritten = rewrite_class(&bytes, remapper, options)
				.with_context(|| anyhow!("failed to rewrite jar entry {name:?}"))?;

			let mapped = remapper.map_class(internal)?;
			if mapped != internal {
				debug!("renaming jar entry {name:?} to {mapped}.class");
			}

			out.start_file(format!("{mapped}.class"), SimpleFileOptions::default())?;
			out.write_all(&rewritten)?;
		} else {
			out.start_file(name, SimpleFileOptions::default())?;
			out.write_all(&bytes)?;
		}
	}

	out.finish()?;
	Ok(())
}
