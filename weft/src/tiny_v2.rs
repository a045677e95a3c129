//! Reading and writing mappings in the "Tiny v2" format.
//!
//! A `.tiny` file starts with a `tiny	2	0` header naming the
//! namespaces, followed by `c` (class) lines with indented `f` (field),
//! `m` (method), `p` (parameter) and `v` (local variable) lines below
//! them; a `c` line below any of those is a comment.
//!
//! Reading determines the namespace count from the header; it's
//! recommended to check the namespaces are the expected ones afterwards,
//! see [`Namespaces::check_that`][crate::tree::names::Namespaces::check_that].
//! Writing keeps the input order of classes and members.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use anyhow::{anyhow, bail, Context, Result};
use crate::lines::Line;
use crate::tree::mappings::{ClassMapping, FieldMapping, LocalMapping, MappingFormat, MappingInfo, Mappings, MethodMapping, ParameterMapping};
use crate::tree::names::{Names, Namespaces};

/// Reads a `.tiny` file (tiny v2), by opening the file given by the path.
pub fn read_file(path: impl AsRef<Path>) -> Result<Mappings> {
	read(File::open(&path)?)
		.with_context(|| anyhow!("failed to read mappings file {:?} as tiny v2 file", path.as_ref()))
}

#[allow(clippy::tabs_in_doc_comments)]
/// Reads the tiny v2 format, from the given reader.
///
/// ```
/// # use pretty_assertions::assert_eq;
/// let string = "\
/// tiny	2	0	namespaceA	namespaceB	namespaceC
/// c	A	B	C
/// 	f	LA;	a	b	c
/// 	m	(LA;)V	a	b	c
/// ";
///
/// let mappings = weft::tiny_v2::read(string.as_bytes()).unwrap();
///
/// mappings.info.namespaces.check_that(&["namespaceA", "namespaceB", "namespaceC"]).unwrap();
/// assert_eq!(mappings.classes.len(), 1);
/// ```
pub fn read(reader: impl Read) -> Result<Mappings> {
	let mut lines = Vec::new();
	for (line_number, line) in BufReader::new(reader).lines().enumerate() {
		let line = line?;
		if line.is_empty() {
			continue;
		}
		lines.push(Line::parse(line_number + 1, &line)?);
	}

	let Some(header) = lines.first_mut() else {
		bail!("no header line");
	};
	if header.keyword != "tiny" || header.next()? != "2" || header.next()? != "0" {
		bail!("header version isn't tiny v2.0, in line {header:?}");
	}

	let namespaces: Namespaces = header.rest().try_into()
		.context("on the header line")?;
	let count = namespaces.len();

	let mut mappings = Mappings::new(MappingInfo {
		namespaces,
		format: MappingFormat::TinyV2,
	});

	let mut i = 1;
	while i < lines.len() {
		let line = &mut lines[i];
		if line.indent != 0 {
			bail!("expected an indentation of 0 for line {}: {line:?}", line.line_number);
		}

		if line.keyword == "c" {
			read_class(&mut lines, &mut i, count, &mut mappings)
				.context("reading class sub-sections")?;
		} else {
			skip_block(&lines, &mut i);
		}
	}

	Ok(mappings)
}

fn read_names<T: From<String> + AsRef<str>>(line: &mut Line, count: usize) -> Result<Names<T>> {
	Ok(line.list(count)?
		.into_iter()
		.map(T::from)
		.collect::<Vec<_>>()
		.into())
}

/// Skips the line at `i` and everything indented below it.
fn skip_block(lines: &[Line], i: &mut usize) {
	let line = &lines[*i];
	log::trace!("skipping unknown section {:?} in line {}", line.keyword, line.line_number);

	let indent = line.indent;
	*i += 1;
	while *i < lines.len() && lines[*i].indent > indent {
		*i += 1;
	}
}

fn read_class(lines: &mut [Line], i: &mut usize, count: usize, mappings: &mut Mappings) -> Result<()> {
	let names = read_names(&mut lines[*i], count)?;
	let class = mappings.add_class(ClassMapping::new(names))?;
	*i += 1;

	while *i < lines.len() && lines[*i].indent >= 1 {
		let line = &mut lines[*i];
		if line.indent > 1 {
			bail!("expected an indentation of 1 for line {}: {line:?}", line.line_number);
		}

		match line.keyword.as_str() {
			"f" => {
				let desc = line.next()?.into();
				let names = read_names(line, count)?;
				let field = class.add_field(FieldMapping::new(Some(desc), names))?;
				*i += 1;

				read_comments(lines, i, 2, &mut field.comments)?;
			},
			"m" => {
				let desc = line.next()?.into();
				let names = read_names(line, count)?;
				let method = class.add_method(MethodMapping::new(desc, names))?;
				*i += 1;

				while *i < lines.len() && lines[*i].indent >= 2 {
					let line = &mut lines[*i];
					if line.indent > 2 {
						bail!("expected an indentation of 2 for line {}: {line:?}", line.line_number);
					}

					match line.keyword.as_str() {
						"p" => {
							let index = line.next_usize()?;
							let names = read_names(line, count)?;
							let parameter = method.add_parameter(ParameterMapping {
								index,
								names,
								comments: Vec::new(),
							})?;
							*i += 1;

							read_comments(lines, i, 3, &mut parameter.comments)?;
						},
						"v" => {
							let index = line.next_usize()?;
							let start = line.next_usize()?;
							let table_index = line.next_opt_usize()?;
							let names = read_names(line, count)?;
							let mut variable = LocalMapping {
								index,
								start,
								table_index,
								names,
								comments: Vec::new(),
							};
							*i += 1;

							read_comments(lines, i, 3, &mut variable.comments)?;
							method.variables.push(variable);
						},
						"c" => {
							method.comments.push(line.end()?);
							*i += 1;
						},
						_ => skip_block(lines, i),
					}
				}
			},
			"c" => {
				class.comments.push(line.end()?);
				*i += 1;
			},
			_ => skip_block(lines, i),
		}
	}

	Ok(())
}

fn read_comments(lines: &mut [Line], i: &mut usize, indent: usize, comments: &mut Vec<String>) -> Result<()> {
	while *i < lines.len() && lines[*i].indent >= indent {
		let line = &mut lines[*i];
		if line.indent > indent {
			bail!("expected an indentation of {indent} for line {}: {line:?}", line.line_number);
		}

		if line.keyword == "c" {
			comments.push(line.end()?);
			*i += 1;
		} else {
			skip_block(lines, i);
		}
	}
	Ok(())
}

/// Writes the given mappings into a `String`, in the tiny v2 format.
///
/// This method is of most use in test cases, together with the
/// `pretty_assertions` crate for viewing string diffs.
pub fn write_string(mappings: &Mappings) -> Result<String> {
	let vec = write_vec(mappings)?;
	String::from_utf8(vec).context("failed to convert written mappings to utf8")
}

/// Writes the given mappings into a `Vec<u8>`, in the tiny v2 format.
pub fn write_vec(mappings: &Mappings) -> Result<Vec<u8>> {
	let mut vec = Vec::new();
	write(mappings, &mut vec)?;
	Ok(vec)
}

fn write_names<T: AsRef<str>>(w: &mut impl Write, names: &Names<T>) -> Result<()> {
	for name in names.names() {
		let name = name.as_ref().map(|name| name.as_ref());
		write!(w, "\t{}", name.unwrap_or(""))?;
	}
	writeln!(w)?;
	Ok(())
}

fn write_comments(w: &mut impl Write, indent: &str, comments: &[String]) -> Result<()> {
	for comment in comments {
		writeln!(w, "{indent}c\t{comment}")?;
	}
	Ok(())
}

/// Writes the given mappings to the given writer, in the tiny v2 format,
/// keeping the input order of classes and members.
pub fn write(mappings: &Mappings, w: &mut impl Write) -> Result<()> {
	// the buffering makes it much faster
	let mut w = BufWriter::new(w);
	let w = &mut w;

	write!(w, "tiny\t2\t0")?;
	for namespace in mappings.info.namespaces.names() {
		write!(w, "\t{namespace}")?;
	}
	writeln!(w)?;

	for class in mappings.classes.values() {
		write!(w, "c")?;
		write_names(w, &class.names)?;
		write_comments(w, "\t", &class.comments)?;

		for field in class.fields.values() {
			let desc = field.desc.as_ref()
				.with_context(|| anyhow!("field {field:?} has no descriptor, which the tiny v2 format requires"))?;
			write!(w, "\tf\t{desc}")?;
			write_names(w, &field.names)?;
			write_comments(w, "\t\t", &field.comments)?;
		}

		for method in class.methods.values() {
			write!(w, "\tm\t{}", method.desc)?;
			write_names(w, &method.names)?;
			write_comments(w, "\t\t", &method.comments)?;

			for parameter in method.parameters.values() {
				write!(w, "\t\tp\t{}", parameter.index)?;
				write_names(w, &parameter.names)?;
				write_comments(w, "\t\t\t", &parameter.comments)?;
			}

			for variable in &method.variables {
				let table_index = variable.table_index
					.map(|index| index as i64)
					.unwrap_or(-1);
				write!(w, "\t\tv\t{}\t{}\t{}", variable.index, variable.start, table_index)?;
				write_names(w, &variable.names)?;
				write_comments(w, "\t\t\t", &variable.comments)?;
			}
		}
	}

	w.flush()?;
	Ok(())
}
