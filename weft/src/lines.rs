use anyhow::{anyhow, bail, Context, Result};

/// One tab-separated line of a tiny file, with its indentation depth and
/// the leading keyword split off.
#[derive(Debug)]
pub(crate) struct Line {
	pub(crate) line_number: usize,
	pub(crate) indent: usize,
	pub(crate) keyword: String,
	fields: std::vec::IntoIter<String>,
}

impl Line {
	pub(crate) fn parse(line_number: usize, raw: &str) -> Result<Line> {
		let indent = raw.bytes().take_while(|&b| b == b'\t').count();
		let mut fields = raw[indent..].split('\t').map(str::to_owned);

		let keyword = fields.next()
			.with_context(|| anyhow!("no keyword in line {line_number}"))?;

		let fields: Vec<String> = fields.collect();

		Ok(Line {
			line_number,
			indent,
			keyword,
			fields: fields.into_iter(),
		})
	}

	pub(crate) fn next(&mut self) -> Result<String> {
		self.fields.next()
			.with_context(|| anyhow!("expected another field in line {}: {self:?}", self.line_number))
	}

	pub(crate) fn next_usize(&mut self) -> Result<usize> {
		let field = self.next()?;
		field.parse()
			.with_context(|| anyhow!("expected a number, got {field:?} in line {}", self.line_number))
	}

	/// A number field where `-1` stands for "absent".
	pub(crate) fn next_opt_usize(&mut self) -> Result<Option<usize>> {
		let field = self.next()?;
		let value: i64 = field.parse()
			.with_context(|| anyhow!("expected a number, got {field:?} in line {}", self.line_number))?;
		Ok(usize::try_from(value).ok())
	}

	/// Takes exactly one remaining field.
	pub(crate) fn end(&mut self) -> Result<String> {
		let next = self.next()?;
		if !self.fields.as_slice().is_empty() {
			bail!("line {} contained more fields than expected: {self:?}", self.line_number);
		}
		Ok(next)
	}

	/// Takes all remaining fields.
	pub(crate) fn rest(&mut self) -> Vec<String> {
		self.fields.by_ref().collect()
	}

	/// Takes exactly `count` remaining fields.
	pub(crate) fn list(&mut self, count: usize) -> Result<Vec<String>> {
		let fields: Vec<String> = self.fields.by_ref().collect();
		if fields.len() != count {
			bail!("line {} contained {} fields instead of the expected {count}: {fields:?}", self.line_number, fields.len());
		}
		Ok(fields)
	}
}
