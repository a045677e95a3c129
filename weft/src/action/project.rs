//! Column projections: reordering, extraction and filtering of
//! namespaces are all the same operation with differently built tables.

use anyhow::{anyhow, bail, Context, Result};
use spool::name::{FieldDescriptor, MethodDescriptor};
use crate::remapper::TypeRemapper;
use crate::tree::mappings::{ClassMapping, FieldMapping, LocalMapping, MappingInfo, Mappings, MethodMapping, ParameterMapping};
use crate::tree::names::Namespace;

impl Mappings {
	/// Builds new mappings whose column `i` is the old column `table[i]`.
	///
	/// Descriptors are re-expressed in terms of the new first namespace;
	/// every entity must have a name in `table[0]`, since those names
	/// become the keys.
	pub(crate) fn project(&self, table: &[Namespace]) -> Result<Mappings> {
		let Some(&first) = table.first() else {
			bail!("cannot project mappings onto zero namespaces");
		};

		let remapper = self.type_remapper(Namespace::FIRST, first)?;

		let mut out = Mappings::new(MappingInfo {
			namespaces: self.info.namespaces.project(table),
			format: self.info.format,
		});

		for class in self.classes.values() {
			let mut new_class = ClassMapping::new(class.names.project(table));
			new_class.comments = class.comments.clone();

			for field in class.fields.values() {
				let desc = field.desc.as_ref()
					.map(|desc| Ok::<_, anyhow::Error>(FieldDescriptor::from(remapper.map_desc(desc)?)))
					.transpose()
					.with_context(|| anyhow!("in class {:?}", class.names))?;

				let mut new_field = FieldMapping::new(desc, field.names.project(table));
				new_field.comments = field.comments.clone();

				new_class.add_field(new_field)
					.with_context(|| anyhow!("in class {:?}", class.names))?;
			}

			for method in class.methods.values() {
				let desc = MethodDescriptor::from(remapper.map_method_desc(&method.desc)
					.with_context(|| anyhow!("in class {:?}", class.names))?);

				let mut new_method = MethodMapping::new(desc, method.names.project(table));
				new_method.comments = method.comments.clone();

				for parameter in method.parameters.values() {
					new_method.add_parameter(ParameterMapping {
						index: parameter.index,
						names: parameter.names.project(table),
						comments: parameter.comments.clone(),
					})
						.with_context(|| anyhow!("in method {:?}", method.names))?;
				}

				new_method.variables = method.variables.iter()
					.map(|variable| LocalMapping {
						index: variable.index,
						start: variable.start,
						table_index: variable.table_index,
						names: variable.names.project(table),
						comments: variable.comments.clone(),
					})
					.collect();

				new_class.add_method(new_method)
					.with_context(|| anyhow!("in class {:?}", class.names))?;
			}

			out.add_class(new_class)?;
		}

		Ok(out)
	}

	#[allow(clippy::tabs_in_doc_comments)]
	/// Reorders the namespaces to the given order.
	///
	/// Duplicate labels are permitted and duplicate the column.
	///
	/// # Example
	/// ```
	/// # use pretty_assertions::assert_eq;
	/// let input = "\
	/// tiny	2	0	namespaceC	namespaceB	namespaceA
	/// c	C	B	A
	/// 	f	LC;	c	b	a
	/// 	m	(LC;)V	c	b	a
	/// ";
	/// let output = "\
	/// tiny	2	0	namespaceA	namespaceB	namespaceC
	/// c	A	B	C
	/// 	f	LA;	a	b	c
	/// 	m	(LA;)V	a	b	c
	/// ";
	/// let reordered = weft::tiny_v2::read(input.as_bytes()).unwrap()
	/// 	.reorder(&["namespaceA", "namespaceB", "namespaceC"]).unwrap();
	/// assert_eq!(weft::tiny_v2::write_string(&reordered).unwrap(), output);
	/// ```
	pub fn reorder(&self, namespaces: &[&str]) -> Result<Mappings> {
		if namespaces.len() != self.info.namespaces.len() {
			bail!("cannot reorder {} namespaces {:?} to the {} namespaces {namespaces:?}",
				self.info.namespaces.len(), self.info.namespaces, namespaces.len());
		}

		let table: Vec<Namespace> = namespaces.iter()
			.map(|name| self.get_namespace(name))
			.collect::<Result<_>>()?;

		self.project(&table)
			.with_context(|| anyhow!("failed to reorder namespaces to {namespaces:?}"))
	}

	/// The two-column projection onto `from` and `to`, with descriptors
	/// re-expressed in terms of `from`.
	pub fn extract(&self, from: &str, to: &str) -> Result<Mappings> {
		let table = [self.get_namespace(from)?, self.get_namespace(to)?];

		self.project(&table)
			.with_context(|| anyhow!("failed to extract namespaces {from:?} and {to:?}"))
	}

	/// Keeps the columns whose label appears in `keep`, in their original
	/// relative order. A label that occurs more than once is kept once,
	/// unless `allow_duplicates`.
	pub fn filter_namespaces(&self, keep: &[&str], allow_duplicates: bool) -> Result<Mappings> {
		let mut table = Vec::new();
		let mut seen = Vec::new();

		for (id, label) in self.info.namespaces.names().iter().enumerate() {
			if keep.contains(&label.as_str()) {
				if !allow_duplicates && seen.contains(&label) {
					continue;
				}
				seen.push(label);
				table.push(Namespace(id));
			}
		}

		if table.is_empty() {
			bail!("filtering namespaces {:?} by {keep:?} leaves no namespace", self.info.namespaces);
		}

		self.project(&table)
			.with_context(|| anyhow!("failed to filter namespaces by {keep:?}"))
	}

	/// Collapses duplicate namespace labels, keeping the earliest column
	/// of each label.
	pub fn deduplicate_namespaces(&self) -> Result<Mappings> {
		let labels: Vec<&str> = self.info.namespaces.names().iter()
			.map(String::as_str)
			.collect();
		self.filter_namespaces(&labels, false)
	}
}

#[cfg(test)]
mod testing {
	// covered by tests/reorder.rs and tests/filter.rs
}
