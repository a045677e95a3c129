use anyhow::{anyhow, Context, Result};
use crate::tree::mappings::{MappingInfo, Mappings};

impl Mappings {
	/// Replaces the namespace labels. The names inside the entities are
	/// untouched; the number of labels must stay the same.
	pub fn rename_namespaces(&self, to: &[&str]) -> Result<Mappings> {
		Ok(Mappings {
			info: MappingInfo {
				namespaces: self.info.namespaces.rename(to)
					.with_context(|| anyhow!("failed to rename namespaces to {to:?}"))?,
				format: self.info.format,
			},
			classes: self.classes.clone(),
		})
	}
}
