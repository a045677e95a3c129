use anyhow::Result;
use crate::tree::mappings::{ClassMapping, Mappings};

impl Mappings {
	/// Keeps the classes the predicate accepts; namespaces are unchanged.
	pub fn retain_classes(&self, mut predicate: impl FnMut(&ClassMapping) -> bool) -> Mappings {
		Mappings {
			info: self.info.clone(),
			classes: self.classes.iter()
				.filter(|(_, class)| predicate(class))
				.map(|(key, class)| (key.clone(), class.clone()))
				.collect(),
		}
	}

	/// Applies `f` to every class; the results are re-keyed, since `f`
	/// may change first-namespace names.
	pub fn map_classes(&self, mut f: impl FnMut(ClassMapping) -> ClassMapping) -> Result<Mappings> {
		let mut out = Mappings::new(self.info.clone());
		for class in self.classes.values() {
			out.add_class(f(class.clone()))?;
		}
		Ok(out)
	}
}
