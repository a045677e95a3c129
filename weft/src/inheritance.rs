//! Class hierarchy access for member resolution.
//!
//! Member lookups need to know the supertypes of a class: a method
//! mapped on a parent applies to the child as well. The hierarchy comes
//! from a [`SuperClassProvider`], which is either a prebuilt table
//! ([`SuperClassMap`]) or backed by a [`ClassBytesLoader`] that reads
//! class headers on demand ([`LoaderInheritance`]).

use std::sync::RwLock;
use anyhow::{anyhow, Result};
use indexmap::{IndexMap, IndexSet};
use spool::class::read_hierarchy;
use spool::name::ClassName;
use crate::remapper::TypeRemapper;

/// Supplies raw class bytes by internal name.
///
/// `Ok(None)` means "this class is unknown"; the hierarchy walk treats
/// such a class as a leaf. I/O problems surface as errors.
pub trait ClassBytesLoader {
	fn load_class_bytes(&self, name: &str) -> Result<Option<Vec<u8>>>;
}

impl<F> ClassBytesLoader for F
where
	F: Fn(&str) -> Result<Option<Vec<u8>>>,
{
	fn load_class_bytes(&self, name: &str) -> Result<Option<Vec<u8>>> {
		self(name)
	}
}

/// Answers "what are the direct supertypes of this class?".
///
/// The returned list has the superclass first and then the interfaces in
/// declaration order; `None` means the class is unknown.
pub trait SuperClassProvider {
	fn super_classes(&self, class: &str) -> Result<Option<Vec<ClassName>>>;
}

/// A prebuilt supertype table.
#[derive(Debug, Clone, Default)]
pub struct SuperClassMap {
	pub super_classes: IndexMap<ClassName, Vec<ClassName>>,
}

impl SuperClassMap {
	pub fn new() -> SuperClassMap {
		SuperClassMap::default()
	}

	pub fn add(&mut self, hierarchy: &spool::class::Hierarchy) {
		let supers = hierarchy.super_class.iter()
			.chain(hierarchy.interfaces.iter())
			.cloned()
			.collect();
		self.super_classes.insert(hierarchy.name.clone(), supers);
	}

	/// The same table with every name run through a remapper, for walking
	/// hierarchies on the other side of a rename.
	pub fn remap(&self, remapper: &impl TypeRemapper) -> Result<SuperClassMap> {
		let mut super_classes = IndexMap::new();
		for (class, supers) in &self.super_classes {
			let supers = supers.iter()
				.map(|super_class| remapper.map_class(super_class))
				.collect::<Result<_>>()?;
			super_classes.insert(remapper.map_class(class)?, supers);
		}
		Ok(SuperClassMap { super_classes })
	}
}

impl SuperClassProvider for SuperClassMap {
	fn super_classes(&self, class: &str) -> Result<Option<Vec<ClassName>>> {
		Ok(self.super_classes.get(class).cloned())
	}
}

impl<S: SuperClassProvider> SuperClassProvider for Vec<S> {
	fn super_classes(&self, class: &str) -> Result<Option<Vec<ClassName>>> {
		for provider in self {
			if let Some(supers) = provider.super_classes(class)? {
				return Ok(Some(supers));
			}
		}
		Ok(None)
	}
}

impl<S: SuperClassProvider + ?Sized> SuperClassProvider for &S {
	fn super_classes(&self, class: &str) -> Result<Option<Vec<ClassName>>> {
		(**self).super_classes(class)
	}
}

/// A provider that parses class headers through a loader, memoizing
/// what it has seen. The lock keeps concurrent readers safe; answers are
/// stable for a given input name, so rewriting stays deterministic.
pub struct LoaderInheritance<L> {
	loader: L,
	cache: RwLock<IndexMap<ClassName, Option<Vec<ClassName>>>>,
}

impl<L: ClassBytesLoader> LoaderInheritance<L> {
	pub fn new(loader: L) -> LoaderInheritance<L> {
		LoaderInheritance {
			loader,
			cache: RwLock::new(IndexMap::new()),
		}
	}
}

impl<L: ClassBytesLoader> SuperClassProvider for LoaderInheritance<L> {
	fn super_classes(&self, class: &str) -> Result<Option<Vec<ClassName>>> {
		{
			let cache = self.cache.read()
				.map_err(|_| anyhow!("super class cache poisoned"))?;
			if let Some(cached) = cache.get(class) {
				return Ok(cached.clone());
			}
		}

		let supers = match self.loader.load_class_bytes(class)? {
			Some(bytes) => {
				let hierarchy = read_hierarchy(&bytes)?;
				Some(hierarchy.super_class.into_iter()
					.chain(hierarchy.interfaces)
					.collect())
			},
			None => None,
		};

		let mut cache = self.cache.write()
			.map_err(|_| anyhow!("super class cache poisoned"))?;
		Ok(cache.entry(ClassName::from(class)).or_insert(supers).clone())
	}
}

/// Evaluates `f` on `start` and then on its ancestors, returning the
/// first `Some`.
///
/// The start class is checked before any parent. Ancestors come off a
/// stack with the direct superclass chain ahead of interfaces, so a
/// superclass match wins over an interface match. Visited names are
/// deduplicated, which also bounds walks over (illegal) cyclic input.
pub fn find_in_hierarchy<P, T, F>(provider: &P, start: &str, mut f: F) -> Result<Option<T>>
where
	P: SuperClassProvider,
	F: FnMut(&str) -> Option<T>,
{
	let mut visited: IndexSet<ClassName> = IndexSet::new();
	let mut stack = vec![ClassName::from(start)];

	while let Some(class) = stack.pop() {
		if !visited.insert(class.clone()) {
			continue;
		}

		if let Some(found) = f(&class) {
			return Ok(Some(found));
		}

		if let Some(supers) = provider.super_classes(&class)? {
			// reversed: the superclass is listed first and must pop first
			stack.extend(supers.into_iter().rev());
		}
	}

	Ok(None)
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use anyhow::Result;
	use super::*;

	fn names(names: &[&str]) -> Vec<ClassName> {
		names.iter().copied().map(ClassName::from).collect()
	}

	#[test]
	fn start_first_then_super_chain_then_interfaces() -> Result<()> {
		let mut map = SuperClassMap::new();
		map.super_classes.insert(ClassName::from("A"), names(&["B", "I"]));
		map.super_classes.insert(ClassName::from("B"), names(&["java/lang/Object"]));

		let mut order = Vec::new();
		let found = find_in_hierarchy(&map, "A", |class| {
			order.push(class.to_owned());
			None::<()>
		})?;

		assert_eq!(found, None);
		assert_eq!(order, vec!["A", "B", "java/lang/Object", "I"]);
		Ok(())
	}

	#[test]
	fn tables_build_from_headers_and_remap() -> Result<()> {
		let hierarchy = spool::class::Hierarchy {
			name: ClassName::from("A"),
			super_class: Some(ClassName::from("B")),
			interfaces: vec![ClassName::from("I")],
		};

		let mut map = SuperClassMap::new();
		map.add(&hierarchy);
		assert_eq!(map.super_classes.get("A"), Some(&names(&["B", "I"])));

		let input = "\
tiny	2	0	obf	named
c	A	A2
c	B	B2
";
		let mappings = crate::tiny_v2::read(input.as_bytes())?;
		let remapper = mappings.type_remapper(
			mappings.get_namespace("obf")?,
			mappings.get_namespace("named")?,
		)?;

		let remapped = map.remap(&remapper)?;
		assert_eq!(remapped.super_classes.get("A2"), Some(&names(&["B2", "I"])));

		Ok(())
	}

	#[test]
	fn cyclic_input_terminates() -> Result<()> {
		let mut map = SuperClassMap::new();
		map.super_classes.insert(ClassName::from("A"), names(&["B"]));
		map.super_classes.insert(ClassName::from("B"), names(&["A"]));

		let found = find_in_hierarchy(&map, "A", |class| (class == "B").then_some(()))?;
		assert_eq!(found, Some(()));
		Ok(())
	}
}
