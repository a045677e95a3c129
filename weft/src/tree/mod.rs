pub mod mappings;

pub mod names {
	use std::fmt::{Debug, Formatter};
	use std::ops::{Index, IndexMut};
	use anyhow::{anyhow, bail, Context, Error, Result};

	/// Describes a given namespace of a mapping tree.
	///
	/// A `Namespace` is obtained from [`Namespaces::get_namespace`] and is
	/// only meaningful for the mappings it came from; the width of a
	/// mappings value is a runtime property, so nothing ties an index to
	/// its tree at compile time.
	#[derive(Debug, Copy, Clone, PartialEq, Eq)]
	pub struct Namespace(pub(crate) usize);

	impl Namespace {
		/// The first namespace; descriptors are always expressed in it.
		pub(crate) const FIRST: Namespace = Namespace(0);

		pub fn index(self) -> usize {
			self.0
		}
	}

	/// The ordered, non-empty list of namespace labels of a mapping tree.
	#[derive(Clone, PartialEq)]
	pub struct Namespaces {
		names: Vec<String>,
	}

	impl Index<Namespace> for Namespaces {
		type Output = String;

		fn index(&self, index: Namespace) -> &String {
			&self.names[index.0]
		}
	}

	impl Namespaces {
		pub fn len(&self) -> usize {
			self.names.len()
		}

		pub fn is_empty(&self) -> bool {
			self.names.is_empty()
		}

		pub fn names(&self) -> &[String] {
			&self.names
		}

		pub fn get_namespace(&self, name: &str) -> Result<Namespace> {
			for (id, namespace) in self.names.iter().enumerate() {
				if namespace == name {
					return Ok(Namespace(id));
				}
			}
			bail!("cannot find namespace with name {name:?}, only got {self:?}");
		}

		/// Returns an error if the names of `self` aren't the names given in
		/// the argument. Useful right after reading a mappings file.
		pub fn check_that(&self, names: &[&str]) -> Result<()> {
			if self.names != names {
				bail!("expected namespaces {names:?}, got {self:?}");
			}
			Ok(())
		}

		pub(crate) fn project(&self, table: &[Namespace]) -> Namespaces {
			Namespaces {
				names: table.iter().map(|&namespace| self[namespace].clone()).collect(),
			}
		}

		pub(crate) fn rename(&self, to: &[&str]) -> Result<Namespaces> {
			if to.len() != self.names.len() {
				bail!("cannot rename {} namespaces {self:?} to the {} names {to:?}", self.names.len(), to.len());
			}
			to.iter().map(|name| name.to_string()).collect::<Vec<_>>().try_into()
		}
	}

	impl Debug for Namespaces {
		fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
			f.debug_list()
				.entries(&self.names)
				.finish()
		}
	}

	impl TryFrom<Vec<String>> for Namespaces {
		type Error = Error;

		fn try_from(value: Vec<String>) -> Result<Namespaces> {
			if value.is_empty() {
				bail!("mappings must have at least one namespace");
			}
			if value.iter().any(|name| name.is_empty()) {
				bail!("found empty namespace name in {value:?}, every namespace name must be non-empty");
			}

			Ok(Namespaces { names: value })
		}
	}

	impl TryFrom<&[&str]> for Namespaces {
		type Error = Error;

		fn try_from(value: &[&str]) -> Result<Namespaces> {
			value.iter().map(|name| name.to_string()).collect::<Vec<_>>().try_into()
		}
	}

	impl<const N: usize> TryFrom<[&str; N]> for Namespaces {
		type Error = Error;

		fn try_from(value: [&str; N]) -> Result<Namespaces> {
			value.as_slice().try_into()
		}
	}

	/// One name per namespace, with absent names as `None`.
	///
	/// The name in the first namespace is the key of an entity and must be
	/// present.
	#[derive(Clone, PartialEq, PartialOrd, Eq, Ord)]
	pub struct Names<T> {
		names: Vec<Option<T>>,
	}

	impl<T> Index<Namespace> for Names<T> {
		type Output = Option<T>;

		fn index(&self, index: Namespace) -> &Option<T> {
			&self.names[index.0]
		}
	}

	impl<T> IndexMut<Namespace> for Names<T> {
		fn index_mut(&mut self, index: Namespace) -> &mut Option<T> {
			&mut self.names[index.0]
		}
	}

	impl<T> Names<T> {
		pub fn len(&self) -> usize {
			self.names.len()
		}

		pub fn is_empty(&self) -> bool {
			self.names.is_empty()
		}

		pub fn names(&self) -> &[Option<T>] {
			&self.names
		}

		pub fn first_name(&self) -> Result<&T>
		where
			T: Debug,
		{
			self.names.first()
				.context("zero namespaces is too few for having a name in the first namespace")?
				.as_ref()
				.with_context(|| anyhow!("no name for the first namespace: {self:?}"))
		}

		pub(crate) fn project(&self, table: &[Namespace]) -> Names<T>
		where
			T: Clone,
		{
			Names {
				names: table.iter().map(|&namespace| self[namespace].clone()).collect(),
			}
		}
	}

	impl<T: Debug> Debug for Names<T> {
		fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
			f.debug_list()
				.entries(&self.names)
				.finish()
		}
	}

	/// Note that empty inputs are converted into `None`.
	impl<T> From<Vec<T>> for Names<T>
	where
		T: AsRef<str>,
	{
		fn from(value: Vec<T>) -> Names<T> {
			Names {
				names: value.into_iter()
					.map(|name| if name.as_ref().is_empty() { None } else { Some(name) })
					.collect(),
			}
		}
	}

	impl<T> TryFrom<Vec<Option<T>>> for Names<T>
	where
		T: AsRef<str> + Debug,
	{
		type Error = Error;

		fn try_from(value: Vec<Option<T>>) -> Result<Names<T>> {
			if value.iter().any(|name| name.as_ref().is_some_and(|name| name.as_ref().is_empty())) {
				bail!("cannot create names where an existing name is an empty string: {value:?}");
			}

			Ok(Names { names: value })
		}
	}

	impl<T> From<Names<T>> for Vec<Option<T>> {
		fn from(value: Names<T>) -> Vec<Option<T>> {
			value.names
		}
	}
}
