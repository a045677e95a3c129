//! Joining two mappings through a shared namespace.
//!
//! Two mappings that both carry, say, an `intermediary` namespace can be
//! combined into one wide mappings value: entities are paired up by
//! their intermediary names, and the output carries the columns of both
//! sides around the shared column.

use anyhow::{anyhow, bail, Context, Result};
use indexmap::IndexMap;
use spool::desc;
use spool::name::{ClassName, FieldDescriptor, FieldName, MethodDescriptor, MethodName};
use crate::remapper::TypeRemapper;
use crate::tree::mappings::{ClassMapping, FieldMapping, MappingInfo, Mappings, MethodMapping};
use crate::tree::names::{Names, Namespace, Namespaces};

impl Mappings {
	/// Joins `self` and `other` through the namespace labelled
	/// `intermediate`, which both must carry.
	///
	/// The output namespaces are `self`'s without the intermediate, then
	/// the intermediate, then `other`'s without the intermediate. A class
	/// (or member) present on one side only keeps its intermediate name
	/// in the other side's columns; with `require_match` the class sets
	/// must pair up exactly, and the error names the unmatched classes.
	///
	/// Comments concatenate `self`'s before `other`'s. Parameters and
	/// local variables are dropped, as nothing reliable pairs them up.
	/// Descriptors of the output are re-expressed in terms of the
	/// output's first namespace.
	pub fn join(&self, other: &Mappings, intermediate: &str, require_match: bool) -> Result<Mappings> {
		join(self, other, intermediate, require_match)
			.with_context(|| anyhow!("failed to join mappings through namespace {intermediate:?}"))
	}
}

/// Folds a list of mappings left-to-right with [`Mappings::join`].
pub fn join_all(list: &[Mappings], intermediate: &str, require_match: bool) -> Result<Mappings> {
	let (first, rest) = list.split_first()
		.context("cannot join zero mappings")?;

	let mut acc = first.clone();
	for next in rest {
		acc = acc.join(next, intermediate, require_match)?;
	}
	Ok(acc)
}

/// A class pair assembled in the intermediate namespace; descriptors are
/// only re-expressed into the output's first namespace afterwards, once
/// the full class table exists.
struct JoinedClass {
	names: Names<ClassName>,
	comments: Vec<String>,
	fields: Vec<FieldMapping>,
	methods: Vec<MethodMapping>,
}

fn join(a: &Mappings, b: &Mappings, intermediate: &str, require_match: bool) -> Result<Mappings> {
	let ia = a.get_namespace(intermediate)?;
	let ib = b.get_namespace(intermediate)?;

	let a_cols: Vec<Namespace> = (0..a.info.namespaces.len())
		.map(Namespace)
		.filter(|&col| col != ia)
		.collect();
	let b_cols: Vec<Namespace> = (0..b.info.namespaces.len())
		.map(Namespace)
		.filter(|&col| col != ib)
		.collect();

	let mut labels: Vec<String> = a_cols.iter().map(|&col| a.info.namespaces[col].clone()).collect();
	labels.push(intermediate.to_owned());
	labels.extend(b_cols.iter().map(|&col| b.info.namespaces[col].clone()));

	let namespaces: Namespaces = labels.try_into()?;
	let intermediate_col = a_cols.len();

	// rewrites descriptors from each side's first namespace into the
	// intermediate namespace, where the two sides can be compared
	let a_desc = a.type_remapper(Namespace::FIRST, ia)?;
	let b_desc = b.type_remapper(Namespace::FIRST, ib)?;

	let a_by = classes_by_namespace(a, ia)?;
	let b_by = classes_by_namespace(b, ib)?;

	if require_match {
		let missing_right: Vec<&ClassName> = a_by.keys().copied().filter(|key| !b_by.contains_key(*key)).collect();
		let missing_left: Vec<&ClassName> = b_by.keys().copied().filter(|key| !a_by.contains_key(*key)).collect();
		if !missing_right.is_empty() || !missing_left.is_empty() {
			bail!("class sets don't pair up: missing on the right side: {missing_right:?}, missing on the left side: {missing_left:?}");
		}
	}

	// the union, in left-side order with right-only classes after
	let keys = a_by.keys().copied()
		.chain(b_by.keys().copied().filter(|key| !a_by.contains_key(*key)));

	let mut joined = Vec::new();
	for key in keys {
		let a_class = a_by.get(key).copied();
		let b_class = b_by.get(key).copied();

		let names = synthesize_names(
			a_class.map(|class| &class.names),
			b_class.map(|class| &class.names),
			&a_cols, &b_cols, key,
		)?;

		let mut comments = Vec::new();
		comments.extend(a_class.iter().flat_map(|class| class.comments.iter().cloned()));
		comments.extend(b_class.iter().flat_map(|class| class.comments.iter().cloned()));

		let fields = join_fields(a_class, b_class, ia, ib, &a_desc, &b_desc, &a_cols, &b_cols)
			.with_context(|| anyhow!("in class {key:?}"))?;
		let methods = join_methods(a_class, b_class, ia, ib, &a_desc, &b_desc, &a_cols, &b_cols)
			.with_context(|| anyhow!("in class {key:?}"))?;

		joined.push(JoinedClass { names, comments, fields, methods });
	}

	// the finalizing step: every descriptor is still in the intermediate
	// namespace, and the joined class table itself tells us the name in
	// the output's first namespace
	let mut to_first: IndexMap<String, String> = IndexMap::new();
	for class in &joined {
		if let (Some(intermediate_name), Some(first_name)) = (&class.names[Namespace(intermediate_col)], &class.names[Namespace::FIRST]) {
			to_first.insert(intermediate_name.as_str().to_owned(), first_name.as_str().to_owned());
		}
	}
	let mut finalize = |name: &str| -> Result<String> {
		Ok(to_first.get(name).map(String::as_str).unwrap_or(name).to_owned())
	};

	let mut out = Mappings::new(MappingInfo {
		namespaces,
		format: a.info.format,
	});

	for class in joined {
		let mut new_class = ClassMapping::new(class.names);
		new_class.comments = class.comments;

		for mut field in class.fields {
			if let Some(field_desc) = field.desc.take() {
				field.desc = Some(FieldDescriptor::from(desc::map_type_desc(&field_desc, &mut finalize)?));
			}
			new_class.add_field(field)?;
		}

		for mut method in class.methods {
			method.desc = MethodDescriptor::from(desc::map_method_desc(&method.desc, &mut finalize)?);
			new_class.add_method(method)?;
		}

		out.add_class(new_class)?;
	}

	Ok(out)
}

fn classes_by_namespace(mappings: &Mappings, namespace: Namespace) -> Result<IndexMap<&ClassName, &ClassMapping>> {
	let mut map = IndexMap::new();
	for class in mappings.classes.values() {
		let key = class.names[namespace].as_ref()
			.with_context(|| anyhow!("class {:?} has no name in the join namespace", class.names))?;
		if map.insert(key, class).is_some() {
			bail!("two classes share the name {key:?} in the join namespace");
		}
	}
	Ok(map)
}

/// Builds the output names row: a side that has the entity contributes
/// its names, a side that doesn't is filled with the intermediate name,
/// so the output stays rectangular.
fn synthesize_names<T: Clone + std::fmt::Debug + AsRef<str>>(
	a_names: Option<&Names<T>>,
	b_names: Option<&Names<T>>,
	a_cols: &[Namespace],
	b_cols: &[Namespace],
	intermediate_name: &T,
) -> Result<Names<T>> {
	let mut names: Vec<Option<T>> = Vec::with_capacity(a_cols.len() + 1 + b_cols.len());

	for &col in a_cols {
		names.push(match a_names {
			Some(a_names) => a_names[col].clone(),
			None => Some(intermediate_name.clone()),
		});
	}
	names.push(Some(intermediate_name.clone()));
	for &col in b_cols {
		names.push(match b_names {
			Some(b_names) => b_names[col].clone(),
			None => Some(intermediate_name.clone()),
		});
	}

	names.try_into()
}

#[allow(clippy::too_many_arguments)]
fn join_fields(
	a_class: Option<&ClassMapping>,
	b_class: Option<&ClassMapping>,
	ia: Namespace,
	ib: Namespace,
	a_desc: &impl TypeRemapper,
	b_desc: &impl TypeRemapper,
	a_cols: &[Namespace],
	b_cols: &[Namespace],
) -> Result<Vec<FieldMapping>> {
	let a_by = fields_by_namespace(a_class, ia)?;
	let b_by = fields_by_namespace(b_class, ib)?;

	let keys = a_by.keys().copied()
		.chain(b_by.keys().copied().filter(|key| !a_by.contains_key(*key)));

	let mut fields = Vec::new();
	for key in keys {
		let a_field = a_by.get(key).copied();
		let b_field = b_by.get(key).copied();

		// descriptor in the intermediate namespace, left side preferred
		let desc = match (a_field.and_then(|field| field.desc.as_ref()), b_field.and_then(|field| field.desc.as_ref())) {
			(Some(field_desc), _) => Some(FieldDescriptor::from(a_desc.map_desc(field_desc)?)),
			(None, Some(field_desc)) => Some(FieldDescriptor::from(b_desc.map_desc(field_desc)?)),
			(None, None) => None,
		};

		let names = synthesize_names(
			a_field.map(|field| &field.names),
			b_field.map(|field| &field.names),
			a_cols, b_cols, key,
		)?;

		let mut field = FieldMapping::new(desc, names);
		field.comments.extend(a_field.iter().flat_map(|f| f.comments.iter().cloned()));
		field.comments.extend(b_field.iter().flat_map(|f| f.comments.iter().cloned()));
		fields.push(field);
	}

	Ok(fields)
}

fn fields_by_namespace(class: Option<&ClassMapping>, namespace: Namespace) -> Result<IndexMap<&FieldName, &FieldMapping>> {
	let mut map = IndexMap::new();
	for field in class.into_iter().flat_map(|class| class.fields.values()) {
		let key = field.names[namespace].as_ref()
			.with_context(|| anyhow!("field {:?} has no name in the join namespace", field.names))?;
		if map.insert(key, field).is_some() {
			bail!("two fields share the name {key:?} in the join namespace");
		}
	}
	Ok(map)
}

#[allow(clippy::too_many_arguments)]
fn join_methods(
	a_class: Option<&ClassMapping>,
	b_class: Option<&ClassMapping>,
	ia: Namespace,
	ib: Namespace,
	a_desc: &impl TypeRemapper,
	b_desc: &impl TypeRemapper,
	a_cols: &[Namespace],
	b_cols: &[Namespace],
) -> Result<Vec<MethodMapping>> {
	let a_by = methods_by_namespace(a_class, ia, a_desc)?;
	let b_by = methods_by_namespace(b_class, ib, b_desc)?;

	let keys: Vec<&(MethodName, MethodDescriptor)> = a_by.keys()
		.chain(b_by.keys().filter(|key| !a_by.contains_key(*key)))
		.collect();

	let mut methods = Vec::new();
	for key in keys {
		let a_method = a_by.get(key).copied();
		let b_method = b_by.get(key).copied();

		let names = synthesize_names(
			a_method.map(|method| &method.names),
			b_method.map(|method| &method.names),
			a_cols, b_cols, &key.0,
		)?;

		// the key descriptor is already in the intermediate namespace
		let mut method = MethodMapping::new(key.1.clone(), names);
		method.comments.extend(a_method.iter().flat_map(|m| m.comments.iter().cloned()));
		method.comments.extend(b_method.iter().flat_map(|m| m.comments.iter().cloned()));
		methods.push(method);
	}

	Ok(methods)
}

fn methods_by_namespace<'a>(
	class: Option<&'a ClassMapping>,
	namespace: Namespace,
	desc_remapper: &impl TypeRemapper,
) -> Result<IndexMap<(MethodName, MethodDescriptor), &'a MethodMapping>> {
	let mut map = IndexMap::new();
	for method in class.into_iter().flat_map(|class| class.methods.values()) {
		let name = method.names[namespace].as_ref()
			.with_context(|| anyhow!("method {:?} has no name in the join namespace", method.names))?;
		let desc = MethodDescriptor::from(desc_remapper.map_method_desc(&method.desc)?);

		let key = (name.clone(), desc);
		if let Some(previous) = map.insert(key, method) {
			bail!("two methods share a name and descriptor in the join namespace: {previous:?} and {method:?}");
		}
	}
	Ok(map)
}
