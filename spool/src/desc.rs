//! Pure transformations over descriptor and signature strings.
//!
//! Everything in here works on strings alone and calls back into a
//! class-name substitution function; nothing recurses into mappings.
//! The grammar for descriptors is:
//! ```txt
//! FieldType:  B | C | D | F | I | J | S | Z | L ClassName ; | [ FieldType
//! MethodDescriptor:  ( FieldType* ) ( FieldType | V )
//! ```
//! Malformed input fails with an error naming the offending string and
//! the byte offset where parsing stopped.

use anyhow::{anyhow, bail, Result};
use crate::name::{ClassName, MethodDescriptor, MethodName};

/// Consumes exactly one field type (or `V` when `allow_void`) starting at
/// byte `i`, pushing the mapped form onto `out`.
fn map_one_type<F>(desc: &str, i: &mut usize, out: &mut String, allow_void: bool, f: &mut F) -> Result<()>
where
	F: FnMut(&str) -> Result<String>,
{
	let bytes = desc.as_bytes();

	while *i < bytes.len() && bytes[*i] == b'[' {
		out.push('[');
		*i += 1;
	}

	let Some(&b) = bytes.get(*i) else {
		bail!("descriptor {desc:?} ends abruptly at byte {i}");
	};

	match b {
		b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' => {
			out.push(b as char);
			*i += 1;
		},
		b'V' if allow_void => {
			out.push('V');
			*i += 1;
		},
		b'L' => {
			let end = desc[*i..].find(';')
				.map(|e| *i + e)
				.ok_or_else(|| anyhow!("descriptor {desc:?} has no ';' for the class name starting at byte {i}"))?;
			let name = &desc[*i + 1..end];
			if name.is_empty() {
				bail!("descriptor {desc:?} has an empty class name at byte {i}");
			}

			out.push('L');
			out.push_str(&f(name)?);
			out.push(';');
			*i = end + 1;
		},
		other => {
			bail!("unexpected byte {:?} at offset {i} in descriptor {desc:?}", other as char);
		},
	}

	Ok(())
}

/// Substitutes every `L<internal>;` in a type descriptor with
/// `L<f(internal)>;`. Primitives and array dimensions pass through.
///
/// ```
/// # use pretty_assertions::assert_eq;
/// let mapped = spool::desc::map_type_desc("[La;", &mut |name| {
///     Ok(if name == "a" { "b".to_owned() } else { name.to_owned() })
/// }).unwrap();
/// assert_eq!(mapped, "[Lb;");
/// ```
pub fn map_type_desc<F>(desc: &str, f: &mut F) -> Result<String>
where
	F: FnMut(&str) -> Result<String>,
{
	let mut out = String::with_capacity(desc.len());
	let mut i = 0;

	while i < desc.len() {
		map_one_type(desc, &mut i, &mut out, true, f)?;
	}

	Ok(out)
}

/// Substitutes class names in a method descriptor, parameter list and
/// return type alike.
pub fn map_method_desc<F>(desc: &str, f: &mut F) -> Result<String>
where
	F: FnMut(&str) -> Result<String>,
{
	let bytes = desc.as_bytes();
	if bytes.first() != Some(&b'(') {
		bail!("method descriptor {desc:?} doesn't start with '('");
	}

	let mut out = String::with_capacity(desc.len());
	out.push('(');

	let mut i = 1;
	loop {
		match bytes.get(i) {
			Some(b')') => {
				out.push(')');
				i += 1;
				break;
			},
			Some(_) => map_one_type(desc, &mut i, &mut out, false, f)?,
			None => bail!("method descriptor {desc:?} has no ')'"),
		}
	}

	map_one_type(desc, &mut i, &mut out, true, f)?;

	if i != desc.len() {
		bail!("expected end of method descriptor {desc:?} at byte {i}");
	}

	Ok(out)
}

/// Maps a class name that may also be an array descriptor.
///
/// `Class` constant pool entries of instructions like `anewarray` and
/// `checkcast` sometimes carry `[Lfoo;` instead of a plain internal name.
pub fn map_class_or_array<F>(name: &str, f: &mut F) -> Result<String>
where
	F: FnMut(&str) -> Result<String>,
{
	if name.starts_with('[') {
		map_type_desc(name, f)
	} else {
		f(name)
	}
}

/// The return descriptor of a method descriptor, e.g. `LFoo;` of `(I)LFoo;`.
pub fn method_return_type(desc: &str) -> Result<&str> {
	let bytes = desc.as_bytes();
	if bytes.first() != Some(&b'(') {
		bail!("method descriptor {desc:?} doesn't start with '('");
	}

	// skip over the parameter list one type at a time, since a class name
	// may legally contain ')'
	let mut i = 1;
	loop {
		match bytes.get(i) {
			Some(b')') => break,
			Some(b'L') => {
				i = desc[i..].find(';')
					.map(|e| i + e + 1)
					.ok_or_else(|| anyhow!("method descriptor {desc:?} has no ';' for the class name starting at byte {i}"))?;
			},
			Some(_) => i += 1,
			None => bail!("method descriptor {desc:?} has no ')'"),
		}
	}

	let ret = &desc[i + 1..];
	if ret.is_empty() {
		bail!("method descriptor {desc:?} has no return type");
	}
	Ok(ret)
}

/// The internal class name of a method's return type, if the return type
/// is an object type. `None` for primitives, `void` and arrays.
pub fn return_type_internal(desc: &str) -> Result<Option<ClassName>> {
	let ret = method_return_type(desc)?;
	Ok(ret.strip_prefix('L')
		.and_then(|r| r.strip_suffix(';'))
		.map(ClassName::from))
}

/// Splits a `name(params)ret` method declaration into name and descriptor.
///
/// ```
/// # use pretty_assertions::assert_eq;
/// let (name, desc) = spool::desc::parse_method_decl("hello(I)V").unwrap();
/// assert_eq!(name.as_str(), "hello");
/// assert_eq!(desc.as_str(), "(I)V");
/// ```
pub fn parse_method_decl(s: &str) -> Result<(MethodName, MethodDescriptor)> {
	let open = s.find('(')
		.ok_or_else(|| anyhow!("method declaration {s:?} has no '('"))?;

	let name = &s[..open];
	if name.is_empty() {
		bail!("method declaration {s:?} has an empty name");
	}

	let desc = &s[open..];
	// a pure scan validates the descriptor without renaming anything
	map_method_desc(desc, &mut |name| Ok(name.to_owned()))?;

	Ok((MethodName::from(name), MethodDescriptor::from(desc)))
}

/// Splits a member reference that carries its own owner.
///
/// Accepted forms are `owner.name(params)ret` and `owner.field` with the
/// owner as a plain internal name, as well as `Lowner;name(params)ret`
/// and `Lowner;field` with the owner in descriptor form. The returned
/// descriptor is `Some` for the method forms.
pub fn parse_target(s: &str) -> Result<(ClassName, String, Option<MethodDescriptor>)> {
	let (owner, member) = if let Some(rest) = s.strip_prefix('L') {
		let semi = rest.find(';')
			.ok_or_else(|| anyhow!("target {s:?} has no ';' closing the owner"))?;
		(&rest[..semi], &rest[semi + 1..])
	} else {
		let dot = s.find('.')
			.ok_or_else(|| anyhow!("target {s:?} has no '.' separating owner and member"))?;
		(&s[..dot], &s[dot + 1..])
	};

	if owner.is_empty() {
		bail!("target {s:?} has an empty owner");
	}
	if member.is_empty() {
		bail!("target {s:?} has an empty member name");
	}

	if member.contains('(') {
		let (name, desc) = parse_method_decl(member)?;
		Ok((ClassName::from(owner), name.into_string(), Some(desc)))
	} else {
		Ok((ClassName::from(owner), member.to_owned(), None))
	}
}

/// Substitutes class names in a generic signature string.
///
/// Signatures extend descriptors with formal type parameters, type
/// arguments (`<...>` with `*`, `+`, `-` wildcards), type variables
/// (`T<var>;`) and inner class suffixes (`.Inner`); see JVMS §4.7.9.1.
/// Type variable names are left alone. Inner class suffixes are mapped
/// through the `Outer$Inner` binary name; if the mapping doesn't keep
/// the nesting intact, the unmapped simple name is kept.
pub fn map_signature<F>(sig: &str, f: &mut F) -> Result<String>
where
	F: FnMut(&str) -> Result<String>,
{
	let mut p = SigMapper { sig, i: 0, out: String::with_capacity(sig.len()) };

	// formal type parameters: <Name : bound (: bound)*  ... >
	if p.eat(b'<') {
		while !p.eat(b'>') {
			p.copy_until(b':')?;
			p.expect(b':')?;
			// the class bound may be empty
			if !matches!(p.peek(), Some(b':')) {
				p.field_type(f)?;
			}
			while p.eat(b':') {
				p.field_type(f)?;
			}
		}
	}

	if p.eat(b'(') {
		// method signature
		while !p.eat(b')') {
			p.type_sig(f)?;
		}
		if p.eat(b'V') {
			// void return
		} else {
			p.type_sig(f)?;
		}
		while p.eat(b'^') {
			p.field_type(f)?;
		}
	} else {
		// class signature (superclass + superinterfaces) or a single
		// field type signature
		p.field_type(f)?;
		while p.i < p.sig.len() {
			p.field_type(f)?;
		}
	}

	if p.i != p.sig.len() {
		bail!("expected end of signature {sig:?} at byte {}", p.i);
	}

	Ok(p.out)
}

struct SigMapper<'a> {
	sig: &'a str,
	i: usize,
	out: String,
}

impl SigMapper<'_> {
	fn peek(&self) -> Option<u8> {
		self.sig.as_bytes().get(self.i).copied()
	}

	fn eat(&mut self, b: u8) -> bool {
		if self.peek() == Some(b) {
			self.out.push(b as char);
			self.i += 1;
			true
		} else {
			false
		}
	}

	fn expect(&mut self, b: u8) -> Result<()> {
		if !self.eat(b) {
			bail!("expected {:?} at byte {} in signature {:?}", b as char, self.i, self.sig);
		}
		Ok(())
	}

	fn copy_until(&mut self, stop: u8) -> Result<()> {
		let end = self.sig[self.i..].find(stop as char)
			.map(|e| self.i + e)
			.ok_or_else(|| anyhow!("expected {:?} after byte {} in signature {:?}", stop as char, self.i, self.sig))?;
		self.out.push_str(&self.sig[self.i..end]);
		self.i = end;
		Ok(())
	}

	/// `BaseType | FieldTypeSignature`
	fn type_sig<F>(&mut self, f: &mut F) -> Result<()>
	where
		F: FnMut(&str) -> Result<String>,
	{
		match self.peek() {
			Some(b @ (b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z')) => {
				self.eat(b);
				Ok(())
			},
			_ => self.field_type(f),
		}
	}

	/// `ClassTypeSignature | ArrayTypeSignature | TypeVariableSignature`
	fn field_type<F>(&mut self, f: &mut F) -> Result<()>
	where
		F: FnMut(&str) -> Result<String>,
	{
		match self.peek() {
			Some(b'[') => {
				self.eat(b'[');
				self.type_sig(f)
			},
			Some(b'T') => {
				self.eat(b'T');
				self.copy_until(b';')?;
				self.expect(b';')
			},
			Some(b'L') => self.class_type(f),
			other => bail!("unexpected {:?} at byte {} in signature {:?}",
				other.map(|b| b as char), self.i, self.sig),
		}
	}

	/// `L Name TypeArgs? (. SimpleName TypeArgs?)* ;`
	fn class_type<F>(&mut self, f: &mut F) -> Result<()>
	where
		F: FnMut(&str) -> Result<String>,
	{
		self.expect(b'L')?;

		let start = self.i;
		while !matches!(self.peek(), Some(b';' | b'<' | b'.') | None) {
			self.i += 1;
		}

		// the binary name grows by `$Inner` per suffix; the mapped prefix
		// tells us where the mapped simple name starts
		let mut binary = self.sig[start..self.i].to_owned();
		let mut mapped = f(&binary)?;
		self.out.push_str(&mapped);

		loop {
			match self.peek() {
				Some(b'<') => {
					self.eat(b'<');
					while !self.eat(b'>') {
						match self.peek() {
							Some(b'*') => { self.eat(b'*'); },
							Some(b'+') => { self.eat(b'+'); self.field_type(f)?; },
							Some(b'-') => { self.eat(b'-'); self.field_type(f)?; },
							Some(_) => self.field_type(f)?,
							None => bail!("signature {:?} ends inside type arguments", self.sig),
						}
					}
				},
				Some(b'.') => {
					self.i += 1;
					let start = self.i;
					while !matches!(self.peek(), Some(b';' | b'<' | b'.') | None) {
						self.i += 1;
					}
					let inner = &self.sig[start..self.i];

					let prefix = mapped.clone();
					binary.push('$');
					binary.push_str(inner);
					mapped = f(&binary)?;

					self.out.push('.');
					if let Some(rest) = mapped.strip_prefix(&prefix).and_then(|r| r.strip_prefix('$')) {
						self.out.push_str(rest);
					} else {
						// renaming broke the nesting, keep the old simple name
						self.out.push_str(inner);
					}
				},
				Some(b';') => {
					self.eat(b';');
					return Ok(());
				},
				other => bail!("unexpected {:?} at byte {} in signature {:?}",
					other.map(|b| b as char), self.i, self.sig),
			}
		}
	}
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use anyhow::Result;
	use super::*;

	fn upper(name: &str) -> Result<String> {
		Ok(name.to_uppercase())
	}

	#[test]
	fn type_descs() -> Result<()> {
		assert_eq!(map_type_desc("I", &mut upper)?, "I");
		assert_eq!(map_type_desc("La;", &mut upper)?, "LA;");
		assert_eq!(map_type_desc("[[La/b;", &mut upper)?, "[[LA/B;");
		assert_eq!(map_type_desc("[[[D", &mut upper)?, "[[[D");
		Ok(())
	}

	#[test]
	fn method_descs() -> Result<()> {
		assert_eq!(map_method_desc("()V", &mut upper)?, "()V");
		assert_eq!(map_method_desc("(ILa;J)La;", &mut upper)?, "(ILA;J)LA;");
		assert_eq!(map_method_desc("([La;[[I)V", &mut upper)?, "([LA;[[I)V");
		Ok(())
	}

	#[test]
	fn malformed_descs() {
		assert!(map_type_desc("La", &mut upper).is_err());
		assert!(map_type_desc("L;", &mut upper).is_err());
		assert!(map_type_desc("Q", &mut upper).is_err());
		assert!(map_method_desc("I", &mut upper).is_err());
		assert!(map_method_desc("(I", &mut upper).is_err());
		assert!(map_method_desc("(V)I", &mut upper).is_err());
		assert!(map_method_desc("()", &mut upper).is_err());
		assert!(map_method_desc("()VV", &mut upper).is_err());
	}

	#[test]
	fn return_types() -> Result<()> {
		assert_eq!(method_return_type("(I)LFoo;")?, "LFoo;");
		assert_eq!(method_return_type("()V")?, "V");
		assert_eq!(return_type_internal("(I)LFoo;")?, Some(ClassName::from("Foo")));
		assert_eq!(return_type_internal("()V")?, None);
		assert_eq!(return_type_internal("()[LFoo;")?, None);
		Ok(())
	}

	#[test]
	fn method_decls() -> Result<()> {
		let (name, desc) = parse_method_decl("run(Ljava/lang/String;)I")?;
		assert_eq!(name.as_str(), "run");
		assert_eq!(desc.as_str(), "(Ljava/lang/String;)I");

		assert!(parse_method_decl("noParens").is_err());
		assert!(parse_method_decl("(I)V").is_err());
		assert!(parse_method_decl("broken(").is_err());
		Ok(())
	}

	#[test]
	fn targets() -> Result<()> {
		assert_eq!(parse_target("a/b/C.member")?,
			(ClassName::from("a/b/C"), "member".to_owned(), None));
		assert_eq!(parse_target("a/b/C.run(I)V")?,
			(ClassName::from("a/b/C"), "run".to_owned(), Some(MethodDescriptor::from("(I)V"))));
		assert_eq!(parse_target("La/b/C;run(I)V")?,
			(ClassName::from("a/b/C"), "run".to_owned(), Some(MethodDescriptor::from("(I)V"))));
		assert_eq!(parse_target("La/b/C;member")?,
			(ClassName::from("a/b/C"), "member".to_owned(), None));

		assert!(parse_target("nodot").is_err());
		assert!(parse_target("La/b/C").is_err());
		assert!(parse_target(".name").is_err());
		assert!(parse_target("owner.").is_err());
		Ok(())
	}

	#[test]
	fn signatures() -> Result<()> {
		assert_eq!(map_signature("La;", &mut upper)?, "LA;");
		assert_eq!(map_signature("La<Lb;>;", &mut upper)?, "LA<LB;>;");
		assert_eq!(map_signature("La<*>;", &mut upper)?, "LA<*>;");
		assert_eq!(map_signature("La<+Lb;-Lc;>;", &mut upper)?, "LA<+LB;-LC;>;");
		assert_eq!(map_signature("TT;", &mut upper)?, "TT;");
		assert_eq!(map_signature("[La<TT;>;", &mut upper)?, "[LA<TT;>;");
		assert_eq!(
			map_signature("<T:Ljava/lang/Object;>(TT;La;)TT;^Lx;", &mut upper)?,
			"<T:LJAVA/LANG/OBJECT;>(TT;LA;)TT;^LX;"
		);
		assert_eq!(
			map_signature("La;Lb<TT;>;", &mut upper)?,
			"LA;LB<TT;>;"
		);
		Ok(())
	}

	#[test]
	fn inner_class_signatures() -> Result<()> {
		// outer renamed, nesting kept
		let mut f = |name: &str| -> Result<String> {
			Ok(match name {
				"a/Outer" => "x/Mapped".to_owned(),
				"a/Outer$In" => "x/Mapped$Part".to_owned(),
				other => other.to_owned(),
			})
		};
		assert_eq!(map_signature("La/Outer<TT;>.In;", &mut f)?, "Lx/Mapped<TT;>.Part;");

		// nesting destroyed by the mapping, old simple name kept
		let mut g = |name: &str| -> Result<String> {
			Ok(match name {
				"a/Outer" => "x/Mapped".to_owned(),
				"a/Outer$In" => "y/Elsewhere".to_owned(),
				other => other.to_owned(),
			})
		};
		assert_eq!(map_signature("La/Outer.In;", &mut g)?, "Lx/Mapped.In;");
		Ok(())
	}
}
