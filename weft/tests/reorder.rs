use anyhow::Result;
use pretty_assertions::assert_eq;

#[test]
fn rename_replaces_labels_only() -> Result<()> {
	let input = "\
tiny	2	0	obf	named
c	a	Foo
	f	I	f	count
	m	(I)V	m	hello
";

	let mappings = weft::tiny_v2::read(input.as_bytes())?;
	let renamed = mappings.rename_namespaces(&["x", "y"])?;

	renamed.info.namespaces.check_that(&["x", "y"])?;
	assert_eq!(renamed.classes, mappings.classes);

	assert!(mappings.rename_namespaces(&["onlyOne"]).is_err());
	Ok(())
}

#[test]
fn rename_round_trip() -> Result<()> {
	let input = "\
tiny	2	0	obf	named
c	a	Foo
	m	(La;)V	m	hello
";

	let mappings = weft::tiny_v2::read(input.as_bytes())?;
	let labels: Vec<&str> = mappings.info.namespaces.names().iter().map(String::as_str).collect();

	assert_eq!(mappings.rename_namespaces(&labels)?, mappings);
	Ok(())
}

#[test]
fn reorder_round_trip() -> Result<()> {
	let input = "\
tiny	2	0	obf	intm	named
c	a	b	c
	f	La;	fa	fb	fc
	m	(La;)V	ma	mb	mc
		p	1	pa	pb	pc
";

	let mappings = weft::tiny_v2::read(input.as_bytes())?;
	let labels: Vec<&str> = mappings.info.namespaces.names().iter().map(String::as_str).collect();

	assert_eq!(mappings.reorder(&labels)?, mappings);
	Ok(())
}

#[test]
fn reorder_rewrites_descriptors() -> Result<()> {
	let input = "\
tiny	2	0	namespaceC	namespaceB	namespaceA
c	C	B	A
	f	LC;	c	b	a
	m	(LC;)V	c	b	a
";
	let output = "\
tiny	2	0	namespaceA	namespaceB	namespaceC
c	A	B	C
	f	LA;	a	b	c
	m	(LA;)V	a	b	c
";

	let reordered = weft::tiny_v2::read(input.as_bytes())?
		.reorder(&["namespaceA", "namespaceB", "namespaceC"])?;

	assert_eq!(weft::tiny_v2::write_string(&reordered)?, output);
	Ok(())
}

#[test]
fn reorder_checks_arity_and_labels() -> Result<()> {
	let input = "\
tiny	2	0	obf	named
c	a	Foo
";
	let mappings = weft::tiny_v2::read(input.as_bytes())?;

	assert!(mappings.reorder(&["obf"]).is_err());
	assert!(mappings.reorder(&["obf", "unknown"]).is_err());

	// duplicating a column is allowed
	let doubled = mappings.reorder(&["named", "named"])?;
	doubled.info.namespaces.check_that(&["named", "named"])?;

	Ok(())
}
