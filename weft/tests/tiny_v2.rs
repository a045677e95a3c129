use anyhow::Result;
use pretty_assertions::assert_eq;

#[test]
fn read_write_round_trip() -> Result<()> {
	let input = "\
tiny	2	0	obf	named
c	a	Foo
	c	a class comment
	f	I	f	count
		c	a field comment
	m	(La;)V	m	hello
		c	a method comment
		p	1	pa	arg
			c	a parameter comment
		v	2	0	-1	va	local
			c	a variable comment
c	b	Bar
";

	let mappings = weft::tiny_v2::read(input.as_bytes())?;
	assert_eq!(weft::tiny_v2::write_string(&mappings)?, input);

	Ok(())
}

#[test]
fn order_is_preserved() -> Result<()> {
	// deliberately not sorted
	let input = "\
tiny	2	0	obf	named
c	z	Last
c	a	First
	m	(I)V	mb	two
	m	(I)V	ma	one
	f	I	fb	two
	f	I	fa	one
";

	let mappings = weft::tiny_v2::read(input.as_bytes())?;
	assert_eq!(weft::tiny_v2::write_string(&mappings)?, input);

	Ok(())
}

#[test]
fn local_variable_details() -> Result<()> {
	let input = "\
tiny	2	0	obf	named
c	a	Foo
	m	()V	m	hello
		v	3	7	2	va	local
";

	let mappings = weft::tiny_v2::read(input.as_bytes())?;
	let class = mappings.classes.values().next().unwrap();
	let method = class.methods.values().next().unwrap();

	assert_eq!(method.variables.len(), 1);
	let variable = &method.variables[0];
	assert_eq!(variable.index, 3);
	assert_eq!(variable.start, 7);
	assert_eq!(variable.table_index, Some(2));

	Ok(())
}

#[test]
fn missing_names_become_holes() -> Result<()> {
	// the named column is present but empty
	let input = "tiny\t2\t0\tobf\tnamed\nc\ta\t\n";

	let mappings = weft::tiny_v2::read(input.as_bytes())?;
	let class = mappings.classes.values().next().unwrap();

	assert!(class.names.names()[1].is_none());
	assert_eq!(weft::tiny_v2::write_string(&mappings)?, input);
	Ok(())
}

#[test]
fn unknown_sections_are_skipped() -> Result<()> {
	let input = "\
tiny	2	0	obf	named
x	whatever	else
	y	nested	data
c	a	Foo
";

	let mappings = weft::tiny_v2::read(input.as_bytes())?;
	assert_eq!(mappings.classes.len(), 1);
	Ok(())
}

#[test]
fn malformed_headers_are_rejected() {
	assert!(weft::tiny_v2::read("".as_bytes()).is_err());
	assert!(weft::tiny_v2::read("tiny	1	0	a	b\n".as_bytes()).is_err());
	assert!(weft::tiny_v2::read("nope	2	0	a	b\n".as_bytes()).is_err());
	// a name column count mismatch
	assert!(weft::tiny_v2::read("tiny	2	0	a	b\nc	onlyOne\n".as_bytes()).is_err());
}
