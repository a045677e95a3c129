use anyhow::Result;
use pretty_assertions::assert_eq;
use weft::action::join_all;

#[test]
fn join_through_shared_namespace() -> Result<()> {
	let left = "\
tiny	2	0	obf	intm
c	A	X
	m	(LA;)V	m	x
";
	let right = "\
tiny	2	0	intm	named
c	X	Named
	m	(LX;)V	x	meth
";

	let left = weft::tiny_v2::read(left.as_bytes())?;
	let right = weft::tiny_v2::read(right.as_bytes())?;

	let joined = left.join(&right, "intm", false)?;

	joined.info.namespaces.check_that(&["obf", "intm", "named"])?;

	let expected = "\
tiny	2	0	obf	intm	named
c	A	X	Named
	m	(LA;)V	m	x	meth
";
	assert_eq!(weft::tiny_v2::write_string(&joined)?, expected);

	Ok(())
}

#[test]
fn join_fills_missing_side_with_intermediate_names() -> Result<()> {
	let left = "\
tiny	2	0	obf	intm
c	A	X
";
	let right = "\
tiny	2	0	intm	named
c	X	Named
c	Y	Other
	f	I	fy	fnamed
";

	let left = weft::tiny_v2::read(left.as_bytes())?;
	let right = weft::tiny_v2::read(right.as_bytes())?;

	let joined = left.join(&right, "intm", false)?;

	// the class unique to the right side keeps its intermediate name in
	// the left columns
	let expected = "\
tiny	2	0	obf	intm	named
c	A	X	Named
c	Y	Y	Other
	f	I	fy	fy	fnamed
";
	assert_eq!(weft::tiny_v2::write_string(&joined)?, expected);

	Ok(())
}

#[test]
fn join_requiring_matches_reports_missing_classes() -> Result<()> {
	let left = "\
tiny	2	0	obf	intm
c	A	X
c	B	Lonely
";
	let right = "\
tiny	2	0	intm	named
c	X	Named
";

	let left = weft::tiny_v2::read(left.as_bytes())?;
	let right = weft::tiny_v2::read(right.as_bytes())?;

	let error = left.join(&right, "intm", true).unwrap_err();
	assert!(format!("{error:#}").contains("Lonely"), "error should name the unmatched class: {error:#}");

	// the very same join goes through without the match requirement
	assert!(left.join(&right, "intm", false).is_ok());

	Ok(())
}

#[test]
fn join_concatenates_comments_and_drops_parameters() -> Result<()> {
	let left = "\
tiny	2	0	obf	intm
c	A	X
	c	left class comment
	m	()V	m	x
	c	left method comment
		p	1	pa	px
";
	let right = "\
tiny	2	0	intm	named
c	X	Named
	c	right class comment
	m	()V	x	meth
	c	right method comment
";

	let left = weft::tiny_v2::read(left.as_bytes())?;
	let right = weft::tiny_v2::read(right.as_bytes())?;

	let joined = left.join(&right, "intm", false)?;

	let class = joined.classes.values().next().unwrap();
	assert_eq!(class.comments, ["left class comment", "right class comment"]);

	let method = class.methods.values().next().unwrap();
	assert_eq!(method.comments, ["left method comment", "right method comment"]);
	assert!(method.parameters.is_empty());
	assert!(method.variables.is_empty());

	Ok(())
}

#[test]
fn join_all_folds_left() -> Result<()> {
	let a = "\
tiny	2	0	obf	intm
c	A	X
";
	let b = "\
tiny	2	0	intm	named
c	X	Named
";
	let c = "\
tiny	2	0	intm	other
c	X	Again
";

	let list = vec![
		weft::tiny_v2::read(a.as_bytes())?,
		weft::tiny_v2::read(b.as_bytes())?,
		weft::tiny_v2::read(c.as_bytes())?,
	];

	// the second fold moves the shared namespace back into the middle
	let joined = join_all(&list, "intm", false)?;
	joined.info.namespaces.check_that(&["obf", "named", "intm", "other"])?;

	let class = joined.classes.values().next().unwrap();
	let names: Vec<Option<&str>> = class.names.names().iter()
		.map(|name| name.as_ref().map(|name| name.as_str()))
		.collect();
	assert_eq!(names, [Some("A"), Some("Named"), Some("X"), Some("Again")]);

	assert!(join_all(&[], "intm", false).is_err());

	Ok(())
}
