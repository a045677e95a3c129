use anyhow::Result;
use pretty_assertions::assert_eq;
use spool::class::ClassFile;
use spool::name::ClassName;
use spool::pool::Pool;
use weft::inheritance::{LoaderInheritance, SuperClassMap};
use weft::remapper::{MemberRemapper, TypeRemapper};

fn names(names: &[&str]) -> Vec<ClassName> {
	names.iter().copied().map(ClassName::from).collect()
}

#[test]
fn members_resolve_through_the_hierarchy() -> Result<()> {
	let input = "\
tiny	2	0	obf	named
c	A	A_
c	B	B_
	f	I	fb	fb_
	m	()V	m	fromB
c	I	I_
	m	()V	m	fromI
";
	let mappings = weft::tiny_v2::read(input.as_bytes())?;

	let mut hierarchy = SuperClassMap::new();
	hierarchy.super_classes.insert(ClassName::from("A"), names(&["B", "I"]));

	let from = mappings.get_namespace("obf")?;
	let to = mappings.get_namespace("named")?;
	let remapper = mappings.member_remapper(from, to, &hierarchy)?;

	// the superclass declares it, so its mapping applies to the subclass
	assert_eq!(remapper.map_method_name("A", "m", "()V")?, "fromB");
	assert_eq!(remapper.map_field_name("A", "fb")?, "fb_");

	// both B and the interface define it, the superclass wins
	assert_eq!(remapper.map_method_name("B", "m", "()V")?, "fromB");
	assert_eq!(remapper.map_method_name("I", "m", "()V")?, "fromI");

	// misses keep their names
	assert_eq!(remapper.map_field_name("A", "unknown")?, "unknown");
	assert_eq!(remapper.map_method_name("Elsewhere", "m", "()V")?, "m");

	// constructors and class initializers never change
	assert_eq!(remapper.map_method_name("A", "<init>", "()V")?, "<init>");
	assert_eq!(remapper.map_method_name("A", "<clinit>", "()V")?, "<clinit>");

	Ok(())
}

#[test]
fn descriptors_compose_when_the_source_is_not_the_first_namespace() -> Result<()> {
	let input = "\
tiny	2	0	obf	intm	named
c	a	X	Named
	m	(La;)V	m	x	meth
";
	let mappings = weft::tiny_v2::read(input.as_bytes())?;

	let hierarchy = SuperClassMap::new();
	let from = mappings.get_namespace("intm")?;
	let to = mappings.get_namespace("named")?;
	let remapper = mappings.member_remapper(from, to, &hierarchy)?;

	// the stored descriptor `(La;)V` only matches after being composed
	// into the source namespace
	assert_eq!(remapper.map_method_name("X", "x", "(LX;)V")?, "meth");
	assert_eq!(remapper.map_method_name("X", "x", "(La;)V")?, "x");

	assert_eq!(remapper.map_class("X")?, "Named");
	assert_eq!(remapper.map_method_desc("(LX;)V")?, "(LNamed;)V");
	assert_eq!(remapper.map_desc("[LX;")?, "[LNamed;");
	assert_eq!(remapper.map_class_any("[[LX;")?, "[[LNamed;");

	Ok(())
}

#[test]
fn reversing_swaps_the_namespaces() -> Result<()> {
	let input = "\
tiny	2	0	obf	named
c	a	Foo
	m	(La;)V	m	hello
";
	let mappings = weft::tiny_v2::read(input.as_bytes())?;

	let hierarchy = SuperClassMap::new();
	let from = mappings.get_namespace("obf")?;
	let to = mappings.get_namespace("named")?;
	let remapper = mappings.member_remapper(from, to, &hierarchy)?;
	let reversed = remapper.reverse()?;

	assert_eq!(remapper.map_class("a")?, "Foo");
	assert_eq!(reversed.map_class("Foo")?, "a");
	assert_eq!(reversed.map_method_name("Foo", "hello", "(LFoo;)V")?, "m");

	Ok(())
}

#[test]
fn hierarchy_comes_from_class_bytes_on_demand() -> Result<()> {
	let mut pool = Pool::new();
	let this_class = pool.put_class("A")?;
	let super_class = pool.put_class("B")?;
	let class_a = ClassFile {
		minor_version: 0,
		major_version: 52,
		pool,
		access_flags: spool::access::ACC_SUPER,
		this_class,
		super_class,
		interfaces: vec![],
		fields: vec![],
		methods: vec![],
		attributes: vec![],
	};
	let bytes = class_a.to_bytes()?;

	let loader = move |name: &str| -> Result<Option<Vec<u8>>> {
		Ok((name == "A").then(|| bytes.clone()))
	};
	let hierarchy = LoaderInheritance::new(loader);

	let input = "\
tiny	2	0	obf	named
c	A	A2
c	B	B2
	f	I	f	g
";
	let mappings = weft::tiny_v2::read(input.as_bytes())?;
	let from = mappings.get_namespace("obf")?;
	let to = mappings.get_namespace("named")?;
	let remapper = mappings.member_remapper(from, to, &hierarchy)?;

	// B declares the field, found by loading A's header
	assert_eq!(remapper.map_field_name("A", "f")?, "g");
	// a second lookup answers from the memoized table
	assert_eq!(remapper.map_field_name("A", "f")?, "g");

	Ok(())
}
