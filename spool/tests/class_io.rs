use anyhow::Result;
use pretty_assertions::assert_eq;
use spool::access::{ACC_PUBLIC, ACC_SUPER};
use spool::class::{Annotation, AttributeInfo, ClassFile, ElementValue, ElementValuePair, ExceptionTableEntry, LocalVariableEntry, MemberInfo};
use spool::pool::{Pool, PoolEntry};

#[test]
fn full_class_round_trip() -> Result<()> {
	let mut pool = Pool::new();

	let this_class = pool.put_class("org/example/Main")?;
	let super_class = pool.put_class("java/lang/Object")?;
	let interface = pool.put_class("java/lang/Runnable")?;
	let catch_type = pool.put_class("java/lang/Exception")?;

	let init_nat = pool.put_name_and_type("<init>", "()V")?;
	let init_ref = pool.add(PoolEntry::MethodRef {
		class_index: super_class,
		name_and_type_index: init_nat,
	})?;
	assert!(init_ref > 0);

	let code_name = pool.put_utf8("Code")?;
	let lvt_name = pool.put_utf8("LocalVariableTable")?;
	let annotations_name = pool.put_utf8("RuntimeVisibleAnnotations")?;
	let other_name = pool.put_utf8("SomethingCustom")?;

	let method_name = pool.put_utf8("run")?;
	let method_desc = pool.put_utf8("()V")?;
	let local_name = pool.put_utf8("this")?;
	let local_desc = pool.put_utf8("Lorg/example/Main;")?;

	let annotation_type = pool.put_utf8("Ljava/lang/Deprecated;")?;
	let since_name = pool.put_utf8("since")?;
	let since_value = pool.put_utf8("9")?;

	let class = ClassFile {
		minor_version: 0,
		major_version: 52,
		pool,
		access_flags: ACC_PUBLIC | ACC_SUPER,
		this_class,
		super_class,
		interfaces: vec![interface],
		fields: vec![],
		methods: vec![MemberInfo {
			access_flags: ACC_PUBLIC,
			name_index: method_name,
			descriptor_index: method_desc,
			attributes: vec![AttributeInfo::Code {
				name_index: code_name,
				max_stack: 1,
				max_locals: 1,
				code: vec![0xb1], // return
				exception_table: vec![ExceptionTableEntry {
					start_pc: 0,
					end_pc: 1,
					handler_pc: 0,
					catch_type,
				}],
				attributes: vec![AttributeInfo::LocalVariableTable {
					name_index: lvt_name,
					entries: vec![LocalVariableEntry {
						start_pc: 0,
						length: 1,
						name_index: local_name,
						descriptor_index: local_desc,
						index: 0,
					}],
				}],
			}],
		}],
		attributes: vec![
			AttributeInfo::Annotations {
				name_index: annotations_name,
				annotations: vec![Annotation {
					type_index: annotation_type,
					element_value_pairs: vec![ElementValuePair {
						name_index: since_name,
						value: ElementValue::Const { tag: b's', value_index: since_value },
					}],
				}],
			},
			AttributeInfo::Other {
				name_index: other_name,
				info: vec![1, 2, 3, 4],
			},
		],
	};

	let bytes = class.to_bytes()?;
	let read_back = ClassFile::parse(&bytes)?;
	assert_eq!(class, read_back);

	let bytes_again = read_back.to_bytes()?;
	assert_eq!(bytes, bytes_again);

	Ok(())
}

#[test]
fn truncated_classes_are_rejected() {
	assert!(ClassFile::parse(&[]).is_err());
	assert!(ClassFile::parse(&[0xCA, 0xFE, 0xBA, 0xBE]).is_err());
	assert!(ClassFile::parse(&[0x00, 0x00, 0xBA, 0xBE, 0, 0, 0, 52]).is_err());
}
