//! Navigator and sequential-writer scenarios: keyed lookup, indexed
//! access, slicing, sequential construction, and append mode.

use std::io::Cursor;

use blobnav::{Array, ByteOrder, DType, Navigator, Selector, Value, Writer};

fn encode(value: &Value, order: ByteOrder) -> Vec<u8> {
    let mut writer = Writer::new(Cursor::new(Vec::new()), order);
    writer.write_value(value).unwrap();
    writer.finish().unwrap();
    writer.into_inner().into_inner()
}

fn nav_over(bytes: Vec<u8>, order: ByteOrder) -> Navigator<Cursor<Vec<u8>>> {
    Navigator::new(Cursor::new(bytes), order).unwrap()
}

fn i32_array(shape: Vec<usize>, values: &[i32]) -> Value {
    let data = values.iter().flat_map(|v| v.to_ne_bytes()).collect();
    Value::Array(Array::new(DType::I32, shape, data))
}

// =============================================================================
// Lookup and iteration
// =============================================================================

#[test]
fn bool_list_indexing() {
    let value = Value::List(vec![Value::Bool(true), Value::Bool(false), Value::Null]);
    let mut nav = nav_over(encode(&value, ByteOrder::Big), ByteOrder::Big);
    assert_eq!(nav.read().unwrap(), value);

    nav.rewind().unwrap();
    assert_eq!(
        nav.select(&[Selector::index(1)]).unwrap(),
        Value::Bool(false)
    );
}

#[test]
fn keys_and_len_on_root_dict() {
    let value = Value::Dict(vec![
        ("alpha".into(), Value::Int(1)),
        ("beta".into(), Value::List(vec![Value::Null, Value::Null])),
        ("gamma".into(), Value::from("x")),
    ]);
    let mut nav = nav_over(encode(&value, ByteOrder::Big), ByteOrder::Big);
    assert_eq!(nav.keys().unwrap(), vec!["alpha", "beta", "gamma"]);
    assert_eq!(nav.len().unwrap(), 3);

    // len of a nested list, then of its parent again
    assert_eq!(nav.descend("beta").unwrap().len().unwrap(), 2);
}

#[test]
fn deep_path_through_mixed_containers() {
    let value = Value::Dict(vec![(
        "runs".into(),
        Value::List(vec![
            Value::Dict(vec![("loss".into(), Value::F64(0.9))]),
            Value::Dict(vec![("loss".into(), Value::F64(0.1))]),
        ]),
    )]);
    let bytes = encode(&value, ByteOrder::Little);
    let mut nav = nav_over(bytes, ByteOrder::Little);
    let got = nav
        .select(&[
            Selector::key("runs"),
            Selector::index(-1),
            Selector::key("loss"),
        ])
        .unwrap();
    assert_eq!(got, Value::F64(0.1));
}

#[test]
fn selector_equivalence_with_in_memory_access() {
    let value = Value::Dict(vec![
        (
            "xs".into(),
            Value::List(vec![Value::Int(5), Value::Int(6), Value::Int(7)]),
        ),
        ("flag".into(), Value::Bool(true)),
    ]);
    let bytes = encode(&value, ByteOrder::Big);

    // navigate(write(v), p).read() == apply(p, v)
    let cases: Vec<(Vec<Selector>, &Value)> = vec![
        (vec![Selector::key("flag")], value.get("flag").unwrap()),
        (
            vec![Selector::key("xs"), Selector::index(2)],
            &value.get("xs").unwrap().as_list().unwrap()[2],
        ),
    ];
    for (path, expected) in cases {
        let mut nav = nav_over(bytes.clone(), ByteOrder::Big);
        assert_eq!(&nav.select(&path).unwrap(), expected);
    }
}

// =============================================================================
// Array navigation
// =============================================================================

#[test]
fn array_1d_index_and_slice() {
    // [1, 2, 3, 4] as i32
    let value = i32_array(vec![4], &[1, 2, 3, 4]);
    let bytes = encode(&value, ByteOrder::Big);

    let mut nav = nav_over(bytes.clone(), ByteOrder::Big);
    assert_eq!(nav.select(&[Selector::index(0)]).unwrap(), Value::Int(1));

    let mut nav = nav_over(bytes.clone(), ByteOrder::Big);
    assert_eq!(nav.select(&[Selector::index(-1)]).unwrap(), Value::Int(4));

    let mut nav = nav_over(bytes, ByteOrder::Big);
    let sliced = nav
        .select(&[Selector::slice(Some(1), Some(3), None)])
        .unwrap();
    assert_eq!(sliced, i32_array(vec![2], &[2, 3]));
}

#[test]
fn array_3d_random_access_and_strided_slice() {
    // Shape (1, 2, 3), row-major contents 1..=6.
    let value = i32_array(vec![1, 2, 3], &[1, 2, 3, 4, 5, 6]);
    let bytes = encode(&value, ByteOrder::Big);

    let mut nav = nav_over(bytes.clone(), ByteOrder::Big);
    assert_eq!(
        nav.select(&[Selector::index(0), Selector::index(1), Selector::index(2)])
            .unwrap(),
        Value::Int(6)
    );

    let mut nav = nav_over(bytes, ByteOrder::Big);
    let strided = nav
        .select(&[
            Selector::index(0),
            Selector::index(1),
            Selector::slice(None, None, Some(2)),
        ])
        .unwrap();
    assert_eq!(strided, i32_array(vec![2], &[4, 6]));
}

#[test]
fn array_negative_index_boundaries() {
    let value = i32_array(vec![3], &[10, 20, 30]);
    let bytes = encode(&value, ByteOrder::Big);

    let mut nav = nav_over(bytes.clone(), ByteOrder::Big);
    assert_eq!(nav.select(&[Selector::index(-3)]).unwrap(), Value::Int(10));

    let mut nav = nav_over(bytes, ByteOrder::Big);
    assert!(matches!(
        nav.select(&[Selector::index(-4)]),
        Err(blobnav::Error::IndexOutOfRange { index: -4, len: 3 })
    ));
}

#[test]
fn array_slice_equals_gather_both_orders() {
    let values: Vec<i32> = (0..24).collect();
    let value = i32_array(vec![2, 3, 4], &values);
    // [::-1, 1, 1:4:2] -> axis0 [1,0], axis1 {1}, axis2 [1,3]
    let path = [
        Selector::slice(None, None, Some(-1)),
        Selector::index(1),
        Selector::slice(Some(1), Some(4), Some(2)),
    ];
    let mut expected = Vec::new();
    for i0 in [1usize, 0] {
        for i2 in [1usize, 3] {
            expected.push(values[i0 * 12 + 4 + i2]);
        }
    }
    for order in [ByteOrder::Big, ByteOrder::Little] {
        let mut nav = nav_over(encode(&value, order), order);
        let got = nav.select(&path).unwrap();
        assert_eq!(got, i32_array(vec![2, 2], &expected), "order {order:?}");
    }
}

#[test]
fn list_slice_with_step() {
    let value = Value::List((0..6i64).map(Value::Int).collect());
    let mut nav = nav_over(encode(&value, ByteOrder::Big), ByteOrder::Big);
    let got = nav
        .select(&[Selector::slice(None, None, Some(2))])
        .unwrap();
    assert_eq!(
        got,
        Value::List(vec![Value::Int(0), Value::Int(2), Value::Int(4)])
    );
}

#[test]
fn slice_step_zero_rejected_everywhere() {
    let list = Value::List(vec![Value::Int(1)]);
    let mut nav = nav_over(encode(&list, ByteOrder::Big), ByteOrder::Big);
    assert!(matches!(
        nav.select(&[Selector::slice(None, None, Some(0))]),
        Err(blobnav::Error::InvalidSlice)
    ));

    let arr = i32_array(vec![2], &[1, 2]);
    let mut nav = nav_over(encode(&arr, ByteOrder::Big), ByteOrder::Big);
    assert!(matches!(
        nav.select(&[Selector::slice(None, None, Some(0))]),
        Err(blobnav::Error::InvalidSlice)
    ));
}

// =============================================================================
// Sequential construction
// =============================================================================

#[test]
fn sequential_build_with_live_handles() {
    // Root list; nested list; nested dict filled via `last`; then an
    // element added through the root handle, which closes the rest.
    let mut writer = Writer::new(Cursor::new(Vec::new()), ByteOrder::Big);
    let root = writer.open_list().unwrap();
    let l2 = writer.open_list().unwrap();
    writer.add(l2, &Value::Int(1)).unwrap();
    writer.add(l2, &Value::Int(4)).unwrap();
    let d = writer.open_dict().unwrap();
    writer.key(d, "five").unwrap();
    writer.add(d, &Value::Int(5)).unwrap();
    let tip = writer.last().unwrap();
    assert_eq!(tip, d);
    writer.insert(tip, "six", &Value::Int(6)).unwrap();
    writer.add(root, &Value::Int(7)).unwrap();
    writer.finish().unwrap();

    let bytes = writer.into_inner().into_inner();
    let mut nav = nav_over(bytes, ByteOrder::Big);
    assert_eq!(
        nav.read().unwrap(),
        Value::List(vec![
            Value::List(vec![
                Value::Int(1),
                Value::Int(4),
                Value::Dict(vec![
                    ("five".into(), Value::Int(5)),
                    ("six".into(), Value::Int(6)),
                ]),
            ]),
            Value::Int(7),
        ])
    );
}

#[test]
fn mixed_whole_value_and_sequential_writes() {
    let mut writer = Writer::new(Cursor::new(Vec::new()), ByteOrder::Big);
    let root = writer.open_dict().unwrap();
    writer.insert(root, "a", &Value::Int(5)).unwrap();
    writer.key(root, "list").unwrap();
    let list = writer.open_list().unwrap();
    writer
        .add(list, &Value::List(vec![Value::Int(1), Value::Int(2)]))
        .unwrap();
    writer.add(list, &Value::Int(3)).unwrap();
    writer
        .insert(root, "dict", &Value::Dict(vec![("n".into(), Value::Int(9))]))
        .unwrap();
    writer.finish().unwrap();

    let bytes = writer.into_inner().into_inner();
    let mut nav = nav_over(bytes, ByteOrder::Big);
    assert_eq!(
        nav.read().unwrap(),
        Value::Dict(vec![
            ("a".into(), Value::Int(5)),
            (
                "list".into(),
                Value::List(vec![
                    Value::List(vec![Value::Int(1), Value::Int(2)]),
                    Value::Int(3),
                ])
            ),
            ("dict".into(), Value::Dict(vec![("n".into(), Value::Int(9))])),
        ])
    );
}

#[test]
fn write_array_through_writer() {
    let mut writer = Writer::new(Cursor::new(Vec::new()), ByteOrder::Little);
    let root = writer.open_list().unwrap();
    writer.add(root, &Value::from("header")).unwrap();
    let data: Vec<u8> = [1.0f32, 2.0, 3.0].iter().flat_map(|v| v.to_ne_bytes()).collect();
    writer.write_array(DType::F32, &[3], &data).unwrap();

    // Opening a nested list and adding an array through the root
    // handle closes the nested list first.
    let nested = writer.open_list().unwrap();
    writer.add(nested, &Value::Int(0)).unwrap();
    let small: Vec<u8> = 9u16.to_ne_bytes().to_vec();
    writer.add_array(root, DType::U16, &[1], &small).unwrap();
    writer.finish().unwrap();

    let bytes = writer.into_inner().into_inner();
    let mut nav = nav_over(bytes, ByteOrder::Little);
    let arr = nav.select(&[Selector::index(1)]).unwrap();
    assert_eq!(arr, Value::Array(Array::new(DType::F32, vec![3], data)));

    nav.rewind().unwrap();
    assert_eq!(nav.len().unwrap(), 4);
    nav.rewind().unwrap();
    assert_eq!(
        nav.select(&[Selector::index(3), Selector::index(0)]).unwrap(),
        Value::UInt(9)
    );
}

// =============================================================================
// Append mode
// =============================================================================

#[test]
fn append_neutrality() {
    // write [a, b] then append c == write [a, b, c]
    let mut writer = Writer::new(Cursor::new(Vec::new()), ByteOrder::Big);
    writer
        .write_value(&Value::List(vec![Value::from("a"), Value::from("b")]))
        .unwrap();
    writer.finish().unwrap();
    let first = writer.into_inner().into_inner();

    let mut writer = Writer::append(Cursor::new(first), ByteOrder::Big).unwrap();
    let root = writer.last().unwrap();
    writer.add(root, &Value::from("c")).unwrap();
    writer.finish().unwrap();
    let appended = writer.into_inner().into_inner();

    let direct = encode(
        &Value::List(vec![Value::from("a"), Value::from("b"), Value::from("c")]),
        ByteOrder::Big,
    );
    assert_eq!(appended, direct);
}

#[test]
fn append_after_sequential_build() {
    let mut writer = Writer::new(Cursor::new(Vec::new()), ByteOrder::Big);
    let root = writer.open_list().unwrap();
    let l2 = writer.open_list().unwrap();
    writer.add(l2, &Value::Int(1)).unwrap();
    writer.add(root, &Value::Int(7)).unwrap();
    writer.finish().unwrap();
    let bytes = writer.into_inner().into_inner();

    let mut writer = Writer::append(Cursor::new(bytes), ByteOrder::Big).unwrap();
    let root = writer.last().unwrap();
    writer.add(root, &Value::from("extra")).unwrap();
    writer.finish().unwrap();

    let mut nav = nav_over(writer.into_inner().into_inner(), ByteOrder::Big);
    assert_eq!(
        nav.read().unwrap(),
        Value::List(vec![
            Value::List(vec![Value::Int(1)]),
            Value::Int(7),
            Value::from("extra"),
        ])
    );
}

#[test]
fn append_to_dict_root() {
    let mut writer = Writer::new(Cursor::new(Vec::new()), ByteOrder::Big);
    writer
        .write_value(&Value::Dict(vec![("a".into(), Value::Int(1))]))
        .unwrap();
    writer.finish().unwrap();
    let bytes = writer.into_inner().into_inner();

    let mut writer = Writer::append(Cursor::new(bytes), ByteOrder::Big).unwrap();
    let root = writer.last().unwrap();
    writer.insert(root, "b", &Value::Int(2)).unwrap();
    writer.finish().unwrap();

    let mut nav = nav_over(writer.into_inner().into_inner(), ByteOrder::Big);
    assert_eq!(
        nav.read().unwrap(),
        Value::Dict(vec![
            ("a".into(), Value::Int(1)),
            ("b".into(), Value::Int(2)),
        ])
    );
}

#[test]
fn append_on_disk_with_real_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("values.bin");

    let file = std::fs::File::create(&path).unwrap();
    let mut writer = Writer::new(file, ByteOrder::Big);
    writer
        .write_value(&Value::List(vec![Value::Int(1), Value::Int(2)]))
        .unwrap();
    writer.finish().unwrap();
    drop(writer);

    let file = std::fs::OpenOptions::new()
        .read(true)
        .write(true)
        .open(&path)
        .unwrap();
    let mut writer = Writer::append(file, ByteOrder::Big).unwrap();
    let root = writer.last().unwrap();
    writer.add(root, &Value::Int(3)).unwrap();
    writer.finish().unwrap();
    drop(writer);

    let file = std::fs::File::open(&path).unwrap();
    let mut nav = Navigator::new(file, ByteOrder::Big).unwrap();
    assert_eq!(
        nav.read().unwrap(),
        Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
    );
}

#[test]
fn append_rejects_scalar_root() {
    let bytes = encode(&Value::Int(7), ByteOrder::Big);
    assert!(matches!(
        Writer::append(Cursor::new(bytes), ByteOrder::Big),
        Err(blobnav::Error::RootNotExtensible)
    ));
}

// =============================================================================
// read_debug
// =============================================================================

#[test]
fn read_debug_walks_every_token() {
    let value = Value::Dict(vec![
        ("xs".into(), Value::List(vec![Value::Int(1), Value::Bool(true)])),
        ("blob".into(), Value::Bytes(vec![0xAB; 20])),
    ]);
    let mut nav = nav_over(encode(&value, ByteOrder::Big), ByteOrder::Big);
    let lines: Vec<String> = nav
        .read_debug(blobnav::DebugOptions::default())
        .unwrap()
        .collect::<blobnav::Result<_>>()
        .unwrap();

    // One line per token: {, key, [, 1, true, ], key, blob, }
    assert_eq!(lines.len(), 9);
    assert_eq!(lines.first().unwrap(), "{");
    assert_eq!(lines.last().unwrap(), "}");
    assert!(lines.iter().any(|l| l.contains("bin(20)")));
}
