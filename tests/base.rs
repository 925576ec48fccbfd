//! Integration tests for blobnav
//!
//! Round trips, byte-order symmetry, skip equivalence, and the
//! boundary behaviors of the compact length tiers.

use std::io::Cursor;

use blobnav::{tag, Array, ByteOrder, DType, Navigator, Value, Writer};

fn encode(value: &Value, order: ByteOrder) -> Vec<u8> {
    let mut writer = Writer::new(Cursor::new(Vec::new()), order);
    writer.write_value(value).unwrap();
    writer.finish().unwrap();
    writer.into_inner().into_inner()
}

fn decode(bytes: Vec<u8>, order: ByteOrder) -> Value {
    let mut nav = Navigator::new(Cursor::new(bytes), order).unwrap();
    nav.read().unwrap()
}

fn round_trip(value: &Value, order: ByteOrder) -> Value {
    decode(encode(value, order), order)
}

fn i32_array(shape: Vec<usize>, values: &[i32]) -> Value {
    let data = values.iter().flat_map(|v| v.to_ne_bytes()).collect();
    Value::Array(Array::new(DType::I32, shape, data))
}

// =============================================================================
// Round trips
// =============================================================================

#[test]
fn roundtrip_primitives() {
    let values = [
        Value::Null,
        Value::Bool(true),
        Value::Bool(false),
        Value::Int(0),
        Value::Int(127),
        Value::Int(-128),
        Value::Int(32_767),
        Value::Int(-32_769),
        Value::Int(i64::MAX),
        Value::Int(i64::MIN),
        Value::UInt(0),
        Value::UInt(255),
        Value::UInt(65_536),
        Value::UInt(u64::MAX),
        Value::F32(-0.25),
        Value::F64(std::f64::consts::PI),
        Value::from("hello 世界"),
        Value::Bytes(vec![0xDE, 0xAD, 0xBE, 0xEF]),
    ];
    for order in [ByteOrder::Big, ByteOrder::Little, ByteOrder::Auto] {
        for value in &values {
            assert_eq!(&round_trip(value, order), value, "order {order:?}");
        }
    }
}

#[test]
fn roundtrip_containers() {
    let value = Value::Dict(vec![
        ("version".into(), Value::Int(1)),
        (
            "stats".into(),
            Value::Dict(vec![
                ("mean".into(), Value::F64(0.5)),
                ("labels".into(), Value::List(vec![
                    Value::from("cat"),
                    Value::from("dog"),
                ])),
            ]),
        ),
        (
            "mixed".into(),
            Value::List(vec![
                Value::Null,
                Value::Bool(false),
                Value::Bytes(vec![1, 2, 3]),
                Value::List(vec![Value::Int(-1)]),
            ]),
        ),
    ]);
    assert_eq!(round_trip(&value, ByteOrder::Big), value);
    assert_eq!(round_trip(&value, ByteOrder::Little), value);
}

#[test]
fn roundtrip_arrays_all_dtypes() {
    for order in [ByteOrder::Big, ByteOrder::Little] {
        for dtype in [
            DType::U8,
            DType::I8,
            DType::U16,
            DType::I16,
            DType::U32,
            DType::I32,
            DType::U64,
            DType::I64,
            DType::F32,
            DType::F64,
        ] {
            let value = Value::Array(Array::new(
                dtype,
                vec![2, 3],
                (0..6 * dtype.size() as u8).collect(),
            ));
            assert_eq!(round_trip(&value, order), value, "dtype {dtype}");
        }
    }
}

#[test]
fn byte_order_changes_encoding_not_value() {
    let value = Value::Int(0x1234);
    let big = encode(&value, ByteOrder::Big);
    let little = encode(&value, ByteOrder::Little);
    assert_ne!(big, little);
    assert_eq!(decode(big, ByteOrder::Big), value);
    assert_eq!(decode(little, ByteOrder::Little), value);
}

// =============================================================================
// Skip equivalence: skip consumes exactly what read consumes
// =============================================================================

#[test]
fn skip_matches_read_for_every_kind() {
    let values = [
        Value::Null,
        Value::Bool(true),
        Value::Int(-300),
        Value::UInt(1 << 40),
        Value::F32(1.0),
        Value::F64(-2.0),
        Value::from("some text"),
        Value::Bytes(vec![0; 300]),
        Value::List(vec![Value::Int(1), Value::from("x"), Value::Null]),
        Value::Dict(vec![("k".into(), Value::List(vec![Value::Bool(true)]))]),
        i32_array(vec![2, 2], &[1, 2, 3, 4]),
    ];
    for value in &values {
        let bytes = encode(value, ByteOrder::Big);
        let total = bytes.len() as u64;

        let mut nav = Navigator::new(Cursor::new(bytes), ByteOrder::Big).unwrap();
        nav.skip().unwrap();
        // Every value encodes to the whole stream here, so a correct
        // skip lands exactly at the end.
        assert_eq!(nav.pos().unwrap(), total, "skip width for {value:?}");
    }
}

// =============================================================================
// Compact length boundaries
// =============================================================================

#[test]
fn length_tier_boundaries_round_trip() {
    for len in [0usize, 1, 9, 255, 256, 65_535, 65_536] {
        let value = Value::from("x".repeat(len).as_str());
        assert_eq!(round_trip(&value, ByteOrder::Big), value, "len {len}");
        let value = Value::Bytes(vec![7u8; len]);
        assert_eq!(round_trip(&value, ByteOrder::Little), value, "len {len}");
    }
}

#[test]
fn zero_length_values() {
    for value in [
        Value::from(""),
        Value::Bytes(vec![]),
        Value::List(vec![]),
        Value::Dict(vec![]),
    ] {
        assert_eq!(round_trip(&value, ByteOrder::Big), value);
    }
}

#[test]
fn all_singleton_dimensions() {
    let value = i32_array(vec![1, 1, 1], &[42]);
    assert_eq!(round_trip(&value, ByteOrder::Big), value);
}

#[test]
fn zero_sized_axis_round_trips() {
    let value = i32_array(vec![5, 0], &[]);
    assert_eq!(round_trip(&value, ByteOrder::Big), value);
}

// =============================================================================
// Exact wire layout (scenario: {"n": 42})
// =============================================================================

#[test]
fn dict_with_small_int_layout() {
    let value = Value::Dict(vec![("n".into(), Value::Int(42))]);
    let bytes = encode(&value, ByteOrder::Big);
    assert_eq!(
        bytes,
        vec![
            tag::DICT_OPEN,
            tag::STR,
            tag::LEN8,
            1,
            b'n',
            0x02, // i8 element tag
            42,
            tag::DICT_CLOSE,
        ]
    );
    assert_eq!(decode(bytes, ByteOrder::Big), value);
}

// =============================================================================
// Writer strictness
// =============================================================================

#[test]
fn duplicate_keys_accepted_by_default() {
    let value = Value::Dict(vec![
        ("k".into(), Value::Int(1)),
        ("k".into(), Value::Int(2)),
    ]);
    // Lenient: writes fine, last occurrence wins on read.
    let read = round_trip(&value, ByteOrder::Big);
    assert_eq!(read.get("k").and_then(Value::as_int), Some(2));
}

#[test]
fn duplicate_keys_rejected_in_strict_mode() {
    let value = Value::Dict(vec![
        ("k".into(), Value::Int(1)),
        ("k".into(), Value::Int(2)),
    ]);
    let mut writer = Writer::new(Cursor::new(Vec::new()), ByteOrder::Big);
    writer.set_strict_keys(true);
    assert!(matches!(
        writer.write_value(&value),
        Err(blobnav::Error::DuplicateKey(k)) if k == "k"
    ));
}

// =============================================================================
// Malformed input
// =============================================================================

#[test]
fn unknown_tag_byte_is_rejected() {
    let mut nav = Navigator::new(Cursor::new(vec![0x7Fu8]), ByteOrder::Big).unwrap();
    assert!(matches!(
        nav.read(),
        Err(blobnav::Error::UnexpectedTag { tag: 0x7F, offset: 0 })
    ));
}

#[test]
fn truncated_scalar_is_rejected() {
    // i64 tag with only two payload bytes.
    let mut nav = Navigator::new(Cursor::new(vec![0x08, 0, 0]), ByteOrder::Big).unwrap();
    assert!(matches!(nav.read(), Err(blobnav::Error::TruncatedPayload)));
}

#[test]
fn unterminated_list_is_rejected() {
    let mut bytes = encode(
        &Value::List(vec![Value::Int(1), Value::Int(2)]),
        ByteOrder::Big,
    );
    bytes.pop(); // drop the terminator
    let mut nav = Navigator::new(Cursor::new(bytes), ByteOrder::Big).unwrap();
    assert!(nav.read().is_err());
}

#[test]
fn invalid_utf8_string_is_rejected() {
    let bytes = vec![tag::STR, tag::LEN8, 2, 0xFF, 0xFE];
    let mut nav = Navigator::new(Cursor::new(bytes), ByteOrder::Big).unwrap();
    assert!(matches!(nav.read(), Err(blobnav::Error::InvalidUtf8(_))));
}

#[test]
fn unknown_array_element_kind_is_rejected() {
    let bytes = vec![tag::ARRAY, tag::LEN8, 1, tag::LEN8, 2, 0x7E];
    let mut nav = Navigator::new(Cursor::new(bytes), ByteOrder::Big).unwrap();
    assert!(matches!(
        nav.read(),
        Err(blobnav::Error::UnknownElementKind(0x7E))
    ));
}
