//! Integration tests for the accessor math: scaling, bitfield
//! read-modify-write, enum mapping, arrays, and endianness.

use msgschema::loader::{document_from_str, LoadedDocument};
use msgschema::{
    compile_documents, AccessError, Accessor, CompileOptions, CompiledSet, Endianness, FieldValue,
};
use std::path::PathBuf;

fn compile(source: &str) -> CompiledSet {
    let document = document_from_str(source).expect("parse");
    let docs = vec![LoadedDocument {
        document,
        namespace: Vec::new(),
        path: PathBuf::from("test.yaml"),
        is_header: false,
    }];
    compile_documents(&docs, &CompileOptions::default()).expect("compile")
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

const SCALED: &str = r#"
Messages:
  - Name: Telemetry
    ID: 1
    Fields:
      - Name: Voltage
        Type: uint16
        Scale: 2.7
        Offset: 1.828
        Units: mV
"#;

#[test]
fn scaled_get_applies_affine_map() {
    let set = compile(SCALED);
    let msg = set.message("test.Telemetry").expect("message");
    let acc = Accessor::new(msg, Endianness::Big);

    let buf = [0u8, 0];
    match acc.get(&buf, "Voltage").expect("get") {
        FieldValue::Float(x) => assert!(close(x, 1.828), "got {x}"),
        other => panic!("unexpected value: {other:?}"),
    }

    let buf = [0u8, 100];
    let x = acc.get(&buf, "Voltage").expect("get").as_f64().expect("f64");
    assert!(close(x, 100.0 * 2.7 + 1.828), "got {x}");
}

#[test]
fn scaled_set_inverts_to_raw_storage() {
    let set = compile(SCALED);
    let msg = set.message("test.Telemetry").expect("message");
    let acc = Accessor::new(msg, Endianness::Big);

    let mut buf = [0xAAu8, 0xAA];
    acc.set(&mut buf, "Voltage", FieldValue::Float(1.828)).expect("set");
    assert_eq!(buf, [0, 0]);

    acc.set(&mut buf, "Voltage", FieldValue::Float(100.0 * 2.7 + 1.828))
        .expect("set");
    assert_eq!(buf, [0, 100]);
}

#[test]
fn scaled_domain_covers_native_range() {
    let set = compile(SCALED);
    let field = &set.message("test.Telemetry").expect("message").fields[0];
    assert!(close(field.domain.min, 1.828));
    assert!(close(field.domain.max, 65535.0 * 2.7 + 1.828));
}

#[test]
fn signed_round_trip() {
    let set = compile(
        r#"
Messages:
  - Name: Delta
    ID: 2
    Fields:
      - Name: Error
        Type: int16
"#,
    );
    let msg = set.message("test.Delta").expect("message");
    let acc = Accessor::new(msg, Endianness::Big);
    let mut buf = [0u8; 2];
    acc.set(&mut buf, "Error", FieldValue::Signed(-123)).expect("set");
    assert_eq!(acc.get(&buf, "Error").expect("get"), FieldValue::Signed(-123));
}

const FLAGS: &str = r#"
Messages:
  - Name: Flags
    ID: 3
    Fields:
      - Name: Status
        Type: uint8
        Bitfields:
          - Name: Mode
            NumBits: 4
          - Name: Armed
            NumBits: 3
          - Name: Fault
            NumBits: 1
"#;

#[test]
fn bitfield_write_preserves_neighbors() {
    let set = compile(FLAGS);
    let msg = set.message("test.Flags").expect("message");
    let acc = Accessor::new(msg, Endianness::Big);

    let mut buf = [0xFFu8];
    acc.set(&mut buf, "Mode", FieldValue::Unsigned(5)).expect("set");
    assert_eq!(buf, [0xF5]);
    assert_eq!(acc.get(&buf, "Mode").expect("get"), FieldValue::Unsigned(5));
    assert_eq!(acc.get(&buf, "Armed").expect("get"), FieldValue::Unsigned(7));
    assert_eq!(acc.get(&buf, "Fault").expect("get"), FieldValue::Unsigned(1));

    acc.set(&mut buf, "Fault", FieldValue::Unsigned(0)).expect("set");
    assert_eq!(buf, [0x75]);
}

#[test]
fn bitfield_domain_is_unsigned() {
    let set = compile(FLAGS);
    let field = &set.message("test.Flags").expect("message").fields[0];
    let mode = &field.bitfields[0];
    assert_eq!(mode.domain.min, 0.0);
    assert_eq!(mode.domain.max, 15.0);
}

const COLORED: &str = r#"
Enums:
  - Name: Color
    Options:
      - Name: Red
        Value: 5
      - Name: Green
        Value: 6
Messages:
  - Name: Paint
    ID: 4
    Fields:
      - Name: Hue
        Type: uint8
        Enum: Color
"#;

#[test]
fn enum_value_maps_to_option_name() {
    let set = compile(COLORED);
    let msg = set.message("test.Paint").expect("message");
    let acc = Accessor::new(msg, Endianness::Big);
    let buf = [5u8];
    assert_eq!(
        acc.get(&buf, "Hue").expect("get"),
        FieldValue::Symbol("Red".to_string())
    );
}

#[test]
fn unmapped_enum_value_falls_back_to_numeric() {
    let set = compile(COLORED);
    let msg = set.message("test.Paint").expect("message");
    let acc = Accessor::new(msg, Endianness::Big);
    let buf = [9u8];
    assert_eq!(acc.get(&buf, "Hue").expect("get"), FieldValue::Unsigned(9));
}

#[test]
fn enum_symbol_writes_its_value() {
    let set = compile(COLORED);
    let msg = set.message("test.Paint").expect("message");
    let acc = Accessor::new(msg, Endianness::Big);
    let mut buf = [0u8];
    acc.set(&mut buf, "Hue", FieldValue::Symbol("Green".to_string()))
        .expect("set");
    assert_eq!(buf, [6]);

    let err = acc
        .set(&mut buf, "Hue", FieldValue::Symbol("Chartreuse".to_string()))
        .unwrap_err();
    assert!(matches!(err, AccessError::BadToken(t) if t == "Chartreuse"));
}

const ARRAYED: &str = r#"
Messages:
  - Name: Samples
    ID: 5
    Fields:
      - Name: Raw
        Type: uint16
        Count: 3
"#;

#[test]
fn array_elements_are_independently_addressable() {
    let set = compile(ARRAYED);
    let msg = set.message("test.Samples").expect("message");
    let acc = Accessor::new(msg, Endianness::Little);
    let mut buf = [0u8; 6];
    acc.set_at(&mut buf, "Raw", 2, FieldValue::Unsigned(0xBEEF))
        .expect("set");
    assert_eq!(buf, [0, 0, 0, 0, 0xEF, 0xBE]);
    assert_eq!(
        acc.get_at(&buf, "Raw", 2).expect("get"),
        FieldValue::Unsigned(0xBEEF)
    );
    assert_eq!(acc.get_at(&buf, "Raw", 0).expect("get"), FieldValue::Unsigned(0));
}

#[test]
fn out_of_range_index_is_an_error() {
    let set = compile(ARRAYED);
    let msg = set.message("test.Samples").expect("message");
    let acc = Accessor::new(msg, Endianness::Little);
    let buf = [0u8; 6];
    let err = acc.get_at(&buf, "Raw", 3).unwrap_err();
    assert!(matches!(
        err,
        AccessError::IndexOutOfRange { index: 3, count: 3, .. }
    ));
}

#[test]
fn short_buffer_is_an_error() {
    let set = compile(ARRAYED);
    let msg = set.message("test.Samples").expect("message");
    let acc = Accessor::new(msg, Endianness::Little);
    let buf = [0u8; 4];
    let err = acc.get_at(&buf, "Raw", 2).unwrap_err();
    assert!(matches!(err, AccessError::BufferTooSmall { need: 6, have: 4 }));
}

#[test]
fn unknown_field_is_an_error() {
    let set = compile(ARRAYED);
    let msg = set.message("test.Samples").expect("message");
    let acc = Accessor::new(msg, Endianness::Big);
    let buf = [0u8; 6];
    let err = acc.get(&buf, "Cooked").unwrap_err();
    assert!(matches!(err, AccessError::UnknownField(n) if n == "Cooked"));
}

#[test]
fn endianness_controls_byte_order() {
    let set = compile(
        r#"
Messages:
  - Name: Word
    ID: 6
    Fields:
      - Name: Value
        Type: uint32
"#,
    );
    let msg = set.message("test.Word").expect("message");

    let mut buf = [0u8; 4];
    Accessor::new(msg, Endianness::Big)
        .set(&mut buf, "Value", FieldValue::Unsigned(0xDEADBEEF))
        .expect("set");
    assert_eq!(buf, [0xDE, 0xAD, 0xBE, 0xEF]);

    Accessor::new(msg, Endianness::Little)
        .set(&mut buf, "Value", FieldValue::Unsigned(0xDEADBEEF))
        .expect("set");
    assert_eq!(buf, [0xEF, 0xBE, 0xAD, 0xDE]);
}

#[test]
fn float_round_trip() {
    let set = compile(
        r#"
Messages:
  - Name: Reading
    ID: 7
    Fields:
      - Name: Temp
        Type: float32
"#,
    );
    let msg = set.message("test.Reading").expect("message");
    let acc = Accessor::new(msg, Endianness::Big);
    let mut buf = [0u8; 4];
    acc.set(&mut buf, "Temp", FieldValue::Float(1.5)).expect("set");
    assert_eq!(acc.get(&buf, "Temp").expect("get"), FieldValue::Float(1.5));
}
