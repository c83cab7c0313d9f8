// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Reading data through a reader schema that differs from the writer's.

use avro_datum::{Cursor, DatumReader, DatumWriter, ErrorKind, Schema, Value};
use pretty_assertions::assert_eq;

type TestResult = Result<(), Box<dyn std::error::Error>>;

const LONG_RECORD: &str = r#"{
    "type": "record",
    "name": "Test",
    "fields": [
        {"name": "A", "type": "int"},
        {"name": "B", "type": "int"},
        {"name": "C", "type": "int"},
        {"name": "D", "type": "int"},
        {"name": "E", "type": "int"},
        {"name": "F", "type": "int"},
        {"name": "G", "type": "int"}
    ]
}"#;

fn long_record_value() -> Value {
    Value::Record(
        ["A", "B", "C", "D", "E", "F", "G"]
            .iter()
            .zip(1..)
            .map(|(name, n)| (name.to_string(), Value::Int(n)))
            .collect(),
    )
}

fn write_then_read(
    writer_schema: &Schema,
    reader_schema: &Schema,
    value: &Value,
) -> avro_datum::AvroResult<Value> {
    let mut buffer = DatumWriter::new(writer_schema)?.to_vec(value)?;
    let reader = DatumReader::with_reader_schema(writer_schema, reader_schema)?;
    reader.read(&mut Cursor::new(&mut buffer))
}

#[test]
fn int_promotes_to_double() -> TestResult {
    let writer_schema = Schema::parse_str(r#""int""#)?;
    let buffer = DatumWriter::new(&writer_schema)?.to_vec(&Value::Int(219))?;
    assert_eq!(buffer, [0xb6, 0x03]);

    let reader_schema = Schema::parse_str(r#""double""#)?;
    assert_eq!(
        write_then_read(&writer_schema, &reader_schema, &Value::Int(219))?,
        Value::Double(219.0)
    );
    Ok(())
}

#[test]
fn all_numeric_promotions() -> TestResult {
    for (writer_raw, reader_raw, value, expected) in [
        (r#""int""#, r#""long""#, Value::Int(7), Value::Long(7)),
        (r#""int""#, r#""float""#, Value::Int(7), Value::Float(7.0)),
        (r#""long""#, r#""float""#, Value::Long(7), Value::Float(7.0)),
        (r#""long""#, r#""double""#, Value::Long(7), Value::Double(7.0)),
        (
            r#""float""#,
            r#""double""#,
            Value::Float(0.5),
            Value::Double(0.5),
        ),
    ] {
        let writer_schema = Schema::parse_str(writer_raw)?;
        let reader_schema = Schema::parse_str(reader_raw)?;
        assert_eq!(
            write_then_read(&writer_schema, &reader_schema, &value)?,
            expected
        );
    }
    Ok(())
}

#[test]
fn demotion_is_incompatible() -> TestResult {
    let writer_schema = Schema::parse_str(r#""double""#)?;
    let reader_schema = Schema::parse_str(r#""int""#)?;
    let err = write_then_read(&writer_schema, &reader_schema, &Value::Double(1.0)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SchemaResolution);
    Ok(())
}

#[test]
fn record_projection_keeps_only_reader_fields() -> TestResult {
    let writer_schema = Schema::parse_str(LONG_RECORD)?;
    let reader_schema = Schema::parse_str(
        r#"{
            "type": "record",
            "name": "Test",
            "fields": [
                {"name": "E", "type": "int"},
                {"name": "F", "type": "int"}
            ]
        }"#,
    )?;
    assert_eq!(
        write_then_read(&writer_schema, &reader_schema, &long_record_value())?,
        Value::Record(vec![("E".into(), Value::Int(5)), ("F".into(), Value::Int(6))])
    );
    Ok(())
}

#[test]
fn reader_fields_absent_from_writer_get_defaults() -> TestResult {
    let writer_schema = Schema::parse_str(LONG_RECORD)?;
    let reader_schema = Schema::parse_str(
        r#"{
            "type": "record",
            "name": "Test",
            "fields": [{"name": "H", "type": "int", "default": 0}]
        }"#,
    )?;
    assert_eq!(
        write_then_read(&writer_schema, &reader_schema, &long_record_value())?,
        Value::Record(vec![("H".into(), Value::Int(0))])
    );
    Ok(())
}

#[test]
fn missing_default_is_a_resolution_error() -> TestResult {
    let writer_schema = Schema::parse_str(LONG_RECORD)?;
    let reader_schema = Schema::parse_str(
        r#"{
            "type": "record",
            "name": "Test",
            "fields": [{"name": "H", "type": "int"}]
        }"#,
    )?;
    let err =
        write_then_read(&writer_schema, &reader_schema, &long_record_value()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SchemaResolution);
    Ok(())
}

#[test]
fn defaults_of_every_shape() -> TestResult {
    let writer_schema = Schema::parse_str(
        r#"{"type": "record", "name": "Test", "fields": [{"name": "keep", "type": "int"}]}"#,
    )?;
    let reader_schema = Schema::parse_str(
        r#"{
            "type": "record",
            "name": "Test",
            "fields": [
                {"name": "keep", "type": "int"},
                {"name": "flag", "type": "boolean", "default": true},
                {"name": "note", "type": "string", "default": "n/a"},
                {"name": "raw", "type": "bytes", "default": "ÿ "},
                {"name": "pi", "type": "double", "default": 3.5},
                {"name": "tags", "type": {"type": "array", "items": "string"}, "default": ["a"]},
                {"name": "scores", "type": {"type": "map", "values": "long"}, "default": {"x": 9}},
                {"name": "opt", "type": ["null", "long"], "default": null}
            ]
        }"#,
    )?;
    let value = Value::Record(vec![("keep".into(), Value::Int(1))]);
    let decoded = write_then_read(&writer_schema, &reader_schema, &value)?;
    let Value::Record(fields) = decoded else {
        panic!("expected a record");
    };
    let get = |name: &str| {
        fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.clone())
            .expect(name)
    };
    assert_eq!(get("keep"), Value::Int(1));
    assert_eq!(get("flag"), Value::Boolean(true));
    assert_eq!(get("note"), Value::String("n/a".into()));
    assert_eq!(get("raw"), Value::Bytes(vec![0xff, 0x20]));
    assert_eq!(get("pi"), Value::Double(3.5));
    assert_eq!(get("tags"), Value::Array(vec![Value::String("a".into())]));
    assert_eq!(get("scores"), [("x", 9i64)].into_iter().collect::<Value>());
    assert_eq!(get("opt"), Value::Null);
    Ok(())
}

#[test]
fn enum_symbols_translate_by_name() -> TestResult {
    let writer_schema = Schema::parse_str(
        r#"{"type": "enum", "name": "Suit", "symbols": ["HEARTS", "SPADES", "CLUBS"]}"#,
    )?;
    let reader_schema = Schema::parse_str(
        r#"{"type": "enum", "name": "Suit", "symbols": ["SPADES", "HEARTS"]}"#,
    )?;
    assert_eq!(
        write_then_read(
            &writer_schema,
            &reader_schema,
            &Value::String("SPADES".into())
        )?,
        Value::String("SPADES".into())
    );

    // CLUBS is unknown to the reader
    let err = write_then_read(
        &writer_schema,
        &reader_schema,
        &Value::String("CLUBS".into()),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SchemaResolution);
    Ok(())
}

#[test]
fn reader_union_picks_the_matching_branch() -> TestResult {
    let writer_schema = Schema::parse_str(r#""int""#)?;
    let reader_schema = Schema::parse_str(r#"["null", "long"]"#)?;
    // int promotes into the reader's long branch
    assert_eq!(
        write_then_read(&writer_schema, &reader_schema, &Value::Int(3))?,
        Value::Long(3)
    );
    Ok(())
}

#[test]
fn writer_union_reads_into_plain_reader() -> TestResult {
    let writer_schema = Schema::parse_str(r#"["null", "string"]"#)?;
    let reader_schema = Schema::parse_str(r#""string""#)?;
    assert_eq!(
        write_then_read(
            &writer_schema,
            &reader_schema,
            &Value::String("hi".into())
        )?,
        Value::String("hi".into())
    );

    // the null branch has no counterpart in the reader
    let err = write_then_read(&writer_schema, &reader_schema, &Value::Null).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SchemaResolution);
    Ok(())
}

#[test]
fn mismatched_named_types_are_incompatible() -> TestResult {
    let writer_schema =
        Schema::parse_str(r#"{"type": "fixed", "name": "A", "size": 2}"#)?;
    let reader_schema =
        Schema::parse_str(r#"{"type": "fixed", "name": "B", "size": 2}"#)?;
    let err = write_then_read(
        &writer_schema,
        &reader_schema,
        &Value::Bytes(vec![1, 2]),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SchemaResolution);
    Ok(())
}

#[test]
fn deep_array_mismatch_is_caught_while_reading() -> TestResult {
    // the shallow matchSchemas pass accepts array-of-array on both sides;
    // the recursive descent then rejects int vs string
    let writer_schema = Schema::parse_str(r#"{"type": "array", "items": {"type": "array", "items": "int"}}"#)?;
    let reader_schema =
        Schema::parse_str(r#"{"type": "array", "items": {"type": "array", "items": "string"}}"#)?;
    let value = Value::Array(vec![Value::Array(vec![Value::Int(1)])]);
    let err = write_then_read(&writer_schema, &reader_schema, &value).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SchemaResolution);
    Ok(())
}

#[test]
fn record_field_promotion_applies() -> TestResult {
    let writer_schema = Schema::parse_str(
        r#"{"type": "record", "name": "T", "fields": [{"name": "n", "type": "int"}]}"#,
    )?;
    let reader_schema = Schema::parse_str(
        r#"{"type": "record", "name": "T", "fields": [{"name": "n", "type": "long"}]}"#,
    )?;
    assert_eq!(
        write_then_read(
            &writer_schema,
            &reader_schema,
            &Value::Record(vec![("n".into(), Value::Int(41))])
        )?,
        Value::Record(vec![("n".into(), Value::Long(41))])
    );
    Ok(())
}
