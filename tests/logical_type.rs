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

//! The user-extensible logical type hooks around the codec.

use avro_datum::{
    AvroResult, Cursor, DatumReader, DatumWriter, Error, ErrorKind, LogicalType, Options, Schema,
    Value, validate,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Appends an "H" on the way in, strips the last character on the way out.
struct Hello;

impl LogicalType for Hello {
    fn to_value(&self, datum: &Value, _schema: &Schema) -> AvroResult<Value> {
        match datum {
            Value::String(s) => Ok(Value::String(format!("{s}H"))),
            other => Err(Error::custom(format!("hello wants a string, got {other:?}"))),
        }
    }

    fn from_value(&self, datum: Value, _schema: &Schema) -> AvroResult<Value> {
        match datum {
            Value::String(mut s) => {
                s.pop();
                Ok(Value::String(s))
            }
            other => Err(Error::custom(format!("hello wants a string, got {other:?}"))),
        }
    }

    fn validate_before_to_value(
        &self,
        datum: &Value,
        _schema: &Schema,
        _options: &Options,
    ) -> bool {
        matches!(datum, Value::String(_))
    }
}

fn hello_options() -> Options {
    Options::new().with_logical_type("hello", Arc::new(Hello))
}

const HELLO_SCHEMA: &str = r#"{"type": "string", "logicalType": "hello"}"#;

#[test]
fn to_value_runs_before_encoding() -> TestResult {
    let schema = Schema::parse_str(HELLO_SCHEMA)?;
    let writer = DatumWriter::with_options(&schema, hello_options())?;
    let buffer = writer.to_vec(&Value::String("Hello".into()))?;

    // length-prefixed payload is "HelloH": the byte at payload offset +5 is 'H'
    assert_eq!(buffer[0], 0x0c);
    assert_eq!(&buffer[1..], b"HelloH");
    assert_eq!(buffer[1 + 5], 0x48);
    Ok(())
}

#[test]
fn from_value_runs_after_decoding() -> TestResult {
    let schema = Schema::parse_str(HELLO_SCHEMA)?;
    let writer = DatumWriter::with_options(&schema, hello_options())?;
    let mut buffer = writer.to_vec(&Value::String("Hello".into()))?;

    let with_handler = DatumReader::with_options(&schema, None, hello_options())?;
    assert_eq!(
        with_handler.read(&mut Cursor::new(&mut buffer))?,
        Value::String("Hello".into())
    );

    // without the handler the raw underlying value comes through
    let without_handler = DatumReader::new(&schema)?;
    assert_eq!(
        without_handler.read(&mut Cursor::new(&mut buffer))?,
        Value::String("HelloH".into())
    );
    Ok(())
}

#[test]
fn validate_delegates_to_the_handler() -> TestResult {
    let schema = Schema::parse_str(HELLO_SCHEMA)?;
    let options = hello_options();
    assert!(validate(&schema, &Value::String("x".into()), &options));
    assert!(!validate(&schema, &Value::Int(1), &options));

    // writing a value the handler rejects is a type error
    let writer = DatumWriter::with_options(&schema, options)?;
    let err = writer.to_vec(&Value::Int(1)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
    Ok(())
}

/// A handler whose decode-side guard always refuses, so the raw value must
/// pass through untouched.
struct NeverFromValue;

impl LogicalType for NeverFromValue {
    fn to_value(&self, datum: &Value, _schema: &Schema) -> AvroResult<Value> {
        Ok(datum.clone())
    }

    fn from_value(&self, _datum: Value, _schema: &Schema) -> AvroResult<Value> {
        Err(Error::custom("from_value must not run"))
    }

    fn validate_before_from_value(
        &self,
        _datum: &Value,
        _schema: &Schema,
        _options: &Options,
    ) -> bool {
        false
    }
}

#[test]
fn failed_from_value_guard_passes_the_raw_value_through() -> TestResult {
    let schema = Schema::parse_str(HELLO_SCHEMA)?;
    let options = Options::new().with_logical_type("hello", Arc::new(NeverFromValue));
    let mut buffer = DatumWriter::new(&schema)?.to_vec(&Value::String("raw".into()))?;

    let reader = DatumReader::with_options(&schema, None, options)?;
    assert_eq!(
        reader.read(&mut Cursor::new(&mut buffer))?,
        Value::String("raw".into())
    );
    Ok(())
}

/// A handler that always fails conversion, to prove hook errors propagate.
struct Exploding;

impl LogicalType for Exploding {
    fn to_value(&self, _datum: &Value, _schema: &Schema) -> AvroResult<Value> {
        Err(Error::custom("boom on write"))
    }

    fn from_value(&self, _datum: Value, _schema: &Schema) -> AvroResult<Value> {
        Err(Error::custom("boom on read"))
    }
}

#[test]
fn hook_failures_propagate_with_their_reason() -> TestResult {
    let schema = Schema::parse_str(HELLO_SCHEMA)?;
    let options = Options::new().with_logical_type("hello", Arc::new(Exploding));

    let writer = DatumWriter::with_options(&schema, options.clone())?;
    let err = writer.to_vec(&Value::String("x".into())).unwrap_err();
    assert!(err.to_string().contains("boom on write"));

    let mut buffer = DatumWriter::new(&schema)?.to_vec(&Value::String("x".into()))?;
    let reader = DatumReader::with_options(&schema, None, options)?;
    let err = reader.read(&mut Cursor::new(&mut buffer)).unwrap_err();
    assert!(err.to_string().contains("boom on read"));
    Ok(())
}

#[test]
fn unregistered_logical_types_are_inert() -> TestResult {
    let schema = Schema::parse_str(HELLO_SCHEMA)?;
    let writer = DatumWriter::new(&schema)?;
    let mut buffer = writer.to_vec(&Value::String("plain".into()))?;
    let reader = DatumReader::new(&schema)?;
    assert_eq!(
        reader.read(&mut Cursor::new(&mut buffer))?,
        Value::String("plain".into())
    );
    Ok(())
}
