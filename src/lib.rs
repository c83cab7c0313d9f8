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

//! Schema-directed **[Apache Avro](https://avro.apache.org/)** datum
//! encoding and decoding.
//!
//! This crate parses Avro schemas expressed as JSON, validates that dynamic
//! [`Value`]s conform to a schema, and encodes/decodes values to and from
//! the Avro binary wire format over a caller-supplied buffer [`Cursor`]. It
//! supports *schema resolution* — reading data written under one schema
//! through a possibly different reader's schema — and a user-extensible
//! [`LogicalType`] mechanism.
//!
//! Object container files, RPC protocols and the JSON data encoding are out
//! of scope; this is the datum layer those formats build on.
//!
//! ```
//! use avro_datum::{Cursor, DatumReader, DatumWriter, Schema, Value};
//!
//! # fn main() -> avro_datum::AvroResult<()> {
//! let schema = Schema::parse_str(
//!     r#"{"type": "record", "name": "Test", "fields": [{"name": "f", "type": "long"}]}"#,
//! )?;
//!
//! let writer = DatumWriter::new(&schema)?;
//! let mut buffer = writer.to_vec(&Value::Record(vec![("f".into(), Value::Long(5))]))?;
//! assert_eq!(buffer, [0x0a]);
//!
//! let reader = DatumReader::new(&schema)?;
//! let value = reader.read(&mut Cursor::new(&mut buffer))?;
//! assert_eq!(value, Value::Record(vec![("f".into(), Value::Long(5))]));
//! # Ok(())
//! # }
//! ```

mod cursor;
mod decode;
mod encode;
mod resolution;

pub mod error;
pub mod logical;
pub mod schema;
pub mod types;
pub mod validator;

pub use cursor::Cursor;
pub use decode::DatumReader;
pub use encode::DatumWriter;
pub use error::{Error, ErrorKind};
pub use logical::{LogicalType, Options};
pub use schema::Schema;
pub use types::Value;
pub use validator::validate;

/// A convenience type alias for `Result`s with `Error`s.
pub type AvroResult<T> = Result<T, Error>;
