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

//! Errors produced while parsing schemas, validating values and running the
//! binary codec.

use crate::{
    schema::{Name, SchemaKind},
    types::ValueKind,
};
use std::fmt;

/// Errors encountered by Avro.
///
/// To inspect the details of the error use [`details`](Self::details) or
/// [`into_details`](Self::into_details) to get a [`Details`] which contains
/// more precise error information. [`kind`](Self::kind) classifies the error
/// into one of the domain-level [`ErrorKind`]s.
#[derive(thiserror::Error, Debug)]
#[repr(transparent)]
#[error(transparent)]
pub struct Error {
    details: Box<Details>,
}

impl Error {
    pub fn new(details: Details) -> Self {
        Self {
            details: Box::new(details),
        }
    }

    /// An error with a caller-provided message, e.g. from a failing
    /// logical-type hook.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Self::new(Details::Custom(msg.to_string()))
    }

    pub fn details(&self) -> &Details {
        &self.details
    }

    pub fn into_details(self) -> Details {
        *self.details
    }

    pub fn kind(&self) -> ErrorKind {
        self.details.kind()
    }
}

impl From<Details> for Error {
    fn from(details: Details) -> Self {
        Self::new(details)
    }
}

/// The domain-level classification of an [`Error`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
pub enum ErrorKind {
    /// Malformed JSON text or a structurally invalid schema.
    Parse,
    /// A name collides with a reserved type or an existing binding, or a
    /// reference points at a name that was never defined.
    Name,
    /// A value does not conform to the schema it is being written with.
    Type,
    /// The writer and reader schemas cannot be reconciled.
    SchemaResolution,
    /// An unrecoverable cursor condition.
    Encoding,
}

#[derive(thiserror::Error, Debug)]
pub enum Details {
    // -- schema parsing -------------------------------------------------
    #[error("Failed to parse schema from JSON {input:?}: {source}")]
    ParseSchemaJson {
        #[source]
        source: serde_json::Error,
        input: String,
    },

    #[error("A JSON schema must be a string, an object or an array")]
    ParseSchemaFromValidJson,

    #[error("No `type` field found in schema")]
    GetTypeField,

    #[error("Unusable `type` in schema: {0}")]
    GetComplexType(serde_json::Value),

    #[error("`logicalType` must be a string, got: {0}")]
    GetLogicalTypeFieldType(serde_json::Value),

    #[error(
        "`request` is only meaningful inside a protocol message and cannot be parsed as a schema"
    )]
    TopLevelRequest,

    #[error("No `name` field in schema")]
    GetNameField,

    #[error("Invalid schema name {0}. It must match the regex {1}")]
    InvalidSchemaName(String, &'static str),

    #[error("Invalid namespace {0}. It must match the regex {1}")]
    InvalidNamespace(String, &'static str),

    #[error("No `fields` array in record schema")]
    GetRecordFieldsJson,

    #[error("No `name` in record field")]
    GetNameFieldFromRecord,

    #[error("No `type` in record field")]
    GetRecordFieldTypeField,

    #[error("Invalid record field name: {0}")]
    FieldName(String),

    #[error("Duplicate field name: {0}")]
    FieldNameDuplicate(String),

    #[error("Invalid field `order`: {0}")]
    ParseFieldOrder(serde_json::Value),

    #[error("No `symbols` array in enum schema")]
    GetEnumSymbolsField,

    #[error("Unable to parse `symbols` as an array of strings")]
    GetEnumSymbols,

    #[error("Invalid enum symbol name: {0}")]
    EnumSymbolName(String),

    #[error("Duplicate enum symbol: {0}")]
    EnumSymbolDuplicate(String),

    #[error("No `items` in array schema")]
    GetArrayItemsField,

    #[error("No `values` in map schema")]
    GetMapValuesField,

    #[error("No `declared` array in error_union schema")]
    GetErrorUnionDeclared,

    #[error("No `size` in fixed schema")]
    GetFixedSizeField,

    #[error("`size` must be a non-negative integer, got: {0}")]
    GetFixedSizeFieldPositive(serde_json::Value),

    #[error("Unions may not directly contain a union")]
    GetNestedUnion,

    #[error("Unions cannot contain duplicate non-named types")]
    GetUnionDuplicate,

    // -- names ----------------------------------------------------------
    #[error("Type name neither names a primitive nor a previously defined schema: {0}")]
    UnknownType(String),

    #[error("Schemas may not be named after a reserved type: {0}")]
    ReservedTypeName(String),

    #[error("Two schemas with the same fullname were defined: {0}")]
    AmbiguousSchemaDefinition(Name),

    #[error("Reference to a schema that was never defined: {0}")]
    UnknownSchemaRef(Name),

    // -- writing --------------------------------------------------------
    #[error("Value of kind {value} does not validate against writer schema {schema}")]
    Validation { value: ValueKind, schema: String },

    #[error(
        "Cannot encode value of kind {value_kind} with any of the schema kinds {supported_schema:?}"
    )]
    EncodeValueAsSchemaError {
        value_kind: ValueKind,
        supported_schema: Vec<SchemaKind>,
    },

    #[error("No union branch matched a value of kind {value} in {union}")]
    NoUnionBranch { value: ValueKind, union: String },

    #[error("Enum symbol not found: {0}")]
    GetEnumSymbol(String),

    #[error("Fixed size mismatch, expected: {size}, got: {n}")]
    CompareFixedSizes { size: usize, n: usize },

    #[error("{0}")]
    Custom(String),

    // -- schema resolution ----------------------------------------------
    #[error("Writer schema {writer} cannot be read with reader schema {reader}")]
    SchemaIncompatible { writer: String, reader: String },

    #[error("Enum index {index} is out of bounds for the writer's {nsymbols} symbols")]
    GetEnumValue { index: i64, nsymbols: usize },

    #[error("Enum symbol {symbol} is not among the reader's symbols {symbols:?}")]
    EnumSymbolNotInReader {
        symbol: String,
        symbols: Vec<String>,
    },

    #[error("Union index {index} out of bounds: {num_variants}")]
    GetUnionVariant { index: i64, num_variants: usize },

    #[error(
        "Reader field {field} of record {record} is missing from the writer and declares no default"
    )]
    MissingFieldDefault { field: String, record: String },

    #[error("Default value {json} cannot be materialized for a {kind} schema")]
    DefaultValueForType {
        json: serde_json::Value,
        kind: SchemaKind,
    },

    // -- cursor ----------------------------------------------------------
    #[error("Cursor overran its buffer (position {pos}, buffer length {len})")]
    CursorOverrun { pos: usize, len: usize },

    #[error("Invalid block byte size: {0}")]
    BlockByteSize(i64),
}

impl Details {
    pub fn kind(&self) -> ErrorKind {
        use Details::*;
        match self {
            ParseSchemaJson { .. }
            | ParseSchemaFromValidJson
            | GetTypeField
            | GetComplexType(_)
            | GetLogicalTypeFieldType(_)
            | TopLevelRequest
            | GetNameField
            | InvalidSchemaName(..)
            | InvalidNamespace(..)
            | GetRecordFieldsJson
            | GetNameFieldFromRecord
            | GetRecordFieldTypeField
            | FieldName(_)
            | FieldNameDuplicate(_)
            | ParseFieldOrder(_)
            | GetEnumSymbolsField
            | GetEnumSymbols
            | EnumSymbolName(_)
            | EnumSymbolDuplicate(_)
            | GetArrayItemsField
            | GetMapValuesField
            | GetErrorUnionDeclared
            | GetFixedSizeField
            | GetFixedSizeFieldPositive(_)
            | GetNestedUnion
            | GetUnionDuplicate => ErrorKind::Parse,

            UnknownType(_)
            | ReservedTypeName(_)
            | AmbiguousSchemaDefinition(_)
            | UnknownSchemaRef(_) => ErrorKind::Name,

            Validation { .. }
            | EncodeValueAsSchemaError { .. }
            | NoUnionBranch { .. }
            | GetEnumSymbol(_)
            | CompareFixedSizes { .. }
            | Custom(_) => ErrorKind::Type,

            SchemaIncompatible { .. }
            | GetEnumValue { .. }
            | EnumSymbolNotInReader { .. }
            | GetUnionVariant { .. }
            | MissingFieldDefault { .. }
            | DefaultValueForType { .. } => ErrorKind::SchemaResolution,

            CursorOverrun { .. } | BlockByteSize(_) => ErrorKind::Encoding,
        }
    }
}
