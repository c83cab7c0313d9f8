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

//! Validation of schema names and of values against schemas.
//!
//! [`validate`] performs the structural check that a value conforms to a
//! schema node. It never fails with an error; a value either fits or it does
//! not. The encoder runs it before writing anything and turns a failure into
//! a type error.

use crate::logical::Options;
use crate::schema::{
    NamesRef, NamespaceRef, PrimitiveKind, RecordSchema, ResolvedSchema, Schema, deref_schema,
};
use crate::types::Value;
use crate::{AvroResult, error::Details};
use regex_lite::Regex;
use std::sync::OnceLock;

/// An optionally dotted namespace followed by a name, all parts avoiding
/// dots; a leading dot stands for the empty namespace.
fn schema_name_regex() -> &'static Regex {
    static SCHEMA_NAME_ONCE: OnceLock<Regex> = OnceLock::new();
    SCHEMA_NAME_ONCE.get_or_init(|| {
        Regex::new(
            r"^((?P<namespace>([A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*)?)\.)?(?P<name>[A-Za-z_][A-Za-z0-9_]*)$",
        )
        .expect("Regex is valid")
    })
}

fn namespace_regex() -> &'static Regex {
    static NAMESPACE_ONCE: OnceLock<Regex> = OnceLock::new();
    NAMESPACE_ONCE.get_or_init(|| {
        Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*)?$")
            .expect("Regex is valid")
    })
}

fn simple_name_regex() -> &'static Regex {
    static SIMPLE_NAME_ONCE: OnceLock<Regex> = OnceLock::new();
    SIMPLE_NAME_ONCE
        .get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Regex is valid"))
}

pub(crate) fn validate_schema_name(schema_name: &str) -> AvroResult<()> {
    let regex = schema_name_regex();
    if regex.is_match(schema_name) {
        Ok(())
    } else {
        Err(Details::InvalidSchemaName(schema_name.to_string(), regex.as_str()).into())
    }
}

pub(crate) fn validate_namespace(namespace: &str) -> AvroResult<()> {
    let regex = namespace_regex();
    if regex.is_match(namespace) {
        Ok(())
    } else {
        Err(Details::InvalidNamespace(namespace.to_string(), regex.as_str()).into())
    }
}

pub(crate) fn validate_enum_symbol_name(symbol: &str) -> AvroResult<()> {
    if simple_name_regex().is_match(symbol) {
        Ok(())
    } else {
        Err(Details::EnumSymbolName(symbol.to_string()).into())
    }
}

pub(crate) fn validate_record_field_name(field_name: &str) -> AvroResult<()> {
    if simple_name_regex().is_match(field_name) {
        Ok(())
    } else {
        Err(Details::FieldName(field_name.to_string()).into())
    }
}

/// Structural check that `value` conforms to `schema`.
///
/// When the schema carries a `logicalType` registered in `options`, the
/// handler's `validate_before_to_value` takes over for that node.
pub fn validate(schema: &Schema, value: &Value, options: &Options) -> bool {
    match ResolvedSchema::try_from(schema) {
        Ok(resolved) => validate_internal(
            schema,
            value,
            resolved.get_names(),
            schema.namespace().as_deref(),
            options,
        ),
        Err(_) => false,
    }
}

pub(crate) fn validate_internal(
    schema: &Schema,
    value: &Value,
    names: &NamesRef<'_>,
    enclosing_namespace: NamespaceRef<'_>,
    options: &Options,
) -> bool {
    let Ok(schema) = deref_schema(schema, names, enclosing_namespace) else {
        return false;
    };

    if let Some(logical_type) = schema.logical_type()
        && let Some(handler) = options.logical_type(logical_type)
    {
        return handler.validate_before_to_value(value, schema, options);
    }

    match schema {
        Schema::Primitive(inner) => validate_primitive(inner.kind, value),
        Schema::Fixed(inner) => match value {
            Value::Bytes(bytes) => bytes.len() == inner.size,
            _ => false,
        },
        Schema::Enum(inner) => match value {
            Value::String(symbol) => inner.symbols.contains(symbol),
            _ => false,
        },
        Schema::Array(inner) => match value {
            Value::Array(items) => items.iter().all(|item| {
                validate_internal(&inner.items, item, names, enclosing_namespace, options)
            }),
            _ => false,
        },
        Schema::Map(inner) => match value {
            Value::Map(items) => items.values().all(|item| {
                validate_internal(&inner.values, item, names, enclosing_namespace, options)
            }),
            _ => false,
        },
        Schema::Union(inner) => inner.variants().iter().any(|branch| {
            validate_internal(branch, value, names, enclosing_namespace, options)
        }),
        Schema::Record(inner) => validate_record(inner, value, names, enclosing_namespace, options),
        Schema::Ref { .. } => false,
    }
}

fn validate_primitive(kind: PrimitiveKind, value: &Value) -> bool {
    match kind {
        PrimitiveKind::Null => matches!(value, Value::Null),
        PrimitiveKind::Boolean => matches!(value, Value::Boolean(_)),
        PrimitiveKind::Int => match value {
            Value::Int(_) => true,
            Value::Long(n) => i32::try_from(*n).is_ok(),
            _ => false,
        },
        PrimitiveKind::Long => matches!(value, Value::Int(_) | Value::Long(_)),
        PrimitiveKind::Float => {
            matches!(value, Value::Int(_) | Value::Long(_) | Value::Float(_))
        }
        PrimitiveKind::Double => matches!(
            value,
            Value::Int(_) | Value::Long(_) | Value::Float(_) | Value::Double(_)
        ),
        PrimitiveKind::Bytes => matches!(value, Value::Bytes(_)),
        PrimitiveKind::String => matches!(value, Value::String(_)),
    }
}

/// A record value must provide a conforming value for every declared field
/// (a missing key counts as null) and may not carry extra keys.
fn validate_record(
    record: &RecordSchema,
    value: &Value,
    names: &NamesRef<'_>,
    enclosing_namespace: NamespaceRef<'_>,
    options: &Options,
) -> bool {
    let keys: Vec<&str> = match value {
        Value::Record(fields) => fields.iter().map(|(name, _)| name.as_str()).collect(),
        Value::Map(items) => items.keys().map(String::as_str).collect(),
        _ => return false,
    };
    if keys
        .iter()
        .any(|key| !record.lookup.contains_key(*key))
    {
        return false;
    }

    let record_namespace = record
        .name
        .fully_qualified_name(enclosing_namespace)
        .namespace;
    record.fields.iter().all(|field| {
        let field_value = value.field(&field.name);
        validate_internal(
            &field.schema,
            field_value.unwrap_or(&Value::Null),
            names,
            record_namespace.as_deref(),
            options,
        )
    })
}
