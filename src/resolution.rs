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

//! Reconciling a writer's schema with a reader's schema: the compatibility
//! check, numeric promotion, and materialization of reader-side defaults.

use crate::error::Details;
use crate::schema::{
    NamesRef, NamespaceRef, PrimitiveKind, RecordVariant, Schema, SchemaKind, deref_schema,
};
use crate::types::Value;
use crate::{AvroResult, Error};
use serde_json::Value as JsonValue;

/// Whether data written with `w` can be read through `r`.
///
/// Unions match anything at this level; branch selection happens while
/// reading. The item/value schemas of arrays and maps are compared by their
/// top-level kind only, the decoder matches them recursively as it descends.
/// Callers resolve named references on both sides before calling.
pub(crate) fn match_schemas(w: &Schema, r: &Schema) -> bool {
    let w_kind = SchemaKind::from(w);
    let r_kind = SchemaKind::from(r);

    if matches!(w_kind, SchemaKind::Union | SchemaKind::ErrorUnion)
        || matches!(r_kind, SchemaKind::Union | SchemaKind::ErrorUnion)
    {
        return true;
    }
    if w_kind.is_primitive() && w_kind == r_kind {
        return true;
    }

    match (w, r) {
        (Schema::Record(w_record), Schema::Record(r_record)) => {
            if w_record.variant == RecordVariant::Request
                && r_record.variant == RecordVariant::Request
            {
                return true;
            }
            w_kind == r_kind
                && w_record.name.fullname(None) == r_record.name.fullname(None)
        }
        (Schema::Fixed(w_fixed), Schema::Fixed(r_fixed)) => {
            w_fixed.name.fullname(None) == r_fixed.name.fullname(None)
                && w_fixed.size == r_fixed.size
        }
        (Schema::Enum(w_enum), Schema::Enum(r_enum)) => {
            w_enum.name.fullname(None) == r_enum.name.fullname(None)
        }
        (Schema::Map(w_map), Schema::Map(r_map)) => {
            shallow_kinds_match(&w_map.values, &r_map.values)
        }
        (Schema::Array(w_array), Schema::Array(r_array)) => {
            shallow_kinds_match(&w_array.items, &r_array.items)
        }
        _ => promotes(w_kind, r_kind),
    }
}

/// The numeric promotions: the reader may widen what the writer wrote.
fn promotes(w_kind: SchemaKind, r_kind: SchemaKind) -> bool {
    matches!(
        (w_kind, r_kind),
        (
            SchemaKind::Int,
            SchemaKind::Long | SchemaKind::Float | SchemaKind::Double
        ) | (SchemaKind::Long, SchemaKind::Float | SchemaKind::Double)
            | (SchemaKind::Float, SchemaKind::Double)
    )
}

/// The shallow top-level comparison of array item / map value schemas. A
/// named reference on either side defers entirely to the recursive match
/// during reading.
fn shallow_kinds_match(w: &Schema, r: &Schema) -> bool {
    let w_kind = SchemaKind::from(w);
    let r_kind = SchemaKind::from(r);
    w_kind == SchemaKind::Ref || r_kind == SchemaKind::Ref || w_kind == r_kind
}

/// Widens a value decoded at the writer's width to the reader's kind.
pub(crate) fn promote_value(value: Value, reader_kind: PrimitiveKind) -> Value {
    match (value, reader_kind) {
        (Value::Int(n), PrimitiveKind::Long) => Value::Long(i64::from(n)),
        (Value::Int(n), PrimitiveKind::Float) => Value::Float(n as f32),
        (Value::Int(n), PrimitiveKind::Double) => Value::Double(f64::from(n)),
        (Value::Long(n), PrimitiveKind::Float) => Value::Float(n as f32),
        (Value::Long(n), PrimitiveKind::Double) => Value::Double(n as f64),
        (Value::Float(x), PrimitiveKind::Double) => Value::Double(f64::from(x)),
        (value, _) => value,
    }
}

/// Materializes a host value from the JSON default literal of a reader
/// field, according to Avro's rules: `bytes` and `fixed` defaults decode
/// from a Latin-1-interpreted JSON string, a union default belongs to the
/// union's first branch, and record defaults substitute field-level defaults
/// for omitted keys.
pub(crate) fn read_default_value(
    schema: &Schema,
    json: &JsonValue,
    names: &NamesRef<'_>,
    enclosing_namespace: NamespaceRef<'_>,
) -> AvroResult<Value> {
    let schema = deref_schema(schema, names, enclosing_namespace)?;
    let mismatch = || -> Error {
        Details::DefaultValueForType {
            json: json.clone(),
            kind: SchemaKind::from(schema),
        }
        .into()
    };

    match schema {
        Schema::Primitive(inner) => match inner.kind {
            PrimitiveKind::Null => Ok(Value::Null),
            PrimitiveKind::Boolean => json.as_bool().map(Value::Boolean).ok_or_else(mismatch),
            PrimitiveKind::Int => json
                .as_i64()
                .and_then(|n| i32::try_from(n).ok())
                .map(Value::Int)
                .ok_or_else(mismatch),
            PrimitiveKind::Long => json.as_i64().map(Value::Long).ok_or_else(mismatch),
            PrimitiveKind::Float => json
                .as_f64()
                .map(|x| Value::Float(x as f32))
                .ok_or_else(mismatch),
            PrimitiveKind::Double => json.as_f64().map(Value::Double).ok_or_else(mismatch),
            PrimitiveKind::Bytes => json
                .as_str()
                .map(|s| Value::Bytes(latin1_bytes(s)))
                .ok_or_else(mismatch),
            PrimitiveKind::String => json
                .as_str()
                .map(|s| Value::String(s.to_owned()))
                .ok_or_else(mismatch),
        },
        Schema::Fixed(_) => json
            .as_str()
            .map(|s| Value::Bytes(latin1_bytes(s)))
            .ok_or_else(mismatch),
        Schema::Enum(inner) => match json.as_str() {
            Some(symbol) if inner.symbols.iter().any(|s| s == symbol) => {
                Ok(Value::String(symbol.to_owned()))
            }
            _ => Err(mismatch()),
        },
        Schema::Array(inner) => match json.as_array() {
            Some(items) => items
                .iter()
                .map(|item| {
                    read_default_value(&inner.items, item, names, enclosing_namespace)
                })
                .collect::<Result<_, _>>()
                .map(Value::Array),
            None => Err(mismatch()),
        },
        Schema::Map(inner) => match json.as_object() {
            Some(items) => items
                .iter()
                .map(|(key, item)| {
                    read_default_value(&inner.values, item, names, enclosing_namespace)
                        .map(|value| (key.clone(), value))
                })
                .collect::<Result<_, _>>()
                .map(Value::Map),
            None => Err(mismatch()),
        },
        Schema::Union(inner) => match inner.variants().first() {
            Some(first) => read_default_value(first, json, names, enclosing_namespace),
            None => Err(mismatch()),
        },
        Schema::Record(inner) => match json.as_object() {
            Some(object) => {
                let record_namespace = inner
                    .name
                    .fully_qualified_name(enclosing_namespace)
                    .namespace;
                let mut fields = Vec::with_capacity(inner.fields.len());
                for field in &inner.fields {
                    let field_json = object.get(&field.name).or(field.default.as_ref()).ok_or(
                        Details::MissingFieldDefault {
                            field: field.name.clone(),
                            record: inner.name.fullname(None),
                        },
                    )?;
                    let value = read_default_value(
                        &field.schema,
                        field_json,
                        names,
                        record_namespace.as_deref(),
                    )?;
                    fields.push((field.name.clone(), value));
                }
                Ok(Value::Record(fields))
            }
            None => Err(mismatch()),
        },
        Schema::Ref { .. } => Err(mismatch()),
    }
}

/// One byte per JSON string code point, as Avro's `bytes` defaults are
/// written.
fn latin1_bytes(s: &str) -> Vec<u8> {
    s.chars().map(|c| c as u32 as u8).collect()
}
