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

//! The schema-directed binary encoder.

use crate::cursor::Cursor;
use crate::error::Details;
use crate::logical::Options;
use crate::schema::{
    NamesRef, NamespaceRef, PrimitiveKind, ResolvedSchema, Schema, SchemaKind, deref_schema,
};
use crate::types::{Value, ValueKind};
use crate::validator::validate_internal;
use crate::AvroResult;

/// Writes values under a writer's schema.
///
/// Construction resolves the schema's named references once; the writer can
/// then encode any number of values. Every write validates the value against
/// the schema first and fails with a type error when it does not conform.
///
/// Cursor overflow is not an error here: a write into an undersized buffer
/// leaves the cursor invalid and its position tells the needed size, which
/// is how [`to_vec`](Self::to_vec) sizes its buffer.
pub struct DatumWriter<'s> {
    schema: &'s Schema,
    names: NamesRef<'s>,
    options: Options,
}

impl<'s> DatumWriter<'s> {
    pub fn new(schema: &'s Schema) -> AvroResult<Self> {
        Self::with_options(schema, Options::new())
    }

    pub fn with_options(schema: &'s Schema, options: Options) -> AvroResult<Self> {
        let names = ResolvedSchema::try_from(schema)?.into_names();
        Ok(Self {
            schema,
            names,
            options,
        })
    }

    pub fn schema(&self) -> &'s Schema {
        self.schema
    }

    /// Validates `value` against the writer schema and encodes it onto the
    /// cursor.
    pub fn write(&self, value: &Value, cursor: &mut Cursor<'_>) -> AvroResult<()> {
        let namespace = self.schema.namespace();
        if !validate_internal(
            self.schema,
            value,
            &self.names,
            namespace.as_deref(),
            &self.options,
        ) {
            return Err(Details::Validation {
                value: ValueKind::from(value),
                schema: self.schema.to_string(),
            }
            .into());
        }
        self.write_data(self.schema, value, namespace.as_deref(), cursor)
    }

    /// Encodes `value` into a freshly allocated buffer of exactly the right
    /// size, by writing once for size and once for real.
    pub fn to_vec(&self, value: &Value) -> AvroResult<Vec<u8>> {
        let mut empty: [u8; 0] = [];
        let mut sizer = Cursor::new(&mut empty);
        self.write(value, &mut sizer)?;

        let mut buffer = vec![0u8; sizer.pos()];
        let mut cursor = Cursor::new(&mut buffer);
        self.write(value, &mut cursor)?;
        debug_assert!(cursor.is_valid());
        Ok(buffer)
    }

    /// Encodes a value the validator has already accepted. Dispatches the
    /// logical-type hook, then walks the schema.
    fn write_data(
        &self,
        schema: &Schema,
        value: &Value,
        enclosing_namespace: NamespaceRef<'_>,
        cursor: &mut Cursor<'_>,
    ) -> AvroResult<()> {
        let schema = deref_schema(schema, &self.names, enclosing_namespace)?;

        if let Some(logical_type) = schema.logical_type()
            && let Some(handler) = self.options.logical_type(logical_type)
        {
            let converted = handler.to_value(value, schema)?;
            return self.write_raw(schema, &converted, enclosing_namespace, cursor);
        }
        self.write_raw(schema, value, enclosing_namespace, cursor)
    }

    fn write_raw(
        &self,
        schema: &Schema,
        value: &Value,
        enclosing_namespace: NamespaceRef<'_>,
        cursor: &mut Cursor<'_>,
    ) -> AvroResult<()> {
        match schema {
            Schema::Primitive(inner) => write_primitive(inner.kind, value, cursor),
            Schema::Fixed(inner) => match value {
                Value::Bytes(bytes) if bytes.len() == inner.size => {
                    cursor.write_fixed(bytes);
                    Ok(())
                }
                Value::Bytes(bytes) => Err(Details::CompareFixedSizes {
                    size: inner.size,
                    n: bytes.len(),
                }
                .into()),
                other => Err(mismatch(other, &[SchemaKind::Fixed])),
            },
            Schema::Enum(inner) => match value {
                Value::String(symbol) => {
                    match inner.symbols.iter().position(|s| s == symbol) {
                        Some(index) => {
                            cursor.write_long(index as i64);
                            Ok(())
                        }
                        None => Err(Details::GetEnumSymbol(symbol.clone()).into()),
                    }
                }
                other => Err(mismatch(other, &[SchemaKind::Enum])),
            },
            Schema::Array(inner) => match value {
                Value::Array(items) => {
                    if !items.is_empty() {
                        cursor.write_long(items.len() as i64);
                        for item in items {
                            self.write_data(&inner.items, item, enclosing_namespace, cursor)?;
                        }
                    }
                    cursor.write_long(0);
                    Ok(())
                }
                other => Err(mismatch(other, &[SchemaKind::Array])),
            },
            Schema::Map(inner) => match value {
                Value::Map(items) => {
                    if !items.is_empty() {
                        cursor.write_long(items.len() as i64);
                        for (key, item) in items {
                            cursor.write_string(key);
                            self.write_data(&inner.values, item, enclosing_namespace, cursor)?;
                        }
                    }
                    cursor.write_long(0);
                    Ok(())
                }
                other => Err(mismatch(other, &[SchemaKind::Map])),
            },
            Schema::Union(inner) => {
                // the first branch the value validates against wins
                let index = inner.variants().iter().position(|branch| {
                    validate_internal(
                        branch,
                        value,
                        &self.names,
                        enclosing_namespace,
                        &self.options,
                    )
                });
                match index {
                    Some(index) => {
                        cursor.write_long(index as i64);
                        self.write_data(
                            &inner.variants()[index],
                            value,
                            enclosing_namespace,
                            cursor,
                        )
                    }
                    None => Err(Details::NoUnionBranch {
                        value: ValueKind::from(value),
                        union: schema.to_string(),
                    }
                    .into()),
                }
            }
            Schema::Record(inner) => match value {
                Value::Record(_) | Value::Map(_) => {
                    let record_namespace = inner
                        .name
                        .fully_qualified_name(enclosing_namespace)
                        .namespace;
                    for field in &inner.fields {
                        let field_value = value.field(&field.name).unwrap_or(&Value::Null);
                        self.write_data(
                            &field.schema,
                            field_value,
                            record_namespace.as_deref(),
                            cursor,
                        )?;
                    }
                    Ok(())
                }
                other => Err(mismatch(other, &[SchemaKind::Record])),
            },
            Schema::Ref { .. } => self.write_data(schema, value, enclosing_namespace, cursor),
        }
    }
}

fn write_primitive(kind: PrimitiveKind, value: &Value, cursor: &mut Cursor<'_>) -> AvroResult<()> {
    match (kind, value) {
        (PrimitiveKind::Null, Value::Null) => Ok(()),
        (PrimitiveKind::Boolean, Value::Boolean(b)) => {
            cursor.write_boolean(*b);
            Ok(())
        }
        (PrimitiveKind::Int, Value::Int(n)) => {
            cursor.write_long(i64::from(*n));
            Ok(())
        }
        (PrimitiveKind::Int, Value::Long(n)) if i32::try_from(*n).is_ok() => {
            cursor.write_long(*n);
            Ok(())
        }
        (PrimitiveKind::Long, Value::Int(n)) => {
            cursor.write_long(i64::from(*n));
            Ok(())
        }
        (PrimitiveKind::Long, Value::Long(n)) => {
            cursor.write_long(*n);
            Ok(())
        }
        (PrimitiveKind::Float, Value::Int(n)) => {
            cursor.write_float(*n as f32);
            Ok(())
        }
        (PrimitiveKind::Float, Value::Long(n)) => {
            cursor.write_float(*n as f32);
            Ok(())
        }
        (PrimitiveKind::Float, Value::Float(x)) => {
            cursor.write_float(*x);
            Ok(())
        }
        (PrimitiveKind::Double, Value::Int(n)) => {
            cursor.write_double(f64::from(*n));
            Ok(())
        }
        (PrimitiveKind::Double, Value::Long(n)) => {
            cursor.write_double(*n as f64);
            Ok(())
        }
        (PrimitiveKind::Double, Value::Float(x)) => {
            cursor.write_double(f64::from(*x));
            Ok(())
        }
        (PrimitiveKind::Double, Value::Double(x)) => {
            cursor.write_double(*x);
            Ok(())
        }
        (PrimitiveKind::Bytes, Value::Bytes(bytes)) => {
            cursor.write_bytes(bytes);
            Ok(())
        }
        (PrimitiveKind::String, Value::String(s)) => {
            cursor.write_string(s);
            Ok(())
        }
        (kind, other) => Err(mismatch(other, &[kind.into()])),
    }
}

fn mismatch(value: &Value, supported: &[SchemaKind]) -> crate::Error {
    Details::EncodeValueAsSchemaError {
        value_kind: ValueKind::from(value),
        supported_schema: supported.to_vec(),
    }
    .into()
}
