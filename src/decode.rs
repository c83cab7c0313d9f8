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

//! The schema-directed binary decoder, including schema resolution: data
//! written under the writer's schema is read through the reader's schema,
//! with field projection, numeric promotion and default materialization.

use crate::AvroResult;
use crate::cursor::Cursor;
use crate::error::Details;
use crate::logical::Options;
use crate::resolution::{match_schemas, promote_value, read_default_value};
use crate::schema::{
    NamesRef, NamespaceRef, PrimitiveKind, RecordSchema, ResolvedSchema, Schema, UnionSchema,
    deref_schema,
};
use crate::types::Value;

/// Reads values written under a writer's schema, optionally through a
/// different reader's schema.
///
/// Without a reader schema, values are decoded exactly as written. With one,
/// every node is resolved against the writer's: record fields are matched by
/// name, fields unknown to the reader are skipped, reader fields absent from
/// the writer are filled from their defaults, numeric primitives widen to
/// the reader's kind, and enum symbols are translated.
pub struct DatumReader<'s> {
    writers_schema: &'s Schema,
    readers_schema: Option<&'s Schema>,
    writer_names: NamesRef<'s>,
    reader_names: NamesRef<'s>,
    options: Options,
}

impl<'s> DatumReader<'s> {
    pub fn new(writers_schema: &'s Schema) -> AvroResult<Self> {
        Self::with_options(writers_schema, None, Options::new())
    }

    pub fn with_reader_schema(
        writers_schema: &'s Schema,
        readers_schema: &'s Schema,
    ) -> AvroResult<Self> {
        Self::with_options(writers_schema, Some(readers_schema), Options::new())
    }

    pub fn with_options(
        writers_schema: &'s Schema,
        readers_schema: Option<&'s Schema>,
        options: Options,
    ) -> AvroResult<Self> {
        let writer_names = ResolvedSchema::try_from(writers_schema)?.into_names();
        let reader_names =
            ResolvedSchema::try_from(readers_schema.unwrap_or(writers_schema))?.into_names();
        Ok(Self {
            writers_schema,
            readers_schema,
            writer_names,
            reader_names,
            options,
        })
    }

    pub fn writers_schema(&self) -> &'s Schema {
        self.writers_schema
    }

    pub fn readers_schema(&self) -> &'s Schema {
        self.readers_schema.unwrap_or(self.writers_schema)
    }

    /// Decodes one datum from the cursor.
    pub fn read(&self, cursor: &mut Cursor<'_>) -> AvroResult<Value> {
        let reader = self.readers_schema();
        let value = self.read_data(
            self.writers_schema,
            reader,
            self.writers_schema.namespace().as_deref(),
            reader.namespace().as_deref(),
            cursor,
        )?;
        if !cursor.is_valid() {
            return Err(Details::CursorOverrun {
                pos: cursor.pos(),
                len: cursor.len(),
            }
            .into());
        }
        Ok(value)
    }

    fn read_data(
        &self,
        w: &Schema,
        r: &Schema,
        w_namespace: NamespaceRef<'_>,
        r_namespace: NamespaceRef<'_>,
        cursor: &mut Cursor<'_>,
    ) -> AvroResult<Value> {
        let w = deref_schema(w, &self.writer_names, w_namespace)?;
        let r = deref_schema(r, &self.reader_names, r_namespace)?;

        if !match_schemas(w, r) {
            return Err(self.incompatible(w, r));
        }

        if let Schema::Union(w_union) = w {
            return self.read_union(w_union, r, w_namespace, r_namespace, cursor);
        }

        // the writer is not a union; a reader union reads through its first
        // branch that matches the writer
        let r = if let Schema::Union(r_union) = r {
            r_union
                .variants()
                .iter()
                .find(|branch| {
                    deref_schema(branch, &self.reader_names, r_namespace)
                        .is_ok_and(|branch| match_schemas(w, branch))
                })
                .ok_or_else(|| self.incompatible(w, r))?
        } else {
            r
        };
        let r = deref_schema(r, &self.reader_names, r_namespace)?;

        let value = self.read_raw(w, r, w_namespace, r_namespace, cursor)?;

        if let Some(logical_type) = r.logical_type()
            && let Some(handler) = self.options.logical_type(logical_type)
            && handler.validate_before_from_value(&value, r, &self.options)
        {
            return handler.from_value(value, r);
        }
        Ok(value)
    }

    fn read_raw(
        &self,
        w: &Schema,
        r: &Schema,
        w_namespace: NamespaceRef<'_>,
        r_namespace: NamespaceRef<'_>,
        cursor: &mut Cursor<'_>,
    ) -> AvroResult<Value> {
        match w {
            Schema::Primitive(w_primitive) => {
                let value = match w_primitive.kind {
                    PrimitiveKind::Null => Value::Null,
                    PrimitiveKind::Boolean => Value::Boolean(cursor.read_boolean()),
                    PrimitiveKind::Int => Value::Int(cursor.read_long() as i32),
                    PrimitiveKind::Long => Value::Long(cursor.read_long()),
                    PrimitiveKind::Float => Value::Float(cursor.read_float()),
                    PrimitiveKind::Double => Value::Double(cursor.read_double()),
                    PrimitiveKind::Bytes => Value::Bytes(cursor.read_bytes()),
                    PrimitiveKind::String => Value::String(cursor.read_string()),
                };
                match r {
                    Schema::Primitive(r_primitive) => Ok(promote_value(value, r_primitive.kind)),
                    _ => Ok(value),
                }
            }
            Schema::Fixed(w_fixed) => Ok(Value::Bytes(cursor.read_fixed(w_fixed.size))),
            Schema::Enum(w_enum) => {
                let index = cursor.read_long();
                let symbol = usize::try_from(index)
                    .ok()
                    .and_then(|index| w_enum.symbols.get(index))
                    .ok_or(Details::GetEnumValue {
                        index,
                        nsymbols: w_enum.symbols.len(),
                    })?;
                if let Schema::Enum(r_enum) = r
                    && !r_enum.symbols.contains(symbol)
                {
                    return Err(Details::EnumSymbolNotInReader {
                        symbol: symbol.clone(),
                        symbols: r_enum.symbols.clone(),
                    }
                    .into());
                }
                Ok(Value::String(symbol.clone()))
            }
            Schema::Array(w_array) => {
                let Schema::Array(r_array) = r else {
                    return Err(self.incompatible(w, r));
                };
                let mut items = Vec::new();
                while let Some(count) = self.next_block_count(cursor)? {
                    for _ in 0..count {
                        if !cursor.is_valid() {
                            break;
                        }
                        items.push(self.read_data(
                            &w_array.items,
                            &r_array.items,
                            w_namespace,
                            r_namespace,
                            cursor,
                        )?);
                    }
                }
                Ok(Value::Array(items))
            }
            Schema::Map(w_map) => {
                let Schema::Map(r_map) = r else {
                    return Err(self.incompatible(w, r));
                };
                let mut items = std::collections::HashMap::new();
                while let Some(count) = self.next_block_count(cursor)? {
                    for _ in 0..count {
                        if !cursor.is_valid() {
                            break;
                        }
                        let key = cursor.read_string();
                        let value = self.read_data(
                            &w_map.values,
                            &r_map.values,
                            w_namespace,
                            r_namespace,
                            cursor,
                        )?;
                        items.insert(key, value);
                    }
                }
                Ok(Value::Map(items))
            }
            Schema::Record(w_record) => {
                let Schema::Record(r_record) = r else {
                    return Err(self.incompatible(w, r));
                };
                self.read_record(w_record, r_record, w_namespace, r_namespace, cursor)
            }
            // writer unions are handled before dispatch, and references were
            // resolved on entry
            Schema::Union(_) | Schema::Ref { .. } => Err(self.incompatible(w, r)),
        }
    }

    fn read_union(
        &self,
        w_union: &UnionSchema,
        r: &Schema,
        w_namespace: NamespaceRef<'_>,
        r_namespace: NamespaceRef<'_>,
        cursor: &mut Cursor<'_>,
    ) -> AvroResult<Value> {
        let index = cursor.read_long();
        let branch = usize::try_from(index)
            .ok()
            .and_then(|index| w_union.variants().get(index))
            .ok_or(Details::GetUnionVariant {
                index,
                num_variants: w_union.variants().len(),
            })?;
        self.read_data(branch, r, w_namespace, r_namespace, cursor)
    }

    /// Decodes a record datum: writer fields in writer order, read when the
    /// reader knows them and skipped otherwise, then reader-side defaults
    /// for whatever the writer never wrote.
    fn read_record(
        &self,
        w_record: &RecordSchema,
        r_record: &RecordSchema,
        w_namespace: NamespaceRef<'_>,
        r_namespace: NamespaceRef<'_>,
        cursor: &mut Cursor<'_>,
    ) -> AvroResult<Value> {
        let w_namespace = w_record.name.fully_qualified_name(w_namespace).namespace;
        let r_namespace = r_record.name.fully_qualified_name(r_namespace).namespace;

        let mut fields: Vec<(String, Value)> = Vec::with_capacity(r_record.fields.len());
        for w_field in &w_record.fields {
            match r_record.field(&w_field.name) {
                Some(r_field) => {
                    let value = self.read_data(
                        &w_field.schema,
                        &r_field.schema,
                        w_namespace.as_deref(),
                        r_namespace.as_deref(),
                        cursor,
                    )?;
                    fields.push((w_field.name.clone(), value));
                }
                None => {
                    self.skip_data(&w_field.schema, w_namespace.as_deref(), cursor)?;
                }
            }
        }

        for r_field in &r_record.fields {
            if fields.iter().any(|(name, _)| name == &r_field.name) {
                continue;
            }
            match &r_field.default {
                Some(json) => {
                    let value = read_default_value(
                        &r_field.schema,
                        json,
                        &self.reader_names,
                        r_namespace.as_deref(),
                    )?;
                    fields.push((r_field.name.clone(), value));
                }
                None => {
                    return Err(Details::MissingFieldDefault {
                        field: r_field.name.clone(),
                        record: r_record.name.fullname(None),
                    }
                    .into());
                }
            }
        }
        Ok(Value::Record(fields))
    }

    /// Advances the cursor over one value of the writer's schema without
    /// materializing it.
    fn skip_data(
        &self,
        w: &Schema,
        w_namespace: NamespaceRef<'_>,
        cursor: &mut Cursor<'_>,
    ) -> AvroResult<()> {
        let w = deref_schema(w, &self.writer_names, w_namespace)?;
        match w {
            Schema::Primitive(inner) => {
                match inner.kind {
                    PrimitiveKind::Null => {}
                    PrimitiveKind::Boolean => cursor.skip_boolean(),
                    PrimitiveKind::Int | PrimitiveKind::Long => cursor.skip_long(),
                    PrimitiveKind::Float => cursor.skip_float(),
                    PrimitiveKind::Double => cursor.skip_double(),
                    PrimitiveKind::Bytes => cursor.skip_bytes(),
                    PrimitiveKind::String => cursor.skip_string(),
                }
                Ok(())
            }
            Schema::Fixed(inner) => {
                cursor.skip_fixed(inner.size);
                Ok(())
            }
            Schema::Enum(_) => {
                cursor.skip_long();
                Ok(())
            }
            Schema::Array(inner) => {
                self.skip_blocks(cursor, |cursor| {
                    self.skip_data(&inner.items, w_namespace, cursor)
                })
            }
            Schema::Map(inner) => self.skip_blocks(cursor, |cursor| {
                cursor.skip_string();
                self.skip_data(&inner.values, w_namespace, cursor)
            }),
            Schema::Union(inner) => {
                let index = cursor.read_long();
                let branch = usize::try_from(index)
                    .ok()
                    .and_then(|index| inner.variants().get(index))
                    .ok_or(Details::GetUnionVariant {
                        index,
                        num_variants: inner.variants().len(),
                    })?;
                self.skip_data(branch, w_namespace, cursor)
            }
            Schema::Record(inner) => {
                let record_namespace = inner.name.fully_qualified_name(w_namespace).namespace;
                for field in &inner.fields {
                    self.skip_data(&field.schema, record_namespace.as_deref(), cursor)?;
                }
                Ok(())
            }
            Schema::Ref { name } => Err(Details::UnknownSchemaRef(name.clone()).into()),
        }
    }

    /// Skips the blocks of an array or map. A negative block count carries
    /// the block's byte size, which lets the whole block be jumped over
    /// without walking the items.
    fn skip_blocks(
        &self,
        cursor: &mut Cursor<'_>,
        mut skip_item: impl FnMut(&mut Cursor<'_>) -> AvroResult<()>,
    ) -> AvroResult<()> {
        loop {
            let count = cursor.read_long();
            if count == 0 {
                return Ok(());
            }
            if count < 0 {
                let byte_size = self.block_byte_size(cursor)?;
                cursor.skip_fixed(byte_size);
                continue;
            }
            for _ in 0..count {
                if !cursor.is_valid() {
                    return Ok(());
                }
                skip_item(cursor)?;
            }
        }
    }

    /// Reads the count of the next array/map block. `None` is the zero-count
    /// terminator. A negative count's absolute value is the item count and
    /// the block byte size that follows it is read and dropped, since this
    /// decoder walks the items either way.
    fn next_block_count(&self, cursor: &mut Cursor<'_>) -> AvroResult<Option<u64>> {
        if !cursor.is_valid() {
            return Ok(None);
        }
        let count = cursor.read_long();
        match count {
            0 => Ok(None),
            negative if negative < 0 => {
                self.block_byte_size(cursor)?;
                Ok(Some(negative.unsigned_abs()))
            }
            positive => Ok(Some(positive as u64)),
        }
    }

    fn block_byte_size(&self, cursor: &mut Cursor<'_>) -> AvroResult<usize> {
        let size = cursor.read_long();
        usize::try_from(size).map_err(|_| Details::BlockByteSize(size).into())
    }

    fn incompatible(&self, w: &Schema, r: &Schema) -> crate::Error {
        Details::SchemaIncompatible {
            writer: w.to_string(),
            reader: r.to_string(),
        }
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Schema;
    use crate::encode::DatumWriter;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn roundtrip(schema: &Schema, value: &Value) -> AvroResult<Value> {
        let mut buffer = DatumWriter::new(schema)?.to_vec(value)?;
        let reader = DatumReader::new(schema)?;
        reader.read(&mut Cursor::new(&mut buffer))
    }

    #[test]
    fn decodes_the_reference_int() -> TestResult {
        let mut buffer = vec![0xa4, 0x13];
        let schema = Schema::int();
        let reader = DatumReader::new(&schema)?;
        assert_eq!(reader.read(&mut Cursor::new(&mut buffer))?, Value::Int(1234));
        Ok(())
    }

    #[test]
    fn primitive_roundtrips() -> TestResult {
        for (schema, value) in [
            (Schema::null(), Value::Null),
            (Schema::boolean(), Value::Boolean(true)),
            (Schema::int(), Value::Int(-8193)),
            (Schema::long(), Value::Long(i64::MAX)),
            (Schema::float(), Value::Float(3.5)),
            (Schema::double(), Value::Double(-1.25)),
            (Schema::bytes(), Value::Bytes(vec![1, 2, 3])),
            (Schema::string(), Value::String("héllo".into())),
        ] {
            assert_eq!(roundtrip(&schema, &value)?, value, "{schema}");
        }
        Ok(())
    }

    #[test]
    fn truncated_input_is_an_encoding_error() -> TestResult {
        let schema = Schema::string();
        // length prefix of 6, only one payload byte
        let mut buffer = vec![0x0c, b'f'];
        let reader = DatumReader::new(&schema)?;
        let err = reader.read(&mut Cursor::new(&mut buffer)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Encoding);
        Ok(())
    }

    #[test]
    fn enum_index_out_of_bounds_is_a_resolution_error() -> TestResult {
        let schema = Schema::parse_str(
            r#"{"type": "enum", "name": "Suit", "symbols": ["H", "S"]}"#,
        )?;
        // index 2 == number of symbols
        let mut buffer = vec![0x04];
        let reader = DatumReader::new(&schema)?;
        let err = reader.read(&mut Cursor::new(&mut buffer)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaResolution);
        Ok(())
    }

    #[test]
    fn union_branch_out_of_bounds_is_a_resolution_error() -> TestResult {
        let schema = Schema::union(vec![Schema::null(), Schema::int()])?;
        let mut buffer = vec![0x08];
        let reader = DatumReader::new(&schema)?;
        let err = reader.read(&mut Cursor::new(&mut buffer)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaResolution);
        Ok(())
    }

    #[test]
    fn negative_block_counts_carry_a_byte_size() -> TestResult {
        let schema = Schema::array(Schema::int());
        // one block of count -2 (abs 2), byte size 2, items 1 and 2, terminator
        let mut buffer = vec![0x03, 0x04, 0x02, 0x04, 0x00];
        let reader = DatumReader::new(&schema)?;
        assert_eq!(
            reader.read(&mut Cursor::new(&mut buffer))?,
            Value::Array(vec![Value::Int(1), Value::Int(2)])
        );
        Ok(())
    }

    #[test]
    fn map_roundtrip() -> TestResult {
        let schema = Schema::map(Schema::long());
        let value: Value = [("a", 1i64), ("b", 2i64)].into_iter().collect();
        assert_eq!(roundtrip(&schema, &value)?, value);
        Ok(())
    }
}
