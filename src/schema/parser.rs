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

use crate::error::Details;
use crate::schema::{
    ArraySchema, EnumSchema, FixedSchema, MapSchema, Name, Names, NamespaceRef, PrimitiveKind,
    PrimitiveSchema, RecordField, RecordSchema, RecordVariant, Schema, UnionSchema,
};
use crate::validator::validate_enum_symbol_name;
use crate::{AvroResult, Error};
use log::{debug, error, warn};
use serde_json::{Map, Value as JsonValue};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Type names a named schema may not take.
const RESERVED_TYPE_NAMES: &[&str] = &[
    "null",
    "boolean",
    "int",
    "long",
    "float",
    "double",
    "bytes",
    "string",
    "record",
    "error",
    "enum",
    "fixed",
    "array",
    "map",
    "union",
    "error_union",
    "request",
];

#[derive(Default)]
pub(crate) struct Parser {
    input_schemas: HashMap<Name, JsonValue>,
    /// Used to resolve cyclic references, i.e. when a
    /// field's type is a reference to its record's type
    resolving_schemas: Names,
    input_order: Vec<Name>,
    /// Used to avoid parsing the same schema twice
    parsed_schemas: Names,
}

impl Parser {
    pub(crate) fn new(input_schemas: HashMap<Name, JsonValue>, input_order: Vec<Name>) -> Self {
        Self {
            input_schemas,
            resolving_schemas: HashMap::default(),
            input_order,
            parsed_schemas: HashMap::default(),
        }
    }

    /// Parse the whole set of input schemas and return them in input order.
    ///
    /// It is allowed that the schemas have cross-dependencies; these will be
    /// resolved during parsing.
    pub(crate) fn parse_list(&mut self) -> AvroResult<Vec<Schema>> {
        while !self.input_schemas.is_empty() {
            let next_name = self
                .input_schemas
                .keys()
                .next()
                .expect("Input schemas unexpectedly empty")
                .to_owned();
            let (name, value) = self
                .input_schemas
                .remove_entry(&next_name)
                .expect("Key unexpectedly missing");
            let parsed = self.parse(&value, None)?;
            if !self.parsed_schemas.contains_key(&name) {
                // An unnamed document cannot be referenced; keep it anyway so
                // the input order below finds it.
                self.parsed_schemas.insert(name, parsed);
            }
        }

        let mut parsed_schemas = Vec::with_capacity(self.input_order.len());
        for name in self.input_order.drain(0..) {
            let parsed = self
                .parsed_schemas
                .get(&name)
                .cloned()
                .expect("One of the input schemas was unexpectedly not parsed");
            parsed_schemas.push(parsed);
        }
        Ok(parsed_schemas)
    }

    /// Create a `Schema` from a `serde_json::Value` representing a JSON Avro
    /// schema.
    pub(crate) fn parse(
        &mut self,
        value: &JsonValue,
        enclosing_namespace: NamespaceRef<'_>,
    ) -> AvroResult<Schema> {
        match *value {
            JsonValue::String(ref t) => self.parse_known_schema(t.as_str(), enclosing_namespace),
            JsonValue::Object(ref data) => self.parse_complex(data, enclosing_namespace),
            JsonValue::Array(ref data) => self.parse_union(data, enclosing_namespace),
            _ => Err(Details::ParseSchemaFromValidJson.into()),
        }
    }

    /// Parse a string as a primitive type or a reference to a previously
    /// defined named schema.
    fn parse_known_schema(
        &mut self,
        name: &str,
        enclosing_namespace: NamespaceRef<'_>,
    ) -> AvroResult<Schema> {
        match PrimitiveKind::from_name(name) {
            Some(kind) => Ok(Schema::Primitive(PrimitiveSchema::new(kind))),
            None => self.fetch_schema_ref(name, enclosing_namespace),
        }
    }

    /// Given a name, tries to retrieve the parsed schema from
    /// `parsed_schemas`, or a currently resolving schema with that name.
    /// When parsing a list of schemas, an unparsed input document with that
    /// name is parsed on demand, so that definitions may depend on each
    /// other.
    fn fetch_schema_ref(
        &mut self,
        name: &str,
        enclosing_namespace: NamespaceRef<'_>,
    ) -> AvroResult<Schema> {
        let fully_qualified_name = Name::new_with_enclosing_namespace(name, enclosing_namespace)?;

        if self.parsed_schemas.contains_key(&fully_qualified_name) {
            return Ok(Schema::Ref {
                name: fully_qualified_name,
            });
        }
        if let Some(resolving_schema) = self.resolving_schemas.get(&fully_qualified_name) {
            return Ok(resolving_schema.clone());
        }

        let value = self
            .input_schemas
            .remove(&fully_qualified_name)
            .ok_or_else(|| Details::UnknownType(fully_qualified_name.fullname(None)))?;

        // Parsing a full schema from inside another schema. The other full
        // schema does not inherit this namespace.
        self.parse(&value, None)?;
        if !self.parsed_schemas.contains_key(&fully_qualified_name) {
            return Err(Details::UnknownType(fully_qualified_name.fullname(None)).into());
        }

        Ok(Schema::Ref {
            name: fully_qualified_name,
        })
    }

    /// Parse a JSON object representing a complex Avro type into a `Schema`.
    ///
    /// Avro supports "recursive" definition of types,
    /// e.g: `{"type": {"type": "string"}}`.
    fn parse_complex(
        &mut self,
        complex: &Map<String, JsonValue>,
        enclosing_namespace: NamespaceRef<'_>,
    ) -> AvroResult<Schema> {
        match complex.get("type") {
            Some(JsonValue::String(t)) => match t.as_str() {
                primitive if PrimitiveKind::from_name(primitive).is_some() => self
                    .parse_primitive(
                        PrimitiveKind::from_name(primitive).expect("Kind checked above"),
                        complex,
                    ),
                "record" => self.parse_record(complex, RecordVariant::Record, enclosing_namespace),
                "error" => self.parse_record(complex, RecordVariant::Error, enclosing_namespace),
                "enum" => self.parse_enum(complex, enclosing_namespace),
                "array" => self.parse_array(complex, enclosing_namespace),
                "map" => self.parse_map(complex, enclosing_namespace),
                "fixed" => self.parse_fixed(complex, enclosing_namespace),
                "error_union" => self.parse_error_union(complex, enclosing_namespace),
                "request" => Err(Details::TopLevelRequest.into()),
                other => self.parse_known_schema(other, enclosing_namespace),
            },
            Some(JsonValue::Object(data)) => self.parse_complex(data, enclosing_namespace),
            Some(JsonValue::Array(variants)) => self.parse_union(variants, enclosing_namespace),
            Some(unknown) => Err(Details::GetComplexType(unknown.clone()).into()),
            None => Err(Details::GetTypeField.into()),
        }
    }

    /// Parse a primitive type declared in object form, keeping its
    /// `logicalType` annotation and non-reserved properties.
    fn parse_primitive(
        &mut self,
        kind: PrimitiveKind,
        complex: &Map<String, JsonValue>,
    ) -> AvroResult<Schema> {
        let logical_type = match complex.get("logicalType") {
            Some(JsonValue::String(name)) => Some(name.clone()),
            Some(other) => return Err(Details::GetLogicalTypeFieldType(other.clone()).into()),
            None => None,
        };
        Ok(Schema::Primitive(PrimitiveSchema {
            kind,
            logical_type,
            attributes: get_custom_attributes(complex),
        }))
    }

    fn register_resolving_schema(&mut self, fully_qualified_name: &Name) -> AvroResult<()> {
        if RESERVED_TYPE_NAMES.contains(&fully_qualified_name.name.as_str()) {
            return Err(Details::ReservedTypeName(fully_qualified_name.name.clone()).into());
        }
        if self.parsed_schemas.contains_key(fully_qualified_name)
            || self.resolving_schemas.contains_key(fully_qualified_name)
        {
            return Err(
                Details::AmbiguousSchemaDefinition(fully_qualified_name.clone()).into(),
            );
        }
        self.resolving_schemas.insert(
            fully_qualified_name.clone(),
            Schema::Ref {
                name: fully_qualified_name.clone(),
            },
        );
        Ok(())
    }

    fn register_parsed_schema(
        &mut self,
        fully_qualified_name: &Name,
        schema: &Schema,
    ) -> AvroResult<()> {
        self.resolving_schemas.remove(fully_qualified_name);
        if self
            .parsed_schemas
            .insert(fully_qualified_name.clone(), schema.clone())
            .is_some()
        {
            return Err(
                Details::AmbiguousSchemaDefinition(fully_qualified_name.clone()).into(),
            );
        }
        Ok(())
    }

    /// Parse a JSON object representing an Avro record type into a `Schema`.
    fn parse_record(
        &mut self,
        complex: &Map<String, JsonValue>,
        variant: RecordVariant,
        enclosing_namespace: NamespaceRef<'_>,
    ) -> AvroResult<Schema> {
        let fully_qualified_name = Name::parse(complex, enclosing_namespace)?;

        self.register_resolving_schema(&fully_qualified_name)?;

        debug!("Going to parse record schema: {:?}", &fully_qualified_name);

        let fields: Vec<RecordField> = complex
            .get("fields")
            .and_then(|fields| fields.as_array())
            .ok_or_else(|| Error::new(Details::GetRecordFieldsJson))
            .and_then(|fields| {
                fields
                    .iter()
                    .map(|field| {
                        field
                            .as_object()
                            .ok_or_else(|| Error::new(Details::GetRecordFieldsJson))
                            .and_then(|field| {
                                RecordField::parse(field, self, &fully_qualified_name)
                            })
                    })
                    .collect::<Result<_, _>>()
            })?;

        let mut lookup = BTreeMap::new();
        for (position, field) in fields.iter().enumerate() {
            if lookup.insert(field.name.clone(), position).is_some() {
                return Err(Details::FieldNameDuplicate(field.name.clone()).into());
            }
        }

        let schema = Schema::Record(RecordSchema {
            name: fully_qualified_name.clone(),
            variant,
            doc: complex.get("doc").and_then(JsonValue::as_str).map(str::to_owned),
            fields,
            lookup,
            attributes: get_custom_attributes(complex),
        });

        self.register_parsed_schema(&fully_qualified_name, &schema)?;
        Ok(schema)
    }

    /// Parse a JSON object representing an Avro enum type into a `Schema`.
    fn parse_enum(
        &mut self,
        complex: &Map<String, JsonValue>,
        enclosing_namespace: NamespaceRef<'_>,
    ) -> AvroResult<Schema> {
        let fully_qualified_name = Name::parse(complex, enclosing_namespace)?;

        self.register_resolving_schema(&fully_qualified_name)?;

        let symbols: Vec<String> = complex
            .get("symbols")
            .and_then(|v| v.as_array())
            .ok_or_else(|| Error::from(Details::GetEnumSymbolsField))
            .and_then(|symbols| {
                symbols
                    .iter()
                    .map(|symbol| symbol.as_str().map(|s| s.to_string()))
                    .collect::<Option<_>>()
                    .ok_or_else(|| Error::from(Details::GetEnumSymbols))
            })?;

        let mut existing_symbols: HashSet<&String> = HashSet::with_capacity(symbols.len());
        for symbol in symbols.iter() {
            validate_enum_symbol_name(symbol)?;
            if !existing_symbols.insert(symbol) {
                return Err(Details::EnumSymbolDuplicate(symbol.to_string()).into());
            }
        }

        let schema = Schema::Enum(EnumSchema {
            name: fully_qualified_name.clone(),
            doc: complex.get("doc").and_then(JsonValue::as_str).map(str::to_owned),
            symbols,
            attributes: get_custom_attributes(complex),
        });

        self.register_parsed_schema(&fully_qualified_name, &schema)?;
        Ok(schema)
    }

    /// Parse a JSON object representing an Avro array type into a `Schema`.
    fn parse_array(
        &mut self,
        complex: &Map<String, JsonValue>,
        enclosing_namespace: NamespaceRef<'_>,
    ) -> AvroResult<Schema> {
        complex
            .get("items")
            .ok_or_else(|| Details::GetArrayItemsField.into())
            .and_then(|items| self.parse(items, enclosing_namespace))
            .map(|items| {
                Schema::Array(ArraySchema {
                    items: Box::new(items),
                    attributes: get_custom_attributes(complex),
                })
            })
    }

    /// Parse a JSON object representing an Avro map type into a `Schema`.
    /// Keys are implicitly strings.
    fn parse_map(
        &mut self,
        complex: &Map<String, JsonValue>,
        enclosing_namespace: NamespaceRef<'_>,
    ) -> AvroResult<Schema> {
        complex
            .get("values")
            .ok_or_else(|| Details::GetMapValuesField.into())
            .and_then(|values| self.parse(values, enclosing_namespace))
            .map(|values| {
                Schema::Map(MapSchema {
                    values: Box::new(values),
                    attributes: get_custom_attributes(complex),
                })
            })
    }

    /// Parse a JSON array of schemas into an Avro union.
    fn parse_union(
        &mut self,
        items: &[JsonValue],
        enclosing_namespace: NamespaceRef<'_>,
    ) -> AvroResult<Schema> {
        items
            .iter()
            .map(|v| self.parse(v, enclosing_namespace))
            .collect::<Result<Vec<_>, _>>()
            .and_then(|schemas| {
                if schemas.is_empty() {
                    error!("Union schemas should have at least two members!");
                } else if schemas.len() == 1 {
                    warn!("Union schema with just one member! Consider dropping the union!");
                }
                Ok(Schema::Union(UnionSchema::new(schemas)?))
            })
    }

    /// Parse an error union: the declared error branches prefixed with the
    /// implicit `string` system-error branch.
    fn parse_error_union(
        &mut self,
        complex: &Map<String, JsonValue>,
        enclosing_namespace: NamespaceRef<'_>,
    ) -> AvroResult<Schema> {
        let declared = complex
            .get("declared")
            .and_then(|v| v.as_array())
            .ok_or(Details::GetErrorUnionDeclared)?;
        let declared = declared
            .iter()
            .map(|v| self.parse(v, enclosing_namespace))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Schema::Union(UnionSchema::new_error_union(declared)?))
    }

    /// Parse a JSON object representing an Avro fixed type into a `Schema`.
    fn parse_fixed(
        &mut self,
        complex: &Map<String, JsonValue>,
        enclosing_namespace: NamespaceRef<'_>,
    ) -> AvroResult<Schema> {
        let fully_qualified_name = Name::parse(complex, enclosing_namespace)?;

        self.register_resolving_schema(&fully_qualified_name)?;

        let size = match complex.get("size") {
            Some(size) => size
                .as_u64()
                .ok_or_else(|| Details::GetFixedSizeFieldPositive(size.clone())),
            None => Err(Details::GetFixedSizeField),
        }?;

        let schema = Schema::Fixed(FixedSchema {
            name: fully_qualified_name.clone(),
            size: size as usize,
            attributes: get_custom_attributes(complex),
        });

        self.register_parsed_schema(&fully_qualified_name, &schema)?;
        Ok(schema)
    }
}

/// The attributes of a schema object that are not reserved JSON keys.
/// `logicalType` is stored on its own and kept out of the properties too.
fn get_custom_attributes(complex: &Map<String, JsonValue>) -> BTreeMap<String, JsonValue> {
    let mut custom_attributes: BTreeMap<String, JsonValue> = BTreeMap::new();
    for (key, value) in complex {
        match key.as_str() {
            "type" | "name" | "namespace" | "fields" | "items" | "size" | "symbols" | "values"
            | "doc" | "declared" | "logicalType" => continue,
            _ => custom_attributes.insert(key.clone(), value.clone()),
        };
    }
    custom_attributes
}
