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

//! Logic for parsing and interacting with schemas in Avro format.

mod name;
mod parser;
mod record;
mod resolve;
mod union;

pub(crate) use crate::schema::parser::Parser;
pub(crate) use crate::schema::resolve::deref_schema;
pub use crate::schema::{
    name::{Name, Names, NamesRef, Namespace, NamespaceRef},
    record::{RecordField, RecordFieldOrder, RecordSchema, RecordVariant},
    resolve::ResolvedSchema,
    union::UnionSchema,
};
use crate::{AvroResult, error::Details};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

/// Represents documentation for complex Avro schemas.
pub type Documentation = Option<String>;

/// Represents any valid Avro schema.
///
/// More information about Avro schemas can be found in the
/// [Avro Specification](https://avro.apache.org/docs/++version++/specification/#schema-declaration)
#[derive(Clone, Debug)]
pub enum Schema {
    /// One of the eight primitive Avro schemas, together with its
    /// `logicalType` annotation and non-reserved properties.
    Primitive(PrimitiveSchema),
    /// An `array` Avro schema. All items share one schema.
    Array(ArraySchema),
    /// A `map` Avro schema. Keys are always strings and all values share one
    /// schema.
    Map(MapSchema),
    /// A `union` or `error_union` Avro schema.
    Union(UnionSchema),
    /// A `record`, `error` or `request` Avro schema.
    Record(RecordSchema),
    /// An `enum` Avro schema.
    Enum(EnumSchema),
    /// A `fixed` Avro schema.
    Fixed(FixedSchema),
    /// A reference to another schema by fullname.
    Ref { name: Name },
}

/// The eight Avro primitive type kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum PrimitiveKind {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,
}

impl PrimitiveKind {
    /// The kind named by an Avro primitive type name, if any.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "null" => Some(Self::Null),
            "boolean" => Some(Self::Boolean),
            "int" => Some(Self::Int),
            "long" => Some(Self::Long),
            "float" => Some(Self::Float),
            "double" => Some(Self::Double),
            "bytes" => Some(Self::Bytes),
            "string" => Some(Self::String),
            _ => None,
        }
    }
}

/// A primitive schema node: its kind plus the annotations a JSON declaration
/// in object form may carry.
#[derive(Clone, Debug)]
pub struct PrimitiveSchema {
    pub kind: PrimitiveKind,
    /// The `logicalType` annotation, dispatched through
    /// [`Options`](crate::Options) at codec time.
    pub logical_type: Option<String>,
    /// All non-reserved attributes of the schema.
    pub attributes: BTreeMap<String, JsonValue>,
}

impl PrimitiveSchema {
    /// A bare primitive without annotations, as written in the shorthand
    /// string form.
    pub fn new(kind: PrimitiveKind) -> Self {
        Self {
            kind,
            logical_type: None,
            attributes: BTreeMap::new(),
        }
    }
}

/// A description of an Enum schema.
#[derive(bon::Builder, Debug, Clone)]
pub struct EnumSchema {
    /// The name of the schema.
    pub name: Name,
    /// The documentation of the schema.
    #[builder(default)]
    pub doc: Documentation,
    /// The ordered set of symbols of the schema.
    pub symbols: Vec<String>,
    /// All non-reserved attributes of the schema.
    #[builder(default)]
    pub attributes: BTreeMap<String, JsonValue>,
}

/// A description of a Fixed schema.
#[derive(bon::Builder, Debug, Clone)]
pub struct FixedSchema {
    /// The name of the schema.
    pub name: Name,
    /// The number of bytes of a value of this schema.
    pub size: usize,
    /// All non-reserved attributes of the schema.
    #[builder(default)]
    pub attributes: BTreeMap<String, JsonValue>,
}

/// A description of an Array schema.
#[derive(Clone, Debug)]
pub struct ArraySchema {
    pub items: Box<Schema>,
    pub attributes: BTreeMap<String, JsonValue>,
}

/// A description of a Map schema. Keys are implicitly strings.
#[derive(Clone, Debug)]
pub struct MapSchema {
    pub values: Box<Schema>,
    pub attributes: BTreeMap<String, JsonValue>,
}

/// The kind of a schema node, spelled like the Avro type names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum SchemaKind {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,
    Array,
    Map,
    Union,
    ErrorUnion,
    Record,
    Error,
    Request,
    Enum,
    Fixed,
    Ref,
}

impl SchemaKind {
    pub fn is_primitive(self) -> bool {
        matches!(
            self,
            SchemaKind::Null
                | SchemaKind::Boolean
                | SchemaKind::Int
                | SchemaKind::Long
                | SchemaKind::Double
                | SchemaKind::Float
                | SchemaKind::Bytes
                | SchemaKind::String,
        )
    }

    pub fn is_named(self) -> bool {
        matches!(
            self,
            SchemaKind::Record
                | SchemaKind::Error
                | SchemaKind::Enum
                | SchemaKind::Fixed
                | SchemaKind::Ref
        )
    }
}

impl From<PrimitiveKind> for SchemaKind {
    fn from(kind: PrimitiveKind) -> Self {
        match kind {
            PrimitiveKind::Null => Self::Null,
            PrimitiveKind::Boolean => Self::Boolean,
            PrimitiveKind::Int => Self::Int,
            PrimitiveKind::Long => Self::Long,
            PrimitiveKind::Float => Self::Float,
            PrimitiveKind::Double => Self::Double,
            PrimitiveKind::Bytes => Self::Bytes,
            PrimitiveKind::String => Self::String,
        }
    }
}

impl From<&Schema> for SchemaKind {
    fn from(schema: &Schema) -> Self {
        match schema {
            Schema::Primitive(inner) => inner.kind.into(),
            Schema::Array(_) => Self::Array,
            Schema::Map(_) => Self::Map,
            Schema::Union(inner) => {
                if inner.is_error_union() {
                    Self::ErrorUnion
                } else {
                    Self::Union
                }
            }
            Schema::Record(inner) => match inner.variant {
                RecordVariant::Record => Self::Record,
                RecordVariant::Error => Self::Error,
                RecordVariant::Request => Self::Request,
            },
            Schema::Enum(_) => Self::Enum,
            Schema::Fixed(_) => Self::Fixed,
            Schema::Ref { .. } => Self::Ref,
        }
    }
}

impl Schema {
    /// Create a `Schema` from a string representing a JSON Avro schema.
    pub fn parse_str(input: &str) -> AvroResult<Schema> {
        let value = serde_json::from_str(input).map_err(|source| Details::ParseSchemaJson {
            source,
            input: abbreviated(input),
        })?;
        Self::parse(&value)
    }

    /// Create a `Schema` from an already deserialized JSON value.
    pub fn parse(value: &JsonValue) -> AvroResult<Schema> {
        let mut parser = Parser::default();
        parser.parse(value, None)
    }

    /// Create an array of `Schema`s from an iterator of JSON Avro schema
    /// documents, each of which must be named. The documents may reference
    /// each other, in any order.
    pub fn parse_list(input: impl IntoIterator<Item = impl AsRef<str>>) -> AvroResult<Vec<Schema>> {
        let mut input_schemas: HashMap<Name, JsonValue> = HashMap::new();
        let mut input_order: Vec<Name> = Vec::new();
        for json in input {
            let json = json.as_ref();
            let value: JsonValue =
                serde_json::from_str(json).map_err(|source| Details::ParseSchemaJson {
                    source,
                    input: abbreviated(json),
                })?;
            let complex = value.as_object().ok_or(Details::GetNameField)?;
            let name = Name::parse(complex, None)?;
            if input_schemas.insert(name.clone(), value).is_some() {
                return Err(Details::AmbiguousSchemaDefinition(name).into());
            }
            input_order.push(name);
        }
        Parser::new(input_schemas, input_order).parse_list()
    }

    pub fn kind(&self) -> SchemaKind {
        SchemaKind::from(self)
    }

    /// Returns true for named schemas and references to them.
    pub fn is_named(&self) -> bool {
        self.kind().is_named()
    }

    /// The name of a named schema, or of the schema a reference points at.
    pub fn name(&self) -> Option<&Name> {
        match self {
            Schema::Record(RecordSchema { name, .. })
            | Schema::Enum(EnumSchema { name, .. })
            | Schema::Fixed(FixedSchema { name, .. })
            | Schema::Ref { name } => Some(name),
            _ => None,
        }
    }

    /// The namespace of a named schema.
    pub fn namespace(&self) -> Namespace {
        self.name().and_then(|name| name.namespace.clone())
    }

    /// The `logicalType` annotation of the schema, if any.
    pub fn logical_type(&self) -> Option<&str> {
        match self {
            Schema::Primitive(inner) => inner.logical_type.as_deref(),
            _ => None,
        }
    }

    /// The documentation of the schema, if any.
    pub fn doc(&self) -> Option<&str> {
        match self {
            Schema::Record(RecordSchema { doc, .. }) | Schema::Enum(EnumSchema { doc, .. }) => {
                doc.as_deref()
            }
            _ => None,
        }
    }

    /// The non-reserved properties of the schema, if it can carry any.
    pub fn custom_attributes(&self) -> Option<&BTreeMap<String, JsonValue>> {
        match self {
            Schema::Primitive(PrimitiveSchema { attributes, .. })
            | Schema::Array(ArraySchema { attributes, .. })
            | Schema::Map(MapSchema { attributes, .. })
            | Schema::Record(RecordSchema { attributes, .. })
            | Schema::Enum(EnumSchema { attributes, .. })
            | Schema::Fixed(FixedSchema { attributes, .. }) => Some(attributes),
            Schema::Union(_) | Schema::Ref { .. } => None,
        }
    }

    /// Whether this schema describes the same type as `other`, defined as
    /// equality of the emitted JSON forms.
    pub fn equals(&self, other: &Schema) -> bool {
        self.to_json() == other.to_json()
    }

    /// The JSON form of the schema.
    ///
    /// Named schemas already emitted in this pass emit as a name reference:
    /// the short name inside the enclosing namespace, the fullname outside
    /// it. The implicit `string` branch of an error union is suppressed.
    pub fn to_json(&self) -> JsonValue {
        let mut seen = HashSet::new();
        emit_json(self, &mut seen, None)
    }

    // -- convenience constructors ----------------------------------------

    pub fn null() -> Schema {
        Schema::Primitive(PrimitiveSchema::new(PrimitiveKind::Null))
    }

    pub fn boolean() -> Schema {
        Schema::Primitive(PrimitiveSchema::new(PrimitiveKind::Boolean))
    }

    pub fn int() -> Schema {
        Schema::Primitive(PrimitiveSchema::new(PrimitiveKind::Int))
    }

    pub fn long() -> Schema {
        Schema::Primitive(PrimitiveSchema::new(PrimitiveKind::Long))
    }

    pub fn float() -> Schema {
        Schema::Primitive(PrimitiveSchema::new(PrimitiveKind::Float))
    }

    pub fn double() -> Schema {
        Schema::Primitive(PrimitiveSchema::new(PrimitiveKind::Double))
    }

    pub fn bytes() -> Schema {
        Schema::Primitive(PrimitiveSchema::new(PrimitiveKind::Bytes))
    }

    pub fn string() -> Schema {
        Schema::Primitive(PrimitiveSchema::new(PrimitiveKind::String))
    }

    pub fn array(items: Schema) -> Schema {
        Schema::Array(ArraySchema {
            items: Box::new(items),
            attributes: BTreeMap::new(),
        })
    }

    pub fn map(values: Schema) -> Schema {
        Schema::Map(MapSchema {
            values: Box::new(values),
            attributes: BTreeMap::new(),
        })
    }

    pub fn union(branches: Vec<Schema>) -> AvroResult<Schema> {
        Ok(Schema::Union(UnionSchema::new(branches)?))
    }
}

impl PartialEq for Schema {
    /// Assess equality of two `Schema`s based on their emitted JSON forms.
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl fmt::Display for Schema {
    /// The canonical JSON text of the schema.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json().to_string())
    }
}

impl Serialize for Schema {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json().serialize(serializer)
    }
}

/// Truncates oversized schema text for error messages.
fn abbreviated(input: &str) -> String {
    const LIMIT: usize = 256;
    if input.len() <= LIMIT {
        input.to_owned()
    } else {
        let mut end = LIMIT;
        while !input.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &input[..end])
    }
}

fn emit_json(
    schema: &Schema,
    seen: &mut HashSet<String>,
    enclosing_namespace: NamespaceRef<'_>,
) -> JsonValue {
    match schema {
        Schema::Primitive(inner) => {
            if inner.logical_type.is_none() && inner.attributes.is_empty() {
                JsonValue::String(inner.kind.to_string())
            } else {
                let mut map = Map::new();
                map.insert("type".into(), inner.kind.to_string().into());
                if let Some(logical_type) = &inner.logical_type {
                    map.insert("logicalType".into(), logical_type.clone().into());
                }
                emit_attributes(&mut map, &inner.attributes);
                JsonValue::Object(map)
            }
        }
        Schema::Ref { name } => emit_name_ref(name, enclosing_namespace),
        Schema::Array(inner) => {
            let mut map = Map::new();
            map.insert("type".into(), "array".into());
            map.insert(
                "items".into(),
                emit_json(&inner.items, seen, enclosing_namespace),
            );
            emit_attributes(&mut map, &inner.attributes);
            JsonValue::Object(map)
        }
        Schema::Map(inner) => {
            let mut map = Map::new();
            map.insert("type".into(), "map".into());
            map.insert(
                "values".into(),
                emit_json(&inner.values, seen, enclosing_namespace),
            );
            emit_attributes(&mut map, &inner.attributes);
            JsonValue::Object(map)
        }
        Schema::Union(inner) => {
            let skip = usize::from(inner.is_error_union());
            JsonValue::Array(
                inner
                    .variants()
                    .iter()
                    .skip(skip)
                    .map(|branch| emit_json(branch, seen, enclosing_namespace))
                    .collect(),
            )
        }
        Schema::Fixed(inner) => match first_emission(&inner.name, seen, enclosing_namespace) {
            Err(reference) => reference,
            Ok(mut map) => {
                map.insert("type".into(), "fixed".into());
                map.insert("size".into(), inner.size.into());
                emit_attributes(&mut map, &inner.attributes);
                JsonValue::Object(map)
            }
        },
        Schema::Enum(inner) => match first_emission(&inner.name, seen, enclosing_namespace) {
            Err(reference) => reference,
            Ok(mut map) => {
                map.insert("type".into(), "enum".into());
                map.insert(
                    "symbols".into(),
                    JsonValue::Array(
                        inner
                            .symbols
                            .iter()
                            .map(|symbol| JsonValue::String(symbol.clone()))
                            .collect(),
                    ),
                );
                if let Some(doc) = &inner.doc {
                    map.insert("doc".into(), doc.clone().into());
                }
                emit_attributes(&mut map, &inner.attributes);
                JsonValue::Object(map)
            }
        },
        Schema::Record(inner) => {
            if inner.variant == RecordVariant::Request {
                // A request record has no name of its own and is represented
                // only as its field list.
                return JsonValue::Array(
                    inner
                        .fields
                        .iter()
                        .map(|field| emit_field(field, seen, enclosing_namespace))
                        .collect(),
                );
            }
            match first_emission(&inner.name, seen, enclosing_namespace) {
                Err(reference) => reference,
                Ok(mut map) => {
                    let type_name = match inner.variant {
                        RecordVariant::Error => "error",
                        _ => "record",
                    };
                    map.insert("type".into(), type_name.into());
                    if let Some(doc) = &inner.doc {
                        map.insert("doc".into(), doc.clone().into());
                    }
                    let record_namespace = inner
                        .name
                        .fully_qualified_name(enclosing_namespace)
                        .namespace;
                    map.insert(
                        "fields".into(),
                        JsonValue::Array(
                            inner
                                .fields
                                .iter()
                                .map(|field| emit_field(field, seen, record_namespace.as_deref()))
                                .collect(),
                        ),
                    );
                    emit_attributes(&mut map, &inner.attributes);
                    JsonValue::Object(map)
                }
            }
        }
    }
}

/// Emits a reference to a named schema: the short name inside the enclosing
/// namespace, the fullname outside it.
fn emit_name_ref(name: &Name, enclosing_namespace: NamespaceRef<'_>) -> JsonValue {
    if name.namespace.as_deref() == enclosing_namespace.filter(|ns| !ns.is_empty()) {
        JsonValue::String(name.name.clone())
    } else {
        JsonValue::String(name.fullname(None))
    }
}

/// For the first emission of a named schema in this pass, returns a map with
/// the name attributes filled in (the namespace pruned when it equals the
/// enclosing one). For later emissions, returns the name reference instead.
fn first_emission(
    name: &Name,
    seen: &mut HashSet<String>,
    enclosing_namespace: NamespaceRef<'_>,
) -> Result<Map<String, JsonValue>, JsonValue> {
    let fullname = name.fullname(enclosing_namespace);
    if !seen.insert(fullname) {
        return Err(emit_name_ref(name, enclosing_namespace));
    }
    let mut map = Map::new();
    map.insert("name".into(), name.name.clone().into());
    if let Some(namespace) = &name.namespace
        && enclosing_namespace != Some(namespace.as_str())
    {
        map.insert("namespace".into(), namespace.clone().into());
    }
    Ok(map)
}

fn emit_field(
    field: &RecordField,
    seen: &mut HashSet<String>,
    enclosing_namespace: NamespaceRef<'_>,
) -> JsonValue {
    let mut map = Map::new();
    map.insert("name".into(), field.name.clone().into());
    map.insert(
        "type".into(),
        emit_json(&field.schema, seen, enclosing_namespace),
    );
    if let Some(default) = &field.default {
        map.insert("default".into(), default.clone());
    }
    if let Some(order) = &field.order {
        map.insert("order".into(), order.as_str().into());
    }
    if let Some(doc) = &field.doc {
        map.insert("doc".into(), doc.clone().into());
    }
    emit_attributes(&mut map, &field.attributes);
    JsonValue::Object(map)
}

fn emit_attributes(map: &mut Map<String, JsonValue>, attributes: &BTreeMap<String, JsonValue>) {
    for (key, value) in attributes {
        map.insert(key.clone(), value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn parses_bare_primitives() -> TestResult {
        for (json, kind) in [
            (r#""null""#, SchemaKind::Null),
            (r#""boolean""#, SchemaKind::Boolean),
            (r#""int""#, SchemaKind::Int),
            (r#""long""#, SchemaKind::Long),
            (r#""float""#, SchemaKind::Float),
            (r#""double""#, SchemaKind::Double),
            (r#""bytes""#, SchemaKind::Bytes),
            (r#""string""#, SchemaKind::String),
        ] {
            assert_eq!(Schema::parse_str(json)?.kind(), kind);
        }
        Ok(())
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = Schema::parse_str("{not json").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert!(err.to_string().contains("{not json"));
    }

    #[test]
    fn unknown_type_name_is_a_name_error() {
        let err = Schema::parse_str(r#""Wobble""#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Name);
    }

    #[test]
    fn primitive_keeps_logical_type_and_properties() -> TestResult {
        let schema =
            Schema::parse_str(r#"{"type": "string", "logicalType": "hello", "level": 3}"#)?;
        assert_eq!(schema.logical_type(), Some("hello"));
        assert_eq!(
            schema.custom_attributes().and_then(|attrs| attrs.get("level")),
            Some(&json!(3))
        );
        assert_eq!(
            schema.to_json(),
            json!({"type": "string", "logicalType": "hello", "level": 3})
        );
        Ok(())
    }

    #[test]
    fn bare_primitive_emits_as_string_form() -> TestResult {
        assert_eq!(Schema::parse_str(r#""int""#)?.to_json(), json!("int"));
        Ok(())
    }

    #[test]
    fn non_string_logical_type_is_rejected() {
        assert!(Schema::parse_str(r#"{"type": "string", "logicalType": 3}"#).is_err());
    }

    #[test]
    fn record_roundtrips_through_json() -> TestResult {
        let schema = Schema::parse_str(
            r#"{
                "type": "record",
                "name": "ns.Test",
                "doc": "a test record",
                "fields": [
                    {"name": "a", "type": "long", "default": 42, "order": "descending"},
                    {"name": "b", "type": "string", "custom": true}
                ],
                "extra": "kept"
            }"#,
        )?;
        let reparsed = Schema::parse(&schema.to_json())?;
        assert!(schema.equals(&reparsed));
        assert_eq!(schema, reparsed);
        assert_eq!(schema.doc(), Some("a test record"));
        Ok(())
    }

    #[test]
    fn nested_namespace_is_pruned_on_emission() -> TestResult {
        let schema = Schema::parse_str(
            r#"{
                "type": "record",
                "name": "ns.Outer",
                "fields": [
                    {"name": "id", "type": {"type": "fixed", "name": "Id", "size": 4}}
                ]
            }"#,
        )?;
        let json = schema.to_json();
        let id = &json["fields"][0]["type"];
        assert_eq!(id["name"], json!("Id"));
        // inherited "ns" equals the enclosing namespace, so it is pruned
        assert_eq!(id.get("namespace"), None);
        assert!(schema.equals(&Schema::parse(&json)?));
        Ok(())
    }

    #[test]
    fn second_occurrence_emits_as_name_reference() -> TestResult {
        let schema = Schema::parse_str(
            r#"{
                "type": "record",
                "name": "Pair",
                "fields": [
                    {"name": "left", "type": {"type": "enum", "name": "Side", "symbols": ["L", "R"]}},
                    {"name": "right", "type": "Side"}
                ]
            }"#,
        )?;
        let json = schema.to_json();
        assert_eq!(json["fields"][1]["type"], json!("Side"));
        assert!(schema.equals(&Schema::parse(&json)?));
        Ok(())
    }

    #[test]
    fn recursive_schema_parses_and_roundtrips() -> TestResult {
        let schema = Schema::parse_str(
            r#"{
                "type": "record",
                "name": "Node",
                "fields": [
                    {"name": "label", "type": "string"},
                    {"name": "children", "type": {"type": "array", "items": "Node"}}
                ]
            }"#,
        )?;
        let json = schema.to_json();
        assert_eq!(json["fields"][1]["type"]["items"], json!("Node"));
        assert!(schema.equals(&Schema::parse(&json)?));
        Ok(())
    }

    #[test]
    fn sub_schema_extraction() -> TestResult {
        let record = Schema::parse_str(
            r#"{
                "type": "record",
                "name": "Holder",
                "fields": [
                    {"name": "f", "type": {"type": "map", "values": ["null", "double"]}}
                ]
            }"#,
        )?;
        let Schema::Record(inner) = &record else {
            panic!("expected a record");
        };
        let field_type = &inner.fields[0].schema;
        let extracted = Schema::parse(&field_type.to_json())?;
        assert!(extracted.equals(field_type));
        Ok(())
    }

    #[test]
    fn error_union_suppresses_the_string_head() -> TestResult {
        let schema = Schema::parse_str(
            r#"{
                "type": "error_union",
                "declared": [{"type": "error", "name": "Oops", "fields": []}]
            }"#,
        )?;
        let Schema::Union(union) = &schema else {
            panic!("expected a union");
        };
        assert!(union.is_error_union());
        assert_eq!(union.variants().len(), 2);
        assert_eq!(schema.kind(), SchemaKind::ErrorUnion);

        let json = schema.to_json();
        let branches = json.as_array().expect("emits as an array");
        assert_eq!(branches.len(), 1);
        assert_eq!(branches[0]["name"], json!("Oops"));
        Ok(())
    }

    #[test]
    fn request_records_are_rejected_at_top_level() {
        let err = Schema::parse_str(r#"{"type": "request", "fields": []}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn reserved_names_are_rejected() {
        let err =
            Schema::parse_str(r#"{"type": "fixed", "name": "record", "size": 2}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Name);
    }

    #[test]
    fn duplicate_definitions_are_rejected() {
        let err = Schema::parse_str(
            r#"{
                "type": "record",
                "name": "Twin",
                "fields": [
                    {"name": "a", "type": {"type": "fixed", "name": "F", "size": 1}},
                    {"name": "b", "type": {"type": "fixed", "name": "F", "size": 1}}
                ]
            }"#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Name);
    }

    #[test]
    fn record_field_errors() {
        // missing fields
        assert!(Schema::parse_str(r#"{"type": "record", "name": "R"}"#).is_err());
        // fields not an array
        assert!(Schema::parse_str(r#"{"type": "record", "name": "R", "fields": 3}"#).is_err());
        // duplicate field names
        assert!(
            Schema::parse_str(
                r#"{"type": "record", "name": "R", "fields": [
                    {"name": "x", "type": "int"}, {"name": "x", "type": "long"}
                ]}"#
            )
            .is_err()
        );
        // invalid order
        assert!(
            Schema::parse_str(
                r#"{"type": "record", "name": "R", "fields": [
                    {"name": "x", "type": "int", "order": "sideways"}
                ]}"#
            )
            .is_err()
        );
    }

    #[test]
    fn enum_errors() {
        assert!(Schema::parse_str(r#"{"type": "enum", "name": "E"}"#).is_err());
        assert!(
            Schema::parse_str(r#"{"type": "enum", "name": "E", "symbols": ["A", "A"]}"#).is_err()
        );
        assert!(
            Schema::parse_str(r#"{"type": "enum", "name": "E", "symbols": ["A", 3]}"#).is_err()
        );
    }

    #[test]
    fn parse_list_resolves_cross_references() -> TestResult {
        let schemas = Schema::parse_list([
            r#"{"type": "record", "name": "A", "fields": [{"name": "b", "type": "B"}]}"#,
            r#"{"type": "record", "name": "B", "fields": [{"name": "n", "type": "long"}]}"#,
        ])?;
        assert_eq!(schemas.len(), 2);
        assert_eq!(schemas[0].name().map(|n| n.name.as_str()), Some("A"));
        Ok(())
    }

    #[test]
    fn display_is_canonical_json_text() -> TestResult {
        let schema = Schema::parse_str(r#"{"type": "array", "items": "int"}"#)?;
        let text = schema.to_string();
        assert!(schema.equals(&Schema::parse_str(&text)?));
        Ok(())
    }

    #[test]
    fn equality_ignores_shape_of_declaration() -> TestResult {
        let one = Schema::parse_str(r#"{"type": "int"}"#)?;
        let two = Schema::parse_str(r#""int""#)?;
        assert_eq!(one, two);

        let int_schema = Schema::parse_str(r#""int""#)?;
        let long_schema = Schema::parse_str(r#""long""#)?;
        assert!(!int_schema.equals(&long_schema));
        Ok(())
    }
}
