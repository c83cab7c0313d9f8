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

use crate::AvroResult;
use crate::error::Details;
use crate::schema::{Documentation, Name, Parser, Schema};
use crate::validator::validate_record_field_name;
use log::warn;
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;

/// Which flavor of record a [`RecordSchema`] describes.
///
/// `Error` records are protocol error declarations; `Request` records are
/// anonymous protocol message parameter lists and never appear as a
/// standalone schema.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RecordVariant {
    #[default]
    Record,
    Error,
    Request,
}

/// The `order` attribute of a record field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordFieldOrder {
    Ascending,
    Descending,
    Ignore,
}

impl RecordFieldOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordFieldOrder::Ascending => "ascending",
            RecordFieldOrder::Descending => "descending",
            RecordFieldOrder::Ignore => "ignore",
        }
    }

    fn parse(json: &JsonValue) -> AvroResult<Self> {
        match json.as_str() {
            Some("ascending") => Ok(RecordFieldOrder::Ascending),
            Some("descending") => Ok(RecordFieldOrder::Descending),
            Some("ignore") => Ok(RecordFieldOrder::Ignore),
            _ => Err(Details::ParseFieldOrder(json.clone()).into()),
        }
    }
}

/// Represents a `field` in a `record` Avro schema.
#[derive(bon::Builder, Clone, Debug)]
pub struct RecordField {
    /// Name of the field.
    #[builder(into)]
    pub name: String,
    /// Documentation of the field.
    #[builder(default)]
    pub doc: Documentation,
    /// Default value of the field as the JSON literal it was declared with.
    /// Materialized during schema resolution when the writer omits the field.
    pub default: Option<JsonValue>,
    /// Sort order of the field, if declared.
    pub order: Option<RecordFieldOrder>,
    /// Schema of the field.
    pub schema: Schema,
    /// All non-reserved attributes of the field.
    #[builder(default)]
    pub attributes: BTreeMap<String, JsonValue>,
}

impl RecordField {
    /// Parses a JSON object into a `RecordField`.
    pub(crate) fn parse(
        field: &Map<String, JsonValue>,
        parser: &mut Parser,
        enclosing_record: &Name,
    ) -> AvroResult<Self> {
        let name = field
            .get("name")
            .and_then(JsonValue::as_str)
            .ok_or(Details::GetNameFieldFromRecord)?
            .to_owned();

        validate_record_field_name(&name)?;

        let ty = field
            .get("type")
            .ok_or(Details::GetRecordFieldTypeField)?;
        let schema = parser.parse(ty, enclosing_record.namespace.as_deref())?;

        if let Some(logical_type) = field.get("logicalType") {
            warn!(
                "Ignored the {enclosing_record}.{name} field's logicalType property \
                 (`{logical_type}`). It should probably be nested inside the `type` of the field"
            );
        }

        let order = field.get("order").map(RecordFieldOrder::parse).transpose()?;

        Ok(RecordField {
            name,
            doc: field.get("doc").and_then(JsonValue::as_str).map(str::to_owned),
            default: field.get("default").cloned(),
            order,
            schema,
            attributes: Self::get_field_custom_attributes(field),
        })
    }

    fn get_field_custom_attributes(
        field: &Map<String, JsonValue>,
    ) -> BTreeMap<String, JsonValue> {
        let mut custom_attributes: BTreeMap<String, JsonValue> = BTreeMap::new();
        for (key, value) in field {
            match key.as_str() {
                "name" | "type" | "default" | "order" | "doc" => continue,
                _ => custom_attributes.insert(key.clone(), value.clone()),
            };
        }
        custom_attributes
    }

    /// Whether this field declares a default value.
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Returns true if this field's schema is a union whose first branch is
    /// `null`.
    pub fn is_nullable(&self) -> bool {
        match self.schema {
            Schema::Union(ref inner) => inner.is_nullable(),
            _ => false,
        }
    }
}

/// A description of a Record schema.
#[derive(bon::Builder, Clone, Debug)]
pub struct RecordSchema {
    /// The name of the schema.
    pub name: Name,
    /// Whether this is a plain record, an error, or a request field list.
    #[builder(default)]
    pub variant: RecordVariant,
    /// The documentation of the schema.
    #[builder(default)]
    pub doc: Documentation,
    /// The set of fields of the schema.
    #[builder(default)]
    pub fields: Vec<RecordField>,
    /// The `lookup` table maps field names to their position in the `Vec`
    /// of `fields`.
    #[builder(skip = calculate_lookup_table(&fields))]
    pub lookup: BTreeMap<String, usize>,
    /// All non-reserved attributes of the schema.
    #[builder(default)]
    pub attributes: BTreeMap<String, JsonValue>,
}

/// Calculate the lookup table for the given fields.
fn calculate_lookup_table(fields: &[RecordField]) -> BTreeMap<String, usize> {
    fields
        .iter()
        .enumerate()
        .map(|(i, field)| (field.name.clone(), i))
        .collect()
}

impl RecordSchema {
    pub fn field(&self, name: &str) -> Option<&RecordField> {
        self.lookup.get(name).map(|&i| &self.fields[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn builder_computes_the_lookup_table() -> TestResult {
        let schema = RecordSchema::builder()
            .name(Name::new("Pair")?)
            .fields(vec![
                RecordField::builder()
                    .name("left")
                    .schema(Schema::long())
                    .build(),
                RecordField::builder()
                    .name("right")
                    .schema(Schema::long())
                    .build(),
            ])
            .build();

        assert_eq!(schema.lookup.len(), 2);
        assert_eq!(schema.lookup["right"], 1);
        assert_eq!(schema.field("left").map(|f| f.name.as_str()), Some("left"));
        assert_eq!(schema.variant, RecordVariant::Record);
        Ok(())
    }

    #[test]
    fn nullable_fields() -> TestResult {
        let nullable = RecordField::builder()
            .name("next")
            .schema(Schema::union(vec![Schema::null(), Schema::long()])?)
            .build();
        assert!(nullable.is_nullable());
        assert!(!nullable.has_default());

        let plain = RecordField::builder()
            .name("count")
            .default(serde_json::json!(0))
            .schema(Schema::long())
            .build();
        assert!(!plain.is_nullable());
        assert!(plain.has_default());
        Ok(())
    }

    #[test]
    fn order_parses_and_rejects() {
        assert_eq!(
            RecordFieldOrder::parse(&serde_json::json!("descending")).unwrap(),
            RecordFieldOrder::Descending
        );
        assert!(RecordFieldOrder::parse(&serde_json::json!("sideways")).is_err());
        assert_eq!(RecordFieldOrder::Ignore.as_str(), "ignore");
    }
}
