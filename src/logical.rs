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

//! The user-extensible logical type mechanism.
//!
//! The library ships no logical types of its own; it defines the extension
//! contract. A handler registered under a schema's `logicalType` name
//! transforms domain values to their underlying Avro representation before
//! encoding ([`LogicalType::to_value`]) and back after decoding
//! ([`LogicalType::from_value`]). Handlers are synchronous; see DESIGN.md
//! for the rationale.

use crate::{AvroResult, Schema, types::Value};
use std::{collections::HashMap, fmt, sync::Arc};

/// A handler for one logical type.
///
/// The two `validate_before_*` hooks guard the conversions. When
/// [`validate_before_from_value`](Self::validate_before_from_value) returns
/// false the decoder passes the raw decoded value through unchanged, per the
/// Avro specification's "ignore the logical type" rule.
pub trait LogicalType: Send + Sync {
    /// Transforms a domain value into its underlying Avro representation.
    /// Called before encoding.
    fn to_value(&self, datum: &Value, schema: &Schema) -> AvroResult<Value>;

    /// Transforms a decoded Avro value into its domain representation.
    /// Called after decoding.
    fn from_value(&self, datum: Value, schema: &Schema) -> AvroResult<Value>;

    /// Whether a domain value is acceptable input for
    /// [`to_value`](Self::to_value). Takes over structural validation for
    /// schemas carrying this logical type.
    fn validate_before_to_value(
        &self,
        datum: &Value,
        schema: &Schema,
        options: &Options,
    ) -> bool {
        let _ = (datum, schema, options);
        true
    }

    /// Whether a decoded value is acceptable input for
    /// [`from_value`](Self::from_value).
    fn validate_before_from_value(
        &self,
        datum: &Value,
        schema: &Schema,
        options: &Options,
    ) -> bool {
        let _ = (datum, schema, options);
        true
    }
}

/// Options shared by the validator and the codec, holding the logical type
/// registry. Cloning is cheap; registered handlers are shared.
#[derive(Clone, Default)]
pub struct Options {
    logical_types: HashMap<String, Arc<dyn LogicalType>>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler under a logical type name, replacing any previous
    /// handler with that name.
    pub fn register_logical_type(
        &mut self,
        name: impl Into<String>,
        handler: Arc<dyn LogicalType>,
    ) {
        self.logical_types.insert(name.into(), handler);
    }

    /// Builder-style [`register_logical_type`](Self::register_logical_type).
    pub fn with_logical_type(
        mut self,
        name: impl Into<String>,
        handler: Arc<dyn LogicalType>,
    ) -> Self {
        self.register_logical_type(name, handler);
        self
    }

    pub fn logical_type(&self, name: &str) -> Option<&dyn LogicalType> {
        self.logical_types.get(name).map(Arc::as_ref)
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.logical_types.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("Options")
            .field("logical_types", &names)
            .finish()
    }
}
