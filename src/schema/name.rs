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

use crate::{
    AvroResult, Schema,
    error::Details,
    validator::{validate_namespace, validate_schema_name},
};
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

/// Represents names for `record`, `error`, `enum` and `fixed` Avro schemas.
///
/// Each of these schemas has a `fullname` composed of a name and an optional
/// namespace. A dotted name carries its own namespace: the namespace is the
/// prefix of the fullname up to the last dot, and the name is the rest.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct Name {
    /// The name part, without any dots.
    pub name: String,
    /// The namespace part, if any.
    pub namespace: Namespace,
}

/// Represents schema lookup within a schema env.
pub type Names = HashMap<Name, Schema>;
/// Represents schema lookup within a schema, by reference.
pub type NamesRef<'a> = HashMap<Name, &'a Schema>;
/// An owned namespace for a named schema.
pub type Namespace = Option<String>;
/// A borrowed namespace for a named schema.
pub type NamespaceRef<'a> = Option<&'a str>;

impl Name {
    /// Creates a new `Name`, splitting the namespace out of a dotted name.
    pub fn new(name: &str) -> AvroResult<Self> {
        Self::new_with_enclosing_namespace(name, None)
    }

    /// Creates a new `Name`. A name without dots that carries no namespace of
    /// its own inherits `enclosing_namespace`.
    pub fn new_with_enclosing_namespace(
        name: &str,
        enclosing_namespace: NamespaceRef<'_>,
    ) -> AvroResult<Self> {
        validate_schema_name(name)?;
        match name.rfind('.') {
            // A dotted name carries its own namespace; a leading dot means
            // the empty (absent) namespace.
            Some(index) => Ok(Self {
                name: name[index + 1..].to_owned(),
                namespace: Some(&name[..index]).filter(|ns| !ns.is_empty()).map(str::to_owned),
            }),
            None => {
                let namespace = enclosing_namespace.filter(|ns| !ns.is_empty());
                if let Some(ns) = namespace {
                    validate_namespace(ns)?;
                }
                Ok(Self {
                    name: name.to_owned(),
                    namespace: namespace.map(str::to_owned),
                })
            }
        }
    }

    /// Parses a JSON schema object's `name`/`namespace` attributes into a
    /// `Name`. A dotted `name` wins over the `namespace` attribute, which in
    /// turn wins over the enclosing namespace.
    pub(crate) fn parse(
        complex: &Map<String, JsonValue>,
        enclosing_namespace: NamespaceRef<'_>,
    ) -> AvroResult<Self> {
        let name = complex
            .get("name")
            .and_then(JsonValue::as_str)
            .ok_or(Details::GetNameField)?;
        let namespace = complex.get("namespace").and_then(JsonValue::as_str);
        Self::new_with_enclosing_namespace(name, namespace.or(enclosing_namespace))
    }

    /// The dotted `namespace.name` identifier, falling back on
    /// `enclosing_namespace` when this name has none of its own.
    pub fn fullname(&self, enclosing_namespace: NamespaceRef<'_>) -> String {
        match self
            .namespace
            .as_deref()
            .or(enclosing_namespace)
            .filter(|ns| !ns.is_empty())
        {
            Some(namespace) => format!("{namespace}.{}", self.name),
            None => self.name.clone(),
        }
    }

    /// This name with the enclosing namespace applied if it has none of its
    /// own.
    pub fn fully_qualified_name(&self, enclosing_namespace: NamespaceRef<'_>) -> Name {
        Name {
            name: self.name.clone(),
            namespace: self
                .namespace
                .as_deref()
                .or(enclosing_namespace)
                .filter(|ns| !ns.is_empty())
                .map(str::to_owned),
        }
    }
}

impl TryFrom<&str> for Name {
    type Error = crate::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl Display for Name {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.fullname(None))
    }
}
