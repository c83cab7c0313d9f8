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
use crate::schema::{Schema, SchemaKind};
use std::collections::BTreeMap;

/// A description of a Union schema.
///
/// An error union is a union whose first branch is an implicit `string`
/// carrying system errors; JSON emission suppresses that branch.
#[derive(Debug, Clone)]
pub struct UnionSchema {
    /// The schemas that make up this union.
    pub(crate) schemas: Vec<Schema>,
    // Used to ensure uniqueness of non-named branches, and provide constant
    // time finding of the branch index given a kind.
    variant_index: BTreeMap<SchemaKind, usize>,
    is_error: bool,
}

impl UnionSchema {
    /// Creates a new `UnionSchema` from a vector of branch schemas.
    ///
    /// # Errors
    /// Will return an error if `schemas` has duplicate non-named branches or
    /// if `schemas` contains a union.
    pub fn new(schemas: Vec<Schema>) -> AvroResult<Self> {
        Self::build(schemas, false)
    }

    /// Creates an error union by prepending the implicit `string` branch to
    /// the declared error branches.
    pub(crate) fn new_error_union(declared: Vec<Schema>) -> AvroResult<Self> {
        let mut schemas = Vec::with_capacity(declared.len() + 1);
        schemas.push(Schema::string());
        schemas.extend(declared);
        Self::build(schemas, true)
    }

    fn build(schemas: Vec<Schema>, is_error: bool) -> AvroResult<Self> {
        let mut vindex = BTreeMap::new();
        for (i, schema) in schemas.iter().enumerate() {
            if let Schema::Union(_) = schema {
                return Err(Details::GetNestedUnion.into());
            }
            if !schema.is_named() && vindex.insert(SchemaKind::from(schema), i).is_some() {
                return Err(Details::GetUnionDuplicate.into());
            }
        }
        Ok(UnionSchema {
            schemas,
            variant_index: vindex,
            is_error,
        })
    }

    /// Returns a slice of all branches of this union, the implicit `string`
    /// branch of an error union included.
    pub fn variants(&self) -> &[Schema] {
        &self.schemas
    }

    pub fn is_error_union(&self) -> bool {
        self.is_error
    }

    /// Returns true if any of the branches of this union is `null`.
    pub fn is_nullable(&self) -> bool {
        self.variant_index.contains_key(&SchemaKind::Null)
    }
}
