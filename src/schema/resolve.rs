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
use crate::schema::{NamesRef, NamespaceRef, RecordSchema, Schema, UnionSchema};
use crate::{AvroResult, Error};
use std::collections::HashMap;

/// Every named schema reachable from a set of root schemas, keyed by its
/// fully qualified name.
///
/// The codec and the validator resolve `Schema::Ref` nodes through this
/// table; building it also proves that every reference in the tree points at
/// a definition.
#[derive(Debug)]
pub struct ResolvedSchema<'s> {
    names_ref: NamesRef<'s>,
}

impl<'s> TryFrom<&'s Schema> for ResolvedSchema<'s> {
    type Error = Error;

    fn try_from(schema: &'s Schema) -> AvroResult<Self> {
        let mut rs = ResolvedSchema {
            names_ref: HashMap::new(),
        };
        rs.resolve(schema, None)?;
        rs.check_refs(schema, None)?;
        Ok(rs)
    }
}

impl<'s> ResolvedSchema<'s> {
    pub fn get_names(&self) -> &NamesRef<'s> {
        &self.names_ref
    }

    pub fn into_names(self) -> NamesRef<'s> {
        self.names_ref
    }

    /// Collects the named schemas of the tree.
    fn resolve(
        &mut self,
        schema: &'s Schema,
        enclosing_namespace: NamespaceRef<'_>,
    ) -> AvroResult<()> {
        match schema {
            Schema::Array(inner) => self.resolve(&inner.items, enclosing_namespace),
            Schema::Map(inner) => self.resolve(&inner.values, enclosing_namespace),
            Schema::Union(UnionSchema { schemas, .. }) => {
                for schema in schemas {
                    self.resolve(schema, enclosing_namespace)?;
                }
                Ok(())
            }
            Schema::Enum(inner) => self.register(&inner.name, schema, enclosing_namespace),
            Schema::Fixed(inner) => self.register(&inner.name, schema, enclosing_namespace),
            Schema::Record(RecordSchema { name, fields, .. }) => {
                let fully_qualified_name = name.fully_qualified_name(enclosing_namespace);
                let record_namespace = fully_qualified_name.namespace.clone();
                self.register(name, schema, enclosing_namespace)?;
                for field in fields {
                    self.resolve(&field.schema, record_namespace.as_deref())?;
                }
                Ok(())
            }
            Schema::Primitive(_) | Schema::Ref { .. } => Ok(()),
        }
    }

    fn register(
        &mut self,
        name: &crate::schema::Name,
        schema: &'s Schema,
        enclosing_namespace: NamespaceRef<'_>,
    ) -> AvroResult<()> {
        let fully_qualified_name = name.fully_qualified_name(enclosing_namespace);
        if self
            .names_ref
            .insert(fully_qualified_name.clone(), schema)
            .is_some()
        {
            return Err(Details::AmbiguousSchemaDefinition(fully_qualified_name).into());
        }
        Ok(())
    }

    /// Walks the tree once more to prove every reference resolves. Done
    /// after collection so that references may point forward.
    fn check_refs(
        &self,
        schema: &'s Schema,
        enclosing_namespace: NamespaceRef<'_>,
    ) -> AvroResult<()> {
        match schema {
            Schema::Array(inner) => self.check_refs(&inner.items, enclosing_namespace),
            Schema::Map(inner) => self.check_refs(&inner.values, enclosing_namespace),
            Schema::Union(UnionSchema { schemas, .. }) => {
                for schema in schemas {
                    self.check_refs(schema, enclosing_namespace)?;
                }
                Ok(())
            }
            Schema::Record(RecordSchema { name, fields, .. }) => {
                let record_namespace = name.fully_qualified_name(enclosing_namespace).namespace;
                for field in fields {
                    self.check_refs(&field.schema, record_namespace.as_deref())?;
                }
                Ok(())
            }
            Schema::Ref { name } => {
                let fully_qualified_name = name.fully_qualified_name(enclosing_namespace);
                if self.names_ref.contains_key(&fully_qualified_name) {
                    Ok(())
                } else {
                    Err(Details::UnknownSchemaRef(fully_qualified_name).into())
                }
            }
            Schema::Primitive(_) | Schema::Enum(_) | Schema::Fixed(_) => Ok(()),
        }
    }
}

/// Resolves a `Schema::Ref` to the schema it names; any other schema is
/// handed back unchanged.
pub(crate) fn deref_schema<'x>(
    schema: &'x Schema,
    names: &NamesRef<'x>,
    enclosing_namespace: NamespaceRef<'_>,
) -> AvroResult<&'x Schema> {
    match schema {
        Schema::Ref { name } => {
            let fully_qualified_name = name.fully_qualified_name(enclosing_namespace);
            names
                .get(&fully_qualified_name)
                .copied()
                .ok_or_else(|| Details::UnknownSchemaRef(fully_qualified_name).into())
        }
        _ => Ok(schema),
    }
}
