// SPDX-FileCopyrightText: Copyright (c) 2025 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::provider::Annotated;
use crate::provider::FullQualifiedName;
use crate::provider::Mapping;
use crate::provider::Multiplicity;
use crate::provider::Role;
use crate::simple_type::Facets;

/// Entity set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntitySetDef {
    pub name: String,
    pub entity_type: Option<FullQualifiedName>,
    pub mapping: Option<Mapping>,
    pub annotations: Annotated,
}

impl EntitySetDef {
    pub fn new(name: impl Into<String>, entity_type: FullQualifiedName) -> Self {
        Self {
            name: name.into(),
            entity_type: Some(entity_type),
            ..Self::default()
        }
    }
}

/// End of an association set: entity set bound to an association role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationSetEndDef {
    pub entity_set: String,
    pub role: Role,
    pub annotations: Annotated,
}

impl AssociationSetEndDef {
    pub fn new(entity_set: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            entity_set: entity_set.into(),
            role: Role::new(role.into()),
            annotations: Annotated::default(),
        }
    }
}

/// Association set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationSetDef {
    pub name: String,
    pub association: FullQualifiedName,
    pub end1: AssociationSetEndDef,
    pub end2: AssociationSetEndDef,
    pub annotations: Annotated,
}

impl AssociationSetDef {
    pub fn new(
        name: impl Into<String>,
        association: FullQualifiedName,
        end1: AssociationSetEndDef,
        end2: AssociationSetEndDef,
    ) -> Self {
        Self {
            name: name.into(),
            association,
            end1,
            end2,
            annotations: Annotated::default(),
        }
    }
}

/// `ReturnType` of a function import: type name plus multiplicity
/// (`Collection(...)` is [`Multiplicity::Many`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnTypeDef {
    pub type_name: FullQualifiedName,
    pub multiplicity: Multiplicity,
}

impl ReturnTypeDef {
    /// Parse `Namespace.Name` or `Collection(Namespace.Name)`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let (inner, multiplicity) = match s
            .strip_prefix("Collection(")
            .and_then(|s| s.strip_suffix(')'))
        {
            Some(inner) => (inner, Multiplicity::Many),
            None => (s, Multiplicity::ZeroToOne),
        };
        Some(Self {
            type_name: inner.parse().ok()?,
            multiplicity,
        })
    }
}

/// Function import parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionImportParameterDef {
    pub name: String,
    pub type_name: Option<FullQualifiedName>,
    pub mode: Option<String>,
    pub facets: Option<Facets>,
    pub mapping: Option<Mapping>,
    pub annotations: Annotated,
}

/// Function import (service operation).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionImportDef {
    pub name: String,
    pub return_type: Option<ReturnTypeDef>,
    pub entity_set: Option<String>,
    pub http_method: Option<String>,
    pub parameters: Vec<FunctionImportParameterDef>,
    pub mapping: Option<Mapping>,
    pub annotations: Annotated,
}

/// Entity container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityContainerDef {
    pub name: String,
    pub is_default: bool,
    /// Name of the extended container.
    pub extends: Option<String>,
    pub entity_sets: Vec<EntitySetDef>,
    pub association_sets: Vec<AssociationSetDef>,
    pub function_imports: Vec<FunctionImportDef>,
    pub annotations: Annotated,
}

impl EntityContainerDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_default(mut self, v: bool) -> Self {
        self.is_default = v;
        self
    }
}
