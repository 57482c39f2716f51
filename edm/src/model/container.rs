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

use crate::error::EdmError;
use crate::model::AssociationId;
use crate::model::ComplexTypeId;
use crate::model::ContainerId;
use crate::model::EdmModel;
use crate::model::EntityType;
use crate::model::EntityTypeId;
use crate::model::NavigationProperty;
use crate::provider::Annotated;
use crate::provider::AssociationSetEndDef;
use crate::provider::Mapping;
use crate::provider::Multiplicity;
use crate::simple_type::EdmSimpleTypeKind;
use crate::simple_type::Facets;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use tracing::trace;

/// Resolved entity set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySet {
    pub name: String,
    pub entity_type: EntityTypeId,
    pub mapping: Option<Mapping>,
    pub annotations: Annotated,
}

/// Resolved association set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationSet {
    pub name: String,
    pub association: AssociationId,
    pub end1: AssociationSetEndDef,
    pub end2: AssociationSetEndDef,
    pub annotations: Annotated,
}

/// Resolved return type kind of a function import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnTypeKind {
    Simple(EdmSimpleTypeKind),
    Complex(ComplexTypeId),
    Entity(EntityTypeId),
}

/// Resolved return type of a function import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReturnType {
    pub kind: ReturnTypeKind,
    pub multiplicity: Multiplicity,
}

/// Resolved function import parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionImportParameter {
    pub name: String,
    pub kind: EdmSimpleTypeKind,
    pub mode: Option<String>,
    pub facets: Option<Facets>,
    pub mapping: Option<Mapping>,
    pub annotations: Annotated,
}

/// Resolved function import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionImport {
    pub name: String,
    pub return_type: Option<ReturnType>,
    pub entity_set: Option<String>,
    pub http_method: Option<String>,
    pub parameters: Vec<FunctionImportParameter>,
    pub mapping: Option<Mapping>,
    pub annotations: Annotated,
}

/// Resolved entity container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityContainer {
    pub name: String,
    /// Namespace of the schema that declares the container.
    pub namespace: String,
    pub is_default: bool,
    pub extends: Option<ContainerId>,
    pub entity_sets: Vec<EntitySet>,
    pub association_sets: Vec<AssociationSet>,
    pub function_imports: Vec<FunctionImport>,
    pub annotations: Annotated,
}

impl EntityContainer {
    #[must_use]
    pub fn function_import(&self, name: &str) -> Option<&FunctionImport> {
        self.function_imports.iter().find(|f| f.name == name)
    }
}

/// Entity set of a resolved model.
#[derive(Clone, Copy)]
pub struct EntitySetRef<'a> {
    pub(crate) model: &'a EdmModel,
    pub(crate) container: ContainerId,
    pub(crate) index: usize,
}

impl<'a> EntitySetRef<'a> {
    #[must_use]
    pub fn model(&self) -> &'a EdmModel {
        self.model
    }

    #[must_use]
    pub fn entity_set(&self) -> &'a EntitySet {
        &self.container().entity_sets[self.index]
    }

    #[must_use]
    pub fn name(&self) -> &'a str {
        &self.entity_set().name
    }

    #[must_use]
    pub fn container(&self) -> &'a EntityContainer {
        self.model.container(self.container)
    }

    #[must_use]
    pub fn entity_type_id(&self) -> EntityTypeId {
        self.entity_set().entity_type
    }

    #[must_use]
    pub fn entity_type(&self) -> &'a EntityType {
        self.model.entity_type(self.entity_type_id())
    }

    /// Set belongs to the default entity container.
    #[must_use]
    pub fn is_default_container(&self) -> bool {
        self.model.default_container == Some(self.container)
    }

    /// Navigation property of the set's entity type.
    ///
    /// # Errors
    ///
    /// Returns error if the entity type has no such navigation property.
    pub fn navigation_property(&self, name: &str) -> Result<&'a NavigationProperty, EdmError> {
        self.entity_type().navigation_property(name).ok_or_else(|| {
            EdmError::NavigationPropertyNotFound {
                entity_type: self.entity_type().name.to_string(),
                navigation: name.into(),
            }
        })
    }

    /// Entity set at the other end of the navigation property.
    ///
    /// Looks up the association set of the owning container (and the
    /// containers it extends) whose association is the navigation's
    /// relationship and whose `FromRole` end is bound to this set.
    /// Nothing is cached.
    ///
    /// # Errors
    ///
    /// Returns error if the navigation property does not exist, its
    /// roles do not match the association or no association set
    /// connects the sets.
    pub fn related_entity_set(&self, navigation: &str) -> Result<EntitySetRef<'a>, EdmError> {
        let nav = self.navigation_property(navigation)?;
        self.model.check_roles(nav)?;
        let not_found = || EdmError::AssociationSetNotFound {
            entity_set: self.name().into(),
            navigation: navigation.into(),
        };
        let (container, target) = self
            .model
            .container_chain(self.container)
            .find_map(|(id, container)| {
                container
                    .association_sets
                    .iter()
                    .filter(|set| set.association == nav.association)
                    .find_map(|set| {
                        let (from, to) = if set.end1.role == nav.from_role {
                            (&set.end1, &set.end2)
                        } else {
                            (&set.end2, &set.end1)
                        };
                        (from.role == nav.from_role
                            && to.role == nav.to_role
                            && from.entity_set == self.name())
                        .then(|| (id, to.entity_set.as_str()))
                    })
            })
            .ok_or_else(not_found)?;
        trace!(
            entity_set = self.name(),
            navigation,
            target,
            "related entity set"
        );
        self.model
            .container_chain(container)
            .find_map(|(id, _)| self.model.entity_set_in(id, target))
            .ok_or_else(|| EdmError::EntitySetNotFound(target.into()))
    }
}

impl Debug for EntitySetRef<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("EntitySetRef")
            .field("container", &self.container().name)
            .field("name", &self.name())
            .finish()
    }
}

impl PartialEq for EntitySetRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.model, other.model)
            && self.container == other.container
            && self.index == other.index
    }
}
