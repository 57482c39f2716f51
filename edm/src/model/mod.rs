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

//! Resolved entity data model.
//!
//! [`EdmModel`] is an arena: types, associations and containers live in
//! vectors and refer to each other by ids. Resolution (see
//! [`EdmModel::resolve`]) validates raw [`Schema`]s and computes for
//! every type its inherited properties and effective key once. After
//! that the model is immutable and can be shared between threads.
//!
//! Navigation property roles are deliberately not validated during
//! resolution. They are checked every time a navigation property is
//! used ([`EdmModel::navigation_multiplicity`],
//! [`EntitySetRef::related_entity_set`]) and reported as [`EdmError`].
//!
//! [`Schema`]: crate::provider::Schema

/// Entity containers and entity sets.
pub mod container;
/// Resolution of raw schemas.
mod resolve;
/// Resolved types.
pub mod types;

use crate::error::EdmError;
use crate::error::EntityProviderError;
use crate::provider::EdmProvider;
use crate::provider::FullQualifiedName;
use crate::provider::Multiplicity;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::OnceLock;

pub use container::AssociationSet;
pub use container::EntityContainer;
pub use container::EntitySet;
pub use container::EntitySetRef;
pub use container::FunctionImport;
pub use container::FunctionImportParameter;
pub use container::ReturnType;
pub use container::ReturnTypeKind;
pub use types::Association;
pub use types::AssociationEnd;
pub use types::ComplexType;
pub use types::EntityType;
pub use types::NavigationProperty;
pub use types::Property;
pub use types::PropertyType;

macro_rules! arena_id {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
            pub struct $name(pub(crate) usize);
        )*
    };
}

arena_id!(
    /// Entity type in the model.
    EntityTypeId,
    /// Complex type in the model.
    ComplexTypeId,
    /// Association in the model.
    AssociationId,
    /// Entity container in the model.
    ContainerId,
);

/// Resolved, immutable entity data model.
#[derive(Debug, Clone, Default)]
pub struct EdmModel {
    pub(crate) entity_types: Vec<EntityType>,
    pub(crate) complex_types: Vec<ComplexType>,
    pub(crate) associations: Vec<Association>,
    pub(crate) containers: Vec<EntityContainer>,
    pub(crate) entity_type_index: HashMap<FullQualifiedName, EntityTypeId>,
    pub(crate) complex_type_index: HashMap<FullQualifiedName, ComplexTypeId>,
    pub(crate) association_index: HashMap<FullQualifiedName, AssociationId>,
    /// Schema alias to namespace.
    pub(crate) aliases: HashMap<String, String>,
    pub(crate) default_container: Option<ContainerId>,
}

impl EdmModel {
    /// Resolve the schemas supplied by `provider`.
    ///
    /// # Errors
    ///
    /// Returns error if the provider fails or the schemas are invalid.
    pub fn from_provider<P: EdmProvider + ?Sized>(provider: &P) -> Result<Self, EntityProviderError> {
        Self::resolve(provider.schemas()?)
    }

    #[must_use]
    pub fn entity_type(&self, id: EntityTypeId) -> &EntityType {
        &self.entity_types[id.0]
    }

    #[must_use]
    pub fn complex_type(&self, id: ComplexTypeId) -> &ComplexType {
        &self.complex_types[id.0]
    }

    #[must_use]
    pub fn association(&self, id: AssociationId) -> &Association {
        &self.associations[id.0]
    }

    #[must_use]
    pub fn container(&self, id: ContainerId) -> &EntityContainer {
        &self.containers[id.0]
    }

    pub fn entity_types(&self) -> impl Iterator<Item = (EntityTypeId, &EntityType)> {
        self.entity_types
            .iter()
            .enumerate()
            .map(|(i, t)| (EntityTypeId(i), t))
    }

    pub fn complex_types(&self) -> impl Iterator<Item = (ComplexTypeId, &ComplexType)> {
        self.complex_types
            .iter()
            .enumerate()
            .map(|(i, t)| (ComplexTypeId(i), t))
    }

    pub fn containers(&self) -> impl Iterator<Item = (ContainerId, &EntityContainer)> {
        self.containers
            .iter()
            .enumerate()
            .map(|(i, c)| (ContainerId(i), c))
    }

    /// Replace schema alias by its namespace.
    #[must_use]
    pub fn canonical_name(&self, name: &FullQualifiedName) -> FullQualifiedName {
        self.aliases
            .get(&name.namespace)
            .map_or_else(|| name.clone(), |ns| FullQualifiedName::new(ns, &name.name))
    }

    #[must_use]
    pub fn entity_type_by_name(&self, name: &FullQualifiedName) -> Option<EntityTypeId> {
        self.entity_type_index
            .get(&self.canonical_name(name))
            .copied()
    }

    #[must_use]
    pub fn complex_type_by_name(&self, name: &FullQualifiedName) -> Option<ComplexTypeId> {
        self.complex_type_index
            .get(&self.canonical_name(name))
            .copied()
    }

    #[must_use]
    pub fn association_by_name(&self, name: &FullQualifiedName) -> Option<AssociationId> {
        self.association_index
            .get(&self.canonical_name(name))
            .copied()
    }

    /// Entity container by name, or the default container for `None`.
    #[must_use]
    pub fn entity_container(&self, name: Option<&str>) -> Option<ContainerId> {
        match name {
            None => self.default_container,
            Some(name) => self.containers().find(|(_, c)| c.name == name).map(|(id, _)| id),
        }
    }

    /// Entity set by container name (`None` for the default container)
    /// and set name.
    #[must_use]
    pub fn entity_set(&self, container: Option<&str>, name: &str) -> Option<EntitySetRef<'_>> {
        self.entity_set_in(self.entity_container(container)?, name)
    }

    /// Entity set of the default container.
    #[must_use]
    pub fn default_entity_set(&self, name: &str) -> Option<EntitySetRef<'_>> {
        self.entity_set(None, name)
    }

    pub(crate) fn entity_set_in(&self, container: ContainerId, name: &str) -> Option<EntitySetRef<'_>> {
        self.container(container)
            .entity_sets
            .iter()
            .position(|s| s.name == name)
            .map(|index| EntitySetRef {
                model: self,
                container,
                index,
            })
    }

    /// All entity sets of all containers.
    pub fn entity_sets(&self) -> impl Iterator<Item = EntitySetRef<'_>> {
        self.containers().flat_map(move |(container, c)| {
            (0..c.entity_sets.len()).map(move |index| EntitySetRef {
                model: self,
                container,
                index,
            })
        })
    }

    /// Function import by container name (`None` for the default
    /// container) and name.
    #[must_use]
    pub fn function_import(
        &self,
        container: Option<&str>,
        name: &str,
    ) -> Option<&container::FunctionImport> {
        let id = self.entity_container(container)?;
        self.container_chain(id)
            .find_map(|(_, c)| c.function_import(name))
    }

    /// The container followed by the containers it extends.
    pub(crate) fn container_chain(
        &self,
        start: ContainerId,
    ) -> impl Iterator<Item = (ContainerId, &EntityContainer)> {
        let mut next = Some(start);
        std::iter::from_fn(move || {
            let id = next?;
            let container = self.container(id);
            next = container.extends;
            Some((id, container))
        })
        .take(self.containers.len())
    }

    /// The type followed by all its ancestors.
    pub fn type_chain(&self, start: EntityTypeId) -> impl Iterator<Item = (EntityTypeId, &EntityType)> {
        let mut next = Some(start);
        std::iter::from_fn(move || {
            let id = next?;
            let t = self.entity_type(id);
            next = t.base_type;
            Some((id, t))
        })
    }

    /// Check that the navigation roles name both ends of its association.
    ///
    /// # Errors
    ///
    /// Returns [`EdmError::NavigationRoleMismatch`] otherwise.
    pub fn check_roles(&self, nav: &NavigationProperty) -> Result<(), EdmError> {
        let association = self.association(nav.association);
        if association.matches_roles(&nav.from_role, &nav.to_role) {
            Ok(())
        } else {
            Err(EdmError::NavigationRoleMismatch {
                navigation: nav.name.clone(),
                relationship: association.name.to_string(),
                from_role: nav.from_role.to_string(),
                to_role: nav.to_role.to_string(),
            })
        }
    }

    fn to_end(
        &self,
        entity_type: EntityTypeId,
        navigation: &str,
    ) -> Result<&AssociationEnd, EdmError> {
        let t = self.entity_type(entity_type);
        let nav = t.navigation_property(navigation).ok_or_else(|| {
            EdmError::NavigationPropertyNotFound {
                entity_type: t.name.to_string(),
                navigation: navigation.into(),
            }
        })?;
        self.check_roles(nav)?;
        self.association(nav.association)
            .end(&nav.to_role)
            .ok_or_else(|| EdmError::NavigationRoleMismatch {
                navigation: nav.name.clone(),
                relationship: nav.relationship.to_string(),
                from_role: nav.from_role.to_string(),
                to_role: nav.to_role.to_string(),
            })
    }

    /// Multiplicity of the association end named by the navigation
    /// property's `ToRole`.
    ///
    /// # Errors
    ///
    /// Returns error if the navigation property does not exist or its
    /// roles do not match the association ends.
    pub fn navigation_multiplicity(
        &self,
        entity_type: EntityTypeId,
        navigation: &str,
    ) -> Result<Multiplicity, EdmError> {
        self.to_end(entity_type, navigation).map(|end| end.multiplicity)
    }

    /// Entity type at the `ToRole` end of the navigation property.
    ///
    /// # Errors
    ///
    /// Returns error if the navigation property does not exist or its
    /// roles do not match the association ends.
    pub fn navigation_target(
        &self,
        entity_type: EntityTypeId,
        navigation: &str,
    ) -> Result<EntityTypeId, EdmError> {
        self.to_end(entity_type, navigation).map(|end| end.entity_type)
    }
}

/// Model initialized once and shared read-only afterwards.
#[derive(Debug, Default)]
pub struct SharedModel {
    cell: OnceLock<Arc<EdmModel>>,
}

impl SharedModel {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// Model if it has been initialized.
    #[must_use]
    pub fn get(&self) -> Option<Arc<EdmModel>> {
        self.cell.get().cloned()
    }

    /// Return the model, building it with `init` on first use. If two
    /// callers race, the first stored model wins and is returned to both.
    ///
    /// # Errors
    ///
    /// Returns error of `init`. Nothing is stored in that case.
    pub fn get_or_try_init<F>(&self, init: F) -> Result<Arc<EdmModel>, EntityProviderError>
    where
        F: FnOnce() -> Result<EdmModel, EntityProviderError>,
    {
        if let Some(model) = self.cell.get() {
            return Ok(Arc::clone(model));
        }
        let model = Arc::new(init()?);
        Ok(Arc::clone(self.cell.get_or_init(|| model)))
    }
}
