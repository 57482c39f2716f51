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

//! Per-request serialization plan of one entity set.
//!
//! [`EntityInfoAggregator`] merges the entity type of an entity set with
//! an [`ExpandSelectTree`] into ordered name lists used by both the
//! producers and the deserializers. It is created for every entry or
//! feed and never shared between calls.

use crate::expand_select::ExpandSelectTree;
use odata_v2_edm::model::ComplexTypeId;
use odata_v2_edm::model::EntityType;
use odata_v2_edm::model::NavigationProperty;
use odata_v2_edm::model::Property;
use odata_v2_edm::model::PropertyType;
use odata_v2_edm::provider::target_path;
use odata_v2_edm::provider::CustomizableFeedMappings;
use odata_v2_edm::provider::FullQualifiedName;
use odata_v2_edm::provider::Multiplicity;
use odata_v2_edm::simple_type::Facets;
use odata_v2_edm::EdmModel;
use odata_v2_edm::EdmSimpleTypeKind;
use odata_v2_edm::EntityProviderError;
use odata_v2_edm::EntitySetRef;
use odata_v2_edm::PropertyMap;
use std::collections::BTreeMap;
use tracing::debug;

/// Type of a property as seen by the codec.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKind {
    Simple(EdmSimpleTypeKind),
    /// Complex type with the infos of its (inherited) properties.
    Complex {
        type_name: FullQualifiedName,
        properties: Vec<EntityPropertyInfo>,
    },
}

/// Structural property of an entity or complex type.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityPropertyInfo {
    pub name: String,
    pub kind: PropertyKind,
    pub facets: Option<Facets>,
    pub mime_type: Option<String>,
    pub feed_mapping: Option<CustomizableFeedMappings>,
}

impl EntityPropertyInfo {
    fn create(
        model: &EdmModel,
        property: &Property,
        stack: &mut Vec<ComplexTypeId>,
    ) -> Result<Self, EntityProviderError> {
        let kind = match property.property_type {
            PropertyType::Simple(kind) => PropertyKind::Simple(kind),
            PropertyType::Complex(id) => {
                if stack.contains(&id) {
                    return Err(EntityProviderError::illegal_argument(property.name.clone())
                        .with_content("recursive complex type"));
                }
                stack.push(id);
                let complex = model.complex_type(id);
                let properties = complex
                    .properties
                    .iter()
                    .map(|p| Self::create(model, p, stack))
                    .collect::<Result<Vec<_>, _>>()?;
                stack.pop();
                PropertyKind::Complex {
                    type_name: complex.name.clone(),
                    properties,
                }
            }
        };
        Ok(Self {
            name: property.name.clone(),
            kind,
            facets: property.facets.clone(),
            mime_type: property.mime_type.clone(),
            feed_mapping: property.customizable_feed_mappings.clone(),
        })
    }

    /// Info of a model property (entity or complex type member).
    ///
    /// # Errors
    ///
    /// Returns `ILLEGAL_ARGUMENT` if the property's complex type
    /// contains itself.
    pub fn from_property(model: &EdmModel, property: &Property) -> Result<Self, EntityProviderError> {
        Self::create(model, property, &mut Vec::new())
    }

    /// Unmapped simple value without facets, such as an element of a
    /// function import collection.
    #[must_use]
    pub fn simple(name: impl Into<String>, kind: EdmSimpleTypeKind) -> Self {
        Self {
            name: name.into(),
            kind: PropertyKind::Simple(kind),
            facets: None,
            mime_type: None,
            feed_mapping: None,
        }
    }

    /// Complex value of type `id`.
    ///
    /// # Errors
    ///
    /// Returns `ILLEGAL_ARGUMENT` if the complex type contains itself.
    pub fn complex(model: &EdmModel, name: impl Into<String>, id: ComplexTypeId) -> Result<Self, EntityProviderError> {
        let complex = model.complex_type(id);
        let mut stack = vec![id];
        let properties = complex
            .properties
            .iter()
            .map(|p| Self::create(model, p, &mut stack))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            name: name.into(),
            kind: PropertyKind::Complex {
                type_name: complex.name.clone(),
                properties,
            },
            facets: None,
            mime_type: None,
            feed_mapping: None,
        })
    }

    #[must_use]
    pub const fn simple_kind(&self) -> Option<EdmSimpleTypeKind> {
        match self.kind {
            PropertyKind::Simple(kind) => Some(kind),
            PropertyKind::Complex { .. } => None,
        }
    }

    #[must_use]
    pub const fn is_complex(&self) -> bool {
        matches!(self.kind, PropertyKind::Complex { .. })
    }

    /// Child property infos of a complex property.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        match &self.kind {
            PropertyKind::Simple(_) => &[],
            PropertyKind::Complex { properties, .. } => properties,
        }
    }

    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Self> {
        self.children().iter().find(|p| p.name == name)
    }

    #[must_use]
    pub fn is_nullable(&self) -> bool {
        self.facets.as_ref().is_none_or(Facets::is_nullable)
    }

    #[must_use]
    pub fn target_path(&self) -> Option<&str> {
        self.feed_mapping
            .as_ref()
            .and_then(|m| m.target_path.as_deref())
    }

    /// Property belongs to the content (properties) block.
    #[must_use]
    pub fn is_kept_in_content(&self) -> bool {
        self.feed_mapping
            .as_ref()
            .is_none_or(CustomizableFeedMappings::is_keep_in_content)
    }

    /// Property has a mapping to a custom (non-syndication) element.
    #[must_use]
    pub fn is_custom_mapped(&self) -> bool {
        self.target_path()
            .is_some_and(|path| !target_path::is_syndication(path))
    }

    /// Type name written into `m:type` / `__metadata.type`.
    #[must_use]
    pub fn type_name(&self) -> String {
        match &self.kind {
            PropertyKind::Simple(kind) => kind.to_string(),
            PropertyKind::Complex { type_name, .. } => type_name.to_string(),
        }
    }
}

/// Selected navigation property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationPropertyInfo {
    pub name: String,
    /// Multiplicity of the `ToRole` end.
    pub multiplicity: Multiplicity,
}

impl NavigationPropertyInfo {
    #[must_use]
    pub fn is_feed(&self) -> bool {
        self.multiplicity == Multiplicity::Many
    }
}

/// Serialization plan of one entity set.
#[derive(Debug, Clone)]
pub struct EntityInfoAggregator<'a> {
    entity_set: EntitySetRef<'a>,
    properties: Vec<EntityPropertyInfo>,
    selected_property_names: Vec<String>,
    selected_navigation_names: Vec<String>,
    expanded_navigation_names: Vec<String>,
    navigation_infos: Vec<NavigationPropertyInfo>,
    key_property_names: Vec<String>,
    etag_property_names: Vec<String>,
    target_path_index: BTreeMap<String, String>,
}

impl<'a> EntityInfoAggregator<'a> {
    /// Create plan for `entity_set`. No tree means everything is
    /// selected and nothing is expanded.
    ///
    /// # Errors
    ///
    /// - `ILLEGAL_ARGUMENT` if the tree names a property that the entity
    ///   type does not have or expands a property that is not a
    ///   navigation property.
    /// - `EXCEPTION_OCCURRED` (with the model error attached) if a
    ///   selected navigation property has inconsistent roles.
    pub fn create(
        entity_set: EntitySetRef<'a>,
        tree: Option<&ExpandSelectTree>,
    ) -> Result<Self, EntityProviderError> {
        let model = entity_set.model();
        let entity_type = entity_set.entity_type();
        if let Some(tree) = tree {
            check_tree(entity_type, tree)?;
        }
        let is_selected = |name: &str| tree.is_none_or(|t| t.is_selected(name));

        let properties = entity_type
            .properties
            .iter()
            .map(|p| EntityPropertyInfo::create(model, p, &mut Vec::new()))
            .collect::<Result<Vec<_>, _>>()?;
        let selected_property_names = properties
            .iter()
            .filter(|p| is_selected(&p.name))
            .map(|p| p.name.clone())
            .collect();

        let selected = entity_type
            .navigation_properties
            .iter()
            .filter(|n| is_selected(&n.name))
            .collect::<Vec<&NavigationProperty>>();
        let navigation_infos = selected
            .iter()
            .map(|nav| {
                Ok(NavigationPropertyInfo {
                    name: nav.name.clone(),
                    multiplicity: model
                        .navigation_multiplicity(entity_set.entity_type_id(), &nav.name)?,
                })
            })
            .collect::<Result<Vec<_>, EntityProviderError>>()?;
        let selected_navigation_names = selected.iter().map(|n| n.name.clone()).collect();
        let expanded_navigation_names = selected
            .iter()
            .filter(|n| tree.is_some_and(|t| t.expanded_link(&n.name).is_some()))
            .map(|n| n.name.clone())
            .collect();

        let target_path_index = properties
            .iter()
            .filter_map(|p| p.target_path().map(|path| (path.to_owned(), p.name.clone())))
            .collect();

        let aggregator = Self {
            entity_set,
            key_property_names: entity_type.key.clone(),
            etag_property_names: entity_type
                .properties
                .iter()
                .filter(|p| p.is_etag())
                .map(|p| p.name.clone())
                .collect(),
            properties,
            selected_property_names,
            selected_navigation_names,
            expanded_navigation_names,
            navigation_infos,
            target_path_index,
        };
        debug!(
            entity_set = aggregator.entity_set_name(),
            properties = aggregator.selected_property_names.len(),
            navigation = aggregator.selected_navigation_names.len(),
            expanded = aggregator.expanded_navigation_names.len(),
            "entity info aggregator created"
        );
        Ok(aggregator)
    }

    #[must_use]
    pub const fn entity_set(&self) -> EntitySetRef<'a> {
        self.entity_set
    }

    #[must_use]
    pub fn entity_set_name(&self) -> &'a str {
        self.entity_set.name()
    }

    /// Entity set name as it appears in URIs: qualified with the
    /// container name unless the container is the default one.
    #[must_use]
    pub fn entity_set_path(&self) -> String {
        if self.entity_set.is_default_container() {
            self.entity_set.name().to_owned()
        } else {
            format!("{}.{}", self.entity_set.container().name, self.entity_set.name())
        }
    }

    #[must_use]
    pub fn entity_type(&self) -> &'a EntityType {
        self.entity_set.entity_type()
    }

    #[must_use]
    pub fn entity_type_name(&self) -> String {
        self.entity_type().name.to_string()
    }

    /// Entries are media link entries.
    #[must_use]
    pub fn has_stream(&self) -> bool {
        self.entity_type().has_stream
    }

    /// All properties in declaration order, ancestors first.
    #[must_use]
    pub fn property_infos(&self) -> &[EntityPropertyInfo] {
        &self.properties
    }

    #[must_use]
    pub fn property_info(&self, name: &str) -> Option<&EntityPropertyInfo> {
        self.properties.iter().find(|p| p.name == name)
    }

    #[must_use]
    pub fn selected_property_names(&self) -> &[String] {
        &self.selected_property_names
    }

    /// Selected properties in declaration order.
    pub fn selected_property_infos(&self) -> impl Iterator<Item = &EntityPropertyInfo> {
        self.properties
            .iter()
            .filter(|p| self.selected_property_names.contains(&p.name))
    }

    #[must_use]
    pub fn selected_navigation_names(&self) -> &[String] {
        &self.selected_navigation_names
    }

    #[must_use]
    pub fn expanded_navigation_names(&self) -> &[String] {
        &self.expanded_navigation_names
    }

    #[must_use]
    pub fn is_expanded(&self, navigation: &str) -> bool {
        self.expanded_navigation_names.iter().any(|n| n == navigation)
    }

    /// Selected navigation properties in declaration order.
    #[must_use]
    pub fn navigation_infos(&self) -> &[NavigationPropertyInfo] {
        &self.navigation_infos
    }

    #[must_use]
    pub fn navigation_info(&self, name: &str) -> Option<&NavigationPropertyInfo> {
        self.navigation_infos.iter().find(|n| n.name == name)
    }

    /// Key properties in key order.
    pub fn key_property_infos(&self) -> impl Iterator<Item = &EntityPropertyInfo> {
        self.key_property_names
            .iter()
            .filter_map(|k| self.property_info(k))
    }

    #[must_use]
    pub fn key_property_names(&self) -> &[String] {
        &self.key_property_names
    }

    /// Properties with `ConcurrencyMode="Fixed"` in declaration order.
    pub fn etag_property_infos(&self) -> impl Iterator<Item = &EntityPropertyInfo> {
        self.etag_property_names
            .iter()
            .filter_map(|k| self.property_info(k))
    }

    /// Property mapped to the target path.
    #[must_use]
    pub fn target_path_info(&self, path: &str) -> Option<&EntityPropertyInfo> {
        self.target_path_index
            .get(path)
            .and_then(|name| self.property_info(name))
    }

    /// First property declared `Nullable=false` that `read` lacks.
    #[must_use]
    pub fn missing_required(&self, read: &PropertyMap) -> Option<&EntityPropertyInfo> {
        self.properties
            .iter()
            .find(|info| !info.is_nullable() && !read.contains_key(&info.name))
    }

    /// Target paths of all mapped properties.
    pub fn target_paths(&self) -> impl Iterator<Item = &str> {
        self.target_path_index.keys().map(String::as_str)
    }
}

fn check_tree(entity_type: &EntityType, tree: &ExpandSelectTree) -> Result<(), EntityProviderError> {
    for name in tree.selected() {
        if entity_type.property(name).is_none() && entity_type.navigation_property(name).is_none() {
            return Err(EntityProviderError::illegal_argument("$select").with_content(name.clone()));
        }
    }
    for (name, _) in tree.expanded() {
        if entity_type.navigation_property(name).is_none() {
            return Err(EntityProviderError::illegal_argument("$expand").with_content(name));
        }
    }
    Ok(())
}
