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

use crate::model::AssociationId;
use crate::model::ComplexTypeId;
use crate::model::EntityTypeId;
use crate::provider::Annotated;
use crate::provider::CustomizableFeedMappings;
use crate::provider::FullQualifiedName;
use crate::provider::Mapping;
use crate::provider::Multiplicity;
use crate::provider::ReferentialConstraintDef;
use crate::provider::Role;
use crate::simple_type::EdmSimpleTypeKind;
use crate::simple_type::Facets;

/// Resolved type of a structural property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType {
    Simple(EdmSimpleTypeKind),
    Complex(ComplexTypeId),
}

/// Resolved structural property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub property_type: PropertyType,
    pub facets: Option<Facets>,
    pub mime_type: Option<String>,
    pub mapping: Option<Mapping>,
    pub customizable_feed_mappings: Option<CustomizableFeedMappings>,
    pub annotations: Annotated,
}

impl Property {
    #[must_use]
    pub const fn simple_kind(&self) -> Option<EdmSimpleTypeKind> {
        match self.property_type {
            PropertyType::Simple(kind) => Some(kind),
            PropertyType::Complex(_) => None,
        }
    }

    #[must_use]
    pub fn is_nullable(&self) -> bool {
        self.facets.as_ref().is_none_or(Facets::is_nullable)
    }

    #[must_use]
    pub fn is_etag(&self) -> bool {
        self.facets.as_ref().is_some_and(Facets::is_concurrency_fixed)
    }

    /// Target path of the feed mapping if the property has one.
    #[must_use]
    pub fn target_path(&self) -> Option<&str> {
        self.customizable_feed_mappings
            .as_ref()
            .and_then(|m| m.target_path.as_deref())
    }

    /// Property is written into (and read from) the content block.
    #[must_use]
    pub fn is_kept_in_content(&self) -> bool {
        self.customizable_feed_mappings
            .as_ref()
            .is_none_or(CustomizableFeedMappings::is_keep_in_content)
    }
}

/// Resolved navigation property. Roles are checked against the
/// association ends only when the property is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationProperty {
    pub name: String,
    pub relationship: FullQualifiedName,
    pub association: AssociationId,
    pub from_role: Role,
    pub to_role: Role,
    pub mapping: Option<Mapping>,
    pub annotations: Annotated,
}

/// Resolved complex type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexType {
    pub name: FullQualifiedName,
    pub base_type: Option<ComplexTypeId>,
    pub is_abstract: bool,
    /// Own and inherited properties, ancestors first.
    pub properties: Vec<Property>,
    pub annotations: Annotated,
}

impl ComplexType {
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// Resolved entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityType {
    pub name: FullQualifiedName,
    pub base_type: Option<EntityTypeId>,
    pub is_abstract: bool,
    pub has_stream: bool,
    /// Effective key: the key of the closest ancestor-or-self that
    /// declares one. Empty for intermediate types whose descendants
    /// declare the key.
    pub key: Vec<String>,
    /// Own and inherited properties, ancestors first.
    pub properties: Vec<Property>,
    /// Own and inherited navigation properties, ancestors first.
    pub navigation_properties: Vec<NavigationProperty>,
    pub mapping: Option<Mapping>,
    pub customizable_feed_mappings: Option<CustomizableFeedMappings>,
    pub annotations: Annotated,
}

impl EntityType {
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    #[must_use]
    pub fn navigation_property(&self, name: &str) -> Option<&NavigationProperty> {
        self.navigation_properties.iter().find(|p| p.name == name)
    }

    /// Key properties in key order.
    pub fn key_properties(&self) -> impl Iterator<Item = &Property> {
        self.key.iter().filter_map(|k| self.property(k))
    }

    /// Key of media resource source link in entity data.
    #[must_use]
    pub fn media_resource_source_key(&self) -> Option<&str> {
        self.mapping
            .as_ref()
            .and_then(|m| m.media_resource_source_key.as_deref())
    }

    /// Key of media resource MIME type in entity data.
    #[must_use]
    pub fn media_resource_mime_type_key(&self) -> Option<&str> {
        self.mapping
            .as_ref()
            .and_then(|m| m.media_resource_mime_type_key.as_deref())
    }
}

/// Resolved association end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationEnd {
    pub entity_type: EntityTypeId,
    pub role: Role,
    pub multiplicity: Multiplicity,
}

/// Resolved association.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Association {
    pub name: FullQualifiedName,
    pub end1: AssociationEnd,
    pub end2: AssociationEnd,
    pub referential_constraint: Option<ReferentialConstraintDef>,
    pub annotations: Annotated,
}

impl Association {
    /// End with the given role.
    #[must_use]
    pub fn end(&self, role: &Role) -> Option<&AssociationEnd> {
        [&self.end1, &self.end2]
            .into_iter()
            .find(|end| &end.role == role)
    }

    /// Roles `a` and `b` name both ends, in any order.
    #[must_use]
    pub fn matches_roles(&self, a: &Role, b: &Role) -> bool {
        (&self.end1.role == a && &self.end2.role == b)
            || (&self.end1.role == b && &self.end2.role == a)
    }
}
