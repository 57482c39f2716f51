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
use crate::simple_type::EdmSimpleTypeKind;
use crate::simple_type::Facets;
use std::str::FromStr;

/// Target paths of customizable feed mappings that map to Atom
/// syndication elements.
pub mod target_path {
    pub const SYNDICATION_AUTHOR_NAME: &str = "SyndicationAuthorName";
    pub const SYNDICATION_AUTHOR_EMAIL: &str = "SyndicationAuthorEmail";
    pub const SYNDICATION_AUTHOR_URI: &str = "SyndicationAuthorUri";
    pub const SYNDICATION_PUBLISHED: &str = "SyndicationPublished";
    pub const SYNDICATION_RIGHTS: &str = "SyndicationRights";
    pub const SYNDICATION_TITLE: &str = "SyndicationTitle";
    pub const SYNDICATION_UPDATED: &str = "SyndicationUpdated";
    pub const SYNDICATION_CONTRIBUTOR_NAME: &str = "SyndicationContributorName";
    pub const SYNDICATION_CONTRIBUTOR_EMAIL: &str = "SyndicationContributorEmail";
    pub const SYNDICATION_CONTRIBUTOR_URI: &str = "SyndicationContributorUri";
    pub const SYNDICATION_SOURCE: &str = "SyndicationSource";
    pub const SYNDICATION_SUMMARY: &str = "SyndicationSummary";

    pub const ALL: [&str; 12] = [
        SYNDICATION_AUTHOR_NAME,
        SYNDICATION_AUTHOR_EMAIL,
        SYNDICATION_AUTHOR_URI,
        SYNDICATION_PUBLISHED,
        SYNDICATION_RIGHTS,
        SYNDICATION_TITLE,
        SYNDICATION_UPDATED,
        SYNDICATION_CONTRIBUTOR_NAME,
        SYNDICATION_CONTRIBUTOR_EMAIL,
        SYNDICATION_CONTRIBUTOR_URI,
        SYNDICATION_SOURCE,
        SYNDICATION_SUMMARY,
    ];

    /// Target path is one of the Atom syndication paths.
    #[must_use]
    pub fn is_syndication(path: &str) -> bool {
        ALL.contains(&path)
    }
}

/// `m:FC_ContentKind` values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContentKind {
    #[default]
    Text,
    Html,
    Xhtml,
}

impl ContentKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Html => "html",
            Self::Xhtml => "xhtml",
        }
    }
}

impl FromStr for ContentKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "html" => Ok(Self::Html),
            "xhtml" => Ok(Self::Xhtml),
            _ => Err(s.into()),
        }
    }
}

/// Customizable feed mapping (`m:FC_*` attributes).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomizableFeedMappings {
    pub target_path: Option<String>,
    pub source_path: Option<String>,
    pub keep_in_content: Option<bool>,
    pub content_kind: Option<ContentKind>,
    pub ns_prefix: Option<String>,
    pub ns_uri: Option<String>,
}

impl CustomizableFeedMappings {
    /// Mapping to `target_path`, removed from content.
    pub fn target(target_path: impl Into<String>) -> Self {
        Self {
            target_path: Some(target_path.into()),
            keep_in_content: Some(false),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_namespace(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.ns_prefix = Some(prefix.into());
        self.ns_uri = Some(uri.into());
        self
    }

    #[must_use]
    pub const fn with_keep_in_content(mut self, v: bool) -> Self {
        self.keep_in_content = Some(v);
        self
    }

    /// `FC_KeepInContent` with its default (`true`) applied.
    #[must_use]
    pub fn is_keep_in_content(&self) -> bool {
        self.keep_in_content.unwrap_or(true)
    }
}

/// Structural property.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyDef {
    pub name: String,
    /// `Edm.*` simple type or complex type name.
    pub type_name: Option<FullQualifiedName>,
    pub facets: Option<Facets>,
    pub mime_type: Option<String>,
    pub mapping: Option<Mapping>,
    pub customizable_feed_mappings: Option<CustomizableFeedMappings>,
    pub annotations: Annotated,
}

impl PropertyDef {
    /// Property of simple type.
    pub fn simple(name: impl Into<String>, kind: EdmSimpleTypeKind) -> Self {
        Self {
            name: name.into(),
            type_name: Some(FullQualifiedName::new(
                crate::simple_type::EDM_NAMESPACE,
                kind.name(),
            )),
            ..Self::default()
        }
    }

    /// Property of complex type.
    pub fn complex(name: impl Into<String>, type_name: FullQualifiedName) -> Self {
        Self {
            name: name.into(),
            type_name: Some(type_name),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_facets(mut self, facets: Facets) -> Self {
        self.facets = Some(facets);
        self
    }

    #[must_use]
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    #[must_use]
    pub fn with_feed_mappings(mut self, mappings: CustomizableFeedMappings) -> Self {
        self.customizable_feed_mappings = Some(mappings);
        self
    }
}

/// Navigation property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationPropertyDef {
    pub name: String,
    pub relationship: Option<FullQualifiedName>,
    pub from_role: Role,
    pub to_role: Role,
    pub mapping: Option<Mapping>,
    pub annotations: Annotated,
}

impl NavigationPropertyDef {
    pub fn new(
        name: impl Into<String>,
        relationship: FullQualifiedName,
        from_role: impl Into<String>,
        to_role: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            relationship: Some(relationship),
            from_role: Role::new(from_role.into()),
            to_role: Role::new(to_role.into()),
            mapping: None,
            annotations: Annotated::default(),
        }
    }
}

/// Entity type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityTypeDef {
    pub name: String,
    pub base_type: Option<FullQualifiedName>,
    pub is_abstract: bool,
    pub has_stream: bool,
    /// Names of key properties. `None` when the type declares no key.
    pub key: Option<Vec<String>>,
    pub properties: Vec<PropertyDef>,
    pub navigation_properties: Vec<NavigationPropertyDef>,
    pub mapping: Option<Mapping>,
    pub customizable_feed_mappings: Option<CustomizableFeedMappings>,
    pub annotations: Annotated,
}

impl EntityTypeDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_key<I, S>(mut self, key: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key = Some(key.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_base_type(mut self, base_type: FullQualifiedName) -> Self {
        self.base_type = Some(base_type);
        self
    }

    #[must_use]
    pub fn with_property(mut self, property: PropertyDef) -> Self {
        self.properties.push(property);
        self
    }

    #[must_use]
    pub fn with_navigation_property(mut self, navigation: NavigationPropertyDef) -> Self {
        self.navigation_properties.push(navigation);
        self
    }

    #[must_use]
    pub const fn with_has_stream(mut self, v: bool) -> Self {
        self.has_stream = v;
        self
    }

    #[must_use]
    pub fn with_mapping(mut self, mapping: Mapping) -> Self {
        self.mapping = Some(mapping);
        self
    }
}

/// Complex type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplexTypeDef {
    pub name: String,
    pub base_type: Option<FullQualifiedName>,
    pub is_abstract: bool,
    pub properties: Vec<PropertyDef>,
    pub annotations: Annotated,
}

impl ComplexTypeDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_base_type(mut self, base_type: FullQualifiedName) -> Self {
        self.base_type = Some(base_type);
        self
    }

    #[must_use]
    pub fn with_property(mut self, property: PropertyDef) -> Self {
        self.properties.push(property);
        self
    }
}

/// Association end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationEndDef {
    pub entity_type: Option<FullQualifiedName>,
    pub role: Role,
    pub multiplicity: Multiplicity,
    pub annotations: Annotated,
}

impl AssociationEndDef {
    pub fn new(
        entity_type: FullQualifiedName,
        role: impl Into<String>,
        multiplicity: Multiplicity,
    ) -> Self {
        Self {
            entity_type: Some(entity_type),
            role: Role::new(role.into()),
            multiplicity,
            annotations: Annotated::default(),
        }
    }
}

/// Principal or dependent role of a referential constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferentialConstraintRoleDef {
    pub role: Role,
    /// Ordered `PropertyRef` names.
    pub property_refs: Vec<String>,
}

/// Referential constraint of an association.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferentialConstraintDef {
    pub principal: ReferentialConstraintRoleDef,
    pub dependent: ReferentialConstraintRoleDef,
}

/// Association.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationDef {
    pub name: String,
    pub end1: AssociationEndDef,
    pub end2: AssociationEndDef,
    pub referential_constraint: Option<ReferentialConstraintDef>,
    pub annotations: Annotated,
}

impl AssociationDef {
    pub fn new(name: impl Into<String>, end1: AssociationEndDef, end2: AssociationEndDef) -> Self {
        Self {
            name: name.into(),
            end1,
            end2,
            referential_constraint: None,
            annotations: Annotated::default(),
        }
    }

    /// End with the given role.
    #[must_use]
    pub fn end(&self, role: &Role) -> Option<&AssociationEndDef> {
        [&self.end1, &self.end2]
            .into_iter()
            .find(|end| &end.role == role)
    }
}
