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

//! Raw (unresolved) metadata definitions.
//!
//! Definitions are plain data as a service or a `$metadata` document
//! declares them. Type references are qualified names that may use a
//! schema alias; nothing is checked here. [`crate::model::EdmModel`]
//! resolves and validates them.

/// Entity types, complex types and associations.
pub mod types;

/// Entity containers: entity sets, association sets, function imports.
pub mod container;

use crate::error::EntityProviderError;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::str::FromStr;
use tagged_types::TaggedType;

pub use container::AssociationSetDef;
pub use container::AssociationSetEndDef;
pub use container::EntityContainerDef;
pub use container::EntitySetDef;
pub use container::FunctionImportDef;
pub use container::FunctionImportParameterDef;
pub use container::ReturnTypeDef;
pub use types::target_path;
pub use types::AssociationDef;
pub use types::AssociationEndDef;
pub use types::ComplexTypeDef;
pub use types::ContentKind;
pub use types::CustomizableFeedMappings;
pub use types::EntityTypeDef;
pub use types::NavigationPropertyDef;
pub use types::PropertyDef;
pub use types::ReferentialConstraintDef;
pub use types::ReferentialConstraintRoleDef;

/// Source of raw metadata.
///
/// The provider is only consulted while the model is resolved.
pub trait EdmProvider {
    /// All schemas of the service.
    ///
    /// # Errors
    ///
    /// Returns error if the provider cannot supply the schemas.
    fn schemas(&self) -> Result<Vec<Schema>, EntityProviderError>;
}

impl EdmProvider for Vec<Schema> {
    fn schemas(&self) -> Result<Vec<Schema>, EntityProviderError> {
        Ok(self.clone())
    }
}

/// Name of an association end role.
pub type Role = TaggedType<String, RoleTag>;
#[doc(hidden)]
#[derive(tagged_types::Tag)]
#[implement(Clone, Hash, PartialEq, Eq)]
#[transparent(Debug, Display, Deserialize)]
#[capability(inner_access)]
pub enum RoleTag {}

/// Name qualified with schema namespace (or alias).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FullQualifiedName {
    pub namespace: String,
    pub name: String,
}

impl FullQualifiedName {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl FromStr for FullQualifiedName {
    type Err = String;

    /// Split at the last dot: namespaces may contain dots, names may
    /// not.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.rsplit_once('.') {
            Some((namespace, name)) if !namespace.is_empty() && !name.is_empty() => {
                Ok(Self::new(namespace, name))
            }
            _ => Err(s.into()),
        }
    }
}

impl Display for FullQualifiedName {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}.{}", self.namespace, self.name)
    }
}

/// Cardinality of an association end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Multiplicity {
    /// `1`
    One,
    /// `0..1`
    ZeroToOne,
    /// `*`
    Many,
}

impl Multiplicity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::One => "1",
            Self::ZeroToOne => "0..1",
            Self::Many => "*",
        }
    }
}

impl FromStr for Multiplicity {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1" => Ok(Self::One),
            "0..1" => Ok(Self::ZeroToOne),
            "*" => Ok(Self::Many),
            _ => Err(s.into()),
        }
    }
}

impl Display for Multiplicity {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        self.as_str().fmt(f)
    }
}

/// Service-side mapping hints attached to types and properties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    /// Back-end name of the element.
    pub internal_name: Option<String>,
    /// Property map key that holds the media resource source link.
    pub media_resource_source_key: Option<String>,
    /// Property map key that holds the media resource MIME type.
    pub media_resource_mime_type_key: Option<String>,
}

/// `Documentation` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Documentation {
    pub summary: Option<String>,
    pub long_description: Option<String>,
}

/// Attribute from a foreign namespace attached to a model element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationAttribute {
    pub namespace: String,
    pub prefix: Option<String>,
    pub name: String,
    pub text: String,
}

/// Metadata common to most model elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotated {
    pub documentation: Option<Documentation>,
    pub annotation_attributes: Vec<AnnotationAttribute>,
}

/// `Schema` element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    pub namespace: String,
    pub alias: Option<String>,
    pub entity_types: Vec<EntityTypeDef>,
    pub complex_types: Vec<ComplexTypeDef>,
    pub associations: Vec<AssociationDef>,
    pub entity_containers: Vec<EntityContainerDef>,
    pub annotations: Annotated,
}

impl Schema {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Self::default()
        }
    }
}
