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

use crate::edmx::annotated;
use crate::edmx::entity_container::DeEntityContainer;
use crate::edmx::parse_attr;
use crate::edmx::required;
use crate::edmx::DeDocumentation;
use crate::error::EntityProviderError;
use crate::provider::AssociationDef;
use crate::provider::AssociationEndDef;
use crate::provider::ComplexTypeDef;
use crate::provider::ContentKind;
use crate::provider::CustomizableFeedMappings;
use crate::provider::EntityTypeDef;
use crate::provider::FullQualifiedName;
use crate::provider::NavigationPropertyDef;
use crate::provider::PropertyDef;
use crate::provider::ReferentialConstraintDef;
use crate::provider::ReferentialConstraintRoleDef;
use crate::provider::Role;
use crate::provider::Schema;
use crate::simple_type::ConcurrencyMode;
use crate::simple_type::Facets;
use serde::Deserialize;

/// `Schema` element.
#[derive(Debug, Deserialize)]
pub struct DeSchema {
    #[serde(rename = "@Namespace")]
    pub namespace: Option<String>,
    #[serde(rename = "@Alias")]
    pub alias: Option<String>,
    #[serde(rename = "$value", default)]
    pub items: Vec<DeSchemaItem>,
}

/// Items of `Schema`.
#[derive(Debug, Deserialize)]
pub enum DeSchemaItem {
    EntityType(DeEntityType),
    ComplexType(DeComplexType),
    Association(DeAssociation),
    EntityContainer(DeEntityContainer),
    Documentation(DeDocumentation),
    #[serde(other)]
    Other,
}

impl DeSchema {
    /// # Errors
    ///
    /// Returns error if any child element is invalid.
    pub fn validate(self) -> Result<Schema, EntityProviderError> {
        let mut schema = Schema::new(required(self.namespace, "Namespace", "Schema")?);
        schema.alias = self.alias;
        for item in self.items {
            match item {
                DeSchemaItem::EntityType(v) => schema.entity_types.push(v.validate()?),
                DeSchemaItem::ComplexType(v) => schema.complex_types.push(v.validate()?),
                DeSchemaItem::Association(v) => schema.associations.push(v.validate()?),
                DeSchemaItem::EntityContainer(v) => {
                    schema.entity_containers.push(v.validate()?);
                }
                DeSchemaItem::Documentation(v) => schema.annotations = annotated(Some(v)),
                DeSchemaItem::Other => (),
            }
        }
        Ok(schema)
    }
}

fn qualified(v: Option<&str>, attribute: &str) -> Result<Option<FullQualifiedName>, EntityProviderError> {
    parse_attr(v, attribute)
}

/// Facet attributes shared by properties and function import
/// parameters.
#[allow(clippy::too_many_arguments)]
pub(crate) fn facets(
    nullable: Option<bool>,
    max_length: Option<&str>,
    fixed_length: Option<bool>,
    precision: Option<&str>,
    scale: Option<&str>,
    unicode: Option<bool>,
    default_value: Option<String>,
    collation: Option<String>,
    concurrency_mode: Option<&str>,
) -> Result<Option<Facets>, EntityProviderError> {
    let facets = Facets {
        nullable,
        max_length: parse_attr(max_length.filter(|v| !v.eq_ignore_ascii_case("max")), "MaxLength")?,
        fixed_length,
        precision: parse_attr(precision, "Precision")?,
        scale: parse_attr(scale, "Scale")?,
        unicode,
        default_value,
        collation,
        concurrency_mode: parse_attr::<ConcurrencyMode>(concurrency_mode, "ConcurrencyMode")?,
    };
    Ok((facets != Facets::default()).then_some(facets))
}

fn feed_mappings(
    target_path: Option<String>,
    source_path: Option<String>,
    keep_in_content: Option<bool>,
    content_kind: Option<&str>,
    ns_prefix: Option<String>,
    ns_uri: Option<String>,
) -> Result<Option<CustomizableFeedMappings>, EntityProviderError> {
    let mappings = CustomizableFeedMappings {
        content_kind: parse_attr::<ContentKind>(content_kind, "FC_ContentKind")?,
        target_path,
        source_path,
        keep_in_content,
        ns_prefix,
        ns_uri,
    };
    Ok((mappings != CustomizableFeedMappings::default()).then_some(mappings))
}

/// `EntityType` element.
#[derive(Debug, Deserialize)]
pub struct DeEntityType {
    #[serde(rename = "@Name")]
    pub name: Option<String>,
    #[serde(rename = "@BaseType")]
    pub base_type: Option<String>,
    #[serde(rename = "@Abstract")]
    pub r#abstract: Option<bool>,
    #[serde(rename = "@HasStream")]
    pub has_stream: Option<bool>,
    #[serde(rename = "@FC_TargetPath")]
    pub fc_target_path: Option<String>,
    #[serde(rename = "@FC_SourcePath")]
    pub fc_source_path: Option<String>,
    #[serde(rename = "@FC_KeepInContent")]
    pub fc_keep_in_content: Option<bool>,
    #[serde(rename = "@FC_ContentKind")]
    pub fc_content_kind: Option<String>,
    #[serde(rename = "@FC_NsPrefix")]
    pub fc_ns_prefix: Option<String>,
    #[serde(rename = "@FC_NsUri")]
    pub fc_ns_uri: Option<String>,
    #[serde(rename = "$value", default)]
    pub items: Vec<DeEntityTypeItem>,
}

/// Items of `EntityType`.
#[derive(Debug, Deserialize)]
pub enum DeEntityTypeItem {
    Key(DeKey),
    Property(DeProperty),
    NavigationProperty(DeNavigationProperty),
    Documentation(DeDocumentation),
    #[serde(other)]
    Other,
}

/// `Key` element.
#[derive(Debug, Deserialize)]
pub struct DeKey {
    #[serde(rename = "PropertyRef", default)]
    pub property_refs: Vec<DePropertyRef>,
}

/// `PropertyRef` element.
#[derive(Debug, Deserialize)]
pub struct DePropertyRef {
    #[serde(rename = "@Name")]
    pub name: Option<String>,
}

fn property_refs(refs: Vec<DePropertyRef>) -> Result<Vec<String>, EntityProviderError> {
    refs.into_iter()
        .map(|r| required(r.name, "Name", "PropertyRef"))
        .collect()
}

impl DeEntityType {
    /// # Errors
    ///
    /// Returns error if an attribute is missing or invalid.
    pub fn validate(self) -> Result<EntityTypeDef, EntityProviderError> {
        let mut def = EntityTypeDef::new(required(self.name, "Name", "EntityType")?);
        def.base_type = qualified(self.base_type.as_deref(), "BaseType")?;
        def.is_abstract = self.r#abstract.unwrap_or(false);
        def.has_stream = self.has_stream.unwrap_or(false);
        def.customizable_feed_mappings = feed_mappings(
            self.fc_target_path,
            self.fc_source_path,
            self.fc_keep_in_content,
            self.fc_content_kind.as_deref(),
            self.fc_ns_prefix,
            self.fc_ns_uri,
        )?;
        let mut keys = Vec::new();
        for item in self.items {
            match item {
                DeEntityTypeItem::Key(k) => keys.push(property_refs(k.property_refs)?),
                DeEntityTypeItem::Property(p) => def.properties.push(p.validate()?),
                DeEntityTypeItem::NavigationProperty(n) => {
                    def.navigation_properties.push(n.validate()?);
                }
                DeEntityTypeItem::Documentation(d) => def.annotations = annotated(Some(d)),
                DeEntityTypeItem::Other => (),
            }
        }
        if keys.len() > 1 {
            return Err(EntityProviderError::illegal_argument("Key").with_content(def.name));
        }
        def.key = keys.into_iter().next();
        Ok(def)
    }
}

/// `ComplexType` element.
#[derive(Debug, Deserialize)]
pub struct DeComplexType {
    #[serde(rename = "@Name")]
    pub name: Option<String>,
    #[serde(rename = "@BaseType")]
    pub base_type: Option<String>,
    #[serde(rename = "@Abstract")]
    pub r#abstract: Option<bool>,
    #[serde(rename = "$value", default)]
    pub items: Vec<DeComplexTypeItem>,
}

/// Items of `ComplexType`.
#[derive(Debug, Deserialize)]
pub enum DeComplexTypeItem {
    Property(DeProperty),
    Documentation(DeDocumentation),
    #[serde(other)]
    Other,
}

impl DeComplexType {
    /// # Errors
    ///
    /// Returns error if an attribute is missing or invalid.
    pub fn validate(self) -> Result<ComplexTypeDef, EntityProviderError> {
        let mut def = ComplexTypeDef::new(required(self.name, "Name", "ComplexType")?);
        def.base_type = qualified(self.base_type.as_deref(), "BaseType")?;
        def.is_abstract = self.r#abstract.unwrap_or(false);
        for item in self.items {
            match item {
                DeComplexTypeItem::Property(p) => def.properties.push(p.validate()?),
                DeComplexTypeItem::Documentation(d) => def.annotations = annotated(Some(d)),
                DeComplexTypeItem::Other => (),
            }
        }
        Ok(def)
    }
}

/// `Property` element.
#[derive(Debug, Deserialize)]
pub struct DeProperty {
    #[serde(rename = "@Name")]
    pub name: Option<String>,
    #[serde(rename = "@Type")]
    pub ptype: Option<String>,
    #[serde(rename = "@Nullable")]
    pub nullable: Option<bool>,
    #[serde(rename = "@MaxLength")]
    pub max_length: Option<String>,
    #[serde(rename = "@FixedLength")]
    pub fixed_length: Option<bool>,
    #[serde(rename = "@Precision")]
    pub precision: Option<String>,
    #[serde(rename = "@Scale")]
    pub scale: Option<String>,
    #[serde(rename = "@Unicode")]
    pub unicode: Option<bool>,
    #[serde(rename = "@DefaultValue")]
    pub default_value: Option<String>,
    #[serde(rename = "@Collation")]
    pub collation: Option<String>,
    #[serde(rename = "@ConcurrencyMode")]
    pub concurrency_mode: Option<String>,
    #[serde(rename = "@MimeType")]
    pub mime_type: Option<String>,
    #[serde(rename = "@FC_TargetPath")]
    pub fc_target_path: Option<String>,
    #[serde(rename = "@FC_SourcePath")]
    pub fc_source_path: Option<String>,
    #[serde(rename = "@FC_KeepInContent")]
    pub fc_keep_in_content: Option<bool>,
    #[serde(rename = "@FC_ContentKind")]
    pub fc_content_kind: Option<String>,
    #[serde(rename = "@FC_NsPrefix")]
    pub fc_ns_prefix: Option<String>,
    #[serde(rename = "@FC_NsUri")]
    pub fc_ns_uri: Option<String>,
    #[serde(rename = "Documentation")]
    pub documentation: Option<DeDocumentation>,
}

impl DeProperty {
    /// # Errors
    ///
    /// Returns error if an attribute is missing or invalid.
    pub fn validate(self) -> Result<PropertyDef, EntityProviderError> {
        Ok(PropertyDef {
            name: required(self.name, "Name", "Property")?,
            type_name: qualified(self.ptype.as_deref(), "Type")?,
            facets: facets(
                self.nullable,
                self.max_length.as_deref(),
                self.fixed_length,
                self.precision.as_deref(),
                self.scale.as_deref(),
                self.unicode,
                self.default_value,
                self.collation,
                self.concurrency_mode.as_deref(),
            )?,
            mime_type: self.mime_type,
            mapping: None,
            customizable_feed_mappings: feed_mappings(
                self.fc_target_path,
                self.fc_source_path,
                self.fc_keep_in_content,
                self.fc_content_kind.as_deref(),
                self.fc_ns_prefix,
                self.fc_ns_uri,
            )?,
            annotations: annotated(self.documentation),
        })
    }
}

/// `NavigationProperty` element.
#[derive(Debug, Deserialize)]
pub struct DeNavigationProperty {
    #[serde(rename = "@Name")]
    pub name: Option<String>,
    #[serde(rename = "@Relationship")]
    pub relationship: Option<String>,
    #[serde(rename = "@FromRole")]
    pub from_role: Option<Role>,
    #[serde(rename = "@ToRole")]
    pub to_role: Option<Role>,
    #[serde(rename = "Documentation")]
    pub documentation: Option<DeDocumentation>,
}

impl DeNavigationProperty {
    /// # Errors
    ///
    /// Returns error if an attribute is missing or invalid.
    pub fn validate(self) -> Result<NavigationPropertyDef, EntityProviderError> {
        Ok(NavigationPropertyDef {
            name: required(self.name, "Name", "NavigationProperty")?,
            relationship: qualified(self.relationship.as_deref(), "Relationship")?,
            from_role: required(self.from_role, "FromRole", "NavigationProperty")?,
            to_role: required(self.to_role, "ToRole", "NavigationProperty")?,
            mapping: None,
            annotations: annotated(self.documentation),
        })
    }
}

/// `Association` element.
#[derive(Debug, Deserialize)]
pub struct DeAssociation {
    #[serde(rename = "@Name")]
    pub name: Option<String>,
    #[serde(rename = "$value", default)]
    pub items: Vec<DeAssociationItem>,
}

/// Items of `Association`.
#[derive(Debug, Deserialize)]
pub enum DeAssociationItem {
    End(DeEnd),
    ReferentialConstraint(DeReferentialConstraint),
    Documentation(DeDocumentation),
    #[serde(other)]
    Other,
}

/// `End` element of an association.
#[derive(Debug, Deserialize)]
pub struct DeEnd {
    #[serde(rename = "@Type")]
    pub etype: Option<String>,
    #[serde(rename = "@Role")]
    pub role: Option<Role>,
    #[serde(rename = "@Multiplicity")]
    pub multiplicity: Option<String>,
    #[serde(rename = "Documentation")]
    pub documentation: Option<DeDocumentation>,
}

impl DeEnd {
    fn validate(self) -> Result<AssociationEndDef, EntityProviderError> {
        Ok(AssociationEndDef {
            entity_type: qualified(self.etype.as_deref(), "Type")?,
            role: required(self.role, "Role", "End")?,
            multiplicity: required(
                parse_attr(self.multiplicity.as_deref(), "Multiplicity")?,
                "Multiplicity",
                "End",
            )?,
            annotations: annotated(self.documentation),
        })
    }
}

/// `ReferentialConstraint` element.
#[derive(Debug, Deserialize)]
pub struct DeReferentialConstraint {
    #[serde(rename = "Principal")]
    pub principal: Option<DeConstraintRole>,
    #[serde(rename = "Dependent")]
    pub dependent: Option<DeConstraintRole>,
}

/// `Principal` / `Dependent` element.
#[derive(Debug, Deserialize)]
pub struct DeConstraintRole {
    #[serde(rename = "@Role")]
    pub role: Option<Role>,
    #[serde(rename = "PropertyRef", default)]
    pub property_refs: Vec<DePropertyRef>,
}

impl DeConstraintRole {
    fn validate(self, element: &str) -> Result<ReferentialConstraintRoleDef, EntityProviderError> {
        Ok(ReferentialConstraintRoleDef {
            role: required(self.role, "Role", element)?,
            property_refs: property_refs(self.property_refs)?,
        })
    }
}

impl DeAssociation {
    /// # Errors
    ///
    /// Returns error if an attribute is missing or the association does
    /// not have exactly two ends.
    pub fn validate(self) -> Result<AssociationDef, EntityProviderError> {
        let name = required(self.name, "Name", "Association")?;
        let mut ends = Vec::new();
        let mut constraint = None;
        let mut documentation = None;
        for item in self.items {
            match item {
                DeAssociationItem::End(e) => ends.push(e.validate()?),
                DeAssociationItem::ReferentialConstraint(c) => {
                    constraint = Some(ReferentialConstraintDef {
                        principal: required(c.principal, "Principal", "ReferentialConstraint")?
                            .validate("Principal")?,
                        dependent: required(c.dependent, "Dependent", "ReferentialConstraint")?
                            .validate("Dependent")?,
                    });
                }
                DeAssociationItem::Documentation(d) => documentation = Some(d),
                DeAssociationItem::Other => (),
            }
        }
        let mut ends = ends.into_iter();
        match (ends.next(), ends.next(), ends.next()) {
            (Some(end1), Some(end2), None) => Ok(AssociationDef {
                name,
                end1,
                end2,
                referential_constraint: constraint,
                annotations: annotated(documentation),
            }),
            _ => Err(EntityProviderError::illegal_argument("End").with_content(name)),
        }
    }
}
