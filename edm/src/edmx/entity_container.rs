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
use crate::edmx::parse_attr;
use crate::edmx::required;
use crate::edmx::schema::facets;
use crate::edmx::DeDocumentation;
use crate::error::EntityProviderError;
use crate::provider::Annotated;
use crate::provider::AssociationSetDef;
use crate::provider::AssociationSetEndDef;
use crate::provider::EntityContainerDef;
use crate::provider::EntitySetDef;
use crate::provider::FunctionImportDef;
use crate::provider::FunctionImportParameterDef;
use crate::provider::ReturnTypeDef;
use crate::provider::Role;
use serde::Deserialize;

/// `EntityContainer` element.
#[derive(Debug, Deserialize)]
pub struct DeEntityContainer {
    #[serde(rename = "@Name")]
    pub name: Option<String>,
    #[serde(rename = "@IsDefaultEntityContainer")]
    pub is_default: Option<bool>,
    #[serde(rename = "@Extends")]
    pub extends: Option<String>,
    #[serde(rename = "$value", default)]
    pub items: Vec<DeEntityContainerItem>,
}

/// Items of `EntityContainer`.
#[derive(Debug, Deserialize)]
pub enum DeEntityContainerItem {
    EntitySet(DeEntitySet),
    AssociationSet(DeAssociationSet),
    FunctionImport(DeFunctionImport),
    Documentation(DeDocumentation),
    #[serde(other)]
    Other,
}

/// `EntitySet` element.
#[derive(Debug, Deserialize)]
pub struct DeEntitySet {
    #[serde(rename = "@Name")]
    pub name: Option<String>,
    #[serde(rename = "@EntityType")]
    pub entity_type: Option<String>,
    #[serde(rename = "Documentation")]
    pub documentation: Option<DeDocumentation>,
}

/// `AssociationSet` element.
#[derive(Debug, Deserialize)]
pub struct DeAssociationSet {
    #[serde(rename = "@Name")]
    pub name: Option<String>,
    #[serde(rename = "@Association")]
    pub association: Option<String>,
    #[serde(rename = "End", default)]
    pub ends: Vec<DeAssociationSetEnd>,
}

/// `End` element of an association set.
#[derive(Debug, Deserialize)]
pub struct DeAssociationSetEnd {
    #[serde(rename = "@EntitySet")]
    pub entity_set: Option<String>,
    #[serde(rename = "@Role")]
    pub role: Option<Role>,
}

/// `FunctionImport` element.
#[derive(Debug, Deserialize)]
pub struct DeFunctionImport {
    #[serde(rename = "@Name")]
    pub name: Option<String>,
    #[serde(rename = "@ReturnType")]
    pub return_type: Option<String>,
    #[serde(rename = "@EntitySet")]
    pub entity_set: Option<String>,
    #[serde(rename = "@HttpMethod")]
    pub http_method: Option<String>,
    #[serde(rename = "Parameter", default)]
    pub parameters: Vec<DeParameter>,
    #[serde(rename = "Documentation")]
    pub documentation: Option<DeDocumentation>,
}

/// `Parameter` element of a function import.
#[derive(Debug, Deserialize)]
pub struct DeParameter {
    #[serde(rename = "@Name")]
    pub name: Option<String>,
    #[serde(rename = "@Type")]
    pub ptype: Option<String>,
    #[serde(rename = "@Mode")]
    pub mode: Option<String>,
    #[serde(rename = "@Nullable")]
    pub nullable: Option<bool>,
    #[serde(rename = "@MaxLength")]
    pub max_length: Option<String>,
    #[serde(rename = "@Precision")]
    pub precision: Option<String>,
    #[serde(rename = "@Scale")]
    pub scale: Option<String>,
}

impl DeEntityContainer {
    /// # Errors
    ///
    /// Returns error if an attribute is missing or invalid.
    pub fn validate(self) -> Result<EntityContainerDef, EntityProviderError> {
        let mut def = EntityContainerDef::new(required(self.name, "Name", "EntityContainer")?);
        def.is_default = self.is_default.unwrap_or(false);
        def.extends = self.extends;
        for item in self.items {
            match item {
                DeEntityContainerItem::EntitySet(s) => def.entity_sets.push(EntitySetDef {
                    name: required(s.name, "Name", "EntitySet")?,
                    entity_type: parse_attr(s.entity_type.as_deref(), "EntityType")?,
                    mapping: None,
                    annotations: annotated(s.documentation),
                }),
                DeEntityContainerItem::AssociationSet(s) => {
                    def.association_sets.push(s.validate()?);
                }
                DeEntityContainerItem::FunctionImport(f) => {
                    def.function_imports.push(f.validate()?);
                }
                DeEntityContainerItem::Documentation(d) => def.annotations = annotated(Some(d)),
                DeEntityContainerItem::Other => (),
            }
        }
        Ok(def)
    }
}

impl DeAssociationSet {
    fn validate(self) -> Result<AssociationSetDef, EntityProviderError> {
        let name = required(self.name, "Name", "AssociationSet")?;
        let association = required(
            parse_attr(self.association.as_deref(), "Association")?,
            "Association",
            "AssociationSet",
        )?;
        let mut ends = self.ends.into_iter().map(|end| {
            Ok::<_, EntityProviderError>(AssociationSetEndDef {
                entity_set: required(end.entity_set, "EntitySet", "End")?,
                role: required(end.role, "Role", "End")?,
                annotations: Annotated::default(),
            })
        });
        match (ends.next(), ends.next(), ends.next()) {
            (Some(end1), Some(end2), None) => Ok(AssociationSetDef {
                name,
                association,
                end1: end1?,
                end2: end2?,
                annotations: Annotated::default(),
            }),
            _ => Err(EntityProviderError::illegal_argument("End").with_content(name)),
        }
    }
}

impl DeFunctionImport {
    fn validate(self) -> Result<FunctionImportDef, EntityProviderError> {
        let name = required(self.name, "Name", "FunctionImport")?;
        let return_type = self
            .return_type
            .as_deref()
            .map(|rt| {
                ReturnTypeDef::parse(rt).ok_or_else(|| {
                    EntityProviderError::illegal_argument("ReturnType").with_content(rt)
                })
            })
            .transpose()?;
        let parameters = self
            .parameters
            .into_iter()
            .map(|p| {
                Ok(FunctionImportParameterDef {
                    name: required(p.name, "Name", "Parameter")?,
                    type_name: parse_attr(p.ptype.as_deref(), "Type")?,
                    mode: p.mode,
                    facets: facets(
                        p.nullable,
                        p.max_length.as_deref(),
                        None,
                        p.precision.as_deref(),
                        p.scale.as_deref(),
                        None,
                        None,
                        None,
                        None,
                    )?,
                    mapping: None,
                    annotations: Annotated::default(),
                })
            })
            .collect::<Result<Vec<_>, EntityProviderError>>()?;
        Ok(FunctionImportDef {
            name,
            return_type,
            entity_set: self.entity_set,
            http_method: self.http_method,
            parameters,
            mapping: None,
            annotations: annotated(self.documentation),
        })
    }
}
