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

//! `$metadata` document (EDMX 1.0 with CSDL 2008-09 schemas).
//!
//! Elements are deserialized with quick-xml serde into `De*`
//! structures mirroring the document and then validated into raw
//! [`provider`](crate::provider) definitions. Namespace prefixes are
//! not significant: `m:HasStream` is read as `HasStream`.

/// Schema element and its types.
pub mod schema;

/// Entity container element.
pub mod entity_container;

use crate::error::EntityProviderError;
use crate::model::EdmModel;
use crate::provider::Annotated;
use crate::provider::Documentation;
use crate::provider::EdmProvider;
use crate::provider::Schema;
use crate::xml::check_document_encoding;
use crate::xml::xml_error;
use schema::DeSchema;
use serde::Deserialize;
use std::str::FromStr;

/// EDMX namespace.
pub const NS_EDMX: &str = "http://schemas.microsoft.com/ado/2007/06/edmx";
/// CSDL 2008-09 namespace of schema elements.
pub const NS_EDM_2008_09: &str = "http://schemas.microsoft.com/ado/2008/09/edm";

/// `edmx:Edmx` element.
#[derive(Debug, Deserialize)]
struct DeEdmx {
    #[allow(dead_code)]
    #[serde(rename = "@Version")]
    pub version: Option<String>,
    #[serde(rename = "$value", default)]
    pub items: Vec<DeEdmxItem>,
}

#[derive(Debug, Deserialize)]
enum DeEdmxItem {
    DataServices(DeDataServices),
    #[serde(other)]
    Other,
}

/// `edmx:DataServices` element.
#[derive(Debug, Deserialize)]
struct DeDataServices {
    #[serde(rename = "@DataServiceVersion")]
    pub data_service_version: Option<String>,
    #[serde(rename = "$value", default)]
    pub items: Vec<DeDataServicesItem>,
}

#[derive(Debug, Deserialize)]
enum DeDataServicesItem {
    Schema(DeSchema),
    #[serde(other)]
    Other,
}

/// `Documentation` element.
#[derive(Debug, Default, Deserialize)]
pub struct DeDocumentation {
    #[serde(rename = "Summary")]
    pub summary: Option<String>,
    #[serde(rename = "LongDescription")]
    pub long_description: Option<String>,
}

impl DeDocumentation {
    fn validate(self) -> Documentation {
        Documentation {
            summary: self.summary,
            long_description: self.long_description,
        }
    }
}

/// Annotations of an element from its optional `Documentation` child.
pub(crate) fn annotated(documentation: Option<DeDocumentation>) -> Annotated {
    Annotated {
        documentation: documentation.map(DeDocumentation::validate),
        annotation_attributes: Vec::new(),
    }
}

/// Required attribute.
pub(crate) fn required<T>(v: Option<T>, attribute: &str, element: &str) -> Result<T, EntityProviderError> {
    v.ok_or_else(|| EntityProviderError::missing_attribute(attribute, element))
}

/// Parse attribute text.
pub(crate) fn parse_attr<T: FromStr>(v: Option<&str>, attribute: &str) -> Result<Option<T>, EntityProviderError> {
    v.map(|s| {
        s.parse()
            .map_err(|_| EntityProviderError::illegal_argument(attribute).with_content(s))
    })
    .transpose()
}

/// Validated `$metadata` document.
#[derive(Debug, Clone)]
pub struct Edmx {
    /// `m:DataServiceVersion` of the data services element.
    pub data_service_version: Option<String>,
    pub schemas: Vec<Schema>,
}

impl Edmx {
    /// Parse `$metadata` document.
    ///
    /// # Errors
    ///
    /// - `UNSUPPORTED_CHARACTER_ENCODING` if the document is not UTF-8.
    /// - `EXCEPTION_OCCURRED` if the document is not well-formed.
    /// - `MISSING_ATTRIBUTE` / `ILLEGAL_ARGUMENT` for invalid elements.
    pub fn parse(data: &[u8]) -> Result<Self, EntityProviderError> {
        check_document_encoding(data)?;
        let text = std::str::from_utf8(data).map_err(EntityProviderError::exception_occurred)?;
        quick_xml::de::from_str::<DeEdmx>(text)
            .map_err(xml_error)?
            .validate()
    }
}

impl DeEdmx {
    fn validate(self) -> Result<Edmx, EntityProviderError> {
        let mut data_services = self.items.into_iter().filter_map(|item| match item {
            DeEdmxItem::DataServices(ds) => Some(ds),
            DeEdmxItem::Other => None,
        });
        let ds = data_services
            .next()
            .ok_or_else(|| EntityProviderError::missing_attribute("DataServices", "Edmx"))?;
        if data_services.next().is_some() {
            return Err(EntityProviderError::illegal_argument("DataServices"));
        }
        let schemas = ds
            .items
            .into_iter()
            .filter_map(|item| match item {
                DeDataServicesItem::Schema(s) => Some(s.validate()),
                DeDataServicesItem::Other => None,
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Edmx {
            data_service_version: ds.data_service_version,
            schemas,
        })
    }
}

/// Provider backed by a parsed `$metadata` document.
#[derive(Debug, Clone)]
pub struct EdmxProvider {
    edmx: Edmx,
}

impl EdmxProvider {
    /// # Errors
    ///
    /// See [`Edmx::parse`].
    pub fn parse(data: &[u8]) -> Result<Self, EntityProviderError> {
        Edmx::parse(data).map(|edmx| Self { edmx })
    }

    #[must_use]
    pub const fn edmx(&self) -> &Edmx {
        &self.edmx
    }
}

impl EdmProvider for EdmxProvider {
    fn schemas(&self) -> Result<Vec<Schema>, EntityProviderError> {
        Ok(self.edmx.schemas.clone())
    }
}

/// Read `$metadata` document into a resolved model.
///
/// # Errors
///
/// Returns error if the document cannot be parsed or resolved.
pub fn read_metadata(data: &[u8]) -> Result<EdmModel, EntityProviderError> {
    EdmModel::from_provider(&EdmxProvider::parse(data)?)
}
