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

//! Format-independent entry point.
//!
//! [`EntityProvider`] dispatches every read and write to the Atom or
//! JSON implementation of the selected [`ContentType`] and packs write
//! results into an [`ODataResponse`].

use crate::aggregator::EntityInfoAggregator;
use crate::aggregator::EntityPropertyInfo;
use crate::atom;
use crate::atom::consumer::AtomEntryConsumer;
use crate::atom::producer::AtomEntryProducer;
use crate::atom::producer::AtomFeedProducer;
use crate::convert::format_simple;
use crate::entry::ODataEntry;
use crate::entry::ODataFeed;
use crate::entry::ODataLinks;
use crate::json;
use crate::json::consumer::JsonEntryConsumer;
use crate::json::producer::JsonEntryProducer;
use crate::json::producer::JsonFeedProducer;
use crate::properties::EntityProviderReadProperties;
use crate::properties::EntityProviderWriteProperties;
use crate::uri;
use crate::uri::ETag;
use odata_v2_edm::edmx;
use odata_v2_edm::model::FunctionImport;
use odata_v2_edm::model::ReturnTypeKind;
use odata_v2_edm::provider::Multiplicity;
use odata_v2_edm::EdmModel;
use odata_v2_edm::EntityProviderError;
use odata_v2_edm::EntitySetRef;
use odata_v2_edm::LiteralKind;
use odata_v2_edm::PropertyMap;
use odata_v2_edm::ScalarValue;
use odata_v2_edm::Value;

/// Content type of raw property values without MIME type.
pub const CONTENT_TYPE_TEXT: &str = "text/plain;charset=utf-8";

/// Wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Atom,
    Json,
}

impl ContentType {
    #[must_use]
    pub const fn entry(self) -> &'static str {
        match self {
            Self::Atom => atom::CONTENT_TYPE_ENTRY,
            Self::Json => json::CONTENT_TYPE_JSON,
        }
    }

    #[must_use]
    pub const fn feed(self) -> &'static str {
        match self {
            Self::Atom => atom::CONTENT_TYPE_FEED,
            Self::Json => json::CONTENT_TYPE_JSON,
        }
    }

    /// Content type of property and link documents.
    #[must_use]
    pub const fn plain(self) -> &'static str {
        match self {
            Self::Atom => atom::CONTENT_TYPE_XML,
            Self::Json => json::CONTENT_TYPE_JSON,
        }
    }
}

/// Written document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ODataResponse {
    pub body: Vec<u8>,
    pub content_type: String,
    /// Entity tag of a written entry.
    pub etag: Option<ETag>,
    /// Absolute URI of a written entry.
    pub location: Option<String>,
}

impl ODataResponse {
    fn new(body: Vec<u8>, content_type: &str) -> Self {
        Self {
            body,
            content_type: content_type.into(),
            etag: None,
            location: None,
        }
    }
}

fn property_info(entity_set: EntitySetRef<'_>, name: &str) -> Result<EntityPropertyInfo, EntityProviderError> {
    let property = entity_set
        .entity_type()
        .property(name)
        .ok_or_else(|| EntityProviderError::invalid_property(name))?;
    EntityPropertyInfo::from_property(entity_set.model(), property)
}

/// Entry, feed, property and link codec of one format.
#[derive(Debug, Clone, Copy)]
pub struct EntityProvider {
    content_type: ContentType,
}

impl EntityProvider {
    #[must_use]
    pub const fn new(content_type: ContentType) -> Self {
        Self { content_type }
    }

    #[must_use]
    pub const fn content_type(&self) -> ContentType {
        self.content_type
    }

    /// Write one entry of `entity_set`.
    ///
    /// # Errors
    ///
    /// Returns error if the expand/select tree does not fit the entity
    /// type, data does not fit the properties or an expanded navigation
    /// property cannot be written.
    pub fn write_entry(
        &self,
        entity_set: EntitySetRef<'_>,
        data: &PropertyMap,
        properties: &EntityProviderWriteProperties,
    ) -> Result<ODataResponse, EntityProviderError> {
        let aggregator = EntityInfoAggregator::create(entity_set, properties.expand_select_tree())?;
        let (body, result) = match self.content_type {
            ContentType::Atom => AtomEntryProducer::new(properties).write(&aggregator, data)?,
            ContentType::Json => JsonEntryProducer::new(properties).write(&aggregator, data)?,
        };
        Ok(ODataResponse {
            etag: result.etag,
            location: result.location,
            ..ODataResponse::new(body, self.content_type.entry())
        })
    }

    /// Write entries of `entity_set` as feed.
    ///
    /// # Errors
    ///
    /// See [`Self::write_entry`].
    pub fn write_feed(
        &self,
        entity_set: EntitySetRef<'_>,
        data: &[PropertyMap],
        properties: &EntityProviderWriteProperties,
    ) -> Result<ODataResponse, EntityProviderError> {
        let aggregator = EntityInfoAggregator::create(entity_set, properties.expand_select_tree())?;
        let body = match self.content_type {
            ContentType::Atom => AtomFeedProducer::new(properties).write(&aggregator, data)?,
            ContentType::Json => JsonFeedProducer::new(properties).write(&aggregator, data)?,
        };
        Ok(ODataResponse::new(body, self.content_type.feed()))
    }

    /// Write single property of the entity type of `entity_set`.
    ///
    /// # Errors
    ///
    /// Returns `INVALID_PROPERTY` if the entity type has no such property
    /// and an error if the value does not fit it.
    pub fn write_property(
        &self,
        entity_set: EntitySetRef<'_>,
        name: &str,
        value: Option<&Value>,
        properties: &EntityProviderWriteProperties,
    ) -> Result<ODataResponse, EntityProviderError> {
        let info = property_info(entity_set, name)?;
        let body = match self.content_type {
            ContentType::Atom => atom::misc::write_property(&info, value, properties)?,
            ContentType::Json => json::misc::write_property(&info, value, properties)?,
        };
        Ok(ODataResponse::new(body, self.content_type.plain()))
    }

    /// Write collection result of a function import returning
    /// `Collection(simple or complex type)`.
    ///
    /// # Errors
    ///
    /// Returns `ILLEGAL_ARGUMENT` if the function import does not return
    /// such a collection.
    pub fn write_collection(
        &self,
        model: &EdmModel,
        function_import: &FunctionImport,
        values: &[Value],
        properties: &EntityProviderWriteProperties,
    ) -> Result<ODataResponse, EntityProviderError> {
        let not_collection = || {
            EntityProviderError::illegal_argument(function_import.name.clone())
                .with_content("collection of simple or complex type expected")
        };
        let return_type = function_import
            .return_type
            .filter(|r| r.multiplicity == Multiplicity::Many)
            .ok_or_else(not_collection)?;
        let element = match return_type.kind {
            ReturnTypeKind::Simple(kind) => EntityPropertyInfo::simple("element", kind),
            ReturnTypeKind::Complex(id) => EntityPropertyInfo::complex(model, "element", id)?,
            ReturnTypeKind::Entity(_) => return Err(not_collection()),
        };
        let body = match self.content_type {
            ContentType::Atom => {
                atom::misc::write_collection(&function_import.name, &element, values, properties)?
            }
            ContentType::Json => json::misc::write_collection(&element, values, properties)?,
        };
        Ok(ODataResponse::new(body, self.content_type.plain()))
    }

    /// Write the absolute URI of one entry (`$links` to a single entity).
    ///
    /// # Errors
    ///
    /// Returns `MISSING_PROPERTY` if a key value is absent.
    pub fn write_link(
        &self,
        entity_set: EntitySetRef<'_>,
        data: &PropertyMap,
        properties: &EntityProviderWriteProperties,
    ) -> Result<ODataResponse, EntityProviderError> {
        let aggregator = EntityInfoAggregator::create(entity_set, None)?;
        let link = uri::self_link(&aggregator, data, properties.config())?;
        let link = uri::absolute(properties.service_root(), &link)?;
        let body = match self.content_type {
            ContentType::Atom => atom::misc::write_link(&link, properties)?,
            ContentType::Json => json::misc::write_link(&link, properties)?,
        };
        Ok(ODataResponse::new(body, self.content_type.plain()))
    }

    /// Write the absolute URIs of entries (`$links` to many entities).
    ///
    /// # Errors
    ///
    /// See [`Self::write_link`].
    pub fn write_links(
        &self,
        entity_set: EntitySetRef<'_>,
        data: &[PropertyMap],
        properties: &EntityProviderWriteProperties,
    ) -> Result<ODataResponse, EntityProviderError> {
        let aggregator = EntityInfoAggregator::create(entity_set, None)?;
        let links = data
            .iter()
            .map(|entry| {
                let link = uri::self_link(&aggregator, entry, properties.config())?;
                uri::absolute(properties.service_root(), &link)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let body = match self.content_type {
            ContentType::Atom => atom::misc::write_links(&links, properties)?,
            ContentType::Json => json::misc::write_links(&links, properties)?,
        };
        Ok(ODataResponse::new(body, self.content_type.plain()))
    }

    /// Raw value of a property (`$value`). Binary values are written as
    /// they are, everything else as the default literal. Null yields an
    /// empty body.
    ///
    /// # Errors
    ///
    /// Returns `INVALID_PROPERTY` if the entity type has no such property
    /// and `ILLEGAL_ARGUMENT` for complex properties.
    pub fn write_value(
        entity_set: EntitySetRef<'_>,
        name: &str,
        value: &Value,
        properties: &EntityProviderWriteProperties,
    ) -> Result<ODataResponse, EntityProviderError> {
        let info = property_info(entity_set, name)?;
        let kind = info.simple_kind().ok_or_else(|| {
            EntityProviderError::illegal_argument(name).with_content("simple property expected")
        })?;
        let content_type = info.mime_type.as_deref().unwrap_or(CONTENT_TYPE_TEXT);
        let body = match value {
            Value::Scalar(ScalarValue::Binary(bytes)) => bytes.clone(),
            value => format_simple(&info, kind, Some(value), LiteralKind::Default, properties.config())?
                .map(String::into_bytes)
                .unwrap_or_default(),
        };
        Ok(ODataResponse::new(body, content_type))
    }

    /// Read one entry of `entity_set`.
    ///
    /// # Errors
    ///
    /// Returns error if the document is malformed or does not fit the
    /// entity type.
    pub fn read_entry(
        &self,
        entity_set: EntitySetRef<'_>,
        body: &[u8],
        properties: &EntityProviderReadProperties,
    ) -> Result<ODataEntry, EntityProviderError> {
        let aggregator = EntityInfoAggregator::create(entity_set, None)?;
        match self.content_type {
            ContentType::Atom => AtomEntryConsumer::new(properties).read_entry(&aggregator, body),
            ContentType::Json => JsonEntryConsumer::new(properties).read_entry(&aggregator, body),
        }
    }

    /// Read feed of `entity_set`.
    ///
    /// # Errors
    ///
    /// See [`Self::read_entry`].
    pub fn read_feed(
        &self,
        entity_set: EntitySetRef<'_>,
        body: &[u8],
        properties: &EntityProviderReadProperties,
    ) -> Result<ODataFeed, EntityProviderError> {
        let aggregator = EntityInfoAggregator::create(entity_set, None)?;
        match self.content_type {
            ContentType::Atom => AtomEntryConsumer::new(properties).read_feed(&aggregator, body),
            ContentType::Json => JsonEntryConsumer::new(properties).read_feed(&aggregator, body),
        }
    }

    /// Read single property document of the entity type of `entity_set`.
    ///
    /// # Errors
    ///
    /// Returns `INVALID_PROPERTY` if the entity type has no such property
    /// or the document holds another one.
    pub fn read_property(
        &self,
        entity_set: EntitySetRef<'_>,
        name: &str,
        body: &[u8],
        properties: &EntityProviderReadProperties,
    ) -> Result<PropertyMap, EntityProviderError> {
        let info = property_info(entity_set, name)?;
        match self.content_type {
            ContentType::Atom => atom::misc::read_property(&info, body, properties),
            ContentType::Json => json::misc::read_property(&info, body, properties),
        }
    }

    /// Read single link document.
    ///
    /// # Errors
    ///
    /// Returns error if the document is not a link.
    pub fn read_link(&self, body: &[u8]) -> Result<String, EntityProviderError> {
        match self.content_type {
            ContentType::Atom => atom::misc::read_link(body),
            ContentType::Json => json::misc::read_link(body),
        }
    }

    /// Read link collection document.
    ///
    /// # Errors
    ///
    /// Returns error if the document is not a link collection.
    pub fn read_links(&self, body: &[u8]) -> Result<ODataLinks, EntityProviderError> {
        match self.content_type {
            ContentType::Atom => atom::misc::read_links(body),
            ContentType::Json => json::misc::read_links(body),
        }
    }

    /// Read `$metadata` document (always XML).
    ///
    /// # Errors
    ///
    /// Returns error if the document is malformed or the schemas do not
    /// resolve.
    pub fn read_metadata(body: &[u8]) -> Result<EdmModel, EntityProviderError> {
        edmx::read_metadata(body)
    }
}
