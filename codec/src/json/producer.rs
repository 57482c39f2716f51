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

use crate::aggregator::EntityInfoAggregator;
use crate::aggregator::EntityPropertyInfo;
use crate::aggregator::NavigationPropertyInfo;
use crate::aggregator::PropertyKind;
use crate::atom::DEFAULT_MEDIA_TYPE;
use crate::callback::InlineData;
use crate::convert::format_simple;
use crate::entry::WriteResult;
use crate::inline::InlineContent;
use crate::json::envelope;
use crate::json::to_vec;
use crate::json::COUNT;
use crate::json::DEFERRED;
use crate::json::DELETED_ENTITY;
use crate::json::DELTA;
use crate::json::METADATA;
use crate::json::NEXT;
use crate::json::ODATA_CONTEXT;
use crate::json::RESULTS;
use crate::json::URI;
use crate::properties::EntityProviderWriteProperties;
use crate::uri;
use odata_v2_edm::EntityProviderError;
use odata_v2_edm::LiteralKind;
use odata_v2_edm::PropertyMap;
use odata_v2_edm::Value;
use serde_json::Map;
use serde_json::Value as JsonValue;
use tracing::trace;

type JsonObject = Map<String, JsonValue>;

fn type_metadata(type_name: String) -> JsonValue {
    let mut metadata = JsonObject::new();
    metadata.insert("type".into(), JsonValue::String(type_name));
    JsonValue::Object(metadata)
}

/// JSON value of a simple or complex property.
pub(crate) fn property_value(
    info: &EntityPropertyInfo,
    value: Option<&Value>,
    properties: &EntityProviderWriteProperties,
) -> Result<JsonValue, EntityProviderError> {
    match &info.kind {
        PropertyKind::Simple(kind) => {
            let Some(literal) = format_simple(info, *kind, value, LiteralKind::Json, properties.config())? else {
                return Ok(JsonValue::Null);
            };
            if kind.is_json_unquoted() {
                serde_json::from_str(&literal).map_err(|e| {
                    EntityProviderError::exception_occurred(e).with_content(info.name.clone())
                })
            } else {
                Ok(JsonValue::String(literal))
            }
        }
        PropertyKind::Complex {
            type_name,
            properties: children,
        } => match value {
            None | Some(Value::Null) => Ok(JsonValue::Null),
            Some(Value::Complex(map)) => {
                let mut object = JsonObject::new();
                object.insert(METADATA.into(), type_metadata(type_name.to_string()));
                for child in children {
                    let child_value = map.get(&child.name);
                    if child_value.is_some() || !properties.is_data_based_property_serialization() {
                        object.insert(child.name.clone(), property_value(child, child_value, properties)?);
                    }
                }
                Ok(JsonValue::Object(object))
            }
            Some(_) => Err(EntityProviderError::illegal_argument(info.name.clone())
                .with_content("complex value expected")),
        },
    }
}

fn deferred(uri: String) -> JsonValue {
    let mut inner = JsonObject::new();
    inner.insert(URI.into(), JsonValue::String(uri));
    let mut object = JsonObject::new();
    object.insert(DEFERRED.into(), JsonValue::Object(inner));
    JsonValue::Object(object)
}

/// JSON entry producer.
pub struct JsonEntryProducer<'p> {
    properties: &'p EntityProviderWriteProperties,
    depth: usize,
}

impl<'p> JsonEntryProducer<'p> {
    #[must_use]
    pub const fn new(properties: &'p EntityProviderWriteProperties) -> Self {
        Self {
            properties,
            depth: 0,
        }
    }

    /// Write entry document.
    ///
    /// # Errors
    ///
    /// Returns error if data does not match the entity type or an
    /// expanded navigation property cannot be written.
    pub fn write(
        &self,
        aggregator: &EntityInfoAggregator<'_>,
        data: &PropertyMap,
    ) -> Result<(Vec<u8>, WriteResult), EntityProviderError> {
        let (entry, result) = self.entry(aggregator, data)?;
        let body = to_vec(&envelope(entry, self.properties.is_omit_json_wrapper()))?;
        Ok((body, result))
    }

    pub(crate) fn entry(
        &self,
        aggregator: &EntityInfoAggregator<'_>,
        data: &PropertyMap,
    ) -> Result<(JsonValue, WriteResult), EntityProviderError> {
        let properties = self.properties;
        let config = properties.config();
        let mut object = JsonObject::new();
        let etag = uri::etag(aggregator, data, config)?;
        let mut result = WriteResult {
            etag,
            location: None,
        };

        let self_link = if properties.is_content_only() {
            None
        } else {
            Some(uri::self_link(aggregator, data, config)?)
        };
        if let Some(self_link) = &self_link {
            let location = uri::absolute(properties.service_root(), self_link)?;
            let mut metadata = JsonObject::new();
            metadata.insert("id".into(), JsonValue::String(location.clone()));
            metadata.insert(URI.into(), JsonValue::String(location.clone()));
            metadata.insert("type".into(), JsonValue::String(aggregator.entity_type_name()));
            if let Some(etag) = &result.etag {
                metadata.insert("etag".into(), JsonValue::String(etag.to_string()));
            }
            if aggregator.has_stream() {
                let entity_type = aggregator.entity_type();
                let content_type = entity_type
                    .media_resource_mime_type_key()
                    .and_then(|key| data.get(key))
                    .and_then(Value::as_str)
                    .unwrap_or(DEFAULT_MEDIA_TYPE);
                let media_src = entity_type
                    .media_resource_source_key()
                    .and_then(|key| data.get(key))
                    .and_then(Value::as_str)
                    .map_or_else(|| format!("{location}/$value"), ToOwned::to_owned);
                metadata.insert("content_type".into(), JsonValue::String(content_type.into()));
                metadata.insert("media_src".into(), JsonValue::String(media_src));
                metadata.insert("edit_media".into(), JsonValue::String(format!("{location}/$value")));
            }
            object.insert(METADATA.into(), JsonValue::Object(metadata));
            result.location = Some(location);
        }

        for info in aggregator.selected_property_infos() {
            let value = data.get(&info.name);
            if value.is_none() && properties.is_data_based_property_serialization() {
                continue;
            }
            object.insert(info.name.clone(), property_value(info, value, properties)?);
        }

        if let (Some(self_link), Some(location)) = (&self_link, &result.location) {
            for navigation in aggregator.navigation_infos() {
                let value = self.navigation_value(aggregator, data, navigation, self_link, location)?;
                object.insert(navigation.name.clone(), value);
            }
        }
        trace!(
            entity_set = aggregator.entity_set_name(),
            location = result.location.as_deref().unwrap_or_default(),
            "json entry written"
        );
        Ok((JsonValue::Object(object), result))
    }

    fn navigation_value(
        &self,
        aggregator: &EntityInfoAggregator<'_>,
        data: &PropertyMap,
        navigation: &NavigationPropertyInfo,
        self_link: &str,
        location: &str,
    ) -> Result<JsonValue, EntityProviderError> {
        let link = format!("{location}/{}", navigation.name);
        if !aggregator.is_expanded(&navigation.name) {
            return Ok(deferred(link));
        }
        let inline = InlineContent::produce(
            self.properties,
            aggregator,
            data,
            navigation,
            self_link,
            self.depth,
        )?;
        if inline.data.is_empty() && self.properties.is_omit_inline_for_null_data() {
            return Ok(deferred(link));
        }
        let target = inline.aggregator()?;
        let nested = JsonEntryProducer {
            properties: inline.properties(),
            depth: self.depth + 1,
        };
        match &inline.data {
            InlineData::Entry(None) => Ok(JsonValue::Null),
            InlineData::Entry(Some(entry)) => nested.entry(&target, entry).map(|(value, _)| value),
            InlineData::Feed(entries) => JsonFeedProducer { entry: nested }.feed(&target, entries),
        }
    }
}

/// JSON feed producer.
pub struct JsonFeedProducer<'p> {
    entry: JsonEntryProducer<'p>,
}

impl<'p> JsonFeedProducer<'p> {
    #[must_use]
    pub const fn new(properties: &'p EntityProviderWriteProperties) -> Self {
        Self {
            entry: JsonEntryProducer::new(properties),
        }
    }

    /// Write feed document.
    ///
    /// # Errors
    ///
    /// Returns error if an entry cannot be written.
    pub fn write(
        &self,
        aggregator: &EntityInfoAggregator<'_>,
        data: &[PropertyMap],
    ) -> Result<Vec<u8>, EntityProviderError> {
        let feed = self.feed(aggregator, data)?;
        to_vec(&envelope(feed, self.entry.properties.is_omit_json_wrapper()))
    }

    pub(crate) fn feed(
        &self,
        aggregator: &EntityInfoAggregator<'_>,
        data: &[PropertyMap],
    ) -> Result<JsonValue, EntityProviderError> {
        let properties = self.entry.properties;
        let mut object = JsonObject::new();
        if let Some(count) = properties.inline_count() {
            object.insert(COUNT.into(), JsonValue::String(count.to_string()));
        }
        let mut results = data
            .iter()
            .map(|entry| self.entry.entry(aggregator, entry).map(|(value, _)| value))
            .collect::<Result<Vec<_>, _>>()?;
        let tombstones = properties
            .tombstone_callback()
            .map(|callback| callback.tombstone_result());
        if let Some(tombstones) = &tombstones {
            let context = format!("$metadata#{}{DELETED_ENTITY}", aggregator.entity_set_path());
            for deleted in &tombstones.deleted_entries {
                let self_link = uri::self_link(aggregator, deleted, properties.config())?;
                let mut stub = JsonObject::new();
                stub.insert(ODATA_CONTEXT.into(), JsonValue::String(context.clone()));
                stub.insert(
                    "id".into(),
                    JsonValue::String(uri::absolute(properties.service_root(), &self_link)?),
                );
                results.push(JsonValue::Object(stub));
            }
        }
        object.insert(RESULTS.into(), JsonValue::Array(results));
        if let Some(next) = properties.next_link() {
            object.insert(NEXT.into(), JsonValue::String(next.into()));
        }
        if let Some(delta) = tombstones.as_ref().and_then(|t| t.delta_link.as_ref()) {
            object.insert(DELTA.into(), JsonValue::String(delta.clone()));
        }
        trace!(
            entity_set = aggregator.entity_set_name(),
            entries = data.len(),
            "json feed written"
        );
        Ok(JsonValue::Object(object))
    }
}
