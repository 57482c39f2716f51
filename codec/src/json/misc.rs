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

use crate::aggregator::EntityPropertyInfo;
use crate::entry::ODataLinks;
use crate::json::consumer::read_property as read_property_node;
use crate::json::envelope;
use crate::json::producer::property_value;
use crate::json::to_vec;
use crate::json::JsonNode;
use crate::json::COUNT;
use crate::json::RESULTS;
use crate::json::URI;
use crate::properties::EntityProviderReadProperties;
use crate::properties::EntityProviderWriteProperties;
use odata_v2_edm::EntityProviderError;
use odata_v2_edm::MessageKey;
use odata_v2_edm::PropertyMap;
use odata_v2_edm::Value;
use serde_json::Map;
use serde_json::Value as JsonValue;

fn uri_object(uri: &str) -> JsonValue {
    let mut object = Map::new();
    object.insert(URI.into(), JsonValue::String(uri.into()));
    JsonValue::Object(object)
}

/// `{"d": {"Name": value}}`
///
/// # Errors
///
/// Returns error if the value does not fit the property.
pub fn write_property(
    info: &EntityPropertyInfo,
    value: Option<&Value>,
    properties: &EntityProviderWriteProperties,
) -> Result<Vec<u8>, EntityProviderError> {
    let mut object = Map::new();
    object.insert(info.name.clone(), property_value(info, value, properties)?);
    to_vec(&envelope(JsonValue::Object(object), properties.is_omit_json_wrapper()))
}

/// `{"d": {"results": [..]}}`. `element` describes one value.
///
/// # Errors
///
/// Returns error if a value does not fit the element type.
pub fn write_collection(
    element: &EntityPropertyInfo,
    values: &[Value],
    properties: &EntityProviderWriteProperties,
) -> Result<Vec<u8>, EntityProviderError> {
    let results = values
        .iter()
        .map(|value| property_value(element, Some(value), properties))
        .collect::<Result<Vec<_>, _>>()?;
    let mut object = Map::new();
    object.insert(RESULTS.into(), JsonValue::Array(results));
    to_vec(&envelope(JsonValue::Object(object), properties.is_omit_json_wrapper()))
}

/// `{"d": {"uri": ".."}}`
///
/// # Errors
///
/// Returns `EXCEPTION_OCCURRED` if the document cannot be serialized.
pub fn write_link(uri: &str, properties: &EntityProviderWriteProperties) -> Result<Vec<u8>, EntityProviderError> {
    to_vec(&envelope(uri_object(uri), properties.is_omit_json_wrapper()))
}

/// `{"d": {"__count": "n", "results": [{"uri": ".."}, ..]}}`
///
/// # Errors
///
/// Returns `EXCEPTION_OCCURRED` if the document cannot be serialized.
pub fn write_links(uris: &[String], properties: &EntityProviderWriteProperties) -> Result<Vec<u8>, EntityProviderError> {
    let mut object = Map::new();
    if let Some(count) = properties.inline_count() {
        object.insert(COUNT.into(), JsonValue::String(count.to_string()));
    }
    object.insert(
        RESULTS.into(),
        JsonValue::Array(uris.iter().map(|uri| uri_object(uri)).collect()),
    );
    to_vec(&envelope(JsonValue::Object(object), properties.is_omit_json_wrapper()))
}

/// Read single property document into a map with one entry.
///
/// # Errors
///
/// Returns `INVALID_PROPERTY` if the document does not hold exactly the
/// property.
pub fn read_property(
    info: &EntityPropertyInfo,
    json: &[u8],
    properties: &EntityProviderReadProperties,
) -> Result<PropertyMap, EntityProviderError> {
    let node = JsonNode::parse(json)?.unwrap_envelope();
    let JsonNode::Object(members) = &node else {
        return Err(EntityProviderError::invalid_state("object expected").with_content(node.kind()));
    };
    let mut map = PropertyMap::new();
    for (name, value) in members {
        if *name != info.name {
            return Err(EntityProviderError::invalid_property(name.clone()));
        }
        if map.contains_key(name) {
            return Err(EntityProviderError::double_property(name.clone()));
        }
        let value = read_property_node(value, info, Some(properties.type_mappings()), properties)?;
        map.insert(name.clone(), value);
    }
    Ok(map)
}

/// Read single link document.
///
/// # Errors
///
/// Returns `MISSING_ATTRIBUTE` if the document has no `uri`.
pub fn read_link(json: &[u8]) -> Result<String, EntityProviderError> {
    let node = JsonNode::parse(json)?.unwrap_envelope();
    node.member(URI)
        .and_then(JsonNode::as_str)
        .map(ToOwned::to_owned)
        .ok_or_else(|| EntityProviderError::missing_attribute(URI, "link"))
}

/// Read link collection: `{"results": [..]}` with optional count, or a
/// bare array.
///
/// # Errors
///
/// Returns `MISSING_ATTRIBUTE` for a link without `uri` and
/// `INLINECOUNT_INVALID` if the count is not a number.
pub fn read_links(json: &[u8]) -> Result<ODataLinks, EntityProviderError> {
    let node = JsonNode::parse(json)?.unwrap_envelope();
    let mut links = ODataLinks::default();
    let items = match &node {
        JsonNode::Array(items) => items.as_slice(),
        JsonNode::Object(_) => {
            if let Some(count) = node.member(COUNT) {
                let text = count.literal().unwrap_or_default();
                let count = text.parse::<u64>().map_err(|e| {
                    EntityProviderError::new(MessageKey::InlineCountInvalid)
                        .with_content(text.clone())
                        .with_source(e)
                })?;
                links.inline_count = Some(count);
            }
            match node.member(RESULTS) {
                Some(JsonNode::Array(items)) => items.as_slice(),
                _ => &[],
            }
        }
        other => {
            return Err(EntityProviderError::invalid_state("links expected").with_content(other.kind()));
        }
    };
    for item in items {
        let uri = item
            .member(URI)
            .and_then(JsonNode::as_str)
            .ok_or_else(|| EntityProviderError::missing_attribute(URI, "link"))?;
        links.uris.push(uri.to_owned());
    }
    Ok(links)
}
