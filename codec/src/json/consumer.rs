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
use crate::aggregator::PropertyKind;
use crate::callback::ReadCallbackContext;
use crate::convert::parse_simple;
use crate::convert::read_null;
use crate::entry::DeletedEntry;
use crate::entry::ODataEntry;
use crate::entry::ODataFeed;
use crate::expand_select::ExpandSelectTree;
use crate::json::JsonNode;
use crate::json::COUNT;
use crate::json::DEFERRED;
use crate::json::DELETED_ENTITY;
use crate::json::DELTA;
use crate::json::METADATA;
use crate::json::NEXT;
use crate::json::ODATA_CONTEXT;
use crate::json::RESULTS;
use crate::json::URI;
use crate::properties::EntityProviderReadProperties;
use odata_v2_edm::provider::Multiplicity;
use odata_v2_edm::value::TypeMapping;
use odata_v2_edm::value::TypeMappings;
use odata_v2_edm::EntityProviderError;
use odata_v2_edm::LiteralKind;
use odata_v2_edm::MessageKey;
use odata_v2_edm::PropertyMap;
use odata_v2_edm::Value;
use tracing::trace;

fn unexpected(name: &str, node: &JsonNode) -> EntityProviderError {
    EntityProviderError::invalid_property(name).with_content(format!("unexpected {}", node.kind()))
}

/// Value of one property member.
pub(crate) fn read_property(
    node: &JsonNode,
    info: &EntityPropertyInfo,
    mappings: Option<&TypeMappings>,
    properties: &EntityProviderReadProperties,
) -> Result<Value, EntityProviderError> {
    let config = properties.config();
    if *node == JsonNode::Null {
        return read_null(info, config);
    }
    let mapping = mappings.and_then(|m| m.get(&info.name));
    match &info.kind {
        PropertyKind::Simple(kind) => {
            let literal = node.literal().ok_or_else(|| unexpected(&info.name, node))?;
            parse_simple(info, *kind, &literal, LiteralKind::Json, config, mapping)
        }
        PropertyKind::Complex {
            properties: children,
            ..
        } => {
            let JsonNode::Object(members) = node else {
                return Err(unexpected(&info.name, node));
            };
            let nested = match mapping {
                Some(TypeMapping::Nested(nested)) => Some(nested),
                Some(TypeMapping::Scalar(_)) | None => None,
            };
            let mut map = PropertyMap::new();
            for (name, value) in members {
                if name == METADATA {
                    continue;
                }
                let child = children
                    .iter()
                    .find(|c| c.name == *name)
                    .ok_or_else(|| EntityProviderError::invalid_property(name.clone()))?;
                if map.contains_key(name) {
                    return Err(EntityProviderError::double_property(name.clone()));
                }
                map.insert(name.clone(), read_property(value, child, nested, properties)?);
            }
            Ok(Value::Complex(map))
        }
    }
}

/// `{"__metadata":{"uri":..}}` of a bind operation.
fn bind_uri(node: &JsonNode) -> Option<&str> {
    match node {
        JsonNode::Object(members) if members.len() == 1 => node.member(METADATA)?.member(URI)?.as_str(),
        _ => None,
    }
}

fn count(node: &JsonNode) -> Result<u64, EntityProviderError> {
    let text = match node {
        JsonNode::String(v) | JsonNode::Number(v) => v.as_str(),
        other => other.kind(),
    };
    text.parse::<u64>().map_err(|e| {
        EntityProviderError::new(MessageKey::InlineCountInvalid)
            .with_content(text)
            .with_source(e)
    })
}

/// Entries of a feed node: V2 `{"results": [..]}` or V1 `[..]`.
fn feed_items(node: &JsonNode) -> Option<&[JsonNode]> {
    match node {
        JsonNode::Array(items) => Some(items),
        JsonNode::Object(_) => match node.member(RESULTS)? {
            JsonNode::Array(items) => Some(items),
            _ => None,
        },
        _ => None,
    }
}

/// JSON entry and feed deserializer.
pub struct JsonEntryConsumer<'p> {
    properties: &'p EntityProviderReadProperties,
    depth: usize,
}

impl<'p> JsonEntryConsumer<'p> {
    #[must_use]
    pub const fn new(properties: &'p EntityProviderReadProperties) -> Self {
        Self {
            properties,
            depth: 0,
        }
    }

    /// Read entry document, with or without `{"d": ..}` envelope.
    ///
    /// # Errors
    ///
    /// Returns error if the document is not a JSON entry of the
    /// aggregator's entity type.
    pub fn read_entry(
        &self,
        aggregator: &EntityInfoAggregator<'_>,
        json: &[u8],
    ) -> Result<ODataEntry, EntityProviderError> {
        let node = JsonNode::parse(json)?.unwrap_envelope();
        self.read_entry_node(aggregator, &node)
    }

    /// Read feed document: `{"d": {"results": [..]}}` or `{"d": [..]}`,
    /// each with or without the envelope.
    ///
    /// # Errors
    ///
    /// Returns error if the document is not a JSON feed of the
    /// aggregator's entity set.
    pub fn read_feed(
        &self,
        aggregator: &EntityInfoAggregator<'_>,
        json: &[u8],
    ) -> Result<ODataFeed, EntityProviderError> {
        let node = JsonNode::parse(json)?.unwrap_envelope();
        self.read_feed_node(aggregator, &node)
    }

    pub(crate) fn read_feed_node(
        &self,
        aggregator: &EntityInfoAggregator<'_>,
        node: &JsonNode,
    ) -> Result<ODataFeed, EntityProviderError> {
        let items = feed_items(node)
            .ok_or_else(|| EntityProviderError::invalid_state("feed expected").with_content(node.kind()))?;
        let mut feed = ODataFeed::default();
        if let JsonNode::Object(members) = node {
            for (name, value) in members {
                match name.as_str() {
                    COUNT => feed.metadata.inline_count = Some(count(value)?),
                    NEXT => {
                        feed.metadata.next_link = value
                            .as_str()
                            .or_else(|| value.member(URI).and_then(JsonNode::as_str))
                            .map(ToOwned::to_owned);
                    }
                    DELTA => feed.metadata.delta_link = value.as_str().map(ToOwned::to_owned),
                    _ => {}
                }
            }
        }
        for item in items {
            let is_deleted = item
                .member(ODATA_CONTEXT)
                .and_then(JsonNode::as_str)
                .is_some_and(|context| context.ends_with(DELETED_ENTITY));
            if is_deleted {
                let uri = item
                    .member("id")
                    .and_then(JsonNode::as_str)
                    .ok_or_else(|| EntityProviderError::missing_attribute("id", DELETED_ENTITY))?;
                feed.deleted_entries.push(DeletedEntry {
                    uri: uri.to_owned(),
                    when: None,
                });
            } else {
                feed.entries.push(self.read_entry_node(aggregator, item)?);
            }
        }
        trace!(
            entity_set = aggregator.entity_set_name(),
            entries = feed.entries.len(),
            deleted = feed.deleted_entries.len(),
            "json feed read"
        );
        Ok(feed)
    }

    pub(crate) fn read_entry_node(
        &self,
        aggregator: &EntityInfoAggregator<'_>,
        node: &JsonNode,
    ) -> Result<ODataEntry, EntityProviderError> {
        let JsonNode::Object(members) = node else {
            return Err(EntityProviderError::invalid_state("entry expected").with_content(node.kind()));
        };
        let mut entry = ODataEntry::default();
        let mut tree = ExpandSelectTree::none();
        let mut metadata_seen = false;
        for (name, value) in members {
            if name == METADATA {
                if metadata_seen {
                    return Err(EntityProviderError::double_property(METADATA));
                }
                metadata_seen = true;
                self.read_metadata(value, &mut entry)?;
                continue;
            }
            if entry.properties.contains_key(name) {
                return Err(EntityProviderError::double_property(name.clone()));
            }
            if let Some(info) = aggregator.property_info(name) {
                let value = read_property(value, info, Some(self.properties.type_mappings()), self.properties)?;
                entry.properties.insert(name.clone(), value);
                tree = tree.with_selected(name.clone());
            } else if aggregator.entity_type().navigation_property(name).is_some() {
                tree = self.read_navigation(aggregator, name, value, &mut entry, tree)?;
            } else {
                return Err(EntityProviderError::invalid_property(name.clone()));
            }
        }
        if !self.properties.is_merge_semantic() {
            if let Some(missing) = aggregator.missing_required(&entry.properties) {
                return Err(EntityProviderError::new(MessageKey::MissingProperty)
                    .with_content(missing.name.clone()));
            }
        }
        entry.expand_select_tree = tree;
        trace!(
            entity_set = aggregator.entity_set_name(),
            uri = entry.metadata.uri.as_deref().unwrap_or_default(),
            properties = entry.properties.len(),
            "json entry read"
        );
        Ok(entry)
    }

    fn read_metadata(&self, node: &JsonNode, entry: &mut ODataEntry) -> Result<(), EntityProviderError> {
        let JsonNode::Object(members) = node else {
            return Err(unexpected(METADATA, node));
        };
        for (name, value) in members {
            let Some(value) = value.as_str().map(ToOwned::to_owned) else {
                continue;
            };
            match name.as_str() {
                "id" => entry.metadata.id = Some(value),
                URI => entry.metadata.uri = Some(value),
                "type" => entry.metadata.entity_type = Some(value),
                "etag" => entry.metadata.etag = Some(value),
                "content_type" => entry.media_metadata.content_type = Some(value),
                "media_src" => entry.media_metadata.source_link = Some(value),
                "edit_media" => entry.media_metadata.edit_link = Some(value),
                "media_etag" => entry.media_metadata.etag = Some(value),
                _ => {}
            }
        }
        Ok(())
    }

    fn read_navigation(
        &self,
        aggregator: &EntityInfoAggregator<'_>,
        navigation: &str,
        node: &JsonNode,
        entry: &mut ODataEntry,
        tree: ExpandSelectTree,
    ) -> Result<ExpandSelectTree, EntityProviderError> {
        let entity_set = aggregator.entity_set();
        let multiplicity = entity_set
            .model()
            .navigation_multiplicity(entity_set.entity_type_id(), navigation)?;
        let is_many = multiplicity == Multiplicity::Many;

        if let Some(deferred) = node.member(DEFERRED) {
            if let Some(uri) = deferred.member(URI).and_then(JsonNode::as_str) {
                entry.metadata.add_association_uri(navigation, uri.to_owned());
            }
            return Ok(tree.with_selected(navigation));
        }
        if let Some(uri) = bind_uri(node) {
            if is_many {
                return Err(EntityProviderError::new(MessageKey::InvalidInlineContent).with_content(navigation));
            }
            entry.metadata.add_association_uri(navigation, uri.to_owned());
            return Ok(tree.with_selected(navigation));
        }
        if let JsonNode::Array(items) = node {
            if !items.is_empty() && items.iter().all(|item| bind_uri(item).is_some()) {
                if !is_many {
                    return Err(EntityProviderError::new(MessageKey::InvalidInlineContent)
                        .with_content(navigation));
                }
                for uri in items.iter().filter_map(bind_uri) {
                    entry.metadata.add_association_uri(navigation, uri.to_owned());
                }
                return Ok(tree.with_selected(navigation));
            }
        }

        entry.contains_inline_entry = true;
        if *node == JsonNode::Null {
            entry.properties.insert(navigation.to_owned(), Value::Null);
            return Ok(tree.with_expanded(navigation, ExpandSelectTree::all()));
        }
        let is_feed = feed_items(node).is_some();
        if is_feed != is_many {
            return Err(EntityProviderError::new(MessageKey::InvalidInlineContent).with_content(navigation));
        }
        let (value, subtree) = self.read_inline(aggregator, navigation, node, is_feed)?;
        entry.properties.insert(navigation.to_owned(), value);
        Ok(tree.with_expanded(navigation, subtree))
    }

    fn read_inline(
        &self,
        aggregator: &EntityInfoAggregator<'_>,
        navigation: &str,
        node: &JsonNode,
        is_feed: bool,
    ) -> Result<(Value, ExpandSelectTree), EntityProviderError> {
        let max_depth = self.properties.config().max_expand_depth;
        if self.depth >= max_depth {
            return Err(EntityProviderError::illegal_argument("$expand")
                .with_content(format!("inline depth exceeds {max_depth}")));
        }
        let entity_set = aggregator.entity_set();
        let navigation_property = entity_set.navigation_property(navigation)?;
        let target = entity_set.related_entity_set(navigation)?;
        let nested = match self.properties.callback(navigation) {
            Some(callback) => callback.produce_read_properties(&ReadCallbackContext {
                read_properties: self.properties,
                source_entity_set: entity_set,
                navigation_property,
                is_feed,
            })?,
            None => None,
        };
        let nested = nested.unwrap_or_else(|| self.properties.nested(navigation));
        let consumer = JsonEntryConsumer {
            properties: &nested,
            depth: self.depth + 1,
        };
        let target = EntityInfoAggregator::create(target, None)?;
        if is_feed {
            let feed = consumer.read_feed_node(&target, node)?;
            let tree = feed
                .entries
                .first()
                .map_or_else(ExpandSelectTree::all, |e| e.expand_select_tree.clone());
            Ok((Value::Feed(feed.into_property_maps()), tree))
        } else {
            let entry = consumer.read_entry_node(&target, node)?;
            Ok((Value::Entity(entry.properties), entry.expand_select_tree))
        }
    }
}
