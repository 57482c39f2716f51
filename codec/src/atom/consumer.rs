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
use crate::atom::reader::Element;
use crate::atom::reader::Node;
use crate::atom::reader::XmlReader;
use crate::atom::NS_ATOM;
use crate::atom::NS_DATA;
use crate::atom::NS_METADATA;
use crate::atom::NS_TOMBSTONE;
use crate::atom::REL_RELATED;
use crate::callback::ReadCallbackContext;
use crate::convert::parse_simple;
use crate::convert::read_null;
use crate::entry::DeletedEntry;
use crate::entry::ODataEntry;
use crate::entry::ODataFeed;
use crate::expand_select::ExpandSelectTree;
use crate::properties::EntityProviderReadProperties;
use odata_v2_edm::provider::target_path;
use odata_v2_edm::provider::Multiplicity;
use odata_v2_edm::value::TypeMapping;
use odata_v2_edm::value::TypeMappings;
use odata_v2_edm::EntityProviderError;
use odata_v2_edm::LiteralKind;
use odata_v2_edm::MessageKey;
use odata_v2_edm::PropertyMap;
use odata_v2_edm::Value;
use std::borrow::Cow;
use tracing::trace;

/// Read one property element into `target`.
///
/// `mappings` are the type mappings of the level the property belongs to.
pub(crate) fn read_property(
    reader: &mut XmlReader<'_>,
    element: &Element,
    info: &EntityPropertyInfo,
    mappings: Option<&TypeMappings>,
    properties: &EntityProviderReadProperties,
) -> Result<Value, EntityProviderError> {
    let config = properties.config();
    if element.is_null() {
        reader.skip(element)?;
        return read_null(info, config);
    }
    let mapping = mappings.and_then(|m| m.get(&info.name));
    match &info.kind {
        PropertyKind::Simple(kind) => {
            let text = reader.text(element)?;
            parse_simple(info, *kind, &text, LiteralKind::Default, config, mapping)
        }
        PropertyKind::Complex {
            properties: children,
            ..
        } => {
            let nested = match mapping {
                Some(TypeMapping::Nested(nested)) => Some(nested),
                Some(TypeMapping::Scalar(_)) | None => None,
            };
            let mut map = PropertyMap::new();
            if !element.is_empty {
                read_property_children(reader, children, nested, properties, &mut map)?;
            }
            Ok(Value::Complex(map))
        }
    }
}

/// Read `d:` children up to the end tag of the enclosing element.
fn read_property_children(
    reader: &mut XmlReader<'_>,
    infos: &[EntityPropertyInfo],
    mappings: Option<&TypeMappings>,
    properties: &EntityProviderReadProperties,
    target: &mut PropertyMap,
) -> Result<(), EntityProviderError> {
    loop {
        match reader.next()? {
            Node::End => return Ok(()),
            Node::Text => {}
            Node::Eof => return Err(EntityProviderError::invalid_state("unexpected end of document")),
            Node::Start(element) if element.in_ns(NS_DATA) => {
                let info = infos
                    .iter()
                    .find(|i| i.name == element.name)
                    .ok_or_else(|| EntityProviderError::invalid_property(element.name.clone()))?;
                if target.contains_key(&info.name) {
                    return Err(EntityProviderError::double_property(info.name.clone()));
                }
                let value = read_property(reader, &element, info, mappings, properties)?;
                target.insert(info.name.clone(), value);
            }
            Node::Start(element) if element.in_ns(NS_METADATA) => {
                return Err(EntityProviderError::invalid_property(element.qualified()));
            }
            Node::Start(element) => reader.skip(&element)?,
        }
    }
}

/// Atom entry and feed deserializer.
pub struct AtomEntryConsumer<'p> {
    properties: &'p EntityProviderReadProperties,
    depth: usize,
}

/// Entry being read.
#[derive(Default)]
struct EntryState {
    entry: ODataEntry,
    tree: ExpandSelectTree,
    content_seen: bool,
}

impl EntryState {
    fn insert(&mut self, name: &str, value: Value) -> Result<(), EntityProviderError> {
        if self.entry.properties.contains_key(name) {
            return Err(EntityProviderError::double_property(name));
        }
        self.entry.properties.insert(name.to_owned(), value);
        Ok(())
    }
}

impl<'p> AtomEntryConsumer<'p> {
    #[must_use]
    pub const fn new(properties: &'p EntityProviderReadProperties) -> Self {
        Self {
            properties,
            depth: 0,
        }
    }

    fn mappings(&self) -> Option<&'p TypeMappings> {
        Some(self.properties.type_mappings())
    }

    /// Read entry document.
    ///
    /// # Errors
    ///
    /// Returns error if the document is not a well-formed UTF-8 Atom
    /// entry of the aggregator's entity type.
    pub fn read_entry(
        &self,
        aggregator: &EntityInfoAggregator<'_>,
        xml: &[u8],
    ) -> Result<ODataEntry, EntityProviderError> {
        let mut reader = XmlReader::new(xml);
        let root = reader.root()?;
        if !root.is(NS_ATOM, "entry") {
            return Err(EntityProviderError::invalid_state("entry expected").with_content(root.qualified()));
        }
        let entry = self.read_entry_element(&mut reader, aggregator, &root)?;
        reader.finish()?;
        Ok(entry)
    }

    /// Read feed document.
    ///
    /// # Errors
    ///
    /// Returns error if the document is not a well-formed UTF-8 Atom
    /// feed of the aggregator's entity set.
    pub fn read_feed(
        &self,
        aggregator: &EntityInfoAggregator<'_>,
        xml: &[u8],
    ) -> Result<ODataFeed, EntityProviderError> {
        let mut reader = XmlReader::new(xml);
        let root = reader.root()?;
        if !root.is(NS_ATOM, "feed") {
            return Err(EntityProviderError::invalid_state("feed expected").with_content(root.qualified()));
        }
        let feed = self.read_feed_element(&mut reader, aggregator, &root)?;
        reader.finish()?;
        Ok(feed)
    }

    pub(crate) fn read_feed_element(
        &self,
        reader: &mut XmlReader<'_>,
        aggregator: &EntityInfoAggregator<'_>,
        feed: &Element,
    ) -> Result<ODataFeed, EntityProviderError> {
        let mut result = ODataFeed::default();
        if feed.is_empty {
            return Ok(result);
        }
        loop {
            let element = match reader.next()? {
                Node::End => break,
                Node::Text => continue,
                Node::Eof => return Err(EntityProviderError::invalid_state("unexpected end of document")),
                Node::Start(element) => element,
            };
            if element.is(NS_ATOM, "entry") {
                result
                    .entries
                    .push(self.read_entry_element(reader, aggregator, &element)?);
            } else if element.is(NS_ATOM, "link") {
                let href = element.attr("href").map(ToOwned::to_owned);
                match element.attr("rel") {
                    Some("next") => result.metadata.next_link = href,
                    Some("delta") => result.metadata.delta_link = href,
                    _ => {}
                }
                reader.skip(&element)?;
            } else if element.is(NS_METADATA, "count") {
                let text = reader.text(&element)?;
                let count = text.trim().parse::<u64>().map_err(|e| {
                    EntityProviderError::new(MessageKey::InlineCountInvalid)
                        .with_content(text.clone())
                        .with_source(e)
                })?;
                result.metadata.inline_count = Some(count);
            } else if element.is(NS_TOMBSTONE, "deleted-entry") {
                let uri = element
                    .attr("ref")
                    .ok_or_else(|| EntityProviderError::missing_attribute("ref", "deleted-entry"))?;
                result.deleted_entries.push(DeletedEntry {
                    uri: uri.to_owned(),
                    when: element.attr("when").map(ToOwned::to_owned),
                });
                reader.skip(&element)?;
            } else {
                reader.skip(&element)?;
            }
        }
        trace!(
            entity_set = aggregator.entity_set_name(),
            entries = result.entries.len(),
            deleted = result.deleted_entries.len(),
            "atom feed read"
        );
        Ok(result)
    }

    pub(crate) fn read_entry_element(
        &self,
        reader: &mut XmlReader<'_>,
        aggregator: &EntityInfoAggregator<'_>,
        entry: &Element,
    ) -> Result<ODataEntry, EntityProviderError> {
        let mut state = EntryState {
            tree: ExpandSelectTree::none(),
            ..EntryState::default()
        };
        state.entry.metadata.etag = entry.attr_ns(NS_METADATA, "etag").map(ToOwned::to_owned);
        if !entry.is_empty {
            loop {
                let element = match reader.next()? {
                    Node::End => break,
                    Node::Text => continue,
                    Node::Eof => {
                        return Err(EntityProviderError::invalid_state("unexpected end of document"))
                    }
                    Node::Start(element) => element,
                };
                self.read_entry_child(reader, aggregator, &element, &mut state)?;
            }
        }

        if !self.properties.is_merge_semantic() {
            if let Some(missing) = aggregator.missing_required(&state.entry.properties) {
                return Err(EntityProviderError::new(MessageKey::MissingProperty)
                    .with_content(missing.name.clone()));
            }
        }
        let EntryState { mut entry, tree, .. } = state;
        entry.expand_select_tree = tree;
        trace!(
            entity_set = aggregator.entity_set_name(),
            id = entry.metadata.id.as_deref().unwrap_or_default(),
            properties = entry.properties.len(),
            "atom entry read"
        );
        Ok(entry)
    }

    fn read_entry_child(
        &self,
        reader: &mut XmlReader<'_>,
        aggregator: &EntityInfoAggregator<'_>,
        element: &Element,
        state: &mut EntryState,
    ) -> Result<(), EntityProviderError> {
        match element.ns.as_deref() {
            Some(NS_ATOM) => match element.name.as_str() {
                "id" => {
                    state.entry.metadata.id = Some(reader.text(element)?);
                    Ok(())
                }
                "category" => {
                    state.entry.metadata.entity_type = element.attr("term").map(ToOwned::to_owned);
                    reader.skip(element)
                }
                "link" => self.read_link(reader, aggregator, element, state),
                "content" => self.read_content(reader, aggregator, element, state),
                "author" | "contributor" => self.read_person(reader, aggregator, element, state),
                "title" | "updated" | "summary" | "rights" | "published" => {
                    let path = match element.name.as_str() {
                        "title" => target_path::SYNDICATION_TITLE,
                        "updated" => target_path::SYNDICATION_UPDATED,
                        "summary" => target_path::SYNDICATION_SUMMARY,
                        "rights" => target_path::SYNDICATION_RIGHTS,
                        _ => target_path::SYNDICATION_PUBLISHED,
                    };
                    self.read_syndication(reader, aggregator, element, path, state)
                }
                _ => reader.skip(element),
            },
            Some(NS_METADATA) if element.name == "properties" => {
                if !aggregator.has_stream() {
                    return Err(EntityProviderError::new(MessageKey::InvalidParentTag)
                        .with_content("content")
                        .with_content(element.qualified()));
                }
                self.read_properties(reader, aggregator, element, state)
            }
            Some(NS_METADATA | NS_DATA) => Err(EntityProviderError::new(MessageKey::InvalidParentTag)
                .with_content("entry")
                .with_content(element.qualified())),
            _ => self.read_custom(reader, aggregator, element, Cow::Borrowed(&element.name), state),
        }
    }

    fn read_properties(
        &self,
        reader: &mut XmlReader<'_>,
        aggregator: &EntityInfoAggregator<'_>,
        element: &Element,
        state: &mut EntryState,
    ) -> Result<(), EntityProviderError> {
        if state.content_seen {
            return Err(EntityProviderError::double_property(element.qualified()));
        }
        state.content_seen = true;
        if element.is_empty {
            return Ok(());
        }
        let mut map = PropertyMap::new();
        read_property_children(
            reader,
            aggregator.property_infos(),
            self.mappings(),
            self.properties,
            &mut map,
        )?;
        for (name, value) in map {
            state.tree = std::mem::take(&mut state.tree).with_selected(name.clone());
            state.insert(&name, value)?;
        }
        Ok(())
    }

    fn read_content(
        &self,
        reader: &mut XmlReader<'_>,
        aggregator: &EntityInfoAggregator<'_>,
        content: &Element,
        state: &mut EntryState,
    ) -> Result<(), EntityProviderError> {
        if let Some(src) = content.attr("src") {
            let media = &mut state.entry.media_metadata;
            media.source_link = Some(src.to_owned());
            media.content_type = content.attr("type").map(ToOwned::to_owned);
        }
        if content.is_empty {
            return Ok(());
        }
        loop {
            let element = match reader.next()? {
                Node::End => return Ok(()),
                Node::Text => continue,
                Node::Eof => return Err(EntityProviderError::invalid_state("unexpected end of document")),
                Node::Start(element) => element,
            };
            if element.is(NS_METADATA, "properties") {
                if aggregator.has_stream() {
                    return Err(EntityProviderError::new(MessageKey::InvalidParentTag)
                        .with_content("entry")
                        .with_content(element.qualified()));
                }
                self.read_properties(reader, aggregator, &element, state)?;
            } else {
                reader.skip(&element)?;
            }
        }
    }

    fn read_link(
        &self,
        reader: &mut XmlReader<'_>,
        aggregator: &EntityInfoAggregator<'_>,
        link: &Element,
        state: &mut EntryState,
    ) -> Result<(), EntityProviderError> {
        let href = link.attr("href").map(ToOwned::to_owned);
        let rel = link.attr("rel").unwrap_or_default();
        if rel == "edit" {
            state.entry.metadata.uri = href;
            return reader.skip(link);
        }
        if rel == "edit-media" {
            let media = &mut state.entry.media_metadata;
            media.edit_link = href;
            media.etag = link.attr_ns(NS_METADATA, "etag").map(ToOwned::to_owned);
            return reader.skip(link);
        }
        let Some(navigation) = rel.strip_prefix(REL_RELATED) else {
            return reader.skip(link);
        };
        let entity_set = aggregator.entity_set();
        if entity_set.entity_type().navigation_property(navigation).is_none() {
            return Err(EntityProviderError::invalid_property(navigation));
        }
        let navigation = navigation.to_owned();
        let multiplicity = entity_set
            .model()
            .navigation_multiplicity(entity_set.entity_type_id(), &navigation)?;
        if let Some(href) = href {
            state.entry.metadata.add_association_uri(&navigation, href);
        }
        state.tree = std::mem::take(&mut state.tree).with_selected(navigation.clone());
        if link.is_empty {
            return Ok(());
        }
        loop {
            let element = match reader.next()? {
                Node::End => return Ok(()),
                Node::Text => continue,
                Node::Eof => return Err(EntityProviderError::invalid_state("unexpected end of document")),
                Node::Start(element) => element,
            };
            if element.is(NS_METADATA, "inline") {
                self.read_inline(reader, aggregator, &element, &navigation, multiplicity, state)?;
            } else {
                reader.skip(&element)?;
            }
        }
    }

    fn read_inline(
        &self,
        reader: &mut XmlReader<'_>,
        aggregator: &EntityInfoAggregator<'_>,
        inline: &Element,
        navigation: &str,
        multiplicity: Multiplicity,
        state: &mut EntryState,
    ) -> Result<(), EntityProviderError> {
        state.entry.contains_inline_entry = true;
        let mut content = None;
        if !inline.is_empty {
            loop {
                match reader.next()? {
                    Node::End => break,
                    Node::Text => {}
                    Node::Eof => {
                        return Err(EntityProviderError::invalid_state("unexpected end of document"))
                    }
                    Node::Start(element) if content.is_none() && element.in_ns(NS_ATOM) => {
                        let is_feed = match element.name.as_str() {
                            "feed" => true,
                            "entry" => false,
                            _ => return Err(EntityProviderError::invalid_state("entry or feed expected")
                                .with_content(element.qualified())),
                        };
                        if is_feed != (multiplicity == Multiplicity::Many) {
                            return Err(EntityProviderError::new(MessageKey::InvalidInlineContent)
                                .with_content(navigation));
                        }
                        content = Some(self.read_inline_content(reader, aggregator, &element, navigation, is_feed)?);
                    }
                    Node::Start(element) => reader.skip(&element)?,
                }
            }
        }
        let (value, tree) = content.unwrap_or_else(|| (Value::Null, ExpandSelectTree::all()));
        state.tree = std::mem::take(&mut state.tree).with_expanded(navigation, tree);
        state.insert(navigation, value)
    }

    fn read_inline_content(
        &self,
        reader: &mut XmlReader<'_>,
        aggregator: &EntityInfoAggregator<'_>,
        element: &Element,
        navigation: &str,
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
        let consumer = AtomEntryConsumer {
            properties: &nested,
            depth: self.depth + 1,
        };
        let target = EntityInfoAggregator::create(target, None)?;
        if is_feed {
            let feed = consumer.read_feed_element(reader, &target, element)?;
            let tree = feed
                .entries
                .first()
                .map_or_else(ExpandSelectTree::all, |e| e.expand_select_tree.clone());
            Ok((Value::Feed(feed.into_property_maps()), tree))
        } else {
            let entry = consumer.read_entry_element(reader, &target, element)?;
            Ok((Value::Entity(entry.properties), entry.expand_select_tree))
        }
    }

    fn read_syndication(
        &self,
        reader: &mut XmlReader<'_>,
        aggregator: &EntityInfoAggregator<'_>,
        element: &Element,
        path: &str,
        state: &mut EntryState,
    ) -> Result<(), EntityProviderError> {
        let Some(info) = aggregator
            .target_path_info(path)
            .filter(|info| !info.is_kept_in_content())
        else {
            return reader.skip(element);
        };
        let value = read_property(reader, element, info, self.mappings(), self.properties)?;
        state.tree = std::mem::take(&mut state.tree).with_selected(info.name.clone());
        state.insert(&info.name, value)
    }

    fn read_person(
        &self,
        reader: &mut XmlReader<'_>,
        aggregator: &EntityInfoAggregator<'_>,
        person: &Element,
        state: &mut EntryState,
    ) -> Result<(), EntityProviderError> {
        if person.is_empty {
            return Ok(());
        }
        let is_author = person.name == "author";
        loop {
            let element = match reader.next()? {
                Node::End => return Ok(()),
                Node::Text => continue,
                Node::Eof => return Err(EntityProviderError::invalid_state("unexpected end of document")),
                Node::Start(element) => element,
            };
            let path = match (is_author, element.ns.as_deref(), element.name.as_str()) {
                (true, Some(NS_ATOM), "name") => target_path::SYNDICATION_AUTHOR_NAME,
                (true, Some(NS_ATOM), "email") => target_path::SYNDICATION_AUTHOR_EMAIL,
                (true, Some(NS_ATOM), "uri") => target_path::SYNDICATION_AUTHOR_URI,
                (false, Some(NS_ATOM), "name") => target_path::SYNDICATION_CONTRIBUTOR_NAME,
                (false, Some(NS_ATOM), "email") => target_path::SYNDICATION_CONTRIBUTOR_EMAIL,
                (false, Some(NS_ATOM), "uri") => target_path::SYNDICATION_CONTRIBUTOR_URI,
                _ => {
                    reader.skip(&element)?;
                    continue;
                }
            };
            self.read_syndication(reader, aggregator, &element, path, state)?;
        }
    }

    /// Foreign element: a custom-mapped property when the namespace and
    /// the target path match, otherwise skipped with its subtree.
    fn read_custom(
        &self,
        reader: &mut XmlReader<'_>,
        aggregator: &EntityInfoAggregator<'_>,
        element: &Element,
        path: Cow<'_, str>,
        state: &mut EntryState,
    ) -> Result<(), EntityProviderError> {
        let ns = element.ns.as_deref();
        let in_ns = |info: &&EntityPropertyInfo| {
            info.is_custom_mapped()
                && !info.is_kept_in_content()
                && info.feed_mapping.as_ref().and_then(|m| m.ns_uri.as_deref()) == ns
        };
        let infos = aggregator.property_infos();
        if let Some(info) = infos
            .iter()
            .filter(in_ns)
            .find(|info| info.target_path() == Some(&*path))
        {
            let value = read_property(reader, element, info, self.mappings(), self.properties)?;
            state.tree = std::mem::take(&mut state.tree).with_selected(info.name.clone());
            return state.insert(&info.name, value);
        }
        let prefix = format!("{path}/");
        let is_parent = infos
            .iter()
            .filter(in_ns)
            .any(|info| info.target_path().is_some_and(|p| p.starts_with(&prefix)));
        if !is_parent || element.is_empty {
            return reader.skip(element);
        }
        loop {
            match reader.next()? {
                Node::End => return Ok(()),
                Node::Text => {}
                Node::Eof => return Err(EntityProviderError::invalid_state("unexpected end of document")),
                Node::Start(child) if child.ns.as_deref() == ns => {
                    let child_path = format!("{prefix}{}", child.name);
                    self.read_custom(reader, aggregator, &child, Cow::Owned(child_path), state)?;
                }
                Node::Start(child) => reader.skip(&child)?,
            }
        }
    }
}
