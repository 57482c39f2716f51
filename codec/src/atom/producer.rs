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
use crate::atom::Attrs;
use crate::atom::XmlWriter;
use crate::atom::CONTENT_TYPE_ENTRY;
use crate::atom::CONTENT_TYPE_FEED;
use crate::atom::CONTENT_TYPE_XML;
use crate::atom::DEFAULT_MEDIA_TYPE;
use crate::atom::NS_SCHEME;
use crate::atom::NS_TOMBSTONE;
use crate::atom::REL_RELATED;
use crate::atom::ROOT_NAMESPACES;
use crate::callback::InlineData;
use crate::convert::format_simple;
use crate::entry::WriteResult;
use crate::inline::InlineContent;
use crate::properties::EntityProviderWriteProperties;
use crate::uri;
use odata_v2_edm::provider::target_path;
use odata_v2_edm::EdmSimpleTypeKind;
use odata_v2_edm::EntityProviderError;
use odata_v2_edm::LiteralKind;
use odata_v2_edm::MessageKey;
use odata_v2_edm::PropertyMap;
use odata_v2_edm::Value;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::trace;

/// Current time in Atom date format.
pub(crate) fn now() -> Result<String, EntityProviderError> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(EntityProviderError::exception_occurred)
}

/// Write a simple or complex property as `d:` element.
pub(crate) fn append_property(
    w: &mut XmlWriter,
    info: &EntityPropertyInfo,
    value: Option<&Value>,
    properties: &EntityProviderWriteProperties,
    extra: Attrs<'_>,
) -> Result<(), EntityProviderError> {
    let name = format!("d:{}", info.name);
    match &info.kind {
        PropertyKind::Simple(kind) => {
            let literal = format_simple(info, *kind, value, LiteralKind::Default, properties.config())?;
            let type_name = kind.to_string();
            let mut attrs = extra.to_vec();
            if properties.is_include_simple_property_type() && *kind != EdmSimpleTypeKind::String {
                attrs.push(("m:type", type_name.as_str()));
            }
            match literal {
                Some(text) => w.text_element(&name, &attrs, &text),
                None => {
                    attrs.push(("m:null", "true"));
                    w.empty(&name, &attrs)
                }
            }
        }
        PropertyKind::Complex {
            type_name,
            properties: children,
        } => match value {
            None | Some(Value::Null) => {
                let mut attrs = extra.to_vec();
                attrs.push(("m:null", "true"));
                w.empty(&name, &attrs)
            }
            Some(Value::Complex(map)) => {
                let type_name = type_name.to_string();
                let mut attrs = extra.to_vec();
                attrs.push(("m:type", type_name.as_str()));
                w.start(&name, &attrs)?;
                for child in children {
                    let child_value = map.get(&child.name);
                    if child_value.is_some() || !properties.is_data_based_property_serialization() {
                        append_property(w, child, child_value, properties, &[])?;
                    }
                }
                w.end(&name)
            }
            Some(_) => Err(EntityProviderError::illegal_argument(info.name.clone())
                .with_content("complex value expected")),
        },
    }
}

/// Atom entry producer.
pub struct AtomEntryProducer<'p> {
    properties: &'p EntityProviderWriteProperties,
    depth: usize,
}

impl<'p> AtomEntryProducer<'p> {
    #[must_use]
    pub const fn new(properties: &'p EntityProviderWriteProperties) -> Self {
        Self {
            properties,
            depth: 0,
        }
    }

    pub(crate) const fn nested(properties: &'p EntityProviderWriteProperties, depth: usize) -> Self {
        Self { properties, depth }
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
        let mut w = XmlWriter::new();
        if self.properties.config().write_xml_declaration {
            w.declaration()?;
        }
        let result = self.append(&mut w, aggregator, data, true)?;
        Ok((w.into_inner(), result))
    }

    pub(crate) fn append(
        &self,
        w: &mut XmlWriter,
        aggregator: &EntityInfoAggregator<'_>,
        data: &PropertyMap,
        is_root: bool,
    ) -> Result<WriteResult, EntityProviderError> {
        let config = self.properties.config();
        let content_only = self.properties.is_content_only();
        let self_link = if content_only {
            None
        } else {
            Some(uri::self_link(aggregator, data, config)?)
        };
        let location = self_link
            .as_deref()
            .map(|link| uri::absolute(self.properties.service_root(), link))
            .transpose()?;
        let etag = uri::etag(aggregator, data, config)?;

        let service_root = self.properties.service_root().map(ToString::to_string);
        let etag_text = etag.as_ref().map(ToString::to_string);
        let mut attrs = Vec::new();
        if is_root {
            attrs.extend(ROOT_NAMESPACES);
            if let Some(root) = &service_root {
                attrs.push(("xml:base", root.as_str()));
            }
        }
        if let Some(etag) = &etag_text {
            attrs.push(("m:etag", etag.as_str()));
        }
        w.start("entry", &attrs)?;

        if let (Some(self_link), Some(location)) = (&self_link, &location) {
            w.text_element("id", &[], location)?;
            self.append_syndication(w, aggregator, data)?;
            if aggregator.has_stream() {
                let media_type = media_type(aggregator, data);
                w.empty(
                    "link",
                    &[
                        ("href", format!("{self_link}/$value").as_str()),
                        ("rel", "edit-media"),
                        ("type", media_type.as_str()),
                    ],
                )?;
            }
            w.empty(
                "link",
                &[
                    ("href", self_link.as_str()),
                    ("rel", "edit"),
                    ("title", aggregator.entity_type().name.name.as_str()),
                ],
            )?;
            for navigation in aggregator.navigation_infos() {
                self.append_navigation_link(w, aggregator, data, navigation, self_link)?;
            }
            w.empty(
                "category",
                &[("term", aggregator.entity_type_name().as_str()), ("scheme", NS_SCHEME)],
            )?;
        }
        self.append_custom_mapped(w, aggregator, data)?;

        if aggregator.has_stream() {
            let src = aggregator
                .entity_type()
                .media_resource_source_key()
                .and_then(|key| data.get(key))
                .and_then(Value::as_str)
                .map(ToOwned::to_owned)
                .or_else(|| self_link.as_ref().map(|link| format!("{link}/$value")));
            let media_type = media_type(aggregator, data);
            let mut content_attrs = vec![("type", media_type.as_str())];
            if let Some(src) = &src {
                content_attrs.push(("src", src.as_str()));
            }
            w.empty("content", &content_attrs)?;
            self.append_properties(w, aggregator, data)?;
        } else {
            w.start("content", &[("type", CONTENT_TYPE_XML)])?;
            self.append_properties(w, aggregator, data)?;
            w.end("content")?;
        }
        w.end("entry")?;
        trace!(
            entity_set = aggregator.entity_set_name(),
            location = location.as_deref().unwrap_or_default(),
            "atom entry written"
        );
        Ok(WriteResult { etag, location })
    }

    fn mapped_text(
        &self,
        aggregator: &EntityInfoAggregator<'_>,
        data: &PropertyMap,
        path: &str,
    ) -> Result<Option<(String, &'static str)>, EntityProviderError> {
        let Some(info) = aggregator.target_path_info(path) else {
            return Ok(None);
        };
        let Some(kind) = info.simple_kind() else {
            return Ok(None);
        };
        let content_kind = info
            .feed_mapping
            .as_ref()
            .and_then(|m| m.content_kind)
            .map_or("text", |k| k.as_str());
        Ok(
            format_simple(info, kind, data.get(&info.name), LiteralKind::Default, self.properties.config())?
                .map(|text| (text, content_kind)),
        )
    }

    fn append_syndication(
        &self,
        w: &mut XmlWriter,
        aggregator: &EntityInfoAggregator<'_>,
        data: &PropertyMap,
    ) -> Result<(), EntityProviderError> {
        let title = self.mapped_text(aggregator, data, target_path::SYNDICATION_TITLE)?;
        let (title, kind) = title.unwrap_or_else(|| (String::new(), "text"));
        w.text_element("title", &[("type", kind)], &title)?;

        let updated = match self.mapped_text(aggregator, data, target_path::SYNDICATION_UPDATED)? {
            Some((text, _)) => text,
            None => now()?,
        };
        w.text_element("updated", &[], &updated)?;

        for (path, element) in [
            (target_path::SYNDICATION_SUMMARY, "summary"),
            (target_path::SYNDICATION_RIGHTS, "rights"),
        ] {
            if let Some((text, kind)) = self.mapped_text(aggregator, data, path)? {
                w.text_element(element, &[("type", kind)], &text)?;
            }
        }
        if let Some((text, _)) = self.mapped_text(aggregator, data, target_path::SYNDICATION_PUBLISHED)? {
            w.text_element("published", &[], &text)?;
        }

        let author = [
            (target_path::SYNDICATION_AUTHOR_NAME, "name"),
            (target_path::SYNDICATION_AUTHOR_EMAIL, "email"),
            (target_path::SYNDICATION_AUTHOR_URI, "uri"),
        ];
        self.append_person(w, aggregator, data, "author", &author, true)?;
        let contributor = [
            (target_path::SYNDICATION_CONTRIBUTOR_NAME, "name"),
            (target_path::SYNDICATION_CONTRIBUTOR_EMAIL, "email"),
            (target_path::SYNDICATION_CONTRIBUTOR_URI, "uri"),
        ];
        self.append_person(w, aggregator, data, "contributor", &contributor, false)
    }

    fn append_person(
        &self,
        w: &mut XmlWriter,
        aggregator: &EntityInfoAggregator<'_>,
        data: &PropertyMap,
        element: &str,
        paths: &[(&str, &str)],
        always: bool,
    ) -> Result<(), EntityProviderError> {
        let mut values = Vec::new();
        for (path, child) in paths {
            if let Some((text, _)) = self.mapped_text(aggregator, data, path)? {
                values.push((*child, text));
            }
        }
        if values.is_empty() && !always {
            return Ok(());
        }
        w.start(element, &[])?;
        if !values.iter().any(|(child, _)| *child == "name") {
            w.empty("name", &[])?;
        }
        for (child, text) in values {
            w.text_element(child, &[], &text)?;
        }
        w.end(element)
    }

    fn append_custom_mapped(
        &self,
        w: &mut XmlWriter,
        aggregator: &EntityInfoAggregator<'_>,
        data: &PropertyMap,
    ) -> Result<(), EntityProviderError> {
        for info in aggregator.selected_property_infos() {
            if !info.is_custom_mapped() {
                continue;
            }
            let Some(kind) = info.simple_kind() else {
                continue;
            };
            let mapping = info.feed_mapping.as_ref();
            let (Some(prefix), Some(ns)) = (
                mapping.and_then(|m| m.ns_prefix.as_deref()),
                mapping.and_then(|m| m.ns_uri.as_deref()),
            ) else {
                return Err(EntityProviderError::new(MessageKey::InvalidNamespace)
                    .with_content(info.name.clone()));
            };
            let Some(path) = info.target_path() else {
                continue;
            };
            let segments = path.split('/').collect::<Vec<_>>();
            let text = format_simple(info, kind, data.get(&info.name), LiteralKind::Default, self.properties.config())?;
            let xmlns = format!("xmlns:{prefix}");
            for (i, segment) in segments.iter().enumerate() {
                let name = format!("{prefix}:{segment}");
                let attrs: Vec<(&str, &str)> = if i == 0 { vec![(xmlns.as_str(), ns)] } else { Vec::new() };
                if i + 1 == segments.len() {
                    match &text {
                        Some(text) => w.text_element(&name, &attrs, text)?,
                        None => {
                            let mut attrs = attrs;
                            attrs.push(("m:null", "true"));
                            w.empty(&name, &attrs)?;
                        }
                    }
                } else {
                    w.start(&name, &attrs)?;
                }
            }
            for segment in segments.iter().rev().skip(1) {
                w.end(&format!("{prefix}:{segment}"))?;
            }
        }
        Ok(())
    }

    fn append_properties(
        &self,
        w: &mut XmlWriter,
        aggregator: &EntityInfoAggregator<'_>,
        data: &PropertyMap,
    ) -> Result<(), EntityProviderError> {
        w.start("m:properties", &[])?;
        for info in aggregator.selected_property_infos() {
            if !info.is_kept_in_content() {
                continue;
            }
            let value = data.get(&info.name);
            if value.is_none() && self.properties.is_data_based_property_serialization() {
                continue;
            }
            append_property(w, info, value, self.properties, &[])?;
        }
        w.end("m:properties")
    }

    fn append_navigation_link(
        &self,
        w: &mut XmlWriter,
        aggregator: &EntityInfoAggregator<'_>,
        data: &PropertyMap,
        navigation: &NavigationPropertyInfo,
        self_link: &str,
    ) -> Result<(), EntityProviderError> {
        let href = format!("{self_link}/{}", navigation.name);
        let rel = format!("{REL_RELATED}{}", navigation.name);
        let link_type = if navigation.is_feed() {
            CONTENT_TYPE_FEED
        } else {
            CONTENT_TYPE_ENTRY
        };
        let attrs = [
            ("href", href.as_str()),
            ("rel", rel.as_str()),
            ("title", navigation.name.as_str()),
            ("type", link_type),
        ];
        if !aggregator.is_expanded(&navigation.name) {
            return w.empty("link", &attrs);
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
            return w.empty("link", &attrs);
        }
        w.start("link", &attrs)?;
        let target = inline.aggregator()?;
        let nested = AtomEntryProducer::nested(inline.properties(), self.depth + 1);
        match &inline.data {
            InlineData::Entry(None) => w.empty("m:inline", &[])?,
            InlineData::Entry(Some(entry)) => {
                w.start("m:inline", &[])?;
                nested.append(w, &target, entry, false)?;
                w.end("m:inline")?;
            }
            InlineData::Feed(entries) => {
                w.start("m:inline", &[])?;
                AtomFeedProducer::from_entry_producer(&nested).append(w, &target, entries, &href, false)?;
                w.end("m:inline")?;
            }
        }
        w.end("link")
    }
}

fn media_type(aggregator: &EntityInfoAggregator<'_>, data: &PropertyMap) -> String {
    aggregator
        .entity_type()
        .media_resource_mime_type_key()
        .and_then(|key| data.get(key))
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_MEDIA_TYPE)
        .to_owned()
}

/// Atom feed producer.
pub struct AtomFeedProducer<'p> {
    entry: AtomEntryProducer<'p>,
}

impl<'p> AtomFeedProducer<'p> {
    #[must_use]
    pub const fn new(properties: &'p EntityProviderWriteProperties) -> Self {
        Self {
            entry: AtomEntryProducer::new(properties),
        }
    }

    const fn from_entry_producer(entry: &AtomEntryProducer<'p>) -> Self {
        Self {
            entry: AtomEntryProducer::nested(entry.properties, entry.depth),
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
        let properties = self.entry.properties;
        let mut w = XmlWriter::new();
        if properties.config().write_xml_declaration {
            w.declaration()?;
        }
        let link = properties
            .self_link()
            .map_or_else(|| uri::entity_set_link(aggregator), ToOwned::to_owned);
        self.append(&mut w, aggregator, data, &link, true)?;
        Ok(w.into_inner())
    }

    pub(crate) fn append(
        &self,
        w: &mut XmlWriter,
        aggregator: &EntityInfoAggregator<'_>,
        data: &[PropertyMap],
        link: &str,
        is_root: bool,
    ) -> Result<(), EntityProviderError> {
        let properties = self.entry.properties;
        let tombstones = properties
            .tombstone_callback()
            .map(|callback| callback.tombstone_result());
        let service_root = properties.service_root().map(ToString::to_string);
        let mut attrs = Vec::new();
        if is_root {
            attrs.extend(ROOT_NAMESPACES);
        }
        // Inline feeds with tombstones declare the prefix themselves.
        if tombstones.is_some() {
            attrs.push(("xmlns:at", NS_TOMBSTONE));
        }
        if let Some(root) = service_root.as_ref().filter(|_| is_root) {
            attrs.push(("xml:base", root.as_str()));
        }
        w.start("feed", &attrs)?;
        w.text_element("id", &[], &uri::absolute(properties.service_root(), link)?)?;
        w.text_element("title", &[("type", "text")], aggregator.entity_set_name())?;
        w.text_element("updated", &[], &now()?)?;
        w.start("author", &[])?;
        w.empty("name", &[])?;
        w.end("author")?;
        w.empty(
            "link",
            &[
                ("href", link),
                ("rel", "self"),
                ("title", aggregator.entity_set_name()),
            ],
        )?;
        if let Some(count) = properties.inline_count() {
            w.text_element("m:count", &[], &count.to_string())?;
        }
        for entry in data {
            self.entry.append(w, aggregator, entry, false)?;
        }
        if let Some(next) = properties.next_link() {
            w.empty("link", &[("href", next), ("rel", "next")])?;
        }
        if let Some(tombstones) = tombstones {
            if let Some(delta) = &tombstones.delta_link {
                w.empty("link", &[("href", delta), ("rel", "delta")])?;
            }
            for deleted in &tombstones.deleted_entries {
                let self_link = uri::self_link(aggregator, deleted, properties.config())?;
                let reference = uri::absolute(properties.service_root(), &self_link)?;
                let when = match self.entry.mapped_text(aggregator, deleted, target_path::SYNDICATION_UPDATED)? {
                    Some((text, _)) => text,
                    None => now()?,
                };
                w.empty(
                    "at:deleted-entry",
                    &[("ref", reference.as_str()), ("when", when.as_str())],
                )?;
            }
        }
        w.end("feed")?;
        trace!(
            entity_set = aggregator.entity_set_name(),
            entries = data.len(),
            "atom feed written"
        );
        Ok(())
    }
}
