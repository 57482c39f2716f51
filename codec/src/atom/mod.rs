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

//! Atom/XML format.
//!
//! Namespace prefixes written are `m` (metadata), `d` (data) and the
//! default namespace for Atom. Readers only compare resolved namespace
//! URIs.

/// Atom entry and feed producers.
pub mod producer;

/// Atom entry and feed deserializers.
pub mod consumer;

/// Single property, collection and link documents.
pub mod misc;

pub(crate) mod reader;

use odata_v2_edm::xml::xml_error;
use odata_v2_edm::EntityProviderError;
use quick_xml::escape::partial_escape;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::BytesDecl;
use quick_xml::events::BytesEnd;
use quick_xml::events::BytesStart;
use quick_xml::events::BytesText;
use quick_xml::events::Event;
use quick_xml::name::QName;
use quick_xml::Writer;
use std::borrow::Cow;

pub const NS_ATOM: &str = "http://www.w3.org/2005/Atom";
pub const NS_METADATA: &str = "http://schemas.microsoft.com/ado/2007/08/dataservices/metadata";
pub const NS_DATA: &str = "http://schemas.microsoft.com/ado/2007/08/dataservices";
pub const NS_XML: &str = "http://www.w3.org/XML/1998/namespace";
pub const NS_TOMBSTONE: &str = "http://purl.org/atompub/tombstones/1.0";
/// Scheme of the entity type category.
pub const NS_SCHEME: &str = "http://schemas.microsoft.com/ado/2007/08/dataservices/scheme";
/// Relation prefix of navigation links (followed by the navigation
/// property name).
pub const REL_RELATED: &str = "http://schemas.microsoft.com/ado/2007/08/dataservices/related/";

pub const PREFIX_METADATA: &str = "m";
pub const PREFIX_DATA: &str = "d";
pub const PREFIX_TOMBSTONE: &str = "at";

pub const CONTENT_TYPE_ENTRY: &str = "application/atom+xml;type=entry";
pub const CONTENT_TYPE_FEED: &str = "application/atom+xml;type=feed";
pub const CONTENT_TYPE_XML: &str = "application/xml";
pub const DEFAULT_MEDIA_TYPE: &str = "application/octet-stream";

/// Attribute list of an element.
pub(crate) type Attrs<'a> = &'a [(&'a str, &'a str)];

/// Namespace declarations of a root entry or feed element.
pub(crate) const ROOT_NAMESPACES: [(&str, &str); 3] = [
    ("xmlns", NS_ATOM),
    ("xmlns:m", NS_METADATA),
    ("xmlns:d", NS_DATA),
];

/// Attribute with `<`, `>`, `&` and `"` escaped. Apostrophes of key
/// predicates are kept as they are.
fn attribute<'a>((key, value): (&'a str, &'a str)) -> Attribute<'a> {
    Attribute {
        key: QName(key.as_bytes()),
        value: Cow::Owned(partial_escape(value).replace('"', "&quot;").into_bytes()),
    }
}

/// Thin event writer over quick-xml.
pub(crate) struct XmlWriter {
    writer: Writer<Vec<u8>>,
}

impl XmlWriter {
    pub(crate) fn new() -> Self {
        Self {
            writer: Writer::new(Vec::new()),
        }
    }

    fn write(&mut self, event: Event<'_>) -> Result<(), EntityProviderError> {
        self.writer.write_event(event).map_err(xml_error)
    }

    pub(crate) fn declaration(&mut self) -> Result<(), EntityProviderError> {
        self.write(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
    }

    pub(crate) fn start(&mut self, name: &str, attrs: Attrs<'_>) -> Result<(), EntityProviderError> {
        self.write(Event::Start(
            BytesStart::new(name).with_attributes(attrs.iter().copied().map(attribute)),
        ))
    }

    pub(crate) fn empty(&mut self, name: &str, attrs: Attrs<'_>) -> Result<(), EntityProviderError> {
        self.write(Event::Empty(
            BytesStart::new(name).with_attributes(attrs.iter().copied().map(attribute)),
        ))
    }

    pub(crate) fn end(&mut self, name: &str) -> Result<(), EntityProviderError> {
        self.write(Event::End(BytesEnd::new(name)))
    }

    pub(crate) fn text(&mut self, text: &str) -> Result<(), EntityProviderError> {
        self.write(Event::Text(BytesText::from_escaped(partial_escape(text))))
    }

    /// `<name attrs>text</name>`, or an empty element for empty text.
    pub(crate) fn text_element(
        &mut self,
        name: &str,
        attrs: Attrs<'_>,
        text: &str,
    ) -> Result<(), EntityProviderError> {
        if text.is_empty() {
            return self.empty(name, attrs);
        }
        self.start(name, attrs)?;
        self.text(text)?;
        self.end(name)
    }

    pub(crate) fn into_inner(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}
