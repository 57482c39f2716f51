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

//! Namespace-aware pull reader producing owned nodes.

use crate::atom::NS_METADATA;
use odata_v2_edm::xml::check_declared_encoding;
use odata_v2_edm::xml::xml_error;
use odata_v2_edm::EntityProviderError;
use odata_v2_edm::MessageKey;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::escape::unescape;
use quick_xml::events::BytesRef;
use quick_xml::events::BytesStart;
use quick_xml::events::Event;
use quick_xml::name::QName;
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;

/// Attribute with resolved namespace.
#[derive(Debug, Clone)]
pub(crate) struct Attr {
    pub(crate) ns: Option<String>,
    pub(crate) name: String,
    pub(crate) value: String,
}

/// Start (or empty) element with resolved namespace.
#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub(crate) ns: Option<String>,
    pub(crate) name: String,
    qname: Vec<u8>,
    pub(crate) attrs: Vec<Attr>,
    pub(crate) is_empty: bool,
}

impl Element {
    pub(crate) fn is(&self, ns: &str, name: &str) -> bool {
        self.ns.as_deref() == Some(ns) && self.name == name
    }

    pub(crate) fn in_ns(&self, ns: &str) -> bool {
        self.ns.as_deref() == Some(ns)
    }

    /// Unqualified attribute value.
    pub(crate) fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.ns.is_none() && a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Attribute value in namespace `ns`.
    pub(crate) fn attr_ns(&self, ns: &str, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.ns.as_deref() == Some(ns) && a.name == name)
            .map(|a| a.value.as_str())
    }

    /// `m:null` set to an xsd:boolean true (`true` or `1`).
    pub(crate) fn is_null(&self) -> bool {
        matches!(self.attr_ns(NS_METADATA, "null"), Some("true" | "1"))
    }

    pub(crate) fn qualified(&self) -> String {
        String::from_utf8_lossy(&self.qname).into_owned()
    }
}

/// Reader node.
#[derive(Debug)]
pub(crate) enum Node {
    Start(Element),
    End,
    /// Character data between elements; callers only skip it.
    Text,
    Eof,
}

pub(crate) struct XmlReader<'i> {
    reader: NsReader<&'i [u8]>,
}

fn owned_ns(result: ResolveResult<'_>) -> Option<String> {
    match result {
        ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.as_ref()).into_owned()),
        ResolveResult::Unbound | ResolveResult::Unknown(_) => None,
    }
}

fn utf8(bytes: &[u8]) -> Result<&str, EntityProviderError> {
    std::str::from_utf8(bytes).map_err(xml_error)
}

fn unescaped(raw: &str) -> Result<String, EntityProviderError> {
    unescape(raw).map(|s| s.into_owned()).map_err(xml_error)
}

/// Replacement text of a character or predefined entity reference.
fn resolve_reference(reference: &BytesRef<'_>, out: &mut String) -> Result<(), EntityProviderError> {
    if let Some(ch) = reference.resolve_char_ref().map_err(xml_error)? {
        out.push(ch);
        return Ok(());
    }
    let name = utf8(reference)?;
    let text = resolve_predefined_entity(name)
        .ok_or_else(|| xml_error(format_args!("unknown entity reference &{name};")))?;
    out.push_str(text);
    Ok(())
}

impl<'i> XmlReader<'i> {
    pub(crate) fn new(xml: &'i [u8]) -> Self {
        let reader = NsReader::from_reader(xml);
        Self { reader }
    }

    fn element(&self, ns: Option<String>, start: &BytesStart<'_>, is_empty: bool) -> Result<Element, EntityProviderError> {
        let mut attrs = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(xml_error)?;
            if attr.key.as_namespace_binding().is_some() {
                continue;
            }
            let (attr_ns, local) = self.reader.resolve_attribute(attr.key);
            let attr_ns = owned_ns(attr_ns);
            attrs.push(Attr {
                ns: attr_ns,
                name: utf8(local.as_ref())?.to_owned(),
                value: unescaped(utf8(&attr.value)?)?,
            });
        }
        Ok(Element {
            ns,
            name: utf8(start.local_name().as_ref())?.to_owned(),
            qname: start.name().as_ref().to_vec(),
            attrs,
            is_empty,
        })
    }

    /// Next node. Declarations are checked for their encoding; comments,
    /// processing instructions and whitespace-only text are skipped.
    pub(crate) fn next(&mut self) -> Result<Node, EntityProviderError> {
        loop {
            let (resolved, event) = self.reader.read_resolved_event().map_err(xml_error)?;
            let ns = owned_ns(resolved);
            match event {
                Event::Decl(decl) => check_declared_encoding(&decl)?,
                Event::Start(start) => return self.element(ns, &start, false).map(Node::Start),
                Event::Empty(start) => return self.element(ns, &start, true).map(Node::Start),
                Event::End(_) => return Ok(Node::End),
                Event::Text(text) => {
                    if !text.iter().all(u8::is_ascii_whitespace) {
                        return Ok(Node::Text);
                    }
                }
                Event::CData(_) | Event::GeneralRef(_) => return Ok(Node::Text),
                Event::Eof => return Ok(Node::Eof),
                _ => {}
            }
        }
    }

    /// First element of the document.
    pub(crate) fn root(&mut self) -> Result<Element, EntityProviderError> {
        loop {
            match self.next()? {
                Node::Start(element) => return Ok(element),
                Node::Text => {}
                Node::End | Node::Eof => {
                    return Err(EntityProviderError::invalid_state("document has no root element"))
                }
            }
        }
    }

    /// Text content of `element`; consumes the end tag.
    ///
    /// CDATA sections and entity references are decoded, comments and
    /// processing instructions dropped. A child element is
    /// `INVALID_PROPERTY`.
    pub(crate) fn text(&mut self, element: &Element) -> Result<String, EntityProviderError> {
        let mut out = String::new();
        if element.is_empty {
            return Ok(out);
        }
        loop {
            match self.reader.read_event().map_err(xml_error)? {
                Event::Text(text) => out.push_str(&unescaped(utf8(&text)?)?),
                Event::CData(data) => out.push_str(utf8(&data)?),
                Event::GeneralRef(reference) => resolve_reference(&reference, &mut out)?,
                Event::End(_) => return Ok(out),
                Event::Start(child) | Event::Empty(child) => {
                    return Err(EntityProviderError::new(MessageKey::InvalidProperty)
                        .with_content(element.qualified())
                        .with_content(String::from_utf8_lossy(child.name().as_ref())))
                }
                Event::Eof => return Err(EntityProviderError::invalid_state("unexpected end of document")),
                _ => {}
            }
        }
    }

    /// Skip `element` with its subtree.
    pub(crate) fn skip(&mut self, element: &Element) -> Result<(), EntityProviderError> {
        if !element.is_empty {
            self.reader
                .read_to_end(QName(&element.qname))
                .map_err(xml_error)?;
        }
        Ok(())
    }

    /// Check that nothing but whitespace follows the root element.
    pub(crate) fn finish(&mut self) -> Result<(), EntityProviderError> {
        match self.next()? {
            Node::Eof => Ok(()),
            Node::Start(element) => Err(EntityProviderError::invalid_state("content after root element")
                .with_content(element.qualified())),
            Node::End | Node::Text => Err(EntityProviderError::invalid_state("content after root element")),
        }
    }
}
