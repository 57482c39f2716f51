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
use crate::atom::consumer::read_property as read_property_element;
use crate::atom::producer::append_property;
use crate::atom::reader::Node;
use crate::atom::reader::XmlReader;
use crate::atom::XmlWriter;
use crate::atom::NS_DATA;
use crate::atom::NS_METADATA;
use crate::entry::ODataLinks;
use crate::properties::EntityProviderReadProperties;
use crate::properties::EntityProviderWriteProperties;
use odata_v2_edm::EntityProviderError;
use odata_v2_edm::MessageKey;
use odata_v2_edm::PropertyMap;
use odata_v2_edm::Value;

const PROPERTY_NAMESPACES: [(&str, &str); 2] = [("xmlns:d", NS_DATA), ("xmlns:m", NS_METADATA)];

fn writer(properties: &EntityProviderWriteProperties) -> Result<XmlWriter, EntityProviderError> {
    let mut w = XmlWriter::new();
    if properties.config().write_xml_declaration {
        w.declaration()?;
    }
    Ok(w)
}

/// `<d:Name xmlns:d=".." xmlns:m="..">value</d:Name>`
///
/// # Errors
///
/// Returns error if the value does not fit the property.
pub fn write_property(
    info: &EntityPropertyInfo,
    value: Option<&Value>,
    properties: &EntityProviderWriteProperties,
) -> Result<Vec<u8>, EntityProviderError> {
    let mut w = writer(properties)?;
    append_property(&mut w, info, value, properties, &PROPERTY_NAMESPACES)?;
    Ok(w.into_inner())
}

/// Collection of simple or complex values returned by a function
/// import: `<d:Name><d:element>..</d:element>..</d:Name>`. `element`
/// describes one value; its name is ignored.
///
/// # Errors
///
/// Returns error if a value does not fit the element type.
pub fn write_collection(
    name: &str,
    element: &EntityPropertyInfo,
    values: &[Value],
    properties: &EntityProviderWriteProperties,
) -> Result<Vec<u8>, EntityProviderError> {
    let element = EntityPropertyInfo {
        name: "element".into(),
        ..element.clone()
    };
    let mut w = writer(properties)?;
    let name = format!("d:{name}");
    w.start(&name, &PROPERTY_NAMESPACES)?;
    for value in values {
        append_property(&mut w, &element, Some(value), properties, &[])?;
    }
    w.end(&name)?;
    Ok(w.into_inner())
}

/// `<uri xmlns="..">absolute uri</uri>`
///
/// # Errors
///
/// Returns `EXCEPTION_OCCURRED` if the document cannot be written.
pub fn write_link(uri: &str, properties: &EntityProviderWriteProperties) -> Result<Vec<u8>, EntityProviderError> {
    let mut w = writer(properties)?;
    w.text_element("uri", &[("xmlns", NS_DATA)], uri)?;
    Ok(w.into_inner())
}

/// `<links><m:count>..</m:count><uri>..</uri>..</links>`
///
/// # Errors
///
/// Returns `EXCEPTION_OCCURRED` if the document cannot be written.
pub fn write_links(uris: &[String], properties: &EntityProviderWriteProperties) -> Result<Vec<u8>, EntityProviderError> {
    let mut w = writer(properties)?;
    w.start("links", &[("xmlns", NS_DATA), ("xmlns:m", NS_METADATA)])?;
    if let Some(count) = properties.inline_count() {
        w.text_element("m:count", &[], &count.to_string())?;
    }
    for uri in uris {
        w.text_element("uri", &[], uri)?;
    }
    w.end("links")?;
    Ok(w.into_inner())
}

/// Read single property document into a map with one entry.
///
/// # Errors
///
/// Returns `INVALID_PROPERTY` if the root element is not the property.
pub fn read_property(
    info: &EntityPropertyInfo,
    xml: &[u8],
    properties: &EntityProviderReadProperties,
) -> Result<PropertyMap, EntityProviderError> {
    let mut reader = XmlReader::new(xml);
    let root = reader.root()?;
    if !root.is(NS_DATA, &info.name) {
        return Err(EntityProviderError::invalid_property(root.qualified()));
    }
    let value = read_property_element(
        &mut reader,
        &root,
        info,
        Some(properties.type_mappings()),
        properties,
    )?;
    reader.finish()?;
    Ok(PropertyMap::from([(info.name.clone(), value)]))
}

/// Read single link document.
///
/// # Errors
///
/// Returns `INVALID_STATE` if the root element is not `uri`.
pub fn read_link(xml: &[u8]) -> Result<String, EntityProviderError> {
    let mut reader = XmlReader::new(xml);
    let root = reader.root()?;
    if !root.is(NS_DATA, "uri") {
        return Err(EntityProviderError::invalid_state("uri expected").with_content(root.qualified()));
    }
    let uri = reader.text(&root)?;
    reader.finish()?;
    Ok(uri)
}

/// Read link collection document.
///
/// # Errors
///
/// Returns `INVALID_STATE` if the root element is not `links` and
/// `INLINECOUNT_INVALID` if the count is not a number.
pub fn read_links(xml: &[u8]) -> Result<ODataLinks, EntityProviderError> {
    let mut reader = XmlReader::new(xml);
    let root = reader.root()?;
    if !root.is(NS_DATA, "links") {
        return Err(EntityProviderError::invalid_state("links expected").with_content(root.qualified()));
    }
    let mut links = ODataLinks::default();
    if !root.is_empty {
        loop {
            match reader.next()? {
                Node::End => break,
                Node::Text => {}
                Node::Eof => return Err(EntityProviderError::invalid_state("unexpected end of document")),
                Node::Start(element) if element.is(NS_DATA, "uri") => {
                    links.uris.push(reader.text(&element)?);
                }
                Node::Start(element) if element.is(NS_METADATA, "count") => {
                    let text = reader.text(&element)?;
                    let count = text.trim().parse::<u64>().map_err(|e| {
                        EntityProviderError::new(MessageKey::InlineCountInvalid)
                            .with_content(text.clone())
                            .with_source(e)
                    })?;
                    links.inline_count = Some(count);
                }
                Node::Start(element) => reader.skip(&element)?,
            }
        }
    }
    reader.finish()?;
    Ok(links)
}
