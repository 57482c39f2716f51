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

//! Self links, key predicates and entity tags.

use crate::aggregator::EntityInfoAggregator;
use crate::config::CodecConfig;
use crate::convert::format_simple;
use odata_v2_edm::EntityProviderError;
use odata_v2_edm::LiteralKind;
use odata_v2_edm::MessageKey;
use odata_v2_edm::PropertyMap;
use odata_v2_edm::Value;
use percent_encoding::utf8_percent_encode;
use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;
use tagged_types::TaggedType;
use url::Url;

/// Entity tag of an entry (`W/"..."`).
pub type ETag = TaggedType<String, ETagTag>;
#[doc(hidden)]
#[derive(tagged_types::Tag)]
#[implement(Clone, Hash, PartialEq, Eq)]
#[transparent(Debug, Display, Serialize, Deserialize)]
#[capability(inner_access)]
pub enum ETagTag {}

/// Separator of the values that form an entity tag.
pub const ETAG_DELIMITER: &str = ",";

/// Everything except unreserved characters and the sub-delimiters
/// allowed in a path segment.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'!')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b';')
    .remove(b'=')
    .remove(b':')
    .remove(b'@');

/// Percent-encode URI path segment.
#[must_use]
pub fn encode_segment(s: &str) -> String {
    utf8_percent_encode(s, SEGMENT).to_string()
}

/// Key predicate (without parentheses). A single key is written without
/// its name (`'1'`), compound keys with names (`Id=1,Type='a'`).
///
/// # Errors
///
/// Returns `MISSING_PROPERTY` if a key value is absent or null.
pub fn key_predicate(
    aggregator: &EntityInfoAggregator<'_>,
    data: &PropertyMap,
    config: &CodecConfig,
) -> Result<String, EntityProviderError> {
    let keys = aggregator.key_property_infos().collect::<Vec<_>>();
    let single = keys.len() == 1;
    keys.into_iter()
        .map(|info| {
            let missing = || EntityProviderError::new(MessageKey::MissingProperty).with_content(info.name.clone());
            let value = data
                .get(&info.name)
                .filter(|value| !matches!(value, Value::Null))
                .ok_or_else(missing)?;
            let literal = info
                .simple_kind()
                .map(|kind| format_simple(info, kind, Some(value), LiteralKind::Uri, config))
                .transpose()?
                .flatten()
                .ok_or_else(missing)?;
            let literal = encode_segment(&literal);
            Ok(if single {
                literal
            } else {
                format!("{}={literal}", info.name)
            })
        })
        .collect::<Result<Vec<_>, EntityProviderError>>()
        .map(|parts| parts.join(","))
}

/// Entity set URI relative to the service root.
#[must_use]
pub fn entity_set_link(aggregator: &EntityInfoAggregator<'_>) -> String {
    encode_segment(&aggregator.entity_set_path())
}

/// Self (edit) link of an entry relative to the service root.
///
/// # Errors
///
/// See [`key_predicate`].
pub fn self_link(
    aggregator: &EntityInfoAggregator<'_>,
    data: &PropertyMap,
    config: &CodecConfig,
) -> Result<String, EntityProviderError> {
    Ok(format!(
        "{}({})",
        entity_set_link(aggregator),
        key_predicate(aggregator, data, config)?
    ))
}

/// Absolute URI of a link relative to the service root. Without service
/// root the link is returned as is.
///
/// # Errors
///
/// Returns `ILLEGAL_ARGUMENT` if the link cannot be resolved.
pub fn absolute(service_root: Option<&Url>, link: &str) -> Result<String, EntityProviderError> {
    service_root.map_or_else(
        || Ok(link.to_owned()),
        |root| {
            root.join(link)
                .map(String::from)
                .map_err(|e| EntityProviderError::illegal_argument(link).with_source(e))
        },
    )
}

/// Service root normalized to end with `/` so that relative links are
/// resolved below it.
#[must_use]
pub fn normalize_service_root(mut root: Url) -> Url {
    if !root.path().ends_with('/') {
        let path = format!("{}/", root.path());
        root.set_path(&path);
    }
    root
}

/// Entity tag over the concurrency properties. `None` if the entity
/// type has no such property.
///
/// # Errors
///
/// Returns error if a value cannot be formatted.
pub fn etag(
    aggregator: &EntityInfoAggregator<'_>,
    data: &PropertyMap,
    config: &CodecConfig,
) -> Result<Option<ETag>, EntityProviderError> {
    let mut values = Vec::new();
    for info in aggregator.etag_property_infos() {
        let Some(kind) = info.simple_kind() else {
            continue;
        };
        let value = format_simple(info, kind, data.get(&info.name), LiteralKind::Default, config)?;
        values.push(value.unwrap_or_else(|| "null".into()));
    }
    Ok((!values.is_empty()).then(|| {
        ETag::new(format!("W/\"{}\"", values.join(ETAG_DELIMITER)))
    }))
}
