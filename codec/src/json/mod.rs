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

//! Verbose JSON format (`{"d": ...}` envelope).

/// JSON entry and feed producers.
pub mod producer;

/// JSON entry and feed deserializers.
pub mod consumer;

/// Single property, collection and link documents.
pub mod misc;

use odata_v2_edm::EntityProviderError;
use serde::de::Error as DeError;
use serde::de::MapAccess;
use serde::de::SeqAccess;
use serde::de::Visitor;
use serde::Deserialize;
use serde::Deserializer;
use serde_json::Map;
use serde_json::Value as JsonValue;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

pub const D: &str = "d";
pub const METADATA: &str = "__metadata";
pub const DEFERRED: &str = "__deferred";
pub const RESULTS: &str = "results";
pub const COUNT: &str = "__count";
pub const NEXT: &str = "__next";
pub const DELTA: &str = "__delta";
pub const URI: &str = "uri";
pub const ODATA_CONTEXT: &str = "@odata.context";
/// Suffix of the context URL of a deleted entry.
pub const DELETED_ENTITY: &str = "/$deletedEntity";

pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Parsed JSON value that keeps object members in document order,
/// duplicates included.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum JsonNode {
    Null,
    Bool(bool),
    /// Number as written in the document.
    Number(String),
    String(String),
    Array(Vec<JsonNode>),
    Object(Vec<(String, JsonNode)>),
}

impl JsonNode {
    pub(crate) fn parse(json: &[u8]) -> Result<Self, EntityProviderError> {
        let mut de = serde_json::Deserializer::from_slice(json);
        let node = Self::deserialize(&mut de).map_err(EntityProviderError::exception_occurred)?;
        de.end().map_err(EntityProviderError::exception_occurred)?;
        Ok(node)
    }

    pub(crate) fn member(&self, name: &str) -> Option<&Self> {
        match self {
            Self::Object(members) => members.iter().find_map(|(k, v)| (k == name).then_some(v)),
            _ => None,
        }
    }

    pub(crate) fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Strip the `{"d": ...}` envelope if present.
    pub(crate) fn unwrap_envelope(self) -> Self {
        match self {
            Self::Object(mut members) if members.len() == 1 && members[0].0 == D => {
                members.remove(0).1
            }
            other => other,
        }
    }

    /// Literal text of a scalar node. `None` for null, arrays and objects.
    pub(crate) fn literal(&self) -> Option<String> {
        match self {
            Self::Bool(v) => Some(v.to_string()),
            Self::Number(v) | Self::String(v) => Some(v.clone()),
            Self::Null | Self::Array(_) | Self::Object(_) => None,
        }
    }

    pub(crate) const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }
}

impl<'de> Deserialize<'de> for JsonNode {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        struct NodeVisitor {}
        impl<'de> Visitor<'de> for NodeVisitor {
            type Value = JsonNode;

            fn expecting(&self, formatter: &mut Formatter) -> FmtResult {
                formatter.write_str("JSON value")
            }
            fn visit_bool<E: DeError>(self, v: bool) -> Result<Self::Value, E> {
                Ok(JsonNode::Bool(v))
            }
            fn visit_i64<E: DeError>(self, v: i64) -> Result<Self::Value, E> {
                Ok(JsonNode::Number(v.to_string()))
            }
            fn visit_u64<E: DeError>(self, v: u64) -> Result<Self::Value, E> {
                Ok(JsonNode::Number(v.to_string()))
            }
            fn visit_f64<E: DeError>(self, v: f64) -> Result<Self::Value, E> {
                Ok(JsonNode::Number(v.to_string()))
            }
            fn visit_str<E: DeError>(self, v: &str) -> Result<Self::Value, E> {
                Ok(JsonNode::String(v.into()))
            }
            fn visit_string<E: DeError>(self, v: String) -> Result<Self::Value, E> {
                Ok(JsonNode::String(v))
            }
            fn visit_unit<E: DeError>(self) -> Result<Self::Value, E> {
                Ok(JsonNode::Null)
            }
            fn visit_none<E: DeError>(self) -> Result<Self::Value, E> {
                Ok(JsonNode::Null)
            }
            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut items = Vec::new();
                while let Some(item) = seq.next_element()? {
                    items.push(item);
                }
                Ok(JsonNode::Array(items))
            }
            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut members = Vec::new();
                while let Some(member) = map.next_entry::<String, JsonNode>()? {
                    members.push(member);
                }
                Ok(JsonNode::Object(members))
            }
        }

        de.deserialize_any(NodeVisitor {})
    }
}

/// Wrap `value` into `{"d": value}` unless the wrapper is omitted.
pub(crate) fn envelope(value: JsonValue, omit_wrapper: bool) -> JsonValue {
    if omit_wrapper {
        value
    } else {
        let mut map = Map::new();
        map.insert(D.into(), value);
        JsonValue::Object(map)
    }
}

pub(crate) fn to_vec(value: &JsonValue) -> Result<Vec<u8>, EntityProviderError> {
    serde_json::to_vec(value).map_err(EntityProviderError::exception_occurred)
}
