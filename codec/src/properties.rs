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

//! Per-call options of producers and deserializers.

use crate::callback::InlineCallback;
use crate::callback::TombstoneCallback;
use crate::config::CodecConfig;
use crate::expand_select::ExpandSelectTree;
use crate::uri::normalize_service_root;
use odata_v2_edm::value::TypeMapping;
use odata_v2_edm::value::TypeMappings;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::sync::Arc;
use url::Url;

/// Shared inline callback handle.
pub type SharedInlineCallback = Arc<dyn InlineCallback>;

/// Shared tombstone callback handle.
pub type SharedTombstoneCallback = Arc<dyn TombstoneCallback>;

/// `$inlinecount` option of a feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InlineCountType {
    #[default]
    None,
    AllPages,
}

fn callback_names<V>(callbacks: &BTreeMap<String, V>) -> Vec<&str> {
    callbacks.keys().map(String::as_str).collect()
}

/// Options of a write.
#[derive(Clone, Default)]
pub struct EntityProviderWriteProperties {
    config: CodecConfig,
    service_root: Option<Url>,
    expand_select_tree: Option<ExpandSelectTree>,
    callbacks: BTreeMap<String, SharedInlineCallback>,
    inline_count_type: InlineCountType,
    inline_count: Option<u64>,
    next_link: Option<String>,
    self_link: Option<String>,
    omit_json_wrapper: bool,
    omit_inline_for_null_data: bool,
    data_based_property_serialization: bool,
    include_simple_property_type: bool,
    tombstone_callback: Option<SharedTombstoneCallback>,
    content_only: bool,
}

impl Debug for EntityProviderWriteProperties {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("EntityProviderWriteProperties")
            .field("config", &self.config)
            .field("service_root", &self.service_root)
            .field("expand_select_tree", &self.expand_select_tree)
            .field("callbacks", &callback_names(&self.callbacks))
            .field("inline_count_type", &self.inline_count_type)
            .field("inline_count", &self.inline_count)
            .field("next_link", &self.next_link)
            .field("self_link", &self.self_link)
            .field("omit_json_wrapper", &self.omit_json_wrapper)
            .field("omit_inline_for_null_data", &self.omit_inline_for_null_data)
            .field(
                "data_based_property_serialization",
                &self.data_based_property_serialization,
            )
            .field("include_simple_property_type", &self.include_simple_property_type)
            .field("tombstone_callback", &self.tombstone_callback.is_some())
            .field("content_only", &self.content_only)
            .finish()
    }
}

impl EntityProviderWriteProperties {
    /// Properties of a server write below `service_root`.
    #[must_use]
    pub fn new(service_root: Url) -> Self {
        Self {
            service_root: Some(normalize_service_root(service_root)),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_config(mut self, config: CodecConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_expand_select_tree(mut self, tree: ExpandSelectTree) -> Self {
        self.expand_select_tree = Some(tree);
        self
    }

    /// Register inline callback of navigation property `navigation`.
    #[must_use]
    pub fn with_callback(mut self, navigation: impl Into<String>, callback: SharedInlineCallback) -> Self {
        self.callbacks.insert(navigation.into(), callback);
        self
    }

    #[must_use]
    pub const fn with_inline_count(mut self, inline_count_type: InlineCountType, count: u64) -> Self {
        self.inline_count_type = inline_count_type;
        self.inline_count = Some(count);
        self
    }

    #[must_use]
    pub fn with_next_link(mut self, next_link: impl Into<String>) -> Self {
        self.next_link = Some(next_link.into());
        self
    }

    /// Self link of a feed (instead of the entity set URI).
    #[must_use]
    pub fn with_self_link(mut self, self_link: impl Into<String>) -> Self {
        self.self_link = Some(self_link.into());
        self
    }

    /// Do not wrap JSON documents into `{"d": ...}`.
    #[must_use]
    pub const fn with_omit_json_wrapper(mut self, v: bool) -> Self {
        self.omit_json_wrapper = v;
        self
    }

    /// Omit inline content of expanded navigation properties without
    /// related data. Client writes only.
    #[must_use]
    pub const fn with_omit_inline_for_null_data(mut self, v: bool) -> Self {
        self.omit_inline_for_null_data = v;
        self
    }

    /// Write only properties present in the data.
    #[must_use]
    pub const fn with_data_based_property_serialization(mut self, v: bool) -> Self {
        self.data_based_property_serialization = v;
        self
    }

    /// Write `m:type` of simple properties in Atom documents.
    #[must_use]
    pub const fn with_include_simple_property_type(mut self, v: bool) -> Self {
        self.include_simple_property_type = v;
        self
    }

    #[must_use]
    pub fn with_tombstone_callback(mut self, callback: SharedTombstoneCallback) -> Self {
        self.tombstone_callback = Some(callback);
        self
    }

    /// Write only properties: no links, no metadata. Client request
    /// bodies.
    #[must_use]
    pub const fn with_content_only(mut self, v: bool) -> Self {
        self.content_only = v;
        self
    }

    #[must_use]
    pub const fn config(&self) -> &CodecConfig {
        &self.config
    }

    #[must_use]
    pub const fn service_root(&self) -> Option<&Url> {
        self.service_root.as_ref()
    }

    #[must_use]
    pub const fn expand_select_tree(&self) -> Option<&ExpandSelectTree> {
        self.expand_select_tree.as_ref()
    }

    #[must_use]
    pub fn callback(&self, navigation: &str) -> Option<&SharedInlineCallback> {
        self.callbacks.get(navigation)
    }

    /// Inline count to write, if requested.
    #[must_use]
    pub const fn inline_count(&self) -> Option<u64> {
        match self.inline_count_type {
            InlineCountType::AllPages => self.inline_count,
            InlineCountType::None => None,
        }
    }

    #[must_use]
    pub fn next_link(&self) -> Option<&str> {
        self.next_link.as_deref()
    }

    #[must_use]
    pub fn self_link(&self) -> Option<&str> {
        self.self_link.as_deref()
    }

    #[must_use]
    pub const fn is_omit_json_wrapper(&self) -> bool {
        self.omit_json_wrapper
    }

    #[must_use]
    pub const fn is_omit_inline_for_null_data(&self) -> bool {
        self.omit_inline_for_null_data
    }

    #[must_use]
    pub const fn is_data_based_property_serialization(&self) -> bool {
        self.data_based_property_serialization
    }

    #[must_use]
    pub const fn is_include_simple_property_type(&self) -> bool {
        self.include_simple_property_type
    }

    #[must_use]
    pub const fn tombstone_callback(&self) -> Option<&SharedTombstoneCallback> {
        self.tombstone_callback.as_ref()
    }

    #[must_use]
    pub const fn is_content_only(&self) -> bool {
        self.content_only
    }

    /// Properties of inline content written without callback-supplied
    /// properties: the same options with the expanded subtree and
    /// without feed paging.
    #[must_use]
    pub(crate) fn nested(&self, tree: &ExpandSelectTree) -> Self {
        Self {
            expand_select_tree: Some(tree.clone()),
            inline_count_type: InlineCountType::None,
            inline_count: None,
            next_link: None,
            self_link: None,
            tombstone_callback: None,
            ..self.clone()
        }
    }
}

/// Options of a read.
#[derive(Clone, Default)]
pub struct EntityProviderReadProperties {
    config: CodecConfig,
    merge_semantic: bool,
    type_mappings: TypeMappings,
    callbacks: BTreeMap<String, SharedInlineCallback>,
}

impl Debug for EntityProviderReadProperties {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("EntityProviderReadProperties")
            .field("config", &self.config)
            .field("merge_semantic", &self.merge_semantic)
            .field("type_mappings", &self.type_mappings)
            .field("callbacks", &callback_names(&self.callbacks))
            .finish()
    }
}

impl EntityProviderReadProperties {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_config(mut self, config: CodecConfig) -> Self {
        self.config = config;
        self
    }

    /// Merge (PATCH / MERGE) semantic: non-nullable properties may be
    /// absent.
    #[must_use]
    pub const fn with_merge_semantic(mut self, v: bool) -> Self {
        self.merge_semantic = v;
        self
    }

    #[must_use]
    pub fn with_type_mappings(mut self, mappings: TypeMappings) -> Self {
        self.type_mappings = mappings;
        self
    }

    #[must_use]
    pub fn with_type_mapping(mut self, name: impl Into<String>, mapping: TypeMapping) -> Self {
        self.type_mappings.insert(name.into(), mapping);
        self
    }

    /// Register inline callback of navigation property `navigation`.
    #[must_use]
    pub fn with_callback(mut self, navigation: impl Into<String>, callback: SharedInlineCallback) -> Self {
        self.callbacks.insert(navigation.into(), callback);
        self
    }

    #[must_use]
    pub const fn config(&self) -> &CodecConfig {
        &self.config
    }

    #[must_use]
    pub const fn is_merge_semantic(&self) -> bool {
        self.merge_semantic
    }

    #[must_use]
    pub const fn type_mappings(&self) -> &TypeMappings {
        &self.type_mappings
    }

    #[must_use]
    pub fn type_mapping(&self, name: &str) -> Option<&TypeMapping> {
        self.type_mappings.get(name)
    }

    #[must_use]
    pub fn callback(&self, navigation: &str) -> Option<&SharedInlineCallback> {
        self.callbacks.get(navigation)
    }

    /// Default properties of inline content of `navigation`: the same
    /// options with the nested type mappings.
    #[must_use]
    pub(crate) fn nested(&self, navigation: &str) -> Self {
        let type_mappings = match self.type_mappings.get(navigation) {
            Some(TypeMapping::Nested(nested)) => nested.clone(),
            Some(TypeMapping::Scalar(_)) | None => TypeMappings::new(),
        };
        Self {
            type_mappings,
            ..self.clone()
        }
    }
}
