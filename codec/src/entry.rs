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

//! Results of reads and writes.

use crate::expand_select::ExpandSelectTree;
use crate::uri::ETag;
use odata_v2_edm::PropertyMap;
use std::collections::BTreeMap;

/// Metadata of a read entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryMetadata {
    /// Edit link (`link rel="edit"`, `__metadata.uri`).
    pub uri: Option<String>,
    /// Atom `id` / `__metadata.id`.
    pub id: Option<String>,
    pub etag: Option<String>,
    /// Entity type name given in the document.
    pub entity_type: Option<String>,
    /// Association URIs by navigation property name.
    pub association_uris: BTreeMap<String, Vec<String>>,
}

impl EntryMetadata {
    /// Association URIs of one navigation property.
    #[must_use]
    pub fn association_uris(&self, navigation: &str) -> &[String] {
        self.association_uris
            .get(navigation)
            .map_or(&[], Vec::as_slice)
    }

    pub(crate) fn add_association_uri(&mut self, navigation: &str, uri: String) {
        self.association_uris
            .entry(navigation.to_owned())
            .or_default()
            .push(uri);
    }
}

/// Media resource metadata of a media link entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaMetadata {
    pub source_link: Option<String>,
    pub content_type: Option<String>,
    pub edit_link: Option<String>,
    pub etag: Option<String>,
}

/// Read entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ODataEntry {
    /// Properties present in the document. Inline content of navigation
    /// properties is stored under the navigation property name.
    pub properties: PropertyMap,
    pub metadata: EntryMetadata,
    pub media_metadata: MediaMetadata,
    /// Entry has inline content.
    pub contains_inline_entry: bool,
    /// Shape of the entry: read properties and inline content.
    pub expand_select_tree: ExpandSelectTree,
}

/// Metadata of a read feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedMetadata {
    pub inline_count: Option<u64>,
    pub next_link: Option<String>,
    pub delta_link: Option<String>,
}

/// Reference to a deleted entry of a delta feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedEntry {
    /// URI of the deleted entry.
    pub uri: String,
    /// Time of deletion, if the document has one.
    pub when: Option<String>,
}

/// Read feed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ODataFeed {
    pub entries: Vec<ODataEntry>,
    pub metadata: FeedMetadata,
    pub deleted_entries: Vec<DeletedEntry>,
}

impl ODataFeed {
    /// Properties of all entries.
    #[must_use]
    pub fn into_property_maps(self) -> Vec<PropertyMap> {
        self.entries.into_iter().map(|e| e.properties).collect()
    }
}

/// Read links (`$links` request).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ODataLinks {
    pub uris: Vec<String>,
    pub inline_count: Option<u64>,
}

/// Values computed while writing an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteResult {
    pub etag: Option<ETag>,
    /// Absolute URI of the written entry.
    pub location: Option<String>,
}
