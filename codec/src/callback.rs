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

//! Extension points of the codec.
//!
//! The caller, not the codec, supplies related data of expanded
//! navigation properties ([`InlineCallback`]) and deleted entries of
//! delta feeds ([`TombstoneCallback`]). Callbacks are registered per
//! call in the write / read properties.

use crate::expand_select::ExpandSelectTree;
use crate::properties::EntityProviderReadProperties;
use crate::properties::EntityProviderWriteProperties;
use odata_v2_edm::model::NavigationProperty;
use odata_v2_edm::EntityProviderError;
use odata_v2_edm::EntitySetRef;
use odata_v2_edm::MessageKey;
use odata_v2_edm::PropertyMap;

/// Arguments of [`InlineCallback::produce_write_content`].
#[derive(Debug, Clone, Copy)]
pub struct WriteCallbackContext<'a> {
    /// Entity set of the entry being written.
    pub source_entity_set: EntitySetRef<'a>,
    /// Expanded navigation property.
    pub navigation_property: &'a NavigationProperty,
    /// Data of the entry being written.
    pub entry_data: &'a PropertyMap,
    /// Shape requested for the related entities.
    pub expand_select_tree: &'a ExpandSelectTree,
    /// Self link of the entry being written.
    pub self_link: &'a str,
}

/// Related data of an expanded navigation property.
#[derive(Debug, Clone, PartialEq)]
pub enum InlineData {
    /// Related entry of a navigation property with multiplicity one or
    /// zero-to-one. `None` for no related entry.
    Entry(Option<PropertyMap>),
    /// Related entries of a navigation property with multiplicity many.
    Feed(Vec<PropertyMap>),
}

impl InlineData {
    /// No related data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Entry(entry) => entry.is_none(),
            Self::Feed(entries) => entries.is_empty(),
        }
    }
}

/// Result of [`InlineCallback::produce_write_content`].
#[derive(Debug, Clone)]
pub struct WriteCallbackResult {
    pub data: InlineData,
    /// Properties of the nested write. `None` inherits the properties of
    /// the enclosing write with the expanded subtree.
    pub properties: Option<EntityProviderWriteProperties>,
}

impl WriteCallbackResult {
    #[must_use]
    pub const fn new(data: InlineData) -> Self {
        Self {
            data,
            properties: None,
        }
    }

    #[must_use]
    pub fn with_properties(mut self, properties: EntityProviderWriteProperties) -> Self {
        self.properties = Some(properties);
        self
    }
}

/// Arguments of [`InlineCallback::produce_read_properties`].
#[derive(Debug, Clone, Copy)]
pub struct ReadCallbackContext<'a> {
    /// Properties of the enclosing read.
    pub read_properties: &'a EntityProviderReadProperties,
    /// Entity set of the entry being read.
    pub source_entity_set: EntitySetRef<'a>,
    /// Navigation property with inline content.
    pub navigation_property: &'a NavigationProperty,
    /// Inline content is a feed.
    pub is_feed: bool,
}

/// Inline content capability of one navigation property.
pub trait InlineCallback: Send + Sync {
    /// Related data of an expanded navigation property. Invoked once per
    /// entry written.
    ///
    /// # Errors
    ///
    /// Default implementation fails with `EXPANDNOTSUPPORTED`.
    fn produce_write_content(
        &self,
        context: &WriteCallbackContext<'_>,
    ) -> Result<WriteCallbackResult, EntityProviderError> {
        Err(EntityProviderError::new(MessageKey::ExpandNotSupported)
            .with_content(context.navigation_property.name.clone()))
    }

    /// Read properties of an inline payload. Invoked once per inline
    /// payload read. `None` reads the payload with the properties of the
    /// enclosing read.
    ///
    /// # Errors
    ///
    /// Errors are propagated to the caller of the read.
    fn produce_read_properties(
        &self,
        _context: &ReadCallbackContext<'_>,
    ) -> Result<Option<EntityProviderReadProperties>, EntityProviderError> {
        Ok(None)
    }
}

/// Deleted entries and delta link of a delta feed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TombstoneCallbackResult {
    /// Data of deleted entries. Only keys (and the property mapped to
    /// `SyndicationUpdated`, if any) are used.
    pub deleted_entries: Vec<PropertyMap>,
    pub delta_link: Option<String>,
}

/// Delta feed capability.
pub trait TombstoneCallback: Send + Sync {
    /// Deleted entries of the feed being written.
    fn tombstone_result(&self) -> TombstoneCallbackResult;
}
