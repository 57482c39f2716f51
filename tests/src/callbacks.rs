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

use odata_v2_codec::callback::InlineCallback;
use odata_v2_codec::callback::TombstoneCallback;
use odata_v2_codec::callback::TombstoneCallbackResult;
use odata_v2_codec::callback::WriteCallbackContext;
use odata_v2_codec::properties::SharedInlineCallback;
use odata_v2_codec::properties::SharedTombstoneCallback;
use odata_v2_codec::EntityProviderWriteProperties;
use odata_v2_codec::InlineData;
use odata_v2_codec::WriteCallbackResult;
use odata_v2_edm::EntityProviderError;
use odata_v2_edm::PropertyMap;
use std::sync::Arc;
use std::sync::Mutex;

/// Returns the same related data for every entry.
pub struct FixedInline {
    data: InlineData,
    properties: Option<EntityProviderWriteProperties>,
}

impl FixedInline {
    #[must_use]
    pub fn shared(data: InlineData) -> SharedInlineCallback {
        Arc::new(Self {
            data,
            properties: None,
        })
    }

    /// Related data written with its own write properties.
    #[must_use]
    pub fn with_properties(data: InlineData, properties: EntityProviderWriteProperties) -> SharedInlineCallback {
        Arc::new(Self {
            data,
            properties: Some(properties),
        })
    }
}

impl InlineCallback for FixedInline {
    fn produce_write_content(
        &self,
        _context: &WriteCallbackContext<'_>,
    ) -> Result<WriteCallbackResult, EntityProviderError> {
        let result = WriteCallbackResult::new(self.data.clone());
        Ok(match &self.properties {
            Some(properties) => result.with_properties(properties.clone()),
            None => result,
        })
    }
}

/// Related entries found by foreign key: entries of `related` whose
/// `foreign_key` equals the `key` of the entry being written.
pub struct ForeignKeyInline {
    related: Vec<PropertyMap>,
    key: &'static str,
    foreign_key: &'static str,
    /// Self links seen by the callback.
    pub self_links: Mutex<Vec<String>>,
}

impl ForeignKeyInline {
    #[must_use]
    pub fn new(related: Vec<PropertyMap>, key: &'static str, foreign_key: &'static str) -> Arc<Self> {
        Arc::new(Self {
            related,
            key,
            foreign_key,
            self_links: Mutex::new(Vec::new()),
        })
    }
}

impl InlineCallback for ForeignKeyInline {
    fn produce_write_content(
        &self,
        context: &WriteCallbackContext<'_>,
    ) -> Result<WriteCallbackResult, EntityProviderError> {
        if let Ok(mut links) = self.self_links.lock() {
            links.push(context.self_link.to_owned());
        }
        let key = context.entry_data.get(self.key);
        let related = self
            .related
            .iter()
            .filter(|entry| entry.get(self.foreign_key) == key)
            .cloned()
            .collect();
        Ok(WriteCallbackResult::new(InlineData::Feed(related)))
    }
}

/// Deleted entries of a delta feed.
pub struct Deleted {
    result: TombstoneCallbackResult,
}

impl Deleted {
    #[must_use]
    pub fn shared(deleted_entries: Vec<PropertyMap>, delta_link: &str) -> SharedTombstoneCallback {
        Arc::new(Self {
            result: TombstoneCallbackResult {
                deleted_entries,
                delta_link: Some(delta_link.into()),
            },
        })
    }
}

impl TombstoneCallback for Deleted {
    fn tombstone_result(&self) -> TombstoneCallbackResult {
        self.result.clone()
    }
}
