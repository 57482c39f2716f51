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

//! Inline content of expanded navigation properties, shared by the Atom
//! and JSON producers.

use crate::aggregator::EntityInfoAggregator;
use crate::aggregator::NavigationPropertyInfo;
use crate::callback::InlineData;
use crate::callback::WriteCallbackContext;
use crate::callback::WriteCallbackResult;
use crate::expand_select::ExpandSelectTree;
use crate::properties::EntityProviderWriteProperties;
use odata_v2_edm::EntityProviderError;
use odata_v2_edm::EntitySetRef;
use odata_v2_edm::MessageKey;
use odata_v2_edm::PropertyMap;
use tracing::debug;

/// Related data of one expanded navigation property of one entry.
pub(crate) struct InlineContent<'a> {
    pub(crate) data: InlineData,
    properties: EntityProviderWriteProperties,
    target: EntitySetRef<'a>,
}

impl<'a> InlineContent<'a> {
    /// Ask the registered callback for the related data.
    ///
    /// `depth` is the nesting level of the entry being written (0 for the
    /// top-level entry or feed).
    pub(crate) fn produce(
        properties: &EntityProviderWriteProperties,
        aggregator: &EntityInfoAggregator<'a>,
        data: &PropertyMap,
        navigation: &NavigationPropertyInfo,
        self_link: &str,
        depth: usize,
    ) -> Result<Self, EntityProviderError> {
        let max_depth = properties.config().max_expand_depth;
        if depth >= max_depth {
            return Err(EntityProviderError::illegal_argument("$expand")
                .with_content(format!("expand depth exceeds {max_depth}")));
        }
        let entity_set = aggregator.entity_set();
        let navigation_property = entity_set.navigation_property(&navigation.name)?;
        let callback = properties.callback(&navigation.name).ok_or_else(|| {
            EntityProviderError::new(MessageKey::ExpandNotSupported).with_content(navigation.name.clone())
        })?;

        let all = ExpandSelectTree::all();
        let subtree = properties
            .expand_select_tree()
            .and_then(|tree| tree.expanded_link(&navigation.name))
            .unwrap_or(&all);
        let context = WriteCallbackContext {
            source_entity_set: entity_set,
            navigation_property,
            entry_data: data,
            expand_select_tree: subtree,
            self_link,
        };
        let WriteCallbackResult {
            data,
            properties: nested,
        } = callback.produce_write_content(&context)?;

        if navigation.is_feed() != matches!(data, InlineData::Feed(_)) {
            return Err(EntityProviderError::new(MessageKey::InvalidInlineContent)
                .with_content(navigation.name.clone()));
        }
        let target = entity_set.related_entity_set(&navigation.name)?;
        let properties = match nested {
            Some(nested) if nested.expand_select_tree().is_some() => nested,
            Some(nested) => nested.with_expand_select_tree(subtree.clone()),
            None => properties.nested(subtree),
        };
        debug!(
            entity_set = entity_set.name(),
            navigation = navigation.name.as_str(),
            target = target.name(),
            depth,
            "inline content produced"
        );
        Ok(Self {
            data,
            properties,
            target,
        })
    }

    /// Properties of the nested write.
    pub(crate) const fn properties(&self) -> &EntityProviderWriteProperties {
        &self.properties
    }

    /// Serialization plan of the related entity set.
    pub(crate) fn aggregator(&self) -> Result<EntityInfoAggregator<'a>, EntityProviderError> {
        EntityInfoAggregator::create(self.target, self.properties.expand_select_tree())
    }
}
