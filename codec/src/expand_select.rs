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

//! Expand/select tree.
//!
//! One node describes the shape requested for one entity: which
//! properties and navigation properties are selected and which
//! navigation properties are expanded (with their own node).
//!
//! The tree does not know the model. Selected names are matched against
//! the entity type by
//! [`EntityInfoAggregator`](crate::aggregator::EntityInfoAggregator).

use odata_v2_edm::EntityProviderError;

/// Requested shape of one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandSelectTree {
    all: bool,
    selected: Vec<String>,
    expanded: Vec<(String, Self)>,
}

impl Default for ExpandSelectTree {
    fn default() -> Self {
        Self::all()
    }
}

impl ExpandSelectTree {
    /// Everything selected, nothing expanded.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            all: true,
            selected: Vec::new(),
            expanded: Vec::new(),
        }
    }

    /// Nothing selected, nothing expanded.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            all: false,
            selected: Vec::new(),
            expanded: Vec::new(),
        }
    }

    /// Select property or navigation property.
    #[must_use]
    pub fn with_selected(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.selected.contains(&name) {
            self.selected.push(name);
        }
        self
    }

    /// Expand navigation property with `tree` as the shape of the
    /// related entities.
    #[must_use]
    pub fn with_expanded(mut self, name: impl Into<String>, tree: Self) -> Self {
        let name = name.into();
        match self.expanded.iter_mut().find(|(n, _)| *n == name) {
            Some((_, t)) => *t = tree,
            None => self.expanded.push((name, tree)),
        }
        self
    }

    /// All properties and navigation properties are selected.
    #[must_use]
    pub const fn is_all(&self) -> bool {
        self.all
    }

    /// Explicitly selected names.
    #[must_use]
    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    /// Expanded navigation property names with their subtrees.
    pub fn expanded(&self) -> impl Iterator<Item = (&str, &Self)> {
        self.expanded.iter().map(|(n, t)| (n.as_str(), t))
    }

    /// Subtree of an expanded navigation property.
    #[must_use]
    pub fn expanded_link(&self, name: &str) -> Option<&Self> {
        self.expanded
            .iter()
            .find_map(|(n, t)| (n == name).then_some(t))
    }

    /// Name is selected explicitly, by `*`, or by being expanded.
    #[must_use]
    pub fn is_selected(&self, name: &str) -> bool {
        self.all || self.selected.iter().any(|n| n == name) || self.expanded_link(name).is_some()
    }

    /// Build tree from `$select` and `$expand` path lists.
    ///
    /// Paths are `/`-separated. A select path `a/b` requires `a` to be
    /// expanded. A node without select paths selects everything.
    ///
    /// # Errors
    ///
    /// Returns `ILLEGAL_ARGUMENT` for an empty path segment or a select
    /// path that goes through a navigation property that is not
    /// expanded.
    pub fn from_paths(select: &[&str], expand: &[&str]) -> Result<Self, EntityProviderError> {
        let mut root = Builder::default();
        for path in expand {
            root.expand(&segments(path)?);
        }
        for path in select {
            root.select(&segments(path)?)
                .map_err(|()| EntityProviderError::illegal_argument("$select").with_content(*path))?;
        }
        Ok(root.build())
    }
}

fn segments(path: &str) -> Result<Vec<&str>, EntityProviderError> {
    let segments = path.trim().split('/').map(str::trim).collect::<Vec<_>>();
    if segments.iter().any(|s| s.is_empty()) {
        Err(EntityProviderError::illegal_argument("path").with_content(path))
    } else {
        Ok(segments)
    }
}

#[derive(Default)]
struct Builder {
    /// `None` until a select path reaches the node.
    all: Option<bool>,
    selected: Vec<String>,
    expanded: Vec<(String, Builder)>,
}

impl Builder {
    fn link(&mut self, name: &str) -> Option<&mut Self> {
        self.expanded
            .iter_mut()
            .find_map(|(n, b)| (n == name).then_some(b))
    }

    fn expand(&mut self, path: &[&str]) {
        if let Some((first, rest)) = path.split_first() {
            if self.link(first).is_none() {
                self.expanded.push(((*first).into(), Self::default()));
            }
            if let Some(node) = self.link(first) {
                node.expand(rest);
            }
        }
    }

    fn select(&mut self, path: &[&str]) -> Result<(), ()> {
        let all = self.all.get_or_insert(false);
        match path {
            ["*"] => {
                *all = true;
                Ok(())
            }
            [name] => {
                if !self.selected.iter().any(|n| n == name) {
                    self.selected.push((*name).into());
                }
                Ok(())
            }
            [first, rest @ ..] => self.link(first).ok_or(())?.select(rest),
            [] => Err(()),
        }
    }

    fn build(self) -> ExpandSelectTree {
        ExpandSelectTree {
            all: self.all.unwrap_or(true),
            selected: self.selected,
            expanded: self
                .expanded
                .into_iter()
                .map(|(n, b)| (n, b.build()))
                .collect(),
        }
    }
}
