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

use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::str::FromStr;

/// Concurrency mode of the property. `Fixed` properties build the
/// entity ETag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConcurrencyMode {
    #[default]
    None,
    Fixed,
}

impl FromStr for ConcurrencyMode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "None" => Ok(Self::None),
            "Fixed" => Ok(Self::Fixed),
            _ => Err(s.into()),
        }
    }
}

impl Display for ConcurrencyMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::None => "None".fmt(f),
            Self::Fixed => "Fixed".fmt(f),
        }
    }
}

/// Property facets (CSDL 2008-09).
///
/// All facets are optional; absence means "not restricted". Note that
/// absent `nullable` means nullable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Facets {
    pub nullable: Option<bool>,
    pub max_length: Option<u32>,
    pub fixed_length: Option<bool>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
    pub unicode: Option<bool>,
    pub default_value: Option<String>,
    pub collation: Option<String>,
    pub concurrency_mode: Option<ConcurrencyMode>,
}

impl Facets {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_nullable(mut self, v: bool) -> Self {
        self.nullable = Some(v);
        self
    }

    #[must_use]
    pub const fn with_max_length(mut self, v: u32) -> Self {
        self.max_length = Some(v);
        self
    }

    #[must_use]
    pub const fn with_precision(mut self, v: u32) -> Self {
        self.precision = Some(v);
        self
    }

    #[must_use]
    pub const fn with_scale(mut self, v: u32) -> Self {
        self.scale = Some(v);
        self
    }

    #[must_use]
    pub const fn with_unicode(mut self, v: bool) -> Self {
        self.unicode = Some(v);
        self
    }

    #[must_use]
    pub const fn with_concurrency_mode(mut self, v: ConcurrencyMode) -> Self {
        self.concurrency_mode = Some(v);
        self
    }

    /// `Nullable` facet with its default applied.
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        self.nullable.unwrap_or(true)
    }

    /// Property participates in the ETag.
    #[must_use]
    pub fn is_concurrency_fixed(&self) -> bool {
        self.concurrency_mode == Some(ConcurrencyMode::Fixed)
    }
}
