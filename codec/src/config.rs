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

//! Codec configuration.
//!
//! Configuration can be loaded from TOML:
//!
//! ```toml
//! max-expand-depth = 8
//! validate-facets = false
//! write-xml-declaration = true
//! ```

use serde::Deserialize;
use std::error::Error as StdError;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::fs::File;
use std::io::Error as IoError;
use std::io::Read as _;
use std::path::Path;
use toml::de::Error as TomlError;

/// Default limit of nested inline expansion.
pub const DEFAULT_MAX_EXPAND_DEPTH: usize = 32;

/// Settings shared by producers and deserializers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct CodecConfig {
    /// Maximum depth of inline (expanded) navigation content. Deeper
    /// content is rejected with `ILLEGAL_ARGUMENT`.
    pub max_expand_depth: usize,
    /// Check property facets when values are converted.
    pub validate_facets: bool,
    /// Write `<?xml ...?>` declaration in front of XML documents.
    pub write_xml_declaration: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_expand_depth: DEFAULT_MAX_EXPAND_DEPTH,
            validate_facets: true,
            write_xml_declaration: true,
        }
    }
}

impl CodecConfig {
    /// Parse configuration from TOML text. Missing keys keep their
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::Toml` if the text is not a valid configuration.
    pub fn from_toml(content: &str) -> Result<Self, Error> {
        toml::from_str(content).map_err(Error::Toml)
    }

    /// Read configuration from TOML file.
    ///
    /// # Errors
    ///
    /// - `Error::Io` if failed to read file
    /// - `Error::Toml` if failed to parse content.
    pub fn read(fname: &Path) -> Result<Self, Error> {
        let mut file = File::open(fname).map_err(Error::Io)?;
        let mut content = String::new();
        file.read_to_string(&mut content).map_err(Error::Io)?;
        Self::from_toml(&content)
    }

    #[must_use]
    pub const fn with_max_expand_depth(mut self, v: usize) -> Self {
        self.max_expand_depth = v;
        self
    }

    #[must_use]
    pub const fn with_validate_facets(mut self, v: bool) -> Self {
        self.validate_facets = v;
        self
    }

    #[must_use]
    pub const fn with_write_xml_declaration(mut self, v: bool) -> Self {
        self.write_xml_declaration = v;
        self
    }
}

#[derive(Debug)]
pub enum Error {
    Io(IoError),
    Toml(TomlError),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Io(err) => write!(f, "input/output error: {err}"),
            Self::Toml(err) => write!(f, "codec configuration format error: {err}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Toml(err) => Some(err),
        }
    }
}
