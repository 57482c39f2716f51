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

//! This is tests support lib.

/// Inline and tombstone callbacks.
pub mod callbacks;
/// Errors used in tests.
pub mod error;
/// Reference scenario model.
pub mod scenario;

#[doc(inline)]
pub use error::Error;

use odata_v2_codec::EntityProviderWriteProperties;
use odata_v2_codec::ODataResponse;
use serde_json::Value as JsonValue;
use url::Url;

/// Service root of every write in tests.
pub const SERVICE_ROOT: &str = "http://localhost/odata/";

/// Write properties below [`SERVICE_ROOT`].
///
/// # Errors
///
/// Never fails for the constant root; the error is kept for `?`.
pub fn write_properties() -> Result<EntityProviderWriteProperties, Error> {
    let root = Url::parse(SERVICE_ROOT).map_err(Error::Url)?;
    Ok(EntityProviderWriteProperties::new(root))
}

/// Absolute URI below [`SERVICE_ROOT`].
#[must_use]
pub fn absolute(link: &str) -> String {
    format!("{SERVICE_ROOT}{link}")
}

/// Body of a response as text.
///
/// # Errors
///
/// Returns `Error::Utf8` if the body is not UTF-8.
pub fn body_text(response: &ODataResponse) -> Result<String, Error> {
    String::from_utf8(response.body.clone()).map_err(Error::Utf8)
}

/// Body of a JSON response.
///
/// # Errors
///
/// Returns `Error::Json` if the body is not JSON.
pub fn body_json(response: &ODataResponse) -> Result<JsonValue, Error> {
    serde_json::from_slice(&response.body).map_err(Error::Json)
}
