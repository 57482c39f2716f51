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

//! Errors for tests

use odata_v2_edm::EntityProviderError;
use serde_json::Error as JsonError;
use std::string::FromUtf8Error;
use url::ParseError as UrlError;

#[derive(Debug)]
pub enum Error {
    Provider(EntityProviderError),
    Json(JsonError),
    Url(UrlError),
    Utf8(FromUtf8Error),
    ExpectedEntitySet(&'static str),
    ExpectedFunctionImport(&'static str),
    ExpectedProperty(&'static str),
}
