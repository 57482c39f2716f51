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

//! XML helpers shared by the `$metadata` reader and the Atom codec.

use crate::error::EntityProviderError;
use crate::error::MessageKey;
use quick_xml::events::BytesDecl;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::fmt::Display;

/// The only accepted document encoding.
pub const UTF_8: &str = "utf-8";

/// Wrap XML tokenizer failure.
pub fn xml_error(e: impl Display) -> EntityProviderError {
    EntityProviderError::new(MessageKey::ExceptionOccurred).with_content(e.to_string())
}

/// Check the `encoding` pseudo-attribute of the XML declaration.
/// Absent encoding means UTF-8.
///
/// # Errors
///
/// Returns `UNSUPPORTED_CHARACTER_ENCODING` for any encoding other than
/// UTF-8 (compared case-insensitively).
pub fn check_declared_encoding(decl: &BytesDecl<'_>) -> Result<(), EntityProviderError> {
    match decl.encoding() {
        None => Ok(()),
        Some(Ok(encoding)) if encoding.eq_ignore_ascii_case(UTF_8.as_bytes()) => Ok(()),
        Some(Ok(encoding)) => Err(
            EntityProviderError::new(MessageKey::UnsupportedCharacterEncoding)
                .with_content(String::from_utf8_lossy(&encoding)),
        ),
        Some(Err(e)) => Err(xml_error(e)),
    }
}

/// Check the declaration of the document if it has one.
///
/// # Errors
///
/// Returns `UNSUPPORTED_CHARACTER_ENCODING` for a non UTF-8 declaration
/// and `EXCEPTION_OCCURRED` if the document start is malformed.
pub fn check_document_encoding(xml: &[u8]) -> Result<(), EntityProviderError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    match reader.read_event_into(&mut buf).map_err(xml_error)? {
        Event::Decl(decl) => check_declared_encoding(&decl),
        _ => Ok(()),
    }
}
