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

//! Error taxonomy of the model and the codec.
//!
//! Two kinds of failures are distinguished:
//! - [`EntityProviderError`]: structural errors found while resolving
//!   metadata or while writing / reading documents. Every error carries
//!   a stable [`MessageKey`] plus positional content used to format the
//!   message.
//! - [`EdmError`]: model exceptions that only surface when a part of
//!   the resolved model is used (for example navigation property roles
//!   that do not match the association ends).

use std::error::Error as StdError;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

/// Boxed lower-level error kept as a source of [`EntityProviderError`].
pub type BoxedSource = Box<dyn StdError + Send + Sync + 'static>;

/// Closed set of message keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    /// Required attribute or child element is absent.
    MissingAttribute,
    /// Declared base type is not a type of the same kind.
    InvalidBaseType,
    /// Property appears twice under the same parent.
    DoubleProperty,
    /// Unknown or unparseable property.
    InvalidProperty,
    /// Inline content does not fit the navigation multiplicity.
    InvalidInlineContent,
    /// Element found under the wrong parent element.
    InvalidParentTag,
    /// Document declares an encoding other than UTF-8.
    UnsupportedCharacterEncoding,
    /// Inline count is negative or not a number.
    InlineCountInvalid,
    /// Navigation property expanded without inline callback.
    ExpandNotSupported,
    /// Namespace prefix or URI missing or not declared.
    InvalidNamespace,
    /// Argument passed to the codec is not acceptable.
    IllegalArgument,
    /// Wrapped lower-level failure.
    ExceptionOccurred,
    /// Non-nullable property is absent from the document.
    MissingProperty,
    /// Document structure is not what the reader expects.
    InvalidState,
}

impl MessageKey {
    /// Stable machine-readable key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingAttribute => "MISSING_ATTRIBUTE",
            Self::InvalidBaseType => "INVALID_BASE_TYPE",
            Self::DoubleProperty => "DOUBLE_PROPERTY",
            Self::InvalidProperty => "INVALID_PROPERTY",
            Self::InvalidInlineContent => "INVALID_INLINE_CONTENT",
            Self::InvalidParentTag => "INVALID_PARENT_TAG",
            Self::UnsupportedCharacterEncoding => "UNSUPPORTED_CHARACTER_ENCODING",
            Self::InlineCountInvalid => "INLINECOUNT_INVALID",
            Self::ExpandNotSupported => "EXPANDNOTSUPPORTED",
            Self::InvalidNamespace => "INVALID_NAMESPACE",
            Self::IllegalArgument => "ILLEGAL_ARGUMENT",
            Self::ExceptionOccurred => "EXCEPTION_OCCURRED",
            Self::MissingProperty => "MISSING_PROPERTY",
            Self::InvalidState => "INVALID_STATE",
        }
    }
}

impl Display for MessageKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        self.as_str().fmt(f)
    }
}

/// Error of metadata resolution, entry / feed writing and reading.
#[derive(Debug)]
pub struct EntityProviderError {
    key: MessageKey,
    content: Vec<String>,
    source: Option<BoxedSource>,
}

impl EntityProviderError {
    /// Create error with the message key and no content.
    #[must_use]
    pub const fn new(key: MessageKey) -> Self {
        Self {
            key,
            content: Vec::new(),
            source: None,
        }
    }

    /// Append positional content to the message.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content.push(content.into());
        self
    }

    /// Attach lower-level cause.
    #[must_use]
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// `EXCEPTION_OCCURRED` wrapping `source`. The source message is
    /// also kept as the first content item.
    pub fn exception_occurred<E>(source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::new(MessageKey::ExceptionOccurred)
            .with_content(source.to_string())
            .with_source(source)
    }

    /// `MISSING_ATTRIBUTE` for `attribute` of the `container` element.
    pub fn missing_attribute(attribute: impl Into<String>, container: impl Into<String>) -> Self {
        Self::new(MessageKey::MissingAttribute)
            .with_content(attribute)
            .with_content(container)
    }

    /// `DOUBLE_PROPERTY` for property `name`.
    pub fn double_property(name: impl Into<String>) -> Self {
        Self::new(MessageKey::DoubleProperty).with_content(name)
    }

    /// `INVALID_PROPERTY` for property `name`.
    pub fn invalid_property(name: impl Into<String>) -> Self {
        Self::new(MessageKey::InvalidProperty).with_content(name)
    }

    /// `ILLEGAL_ARGUMENT` with description.
    pub fn illegal_argument(what: impl Into<String>) -> Self {
        Self::new(MessageKey::IllegalArgument).with_content(what)
    }

    /// `INVALID_STATE` with description.
    pub fn invalid_state(what: impl Into<String>) -> Self {
        Self::new(MessageKey::InvalidState).with_content(what)
    }

    /// Message key of the error.
    #[must_use]
    pub const fn key(&self) -> MessageKey {
        self.key
    }

    /// Positional content of the message.
    #[must_use]
    pub fn content(&self) -> &[String] {
        &self.content
    }

    /// Model exception if this error wraps one.
    #[must_use]
    pub fn edm_error(&self) -> Option<&EdmError> {
        self.source
            .as_deref()
            .and_then(|source| source.downcast_ref::<EdmError>())
    }
}

impl Display for EntityProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.key)?;
        let mut iter = self.content.iter();
        if let Some(first) = iter.next() {
            write!(f, ": {first}")?;
            iter.try_for_each(|c| write!(f, ", {c}"))?;
        }
        Ok(())
    }
}

impl StdError for EntityProviderError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|source| source as &(dyn StdError + 'static))
    }
}

/// Model exception. Raised when a part of the model is used, never
/// during resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdmError {
    /// Navigation property roles do not match the association ends.
    NavigationRoleMismatch {
        /// Navigation property name.
        navigation: String,
        /// Qualified association name.
        relationship: String,
        /// Declared `FromRole`.
        from_role: String,
        /// Declared `ToRole`.
        to_role: String,
    },
    /// Entity type has no navigation property with this name.
    NavigationPropertyNotFound {
        /// Qualified entity type name.
        entity_type: String,
        /// Navigation property name.
        navigation: String,
    },
    /// No association set connects the entity set through the
    /// navigation property.
    AssociationSetNotFound {
        /// Entity set name.
        entity_set: String,
        /// Navigation property name.
        navigation: String,
    },
    /// Entity set referenced by an association set end does not exist.
    EntitySetNotFound(String),
}

impl Display for EdmError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::NavigationRoleMismatch {
                navigation,
                relationship,
                from_role,
                to_role,
            } => write!(
                f,
                "navigation property {navigation}: roles {from_role}/{to_role} do not match ends of association {relationship}"
            ),
            Self::NavigationPropertyNotFound {
                entity_type,
                navigation,
            } => write!(
                f,
                "entity type {entity_type} has no navigation property {navigation}"
            ),
            Self::AssociationSetNotFound {
                entity_set,
                navigation,
            } => write!(
                f,
                "no association set for navigation property {navigation} of entity set {entity_set}"
            ),
            Self::EntitySetNotFound(name) => write!(f, "entity set not found: {name}"),
        }
    }
}

impl StdError for EdmError {}

impl From<EdmError> for EntityProviderError {
    fn from(e: EdmError) -> Self {
        Self::exception_occurred(e)
    }
}
