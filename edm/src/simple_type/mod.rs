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

//! EDM simple types.
//!
//! Every simple type converts between [`ScalarValue`] and its textual
//! form in one of three literal kinds (see [`LiteralKind`]), checking
//! property [`Facets`] on the way.
//!
//! # Example
//!
//! ```rust
//! use odata_v2_edm::simple_type::EdmSimpleTypeKind;
//! use odata_v2_edm::simple_type::LiteralKind;
//! use odata_v2_edm::value::ScalarValue;
//!
//! let kind: EdmSimpleTypeKind = "Edm.Int64".parse().unwrap();
//! let text = kind
//!     .value_to_string(&ScalarValue::Int64(42), LiteralKind::Uri, None)
//!     .unwrap();
//! assert_eq!(text, "42L");
//! ```

pub mod date_time;
pub mod facets;
mod literal;

use crate::error::EntityProviderError;
use crate::value::ScalarValue;
use std::error::Error as StdError;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::str::FromStr;

pub use facets::ConcurrencyMode;
pub use facets::Facets;

/// Namespace of the built-in simple types.
pub const EDM_NAMESPACE: &str = "Edm";

/// Textual representation flavour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LiteralKind {
    /// Form used in XML payloads (`2012-02-29T01:02:03`).
    #[default]
    Default,
    /// Verbose JSON form (`/Date(1330477323000)/`).
    Json,
    /// URI literal form (`datetime'2012-02-29T01:02:03'`, `42L`).
    Uri,
}

/// Built-in EDM simple type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EdmSimpleTypeKind {
    Binary,
    Boolean,
    Byte,
    DateTime,
    DateTimeOffset,
    Decimal,
    Double,
    Guid,
    Int16,
    Int32,
    Int64,
    SByte,
    Single,
    String,
    Time,
}

impl EdmSimpleTypeKind {
    pub const ALL: [Self; 15] = [
        Self::Binary,
        Self::Boolean,
        Self::Byte,
        Self::DateTime,
        Self::DateTimeOffset,
        Self::Decimal,
        Self::Double,
        Self::Guid,
        Self::Int16,
        Self::Int32,
        Self::Int64,
        Self::SByte,
        Self::Single,
        Self::String,
        Self::Time,
    ];

    /// Type name without namespace.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Binary => "Binary",
            Self::Boolean => "Boolean",
            Self::Byte => "Byte",
            Self::DateTime => "DateTime",
            Self::DateTimeOffset => "DateTimeOffset",
            Self::Decimal => "Decimal",
            Self::Double => "Double",
            Self::Guid => "Guid",
            Self::Int16 => "Int16",
            Self::Int32 => "Int32",
            Self::Int64 => "Int64",
            Self::SByte => "SByte",
            Self::Single => "Single",
            Self::String => "String",
            Self::Time => "Time",
        }
    }

    /// Find kind by name without namespace.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// Verbose JSON writes the value without quotes.
    #[must_use]
    pub const fn is_json_unquoted(self) -> bool {
        matches!(
            self,
            Self::Boolean | Self::Byte | Self::SByte | Self::Int16 | Self::Int32
        )
    }

    /// Parse `literal` of the given literal kind.
    ///
    /// # Errors
    ///
    /// Returns error if the literal is not a valid literal of this type
    /// or if the value does not satisfy `facets`.
    pub fn value_of_string(
        self,
        literal: &str,
        kind: LiteralKind,
        facets: Option<&Facets>,
    ) -> Result<ScalarValue, SimpleTypeError> {
        let value = literal::parse(self, literal, kind).ok_or_else(|| {
            SimpleTypeError::IllegalLiteral {
                kind: self,
                literal: literal.into(),
            }
        })?;
        check_facets(self, &value, facets)?;
        Ok(value)
    }

    /// Format `value` in the given literal kind.
    ///
    /// Values of another kind are coerced when the coercion is lossless
    /// (for example `Int16` into `Int32`, `Int64` milliseconds into
    /// `DateTime`).
    ///
    /// # Errors
    ///
    /// Returns error if the value cannot be represented as this type or
    /// does not satisfy `facets`.
    pub fn value_to_string(
        self,
        value: &ScalarValue,
        kind: LiteralKind,
        facets: Option<&Facets>,
    ) -> Result<String, SimpleTypeError> {
        let value = value.coerce(self)?;
        check_facets(self, &value, facets)?;
        literal::format(&value, kind).ok_or(SimpleTypeError::Unformattable(self))
    }

    /// `true` if the literal is a valid literal of this type.
    #[must_use]
    pub fn validate(self, literal: &str, kind: LiteralKind, facets: Option<&Facets>) -> bool {
        self.value_of_string(literal, kind, facets).is_ok()
    }
}

/// Check whether null is acceptable for the property with `facets`.
///
/// # Errors
///
/// Returns [`SimpleTypeError::NullNotAllowed`] for `Nullable=false`.
pub fn check_null(facets: Option<&Facets>) -> Result<(), SimpleTypeError> {
    if facets.is_some_and(|f| !f.is_nullable()) {
        Err(SimpleTypeError::NullNotAllowed)
    } else {
        Ok(())
    }
}

fn check_facets(
    kind: EdmSimpleTypeKind,
    value: &ScalarValue,
    facets: Option<&Facets>,
) -> Result<(), SimpleTypeError> {
    let Some(facets) = facets else {
        return Ok(());
    };
    let failed = |facet| Err(SimpleTypeError::FacetsNotMatched { kind, facet });
    match value {
        ScalarValue::String(s) => {
            if facets
                .max_length
                .is_some_and(|max| s.chars().count() > max as usize)
            {
                return failed("MaxLength");
            }
            if facets.unicode == Some(false) && !s.is_ascii() {
                return failed("Unicode");
            }
        }
        ScalarValue::Binary(b) => {
            if facets.max_length.is_some_and(|max| b.len() > max as usize) {
                return failed("MaxLength");
            }
        }
        ScalarValue::Decimal(d) => {
            let scale = d.scale();
            if facets.scale.is_some_and(|max| scale > max) {
                return failed("Scale");
            }
            if let Some(precision) = facets.precision {
                let mantissa = d.mantissa().unsigned_abs().to_string();
                let integral = (mantissa.len() as u32).saturating_sub(scale);
                let allowed = precision.saturating_sub(facets.scale.unwrap_or(0));
                if integral > allowed {
                    return failed("Precision");
                }
            }
        }
        ScalarValue::DateTime(dt) => {
            if facets
                .precision
                .is_some_and(|p| date_time::fraction_digits(dt.nanosecond()) > p)
            {
                return failed("Precision");
            }
        }
        ScalarValue::DateTimeOffset(dt) => {
            if facets
                .precision
                .is_some_and(|p| date_time::fraction_digits(dt.nanosecond()) > p)
            {
                return failed("Precision");
            }
        }
        ScalarValue::Time(d) => {
            let nanos = d.subsec_nanoseconds().unsigned_abs();
            if facets
                .precision
                .is_some_and(|p| date_time::fraction_digits(nanos) > p)
            {
                return failed("Precision");
            }
        }
        _ => (),
    }
    Ok(())
}

impl FromStr for EdmSimpleTypeKind {
    type Err = SimpleTypeError;

    /// Parse qualified name (`Edm.Int32`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix(EDM_NAMESPACE)
            .and_then(|s| s.strip_prefix('.'))
            .and_then(Self::from_name)
            .ok_or_else(|| SimpleTypeError::UnknownType(s.into()))
    }
}

impl Display for EdmSimpleTypeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{EDM_NAMESPACE}.{}", self.name())
    }
}

/// Simple type conversion error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleTypeError {
    /// Literal cannot be parsed as the type.
    IllegalLiteral {
        kind: EdmSimpleTypeKind,
        literal: String,
    },
    /// Null value for a `Nullable=false` property.
    NullNotAllowed,
    /// Value violates facet.
    FacetsNotMatched {
        kind: EdmSimpleTypeKind,
        facet: &'static str,
    },
    /// Value of this kind cannot be represented as the target type.
    ValueTypeNotSupported {
        kind: EdmSimpleTypeKind,
        value: EdmSimpleTypeKind,
    },
    /// Value is out of range of the textual form.
    Unformattable(EdmSimpleTypeKind),
    /// Name is not a simple type name.
    UnknownType(String),
}

impl Display for SimpleTypeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::IllegalLiteral { kind, literal } => {
                write!(f, "illegal {kind} literal: {literal}")
            }
            Self::NullNotAllowed => write!(f, "null value is not allowed"),
            Self::FacetsNotMatched { kind, facet } => {
                write!(f, "{kind} value does not match facet {facet}")
            }
            Self::ValueTypeNotSupported { kind, value } => {
                write!(f, "{value} value cannot be represented as {kind}")
            }
            Self::Unformattable(kind) => write!(f, "{kind} value is out of range"),
            Self::UnknownType(name) => write!(f, "unknown simple type: {name}"),
        }
    }
}

impl StdError for SimpleTypeError {}

impl From<SimpleTypeError> for EntityProviderError {
    fn from(e: SimpleTypeError) -> Self {
        Self::exception_occurred(e)
    }
}
