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

//! Values of entity instances.
//!
//! An entity is a [`PropertyMap`]: property name to [`Value`]. Absent
//! properties are absent keys; explicit nulls are [`Value::Null`].

use crate::simple_type::date_time;
use crate::simple_type::EdmSimpleTypeKind;
use crate::simple_type::LiteralKind;
use crate::simple_type::SimpleTypeError;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::collections::HashMap;
use time::Duration;
use time::OffsetDateTime;
use time::PrimitiveDateTime;
use uuid::Uuid;

/// Property values of one entity or complex value.
pub type PropertyMap = BTreeMap<String, Value>;

/// Value of a property.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Explicit null.
    Null,
    /// Simple type value.
    Scalar(ScalarValue),
    /// Complex type value.
    Complex(PropertyMap),
    /// Related entity of a to-one navigation property.
    Entity(PropertyMap),
    /// Related entities of a to-many navigation property.
    Feed(Vec<PropertyMap>),
}

impl Value {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub const fn as_scalar(&self) -> Option<&ScalarValue> {
        match self {
            Self::Scalar(v) => Some(v),
            _ => None,
        }
    }

    /// Property map of complex value or related entity.
    #[must_use]
    pub const fn as_map(&self) -> Option<&PropertyMap> {
        match self {
            Self::Complex(v) | Self::Entity(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_feed(&self) -> Option<&[PropertyMap]> {
        match self {
            Self::Feed(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(ScalarValue::String(v)) => Some(v),
            _ => None,
        }
    }
}

impl From<ScalarValue> for Value {
    fn from(v: ScalarValue) -> Self {
        Self::Scalar(v)
    }
}

impl<T: Into<ScalarValue>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, |v| Self::Scalar(v.into()))
    }
}

macro_rules! scalar_from {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$t> for ScalarValue {
                fn from(v: $t) -> Self {
                    Self::$variant(v.into())
                }
            }

            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Self::Scalar(ScalarValue::$variant(v.into()))
                }
            }
        )*
    };
}

scalar_from!(
    &str => String,
    String => String,
    bool => Boolean,
    u8 => Byte,
    i8 => SByte,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    f32 => Single,
    f64 => Double,
    Decimal => Decimal,
    Uuid => Guid,
    PrimitiveDateTime => DateTime,
    OffsetDateTime => DateTimeOffset,
    Duration => Time,
    Vec<u8> => Binary,
);

/// Value of a simple type.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Binary(Vec<u8>),
    Boolean(bool),
    Byte(u8),
    DateTime(PrimitiveDateTime),
    DateTimeOffset(OffsetDateTime),
    Decimal(Decimal),
    Double(f64),
    Guid(Uuid),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    SByte(i8),
    Single(f32),
    String(String),
    Time(Duration),
}

impl ScalarValue {
    /// Simple type of this value.
    #[must_use]
    pub const fn kind(&self) -> EdmSimpleTypeKind {
        match self {
            Self::Binary(_) => EdmSimpleTypeKind::Binary,
            Self::Boolean(_) => EdmSimpleTypeKind::Boolean,
            Self::Byte(_) => EdmSimpleTypeKind::Byte,
            Self::DateTime(_) => EdmSimpleTypeKind::DateTime,
            Self::DateTimeOffset(_) => EdmSimpleTypeKind::DateTimeOffset,
            Self::Decimal(_) => EdmSimpleTypeKind::Decimal,
            Self::Double(_) => EdmSimpleTypeKind::Double,
            Self::Guid(_) => EdmSimpleTypeKind::Guid,
            Self::Int16(_) => EdmSimpleTypeKind::Int16,
            Self::Int32(_) => EdmSimpleTypeKind::Int32,
            Self::Int64(_) => EdmSimpleTypeKind::Int64,
            Self::SByte(_) => EdmSimpleTypeKind::SByte,
            Self::Single(_) => EdmSimpleTypeKind::Single,
            Self::String(_) => EdmSimpleTypeKind::String,
            Self::Time(_) => EdmSimpleTypeKind::Time,
        }
    }

    fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Byte(v) => Some(i64::from(*v)),
            Self::SByte(v) => Some(i64::from(*v)),
            Self::Int16(v) => Some(i64::from(*v)),
            Self::Int32(v) => Some(i64::from(*v)),
            Self::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Lossless conversion used when writing a value as a property of
    /// type `target`.
    ///
    /// Accepts integers of any width within range, integers and other
    /// floating point values for `Double`/`Single`/`Decimal`, and
    /// epoch milliseconds (`Int64`) or the other date-time flavour for
    /// `DateTime`/`DateTimeOffset`.
    ///
    /// # Errors
    ///
    /// Returns error if the value cannot be represented as `target`.
    pub fn coerce(&self, target: EdmSimpleTypeKind) -> Result<Self, SimpleTypeError> {
        if self.kind() == target {
            return Ok(self.clone());
        }
        let unsupported = || SimpleTypeError::ValueTypeNotSupported {
            kind: target,
            value: self.kind(),
        };
        let int = self.as_i64();
        let out = match target {
            EdmSimpleTypeKind::Byte => int.and_then(|v| u8::try_from(v).ok()).map(Self::Byte),
            EdmSimpleTypeKind::SByte => int.and_then(|v| i8::try_from(v).ok()).map(Self::SByte),
            EdmSimpleTypeKind::Int16 => int.and_then(|v| i16::try_from(v).ok()).map(Self::Int16),
            EdmSimpleTypeKind::Int32 => int.and_then(|v| i32::try_from(v).ok()).map(Self::Int32),
            EdmSimpleTypeKind::Int64 => int.map(Self::Int64),
            #[allow(clippy::cast_precision_loss)]
            EdmSimpleTypeKind::Double => match self {
                Self::Single(v) => Some(Self::Double(f64::from(*v))),
                Self::Decimal(v) => v.to_f64().map(Self::Double),
                _ => int.map(|v| Self::Double(v as f64)),
            },
            #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
            EdmSimpleTypeKind::Single => match self {
                Self::Double(v) => Some(Self::Single(*v as f32)),
                Self::Decimal(v) => v.to_f32().map(Self::Single),
                _ => int.map(|v| Self::Single(v as f32)),
            },
            EdmSimpleTypeKind::Decimal => match self {
                Self::Double(v) => Decimal::from_f64(*v).map(Self::Decimal),
                Self::Single(v) => Decimal::from_f32(*v).map(Self::Decimal),
                _ => int.map(|v| Self::Decimal(Decimal::from(v))),
            },
            EdmSimpleTypeKind::DateTime => match self {
                Self::DateTimeOffset(v) => {
                    let utc = v.to_offset(time::UtcOffset::UTC);
                    Some(Self::DateTime(PrimitiveDateTime::new(utc.date(), utc.time())))
                }
                Self::Int64(ms) => date_time::from_unix_millis(*ms)
                    .map(|v| Self::DateTime(PrimitiveDateTime::new(v.date(), v.time()))),
                _ => None,
            },
            EdmSimpleTypeKind::DateTimeOffset => match self {
                Self::DateTime(v) => Some(Self::DateTimeOffset(v.assume_utc())),
                Self::Int64(ms) => date_time::from_unix_millis(*ms).map(Self::DateTimeOffset),
                _ => None,
            },
            _ => None,
        };
        out.ok_or_else(unsupported)
    }

    /// Best-effort conversion used by read type mappings.
    ///
    /// In addition to [`Self::coerce`] it converts date-times and
    /// durations into epoch / duration milliseconds, any value into its
    /// default literal and strings from their default literal.
    ///
    /// # Errors
    ///
    /// Returns error if no conversion exists for the value.
    pub fn convert_to(&self, target: EdmSimpleTypeKind) -> Result<Self, SimpleTypeError> {
        if let Ok(v) = self.coerce(target) {
            return Ok(v);
        }
        match (self, target) {
            (Self::DateTime(v), EdmSimpleTypeKind::Int64) => date_time::date_time_millis(v)
                .map(Self::Int64)
                .ok_or(SimpleTypeError::Unformattable(target)),
            (Self::DateTimeOffset(v), EdmSimpleTypeKind::Int64) => {
                let utc = v.to_offset(time::UtcOffset::UTC);
                date_time::date_time_millis(&PrimitiveDateTime::new(utc.date(), utc.time()))
                    .map(Self::Int64)
                    .ok_or(SimpleTypeError::Unformattable(target))
            }
            (Self::Time(v), EdmSimpleTypeKind::Int64) => i64::try_from(v.whole_milliseconds())
                .map(Self::Int64)
                .map_err(|_| SimpleTypeError::Unformattable(target)),
            (Self::String(s), _) => target.value_of_string(s, LiteralKind::Default, None),
            (_, EdmSimpleTypeKind::String) => self
                .kind()
                .value_to_string(self, LiteralKind::Default, None)
                .map(Self::String),
            _ => Err(SimpleTypeError::ValueTypeNotSupported {
                kind: target,
                value: self.kind(),
            }),
        }
    }
}

/// Target representation of a decoded property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeMapping {
    /// Convert a simple value into this kind.
    Scalar(EdmSimpleTypeKind),
    /// Mappings for the properties of a complex value or inline content.
    Nested(TypeMappings),
}

/// Property name to target representation.
pub type TypeMappings = HashMap<String, TypeMapping>;
