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

use crate::simple_type::date_time;
use crate::simple_type::EdmSimpleTypeKind;
use crate::simple_type::LiteralKind;
use crate::value::ScalarValue;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

/// Strip case-insensitive `prefix` followed by a quoted literal.
fn quoted<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    if !head.eq_ignore_ascii_case(prefix) {
        return None;
    }
    s[prefix.len()..].strip_prefix('\'')?.strip_suffix('\'')
}

/// Strip case-insensitive one-letter type suffix.
fn suffixed(s: &str, suffix: char) -> Option<&str> {
    s.strip_suffix(suffix.to_ascii_uppercase())
        .or_else(|| s.strip_suffix(suffix.to_ascii_lowercase()))
}

fn is_number_text(s: &str) -> bool {
    !s.is_empty()
        && s.bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
}

fn parse_f64(s: &str) -> Option<f64> {
    match s {
        "INF" => Some(f64::INFINITY),
        "-INF" => Some(f64::NEG_INFINITY),
        "NaN" => Some(f64::NAN),
        _ if is_number_text(s) => s.parse().ok(),
        _ => None,
    }
}

fn parse_f32(s: &str) -> Option<f32> {
    match s {
        "INF" => Some(f32::INFINITY),
        "-INF" => Some(f32::NEG_INFINITY),
        "NaN" => Some(f32::NAN),
        _ if is_number_text(s) => s.parse().ok(),
        _ => None,
    }
}

fn format_float<T>(v: T, is_nan: bool, is_infinite: bool, is_negative: bool) -> String
where
    T: std::fmt::Display,
{
    if is_nan {
        "NaN".into()
    } else if is_infinite {
        (if is_negative { "-INF" } else { "INF" }).into()
    } else {
        v.to_string()
    }
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    if !is_number_text(s) {
        None
    } else if s.contains(['e', 'E']) {
        Decimal::from_scientific(s).ok()
    } else {
        Decimal::from_str(s).ok()
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

fn parse_binary(s: &str, kind: LiteralKind) -> Option<Vec<u8>> {
    match kind {
        LiteralKind::Uri => quoted(s, "X")
            .or_else(|| quoted(s, "binary"))
            .and_then(|hex| hex::decode(hex).ok()),
        LiteralKind::Default | LiteralKind::Json => BASE64.decode(s).ok(),
    }
}

/// Parse literal. `None` if the literal is not valid.
pub(crate) fn parse(
    type_kind: EdmSimpleTypeKind,
    s: &str,
    kind: LiteralKind,
) -> Option<ScalarValue> {
    let uri = kind == LiteralKind::Uri;
    Some(match type_kind {
        EdmSimpleTypeKind::Binary => ScalarValue::Binary(parse_binary(s, kind)?),
        EdmSimpleTypeKind::Boolean => ScalarValue::Boolean(parse_bool(s)?),
        EdmSimpleTypeKind::Byte => ScalarValue::Byte(s.parse().ok()?),
        EdmSimpleTypeKind::SByte => ScalarValue::SByte(s.parse().ok()?),
        EdmSimpleTypeKind::Int16 => ScalarValue::Int16(s.parse().ok()?),
        EdmSimpleTypeKind::Int32 => ScalarValue::Int32(s.parse().ok()?),
        EdmSimpleTypeKind::Int64 => {
            let s = if uri { suffixed(s, 'L')? } else { s };
            ScalarValue::Int64(s.parse().ok()?)
        }
        EdmSimpleTypeKind::Decimal => {
            let s = if uri { suffixed(s, 'M')? } else { s };
            ScalarValue::Decimal(parse_decimal(s)?)
        }
        EdmSimpleTypeKind::Double => {
            let s = if uri {
                suffixed(s, 'D').unwrap_or(s)
            } else {
                s
            };
            ScalarValue::Double(parse_f64(s)?)
        }
        EdmSimpleTypeKind::Single => {
            let s = if uri {
                suffixed(s, 'F').unwrap_or(s)
            } else {
                s
            };
            ScalarValue::Single(parse_f32(s)?)
        }
        EdmSimpleTypeKind::Guid => {
            let s = if uri { quoted(s, "guid")? } else { s };
            ScalarValue::Guid(Uuid::parse_str(s).ok()?)
        }
        EdmSimpleTypeKind::String => {
            if uri {
                let inner = s.strip_prefix('\'')?.strip_suffix('\'')?;
                ScalarValue::String(inner.replace("''", "'"))
            } else {
                ScalarValue::String(s.into())
            }
        }
        EdmSimpleTypeKind::DateTime => ScalarValue::DateTime(match kind {
            LiteralKind::Default => date_time::parse_date_time(s)?,
            LiteralKind::Json => date_time::json_date_time(s)
                .or_else(|| date_time::parse_date_time(s))?,
            LiteralKind::Uri => date_time::parse_date_time(quoted(s, "datetime")?)?,
        }),
        EdmSimpleTypeKind::DateTimeOffset => ScalarValue::DateTimeOffset(match kind {
            LiteralKind::Default => date_time::parse_date_time_offset(s)?,
            LiteralKind::Json => date_time::json_date_time_offset(s)
                .or_else(|| date_time::parse_date_time_offset(s))?,
            LiteralKind::Uri => {
                date_time::parse_date_time_offset(quoted(s, "datetimeoffset")?)?
            }
        }),
        EdmSimpleTypeKind::Time => ScalarValue::Time(if uri {
            date_time::parse_time(quoted(s, "time")?)?
        } else {
            date_time::parse_time(s)?
        }),
    })
}

/// Format value. `None` if the value has no textual form (date out of
/// range, negative duration).
pub(crate) fn format(value: &ScalarValue, kind: LiteralKind) -> Option<String> {
    let uri = kind == LiteralKind::Uri;
    Some(match value {
        ScalarValue::Binary(b) => {
            if uri {
                format!("X'{}'", hex::encode_upper(b))
            } else {
                BASE64.encode(b)
            }
        }
        ScalarValue::Boolean(v) => v.to_string(),
        ScalarValue::Byte(v) => v.to_string(),
        ScalarValue::SByte(v) => v.to_string(),
        ScalarValue::Int16(v) => v.to_string(),
        ScalarValue::Int32(v) => v.to_string(),
        ScalarValue::Int64(v) => {
            if uri {
                format!("{v}L")
            } else {
                v.to_string()
            }
        }
        ScalarValue::Decimal(v) => {
            if uri {
                format!("{v}M")
            } else {
                v.to_string()
            }
        }
        ScalarValue::Double(v) => {
            let s = format_float(v, v.is_nan(), v.is_infinite(), v.is_sign_negative());
            if uri {
                s + "D"
            } else {
                s
            }
        }
        ScalarValue::Single(v) => {
            let s = format_float(v, v.is_nan(), v.is_infinite(), v.is_sign_negative());
            if uri {
                s + "F"
            } else {
                s
            }
        }
        ScalarValue::Guid(v) => {
            if uri {
                format!("guid'{v}'")
            } else {
                v.to_string()
            }
        }
        ScalarValue::String(v) => {
            if uri {
                format!("'{}'", v.replace('\'', "''"))
            } else {
                v.clone()
            }
        }
        ScalarValue::DateTime(v) => match kind {
            LiteralKind::Default => date_time::format_date_time(v)?,
            LiteralKind::Json => date_time::format_json_date_time(v)?,
            LiteralKind::Uri => format!("datetime'{}'", date_time::format_date_time(v)?),
        },
        ScalarValue::DateTimeOffset(v) => match kind {
            LiteralKind::Default => date_time::format_date_time_offset(v)?,
            LiteralKind::Json => date_time::format_json_date_time_offset(v)?,
            LiteralKind::Uri => {
                format!("datetimeoffset'{}'", date_time::format_date_time_offset(v)?)
            }
        },
        ScalarValue::Time(v) => {
            if uri {
                format!("time'{}'", date_time::format_time(v)?)
            } else {
                date_time::format_time(v)?
            }
        }
    })
}
