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

//! Textual forms of `Edm.DateTime`, `Edm.DateTimeOffset` and `Edm.Time`.
//!
//! - Default form of `DateTime` is `yyyy-mm-ddThh:mm[:ss[.fffffff]]`
//!   without offset, `DateTimeOffset` uses RFC 3339 and `Time` uses
//!   the `xsd:duration` day-time subset (`PT12H30M15.5S`).
//! - Verbose JSON form is `/Date(<ms>)/` for `DateTime` and
//!   `/Date(<ms>+mmmm)/` for `DateTimeOffset` where `mmmm` is the
//!   offset in minutes.

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::Duration;
use time::OffsetDateTime;
use time::PrimitiveDateTime;
use time::UtcOffset;

const NANOS_PER_MILLI: i128 = 1_000_000;

/// Number of significant fraction-of-second digits.
pub(crate) fn fraction_digits(nanos: u32) -> u32 {
    if nanos == 0 {
        return 0;
    }
    let mut n = nanos;
    let mut digits = 9;
    while n % 10 == 0 {
        n /= 10;
        digits -= 1;
    }
    digits
}

fn fraction(nanos: u32) -> String {
    let digits = fraction_digits(nanos);
    if digits == 0 {
        String::new()
    } else {
        let s = format!("{nanos:09}");
        format!(".{}", &s[..digits as usize])
    }
}

pub(crate) fn format_date_time(dt: &PrimitiveDateTime) -> Option<String> {
    let base = dt
        .format(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second]"
        ))
        .ok()?;
    Some(base + &fraction(dt.nanosecond()))
}

pub(crate) fn parse_date_time(s: &str) -> Option<PrimitiveDateTime> {
    let s = s.strip_suffix('Z').unwrap_or(s);
    let (_, time_part) = s.split_once('T')?;
    let owned;
    let s = if time_part.matches(':').count() == 1 {
        owned = format!("{s}:00");
        owned.as_str()
    } else {
        s
    };
    if s.contains('.') {
        PrimitiveDateTime::parse(
            s,
            format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
        )
        .ok()
    } else {
        PrimitiveDateTime::parse(
            s,
            format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        )
        .ok()
    }
}

pub(crate) fn format_date_time_offset(dt: &OffsetDateTime) -> Option<String> {
    dt.format(&Rfc3339).ok()
}

pub(crate) fn parse_date_time_offset(s: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(s, &Rfc3339).ok()
}

fn unix_millis(dt: &OffsetDateTime) -> Option<i64> {
    i64::try_from(dt.unix_timestamp_nanos() / NANOS_PER_MILLI).ok()
}

pub(crate) fn from_unix_millis(millis: i64) -> Option<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * NANOS_PER_MILLI).ok()
}

/// Milliseconds since epoch of a date-time without offset (taken as UTC).
pub(crate) fn date_time_millis(dt: &PrimitiveDateTime) -> Option<i64> {
    unix_millis(&dt.assume_utc())
}

pub(crate) fn format_json_date_time(dt: &PrimitiveDateTime) -> Option<String> {
    date_time_millis(dt).map(|ms| format!("/Date({ms})/"))
}

pub(crate) fn format_json_date_time_offset(dt: &OffsetDateTime) -> Option<String> {
    let ms = unix_millis(dt)?;
    let minutes = dt.offset().whole_minutes();
    let sign = if minutes < 0 { '-' } else { '+' };
    Some(format!("/Date({ms}{sign}{:04})/", minutes.unsigned_abs()))
}

/// Split `/Date(<ms>[±mmmm])/` into milliseconds and offset minutes.
pub(crate) fn parse_json_date(s: &str) -> Option<(i64, Option<i32>)> {
    let inner = s
        .strip_prefix("/Date(")
        .or_else(|| s.strip_prefix("\\/Date("))?;
    let inner = inner
        .strip_suffix(")/")
        .or_else(|| inner.strip_suffix(")\\/"))?;
    // Offset sign is searched after the first character so a negative
    // timestamp is not taken as an offset.
    let offset_at = inner
        .char_indices()
        .skip(1)
        .find(|(_, c)| *c == '+' || *c == '-')
        .map(|(i, _)| i);
    match offset_at {
        Some(i) => {
            let ms = inner[..i].parse().ok()?;
            let minutes: i32 = inner[i + 1..].parse().ok()?;
            let minutes = if &inner[i..=i] == "-" {
                -minutes
            } else {
                minutes
            };
            Some((ms, Some(minutes)))
        }
        None => Some((inner.parse().ok()?, None)),
    }
}

pub(crate) fn json_date_time(s: &str) -> Option<PrimitiveDateTime> {
    let (ms, _) = parse_json_date(s)?;
    let dt = from_unix_millis(ms)?;
    Some(PrimitiveDateTime::new(dt.date(), dt.time()))
}

pub(crate) fn json_date_time_offset(s: &str) -> Option<OffsetDateTime> {
    let (ms, minutes) = parse_json_date(s)?;
    let dt = from_unix_millis(ms)?;
    let offset = UtcOffset::from_whole_seconds(minutes.unwrap_or(0).checked_mul(60)?).ok()?;
    Some(dt.to_offset(offset))
}

pub(crate) fn format_time(d: &Duration) -> Option<String> {
    if d.is_negative() {
        return None;
    }
    let hours = d.whole_hours();
    let minutes = d.whole_minutes() % 60;
    let seconds = d.whole_seconds() % 60;
    let nanos = u32::try_from(d.subsec_nanoseconds()).ok()?;
    let mut out = String::from("PT");
    if hours > 0 {
        out += &format!("{hours}H");
    }
    if minutes > 0 {
        out += &format!("{minutes}M");
    }
    if seconds > 0 || nanos > 0 || (hours == 0 && minutes == 0) {
        out += &format!("{seconds}{}S", fraction(nanos));
    }
    Some(out)
}

/// Parse `P[nD]T[nH][nM][n[.f]S]`.
pub(crate) fn parse_time(s: &str) -> Option<Duration> {
    let rest = s.strip_prefix('P')?;
    let (days, rest) = match rest.split_once('D') {
        Some((days, rest)) => (days.parse::<i64>().ok()?, rest),
        None => (0, rest),
    };
    let mut total = Duration::days(days);
    if rest.is_empty() {
        return (days > 0).then_some(total);
    }
    let mut rest = rest.strip_prefix('T')?;
    if rest.is_empty() {
        return None;
    }
    for (designator, unit) in [('H', 3600_i64), ('M', 60)] {
        if let Some((n, tail)) = rest.split_once(designator) {
            if n.is_empty() || !n.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            total += Duration::seconds(n.parse::<i64>().ok()?.checked_mul(unit)?);
            rest = tail;
        }
    }
    if let Some(seconds) = rest.strip_suffix('S') {
        let (whole, frac) = seconds.split_once('.').unwrap_or((seconds, ""));
        if whole.is_empty() || frac.len() > 9 || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let nanos = if frac.is_empty() {
            0
        } else {
            format!("{frac:0<9}").parse::<i32>().ok()?
        };
        total += Duration::new(whole.parse().ok()?, nanos);
    } else if !rest.is_empty() {
        return None;
    }
    Some(total)
}
