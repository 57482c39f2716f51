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

//! Conversion of simple property values to and from literals.

use crate::aggregator::EntityPropertyInfo;
use crate::config::CodecConfig;
use odata_v2_edm::simple_type::check_null;
use odata_v2_edm::simple_type::Facets;
use odata_v2_edm::value::TypeMapping;
use odata_v2_edm::EdmSimpleTypeKind;
use odata_v2_edm::EntityProviderError;
use odata_v2_edm::LiteralKind;
use odata_v2_edm::ScalarValue;
use odata_v2_edm::Value;

/// Facets that apply under the configuration.
pub(crate) fn facets<'a>(info: &'a EntityPropertyInfo, config: &CodecConfig) -> Option<&'a Facets> {
    if config.validate_facets {
        info.facets.as_ref()
    } else {
        None
    }
}

fn write_error(info: &EntityPropertyInfo, e: impl std::error::Error + Send + Sync + 'static) -> EntityProviderError {
    EntityProviderError::exception_occurred(e).with_content(info.name.clone())
}

/// Literal of a simple property value. `None` stands for null: absent
/// and explicit null values are both written as null.
pub(crate) fn format_simple(
    info: &EntityPropertyInfo,
    kind: EdmSimpleTypeKind,
    value: Option<&Value>,
    literal: LiteralKind,
    config: &CodecConfig,
) -> Result<Option<String>, EntityProviderError> {
    match value {
        None | Some(Value::Null) => {
            check_null(facets(info, config)).map_err(|e| write_error(info, e))?;
            Ok(None)
        }
        Some(Value::Scalar(v)) => kind
            .value_to_string(v, literal, facets(info, config))
            .map(Some)
            .map_err(|e| write_error(info, e)),
        Some(_) => Err(EntityProviderError::illegal_argument(info.name.clone())
            .with_content("simple value expected")),
    }
}

/// Read literal of a simple property.
///
/// A scalar type mapping converts the decoded value; the conversion
/// error is reported when the property is read.
pub(crate) fn parse_simple(
    info: &EntityPropertyInfo,
    kind: EdmSimpleTypeKind,
    text: &str,
    literal: LiteralKind,
    config: &CodecConfig,
    mapping: Option<&TypeMapping>,
) -> Result<Value, EntityProviderError> {
    let value = kind
        .value_of_string(text, literal, facets(info, config))
        .map_err(|e| EntityProviderError::invalid_property(info.name.clone()).with_source(e))?;
    map_value(info, value, mapping)
}

/// Apply type mapping to a decoded value.
pub(crate) fn map_value(
    info: &EntityPropertyInfo,
    value: ScalarValue,
    mapping: Option<&TypeMapping>,
) -> Result<Value, EntityProviderError> {
    match mapping {
        Some(TypeMapping::Scalar(target)) => value
            .convert_to(*target)
            .map(Value::Scalar)
            .map_err(|e| write_error(info, e)),
        Some(TypeMapping::Nested(_)) | None => Ok(Value::Scalar(value)),
    }
}

/// Explicit null read for the property.
pub(crate) fn read_null(info: &EntityPropertyInfo, config: &CodecConfig) -> Result<Value, EntityProviderError> {
    check_null(facets(info, config))
        .map(|()| Value::Null)
        .map_err(|e| EntityProviderError::invalid_property(info.name.clone()).with_source(e))
}
