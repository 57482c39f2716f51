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

//! OData v2 entity data model.
//!
//! - [`simple_type`]: EDM simple types and their literal forms.
//! - [`value`]: property values of entity instances.
//! - [`provider`]: raw schema definitions supplied by an [`EdmProvider`].
//! - [`model`]: the resolved, immutable [`EdmModel`].
//! - [`edmx`]: `$metadata` document reader.
//!
//! Every failure is reported as [`EntityProviderError`] carrying a
//! stable [`MessageKey`].

pub mod edmx;
pub mod error;
pub mod model;
pub mod provider;
pub mod simple_type;
pub mod value;
pub mod xml;

#[doc(inline)]
pub use error::EdmError;
#[doc(inline)]
pub use error::EntityProviderError;
#[doc(inline)]
pub use error::MessageKey;
#[doc(inline)]
pub use model::EdmModel;
#[doc(inline)]
pub use model::EntitySetRef;
#[doc(inline)]
pub use model::SharedModel;
#[doc(inline)]
pub use provider::EdmProvider;
#[doc(inline)]
pub use simple_type::EdmSimpleTypeKind;
#[doc(inline)]
pub use simple_type::LiteralKind;
#[doc(inline)]
pub use value::PropertyMap;
#[doc(inline)]
pub use value::ScalarValue;
#[doc(inline)]
pub use value::Value;
