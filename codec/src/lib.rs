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

//! OData v2 entry codec.
//!
//! Serializes entity instances described by an
//! [`EdmModel`](odata_v2_edm::EdmModel) into Atom/XML and verbose JSON
//! documents and reads such documents back into property maps.
//!
//! - [`provider`]: format-independent [`EntityProvider`].
//! - [`atom`], [`json`]: format implementations.
//! - [`aggregator`]: per-entity-set view of the model used by both.
//! - [`properties`]: write and read options.
//! - [`callback`]: inline expansion and tombstone callbacks.

pub mod aggregator;
pub mod atom;
pub mod callback;
pub mod config;
mod convert;
pub mod entry;
pub mod expand_select;
mod inline;
pub mod json;
pub mod properties;
pub mod provider;
pub mod uri;

#[doc(inline)]
pub use aggregator::EntityInfoAggregator;
#[doc(inline)]
pub use callback::InlineData;
#[doc(inline)]
pub use callback::WriteCallbackResult;
#[doc(inline)]
pub use config::CodecConfig;
#[doc(inline)]
pub use entry::ODataEntry;
#[doc(inline)]
pub use entry::ODataFeed;
#[doc(inline)]
pub use expand_select::ExpandSelectTree;
#[doc(inline)]
pub use properties::EntityProviderReadProperties;
#[doc(inline)]
pub use properties::EntityProviderWriteProperties;
#[doc(inline)]
pub use provider::ContentType;
#[doc(inline)]
pub use provider::EntityProvider;
#[doc(inline)]
pub use provider::ODataResponse;
