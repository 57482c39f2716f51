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

use odata_v2_codec::ContentType;
use odata_v2_codec::EntityProvider;
use odata_v2_edm::model::ReturnTypeKind;
use odata_v2_edm::provider::Multiplicity;
use odata_v2_edm::EdmModel;
use odata_v2_edm::EdmSimpleTypeKind;
use odata_v2_edm::MessageKey;
use odata_v2_edm::SharedModel;
use odata_v2_edm::Value;
use odata_v2_tests::body_json;
use odata_v2_tests::body_text;
use odata_v2_tests::data;
use odata_v2_tests::scenario;
use odata_v2_tests::write_properties;
use odata_v2_tests::Error;
use std::sync::Arc;

// Derived type declared before its base type inherits key, properties
// and navigation properties.
#[test]
fn derived_type_test() -> Result<(), Error> {
    let model = scenario::model()?;
    let managers = scenario::entity_set(&model, "Managers")?;
    let manager = managers.entity_type();
    assert_eq!(manager.name.to_string(), "RefScenario.Manager");
    assert!(manager.base_type.is_some());
    assert_eq!(manager.key, ["EmployeeId"]);
    assert_eq!(manager.properties.first().map(|p| p.name.as_str()), Some("EmployeeId"));
    assert!(manager.has_stream);
    let navigation = manager
        .navigation_properties
        .iter()
        .map(|n| n.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(navigation, ["ne_Manager", "ne_Team", "ne_Room", "nm_Employees"]);
    Ok(())
}

// Facets and feed mappings of properties.
#[test]
fn property_facets_test() -> Result<(), Error> {
    let model = scenario::model()?;
    let employee = scenario::entity_set(&model, "Employees")?.entity_type();
    let name = employee
        .property("EmployeeName")
        .ok_or(Error::ExpectedProperty("EmployeeName"))?;
    assert_eq!(name.target_path(), Some("SyndicationTitle"));
    assert!(!name.is_kept_in_content());
    let id = employee
        .property("EmployeeId")
        .ok_or(Error::ExpectedProperty("EmployeeId"))?;
    assert!(!id.is_nullable());
    assert_eq!(id.simple_kind(), Some(EdmSimpleTypeKind::String));

    let room = scenario::entity_set(&model, "Rooms")?.entity_type();
    let version = room.property("Version").ok_or(Error::ExpectedProperty("Version"))?;
    assert!(version.is_etag());
    assert!(version.is_nullable());
    Ok(())
}

// Navigation properties lead to related entity sets with the
// multiplicity of the target end.
#[test]
fn navigation_test() -> Result<(), Error> {
    let model = scenario::model()?;
    let rooms = scenario::entity_set(&model, "Rooms")?;
    let buildings = rooms.related_entity_set("nr_Building").map_err(|e| Error::Provider(e.into()))?;
    assert_eq!(buildings.name(), "Buildings");
    let employees = rooms.related_entity_set("nr_Employees").map_err(|e| Error::Provider(e.into()))?;
    assert_eq!(employees.name(), "Employees");
    let multiplicity = model
        .navigation_multiplicity(rooms.entity_type_id(), "nr_Employees")
        .map_err(|e| Error::Provider(e.into()))?;
    assert_eq!(multiplicity, Multiplicity::Many);
    let multiplicity = model
        .navigation_multiplicity(rooms.entity_type_id(), "nr_Building")
        .map_err(|e| Error::Provider(e.into()))?;
    assert_eq!(multiplicity, Multiplicity::One);
    assert!(rooms.related_entity_set("nr_Floor").is_err());
    assert!(rooms.is_default_container());
    Ok(())
}

// Function imports resolve their return types.
#[test]
fn function_import_test() -> Result<(), Error> {
    let model = scenario::model()?;
    let all_locations = scenario::function_import(&model, "AllLocations")?;
    let return_type = all_locations
        .return_type
        .ok_or(Error::ExpectedFunctionImport("AllLocations"))?;
    assert_eq!(return_type.multiplicity, Multiplicity::Many);
    assert!(matches!(return_type.kind, ReturnTypeKind::Complex(_)));
    assert_eq!(all_locations.http_method.as_deref(), Some("GET"));

    let maximal_age = scenario::function_import(&model, "MaximalAge")?;
    let return_type = maximal_age
        .return_type
        .ok_or(Error::ExpectedFunctionImport("MaximalAge"))?;
    assert_eq!(return_type.kind, ReturnTypeKind::Simple(EdmSimpleTypeKind::Int16));
    assert_ne!(return_type.multiplicity, Multiplicity::Many);
    assert!(model.function_import(None, "Unknown").is_none());
    Ok(())
}

// Model supplied by a provider; media type of buildings is taken from
// the entry data.
#[test]
fn provider_model_test() -> Result<(), Error> {
    let model = EdmModel::from_provider(&scenario::provider_schemas()).map_err(Error::Provider)?;
    let buildings = scenario::entity_set(&model, "Buildings")?;
    assert_eq!(
        buildings.entity_type().media_resource_mime_type_key(),
        Some("ImageType")
    );
    let mut building = data::building("1", "Building 1");
    building.insert("ImageType".into(), Value::from("image/png"));

    let response = EntityProvider::new(ContentType::Json)
        .write_entry(buildings, &building, &write_properties()?)
        .map_err(Error::Provider)?;
    assert_eq!(body_json(&response)?["d"]["__metadata"]["content_type"], "image/png");

    let response = EntityProvider::new(ContentType::Atom)
        .write_entry(buildings, &building, &write_properties()?)
        .map_err(Error::Provider)?;
    assert!(body_text(&response)?.contains(r#"<content type="image/png" src="Buildings('1')/$value"/>"#));
    Ok(())
}

// Model is built once and shared afterwards.
#[test]
fn shared_model_test() -> Result<(), Error> {
    let shared = SharedModel::new();
    assert!(shared.get().is_none());
    let first = shared
        .get_or_try_init(|| EdmModel::from_provider(&scenario::provider_schemas()))
        .map_err(Error::Provider)?;
    let second = shared
        .get_or_try_init(|| EntityProvider::read_metadata(scenario::METADATA.as_bytes()))
        .map_err(Error::Provider)?;
    assert!(Arc::ptr_eq(&first, &second));
    assert!(first.default_entity_set("Rooms").is_some());
    Ok(())
}

// Broken documents are rejected.
#[test]
fn invalid_metadata_test() -> Result<(), Error> {
    let unknown_base = br#"<edmx:Edmx Version="1.0" xmlns:edmx="http://schemas.microsoft.com/ado/2007/06/edmx"><edmx:DataServices><Schema Namespace="S" xmlns="http://schemas.microsoft.com/ado/2008/09/edm"><EntityType Name="A" BaseType="S.Missing"/></Schema></edmx:DataServices></edmx:Edmx>"#;
    assert!(EntityProvider::read_metadata(unknown_base).is_err());
    let err = EntityProvider::read_metadata(b"<Schema/>").unwrap_err();
    assert_eq!(err.key(), MessageKey::MissingAttribute);
    Ok(())
}
