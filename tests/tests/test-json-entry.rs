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
use odata_v2_codec::EntityProviderReadProperties;
use odata_v2_edm::MessageKey;
use odata_v2_edm::Value;
use odata_v2_tests::absolute;
use odata_v2_tests::body_json;
use odata_v2_tests::data;
use odata_v2_tests::scenario;
use odata_v2_tests::write_properties;
use odata_v2_tests::Error;
use serde_json::json;

const JSON: EntityProvider = EntityProvider::new(ContentType::Json);

// Whole entry document: metadata object, unquoted Int16 values and
// deferred navigation properties.
#[test]
fn room_entry_test() -> Result<(), Error> {
    let model = scenario::model()?;
    let rooms = scenario::entity_set(&model, "Rooms")?;
    let response = JSON
        .write_entry(rooms, &data::room("1", "Room 1", 4, 1), &write_properties()?)
        .map_err(Error::Provider)?;
    assert_eq!(response.content_type, "application/json");
    assert_eq!(response.location.as_deref(), Some(absolute("Rooms('1')").as_str()));
    assert_eq!(
        body_json(&response)?,
        json!({
            "d": {
                "__metadata": {
                    "id": absolute("Rooms('1')"),
                    "uri": absolute("Rooms('1')"),
                    "type": "RefScenario.Room",
                    "etag": "W/\"1\"",
                },
                "Id": "1",
                "Name": "Room 1",
                "Seats": 4,
                "Version": 1,
                "nr_Employees": {"__deferred": {"uri": absolute("Rooms('1')/nr_Employees")}},
                "nr_Building": {"__deferred": {"uri": absolute("Rooms('1')/nr_Building")}},
            }
        })
    );
    Ok(())
}

// Media resource metadata, complex type names and the JSON date form.
#[test]
fn employee_entry_test() -> Result<(), Error> {
    let model = scenario::model()?;
    let employees = scenario::entity_set(&model, "Employees")?;
    let employee = data::employee("1", "Walter Winter", "1");
    let response = JSON
        .write_entry(employees, &employee, &write_properties()?)
        .map_err(Error::Provider)?;
    let body = body_json(&response)?;
    let d = &body["d"];
    assert_eq!(d["__metadata"]["content_type"], "application/octet-stream");
    assert_eq!(d["__metadata"]["media_src"], json!(absolute("Employees('1')/$value")));
    assert_eq!(d["__metadata"]["edit_media"], json!(absolute("Employees('1')/$value")));
    assert_eq!(d["EmployeeName"], "Walter Winter");
    assert_eq!(d["Age"], 52);
    assert_eq!(d["EntryDate"], "/Date(915148800000)/");
    assert_eq!(
        d["Location"],
        json!({
            "__metadata": {"type": "RefScenario.c_Location"},
            "City": {
                "__metadata": {"type": "RefScenario.c_City"},
                "PostalCode": "69124",
                "CityName": "Heidelberg",
            },
            "Country": "Germany",
        })
    );

    let entry = JSON
        .read_entry(employees, &response.body, &EntityProviderReadProperties::new())
        .map_err(Error::Provider)?;
    assert_eq!(entry.properties, employee);
    assert_eq!(
        entry.media_metadata.content_type.as_deref(),
        Some("application/octet-stream")
    );
    assert_eq!(
        entry.metadata.association_uris("ne_Manager"),
        [absolute("Employees('1')/ne_Manager")]
    );
    Ok(())
}

// Written entry is read back, with and without the `d` wrapper.
#[test]
fn round_trip_test() -> Result<(), Error> {
    let model = scenario::model()?;
    let rooms = scenario::entity_set(&model, "Rooms")?;
    let room = data::room("2", "Room 2", 10, 3);
    for omit_wrapper in [false, true] {
        let props = write_properties()?.with_omit_json_wrapper(omit_wrapper);
        let response = JSON.write_entry(rooms, &room, &props).map_err(Error::Provider)?;
        assert_eq!(body_json(&response)?.get("d").is_some(), !omit_wrapper);
        let entry = JSON
            .read_entry(rooms, &response.body, &EntityProviderReadProperties::new())
            .map_err(Error::Provider)?;
        assert_eq!(entry.properties, room);
        assert_eq!(entry.metadata.uri.as_deref(), Some(absolute("Rooms('2')").as_str()));
        assert_eq!(entry.metadata.etag.as_deref(), Some(r#"W/"3""#));
        assert_eq!(entry.metadata.entity_type.as_deref(), Some("RefScenario.Room"));
    }
    Ok(())
}

// Bind operations add association links, to one and to many.
#[test]
fn bind_links_test() -> Result<(), Error> {
    let model = scenario::model()?;
    let rooms = scenario::entity_set(&model, "Rooms")?;
    let body = json!({
        "d": {
            "Id": "1",
            "nr_Building": {"__metadata": {"uri": absolute("Buildings('1')")}},
            "nr_Employees": [
                {"__metadata": {"uri": absolute("Employees('1')")}},
                {"__metadata": {"uri": absolute("Employees('2')")}},
            ],
        }
    })
    .to_string();
    let entry = JSON
        .read_entry(rooms, body.as_bytes(), &EntityProviderReadProperties::new())
        .map_err(Error::Provider)?;
    assert_eq!(
        entry.metadata.association_uris("nr_Building"),
        [absolute("Buildings('1')")]
    );
    assert_eq!(
        entry.metadata.association_uris("nr_Employees"),
        [absolute("Employees('1')"), absolute("Employees('2')")]
    );
    assert!(!entry.contains_inline_entry);
    assert!(!entry.properties.contains_key("nr_Building"));
    Ok(())
}

// Bind of a single entry to a to-many navigation property and inline
// feed for a to-one navigation property are rejected.
#[test]
fn multiplicity_mismatch_test() -> Result<(), Error> {
    let model = scenario::model()?;
    let rooms = scenario::entity_set(&model, "Rooms")?;
    let read_props = EntityProviderReadProperties::new();
    let documents = [
        json!({"Id": "1", "nr_Employees": {"__metadata": {"uri": absolute("Employees('1')")}}}),
        json!({"Id": "1", "nr_Building": [{"__metadata": {"uri": absolute("Buildings('1')")}}]}),
        json!({"Id": "1", "nr_Building": {"results": []}}),
    ];
    for document in documents {
        let err = JSON
            .read_entry(rooms, document.to_string().as_bytes(), &read_props)
            .unwrap_err();
        assert_eq!(err.key(), MessageKey::InvalidInlineContent);
    }
    Ok(())
}

// Inline null of a to-one navigation property is read as null value.
#[test]
fn inline_null_test() -> Result<(), Error> {
    let model = scenario::model()?;
    let rooms = scenario::entity_set(&model, "Rooms")?;
    let body = br#"{"d":{"Id":"1","Name":"Room 1","nr_Building":null}}"#;
    let entry = JSON
        .read_entry(rooms, body, &EntityProviderReadProperties::new())
        .map_err(Error::Provider)?;
    assert!(entry.contains_inline_entry);
    assert_eq!(entry.properties.get("nr_Building"), Some(&Value::Null));
    assert!(entry.expand_select_tree.expanded_link("nr_Building").is_some());
    assert!(entry.expand_select_tree.is_selected("Name"));
    Ok(())
}

// Duplicate members, unknown members and missing key.
#[test]
fn invalid_documents_test() -> Result<(), Error> {
    let model = scenario::model()?;
    let rooms = scenario::entity_set(&model, "Rooms")?;
    let read_props = EntityProviderReadProperties::new();

    let err = JSON
        .read_entry(rooms, br#"{"d":{"Id":"1","Name":"a","Name":"b"}}"#, &read_props)
        .unwrap_err();
    assert_eq!(err.key(), MessageKey::DoubleProperty);
    assert_eq!(err.content(), ["Name"]);

    let err = JSON
        .read_entry(rooms, br#"{"d":{"Id":"1","Floor":3}}"#, &read_props)
        .unwrap_err();
    assert_eq!(err.key(), MessageKey::InvalidProperty);

    let err = JSON
        .read_entry(rooms, br#"{"d":{"Name":"Room 1"}}"#, &read_props)
        .unwrap_err();
    assert_eq!(err.key(), MessageKey::MissingProperty);
    assert_eq!(err.content(), ["Id"]);

    let merge = EntityProviderReadProperties::new().with_merge_semantic(true);
    let entry = JSON
        .read_entry(rooms, br#"{"d":{"Name":"Room 1"}}"#, &merge)
        .map_err(Error::Provider)?;
    assert_eq!(entry.properties.len(), 1);

    let err = JSON
        .read_entry(rooms, br#"{"d":{"Id":"1"}}}"#, &read_props)
        .unwrap_err();
    assert_eq!(err.key(), MessageKey::ExceptionOccurred);
    Ok(())
}

// Unquoted numbers are accepted for quoted types and quoted numbers for
// unquoted ones.
#[test]
fn lenient_literals_test() -> Result<(), Error> {
    let model = scenario::model()?;
    let rooms = scenario::entity_set(&model, "Rooms")?;
    let body = br#"{"d":{"Id":"1","Seats":"12","Version":2}}"#;
    let entry = JSON
        .read_entry(rooms, body, &EntityProviderReadProperties::new())
        .map_err(Error::Provider)?;
    assert_eq!(entry.properties.get("Seats"), Some(&Value::from(12_i16)));
    assert_eq!(entry.properties.get("Version"), Some(&Value::from(2_i16)));
    Ok(())
}

// Explicit null is kept as null value, absent member stays absent.
#[test]
fn null_and_absent_test() -> Result<(), Error> {
    let model = scenario::model()?;
    let rooms = scenario::entity_set(&model, "Rooms")?;
    let read_props = EntityProviderReadProperties::new();
    let entry = JSON
        .read_entry(rooms, br#"{"d":{"Id":"99","Seats":null}}"#, &read_props)
        .map_err(Error::Provider)?;
    assert_eq!(entry.properties.get("Seats"), Some(&Value::Null));

    let entry = JSON
        .read_entry(rooms, br#"{"d":{"Id":"99"}}"#, &read_props)
        .map_err(Error::Provider)?;
    assert!(!entry.properties.contains_key("Seats"));
    assert!(!entry.expand_select_tree.is_selected("Seats"));
    Ok(())
}
