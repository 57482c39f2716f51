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

use odata_v2_codec::properties::InlineCountType;
use odata_v2_codec::provider::CONTENT_TYPE_TEXT;
use odata_v2_codec::ContentType;
use odata_v2_codec::EntityProvider;
use odata_v2_codec::EntityProviderReadProperties;
use odata_v2_edm::MessageKey;
use odata_v2_edm::Value;
use odata_v2_tests::absolute;
use odata_v2_tests::body_json;
use odata_v2_tests::body_text;
use odata_v2_tests::data;
use odata_v2_tests::scenario;
use odata_v2_tests::write_properties;
use odata_v2_tests::Error;
use serde_json::json;

const ATOM: EntityProvider = EntityProvider::new(ContentType::Atom);
const JSON: EntityProvider = EntityProvider::new(ContentType::Json);

// Single simple property document in both formats.
#[test]
fn simple_property_test() -> Result<(), Error> {
    let model = scenario::model()?;
    let rooms = scenario::entity_set(&model, "Rooms")?;
    let seats = Value::from(4_i16);
    let response = ATOM
        .write_property(rooms, "Seats", Some(&seats), &write_properties()?)
        .map_err(Error::Provider)?;
    assert_eq!(response.content_type, "application/xml");
    assert!(body_text(&response)?.ends_with(
        r#"<d:Seats xmlns:d="http://schemas.microsoft.com/ado/2007/08/dataservices" xmlns:m="http://schemas.microsoft.com/ado/2007/08/dataservices/metadata">4</d:Seats>"#
    ));
    let read = ATOM
        .read_property(rooms, "Seats", &response.body, &EntityProviderReadProperties::new())
        .map_err(Error::Provider)?;
    assert_eq!(read.get("Seats"), Some(&seats));

    let response = JSON
        .write_property(rooms, "Seats", Some(&seats), &write_properties()?)
        .map_err(Error::Provider)?;
    assert_eq!(response.content_type, "application/json");
    assert_eq!(body_json(&response)?, json!({"d": {"Seats": 4}}));
    let read = JSON
        .read_property(rooms, "Seats", &response.body, &EntityProviderReadProperties::new())
        .map_err(Error::Provider)?;
    assert_eq!(read.get("Seats"), Some(&seats));
    Ok(())
}

// Complex property keeps type names and is read back as complex value.
#[test]
fn complex_property_test() -> Result<(), Error> {
    let model = scenario::model()?;
    let employees = scenario::entity_set(&model, "Employees")?;
    let location = data::location("8001", "Zurich", "Switzerland");
    let response = JSON
        .write_property(employees, "Location", Some(&location), &write_properties()?)
        .map_err(Error::Provider)?;
    assert_eq!(
        body_json(&response)?,
        json!({"d": {"Location": {
            "__metadata": {"type": "RefScenario.c_Location"},
            "City": {
                "__metadata": {"type": "RefScenario.c_City"},
                "PostalCode": "8001",
                "CityName": "Zurich",
            },
            "Country": "Switzerland",
        }}})
    );
    let read = JSON
        .read_property(employees, "Location", &response.body, &EntityProviderReadProperties::new())
        .map_err(Error::Provider)?;
    assert_eq!(read.get("Location"), Some(&location));

    let response = ATOM
        .write_property(employees, "Location", Some(&location), &write_properties()?)
        .map_err(Error::Provider)?;
    assert!(body_text(&response)?.contains(r#"<d:City m:type="RefScenario.c_City"><d:PostalCode>8001</d:PostalCode>"#));
    let read = ATOM
        .read_property(employees, "Location", &response.body, &EntityProviderReadProperties::new())
        .map_err(Error::Provider)?;
    assert_eq!(read.get("Location"), Some(&location));
    Ok(())
}

// Unknown property and document holding another property.
#[test]
fn invalid_property_test() -> Result<(), Error> {
    let model = scenario::model()?;
    let rooms = scenario::entity_set(&model, "Rooms")?;
    let err = JSON
        .write_property(rooms, "Floor", None, &write_properties()?)
        .unwrap_err();
    assert_eq!(err.key(), MessageKey::InvalidProperty);
    assert_eq!(err.content(), ["Floor"]);

    let err = JSON
        .read_property(rooms, "Seats", br#"{"d":{"Name":"Room 1"}}"#, &EntityProviderReadProperties::new())
        .unwrap_err();
    assert_eq!(err.key(), MessageKey::InvalidProperty);
    Ok(())
}

// Collections returned by function imports: complex elements in Atom,
// simple values in JSON.
#[test]
fn collection_test() -> Result<(), Error> {
    let model = scenario::model()?;
    let all_locations = scenario::function_import(&model, "AllLocations")?;
    let locations = [data::location("69124", "Heidelberg", "Germany")];
    let response = ATOM
        .write_collection(&model, all_locations, &locations, &write_properties()?)
        .map_err(Error::Provider)?;
    let text = body_text(&response)?;
    assert!(text.contains(r#"<d:AllLocations xmlns:d="http://schemas.microsoft.com/ado/2007/08/dataservices""#));
    assert!(text.contains(
        r#"<d:element m:type="RefScenario.c_Location"><d:City m:type="RefScenario.c_City"><d:PostalCode>69124</d:PostalCode><d:CityName>Heidelberg</d:CityName></d:City><d:Country>Germany</d:Country></d:element></d:AllLocations>"#
    ));

    let room_ids = scenario::function_import(&model, "AllUsedRoomIds")?;
    let ids = [Value::from("1"), Value::from("2")];
    let response = JSON
        .write_collection(&model, room_ids, &ids, &write_properties()?)
        .map_err(Error::Provider)?;
    assert_eq!(body_json(&response)?, json!({"d": {"results": ["1", "2"]}}));
    Ok(())
}

// Function import with a single return value has no collection.
#[test]
fn collection_of_single_value_test() -> Result<(), Error> {
    let model = scenario::model()?;
    let maximal_age = scenario::function_import(&model, "MaximalAge")?;
    let err = JSON
        .write_collection(&model, maximal_age, &[Value::from(52_i16)], &write_properties()?)
        .unwrap_err();
    assert_eq!(err.key(), MessageKey::IllegalArgument);
    assert_eq!(err.content(), ["MaximalAge", "collection of simple or complex type expected"]);
    Ok(())
}

// Links of single and many entries are absolute and are read back.
#[test]
fn links_test() -> Result<(), Error> {
    let model = scenario::model()?;
    let rooms = scenario::entity_set(&model, "Rooms")?;
    let response = ATOM
        .write_link(rooms, &data::room("1", "Room 1", 4, 1), &write_properties()?)
        .map_err(Error::Provider)?;
    assert!(body_text(&response)?.ends_with(
        r#"<uri xmlns="http://schemas.microsoft.com/ado/2007/08/dataservices">http://localhost/odata/Rooms('1')</uri>"#
    ));
    assert_eq!(ATOM.read_link(&response.body).map_err(Error::Provider)?, absolute("Rooms('1')"));

    let data = [data::room("1", "Room 1", 4, 1), data::room("2", "Room 2", 6, 1)];
    let props = write_properties()?.with_inline_count(InlineCountType::AllPages, 2);
    let response = JSON.write_links(rooms, &data, &props).map_err(Error::Provider)?;
    assert_eq!(
        body_json(&response)?,
        json!({"d": {
            "__count": "2",
            "results": [{"uri": absolute("Rooms('1')")}, {"uri": absolute("Rooms('2')")}],
        }})
    );
    let links = JSON.read_links(&response.body).map_err(Error::Provider)?;
    assert_eq!(links.uris, [absolute("Rooms('1')"), absolute("Rooms('2')")]);
    assert_eq!(links.inline_count, Some(2));

    let response = ATOM.write_links(rooms, &data, &props).map_err(Error::Provider)?;
    let links = ATOM.read_links(&response.body).map_err(Error::Provider)?;
    assert_eq!(links.uris.len(), 2);
    assert_eq!(links.inline_count, Some(2));
    Ok(())
}

// Link of an entry with compound key.
#[test]
fn compound_key_link_test() -> Result<(), Error> {
    let model = scenario::model()?;
    let photos = scenario::entity_set(&model, "Photos")?;
    let response = JSON
        .write_link(photos, &data::photo(1, "image/png", "Logo"), &write_properties()?)
        .map_err(Error::Provider)?;
    assert_eq!(
        JSON.read_link(&response.body).map_err(Error::Provider)?,
        absolute("Photos(Id=1,Type='image%2Fpng')")
    );
    Ok(())
}

// Raw values: text literal, bytes as they are and empty body for null.
#[test]
fn raw_value_test() -> Result<(), Error> {
    let model = scenario::model()?;
    let props = write_properties()?;
    let rooms = scenario::entity_set(&model, "Rooms")?;
    let response = EntityProvider::write_value(rooms, "Seats", &Value::from(4_i16), &props)
        .map_err(Error::Provider)?;
    assert_eq!(response.content_type, CONTENT_TYPE_TEXT);
    assert_eq!(response.body, b"4");

    let response = EntityProvider::write_value(rooms, "Name", &Value::Null, &props)
        .map_err(Error::Provider)?;
    assert!(response.body.is_empty());

    let buildings = scenario::entity_set(&model, "Buildings")?;
    let image = vec![0x89, b'P', b'N', b'G', 0x00, 0xff];
    let response = EntityProvider::write_value(buildings, "Image", &Value::from(image.clone()), &props)
        .map_err(Error::Provider)?;
    assert_eq!(response.body, image);

    let employees = scenario::entity_set(&model, "Employees")?;
    let location = data::location("69124", "Heidelberg", "Germany");
    let err = EntityProvider::write_value(employees, "Location", &location, &props).unwrap_err();
    assert_eq!(err.key(), MessageKey::IllegalArgument);
    Ok(())
}
