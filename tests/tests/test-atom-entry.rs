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
use odata_v2_codec::ExpandSelectTree;
use odata_v2_edm::provider::CustomizableFeedMappings;
use odata_v2_edm::provider::PropertyDef;
use odata_v2_edm::EdmModel;
use odata_v2_edm::EdmSimpleTypeKind;
use odata_v2_edm::MessageKey;
use odata_v2_edm::Value;
use odata_v2_tests::absolute;
use odata_v2_tests::body_text;
use odata_v2_tests::data;
use odata_v2_tests::scenario;
use odata_v2_tests::write_properties;
use odata_v2_tests::Error;

const ATOM: EntityProvider = EntityProvider::new(ContentType::Atom);

const ENTRY_START: &str = r#"<entry xmlns="http://www.w3.org/2005/Atom" xmlns:m="http://schemas.microsoft.com/ado/2007/08/dataservices/metadata" xmlns:d="http://schemas.microsoft.com/ado/2007/08/dataservices">"#;

// Check entry layout: id, edit link, navigation links, category and
// properties in content, plus the entity tag of a concurrency property.
#[test]
fn room_entry_test() -> Result<(), Error> {
    let model = scenario::model()?;
    let rooms = scenario::entity_set(&model, "Rooms")?;
    let room = data::room("1", "Room 1", 4, 1);
    let response = ATOM
        .write_entry(rooms, &room, &write_properties()?)
        .map_err(Error::Provider)?;
    assert_eq!(response.content_type, "application/atom+xml;type=entry");
    assert_eq!(response.location.as_deref(), Some(absolute("Rooms('1')").as_str()));
    assert_eq!(
        response.etag.as_ref().map(ToString::to_string).as_deref(),
        Some(r#"W/"1""#)
    );

    let text = body_text(&response)?;
    assert!(text.starts_with(r#"<?xml version="1.0" encoding="utf-8"?>"#));
    assert!(text.contains(r#"xml:base="http://localhost/odata/""#));
    assert!(text.contains(r#"m:etag="W/&quot;1&quot;""#));
    assert!(text.contains("<id>http://localhost/odata/Rooms('1')</id>"));
    assert!(text.contains(r#"<link href="Rooms('1')" rel="edit" title="Room"/>"#));
    assert!(text.contains(
        r#"<link href="Rooms('1')/nr_Employees" rel="http://schemas.microsoft.com/ado/2007/08/dataservices/related/nr_Employees" title="nr_Employees" type="application/atom+xml;type=feed"/>"#
    ));
    assert!(text.contains(
        r#"<link href="Rooms('1')/nr_Building" rel="http://schemas.microsoft.com/ado/2007/08/dataservices/related/nr_Building" title="nr_Building" type="application/atom+xml;type=entry"/>"#
    ));
    assert!(text.contains(
        r#"<category term="RefScenario.Room" scheme="http://schemas.microsoft.com/ado/2007/08/dataservices/scheme"/>"#
    ));
    assert!(text.contains(
        r#"<content type="application/xml"><m:properties><d:Id>1</d:Id><d:Name>Room 1</d:Name><d:Seats>4</d:Seats><d:Version>1</d:Version></m:properties></content>"#
    ));
    Ok(())
}

// Written entry is read back with properties, metadata and association
// links of deferred navigation properties.
#[test]
fn room_round_trip_test() -> Result<(), Error> {
    let model = scenario::model()?;
    let rooms = scenario::entity_set(&model, "Rooms")?;
    let room = data::room("1", "Room 1", 4, 1);
    let response = ATOM
        .write_entry(rooms, &room, &write_properties()?)
        .map_err(Error::Provider)?;
    let entry = ATOM
        .read_entry(rooms, &response.body, &EntityProviderReadProperties::new())
        .map_err(Error::Provider)?;
    assert_eq!(entry.properties, room);
    assert_eq!(entry.metadata.id.as_deref(), Some(absolute("Rooms('1')").as_str()));
    assert_eq!(entry.metadata.uri.as_deref(), Some("Rooms('1')"));
    assert_eq!(entry.metadata.etag.as_deref(), Some(r#"W/"1""#));
    assert_eq!(entry.metadata.entity_type.as_deref(), Some("RefScenario.Room"));
    assert_eq!(
        entry.metadata.association_uris("nr_Employees"),
        ["Rooms('1')/nr_Employees"]
    );
    assert!(!entry.contains_inline_entry);
    Ok(())
}

// Entity type without concurrency property has no entity tag.
#[test]
fn entry_without_etag_test() -> Result<(), Error> {
    let model = scenario::model()?;
    let teams = scenario::entity_set(&model, "Teams")?;
    let response = ATOM
        .write_entry(teams, &data::team("1", "Team 1", false), &write_properties()?)
        .map_err(Error::Provider)?;
    assert_eq!(response.etag, None);
    let text = body_text(&response)?;
    assert!(!text.contains("m:etag"));
    assert!(text.contains("<d:isScrumTeam>false</d:isScrumTeam>"));
    Ok(())
}

// Media link entry: empty content with source, properties next to it
// and the property mapped to the title kept out of them.
#[test]
fn media_link_entry_test() -> Result<(), Error> {
    let model = scenario::model()?;
    let employees = scenario::entity_set(&model, "Employees")?;
    let employee = data::employee("1", "Walter Winter", "1");
    let response = ATOM
        .write_entry(employees, &employee, &write_properties()?)
        .map_err(Error::Provider)?;
    let text = body_text(&response)?;
    assert!(text.contains(r#"<title type="text">Walter Winter</title>"#));
    assert!(text.contains(
        r#"<link href="Employees('1')/$value" rel="edit-media" type="application/octet-stream"/>"#
    ));
    assert!(text.contains(r#"<content type="application/octet-stream" src="Employees('1')/$value"/><m:properties>"#));
    assert!(!text.contains("<d:EmployeeName>"));
    assert!(text.contains(
        r#"<d:Location m:type="RefScenario.c_Location"><d:City m:type="RefScenario.c_City"><d:PostalCode>69124</d:PostalCode><d:CityName>Heidelberg</d:CityName></d:City><d:Country>Germany</d:Country></d:Location>"#
    ));
    assert!(text.contains("<d:EntryDate>1999-01-01T00:00:00</d:EntryDate>"));

    let entry = ATOM
        .read_entry(employees, &response.body, &EntityProviderReadProperties::new())
        .map_err(Error::Provider)?;
    assert_eq!(entry.properties, employee);
    assert_eq!(entry.media_metadata.source_link.as_deref(), Some("Employees('1')/$value"));
    assert_eq!(entry.media_metadata.edit_link.as_deref(), Some("Employees('1')/$value"));
    assert_eq!(
        entry.media_metadata.content_type.as_deref(),
        Some("application/octet-stream")
    );
    Ok(())
}

// Compound key is written with names and percent-encoded values.
#[test]
fn compound_key_test() -> Result<(), Error> {
    let model = scenario::model()?;
    let photos = scenario::entity_set(&model, "Photos")?;
    let response = ATOM
        .write_entry(photos, &data::photo(1, "image/png", "Logo"), &write_properties()?)
        .map_err(Error::Provider)?;
    assert_eq!(
        response.location.as_deref(),
        Some(absolute("Photos(Id=1,Type='image%2Fpng')").as_str())
    );
    let text = body_text(&response)?;
    assert!(text.contains(r#"<link href="Photos(Id=1,Type='image%2Fpng')" rel="edit" title="Photo"/>"#));
    Ok(())
}

// Explicit null and absent properties: both are written as null unless
// serialization is data based, then absent ones are left out.
#[test]
fn null_and_absent_properties_test() -> Result<(), Error> {
    let model = scenario::model()?;
    let rooms = scenario::entity_set(&model, "Rooms")?;
    let mut room = data::room("1", "Room 1", 4, 1);
    room.insert("Name".into(), Value::Null);
    room.remove("Seats");

    let response = ATOM
        .write_entry(rooms, &room, &write_properties()?)
        .map_err(Error::Provider)?;
    let text = body_text(&response)?;
    assert!(text.contains(r#"<d:Name m:null="true"/>"#));
    assert!(text.contains(r#"<d:Seats m:null="true"/>"#));

    let properties = write_properties()?.with_data_based_property_serialization(true);
    let response = ATOM
        .write_entry(rooms, &room, &properties)
        .map_err(Error::Provider)?;
    let text = body_text(&response)?;
    assert!(text.contains(r#"<d:Name m:null="true"/>"#));
    assert!(!text.contains("d:Seats"));

    let entry = ATOM
        .read_entry(rooms, &response.body, &EntityProviderReadProperties::new())
        .map_err(Error::Provider)?;
    assert_eq!(entry.properties.get("Name"), Some(&Value::Null));
    assert_eq!(entry.properties.get("Seats"), None);
    Ok(())
}

// Selected properties only; navigation links stay for selected
// navigation properties.
#[test]
fn select_test() -> Result<(), Error> {
    let model = scenario::model()?;
    let rooms = scenario::entity_set(&model, "Rooms")?;
    let tree = ExpandSelectTree::from_paths(&["Name", "nr_Building"], &[]).map_err(Error::Provider)?;
    let properties = write_properties()?.with_expand_select_tree(tree);
    let response = ATOM
        .write_entry(rooms, &data::room("1", "Room 1", 4, 1), &properties)
        .map_err(Error::Provider)?;
    let text = body_text(&response)?;
    assert!(text.contains("<m:properties><d:Name>Room 1</d:Name></m:properties>"));
    assert!(text.contains("title=\"nr_Building\""));
    assert!(!text.contains("title=\"nr_Employees\""));
    Ok(())
}

// Writing without key value fails, whether the key is absent or null.
#[test]
fn missing_key_test() -> Result<(), Error> {
    let model = scenario::model()?;
    let rooms = scenario::entity_set(&model, "Rooms")?;
    let mut room = data::room("1", "Room 1", 4, 1);
    room.remove("Id");
    let err = ATOM
        .write_entry(rooms, &room, &write_properties()?)
        .unwrap_err();
    assert_eq!(err.key(), MessageKey::MissingProperty);
    assert_eq!(err.content(), ["Id"]);

    room.insert("Id".into(), Value::Null);
    let err = ATOM
        .write_entry(rooms, &room, &write_properties()?)
        .unwrap_err();
    assert_eq!(err.key(), MessageKey::MissingProperty);
    Ok(())
}

// Same property twice in content is rejected. The same local name in
// another namespace, or below an unknown element, is not a property.
#[test]
fn double_property_test() -> Result<(), Error> {
    let model = scenario::model()?;
    let rooms = scenario::entity_set(&model, "Rooms")?;
    let read = EntityProviderReadProperties::new();
    let xml = format!(
        r#"{ENTRY_START}<content type="application/xml"><m:properties><d:Id>1</d:Id><d:Seats>1</d:Seats><d:Seats>2</d:Seats></m:properties></content></entry>"#
    );
    let err = ATOM.read_entry(rooms, xml.as_bytes(), &read).unwrap_err();
    assert_eq!(err.key(), MessageKey::DoubleProperty);

    for other in [
        r#"<x:Seats xmlns:x="http://localhost/other">2</x:Seats>"#,
        r#"<x:Extra xmlns:x="http://localhost/other"><d:Seats>2</d:Seats></x:Extra>"#,
    ] {
        let xml = format!(
            r#"{ENTRY_START}<content type="application/xml"><m:properties><d:Id>1</d:Id><d:Seats>1</d:Seats>{other}</m:properties></content>{other}</entry>"#
        );
        let entry = ATOM
            .read_entry(rooms, xml.as_bytes(), &read)
            .map_err(Error::Provider)?;
        assert_eq!(entry.properties.get("Seats"), Some(&Value::from(1_i16)));
    }
    Ok(())
}

// Property mapped to a custom namespace is written outside the
// properties block and read back from there.
#[test]
fn custom_feed_mapping_test() -> Result<(), Error> {
    let model = scenario::model()?;
    let photos = scenario::entity_set(&model, "Photos")?;
    let mut photo = data::photo(1, "image/png", "Logo");
    photo.insert("Content".into(), Value::from("Sunset & sea"));
    let response = ATOM
        .write_entry(photos, &photo, &write_properties()?)
        .map_err(Error::Provider)?;
    let text = body_text(&response)?;
    assert!(text.contains(&format!(
        r#"<ph:Photo xmlns:ph="{}"><ph:Content>Sunset &amp; sea</ph:Content></ph:Photo>"#,
        scenario::PHOTO_NAMESPACE
    )));
    assert!(!text.contains("d:Content"));

    let read = EntityProviderReadProperties::new();
    let entry = ATOM
        .read_entry(photos, &response.body, &read)
        .map_err(Error::Provider)?;
    assert_eq!(entry.properties, photo);

    // Element of the same path in another namespace is not the property.
    let other = body_text(&response)?.replace(scenario::PHOTO_NAMESPACE, "http://localhost/other");
    let entry = ATOM
        .read_entry(photos, other.as_bytes(), &read)
        .map_err(Error::Provider)?;
    assert_eq!(entry.properties.get("Content"), None);
    assert_eq!(entry.properties.get("Name"), photo.get("Name"));
    Ok(())
}

// Custom feed mapping needs both namespace prefix and URI.
#[test]
fn custom_feed_mapping_without_namespace_test() -> Result<(), Error> {
    let mut schemas = scenario::provider_schemas();
    let building = schemas[0]
        .entity_types
        .iter_mut()
        .find(|t| t.name == "Building")
        .ok_or(Error::ExpectedEntitySet("Buildings"))?;
    building.properties.push(
        PropertyDef::simple("Street", EdmSimpleTypeKind::String)
            .with_feed_mappings(CustomizableFeedMappings::target("Address/Street")),
    );
    let model = EdmModel::from_provider(&schemas).map_err(Error::Provider)?;
    let buildings = scenario::entity_set(&model, "Buildings")?;
    let err = ATOM
        .write_entry(buildings, &data::building("1", "Building 1"), &write_properties()?)
        .unwrap_err();
    assert_eq!(err.key(), MessageKey::InvalidNamespace);
    assert_eq!(err.content(), ["Street"]);
    Ok(())
}

// Unknown property, properties outside content of a non-media entry and
// missing non-nullable key property.
#[test]
fn invalid_documents_test() -> Result<(), Error> {
    let model = scenario::model()?;
    let rooms = scenario::entity_set(&model, "Rooms")?;
    let read = EntityProviderReadProperties::new();

    let xml = format!(
        r#"{ENTRY_START}<content type="application/xml"><m:properties><d:Id>1</d:Id><d:Color>red</d:Color></m:properties></content></entry>"#
    );
    let err = ATOM.read_entry(rooms, xml.as_bytes(), &read).unwrap_err();
    assert_eq!(err.key(), MessageKey::InvalidProperty);

    let xml = format!(r#"{ENTRY_START}<m:properties><d:Id>1</d:Id></m:properties></entry>"#);
    let err = ATOM.read_entry(rooms, xml.as_bytes(), &read).unwrap_err();
    assert_eq!(err.key(), MessageKey::InvalidParentTag);

    let xml = format!(
        r#"{ENTRY_START}<content type="application/xml"><m:properties><d:Name>x</d:Name></m:properties></content></entry>"#
    );
    let err = ATOM.read_entry(rooms, xml.as_bytes(), &read).unwrap_err();
    assert_eq!(err.key(), MessageKey::MissingProperty);
    assert_eq!(err.content(), ["Id"]);

    let merge = EntityProviderReadProperties::new().with_merge_semantic(true);
    let entry = ATOM
        .read_entry(rooms, xml.as_bytes(), &merge)
        .map_err(Error::Provider)?;
    assert_eq!(entry.properties.get("Name").and_then(Value::as_str), Some("x"));
    Ok(())
}

// Property text may be split by CDATA sections, comments and entity
// references; `m:null="1"` is null.
#[test]
fn character_data_test() -> Result<(), Error> {
    let model = scenario::model()?;
    let rooms = scenario::entity_set(&model, "Rooms")?;
    let read = EntityProviderReadProperties::new();
    for (name, expected) in [
        ("<![CDATA[a<b]]>", "a<b"),
        ("a<!--x-->b", "ab"),
        ("Room &amp; <![CDATA[&]]>&#33;", "Room & &!"),
    ] {
        let xml = format!(
            r#"{ENTRY_START}<content type="application/xml"><m:properties><d:Id>1</d:Id><d:Name>{name}</d:Name><d:Seats m:null="1"/></m:properties></content></entry>"#
        );
        let entry = ATOM
            .read_entry(rooms, xml.as_bytes(), &read)
            .map_err(Error::Provider)?;
        assert_eq!(entry.properties.get("Name").and_then(Value::as_str), Some(expected));
        assert_eq!(entry.properties.get("Seats"), Some(&Value::Null));
    }

    let xml = format!(
        r#"{ENTRY_START}<content type="application/xml"><m:properties><d:Id>1</d:Id><d:Name>a<d:Seats>1</d:Seats></d:Name></m:properties></content></entry>"#
    );
    let err = ATOM.read_entry(rooms, xml.as_bytes(), &read).unwrap_err();
    assert_eq!(err.key(), MessageKey::InvalidProperty);
    Ok(())
}

// Only UTF-8 documents are accepted.
#[test]
fn encoding_test() -> Result<(), Error> {
    let model = scenario::model()?;
    let rooms = scenario::entity_set(&model, "Rooms")?;
    let xml = format!(
        r#"<?xml version="1.0" encoding="ISO-8859-1"?>{ENTRY_START}<content type="application/xml"><m:properties><d:Id>1</d:Id></m:properties></content></entry>"#
    );
    let err = ATOM
        .read_entry(rooms, xml.as_bytes(), &EntityProviderReadProperties::new())
        .unwrap_err();
    assert_eq!(err.key(), MessageKey::UnsupportedCharacterEncoding);
    Ok(())
}

// Inherited properties, navigation properties and media resource of a
// derived type.
#[test]
fn derived_type_entry_test() -> Result<(), Error> {
    let model = scenario::model()?;
    let managers = scenario::entity_set(&model, "Managers")?;
    let manager = data::employee("1", "Walter Winter", "1");
    let response = ATOM
        .write_entry(managers, &manager, &write_properties()?)
        .map_err(Error::Provider)?;
    let text = body_text(&response)?;
    assert!(text.contains(r#"term="RefScenario.Manager""#));
    assert!(text.contains(r#"src="Managers('1')/$value"/><m:properties>"#));
    for navigation in ["ne_Manager", "ne_Team", "ne_Room", "nm_Employees"] {
        assert!(text.contains(&format!(r#"title="{navigation}""#)));
    }
    let entry = ATOM
        .read_entry(managers, &response.body, &EntityProviderReadProperties::new())
        .map_err(Error::Provider)?;
    assert_eq!(entry.properties, manager);
    assert_eq!(entry.media_metadata.source_link.as_deref(), Some("Managers('1')/$value"));
    Ok(())
}
