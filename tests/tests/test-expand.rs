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

use odata_v2_codec::CodecConfig;
use odata_v2_codec::ContentType;
use odata_v2_codec::EntityProvider;
use odata_v2_codec::EntityProviderReadProperties;
use odata_v2_codec::ExpandSelectTree;
use odata_v2_codec::InlineData;
use odata_v2_edm::MessageKey;
use odata_v2_edm::Value;
use odata_v2_tests::body_json;
use odata_v2_tests::body_text;
use odata_v2_tests::callbacks::Deleted;
use odata_v2_tests::callbacks::FixedInline;
use odata_v2_tests::callbacks::ForeignKeyInline;
use odata_v2_tests::data;
use odata_v2_tests::scenario;
use odata_v2_tests::write_properties;
use odata_v2_tests::Error;

const ATOM: EntityProvider = EntityProvider::new(ContentType::Atom);
const JSON: EntityProvider = EntityProvider::new(ContentType::Json);

fn expand(paths: &[&str]) -> Result<ExpandSelectTree, Error> {
    ExpandSelectTree::from_paths(&[], paths).map_err(Error::Provider)
}

// Related entry is written inline inside the navigation link and read
// back as entity value.
#[test]
fn atom_inline_entry_test() -> Result<(), Error> {
    let model = scenario::model()?;
    let rooms = scenario::entity_set(&model, "Rooms")?;
    let building = data::building("1", "Building 1");
    let props = write_properties()?
        .with_expand_select_tree(expand(&["nr_Building"])?)
        .with_callback(
            "nr_Building",
            FixedInline::shared(InlineData::Entry(Some(building.clone()))),
        );
    let room = data::room("1", "Room 1", 4, 1);
    let response = ATOM.write_entry(rooms, &room, &props).map_err(Error::Provider)?;
    let text = body_text(&response)?;
    assert!(text.contains(
        r#"title="nr_Building" type="application/atom+xml;type=entry"><m:inline><entry"#
    ));
    assert!(text.contains("<id>http://localhost/odata/Buildings('1')</id>"));
    assert!(text.contains("</entry></m:inline></link>"));

    let entry = ATOM
        .read_entry(rooms, &response.body, &EntityProviderReadProperties::new())
        .map_err(Error::Provider)?;
    assert!(entry.contains_inline_entry);
    let Some(Value::Entity(read)) = entry.properties.get("nr_Building") else {
        panic!("inline entry expected");
    };
    assert_eq!(read.get("Name"), building.get("Name"));
    assert_eq!(read.get("Image"), Some(&Value::Null));
    assert!(entry.expand_select_tree.expanded_link("nr_Building").is_some());
    assert_eq!(
        entry.metadata.association_uris("nr_Building"),
        ["Rooms('1')/nr_Building"]
    );
    Ok(())
}

// No related entry: empty inline element, or plain link when inline
// content for null data is omitted.
#[test]
fn atom_empty_inline_test() -> Result<(), Error> {
    let model = scenario::model()?;
    let rooms = scenario::entity_set(&model, "Rooms")?;
    let room = data::room("1", "Room 1", 4, 1);
    let props = write_properties()?
        .with_expand_select_tree(expand(&["nr_Building"])?)
        .with_callback("nr_Building", FixedInline::shared(InlineData::Entry(None)));
    let response = ATOM.write_entry(rooms, &room, &props).map_err(Error::Provider)?;
    assert!(body_text(&response)?.contains(
        r#"title="nr_Building" type="application/atom+xml;type=entry"><m:inline/></link>"#
    ));
    let entry = ATOM
        .read_entry(rooms, &response.body, &EntityProviderReadProperties::new())
        .map_err(Error::Provider)?;
    assert!(entry.contains_inline_entry);
    assert_eq!(entry.properties.get("nr_Building"), Some(&Value::Null));

    let response = ATOM
        .write_entry(rooms, &room, &props.with_omit_inline_for_null_data(true))
        .map_err(Error::Provider)?;
    let text = body_text(&response)?;
    assert!(!text.contains("m:inline"));
    assert!(text.contains(r#"title="nr_Building" type="application/atom+xml;type=entry"/>"#));
    Ok(())
}

// Related entries are found per written entry; the callback sees the
// self link of each one.
#[test]
fn atom_inline_feed_test() -> Result<(), Error> {
    let model = scenario::model()?;
    let rooms = scenario::entity_set(&model, "Rooms")?;
    let employees = vec![
        data::employee("1", "Walter Winter", "1"),
        data::employee("2", "Frederic Fall", "2"),
        data::employee("3", "Jonathan Smith", "1"),
    ];
    let callback = ForeignKeyInline::new(employees.clone(), "Id", "RoomId");
    let props = write_properties()?
        .with_expand_select_tree(expand(&["nr_Employees"])?)
        .with_callback("nr_Employees", callback.clone());
    let data = [data::room("1", "Room 1", 4, 1), data::room("2", "Room 2", 6, 1)];
    let response = ATOM.write_feed(rooms, &data, &props).map_err(Error::Provider)?;
    let text = body_text(&response)?;
    assert!(text.contains("<id>http://localhost/odata/Rooms('1')/nr_Employees</id>"));
    assert_eq!(text.matches("<title type=\"text\">Walter Winter</title>").count(), 1);
    let self_links = callback.self_links.lock().map(|links| links.clone()).unwrap_or_default();
    assert_eq!(self_links, ["Rooms('1')", "Rooms('2')"]);

    let feed = ATOM
        .read_feed(rooms, &response.body, &EntityProviderReadProperties::new())
        .map_err(Error::Provider)?;
    assert_eq!(feed.entries.len(), 2);
    assert_eq!(
        feed.entries[0].properties.get("nr_Employees"),
        Some(&Value::Feed(vec![employees[0].clone(), employees[2].clone()]))
    );
    assert_eq!(
        feed.entries[1].properties.get("nr_Employees"),
        Some(&Value::Feed(vec![employees[1].clone()]))
    );
    Ok(())
}

// Inline feed written with its own properties declares the tombstone
// namespace for its deleted entries.
#[test]
fn atom_inline_delta_feed_test() -> Result<(), Error> {
    let model = scenario::model()?;
    let rooms = scenario::entity_set(&model, "Rooms")?;
    let employee = data::employee("1", "Walter Winter", "1");
    let nested = write_properties()?.with_tombstone_callback(Deleted::shared(
        vec![data::employee("9", "Peter Burke", "1")],
        "Rooms('1')/nr_Employees?!deltatoken=1",
    ));
    let props = write_properties()?
        .with_expand_select_tree(expand(&["nr_Employees"])?)
        .with_callback(
            "nr_Employees",
            FixedInline::with_properties(InlineData::Feed(vec![employee.clone()]), nested),
        );
    let room = data::room("1", "Room 1", 4, 1);
    let response = ATOM.write_entry(rooms, &room, &props).map_err(Error::Provider)?;
    let text = body_text(&response)?;
    assert!(text.contains(r#"<m:inline><feed xmlns:at="http://purl.org/atompub/tombstones/1.0">"#));
    assert!(text.contains(r#"<at:deleted-entry ref="http://localhost/odata/Employees('9')""#));
    assert!(text.contains(r#"<link href="Rooms('1')/nr_Employees?!deltatoken=1" rel="delta"/>"#));

    let entry = ATOM
        .read_entry(rooms, &response.body, &EntityProviderReadProperties::new())
        .map_err(Error::Provider)?;
    assert_eq!(entry.properties.get("nr_Employees"), Some(&Value::Feed(vec![employee])));
    Ok(())
}

// JSON inline feed and inline entry two levels deep.
#[test]
fn json_nested_expand_test() -> Result<(), Error> {
    let model = scenario::model()?;
    let rooms = scenario::entity_set(&model, "Rooms")?;
    let employees = vec![data::employee("1", "Walter Winter", "1")];
    let team = data::team("1", "Team 1", true);
    let props = write_properties()?
        .with_expand_select_tree(expand(&["nr_Employees/ne_Team"])?)
        .with_callback("nr_Employees", ForeignKeyInline::new(employees.clone(), "Id", "RoomId"))
        .with_callback("ne_Team", FixedInline::shared(InlineData::Entry(Some(team.clone()))));
    let room = data::room("1", "Room 1", 4, 1);
    let response = JSON.write_entry(rooms, &room, &props).map_err(Error::Provider)?;
    let body = body_json(&response)?;
    let employee = &body["d"]["nr_Employees"]["results"][0];
    assert_eq!(employee["EmployeeName"], "Walter Winter");
    assert_eq!(employee["ne_Team"]["Name"], "Team 1");
    assert!(employee["ne_Manager"]["__deferred"].is_object());
    assert!(body["d"]["nr_Building"]["__deferred"].is_object());

    let entry = JSON
        .read_entry(rooms, &response.body, &EntityProviderReadProperties::new())
        .map_err(Error::Provider)?;
    assert!(entry.contains_inline_entry);
    let Some(Value::Feed(read)) = entry.properties.get("nr_Employees") else {
        panic!("inline feed expected");
    };
    assert_eq!(read.len(), 1);
    assert_eq!(read[0].get("ne_Team"), Some(&Value::Entity(team)));
    assert_eq!(read[0].get("EmployeeName"), employees[0].get("EmployeeName"));
    let tree = entry
        .expand_select_tree
        .expanded_link("nr_Employees")
        .and_then(|tree| tree.expanded_link("ne_Team"));
    assert!(tree.is_some());
    Ok(())
}

// Expanded navigation property needs a callback.
#[test]
fn expand_without_callback_test() -> Result<(), Error> {
    let model = scenario::model()?;
    let rooms = scenario::entity_set(&model, "Rooms")?;
    let props = write_properties()?.with_expand_select_tree(expand(&["nr_Employees"])?);
    let room = data::room("1", "Room 1", 4, 1);
    for provider in [ATOM, JSON] {
        let err = provider.write_entry(rooms, &room, &props).unwrap_err();
        assert_eq!(err.key(), MessageKey::ExpandNotSupported);
        assert_eq!(err.content(), ["nr_Employees"]);
    }
    Ok(())
}

// Callback data must fit the navigation multiplicity.
#[test]
fn inline_multiplicity_test() -> Result<(), Error> {
    let model = scenario::model()?;
    let rooms = scenario::entity_set(&model, "Rooms")?;
    let props = write_properties()?
        .with_expand_select_tree(expand(&["nr_Building"])?)
        .with_callback("nr_Building", FixedInline::shared(InlineData::Feed(Vec::new())));
    let err = ATOM
        .write_entry(rooms, &data::room("1", "Room 1", 4, 1), &props)
        .unwrap_err();
    assert_eq!(err.key(), MessageKey::InvalidInlineContent);

    let feed_for_entry = br#"<entry xmlns="http://www.w3.org/2005/Atom" xmlns:m="http://schemas.microsoft.com/ado/2007/08/dataservices/metadata" xmlns:d="http://schemas.microsoft.com/ado/2007/08/dataservices"><link href="Rooms('1')/nr_Building" rel="http://schemas.microsoft.com/ado/2007/08/dataservices/related/nr_Building"><m:inline><feed/></m:inline></link><content type="application/xml"><m:properties><d:Id>1</d:Id></m:properties></content></entry>"#;
    let err = ATOM
        .read_entry(rooms, feed_for_entry, &EntityProviderReadProperties::new())
        .unwrap_err();
    assert_eq!(err.key(), MessageKey::InvalidInlineContent);
    assert_eq!(err.content(), ["nr_Building"]);
    Ok(())
}

// Expansion deeper than the configured limit is rejected.
#[test]
fn expand_depth_test() -> Result<(), Error> {
    let model = scenario::model()?;
    let rooms = scenario::entity_set(&model, "Rooms")?;
    let props = write_properties()?
        .with_config(CodecConfig::default().with_max_expand_depth(1))
        .with_expand_select_tree(expand(&["nr_Employees/ne_Team"])?)
        .with_callback(
            "nr_Employees",
            FixedInline::shared(InlineData::Feed(vec![data::employee("1", "Walter Winter", "1")])),
        )
        .with_callback("ne_Team", FixedInline::shared(InlineData::Entry(None)));
    let err = JSON
        .write_entry(rooms, &data::room("1", "Room 1", 4, 1), &props)
        .unwrap_err();
    assert_eq!(err.key(), MessageKey::IllegalArgument);
    Ok(())
}
