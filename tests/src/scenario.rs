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

use crate::Error;
use odata_v2_codec::EntityProvider;
use odata_v2_edm::model::FunctionImport;
use odata_v2_edm::provider::AssociationDef;
use odata_v2_edm::provider::AssociationEndDef;
use odata_v2_edm::provider::AssociationSetDef;
use odata_v2_edm::provider::AssociationSetEndDef;
use odata_v2_edm::provider::EntityContainerDef;
use odata_v2_edm::provider::EntitySetDef;
use odata_v2_edm::provider::EntityTypeDef;
use odata_v2_edm::provider::FullQualifiedName;
use odata_v2_edm::provider::Mapping;
use odata_v2_edm::provider::Multiplicity;
use odata_v2_edm::provider::NavigationPropertyDef;
use odata_v2_edm::provider::PropertyDef;
use odata_v2_edm::provider::Schema;
use odata_v2_edm::simple_type::ConcurrencyMode;
use odata_v2_edm::simple_type::Facets;
use odata_v2_edm::EdmModel;
use odata_v2_edm::EdmSimpleTypeKind;
use odata_v2_edm::EntitySetRef;

pub const NAMESPACE: &str = "RefScenario";

/// Namespace of the custom feed mapping of `Photo.Content`.
pub const PHOTO_NAMESPACE: &str = "http://localhost/photo";

/// `$metadata` of the reference scenario. `Manager` is declared before
/// its base type on purpose. `Photo.Content` is mapped to an element of a
/// custom namespace only.
pub const METADATA: &str = r#"<?xml version="1.0" encoding="utf-8" standalone="yes"?>
<edmx:Edmx Version="1.0" xmlns:edmx="http://schemas.microsoft.com/ado/2007/06/edmx">
  <edmx:DataServices m:DataServiceVersion="2.0" xmlns:m="http://schemas.microsoft.com/ado/2007/08/dataservices/metadata">
    <Schema Namespace="RefScenario" Alias="RS" xmlns="http://schemas.microsoft.com/ado/2008/09/edm">
      <EntityType Name="Manager" BaseType="RS.Employee">
        <NavigationProperty Name="nm_Employees" Relationship="RS.ManagerEmployees" FromRole="r_Manager" ToRole="r_Employees"/>
      </EntityType>
      <EntityType Name="Employee" m:HasStream="true">
        <Key><PropertyRef Name="EmployeeId"/></Key>
        <Property Name="EmployeeId" Type="Edm.String" Nullable="false"/>
        <Property Name="EmployeeName" Type="Edm.String" m:FC_TargetPath="SyndicationTitle" m:FC_KeepInContent="false"/>
        <Property Name="ManagerId" Type="Edm.String"/>
        <Property Name="RoomId" Type="Edm.String"/>
        <Property Name="TeamId" Type="Edm.String" MaxLength="2"/>
        <Property Name="Location" Type="RS.c_Location"/>
        <Property Name="Age" Type="Edm.Int16"/>
        <Property Name="EntryDate" Type="Edm.DateTime" Nullable="true"/>
        <NavigationProperty Name="ne_Manager" Relationship="RS.ManagerEmployees" FromRole="r_Employees" ToRole="r_Manager"/>
        <NavigationProperty Name="ne_Team" Relationship="RS.TeamEmployees" FromRole="r_Employees" ToRole="r_Team"/>
        <NavigationProperty Name="ne_Room" Relationship="RS.RoomEmployees" FromRole="r_Employees" ToRole="r_Room"/>
      </EntityType>
      <EntityType Name="Team">
        <Key><PropertyRef Name="Id"/></Key>
        <Property Name="Id" Type="Edm.String" Nullable="false"/>
        <Property Name="Name" Type="Edm.String"/>
        <Property Name="isScrumTeam" Type="Edm.Boolean"/>
        <NavigationProperty Name="nt_Employees" Relationship="RS.TeamEmployees" FromRole="r_Team" ToRole="r_Employees"/>
      </EntityType>
      <EntityType Name="Room">
        <Key><PropertyRef Name="Id"/></Key>
        <Property Name="Id" Type="Edm.String" Nullable="false"/>
        <Property Name="Name" Type="Edm.String"/>
        <Property Name="Seats" Type="Edm.Int16"/>
        <Property Name="Version" Type="Edm.Int16" ConcurrencyMode="Fixed"/>
        <NavigationProperty Name="nr_Employees" Relationship="RS.RoomEmployees" FromRole="r_Room" ToRole="r_Employees"/>
        <NavigationProperty Name="nr_Building" Relationship="RS.BuildingRooms" FromRole="r_Rooms" ToRole="r_Building"/>
      </EntityType>
      <EntityType Name="Building">
        <Key><PropertyRef Name="Id"/></Key>
        <Property Name="Id" Type="Edm.String" Nullable="false"/>
        <Property Name="Name" Type="Edm.String"/>
        <Property Name="Image" Type="Edm.Binary"/>
        <NavigationProperty Name="nb_Rooms" Relationship="RS.BuildingRooms" FromRole="r_Building" ToRole="r_Rooms"/>
      </EntityType>
      <EntityType Name="Photo" m:HasStream="true">
        <Key>
          <PropertyRef Name="Id"/>
          <PropertyRef Name="Type"/>
        </Key>
        <Property Name="Id" Type="Edm.Int32" Nullable="false"/>
        <Property Name="Type" Type="Edm.String" Nullable="false"/>
        <Property Name="Name" Type="Edm.String"/>
        <Property Name="Content" Type="Edm.String" m:FC_TargetPath="Photo/Content" m:FC_NsPrefix="ph" m:FC_NsUri="http://localhost/photo" m:FC_KeepInContent="false"/>
      </EntityType>
      <ComplexType Name="c_Location">
        <Property Name="City" Type="RS.c_City"/>
        <Property Name="Country" Type="Edm.String"/>
      </ComplexType>
      <ComplexType Name="c_City">
        <Property Name="PostalCode" Type="Edm.String"/>
        <Property Name="CityName" Type="Edm.String"/>
      </ComplexType>
      <Association Name="ManagerEmployees">
        <End Type="RS.Manager" Multiplicity="1" Role="r_Manager"/>
        <End Type="RS.Employee" Multiplicity="*" Role="r_Employees"/>
      </Association>
      <Association Name="TeamEmployees">
        <End Type="RS.Team" Multiplicity="1" Role="r_Team"/>
        <End Type="RS.Employee" Multiplicity="*" Role="r_Employees"/>
      </Association>
      <Association Name="RoomEmployees">
        <End Type="RS.Room" Multiplicity="1" Role="r_Room"/>
        <End Type="RS.Employee" Multiplicity="*" Role="r_Employees"/>
      </Association>
      <Association Name="BuildingRooms">
        <End Type="RS.Building" Multiplicity="1" Role="r_Building"/>
        <End Type="RS.Room" Multiplicity="*" Role="r_Rooms"/>
      </Association>
      <EntityContainer Name="Container1" m:IsDefaultEntityContainer="true">
        <EntitySet Name="Employees" EntityType="RS.Employee"/>
        <EntitySet Name="Managers" EntityType="RS.Manager"/>
        <EntitySet Name="Teams" EntityType="RS.Team"/>
        <EntitySet Name="Rooms" EntityType="RS.Room"/>
        <EntitySet Name="Buildings" EntityType="RS.Building"/>
        <EntitySet Name="Photos" EntityType="RS.Photo"/>
        <AssociationSet Name="ManagerEmployees" Association="RS.ManagerEmployees">
          <End EntitySet="Managers" Role="r_Manager"/>
          <End EntitySet="Employees" Role="r_Employees"/>
        </AssociationSet>
        <AssociationSet Name="TeamEmployees" Association="RS.TeamEmployees">
          <End EntitySet="Teams" Role="r_Team"/>
          <End EntitySet="Employees" Role="r_Employees"/>
        </AssociationSet>
        <AssociationSet Name="RoomEmployees" Association="RS.RoomEmployees">
          <End EntitySet="Rooms" Role="r_Room"/>
          <End EntitySet="Employees" Role="r_Employees"/>
        </AssociationSet>
        <AssociationSet Name="BuildingRooms" Association="RS.BuildingRooms">
          <End EntitySet="Buildings" Role="r_Building"/>
          <End EntitySet="Rooms" Role="r_Rooms"/>
        </AssociationSet>
        <FunctionImport Name="AllLocations" ReturnType="Collection(RS.c_Location)" m:HttpMethod="GET"/>
        <FunctionImport Name="AllUsedRoomIds" ReturnType="Collection(Edm.String)" m:HttpMethod="GET"/>
        <FunctionImport Name="MaximalAge" ReturnType="Edm.Int16" m:HttpMethod="GET"/>
      </EntityContainer>
    </Schema>
  </edmx:DataServices>
</edmx:Edmx>"#;

/// Model of [`METADATA`].
///
/// # Errors
///
/// Returns `Error::Provider` if the document does not resolve.
pub fn model() -> Result<EdmModel, Error> {
    EntityProvider::read_metadata(METADATA.as_bytes()).map_err(Error::Provider)
}

/// Entity set of the default container.
///
/// # Errors
///
/// Returns `Error::ExpectedEntitySet` if the model has no such set.
pub fn entity_set<'a>(model: &'a EdmModel, name: &'static str) -> Result<EntitySetRef<'a>, Error> {
    model
        .default_entity_set(name)
        .ok_or(Error::ExpectedEntitySet(name))
}

/// Function import of the default container.
///
/// # Errors
///
/// Returns `Error::ExpectedFunctionImport` if the model has no such
/// function import.
pub fn function_import<'a>(model: &'a EdmModel, name: &'static str) -> Result<&'a FunctionImport, Error> {
    model
        .function_import(None, name)
        .ok_or(Error::ExpectedFunctionImport(name))
}

fn fqn(name: &str) -> FullQualifiedName {
    FullQualifiedName::new(NAMESPACE, name)
}

/// Rooms and buildings of the scenario supplied by a provider instead
/// of a document. Buildings carry a media resource whose MIME type is
/// held by the `ImageType` property.
#[must_use]
pub fn provider_schemas() -> Vec<Schema> {
    let id = || PropertyDef::simple("Id", EdmSimpleTypeKind::String).with_facets(Facets::new().with_nullable(false));
    let room = EntityTypeDef::new("Room")
        .with_key(["Id"])
        .with_property(id())
        .with_property(PropertyDef::simple("Name", EdmSimpleTypeKind::String))
        .with_property(PropertyDef::simple("Seats", EdmSimpleTypeKind::Int16))
        .with_property(
            PropertyDef::simple("Version", EdmSimpleTypeKind::Int16)
                .with_facets(Facets::new().with_concurrency_mode(ConcurrencyMode::Fixed)),
        )
        .with_navigation_property(NavigationPropertyDef::new(
            "nr_Building",
            fqn("BuildingRooms"),
            "r_Rooms",
            "r_Building",
        ));
    let building = EntityTypeDef::new("Building")
        .with_key(["Id"])
        .with_has_stream(true)
        .with_mapping(Mapping {
            media_resource_mime_type_key: Some("ImageType".into()),
            ..Mapping::default()
        })
        .with_property(id())
        .with_property(PropertyDef::simple("Name", EdmSimpleTypeKind::String))
        .with_property(PropertyDef::simple("ImageType", EdmSimpleTypeKind::String))
        .with_navigation_property(NavigationPropertyDef::new(
            "nb_Rooms",
            fqn("BuildingRooms"),
            "r_Building",
            "r_Rooms",
        ));
    let association = AssociationDef::new(
        "BuildingRooms",
        AssociationEndDef::new(fqn("Building"), "r_Building", Multiplicity::One),
        AssociationEndDef::new(fqn("Room"), "r_Rooms", Multiplicity::Many),
    );
    let mut container = EntityContainerDef::new("Container1").with_default(true);
    container.entity_sets = vec![
        EntitySetDef::new("Rooms", fqn("Room")),
        EntitySetDef::new("Buildings", fqn("Building")),
    ];
    container.association_sets = vec![AssociationSetDef::new(
        "BuildingRooms",
        fqn("BuildingRooms"),
        AssociationSetEndDef::new("Buildings", "r_Building"),
        AssociationSetEndDef::new("Rooms", "r_Rooms"),
    )];

    let mut schema = Schema::new(NAMESPACE);
    schema.entity_types = vec![room, building];
    schema.associations = vec![association];
    schema.entity_containers = vec![container];
    vec![schema]
}
