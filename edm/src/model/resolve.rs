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

//! Two-pass resolution of raw schemas.
//!
//! The first pass indexes every type, association and container by
//! its qualified name. The second pass resolves references through the
//! index, so the order in which types are declared never matters.

use crate::error::EntityProviderError;
use crate::error::MessageKey;
use crate::model::Association;
use crate::model::AssociationEnd;
use crate::model::AssociationId;
use crate::model::AssociationSet;
use crate::model::ComplexType;
use crate::model::ComplexTypeId;
use crate::model::ContainerId;
use crate::model::EdmModel;
use crate::model::EntityContainer;
use crate::model::EntitySet;
use crate::model::EntityType;
use crate::model::EntityTypeId;
use crate::model::FunctionImport;
use crate::model::FunctionImportParameter;
use crate::model::NavigationProperty;
use crate::model::Property;
use crate::model::PropertyType;
use crate::model::ReturnType;
use crate::model::ReturnTypeKind;
use crate::provider::AssociationDef;
use crate::provider::AssociationEndDef;
use crate::provider::ComplexTypeDef;
use crate::provider::EntityContainerDef;
use crate::provider::EntityTypeDef;
use crate::provider::FullQualifiedName;
use crate::provider::FunctionImportDef;
use crate::provider::Multiplicity;
use crate::provider::NavigationPropertyDef;
use crate::provider::PropertyDef;
use crate::provider::Schema;
use crate::simple_type::EdmSimpleTypeKind;
use crate::simple_type::EDM_NAMESPACE;
use std::collections::HashMap;
use std::collections::HashSet;
use tracing::debug;

/// Index over all schemas of the service.
struct SchemaIndex<'a> {
    aliases: HashMap<String, String>,
    entity_types: Vec<(FullQualifiedName, &'a EntityTypeDef)>,
    complex_types: Vec<(FullQualifiedName, &'a ComplexTypeDef)>,
    associations: Vec<(FullQualifiedName, &'a AssociationDef)>,
    containers: Vec<(&'a str, &'a EntityContainerDef)>,
    entity_type_index: HashMap<FullQualifiedName, EntityTypeId>,
    complex_type_index: HashMap<FullQualifiedName, ComplexTypeId>,
    association_index: HashMap<FullQualifiedName, AssociationId>,
}

impl<'a> SchemaIndex<'a> {
    fn build(schemas: &'a [Schema]) -> Self {
        let aliases = schemas
            .iter()
            .filter_map(|s| s.alias.clone().map(|alias| (alias, s.namespace.clone())))
            .collect();
        let qualified = |s: &Schema, name: &str| FullQualifiedName::new(&s.namespace, name);
        let entity_types: Vec<_> = schemas
            .iter()
            .flat_map(|s| s.entity_types.iter().map(move |t| (qualified(s, &t.name), t)))
            .collect();
        let complex_types: Vec<_> = schemas
            .iter()
            .flat_map(|s| s.complex_types.iter().map(move |t| (qualified(s, &t.name), t)))
            .collect();
        let associations: Vec<_> = schemas
            .iter()
            .flat_map(|s| s.associations.iter().map(move |a| (qualified(s, &a.name), a)))
            .collect();
        let containers = schemas
            .iter()
            .flat_map(|s| {
                s.entity_containers
                    .iter()
                    .map(move |c| (s.namespace.as_str(), c))
            })
            .collect();
        Self {
            aliases,
            entity_type_index: entity_types
                .iter()
                .enumerate()
                .map(|(i, (name, _))| (name.clone(), EntityTypeId(i)))
                .collect(),
            complex_type_index: complex_types
                .iter()
                .enumerate()
                .map(|(i, (name, _))| (name.clone(), ComplexTypeId(i)))
                .collect(),
            association_index: associations
                .iter()
                .enumerate()
                .map(|(i, (name, _))| (name.clone(), AssociationId(i)))
                .collect(),
            entity_types,
            complex_types,
            associations,
            containers,
        }
    }

    fn canonical(&self, name: &FullQualifiedName) -> FullQualifiedName {
        self.aliases
            .get(&name.namespace)
            .map_or_else(|| name.clone(), |ns| FullQualifiedName::new(ns, &name.name))
    }

    fn entity_type(&self, name: &FullQualifiedName) -> Option<EntityTypeId> {
        self.entity_type_index.get(&self.canonical(name)).copied()
    }

    fn complex_type(&self, name: &FullQualifiedName) -> Option<ComplexTypeId> {
        self.complex_type_index.get(&self.canonical(name)).copied()
    }

    fn association(&self, name: &FullQualifiedName) -> Option<AssociationId> {
        self.association_index.get(&self.canonical(name)).copied()
    }

    fn simple_type(name: &FullQualifiedName) -> Option<EdmSimpleTypeKind> {
        (name.namespace == EDM_NAMESPACE)
            .then(|| EdmSimpleTypeKind::from_name(&name.name))
            .flatten()
    }

    fn property(&self, def: &PropertyDef) -> Result<Property, EntityProviderError> {
        let type_name = def
            .type_name
            .as_ref()
            .ok_or_else(|| EntityProviderError::missing_attribute("Type", "Property"))?;
        let property_type = Self::simple_type(type_name)
            .map(PropertyType::Simple)
            .or_else(|| self.complex_type(type_name).map(PropertyType::Complex))
            .ok_or_else(|| {
                EntityProviderError::illegal_argument(type_name.to_string())
                    .with_content(&def.name)
            })?;
        Ok(Property {
            name: def.name.clone(),
            property_type,
            facets: def.facets.clone(),
            mime_type: def.mime_type.clone(),
            mapping: def.mapping.clone(),
            customizable_feed_mappings: def.customizable_feed_mappings.clone(),
            annotations: def.annotations.clone(),
        })
    }

    fn navigation(&self, def: &NavigationPropertyDef) -> Result<NavigationProperty, EntityProviderError> {
        let missing = || EntityProviderError::missing_attribute("Relationship", "NavigationProperty");
        let relationship = def.relationship.as_ref().ok_or_else(missing)?;
        let association = self.association(relationship).ok_or_else(missing)?;
        Ok(NavigationProperty {
            name: def.name.clone(),
            relationship: self.canonical(relationship),
            association,
            from_role: def.from_role.clone(),
            to_role: def.to_role.clone(),
            mapping: def.mapping.clone(),
            annotations: def.annotations.clone(),
        })
    }

    fn association_end(&self, def: &AssociationEndDef) -> Result<AssociationEnd, EntityProviderError> {
        let type_name = def
            .entity_type
            .as_ref()
            .ok_or_else(|| EntityProviderError::missing_attribute("Type", "End"))?;
        let entity_type = self
            .entity_type(type_name)
            .ok_or_else(|| EntityProviderError::illegal_argument(type_name.to_string()))?;
        Ok(AssociationEnd {
            entity_type,
            role: def.role.clone(),
            multiplicity: def.multiplicity,
        })
    }
}

/// Fails if following base types from any type returns to a type
/// already visited.
fn check_acyclic(
    bases: &[Option<usize>],
    name: impl Fn(usize) -> String,
) -> Result<(), EntityProviderError> {
    for start in 0..bases.len() {
        let mut current = bases[start];
        let mut steps = 0;
        while let Some(i) = current {
            if i == start || steps > bases.len() {
                return Err(EntityProviderError::new(MessageKey::ExceptionOccurred)
                    .with_content(format!("cyclic base type chain: {}", name(start))));
            }
            steps += 1;
            current = bases[i];
        }
    }
    Ok(())
}

/// The type followed by its ancestors. Bases must be acyclic.
fn chain(bases: &[Option<usize>], start: usize) -> Vec<usize> {
    std::iter::successors(Some(start), |i| bases[*i]).collect()
}

/// Concatenate own members along the chain, ancestors first.
fn union<T: Clone>(
    own: &[Vec<T>],
    chain: &[usize],
    name: impl Fn(&T) -> &str,
) -> Result<Vec<T>, EntityProviderError> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for i in chain.iter().rev() {
        for item in &own[*i] {
            if !seen.insert(name(item).to_string()) {
                return Err(EntityProviderError::double_property(name(item)));
            }
            out.push(item.clone());
        }
    }
    Ok(out)
}

fn base_of(
    base: Option<&FullQualifiedName>,
    name: &FullQualifiedName,
    lookup: impl Fn(&FullQualifiedName) -> Option<usize>,
) -> Result<Option<usize>, EntityProviderError> {
    base.map(|base| {
        lookup(base).ok_or_else(|| {
            EntityProviderError::new(MessageKey::InvalidBaseType)
                .with_content(base.to_string())
                .with_content(name.to_string())
        })
    })
    .transpose()
}

impl EdmModel {
    /// Resolve raw schemas into a model.
    ///
    /// # Errors
    ///
    /// Returns error if any reference cannot be resolved or the schemas
    /// violate a structural rule: base type of wrong kind, cyclic base
    /// types, missing or redeclared keys, missing relationship of a
    /// navigation property, invalid function import.
    pub fn resolve(schemas: Vec<Schema>) -> Result<Self, EntityProviderError> {
        let index = SchemaIndex::build(&schemas);

        let complex_types = resolve_complex_types(&index)?;
        let entity_types = resolve_entity_types(&index)?;
        let associations = index
            .associations
            .iter()
            .map(|(name, def)| {
                Ok(Association {
                    name: name.clone(),
                    end1: index.association_end(&def.end1)?,
                    end2: index.association_end(&def.end2)?,
                    referential_constraint: def.referential_constraint.clone(),
                    annotations: def.annotations.clone(),
                })
            })
            .collect::<Result<Vec<_>, EntityProviderError>>()?;
        let containers = resolve_containers(&index)?;
        let default_container = containers
            .iter()
            .position(|c| c.is_default)
            .or_else(|| (!containers.is_empty()).then_some(0))
            .map(ContainerId);

        debug!(
            entity_types = entity_types.len(),
            complex_types = complex_types.len(),
            associations = associations.len(),
            containers = containers.len(),
            "resolved entity data model"
        );

        Ok(Self {
            entity_types,
            complex_types,
            associations,
            containers,
            entity_type_index: index.entity_type_index,
            complex_type_index: index.complex_type_index,
            association_index: index.association_index,
            aliases: index.aliases,
            default_container,
        })
    }
}

fn resolve_complex_types(index: &SchemaIndex<'_>) -> Result<Vec<ComplexType>, EntityProviderError> {
    let defs = &index.complex_types;
    let bases = defs
        .iter()
        .map(|(name, def)| {
            base_of(def.base_type.as_ref(), name, |b| {
                index.complex_type(b).map(|id| id.0)
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    check_acyclic(&bases, |i| defs[i].0.to_string())?;
    let own = defs
        .iter()
        .map(|(_, def)| def.properties.iter().map(|p| index.property(p)).collect())
        .collect::<Result<Vec<Vec<_>>, _>>()?;
    defs.iter()
        .enumerate()
        .map(|(i, (name, def))| {
            Ok(ComplexType {
                name: name.clone(),
                base_type: bases[i].map(ComplexTypeId),
                is_abstract: def.is_abstract,
                properties: union(&own, &chain(&bases, i), |p: &Property| p.name.as_str())?,
                annotations: def.annotations.clone(),
            })
        })
        .collect()
}

fn resolve_entity_types(index: &SchemaIndex<'_>) -> Result<Vec<EntityType>, EntityProviderError> {
    let defs = &index.entity_types;
    let bases = defs
        .iter()
        .map(|(name, def)| {
            base_of(def.base_type.as_ref(), name, |b| {
                index.entity_type(b).map(|id| id.0)
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    check_acyclic(&bases, |i| defs[i].0.to_string())?;

    let declared_key = |i: usize| defs[i].1.key.as_ref().filter(|k| !k.is_empty());
    let mut keyed_descendant = vec![false; defs.len()];
    for i in (0..defs.len()).filter(|i| declared_key(*i).is_some()) {
        for ancestor in chain(&bases, i).into_iter().skip(1) {
            keyed_descendant[ancestor] = true;
        }
    }

    let own = defs
        .iter()
        .map(|(_, def)| def.properties.iter().map(|p| index.property(p)).collect())
        .collect::<Result<Vec<Vec<_>>, _>>()?;
    let own_navigation = defs
        .iter()
        .map(|(_, def)| {
            def.navigation_properties
                .iter()
                .map(|n| index.navigation(n))
                .collect()
        })
        .collect::<Result<Vec<Vec<_>>, _>>()?;

    defs.iter()
        .enumerate()
        .map(|(i, (name, def))| {
            let chain = chain(&bases, i);
            let properties = union(&own, &chain, |p: &Property| p.name.as_str())?;
            let navigation_properties =
                union(&own_navigation, &chain, |n: &NavigationProperty| n.name.as_str())?;
            let mut keyed = chain.iter().filter_map(|t| declared_key(*t));
            let key = match (declared_key(i), keyed.nth(1)) {
                (Some(_), Some(_)) => {
                    return Err(EntityProviderError::illegal_argument("Key")
                        .with_content(name.to_string()));
                }
                _ => chain.iter().find_map(|t| declared_key(*t)).cloned(),
            };
            let key = match key {
                Some(key) => key,
                None if keyed_descendant[i] => Vec::new(),
                None => {
                    return Err(EntityProviderError::missing_attribute("Key", "EntityType")
                        .with_content(name.to_string()));
                }
            };
            if let Some(bad) = key.iter().find(|k| {
                !properties
                    .iter()
                    .any(|p| &p.name == *k && p.simple_kind().is_some())
            }) {
                return Err(EntityProviderError::illegal_argument("PropertyRef")
                    .with_content(bad.clone())
                    .with_content(name.to_string()));
            }
            Ok(EntityType {
                name: name.clone(),
                base_type: bases[i].map(EntityTypeId),
                is_abstract: def.is_abstract,
                has_stream: chain.iter().any(|t| defs[*t].1.has_stream),
                key,
                properties,
                navigation_properties,
                mapping: chain.iter().find_map(|t| defs[*t].1.mapping.clone()),
                customizable_feed_mappings: def.customizable_feed_mappings.clone(),
                annotations: def.annotations.clone(),
            })
        })
        .collect()
}

fn resolve_containers(index: &SchemaIndex<'_>) -> Result<Vec<EntityContainer>, EntityProviderError> {
    let container_id = |name: &str| {
        index
            .containers
            .iter()
            .position(|(_, c)| c.name == name)
            .map(ContainerId)
    };
    index
        .containers
        .iter()
        .map(|(namespace, def)| {
            let extends = def
                .extends
                .as_deref()
                .map(|name| {
                    container_id(name).ok_or_else(|| {
                        EntityProviderError::illegal_argument("Extends").with_content(name)
                    })
                })
                .transpose()?;
            let entity_sets = def
                .entity_sets
                .iter()
                .map(|set| {
                    let type_name = set.entity_type.as_ref().ok_or_else(|| {
                        EntityProviderError::missing_attribute("EntityType", "EntitySet")
                    })?;
                    Ok(EntitySet {
                        name: set.name.clone(),
                        entity_type: index.entity_type(type_name).ok_or_else(|| {
                            EntityProviderError::illegal_argument(type_name.to_string())
                                .with_content(&set.name)
                        })?,
                        mapping: set.mapping.clone(),
                        annotations: set.annotations.clone(),
                    })
                })
                .collect::<Result<Vec<_>, EntityProviderError>>()?;
            let association_sets = def
                .association_sets
                .iter()
                .map(|set| {
                    Ok(AssociationSet {
                        name: set.name.clone(),
                        association: index.association(&set.association).ok_or_else(|| {
                            EntityProviderError::illegal_argument(set.association.to_string())
                                .with_content(&set.name)
                        })?,
                        end1: set.end1.clone(),
                        end2: set.end2.clone(),
                        annotations: set.annotations.clone(),
                    })
                })
                .collect::<Result<Vec<_>, EntityProviderError>>()?;
            let function_imports = def
                .function_imports
                .iter()
                .map(|f| function_import(index, f))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(EntityContainer {
                name: def.name.clone(),
                namespace: (*namespace).to_string(),
                is_default: def.is_default,
                extends,
                entity_sets,
                association_sets,
                function_imports,
                annotations: def.annotations.clone(),
            })
        })
        .collect()
}

fn function_import(
    index: &SchemaIndex<'_>,
    def: &FunctionImportDef,
) -> Result<FunctionImport, EntityProviderError> {
    let return_type = def
        .return_type
        .as_ref()
        .map(|rt| {
            let kind = SchemaIndex::simple_type(&rt.type_name)
                .map(ReturnTypeKind::Simple)
                .or_else(|| index.complex_type(&rt.type_name).map(ReturnTypeKind::Complex))
                .or_else(|| index.entity_type(&rt.type_name).map(ReturnTypeKind::Entity))
                .ok_or_else(|| {
                    EntityProviderError::illegal_argument(rt.type_name.to_string())
                        .with_content(&def.name)
                })?;
            match kind {
                ReturnTypeKind::Entity(_)
                    if rt.multiplicity == Multiplicity::Many && def.entity_set.is_none() =>
                {
                    Err(EntityProviderError::missing_attribute(
                        "EntitySet",
                        "FunctionImport",
                    ))
                }
                ReturnTypeKind::Simple(_) | ReturnTypeKind::Complex(_)
                    if def.entity_set.is_some() =>
                {
                    Err(EntityProviderError::illegal_argument("EntitySet")
                        .with_content(&def.name))
                }
                _ => Ok(ReturnType {
                    kind,
                    multiplicity: rt.multiplicity,
                }),
            }
        })
        .transpose()?;
    let parameters = def
        .parameters
        .iter()
        .map(|p| {
            let type_name = p
                .type_name
                .as_ref()
                .ok_or_else(|| EntityProviderError::missing_attribute("Type", "Parameter"))?;
            Ok(FunctionImportParameter {
                name: p.name.clone(),
                kind: SchemaIndex::simple_type(type_name).ok_or_else(|| {
                    EntityProviderError::illegal_argument(type_name.to_string())
                        .with_content(&p.name)
                })?,
                mode: p.mode.clone(),
                facets: p.facets.clone(),
                mapping: p.mapping.clone(),
                annotations: p.annotations.clone(),
            })
        })
        .collect::<Result<Vec<_>, EntityProviderError>>()?;
    Ok(FunctionImport {
        name: def.name.clone(),
        return_type,
        entity_set: def.entity_set.clone(),
        http_method: def.http_method.clone(),
        parameters,
        mapping: def.mapping.clone(),
        annotations: def.annotations.clone(),
    })
}
