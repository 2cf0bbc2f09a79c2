// Copyright 2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The reference resolver and ID assigner (spec.md §4.6): binds every
//! `SymbolicRef` to a concrete `ResourceId` and, for entries that don't
//! already have one, assigns one.

use std::collections::{BTreeSet, HashMap};

use rescomp_common::{Diagnostics, RescompError, Result};
use rescomp_model::{ResourceId, ResourceName, ResourceTable, ResourceType, Visibility};

/// A flattened, read-only view of one table's resolvable symbols, used as
/// one link in the ordered source chain (spec.md §4.6 "(a) the table being
/// linked, (b) each included library ... (c) the framework").
pub struct SymbolTable {
    entries: HashMap<(String, ResourceType, String), (ResourceId, Visibility)>
}

impl SymbolTable {
    /// Every entry with an assigned ID, regardless of visibility. Used for
    /// the table being linked against itself.
    pub fn from_table(table: &ResourceTable) -> SymbolTable {
        SymbolTable { entries: flatten(table, false) }
    }

    /// Public entries only, the surface a library or the framework exposes
    /// to other compilation units (spec.md §4.6 "its exported symbol
    /// table").
    pub fn exported_from(table: &ResourceTable) -> SymbolTable {
        SymbolTable { entries: flatten(table, true) }
    }

    fn lookup(&self, name: &ResourceName) -> Option<(ResourceId, Visibility)> {
        self.entries.get(&(name.package.clone(), name.type_, name.entry.clone())).copied()
    }
}

fn flatten(table: &ResourceTable, public_only: bool) -> HashMap<(String, ResourceType, String), (ResourceId, Visibility)> {
    let mut entries = HashMap::new();
    for package in &table.packages {
        for type_ in &package.types {
            for entry in &type_.entries {
                if public_only && entry.visibility != Visibility::Public {
                    continue;
                }
                if let Some(id) = entry.id {
                    entries.insert((package.name.clone(), type_.type_, entry.name.clone()), (id, entry.visibility));
                }
            }
        }
    }
    entries
}

/// Assigns a `ResourceId` to every entry that doesn't already have a pinned
/// one, per spec.md §4.6 "Assignment". `package_id` supplies the package
/// component for any package that doesn't already have one (e.g. `0x00` in
/// shared-library mode, `0x7f` for an app).
pub fn assign_ids(table: &mut ResourceTable, package_id: u8) {
    for package in &mut table.packages {
        if package.id.is_none() {
            package.id = Some(package_id);
        }
        let pkg_id = package.id.unwrap();

        // A type's id is pinned if any of its entries already carry a
        // pinned full id (from a prior `pin_entry_id` call); that one type
        // id is shared by every entry in the type.
        let pinned_type_ids: Vec<Option<u8>> = package
            .types
            .iter()
            .map(|t| t.entries.iter().filter_map(|e| e.id).map(|id| id.type_id()).next())
            .collect();
        let mut used_type_ids: BTreeSet<u8> = pinned_type_ids.iter().flatten().copied().collect();

        for (type_, pinned) in package.types.iter_mut().zip(pinned_type_ids.iter()) {
            type_.id = Some(match pinned {
                Some(id) => *id,
                None => {
                    let mut candidate = 1u8;
                    while used_type_ids.contains(&candidate) {
                        candidate += 1;
                    }
                    used_type_ids.insert(candidate);
                    candidate
                }
            });
        }

        for type_ in &mut package.types {
            let type_id = type_.id.unwrap();
            // Staged entries (spec.md §4.6 step 2) already carry a pinned
            // id >= 0x01fe; that reserves their shadow slot here same as
            // any other pin.
            let mut used_entry_ids: BTreeSet<u16> =
                type_.entries.iter().filter_map(|e| e.id).map(|id| id.entry_id()).collect();

            for entry in &mut type_.entries {
                if entry.id.is_some() {
                    continue;
                }
                let mut candidate = 0u16;
                while used_entry_ids.contains(&candidate) {
                    candidate += 1;
                }
                used_entry_ids.insert(candidate);
                entry.id = Some(ResourceId::new(pkg_id, type_id, candidate));
            }
        }
    }
}

/// Resolves every `SymbolicRef` in `table` against the ordered source chain
/// `table` itself, then `libraries` in order, then `framework`. The first
/// hit wins (spec.md §4.6 "Resolution"). Returns the post-condition error
/// naming every symbol that resolved against nothing.
pub fn resolve_references(
    table: &mut ResourceTable,
    libraries: &[SymbolTable],
    framework: Option<&SymbolTable>,
    shared_library_mode: bool,
    diagnostics: &mut Diagnostics
) -> Result<()> {
    let self_symbols = SymbolTable::from_table(table);
    let mut unresolved = Vec::new();

    for package in &mut table.packages {
        let referencing_package = package.name.clone();
        for type_ in &mut package.types {
            for entry in &mut type_.entries {
                for config_value in &mut entry.values {
                    let source = config_value.source.clone();
                    config_value.value.resolve_symbols_mut(&mut |symbol| {
                        if symbol.is_resolved() {
                            return;
                        }

                        let mut lookup_name = symbol.name.clone();
                        if lookup_name.package.is_empty() {
                            lookup_name.package = referencing_package.clone();
                        }

                        let hit = self_symbols
                            .lookup(&lookup_name)
                            .or_else(|| libraries.iter().find_map(|lib| lib.lookup(&lookup_name)))
                            .or_else(|| framework.and_then(|fw| fw.lookup(&lookup_name)));

                        match hit {
                            Some((id, visibility)) => {
                                let same_package = lookup_name.package == referencing_package;
                                if visibility == Visibility::Private && !same_package && !shared_library_mode {
                                    diagnostics.error(
                                        source.clone(),
                                        RescompError::PrivateReferenceFromOutsidePackage(lookup_name.to_qualified_string())
                                            .to_string()
                                    );
                                    unresolved.push(lookup_name.to_qualified_string());
                                } else {
                                    symbol.id = Some(id);
                                    symbol.private = visibility == Visibility::Private;
                                }
                            }
                            None => unresolved.push(lookup_name.to_qualified_string())
                        }
                    });
                }
            }
        }
    }

    if unresolved.is_empty() {
        Ok(())
    } else {
        Err(RescompError::UnresolvedReferences(unresolved))
    }
}

#[cfg(test)]
mod tests {
    use rescomp_common::Source;
    use rescomp_config::Configuration;
    use rescomp_model::{MergeMode, OverlayPolicy, Primitive, StringRef, SymbolicRef, Value};

    use super::*;

    fn name(package: &str, type_: ResourceType, entry: &str) -> ResourceName {
        ResourceName::new(package, type_, entry).unwrap()
    }

    #[test]
    fn assigns_smallest_unused_type_and_entry_ids() {
        let mut table = ResourceTable::new();
        table
            .add_resource(
                &name("com.x", ResourceType::String, "hello"),
                Configuration::any(),
                None,
                Value::String(StringRef { index: 0, spans: Vec::new() }),
                Source::new("v.xml"),
                OverlayPolicy::NoOverlay,
                MergeMode::Append
            )
            .unwrap();
        table
            .add_resource(
                &name("com.x", ResourceType::String, "world"),
                Configuration::any(),
                None,
                Value::String(StringRef { index: 1, spans: Vec::new() }),
                Source::new("v.xml"),
                OverlayPolicy::NoOverlay,
                MergeMode::Append
            )
            .unwrap();

        assign_ids(&mut table, 0x7f);

        let type_ = table.find_package("com.x").unwrap().find_type(ResourceType::String).unwrap();
        assert_eq!(type_.id, Some(1));
        let first = type_.find_entry("hello").unwrap().id.unwrap();
        let second = type_.find_entry("world").unwrap().id.unwrap();
        assert_eq!(first.package_id(), 0x7f);
        assert_eq!(first.type_id(), 1);
        assert_ne!(first.entry_id(), second.entry_id());
    }

    #[test]
    fn assignment_skips_indices_already_pinned() {
        let mut table = ResourceTable::new();
        table.pin_entry_id(&name("com.x", ResourceType::String, "hello"), ResourceId::new(0x7f, 0x01, 0x0000)).unwrap();
        table
            .add_resource(
                &name("com.x", ResourceType::String, "world"),
                Configuration::any(),
                None,
                Value::String(StringRef { index: 0, spans: Vec::new() }),
                Source::new("v.xml"),
                OverlayPolicy::NoOverlay,
                MergeMode::Append
            )
            .unwrap();

        assign_ids(&mut table, 0x7f);

        let type_ = table.find_package("com.x").unwrap().find_type(ResourceType::String).unwrap();
        assert_eq!(type_.find_entry("world").unwrap().id.unwrap().entry_id(), 1);
    }

    #[test]
    fn resolves_reference_against_self_first() {
        let mut table = ResourceTable::new();
        table
            .add_resource(
                &name("com.x", ResourceType::String, "target"),
                Configuration::any(),
                None,
                Value::String(StringRef { index: 0, spans: Vec::new() }),
                Source::new("v.xml"),
                OverlayPolicy::NoOverlay,
                MergeMode::Append
            )
            .unwrap();
        table.set_entry_visibility(&name("com.x", ResourceType::String, "target"), Visibility::Public).unwrap();
        assign_ids(&mut table, 0x7f);

        let reference = SymbolicRef::unresolved(name("com.x", ResourceType::String, "target"));
        table
            .add_resource(
                &name("com.x", ResourceType::Layout, "main"),
                Configuration::any(),
                None,
                Value::Reference(reference),
                Source::new("main.xml"),
                OverlayPolicy::NoOverlay,
                MergeMode::Append
            )
            .unwrap();
        assign_ids(&mut table, 0x7f);

        let mut diagnostics = Diagnostics::default();
        resolve_references(&mut table, &[], None, false, &mut diagnostics).unwrap();

        match table.find(&name("com.x", ResourceType::Layout, "main"), &Configuration::any()) {
            Some(Value::Reference(r)) => assert!(r.is_resolved()),
            other => panic!("unexpected {other:?}")
        }
    }

    #[test]
    fn unresolved_reference_fails_with_every_symbol_named() {
        let mut table = ResourceTable::new();
        let reference = SymbolicRef::unresolved(name("com.x", ResourceType::String, "missing"));
        table
            .add_resource(
                &name("com.x", ResourceType::Layout, "main"),
                Configuration::any(),
                None,
                Value::Reference(reference),
                Source::new("main.xml"),
                OverlayPolicy::NoOverlay,
                MergeMode::Append
            )
            .unwrap();

        let mut diagnostics = Diagnostics::default();
        let err = resolve_references(&mut table, &[], None, false, &mut diagnostics).unwrap_err();
        match err {
            RescompError::UnresolvedReferences(names) => assert_eq!(names, vec!["com.x:string/missing".to_string()]),
            other => panic!("unexpected {other:?}")
        }
    }

    #[test]
    fn private_reference_from_outside_package_is_an_error_unless_shared_library() {
        let mut library = ResourceTable::new();
        library
            .add_resource(
                &name("com.lib", ResourceType::String, "internal"),
                Configuration::any(),
                None,
                Value::Primitive(Primitive::Int(1)),
                Source::new("lib.xml"),
                OverlayPolicy::NoOverlay,
                MergeMode::Append
            )
            .unwrap();
        library.set_entry_visibility(&name("com.lib", ResourceType::String, "internal"), Visibility::Private).unwrap();
        assign_ids(&mut library, 0x7f);
        let lib_symbols = SymbolTable::from_table(&library);

        let mut app = ResourceTable::new();
        let reference = SymbolicRef::unresolved(name("com.lib", ResourceType::String, "internal"));
        app.add_resource(
            &name("com.app", ResourceType::Layout, "main"),
            Configuration::any(),
            None,
            Value::Reference(reference),
            Source::new("main.xml"),
            OverlayPolicy::NoOverlay,
            MergeMode::Append
        )
        .unwrap();

        let mut diagnostics = Diagnostics::default();
        let err = resolve_references(&mut app, &[lib_symbols], None, false, &mut diagnostics).unwrap_err();
        assert!(matches!(err, RescompError::UnresolvedReferences(_)));
        assert!(diagnostics.has_errors());
    }
}
