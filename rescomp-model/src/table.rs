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

//! `ResourceTable` and its `create-package`/`add-resource`/`find`/`enumerate`
//! operations (spec §3, §4.2).

use rescomp_common::{Diagnostics, RescompError, Result, Source};
use rescomp_config::Configuration;

use crate::resource_id::ResourceId;
use crate::resource_name::{ResourceName, ResourceType};
use crate::string_pool::StringPool;
use crate::value::{SymbolicRef, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Undefined,
    Private,
    Public
}

impl PartialOrd for Visibility {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Visibility {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        fn rank(v: &Visibility) -> u8 {
            match v {
                Visibility::Undefined => 0,
                Visibility::Private => 1,
                Visibility::Public => 2
            }
        }
        rank(self).cmp(&rank(other))
    }
}

/// Whether an incoming definition is allowed to replace an existing one in
/// the same entry (spec §3, §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayPolicy {
    #[default]
    NoOverlay,
    AllowOverlay
}

/// Whether the table merger is ingesting this input as an additive
/// contribution or as permission to replace existing values (spec §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    Append,
    Overlay
}

/// One configuration/product-qualified value within an entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceConfigValue {
    pub config: Configuration,
    pub product: Option<String>,
    pub value: Value,
    pub source: Source
}

/// One resource name within a package and type (spec §3).
#[derive(Debug, Clone)]
pub struct ResourceEntry {
    pub name: String,
    pub id: Option<ResourceId>,
    pub visibility: Visibility,
    pub overlay_policy: OverlayPolicy,
    pub values: Vec<ResourceConfigValue>
}

impl ResourceEntry {
    fn new(name: impl Into<String>) -> ResourceEntry {
        ResourceEntry {
            name: name.into(),
            id: None,
            visibility: Visibility::Undefined,
            overlay_policy: OverlayPolicy::NoOverlay,
            values: Vec::new()
        }
    }

    fn find_value_index(&self, config: &Configuration, product: &Option<String>) -> Option<usize> {
        self.values.iter().position(|v| &v.config == config && &v.product == product)
    }

    /// Returns the single best-matching value for `target`, per the
    /// specificity ordering of `Configuration::is_better_than` (spec §4.2).
    pub fn find(&self, target: &Configuration) -> Option<&Value> {
        let mut best: Option<&ResourceConfigValue> = None;
        for candidate in &self.values {
            if !candidate.config.matches(target) {
                continue;
            }
            best = match best {
                None => Some(candidate),
                Some(current) if candidate.config.is_better_than(&current.config, target) => Some(candidate),
                Some(current) => Some(current)
            };
        }
        best.map(|v| &v.value)
    }
}

#[derive(Debug, Clone)]
pub struct ResourceTableType {
    pub type_: ResourceType,
    pub id: Option<u8>,
    pub visibility: Visibility,
    pub entries: Vec<ResourceEntry>
}

impl ResourceTableType {
    fn new(type_: ResourceType) -> ResourceTableType {
        ResourceTableType { type_, id: None, visibility: Visibility::Undefined, entries: Vec::new() }
    }

    pub fn get_or_create_entry(&mut self, name: &str) -> &mut ResourceEntry {
        if let Some(index) = self.entries.iter().position(|e| e.name == name) {
            return &mut self.entries[index];
        }
        self.entries.push(ResourceEntry::new(name));
        self.entries.last_mut().unwrap()
    }

    pub fn find_entry(&self, name: &str) -> Option<&ResourceEntry> {
        self.entries.iter().find(|e| e.name == name)
    }
}

#[derive(Debug, Clone)]
pub struct ResourceTablePackage {
    pub name: String,
    pub id: Option<u8>,
    pub types: Vec<ResourceTableType>
}

impl ResourceTablePackage {
    fn new(name: impl Into<String>, id: Option<u8>) -> ResourceTablePackage {
        ResourceTablePackage { name: name.into(), id, types: Vec::new() }
    }

    pub fn get_or_create_type(&mut self, type_: ResourceType) -> &mut ResourceTableType {
        if let Some(index) = self.types.iter().position(|t| t.type_ == type_) {
            return &mut self.types[index];
        }
        self.types.push(ResourceTableType::new(type_));
        self.types.last_mut().unwrap()
    }

    pub fn find_type(&self, type_: ResourceType) -> Option<&ResourceTableType> {
        self.types.iter().find(|t| t.type_ == type_)
    }
}

/// The in-memory data model for every resource across packages, types and
/// entries (spec §3). Mutable during compile/link, immutable once the
/// serializer runs (spec §3 "Lifecycle").
#[derive(Debug, Clone, Default)]
pub struct ResourceTable {
    pub packages: Vec<ResourceTablePackage>,
    pub string_pool: StringPool,
    pub styled_string_pool: StringPool
}

impl ResourceTable {
    pub fn new() -> ResourceTable {
        ResourceTable::default()
    }

    /// Idempotent: returns the existing package if `name` was already
    /// created (spec §4.2).
    pub fn create_package(&mut self, name: &str, id: Option<u8>) -> &mut ResourceTablePackage {
        if let Some(index) = self.packages.iter().position(|p| p.name == name) {
            if id.is_some() && self.packages[index].id.is_none() {
                self.packages[index].id = id;
            }
            return &mut self.packages[index];
        }
        self.packages.push(ResourceTablePackage::new(name, id));
        self.packages.last_mut().unwrap()
    }

    pub fn find_package(&self, name: &str) -> Option<&ResourceTablePackage> {
        self.packages.iter().find(|p| p.name == name)
    }

    /// Inserts a configuration-qualified value for `name`, or reports the
    /// conflict per the merge mode (spec §4.2, §4.5).
    #[allow(clippy::too_many_arguments)]
    pub fn add_resource(
        &mut self,
        name: &ResourceName,
        config: Configuration,
        product: Option<String>,
        value: Value,
        source: Source,
        overlay_policy: OverlayPolicy,
        mode: MergeMode
    ) -> Result<()> {
        let package = self.create_package(&name.package, None);
        let type_ = package.get_or_create_type(name.type_);
        let entry = type_.get_or_create_entry(&name.entry);
        entry.overlay_policy = overlay_policy;

        match entry.find_value_index(&config, &product) {
            Some(index) => match mode {
                MergeMode::Overlay if entry.overlay_policy == OverlayPolicy::AllowOverlay => {
                    entry.values[index] = ResourceConfigValue { config, product, value, source };
                    Ok(())
                }
                MergeMode::Append if entry.values[index].value == value => {
                    // Structurally-equal append-mode redefinitions are not
                    // conflicts (spec §8 property 3: associative merge of
                    // disjoint/non-conflicting inputs).
                    Ok(())
                }
                _ => Err(RescompError::DuplicateDefinition(name.to_qualified_string()))
            },
            None => {
                entry.values.push(ResourceConfigValue { config, product, value, source });
                Ok(())
            }
        }
    }

    /// Merges an incoming type-level visibility declaration, taking the
    /// stricter of the two (Public wins) rather than overwriting (spec
    /// §4.5 step 2).
    pub fn set_type_visibility(&mut self, package: &str, type_: ResourceType, visibility: Visibility) {
        let type_entry = self.create_package(package, None).get_or_create_type(type_);
        if visibility > type_entry.visibility {
            type_entry.visibility = visibility;
        }
    }

    /// Merges an incoming entry-level visibility declaration. Public and
    /// Private directly conflicting is an error; anything merging with
    /// Undefined just takes the defined side (spec §4.5 step 4).
    pub fn set_entry_visibility(&mut self, name: &ResourceName, visibility: Visibility) -> Result<()> {
        let package = self.create_package(&name.package, None);
        let type_ = package.get_or_create_type(name.type_);
        let entry = type_.get_or_create_entry(&name.entry);
        match (entry.visibility, visibility) {
            (Visibility::Public, Visibility::Private) | (Visibility::Private, Visibility::Public) => {
                Err(RescompError::ConflictingVisibility(name.to_qualified_string()))
            }
            (_, Visibility::Undefined) => Ok(()),
            _ => {
                entry.visibility = visibility;
                Ok(())
            }
        }
    }

    /// Pins an entry to a specific public ID. A second, different pin for
    /// the same entry is an error (spec §4.5 step 4).
    pub fn pin_entry_id(&mut self, name: &ResourceName, id: ResourceId) -> Result<()> {
        let package = self.create_package(&name.package, None);
        let type_ = package.get_or_create_type(name.type_);
        let entry = type_.get_or_create_entry(&name.entry);
        match entry.id {
            Some(existing) if existing != id => Err(RescompError::ConflictingPinnedId(name.to_qualified_string())),
            _ => {
                entry.id = Some(id);
                Ok(())
            }
        }
    }

    /// Unions an incoming styleable's attribute-reference list into the
    /// existing one at `(config, product)`, preserving first-seen order
    /// rather than replacing it (spec §4.5 step 5).
    pub fn union_styleable_attrs(
        &mut self,
        name: &ResourceName,
        config: &Configuration,
        product: &Option<String>,
        incoming_attrs: &[SymbolicRef]
    ) -> Result<()> {
        let package = self.create_package(&name.package, None);
        let type_ = package.get_or_create_type(name.type_);
        let entry = type_.get_or_create_entry(&name.entry);
        match entry.find_value_index(config, product) {
            Some(index) => {
                if let Value::Styleable(existing) = &mut entry.values[index].value {
                    for attr in incoming_attrs {
                        if !existing.iter().any(|a| a.name == attr.name) {
                            existing.push(attr.clone());
                        }
                    }
                }
                Ok(())
            }
            None => {
                entry.values.push(ResourceConfigValue {
                    config: config.clone(),
                    product: product.clone(),
                    value: Value::Styleable(incoming_attrs.to_vec()),
                    source: Source::new("")
                });
                Ok(())
            }
        }
    }

    /// Best-match lookup per the config/spec §4.1 ordering.
    pub fn find(&self, name: &ResourceName, target: &Configuration) -> Option<&Value> {
        self.find_package(&name.package)?.find_type(name.type_)?.find_entry(&name.entry)?.find(target)
    }

    /// Deterministic `(package-name, type-ordinal, entry-name,
    /// config-canonical-string)` iteration (spec §4.2, §5).
    pub fn enumerate(&self) -> Vec<(&ResourceTablePackage, &ResourceTableType, &ResourceEntry, &ResourceConfigValue)> {
        let mut packages: Vec<&ResourceTablePackage> = self.packages.iter().collect();
        packages.sort_by(|a, b| a.name.cmp(&b.name));

        let mut out = Vec::new();
        for package in packages {
            let mut types: Vec<&ResourceTableType> = package.types.iter().collect();
            types.sort_by_key(|t| t.type_);
            for type_ in types {
                let mut entries: Vec<&ResourceEntry> = type_.entries.iter().collect();
                entries.sort_by(|a, b| a.name.cmp(&b.name));
                for entry in entries {
                    let mut values: Vec<&ResourceConfigValue> = entry.values.iter().collect();
                    values.sort_by(|a, b| a.config.serialize().cmp(&b.config.serialize()));
                    for value in values {
                        out.push((package, type_, entry, value));
                    }
                }
            }
        }
        out
    }

    /// Reports a duplicate-definition-style conflict to `diagnostics`
    /// instead of failing the whole run immediately (spec §7).
    pub fn report_conflict(&self, diagnostics: &mut Diagnostics, source: Source, err: RescompError) {
        diagnostics.error(source, err.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rescomp_config::Configuration;

    fn name(entry: &str) -> ResourceName {
        ResourceName::new("com.x", ResourceType::String, entry).unwrap()
    }

    #[test]
    fn create_package_is_idempotent() {
        let mut table = ResourceTable::new();
        table.create_package("com.x", Some(0x7f));
        table.create_package("com.x", None);
        assert_eq!(table.packages.len(), 1);
        assert_eq!(table.packages[0].id, Some(0x7f));
    }

    #[test]
    fn find_returns_best_match_for_target() {
        let mut table = ResourceTable::new();
        table
            .add_resource(
                &name("hello"),
                Configuration::any(),
                None,
                Value::String(crate::value::StringRef { index: 0, spans: Vec::new() }),
                Source::new("v.xml"),
                OverlayPolicy::NoOverlay,
                MergeMode::Append
            )
            .unwrap();
        table
            .add_resource(
                &name("hello"),
                Configuration::parse("fr").unwrap(),
                None,
                Value::String(crate::value::StringRef { index: 1, spans: Vec::new() }),
                Source::new("v-fr.xml"),
                OverlayPolicy::NoOverlay,
                MergeMode::Append
            )
            .unwrap();

        let fr_target = Configuration::parse("fr-rFR").unwrap();
        match table.find(&name("hello"), &fr_target) {
            Some(Value::String(s)) => assert_eq!(s.index, 1),
            other => panic!("unexpected {other:?}")
        }

        let de_target = Configuration::parse("de").unwrap();
        match table.find(&name("hello"), &de_target) {
            Some(Value::String(s)) => assert_eq!(s.index, 0),
            other => panic!("unexpected {other:?}")
        }
    }

    #[test]
    fn duplicate_append_without_overlay_is_an_error() {
        let mut table = ResourceTable::new();
        let value_a = Value::String(crate::value::StringRef { index: 0, spans: Vec::new() });
        let value_b = Value::String(crate::value::StringRef { index: 1, spans: Vec::new() });
        table
            .add_resource(
                &name("x"),
                Configuration::any(),
                None,
                value_a,
                Source::new("a.xml"),
                OverlayPolicy::NoOverlay,
                MergeMode::Append
            )
            .unwrap();
        let result = table.add_resource(
            &name("x"),
            Configuration::any(),
            None,
            value_b,
            Source::new("b.xml"),
            OverlayPolicy::NoOverlay,
            MergeMode::Append
        );
        assert!(matches!(result, Err(RescompError::DuplicateDefinition(_))));
    }

    #[test]
    fn overlay_mode_replaces_when_entry_allows_it() {
        let mut table = ResourceTable::new();
        let value_a = Value::String(crate::value::StringRef { index: 0, spans: Vec::new() });
        let value_b = Value::String(crate::value::StringRef { index: 1, spans: Vec::new() });
        table
            .add_resource(
                &name("x"),
                Configuration::any(),
                None,
                value_a,
                Source::new("a.xml"),
                OverlayPolicy::AllowOverlay,
                MergeMode::Append
            )
            .unwrap();
        table
            .add_resource(
                &name("x"),
                Configuration::any(),
                None,
                value_b.clone(),
                Source::new("b.xml"),
                OverlayPolicy::AllowOverlay,
                MergeMode::Overlay
            )
            .unwrap();
        assert_eq!(table.find(&name("x"), &Configuration::any()), Some(&value_b));
    }

    #[test]
    fn enumerate_orders_by_package_type_entry_config() {
        let mut table = ResourceTable::new();
        for (entry, qualifier) in [("b", ""), ("a", ""), ("a", "fr")] {
            let config = if qualifier.is_empty() { Configuration::any() } else { Configuration::parse(qualifier).unwrap() };
            table
                .add_resource(
                    &name(entry),
                    config,
                    None,
                    Value::String(crate::value::StringRef { index: 0, spans: Vec::new() }),
                    Source::new("v.xml"),
                    OverlayPolicy::NoOverlay,
                    MergeMode::Append
                )
                .unwrap();
        }
        let order: Vec<(&str, String)> =
            table.enumerate().into_iter().map(|(_, _, entry, value)| (entry.name.as_str(), value.config.serialize())).collect();
        assert_eq!(order, vec![("a", "".to_string()), ("a", "fr".to_string()), ("b", "".to_string())]);
    }

    #[test]
    fn type_visibility_merge_prefers_stricter() {
        let mut table = ResourceTable::new();
        table.set_type_visibility("com.x", ResourceType::String, Visibility::Private);
        table.set_type_visibility("com.x", ResourceType::String, Visibility::Public);
        table.set_type_visibility("com.x", ResourceType::String, Visibility::Undefined);
        assert_eq!(table.find_package("com.x").unwrap().find_type(ResourceType::String).unwrap().visibility, Visibility::Public);
    }

    #[test]
    fn conflicting_entry_visibility_is_an_error() {
        let mut table = ResourceTable::new();
        table.set_entry_visibility(&name("x"), Visibility::Public).unwrap();
        let result = table.set_entry_visibility(&name("x"), Visibility::Private);
        assert!(matches!(result, Err(RescompError::ConflictingVisibility(_))));
    }

    #[test]
    fn conflicting_pinned_id_is_an_error() {
        let mut table = ResourceTable::new();
        table.pin_entry_id(&name("x"), ResourceId::new(0x7f, 0x01, 0x0001)).unwrap();
        let result = table.pin_entry_id(&name("x"), ResourceId::new(0x7f, 0x01, 0x0002));
        assert!(matches!(result, Err(RescompError::ConflictingPinnedId(_))));
    }

    #[test]
    fn styleable_attrs_union_preserving_first_seen_order() {
        let mut table = ResourceTable::new();
        let a = SymbolicRef::unresolved(ResourceName::new("android", ResourceType::Attr, "a").unwrap());
        let b = SymbolicRef::unresolved(ResourceName::new("android", ResourceType::Attr, "b").unwrap());
        table.union_styleable_attrs(&name("Widget"), &Configuration::any(), &None, &[a.clone()]).unwrap();
        table.union_styleable_attrs(&name("Widget"), &Configuration::any(), &None, &[a.clone(), b.clone()]).unwrap();
        match table.find(&name("Widget"), &Configuration::any()) {
            Some(Value::Styleable(attrs)) => assert_eq!(attrs, &vec![a, b]),
            other => panic!("unexpected {other:?}")
        }
    }
}
