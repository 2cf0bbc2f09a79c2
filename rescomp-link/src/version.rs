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

//! The auto-versioner and deduper (spec.md §4.7).

use rescomp_config::{AxisSet, Configuration};
use rescomp_model::{ResourceConfigValue, ResourceEntry, ResourceTable, Style, Value};

/// Best-effort, curated map of `android:`-namespaced attribute names to the
/// API level that introduced them. A real build sources this from the
/// framework's own compiled attr table; this is a representative subset
/// (spec.md §4.7 "minimum platform-version required by every attribute").
pub static MIN_SDK_FOR_ATTRIBUTE: phf::Map<&'static str, u16> = phf::phf_map! {
    "elevation" => 21,
    "translationZ" => 21,
    "foreground" => 23,
    "windowLightNavigationBar" => 27,
    "fontFamily" => 16,
    "colorAccent" => 21,
    "statusBarColor" => 21,
    "navigationBarColor" => 21,
    "actionBarTheme" => 21,
    "letterSpacing" => 21,
    "autoSizeTextType" => 26,
    "roundIcon" => 25,
    "forceDarkAllowed" => 29,
};

fn min_sdk_for_style(style: &Style) -> u16 {
    style.entries.iter().filter_map(|(attr, _)| MIN_SDK_FOR_ATTRIBUTE.get(attr.name.entry.as_str()).copied()).max().unwrap_or(0)
}

/// Clones every styled value whose attributes require a higher platform
/// version than its config currently declares into a config that raises
/// the version qualifier (spec.md §4.7 "Auto-versioning").
pub fn auto_version(table: &mut ResourceTable) {
    for package in &mut table.packages {
        for type_ in &mut package.types {
            for entry in &mut type_.entries {
                let bumped: Vec<ResourceConfigValue> = entry
                    .values
                    .iter()
                    .filter_map(|config_value| {
                        let Value::Style(style) = &config_value.value else { return None };
                        let required = min_sdk_for_style(style);
                        let current = config_value.config.version.unwrap_or(0);
                        if required <= current {
                            return None;
                        }
                        let mut bumped_config = config_value.config.clone();
                        bumped_config.version = Some(required);
                        Some(ResourceConfigValue {
                            config: bumped_config,
                            product: config_value.product.clone(),
                            value: config_value.value.clone(),
                            source: config_value.source.clone()
                        })
                    })
                    .collect();

                for new_value in bumped {
                    insert_with_collision_policy(entry, new_value);
                }
            }
        }
    }
}

/// Inserts `new_value` unless it collides with an already-present config
/// (same config + product). The two configs are identical once bumped, so
/// there's nothing left to rank between them; an explicit, author-provided
/// definition at that config wins over one the auto-versioner generated
/// (spec.md §4.7 "keep the higher-specificity one").
fn insert_with_collision_policy(entry: &mut ResourceEntry, new_value: ResourceConfigValue) {
    let already_present = entry.values.iter().any(|v| v.config == new_value.config && v.product == new_value.product);
    if !already_present {
        entry.values.push(new_value);
    }
}

/// Removes strictly-version-more-specific duplicates of an otherwise
/// identical value, as long as no intervening version-qualified config
/// exists between the pair (spec.md §4.7 "Deduping"). Never merges across
/// products.
pub fn dedup_versions(table: &mut ResourceTable) {
    for package in &mut table.packages {
        for type_ in &mut package.types {
            for entry in &mut type_.entries {
                dedup_entry(entry);
            }
        }
    }
}

fn dedup_entry(entry: &mut ResourceEntry) {
    let mut remove = Vec::new();
    for i in 0..entry.values.len() {
        let a = &entry.values[i];
        let a_version = a.config.version.unwrap_or(0);

        for (j, b) in entry.values.iter().enumerate() {
            if i == j || a.product != b.product || a.value != b.value {
                continue;
            }
            if a.config.diff(&b.config) != AxisSet::VERSION {
                continue;
            }
            let b_version = b.config.version.unwrap_or(0);
            if a_version <= b_version {
                continue;
            }

            let mut stripped = a.config.clone();
            stripped.version = None;
            let shadowed_by_intervening_config = entry.values.iter().any(|c| {
                let mut c_axes = c.config.clone();
                let c_version = c_axes.version.unwrap_or(0);
                c_axes.version = None;
                c_axes == stripped && c_version > b_version && c_version < a_version
            });

            if !shadowed_by_intervening_config {
                remove.push(i);
            }
            break;
        }
    }

    remove.sort_unstable();
    remove.dedup();
    for index in remove.into_iter().rev() {
        entry.values.remove(index);
    }
}

#[cfg(test)]
mod tests {
    use rescomp_common::Source;
    use rescomp_model::{MergeMode, OverlayPolicy, Primitive, ResourceName, ResourceType, SymbolicRef};

    use super::*;

    fn name(entry: &str) -> ResourceName {
        ResourceName::new("com.x", ResourceType::Style, entry).unwrap()
    }

    fn style_with(attr: &str) -> Value {
        Value::Style(Style {
            parent: None,
            entries: vec![(
                SymbolicRef::unresolved(ResourceName::new("android", ResourceType::Attr, attr).unwrap()),
                Value::Primitive(Primitive::Int(1))
            )]
        })
    }

    #[test]
    fn auto_versions_styles_requiring_a_higher_platform() {
        let mut table = ResourceTable::new();
        table
            .add_resource(
                &name("Widget"),
                Configuration::any(),
                None,
                style_with("elevation"),
                Source::new("s.xml"),
                OverlayPolicy::NoOverlay,
                MergeMode::Append
            )
            .unwrap();

        auto_version(&mut table);

        let type_ = table.find_package("com.x").unwrap().find_type(ResourceType::Style).unwrap();
        let entry = type_.find_entry("Widget").unwrap();
        assert_eq!(entry.values.len(), 2);
        assert!(entry.values.iter().any(|v| v.config.version == Some(21)));
    }

    #[test]
    fn dedup_removes_redundant_more_specific_version_with_no_intervening_config() {
        let mut table = ResourceTable::new();
        let base_config = Configuration::any();
        let mut bumped_config = base_config.clone();
        bumped_config.version = Some(21);

        table
            .add_resource(
                &name("Widget"),
                base_config,
                None,
                Value::Primitive(Primitive::Int(5)),
                Source::new("s.xml"),
                OverlayPolicy::NoOverlay,
                MergeMode::Append
            )
            .unwrap();
        table
            .add_resource(
                &name("Widget"),
                bumped_config,
                None,
                Value::Primitive(Primitive::Int(5)),
                Source::new("s-v21.xml"),
                OverlayPolicy::NoOverlay,
                MergeMode::Append
            )
            .unwrap();

        dedup_versions(&mut table);

        let type_ = table.find_package("com.x").unwrap().find_type(ResourceType::Style).unwrap();
        assert_eq!(type_.find_entry("Widget").unwrap().values.len(), 1);
    }

    #[test]
    fn dedup_keeps_value_shadowed_by_an_intervening_config() {
        let mut table = ResourceTable::new();
        let mut v15 = Configuration::any();
        v15.version = Some(15);
        let mut v21 = Configuration::any();
        v21.version = Some(21);

        table
            .add_resource(
                &name("Widget"),
                Configuration::any(),
                None,
                Value::Primitive(Primitive::Int(5)),
                Source::new("s.xml"),
                OverlayPolicy::NoOverlay,
                MergeMode::Append
            )
            .unwrap();
        table
            .add_resource(
                &name("Widget"),
                v15,
                None,
                Value::Primitive(Primitive::Int(9)),
                Source::new("s-v15.xml"),
                OverlayPolicy::NoOverlay,
                MergeMode::Append
            )
            .unwrap();
        table
            .add_resource(
                &name("Widget"),
                v21,
                None,
                Value::Primitive(Primitive::Int(5)),
                Source::new("s-v21.xml"),
                OverlayPolicy::NoOverlay,
                MergeMode::Append
            )
            .unwrap();

        dedup_versions(&mut table);

        let type_ = table.find_package("com.x").unwrap().find_type(ResourceType::Style).unwrap();
        assert_eq!(type_.find_entry("Widget").unwrap().values.len(), 3);
    }
}
