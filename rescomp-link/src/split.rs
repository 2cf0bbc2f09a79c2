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

//! The table splitter and axis filter (spec.md §4.8), ported from
//! `filter/ConfigFilter.cpp`'s `AxisConfigFilter` and
//! `split/TableSplitter.cpp`'s `SplitTable`.

use rescomp_common::{RescompError, Result};
use rescomp_config::{AxisSet, Configuration, Density};
use rescomp_model::{ResourceTable, ResourceTableType};

/// Matches configurations against a set of per-axis accepted patterns
/// (spec.md §4.8 "Filter"). Density and platform-version are excluded from
/// the diff mask: density has its own `--preferred-density`-style handling
/// and version is never user-filterable.
#[derive(Debug, Default)]
pub struct AxisFilter {
    configs: Vec<(Configuration, AxisSet)>,
    config_mask: AxisSet
}

impl AxisFilter {
    pub fn new() -> AxisFilter {
        AxisFilter::default()
    }

    pub fn add_config(&mut self, mut config: Configuration) {
        let mut diff_mask = Configuration::any().diff(&config);
        diff_mask.remove(AxisSet::VERSION);
        if diff_mask.contains(AxisSet::DENSITY) {
            config.density = None;
            diff_mask.remove(AxisSet::DENSITY);
        }
        self.config_mask |= diff_mask;
        self.configs.push((config, diff_mask));
    }

    /// A configuration passes when each axis the filter constrains is
    /// either unset on `config` or compatible with an accepted pattern.
    pub fn matches(&self, config: &Configuration) -> bool {
        let mask = Configuration::any().diff(config);
        if (self.config_mask & mask).is_empty() {
            return true;
        }

        let mut matched_axis = AxisSet::empty();
        for (target, diff_mask) in &self.configs {
            let diff = target.diff(config);
            if (diff & *diff_mask).is_empty() {
                matched_axis |= *diff_mask;
            } else if (diff & *diff_mask) == AxisSet::LOCALE {
                // A language-only filter entry accepts any region of that
                // language (spec.md §4.8, ConfigFilter.cpp locale special case).
                let language_matches = match (&target.locale.language, &config.locale.language) {
                    (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
                    _ => false
                };
                if language_matches && config.locale.region.is_none() {
                    matched_axis |= AxisSet::LOCALE;
                }
            }
        }
        matched_axis == (self.config_mask & mask)
    }
}

/// Drops every value whose configuration the filter rejects.
pub fn filter_table(table: &mut ResourceTable, filter: &AxisFilter) {
    for package in &mut table.packages {
        for type_ in &mut package.types {
            for entry in &mut type_.entries {
                entry.values.retain(|v| filter.matches(&v.config));
            }
        }
    }
}

/// One `--split` target: a name and the set of configurations it claims
/// (spec.md §4.8 "Split").
pub struct SplitConstraint {
    pub name: String,
    pub configs: Vec<Configuration>
}

impl SplitConstraint {
    /// The archive-safe name derived from the constraint's qualifiers
    /// (spec.md §4.8 "a synthesized safe name").
    pub fn safe_name(&self) -> String {
        self.name.replace('-', "_").replace('+', "_")
    }
}

/// Checks that no configuration appears in more than one constraint
/// (spec.md §4.8 "Constraints must be pairwise disjoint").
pub fn validate_disjoint(constraints: &[SplitConstraint]) -> Result<()> {
    for i in 0..constraints.len() {
        for j in (i + 1)..constraints.len() {
            for config in &constraints[i].configs {
                if constraints[j].configs.contains(config) {
                    return Err(RescompError::OverlappingSplitConstraint(config.serialize()));
                }
            }
        }
    }
    Ok(())
}

fn density_free(config: &Configuration) -> Configuration {
    let mut stripped = config.clone();
    stripped.density = None;
    stripped
}

/// Moves every value claimed by a constraint out of `base` and into a
/// freshly built split table, one per constraint, in the order given
/// (spec.md §4.8 "Split"). Call [validate_disjoint] first.
pub fn split_table(base: &mut ResourceTable, constraints: &[SplitConstraint]) -> Vec<(String, ResourceTable)> {
    let mut splits = Vec::new();

    for constraint in constraints {
        let mut split_table = ResourceTable::new();
        split_table.string_pool = base.string_pool.clone();
        split_table.styled_string_pool = base.styled_string_pool.clone();

        for package in &mut base.packages {
            let package_name = package.name.clone();
            let package_id = package.id;
            for type_ in &mut package.types {
                claim_into_split(type_, constraint, &package_name, package_id, &mut split_table);
            }
        }

        splits.push((constraint.safe_name(), split_table));
    }

    splits
}

fn claim_into_split(
    type_: &mut ResourceTableType,
    constraint: &SplitConstraint,
    package_name: &str,
    package_id: Option<u8>,
    split_table: &mut ResourceTable
) {
    let package = split_table.create_package(package_name, package_id);
    let split_type = package.get_or_create_type(type_.type_);
    split_type.id = type_.id;
    split_type.visibility = type_.visibility;

    for entry in &mut type_.entries {
        // Group by density-free configuration: a group is claimed wholesale
        // if its density-free config is explicitly listed, or per-value if
        // the constraint asks for a specific density within the group.
        let mut claimed_indices = Vec::new();

        for (index, value) in entry.values.iter().enumerate() {
            let stripped = density_free(&value.config);
            let group_claimed = constraint.configs.iter().any(|c| density_free(c) == stripped && c.density.is_none());
            if group_claimed {
                claimed_indices.push(index);
                continue;
            }

            for target in &constraint.configs {
                if density_free(target) != stripped || target.density.is_none() {
                    continue;
                }
                // Best match within this density-free group for this exact
                // requested density-qualified configuration.
                let is_best = entry
                    .values
                    .iter()
                    .enumerate()
                    .filter(|(_, v)| density_free(&v.config) == stripped)
                    .filter(|(_, v)| v.config.matches(target))
                    .all(|(other_index, other)| other_index == index || !other.config.is_better_than(&value.config, target));
                if is_best && value.config.matches(target) {
                    claimed_indices.push(index);
                }
            }
        }

        claimed_indices.sort_unstable();
        claimed_indices.dedup();
        if claimed_indices.is_empty() {
            continue;
        }

        let split_entry = split_type.get_or_create_entry(&entry.name);
        split_entry.id = entry.id;
        split_entry.visibility = entry.visibility;
        split_entry.overlay_policy = entry.overlay_policy;
        let mut claimed_values = Vec::with_capacity(claimed_indices.len());
        for &index in claimed_indices.iter().rev() {
            claimed_values.push(entry.values.remove(index));
        }
        claimed_values.reverse();
        split_entry.values.extend(claimed_values);
    }
}

/// Preferred-density stripping: within each density group, keep only the
/// best match for each preferred density and drop the rest. Runs after
/// split-claiming against whatever remains in `base` (spec.md §4.8,
/// matching `TableSplitter.cpp`'s `SplitTable` call order).
pub fn strip_preferred_densities(table: &mut ResourceTable, preferred: &[Density]) {
    if preferred.is_empty() {
        return;
    }

    for package in &mut table.packages {
        for type_ in &mut package.types {
            for entry in &mut type_.entries {
                let mut keep = vec![false; entry.values.len()];

                let mut groups: Vec<Configuration> = Vec::new();
                for value in &entry.values {
                    let stripped = density_free(&value.config);
                    if !groups.contains(&stripped) {
                        groups.push(stripped);
                    }
                }

                for group in &groups {
                    for density in preferred {
                        let mut target = group.clone();
                        target.density = Some(*density);

                        let mut best: Option<usize> = None;
                        for (index, value) in entry.values.iter().enumerate() {
                            if &density_free(&value.config) != group || !value.config.matches(&target) {
                                continue;
                            }
                            best = match best {
                                None => Some(index),
                                Some(current) if value.config.is_better_than(&entry.values[current].config, &target) => Some(index),
                                Some(current) => Some(current)
                            };
                        }
                        if let Some(index) = best {
                            keep[index] = true;
                        }
                    }
                    // Density-independent values in the group always survive.
                    for (index, value) in entry.values.iter().enumerate() {
                        if &density_free(&value.config) == group && value.config.density.is_none() {
                            keep[index] = true;
                        }
                    }
                }

                let mut index = 0;
                entry.values.retain(|_| {
                    let keep_this = keep[index];
                    index += 1;
                    keep_this
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rescomp_common::Source;
    use rescomp_model::{MergeMode, OverlayPolicy, Primitive, ResourceName, ResourceType, Value};

    use super::*;

    fn name(entry: &str) -> ResourceName {
        ResourceName::new("com.x", ResourceType::Drawable, entry).unwrap()
    }

    fn with_density(density: Density) -> Configuration {
        let mut config = Configuration::any();
        config.density = Some(density);
        config
    }

    fn add(table: &mut ResourceTable, config: Configuration, value: i32) {
        table
            .add_resource(
                &name("icon"),
                config,
                None,
                Value::Primitive(Primitive::Int(value)),
                Source::new("icon.png"),
                OverlayPolicy::NoOverlay,
                MergeMode::Append
            )
            .unwrap();
    }

    #[test]
    fn filter_drops_values_on_a_rejected_axis() {
        let mut table = ResourceTable::new();
        let mut en = Configuration::any();
        en.locale.language = Some("en".into());
        let mut fr = Configuration::any();
        fr.locale.language = Some("fr".into());
        add(&mut table, en.clone(), 1);
        add(&mut table, fr, 2);

        let mut filter = AxisFilter::new();
        filter.add_config(en);
        filter_table(&mut table, &filter);

        let type_ = table.find_package("com.x").unwrap().find_type(ResourceType::Drawable).unwrap();
        assert_eq!(type_.find_entry("icon").unwrap().values.len(), 1);
    }

    #[test]
    fn overlapping_constraints_are_rejected() {
        let shared = with_density(Density::Hdpi);
        let constraints = vec![
            SplitConstraint { name: "a".into(), configs: vec![shared.clone()] },
            SplitConstraint { name: "b".into(), configs: vec![shared] },
        ];
        assert!(validate_disjoint(&constraints).is_err());
    }

    #[test]
    fn split_moves_claimed_density_wholesale_out_of_base() {
        let mut table = ResourceTable::new();
        add(&mut table, with_density(Density::Hdpi), 1);
        add(&mut table, with_density(Density::Xhdpi), 2);

        let constraints = vec![SplitConstraint { name: "hdpi".into(), configs: vec![with_density(Density::Hdpi)] }];
        let splits = split_table(&mut table, &constraints);

        let base_type = table.find_package("com.x").unwrap().find_type(ResourceType::Drawable).unwrap();
        assert_eq!(base_type.find_entry("icon").unwrap().values.len(), 1);

        let (name, split) = &splits[0];
        assert_eq!(name, "hdpi");
        let split_type = split.find_package("com.x").unwrap().find_type(ResourceType::Drawable).unwrap();
        assert_eq!(split_type.find_entry("icon").unwrap().values.len(), 1);
    }

    #[test]
    fn strip_preferred_densities_keeps_only_best_match_per_group() {
        let mut table = ResourceTable::new();
        add(&mut table, with_density(Density::Mdpi), 1);
        add(&mut table, with_density(Density::Hdpi), 2);
        add(&mut table, with_density(Density::Xhdpi), 3);

        strip_preferred_densities(&mut table, &[Density::Hdpi]);

        let type_ = table.find_package("com.x").unwrap().find_type(ResourceType::Drawable).unwrap();
        assert_eq!(type_.find_entry("icon").unwrap().values.len(), 1);
    }

    #[test]
    fn safe_name_replaces_hyphens_and_plus_signs() {
        let constraint = SplitConstraint { name: "en-rUS+xhdpi".into(), configs: Vec::new() };
        assert_eq!(constraint.safe_name(), "en_rUS_xhdpi");
    }
}
