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

//! The table merger (spec.md §4.5): folds an incoming table into a base
//! table under append or overlay semantics.

use rescomp_common::Diagnostics;
use rescomp_model::{MergeMode, ResourceName, ResourceTable, Value};

/// Merges every package/type/entry/value in `incoming` into `base`,
/// reporting per-resource conflicts to `diagnostics` instead of aborting
/// the whole run (spec.md §5 "accumulate-then-report").
pub fn merge_table(base: &mut ResourceTable, incoming: &ResourceTable, mode: MergeMode, diagnostics: &mut Diagnostics) {
    for package in &incoming.packages {
        base.create_package(&package.name, package.id);

        for type_ in &package.types {
            base.set_type_visibility(&package.name, type_.type_, type_.visibility);

            for entry in &type_.entries {
                let name = ResourceName { package: package.name.clone(), type_: type_.type_, entry: entry.name.clone() };

                if let Err(err) = base.set_entry_visibility(&name, entry.visibility) {
                    diagnostics.error(entry_source(entry), err.to_string());
                }
                if let Some(id) = entry.id {
                    if let Err(err) = base.pin_entry_id(&name, id) {
                        diagnostics.error(entry_source(entry), err.to_string());
                    }
                }

                for config_value in &entry.values {
                    match &config_value.value {
                        // Styleables union their attr-ref list rather than
                        // replacing it, so library declare-styleables extend
                        // cleanly (spec.md §4.5 step 5).
                        Value::Styleable(attrs) => {
                            if let Err(err) =
                                base.union_styleable_attrs(&name, &config_value.config, &config_value.product, attrs)
                            {
                                diagnostics.error(config_value.source.clone(), err.to_string());
                            }
                        }
                        _ => {
                            let value = config_value
                                .value
                                .clone_into_pool(&mut |index| base.string_pool.intern_from(&incoming.string_pool, index));
                            if let Err(err) = base.add_resource(
                                &name,
                                config_value.config.clone(),
                                config_value.product.clone(),
                                value,
                                config_value.source.clone(),
                                entry.overlay_policy,
                                mode
                            ) {
                                diagnostics.error(config_value.source.clone(), err.to_string());
                            }
                        }
                    }
                }
            }
        }
    }
}

fn entry_source(entry: &rescomp_model::ResourceEntry) -> rescomp_common::Source {
    entry.values.first().map(|v| v.source.clone()).unwrap_or_else(|| rescomp_common::Source::new(""))
}

#[cfg(test)]
mod tests {
    use rescomp_common::Source;
    use rescomp_config::Configuration;
    use rescomp_model::{OverlayPolicy, ResourceType, StringRef, SymbolicRef};

    use super::*;

    fn name(entry: &str) -> ResourceName {
        ResourceName::new("com.x", ResourceType::String, entry).unwrap()
    }

    #[test]
    fn append_merges_distinct_resources_without_conflict() {
        let mut base = ResourceTable::new();
        let mut incoming = ResourceTable::new();
        let index = incoming.string_pool.intern("hi");
        incoming
            .add_resource(
                &name("hello"),
                Configuration::any(),
                None,
                Value::String(StringRef { index, spans: Vec::new() }),
                Source::new("v.xml"),
                OverlayPolicy::NoOverlay,
                MergeMode::Append
            )
            .unwrap();

        let mut diagnostics = Diagnostics::default();
        merge_table(&mut base, &incoming, MergeMode::Append, &mut diagnostics);
        assert!(!diagnostics.has_errors());
        match base.find(&name("hello"), &Configuration::any()) {
            Some(Value::String(s)) => assert_eq!(base.string_pool.get(s.index).unwrap().value, "hi"),
            other => panic!("unexpected {other:?}")
        }
    }

    #[test]
    fn conflicting_append_is_reported_not_fatal() {
        let mut base = ResourceTable::new();
        base.add_resource(
            &name("hello"),
            Configuration::any(),
            None,
            Value::String(StringRef { index: 0, spans: Vec::new() }),
            Source::new("a.xml"),
            OverlayPolicy::NoOverlay,
            MergeMode::Append
        )
        .unwrap();

        let mut incoming = ResourceTable::new();
        let index = incoming.string_pool.intern("different");
        incoming
            .add_resource(
                &name("hello"),
                Configuration::any(),
                None,
                Value::String(StringRef { index, spans: Vec::new() }),
                Source::new("b.xml"),
                OverlayPolicy::NoOverlay,
                MergeMode::Append
            )
            .unwrap();

        let mut diagnostics = Diagnostics::default();
        merge_table(&mut base, &incoming, MergeMode::Append, &mut diagnostics);
        assert!(diagnostics.has_errors());
    }

    #[test]
    fn styleable_union_preserves_first_seen_order_across_merge() {
        let mut base = ResourceTable::new();
        let a = SymbolicRef::unresolved(ResourceName::new("android", ResourceType::Attr, "a").unwrap());
        base.union_styleable_attrs(&name("Widget"), &Configuration::any(), &None, &[a.clone()]).unwrap();

        let mut incoming = ResourceTable::new();
        let b = SymbolicRef::unresolved(ResourceName::new("android", ResourceType::Attr, "b").unwrap());
        incoming.union_styleable_attrs(&name("Widget"), &Configuration::any(), &None, &[a.clone(), b.clone()]).unwrap();

        let mut diagnostics = Diagnostics::default();
        merge_table(&mut base, &incoming, MergeMode::Append, &mut diagnostics);
        match base.find(&name("Widget"), &Configuration::any()) {
            Some(Value::Styleable(attrs)) => assert_eq!(attrs, &vec![a, b]),
            other => panic!("unexpected {other:?}")
        }
    }
}
