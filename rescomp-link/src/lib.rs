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

//! The link pipeline: merge compiled tables together, resolve and assign
//! resource IDs, auto-version and dedup styled values, then filter/split
//! the result (spec.md §4.5-§4.8).

mod merge;
mod resolve;
mod split;
mod version;

pub use merge::merge_table;
pub use resolve::{assign_ids, resolve_references, SymbolTable};
pub use split::{filter_table, split_table, strip_preferred_densities, validate_disjoint, AxisFilter, SplitConstraint};
pub use version::{auto_version, dedup_versions, MIN_SDK_FOR_ATTRIBUTE};
