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

//! The in-memory resource data model: names, ids, values and the
//! package/type/entry table that holds them.

mod resource_id;
mod resource_name;
mod string_pool;
mod table;
mod value;

pub use resource_id::{ResourceId, APPLICATION_PACKAGE_ID, FRAMEWORK_PACKAGE_ID, SHARED_LIBRARY_PACKAGE_ID};
pub use resource_name::{ResourceName, ResourceType};
pub use string_pool::{PoolEntry, StringPool};
pub use table::{
    MergeMode, OverlayPolicy, ResourceConfigValue, ResourceEntry, ResourceTable, ResourceTablePackage,
    ResourceTableType, Visibility
};
pub use value::{
    AttributeDef, AttributeFormat, AttributeSymbol, DimensionUnit, FileKind, FileRef, Primitive, Quantity, Span,
    StringRef, Style, SymbolicRef, Value
};
