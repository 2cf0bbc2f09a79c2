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

//! The XML compiler interface (spec.md §4.10): DOM -> compiled binary XML
//! tree, with attribute-id resolution, `aapt:attr` inline extraction and
//! `@+id/name` collection.

mod attribute_ids;
mod compiler;
mod resolver;

pub use attribute_ids::{internal_attribute_format, lookup_internal_attribute_id, ANDROID_ATTRIBUTE_PACKAGE};
pub use compiler::{compile_xml, XmlCompileOutput};
pub use resolver::{parse_reference, DeferredResolver, ParsedReference, SymbolResolver, ANDROID_NAMESPACE};
