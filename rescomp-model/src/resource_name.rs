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

//! `ResourceName` and the enumerated `ResourceType` domain (spec §3).

use rescomp_common::{RescompError, Result};

/// The enumerated type domain a `ResourceName` can belong to. Ordinal order
/// here is also the type-chunk emission order used by the serializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceType {
    Attr,
    Id,
    String,
    Drawable,
    Layout,
    Anim,
    Animator,
    Interpolator,
    Transition,
    Color,
    Dimen,
    Bool,
    Integer,
    Fraction,
    Array,
    Plurals,
    Style,
    Styleable,
    Menu,
    Mipmap,
    Xml,
    Raw,
    Font
}

impl ResourceType {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceType::Attr => "attr",
            ResourceType::Id => "id",
            ResourceType::String => "string",
            ResourceType::Drawable => "drawable",
            ResourceType::Layout => "layout",
            ResourceType::Anim => "anim",
            ResourceType::Animator => "animator",
            ResourceType::Interpolator => "interpolator",
            ResourceType::Transition => "transition",
            ResourceType::Color => "color",
            ResourceType::Dimen => "dimen",
            ResourceType::Bool => "bool",
            ResourceType::Integer => "integer",
            ResourceType::Fraction => "fraction",
            ResourceType::Array => "array",
            ResourceType::Plurals => "plurals",
            ResourceType::Style => "style",
            ResourceType::Styleable => "styleable",
            ResourceType::Menu => "menu",
            ResourceType::Mipmap => "mipmap",
            ResourceType::Xml => "xml",
            ResourceType::Raw => "raw",
            ResourceType::Font => "font"
        }
    }

    pub fn parse(s: &str) -> Option<ResourceType> {
        Some(match s {
            "attr" => ResourceType::Attr,
            "id" => ResourceType::Id,
            "string" => ResourceType::String,
            "drawable" => ResourceType::Drawable,
            "layout" => ResourceType::Layout,
            "anim" => ResourceType::Anim,
            "animator" => ResourceType::Animator,
            "interpolator" => ResourceType::Interpolator,
            "transition" => ResourceType::Transition,
            "color" => ResourceType::Color,
            "dimen" => ResourceType::Dimen,
            "bool" => ResourceType::Bool,
            "integer" => ResourceType::Integer,
            "fraction" => ResourceType::Fraction,
            "array" | "integer-array" | "string-array" => ResourceType::Array,
            "plurals" => ResourceType::Plurals,
            "style" => ResourceType::Style,
            "styleable" => ResourceType::Styleable,
            "menu" => ResourceType::Menu,
            "mipmap" => ResourceType::Mipmap,
            "xml" => ResourceType::Xml,
            "raw" => ResourceType::Raw,
            "font" => ResourceType::Font,
            _ => return None
        })
    }
}

/// `(package, type, entry)`, the fully-qualified name of one resource
/// (spec §3). Does not carry a numeric id; that's assigned separately.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceName {
    pub package: String,
    pub type_: ResourceType,
    pub entry: String
}

impl ResourceName {
    pub fn new(package: impl Into<String>, type_: ResourceType, entry: impl Into<String>) -> Result<ResourceName> {
        let entry = entry.into();
        if !is_valid_entry_name(&entry) {
            return Err(RescompError::BadResourceName(entry));
        }
        Ok(ResourceName { package: package.into(), type_, entry })
    }

    /// `pkg:type/entry`, the form used in diagnostics and in `@pkg:type/name`
    /// reference syntax.
    pub fn to_qualified_string(&self) -> String {
        format!("{}:{}/{}", self.package, self.type_.as_str(), self.entry)
    }
}

fn is_valid_entry_name(entry: &str) -> bool {
    let mut chars = entry.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_names_starting_with_digit() {
        assert!(ResourceName::new("com.x", ResourceType::String, "1bad").is_err());
    }

    #[test]
    fn accepts_underscore_prefixed_name() {
        assert!(ResourceName::new("com.x", ResourceType::String, "_ok_123").is_ok());
    }

    #[test]
    fn qualified_string_matches_reference_syntax() {
        let name = ResourceName::new("com.x", ResourceType::String, "hello").unwrap();
        assert_eq!(name.to_qualified_string(), "com.x:string/hello");
    }
}
