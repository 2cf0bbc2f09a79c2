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

//! The `Value` sum type (spec §3, §9 "tagged union with a visitor interface").

use crate::resource_id::ResourceId;
use crate::resource_name::ResourceName;

/// A typed primitive bit pattern, mirroring `Res_value`'s data types.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Bool(bool),
    Int(i32),
    /// ARGB8888 packed into a u32.
    Color(u32),
    Float(f32),
    /// A fixed-point fraction; `is_parent_relative` selects `%p` vs `%`.
    Fraction { value: f32, is_parent_relative: bool },
    /// A dimension value plus its unit (dp/sp/px/pt/in/mm), encoded as a
    /// `TypedValue`-style unit tag so the serializer can round-trip it.
    Dimension { value: f32, unit: DimensionUnit }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionUnit {
    Px,
    Dp,
    Sp,
    Pt,
    In,
    Mm
}

/// A reference to another resource, optionally already resolved to a
/// concrete id (spec §3 "symbolic reference").
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolicRef {
    pub name: ResourceName,
    pub id: Option<ResourceId>,
    pub private: bool
}

impl SymbolicRef {
    pub fn unresolved(name: ResourceName) -> SymbolicRef {
        SymbolicRef { name, id: None, private: false }
    }

    pub fn is_resolved(&self) -> bool {
        self.id.is_some()
    }
}

/// A reference to an interned, possibly-styled string.
#[derive(Debug, Clone, PartialEq)]
pub struct StringRef {
    pub index: u32,
    pub spans: Vec<Span>
}

/// One styled-span annotation, `(tag, first-char, last-char)` per spec §4.3.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub tag: String,
    pub first_char: u32,
    pub last_char: u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Png,
    Xml,
    ProtoXml,
    Raw
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileRef {
    pub path: String,
    pub kind: FileKind
}

/// Bitmask of the `android:format` flag set an `<attr>` declares, e.g.
/// `reference|color`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttributeFormat(pub u32);

impl AttributeFormat {
    pub const REFERENCE: AttributeFormat = AttributeFormat(1 << 0);
    pub const STRING: AttributeFormat = AttributeFormat(1 << 1);
    pub const INTEGER: AttributeFormat = AttributeFormat(1 << 2);
    pub const BOOLEAN: AttributeFormat = AttributeFormat(1 << 3);
    pub const COLOR: AttributeFormat = AttributeFormat(1 << 4);
    pub const FLOAT: AttributeFormat = AttributeFormat(1 << 5);
    pub const DIMENSION: AttributeFormat = AttributeFormat(1 << 6);
    pub const FRACTION: AttributeFormat = AttributeFormat(1 << 7);
    pub const ENUM: AttributeFormat = AttributeFormat(1 << 8);
    pub const FLAGS: AttributeFormat = AttributeFormat(1 << 9);

    pub fn contains(self, other: AttributeFormat) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn union(self, other: AttributeFormat) -> AttributeFormat {
        AttributeFormat(self.0 | other.0)
    }
}

/// One `<enum>`/`<flag>` symbol declared on an `<attr>`.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSymbol {
    pub name: String,
    pub value: u32
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDef {
    pub format: AttributeFormat,
    pub symbols: Vec<AttributeSymbol>
}

#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub parent: Option<SymbolicRef>,
    /// Ordered `(attr-ref, value)` pairs; order matters for styleable union
    /// (spec §4.5 rule 5) and must be preserved through merges.
    pub entries: Vec<(SymbolicRef, Value)>
}

/// A plural quantity bucket per CLDR's plural-rule categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Quantity {
    Zero,
    One,
    Two,
    Few,
    Many,
    Other
}

/// The resource value sum type (spec §3 "Value variants").
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Primitive(Primitive),
    String(StringRef),
    File(FileRef),
    Reference(SymbolicRef),
    Attribute(AttributeDef),
    Style(Style),
    Array(Vec<Value>),
    Plurals(Vec<(Quantity, Value)>),
    /// An ordered list of attribute references a `<declare-styleable>`
    /// declares, defining the set of attrs a custom view accepts.
    Styleable(Vec<SymbolicRef>)
}

impl Value {
    /// Every `SymbolicRef` reachable from this value, for reference
    /// resolution (spec §4.6) and dangling-reference detection.
    pub fn referenced_symbols(&self) -> Vec<&SymbolicRef> {
        match self {
            Value::Reference(r) => vec![r],
            Value::Style(style) => {
                let mut refs: Vec<&SymbolicRef> = style.parent.iter().collect();
                for (attr, value) in &style.entries {
                    refs.push(attr);
                    refs.extend(value.referenced_symbols());
                }
                refs
            }
            Value::Array(values) => values.iter().flat_map(Value::referenced_symbols).collect(),
            Value::Plurals(entries) => entries.iter().flat_map(|(_, v)| v.referenced_symbols()).collect(),
            Value::Styleable(attrs) => attrs.iter().collect(),
            Value::Primitive(_) | Value::String(_) | Value::File(_) | Value::Attribute(_) => Vec::new()
        }
    }

    /// Visits every `SymbolicRef` reachable from this value, allowing the
    /// reference resolver to fill in `id` in place (spec §4.6).
    pub fn resolve_symbols_mut(&mut self, resolve: &mut impl FnMut(&mut SymbolicRef)) {
        match self {
            Value::Reference(r) => resolve(r),
            Value::Style(style) => {
                if let Some(parent) = &mut style.parent {
                    resolve(parent);
                }
                for (attr, value) in &mut style.entries {
                    resolve(attr);
                    value.resolve_symbols_mut(resolve);
                }
            }
            Value::Array(values) => values.iter_mut().for_each(|v| v.resolve_symbols_mut(resolve)),
            Value::Plurals(entries) => entries.iter_mut().for_each(|(_, v)| v.resolve_symbols_mut(resolve)),
            Value::Styleable(attrs) => attrs.iter_mut().for_each(resolve),
            Value::Primitive(_) | Value::String(_) | Value::File(_) | Value::Attribute(_) => {}
        }
    }

    /// Deep-copies this value, re-interning any pooled string indices via
    /// `reintern` (spec §3 invariant 5, §5 "Shared resources").
    pub fn clone_into_pool(&self, reintern: &mut impl FnMut(u32) -> u32) -> Value {
        match self {
            Value::String(s) => Value::String(StringRef { index: reintern(s.index), spans: s.spans.clone() }),
            Value::Style(style) => Value::Style(Style {
                parent: style.parent.clone(),
                entries: style
                    .entries
                    .iter()
                    .map(|(attr, value)| (attr.clone(), value.clone_into_pool(reintern)))
                    .collect()
            }),
            Value::Array(values) => Value::Array(values.iter().map(|v| v.clone_into_pool(reintern)).collect()),
            Value::Plurals(entries) => {
                Value::Plurals(entries.iter().map(|(q, v)| (*q, v.clone_into_pool(reintern))).collect())
            }
            other => other.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource_name::ResourceType;

    #[test]
    fn style_exposes_parent_and_entry_refs() {
        let parent = SymbolicRef::unresolved(ResourceName::new("com.x", ResourceType::Style, "Parent").unwrap());
        let attr = SymbolicRef::unresolved(ResourceName::new("android", ResourceType::Attr, "textColor").unwrap());
        let style = Value::Style(Style {
            parent: Some(parent.clone()),
            entries: vec![(attr.clone(), Value::Primitive(Primitive::Color(0xff112233)))]
        });
        let refs = style.referenced_symbols();
        assert_eq!(refs.len(), 2);
        assert!(refs.contains(&&parent));
        assert!(refs.contains(&&attr));
    }

    #[test]
    fn resolve_symbols_mut_fills_in_every_reference() {
        let mut style = Value::Style(Style {
            parent: Some(SymbolicRef::unresolved(ResourceName::new("com.x", ResourceType::Style, "Parent").unwrap())),
            entries: vec![(
                SymbolicRef::unresolved(ResourceName::new("android", ResourceType::Attr, "textColor").unwrap()),
                Value::Primitive(Primitive::Color(0xff000000))
            )]
        });
        style.resolve_symbols_mut(&mut |r| r.id = Some(ResourceId::new(0x7f, 0x01, 0x0001)));
        assert_eq!(style.referenced_symbols().iter().filter(|r| r.is_resolved()).count(), 2);
    }

    #[test]
    fn attribute_format_is_a_bitmask() {
        let format = AttributeFormat::REFERENCE.union(AttributeFormat::COLOR);
        assert!(format.contains(AttributeFormat::COLOR));
        assert!(!format.contains(AttributeFormat::STRING));
    }
}
