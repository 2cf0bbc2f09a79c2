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

//! Compiles a parsed XML document to the chunk-typed binary tree (spec.md
//! §4.10): attribute-id resolution, reference conversion, `aapt:attr` inline
//! extraction into sibling sub-documents, and `@+id/name` collection.

use std::collections::{HashMap, HashSet};
use std::io::Read;

use deku::DekuContainerWrite;
use rescomp_common::{RescompError, Result};
use rescomp_container::{Container, PayloadKind};
use rescomp_format::chunks::*;
use rescomp_format::generate_res_chunk;
use rescomp_format::string_pool::construct_string_pool;
use rescomp_model::StringPool;
use xml::attribute::OwnedAttribute;
use xml::reader::{EventReader, XmlEvent};

use crate::attribute_ids::{internal_attribute_format, lookup_internal_attribute_id, ANDROID_ATTRIBUTE_PACKAGE};
use crate::resolver::{parse_reference, SymbolResolver, ANDROID_NAMESPACE};

const AAPT_NAMESPACE: &str = "http://schemas.android.com/aapt";

/// Everything a compiled XML file hands back to its caller: the chunk tree
/// plus any extracted `aapt:attr` sub-documents, packaged together in one
/// container (spec.md §4.10(c)), and the exported `@+id/name` symbols
/// (spec.md §4.10(d)).
pub struct XmlCompileOutput {
    pub container: Container,
    pub exported_ids: Vec<String>
}

struct DomElement {
    namespace: Option<String>,
    prefix: Option<String>,
    name: String,
    attributes: Vec<OwnedAttribute>,
    children: Vec<DomElement>
}

fn build_dom<T: Read>(source: T) -> Result<DomElement> {
    let mut stack: Vec<DomElement> = Vec::new();
    let mut root: Option<DomElement> = None;
    for event in EventReader::new(source) {
        match event? {
            XmlEvent::StartElement { name, attributes, .. } => {
                stack.push(DomElement {
                    namespace: name.namespace,
                    prefix: name.prefix,
                    name: name.local_name,
                    attributes,
                    children: Vec::new()
                });
            }
            XmlEvent::EndElement { .. } => {
                let finished = stack.pop().expect("unbalanced XML, xml-rs should have rejected this already");
                match stack.last_mut() {
                    Some(parent) => parent.children.push(finished),
                    None => root = Some(finished)
                }
            }
            _ => {}
        }
    }
    Ok(root.expect("xml-rs accepted the document but produced no root element"))
}

fn is_aapt_attr(elem: &DomElement) -> bool {
    elem.namespace.as_deref() == Some(AAPT_NAMESPACE) && elem.name == "attr"
}

fn count_unique_android_attrs(elem: &DomElement, seen: &mut HashSet<String>) {
    for attr in &elem.attributes {
        if attr.name.prefix.as_deref() == Some("android") {
            seen.insert(attr.name.local_name.clone());
        }
    }
    for child in &elem.children {
        if !is_aapt_attr(child) {
            count_unique_android_attrs(child, seen);
        }
    }
}

/// Compiles `byte_source` as a standalone XML document, returning a
/// container whose first payload is the document itself (`ResFile`, spec.md
/// §6) followed by one payload per extracted `aapt:attr` sub-document.
pub fn compile_xml<T: Read>(byte_source: T, resolver: &dyn SymbolResolver) -> Result<XmlCompileOutput> {
    let root = build_dom(byte_source)?;
    let mut container = Container::new();
    let mut counter = 0u32;
    let mut exported_ids = Vec::new();

    let document_bytes = compile_document(&root, resolver, &mut container, &mut counter, &mut exported_ids)?;
    let chunk = generate_res_chunk(ChunkType::XmlFile, RawBytes { data: document_bytes }, 0, 0)?;

    // The primary document goes in first so consumers can find it without
    // scanning the whole container (spec.md §4.4).
    let mut payloads = vec![(PayloadKind::ResFile, chunk.to_bytes()?)];
    payloads.extend(container.payloads.drain(..).map(|p| (p.kind, p.bytes)));
    for (kind, bytes) in payloads {
        container.push(kind, bytes);
    }

    Ok(XmlCompileOutput { container, exported_ids })
}

/// Compiles one element subtree into a self-contained string-pool +
/// resource-map + node-chunk byte blob. Used both for the top-level document
/// and, recursively, for each `aapt:attr` inline sub-document.
fn compile_document(
    root: &DomElement,
    resolver: &dyn SymbolResolver,
    container: &mut Container,
    counter: &mut u32,
    exported_ids: &mut Vec<String>
) -> Result<Vec<u8>> {
    let mut unique_android_attrs = HashSet::new();
    count_unique_android_attrs(root, &mut unique_android_attrs);
    let slot_count = unique_android_attrs.len();

    let mut strings: Vec<String> = vec![String::new(); slot_count];
    let mut string_ids: HashMap<String, u32> = HashMap::new();
    let mut xml_resource_map: Vec<u32> = Vec::new();
    let mut seen_namespaces: HashSet<String> = HashSet::new();
    let mut chunks: Vec<u8> = Vec::new();

    let mut ctx = EncodeCtx {
        resolver,
        container,
        counter,
        exported_ids,
        strings: &mut strings,
        string_ids: &mut string_ids,
        xml_resource_map: &mut xml_resource_map,
        seen_namespaces: &mut seen_namespaces,
        slot_count
    };
    encode_element(root, &mut ctx, &mut chunks)?;

    while xml_resource_map.len() < slot_count {
        xml_resource_map.push(UINT32_MINUS_ONE);
    }
    let resource_map_bytes =
        generate_res_chunk(ChunkType::XmlResourceMap, XmlResourceMap { resources: xml_resource_map }, 0, 0)?
            .to_bytes()?;

    let mut pool = StringPool::new();
    for s in &strings {
        pool.intern(s);
    }
    let mut body = construct_string_pool(&pool)?.to_bytes()?;
    body.extend(resource_map_bytes);
    body.extend(chunks);
    Ok(body)
}

struct EncodeCtx<'a> {
    resolver: &'a dyn SymbolResolver,
    container: &'a mut Container,
    counter: &'a mut u32,
    exported_ids: &'a mut Vec<String>,
    strings: &'a mut Vec<String>,
    string_ids: &'a mut HashMap<String, u32>,
    xml_resource_map: &'a mut Vec<u32>,
    seen_namespaces: &'a mut HashSet<String>,
    slot_count: usize
}

impl<'a> EncodeCtx<'a> {
    fn add_or_use_string(&mut self, s: String) -> u32 {
        if let Some(id) = self.string_ids.get(&s) {
            return *id;
        }
        let id = self.strings.len() as u32;
        self.strings.push(s.clone());
        self.string_ids.insert(s, id);
        id
    }

    fn add_or_use_android_string(&mut self, s: String) -> Result<u32> {
        if let Some(id) = self.string_ids.get(&s) {
            return Ok(*id);
        }
        let slot = self.xml_resource_map.len();
        if slot >= self.slot_count {
            unreachable!("android attribute slot count was precomputed from the same tree");
        }
        let internal_id = lookup_internal_attribute_id(&s)?;
        self.xml_resource_map.push(ANDROID_ATTRIBUTE_PACKAGE | internal_id);
        self.strings[slot] = s.clone();
        self.string_ids.insert(s, slot as u32);
        Ok(slot as u32)
    }
}

fn generate_xml_chunk<T: DekuContainerWrite>(chunk_type: ChunkType, chunk: T) -> Result<Vec<u8>> {
    let node_header = XmlNodeChunk { line_number: 1, comment: UINT32_MINUS_ONE, node_data: chunk.to_bytes()? };
    Ok(generate_res_chunk(chunk_type, node_header, 8, 0)?.to_bytes()?)
}

fn encode_element(elem: &DomElement, ctx: &mut EncodeCtx, chunks: &mut Vec<u8>) -> Result<()> {
    let mut opened_namespaces = Vec::new();
    if let Some(prefix) = &elem.prefix {
        if let Some(uri) = &elem.namespace {
            if !ctx.seen_namespaces.contains(prefix) && prefix != "tools" && prefix != "xml" && prefix != "xmlns" {
                ctx.seen_namespaces.insert(prefix.clone());
                let prefix_id = ctx.add_or_use_string(prefix.clone());
                let uri_id = ctx.add_or_use_string(uri.clone());
                chunks.extend(generate_xml_chunk(
                    ChunkType::XmlStartNamespace,
                    XmlNamespaceChunk { prefix: prefix_id, uri: uri_id }
                )?);
                opened_namespaces.push((prefix_id, uri_id));
            }
        }
    }

    let (inline_attrs, real_children) = extract_inline_attrs(elem);

    let name_id = ctx.add_or_use_string(elem.name.clone());
    let mut start = XmlStartElementChunk {
        name: name_id,
        namespace: UINT32_MINUS_ONE,
        attribute_start: 0x14,
        attribute_size: 0x14,
        attribute_count: 0,
        id_index: 0,
        class_index: 0,
        style_index: 0,
        attribute_data: Vec::new()
    };
    if let Some(ns) = &elem.namespace {
        start.namespace = ctx.add_or_use_string(ns.clone());
    }

    for attr in &elem.attributes {
        if attr.name.prefix.as_deref() == Some("tools") {
            continue;
        }
        encode_attribute(&attr.name.prefix, &attr.name.local_name, attr.name.namespace.as_deref(), &attr.value, ctx, &mut start)?;
    }
    for inline in &inline_attrs {
        let value = compile_inline_attr(inline, ctx)?;
        encode_attribute(
            &inline.target_prefix,
            &inline.target_local,
            inline.target_prefix.as_deref().and_then(|p| if p == "android" { Some(ANDROID_NAMESPACE) } else { None }),
            &value,
            ctx,
            &mut start
        )?;
    }

    chunks.extend(generate_xml_chunk(ChunkType::XmlStartElement, start)?);

    for child in real_children {
        encode_element(child, ctx, chunks)?;
    }

    let end = XmlEndElementChunk {
        name: *ctx.string_ids.get(&elem.name).expect("element name was interned above"),
        namespace: elem.namespace.as_ref().map(|ns| *ctx.string_ids.get(ns).unwrap()).unwrap_or(UINT32_MINUS_ONE)
    };
    chunks.extend(generate_xml_chunk(ChunkType::XmlEndElement, end)?);

    for (prefix_id, uri_id) in opened_namespaces {
        chunks.extend(generate_xml_chunk(ChunkType::XmlEndNamespace, XmlNamespaceChunk { prefix: prefix_id, uri: uri_id })?);
    }
    Ok(())
}

struct InlineAttr<'a> {
    target_prefix: Option<String>,
    target_local: String,
    inline_child: &'a DomElement
}

/// Splits `elem`'s children into `aapt:attr` inline-value blocks and
/// ordinary child elements (spec.md §4.10(c)).
fn extract_inline_attrs(elem: &DomElement) -> (Vec<InlineAttr<'_>>, Vec<&DomElement>) {
    let mut inline = Vec::new();
    let mut real = Vec::new();
    for child in &elem.children {
        if is_aapt_attr(child) {
            if let Some(target) = child.attributes.iter().find(|a| a.name.local_name == "name") {
                if let Some((prefix, local)) = target.value.split_once(':') {
                    if let Some(inline_child) = child.children.first() {
                        inline.push(InlineAttr {
                            target_prefix: Some(prefix.to_string()),
                            target_local: local.to_string(),
                            inline_child
                        });
                    }
                }
            }
        } else {
            real.push(child);
        }
    }
    (inline, real)
}

fn compile_inline_attr(inline: &InlineAttr, ctx: &mut EncodeCtx) -> Result<String> {
    let sub_bytes = compile_document(inline.inline_child, ctx.resolver, ctx.container, ctx.counter, ctx.exported_ids)?;
    let chunk = generate_res_chunk(ChunkType::XmlFile, RawBytes { data: sub_bytes }, 0, 0)?;
    let name = format!("aapt_attr_{}", *ctx.counter);
    *ctx.counter += 1;
    ctx.container.push(PayloadKind::ResFile, chunk.to_bytes()?);
    Ok(format!("@{name}"))
}

fn encode_attribute(
    prefix: &Option<String>,
    local_name: &str,
    namespace: Option<&str>,
    value: &str,
    ctx: &mut EncodeCtx,
    start: &mut XmlStartElementChunk
) -> Result<()> {
    let is_android = prefix.as_deref() == Some("android");

    let mut attr_type = AttributeDataType::String;
    if let Some(reference) = value.strip_prefix('@') {
        attr_type = AttributeDataType::Reference;
        if reference.starts_with('+') {
            let parsed = parse_reference(value)?;
            if parsed.is_new_id {
                let qualified = match &parsed.package {
                    Some(pkg) => format!("{pkg}:{}/{}", parsed.type_name, parsed.entry_name),
                    None => format!("{}/{}", parsed.type_name, parsed.entry_name)
                };
                ctx.exported_ids.push(qualified);
            }
        }
    } else if is_android && internal_attribute_format(local_name).contains(rescomp_model::AttributeFormat::INTEGER) {
        attr_type = AttributeDataType::DecimalInteger;
    } else if is_android && internal_attribute_format(local_name).contains(rescomp_model::AttributeFormat::BOOLEAN) {
        attr_type = AttributeDataType::BooleanInteger;
    }

    let name_id = if is_android { ctx.add_or_use_android_string(local_name.to_string())? } else { ctx.add_or_use_string(local_name.to_string()) };
    let namespace_id = match namespace {
        Some(ns) => ctx.add_or_use_string(ns.to_string()),
        None => UINT32_MINUS_ONE
    };

    let value_id = if attr_type == AttributeDataType::String { ctx.add_or_use_string(value.to_string()) } else { UINT32_MINUS_ONE };

    let data = match attr_type {
        AttributeDataType::Reference => {
            let parsed = parse_reference(value)?;
            let resolved = ctx.resolver.resolve_reference(parsed.package.as_deref(), &parsed.type_name, &parsed.entry_name);
            resolved.id.map(|id| id.0).unwrap_or(0)
        }
        AttributeDataType::String => value_id,
        AttributeDataType::DecimalInteger => {
            value.parse::<u32>().map_err(|_| RescompError::IntegerAttributeParsingFailed(value.to_string()))?
        }
        AttributeDataType::BooleanInteger => u32::from(value == "true"),
        _ => 0
    };
    let typed_value = ResValue { size: 8, res0: 0, data_type: attr_type, data };
    let attr_chunk = XmlAttributeChunk { namespace: namespace_id, name: name_id, raw_value: value_id, typed_value };
    start.attribute_data.extend(attr_chunk.to_bytes()?);
    start.attribute_count += 1;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::DeferredResolver;

    #[test]
    fn compiles_simple_element_with_android_attribute() {
        let xml = r#"<View xmlns:android="http://schemas.android.com/apk/res/android" android:id="@+id/submit" />"#;
        let output = compile_xml(xml.as_bytes(), &DeferredResolver).unwrap();
        assert_eq!(output.exported_ids, vec!["id/submit".to_string()]);
        assert_eq!(output.container.payloads.len(), 1);
    }

    #[test]
    fn extracts_aapt_attr_into_its_own_payload() {
        let xml = r#"<View xmlns:android="http://schemas.android.com/apk/res/android"
                            xmlns:aapt="http://schemas.android.com/aapt">
                        <aapt:attr name="android:drawable">
                          <vector android:width="24dp" />
                        </aapt:attr>
                      </View>"#;
        let output = compile_xml(xml.as_bytes(), &DeferredResolver).unwrap();
        assert_eq!(output.container.payloads.len(), 2);
    }

    #[test]
    fn rejects_unterminated_document() {
        assert!(compile_xml("<a>".as_bytes(), &DeferredResolver).is_err());
    }
}
