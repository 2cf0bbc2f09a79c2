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

//! Serializes a [rescomp_model::ResourceTable] to the chunk-typed binary
//! format (spec §4.3): a root `Table` chunk holding a shared string pool and
//! one `TablePackage` chunk per package, each with a `TableTypeSpec` and one
//! `TableType` per distinct configuration in use.

use std::collections::BTreeSet;

use deku::DekuContainerWrite;
use rescomp_common::{RescompError, Result};
use rescomp_config::Configuration;
use rescomp_model::{Primitive, ResourceTable, ResourceTablePackage, ResourceTableType, Value};

use crate::chunks::*;
use crate::generate_res_chunk;
use crate::string_pool::construct_string_pool;

pub fn construct_resource_table(table: &ResourceTable) -> Result<ResChunk> {
    let mut data: Vec<u8> = Vec::new();
    data.extend(TableHeaderChunk { package_count: table.packages.len() as u32 }.to_bytes()?);

    let shared_pool = construct_string_pool(&table.string_pool)?.to_bytes()?;
    data.extend(shared_pool);

    for package in &table.packages {
        data.extend(construct_package_chunk(package)?);
    }

    generate_res_chunk(ChunkType::Table, RawBytes { data }, 4, 0)
}

/// Returns the fully-formed `TablePackage` chunk bytes (header, fixed
/// fields, then the type/key string pools and type chunks).
fn construct_package_chunk(package: &ResourceTablePackage) -> Result<Vec<u8>> {
    let package_id = package.id.unwrap_or(rescomp_model::APPLICATION_PACKAGE_ID) as u32;

    let type_names: Vec<String> = package.types.iter().map(|t| t.type_.as_str().to_string()).collect();
    let mut type_pool = rescomp_model::StringPool::new();
    for name in &type_names {
        type_pool.intern(name);
    }
    let type_string_pool = construct_string_pool(&type_pool)?.to_bytes()?;

    let mut key_pool = rescomp_model::StringPool::new();
    for type_ in &package.types {
        for entry in &type_.entries {
            key_pool.intern(&entry.name);
        }
    }
    let key_string_pool = construct_string_pool(&key_pool)?.to_bytes()?;

    let mut type_data: Vec<u8> = Vec::new();
    for (i, type_) in package.types.iter().enumerate() {
        // 1-based type id, matching the type-string-pool index.
        let type_id = (i + 1) as u8;
        type_data.extend(construct_type_spec_chunk(type_, type_id)?.to_bytes()?);
        type_data.extend(construct_type_chunks(type_, type_id, &key_pool)?);
    }

    let header_size: u16 = 0x120 - 8;
    let chunk_size_after_header = (type_string_pool.len() + key_string_pool.len() + type_data.len()) as u32;
    let package_chunk = generate_res_chunk(
        ChunkType::TablePackage,
        TablePackageChunk {
            id: package_id,
            name: padded_package_name_utf16(&package.name)?,
            type_string_offset: 0x120,
            last_public_type: 0,
            key_string_offset: 0x120 + type_string_pool.len() as u32,
            last_public_key: 0,
            type_id_offset: 0
        },
        header_size,
        chunk_size_after_header
    )?;

    let mut out = package_chunk.to_bytes()?;
    out.extend(type_string_pool);
    out.extend(key_string_pool);
    out.extend(type_data);
    Ok(out)
}

fn construct_type_spec_chunk(type_: &ResourceTableType, type_id: u8) -> Result<ResChunk> {
    let entry_count = type_.entries.len() as u32;
    let flags: Vec<u32> = type_
        .entries
        .iter()
        .map(|entry| {
            let mut configs: Vec<&Configuration> = entry.values.iter().map(|v| &v.config).collect();
            configs.dedup();
            configs.windows(2).fold(0u32, |acc, pair| acc | pair[0].diff(pair[1]).bits())
        })
        .collect();
    let chunk = TableTypeSpecChunk { id: type_id, res0: 0, types_count: 0, entry_count, configuration_change_flags: flags };
    generate_res_chunk(ChunkType::TableTypeSpec, chunk, 8, 0)
}

/// One `TableType` chunk per distinct configuration used by any entry of
/// this type, each holding an offset table plus inline compact/complex
/// entries.
fn construct_type_chunks(
    type_: &ResourceTableType,
    type_id: u8,
    key_pool: &rescomp_model::StringPool
) -> Result<Vec<u8>> {
    let mut configs: BTreeSet<String> = BTreeSet::new();
    for entry in &type_.entries {
        for value in &entry.values {
            configs.insert(value.config.serialize());
        }
    }
    if configs.is_empty() {
        configs.insert(String::new());
    }

    let mut out = Vec::new();
    for config_key in configs {
        let config = if config_key.is_empty() { Configuration::any() } else { Configuration::parse(&config_key)? };

        let mut entry_bytes: Vec<u8> = Vec::new();
        let mut offsets: Vec<u32> = Vec::with_capacity(type_.entries.len());
        for entry in &type_.entries {
            let key_index = key_pool_index(key_pool, &entry.name);
            let found = entry.values.iter().find(|v| v.config.serialize() == config.serialize());
            match found {
                Some(resource_value) => {
                    offsets.push(entry_bytes.len() as u32);
                    entry_bytes.extend(encode_entry(key_index, &resource_value.value)?);
                }
                None => offsets.push(UINT32_MINUS_ONE)
            }
        }

        let type_chunk = TableTypeChunk {
            id: type_id,
            flags: 0,
            reserved: 0,
            entry_count: type_.entries.len() as u32,
            entries_start: 0x54 + offsets.len() as u32 * 4,
            config: encode_config(&config),
            offsets
        };
        out.extend(
            generate_res_chunk(ChunkType::TableType, type_chunk, 0x54 - 8, entry_bytes.len() as u32)?.to_bytes()?
        );
        out.extend(entry_bytes);
    }
    Ok(out)
}

fn key_pool_index(pool: &rescomp_model::StringPool, name: &str) -> u32 {
    pool.iter().position(|e| e.value == name).map(|i| i as u32).unwrap_or(UINT32_MINUS_ONE)
}

/// Pads `bytes` up to the next 4-byte boundary so entries can be
/// concatenated back-to-back without throwing off a containing chunk's
/// 4-byte-aligned `chunk_size` (spec §4.3, §6).
fn pad_to_4(bytes: &mut Vec<u8>) {
    let padding = (4 - bytes.len() % 4) % 4;
    bytes.resize(bytes.len() + padding, 0);
}

fn encode_entry(key_index: u32, value: &Value) -> Result<Vec<u8>> {
    match simple_value(value) {
        Some((data_type, data)) => {
            let mut bytes = TableEntryCompact { flags: 0, key: key_index, data_type, data }.to_bytes()?;
            pad_to_4(&mut bytes);
            Ok(bytes)
        }
        None => encode_complex_entry(key_index, value)
    }
}

fn simple_value(value: &Value) -> Option<(AttributeDataType, u32)> {
    match value {
        Value::Primitive(Primitive::Bool(b)) => Some((AttributeDataType::BooleanInteger, *b as u32)),
        Value::Primitive(Primitive::Int(i)) => Some((AttributeDataType::DecimalInteger, *i as u32)),
        Value::Primitive(Primitive::Color(c)) => Some((AttributeDataType::IntColorArgb8, *c)),
        Value::Primitive(Primitive::Float(f)) => Some((AttributeDataType::Float, f.to_bits())),
        Value::Primitive(Primitive::Fraction { value, .. }) => Some((AttributeDataType::Fraction, value.to_bits())),
        Value::Primitive(Primitive::Dimension { value, .. }) => Some((AttributeDataType::Dimension, value.to_bits())),
        Value::String(s) => Some((AttributeDataType::String, s.index)),
        Value::Reference(r) => Some((AttributeDataType::Reference, r.id.map(|id| id.0).unwrap_or(0))),
        Value::Attribute(_) | Value::Style(_) | Value::Array(_) | Value::Plurals(_) | Value::Styleable(_) => None
    }
}

fn encode_complex_entry(key_index: u32, value: &Value) -> Result<Vec<u8>> {
    let (parent, children): (u32, Vec<(u32, Value)>) = match value {
        Value::Style(style) => {
            let parent = style.parent.as_ref().and_then(|p| p.id).map(|id| id.0).unwrap_or(0);
            let children =
                style.entries.iter().map(|(attr, v)| (attr.id.map(|id| id.0).unwrap_or(0), v.clone())).collect();
            (parent, children)
        }
        Value::Array(items) => (0, items.iter().enumerate().map(|(i, v)| (i as u32, v.clone())).collect()),
        Value::Plurals(items) => (0, items.iter().map(|(q, v)| (*q as u32, v.clone())).collect()),
        Value::Styleable(attrs) => (
            0,
            attrs.iter().map(|a| (a.id.map(|id| id.0).unwrap_or(0), Value::Reference(a.clone()))).collect()
        ),
        _ => unreachable!("encode_complex_entry called with a value simple_value already handles")
    };

    let mut map_data = Vec::new();
    for (name, child) in &children {
        let (data_type, data) = simple_value(child).unwrap_or((AttributeDataType::Null, 0));
        map_data.extend(TableMapEntry { name: *name, value: ResValue { size: 8, res0: 0, data_type, data } }.to_bytes()?);
    }

    let header = TableEntryComplex {
        size: 16,
        flags: ENTRY_FLAG_COMPLEX,
        key: key_index,
        parent,
        count: children.len() as u32
    };
    let mut out = header.to_bytes()?;
    out.extend(map_data);
    pad_to_4(&mut out);
    Ok(out)
}

/// Packs a [Configuration] into the fixed 64-byte `ResTable_config` slot.
/// Only the axes the wire format commonly round-trips (mcc/mnc, density,
/// screen dp, sdk version) are populated; unused trailing bytes stay zero.
fn encode_config(config: &Configuration) -> TableConfigChunk {
    let mut data = [0u8; 60];
    if let Some(mcc) = config.mcc {
        data[0..2].copy_from_slice(&mcc.to_le_bytes());
    }
    if let Some(mnc) = config.mnc {
        data[2..4].copy_from_slice(&mnc.to_le_bytes());
    }
    if let Some(density) = config.density {
        data[14..16].copy_from_slice(&density.dpi().to_le_bytes());
    }
    if let Some(sw) = config.smallest_screen_width_dp {
        data[18..20].copy_from_slice(&sw.to_le_bytes());
    }
    if let Some(w) = config.screen_width_dp {
        data[20..22].copy_from_slice(&w.to_le_bytes());
    }
    if let Some(h) = config.screen_height_dp {
        data[22..24].copy_from_slice(&h.to_le_bytes());
    }
    if let Some(version) = config.version {
        data[24..26].copy_from_slice(&version.to_le_bytes());
    }
    TableConfigChunk { size: 64, data }
}

fn padded_package_name_utf16(package_name: &str) -> Result<Vec<u16>> {
    if package_name.chars().count() > 128 {
        return Err(RescompError::PackageNameTooLong(package_name.into()));
    }
    let mut out = vec![0u16; 128];
    let utf16: Vec<u16> = package_name.encode_utf16().collect();
    out[..utf16.len()].copy_from_slice(&utf16);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rescomp_common::Source;
    use rescomp_model::{MergeMode, OverlayPolicy, ResourceName, ResourceType, StringRef};

    #[test]
    fn serializes_a_single_string_resource() {
        let mut table = ResourceTable::new();
        let index = table.string_pool.intern("Hi");
        table
            .add_resource(
                &ResourceName::new("com.x", ResourceType::String, "hello").unwrap(),
                Configuration::any(),
                None,
                Value::String(StringRef { index, spans: Vec::new() }),
                Source::new("v.xml"),
                OverlayPolicy::NoOverlay,
                MergeMode::Append
            )
            .unwrap();
        table.packages[0].id = Some(0x7f);

        let chunk = construct_resource_table(&table).unwrap();
        assert_eq!(chunk.header.chunk_type, ChunkType::Table);
        assert!(!chunk.data.is_empty());
    }

    #[test]
    fn rejects_package_name_over_128_chars() {
        assert!(padded_package_name_utf16(&"x".repeat(129)).is_err());
    }
}
