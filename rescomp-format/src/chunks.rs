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

//! The chunk-typed binary resource table format (spec §4.3, §6). Generalized
//! from a single-package/single-config layout to arbitrary package/type/
//! config counts.

use deku::prelude::*;

#[derive(Debug, PartialEq, DekuWrite)]
pub struct ResChunk {
    pub header: ResChunkHeader,
    pub data: Vec<u8>
}

pub const RES_CHUNK_HEADER_SIZE: u32 = 8;
pub const UINT32_MINUS_ONE: u32 = 0xFFFF_FFFF;
pub type ResStringPoolRef = u32;

#[derive(Debug, PartialEq, DekuWrite)]
pub struct ResChunkHeader {
    pub chunk_type: ChunkType,
    pub header_size: u16,
    /// Includes both this header and the data that follows.
    pub chunk_size: u32
}

#[derive(Debug, PartialEq, DekuWrite)]
#[deku(id_type = "u16")]
pub enum ChunkType {
    #[deku(id = 0x0000)]
    Null,
    #[deku(id = 0x0001)]
    StringPool,
    #[deku(id = 0x0002)]
    Table,
    #[deku(id = 0x0003)]
    XmlFile,

    #[deku(id = 0x0100)]
    XmlStartNamespace,
    #[deku(id = 0x0101)]
    XmlEndNamespace,
    #[deku(id = 0x0102)]
    XmlStartElement,
    #[deku(id = 0x0103)]
    XmlEndElement,
    #[deku(id = 0x0180)]
    XmlResourceMap,

    #[deku(id = 0x0200)]
    TablePackage,
    #[deku(id = 0x0201)]
    TableType,
    #[deku(id = 0x0202)]
    TableTypeSpec
}

// --- String pool ---

pub const STRING_POOL_UTF8_FLAG: u32 = 1 << 8;

#[derive(Debug, PartialEq, DekuWrite)]
pub struct StringPoolHeader {
    pub string_count: u32,
    pub style_count: u32,
    pub flags: u32,
    pub strings_start: u32,
    pub styles_start: u32
}

#[derive(Debug, PartialEq, DekuWrite)]
pub struct StringPoolChunk {
    pub string_pool_header: StringPoolHeader,
    pub string_indices: Vec<u32>,
    pub style_indices: Vec<u32>,
    pub string_data: Vec<u8>,
    pub style_data: Vec<u8>
}

/// One `(name-ref, first-char, last-char)` span, terminated in-stream by the
/// `END` sentinel (spec §4.3).
#[derive(Debug, PartialEq, DekuWrite)]
pub struct StyleSpan {
    pub name: ResStringPoolRef,
    pub first_char: u32,
    pub last_char: u32
}

pub const STYLE_SPAN_END: u32 = 0xFFFF_FFFF;

// --- Table ---

#[derive(Debug, PartialEq, DekuWrite)]
pub struct TableHeaderChunk {
    pub package_count: u32
}

#[derive(Debug, PartialEq, DekuWrite)]
pub struct TablePackageChunk {
    pub id: u32,
    /// Always 128 UTF-16 code units (256 bytes), zero-padded.
    pub name: Vec<u16>,
    pub type_string_offset: u32,
    pub last_public_type: u32,
    pub key_string_offset: u32,
    pub last_public_key: u32,
    pub type_id_offset: u32
}

#[derive(Debug, PartialEq, DekuWrite)]
pub struct TableTypeSpecChunk {
    pub id: u8,
    pub res0: u8,
    pub types_count: u16,
    pub entry_count: u32,
    pub configuration_change_flags: Vec<u32>
}

#[derive(Debug, PartialEq, DekuWrite)]
pub struct TableTypeChunk {
    pub id: u8,
    pub flags: u8,
    pub reserved: u16,
    pub entry_count: u32,
    pub entries_start: u32,
    pub config: TableConfigChunk,
    pub offsets: Vec<u32>
}

/// Entry-and-value fused encoding used for simple primitive types under the
/// "compact" entry mode (spec §4.3).
#[derive(Debug, PartialEq, DekuWrite)]
pub struct TableEntryCompact {
    pub flags: u16,
    pub key: ResStringPoolRef,
    pub data_type: AttributeDataType,
    pub data: u32
}

pub const ENTRY_FLAG_COMPLEX: u16 = 0x0001;
pub const ENTRY_FLAG_PUBLIC: u16 = 0x0002;

/// A style/array/plurals/styleable "bag" entry: a header naming the parent
/// (for styles) followed by `count` name/value pairs.
#[derive(Debug, PartialEq, DekuWrite)]
pub struct TableEntryComplex {
    pub size: u16,
    pub flags: u16,
    pub key: ResStringPoolRef,
    pub parent: u32,
    pub count: u32
}

/// One `(attr-id-or-ordinal, value)` pair within a bag entry.
#[derive(Debug, PartialEq, DekuWrite)]
pub struct TableMapEntry {
    pub name: u32,
    pub value: ResValue
}

#[derive(Debug, PartialEq, DekuWrite)]
pub struct ResValue {
    pub size: u16,
    pub res0: u8,
    pub data_type: AttributeDataType,
    pub data: u32
}

#[derive(Debug, PartialEq, DekuWrite, Clone, Copy)]
#[deku(id_type = "u8")]
pub enum AttributeDataType {
    #[deku(id = 0x00)]
    Null,
    #[deku(id = 0x01)]
    Reference,
    #[deku(id = 0x03)]
    String,
    #[deku(id = 0x04)]
    Float,
    #[deku(id = 0x05)]
    Dimension,
    #[deku(id = 0x06)]
    Fraction,
    #[deku(id = 0x10)]
    DecimalInteger,
    #[deku(id = 0x1c)]
    IntColorArgb8,
    #[deku(id = 0x12)]
    BooleanInteger
}

/// Serialized `Configuration` bytes. Real AAPT pads this struct to 64 bytes
/// total (including the 4-byte size header); unused trailing axes are left
/// zero, matching the wire format's forward-compatible sizing convention.
#[derive(Debug, PartialEq, DekuWrite)]
pub struct TableConfigChunk {
    pub size: u32,
    pub data: [u8; 60]
}

// --- XML ---

#[derive(Debug, PartialEq, DekuWrite)]
pub struct XmlNodeChunk {
    pub line_number: u32,
    pub comment: ResStringPoolRef,
    pub node_data: Vec<u8>
}

#[derive(Debug, PartialEq, DekuWrite)]
pub struct XmlResourceMap {
    pub resources: Vec<u32>
}

#[derive(Debug, PartialEq, DekuWrite)]
pub struct XmlNamespaceChunk {
    pub prefix: ResStringPoolRef,
    pub uri: ResStringPoolRef
}

#[derive(Debug, PartialEq, DekuWrite)]
pub struct XmlStartElementChunk {
    pub namespace: ResStringPoolRef,
    pub name: ResStringPoolRef,
    pub attribute_start: u16,
    pub attribute_size: u16,
    pub attribute_count: u16,
    /// 1-based index of the `id` attribute, 0 if none.
    pub id_index: u16,
    pub class_index: u16,
    pub style_index: u16,
    pub attribute_data: Vec<u8>
}

#[derive(Debug, PartialEq, DekuWrite)]
pub struct XmlEndElementChunk {
    pub namespace: ResStringPoolRef,
    pub name: ResStringPoolRef
}

#[derive(Debug, PartialEq, DekuWrite)]
pub struct XmlAttributeChunk {
    pub namespace: ResStringPoolRef,
    pub name: ResStringPoolRef,
    pub raw_value: ResStringPoolRef,
    pub typed_value: ResValue
}

#[derive(Debug, PartialEq, DekuWrite)]
pub struct RawBytes {
    pub data: Vec<u8>
}
