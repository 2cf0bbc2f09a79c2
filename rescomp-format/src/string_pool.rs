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

//! Encodes a [rescomp_model::StringPool] into the wire `StringPoolChunk`
//! format, including styled spans (spec §4.3).

use std::collections::HashMap;

use rescomp_common::{RescompError, Result};
use rescomp_model::StringPool;

use crate::chunks::{
    ChunkType, StringPoolChunk, StringPoolHeader, StyleSpan, STRING_POOL_UTF8_FLAG, STYLE_SPAN_END
};
use crate::generate_res_chunk;

pub fn construct_string_pool(pool: &StringPool) -> Result<crate::chunks::ResChunk> {
    // Span tags (e.g. "b", "i") aren't pre-interned by any caller, so they're
    // collected here and appended as plain entries after the real strings,
    // first-use ordered, so `StyleSpan::name` can reference a real
    // string-pool index (spec §4.3).
    let mut tag_order: Vec<String> = Vec::new();
    let mut tag_index: HashMap<String, u32> = HashMap::new();
    for entry in pool.iter() {
        for span in &entry.spans {
            if !tag_index.contains_key(&span.tag) {
                let index = pool.len() as u32 + tag_order.len() as u32;
                tag_index.insert(span.tag.clone(), index);
                tag_order.push(span.tag.clone());
            }
        }
    }

    let mut string_indices: Vec<u32> = Vec::with_capacity(pool.len() + tag_order.len());
    let mut string_data: Vec<u8> = Vec::new();

    let mut style_indices: Vec<u32> = Vec::with_capacity(pool.len() + tag_order.len());
    let mut style_data: Vec<u8> = Vec::new();
    let mut style_count = 0u32;

    for entry in pool.iter() {
        write_pool_string(&mut string_indices, &mut string_data, &entry.value)?;

        if entry.spans.is_empty() {
            style_indices.push(STYLE_SPAN_END);
        } else {
            style_indices.push(style_data.len() as u32);
            for span in &entry.spans {
                let name = tag_index[&span.tag];
                style_data.extend(
                    StyleSpan { name, first_char: span.first_char, last_char: span.last_char }.to_bytes()?
                );
            }
            style_data.extend(STYLE_SPAN_END.to_le_bytes());
            style_count += 1;
        }
    }

    for tag in &tag_order {
        write_pool_string(&mut string_indices, &mut string_data, tag)?;
        style_indices.push(STYLE_SPAN_END);
    }

    pad_to_4(&mut string_data);
    pad_to_4(&mut style_data);

    let string_indices_size = 4 * string_indices.len() as u32;
    let style_indices_size = 4 * style_indices.len() as u32;
    let strings_start = 0x1C + string_indices_size + style_indices_size;
    let styles_start = if style_count > 0 { strings_start + string_data.len() as u32 } else { 0 };

    let header = StringPoolHeader {
        string_count: string_indices.len() as u32,
        style_count,
        flags: STRING_POOL_UTF8_FLAG,
        strings_start,
        styles_start
    };
    let chunk = StringPoolChunk { string_pool_header: header, string_indices, style_indices, string_data, style_data };

    generate_res_chunk(ChunkType::StringPool, chunk, 0x1C - 0x08, 0)
}

fn write_pool_string(indices: &mut Vec<u32>, data: &mut Vec<u8>, value: &str) -> Result<()> {
    if value.len() > 0x7FFF {
        return Err(RescompError::StringPoolStringTooLong(value.to_string()));
    }
    indices.push(data.len() as u32);
    let char_count = value.chars().count();
    let byte_count = value.len();
    write_length(data, char_count);
    write_length(data, byte_count);
    data.extend(value.bytes());
    data.push(0);
    Ok(())
}

/// AAPT's variable-length count encoding: one byte if `< 128`, else a
/// two-byte big-endian value with the high bit of the first byte set.
fn write_length(out: &mut Vec<u8>, len: usize) {
    if len < 128 {
        out.push(len as u8);
    } else {
        out.push(0x80 | ((len >> 8) & 0xFF) as u8);
        out.push((len & 0xFF) as u8);
    }
}

fn pad_to_4(data: &mut Vec<u8>) {
    let padding = (4 - (data.len() % 4)) % 4;
    data.resize(data.len() + padding, 0);
}

use deku::DekuContainerWrite;

#[cfg(test)]
mod tests {
    use rescomp_model::Span;

    use super::*;

    #[test]
    fn encodes_short_and_long_strings() {
        let mut pool = StringPool::new();
        pool.intern("hi");
        pool.intern(&"x".repeat(200));
        let chunk = construct_string_pool(&pool).unwrap();
        assert_eq!(chunk.header.chunk_type, ChunkType::StringPool);
    }

    #[test]
    fn rejects_strings_over_0x7fff_bytes() {
        let mut pool = StringPool::new();
        pool.intern(&"x".repeat(0x8000));
        assert!(matches!(construct_string_pool(&pool), Err(RescompError::StringPoolStringTooLong(_))));
    }

    #[test]
    fn resolves_styled_span_tag_to_its_own_pool_index() {
        let mut pool = StringPool::new();
        pool.intern_styled("Hello bold", vec![Span { tag: "b".to_string(), first_char: 6, last_char: 9 }]);

        let chunk = construct_string_pool(&pool).unwrap();
        let data = &chunk.data;

        let string_count = u32::from_le_bytes(data[0..4].try_into().unwrap());
        let style_count = u32::from_le_bytes(data[4..8].try_into().unwrap());
        assert_eq!(string_count, 2, "the tag name should be appended as its own pool entry");
        assert_eq!(style_count, 1);

        let styles_start = u32::from_le_bytes(data[16..20].try_into().unwrap()) as usize;
        let span_name = u32::from_le_bytes(data[styles_start..styles_start + 4].try_into().unwrap());
        assert_eq!(span_name, 1, "the span should reference the tag's own pool index, not the placeholder 0");
    }
}
