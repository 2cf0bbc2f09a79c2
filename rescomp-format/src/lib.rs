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

//! Encodes the in-memory resource model to/from the wire formats: chunked
//! binary (the existing Android table format) and a hand-written proto
//! schema for bundle tooling (spec §4.3).

use deku::DekuContainerWrite;
use rescomp_common::Result;

pub mod chunks;
pub mod compiled_file;
pub mod proto;
pub mod string_pool;
pub mod table_writer;

use chunks::{ChunkType, ResChunk, ResChunkHeader};

/// Wraps `data`'s encoded bytes in a `ResChunk` with a correctly computed
/// header size/chunk size, generalized from the teacher's single-chunk
/// helper to any chunk payload.
pub fn generate_res_chunk<T: DekuContainerWrite>(
    chunk_type: ChunkType,
    data: T,
    extra_header_size: u16,
    extra_chunk_size: u32
) -> Result<ResChunk> {
    let data_bytes = data.to_bytes()?;
    let chunk = ResChunk {
        header: ResChunkHeader {
            chunk_type,
            header_size: 0x08 + extra_header_size,
            chunk_size: 0x08 + extra_chunk_size + data_bytes.len() as u32
        },
        data: data_bytes
    };
    if chunk.header.chunk_size % 4 != 0 {
        unimplemented!("generic chunk alignment ({:?})", chunk);
    }
    Ok(chunk)
}
