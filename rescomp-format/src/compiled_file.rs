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

//! The compiled-file payload header: `(ResourceName, Configuration,
//! source-path, file-kind, length-prefix, payload)` (spec §4.3).

use rescomp_common::Result;
use rescomp_config::Configuration;
use rescomp_model::{FileKind, ResourceName};

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFileHeader {
    pub name: ResourceName,
    pub config: Configuration,
    pub source_path: String,
    pub kind: FileKind
}

/// Serializes the header followed by a `u32` little-endian length prefix and
/// the raw payload bytes, as one compiled-file payload (spec §4.3, §6).
pub fn encode_compiled_file(header: &CompiledFileHeader, payload: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    write_string(&mut out, &header.name.to_qualified_string());
    write_string(&mut out, &header.config.serialize());
    write_string(&mut out, &header.source_path);
    out.push(file_kind_tag(header.kind));
    out.extend((payload.len() as u32).to_le_bytes());
    out.extend_from_slice(payload);
    Ok(out)
}

fn file_kind_tag(kind: FileKind) -> u8 {
    match kind {
        FileKind::Png => 0,
        FileKind::Xml => 1,
        FileKind::ProtoXml => 2,
        FileKind::Raw => 3
    }
}

fn write_string(out: &mut Vec<u8>, s: &str) {
    out.extend((s.len() as u32).to_le_bytes());
    out.extend(s.as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use rescomp_model::ResourceType;

    #[test]
    fn encodes_header_then_length_prefixed_payload() {
        let header = CompiledFileHeader {
            name: ResourceName::new("com.x", ResourceType::Drawable, "preview").unwrap(),
            config: Configuration::any(),
            source_path: "res/drawable/preview.png".into(),
            kind: FileKind::Png
        };
        let bytes = encode_compiled_file(&header, &[1, 2, 3]).unwrap();
        assert!(bytes.ends_with(&[1, 2, 3]));
    }
}
