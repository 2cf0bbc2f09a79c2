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

//! The compiled-artifact container envelope (spec §4.4, §6): `AAPT` magic +
//! `u32 version` + a repeated `{kind, size, bytes}` payload list, N>=1
//! payloads per file in emit order.

use rescomp_common::{RescompError, Result};

pub const MAGIC: &[u8; 4] = b"AAPT";
pub const VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    ResTable,
    ResFile
}

impl PayloadKind {
    fn tag(self) -> u32 {
        match self {
            PayloadKind::ResTable => 0,
            PayloadKind::ResFile => 1
        }
    }

    fn from_tag(tag: u32) -> Result<PayloadKind> {
        match tag {
            0 => Ok(PayloadKind::ResTable),
            1 => Ok(PayloadKind::ResFile),
            other => Err(RescompError::UnknownPayloadKind(other))
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    pub kind: PayloadKind,
    pub bytes: Vec<u8>
}

/// One intermediate compiled-artifact file: N>=1 payloads, written and read
/// back in emit order (never sorted), as required for XML inline-attr
/// extraction (spec §4.4, §9).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Container {
    pub payloads: Vec<Payload>
}

impl Container {
    pub fn new() -> Container {
        Container::default()
    }

    pub fn push(&mut self, kind: PayloadKind, bytes: Vec<u8>) {
        self.payloads.push(Payload { kind, bytes });
    }

    /// `AAPT` + `u32 version` + repeated `{u32 kind, u64 length, bytes}`,
    /// with the payload stream padded to a 4-byte boundary so consumers
    /// that mmap the output stay aligned (spec §6).
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend(MAGIC);
        out.extend(VERSION.to_le_bytes());
        for payload in &self.payloads {
            out.extend(payload.kind.tag().to_le_bytes());
            out.extend((payload.bytes.len() as u64).to_le_bytes());
            out.extend(&payload.bytes);
        }
        let padding = (4 - (out.len() % 4)) % 4;
        out.resize(out.len() + padding, 0);
        out
    }

    /// Parses a container, tolerating up to 3 bytes of trailing padding
    /// after the last payload (spec §6).
    pub fn decode(bytes: &[u8]) -> Result<Container> {
        if bytes.len() < 8 || &bytes[0..4] != MAGIC {
            return Err(RescompError::BadContainerMagic);
        }
        let mut offset = 8;
        let mut container = Container::new();
        while offset + 12 <= bytes.len() {
            let kind_tag = u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap());
            let length = u64::from_le_bytes(bytes[offset + 4..offset + 12].try_into().unwrap()) as usize;
            offset += 12;
            if offset + length > bytes.len() {
                break;
            }
            let kind = PayloadKind::from_tag(kind_tag)?;
            container.push(kind, bytes[offset..offset + length].to_vec());
            offset += length;
        }
        Ok(container)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_multiple_payloads_in_emit_order() {
        let mut container = Container::new();
        container.push(PayloadKind::ResTable, vec![1, 2, 3]);
        container.push(PayloadKind::ResFile, vec![4, 5]);
        let bytes = container.encode();
        let decoded = Container::decode(&bytes).unwrap();
        assert_eq!(decoded.payloads.len(), 2);
        assert_eq!(decoded.payloads[0].kind, PayloadKind::ResTable);
        assert_eq!(decoded.payloads[1].bytes, vec![4, 5]);
    }

    #[test]
    fn rejects_bad_magic() {
        assert!(matches!(Container::decode(b"XXXX0000"), Err(RescompError::BadContainerMagic)));
    }

    #[test]
    fn rejects_unknown_payload_kind() {
        let mut bytes = Vec::new();
        bytes.extend(MAGIC);
        bytes.extend(VERSION.to_le_bytes());
        bytes.extend(9u32.to_le_bytes());
        bytes.extend(0u64.to_le_bytes());
        assert!(matches!(Container::decode(&bytes), Err(RescompError::UnknownPayloadKind(9))));
    }
}
