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

//! The proto resource-table format used by bundle tooling (spec §4.3). These
//! messages are written by hand against `prost::Message` instead of
//! generated from a `.proto` schema, so building rescomp doesn't require a
//! `protoc` toolchain; the field shape mirrors `rescomp_model::ResourceTable`.

use prost::Message;

#[derive(Clone, PartialEq, Message)]
pub struct ProtoResourceTable {
    #[prost(message, repeated, tag = "1")]
    pub packages: Vec<ProtoPackage>
}

#[derive(Clone, PartialEq, Message)]
pub struct ProtoPackage {
    #[prost(uint32, tag = "1")]
    pub package_id: u32,
    #[prost(string, tag = "2")]
    pub package_name: String,
    #[prost(message, repeated, tag = "3")]
    pub types: Vec<ProtoType>
}

#[derive(Clone, PartialEq, Message)]
pub struct ProtoType {
    #[prost(uint32, tag = "1")]
    pub type_id: u32,
    #[prost(string, tag = "2")]
    pub type_name: String,
    #[prost(message, repeated, tag = "3")]
    pub entries: Vec<ProtoEntry>
}

#[derive(Clone, PartialEq, Message)]
pub struct ProtoEntry {
    #[prost(uint32, tag = "1")]
    pub entry_id: u32,
    #[prost(string, tag = "2")]
    pub entry_name: String,
    #[prost(enumeration = "ProtoVisibility", tag = "3")]
    pub visibility: i32,
    #[prost(message, repeated, tag = "4")]
    pub config_values: Vec<ProtoConfigValue>
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, prost::Enumeration)]
#[repr(i32)]
pub enum ProtoVisibility {
    Undefined = 0,
    Private = 1,
    Public = 2
}

#[derive(Clone, PartialEq, Message)]
pub struct ProtoConfigValue {
    #[prost(string, tag = "1")]
    pub config_qualifier: String,
    #[prost(string, optional, tag = "2")]
    pub product: Option<String>,
    #[prost(message, optional, tag = "3")]
    pub value: Option<ProtoValue>
}

#[derive(Clone, PartialEq, Message)]
pub struct ProtoValue {
    #[prost(oneof = "ProtoValueKind", tags = "1, 2, 3, 4")]
    pub kind: Option<ProtoValueKind>
}

#[derive(Clone, PartialEq, prost::Oneof)]
pub enum ProtoValueKind {
    #[prost(message, tag = "1")]
    Primitive(ProtoPrimitive),
    #[prost(string, tag = "2")]
    Str(String),
    #[prost(message, tag = "3")]
    Reference(ProtoReference),
    #[prost(string, tag = "4")]
    FilePath(String)
}

#[derive(Clone, PartialEq, Message)]
pub struct ProtoPrimitive {
    #[prost(uint32, tag = "1")]
    pub data_type: u32,
    #[prost(uint32, tag = "2")]
    pub data: u32
}

#[derive(Clone, PartialEq, Message)]
pub struct ProtoReference {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(uint32, optional, tag = "2")]
    pub id: Option<u32>,
    #[prost(bool, tag = "3")]
    pub private: bool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_protobuf_bytes() {
        let table = ProtoResourceTable {
            packages: vec![ProtoPackage {
                package_id: 0x7f,
                package_name: "com.x".into(),
                types: vec![ProtoType {
                    type_id: 1,
                    type_name: "string".into(),
                    entries: vec![ProtoEntry {
                        entry_id: 0,
                        entry_name: "hello".into(),
                        visibility: ProtoVisibility::Public as i32,
                        config_values: vec![ProtoConfigValue {
                            config_qualifier: String::new(),
                            product: None,
                            value: Some(ProtoValue { kind: Some(ProtoValueKind::Str("Hi".into())) })
                        }]
                    }]
                }]
            }]
        };
        let bytes = table.encode_to_vec();
        let decoded = ProtoResourceTable::decode(bytes.as_slice()).unwrap();
        assert_eq!(table, decoded);
    }
}
