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

//! A thin binary wiring compile + link + archive together. Kept minimal
//! deliberately: the real work lives in `rescomp-xml`, `rescomp-link` and
//! `rescomp-archive`, mirroring the teacher's own `pack-cli`.

use std::path::PathBuf;
use std::{env, fs};

use deku::DekuContainerWrite;
use rescomp_archive::{ArchiveWriter, EntryFlags, ZipArchiveWriter};
use rescomp_common::{Diagnostics, RescompError, Result, Source};
use rescomp_config::Configuration;
use rescomp_container::{Container, PayloadKind};
use rescomp_format::table_writer::construct_resource_table;
use rescomp_link::{assign_ids, auto_version, dedup_versions, resolve_references};
use rescomp_model::{FileKind, FileRef, MergeMode, OverlayPolicy, ResourceName, ResourceTable, ResourceType, Value};
use rescomp_xml::{compile_xml, DeferredResolver};

pub mod res_dir;

use res_dir::read_res_dir;

/// Run from an app directory to build a resources.arsc and a zipped APK.
///
/// ```
/// $ ls ./app
/// res/ AndroidManifest.xml
/// $ rescomp-cli ./app ./app/package.apk
/// $ ls ./app
/// res/ AndroidManifest.xml package.apk
/// ```
fn main() -> Result<()> {
    env_logger::init();

    let in_dir = env::args().nth(1).ok_or_else(|| RescompError::Cli("input directory path not provided".into()))?;
    let out_path = env::args().nth(2).ok_or_else(|| RescompError::Cli("output APK path not provided".into()))?;
    let package_name = env::args().nth(3).unwrap_or_else(|| "com.example.app".to_string());

    let mut in_path = PathBuf::from(&in_dir);
    in_path.push("AndroidManifest.xml");
    let android_manifest = fs::read(&in_path)?;
    in_path.pop();

    in_path.push("res");
    let res_files = read_res_dir(&in_path)?;
    in_path.pop();

    let mut diagnostics = Diagnostics::new();
    let resolver = DeferredResolver;
    let mut table = ResourceTable::new();
    let mut entries = Vec::new();

    for res_file in res_files {
        let Some(type_) = ResourceType::parse(&res_file.type_name) else {
            log::warn!("skipping res/{} with unrecognized type", res_file.type_name);
            continue;
        };
        let config = Configuration::parse(&res_file.qualifiers)?;
        let entry_name = res_file.file_name.split('.').next().unwrap_or(&res_file.file_name).to_string();
        let source_path = format!("res/{}{}{}/{}", res_file.type_name, if res_file.qualifiers.is_empty() { "" } else { "-" }, res_file.qualifiers, res_file.file_name);

        let (archive_path, archive_bytes) = if type_ == ResourceType::Layout || type_ == ResourceType::Xml || type_ == ResourceType::Menu {
            let compiled = compile_xml(&res_file.contents[..], &resolver)?;
            let document_chunk = compiled
                .container
                .payloads
                .first()
                .ok_or_else(|| RescompError::Cli(format!("{source_path} compiled with no document payload")))?;
            (source_path.clone(), document_chunk.bytes.clone())
        } else {
            (source_path.clone(), res_file.contents.clone())
        };

        let kind = match type_ {
            ResourceType::Layout | ResourceType::Xml | ResourceType::Menu => FileKind::Xml,
            ResourceType::Drawable | ResourceType::Mipmap if res_file.file_name.ends_with(".png") => FileKind::Png,
            _ => FileKind::Raw
        };

        let name = ResourceName::new(&package_name, type_, &entry_name)?;
        table.add_resource(
            &name,
            config,
            None,
            Value::File(FileRef { path: archive_path.clone(), kind }),
            Source::new(source_path),
            OverlayPolicy::NoOverlay,
            MergeMode::Append
        )?;
        entries.push((archive_path, archive_bytes));
    }

    assign_ids(&mut table, rescomp_model::APPLICATION_PACKAGE_ID);
    auto_version(&mut table);
    dedup_versions(&mut table);
    resolve_references(&mut table, &[], None, false, &mut diagnostics)?;

    let table_chunk = construct_resource_table(&table)?;
    let mut envelope = Container::new();
    envelope.push(PayloadKind::ResTable, table_chunk.to_bytes()?);
    let resources_arsc = envelope.encode();

    let mut writer = ZipArchiveWriter::new(fs::File::create(PathBuf::from(&out_path).with_extension("apk"))?);
    writer.write_file("AndroidManifest.xml", EntryFlags::COMPRESS, &android_manifest)?;
    writer.write_file("resources.arsc", EntryFlags::ALIGN, &resources_arsc)?;
    for (path, bytes) in entries {
        writer.write_file(&path, EntryFlags::COMPRESS, &bytes)?;
    }
    writer.finish()?;

    for diagnostic in diagnostics.diagnostics() {
        log::warn!("{diagnostic}");
    }

    println!("Wrote {:?} to disk", PathBuf::from(&out_path).with_extension("apk"));
    Ok(())
}
