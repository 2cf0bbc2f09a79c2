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

use std::path::Path;
use std::{fs, io::Read};

/// One raw file sitting under `res/<type>[-<qualifiers>]/<name>`.
pub struct ResFile {
    pub type_name: String,
    pub qualifiers: String,
    pub file_name: String,
    pub contents: Vec<u8>
}

/// Walks `res/` exactly as the resource table's `res/<type>-<qualifiers>/`
/// layout requires, splitting each subdirectory's name into its bare type
/// and its qualifier suffix on the first `-`.
pub fn read_res_dir(res_path: &Path) -> std::io::Result<Vec<ResFile>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(res_path)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                log::warn!("skipping unreadable res/ entry: {err}");
                continue;
            }
        };
        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(err) => {
                log::warn!("skipping res/ entry with no metadata: {err}");
                continue;
            }
        };
        if !metadata.is_dir() {
            log::warn!("ignoring unusable res/ entry {:?}", entry.path());
            continue;
        }

        let dir_name = entry.file_name().to_string_lossy().into_owned();
        let (type_name, qualifiers) = dir_name.split_once('-').unwrap_or((dir_name.as_str(), ""));
        let type_name = type_name.to_string();
        let qualifiers = qualifiers.to_string();

        collect_files(&entry.path(), &type_name, &qualifiers, &mut files);
    }
    Ok(files)
}

fn collect_files(dir: &Path, type_name: &str, qualifiers: &str, files: &mut Vec<ResFile>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            log::warn!("failed to read res/ subdirectory {dir:?}: {err}");
            return;
        }
    };
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(_) => continue
        };
        let metadata = match entry.metadata() {
            Ok(metadata) if !metadata.is_dir() => metadata,
            _ => continue
        };
        let mut file = match fs::File::open(entry.path()) {
            Ok(file) => file,
            Err(err) => {
                log::warn!("failed to open {:?}: {err}", entry.path());
                continue;
            }
        };
        let mut contents = vec![0u8; metadata.len() as usize];
        if let Err(err) = file.read_exact(&mut contents) {
            log::warn!("failed to read {:?}: {err}", entry.path());
            continue;
        }
        files.push(ResFile {
            type_name: type_name.to_string(),
            qualifiers: qualifiers.to_string(),
            file_name: entry.file_name().to_string_lossy().into_owned(),
            contents
        });
    }
}
