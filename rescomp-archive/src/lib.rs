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

//! The archive writer (spec.md §4.9): a zip-compatible sink with two
//! writer backends (a real zip file, and a plain directory tree) behind one
//! trait, ported from `format/Archive.h`'s `IArchiveWriter`.

use std::fs;
use std::io::{Seek, Write};
use std::path::PathBuf;

use bitflags::bitflags;
use rescomp_common::{RescompError, Result};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

bitflags! {
    /// Per-entry behavior (spec.md §4.9 "Per-entry flags").
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct EntryFlags: u32 {
        const COMPRESS = 0x01;
        const ALIGN = 0x02;
    }
}

/// One archive sink, streaming or whole-blob (spec.md §4.9 "Two modes").
/// Once any call returns an error, every later call on the same writer
/// returns that same error again instead of attempting further I/O
/// ("Errors are sticky").
pub trait ArchiveWriter {
    fn start_entry(&mut self, path: &str, flags: EntryFlags) -> Result<()>;
    fn write(&mut self, buf: &[u8]) -> Result<()>;
    fn finish_entry(&mut self) -> Result<()>;
    fn had_error(&self) -> bool;

    /// Whole-blob convenience wrapper around `start_entry`/`write`/`finish_entry`.
    fn write_file(&mut self, path: &str, flags: EntryFlags, data: &[u8]) -> Result<()> {
        self.start_entry(path, flags)?;
        self.write(data)?;
        self.finish_entry()
    }
}

#[derive(Debug, Default)]
struct StickyError(Option<String>);

impl StickyError {
    fn check(&self) -> Result<()> {
        match &self.0 {
            Some(message) => Err(RescompError::ArchiveWriterPoisoned(message.clone())),
            None => Ok(())
        }
    }

    fn guard<T>(&mut self, result: Result<T>) -> Result<T> {
        if self.0.is_none() {
            if let Err(err) = &result {
                self.0 = Some(err.to_string());
            }
        }
        result
    }
}

fn zip_options(flags: EntryFlags) -> SimpleFileOptions {
    let mut options = SimpleFileOptions::default().compression_method(if flags.contains(EntryFlags::COMPRESS) {
        CompressionMethod::Deflated
    } else {
        CompressionMethod::Stored
    });
    if flags.contains(EntryFlags::ALIGN) {
        options = options.with_alignment(4);
    }
    options
}

/// Writes entries into a real zip archive, in the order `start_entry` is
/// called (spec.md §4.9 "Entry ordering").
pub struct ZipArchiveWriter<W: Write + Seek> {
    zip: ZipWriter<W>,
    sticky: StickyError
}

impl<W: Write + Seek> ZipArchiveWriter<W> {
    pub fn new(output: W) -> ZipArchiveWriter<W> {
        ZipArchiveWriter { zip: ZipWriter::new(output), sticky: StickyError::default() }
    }

    pub fn finish(mut self) -> Result<W> {
        self.sticky.check()?;
        let result = self.zip.finish().map_err(RescompError::from);
        self.sticky.guard(result)
    }
}

impl<W: Write + Seek> ArchiveWriter for ZipArchiveWriter<W> {
    fn start_entry(&mut self, path: &str, flags: EntryFlags) -> Result<()> {
        self.sticky.check()?;
        let result = self.zip.start_file_from_path(path, zip_options(flags)).map_err(RescompError::from);
        self.sticky.guard(result)
    }

    fn write(&mut self, buf: &[u8]) -> Result<()> {
        self.sticky.check()?;
        let result = self.zip.write_all(buf).map_err(RescompError::from);
        self.sticky.guard(result)
    }

    fn finish_entry(&mut self) -> Result<()> {
        self.sticky.check()
    }

    fn had_error(&self) -> bool {
        self.sticky.0.is_some()
    }
}

/// Writes each entry as a plain file under a base directory instead of
/// into a zip (spec.md §4.9 "A directory-writer variant"). Compression and
/// alignment flags don't apply to a bare file tree and are ignored.
pub struct DirectoryArchiveWriter {
    root: PathBuf,
    current: Option<fs::File>,
    sticky: StickyError
}

impl DirectoryArchiveWriter {
    pub fn new(root: impl Into<PathBuf>) -> DirectoryArchiveWriter {
        DirectoryArchiveWriter { root: root.into(), current: None, sticky: StickyError::default() }
    }
}

impl ArchiveWriter for DirectoryArchiveWriter {
    fn start_entry(&mut self, path: &str, _flags: EntryFlags) -> Result<()> {
        self.sticky.check()?;
        let result = (|| -> Result<fs::File> {
            let full_path = self.root.join(path);
            if let Some(parent) = full_path.parent() {
                fs::create_dir_all(parent)?;
            }
            Ok(fs::File::create(full_path)?)
        })();
        self.current = result.as_ref().ok().map(|_| ()).and(None);
        match self.sticky.guard(result) {
            Ok(file) => {
                self.current = Some(file);
                Ok(())
            }
            Err(err) => Err(err)
        }
    }

    fn write(&mut self, buf: &[u8]) -> Result<()> {
        self.sticky.check()?;
        let result = match &mut self.current {
            Some(file) => file.write_all(buf).map_err(RescompError::from),
            None => Err(RescompError::ArchiveWriterPoisoned("write called with no entry started".to_string()))
        };
        self.sticky.guard(result)
    }

    fn finish_entry(&mut self) -> Result<()> {
        self.sticky.check()?;
        self.current = None;
        Ok(())
    }

    fn had_error(&self) -> bool {
        self.sticky.0.is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn zip_writer_round_trips_multiple_entries_in_call_order() {
        let mut writer = ZipArchiveWriter::new(Cursor::new(Vec::new()));
        writer.write_file("AndroidManifest.xml", EntryFlags::COMPRESS, b"<manifest/>").unwrap();
        writer.write_file("resources.arsc", EntryFlags::ALIGN, b"ARSC-BYTES").unwrap();
        let buffer = writer.finish().unwrap().into_inner();

        let mut archive = zip::ZipArchive::new(Cursor::new(buffer)).unwrap();
        assert_eq!(archive.len(), 2);
        let mut manifest = archive.by_name("AndroidManifest.xml").unwrap();
        let mut contents = Vec::new();
        std::io::Read::read_to_end(&mut manifest, &mut contents).unwrap();
        assert_eq!(contents, b"<manifest/>");
    }

    #[test]
    fn errors_are_sticky_after_the_first_failure() {
        let mut writer = DirectoryArchiveWriter::new("\0invalid-root-for-rescomp-archive-tests");
        let first = writer.start_entry("a.txt", EntryFlags::empty());
        assert!(first.is_err());
        assert!(writer.had_error());

        let second = writer.write_file("b.txt", EntryFlags::empty(), b"data");
        assert!(second.is_err());
        assert_eq!(first.unwrap_err().to_string(), second.unwrap_err().to_string());
    }

    #[test]
    fn directory_writer_creates_nested_entries() {
        let dir = std::env::temp_dir().join(format!("rescomp-archive-test-{}", std::process::id()));
        let mut writer = DirectoryArchiveWriter::new(&dir);
        writer.write_file("res/drawable/icon.png", EntryFlags::empty(), b"PNGDATA").unwrap();
        let written = fs::read(dir.join("res/drawable/icon.png")).unwrap();
        assert_eq!(written, b"PNGDATA");
        fs::remove_dir_all(&dir).ok();
    }
}
