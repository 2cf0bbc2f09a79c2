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

//! Error type and diagnostics sink shared between every `rescomp-*` crate.

use core::fmt;
use std::{io, rc::Rc};

use deku::DekuError;
use zip::result::ZipError;

pub mod diagnostics;
pub use diagnostics::{Diagnostic, Diagnostics, Source};

/// Common error type making it easier to share `Result`s between rescomp crates.
///
/// In general designed to avoid needing utilities like `map_err`.
#[derive(Debug, Clone)]
pub enum RescompError {
    /// rescomp-cli encountered an error specific to the command line
    /// implementation, e.g. a missing path argument.
    Cli(String),
    /// A qualifier string token wasn't recognized by any axis parser.
    BadQualifier(String),
    /// A resource entry name was not `[a-zA-Z_][a-zA-Z0-9_]*`.
    BadResourceName(String),
    /// Two `(Configuration, product)` pairs collided within one entry and
    /// the merge mode did not permit overwrite.
    DuplicateDefinition(String),
    /// A pinned public ID conflicted with another pin for the same resource.
    ConflictingPinnedId(String),
    /// The same entry was declared Public in one input and Private in
    /// another and the merge can't silently resolve it.
    ConflictingVisibility(String),
    /// A symbolic reference could not be resolved against any symbol source
    /// in the resolver's ordered search chain.
    UnresolvedReferences(Vec<String>),
    /// A private reference was used from outside its defining package and
    /// the link was not running in shared-library mode.
    PrivateReferenceFromOutsidePackage(String),
    /// Two split constraints both claimed the same configuration.
    OverlappingSplitConstraint(String),
    /// Resolving an attribute chain exceeded the depth cap (see §9: 40).
    ReferenceCycleTooDeep(String),
    /// Attempted to construct an APK resource table with a package
    /// identifier longer than 128 UTF-16 code units.
    PackageNameTooLong(String),
    /// The binary format's signed 16-bit string length field can't encode a
    /// string this long.
    StringPoolStringTooLong(String),
    /// Deku failed to (de)serialize a chunk.
    ByteSerialisationFailed(DekuError),
    /// The compiled-artifact container didn't start with the `AAPT` magic.
    BadContainerMagic,
    /// The compiled-artifact container declared a payload kind this version
    /// of rescomp doesn't know about.
    UnknownPayloadKind(u32),
    /// XML parsing failed. See [xml::reader::Error].
    XmlParsingFailed(xml::reader::Error),
    /// An attribute value expected to be an integer wasn't one.
    IntegerAttributeParsingFailed(String),
    /// A `@[pkg:]type/name` reference didn't split into the expected parts.
    ReferenceAttributeParsingFailed(String),
    /// `android:`-prefixed attribute name isn't in the internal attribute table.
    UnknownAndroidInternalAttribute(String),
    /// An error occurred while reading/writing to disk.
    FileIoError(Rc<io::Error>),
    /// The archive writer's underlying zip library failed.
    ZipWritingFailed(Rc<ZipError>),
    /// The archive writer already failed once; further writes are no-ops
    /// that surface this same first error (§4.9).
    ArchiveWriterPoisoned(String)
}

/// Result type where the error is always [RescompError].
pub type Result<T> = std::result::Result<T, RescompError>;

impl fmt::Display for RescompError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use RescompError::*;
        match self {
            Cli(msg) => write!(f, "{msg}"),
            BadQualifier(q) => write!(f, "unrecognized configuration qualifier token \"{q}\""),
            BadResourceName(n) => write!(f, "\"{n}\" is not a valid resource entry name"),
            DuplicateDefinition(name) => write!(f, "duplicate definition of {name}"),
            ConflictingPinnedId(name) => write!(f, "{name} has conflicting pinned resource ids"),
            ConflictingVisibility(name) => write!(f, "{name} is declared both Public and Private"),
            UnresolvedReferences(names) => write!(
                f,
                "{} unresolved reference(s): {}",
                names.len(),
                names.join(", ")
            ),
            PrivateReferenceFromOutsidePackage(r) => write!(
                f,
                "\"{r}\" is private to its defining package and the link is not running in shared-library mode"
            ),
            OverlappingSplitConstraint(c) => write!(
                f,
                "config \"{c}\" appears in multiple split constraints, target split ambiguous"
            ),
            ReferenceCycleTooDeep(name) => {
                write!(f, "attribute reference chain for \"{name}\" exceeded the depth cap")
            }
            PackageNameTooLong(pkg) => {
                write!(f, "package name \"{pkg}\" is too long (max 128 characters)")
            }
            StringPoolStringTooLong(_) => write!(
                f,
                "string pool entry longer than 0x7FFF bytes; rescomp does not support arbitrary-size string pools"
            ),
            ByteSerialisationFailed(deku_error) => {
                write!(f, "failed to get byte representation of a chunk.\nInternal error: {deku_error:?}")
            }
            BadContainerMagic => write!(f, "compiled-artifact container has bad magic bytes"),
            UnknownPayloadKind(k) => write!(f, "compiled-artifact container has unknown payload kind {k}"),
            XmlParsingFailed(xml_error) => write!(f, "XML parsing error.\nInternal error: {xml_error:?}"),
            IntegerAttributeParsingFailed(v) => {
                write!(f, "expected an integer attribute value, got \"{v}\"")
            }
            ReferenceAttributeParsingFailed(attr) => write!(
                f,
                "failed to parse attribute reference \"{attr}\". Expected a format like \"@drawable/preview\"."
            ),
            UnknownAndroidInternalAttribute(attr) => write!(
                f,
                "unknown Android internal attribute \"{attr}\". It may not exist, or rescomp's table may be out of date."
            ),
            FileIoError(io_err) => write!(f, "file I/O failed.\nInternal error: {io_err:?}"),
            ZipWritingFailed(zip_error) => write!(f, "failed to write zip archive.\nInternal error: {zip_error:?}"),
            ArchiveWriterPoisoned(first) => write!(f, "archive writer already failed: {first}")
        }
    }
}

impl std::error::Error for RescompError {}

/// Makes it easier for `Result<Something, RescompError>` to cross an FFI-ish boundary.
impl From<RescompError> for String {
    fn from(value: RescompError) -> Self {
        format!("{value}")
    }
}

impl From<io::Error> for RescompError {
    fn from(value: io::Error) -> Self {
        RescompError::FileIoError(value.into())
    }
}

impl From<DekuError> for RescompError {
    fn from(value: DekuError) -> Self {
        RescompError::ByteSerialisationFailed(value)
    }
}

impl From<ZipError> for RescompError {
    fn from(value: ZipError) -> Self {
        RescompError::ZipWritingFailed(value.into())
    }
}

impl From<xml::reader::Error> for RescompError {
    fn from(value: xml::reader::Error) -> Self {
        RescompError::XmlParsingFailed(value)
    }
}
