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

//! Per-compile-unit name resolution. The XML compiler runs one file at a
//! time (§5: compile phase is independent per file), so references to
//! resources defined elsewhere in the same compilation can only be resolved
//! to a symbolic name here; the reference resolver crate does the final
//! binding during link.

use rescomp_common::{RescompError, Result};
use rescomp_model::{ResourceName, ResourceType, SymbolicRef};

pub const ANDROID_NAMESPACE: &str = "http://schemas.android.com/apk/res/android";

/// Supplies best-effort resolution for non-`android:` references while a
/// single file is being compiled. A real build feeds this from the set of
/// resource names already known (from `R.txt`-like symbol tables or
/// previously compiled files); link-time resolution is authoritative.
pub trait SymbolResolver {
    /// `@[package:]type/name` -> best-known [SymbolicRef]. Returning an
    /// unresolved ref is not an error; final binding happens at link time.
    fn resolve_reference(&self, package: Option<&str>, type_name: &str, entry_name: &str) -> SymbolicRef;
}

/// A resolver that never has prior knowledge of anything; every reference
/// comes out unresolved and is left for the linker. `package` is left
/// empty when unspecified, meaning "resolve against whichever package this
/// file ends up compiled into".
#[derive(Debug, Default)]
pub struct DeferredResolver;

impl SymbolResolver for DeferredResolver {
    fn resolve_reference(&self, package: Option<&str>, type_name: &str, entry_name: &str) -> SymbolicRef {
        let type_ = ResourceType::parse(type_name).unwrap_or(ResourceType::Raw);
        let name = ResourceName { package: package.unwrap_or("").to_string(), type_, entry: entry_name.to_string() };
        SymbolicRef::unresolved(name)
    }
}

/// Splits `"@[+][package:]type/name"` into its parts. The `+` marks a
/// newly-declared id (`@+id/name`); callers collect those separately as
/// exported symbols (spec.md §4.10(d)).
pub struct ParsedReference {
    pub is_new_id: bool,
    pub package: Option<String>,
    pub type_name: String,
    pub entry_name: String
}

pub fn parse_reference(raw: &str) -> Result<ParsedReference> {
    let body = raw.strip_prefix('@').ok_or_else(|| RescompError::ReferenceAttributeParsingFailed(raw.to_string()))?;
    let (is_new_id, body) = match body.strip_prefix('+') {
        Some(rest) => (true, rest),
        None => (false, body)
    };
    let (package, rest) = match body.split_once(':') {
        Some((pkg, rest)) => (Some(pkg.to_string()), rest),
        None => (None, body)
    };
    let (type_name, entry_name) =
        rest.split_once('/').ok_or_else(|| RescompError::ReferenceAttributeParsingFailed(raw.to_string()))?;
    if type_name.is_empty() || entry_name.is_empty() {
        return Err(RescompError::ReferenceAttributeParsingFailed(raw.to_string()));
    }
    Ok(ParsedReference { is_new_id, package, type_name: type_name.to_string(), entry_name: entry_name.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_reference() {
        let r = parse_reference("@drawable/icon").unwrap();
        assert!(!r.is_new_id);
        assert_eq!(r.package, None);
        assert_eq!(r.type_name, "drawable");
        assert_eq!(r.entry_name, "icon");
    }

    #[test]
    fn parses_new_id_with_package() {
        let r = parse_reference("@+com.example:id/submit").unwrap();
        assert!(r.is_new_id);
        assert_eq!(r.package.as_deref(), Some("com.example"));
        assert_eq!(r.entry_name, "submit");
    }

    #[test]
    fn rejects_malformed_reference() {
        assert!(parse_reference("@drawable").is_err());
        assert!(parse_reference("not-a-reference").is_err());
    }
}
