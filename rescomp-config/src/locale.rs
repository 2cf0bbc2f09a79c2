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

//! Locale axis: short form (`en-rUS`) and BCP-47 form (`b+sr+Latn+419`).

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Locale {
    pub language: Option<String>,
    pub script: Option<String>,
    pub region: Option<String>
}

impl Locale {
    pub fn is_empty(&self) -> bool {
        self.language.is_none() && self.script.is_none() && self.region.is_none()
    }

    /// Introduced in SDK 21 because only BCP-47 can express a script subtag.
    pub fn implied_min_sdk(&self) -> u16 {
        if self.script.is_some() {
            21
        } else {
            0
        }
    }

    pub fn serialize(&self) -> String {
        if let Some(script) = &self.script {
            // BCP-47 form, used whenever a script is present.
            let mut out = String::from("b+");
            out.push_str(self.language.as_deref().unwrap_or(""));
            out.push('+');
            out.push_str(script);
            if let Some(region) = &self.region {
                out.push('+');
                out.push_str(region);
            }
            out
        } else {
            let mut out = self.language.clone().unwrap_or_default();
            if let Some(region) = &self.region {
                out.push_str("-r");
                out.push_str(region);
            }
            out
        }
    }

    /// Returns true if `self` (as found on a resource) is compatible with
    /// `target` (the device/request being matched).
    pub fn matches(&self, target: &Locale) -> bool {
        let lang_ok = match (&self.language, &target.language) {
            (None, _) => true,
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            (Some(_), None) => false
        };
        let region_ok = match (&self.region, &target.region) {
            (None, _) => true,
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            (Some(_), None) => false
        };
        let script_ok = match (&self.script, &target.script) {
            (None, _) => true,
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            (Some(_), None) => false
        };
        lang_ok && region_ok && script_ok
    }

    /// More specific iff it pins strictly more axes than `other`, checked in
    /// language -> script -> region order.
    pub fn specificity(&self) -> u8 {
        self.language.is_some() as u8 + self.script.is_some() as u8 + self.region.is_some() as u8
    }
}

/// Parses either the short form (`en`, `en-rUS`) or BCP-47 (`b+sr+Latn+419`).
/// Returns `None` if `token` doesn't look like a locale qualifier at all, so
/// the caller can fall through to trying the next axis.
pub fn parse_locale_token(token: &str) -> Option<Locale> {
    if let Some(rest) = token.strip_prefix("b+") {
        let parts: Vec<&str> = rest.split('+').collect();
        if parts.is_empty() || parts[0].is_empty() {
            return None;
        }
        let mut locale = Locale { language: Some(parts[0].to_lowercase()), script: None, region: None };
        for part in &parts[1..] {
            if part.len() == 4 && part.chars().all(|c| c.is_ascii_alphabetic()) {
                locale.script = Some(capitalize(part));
            } else {
                locale.region = Some(part.to_uppercase());
            }
        }
        return Some(locale);
    }

    if let Some(region) = token.strip_prefix('r') {
        // Bare "rUS" only appears following a language token; the caller
        // handles stitching it onto the previous Locale.
        if region.len() == 2 && region.chars().all(|c| c.is_ascii_uppercase()) {
            return Some(Locale { language: None, script: None, region: Some(region.into()) });
        }
        return None;
    }

    if (2..=3).contains(&token.len()) && token.chars().all(|c| c.is_ascii_lowercase()) {
        return Some(Locale { language: Some(token.into()), script: None, region: None });
    }

    None
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_form_round_trips() {
        let locale = Locale { language: Some("fr".into()), script: None, region: Some("FR".into()) };
        assert_eq!(locale.serialize(), "fr-rFR");
    }

    #[test]
    fn bcp47_round_trips() {
        let locale = parse_locale_token("b+sr+Latn+419").unwrap();
        assert_eq!(locale.language.as_deref(), Some("sr"));
        assert_eq!(locale.script.as_deref(), Some("Latn"));
        assert_eq!(locale.region.as_deref(), Some("419"));
        assert_eq!(locale.serialize(), "b+sr+Latn+419");
    }
}
