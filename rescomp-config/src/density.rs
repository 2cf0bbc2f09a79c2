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

//! The density axis: named buckets, numeric `NNNdpi`, and the `nodpi`/`anydpi`
//! sentinels (spec §4.1).

/// A resolved screen density. `dpi()` is the value used for "closer wins"
/// comparisons; `No` and `Any` never participate in that comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Density {
    Ldpi,
    Mdpi,
    Tvdpi,
    Hdpi,
    Xhdpi,
    Xxhdpi,
    Xxxhdpi,
    /// Explicit numeric density, e.g. `280dpi`.
    Numeric(u16),
    /// `nodpi`: this resource is density-independent and should never be
    /// scaled, but is still a concrete value (not "unset").
    No,
    /// `anydpi`: matches any requested density equally well (vector drawables).
    Any
}

impl Density {
    pub fn dpi(self) -> u16 {
        match self {
            Density::Ldpi => 120,
            Density::Mdpi => 160,
            Density::Tvdpi => 213,
            Density::Hdpi => 240,
            Density::Xhdpi => 320,
            Density::Xxhdpi => 480,
            Density::Xxxhdpi => 640,
            Density::Numeric(dpi) => dpi,
            Density::No | Density::Any => 0
        }
    }

    pub fn parse(token: &str) -> Option<Density> {
        match token {
            "ldpi" => Some(Density::Ldpi),
            "mdpi" => Some(Density::Mdpi),
            "tvdpi" => Some(Density::Tvdpi),
            "hdpi" => Some(Density::Hdpi),
            "xhdpi" => Some(Density::Xhdpi),
            "xxhdpi" => Some(Density::Xxhdpi),
            "xxxhdpi" => Some(Density::Xxxhdpi),
            "nodpi" => Some(Density::No),
            "anydpi" => Some(Density::Any),
            _ => {
                let digits = token.strip_suffix("dpi")?;
                digits.parse::<u16>().ok().map(Density::Numeric)
            }
        }
    }

    pub fn serialize(self) -> String {
        match self {
            Density::Ldpi => "ldpi".into(),
            Density::Mdpi => "mdpi".into(),
            Density::Tvdpi => "tvdpi".into(),
            Density::Hdpi => "hdpi".into(),
            Density::Xhdpi => "xhdpi".into(),
            Density::Xxhdpi => "xxhdpi".into(),
            Density::Xxxhdpi => "xxxhdpi".into(),
            Density::No => "nodpi".into(),
            Density::Any => "anydpi".into(),
            Density::Numeric(dpi) => format!("{dpi}dpi")
        }
    }

    /// Introduced in SDK 4 (named buckets existed from 1.6) except for
    /// `tvdpi` (SDK 13) and `anydpi` (SDK 21).
    pub fn implied_min_sdk(self) -> u16 {
        match self {
            Density::Tvdpi => 13,
            Density::Any => 21,
            Density::Xxhdpi => 16,
            Density::Xxxhdpi => 18,
            _ => 0
        }
    }
}
