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

//! Lookup table for `android:`-namespaced attribute names. The real
//! framework table has over a thousand entries pulled from `android.jar`; a
//! representative subset is embedded here as a `phf` map built at compile
//! time, rather than generated by a build script.

use rescomp_common::{RescompError, Result};
use rescomp_model::AttributeFormat;

pub const ANDROID_ATTRIBUTE_PACKAGE: u32 = 0x0101_0000;

static INTERNAL_ATTRIBUTES: phf::Map<&'static str, u32> = phf::phf_map! {
    "theme" => 0x01010004,
    "label" => 0x01010001,
    "icon" => 0x01010002,
    "name" => 0x01010003,
    "permission" => 0x01010006,
    "exported" => 0x01010010,
    "hasCode" => 0x0101000c,
    "id" => 0x010100d0,
    "value" => 0x01010024,
    "layout_width" => 0x010100f4,
    "layout_height" => 0x010100f5,
    "text" => 0x01010084,
    "textColor" => 0x01010098,
    "textSize" => 0x01010095,
    "background" => 0x010100d4,
    "orientation" => 0x010100c4,
    "gravity" => 0x010100af,
    "padding" => 0x010100d5,
    "src" => 0x0101004d,
    "scrollbars" => 0x010100e2,
    "minSdkVersion" => 0x0101020c,
    "targetSdkVersion" => 0x01010270,
    "compileSdkVersion" => 0x01010572,
    "compileSdkVersionCodename" => 0x01010573,
    "versionCode" => 0x0101021b,
    "versionName" => 0x0101021c,
    "configChanges" => 0x0101001f,
    "screenOrientation" => 0x0101001e,
    "launchMode" => 0x0101001d,
    "windowSoftInputMode" => 0x0101022b,
    "enabled" => 0x0101000e,
    "visible" => 0x0101000f,
    "priority" => 0x0101001c,
    "resource" => 0x01010025
};

/// Hint used when an attribute's typed value can't be inferred from the raw
/// text alone (e.g. whether `"1"` means an integer or a boolean).
pub fn internal_attribute_format(attr_name: &str) -> AttributeFormat {
    match attr_name {
        "versionCode" | "compileSdkVersion" | "minSdkVersion" | "targetSdkVersion" | "priority" => {
            AttributeFormat::INTEGER
        }
        "hasCode" | "exported" | "enabled" | "visible" => AttributeFormat::BOOLEAN,
        _ => AttributeFormat::STRING
    }
}

pub fn lookup_internal_attribute_id(attr_name: &str) -> Result<u32> {
    INTERNAL_ATTRIBUTES
        .get(attr_name)
        .copied()
        .ok_or_else(|| RescompError::UnknownAndroidInternalAttribute(attr_name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_known_attribute() {
        assert_eq!(lookup_internal_attribute_id("name").unwrap(), 0x01010003);
    }

    #[test]
    fn rejects_unknown_attribute() {
        assert!(matches!(
            lookup_internal_attribute_id("definitelyNotARealAttribute"),
            Err(RescompError::UnknownAndroidInternalAttribute(_))
        ));
    }
}
