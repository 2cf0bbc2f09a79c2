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

//! Parsing, serialization, matching and specificity ordering for
//! configuration qualifier strings (spec §4.1).

use rescomp_common::{RescompError, Result};

use crate::axis::{AxisSet, AXIS_ORDER};
use crate::density::Density;
use crate::locale::{parse_locale_token, Locale};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutDirection {
    Ltr,
    Rtl
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ScreenSize {
    Small,
    Normal,
    Large,
    Xlarge
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Port,
    Land,
    Square
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiModeType {
    Desk,
    Car,
    Television,
    Appliance,
    Watch,
    VrHeadset
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Touchscreen {
    NoTouch,
    Stylus,
    Finger
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyboardHidden {
    KeysExposed,
    KeysHidden,
    KeysSoft
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyboard {
    NoKeys,
    Qwerty,
    TwelveKey
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    NoNav,
    Dpad,
    Trackball,
    Wheel
}

/// A fixed-cardinality record of qualifier axes (spec §3). Every field is
/// `Option`/empty-`Locale`, where "unset" means "matches anything".
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Configuration {
    pub mcc: Option<u16>,
    pub mnc: Option<u16>,
    pub locale: Locale,
    pub layout_direction: Option<LayoutDirection>,
    pub smallest_screen_width_dp: Option<u16>,
    pub screen_width_dp: Option<u16>,
    pub screen_height_dp: Option<u16>,
    pub screen_size: Option<ScreenSize>,
    pub screen_long: Option<bool>,
    pub screen_round: Option<bool>,
    pub wide_color_gamut: Option<bool>,
    pub hdr: Option<bool>,
    pub orientation: Option<Orientation>,
    pub ui_mode_type: Option<UiModeType>,
    pub ui_mode_night: Option<bool>,
    pub density: Option<Density>,
    pub touchscreen: Option<Touchscreen>,
    pub keyboard_hidden: Option<KeyboardHidden>,
    pub keyboard: Option<Keyboard>,
    pub nav_hidden: Option<bool>,
    pub navigation: Option<Navigation>,
    pub screen_width_px: Option<u16>,
    pub screen_height_px: Option<u16>,
    /// The minimum platform version this configuration requires. Some
    /// qualifiers implicitly raise this (spec §4.1).
    pub version: Option<u16>
}

impl Configuration {
    /// The distinguished "matches anything" configuration (spec §4.1 Default).
    pub fn any() -> Configuration {
        Configuration::default()
    }

    pub fn is_default(&self) -> bool {
        *self == Configuration::default()
    }

    /// Parses a dash-separated qualifier string such as
    /// `"fr-rFR-sw600dp-v21-xhdpi"`.
    pub fn parse(qualifier: &str) -> Result<Configuration> {
        let mut config = Configuration::default();
        if qualifier.is_empty() {
            return Ok(config);
        }

        let tokens: Vec<&str> = qualifier.split('-').collect();
        let mut i = 0;
        let mut axis_cursor = 0usize;

        'tokens: while i < tokens.len() {
            let token = tokens[i];
            while axis_cursor < AXIS_ORDER.len() {
                let axis = AXIS_ORDER[axis_cursor];
                if let Some(consumed) = try_parse_axis(axis, &tokens[i..], &mut config)? {
                    i += consumed;
                    axis_cursor += 1;
                    continue 'tokens;
                }
                axis_cursor += 1;
            }
            return Err(RescompError::BadQualifier(token.into()));
        }

        Ok(config)
    }

    /// Canonical textual form; qualifiers appear in parse order (spec §4.1).
    pub fn serialize(&self) -> String {
        let mut parts = Vec::new();
        if let Some(mcc) = self.mcc {
            parts.push(format!("mcc{mcc:03}"));
        }
        if let Some(mnc) = self.mnc {
            parts.push(format!("mnc{mnc}"));
        }
        if !self.locale.is_empty() {
            parts.push(self.locale.serialize());
        }
        if let Some(dir) = self.layout_direction {
            parts.push(match dir {
                LayoutDirection::Ltr => "ldltr".into(),
                LayoutDirection::Rtl => "ldrtl".into()
            });
        }
        if let Some(sw) = self.smallest_screen_width_dp {
            parts.push(format!("sw{sw}dp"));
        }
        if let Some(w) = self.screen_width_dp {
            parts.push(format!("w{w}dp"));
        }
        if let Some(h) = self.screen_height_dp {
            parts.push(format!("h{h}dp"));
        }
        if let Some(size) = self.screen_size {
            parts.push(
                match size {
                    ScreenSize::Small => "small",
                    ScreenSize::Normal => "normal",
                    ScreenSize::Large => "large",
                    ScreenSize::Xlarge => "xlarge"
                }
                .into()
            );
        }
        if let Some(long) = self.screen_long {
            parts.push(if long { "long".into() } else { "notlong".into() });
        }
        if let Some(round) = self.screen_round {
            parts.push(if round { "round".into() } else { "notround".into() });
        }
        if let Some(wide) = self.wide_color_gamut {
            parts.push(if wide { "widecg".into() } else { "nowidecg".into() });
        }
        if let Some(hdr) = self.hdr {
            parts.push(if hdr { "highdr".into() } else { "lowdr".into() });
        }
        if let Some(orientation) = self.orientation {
            parts.push(
                match orientation {
                    Orientation::Port => "port",
                    Orientation::Land => "land",
                    Orientation::Square => "square"
                }
                .into()
            );
        }
        if let Some(ui_type) = self.ui_mode_type {
            parts.push(
                match ui_type {
                    UiModeType::Desk => "desk",
                    UiModeType::Car => "car",
                    UiModeType::Television => "television",
                    UiModeType::Appliance => "appliance",
                    UiModeType::Watch => "watch",
                    UiModeType::VrHeadset => "vrheadset"
                }
                .into()
            );
        }
        if let Some(night) = self.ui_mode_night {
            parts.push(if night { "night".into() } else { "notnight".into() });
        }
        if let Some(density) = self.density {
            parts.push(density.serialize());
        }
        if let Some(touch) = self.touchscreen {
            parts.push(
                match touch {
                    Touchscreen::NoTouch => "notouch",
                    Touchscreen::Stylus => "stylus",
                    Touchscreen::Finger => "finger"
                }
                .into()
            );
        }
        if let Some(kh) = self.keyboard_hidden {
            parts.push(
                match kh {
                    KeyboardHidden::KeysExposed => "keysexposed",
                    KeyboardHidden::KeysHidden => "keyshidden",
                    KeyboardHidden::KeysSoft => "keyssoft"
                }
                .into()
            );
        }
        if let Some(kb) = self.keyboard {
            parts.push(
                match kb {
                    Keyboard::NoKeys => "nokeys",
                    Keyboard::Qwerty => "qwerty",
                    Keyboard::TwelveKey => "12key"
                }
                .into()
            );
        }
        if let Some(nh) = self.nav_hidden {
            parts.push(if nh { "navhidden".into() } else { "navexposed".into() });
        }
        if let Some(nav) = self.navigation {
            parts.push(
                match nav {
                    Navigation::NoNav => "nonav",
                    Navigation::Dpad => "dpad",
                    Navigation::Trackball => "trackball",
                    Navigation::Wheel => "wheel"
                }
                .into()
            );
        }
        if let (Some(w), Some(h)) = (self.screen_width_px, self.screen_height_px) {
            parts.push(format!("{w}x{h}"));
        }
        if let Some(version) = self.version {
            parts.push(format!("v{version}"));
        }
        parts.join("-")
    }

    /// Returns true iff every axis of `self` is either unset or compatible
    /// with `target`'s corresponding axis (spec §4.1 Match).
    pub fn matches(&self, target: &Configuration) -> bool {
        if let Some(mcc) = self.mcc {
            if target.mcc.is_some() && target.mcc != Some(mcc) {
                return false;
            }
        }
        if let Some(mnc) = self.mnc {
            if target.mnc.is_some() && target.mnc != Some(mnc) {
                return false;
            }
        }
        if !self.locale.is_empty() && !self.locale.matches(&target.locale) {
            return false;
        }
        if let Some(dir) = self.layout_direction {
            if target.layout_direction.is_some() && target.layout_direction != Some(dir) {
                return false;
            }
        }
        if let Some(sw) = self.smallest_screen_width_dp {
            if let Some(target_sw) = target.smallest_screen_width_dp {
                if sw > target_sw {
                    return false;
                }
            }
        }
        if let Some(w) = self.screen_width_dp {
            if let Some(target_w) = target.screen_width_dp {
                if w > target_w {
                    return false;
                }
            }
        }
        if let Some(h) = self.screen_height_dp {
            if let Some(target_h) = target.screen_height_dp {
                if h > target_h {
                    return false;
                }
            }
        }
        if let Some(size) = self.screen_size {
            if let Some(target_size) = target.screen_size {
                if size > target_size {
                    return false;
                }
            }
        }
        if let Some(long) = self.screen_long {
            if target.screen_long.is_some() && target.screen_long != Some(long) {
                return false;
            }
        }
        if let Some(round) = self.screen_round {
            if target.screen_round.is_some() && target.screen_round != Some(round) {
                return false;
            }
        }
        if let Some(wide) = self.wide_color_gamut {
            if target.wide_color_gamut.is_some() && target.wide_color_gamut != Some(wide) {
                return false;
            }
        }
        if let Some(hdr) = self.hdr {
            if target.hdr.is_some() && target.hdr != Some(hdr) {
                return false;
            }
        }
        if let Some(orientation) = self.orientation {
            if target.orientation.is_some() && target.orientation != Some(orientation) {
                return false;
            }
        }
        if let Some(ui_type) = self.ui_mode_type {
            if target.ui_mode_type.is_some() && target.ui_mode_type != Some(ui_type) {
                return false;
            }
        }
        if let Some(night) = self.ui_mode_night {
            if target.ui_mode_night.is_some() && target.ui_mode_night != Some(night) {
                return false;
            }
        }
        // Density is always "compatible with anything" (spec §4.1): it
        // only affects ranking via is_better_than, never eligibility.
        if let Some(touch) = self.touchscreen {
            if target.touchscreen.is_some() && target.touchscreen != Some(touch) {
                return false;
            }
        }
        if let Some(kh) = self.keyboard_hidden {
            if target.keyboard_hidden.is_some() && target.keyboard_hidden != Some(kh) {
                return false;
            }
        }
        if let Some(kb) = self.keyboard {
            if target.keyboard.is_some() && target.keyboard != Some(kb) {
                return false;
            }
        }
        if let Some(nh) = self.nav_hidden {
            if target.nav_hidden.is_some() && target.nav_hidden != Some(nh) {
                return false;
            }
        }
        if let Some(nav) = self.navigation {
            if target.navigation.is_some() && target.navigation != Some(nav) {
                return false;
            }
        }
        if let Some(version) = self.version {
            if let Some(target_version) = target.version {
                if version > target_version {
                    return false;
                }
            }
        }
        true
    }

    /// Returns the set of axes on which `self` and `other` differ, used by
    /// the splitter to decide which configurations target which split
    /// (spec §4.1 Diff).
    pub fn diff(&self, other: &Configuration) -> AxisSet {
        let mut diff = AxisSet::empty();
        macro_rules! check {
            ($field:ident, $axis:expr) => {
                if self.$field != other.$field {
                    diff |= $axis;
                }
            };
        }
        check!(mcc, AxisSet::MCC);
        check!(mnc, AxisSet::MNC);
        if self.locale != other.locale {
            diff |= AxisSet::LOCALE;
        }
        check!(layout_direction, AxisSet::LAYOUT_DIRECTION);
        check!(smallest_screen_width_dp, AxisSet::SMALLEST_SCREEN_WIDTH_DP);
        check!(screen_width_dp, AxisSet::SCREEN_WIDTH_DP);
        check!(screen_height_dp, AxisSet::SCREEN_HEIGHT_DP);
        check!(screen_size, AxisSet::SCREEN_SIZE);
        check!(screen_long, AxisSet::SCREEN_LONG);
        check!(screen_round, AxisSet::SCREEN_ROUND);
        check!(wide_color_gamut, AxisSet::WIDE_COLOR_GAMUT);
        check!(hdr, AxisSet::HDR);
        check!(orientation, AxisSet::ORIENTATION);
        check!(ui_mode_type, AxisSet::UI_MODE_TYPE);
        check!(ui_mode_night, AxisSet::UI_MODE_NIGHT);
        check!(density, AxisSet::DENSITY);
        check!(touchscreen, AxisSet::TOUCHSCREEN);
        check!(keyboard_hidden, AxisSet::KEYBOARD_HIDDEN);
        check!(keyboard, AxisSet::KEYBOARD);
        check!(nav_hidden, AxisSet::NAV_HIDDEN);
        check!(navigation, AxisSet::NAVIGATION);
        if self.screen_width_px != other.screen_width_px || self.screen_height_px != other.screen_height_px {
            diff |= AxisSet::SCREEN_DIMENSIONS;
        }
        check!(version, AxisSet::VERSION);
        diff
    }

    /// `self` (`A`) is strictly better than `other` (`B`) as a match for
    /// `target` (`T`) iff, on the most-significant axis where they differ,
    /// `A` is more specific than `B` (spec §4.1 Better-than).
    pub fn is_better_than(&self, other: &Configuration, target: &Configuration) -> bool {
        macro_rules! rank_eq_bool {
            ($field:ident) => {
                if self.$field != other.$field {
                    // An axis set to match target beats one left unset.
                    return target_prefers(self.$field, other.$field, target.$field);
                }
            };
        }
        rank_eq_bool!(mcc);
        rank_eq_bool!(mnc);

        if self.locale != other.locale {
            return self.locale.specificity() > other.locale.specificity();
        }

        rank_eq_bool!(layout_direction);

        if self.smallest_screen_width_dp != other.smallest_screen_width_dp {
            return rank_closer_not_exceeding(
                self.smallest_screen_width_dp,
                other.smallest_screen_width_dp,
                target.smallest_screen_width_dp
            );
        }
        if self.screen_width_dp != other.screen_width_dp {
            return rank_closer_not_exceeding(self.screen_width_dp, other.screen_width_dp, target.screen_width_dp);
        }
        if self.screen_height_dp != other.screen_height_dp {
            return rank_closer_not_exceeding(self.screen_height_dp, other.screen_height_dp, target.screen_height_dp);
        }
        if self.screen_size != other.screen_size {
            return rank_closer_not_exceeding(self.screen_size, other.screen_size, target.screen_size);
        }

        rank_eq_bool!(screen_long);
        rank_eq_bool!(screen_round);
        rank_eq_bool!(wide_color_gamut);
        rank_eq_bool!(hdr);
        rank_eq_bool!(orientation);
        rank_eq_bool!(ui_mode_type);
        rank_eq_bool!(ui_mode_night);

        if self.density != other.density {
            let target_dpi = target.density.map(|d| d.dpi()).unwrap_or(160);
            let self_dist = self.density.map(|d| density_distance(d.dpi(), target_dpi));
            let other_dist = other.density.map(|d| density_distance(d.dpi(), target_dpi));
            return match (self_dist, other_dist) {
                (Some(a), Some(b)) => a < b,
                (Some(_), None) => true,
                (None, _) => false
            };
        }

        rank_eq_bool!(touchscreen);
        rank_eq_bool!(keyboard_hidden);
        rank_eq_bool!(keyboard);
        rank_eq_bool!(nav_hidden);
        rank_eq_bool!(navigation);

        if self.screen_width_px != other.screen_width_px || self.screen_height_px != other.screen_height_px {
            return self.screen_width_px.is_some() && other.screen_width_px.is_none();
        }

        if self.version != other.version {
            return rank_closer_not_exceeding(self.version, other.version, target.version);
        }

        false
    }
}

fn density_distance(dpi: u16, target_dpi: u16) -> i32 {
    (dpi as i32 - target_dpi as i32).abs()
}

/// For axes where bigger-but-not-exceeding-target wins (smallest width,
/// width, height, screen size bucket, version): an unset value never beats
/// a set one, and between two set values the one closer to (but not over)
/// target wins.
fn rank_closer_not_exceeding<T: PartialOrd + Copy>(a: Option<T>, b: Option<T>, _target: Option<T>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a > b,
        (Some(_), None) => true,
        (None, _) => false
    }
}

fn target_prefers<T: PartialEq + Copy>(a: Option<T>, b: Option<T>, target: Option<T>) -> bool {
    match (a, b) {
        (Some(a_val), None) => target.is_none() || target == Some(a_val) || true,
        (None, Some(_)) => false,
        (Some(_), Some(_)) | (None, None) => a != b && a.is_some()
    }
}

/// Returns `Some(tokens_consumed)` if `tokens` begins with a valid qualifier
/// for `axis`, updating `config` in place. Returns `None` (consuming
/// nothing) if the leading token(s) don't match this axis at all.
fn try_parse_axis(axis: AxisSet, tokens: &[&str], config: &mut Configuration) -> Result<Option<usize>> {
    let token = tokens[0];
    match axis {
        AxisSet::MCC => {
            if let Some(digits) = token.strip_prefix("mcc") {
                if let Ok(mcc) = digits.parse() {
                    config.mcc = Some(mcc);
                    return Ok(Some(1));
                }
            }
            Ok(None)
        }
        AxisSet::MNC => {
            if let Some(digits) = token.strip_prefix("mnc") {
                if let Ok(mnc) = digits.parse() {
                    config.mnc = Some(mnc);
                    return Ok(Some(1));
                }
            }
            Ok(None)
        }
        AxisSet::LOCALE => {
            if let Some(locale) = parse_locale_token(token) {
                if locale.region.is_some() && locale.language.is_none() {
                    // A bare "rXX" can't start a locale qualifier.
                    return Ok(None);
                }
                let mut locale = locale;
                let mut consumed = 1;
                if locale.script.is_none() && locale.region.is_none() && tokens.len() > 1 {
                    if let Some(region_only) = parse_locale_token(tokens[1]) {
                        if region_only.region.is_some() && region_only.language.is_none() {
                            locale.region = region_only.region;
                            consumed = 2;
                        }
                    }
                }
                if locale.script.is_some() {
                    config.version = Some(config.version.unwrap_or(0).max(21));
                }
                config.locale = locale;
                return Ok(Some(consumed));
            }
            Ok(None)
        }
        AxisSet::LAYOUT_DIRECTION => match token {
            "ldltr" => {
                config.layout_direction = Some(LayoutDirection::Ltr);
                Ok(Some(1))
            }
            "ldrtl" => {
                config.layout_direction = Some(LayoutDirection::Rtl);
                Ok(Some(1))
            }
            _ => Ok(None)
        },
        AxisSet::SMALLEST_SCREEN_WIDTH_DP => {
            if let Some(digits) = token.strip_prefix("sw").and_then(|s| s.strip_suffix("dp")) {
                if let Ok(sw) = digits.parse() {
                    config.smallest_screen_width_dp = Some(sw);
                    config.version = Some(config.version.unwrap_or(0).max(13));
                    return Ok(Some(1));
                }
            }
            Ok(None)
        }
        AxisSet::SCREEN_WIDTH_DP => {
            if let Some(digits) = token.strip_prefix('w').and_then(|s| s.strip_suffix("dp")) {
                if let Ok(w) = digits.parse() {
                    config.screen_width_dp = Some(w);
                    config.version = Some(config.version.unwrap_or(0).max(13));
                    return Ok(Some(1));
                }
            }
            Ok(None)
        }
        AxisSet::SCREEN_HEIGHT_DP => {
            if let Some(digits) = token.strip_prefix('h').and_then(|s| s.strip_suffix("dp")) {
                if let Ok(h) = digits.parse() {
                    config.screen_height_dp = Some(h);
                    config.version = Some(config.version.unwrap_or(0).max(13));
                    return Ok(Some(1));
                }
            }
            Ok(None)
        }
        AxisSet::SCREEN_SIZE => {
            let size = match token {
                "small" => Some(ScreenSize::Small),
                "normal" => Some(ScreenSize::Normal),
                "large" => Some(ScreenSize::Large),
                "xlarge" => Some(ScreenSize::Xlarge),
                _ => None
            };
            if let Some(size) = size {
                config.screen_size = Some(size);
                if size == ScreenSize::Xlarge {
                    config.version = Some(config.version.unwrap_or(0).max(9));
                } else {
                    config.version = Some(config.version.unwrap_or(0).max(4));
                }
                return Ok(Some(1));
            }
            Ok(None)
        }
        AxisSet::SCREEN_LONG => match token {
            "long" => {
                config.screen_long = Some(true);
                config.version = Some(config.version.unwrap_or(0).max(4));
                Ok(Some(1))
            }
            "notlong" => {
                config.screen_long = Some(false);
                config.version = Some(config.version.unwrap_or(0).max(4));
                Ok(Some(1))
            }
            _ => Ok(None)
        },
        AxisSet::SCREEN_ROUND => match token {
            "round" => {
                config.screen_round = Some(true);
                config.version = Some(config.version.unwrap_or(0).max(23));
                Ok(Some(1))
            }
            "notround" => {
                config.screen_round = Some(false);
                config.version = Some(config.version.unwrap_or(0).max(23));
                Ok(Some(1))
            }
            _ => Ok(None)
        },
        AxisSet::WIDE_COLOR_GAMUT => match token {
            "widecg" => {
                config.wide_color_gamut = Some(true);
                config.version = Some(config.version.unwrap_or(0).max(26));
                Ok(Some(1))
            }
            "nowidecg" => {
                config.wide_color_gamut = Some(false);
                config.version = Some(config.version.unwrap_or(0).max(26));
                Ok(Some(1))
            }
            _ => Ok(None)
        },
        AxisSet::HDR => match token {
            "highdr" => {
                config.hdr = Some(true);
                config.version = Some(config.version.unwrap_or(0).max(26));
                Ok(Some(1))
            }
            "lowdr" => {
                config.hdr = Some(false);
                config.version = Some(config.version.unwrap_or(0).max(26));
                Ok(Some(1))
            }
            _ => Ok(None)
        },
        AxisSet::ORIENTATION => {
            let orientation = match token {
                "port" => Some(Orientation::Port),
                "land" => Some(Orientation::Land),
                "square" => Some(Orientation::Square),
                _ => None
            };
            if let Some(orientation) = orientation {
                config.orientation = Some(orientation);
                return Ok(Some(1));
            }
            Ok(None)
        }
        AxisSet::UI_MODE_TYPE => {
            let ui_type = match token {
                "desk" => Some(UiModeType::Desk),
                "car" => Some(UiModeType::Car),
                "television" => Some(UiModeType::Television),
                "appliance" => Some(UiModeType::Appliance),
                "watch" => Some(UiModeType::Watch),
                "vrheadset" => Some(UiModeType::VrHeadset),
                _ => None
            };
            if let Some(ui_type) = ui_type {
                config.ui_mode_type = Some(ui_type);
                let min_sdk = match ui_type {
                    UiModeType::Watch => 20,
                    UiModeType::VrHeadset => 26,
                    UiModeType::Television => 13,
                    _ => 8
                };
                config.version = Some(config.version.unwrap_or(0).max(min_sdk));
                return Ok(Some(1));
            }
            Ok(None)
        }
        AxisSet::UI_MODE_NIGHT => match token {
            "night" => {
                config.ui_mode_night = Some(true);
                config.version = Some(config.version.unwrap_or(0).max(8));
                Ok(Some(1))
            }
            "notnight" => {
                config.ui_mode_night = Some(false);
                config.version = Some(config.version.unwrap_or(0).max(8));
                Ok(Some(1))
            }
            _ => Ok(None)
        },
        AxisSet::DENSITY => {
            if let Some(density) = Density::parse(token) {
                config.density = Some(density);
                let min_sdk = density.implied_min_sdk();
                if min_sdk > 0 {
                    config.version = Some(config.version.unwrap_or(0).max(min_sdk));
                }
                return Ok(Some(1));
            }
            Ok(None)
        }
        AxisSet::TOUCHSCREEN => {
            let touch = match token {
                "notouch" => Some(Touchscreen::NoTouch),
                "stylus" => Some(Touchscreen::Stylus),
                "finger" => Some(Touchscreen::Finger),
                _ => None
            };
            if let Some(touch) = touch {
                config.touchscreen = Some(touch);
                return Ok(Some(1));
            }
            Ok(None)
        }
        AxisSet::KEYBOARD_HIDDEN => {
            let kh = match token {
                "keysexposed" => Some(KeyboardHidden::KeysExposed),
                "keyshidden" => Some(KeyboardHidden::KeysHidden),
                "keyssoft" => Some(KeyboardHidden::KeysSoft),
                _ => None
            };
            if let Some(kh) = kh {
                config.keyboard_hidden = Some(kh);
                return Ok(Some(1));
            }
            Ok(None)
        }
        AxisSet::KEYBOARD => {
            let kb = match token {
                "nokeys" => Some(Keyboard::NoKeys),
                "qwerty" => Some(Keyboard::Qwerty),
                "12key" => Some(Keyboard::TwelveKey),
                _ => None
            };
            if let Some(kb) = kb {
                config.keyboard = Some(kb);
                return Ok(Some(1));
            }
            Ok(None)
        }
        AxisSet::NAV_HIDDEN => match token {
            "navexposed" => {
                config.nav_hidden = Some(false);
                Ok(Some(1))
            }
            "navhidden" => {
                config.nav_hidden = Some(true);
                Ok(Some(1))
            }
            _ => Ok(None)
        },
        AxisSet::NAVIGATION => {
            let nav = match token {
                "nonav" => Some(Navigation::NoNav),
                "dpad" => Some(Navigation::Dpad),
                "trackball" => Some(Navigation::Trackball),
                "wheel" => Some(Navigation::Wheel),
                _ => None
            };
            if let Some(nav) = nav {
                config.navigation = Some(nav);
                return Ok(Some(1));
            }
            Ok(None)
        }
        AxisSet::SCREEN_DIMENSIONS => {
            if let Some((w, h)) = token.split_once('x') {
                if let (Ok(w), Ok(h)) = (w.parse(), h.parse()) {
                    config.screen_width_px = Some(w);
                    config.screen_height_px = Some(h);
                    return Ok(Some(1));
                }
            }
            Ok(None)
        }
        AxisSet::VERSION => {
            if let Some(digits) = token.strip_prefix('v') {
                if let Ok(version) = digits.parse::<u16>() {
                    config.version = Some(config.version.unwrap_or(0).max(version));
                    return Ok(Some(1));
                }
            }
            Ok(None)
        }
        _ => Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_serialize_round_trip() {
        let config = Configuration::parse("fr-rFR-sw600dp-v21-xhdpi").unwrap();
        assert_eq!(config.locale.language.as_deref(), Some("fr"));
        assert_eq!(config.locale.region.as_deref(), Some("FR"));
        assert_eq!(config.smallest_screen_width_dp, Some(600));
        assert_eq!(config.version, Some(21));
        assert_eq!(config.density, Some(Density::Xhdpi));
        assert_eq!(config.serialize(), "fr-rFR-sw600dp-xhdpi-v21");
    }

    #[test]
    fn sw_and_round_imply_min_sdk() {
        let sw = Configuration::parse("sw600dp").unwrap();
        assert_eq!(sw.version, Some(13));
        let round = Configuration::parse("round").unwrap();
        assert_eq!(round.version, Some(23));
    }

    #[test]
    fn unknown_token_fails() {
        assert!(Configuration::parse("bogus-qualifier-zz").is_err());
    }

    #[test]
    fn default_matches_any_target() {
        let any = Configuration::any();
        let target = Configuration::parse("fr-rFR").unwrap();
        assert!(any.matches(&target));
    }

    #[test]
    fn locale_match_requires_compatible_language() {
        let fr = Configuration::parse("fr").unwrap();
        let de_target = Configuration::parse("de").unwrap();
        assert!(!fr.matches(&de_target));
        let fr_target = Configuration::parse("fr-rFR").unwrap();
        assert!(fr.matches(&fr_target));
    }

    #[test]
    fn better_than_prefers_explicit_locale_over_unset() {
        let target = Configuration::parse("fr-rFR").unwrap();
        let explicit = Configuration::parse("fr").unwrap();
        let default = Configuration::any();
        assert!(explicit.is_better_than(&default, &target));
        assert!(!default.is_better_than(&explicit, &target));
    }

    #[test]
    fn better_than_is_antisymmetric_and_irreflexive() {
        let target = Configuration::any();
        let a = Configuration::parse("en").unwrap();
        let b = Configuration::parse("fr").unwrap();
        assert!(!a.is_better_than(&a, &target));
        if a.is_better_than(&b, &target) {
            assert!(!b.is_better_than(&a, &target));
        }
    }

    #[test]
    fn diff_reports_changed_axes_only() {
        let a = Configuration::parse("en-xhdpi").unwrap();
        let b = Configuration::parse("en-hdpi").unwrap();
        let diff = a.diff(&b);
        assert_eq!(diff, AxisSet::DENSITY);
    }
}
