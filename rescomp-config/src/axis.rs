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

//! The fixed axis vocabulary and its parse/specificity precedence order.
//! Used both to drive qualifier parsing and as the bit layout for
//! [crate::Configuration::diff].

use bitflags::bitflags;

bitflags! {
    /// One bit per configuration axis. Bit order matches parse/specificity
    /// precedence (spec §4.1): earlier axes are more significant when
    /// comparing specificity.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct AxisSet: u32 {
        const MCC = 1 << 0;
        const MNC = 1 << 1;
        const LOCALE = 1 << 2;
        const LAYOUT_DIRECTION = 1 << 3;
        const SMALLEST_SCREEN_WIDTH_DP = 1 << 4;
        const SCREEN_WIDTH_DP = 1 << 5;
        const SCREEN_HEIGHT_DP = 1 << 6;
        const SCREEN_SIZE = 1 << 7;
        const SCREEN_LONG = 1 << 8;
        const SCREEN_ROUND = 1 << 9;
        const WIDE_COLOR_GAMUT = 1 << 10;
        const HDR = 1 << 11;
        const ORIENTATION = 1 << 12;
        const UI_MODE_TYPE = 1 << 13;
        const UI_MODE_NIGHT = 1 << 14;
        const DENSITY = 1 << 15;
        const TOUCHSCREEN = 1 << 16;
        const KEYBOARD_HIDDEN = 1 << 17;
        const KEYBOARD = 1 << 18;
        const NAV_HIDDEN = 1 << 19;
        const NAVIGATION = 1 << 20;
        const SCREEN_DIMENSIONS = 1 << 21;
        const VERSION = 1 << 22;
    }
}

/// All axes in parse/specificity precedence order, most significant first.
pub const AXIS_ORDER: &[AxisSet] = &[
    AxisSet::MCC,
    AxisSet::MNC,
    AxisSet::LOCALE,
    AxisSet::LAYOUT_DIRECTION,
    AxisSet::SMALLEST_SCREEN_WIDTH_DP,
    AxisSet::SCREEN_WIDTH_DP,
    AxisSet::SCREEN_HEIGHT_DP,
    AxisSet::SCREEN_SIZE,
    AxisSet::SCREEN_LONG,
    AxisSet::SCREEN_ROUND,
    AxisSet::WIDE_COLOR_GAMUT,
    AxisSet::HDR,
    AxisSet::ORIENTATION,
    AxisSet::UI_MODE_TYPE,
    AxisSet::UI_MODE_NIGHT,
    AxisSet::DENSITY,
    AxisSet::TOUCHSCREEN,
    AxisSet::KEYBOARD_HIDDEN,
    AxisSet::KEYBOARD,
    AxisSet::NAV_HIDDEN,
    AxisSet::NAVIGATION,
    AxisSet::SCREEN_DIMENSIONS,
    AxisSet::VERSION
];
