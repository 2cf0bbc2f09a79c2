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

//! Configuration qualifier algebra: parsing, serialization, matching and
//! specificity ordering for resource configuration qualifier strings.

mod axis;
mod configuration;
mod density;
mod locale;

pub use axis::{AxisSet, AXIS_ORDER};
pub use configuration::{
    Configuration, Keyboard, KeyboardHidden, LayoutDirection, Navigation, Orientation, ScreenSize, Touchscreen,
    UiModeType
};
pub use density::Density;
pub use locale::{parse_locale_token, Locale};
