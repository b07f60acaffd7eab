// Copyright 2025 eraflo
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

//! Graphics drivers and context acquisition.
//!
//! - [`software`]: an in-memory reference driver that compiles GLSL with `naga`.
//! - [`gl`]: a driver forwarding to a real OpenGL context through `glow`.
//! - [`debug`]: the validating decorator wrapped around a raw driver in debug mode.
//! - [`surface`]: drawable surfaces contexts are requested from.

mod acquire;
pub mod debug;
#[cfg(feature = "gl")]
pub mod gl;
pub mod software;
pub mod surface;

pub use self::acquire::{acquire, acquire_with};
pub use self::debug::{Diagnostic, ValidatingContext};
#[cfg(feature = "gl")]
pub use self::gl::GlowContext;
pub use self::software::SoftwareContext;
#[cfg(feature = "gl")]
pub use self::surface::GlowSurface;
pub use self::surface::HeadlessSurface;
