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

//! Context-level descriptive types: error flags, object accounting, and driver info.

use std::fmt;

/// A GL-style error flag recorded by a driver when a call is misused.
///
/// Raw drivers never fail such a call; they ignore it and record the flag, which is
/// read (and cleared) with [`RenderingContext::get_error`](crate::RenderingContext::get_error).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlError {
    /// An enum argument is out of range.
    InvalidEnum,
    /// A numeric or object-name argument is out of range or unknown.
    InvalidValue,
    /// The operation is not allowed in the current state.
    InvalidOperation,
    /// Not enough memory is left to execute the command.
    OutOfMemory,
    /// The framebuffer object is not complete.
    InvalidFramebufferOperation,
}

impl GlError {
    /// Returns the GL enum value for this error.
    pub const fn to_raw(self) -> u32 {
        match self {
            GlError::InvalidEnum => 0x0500,
            GlError::InvalidValue => 0x0501,
            GlError::InvalidOperation => 0x0502,
            GlError::OutOfMemory => 0x0505,
            GlError::InvalidFramebufferOperation => 0x0506,
        }
    }

    /// Maps a raw GL error enum. `NO_ERROR` and unknown values map to `None`.
    pub const fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0x0500 => Some(GlError::InvalidEnum),
            0x0501 => Some(GlError::InvalidValue),
            0x0502 => Some(GlError::InvalidOperation),
            0x0505 => Some(GlError::OutOfMemory),
            0x0506 => Some(GlError::InvalidFramebufferOperation),
            _ => None,
        }
    }
}

impl fmt::Display for GlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GlError::InvalidEnum => "INVALID_ENUM",
            GlError::InvalidValue => "INVALID_VALUE",
            GlError::InvalidOperation => "INVALID_OPERATION",
            GlError::OutOfMemory => "OUT_OF_MEMORY",
            GlError::InvalidFramebufferOperation => "INVALID_FRAMEBUFFER_OPERATION",
        };
        f.write_str(name)
    }
}

/// The kinds of device objects the pipeline allocates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GpuObjectKind {
    /// A shader object.
    Shader,
    /// A program object.
    Program,
}

impl fmt::Display for GpuObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuObjectKind::Shader => f.write_str("shader object"),
            GpuObjectKind::Program => f.write_str("program object"),
        }
    }
}

/// The number of device objects a context still holds.
///
/// Objects whose deletion was deferred (attached shaders, the active program) are
/// counted until they are actually freed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObjectCounts {
    /// Live shader objects.
    pub shaders: usize,
    /// Live program objects.
    pub programs: usize,
}

impl ObjectCounts {
    /// All live objects.
    pub fn total(&self) -> usize {
        self.shaders + self.programs
    }
}

/// Describes the driver behind a rendering context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextInfo {
    /// Short backend name (e.g. "software", "opengl").
    pub backend: String,
    /// Human-readable renderer string reported by the driver.
    pub renderer: String,
    /// `true` when calls go through the validating decorator.
    pub validating: bool,
}
