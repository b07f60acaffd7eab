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

//! Shader stage and program handles.
//!
//! The id types are plain `Copy` names for device objects. [`ShaderStage`] and
//! [`Program`] are the *owning* handles: they are neither `Clone` nor `Copy`, so
//! moving one moves the responsibility of releasing the device object with it.

use crate::renderer::error::ContextError;
use crate::renderer::traits::RenderingContext;
use std::fmt;

/// The programmable stage a shader object is compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStageKind {
    /// The vertex shader stage.
    Vertex,
    /// The fragment (or pixel) shader stage.
    Fragment,
}

impl ShaderStageKind {
    /// Both stage kinds, in pipeline order.
    pub const ALL: [ShaderStageKind; 2] = [ShaderStageKind::Vertex, ShaderStageKind::Fragment];

    /// Returns the lowercase name used in logs and diagnostics.
    pub const fn as_str(self) -> &'static str {
        match self {
            ShaderStageKind::Vertex => "vertex",
            ShaderStageKind::Fragment => "fragment",
        }
    }
}

impl fmt::Display for ShaderStageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An opaque name for a shader object living on a rendering context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShaderId(pub u32);

/// An opaque name for a program object living on a rendering context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramId(pub u32);

/// A successfully compiled shader object, tagged with its stage kind.
///
/// The holder of a `ShaderStage` owns the underlying device object and must either
/// hand it to a [`Program`] or call [`ShaderStage::release`].
#[must_use = "a compiled shader stage leaks its shader object unless it is linked or released"]
#[derive(Debug, PartialEq, Eq)]
pub struct ShaderStage {
    id: ShaderId,
    kind: ShaderStageKind,
}

impl ShaderStage {
    /// Wraps a shader object that compiled successfully.
    pub fn new(id: ShaderId, kind: ShaderStageKind) -> Self {
        Self { id, kind }
    }

    /// The device name of the shader object.
    pub fn id(&self) -> ShaderId {
        self.id
    }

    /// The stage this shader was compiled for.
    pub fn kind(&self) -> ShaderStageKind {
        self.kind
    }

    /// Deletes the shader object from the context that created it.
    pub fn release(self, ctx: &mut dyn RenderingContext) -> Result<(), ContextError> {
        log::trace!("Releasing {} shader {:?}", self.kind, self.id);
        ctx.delete_shader(self.id)
    }
}

/// A linked program pairing exactly one vertex and one fragment stage.
///
/// A `Program` only exists for a link that succeeded. It owns both of its stages.
#[must_use = "a linked program leaks its program and shader objects unless it is destroyed"]
#[derive(Debug, PartialEq, Eq)]
pub struct Program {
    id: ProgramId,
    vertex: ShaderStage,
    fragment: ShaderStage,
}

impl Program {
    /// Wraps a program object whose link succeeded with the two given stages attached.
    pub fn new(id: ProgramId, vertex: ShaderStage, fragment: ShaderStage) -> Self {
        Self {
            id,
            vertex,
            fragment,
        }
    }

    /// The device name of the program object.
    pub fn id(&self) -> ProgramId {
        self.id
    }

    /// The vertex stage owned by this program.
    pub fn vertex_stage(&self) -> &ShaderStage {
        &self.vertex
    }

    /// The fragment stage owned by this program.
    pub fn fragment_stage(&self) -> &ShaderStage {
        &self.fragment
    }

    /// Deletes the program object and both of its stages.
    ///
    /// Every deletion is attempted even if an earlier one fails; the first error is
    /// returned. If the program is still the context's active program, the device
    /// keeps it (and its stages) alive until another program is installed.
    pub fn destroy(self, ctx: &mut dyn RenderingContext) -> Result<(), ContextError> {
        log::trace!("Destroying program {:?}", self.id);
        let program = ctx.delete_program(self.id);
        let fragment = self.fragment.release(ctx);
        let vertex = self.vertex.release(ctx);
        program.and(fragment).and(vertex)
    }
}
