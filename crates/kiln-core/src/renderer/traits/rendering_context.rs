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

use crate::renderer::api::{
    ContextInfo, GlError, ObjectCounts, ProgramId, ShaderId, ShaderStageKind,
};
use crate::renderer::error::ContextError;
use std::fmt::Debug;

/// The operations a rendering context exposes to the shader program pipeline.
///
/// This is a GL-shaped interface: objects are named by opaque ids, and a raw driver
/// answers misuse (an unknown id, an illegal state) by ignoring the call and recording
/// a [`GlError`] flag rather than failing it. The validating decorator implements the
/// same trait and turns such misuse into [`ContextError::Rejected`].
///
/// Every implementation owns a single "active program" slot.
pub trait RenderingContext: Debug {
    /// Describes the driver behind this context.
    fn info(&self) -> ContextInfo;

    /// Allocates a shader object for the given stage.
    /// ## Errors
    /// * `OutOfMemory` - If the device refuses the allocation.
    /// * `ContextLost` - If the context is gone.
    fn create_shader(&mut self, kind: ShaderStageKind) -> Result<ShaderId, ContextError>;

    /// Replaces the source text of a shader object.
    fn shader_source(&mut self, shader: ShaderId, source: &str) -> Result<(), ContextError>;

    /// Compiles the current source of a shader object.
    fn compile_shader(&mut self, shader: ShaderId) -> Result<(), ContextError>;

    /// Returns whether the last compilation of the shader succeeded.
    fn shader_compile_status(&mut self, shader: ShaderId) -> Result<bool, ContextError>;

    /// Returns the driver's diagnostic log for the last compilation of the shader.
    fn shader_info_log(&mut self, shader: ShaderId) -> Result<String, ContextError>;

    /// Deletes a shader object.
    ///
    /// A shader that is still attached to a program is only flagged; it is freed
    /// once it is no longer attached to any program.
    fn delete_shader(&mut self, shader: ShaderId) -> Result<(), ContextError>;

    /// Allocates a program object.
    /// ## Errors
    /// * `OutOfMemory` - If the device refuses the allocation.
    /// * `ContextLost` - If the context is gone.
    fn create_program(&mut self) -> Result<ProgramId, ContextError>;

    /// Attaches a shader object to a program object.
    fn attach_shader(&mut self, program: ProgramId, shader: ShaderId) -> Result<(), ContextError>;

    /// Detaches a shader object from a program object.
    fn detach_shader(&mut self, program: ProgramId, shader: ShaderId) -> Result<(), ContextError>;

    /// Links the shaders attached to a program object.
    fn link_program(&mut self, program: ProgramId) -> Result<(), ContextError>;

    /// Returns whether the last link of the program succeeded.
    fn program_link_status(&mut self, program: ProgramId) -> Result<bool, ContextError>;

    /// Returns the driver's diagnostic log for the last link of the program.
    fn program_info_log(&mut self, program: ProgramId) -> Result<String, ContextError>;

    /// Deletes a program object.
    ///
    /// Deleting the active program only flags it; it is freed when another program
    /// (or none) is installed.
    fn delete_program(&mut self, program: ProgramId) -> Result<(), ContextError>;

    /// Installs a linked program as the active program, or clears the slot with `None`.
    fn use_program(&mut self, program: Option<ProgramId>) -> Result<(), ContextError>;

    /// Returns the program currently installed in the active slot.
    fn active_program(&self) -> Option<ProgramId>;

    /// Returns and clears the first error flag recorded since the last call.
    fn get_error(&mut self) -> Result<Option<GlError>, ContextError>;

    /// Returns how many device objects this context still holds.
    fn live_objects(&self) -> ObjectCounts;
}

impl<T: RenderingContext + ?Sized> RenderingContext for Box<T> {
    fn info(&self) -> ContextInfo {
        (**self).info()
    }

    fn create_shader(&mut self, kind: ShaderStageKind) -> Result<ShaderId, ContextError> {
        (**self).create_shader(kind)
    }

    fn shader_source(&mut self, shader: ShaderId, source: &str) -> Result<(), ContextError> {
        (**self).shader_source(shader, source)
    }

    fn compile_shader(&mut self, shader: ShaderId) -> Result<(), ContextError> {
        (**self).compile_shader(shader)
    }

    fn shader_compile_status(&mut self, shader: ShaderId) -> Result<bool, ContextError> {
        (**self).shader_compile_status(shader)
    }

    fn shader_info_log(&mut self, shader: ShaderId) -> Result<String, ContextError> {
        (**self).shader_info_log(shader)
    }

    fn delete_shader(&mut self, shader: ShaderId) -> Result<(), ContextError> {
        (**self).delete_shader(shader)
    }

    fn create_program(&mut self) -> Result<ProgramId, ContextError> {
        (**self).create_program()
    }

    fn attach_shader(&mut self, program: ProgramId, shader: ShaderId) -> Result<(), ContextError> {
        (**self).attach_shader(program, shader)
    }

    fn detach_shader(&mut self, program: ProgramId, shader: ShaderId) -> Result<(), ContextError> {
        (**self).detach_shader(program, shader)
    }

    fn link_program(&mut self, program: ProgramId) -> Result<(), ContextError> {
        (**self).link_program(program)
    }

    fn program_link_status(&mut self, program: ProgramId) -> Result<bool, ContextError> {
        (**self).program_link_status(program)
    }

    fn program_info_log(&mut self, program: ProgramId) -> Result<String, ContextError> {
        (**self).program_info_log(program)
    }

    fn delete_program(&mut self, program: ProgramId) -> Result<(), ContextError> {
        (**self).delete_program(program)
    }

    fn use_program(&mut self, program: Option<ProgramId>) -> Result<(), ContextError> {
        (**self).use_program(program)
    }

    fn active_program(&self) -> Option<ProgramId> {
        (**self).active_program()
    }

    fn get_error(&mut self) -> Result<Option<GlError>, ContextError> {
        (**self).get_error()
    }

    fn live_objects(&self) -> ObjectCounts {
        (**self).live_objects()
    }
}
