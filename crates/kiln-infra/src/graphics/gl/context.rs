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

use std::fmt;

use glow::HasContext;
use kiln_core::renderer::api::{
    ContextInfo, GlError, GpuObjectKind, ObjectCounts, ProgramId, ShaderId, ShaderStageKind,
};
use kiln_core::{ContextError, RenderingContext};

use super::registry::GlRegistry;

fn gl_shader_type(kind: ShaderStageKind) -> u32 {
    match kind {
        ShaderStageKind::Vertex => glow::VERTEX_SHADER,
        ShaderStageKind::Fragment => glow::FRAGMENT_SHADER,
    }
}

/// A rendering context that forwards to a real OpenGL context through `glow`.
///
/// The GL context must be current on the calling thread for the whole lifetime of
/// this value. Native objects are named by opaque ids; an id this context never
/// handed out is not forwarded and records `INVALID_VALUE` instead. The driver
/// already defers deletion of attached shaders and of the active program; this type
/// mirrors that bookkeeping so [`live_objects`](RenderingContext::live_objects)
/// stays accurate.
pub struct GlowContext<G: HasContext> {
    gl: G,
    registry: GlRegistry<G::Shader, G::Program>,
    next_name: u32,
    object_limit: Option<usize>,
    pending_error: Option<GlError>,
}

impl<G: HasContext> fmt::Debug for GlowContext<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlowContext")
            .field("live", &self.registry.counts())
            .field("active_program", &self.registry.active())
            .finish_non_exhaustive()
    }
}

impl<G: HasContext> GlowContext<G> {
    /// Wraps a `glow` context.
    pub fn new(gl: G) -> Self {
        Self {
            gl,
            registry: GlRegistry::new(),
            next_name: 1,
            object_limit: None,
            pending_error: None,
        }
    }

    /// Caps the number of live shader and program objects.
    pub fn with_object_limit(mut self, limit: usize) -> Self {
        self.object_limit = Some(limit);
        self
    }

    /// Returns the wrapped `glow` context.
    pub fn gl(&self) -> &G {
        &self.gl
    }

    fn flag(&mut self, error: GlError) {
        if self.pending_error.is_none() {
            self.pending_error = Some(error);
        }
    }

    fn allocate_name(&mut self, object: GpuObjectKind) -> Result<u32, ContextError> {
        if self
            .object_limit
            .is_some_and(|limit| self.registry.counts().total() >= limit)
        {
            return Err(ContextError::OutOfMemory { object });
        }
        let name = self.next_name;
        self.next_name = name
            .checked_add(1)
            .ok_or(ContextError::OutOfMemory { object })?;
        Ok(name)
    }

    fn native_shader(&mut self, shader: ShaderId) -> Option<G::Shader> {
        let native = self.registry.shader(shader);
        if native.is_none() {
            self.flag(GlError::InvalidValue);
        }
        native
    }

    fn native_program(&mut self, program: ProgramId) -> Option<G::Program> {
        let native = self.registry.program(program);
        if native.is_none() {
            self.flag(GlError::InvalidValue);
        }
        native
    }
}

impl<G: HasContext> RenderingContext for GlowContext<G> {
    fn info(&self) -> ContextInfo {
        let renderer = unsafe { self.gl.get_parameter_string(glow::RENDERER) };
        let version = self.gl.version();
        ContextInfo {
            backend: if version.is_embedded {
                "opengl-es".to_string()
            } else {
                "opengl".to_string()
            },
            renderer: format!("{renderer} ({}.{})", version.major, version.minor),
            validating: false,
        }
    }

    fn create_shader(&mut self, kind: ShaderStageKind) -> Result<ShaderId, ContextError> {
        let id = ShaderId(self.allocate_name(GpuObjectKind::Shader)?);
        let native = unsafe { self.gl.create_shader(gl_shader_type(kind)) }
            .map_err(ContextError::BackendError)?;
        self.registry.insert_shader(id, native, kind);
        Ok(id)
    }

    fn shader_source(&mut self, shader: ShaderId, source: &str) -> Result<(), ContextError> {
        if let Some(native) = self.native_shader(shader) {
            unsafe { self.gl.shader_source(native, source) };
        }
        Ok(())
    }

    fn compile_shader(&mut self, shader: ShaderId) -> Result<(), ContextError> {
        if let Some(native) = self.native_shader(shader) {
            unsafe { self.gl.compile_shader(native) };
        }
        Ok(())
    }

    fn shader_compile_status(&mut self, shader: ShaderId) -> Result<bool, ContextError> {
        Ok(self
            .native_shader(shader)
            .is_some_and(|native| unsafe { self.gl.get_shader_compile_status(native) }))
    }

    fn shader_info_log(&mut self, shader: ShaderId) -> Result<String, ContextError> {
        Ok(self
            .native_shader(shader)
            .map(|native| unsafe { self.gl.get_shader_info_log(native) })
            .unwrap_or_default())
    }

    fn delete_shader(&mut self, shader: ShaderId) -> Result<(), ContextError> {
        if let Some(native) = self.native_shader(shader) {
            unsafe { self.gl.delete_shader(native) };
            self.registry.delete_shader(shader);
        }
        Ok(())
    }

    fn create_program(&mut self) -> Result<ProgramId, ContextError> {
        let id = ProgramId(self.allocate_name(GpuObjectKind::Program)?);
        let native = unsafe { self.gl.create_program() }.map_err(ContextError::BackendError)?;
        self.registry.insert_program(id, native);
        Ok(id)
    }

    fn attach_shader(&mut self, program: ProgramId, shader: ShaderId) -> Result<(), ContextError> {
        let (Some(native_program), Some(native_shader)) =
            (self.native_program(program), self.native_shader(shader))
        else {
            return Ok(());
        };
        match self.registry.attach(program, shader) {
            Ok(()) => unsafe { self.gl.attach_shader(native_program, native_shader) },
            Err(error) => self.flag(error),
        }
        Ok(())
    }

    fn detach_shader(&mut self, program: ProgramId, shader: ShaderId) -> Result<(), ContextError> {
        let (Some(native_program), Some(native_shader)) =
            (self.native_program(program), self.native_shader(shader))
        else {
            return Ok(());
        };
        match self.registry.detach(program, shader) {
            Ok(()) => unsafe { self.gl.detach_shader(native_program, native_shader) },
            Err(error) => self.flag(error),
        }
        Ok(())
    }

    fn link_program(&mut self, program: ProgramId) -> Result<(), ContextError> {
        if let Some(native) = self.native_program(program) {
            unsafe { self.gl.link_program(native) };
        }
        Ok(())
    }

    fn program_link_status(&mut self, program: ProgramId) -> Result<bool, ContextError> {
        Ok(self
            .native_program(program)
            .is_some_and(|native| unsafe { self.gl.get_program_link_status(native) }))
    }

    fn program_info_log(&mut self, program: ProgramId) -> Result<String, ContextError> {
        Ok(self
            .native_program(program)
            .map(|native| unsafe { self.gl.get_program_info_log(native) })
            .unwrap_or_default())
    }

    fn delete_program(&mut self, program: ProgramId) -> Result<(), ContextError> {
        let Some(native) = self.native_program(program) else {
            return Ok(());
        };
        unsafe { self.gl.delete_program(native) };
        self.registry.delete_program(program);
        Ok(())
    }

    fn use_program(&mut self, program: Option<ProgramId>) -> Result<(), ContextError> {
        let native = match program {
            Some(id) => {
                let Some(native) = self.native_program(id) else {
                    return Ok(());
                };
                if !unsafe { self.gl.get_program_link_status(native) } {
                    self.flag(GlError::InvalidOperation);
                    return Ok(());
                }
                Some(native)
            }
            None => None,
        };
        unsafe { self.gl.use_program(native) };
        self.registry.set_active(program);
        Ok(())
    }

    fn active_program(&self) -> Option<ProgramId> {
        self.registry.active()
    }

    fn get_error(&mut self) -> Result<Option<GlError>, ContextError> {
        if let Some(error) = self.pending_error.take() {
            return Ok(Some(error));
        }
        let raw = unsafe { self.gl.get_error() };
        Ok(GlError::from_raw(raw))
    }

    fn live_objects(&self) -> ObjectCounts {
        self.registry.counts()
    }
}
