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

use std::collections::HashMap;
use std::fmt;

use kiln_core::renderer::api::{
    ContextInfo, GlError, ObjectCounts, ProgramId, ShaderId, ShaderStageKind,
};
use kiln_core::{ContextError, RenderingContext};

use super::diagnostic::{log_sink, Diagnostic, DiagnosticSink};

#[derive(Debug, Default)]
struct ShadowProgram {
    vertex: Option<ShaderId>,
    fragment: Option<ShaderId>,
}

impl ShadowProgram {
    fn slot_mut(&mut self, kind: ShaderStageKind) -> &mut Option<ShaderId> {
        match kind {
            ShaderStageKind::Vertex => &mut self.vertex,
            ShaderStageKind::Fragment => &mut self.fragment,
        }
    }
}

/// A [`RenderingContext`] decorator that rejects misuse instead of letting the
/// driver silently ignore it.
///
/// Every shader and program created through this context is recorded. Calls naming
/// an object that was never created here (or was already deleted) are rejected with
/// `INVALID_VALUE` before they reach the driver. Attaching a second shader of the
/// same kind, detaching a shader that is not attached, and installing a program that
/// is not linked are rejected with `INVALID_OPERATION`. Any flag the driver raises
/// during a forwarded mutating call is also turned into a rejection.
pub struct ValidatingContext<C: RenderingContext> {
    inner: C,
    shaders: HashMap<ShaderId, ShaderStageKind>,
    programs: HashMap<ProgramId, ShadowProgram>,
    sink: DiagnosticSink,
    trace_calls: bool,
}

impl<C: RenderingContext> fmt::Debug for ValidatingContext<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatingContext")
            .field("inner", &self.inner)
            .field("shaders", &self.shaders.len())
            .field("programs", &self.programs.len())
            .field("trace_calls", &self.trace_calls)
            .finish_non_exhaustive()
    }
}

impl<C: RenderingContext> ValidatingContext<C> {
    /// Wraps a raw context. Diagnostics go to `log::error!`.
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            shaders: HashMap::new(),
            programs: HashMap::new(),
            sink: log_sink(),
            trace_calls: false,
        }
    }

    /// Replaces the diagnostic sink.
    pub fn with_sink(mut self, sink: impl FnMut(&Diagnostic) + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Logs every forwarded call at `trace` level when enabled.
    pub fn with_call_tracing(mut self, enabled: bool) -> Self {
        self.trace_calls = enabled;
        self
    }

    /// Returns the wrapped context.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Unwraps the decorator.
    pub fn into_inner(self) -> C {
        self.inner
    }

    fn reject(&mut self, call: &'static str, code: GlError, message: String) -> ContextError {
        let diagnostic = Diagnostic {
            call,
            code,
            message,
        };
        (self.sink)(&diagnostic);
        diagnostic.into()
    }

    fn trace(&self, call: &'static str, args: fmt::Arguments<'_>) {
        if self.trace_calls {
            log::trace!("{call}({args})");
        }
    }

    fn require_shader(
        &mut self,
        call: &'static str,
        shader: ShaderId,
    ) -> Result<ShaderStageKind, ContextError> {
        match self.shaders.get(&shader) {
            Some(kind) => Ok(*kind),
            None => Err(self.reject(
                call,
                GlError::InvalidValue,
                format!("{shader:?} is not a live shader of this context"),
            )),
        }
    }

    fn require_program(&mut self, call: &'static str, program: ProgramId) -> Result<(), ContextError> {
        if self.programs.contains_key(&program) {
            Ok(())
        } else {
            Err(self.reject(
                call,
                GlError::InvalidValue,
                format!("{program:?} is not a live program of this context"),
            ))
        }
    }

    /// Clears a flag raised before `call`, so the call is not blamed for it.
    fn clear_stale_flag(&mut self, call: &'static str) -> Result<(), ContextError> {
        if let Some(code) = self.inner.get_error()? {
            log::warn!("Discarding {code} raised before `{call}`");
        }
        Ok(())
    }

    /// Reads the driver flag left by a forwarded call.
    fn check_flag(&mut self, call: &'static str) -> Result<(), ContextError> {
        match self.inner.get_error()? {
            Some(code) => Err(self.reject(
                call,
                code,
                "the driver flagged an error during the call".to_string(),
            )),
            None => Ok(()),
        }
    }
}

impl<C: RenderingContext> RenderingContext for ValidatingContext<C> {
    fn info(&self) -> ContextInfo {
        ContextInfo {
            validating: true,
            ..self.inner.info()
        }
    }

    fn create_shader(&mut self, kind: ShaderStageKind) -> Result<ShaderId, ContextError> {
        self.trace("createShader", format_args!("{kind}"));
        self.clear_stale_flag("createShader")?;
        let created = self.inner.create_shader(kind);
        if created.is_err() {
            // The refusal itself is the error; the flag it left behind is stale.
            let _ = self.inner.get_error();
        }
        let shader = created?;
        if let Err(err) = self.check_flag("createShader") {
            // The caller never sees the id, so it cannot release it.
            if let Err(cleanup) = self.inner.delete_shader(shader) {
                log::warn!("Failed to delete {shader:?} after a rejected create: {cleanup}");
            }
            return Err(err);
        }
        self.shaders.insert(shader, kind);
        Ok(shader)
    }

    fn shader_source(&mut self, shader: ShaderId, source: &str) -> Result<(), ContextError> {
        self.require_shader("shaderSource", shader)?;
        self.trace("shaderSource", format_args!("{shader:?}, {} bytes", source.len()));
        self.clear_stale_flag("shaderSource")?;
        self.inner.shader_source(shader, source)?;
        self.check_flag("shaderSource")
    }

    fn compile_shader(&mut self, shader: ShaderId) -> Result<(), ContextError> {
        self.require_shader("compileShader", shader)?;
        self.trace("compileShader", format_args!("{shader:?}"));
        self.clear_stale_flag("compileShader")?;
        self.inner.compile_shader(shader)?;
        self.check_flag("compileShader")
    }

    fn shader_compile_status(&mut self, shader: ShaderId) -> Result<bool, ContextError> {
        self.require_shader("getShaderParameter", shader)?;
        self.inner.shader_compile_status(shader)
    }

    fn shader_info_log(&mut self, shader: ShaderId) -> Result<String, ContextError> {
        self.require_shader("getShaderInfoLog", shader)?;
        self.inner.shader_info_log(shader)
    }

    fn delete_shader(&mut self, shader: ShaderId) -> Result<(), ContextError> {
        self.require_shader("deleteShader", shader)?;
        self.trace("deleteShader", format_args!("{shader:?}"));
        self.clear_stale_flag("deleteShader")?;
        self.inner.delete_shader(shader)?;
        self.shaders.remove(&shader);
        self.check_flag("deleteShader")
    }

    fn create_program(&mut self) -> Result<ProgramId, ContextError> {
        self.trace("createProgram", format_args!(""));
        self.clear_stale_flag("createProgram")?;
        let created = self.inner.create_program();
        if created.is_err() {
            let _ = self.inner.get_error();
        }
        let program = created?;
        if let Err(err) = self.check_flag("createProgram") {
            if let Err(cleanup) = self.inner.delete_program(program) {
                log::warn!("Failed to delete {program:?} after a rejected create: {cleanup}");
            }
            return Err(err);
        }
        self.programs.insert(program, ShadowProgram::default());
        Ok(program)
    }

    fn attach_shader(&mut self, program: ProgramId, shader: ShaderId) -> Result<(), ContextError> {
        self.require_program("attachShader", program)?;
        let kind = self.require_shader("attachShader", shader)?;
        let occupied = self
            .programs
            .get(&program)
            .and_then(|p| match kind {
                ShaderStageKind::Vertex => p.vertex,
                ShaderStageKind::Fragment => p.fragment,
            });
        if let Some(existing) = occupied {
            return Err(self.reject(
                "attachShader",
                GlError::InvalidOperation,
                format!("{program:?} already has a {kind} shader attached ({existing:?})"),
            ));
        }

        self.trace("attachShader", format_args!("{program:?}, {shader:?}"));
        self.clear_stale_flag("attachShader")?;
        self.inner.attach_shader(program, shader)?;
        if let Some(shadow) = self.programs.get_mut(&program) {
            *shadow.slot_mut(kind) = Some(shader);
        }
        self.check_flag("attachShader")
    }

    fn detach_shader(&mut self, program: ProgramId, shader: ShaderId) -> Result<(), ContextError> {
        self.require_program("detachShader", program)?;
        let kind = self.require_shader("detachShader", shader)?;
        let attached = self
            .programs
            .get_mut(&program)
            .is_some_and(|p| *p.slot_mut(kind) == Some(shader));
        if !attached {
            return Err(self.reject(
                "detachShader",
                GlError::InvalidOperation,
                format!("{shader:?} is not attached to {program:?}"),
            ));
        }

        self.trace("detachShader", format_args!("{program:?}, {shader:?}"));
        self.clear_stale_flag("detachShader")?;
        self.inner.detach_shader(program, shader)?;
        if let Some(shadow) = self.programs.get_mut(&program) {
            *shadow.slot_mut(kind) = None;
        }
        self.check_flag("detachShader")
    }

    fn link_program(&mut self, program: ProgramId) -> Result<(), ContextError> {
        self.require_program("linkProgram", program)?;
        self.trace("linkProgram", format_args!("{program:?}"));
        self.clear_stale_flag("linkProgram")?;
        self.inner.link_program(program)?;
        self.check_flag("linkProgram")
    }

    fn program_link_status(&mut self, program: ProgramId) -> Result<bool, ContextError> {
        self.require_program("getProgramParameter", program)?;
        self.inner.program_link_status(program)
    }

    fn program_info_log(&mut self, program: ProgramId) -> Result<String, ContextError> {
        self.require_program("getProgramInfoLog", program)?;
        self.inner.program_info_log(program)
    }

    fn delete_program(&mut self, program: ProgramId) -> Result<(), ContextError> {
        self.require_program("deleteProgram", program)?;
        self.trace("deleteProgram", format_args!("{program:?}"));
        self.clear_stale_flag("deleteProgram")?;
        self.inner.delete_program(program)?;
        self.programs.remove(&program);
        self.check_flag("deleteProgram")
    }

    fn use_program(&mut self, program: Option<ProgramId>) -> Result<(), ContextError> {
        if let Some(id) = program {
            self.require_program("useProgram", id)?;
            if !self.inner.program_link_status(id)? {
                return Err(self.reject(
                    "useProgram",
                    GlError::InvalidOperation,
                    format!("{id:?} is not linked"),
                ));
            }
        }
        self.trace("useProgram", format_args!("{program:?}"));
        self.clear_stale_flag("useProgram")?;
        self.inner.use_program(program)?;
        self.check_flag("useProgram")
    }

    fn active_program(&self) -> Option<ProgramId> {
        self.inner.active_program()
    }

    fn get_error(&mut self) -> Result<Option<GlError>, ContextError> {
        self.inner.get_error()
    }

    fn live_objects(&self) -> ObjectCounts {
        self.inner.live_objects()
    }
}
