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

use kiln_core::renderer::api::{
    ContextInfo, ContextSettings, GlError, GpuObjectKind, ObjectCounts, ProgramId, ShaderId,
    ShaderStageKind,
};
use kiln_core::{ContextError, RenderingContext};

use super::frontend::compile_glsl;
use super::interface::{match_interfaces, Varying};

#[derive(Debug)]
struct SoftwareShader {
    kind: ShaderStageKind,
    source: Option<String>,
    module: Option<naga::Module>,
    info_log: String,
    /// Number of programs this shader is attached to.
    attachments: usize,
    delete_pending: bool,
}

impl SoftwareShader {
    fn new(kind: ShaderStageKind) -> Self {
        Self {
            kind,
            source: None,
            module: None,
            info_log: String::new(),
            attachments: 0,
            delete_pending: false,
        }
    }
}

#[derive(Debug, Default)]
struct SoftwareProgram {
    vertex: Option<ShaderId>,
    fragment: Option<ShaderId>,
    linked: bool,
    info_log: String,
    varyings: Vec<Varying>,
    delete_pending: bool,
}

impl SoftwareProgram {
    fn slot_mut(&mut self, kind: ShaderStageKind) -> &mut Option<ShaderId> {
        match kind {
            ShaderStageKind::Vertex => &mut self.vertex,
            ShaderStageKind::Fragment => &mut self.fragment,
        }
    }
}

/// An in-memory rendering context that behaves like a GL driver.
///
/// Shader and program names share one namespace and start at 1. Misuse is ignored
/// and recorded as a sticky [`GlError`] flag; only allocation refusal and context
/// loss fail a call.
#[derive(Debug)]
pub struct SoftwareContext {
    label: Option<String>,
    shaders: HashMap<ShaderId, SoftwareShader>,
    programs: HashMap<ProgramId, SoftwareProgram>,
    next_name: u32,
    object_limit: Option<usize>,
    active_program: Option<ProgramId>,
    error: Option<GlError>,
    lost: bool,
}

impl Default for SoftwareContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SoftwareContext {
    /// Creates an empty context with no object cap.
    pub fn new() -> Self {
        Self {
            label: None,
            shaders: HashMap::new(),
            programs: HashMap::new(),
            next_name: 1,
            object_limit: None,
            active_program: None,
            error: None,
            lost: false,
        }
    }

    /// Creates a context configured from acquisition settings.
    pub fn with_settings(settings: &ContextSettings) -> Self {
        let mut context = Self::new();
        context.label = settings.label.clone();
        context.object_limit = settings.object_limit;
        context
    }

    /// Caps the number of live shader and program objects.
    pub fn with_object_limit(mut self, limit: usize) -> Self {
        self.object_limit = Some(limit);
        self
    }

    /// Simulates device loss: every object is dropped and every later call fails
    /// with [`ContextError::ContextLost`].
    pub fn lose_context(&mut self) {
        log::warn!(
            "Software context '{}' lost ({} objects dropped)",
            self.label.as_deref().unwrap_or("unnamed"),
            self.shaders.len() + self.programs.len()
        );
        self.shaders.clear();
        self.programs.clear();
        self.active_program = None;
        self.error = None;
        self.lost = true;
    }

    /// Returns `true` once [`lose_context`](Self::lose_context) was called.
    pub fn is_lost(&self) -> bool {
        self.lost
    }

    /// Returns the varying locations matched by the last successful link of `program`.
    pub fn linked_varyings(&self, program: ProgramId) -> Option<Vec<u32>> {
        let data = self.programs.get(&program).filter(|p| p.linked)?;
        Some(data.varyings.iter().map(|v| v.location).collect())
    }

    fn ensure_alive(&self) -> Result<(), ContextError> {
        if self.lost {
            Err(ContextError::ContextLost)
        } else {
            Ok(())
        }
    }

    /// Records an error flag. The first flag sticks until it is read.
    fn flag(&mut self, error: GlError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    fn allocate_name(&mut self, object: GpuObjectKind) -> Result<u32, ContextError> {
        let live = self.shaders.len() + self.programs.len();
        if self.object_limit.is_some_and(|limit| live >= limit) {
            log::debug!("Refusing to allocate a {object}: {live} objects live");
            self.flag(GlError::OutOfMemory);
            return Err(ContextError::OutOfMemory { object });
        }
        let name = self.next_name;
        self.next_name = name
            .checked_add(1)
            .ok_or(ContextError::OutOfMemory { object })?;
        Ok(name)
    }

    /// Frees a shader if it was deleted and is no longer attached anywhere.
    fn free_shader_if_orphaned(&mut self, shader: ShaderId) {
        let orphaned = self
            .shaders
            .get(&shader)
            .is_some_and(|s| s.delete_pending && s.attachments == 0);
        if orphaned {
            self.shaders.remove(&shader);
            log::trace!("Freed shader {shader:?}");
        }
    }

    /// Frees a program and releases its hold on the attached shaders.
    fn free_program(&mut self, program: ProgramId) {
        let Some(data) = self.programs.remove(&program) else {
            return;
        };
        for shader in [data.vertex, data.fragment].into_iter().flatten() {
            if let Some(s) = self.shaders.get_mut(&shader) {
                s.attachments = s.attachments.saturating_sub(1);
            }
            self.free_shader_if_orphaned(shader);
        }
        log::trace!("Freed program {program:?}");
    }

    fn link(&self, data: &SoftwareProgram) -> Result<Vec<Varying>, String> {
        let mut errors = Vec::new();
        let mut modules = Vec::with_capacity(2);
        for kind in ShaderStageKind::ALL {
            let slot = match kind {
                ShaderStageKind::Vertex => data.vertex,
                ShaderStageKind::Fragment => data.fragment,
            };
            match slot.and_then(|id| self.shaders.get(&id)) {
                None => errors.push(format!("error: no {kind} shader is attached")),
                Some(shader) => match &shader.module {
                    None => errors.push(format!("error: the attached {kind} shader is not compiled")),
                    Some(module) => modules.push(module),
                },
            }
        }
        if !errors.is_empty() {
            return Err(errors.join("\n"));
        }
        match_interfaces(modules[0], modules[1])
    }
}

impl RenderingContext for SoftwareContext {
    fn info(&self) -> ContextInfo {
        ContextInfo {
            backend: "software".to_string(),
            renderer: "Kiln software driver (naga GLSL front end)".to_string(),
            validating: false,
        }
    }

    fn create_shader(&mut self, kind: ShaderStageKind) -> Result<ShaderId, ContextError> {
        self.ensure_alive()?;
        let id = ShaderId(self.allocate_name(GpuObjectKind::Shader)?);
        self.shaders.insert(id, SoftwareShader::new(kind));
        Ok(id)
    }

    fn shader_source(&mut self, shader: ShaderId, source: &str) -> Result<(), ContextError> {
        self.ensure_alive()?;
        match self.shaders.get_mut(&shader) {
            Some(data) => data.source = Some(source.to_string()),
            None => self.flag(GlError::InvalidValue),
        }
        Ok(())
    }

    fn compile_shader(&mut self, shader: ShaderId) -> Result<(), ContextError> {
        self.ensure_alive()?;
        let Some(data) = self.shaders.get_mut(&shader) else {
            self.flag(GlError::InvalidValue);
            return Ok(());
        };
        let source = data.source.as_deref().unwrap_or_default();
        match compile_glsl(data.kind, source) {
            Ok(module) => {
                data.module = Some(module);
                data.info_log.clear();
            }
            Err(log) => {
                data.module = None;
                data.info_log = if log.trim().is_empty() {
                    format!("error: {} shader failed to compile", data.kind)
                } else {
                    log
                };
            }
        }
        Ok(())
    }

    fn shader_compile_status(&mut self, shader: ShaderId) -> Result<bool, ContextError> {
        self.ensure_alive()?;
        match self.shaders.get(&shader) {
            Some(data) => Ok(data.module.is_some()),
            None => {
                self.flag(GlError::InvalidValue);
                Ok(false)
            }
        }
    }

    fn shader_info_log(&mut self, shader: ShaderId) -> Result<String, ContextError> {
        self.ensure_alive()?;
        match self.shaders.get(&shader) {
            Some(data) => Ok(data.info_log.clone()),
            None => {
                self.flag(GlError::InvalidValue);
                Ok(String::new())
            }
        }
    }

    fn delete_shader(&mut self, shader: ShaderId) -> Result<(), ContextError> {
        self.ensure_alive()?;
        match self.shaders.get_mut(&shader) {
            Some(data) => {
                data.delete_pending = true;
                self.free_shader_if_orphaned(shader);
            }
            None => self.flag(GlError::InvalidValue),
        }
        Ok(())
    }

    fn create_program(&mut self) -> Result<ProgramId, ContextError> {
        self.ensure_alive()?;
        let id = ProgramId(self.allocate_name(GpuObjectKind::Program)?);
        self.programs.insert(id, SoftwareProgram::default());
        Ok(id)
    }

    fn attach_shader(&mut self, program: ProgramId, shader: ShaderId) -> Result<(), ContextError> {
        self.ensure_alive()?;
        let Some(kind) = self.shaders.get(&shader).map(|s| s.kind) else {
            self.flag(GlError::InvalidValue);
            return Ok(());
        };
        let Some(data) = self.programs.get_mut(&program) else {
            self.flag(GlError::InvalidValue);
            return Ok(());
        };
        let slot = data.slot_mut(kind);
        if slot.is_some() {
            self.flag(GlError::InvalidOperation);
            return Ok(());
        }
        *slot = Some(shader);
        if let Some(s) = self.shaders.get_mut(&shader) {
            s.attachments += 1;
        }
        Ok(())
    }

    fn detach_shader(&mut self, program: ProgramId, shader: ShaderId) -> Result<(), ContextError> {
        self.ensure_alive()?;
        let Some(kind) = self.shaders.get(&shader).map(|s| s.kind) else {
            self.flag(GlError::InvalidValue);
            return Ok(());
        };
        let Some(data) = self.programs.get_mut(&program) else {
            self.flag(GlError::InvalidValue);
            return Ok(());
        };
        let slot = data.slot_mut(kind);
        if *slot != Some(shader) {
            self.flag(GlError::InvalidOperation);
            return Ok(());
        }
        *slot = None;
        if let Some(s) = self.shaders.get_mut(&shader) {
            s.attachments = s.attachments.saturating_sub(1);
        }
        self.free_shader_if_orphaned(shader);
        Ok(())
    }

    fn link_program(&mut self, program: ProgramId) -> Result<(), ContextError> {
        self.ensure_alive()?;
        let Some(data) = self.programs.get(&program) else {
            self.flag(GlError::InvalidValue);
            return Ok(());
        };
        let outcome = self.link(data);
        if let Some(data) = self.programs.get_mut(&program) {
            match outcome {
                Ok(varyings) => {
                    data.linked = true;
                    data.varyings = varyings;
                    data.info_log.clear();
                }
                Err(log) => {
                    data.linked = false;
                    data.varyings.clear();
                    data.info_log = log;
                }
            }
        }
        Ok(())
    }

    fn program_link_status(&mut self, program: ProgramId) -> Result<bool, ContextError> {
        self.ensure_alive()?;
        match self.programs.get(&program) {
            Some(data) => Ok(data.linked),
            None => {
                self.flag(GlError::InvalidValue);
                Ok(false)
            }
        }
    }

    fn program_info_log(&mut self, program: ProgramId) -> Result<String, ContextError> {
        self.ensure_alive()?;
        match self.programs.get(&program) {
            Some(data) => Ok(data.info_log.clone()),
            None => {
                self.flag(GlError::InvalidValue);
                Ok(String::new())
            }
        }
    }

    fn delete_program(&mut self, program: ProgramId) -> Result<(), ContextError> {
        self.ensure_alive()?;
        if !self.programs.contains_key(&program) {
            self.flag(GlError::InvalidValue);
            return Ok(());
        }
        if self.active_program == Some(program) {
            if let Some(data) = self.programs.get_mut(&program) {
                data.delete_pending = true;
            }
        } else {
            self.free_program(program);
        }
        Ok(())
    }

    fn use_program(&mut self, program: Option<ProgramId>) -> Result<(), ContextError> {
        self.ensure_alive()?;
        if let Some(id) = program {
            match self.programs.get(&id) {
                None => {
                    self.flag(GlError::InvalidValue);
                    return Ok(());
                }
                Some(data) if !data.linked => {
                    self.flag(GlError::InvalidOperation);
                    return Ok(());
                }
                Some(_) => {}
            }
        }

        let previous = std::mem::replace(&mut self.active_program, program);
        if let Some(previous) = previous.filter(|p| Some(*p) != program) {
            if self.programs.get(&previous).is_some_and(|p| p.delete_pending) {
                self.free_program(previous);
            }
        }
        Ok(())
    }

    fn active_program(&self) -> Option<ProgramId> {
        self.active_program
    }

    fn get_error(&mut self) -> Result<Option<GlError>, ContextError> {
        self.ensure_alive()?;
        Ok(self.error.take())
    }

    fn live_objects(&self) -> ObjectCounts {
        ObjectCounts {
            shaders: self.shaders.len(),
            programs: self.programs.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERTEX: &str = "#version 450
void main() {
    gl_Position = vec4(0.0, 0.0, 0.0, 1.0);
}
";

    const FRAGMENT: &str = "#version 450
layout(location = 0) out vec4 frag_color;
void main() {
    frag_color = vec4(1.0, 0.0, 0.0, 1.0);
}
";

    fn compiled(ctx: &mut SoftwareContext, kind: ShaderStageKind, source: &str) -> ShaderId {
        let id = ctx.create_shader(kind).unwrap();
        ctx.shader_source(id, source).unwrap();
        ctx.compile_shader(id).unwrap();
        assert!(ctx.shader_compile_status(id).unwrap());
        id
    }

    fn linked(ctx: &mut SoftwareContext) -> (ProgramId, ShaderId, ShaderId) {
        let vs = compiled(ctx, ShaderStageKind::Vertex, VERTEX);
        let fs = compiled(ctx, ShaderStageKind::Fragment, FRAGMENT);
        let program = ctx.create_program().unwrap();
        ctx.attach_shader(program, vs).unwrap();
        ctx.attach_shader(program, fs).unwrap();
        ctx.link_program(program).unwrap();
        assert!(ctx.program_link_status(program).unwrap());
        (program, vs, fs)
    }

    #[test]
    fn names_start_at_one_and_are_shared() {
        let mut ctx = SoftwareContext::new();
        assert_eq!(ctx.create_shader(ShaderStageKind::Vertex).unwrap(), ShaderId(1));
        assert_eq!(ctx.create_program().unwrap(), ProgramId(2));
        assert_eq!(ctx.live_objects(), ObjectCounts { shaders: 1, programs: 1 });
    }

    #[test]
    fn failed_compile_keeps_a_log() {
        let mut ctx = SoftwareContext::new();
        let id = ctx.create_shader(ShaderStageKind::Fragment).unwrap();
        ctx.shader_source(id, "#version 450\nvoid main() { undeclared = 1.0; }\n")
            .unwrap();
        ctx.compile_shader(id).unwrap();

        assert!(!ctx.shader_compile_status(id).unwrap());
        assert!(!ctx.shader_info_log(id).unwrap().is_empty());
    }

    #[test]
    fn unknown_names_set_the_error_flag() {
        let mut ctx = SoftwareContext::new();
        ctx.compile_shader(ShaderId(42)).unwrap();
        ctx.use_program(Some(ProgramId(43))).unwrap();

        assert_eq!(ctx.get_error().unwrap(), Some(GlError::InvalidValue));
        assert_eq!(ctx.get_error().unwrap(), None, "reading the flag clears it");
    }

    #[test]
    fn using_an_unlinked_program_is_an_invalid_operation() {
        let mut ctx = SoftwareContext::new();
        let program = ctx.create_program().unwrap();
        ctx.use_program(Some(program)).unwrap();

        assert_eq!(ctx.get_error().unwrap(), Some(GlError::InvalidOperation));
        assert_eq!(ctx.active_program(), None);
    }

    #[test]
    fn attaching_two_shaders_of_one_kind_is_an_invalid_operation() {
        let mut ctx = SoftwareContext::new();
        let a = compiled(&mut ctx, ShaderStageKind::Vertex, VERTEX);
        let b = compiled(&mut ctx, ShaderStageKind::Vertex, VERTEX);
        let program = ctx.create_program().unwrap();
        ctx.attach_shader(program, a).unwrap();
        ctx.attach_shader(program, b).unwrap();

        assert_eq!(ctx.get_error().unwrap(), Some(GlError::InvalidOperation));
    }

    #[test]
    fn link_without_fragment_stage_fails() {
        let mut ctx = SoftwareContext::new();
        let vs = compiled(&mut ctx, ShaderStageKind::Vertex, VERTEX);
        let program = ctx.create_program().unwrap();
        ctx.attach_shader(program, vs).unwrap();
        ctx.link_program(program).unwrap();

        assert!(!ctx.program_link_status(program).unwrap());
        assert!(ctx
            .program_info_log(program)
            .unwrap()
            .contains("no fragment shader is attached"));
    }

    #[test]
    fn attached_shader_deletion_is_deferred_until_program_is_freed() {
        let mut ctx = SoftwareContext::new();
        let (program, vs, fs) = linked(&mut ctx);

        ctx.delete_shader(vs).unwrap();
        ctx.delete_shader(fs).unwrap();
        assert_eq!(ctx.live_objects().shaders, 2, "still attached");

        ctx.delete_program(program).unwrap();
        assert_eq!(ctx.live_objects(), ObjectCounts::default());
    }

    #[test]
    fn active_program_deletion_is_deferred_until_replaced() {
        let mut ctx = SoftwareContext::new();
        let (program, vs, fs) = linked(&mut ctx);
        ctx.use_program(Some(program)).unwrap();

        ctx.delete_program(program).unwrap();
        ctx.delete_shader(vs).unwrap();
        ctx.delete_shader(fs).unwrap();
        assert_eq!(ctx.live_objects().total(), 3);
        assert_eq!(ctx.active_program(), Some(program));

        ctx.use_program(None).unwrap();
        assert_eq!(ctx.live_objects().total(), 0);
    }

    #[test]
    fn object_limit_refuses_allocations() {
        let mut ctx = SoftwareContext::new().with_object_limit(1);
        ctx.create_shader(ShaderStageKind::Vertex).unwrap();

        assert_eq!(
            ctx.create_program(),
            Err(ContextError::OutOfMemory {
                object: GpuObjectKind::Program
            })
        );
        assert_eq!(ctx.live_objects().total(), 1);
    }

    #[test]
    fn lost_context_fails_every_call() {
        let mut ctx = SoftwareContext::new();
        let (program, _, _) = linked(&mut ctx);
        ctx.use_program(Some(program)).unwrap();
        assert_eq!(ctx.linked_varyings(program), Some(Vec::new()));

        ctx.lose_context();

        assert!(ctx.is_lost());
        assert_eq!(ctx.active_program(), None);
        assert_eq!(ctx.live_objects().total(), 0);
        assert_eq!(
            ctx.create_shader(ShaderStageKind::Vertex),
            Err(ContextError::ContextLost)
        );
        assert_eq!(ctx.link_program(program), Err(ContextError::ContextLost));
    }
}
