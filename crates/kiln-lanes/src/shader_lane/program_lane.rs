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

use kiln_core::{Program, RenderingContext, ShaderStageKind};

use super::{compile, link, release_stage, PipelineError};

/// Builds shader programs and installs them as the context's active program.
///
/// The build is fail-fast: it stops at the first failing step, releases what that
/// step and the earlier ones allocated, and reports only that failure.
#[derive(Debug, Clone, Default)]
pub struct ProgramLane {
    label: Option<String>,
}

impl ProgramLane {
    /// Creates an unlabelled lane.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a lane whose log lines carry `label` (e.g. the name of the view).
    pub fn with_label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
        }
    }

    /// The label used in log lines.
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or("program")
    }

    /// Compiles both stages, links them, and installs the program.
    ///
    /// On success the returned program is the context's active program and the
    /// caller owns it. On failure no object allocated by this call remains on the
    /// context.
    pub fn build(
        &self,
        ctx: &mut dyn RenderingContext,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Program, PipelineError> {
        // Stage 1: compile the vertex stage. Nothing to clean up on failure.
        let vertex = compile(ctx, ShaderStageKind::Vertex, vertex_source)
            .inspect_err(|err| log::warn!("[{}] {err}", self.label()))?;

        // Stage 2: compile the fragment stage, dropping the vertex stage on failure.
        let fragment = match compile(ctx, ShaderStageKind::Fragment, fragment_source) {
            Ok(fragment) => fragment,
            Err(err) => {
                log::warn!("[{}] {err}", self.label());
                release_stage(ctx, vertex);
                return Err(err);
            }
        };

        // Stage 3: link. The linker releases both stages itself when it fails.
        let program = link(ctx, vertex, fragment)
            .inspect_err(|err| log::warn!("[{}] {err}", self.label()))?;

        // Stage 4: install.
        let id = program.id();
        if let Err(err) = ctx.use_program(Some(id)) {
            if let Err(cleanup) = program.destroy(ctx) {
                log::warn!(
                    "[{}] Failed to destroy program {id:?} after a failed install: {cleanup}",
                    self.label()
                );
            }
            return Err(err.into());
        }

        log::info!("[{}] Built and installed program {id:?}", self.label());
        Ok(program)
    }
}

/// Builds a program with an unlabelled [`ProgramLane`].
pub fn build(
    ctx: &mut dyn RenderingContext,
    vertex_source: &str,
    fragment_source: &str,
) -> Result<Program, PipelineError> {
    ProgramLane::new().build(ctx, vertex_source, fragment_source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_core::renderer::api::{ContextInfo, GlError, ObjectCounts, ProgramId, ShaderId};
    use kiln_core::ContextError;
    use std::collections::HashSet;

    /// A context where everything compiles and links, except for the scripted failure.
    #[derive(Debug, Default)]
    struct ScriptedContext {
        shaders: HashSet<ShaderId>,
        programs: HashSet<ProgramId>,
        next_name: u32,
        active: Option<ProgramId>,
        refuse_install: bool,
        lost_on_link: bool,
    }

    impl ScriptedContext {
        fn next(&mut self) -> u32 {
            self.next_name += 1;
            self.next_name
        }
    }

    impl RenderingContext for ScriptedContext {
        fn info(&self) -> ContextInfo {
            ContextInfo {
                backend: "scripted".into(),
                renderer: "scripted".into(),
                validating: false,
            }
        }
        fn create_shader(&mut self, _: ShaderStageKind) -> Result<ShaderId, ContextError> {
            let id = ShaderId(self.next());
            self.shaders.insert(id);
            Ok(id)
        }
        fn shader_source(&mut self, _: ShaderId, _: &str) -> Result<(), ContextError> {
            Ok(())
        }
        fn compile_shader(&mut self, _: ShaderId) -> Result<(), ContextError> {
            Ok(())
        }
        fn shader_compile_status(&mut self, _: ShaderId) -> Result<bool, ContextError> {
            Ok(true)
        }
        fn shader_info_log(&mut self, _: ShaderId) -> Result<String, ContextError> {
            Ok(String::new())
        }
        fn delete_shader(&mut self, shader: ShaderId) -> Result<(), ContextError> {
            self.shaders.remove(&shader);
            Ok(())
        }
        fn create_program(&mut self) -> Result<ProgramId, ContextError> {
            let id = ProgramId(self.next());
            self.programs.insert(id);
            Ok(id)
        }
        fn attach_shader(&mut self, _: ProgramId, _: ShaderId) -> Result<(), ContextError> {
            Ok(())
        }
        fn detach_shader(&mut self, _: ProgramId, _: ShaderId) -> Result<(), ContextError> {
            Ok(())
        }
        fn link_program(&mut self, _: ProgramId) -> Result<(), ContextError> {
            if self.lost_on_link {
                Err(ContextError::ContextLost)
            } else {
                Ok(())
            }
        }
        fn program_link_status(&mut self, _: ProgramId) -> Result<bool, ContextError> {
            Ok(true)
        }
        fn program_info_log(&mut self, _: ProgramId) -> Result<String, ContextError> {
            Ok(String::new())
        }
        fn delete_program(&mut self, program: ProgramId) -> Result<(), ContextError> {
            self.programs.remove(&program);
            Ok(())
        }
        fn use_program(&mut self, program: Option<ProgramId>) -> Result<(), ContextError> {
            if self.refuse_install {
                return Err(ContextError::Rejected {
                    call: "useProgram",
                    code: GlError::InvalidOperation,
                    message: "installation refused".into(),
                });
            }
            self.active = program;
            Ok(())
        }
        fn active_program(&self) -> Option<ProgramId> {
            self.active
        }
        fn get_error(&mut self) -> Result<Option<GlError>, ContextError> {
            Ok(None)
        }
        fn live_objects(&self) -> ObjectCounts {
            ObjectCounts {
                shaders: self.shaders.len(),
                programs: self.programs.len(),
            }
        }
    }

    #[test]
    fn failed_install_destroys_program_and_stages() {
        // --- 1. ARRANGE ---
        let mut ctx = ScriptedContext {
            refuse_install: true,
            ..Default::default()
        };

        // --- 2. ACT ---
        let result = build(&mut ctx, "vertex", "fragment");

        // --- 3. ASSERT ---
        match result {
            Err(PipelineError::InvalidArgument(msg)) => assert!(msg.contains("useProgram")),
            other => panic!("expected an invalid argument, got {other:?}"),
        }
        assert_eq!(ctx.live_objects().total(), 0);
        assert_eq!(ctx.active_program(), None);
    }

    #[test]
    fn context_lost_while_linking_releases_everything() {
        // --- 1. ARRANGE ---
        let mut ctx = ScriptedContext {
            lost_on_link: true,
            ..Default::default()
        };

        // --- 2. ACT ---
        let result = build(&mut ctx, "vertex", "fragment");

        // --- 3. ASSERT ---
        assert_eq!(result, Err(PipelineError::ContextLost));
        assert_eq!(ctx.live_objects().total(), 0);
        assert_eq!(ctx.active_program(), None);
    }

    #[test]
    fn scripted_build_succeeds_without_failures() {
        let mut ctx = ScriptedContext::default();

        let program = build(&mut ctx, "vertex", "fragment").unwrap();

        assert_eq!(ctx.active_program(), Some(program.id()));
        assert_eq!(ctx.live_objects().total(), 3);
    }

    #[test]
    fn label_defaults_to_program() {
        assert_eq!(ProgramLane::new().label(), "program");
        assert_eq!(ProgramLane::with_label("triangle view").label(), "triangle view");
    }
}
