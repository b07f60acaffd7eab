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

use kiln_core::renderer::api::{GpuObjectKind, ProgramId};
use kiln_core::{ContextError, Program, RenderingContext, ShaderStage, ShaderStageKind};

use super::{release_program, release_stage, PipelineError};

/// The driver's verdict on one link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkResult {
    /// Whether the program linked.
    pub success: bool,
    /// The driver log. Only read when linking failed.
    pub log: String,
}

impl LinkResult {
    /// Reads the link status of `program`, and its info log if it failed.
    pub fn query(ctx: &mut dyn RenderingContext, program: ProgramId) -> Result<Self, ContextError> {
        let success = ctx.program_link_status(program)?;
        let log = if success {
            String::new()
        } else {
            ctx.program_info_log(program)?
        };
        Ok(Self { success, log })
    }
}

fn attach_and_link(
    ctx: &mut dyn RenderingContext,
    program: ProgramId,
    vertex: &ShaderStage,
    fragment: &ShaderStage,
) -> Result<LinkResult, ContextError> {
    ctx.attach_shader(program, vertex.id())?;
    ctx.attach_shader(program, fragment.id())?;
    ctx.link_program(program)?;
    LinkResult::query(ctx, program)
}

/// Releases everything `link` holds, program first.
fn discard(
    ctx: &mut dyn RenderingContext,
    program: Option<ProgramId>,
    vertex: ShaderStage,
    fragment: ShaderStage,
) {
    if let Some(program) = program {
        release_program(ctx, program);
    }
    release_stage(ctx, fragment);
    release_stage(ctx, vertex);
}

/// Links a vertex and a fragment stage into a program.
///
/// Both stages are moved in. On success they are owned by the returned [`Program`];
/// on every failure the linker releases the program object and both stages before
/// returning.
///
/// ## Errors
/// * `InvalidArgument` - If the stages are not one vertex and one fragment stage, or
///   a call is rejected by a validating context.
/// * `Allocation` - If the context refuses to create the program object.
/// * `Link` - If the driver fails to link the stages.
/// * `ContextLost` - If the context dies during the link.
pub fn link(
    ctx: &mut dyn RenderingContext,
    vertex: ShaderStage,
    fragment: ShaderStage,
) -> Result<Program, PipelineError> {
    if vertex.kind() != ShaderStageKind::Vertex || fragment.kind() != ShaderStageKind::Fragment {
        let message = format!(
            "expected a vertex and a fragment stage, got {} and {}",
            vertex.kind(),
            fragment.kind()
        );
        discard(ctx, None, vertex, fragment);
        return Err(PipelineError::InvalidArgument(message));
    }

    let program = match ctx.create_program() {
        Ok(program) => program,
        Err(err) => {
            discard(ctx, None, vertex, fragment);
            return Err(PipelineError::allocation(GpuObjectKind::Program, err));
        }
    };

    match attach_and_link(ctx, program, &vertex, &fragment) {
        Ok(LinkResult { success: true, .. }) => {
            log::debug!("Linked program {program:?}");
            Ok(Program::new(program, vertex, fragment))
        }
        Ok(LinkResult { log, .. }) => {
            discard(ctx, Some(program), vertex, fragment);
            Err(PipelineError::Link { log })
        }
        Err(err) => {
            discard(ctx, Some(program), vertex, fragment);
            Err(err.into())
        }
    }
}
