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

use kiln_core::renderer::api::{GpuObjectKind, ShaderId};
use kiln_core::{ContextError, RenderingContext, ShaderStage, ShaderStageKind};

use super::{release_stage, PipelineError};

/// The driver's verdict on one compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileResult {
    /// Whether the shader compiled.
    pub success: bool,
    /// The driver log. Only read when compilation failed.
    pub log: String,
}

impl CompileResult {
    /// Reads the compile status of `shader`, and its info log if it failed.
    pub fn query(ctx: &mut dyn RenderingContext, shader: ShaderId) -> Result<Self, ContextError> {
        let success = ctx.shader_compile_status(shader)?;
        let log = if success {
            String::new()
        } else {
            ctx.shader_info_log(shader)?
        };
        Ok(Self { success, log })
    }
}

fn submit_and_compile(
    ctx: &mut dyn RenderingContext,
    shader: ShaderId,
    source: &str,
) -> Result<CompileResult, ContextError> {
    ctx.shader_source(shader, source)?;
    ctx.compile_shader(shader)?;
    CompileResult::query(ctx, shader)
}

/// Compiles `source` into a new shader object of the given stage.
///
/// On success the caller owns the returned stage. On failure the shader object has
/// already been released; a compile failure carries the driver log verbatim.
///
/// ## Errors
/// * `Allocation` - If the context refuses to create the shader object.
/// * `Compile` - If the driver rejects the source.
/// * `InvalidArgument` / `ContextLost` - If a call is rejected or the context dies.
pub fn compile(
    ctx: &mut dyn RenderingContext,
    kind: ShaderStageKind,
    source: &str,
) -> Result<ShaderStage, PipelineError> {
    let id = ctx
        .create_shader(kind)
        .map_err(|err| PipelineError::allocation(GpuObjectKind::Shader, err))?;
    let stage = ShaderStage::new(id, kind);

    match submit_and_compile(ctx, id, source) {
        Ok(CompileResult { success: true, .. }) => {
            log::debug!("Compiled {kind} shader {id:?}");
            Ok(stage)
        }
        Ok(CompileResult { log, .. }) => {
            release_stage(ctx, stage);
            log::debug!("The {kind} shader {id:?} failed to compile");
            Err(PipelineError::Compile { stage: kind, log })
        }
        Err(err) => {
            release_stage(ctx, stage);
            Err(err.into())
        }
    }
}
