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

//! The shader program build pipeline.
//!
//! [`compile`] turns one source into a [`ShaderStage`], [`link`] pairs a vertex and a
//! fragment stage into a [`Program`](kiln_core::Program), and [`ProgramLane`] runs both
//! and installs the result as the context's active program. Each step releases what
//! it allocated before returning an error, so a failed build leaves no objects
//! behind on the context.

mod compiler;
mod error;
mod linker;
mod program_lane;

pub use self::compiler::{compile, CompileResult};
pub use self::error::PipelineError;
pub use self::linker::{link, LinkResult};
pub use self::program_lane::{build, ProgramLane};

use kiln_core::renderer::api::ProgramId;
use kiln_core::{RenderingContext, ShaderStage};

/// Releases a stage on an error path. A failure here is logged and must not mask
/// the error being returned.
fn release_stage(ctx: &mut dyn RenderingContext, stage: ShaderStage) {
    let (id, kind) = (stage.id(), stage.kind());
    if let Err(err) = stage.release(ctx) {
        log::warn!("Failed to release {kind} shader {id:?}: {err}");
    }
}

fn release_program(ctx: &mut dyn RenderingContext, program: ProgramId) {
    if let Err(err) = ctx.delete_program(program) {
        log::warn!("Failed to release program {program:?}: {err}");
    }
}
