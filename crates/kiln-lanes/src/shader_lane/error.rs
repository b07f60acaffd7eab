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

//! Errors produced while building a shader program.

use kiln_core::renderer::api::{GpuObjectKind, ShaderStageKind};
use kiln_core::ContextError;
use thiserror::Error;

/// The reason a program build failed.
///
/// Every failure is reported as exactly one of these variants, and all objects the
/// failed step allocated have been released by the time it is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum PipelineError {
    /// The device refused to create a shader or program object.
    #[error("Failed to allocate a {object}: {reason}")]
    Allocation {
        /// The kind of object that could not be created.
        object: GpuObjectKind,
        /// What the context reported.
        reason: String,
    },

    /// A stage failed to compile. `log` is the driver's diagnostic, verbatim.
    #[error("The {stage} shader failed to compile:\n{log}")]
    Compile {
        /// The stage that failed.
        stage: ShaderStageKind,
        /// The driver's compile log.
        log: String,
    },

    /// The stages compiled but the program failed to link.
    #[error("The program failed to link:\n{log}")]
    Link {
        /// The driver's link log.
        log: String,
    },

    /// A call was given handles or state it cannot accept.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The context was lost during the build. A new context has to be acquired.
    #[error("The rendering context was lost during the build")]
    ContextLost,
}

impl PipelineError {
    /// Maps the error of a `create_*` call, where a backend failure means the
    /// object could not be allocated.
    pub fn allocation(object: GpuObjectKind, error: ContextError) -> Self {
        match error {
            ContextError::OutOfMemory { .. } | ContextError::BackendError(_) => {
                PipelineError::Allocation {
                    object,
                    reason: error.to_string(),
                }
            }
            other => other.into(),
        }
    }
}

impl From<ContextError> for PipelineError {
    fn from(error: ContextError) -> Self {
        match error {
            ContextError::OutOfMemory { object } => PipelineError::Allocation {
                object,
                reason: error.to_string(),
            },
            ContextError::ContextLost => PipelineError::ContextLost,
            ContextError::Rejected { .. } | ContextError::BackendError(_) => {
                PipelineError::InvalidArgument(error.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_core::renderer::api::GlError;

    #[test]
    fn create_failures_map_to_allocation() {
        let err = PipelineError::allocation(
            GpuObjectKind::Program,
            ContextError::BackendError("no more names".into()),
        );
        assert!(matches!(
            err,
            PipelineError::Allocation {
                object: GpuObjectKind::Program,
                ..
            }
        ));
    }

    #[test]
    fn rejected_calls_map_to_invalid_argument() {
        let err: PipelineError = ContextError::Rejected {
            call: "attachShader",
            code: GlError::InvalidOperation,
            message: "already attached".into(),
        }
        .into();
        match err {
            PipelineError::InvalidArgument(msg) => assert!(msg.contains("attachShader")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn lost_context_stays_distinct() {
        let err = PipelineError::allocation(GpuObjectKind::Shader, ContextError::ContextLost);
        assert_eq!(err, PipelineError::ContextLost);
    }

    #[test]
    fn compile_message_keeps_the_log() {
        let err = PipelineError::Compile {
            stage: ShaderStageKind::Fragment,
            log: "0:3: error".into(),
        };
        assert_eq!(
            err.to_string(),
            "The fragment shader failed to compile:\n0:3: error"
        );
    }
}
