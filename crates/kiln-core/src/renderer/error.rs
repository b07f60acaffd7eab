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

//! Defines the error type returned by rendering context operations.

use crate::renderer::api::{GlError, GpuObjectKind};
use std::fmt;

/// An error returned by a [`RenderingContext`](crate::RenderingContext) call.
///
/// Raw drivers only return `OutOfMemory`, `ContextLost`, or `BackendError`. Ordinary
/// misuse is recorded as a [`GlError`] flag instead; only the validating decorator
/// turns misuse into `Rejected`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    /// The device refused to allocate an object.
    OutOfMemory {
        /// The kind of object that could not be allocated.
        object: GpuObjectKind,
    },
    /// The context was lost; every object on it is gone.
    ContextLost,
    /// The validating decorator rejected a call that violates a precondition.
    Rejected {
        /// The name of the rejected call.
        call: &'static str,
        /// The error the driver would have flagged.
        code: GlError,
        /// What precondition was violated.
        message: String,
    },
    /// An error originating from the specific graphics backend implementation.
    BackendError(String),
}

impl fmt::Display for ContextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextError::OutOfMemory { object } => {
                write!(f, "The device refused to allocate a {object}.")
            }
            ContextError::ContextLost => write!(f, "The rendering context was lost."),
            ContextError::Rejected {
                call,
                code,
                message,
            } => {
                write!(f, "Call `{call}` rejected with {code}: {message}")
            }
            ContextError::BackendError(msg) => {
                write!(f, "Backend-specific context error: {msg}")
            }
        }
    }
}

impl std::error::Error for ContextError {}
