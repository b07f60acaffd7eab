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

use kiln_core::renderer::api::GlError;
use kiln_core::ContextError;

/// A precondition violation caught by the [`ValidatingContext`](super::ValidatingContext).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The rejected call, named as in the GL API (e.g. `attachShader`).
    pub call: &'static str,
    /// The flag a raw driver would have recorded.
    pub code: GlError,
    /// What was wrong with the call.
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.code, self.call, self.message)
    }
}

impl From<Diagnostic> for ContextError {
    fn from(diagnostic: Diagnostic) -> Self {
        ContextError::Rejected {
            call: diagnostic.call,
            code: diagnostic.code,
            message: diagnostic.message,
        }
    }
}

/// Receives every diagnostic the validating decorator emits.
pub type DiagnosticSink = Box<dyn FnMut(&Diagnostic)>;

pub(crate) fn log_sink() -> DiagnosticSink {
    Box::new(|diagnostic| log::error!("{diagnostic}"))
}
