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

//! The validating decorator used in debug mode.
//!
//! A raw driver ignores misuse and records a flag that nobody may ever read. The
//! [`ValidatingContext`] checks every call against its own record of the objects
//! it handed out, drains the driver flag after each mutating call, and turns any
//! violation into an immediate [`ContextError::Rejected`](kiln_core::ContextError::Rejected).

mod diagnostic;
mod validating;

pub use self::diagnostic::{Diagnostic, DiagnosticSink};
pub use self::validating::ValidatingContext;
