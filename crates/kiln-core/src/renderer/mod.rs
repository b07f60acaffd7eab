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

//! Provides the public, backend-agnostic contracts of the shader program pipeline.
//!
//! This module defines the "common language" spoken between the pipeline and the
//! drivers. It contains the abstract `traits` (like [`RenderingContext`]), the opaque
//! handle types (like [`ShaderStage`] and [`Program`]), and the error types.
//!
//! The 'how' is handled by a concrete backend in the `kiln-infra` crate (the software
//! reference driver or the OpenGL driver), while `kiln-lanes` drives these traits to
//! compile, link, and install programs without knowing which backend it talks to.

pub mod api;
pub mod error;
pub mod traits;

// Re-export the most important traits and types for easier use.
pub use self::api::*;
pub use self::error::ContextError;
pub use self::traits::{DrawableSurface, RenderingContext};
