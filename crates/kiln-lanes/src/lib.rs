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

//! # Kiln Lanes
//!
//! Execution pipelines built on the `kiln-core` contracts. The [`shader_lane`]
//! turns vertex and fragment source text into a linked program installed on a
//! rendering context.

#![warn(missing_docs)]

pub mod shader_lane;

pub use shader_lane::{build, PipelineError, ProgramLane};
