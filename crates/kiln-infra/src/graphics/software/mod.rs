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

//! The software reference driver.
//!
//! `SoftwareContext` keeps every object in memory, follows GL object-lifetime rules
//! (error flags, deferred deletion, context loss), compiles GLSL through the `naga`
//! GLSL front end and validator, and links by matching the vertex outputs against
//! the fragment inputs.

mod context;
mod frontend;
mod interface;

pub use self::context::SoftwareContext;
