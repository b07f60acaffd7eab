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

//! GLSL compilation for the software driver.

use kiln_core::ShaderStageKind;
use naga::front::glsl::{Frontend, Options};
use naga::valid::{Capabilities, ValidationFlags, Validator};

fn naga_stage(kind: ShaderStageKind) -> naga::ShaderStage {
    match kind {
        ShaderStageKind::Vertex => naga::ShaderStage::Vertex,
        ShaderStageKind::Fragment => naga::ShaderStage::Fragment,
    }
}

/// Parses and validates GLSL source for the given stage.
///
/// On failure, returns the diagnostic text exactly as naga renders it against the
/// source, which is what the driver exposes as the shader info log.
pub(crate) fn compile_glsl(kind: ShaderStageKind, source: &str) -> Result<naga::Module, String> {
    let options = Options::from(naga_stage(kind));
    let module = Frontend::default()
        .parse(&options, source)
        .map_err(|errors| errors.emit_to_string(source))?;

    Validator::new(ValidationFlags::all(), Capabilities::all())
        .validate(&module)
        .map_err(|error| error.emit_to_string(source))?;

    Ok(module)
}
