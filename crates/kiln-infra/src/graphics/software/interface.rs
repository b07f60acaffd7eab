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

//! Stage interface matching used when linking a program.

use naga::{Binding, Handle, Module, ScalarKind, Type, TypeInner};

/// A user-defined value passed between stages at a `layout(location = N)` slot.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Varying {
    pub location: u32,
    pub ty: TypeInner,
}

fn collect_varyings(
    module: &Module,
    ty: Handle<Type>,
    binding: Option<&Binding>,
    out: &mut Vec<Varying>,
) {
    match binding {
        Some(Binding::Location { location, .. }) => out.push(Varying {
            location: *location,
            ty: module.types[ty].inner.clone(),
        }),
        Some(Binding::BuiltIn(_)) => {}
        None => {
            if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    collect_varyings(module, member.ty, member.binding.as_ref(), out);
                }
            }
        }
    }
}

fn entry_point(module: &Module, stage: naga::ShaderStage) -> Option<&naga::EntryPoint> {
    module.entry_points.iter().find(|ep| ep.stage == stage)
}

fn vertex_outputs(module: &Module) -> Vec<Varying> {
    let mut outputs = Vec::new();
    if let Some(result) = entry_point(module, naga::ShaderStage::Vertex)
        .and_then(|ep| ep.function.result.as_ref())
    {
        collect_varyings(module, result.ty, result.binding.as_ref(), &mut outputs);
    }
    outputs
}

fn fragment_inputs(module: &Module) -> Vec<Varying> {
    let mut inputs = Vec::new();
    if let Some(ep) = entry_point(module, naga::ShaderStage::Fragment) {
        for argument in &ep.function.arguments {
            collect_varyings(module, argument.ty, argument.binding.as_ref(), &mut inputs);
        }
    }
    inputs
}

fn scalar_name(kind: ScalarKind, width: u8) -> String {
    match (kind, width) {
        (ScalarKind::Float, 4) => "float".to_string(),
        (ScalarKind::Sint, 4) => "int".to_string(),
        (ScalarKind::Uint, 4) => "uint".to_string(),
        (ScalarKind::Bool, _) => "bool".to_string(),
        (kind, width) => format!("{kind:?}{}", u32::from(width) * 8),
    }
}

fn describe(ty: &TypeInner) -> String {
    match ty {
        TypeInner::Scalar(scalar) => scalar_name(scalar.kind, scalar.width),
        TypeInner::Vector { size, scalar } => {
            let prefix = match scalar.kind {
                ScalarKind::Sint => "i",
                ScalarKind::Uint => "u",
                ScalarKind::Bool => "b",
                _ => "",
            };
            format!("{prefix}vec{}", *size as u8)
        }
        TypeInner::Matrix { columns, rows, .. } => {
            format!("mat{}x{}", *columns as u8, *rows as u8)
        }
        other => format!("{other:?}"),
    }
}

/// Checks that every fragment input is written by the vertex stage with the same type.
///
/// Returns the matched varyings on success, or a driver-style log with one
/// `error:` line per problem.
pub(crate) fn match_interfaces(vertex: &Module, fragment: &Module) -> Result<Vec<Varying>, String> {
    let mut errors = Vec::new();

    if entry_point(vertex, naga::ShaderStage::Vertex).is_none() {
        errors.push("error: the vertex shader has no vertex entry point".to_string());
    }
    if entry_point(fragment, naga::ShaderStage::Fragment).is_none() {
        errors.push("error: the fragment shader has no fragment entry point".to_string());
    }
    if !errors.is_empty() {
        return Err(errors.join("\n"));
    }

    let outputs = vertex_outputs(vertex);
    let mut matched = Vec::new();
    for input in fragment_inputs(fragment) {
        match outputs.iter().find(|output| output.location == input.location) {
            None => errors.push(format!(
                "error: fragment input at location {} is not written by the vertex shader",
                input.location
            )),
            Some(output) if output.ty != input.ty => errors.push(format!(
                "error: type mismatch at location {}: the vertex shader writes {}, the fragment shader reads {}",
                input.location,
                describe(&output.ty),
                describe(&input.ty)
            )),
            Some(_) => matched.push(input),
        }
    }

    if errors.is_empty() {
        Ok(matched)
    } else {
        Err(errors.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::software::frontend::compile_glsl;
    use kiln_core::ShaderStageKind;

    const COLOR_VERTEX: &str = "#version 450
layout(location = 0) out vec4 v_color;
void main() {
    v_color = vec4(1.0, 0.0, 0.0, 1.0);
    gl_Position = vec4(0.0, 0.0, 0.0, 1.0);
}
";

    const VEC3_VERTEX: &str = "#version 450
layout(location = 0) out vec3 v_color;
void main() {
    v_color = vec3(1.0, 0.0, 0.0);
    gl_Position = vec4(0.0, 0.0, 0.0, 1.0);
}
";

    const COLOR_FRAGMENT: &str = "#version 450
layout(location = 0) in vec4 v_color;
layout(location = 0) out vec4 frag_color;
void main() {
    frag_color = v_color;
}
";

    fn module(kind: ShaderStageKind, source: &str) -> Module {
        compile_glsl(kind, source).unwrap()
    }

    #[test]
    fn matching_varyings_link() {
        let vertex = module(ShaderStageKind::Vertex, COLOR_VERTEX);
        let fragment = module(ShaderStageKind::Fragment, COLOR_FRAGMENT);

        let varyings = match_interfaces(&vertex, &fragment).unwrap();
        assert_eq!(varyings.len(), 1);
        assert_eq!(varyings[0].location, 0);
    }

    #[test]
    fn mismatched_varying_type_is_reported() {
        let vertex = module(ShaderStageKind::Vertex, VEC3_VERTEX);
        let fragment = module(ShaderStageKind::Fragment, COLOR_FRAGMENT);

        let log = match_interfaces(&vertex, &fragment).unwrap_err();
        assert!(log.contains("type mismatch at location 0"), "log: {log}");
        assert!(log.contains("vec3") && log.contains("vec4"), "log: {log}");
    }
}
