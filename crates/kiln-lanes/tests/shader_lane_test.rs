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

use kiln_core::renderer::api::{GlError, GpuObjectKind, ObjectCounts};
use kiln_core::{ContextError, RenderingContext, ShaderStageKind};
use kiln_infra::graphics::{HeadlessSurface, SoftwareContext, ValidatingContext};
use kiln_lanes::shader_lane::{compile, link};
use kiln_lanes::{build, PipelineError, ProgramLane};

const VERTEX: &str = "#version 450
layout(location = 0) out vec4 v_color;
void main() {
    v_color = vec4(1.0, 0.5, 0.0, 1.0);
    gl_Position = vec4(0.0, 0.0, 0.0, 1.0);
}
";

const FRAGMENT: &str = "#version 450
layout(location = 0) in vec4 v_color;
layout(location = 0) out vec4 frag_color;
void main() {
    frag_color = v_color;
}
";

/// Compiles on its own but reads a `vec3` where the vertex stage writes a `vec4`.
const MISMATCHED_FRAGMENT: &str = "#version 450
layout(location = 0) in vec3 v_color;
layout(location = 0) out vec4 frag_color;
void main() {
    frag_color = vec4(v_color, 1.0);
}
";

const BROKEN_VERTEX: &str = "#version 450
void main() {
    gl_Position = vec4(0.0, 0.0, 0.0, 1.0)
}
";

const BROKEN_FRAGMENT: &str = "#version 450
layout(location = 0) out vec4 frag_color;
void main() {
    frag_color = undeclared_color;
}
";

#[test]
fn test_build_installs_the_program() {
    // --- 1. ARRANGE ---
    let mut ctx = SoftwareContext::new();

    // --- 2. ACT ---
    let program = build(&mut ctx, VERTEX, FRAGMENT).expect("valid sources should build");

    // --- 3. ASSERT ---
    assert_eq!(ctx.active_program(), Some(program.id()));
    assert_eq!(
        ctx.live_objects(),
        ObjectCounts {
            shaders: 2,
            programs: 1
        }
    );
    assert_eq!(ctx.linked_varyings(program.id()), Some(vec![0]));
    assert_eq!(program.vertex_stage().kind(), ShaderStageKind::Vertex);
    assert_eq!(program.fragment_stage().kind(), ShaderStageKind::Fragment);
}

#[test]
fn test_rejected_source_leaves_no_shader_behind() {
    // --- 1. ARRANGE ---
    let mut ctx = SoftwareContext::new();
    let before = ctx.live_objects();

    // --- 2. ACT ---
    let result = compile(&mut ctx, ShaderStageKind::Vertex, BROKEN_VERTEX);

    // --- 3. ASSERT ---
    match result {
        Err(PipelineError::Compile { stage, log }) => {
            assert_eq!(stage, ShaderStageKind::Vertex);
            assert!(!log.trim().is_empty(), "the driver log must be surfaced");
        }
        other => panic!("expected a compile error, got {other:?}"),
    }
    assert_eq!(ctx.live_objects(), before);
}

#[test]
fn test_broken_vertex_stops_the_build() {
    let mut ctx = SoftwareContext::new();

    let result = build(&mut ctx, BROKEN_VERTEX, FRAGMENT);

    assert!(matches!(
        result,
        Err(PipelineError::Compile {
            stage: ShaderStageKind::Vertex,
            ..
        })
    ));
    assert_eq!(ctx.live_objects().total(), 0);
    assert_eq!(ctx.active_program(), None);
}

#[test]
fn test_broken_fragment_releases_the_vertex_stage() {
    // --- 1. ARRANGE ---
    let mut ctx = SoftwareContext::new();

    // --- 2. ACT ---
    let result = build(&mut ctx, VERTEX, BROKEN_FRAGMENT);

    // --- 3. ASSERT ---
    assert!(matches!(
        result,
        Err(PipelineError::Compile {
            stage: ShaderStageKind::Fragment,
            ..
        })
    ));
    assert_eq!(ctx.live_objects().shaders, 0, "vertex stage must be released");
    assert_eq!(ctx.active_program(), None);
}

#[test]
fn test_link_failure_releases_program_and_stages() {
    // --- 1. ARRANGE ---
    let mut ctx = SoftwareContext::new();

    // --- 2. ACT ---
    let result = build(&mut ctx, VERTEX, MISMATCHED_FRAGMENT);

    // --- 3. ASSERT ---
    match result {
        Err(PipelineError::Link { log }) => {
            assert!(log.contains("location 0"), "unexpected log: {log}");
        }
        other => panic!("expected a link error, got {other:?}"),
    }
    assert_eq!(ctx.live_objects(), ObjectCounts::default());
    assert_eq!(ctx.active_program(), None);
}

#[test]
fn test_link_rejects_swapped_stages() {
    let mut ctx = SoftwareContext::new();
    let vertex = compile(&mut ctx, ShaderStageKind::Vertex, VERTEX).unwrap();
    let fragment = compile(&mut ctx, ShaderStageKind::Fragment, FRAGMENT).unwrap();

    let result = link(&mut ctx, fragment, vertex);

    assert!(matches!(result, Err(PipelineError::InvalidArgument(_))));
    assert_eq!(ctx.live_objects().total(), 0, "the linker owns the stages it was given");
}

#[test]
fn test_validation_only_applies_in_debug_mode() {
    // --- 1. ARRANGE ---
    // The same misuse: installing a program that was never linked.
    let surface = HeadlessSurface::new();
    let mut debug = kiln_infra::acquire(&surface, true).unwrap();
    let mut raw = kiln_infra::acquire(&surface, false).unwrap();
    let debug_program = debug.create_program().unwrap();
    let raw_program = raw.create_program().unwrap();

    // --- 2. ACT ---
    let debug_result = debug.use_program(Some(debug_program));
    let raw_result = raw.use_program(Some(raw_program));

    // --- 3. ASSERT ---
    assert!(matches!(
        debug_result,
        Err(ContextError::Rejected {
            call: "useProgram",
            code: GlError::InvalidOperation,
            ..
        })
    ));
    assert_eq!(raw_result, Ok(()), "the raw driver does not check the call");
    assert_eq!(raw.get_error().unwrap(), Some(GlError::InvalidOperation));
    assert_eq!(raw.active_program(), None);
}

#[test]
fn test_build_through_the_validating_context() {
    // --- 1. ARRANGE ---
    let mut ctx = ValidatingContext::new(SoftwareContext::new())
        .with_sink(|d| panic!("unexpected diagnostic: {d}"));

    // --- 2. ACT ---
    let program = ProgramLane::with_label("validated")
        .build(&mut ctx, VERTEX, FRAGMENT)
        .unwrap();
    let failed = build(&mut ctx, VERTEX, MISMATCHED_FRAGMENT);

    // --- 3. ASSERT ---
    assert!(matches!(failed, Err(PipelineError::Link { .. })));
    assert_eq!(ctx.active_program(), Some(program.id()));
    assert_eq!(ctx.live_objects().total(), 3, "only the first program remains");
}

#[test]
fn test_two_builds_yield_independent_programs() {
    // --- 1. ARRANGE ---
    let mut ctx = SoftwareContext::new();

    // --- 2. ACT ---
    let first = build(&mut ctx, VERTEX, FRAGMENT).unwrap();
    let second = build(&mut ctx, VERTEX, FRAGMENT).unwrap();

    // --- 3. ASSERT ---
    assert_ne!(first.id(), second.id());
    assert_ne!(first.vertex_stage().id(), second.vertex_stage().id());
    assert_eq!(ctx.active_program(), Some(second.id()));
    assert_eq!(ctx.linked_varyings(first.id()), ctx.linked_varyings(second.id()));

    // The first program is still usable once the second is gone.
    second.destroy(&mut ctx).unwrap();
    ctx.use_program(Some(first.id())).unwrap();
    assert_eq!(ctx.get_error().unwrap(), None);
    assert_eq!(ctx.active_program(), Some(first.id()));
}

#[test]
fn test_refused_shader_allocation_does_not_leak() {
    // Room for the vertex stage only.
    let mut ctx = SoftwareContext::new().with_object_limit(1);

    let result = build(&mut ctx, VERTEX, FRAGMENT);

    assert!(matches!(
        result,
        Err(PipelineError::Allocation {
            object: GpuObjectKind::Shader,
            ..
        })
    ));
    assert_eq!(ctx.live_objects().total(), 0);
}

#[test]
fn test_refused_program_allocation_does_not_leak() {
    // Room for both stages but not the program.
    let mut ctx = SoftwareContext::new().with_object_limit(2);

    let result = build(&mut ctx, VERTEX, FRAGMENT);

    assert!(matches!(
        result,
        Err(PipelineError::Allocation {
            object: GpuObjectKind::Program,
            ..
        })
    ));
    assert_eq!(ctx.live_objects().total(), 0);
}

#[test]
fn test_destroy_returns_the_context_to_zero() {
    // --- 1. ARRANGE ---
    let mut ctx = SoftwareContext::new();
    let program = build(&mut ctx, VERTEX, FRAGMENT).unwrap();

    // --- 2. ACT ---
    // The active program survives its deletion until it is uninstalled.
    program.destroy(&mut ctx).unwrap();
    let while_active = ctx.live_objects().total();
    ctx.use_program(None).unwrap();

    // --- 3. ASSERT ---
    assert_eq!(while_active, 3);
    assert_eq!(ctx.live_objects().total(), 0);
}

#[test]
fn test_lost_context_fails_the_build() {
    // --- 1. ARRANGE ---
    let mut ctx = SoftwareContext::new();
    let _program = build(&mut ctx, VERTEX, FRAGMENT).unwrap();
    ctx.lose_context();

    // --- 2. ACT ---
    let result = build(&mut ctx, VERTEX, FRAGMENT);

    // --- 3. ASSERT ---
    assert_eq!(result, Err(PipelineError::ContextLost));
    assert_eq!(ctx.live_objects().total(), 0);
}

#[test]
fn test_unsupported_surface_yields_no_context() {
    assert!(kiln_infra::acquire(&HeadlessSurface::unsupported(), true).is_none());
}

#[test]
fn test_earlier_driver_flag_does_not_fail_a_validated_build() {
    // --- 1. ARRANGE ---
    // A call made outside the lane leaves INVALID_VALUE on the shared driver.
    let mut raw = SoftwareContext::new();
    raw.compile_shader(kiln_core::renderer::api::ShaderId(99)).unwrap();
    let mut ctx = ValidatingContext::new(raw).with_sink(|d| panic!("unexpected diagnostic: {d}"));

    // --- 2. ACT ---
    let program = build(&mut ctx, VERTEX, FRAGMENT).expect("a stale flag must not fail the build");

    // --- 3. ASSERT ---
    assert_eq!(ctx.active_program(), Some(program.id()));
    assert_eq!(ctx.live_objects().total(), 3);
}
