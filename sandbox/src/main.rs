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

mod config;
mod shaders;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use kiln_core::{ContextError, DrawableSurface, Program, RenderingContext};
use kiln_infra::graphics::HeadlessSurface;
use kiln_lanes::ProgramLane;

use crate::config::SandboxConfig;

/// Builds a shader program on a headless rendering context and reports the result.
#[derive(Parser, Debug)]
#[command(name = "sandbox")]
#[command(about = "Compile, link, and install a shader program")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Vertex shader source file (overrides the config)
    #[arg(long)]
    vertex: Option<PathBuf>,

    /// Fragment shader source file (overrides the config)
    #[arg(long)]
    fragment: Option<PathBuf>,

    /// Acquire a raw context without the validating decorator
    #[arg(long)]
    no_debug: bool,
}

fn read_source(path: Option<&Path>, builtin: &'static str) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read shader source at '{}'", path.display())),
        None => Ok(builtin.to_string()),
    }
}

/// Uninstalls and destroys `program`. Both steps are attempted; the first error wins.
fn teardown(ctx: &mut dyn RenderingContext, program: Program) -> Result<(), ContextError> {
    let uninstalled = ctx.use_program(None);
    let destroyed = program.destroy(ctx);
    uninstalled.and(destroyed)
}

fn run(args: Args) -> Result<ExitCode> {
    let mut config = match &args.config {
        Some(path) => SandboxConfig::load(path)?,
        None => SandboxConfig::default(),
    };
    if args.vertex.is_some() {
        config.vertex_shader = args.vertex;
    }
    if args.fragment.is_some() {
        config.fragment_shader = args.fragment;
    }
    if args.no_debug {
        config.context.debug_mode = false;
    }

    let vertex_source = read_source(config.vertex_shader.as_deref(), shaders::POINT_VERTEX)?;
    let fragment_source = read_source(config.fragment_shader.as_deref(), shaders::POINT_FRAGMENT)?;

    let surface = HeadlessSurface::new();
    let mut ctx = kiln_infra::acquire_with(&surface, &config.context).with_context(|| {
        format!("Surface '{}' cannot provide a rendering context", surface.name())
    })?;

    let lane = match &config.context.label {
        Some(label) => ProgramLane::with_label(label.clone()),
        None => ProgramLane::new(),
    };

    match lane.build(ctx.as_mut(), &vertex_source, &fragment_source) {
        Ok(program) => {
            let live = ctx.live_objects();
            log::info!(
                "Program {:?} is active ({} shaders, {} programs live)",
                program.id(),
                live.shaders,
                live.programs
            );
            teardown(ctx.as_mut(), program)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            log::error!("{err}");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn main() -> Result<ExitCode> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info"))
        .filter_module("naga", log::LevelFilter::Warn)
        .init();

    run(Args::parse())
}
