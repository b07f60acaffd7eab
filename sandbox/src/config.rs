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

//! Sandbox configuration loaded from a TOML file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use kiln_core::ContextSettings;
use serde::Deserialize;

/// The `sandbox.toml` layout. Every field is optional.
///
/// ```toml
/// vertex_shader = "shaders/point.vert"
/// fragment_shader = "shaders/point.frag"
///
/// [context]
/// debug_mode = true
/// object_limit = 64
/// label = "colored point"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    pub context: ContextSettings,
    pub vertex_shader: Option<PathBuf>,
    pub fragment_shader: Option<PathBuf>,
}

impl SandboxConfig {
    /// Loads the configuration from `path`. Relative shader paths are resolved
    /// against the directory of the file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at '{}'", path.display()))?;
        let mut config: SandboxConfig = toml::from_str(&text)
            .with_context(|| format!("Failed to parse TOML from '{}'", path.display()))?;

        if let Some(base) = path.parent() {
            for shader in [&mut config.vertex_shader, &mut config.fragment_shader] {
                if let Some(relative) = shader.as_mut().filter(|p| p.is_relative()) {
                    *relative = base.join(&*relative);
                }
            }
        }
        Ok(config)
    }
}
