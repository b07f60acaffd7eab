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

use kiln_core::{ContextSettings, DrawableSurface, RenderingContext};

use super::debug::ValidatingContext;

/// Requests a rendering context from `surface`.
///
/// With `debug_mode` the raw context is wrapped in a [`ValidatingContext`], so misuse
/// is rejected and reported instead of being silently ignored by the driver. Returns
/// `None` if the surface cannot provide a context.
pub fn acquire(surface: &dyn DrawableSurface, debug_mode: bool) -> Option<Box<dyn RenderingContext>> {
    let settings = ContextSettings::default().with_debug_mode(debug_mode);
    acquire_with(surface, &settings)
}

/// Requests a rendering context from `surface` using the full acquisition settings.
pub fn acquire_with(
    surface: &dyn DrawableSurface,
    settings: &ContextSettings,
) -> Option<Box<dyn RenderingContext>> {
    let Some(raw) = surface.request_context(settings) else {
        log::warn!(
            "Surface '{}' cannot provide a rendering context",
            surface.name()
        );
        return None;
    };

    let info = raw.info();
    log::info!(
        "Acquired {} context on '{}': {} (validation {})",
        info.backend,
        surface.name(),
        info.renderer,
        if settings.debug_mode { "on" } else { "off" }
    );

    if settings.debug_mode {
        Some(Box::new(
            ValidatingContext::new(raw).with_call_tracing(settings.trace_calls),
        ))
    } else {
        Some(raw)
    }
}
