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

//! Drawable surfaces that rendering contexts are requested from.

use kiln_core::{ContextSettings, DrawableSurface, RenderingContext};

use super::software::SoftwareContext;

/// A surface with no window behind it, backed by the software driver.
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    name: String,
    supported: bool,
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessSurface {
    /// A surface that hands out software contexts.
    pub fn new() -> Self {
        Self {
            name: "headless".to_string(),
            supported: true,
        }
    }

    /// A surface that cannot provide any rendering context.
    pub fn unsupported() -> Self {
        Self {
            name: "headless (unsupported)".to_string(),
            supported: false,
        }
    }
}

impl DrawableSurface for HeadlessSurface {
    fn name(&self) -> &str {
        &self.name
    }

    fn request_context(&self, settings: &ContextSettings) -> Option<Box<dyn RenderingContext>> {
        if !self.supported {
            return None;
        }
        Some(Box::new(SoftwareContext::with_settings(settings)))
    }
}

#[cfg(feature = "gl")]
pub use self::gl_surface::GlowSurface;

#[cfg(feature = "gl")]
mod gl_surface {
    use std::ffi::c_void;
    use std::fmt;

    use kiln_core::{ContextSettings, DrawableSurface, RenderingContext};

    use crate::graphics::gl::GlowContext;

    type Loader = Box<dyn Fn(&str) -> *const c_void>;

    /// A surface whose OpenGL context is reached through a symbol loader,
    /// such as the one a windowing library exposes for its current GL context.
    pub struct GlowSurface {
        name: String,
        loader: Loader,
    }

    impl fmt::Debug for GlowSurface {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("GlowSurface")
                .field("name", &self.name)
                .finish_non_exhaustive()
        }
    }

    impl GlowSurface {
        /// Creates a surface from a GL symbol loader.
        ///
        /// # Safety
        ///
        /// The loader must return valid GL entry points (or null) for a context that
        /// is current on the calling thread whenever a context requested from this
        /// surface is used.
        pub unsafe fn from_loader_function(
            name: impl Into<String>,
            loader: impl Fn(&str) -> *const c_void + 'static,
        ) -> Self {
            Self {
                name: name.into(),
                loader: Box::new(loader),
            }
        }
    }

    impl DrawableSurface for GlowSurface {
        fn name(&self) -> &str {
            &self.name
        }

        fn request_context(&self, settings: &ContextSettings) -> Option<Box<dyn RenderingContext>> {
            if (self.loader)("glCreateShader").is_null() {
                log::warn!("Surface '{}' cannot resolve OpenGL entry points", self.name);
                return None;
            }
            // SAFETY: the loader contract is upheld by the caller of `from_loader_function`.
            let gl = unsafe { glow::Context::from_loader_function(|symbol| (self.loader)(symbol)) };
            let context = match settings.object_limit {
                Some(limit) => GlowContext::new(gl).with_object_limit(limit),
                None => GlowContext::new(gl),
            };
            Some(Box::new(context))
        }
    }

}
