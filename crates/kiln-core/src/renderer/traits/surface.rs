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

use crate::renderer::api::ContextSettings;
use crate::renderer::traits::RenderingContext;

/// A drawable surface that can provide a raw rendering context.
pub trait DrawableSurface {
    /// A short name for logs.
    fn name(&self) -> &str;

    /// Requests a raw (non-validating) rendering context bound to this surface.
    ///
    /// Returns `None` when the surface cannot provide one. This is a normal negative
    /// answer (the capability is unsupported), not an error.
    fn request_context(&self, settings: &ContextSettings) -> Option<Box<dyn RenderingContext>>;
}
