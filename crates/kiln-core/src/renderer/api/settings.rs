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

//! Settings used when acquiring a rendering context.

use serde::{Deserialize, Serialize};

/// Options for acquiring a rendering context from a surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextSettings {
    /// If `true`, the context is wrapped in the validating decorator.
    /// Turn this off in performance-sensitive builds.
    pub debug_mode: bool,
    /// If `true` (and `debug_mode` is on), every forwarded call is logged at trace level.
    pub trace_calls: bool,
    /// The maximum number of live shader and program objects, if the driver supports a cap.
    pub object_limit: Option<usize>,
    /// An optional label used in logs.
    pub label: Option<String>,
}

impl Default for ContextSettings {
    fn default() -> Self {
        Self {
            debug_mode: true,
            trace_calls: false,
            object_limit: None,
            label: None,
        }
    }
}

impl ContextSettings {
    /// Returns these settings with `debug_mode` replaced.
    pub fn with_debug_mode(mut self, debug_mode: bool) -> Self {
        self.debug_mode = debug_mode;
        self
    }

    /// Returns these settings with an object cap.
    pub fn with_object_limit(mut self, limit: usize) -> Self {
        self.object_limit = Some(limit);
        self
    }
}
