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

//! Bookkeeping that mirrors what a GL driver keeps alive.
//!
//! GL only frees a deleted shader once no program holds it, and a deleted
//! program once it is no longer installed. The registry tracks the same rules
//! for native handles of any type.

use std::collections::HashMap;

use kiln_core::renderer::api::{GlError, ObjectCounts, ProgramId, ShaderId, ShaderStageKind};

struct ShaderEntry<S> {
    native: S,
    kind: ShaderStageKind,
    attachments: usize,
    delete_pending: bool,
}

struct ProgramEntry<P> {
    native: P,
    vertex: Option<ShaderId>,
    fragment: Option<ShaderId>,
    delete_pending: bool,
}

impl<P> ProgramEntry<P> {
    fn slot_mut(&mut self, kind: ShaderStageKind) -> &mut Option<ShaderId> {
        match kind {
            ShaderStageKind::Vertex => &mut self.vertex,
            ShaderStageKind::Fragment => &mut self.fragment,
        }
    }
}

/// Native handles by id, with GL's deferred deletion rules applied.
pub(crate) struct GlRegistry<S, P> {
    shaders: HashMap<ShaderId, ShaderEntry<S>>,
    programs: HashMap<ProgramId, ProgramEntry<P>>,
    active: Option<ProgramId>,
}

impl<S: Copy, P: Copy> GlRegistry<S, P> {
    pub(crate) fn new() -> Self {
        Self {
            shaders: HashMap::new(),
            programs: HashMap::new(),
            active: None,
        }
    }

    pub(crate) fn insert_shader(&mut self, id: ShaderId, native: S, kind: ShaderStageKind) {
        self.shaders.insert(
            id,
            ShaderEntry {
                native,
                kind,
                attachments: 0,
                delete_pending: false,
            },
        );
    }

    pub(crate) fn insert_program(&mut self, id: ProgramId, native: P) {
        self.programs.insert(
            id,
            ProgramEntry {
                native,
                vertex: None,
                fragment: None,
                delete_pending: false,
            },
        );
    }

    pub(crate) fn shader(&self, id: ShaderId) -> Option<S> {
        self.shaders.get(&id).map(|s| s.native)
    }

    pub(crate) fn program(&self, id: ProgramId) -> Option<P> {
        self.programs.get(&id).map(|p| p.native)
    }

    pub(crate) fn active(&self) -> Option<ProgramId> {
        self.active
    }

    pub(crate) fn counts(&self) -> ObjectCounts {
        ObjectCounts {
            shaders: self.shaders.len(),
            programs: self.programs.len(),
        }
    }

    /// Records an attachment. Fails if the program already holds a shader of that kind.
    pub(crate) fn attach(&mut self, program: ProgramId, shader: ShaderId) -> Result<(), GlError> {
        let kind = self.shaders.get(&shader).ok_or(GlError::InvalidValue)?.kind;
        let entry = self.programs.get_mut(&program).ok_or(GlError::InvalidValue)?;
        let slot = entry.slot_mut(kind);
        if slot.is_some() {
            return Err(GlError::InvalidOperation);
        }
        *slot = Some(shader);
        if let Some(s) = self.shaders.get_mut(&shader) {
            s.attachments += 1;
        }
        Ok(())
    }

    /// Records a detachment. Fails if `shader` is not attached to `program`.
    pub(crate) fn detach(&mut self, program: ProgramId, shader: ShaderId) -> Result<(), GlError> {
        let kind = self.shaders.get(&shader).ok_or(GlError::InvalidValue)?.kind;
        let entry = self.programs.get_mut(&program).ok_or(GlError::InvalidValue)?;
        let slot = entry.slot_mut(kind);
        if *slot != Some(shader) {
            return Err(GlError::InvalidOperation);
        }
        *slot = None;
        if let Some(s) = self.shaders.get_mut(&shader) {
            s.attachments = s.attachments.saturating_sub(1);
        }
        self.forget_shader_if_orphaned(shader);
        Ok(())
    }

    pub(crate) fn delete_shader(&mut self, shader: ShaderId) {
        if let Some(entry) = self.shaders.get_mut(&shader) {
            entry.delete_pending = true;
        }
        self.forget_shader_if_orphaned(shader);
    }

    /// The active program is only flagged; it is freed once uninstalled.
    pub(crate) fn delete_program(&mut self, program: ProgramId) {
        if self.active == Some(program) {
            if let Some(entry) = self.programs.get_mut(&program) {
                entry.delete_pending = true;
            }
        } else {
            self.forget_program(program);
        }
    }

    pub(crate) fn set_active(&mut self, program: Option<ProgramId>) {
        let previous = std::mem::replace(&mut self.active, program);
        if let Some(previous) = previous.filter(|p| Some(*p) != program) {
            if self.programs.get(&previous).is_some_and(|p| p.delete_pending) {
                self.forget_program(previous);
            }
        }
    }

    fn forget_shader_if_orphaned(&mut self, shader: ShaderId) {
        let orphaned = self
            .shaders
            .get(&shader)
            .is_some_and(|s| s.delete_pending && s.attachments == 0);
        if orphaned {
            self.shaders.remove(&shader);
        }
    }

    fn forget_program(&mut self, program: ProgramId) {
        let Some(entry) = self.programs.remove(&program) else {
            return;
        };
        for shader in [entry.vertex, entry.fragment].into_iter().flatten() {
            if let Some(s) = self.shaders.get_mut(&shader) {
                s.attachments = s.attachments.saturating_sub(1);
            }
            self.forget_shader_if_orphaned(shader);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VS: ShaderId = ShaderId(1);
    const FS: ShaderId = ShaderId(2);
    const PROGRAM: ProgramId = ProgramId(3);

    /// A program holding one vertex and one fragment shader.
    fn linked() -> GlRegistry<u32, u32> {
        let mut registry = GlRegistry::new();
        registry.insert_shader(VS, 10, ShaderStageKind::Vertex);
        registry.insert_shader(FS, 11, ShaderStageKind::Fragment);
        registry.insert_program(PROGRAM, 12);
        registry.attach(PROGRAM, VS).unwrap();
        registry.attach(PROGRAM, FS).unwrap();
        registry
    }

    #[test]
    fn attached_shader_outlives_its_deletion() {
        let mut registry = linked();

        registry.delete_shader(VS);

        assert_eq!(registry.counts().shaders, 2);
        registry.detach(PROGRAM, VS).unwrap();
        assert_eq!(registry.counts().shaders, 1);
        assert_eq!(registry.shader(VS), None);
    }

    #[test]
    fn active_program_is_freed_when_uninstalled() {
        let mut registry = linked();
        registry.set_active(Some(PROGRAM));
        registry.delete_shader(VS);
        registry.delete_shader(FS);

        registry.delete_program(PROGRAM);
        let while_active = registry.counts().total();
        registry.set_active(None);

        assert_eq!(while_active, 3);
        assert_eq!(registry.counts(), ObjectCounts::default());
    }

    #[test]
    fn reinstalling_the_same_program_keeps_it() {
        let mut registry = linked();
        registry.set_active(Some(PROGRAM));
        registry.delete_program(PROGRAM);

        registry.set_active(Some(PROGRAM));

        assert_eq!(registry.program(PROGRAM), Some(12));
    }

    #[test]
    fn inactive_program_frees_its_deleted_stages() {
        let mut registry = linked();
        registry.delete_shader(VS);
        registry.delete_shader(FS);

        registry.delete_program(PROGRAM);

        assert_eq!(registry.counts().total(), 0);
    }

    #[test]
    fn slot_rules_follow_the_driver() {
        let mut registry = linked();
        registry.insert_shader(ShaderId(4), 13, ShaderStageKind::Vertex);

        assert_eq!(registry.attach(PROGRAM, ShaderId(4)), Err(GlError::InvalidOperation));
        assert_eq!(registry.detach(PROGRAM, ShaderId(4)), Err(GlError::InvalidOperation));
        assert_eq!(registry.attach(PROGRAM, ShaderId(9)), Err(GlError::InvalidValue));
    }
}
