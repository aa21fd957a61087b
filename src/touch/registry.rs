use std::collections::BTreeMap;

use super::object::{TouchObject, TouchStatus, TouchTiming};
use crate::{
    timer::earliest,
    types::{GestureEvent, TouchContact, TouchId},
};

/// Outcome of one timer sweep over the registry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SweepSummary {
    pub held_off_grid: bool,
    pub completed: usize,
}

/// Live touch objects keyed by identity.
#[derive(Clone, Debug, Default)]
pub struct TouchRegistry {
    objects: BTreeMap<TouchId, TouchObject>,
}

impl TouchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Registers unseen contacts and returns the identities created by this call.
    pub fn add(&mut self, contacts: &[TouchContact], now_ms: u64, timing: TouchTiming) -> Vec<TouchId> {
        let mut created = Vec::new();
        for contact in contacts {
            if self.objects.contains_key(&contact.id) {
                continue;
            }
            self.objects.insert(
                contact.id,
                TouchObject::new(contact.id, contact.point, now_ms, timing),
            );
            created.push(contact.id);
        }
        if !created.is_empty() {
            log::debug!("registry: add new={} total={}", created.len(), self.objects.len());
        }
        created
    }

    /// Whether any registered touch is still sounding its note.
    pub fn any_on(&self) -> bool {
        self.objects.values().any(TouchObject::is_on)
    }

    pub fn get(&self, id: TouchId) -> Option<&TouchObject> {
        self.objects.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: TouchId) -> Option<&mut TouchObject> {
        self.objects.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TouchObject> {
        self.objects.values()
    }

    pub fn turn_off(
        &mut self,
        ids: impl IntoIterator<Item = TouchId>,
        now_ms: u64,
        out: &mut Vec<GestureEvent>,
    ) {
        for id in ids {
            let Some(object) = self.objects.get_mut(&id) else {
                continue;
            };
            if object.off(now_ms, out) == TouchStatus::LifeComplete {
                self.remove(id);
            }
        }
    }

    pub fn all_on(&mut self, out: &mut Vec<GestureEvent>) {
        log::debug!("registry: all on count={}", self.objects.len());
        for object in self.objects.values_mut() {
            object.on(out);
        }
    }

    pub fn all_off(&mut self, now_ms: u64, out: &mut Vec<GestureEvent>) {
        let ids: Vec<TouchId> = self.objects.keys().copied().collect();
        self.turn_off(ids, now_ms, out);
    }

    pub fn remove(&mut self, id: TouchId) -> Option<TouchObject> {
        let mut object = self.objects.remove(&id)?;
        object.remove();
        Some(object)
    }

    pub fn remove_all(&mut self) {
        if !self.objects.is_empty() {
            log::debug!("registry: remove all count={}", self.objects.len());
        }
        for object in self.objects.values_mut() {
            object.remove();
        }
        self.objects.clear();
    }

    pub fn next_due_ms(&self) -> Option<u64> {
        self.objects
            .values()
            .fold(None, |due, object| earliest(due, object.next_due_ms()))
    }

    /// Fires every object timer due at `now_ms` and drops completed objects.
    pub fn fire_due(&mut self, now_ms: u64, out: &mut Vec<GestureEvent>) -> SweepSummary {
        let mut summary = SweepSummary::default();
        let due: Vec<TouchId> = self
            .objects
            .iter()
            .filter(|(_, object)| object.next_due_ms().is_some_and(|due| due <= now_ms))
            .map(|(id, _)| *id)
            .collect();
        for id in due {
            let Some(object) = self.objects.get_mut(&id) else {
                continue;
            };
            match object.fire_due(now_ms, out) {
                TouchStatus::Alive => {}
                TouchStatus::HeldOffGrid => summary.held_off_grid = true,
                TouchStatus::LifeComplete => {
                    self.remove(id);
                    summary.completed += 1;
                }
            }
        }
        summary
    }
}
