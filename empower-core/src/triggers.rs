//! Triggers enabled by the controller, keyed by (module, type, instance).

use std::collections::HashMap;

use rand::Rng;

use crate::scheduler::JobType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerType {
    UeReport,
    UeMeasure,
    MacReport,
}

impl TriggerType {
    /// Job that serves this trigger.
    pub fn job_type(self) -> JobType {
        match self {
            TriggerType::UeReport => JobType::UeReport,
            TriggerType::UeMeasure => JobType::UeMeasure,
            TriggerType::MacReport => JobType::MacReport,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TriggerKey {
    pub mod_id: u32,
    pub kind: TriggerType,
    /// Distinguishes triggers of the same module and type (the measurement id).
    pub instance: u32,
}

#[derive(Debug, Clone)]
pub struct Trigger {
    pub id: u32,
    pub key: TriggerKey,
    /// The request that enabled this trigger.
    pub request: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct TriggerTable {
    triggers: HashMap<u32, Trigger>,
}

impl TriggerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable a trigger, or return the one already enabled for `key`.
    pub fn add(&mut self, key: TriggerKey, request: Vec<u8>) -> &Trigger {
        if let Some(id) = self.has_trigger_ext(&key).map(|t| t.id) {
            tracing::debug!(id, ?key, "trigger already exists");
            return &self.triggers[&id];
        }
        let id = self.next_id();
        tracing::debug!(id, ?key, "new trigger enabled");
        self.triggers
            .entry(id)
            .or_insert(Trigger { id, key, request })
    }

    /// Replace the stored request of trigger `id`. False if no such trigger.
    pub fn set_request(&mut self, id: u32, request: Vec<u8>) -> bool {
        match self.triggers.get_mut(&id) {
            Some(t) => {
                t.request = request;
                true
            }
            None => false,
        }
    }

    /// Disable the trigger registered for `key`.
    pub fn del(&mut self, key: &TriggerKey) -> Option<Trigger> {
        let id = self.has_trigger_ext(key)?.id;
        self.triggers.remove(&id)
    }

    pub fn find(&self, id: u32) -> Option<&Trigger> {
        self.triggers.get(&id)
    }

    pub fn has_trigger(&self, id: u32) -> bool {
        self.triggers.contains_key(&id)
    }

    pub fn has_trigger_ext(&self, key: &TriggerKey) -> Option<&Trigger> {
        self.triggers.values().find(|t| t.key == *key)
    }

    /// Disable every trigger. Returns how many were dropped.
    pub fn flush(&mut self) -> usize {
        let n = self.triggers.len();
        for id in self.triggers.keys() {
            tracing::debug!(id, "flushing trigger");
        }
        self.triggers.clear();
        n
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    /// Random id, non-zero, positive as a C int, and not in use.
    fn next_id(&self) -> u32 {
        let mut rng = rand::thread_rng();
        loop {
            let id = rng.gen_range(1..=i32::MAX as u32);
            if !self.triggers.contains_key(&id) {
                return id;
            }
        }
    }
}
