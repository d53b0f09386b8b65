// SPDX-License-Identifier: MIT OR Apache-2.0

//! Slot storage shared by every thread in the process.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use super::key::{Fields, Key, Value};
use super::request_context::Scope;
use super::task::TaskId;
use crate::error::{Error, Result};

/// The fields of one logical request.
#[derive(Default)]
pub(crate) struct Slot {
    fields: HashMap<&'static str, Value>,
}

impl Slot {
    pub(crate) fn from_fields(fields: Fields) -> Self {
        Slot {
            fields: fields.into_values(),
        }
    }

    pub(crate) fn get<T: Clone + 'static>(&self, key: &Key<T>) -> Option<T> {
        self.fields.get(key.name())?.downcast_ref::<T>().cloned()
    }

    pub(crate) fn contains<T: 'static>(&self, key: &Key<T>) -> bool {
        self.fields
            .get(key.name())
            .is_some_and(|value| value.is::<T>())
    }

    pub(crate) fn set<T: Send + 'static>(&mut self, key: &Key<T>, value: T) {
        self.fields.insert(key.name(), Box::new(value));
    }

    pub(crate) fn merge(&mut self, fields: Fields) {
        self.fields.extend(fields.into_values());
    }

    /// Moves the current value (or `T::default()`) through `transform`.
    ///
    /// A value of another type is left untouched.
    pub(crate) fn update<T, F>(&mut self, key: &Key<T>, transform: F) -> Result<()>
    where
        T: Default + Send + 'static,
        F: FnOnce(T) -> T,
    {
        let current = match self.fields.remove(key.name()) {
            None => T::default(),
            Some(value) => match value.downcast::<T>() {
                Ok(value) => *value,
                Err(other) => {
                    self.fields.insert(key.name(), other);
                    return Err(Error::TypeMismatch { key: key.name() });
                }
            },
        };
        self.fields.insert(key.name(), Box::new(transform(current)));
        Ok(())
    }
}

pub(crate) type SharedSlot = Arc<Mutex<Slot>>;

#[derive(Default)]
struct Registry {
    global: Mutex<Option<SharedSlot>>,
    tasks: Mutex<HashMap<TaskId, SharedSlot>>,
}

static REGISTRY: OnceLock<Registry> = OnceLock::new();

fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::default)
}

/// Locks `mutex`, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Installs a fresh slot for `scope`, discarding the previous one.
///
/// Anyone still holding the old slot keeps writing into a detached copy that no
/// later lookup can reach.
pub(crate) fn install(scope: Scope, slot: Slot) {
    let slot = Arc::new(Mutex::new(slot));
    match scope {
        Scope::Global => {
            lock(&registry().global).replace(slot);
        }
        Scope::Task(id) => {
            lock(&registry().tasks).insert(id, slot);
        }
    }
}

pub(crate) fn resolve(scope: Scope) -> Option<SharedSlot> {
    match scope {
        Scope::Global => lock(&registry().global).clone(),
        Scope::Task(id) => lock(&registry().tasks).get(&id).cloned(),
    }
}

pub(crate) fn remove(scope: Scope) -> bool {
    match scope {
        Scope::Global => lock(&registry().global).take().is_some(),
        Scope::Task(id) => lock(&registry().tasks).remove(&id).is_some(),
    }
}

pub(crate) fn task_slot_count() -> usize {
    lock(&registry().tasks).len()
}
