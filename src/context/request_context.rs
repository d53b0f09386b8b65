// SPDX-License-Identifier: MIT OR Apache-2.0

//! The ambient request context API.

use std::fmt::Display;

use logwise::privacy::{IPromiseItsNotPrivate, LogIt};

use super::key::{Fields, Key};
use super::registry::{self, Slot, lock};
use super::task::{self, TaskId};
use crate::error::{Error, Result};

/// Which slot an operation resolved to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Scope {
    /// The process-wide slot used outside cooperative tasks.
    Global,
    /// The slot owned by one cooperative task.
    Task(TaskId),
}

impl Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Global => write!(f, "the global slot"),
            Scope::Task(id) => write!(f, "task {id}"),
        }
    }
}

/// Process-wide, execution-model-aware key/value store for the current request.
///
/// `RequestContext` has no instances; every associated function resolves the
/// slot for the calling code (see the [module docs](super)) and then operates on
/// it.
///
/// ```rust
/// use reqdebug::context::{Fields, Key, RequestContext, task, TaskId};
///
/// const HITS: Key<u32> = Key::new("hits");
///
/// let _task = task::enter(TaskId::next());
/// RequestContext::init(Fields::new());
/// RequestContext::update(&HITS, |hits| hits + 1).unwrap();
/// RequestContext::update(&HITS, |hits| hits + 1).unwrap();
/// assert_eq!(RequestContext::get(&HITS, 0), 2);
/// ```
#[derive(Debug)]
pub struct RequestContext {
    _private: (),
}

impl RequestContext {
    /// The scope that an operation issued right now would resolve to.
    #[inline]
    pub fn current_scope() -> Scope {
        match task::current() {
            Some(id) => Scope::Task(id),
            None => Scope::Global,
        }
    }

    /// Replaces the current slot's contents with `fields`.
    ///
    /// Call once at the start of every logical request, before any other
    /// operation. Nothing from a previous request on the same scope survives.
    pub fn init(fields: Fields) {
        let scope = Self::current_scope();
        registry::install(scope, Slot::from_fields(fields));
        logwise::debuginternal_sync!("request slot initialized for {scope}", scope = LogIt(scope));
    }

    /// Whether the current scope has a slot.
    pub fn is_active() -> bool {
        registry::resolve(Self::current_scope()).is_some()
    }

    /// Returns the value stored under `key`, or `default`.
    ///
    /// Never fails. A missing slot, a missing field and a field of another type
    /// all produce `default`.
    pub fn get<T: Clone + 'static>(key: &Key<T>, default: T) -> T {
        Self::find(key).unwrap_or(default)
    }

    /// Like [`get`](Self::get), but reports absence as `None`.
    pub fn find<T: Clone + 'static>(key: &Key<T>) -> Option<T> {
        let slot = registry::resolve(Self::current_scope())?;
        lock(&slot).get(key)
    }

    /// Whether the current slot holds a value of type `T` under `key`.
    pub fn contains<T: 'static>(key: &Key<T>) -> bool {
        registry::resolve(Self::current_scope()).is_some_and(|slot| lock(&slot).contains(key))
    }

    /// Overwrites one field of the current slot.
    pub fn set<T: Send + 'static>(key: &Key<T>, value: T) -> Result<()> {
        Self::with_slot(|slot| slot.set(key, value))
    }

    /// Merges `fields` into the current slot, keeping fields not named in it.
    pub fn set_many(fields: Fields) -> Result<()> {
        Self::with_slot(|slot| slot.merge(fields))
    }

    /// Atomically replaces the value under `key` with `transform(value)`.
    ///
    /// An absent field starts from `T::default()`. The slot stays locked while
    /// `transform` runs, so `transform` must not call back into
    /// `RequestContext`.
    pub fn update<T, F>(key: &Key<T>, transform: F) -> Result<()>
    where
        T: Default + Send + 'static,
        F: FnOnce(T) -> T,
    {
        Self::with_slot(|slot| slot.update(key, transform)).and_then(|result| {
            if let Err(Error::TypeMismatch { key }) = &result {
                logwise::warn_sync!("update skipped: field {key} holds another type", key = IPromiseItsNotPrivate(*key));
            }
            result
        })
    }

    /// Drops the current scope's slot. Returns whether one existed.
    pub fn release() -> bool {
        let scope = Self::current_scope();
        let released = registry::remove(scope);
        if released {
            logwise::debuginternal_sync!("request slot released for {scope}", scope = LogIt(scope));
        }
        released
    }

    /// Number of cooperative task slots currently held by the process.
    pub fn task_slot_count() -> usize {
        registry::task_slot_count()
    }

    fn with_slot<R>(f: impl FnOnce(&mut Slot) -> R) -> Result<R> {
        let scope = Self::current_scope();
        let slot = registry::resolve(scope).ok_or(Error::NoActiveContext { scope })?;
        let mut guard = lock(&slot);
        Ok(f(&mut guard))
    }
}
