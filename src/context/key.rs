// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed field keys and field bundles.

use std::any::Any;
use std::collections::HashMap;
use std::fmt::Debug;
use std::marker::PhantomData;

pub(crate) type Value = Box<dyn Any + Send>;

/// Names a field in a request slot together with the type stored under it.
///
/// Keys are usually declared as constants next to the code that owns the field:
///
/// ```rust
/// use reqdebug::context::Key;
///
/// const RETRIES: Key<u32> = Key::new("client.retries");
/// assert_eq!(RETRIES.name(), "client.retries");
/// ```
///
/// Two keys with the same name but different types address the same field; reads
/// through the mismatched key see the default and updates fail with
/// [`Error::TypeMismatch`](crate::Error::TypeMismatch).
pub struct Key<T> {
    name: &'static str,
    _type: PhantomData<fn() -> T>,
}

impl<T> Key<T> {
    pub const fn new(name: &'static str) -> Self {
        Key {
            name,
            _type: PhantomData,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }
}

// Manual impls: derives would demand the same traits of `T`.
impl<T> Clone for Key<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Key<T> {}

impl<T> Debug for Key<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Key").field(&self.name).finish()
    }
}

/// A bundle of typed field values, used to initialize or bulk-update a slot.
///
/// ```rust
/// use reqdebug::context::{Fields, Key};
///
/// const PATH: Key<String> = Key::new("path");
/// const ATTEMPT: Key<u32> = Key::new("attempt");
///
/// let fields = Fields::new()
///     .with(&PATH, "/index".to_string())
///     .with(&ATTEMPT, 1);
/// assert_eq!(fields.len(), 2);
/// ```
#[derive(Default)]
pub struct Fields {
    values: HashMap<&'static str, Value>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<T: Send + 'static>(mut self, key: &Key<T>, value: T) -> Self {
        self.insert(key, value);
        self
    }

    /// Adds a field, replacing any earlier value under the same name.
    pub fn insert<T: Send + 'static>(&mut self, key: &Key<T>, value: T) {
        self.values.insert(key.name(), Box::new(value));
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn into_values(self) -> HashMap<&'static str, Value> {
        self.values
    }
}

impl Debug for Fields {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.values.keys().collect();
        names.sort();
        f.debug_struct("Fields").field("names", &names).finish()
    }
}
