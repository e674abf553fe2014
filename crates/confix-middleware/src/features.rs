//! Typed per-run state shared between stages.
//!
//! Stages communicate through [`Features`]: an earlier stage stores a value,
//! later stages and the handler read it by type. Reading a feature nobody
//! stored is a [`ConfixError::MissingFeature`], which always points at a
//! stage-ordering mistake.

use confix_core::{ConfixError, ConfixResult};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

/// Identity of a feature type, used to declare handler requirements.
///
/// # Example
///
/// ```
/// use confix_middleware::FeatureKey;
///
/// struct ConnectionString(String);
///
/// let key = FeatureKey::of::<ConnectionString>();
/// assert_eq!(key.name(), "ConnectionString");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeatureKey {
    id: TypeId,
    name: &'static str,
}

impl FeatureKey {
    /// Returns the key of feature type `T`.
    #[must_use]
    pub fn of<T: Send + Sync + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: short_type_name(std::any::type_name::<T>()),
        }
    }

    /// The unqualified type name, used in diagnostics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FeatureKey").field(&self.name).finish()
    }
}

impl fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// "confix::features::JsonSchemaFeature" -> "JsonSchemaFeature"
fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    match base.rfind("::") {
        Some(index) => &full[index + 2..],
        None => full,
    }
}

/// Map from feature type to one instance of it.
///
/// There is no locking: a run owns its features and stages execute one at a
/// time.
///
/// # Example
///
/// ```
/// use confix_middleware::Features;
///
/// #[derive(Debug, PartialEq)]
/// struct EnvironmentName(String);
///
/// let mut features = Features::new();
/// features.set(EnvironmentName("staging".to_string()));
///
/// assert_eq!(features.get::<EnvironmentName>().unwrap().0, "staging");
/// assert!(features.get::<u32>().is_err());
/// ```
#[derive(Default)]
pub struct Features {
    entries: HashMap<TypeId, (&'static str, Box<dyn Any + Send + Sync>)>,
}

impl Features {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value`, replacing a previous value of the same type.
    pub fn set<T: Send + Sync + 'static>(&mut self, value: T) {
        let key = FeatureKey::of::<T>();
        self.entries.insert(key.id, (key.name, Box::new(value)));
    }

    /// Returns the value of type `T`.
    ///
    /// # Errors
    ///
    /// Returns `ConfixError::MissingFeature` if no value of type `T` was set.
    pub fn get<T: Send + Sync + 'static>(&self) -> ConfixResult<&T> {
        self.try_get::<T>().ok_or_else(missing::<T>)
    }

    /// Returns the value of type `T` for in-place mutation.
    ///
    /// # Errors
    ///
    /// Returns `ConfixError::MissingFeature` if no value of type `T` was set.
    pub fn get_mut<T: Send + Sync + 'static>(&mut self) -> ConfixResult<&mut T> {
        self.entries
            .get_mut(&TypeId::of::<T>())
            .and_then(|(_, value)| value.downcast_mut())
            .ok_or_else(missing::<T>)
    }

    /// Returns the value of type `T`, if set.
    #[must_use]
    pub fn try_get<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.entries
            .get(&TypeId::of::<T>())
            .and_then(|(_, value)| value.downcast_ref())
    }

    /// Removes and returns the value of type `T`.
    pub fn remove<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.entries
            .remove(&TypeId::of::<T>())
            .and_then(|(_, value)| value.downcast().ok())
            .map(|boxed| *boxed)
    }

    /// Returns `true` if a value of type `T` is set.
    #[must_use]
    pub fn contains<T: Send + Sync + 'static>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    /// Returns `true` if a value for `key` is set.
    #[must_use]
    pub fn contains_key(&self, key: &FeatureKey) -> bool {
        self.entries.contains_key(&key.id)
    }

    /// Number of stored features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Features {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.entries.values().map(|(name, _)| *name).collect();
        names.sort_unstable();
        f.debug_struct("Features").field("entries", &names).finish()
    }
}

fn missing<T: Send + Sync + 'static>() -> ConfixError {
    ConfixError::missing_feature(FeatureKey::of::<T>().name())
}
