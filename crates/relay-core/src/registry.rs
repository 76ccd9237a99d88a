//! The identity-to-connection registry.
//!
//! The server keeps two independent [`Registry`] instances, one for devices
//! and one for clients. Each maps an [`Identity`] to whatever the transport
//! layer uses as a connection handle (the value type is generic so tests can
//! register plain integers or strings).
//!
//! Membership rules: `insert` happens exactly once per registration, `remove`
//! happens exactly once per disconnect, and nothing else mutates an entry. An
//! identity is therefore present iff its owning connection is live.

use std::collections::HashMap;

use crate::identity::Identity;

/// In-memory mapping from [`Identity`] to a live connection handle.
///
/// Backed by a `HashMap` for O(1) lookup per relayed message. Iteration order
/// is unspecified; [`Registry::snapshot`] makes no ordering promise.
#[derive(Debug)]
pub struct Registry<V> {
    entries: HashMap<Identity, V>,
}

impl<V> Registry<V> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Adds or overwrites the mapping for `id`. Succeeds unconditionally.
    pub fn insert(&mut self, id: Identity, value: V) {
        self.entries.insert(id, value);
    }

    /// Returns the current mapping for `id`, or `None` if absent.
    pub fn lookup(&self, id: &Identity) -> Option<&V> {
        self.entries.get(id)
    }

    /// Deletes the mapping for `id` if present. A remove of an absent
    /// identity is a no-op, never an error.
    pub fn remove(&mut self, id: &Identity) -> Option<V> {
        self.entries.remove(id)
    }

    /// Returns a point-in-time copy of every registered identity.
    ///
    /// Callers iterate the copy, not the registry, so concurrent inserts and
    /// removes on the live mapping cannot invalidate the iteration.
    pub fn snapshot(&self) -> Vec<Identity> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for Registry<V> {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_registry_starts_empty() {
        let registry: Registry<u32> = Registry::new();
        assert!(registry.is_empty());
        assert!(registry.snapshot().is_empty());
    }

    #[test]
    fn test_insert_then_lookup_returns_value() {
        let mut registry = Registry::new();
        let id = Identity::generate();
        registry.insert(id.clone(), 7u32);
        assert_eq!(registry.lookup(&id), Some(&7));
    }

    #[test]
    fn test_lookup_of_unknown_identity_is_absent() {
        let registry: Registry<u32> = Registry::new();
        assert_eq!(registry.lookup(&Identity::from("ffffffffffffffff")), None);
    }

    #[test]
    fn test_insert_overwrites_existing_mapping() {
        let mut registry = Registry::new();
        let id = Identity::generate();
        registry.insert(id.clone(), 1u32);
        registry.insert(id.clone(), 2u32);
        assert_eq!(registry.lookup(&id), Some(&2));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove_deletes_mapping() {
        let mut registry = Registry::new();
        let id = Identity::generate();
        registry.insert(id.clone(), 1u32);
        assert_eq!(registry.remove(&id), Some(1));
        assert_eq!(registry.lookup(&id), None);
    }

    #[test]
    fn test_remove_of_absent_identity_is_noop() {
        let mut registry: Registry<u32> = Registry::new();
        assert_eq!(registry.remove(&Identity::from("0000000000000000")), None);
        // A second remove of the same identity is equally silent.
        assert_eq!(registry.remove(&Identity::from("0000000000000000")), None);
    }

    #[test]
    fn test_snapshot_contains_exactly_the_registered_identities() {
        let mut registry = Registry::new();
        let ids: Vec<Identity> = (0..4).map(|_| Identity::generate()).collect();
        for (i, id) in ids.iter().enumerate() {
            registry.insert(id.clone(), i);
        }

        let snapshot: HashSet<Identity> = registry.snapshot().into_iter().collect();
        let expected: HashSet<Identity> = ids.into_iter().collect();
        assert_eq!(snapshot, expected);
    }

    #[test]
    fn test_snapshot_is_a_copy_not_a_view() {
        let mut registry = Registry::new();
        let id = Identity::generate();
        registry.insert(id.clone(), 0u32);

        let snapshot = registry.snapshot();
        registry.remove(&id);

        // The copy still holds the identity removed afterwards.
        assert_eq!(snapshot, vec![id]);
    }
}
