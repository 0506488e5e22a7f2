//! The user's enrolled-instrument registry.
//!
//! The registry is owned by the collaborator managing user data (a simple
//! keyed-record store on the client); the comparison engine never writes to
//! it and only consumes read-only snapshots passed in per request. This
//! in-memory representation gives the same interface for embedding and tests.

use crate::models::PaymentInstrument;

/// Keyed store of a user's enrolled payment instruments.
#[derive(Debug, Default, Clone)]
pub struct InstrumentRegistry {
    instruments: Vec<PaymentInstrument>,
}

impl InstrumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enrolls an instrument. Names are unique within the registry: adding a
    /// duplicate name is a no-op and the existing instrument is kept.
    ///
    /// Returns whether the instrument was inserted.
    pub fn add(&mut self, instrument: PaymentInstrument) -> bool {
        if self.instruments.iter().any(|pm| pm.name == instrument.name) {
            tracing::debug!("Instrument '{}' already enrolled; skipping", instrument.name);
            return false;
        }
        self.instruments.push(instrument);
        true
    }

    /// Toggles an instrument's active flag. Returns the new state, or `None`
    /// when no instrument with that id exists.
    pub fn toggle_active(&mut self, id: &str) -> Option<bool> {
        let instrument = self.instruments.iter_mut().find(|pm| pm.id == id)?;
        instrument.active = !instrument.active;
        Some(instrument.active)
    }

    /// Removes an instrument by id. Returns whether anything was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.instruments.len();
        self.instruments.retain(|pm| pm.id != id);
        self.instruments.len() != before
    }

    pub fn get(&self, id: &str) -> Option<&PaymentInstrument> {
        self.instruments.iter().find(|pm| pm.id == id)
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    /// The read-only per-request view the comparison engine consumes.
    pub fn snapshot(&self) -> Vec<PaymentInstrument> {
        self.instruments.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::models::InstrumentKind;

    fn enrolled(name: &str, kind: InstrumentKind) -> PaymentInstrument {
        catalog::lookup_template(name, kind)
            .expect("catalog template")
            .instantiate()
    }

    #[test]
    fn duplicate_names_are_noops() {
        let mut registry = InstrumentRegistry::new();
        let first = enrolled("신한카드", InstrumentKind::Card);
        let first_id = first.id.clone();

        assert!(registry.add(first));
        // Same template instantiated again gets a new id but the same name
        assert!(!registry.add(enrolled("신한카드", InstrumentKind::Card)));
        assert_eq!(registry.len(), 1);
        assert!(registry.get(&first_id).is_some());
    }

    #[test]
    fn toggle_flips_active_state() {
        let mut registry = InstrumentRegistry::new();
        let pm = enrolled("카카오페이", InstrumentKind::Wallet);
        let id = pm.id.clone();
        registry.add(pm);

        assert_eq!(registry.toggle_active(&id), Some(false));
        assert_eq!(registry.toggle_active(&id), Some(true));
        assert_eq!(registry.toggle_active("없는-id"), None);
    }

    #[test]
    fn remove_deletes_by_id() {
        let mut registry = InstrumentRegistry::new();
        let pm = enrolled("토스페이", InstrumentKind::Wallet);
        let id = pm.id.clone();
        registry.add(pm);
        registry.add(enrolled("페이코", InstrumentKind::Wallet));

        assert!(registry.remove(&id));
        assert!(!registry.remove(&id));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn snapshot_is_detached_from_registry() {
        let mut registry = InstrumentRegistry::new();
        registry.add(enrolled("신한은행", InstrumentKind::BankAccount));

        let snapshot = registry.snapshot();
        registry.remove(&snapshot[0].id);
        // The engine's view is unaffected by later registry mutation
        assert_eq!(snapshot.len(), 1);
        assert!(registry.is_empty());
    }
}
