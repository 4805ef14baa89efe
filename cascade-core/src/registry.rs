// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Guarded callback registry.
//!
//! Every access to a stream's listener lists goes through [`Registry`], which
//! bundles the lock with the entries and only exposes append, snapshot and seal.
//! Callbacks are never invoked while the lock is held, so a listener may
//! register further listeners on the same stream.

use parking_lot::Mutex;

pub(crate) struct Registry<L> {
    state: Mutex<RegistryState<L>>,
}

struct RegistryState<L> {
    sealed: bool,
    entries: Vec<L>,
}

impl<L> Registry<L> {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(RegistryState {
                sealed: false,
                entries: Vec::new(),
            }),
        }
    }

    /// Appends `entry`, or hands it back if the registry has been sealed.
    pub(crate) fn append(&self, entry: L) -> Result<(), L> {
        let mut state = self.state.lock();
        if state.sealed {
            return Err(entry);
        }
        state.entries.push(entry);
        Ok(())
    }

    /// Refuses all further appends and returns the registered entries in order.
    ///
    /// Sealing twice returns an empty list the second time.
    pub(crate) fn seal(&self) -> Vec<L> {
        let mut state = self.state.lock();
        state.sealed = true;
        core::mem::take(&mut state.entries)
    }

    pub(crate) fn len(&self) -> usize {
        self.state.lock().entries.len()
    }
}

impl<L: Clone> Registry<L> {
    /// Copies the current entries out so they can be invoked without the lock.
    pub(crate) fn snapshot(&self) -> Vec<L> {
        self.state.lock().entries.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::Registry;

    #[test]
    fn snapshot_preserves_insertion_order() {
        let registry = Registry::new();
        for n in 1..=3 {
            assert!(registry.append(n).is_ok());
        }

        assert_eq!(registry.snapshot(), vec![1, 2, 3]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn seal_drains_and_rejects_later_appends() {
        let registry = Registry::new();
        assert!(registry.append("early").is_ok());

        assert_eq!(registry.seal(), vec!["early"]);
        assert_eq!(registry.append("late"), Err("late"));
        assert_eq!(registry.len(), 0);
        assert!(registry.seal().is_empty());
    }
}
