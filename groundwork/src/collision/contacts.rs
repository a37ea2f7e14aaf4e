use super::{capsule::Capsule, types::ContactSample};

/// Contacts gathered from the host's collision callbacks, keyed by step.
///
/// Callbacks arrive after the solver of step N and are consumed by step N+1.
/// The first record for a new step drops everything from the step before.
#[derive(Clone, Debug, Default)]
pub struct ContactBuffer {
    contacts: Vec<ContactSample>,
    capsule: Option<Capsule>,
    step: u64,
}

impl ContactBuffer {
    /// Drops contacts recorded under any other step.
    pub fn clear_stale(&mut self, step: u64) {
        if self.step != step {
            self.contacts.clear();
            self.step = step;
        }
    }

    /// Buffers contacts for `step` with the character capsule as it was when they were reported.
    pub fn record(
        &mut self,
        step: u64,
        capsule: Option<Capsule>,
        samples: impl IntoIterator<Item = ContactSample>,
    ) {
        self.clear_stale(step);
        if capsule.is_some() {
            self.capsule = capsule;
        }
        self.contacts.extend(samples);
    }

    #[inline]
    pub fn contacts(&self) -> &[ContactSample] {
        &self.contacts
    }

    #[inline]
    pub fn capsule(&self) -> Option<Capsule> {
        self.capsule
    }

    /// Empties the contact list, keeping the step key.
    pub fn clear_contacts(&mut self) {
        self.contacts.clear();
    }

    pub fn clear_capsule(&mut self) {
        self.capsule = None;
    }
}
