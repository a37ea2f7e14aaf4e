use super::state::MotorControls;

/// Handle returned by [`MovingHook::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&mut MotorControls<'_>)>;

/// Ordered subscribers fired once per step after grounding and before integration.
#[derive(Default)]
pub struct MovingHook {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Callback)>,
}

impl MovingHook {
    /// Appends `callback`. Subscribers run in subscription order.
    pub fn subscribe(
        &mut self,
        callback: impl FnMut(&mut MotorControls<'_>) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        log::debug!("moving hook subscriber {:?} added", id);
        id
    }

    /// Returns false when `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        let removed = self.subscribers.len() != before;
        if removed {
            log::debug!("moving hook subscriber {:?} removed", id);
        }
        removed
    }

    pub fn fire(&mut self, controls: &mut MotorControls<'_>) {
        for (_, callback) in &mut self.subscribers {
            callback(controls);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.subscribers.len()
    }
}

impl std::fmt::Debug for MovingHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MovingHook")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
