use tracing::warn;

/// Observer subscription categories a player maintains against its engine.
///
/// Each category corresponds to one subscribe/unsubscribe pair on the
/// native side and is tracked independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObserverCategory {
    /// Engine-level observers (playback rate and friends)
    Handle,

    /// Per-source item observers (status, buffering, loaded ranges)
    Item,

    /// System notification observers (end of media, stalls, route changes)
    Notification,
}

const CATEGORIES: [ObserverCategory; 3] = [
    ObserverCategory::Handle,
    ObserverCategory::Item,
    ObserverCategory::Notification,
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum ObserverState {
    #[default]
    Unregistered,
    Registered,
}

/// Registration bookkeeping for every observer category of one player.
///
/// Each category moves `Unregistered -> Registered` on first use and back
/// only when the player is disposed. Registering twice without disposing
/// would leak a native subscription, so the second attempt is refused.
#[derive(Debug, Default)]
pub(crate) struct ObserverSet {
    handle: ObserverState,
    item: ObserverState,
    notification: ObserverState,
}

impl ObserverSet {
    fn slot(&mut self, category: ObserverCategory) -> &mut ObserverState {
        match category {
            ObserverCategory::Handle => &mut self.handle,
            ObserverCategory::Item => &mut self.item,
            ObserverCategory::Notification => &mut self.notification,
        }
    }

    /// Mark a category registered. Returns false and leaves the state
    /// untouched if it was already registered.
    pub(crate) fn register(&mut self, category: ObserverCategory) -> bool {
        let slot = self.slot(category);
        if *slot == ObserverState::Registered {
            warn!("Observer category {category:?} already registered, refusing re-registration");
            return false;
        }
        *slot = ObserverState::Registered;
        true
    }

    pub(crate) fn is_registered(&self, category: ObserverCategory) -> bool {
        let state = match category {
            ObserverCategory::Handle => self.handle,
            ObserverCategory::Item => self.item,
            ObserverCategory::Notification => self.notification,
        };
        state == ObserverState::Registered
    }

    /// Unregister every active category, returning the ones that were
    /// active. Safe when some or all were never registered.
    pub(crate) fn clear(&mut self) -> Vec<ObserverCategory> {
        let mut cleared = Vec::new();
        for category in CATEGORIES {
            let slot = self.slot(category);
            if *slot == ObserverState::Registered {
                *slot = ObserverState::Unregistered;
                cleared.push(category);
            }
        }
        cleared
    }

    pub(crate) fn any_registered(&self) -> bool {
        CATEGORIES.iter().any(|&c| self.is_registered(c))
    }
}
