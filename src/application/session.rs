use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

#[derive(Debug)]
pub struct Slot<D> {
    dialogue: Option<D>,
    touched: Instant,
}

/// Active dialogues keyed by session id.
///
/// Each session owns a slot behind its own async mutex: events for one session are
/// processed one at a time, while different sessions never contend. The store is
/// bounded. Dialogues idle for longer than `idle_timeout` are dropped when next
/// touched, and once the map grows past `capacity` unlocked slots are swept, idle
/// ones first, then the least recently touched.
pub struct SessionStore<D> {
    slots: DashMap<String, Arc<Mutex<Slot<D>>>>,
    idle_timeout: Duration,
    capacity: usize,
}

/// Exclusive access to one session's dialogue for the duration of an event.
pub struct SessionGuard<D> {
    slot: OwnedMutexGuard<Slot<D>>,
    now: Instant,
}

impl<D> SessionGuard<D> {
    pub fn dialogue(&self) -> Option<&D> {
        self.slot.dialogue.as_ref()
    }

    pub fn take(&mut self) -> Option<D> {
        self.slot.dialogue.take()
    }

    pub fn set(&mut self, dialogue: D) {
        self.slot.dialogue = Some(dialogue);
        self.slot.touched = self.now;
    }

    pub fn clear(&mut self) {
        self.slot.dialogue = None;
    }
}

impl<D> SessionStore<D> {
    pub fn new(idle_timeout: Duration, capacity: usize) -> Self {
        Self {
            slots: DashMap::new(),
            idle_timeout,
            capacity: capacity.max(1),
        }
    }

    pub async fn lock(&self, session_id: &str) -> SessionGuard<D> {
        self.lock_at(session_id, Instant::now()).await
    }

    pub async fn lock_at(&self, session_id: &str, now: Instant) -> SessionGuard<D> {
        if self.slots.len() > self.capacity {
            self.sweep(now);
        }

        loop {
            let slot = self
                .slots
                .entry(session_id.to_string())
                .or_insert_with(|| {
                    Arc::new(Mutex::new(Slot {
                        dialogue: None,
                        touched: now,
                    }))
                })
                .clone();
            let mut guard = slot.clone().lock_owned().await;

            // A sweep may have unlinked this slot while we waited for it.
            let still_linked = self
                .slots
                .get(session_id)
                .is_some_and(|current| Arc::ptr_eq(&current, &slot));
            if !still_linked {
                continue;
            }

            if guard.dialogue.is_some() && now.duration_since(guard.touched) > self.idle_timeout {
                debug!(session_id, "dropping expired dialogue");
                guard.dialogue = None;
            }
            guard.touched = now;
            return SessionGuard { slot: guard, now };
        }
    }

    /// Removes unlocked slots that hold no live dialogue, then trims the least
    /// recently touched ones while the store is still over capacity.
    pub fn sweep(&self, now: Instant) {
        self.slots.retain(|_, slot| match slot.try_lock() {
            Ok(slot) => {
                slot.dialogue.is_some() && now.duration_since(slot.touched) <= self.idle_timeout
            }
            Err(_) => true,
        });

        let excess = self.slots.len().saturating_sub(self.capacity);
        if excess == 0 {
            return;
        }
        let mut oldest: Vec<(Instant, String)> = self
            .slots
            .iter()
            .filter_map(|entry| {
                let touched = entry.value().try_lock().ok()?.touched;
                Some((touched, entry.key().clone()))
            })
            .collect();
        oldest.sort();
        for (_, key) in oldest.into_iter().take(excess) {
            debug!(session_id = %key, "evicting dialogue over capacity");
            self.slots.remove_if(&key, |_, slot| slot.try_lock().is_ok());
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
