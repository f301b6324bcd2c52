// Per-frame tick registry driven by the host's update loop

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Handle returned when registering a tick callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TickerHandle(u64);

/// Tick callback. Receives the elapsed frame time in seconds and returns
/// `false` to be removed after this tick.
pub type TickFn = Box<dyn FnMut(f32) -> bool + Send>;

struct Registry {
    next_id: u64,
    entries: BTreeMap<TickerHandle, TickFn>,
}

/// Thread-safe tick registry.
///
/// Callbacks run in registration order on whichever thread calls
/// [`Ticker::tick`]. Registering or removing from inside a callback is not
/// supported.
#[derive(Clone)]
pub struct Ticker {
    inner: Arc<Mutex<Registry>>,
}

impl Ticker {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Registry {
                next_id: 1,
                entries: BTreeMap::new(),
            })),
        }
    }

    pub fn add<F>(&self, callback: F) -> TickerHandle
    where
        F: FnMut(f32) -> bool + Send + 'static,
    {
        let mut registry = self.inner.lock();
        let handle = TickerHandle(registry.next_id);
        registry.next_id += 1;
        registry.entries.insert(handle, Box::new(callback));
        log::debug!("Registered ticker {:?}", handle);
        handle
    }

    pub fn remove(&self, handle: TickerHandle) -> bool {
        let removed = self.inner.lock().entries.remove(&handle).is_some();
        if removed {
            log::debug!("Removed ticker {:?}", handle);
        }
        removed
    }

    pub fn contains(&self, handle: TickerHandle) -> bool {
        self.inner.lock().entries.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run every registered callback once.
    pub fn tick(&self, delta_seconds: f32) {
        let mut registry = self.inner.lock();
        registry
            .entries
            .retain(|_, callback| callback(delta_seconds));
    }
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_runs_registered_callbacks() {
        let ticker = Ticker::new();
        let total = Arc::new(Mutex::new(0.0f32));
        let sink = total.clone();
        let handle = ticker.add(move |dt| {
            *sink.lock() += dt;
            true
        });

        ticker.tick(0.5);
        ticker.tick(0.25);
        assert!((*total.lock() - 0.75).abs() < f32::EPSILON);

        assert!(ticker.remove(handle));
        ticker.tick(1.0);
        assert!((*total.lock() - 0.75).abs() < f32::EPSILON);
        assert!(ticker.is_empty());
    }

    #[test]
    fn test_callback_returning_false_is_removed() {
        let ticker = Ticker::new();
        let calls = Arc::new(Mutex::new(0));
        let counter = calls.clone();
        let handle = ticker.add(move |_| {
            *counter.lock() += 1;
            false
        });

        ticker.tick(0.016);
        ticker.tick(0.016);
        assert_eq!(*calls.lock(), 1);
        assert!(!ticker.contains(handle));
    }

    #[test]
    fn test_handles_are_unique() {
        let ticker = Ticker::new();
        let a = ticker.add(|_| true);
        let b = ticker.add(|_| true);
        assert_ne!(a, b);
        assert_eq!(ticker.len(), 2);
    }
}
