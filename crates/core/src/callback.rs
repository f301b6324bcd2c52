// Opened/closed notifications for hosts

use parking_lot::Mutex;
use std::sync::Arc;

/// Player notification types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaEvent {
    /// Media was opened; carries the URL reported by the player
    Opened(String),

    /// Media was closed
    Closed,
}

/// Host-side observer.
/// Implementations should be lightweight and non-blocking.
pub trait MediaObserver: Send + Sync {
    fn on_event(&self, event: &MediaEvent);
}

impl<F> MediaObserver for F
where
    F: Fn(&MediaEvent) + Send + Sync,
{
    fn on_event(&self, event: &MediaEvent) {
        self(event)
    }
}

/// Observer list for broadcasting player notifications
pub struct ObserverList {
    observers: Mutex<Vec<Arc<dyn MediaObserver>>>,
}

impl ObserverList {
    pub fn new() -> Self {
        Self {
            observers: Mutex::new(Vec::new()),
        }
    }

    pub fn subscribe(&self, observer: Arc<dyn MediaObserver>) {
        self.observers.lock().push(observer);
    }

    /// Remove a previously subscribed observer (matched by identity).
    pub fn unsubscribe(&self, observer: &Arc<dyn MediaObserver>) -> bool {
        let mut observers = self.observers.lock();
        let before = observers.len();
        observers.retain(|o| !Arc::ptr_eq(o, observer));
        observers.len() != before
    }

    pub fn clear(&self) {
        self.observers.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.observers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn broadcast(&self, event: MediaEvent) {
        // Snapshot so observers may subscribe/unsubscribe from inside on_event
        let observers = self.observers.lock().clone();
        log::debug!("Broadcasting {:?} to {} observer(s)", event, observers.len());
        for observer in observers.iter() {
            observer.on_event(&event);
        }
    }
}

impl Default for ObserverList {
    fn default() -> Self {
        Self::new()
    }
}

/// Recording observer for tests
#[cfg(test)]
pub struct TestObserver {
    events: Mutex<Vec<MediaEvent>>,
}

#[cfg(test)]
impl TestObserver {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn get_events(&self) -> Vec<MediaEvent> {
        self.events.lock().clone()
    }
}

#[cfg(test)]
impl MediaObserver for TestObserver {
    fn on_event(&self, event: &MediaEvent) {
        self.events.lock().push(event.clone());
    }
}
