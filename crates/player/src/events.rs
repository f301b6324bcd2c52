// Native event tags queued for the frame thread

use parking_lot::Mutex;
use std::collections::VecDeque;
use vlcmedia_libvlc::ffi;

/// Coarse native event kinds the poller cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    EndReached,
    Playing,
    ParsedChanged,
    Other(ffi::libvlc_event_type_t),
}

impl EventKind {
    pub fn from_raw(event_type: ffi::libvlc_event_type_t) -> Self {
        match event_type {
            ffi::libvlc_MediaPlayerEndReached => EventKind::EndReached,
            ffi::libvlc_MediaPlayerPlaying => EventKind::Playing,
            ffi::libvlc_MediaParsedChanged => EventKind::ParsedChanged,
            other => EventKind::Other(other),
        }
    }
}

/// FIFO written by the native event thread and drained once per frame
pub struct EventQueue {
    events: Mutex<VecDeque<EventKind>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(VecDeque::new()),
        }
    }

    pub fn push(&self, event: EventKind) {
        self.events.lock().push_back(event);
    }

    pub fn pop(&self) -> Option<EventKind> {
        self.events.lock().pop_front()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_from_raw() {
        assert_eq!(
            EventKind::from_raw(ffi::libvlc_MediaPlayerEndReached),
            EventKind::EndReached
        );
        assert_eq!(
            EventKind::from_raw(ffi::libvlc_MediaParsedChanged),
            EventKind::ParsedChanged
        );
        assert_eq!(
            EventKind::from_raw(ffi::libvlc_MediaPlayerPaused),
            EventKind::Other(ffi::libvlc_MediaPlayerPaused)
        );
    }

    #[test]
    fn test_order_preserved_across_threads() {
        let queue = Arc::new(EventQueue::new());
        let producer = {
            let queue = queue.clone();
            thread::spawn(move || {
                for _ in 0..100 {
                    queue.push(EventKind::Playing);
                }
                queue.push(EventKind::EndReached);
            })
        };
        producer.join().unwrap();

        assert_eq!(queue.len(), 101);
        for _ in 0..100 {
            assert_eq!(queue.pop(), Some(EventKind::Playing));
        }
        assert_eq!(queue.pop(), Some(EventKind::EndReached));
        assert_eq!(queue.pop(), None);
    }
}
