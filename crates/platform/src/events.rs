//! Queued window and input events.
//!
//! The windowing layer pushes events as they arrive; the frame loop drains
//! the queue exactly once per tick on the main thread. Nothing mutates engine
//! state from inside a callback.

use crate::input::KeyCode;

/// An event recorded by the windowing layer for the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformEvent {
    /// The framebuffer size changed. Dimensions may be zero while minimized.
    Resized { width: u32, height: u32 },
    /// The user asked to close the window.
    CloseRequested,
    /// A key went down.
    KeyPressed(KeyCode),
    /// A key went up.
    KeyReleased(KeyCode),
    /// The window lost keyboard focus.
    FocusLost,
}

/// FIFO queue of [`PlatformEvent`]s, drained once per tick.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<PlatformEvent>,
}

impl EventQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event.
    pub fn push(&mut self, event: PlatformEvent) {
        self.events.push(event);
    }

    /// Remove and return all queued events in arrival order.
    pub fn drain(&mut self) -> Vec<PlatformEvent> {
        std::mem::take(&mut self.events)
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_preserves_order() {
        let mut queue = EventQueue::new();
        queue.push(PlatformEvent::KeyPressed(KeyCode::KeyW));
        queue.push(PlatformEvent::Resized {
            width: 640,
            height: 480,
        });
        queue.push(PlatformEvent::KeyReleased(KeyCode::KeyW));

        let events = queue.drain();
        assert_eq!(
            events,
            vec![
                PlatformEvent::KeyPressed(KeyCode::KeyW),
                PlatformEvent::Resized {
                    width: 640,
                    height: 480
                },
                PlatformEvent::KeyReleased(KeyCode::KeyW),
            ]
        );
    }

    #[test]
    fn test_drain_empties_queue() {
        let mut queue = EventQueue::new();
        queue.push(PlatformEvent::CloseRequested);
        assert_eq!(queue.len(), 1);

        let _ = queue.drain();
        assert!(queue.is_empty());

        assert!(queue.drain().is_empty());
    }
}
