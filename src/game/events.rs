//! # Event Module
//!
//! Tagged notifications carried from the simulation to the presentation
//! collaborator on an ordered, drainable FIFO queue.
//!
//! The producer (simulation) and consumer (presentation) are decoupled:
//! the queue is unbounded, pushes never block, and the consumer drains it
//! to empty once per frame before any new production.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Category tag for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// Diagnostic chatter
    Debug,
    /// The simulation wants the process to end
    Quit,
    /// Uncategorized
    Default,
    /// A change of simulation lifecycle state (e.g. game over)
    State,
    /// A gameplay occurrence (combat, pickups, floor changes)
    Game,
    /// A transient presentation effect hint
    Effect,
    /// Flow-control notifications (e.g. a failed action)
    Control,
}

/// A single notification for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    /// Stable machine-readable name (e.g. `game_over`, `action_failed`)
    pub name: String,
    /// Human-readable description for the message log
    pub description: String,
}

impl Event {
    /// Creates an event.
    pub fn new(kind: EventKind, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Unbounded FIFO event queue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventQueue {
    events: VecDeque<Event>,
}

impl EventQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event. Never blocks, never drops.
    pub fn push(&mut self, event: Event) {
        self.events.push_back(event);
    }

    /// Removes and returns every pending event in arrival order.
    pub fn drain(&mut self) -> Vec<Event> {
        self.events.drain(..).collect()
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no events are pending.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Peeks at pending events without consuming them.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order_preserved() {
        let mut queue = EventQueue::new();
        queue.push(Event::new(EventKind::Game, "first", ""));
        queue.push(Event::new(EventKind::Game, "second", ""));
        queue.push(Event::new(EventKind::State, "third", ""));

        let drained = queue.drain();
        let names: Vec<_> = drained.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_drain_empties_queue() {
        let mut queue = EventQueue::new();
        queue.push(Event::new(EventKind::Debug, "noise", ""));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.drain().len(), 1);
        assert!(queue.is_empty());
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_production_after_drain() {
        let mut queue = EventQueue::new();
        queue.push(Event::new(EventKind::Game, "a", ""));
        queue.drain();
        queue.push(Event::new(EventKind::Game, "b", ""));
        let drained = queue.drain();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].name, "b");
    }
}
