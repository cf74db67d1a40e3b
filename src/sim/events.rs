//! Events emitted while a round runs
//!
//! Everything is synchronous: events are produced inside one frame and
//! handed to the subscribed handlers in order before the frame returns.

use super::particle::{Hsb, ParticleId};

/// Static obstacle hit by the ball
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Obstacle {
    /// Index into the layout's pegs
    Peg(usize),
    /// Index into the layout's boundaries
    Boundary(usize),
}

/// The ball touched a peg or wall; the obstacle now carries the ball's colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionEvent {
    pub particle: ParticleId,
    pub other: Obstacle,
    pub color: Hsb,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlinkoEvent {
    /// New left-to-right zone titles
    ZonesAssigned(Vec<String>),
    /// Countdown label to display
    Countdown(&'static str),
    /// A pending countdown was skipped by user input
    CountdownCancelled,
    Dropped { particle: ParticleId, x: f32 },
    Collision(CollisionEvent),
    /// Zone under the ball changed while it is below the scoring line
    SelectionChanged(String),
    /// The ball came to rest; final selection of the round
    Resolved(String),
    /// The ball left the board without resolving
    BallLost(ParticleId),
    /// Round cleared; the randomize control is available again
    Reset,
}

impl PlinkoEvent {
    /// Text for the page's result element, if this event changes it
    pub fn result_text(&self) -> Option<String> {
        match self {
            PlinkoEvent::SelectionChanged(title) | PlinkoEvent::Resolved(title) => {
                Some(format!("Selected Game: {}", title))
            }
            PlinkoEvent::Reset => Some(String::new()),
            _ => None,
        }
    }
}

type Handler = Box<dyn FnMut(&PlinkoEvent)>;

/// Ordered list of subscribers
#[derive(Default)]
pub struct EventHandlers {
    handlers: Vec<Handler>,
}

impl EventHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, handler: impl FnMut(&PlinkoEvent) + 'static) {
        self.handlers.push(Box::new(handler));
    }

    /// Deliver events to every handler, in subscription order
    pub fn dispatch(&mut self, events: &[PlinkoEvent]) {
        for event in events {
            for handler in self.handlers.iter_mut() {
                handler(event);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_dispatch_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut handlers = EventHandlers::new();
        for name in ["first", "second"] {
            let seen = seen.clone();
            handlers.subscribe(move |event| {
                if let PlinkoEvent::Countdown(label) = event {
                    seen.borrow_mut().push(format!("{}:{}", name, label));
                }
            });
        }
        handlers.dispatch(&[PlinkoEvent::Countdown("3"), PlinkoEvent::Countdown("2")]);
        assert_eq!(
            *seen.borrow(),
            vec!["first:3", "second:3", "first:2", "second:2"]
        );
    }

    #[test]
    fn test_result_text() {
        assert_eq!(
            PlinkoEvent::Resolved("Tetris".into()).result_text(),
            Some("Selected Game: Tetris".to_string())
        );
        assert_eq!(PlinkoEvent::Reset.result_text(), Some(String::new()));
        assert_eq!(PlinkoEvent::CountdownCancelled.result_text(), None);
    }
}
