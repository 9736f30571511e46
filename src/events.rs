use crate::engine::Phase;
use crate::error::FeedbackError;

/// Point events emitted by the session engine for feedback collaborators
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Fired on each of the last three ticks of a phase
    CountdownWarning { remaining_seconds: u32 },
    /// A new non-terminal phase (or step within one) began
    PhaseStarted {
        phase: Phase,
        step_index: usize,
        duration_seconds: u32,
    },
    /// Human readable name of the step that just started
    PhaseLabel(String),
    /// The session reached its terminal state
    Completed,
}

/// Subscriber to engine events.
///
/// Returning an error only gets the failure logged; the engine keeps going.
pub trait SessionObserver {
    fn on_event(&mut self, event: &SessionEvent) -> Result<(), FeedbackError>;
}

/// Observer that keeps every event it sees, in order
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    events: std::rc::Rc<std::cell::RefCell<Vec<SessionEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the events received so far
    pub fn events(&self) -> Vec<SessionEvent> {
        self.events.borrow().clone()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl SessionObserver for EventLog {
    fn on_event(&mut self, event: &SessionEvent) -> Result<(), FeedbackError> {
        self.events.borrow_mut().push(event.clone());
        Ok(())
    }
}
