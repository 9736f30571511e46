//! Session phase state machine and countdown.
//!
//! [`advance`] is the single transition function; it is used both when a
//! countdown runs out and when the user skips, so the two paths can never
//! diverge. [`SessionEngine`] wraps it with run-state (active/paused) and
//! fans resulting events out to subscribed observers.

use std::fmt;

use tracing::{debug, info, warn};

use crate::events::{SessionEvent, SessionObserver};
use crate::plan::SessionPlan;

/// Length of the get-ready countdown before the main block
pub const PREPARE_SECONDS: u32 = 5;

/// Remaining values at which a tick emits a countdown warning
const WARNING_SECONDS: std::ops::RangeInclusive<u32> = 1..=3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum Phase {
    Prepare,
    Warmup,
    Work,
    Rest,
    Cooldown,
    Complete,
}

/// Where a session currently is: phase, step within it, and time left
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub phase: Phase,
    pub step_index: usize,
    pub remaining_seconds: u32,
}

impl Position {
    /// Starting position for a plan: the first warmup step, or prepare when
    /// there is no warmup
    pub fn initial(plan: &SessionPlan) -> Self {
        match plan.warmup().first() {
            Some(step) => Self {
                phase: Phase::Warmup,
                step_index: 0,
                remaining_seconds: step.duration_seconds,
            },
            None => prepare(),
        }
    }
}

fn prepare() -> Position {
    Position {
        phase: Phase::Prepare,
        step_index: 0,
        remaining_seconds: PREPARE_SECONDS,
    }
}

fn complete() -> Position {
    Position {
        phase: Phase::Complete,
        step_index: 0,
        remaining_seconds: 0,
    }
}

/// Full duration of the step at `phase`/`step_index`
pub fn duration_of(plan: &SessionPlan, phase: Phase, step_index: usize) -> u32 {
    match phase {
        Phase::Prepare => PREPARE_SECONDS,
        Phase::Warmup => plan.warmup()[step_index].duration_seconds,
        Phase::Work => plan.main_steps()[step_index].work_duration_seconds,
        Phase::Rest => plan.main_steps()[step_index].rest_duration_seconds,
        Phase::Cooldown => plan.cooldown()[step_index].duration_seconds,
        Phase::Complete => 0,
    }
}

/// Compute the position following `from`.
///
/// Total over every reachable position; `Complete` maps to itself.
pub fn advance(from: Position, plan: &SessionPlan) -> Position {
    let next = from.step_index + 1;
    match from.phase {
        Phase::Warmup if next < plan.warmup().len() => Position {
            phase: Phase::Warmup,
            step_index: next,
            remaining_seconds: plan.warmup()[next].duration_seconds,
        },
        Phase::Warmup => prepare(),
        Phase::Prepare => Position {
            phase: Phase::Work,
            step_index: 0,
            remaining_seconds: plan.main_steps()[0].work_duration_seconds,
        },
        Phase::Work => Position {
            phase: Phase::Rest,
            step_index: from.step_index,
            remaining_seconds: plan.main_steps()[from.step_index].rest_duration_seconds,
        },
        Phase::Rest if next < plan.main_steps().len() => Position {
            phase: Phase::Work,
            step_index: next,
            remaining_seconds: plan.main_steps()[next].work_duration_seconds,
        },
        Phase::Rest => match plan.cooldown().first() {
            Some(step) => Position {
                phase: Phase::Cooldown,
                step_index: 0,
                remaining_seconds: step.duration_seconds,
            },
            None => complete(),
        },
        Phase::Cooldown if next < plan.cooldown().len() => Position {
            phase: Phase::Cooldown,
            step_index: next,
            remaining_seconds: plan.cooldown()[next].duration_seconds,
        },
        Phase::Cooldown | Phase::Complete => complete(),
    }
}

/// Display label for a position
pub fn label_for(position: Position, plan: &SessionPlan) -> String {
    match position.phase {
        Phase::Prepare => "Get Ready".to_string(),
        Phase::Warmup => format!("Warmup: {}", plan.warmup()[position.step_index].name),
        Phase::Work => plan.main_steps()[position.step_index].name.clone(),
        Phase::Rest => "Rest".to_string(),
        Phase::Cooldown => format!("Cooldown: {}", plan.cooldown()[position.step_index].name),
        Phase::Complete => "Workout Complete".to_string(),
    }
}

/// Events describing the entry into `to`
fn entry_events(to: Position, plan: &SessionPlan) -> Vec<SessionEvent> {
    if to.phase == Phase::Complete {
        return vec![SessionEvent::Completed];
    }

    let mut events = vec![SessionEvent::PhaseStarted {
        phase: to.phase,
        step_index: to.step_index,
        duration_seconds: duration_of(plan, to.phase, to.step_index),
    }];
    if matches!(to.phase, Phase::Warmup | Phase::Work | Phase::Cooldown) {
        events.push(SessionEvent::PhaseLabel(label_for(to, plan)));
    }
    events
}

/// Point-in-time projection of the engine for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub phase: Phase,
    pub step_index: usize,
    pub remaining_seconds: u32,
    pub label: String,
    /// Fraction of the current list (main block, warmup or cooldown) already done
    pub progress: f64,
    pub is_active: bool,
    pub is_paused: bool,
}

pub struct SessionEngine {
    plan: SessionPlan,
    position: Position,
    is_active: bool,
    is_paused: bool,
    /// Set by the first `start`; steps entered before it are announced on start
    started: bool,
    /// Whether the current step's entry events have gone out
    announced: bool,
    observers: Vec<Box<dyn SessionObserver>>,
}

impl fmt::Debug for SessionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionEngine")
            .field("position", &self.position)
            .field("is_active", &self.is_active)
            .field("is_paused", &self.is_paused)
            .field("started", &self.started)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl SessionEngine {
    pub fn new(plan: SessionPlan) -> Self {
        let position = Position::initial(&plan);
        Self {
            plan,
            position,
            is_active: false,
            is_paused: false,
            started: false,
            announced: false,
            observers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, observer: Box<dyn SessionObserver>) {
        self.observers.push(observer);
    }

    pub fn plan(&self) -> &SessionPlan {
        &self.plan
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn phase(&self) -> Phase {
        self.position.phase
    }

    pub fn step_index(&self) -> usize {
        self.position.step_index
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.position.remaining_seconds
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    pub fn is_complete(&self) -> bool {
        self.position.phase == Phase::Complete
    }

    /// Whether `start` has ever taken effect
    pub fn has_started(&self) -> bool {
        self.started
    }

    /// Whether the countdown should currently be driven
    pub fn is_running(&self) -> bool {
        self.is_active && !self.is_paused
    }

    pub fn start(&mut self) {
        if self.is_active || self.is_complete() {
            return;
        }
        self.is_active = true;
        self.started = true;
        info!(phase = %self.position.phase, step = self.position.step_index, "session started");

        // Resuming after stop continues a step that was already announced
        if !self.announced {
            self.announce();
        }
    }

    pub fn pause(&mut self) {
        if self.is_active && !self.is_paused {
            self.is_paused = true;
            debug!(remaining = self.position.remaining_seconds, "paused");
        }
    }

    pub fn resume(&mut self) {
        if self.is_paused {
            self.is_paused = false;
            debug!(remaining = self.position.remaining_seconds, "resumed");
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.is_paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Jump to the next step, discarding the time left in this one
    pub fn skip(&mut self) {
        if self.is_complete() {
            return;
        }
        debug!(phase = %self.position.phase, remaining = self.position.remaining_seconds, "skip");
        self.advance();
    }

    /// Halt the countdown in place. A later `start` continues from here.
    pub fn stop(&mut self) {
        self.is_active = false;
        self.is_paused = false;
        info!(phase = %self.position.phase, step = self.position.step_index, "session stopped");
    }

    /// One elapsed time unit
    pub fn tick(&mut self) {
        if !self.is_running() {
            return;
        }

        let remaining = self.position.remaining_seconds;
        if WARNING_SECONDS.contains(&remaining) {
            self.emit(&SessionEvent::CountdownWarning {
                remaining_seconds: remaining,
            });
        }

        if remaining <= 1 {
            self.advance();
        } else {
            self.position.remaining_seconds = remaining - 1;
        }
    }

    fn advance(&mut self) {
        let from = self.position;
        let to = advance(from, &self.plan);
        self.position = to;
        debug!(from = %from.phase, to = %to.phase, step = to.step_index, remaining = to.remaining_seconds, "transition");

        if to.phase == Phase::Complete {
            self.is_active = false;
            self.is_paused = false;
            info!("session complete");
        }

        if self.started || to.phase == Phase::Complete {
            self.announce();
        } else {
            self.announced = false;
        }
    }

    fn announce(&mut self) {
        for event in entry_events(self.position, &self.plan) {
            self.emit(&event);
        }
        self.announced = true;
    }

    fn emit(&mut self, event: &SessionEvent) {
        for observer in &mut self.observers {
            if let Err(err) = observer.on_event(event) {
                warn!(?event, error = %err, "feedback hook failed");
            }
        }
    }

    pub fn label(&self) -> String {
        label_for(self.position, &self.plan)
    }

    /// Label of the step that follows the current one, if any
    pub fn next_label(&self) -> Option<String> {
        let next = advance(self.position, &self.plan);
        (next.phase != Phase::Complete).then(|| label_for(next, &self.plan))
    }

    pub fn progress(&self) -> f64 {
        let len = match self.position.phase {
            Phase::Prepare => return 0.0,
            Phase::Complete => return 1.0,
            Phase::Warmup => self.plan.warmup().len(),
            Phase::Work | Phase::Rest => self.plan.main_steps().len(),
            Phase::Cooldown => self.plan.cooldown().len(),
        };
        self.position.step_index as f64 / len as f64
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.position.phase,
            step_index: self.position.step_index,
            remaining_seconds: self.position.remaining_seconds,
            label: self.label(),
            progress: self.progress(),
            is_active: self.is_active,
            is_paused: self.is_paused,
        }
    }
}
