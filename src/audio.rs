use std::io::Write;
use std::sync::{Arc, Mutex};

use crate::engine::Phase;
use crate::error::FeedbackError;
use crate::events::{SessionEvent, SessionObserver};

/// Sound cue requested by a session event
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Cue {
    Countdown,
    WorkStart,
    RestStart,
    StepStart,
    Complete,
}

/// Audio output capability injected into a session
pub trait AudioOutput: Send + Sync {
    /// Wake the output before a session starts
    fn resume(&self) -> Result<(), FeedbackError> {
        Ok(())
    }

    fn play(&self, cue: Cue) -> Result<(), FeedbackError>;
}

/// Rings the terminal bell; work and completion cues ring twice
pub struct TerminalBell<W: Write + Send> {
    out: Mutex<W>,
}

impl<W: Write + Send> TerminalBell<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl TerminalBell<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> AudioOutput for TerminalBell<W> {
    fn play(&self, cue: Cue) -> Result<(), FeedbackError> {
        let rings = match cue {
            Cue::WorkStart | Cue::Complete => 2,
            _ => 1,
        };
        let mut out = self
            .out
            .lock()
            .map_err(|_| FeedbackError::Unavailable("bell writer poisoned".into()))?;
        for _ in 0..rings {
            out.write_all(b"\x07")?;
        }
        out.flush()?;
        Ok(())
    }
}

/// Output that plays nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentOutput;

impl AudioOutput for SilentOutput {
    fn play(&self, _cue: Cue) -> Result<(), FeedbackError> {
        Ok(())
    }
}

/// Maps an engine event to the cue it should sound, if any
pub fn cue_for(event: &SessionEvent) -> Option<Cue> {
    match event {
        SessionEvent::CountdownWarning { .. } => Some(Cue::Countdown),
        SessionEvent::PhaseStarted { phase, .. } => match phase {
            Phase::Work => Some(Cue::WorkStart),
            Phase::Rest => Some(Cue::RestStart),
            Phase::Warmup | Phase::Cooldown => Some(Cue::StepStart),
            Phase::Prepare | Phase::Complete => None,
        },
        SessionEvent::PhaseLabel(_) => None,
        SessionEvent::Completed => Some(Cue::Complete),
    }
}

/// Observer that turns session events into sound
pub struct AudioCues {
    output: Arc<dyn AudioOutput>,
}

impl AudioCues {
    pub fn new(output: Arc<dyn AudioOutput>) -> Self {
        Self { output }
    }
}

impl SessionObserver for AudioCues {
    fn on_event(&mut self, event: &SessionEvent) -> Result<(), FeedbackError> {
        match cue_for(event) {
            Some(cue) => self.output.play(cue),
            None => Ok(()),
        }
    }
}
