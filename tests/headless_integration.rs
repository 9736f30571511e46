use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use puls::audio::{AudioOutput, Cue};
use puls::engine::{Phase, SessionEngine};
use puls::error::FeedbackError;
use puls::events::{EventLog, SessionEvent};
use puls::plan::{MainStep, SessionPlan, TimedStep};
use puls::runtime::{AppEvent, AppEventSource, FixedTicker, SessionDriver, TestEventSource};

#[derive(Default)]
struct RecordingAudio {
    resumed: Mutex<u32>,
    cues: Mutex<Vec<Cue>>,
}

impl AudioOutput for RecordingAudio {
    fn resume(&self) -> Result<(), FeedbackError> {
        *self.resumed.lock().unwrap() += 1;
        Ok(())
    }

    fn play(&self, cue: Cue) -> Result<(), FeedbackError> {
        self.cues.lock().unwrap().push(cue);
        Ok(())
    }
}

struct BrokenAudio;

impl AudioOutput for BrokenAudio {
    fn resume(&self) -> Result<(), FeedbackError> {
        Err(FeedbackError::Unavailable("no device".into()))
    }

    fn play(&self, _cue: Cue) -> Result<(), FeedbackError> {
        Err(FeedbackError::Unavailable("no device".into()))
    }
}

fn short_plan() -> SessionPlan {
    SessionPlan::new(
        vec![TimedStep::new("jacks", "Jumping Jacks", 2)],
        vec![MainStep::new("Burpees", 2, 1), MainStep::new("Squats", 1, 1)],
        vec![TimedStep::new("stretch", "Hamstring Stretch", 1)],
    )
    .unwrap()
}

/// Pump events from the source into the driver until the session finishes
fn run<E: AppEventSource>(driver: &mut SessionDriver<FixedTicker>, events: &E, max_steps: u32) {
    for _ in 0..max_steps {
        match events.recv_timeout(Duration::from_millis(500)) {
            Ok(event) => {
                driver.handle(&event);
                if driver.is_finished() {
                    return;
                }
            }
            Err(_) => return,
        }
    }
}

// Headless integration using real timer threads and a TestEventSource.
// Verifies a whole plan runs to completion purely from timer ticks.
#[test]
fn headless_session_runs_to_completion() {
    let (tx, rx) = mpsc::channel();
    let events = TestEventSource::new(rx);
    let audio = Arc::new(RecordingAudio::default());

    let mut driver = SessionDriver::new(
        SessionEngine::new(short_plan()),
        FixedTicker::new(Duration::from_millis(2)),
        tx,
        audio.clone(),
    );
    let log = EventLog::new();
    driver.engine_mut().subscribe(Box::new(log.clone()));

    driver.start();
    assert_eq!(*audio.resumed.lock().unwrap(), 1);
    run(&mut driver, &events, 1_000);

    assert!(driver.is_finished(), "session should finish from ticks alone");
    assert_eq!(driver.engine().phase(), Phase::Complete);
    assert!(!driver.engine().is_active());
    assert!(!driver.is_timer_armed());

    let phases: Vec<Phase> = log
        .events()
        .iter()
        .filter_map(|e| match e {
            SessionEvent::PhaseStarted { phase, .. } => Some(*phase),
            _ => None,
        })
        .collect();
    assert_eq!(
        phases,
        vec![
            Phase::Warmup,
            Phase::Prepare,
            Phase::Work,
            Phase::Rest,
            Phase::Work,
            Phase::Rest,
            Phase::Cooldown,
        ]
    );

    let completions = log
        .events()
        .iter()
        .filter(|e| **e == SessionEvent::Completed)
        .count();
    assert_eq!(completions, 1);

    let cues = audio.cues.lock().unwrap();
    assert_eq!(cues.first(), Some(&Cue::StepStart));
    assert_eq!(cues.last(), Some(&Cue::Complete));
    assert!(cues.contains(&Cue::Countdown));
    assert_eq!(cues.iter().filter(|c| **c == Cue::WorkStart).count(), 2);
}

#[test]
fn headless_broken_audio_does_not_stop_session() {
    let (tx, rx) = mpsc::channel();
    let events = TestEventSource::new(rx);

    let mut driver = SessionDriver::new(
        SessionEngine::new(short_plan()),
        FixedTicker::new(Duration::from_millis(2)),
        tx,
        Arc::new(BrokenAudio),
    );

    driver.start();
    assert!(driver.engine().is_active());
    run(&mut driver, &events, 1_000);

    assert!(driver.is_finished());
}

#[test]
fn headless_pause_freezes_countdown() {
    let (tx, rx) = mpsc::channel();
    let events = TestEventSource::new(rx);

    let mut driver = SessionDriver::new(
        SessionEngine::new(short_plan()),
        FixedTicker::new(Duration::from_millis(5)),
        tx,
        Arc::new(RecordingAudio::default()),
    );

    driver.start();
    driver.toggle_pause();
    let frozen = driver.engine().position();

    // Anything still in flight from the released timer must be ignored
    let deadline = std::time::Instant::now() + Duration::from_millis(50);
    while std::time::Instant::now() < deadline {
        if let Ok(event) = events.recv_timeout(Duration::from_millis(5)) {
            assert!(!driver.handle(&event));
        }
    }
    assert_eq!(driver.engine().position(), frozen);

    driver.toggle_pause();
    match events.recv_timeout(Duration::from_secs(1)) {
        Ok(event @ AppEvent::Tick(_)) => assert!(driver.handle(&event)),
        other => panic!("expected a tick after resume, got {other:?}"),
    }
    assert_eq!(
        driver.engine().remaining_seconds(),
        frozen.remaining_seconds - 1
    );
}

#[test]
fn headless_stop_then_start_continues_in_place() {
    let (tx, _rx) = mpsc::channel();

    let mut driver = SessionDriver::new(
        SessionEngine::new(short_plan()),
        FixedTicker::new(Duration::from_millis(1000)),
        tx,
        Arc::new(RecordingAudio::default()),
    );

    driver.start();
    driver.skip();
    driver.skip();
    let before = driver.engine().position();
    assert_eq!(before.phase, Phase::Work);

    driver.stop();
    assert!(!driver.is_timer_armed());
    driver.start();
    assert!(driver.is_timer_armed());
    assert_eq!(driver.engine().position(), before);
}
