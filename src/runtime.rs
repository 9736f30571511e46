use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};
use tracing::{debug, info, warn};

use crate::audio::{AudioCues, AudioOutput};
use crate::engine::{advance, Phase, SessionEngine, Snapshot};

/// Time units the completed state stays on screen before the session finishes
pub const COMPLETION_DELAY_TICKS: u32 = 2;

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    /// One countdown tick from the timer armed with this generation
    Tick(u64),
    /// Completion display delay elapsed for the session with this generation
    SessionFinished(u64),
}

/// Source of app events (keyboard, resize, timers)
pub trait AppEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    tx: Sender<AppEvent>,
    rx: Receiver<AppEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let input_tx = tx.clone();

        thread::spawn(move || loop {
            match event::read() {
                Ok(CtEvent::Key(key)) => {
                    if input_tx.send(AppEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(CtEvent::Resize(_, _)) => {
                    if input_tx.send(AppEvent::Resize).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(_) => break,
            }
        });

        Self { tx, rx }
    }

    /// Sender for timers feeding the same queue as terminal input
    pub fn sender(&self) -> Sender<AppEvent> {
        self.tx.clone()
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AppEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<AppEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<AppEvent>) -> Self {
        Self { rx }
    }
}

impl AppEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    /// Wall-clock length of one time unit
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// One tick per second
    pub fn seconds() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Owned handle to a background timer. Dropping it cancels the timer.
#[derive(Debug)]
pub struct TimerHandle {
    generation: u64,
    cancelled: Arc<AtomicBool>,
}

impl TimerHandle {
    /// Send `Tick(generation)` every `interval` until dropped
    pub fn repeating(interval: Duration, generation: u64, tx: Sender<AppEvent>) -> Self {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);

        thread::spawn(move || loop {
            thread::sleep(interval);
            if flag.load(Ordering::SeqCst) || tx.send(AppEvent::Tick(generation)).is_err() {
                break;
            }
        });

        Self {
            generation,
            cancelled,
        }
    }

    /// Send `event` once after `delay` unless dropped first
    pub fn once(delay: Duration, generation: u64, event: AppEvent, tx: Sender<AppEvent>) -> Self {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);

        thread::spawn(move || {
            thread::sleep(delay);
            if !flag.load(Ordering::SeqCst) {
                let _ = tx.send(event);
            }
        });

        Self {
            generation,
            cancelled,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

/// Drives a [`SessionEngine`] from wall-clock timers.
///
/// Holds at most one repeating timer, armed exactly while the engine is
/// active and unpaused. Ticks carrying a stale generation (sent by a timer
/// that has since been dropped) are ignored.
pub struct SessionDriver<T: Ticker> {
    engine: SessionEngine,
    ticker: T,
    tx: Sender<AppEvent>,
    audio: Arc<dyn AudioOutput>,
    timer: Option<TimerHandle>,
    finish_timer: Option<TimerHandle>,
    generation: u64,
    finished: bool,
}

impl<T: Ticker> SessionDriver<T> {
    pub fn new(
        mut engine: SessionEngine,
        ticker: T,
        tx: Sender<AppEvent>,
        audio: Arc<dyn AudioOutput>,
    ) -> Self {
        engine.subscribe(Box::new(AudioCues::new(Arc::clone(&audio))));
        Self {
            engine,
            ticker,
            tx,
            audio,
            timer: None,
            finish_timer: None,
            generation: 0,
            finished: false,
        }
    }

    pub fn engine(&self) -> &SessionEngine {
        &self.engine
    }

    /// Mutable access for subscribing further observers
    pub fn engine_mut(&mut self) -> &mut SessionEngine {
        &mut self.engine
    }

    pub fn snapshot(&self) -> Snapshot {
        self.engine.snapshot()
    }

    pub fn is_timer_armed(&self) -> bool {
        self.timer.is_some()
    }

    /// Whether the completion display delay has elapsed
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn start(&mut self) {
        if self.engine.is_complete() || self.engine.is_active() {
            return;
        }
        self.resume_audio();
        self.engine.start();
        self.sync_timer();
    }

    pub fn toggle_pause(&mut self) {
        self.engine.toggle_pause();
        self.sync_timer();
    }

    pub fn skip(&mut self) {
        // Skipping an unstarted session to its end still plays the completion cue
        let next = advance(self.engine.position(), self.engine.plan());
        if next.phase == Phase::Complete && !self.engine.has_started() && !self.engine.is_complete() {
            self.resume_audio();
        }
        self.engine.skip();
        self.sync_timer();
    }

    pub fn stop(&mut self) {
        self.engine.stop();
        self.sync_timer();
    }

    /// Feed one app event to the driver. Returns true if it changed session state.
    pub fn handle(&mut self, event: &AppEvent) -> bool {
        match event {
            AppEvent::Tick(generation) => {
                if self.timer.as_ref().map(TimerHandle::generation) != Some(*generation) {
                    debug!(generation, "dropping stale tick");
                    return false;
                }
                self.engine.tick();
                self.sync_timer();
                true
            }
            AppEvent::SessionFinished(generation) => {
                if self.finish_timer.as_ref().map(TimerHandle::generation) != Some(*generation) {
                    return false;
                }
                self.finish_timer = None;
                self.finished = true;
                info!("session finished");
                true
            }
            AppEvent::Key(_) | AppEvent::Resize => false,
        }
    }

    fn resume_audio(&self) {
        if let Err(err) = self.audio.resume() {
            warn!(error = %err, "audio output unavailable, continuing without it");
        }
    }

    fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Arm or release the countdown timer to match the engine's run-state,
    /// and schedule the finish callback once the session completes.
    fn sync_timer(&mut self) {
        match (self.engine.is_running(), self.timer.is_some()) {
            (true, false) => {
                let generation = self.next_generation();
                debug!(generation, "arming countdown timer");
                self.timer = Some(TimerHandle::repeating(
                    self.ticker.interval(),
                    generation,
                    self.tx.clone(),
                ));
            }
            (false, true) => {
                debug!("releasing countdown timer");
                self.timer = None;
            }
            _ => {}
        }

        if self.engine.is_complete() && self.finish_timer.is_none() && !self.finished {
            let generation = self.next_generation();
            self.finish_timer = Some(TimerHandle::once(
                self.ticker.interval() * COMPLETION_DELAY_TICKS,
                generation,
                AppEvent::SessionFinished(generation),
                self.tx.clone(),
            ));
        }
    }
}
