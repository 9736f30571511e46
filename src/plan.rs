use crate::error::PlanError;

/// One warmup or cooldown exercise
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedStep {
    pub id: String,
    pub name: String,
    pub duration_seconds: u32,
}

impl TimedStep {
    pub fn new(id: impl Into<String>, name: impl Into<String>, duration_seconds: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            duration_seconds,
        }
    }
}

/// One work/rest pair of the main block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MainStep {
    pub name: String,
    pub work_duration_seconds: u32,
    pub rest_duration_seconds: u32,
}

impl MainStep {
    pub fn new(
        name: impl Into<String>,
        work_duration_seconds: u32,
        rest_duration_seconds: u32,
    ) -> Self {
        Self {
            name: name.into(),
            work_duration_seconds,
            rest_duration_seconds,
        }
    }
}

/// Ordered, immutable description of every step of one session.
///
/// Construction is the only place a plan is validated; once built, the
/// engine can rely on at least one main step and non-zero durations
/// everywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPlan {
    warmup: Vec<TimedStep>,
    main_steps: Vec<MainStep>,
    cooldown: Vec<TimedStep>,
}

impl SessionPlan {
    pub fn new(
        warmup: Vec<TimedStep>,
        main_steps: Vec<MainStep>,
        cooldown: Vec<TimedStep>,
    ) -> Result<Self, PlanError> {
        if main_steps.is_empty() {
            return Err(PlanError::NoMainSteps);
        }

        check_timed("warmup", &warmup)?;
        check_timed("cooldown", &cooldown)?;

        if let Some(index) = main_steps
            .iter()
            .position(|s| s.work_duration_seconds == 0 || s.rest_duration_seconds == 0)
        {
            return Err(PlanError::ZeroDuration {
                section: "main",
                index,
            });
        }

        Ok(Self {
            warmup,
            main_steps,
            cooldown,
        })
    }

    pub fn warmup(&self) -> &[TimedStep] {
        &self.warmup
    }

    pub fn main_steps(&self) -> &[MainStep] {
        &self.main_steps
    }

    pub fn cooldown(&self) -> &[TimedStep] {
        &self.cooldown
    }

    /// Sum of every step's duration, excluding the prepare countdowns
    pub fn total_seconds(&self) -> u32 {
        let timed = |steps: &[TimedStep]| steps.iter().map(|s| s.duration_seconds).sum::<u32>();
        timed(&self.warmup)
            + self
                .main_steps
                .iter()
                .map(|s| s.work_duration_seconds + s.rest_duration_seconds)
                .sum::<u32>()
            + timed(&self.cooldown)
    }
}

fn check_timed(section: &'static str, steps: &[TimedStep]) -> Result<(), PlanError> {
    match steps.iter().position(|s| s.duration_seconds == 0) {
        Some(index) => Err(PlanError::ZeroDuration { section, index }),
        None => Ok(()),
    }
}
