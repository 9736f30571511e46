use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use tracing::debug;

use crate::config::Config;
use crate::error::PlanError;
use crate::plan::{MainStep, SessionPlan, TimedStep};

static CATALOG_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/catalog");

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Exercise {
    pub id: String,
    pub name: String,
}

/// One embedded list of exercises (warmup, main or cooldown)
#[derive(Deserialize, Clone, Debug)]
pub struct Catalog {
    pub name: String,
    pub exercises: Vec<Exercise>,
}

impl Catalog {
    pub fn load(name: &str) -> Result<Self, PlanError> {
        let file = CATALOG_DIR
            .get_file(format!("{name}.json"))
            .ok_or_else(|| PlanError::Catalog(name.to_string()))?;
        let contents = file
            .contents_utf8()
            .ok_or_else(|| PlanError::Catalog(name.to_string()))?;
        let catalog: Catalog =
            serde_json::from_str(contents).map_err(|_| PlanError::Catalog(name.to_string()))?;
        if catalog.exercises.is_empty() {
            return Err(PlanError::Catalog(name.to_string()));
        }
        Ok(catalog)
    }

    /// `count` exercises in random order, repeating the list once exhausted
    pub fn pick<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<Exercise> {
        let mut shuffled = self.exercises.clone();
        shuffled.shuffle(rng);
        shuffled.into_iter().cycle().take(count).collect()
    }
}

/// Configuration for workout generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkoutConfig {
    pub warmup_duration: u32,
    pub cooldown_duration: u32,
    pub work_seconds: u32,
    pub rest_seconds: u32,
    pub rounds: u32,
    pub warmup_exercises: u32,
    pub cooldown_exercises: u32,
}

impl From<&Config> for WorkoutConfig {
    fn from(cfg: &Config) -> Self {
        Self {
            warmup_duration: cfg.warmup_duration,
            cooldown_duration: cfg.cooldown_duration,
            work_seconds: cfg.work_seconds,
            rest_seconds: cfg.rest_seconds,
            rounds: cfg.rounds,
            warmup_exercises: cfg.warmup_exercises,
            cooldown_exercises: cfg.cooldown_exercises,
        }
    }
}

/// Split `total` seconds over `count` steps; earlier steps absorb the remainder
pub fn split_duration(total: u32, count: u32) -> Vec<u32> {
    if count == 0 {
        return Vec::new();
    }
    let base = total / count;
    let extra = total % count;
    (0..count).map(|i| base + u32::from(i < extra)).collect()
}

/// Builds a [`SessionPlan`] from the embedded catalog
pub struct WorkoutGenerator {
    config: WorkoutConfig,
}

impl WorkoutGenerator {
    pub fn new(config: WorkoutConfig) -> Self {
        Self { config }
    }

    pub fn generate(&self) -> Result<SessionPlan, PlanError> {
        self.generate_with(&mut rand::thread_rng())
    }

    pub fn generate_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<SessionPlan, PlanError> {
        let cfg = &self.config;

        let warmup = self.timed_steps("warmup", cfg.warmup_duration, cfg.warmup_exercises, rng)?;
        let cooldown =
            self.timed_steps("cooldown", cfg.cooldown_duration, cfg.cooldown_exercises, rng)?;

        let main_steps = Catalog::load("main")?
            .pick(cfg.rounds as usize, rng)
            .into_iter()
            .map(|ex| MainStep::new(ex.name, cfg.work_seconds, cfg.rest_seconds))
            .collect();

        let plan = SessionPlan::new(warmup, main_steps, cooldown)?;
        debug!(
            warmup = plan.warmup().len(),
            rounds = plan.main_steps().len(),
            cooldown = plan.cooldown().len(),
            total_seconds = plan.total_seconds(),
            "generated workout"
        );
        Ok(plan)
    }

    fn timed_steps<R: Rng + ?Sized>(
        &self,
        section: &str,
        total: u32,
        count: u32,
        rng: &mut R,
    ) -> Result<Vec<TimedStep>, PlanError> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let exercises = Catalog::load(section)?.pick(count as usize, rng);
        Ok(exercises
            .into_iter()
            .zip(split_duration(total, count))
            .map(|(ex, secs)| TimedStep::new(ex.id, ex.name, secs))
            .collect())
    }
}
