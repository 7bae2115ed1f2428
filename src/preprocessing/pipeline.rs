use crate::buffer::PixelBuffer;
use crate::config::EnhancementConfig;
use crate::error::OcrError;
use serde::Serialize;
use std::borrow::Cow;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;

use super::steps::{self, StepFn, StepResult};

/// Names of the enhancement chain, in execution order.
pub const STEP_NAMES: [&str; 6] = [
    "upscale", "contrast", "denoise", "sharpen", "binarize", "deskew",
];

/// Timing information for a single enhancement step
#[derive(Debug, Clone, Serialize)]
pub struct StepTiming {
    pub name: String,
    pub time_ms: u64,
    /// The step failed and its input was passed on unchanged
    pub degraded: bool,
}

/// Result of enhancement including timing stats
#[derive(Debug, Clone, Serialize)]
pub struct PreprocessingResult {
    /// Enhanced page (not serialized)
    #[serde(skip)]
    pub buffer: PixelBuffer,
    /// Total enhancement time in milliseconds
    pub total_time_ms: u64,
    /// Individual step timings
    pub steps: Vec<StepTiming>,
}

impl PreprocessingResult {
    /// Names of the steps that fell back to their input.
    pub fn degraded_steps(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter(|s| s.degraded)
            .map(|s| s.name.as_str())
            .collect()
    }
}

struct Stage {
    name: &'static str,
    apply: Box<StepFn>,
}

/// Fixed, ordered enhancement chain applied to every rasterized page.
///
/// A failing (or panicking) step never fails the page: its input buffer is
/// kept and the next step runs on it.
pub struct Pipeline {
    config: EnhancementConfig,
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new(config: EnhancementConfig) -> Self {
        let stages = vec![
            stage("upscale", steps::resize::apply),
            stage("contrast", steps::contrast::apply),
            stage("denoise", steps::denoise::apply),
            stage("sharpen", steps::sharpen::apply),
            stage("binarize", steps::threshold::apply),
            stage("deskew", steps::deskew::apply),
        ];
        Self { config, stages }
    }

    /// Swap the implementation of a named step, keeping its position in the chain.
    pub fn replace_step<F>(mut self, name: &str, step: F) -> Result<Self, OcrError>
    where
        F: for<'a> Fn(&'a PixelBuffer, &EnhancementConfig) -> StepResult<'a>
            + Send
            + Sync
            + 'static,
    {
        let stage = self
            .stages
            .iter_mut()
            .find(|s| s.name == name)
            .ok_or_else(|| OcrError::Configuration(format!("Unknown enhancement step: {}", name)))?;
        stage.apply = Box::new(step);
        Ok(self)
    }

    /// Run every step over the page in order.
    pub fn process(&self, buffer: PixelBuffer) -> PreprocessingResult {
        let start = Instant::now();
        let mut timings = Vec::with_capacity(self.stages.len());
        let mut current = buffer;

        for stage in &self.stages {
            current = self.run_step(stage, current, &mut timings);
        }

        PreprocessingResult {
            buffer: current,
            total_time_ms: start.elapsed().as_millis() as u64,
            steps: timings,
        }
    }

    fn run_step(
        &self,
        stage: &Stage,
        buffer: PixelBuffer,
        timings: &mut Vec<StepTiming>,
    ) -> PixelBuffer {
        let step_start = Instant::now();

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            (stage.apply)(&buffer, &self.config).and_then(|out| match out {
                Cow::Owned(next) => {
                    next.check_layout()?;
                    Ok(Some(next))
                }
                Cow::Borrowed(_) => Ok(None),
            })
        }))
        .unwrap_or_else(|_| {
            Err(OcrError::Enhancement(format!(
                "step '{}' panicked",
                stage.name
            )))
        });

        let degraded = outcome.is_err();
        let next = match outcome {
            Ok(Some(next)) => next,
            Ok(None) => buffer,
            Err(e) => {
                tracing::warn!(
                    "Enhancement step '{}' failed, continuing with its input: {}",
                    stage.name,
                    e
                );
                buffer
            }
        };

        let time_ms = step_start.elapsed().as_millis() as u64;
        tracing::debug!(
            "Step {} took {}ms ({}x{})",
            stage.name,
            time_ms,
            next.width(),
            next.height()
        );
        timings.push(StepTiming {
            name: stage.name.to_string(),
            time_ms,
            degraded,
        });

        next
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(EnhancementConfig::default())
    }
}

fn stage<F>(name: &'static str, apply: F) -> Stage
where
    F: for<'a> Fn(&'a PixelBuffer, &EnhancementConfig) -> StepResult<'a> + Send + Sync + 'static,
{
    Stage {
        name,
        apply: Box::new(apply),
    }
}
