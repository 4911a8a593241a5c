//! External model command
//!
//! Runs a prediction script as a subprocess. The features are passed as one
//! comma-separated argument (`L,W,H,DF`) and the script must print
//! `{"prediction": <number>}` on stdout.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::process::Stdio;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::debug;

use super::{WeightFeatures, WeightPredictor};

#[derive(Debug, Deserialize)]
struct PredictionOutput {
    prediction: f64,
}

#[derive(Debug, Clone)]
pub struct CommandPredictor {
    program: String,
    args: Vec<String>,
    timeout: Duration,
    label: String,
}

impl CommandPredictor {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        let program = program.into();
        Self {
            label: format!("command:{}", program),
            program,
            args,
            timeout: Duration::from_secs(10),
        }
    }

    /// Split a whitespace-separated command line. `None` when it is blank.
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect()))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn parse_output(stdout: &str) -> Result<f64> {
        let output: PredictionOutput = serde_json::from_str(stdout.trim())
            .with_context(|| format!("Malformed model output: {:?}", stdout.trim()))?;
        Ok(output.prediction)
    }
}

#[async_trait]
impl WeightPredictor for CommandPredictor {
    fn name(&self) -> &str {
        &self.label
    }

    async fn predict(&self, features: &WeightFeatures) -> Result<f64> {
        let input = features
            .to_array()
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",");
        debug!("Running model command: {} {:?} {}", self.program, self.args, input);

        let output = timeout(
            self.timeout,
            Command::new(&self.program)
                .args(&self.args)
                .arg(&input)
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .stdin(Stdio::null())
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| anyhow!("Model command timed out after {}s", self.timeout.as_secs_f64()))?
        .with_context(|| format!("Failed to execute model command '{}'", self.program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "Prediction failed with code {}: {}",
                output.status.code().unwrap_or(-1),
                stderr.trim()
            );
        }

        Self::parse_output(&String::from_utf8_lossy(&output.stdout))
    }
}
