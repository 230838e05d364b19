//! StepChain - ordered client-cli invocations against one wallet
//!
//! Steps run strictly in order. The first failure stops the chain; no step
//! is retried and nothing already done is undone.

use std::path::Path;

use crate::core::command::{WalletCommand, WalletFiles};
use crate::process::{CommandRunner, ProcessError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutput {
    pub step: &'static str,
    pub output: String,
}

#[derive(Debug)]
pub struct StepFailure {
    pub step: &'static str,
    pub completed: Vec<StepOutput>,
    pub source: ProcessError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepChain {
    steps: Vec<WalletCommand>,
}

impl StepChain {
    pub fn new(steps: Vec<WalletCommand>) -> Self { Self { steps } }

    /// importinput(token) → sync → info
    pub fn import(token: impl Into<String>) -> Self {
        Self::new(vec![WalletCommand::ImportInput { token: token.into() }, WalletCommand::Sync, WalletCommand::Info])
    }

    pub async fn run(&self, runner: &dyn CommandRunner, files: &WalletFiles, work_dir: Option<&Path>) -> Result<Vec<StepOutput>, StepFailure> {
        let mut completed = Vec::with_capacity(self.steps.len());
        for command in &self.steps {
            let step = command.name();
            match runner.run(&command.args(files), work_dir).await {
                Ok(output) => {
                    tracing::debug!(step, wallet = %files.wallet, output = %output.trim_end(), "step done");
                    completed.push(StepOutput { step, output });
                }
                Err(source) => {
                    tracing::warn!(step, wallet = %files.wallet, error = %source, "step failed");
                    return Err(StepFailure { step, completed, source });
                }
            }
        }
        Ok(completed)
    }
}
