//! Confirmation before eradicating a bucket.
//!
//! Eradication cannot be undone, so unless `--force` is given the operator
//! must type exactly `yes` after being shown the bucket name. Any other
//! input cancels the run with [`S3rbError::Cancelled`].

use crate::config::Config;
use crate::types::error::S3rbError;
use anyhow::{Result, anyhow};
use std::io::{BufRead, Write};

// ---------------------------------------------------------------------------
// PromptHandler trait (for testability)
// ---------------------------------------------------------------------------

/// Trait for handling user prompts, enabling testability.
///
/// The default implementation ([`StdioPromptHandler`]) uses stdin/stdout.
/// Tests can provide custom implementations to avoid blocking on user input.
pub trait PromptHandler: Send + Sync {
    /// Display the confirmation prompt for `bucket` and read a line of user
    /// input.
    ///
    /// Returns the user input without its line terminator.
    fn read_confirmation(&self, bucket: &str) -> Result<String>;
}

/// Default prompt handler using stdin/stdout.
///
/// Prompts go to stdout with `println!`/`print!`, not through tracing, so
/// they are shown regardless of the log level.
pub struct StdioPromptHandler;

impl PromptHandler for StdioPromptHandler {
    fn read_confirmation(&self, bucket: &str) -> Result<String> {
        println!("{}", confirmation_message(bucket));
        print!("Type yes to continue: ");
        std::io::stdout().flush()?;

        let mut input = String::new();
        std::io::stdin().lock().read_line(&mut input)?;
        Ok(input.trim_end_matches(['\r', '\n']).to_string())
    }
}

fn confirmation_message(bucket: &str) -> String {
    format!("Confirm you want to delete bucket \"{bucket}\"?")
}

// ---------------------------------------------------------------------------
// SafetyChecker
// ---------------------------------------------------------------------------

/// Asks for confirmation before the bucket is eradicated.
pub struct SafetyChecker {
    bucket: String,
    force: bool,
    prompt_handler: Box<dyn PromptHandler>,
}

impl SafetyChecker {
    /// Create a new SafetyChecker from the configuration.
    ///
    /// Uses [`StdioPromptHandler`] for interactive prompts.
    pub fn new(config: &Config) -> Self {
        Self::with_prompt_handler(config, Box::new(StdioPromptHandler))
    }

    /// Create a SafetyChecker with a custom prompt handler (for testing).
    pub fn with_prompt_handler(config: &Config, prompt_handler: Box<dyn PromptHandler>) -> Self {
        Self {
            bucket: config.bucket.clone(),
            force: config.force,
            prompt_handler,
        }
    }

    /// Check whether the eradication may start.
    ///
    /// # Returns
    ///
    /// - `Ok(())` if `force` is set or the user typed exactly `yes`
    /// - `Err(S3rbError::Cancelled)` for any other input
    pub fn check_before_deletion(&self) -> Result<()> {
        if self.force {
            return Ok(());
        }

        let input = self.prompt_handler.read_confirmation(&self.bucket)?;
        if input != "yes" {
            return Err(anyhow!(S3rbError::Cancelled));
        }

        Ok(())
    }
}
