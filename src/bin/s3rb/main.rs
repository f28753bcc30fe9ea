use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use tracing::{debug, error, trace};

use s3rb_rs::config::Config;
use s3rb_rs::safety::StdioPromptHandler;
use s3rb_rs::storage::create_storage;
use s3rb_rs::{
    BucketEradicator, CLIArgs, PromptHandler, SafetyChecker, exit_code_from_error,
    is_cancelled_error,
};

mod tracing_init;

/// s3rb - Permanently empty and delete a versioned Amazon S3 bucket.
///
/// This binary is a thin wrapper over the s3rb-rs library.
/// All core functionality is implemented in the library crate.
#[cfg_attr(coverage_nightly, coverage(off))]
#[tokio::main]
async fn main() {
    let config = load_config_exit_if_err();

    if let Some(shell) = config.auto_complete_shell {
        generate(
            shell,
            &mut CLIArgs::command(),
            "s3rb",
            &mut std::io::stdout(),
        );

        return;
    }

    start_tracing_if_necessary(&config);

    trace!("config = {:?}", config);

    if let Err(e) = run(config, Box::new(StdioPromptHandler)).await {
        match error_report(&e) {
            Some(report) => eprintln!("{report}"),
            None => {
                println!("aborting");
                return;
            }
        }
        std::process::exit(exit_code_from_error(&e));
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
fn load_config_exit_if_err() -> Config {
    match Config::try_from(CLIArgs::parse()) {
        Ok(config) => config,
        Err(error_message) => {
            clap::Error::raw(clap::error::ErrorKind::ValueValidation, error_message).exit()
        }
    }
}

fn start_tracing_if_necessary(config: &Config) -> bool {
    let Some(tracing_config) = config.tracing_config.as_ref() else {
        return false;
    };

    tracing_init::init_tracing(tracing_config);
    true
}

async fn run(config: Config, prompt_handler: Box<dyn PromptHandler>) -> Result<()> {
    SafetyChecker::with_prompt_handler(&config, prompt_handler).check_before_deletion()?;

    let start_time = tokio::time::Instant::now();
    debug!(bucket = config.bucket.as_str(), "s3rb start.");

    let storage = create_storage(&config).await?;
    let eradicator = BucketEradicator::new(storage, &config.bucket);
    let result = eradicator.eradicate().await;

    let duration_sec = format!("{:.3}", start_time.elapsed().as_secs_f32());
    if let Err(e) = result {
        error!(step = e.step(), duration_sec = duration_sec, "{}", e);
        return Err(e.into());
    }

    debug!(duration_sec = duration_sec, "s3rb has been completed.");

    Ok(())
}

/// Text printed to stderr for a failed run, with its full cause chain.
///
/// Every failure is printed regardless of the log level, since errors raised
/// before eradication starts are never logged. A declined confirmation has
/// no report.
fn error_report(e: &anyhow::Error) -> Option<String> {
    if is_cancelled_error(e) {
        return None;
    }

    Some(format!("{e:#}"))
}
