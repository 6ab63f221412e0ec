//! Application entry point and dispatch.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use fdbatch_cli::presenter::{CLIProgressObserver, CLIReportPresenter};
use fdbatch_core::constants::exit_codes;
use fdbatch_core::observer::ProgressSubject;
use fdbatch_core::observers::LoggingObserver;
use fdbatch_core::progress::CancellationToken;
use fdbatch_core::run_config::SimulationConfig;
use fdbatch_core::template::ConfigTemplate;
use fdbatch_orchestration::batch::JobBatchRunner;
use fdbatch_orchestration::cdf::CdfPostProcessor;
use fdbatch_orchestration::interfaces::ReportPresenter;
use fdbatch_orchestration::sample::SampleConstructionRunner;

use crate::config::{load_run_config, AppConfig, Command, EstimateArgs, SimulateArgs, TemplateArgs};
use crate::errors::{batch_exit_code, sample_exit_code};
use crate::version::full_version;

/// Run the application and return the process exit code.
pub fn run(config: &AppConfig) -> Result<i32> {
    info!("{}", full_version());
    match &config.command {
        Command::Estimate(args) => run_estimate(args, config),
        Command::Simulate(args) => run_simulate(args, config),
        Command::Template(args) => run_template(args),
        Command::Completion { shell } => {
            let mut cmd = <AppConfig as clap::CommandFactory>::command();
            fdbatch_cli::completion::generate_completion(&mut cmd, *shell, &mut std::io::stdout());
            Ok(exit_codes::SUCCESS)
        }
    }
}

fn run_estimate(args: &EstimateArgs, config: &AppConfig) -> Result<i32> {
    let run_config = args.load()?;
    if run_config.save.cdf && run_config.executables.predict_cdf.is_none() {
        warn!("No plot-cdf executable configured; CDF files will not be written");
    }

    let cancel = CancellationToken::new();
    ctrlc_handler(cancel.clone())?;

    let progress = Arc::new(if config.quiet {
        CLIProgressObserver::hidden()
    } else {
        CLIProgressObserver::new(run_config.datasets.len(), config.verbose)
    });
    let subject = ProgressSubject::new();
    subject.register(Arc::new(LoggingObserver::new()));
    subject.register(progress.clone());

    let report = JobBatchRunner::new(&run_config).run(&cancel, &subject)?;
    progress.finish();

    let presenter = CLIReportPresenter::new(config.verbose, config.quiet);
    presenter.present_batch(&report);

    if let Some(cdf) = CdfPostProcessor::for_batch(&run_config, &report) {
        let cdf_report = cdf.run(&subject)?;
        presenter.present_cdf(&cdf_report);
    }

    Ok(batch_exit_code(&report.outcome))
}

fn run_simulate(args: &SimulateArgs, config: &AppConfig) -> Result<i32> {
    let sim_config = SimulationConfig::from_file(&args.config)?;

    let cancel = CancellationToken::new();
    ctrlc_handler(cancel.clone())?;

    let report = SampleConstructionRunner::new(&sim_config).run(&cancel, &LoggingObserver::new())?;
    let presenter = CLIReportPresenter::new(config.verbose, config.quiet);
    if config.verbose {
        for line in &report.error_lines {
            fdbatch_cli::ui::print_warning(line);
        }
    }
    presenter.present_samples(&report);
    Ok(sample_exit_code(report.outcome))
}

fn run_template(args: &TemplateArgs) -> Result<i32> {
    let run_config = load_run_config(&args.config)?;
    print!("{}", ConfigTemplate::build(&run_config).text());
    Ok(exit_codes::SUCCESS)
}

fn ctrlc_handler(cancel: CancellationToken) -> Result<()> {
    ctrlc::set_handler(move || {
        cancel.cancel();
    })
    .context("Error setting Ctrl+C handler")
}
