//! fdbatch, a batch driver for the fast-dm diffusion-model tools.

use fdbatch_cli::presenter::CLIReportPresenter;
use fdbatch_lib::{app, config, errors};
use fdbatch_orchestration::interfaces::ReportPresenter;

fn main() {
    let config = config::AppConfig::parse();

    let level = if config.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    let code = match app::run(&config) {
        Ok(code) => code,
        Err(err) => {
            CLIReportPresenter::new(config.verbose, config.quiet).present_error(&format!("{err:#}"));
            errors::exit_code(&err)
        }
    };
    std::process::exit(code);
}
