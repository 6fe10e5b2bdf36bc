//! Wires the real capabilities into a pipeline run.

use std::path::PathBuf;
use std::time::Duration;

use crate::config::load_config;
use crate::error::{BootstrapError, Result};
use crate::pipeline::{report_failure, Pipeline, PipelineError};
use crate::platform;
use crate::runtime::{HttpFetcher, InstallerContext};
use crate::shell::{is_ci, is_elevated, RegistryStore, SearchPath, SystemRunner};
use crate::ui::{create_ui, UserInterface};

use super::args::Cli;

/// Run the bootstrap for `cli` and return the process exit code.
pub fn run(cli: &Cli) -> i32 {
    let interactive = !cli.non_interactive && !is_ci();
    let mut ui = create_ui(interactive, cli.output_mode(), cli.no_color);

    match run_with_ui(cli, ui.as_mut()) {
        Ok(code) => code,
        Err(err) => {
            report_failure(&err, ui.as_mut());
            err.exit_code()
        }
    }
}

fn run_with_ui(cli: &Cli, ui: &mut dyn UserInterface) -> std::result::Result<i32, PipelineError> {
    let early = |error: BootstrapError| PipelineError {
        outcome: Default::default(),
        error,
    };

    let root = resolve_root(cli).map_err(early)?;
    let config = load_config(&root, cli.config.as_deref()).map_err(early)?;
    tracing::debug!("Application root: {}", root.display());

    let profile = platform::detect();
    let runner = SystemRunner;
    let fetcher = HttpFetcher::new().map_err(early)?;
    let store = RegistryStore::new(&runner);
    let env = |key: &str| std::env::var(key).ok();
    let sleep = |delay: Duration| std::thread::sleep(delay);
    let ctx = InstallerContext {
        runner: &runner,
        fetcher: &fetcher,
        store: &store,
        sleep: &sleep,
        env: &env,
        elevated: is_elevated(),
        assume_yes: cli.yes,
    };

    let mut path = SearchPath::from_process();
    let outcome = Pipeline::new(&ctx, &config, &root).run(&profile, &mut path, &cli.args, ui)?;
    Ok(outcome.exit_code.unwrap_or_default())
}

fn resolve_root(cli: &Cli) -> Result<PathBuf> {
    match &cli.root {
        Some(root) => Ok(root.clone()),
        None => Ok(std::env::current_dir()?),
    }
}
