use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

mod bootstrap;
mod cli;
mod commands;
mod context;
mod output;
mod progress;
mod ui;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("clinic error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let flags = cli.global_flags();
    ui::init(&flags);

    match &cli.command {
        cli::Commands::Init(args) => return commands::init::handle(args, &flags),
        cli::Commands::Variables => return commands::variables::handle(&flags),
        _ => {}
    }

    let config = bootstrap::load_config(&flags)?;
    if let cli::Commands::Config(args) = &cli.command {
        return commands::config::handle(args, &config, &flags);
    }

    let project_root = resolve_project_root(flags.project.as_deref(), &config)?;
    context::warn_unconfigured(&config);

    let actor = if matches!(cli.command, cli::Commands::Setup(_)) {
        None
    } else {
        resolve_actor(flags.actor.as_deref(), &config)
    };

    let mut ctx = context::AppContext::init(project_root, config, actor.as_deref())
        .await
        .context("failed to initialize clinic application context")?;

    commands::dispatch::dispatch(cli.command, &mut ctx, &flags).await
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("CLINIC_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

/// `--as` wins over `general.actor_id`.
fn resolve_actor(flag: Option<&str>, config: &clinic_config::ClinicConfig) -> Option<String> {
    flag.or(Some(config.general.actor_id.as_str()))
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(String::from)
}

fn resolve_project_root(
    project_override: Option<&str>,
    config: &clinic_config::ClinicConfig,
) -> anyhow::Result<PathBuf> {
    if let Some(path) = project_override {
        let explicit = PathBuf::from(path);

        if explicit
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name == clinic_config::PROJECT_DIR)
        {
            return explicit
                .parent()
                .map(std::path::Path::to_path_buf)
                .context("invalid --project path: '.clinic' directory has no parent");
        }

        if explicit.is_dir() {
            return Ok(explicit);
        }

        anyhow::bail!(
            "invalid --project '{}': directory does not exist",
            explicit.display()
        );
    }

    let start = std::env::current_dir().context("failed to read current directory")?;
    if let Some(root) = context::find_project_root(&start) {
        return Ok(root);
    }
    // An explicitly configured database does not need a project directory.
    if config.database.is_remote() || config.database.has_local_path() {
        return Ok(start);
    }
    anyhow::bail!("not a clinic project (no .clinic directory found). Run 'clinic init' first.")
}
