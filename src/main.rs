//! Eyeshade CLI - a work/rest break reminder
//!
//! Alternates a work countdown (45 minutes by default) with a short rest
//! (4 minutes by default) and warns shortly before each break.

use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tokio::sync::mpsc;

use eyeshade::cli::{parse_line, Cli, Commands, ConfigCommand, ConsoleCommand, Display};
use eyeshade::config::{default_config_path, JsonSettingsStore, UserConfig};
use eyeshade::daemon::AlarmClockService;

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
///
/// `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Run) => {
            let path = resolve_config_path(cli.config)?;
            run(load_config(path)).await?;
        }
        Some(Commands::Config { action }) => {
            let path = resolve_config_path(cli.config)?;
            configure(action, path)?;
        }
        Some(Commands::Completions { shell }) => {
            generate_completions(shell);
        }
        None => {
            // No command provided, show help
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

fn resolve_config_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path),
        None => default_config_path()
            .context("設定ディレクトリを特定できません。--config で設定ファイルを指定してください"),
    }
}

fn load_config(path: PathBuf) -> UserConfig {
    UserConfig::load(Box::new(JsonSettingsStore::new(path)))
}

/// Hosts the alarm clock until `quit`, end of input or Ctrl-C.
async fn run(config: UserConfig) -> Result<()> {
    let (service, mut events) = AlarmClockService::start(config);
    let driver = service.spawn();
    tracing::info!("Alarm clock driver started");

    Display::show_console_banner();
    Display::show_status(&service.status().await);

    let mut lines = spawn_stdin_reader();
    loop {
        tokio::select! {
            biased;
            Some(event) = events.recv() => {
                Display::show_event(&event);
            }
            line = lines.recv() => {
                let Some(line) = line else {
                    break;
                };
                let line = line.context("標準入力の読み込みに失敗しました")?;
                if !handle_line(&service, &line).await {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                break;
            }
        }
    }

    driver.abort();
    while let Ok(event) = events.try_recv() {
        Display::show_event(&event);
    }
    tracing::info!("Alarm clock driver stopped");
    Ok(())
}

/// Forwards stdin lines from a detached thread.
///
/// A blocking stdin read cannot be cancelled, so it must not hold up
/// runtime shutdown.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<io::Result<String>> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Handles one console line. Returns false when the console should close.
async fn handle_line(service: &AlarmClockService, line: &str) -> bool {
    let command = match parse_line(line) {
        Ok(Some(command)) => command,
        Ok(None) => return true,
        Err(e) => {
            // clap renders help and usage errors itself
            let _ = e.print();
            return true;
        }
    };

    if command == ConsoleCommand::Away {
        let enabled = service
            .with_alarm(|alarm| alarm.config().auto_pause_when_user_leave)
            .await;
        if !enabled {
            Display::show_notice("離席時の自動一時停止は無効になっています");
            return true;
        }
    }

    let Some(alarm_command) = command.to_alarm_command() else {
        return false;
    };

    match service.execute(alarm_command).await {
        Ok(status) => {
            if command == ConsoleCommand::Status {
                Display::show_status(&status);
            }
        }
        Err(e) => Display::show_config_error(&e),
    }
    true
}

/// Runs a `config` subcommand against the settings file.
fn configure(action: ConfigCommand, path: PathBuf) -> Result<()> {
    match action {
        ConfigCommand::Path => {
            println!("{}", path.display());
        }
        ConfigCommand::Show => {
            let config = load_config(path);
            Display::show_config(config.values(), &config.location());
        }
        ConfigCommand::Set(args) => {
            if args.is_empty() {
                anyhow::bail!("変更する設定を1つ以上指定してください");
            }

            let mut config = load_config(path.clone());
            args.apply_to(&mut config)?;
            config
                .try_save()
                .with_context(|| format!("設定を保存できませんでした: {}", path.display()))?;

            Display::show_config(config.values(), &config.location());
        }
    }

    Ok(())
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================
