use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mealchat_core::Config;
use mealchat_core::logging::{LoggingConfig, init_logging};
use mealchat_providers::{ClientFactory, InferenceClient, ScriptedClient};
use mealchat_widget::{ApplyOutcome, TranscriptEntry, WidgetController, WidgetRuntime, WidgetSnapshot};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

/// mealchat - meal-program chat assistant in the terminal
#[derive(Parser, Debug)]
#[command(name = "mealchat")]
#[command(about = "Chat with the meal-program assistant from the terminal", long_about = None)]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to mealchat.toml (default: ./mealchat.toml)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Replay scripted replies from a TOML file instead of calling the model
    #[arg(long, value_name = "FILE")]
    mock: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start an interactive chat session
    Chat,
    /// Send a single message and print the reply
    Ask {
        /// Message to send
        #[arg(required = true, value_name = "MESSAGE")]
        message: Vec<String>,
    },
    /// Show the resolved configuration
    Status,
    /// Write an example config file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(|| PathBuf::from("mealchat.toml"));

    if let Commands::Init { force } = cli.command {
        return cmd_init(&config_path, force);
    }

    let config = load_config(&config_path, cli.verbose)?;
    let _guard = init_logging(Some(LoggingConfig::from(config.logging.clone())))
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    match cli.command {
        Commands::Chat => runtime.block_on(cmd_chat(config, cli.mock.as_deref())),
        Commands::Ask { message } => runtime.block_on(cmd_ask(config, cli.mock.as_deref(), &message.join(" "))),
        Commands::Status => cmd_status(&config, cli.mock.as_deref()),
        Commands::Init { .. } => Ok(()),
    }
}

/// Load config from file, or fall back to defaults when the file is absent
fn load_config(path: &Path, verbose: bool) -> Result<Config> {
    let config = if path.exists() {
        if verbose {
            println!("{} Loading config from {}", "Info:".green().bold(), path.display());
        }
        Config::from_file(path).map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?
    } else {
        if verbose {
            println!(
                "{} Config not found at {}, using defaults (run `mealchat init` to create one)",
                "Warning:".yellow().bold(),
                path.display()
            );
        }
        Config::default()
    };
    Ok(config.with_env_overrides())
}

fn build_client(config: &Config, mock: Option<&Path>) -> Result<Arc<dyn InferenceClient>> {
    match mock {
        Some(path) => {
            let client = ScriptedClient::from_file(path)
                .map_err(|e| anyhow::anyhow!("Failed to load mock replies from {}: {}", path.display(), e))?;
            Ok(Arc::new(client))
        }
        None => ClientFactory::create_from_config(&config.inference)
            .map_err(|e| anyhow::anyhow!("Failed to create inference client: {}", e)),
    }
}

fn build_controller(config: &Config, mock: Option<&Path>) -> Result<WidgetController> {
    let client = build_client(config, mock)?;
    let privacy = LoggingConfig::from(config.logging.clone()).privacy;
    Ok(WidgetController::new(client, config.widget.clone()).with_privacy(privacy))
}

fn render_entry(entry: &TranscriptEntry) -> String {
    let time = entry
        .timestamp()
        .map(|ts| ts.format("%H:%M").to_string())
        .unwrap_or_default();
    if entry.is_bot() {
        format!("{} {} {}", time.dimmed(), "Bot:".green().bold(), entry.text())
    } else {
        format!("{} {} {}", time.dimmed(), "You:".cyan().bold(), entry.text())
    }
}

/// Interactive chat over stdin
///
/// Lines starting with `/` are widget commands; everything else is sent.
async fn cmd_chat(config: Config, mock: Option<&Path>) -> Result<()> {
    let controller = build_controller(&config, mock)?;
    let (runtime, mut handle) = WidgetRuntime::new(controller);
    let task = tokio::spawn(runtime.run());

    handle.open();
    println!("{}", "mealchat".green().bold().underline());
    println!("Type a message, /history, /clear-draft or /quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        match line.trim() {
            "/quit" | "/exit" => break,
            "/history" => {
                for entry in &handle.snapshot().entries {
                    println!("{}", render_entry(entry));
                }
            }
            "/clear-draft" => {
                handle.set_draft("");
            }
            "" => {}
            _ => {
                let before = handle.snapshot().appended;
                handle.say(line.as_str());
                let reply = handle
                    .wait_for(|s: &WidgetSnapshot| !s.is_busy && s.appended >= before + 2)
                    .await;
                match reply.as_ref().and_then(WidgetSnapshot::last_entry) {
                    Some(entry) => println!("{}", render_entry(entry)),
                    None => break,
                }
            }
        }
    }

    handle.shutdown();
    task.await.context("Widget runtime panicked")?;
    Ok(())
}

/// Send one message and print the reply
async fn cmd_ask(config: Config, mock: Option<&Path>, message: &str) -> Result<()> {
    let mut controller = build_controller(&config, mock)?;
    controller.set_draft(message);

    let outcome = controller.submit_and_wait().await.map_err(|e| anyhow::anyhow!("Message not sent: {}", e))?;
    if let Some(entry) = controller.session().and_then(|s| s.transcript().last()) {
        println!("{}", entry.text());
    }

    if outcome == ApplyOutcome::FellBack {
        anyhow::bail!("inference request failed; run with MEALCHAT_LOG=warn for details");
    }
    Ok(())
}

/// Show the resolved configuration
fn cmd_status(config: &Config, mock: Option<&Path>) -> Result<()> {
    let inference = &config.inference;
    println!("{}", "mealchat Status".green().bold().underline());
    println!();

    println!("{} Inference", "Info:".blue().bold());
    match mock {
        Some(path) => println!("  Backend: {} ({})", "mock".yellow(), path.display()),
        None => println!("  Backend: {}", inference.base_url.cyan()),
    }
    println!("  Model: {}", inference.model.cyan());
    println!(
        "  API token: {}",
        if inference.api_token.is_some() { "set".green().to_string() } else { "not set".yellow().to_string() }
    );
    match inference.timeout_ms {
        Some(ms) => println!("  Timeout: {} ms", ms),
        None => println!("  Timeout: none"),
    }
    println!("  Attempts: {}", inference.retry.max_attempts);

    println!();
    println!("{} Widget", "Info:".blue().bold());
    match config.widget.transcript_limit() {
        Some(limit) => println!("  History: last {} entries", limit),
        None => println!("  History: unbounded"),
    }
    println!("  Fallback reply: {}", config.widget.fallback_message);

    println!();
    println!("{} Logging", "Info:".blue().bold());
    println!("  Level: {}", config.logging.level);
    println!("  Message text: {}", config.logging.privacy.log_message_text);
    Ok(())
}

/// Write the example config
fn cmd_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }

    std::fs::write(path, Config::example()).context("Failed to write config")?;
    println!("{} Created config at {}", "Success:".green().bold(), path.display());
    Ok(())
}
