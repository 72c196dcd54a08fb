//! prompt-optimizer CLI - Rewrite prompts with the 4-D methodology

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use prompt_optimizer::{
    config::Config,
    formatters::OutputMode,
    optimizer::PromptOptimizer,
    tui::{renderer::TerminalRenderer, spinner::Spinner, InteractiveShell},
};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "prompt-optimizer")]
#[command(about = "Optimize prompts for Claude, ChatGPT, Gemini and other models")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level
    #[arg(short, long, global = true, default_value = "warn")]
    log_level: String,

    /// Config file (default: ~/.config/prompt-optimizer/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Optimize a prompt given inline or in a file
    Optimize {
        /// Prompt text
        #[arg(required_unless_present = "file", conflicts_with = "file")]
        prompt: Option<String>,

        /// Read the prompt from a file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Output mode (conversational, structured)
        #[arg(short, long)]
        mode: Option<OutputMode>,

        /// Target platform (claude, chatgpt, gemini, generic)
        #[arg(short, long)]
        platform: Option<String>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Suppress warnings and the summary line
        #[arg(short, long)]
        quiet: bool,

        /// Also run the optimized prompt through the configured generator
        #[arg(long)]
        preview: bool,
    },

    /// Interactive shell
    Shell {
        /// Initial output mode
        #[arg(short, long)]
        mode: Option<OutputMode>,

        /// Initial platform
        #[arg(short, long)]
        platform: Option<String>,
    },

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Initialize configuration file with defaults
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Show current configuration (API keys masked)
    Show,

    /// Show configuration file path
    Path,

    /// Validate configuration
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.unwrap_or_else(Config::default_path);

    match cli.command {
        Commands::Optimize {
            prompt,
            file,
            mode,
            platform,
            output,
            quiet,
            preview,
        } => {
            let config = Config::load_from(&config_path)?;
            let text = match (prompt, file) {
                (Some(prompt), _) => prompt,
                (None, Some(path)) => read_prompt_file(&path).await?,
                (None, None) => anyhow::bail!("Provide a prompt or --file"),
            };
            let options = OptimizeOptions {
                mode: mode.unwrap_or(config.optimizer.mode),
                platform: platform.unwrap_or_else(|| config.optimizer.platform.clone()),
                output,
                quiet,
                preview,
            };
            run_optimize(&config, &text, options).await?;
        }
        Commands::Shell { mode, platform } => {
            let config = Config::load_from(&config_path)?;
            let mode = mode.unwrap_or(config.optimizer.mode);
            let platform = platform.unwrap_or_else(|| config.optimizer.platform.clone());
            let mut shell =
                InteractiveShell::new(PromptOptimizer::from_config(&config), mode, platform);
            shell.run().await?;
        }
        Commands::Config(cmd) => {
            run_config_command(cmd, &config_path)?;
        }
    }

    Ok(())
}

struct OptimizeOptions {
    mode: OutputMode,
    platform: String,
    output: Option<PathBuf>,
    quiet: bool,
    preview: bool,
}

async fn read_prompt_file(path: &Path) -> Result<String> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(content.trim().to_string())
}

async fn run_optimize(config: &Config, text: &str, options: OptimizeOptions) -> Result<()> {
    info!(mode = %options.mode, platform = %options.platform, "optimizing prompt");

    let optimizer = PromptOptimizer::from_config(config);
    let (result, validation) = optimizer.optimize(text, options.mode, &options.platform);

    if !validation.is_valid {
        eprintln!("Validation failed:");
        for error in &validation.errors {
            eprintln!("  \u{2022} {}", error);
        }
        anyhow::bail!("Input rejected");
    }

    if !options.quiet {
        for warning in &validation.warnings {
            eprintln!("Warning: {}", warning);
        }
    }

    match &options.output {
        Some(path) => {
            tokio::fs::write(path, &result.optimized_prompt)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            if !options.quiet {
                eprintln!("Optimized prompt written to: {}", path.display());
            }
        }
        None if std::io::stdout().is_terminal() => {
            TerminalRenderer::new().render_result(&result);
        }
        None => println!("{}", result.optimized_prompt),
    }

    if options.preview {
        match optimizer.optimized_text(text, &options.platform) {
            Some(prompt) => {
                let mut spinner = Spinner::new();
                spinner.start("Generating preview...");
                let generated = optimizer.preview(&prompt, &options.platform).await;
                spinner.stop();

                let generated = generated?;
                println!("\n--- Preview ({}) ---", generated.model);
                println!("{}", generated.content);
            }
            None => warn!("nothing to preview"),
        }
    }

    if !options.quiet {
        eprintln!(
            "\nOptimization complete! Applied {} improvements.",
            result.improvements.len()
        );
    }

    Ok(())
}

fn run_config_command(cmd: ConfigCommands, path: &Path) -> Result<()> {
    match cmd {
        ConfigCommands::Init { force } => config_init(path, force)?,
        ConfigCommands::Show => config_show(path)?,
        ConfigCommands::Path => config_path(path),
        ConfigCommands::Validate => config_validate(path)?,
    }
    Ok(())
}

fn config_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        println!("Configuration file already exists at: {}", path.display());
        println!("Use --force to overwrite");
        return Ok(());
    }

    Config::default().save_to(path)?;

    println!("Configuration file created at: {}", path.display());
    println!();
    println!("Hosted previews are off by default. To enable them, set");
    println!("[generator] enabled = true and add keys, or export:");
    println!("  export ANTHROPIC_API_KEY=your_anthropic_key");
    println!("  export OPENAI_API_KEY=your_openai_key");
    println!("  export PROMPT_OPTIMIZER_GENERATOR=true");

    Ok(())
}

fn config_show(path: &Path) -> Result<()> {
    let config = Config::load_from(path)?;
    println!("{}", toml::to_string_pretty(&config.masked())?);

    println!("--- Environment Variables ---");
    for var in [
        "PROMPT_OPTIMIZER_MODE",
        "PROMPT_OPTIMIZER_PLATFORM",
        "PROMPT_OPTIMIZER_GENERATOR",
        "ANTHROPIC_API_KEY",
        "OPENAI_API_KEY",
    ] {
        let state = if std::env::var(var).is_ok() { "set" } else { "not set" };
        println!("{}: {}", var, state);
    }

    Ok(())
}

fn config_path(path: &Path) {
    println!("{}", path.display());

    if path.exists() {
        println!("(file exists)");
    } else {
        println!("(file does not exist - run 'config init' to create)");
    }
}

fn config_validate(path: &Path) -> Result<()> {
    let config = Config::load_from(path)?;
    config.validate()?;

    println!("Configuration is valid.");
    if config.generator.enabled {
        let anthropic = config.generator.anthropic_api_key.is_some();
        let openai = config.generator.openai_api_key.is_some();
        println!("  claude previews: {}", if anthropic { "anthropic" } else { "mock" });
        println!("  chatgpt previews: {}", if openai { "openai" } else { "mock" });
    } else {
        println!("  previews: mock only (generator disabled)");
    }

    Ok(())
}
