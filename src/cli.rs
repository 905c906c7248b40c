use crate::{format_duration, parse_url_list, validate_url, PageReadyCondition, WebSize, WebSizeOptions};
use anyhow::{anyhow, bail, Context};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "websize")]
#[command(about = "Measure raw and rendered webpage sizes")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, help = "Options file (JSON)")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Enable debug logging")]
    pub debug: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Measure one or more URLs, one after another
    Measure(MeasureArgs),

    /// Validate an options file
    Validate {
        #[arg(help = "Options file to validate")]
        file: PathBuf,
    },
}

#[derive(Debug, Clone, Args)]
pub struct MeasureArgs {
    #[arg(help = "URLs to measure")]
    pub urls: Vec<String>,

    #[arg(short, long, help = "File containing URLs (one per line)")]
    pub input: Option<PathBuf>,

    #[arg(long, help = "User-Agent for the fetch and the browser")]
    pub user_agent: Option<String>,

    #[arg(long, value_enum, help = "Page-ready condition before reading the rendered document")]
    pub wait_until: Option<PageReadyCondition>,

    #[arg(long, help = "Print a formatted report after each measurement")]
    pub report: bool,

    #[arg(long, help = "Print results as JSON lines")]
    pub json: bool,

    #[arg(long, help = "Chrome executable path")]
    pub chrome_path: Option<String>,

    #[arg(long, help = "Render timeout in seconds (0 disables it)")]
    pub render_timeout: Option<u64>,

    #[arg(long, help = "Fetch timeout in seconds (0 disables it)")]
    pub fetch_timeout: Option<u64>,
}

impl MeasureArgs {
    /// Command-line flags take precedence over the options file.
    pub fn apply(&self, mut options: WebSizeOptions) -> WebSizeOptions {
        if let Some(user_agent) = &self.user_agent {
            options.user_agent = user_agent.clone();
        }
        if let Some(wait_until) = self.wait_until {
            options.wait_until = wait_until;
        }
        if self.report {
            options.verbose = true;
        }
        // JSON lines own stdout
        if self.json {
            options.verbose = false;
        }
        if let Some(chrome_path) = &self.chrome_path {
            options.chrome_path = Some(chrome_path.clone());
        }
        if let Some(secs) = self.render_timeout {
            options.render_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(secs) = self.fetch_timeout {
            options.fetch_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        options
    }
}

pub struct CliRunner {
    pub options: WebSizeOptions,
}

impl CliRunner {
    pub fn new(options: WebSizeOptions) -> Self {
        Self { options }
    }

    pub async fn run(&self, command: Commands) -> anyhow::Result<()> {
        match command {
            Commands::Measure(args) => self.run_measure(args).await,
            Commands::Validate { file } => self.validate_options_file(&file).await,
        }
    }

    pub async fn run_measure(&self, args: MeasureArgs) -> anyhow::Result<()> {
        let options = args.apply(self.options.clone());
        validate_options(&options)?;

        let mut urls = args.urls.clone();
        if let Some(input) = &args.input {
            let content = fs::read_to_string(input)
                .await
                .with_context(|| format!("Failed to read {}", input.display()))?;
            urls.extend(parse_url_list(&content));
        }
        if urls.is_empty() {
            bail!("No URLs to measure");
        }

        info!("Measuring {} URL(s), waiting for {}", urls.len(), options.wait_until);

        let verbose = options.verbose;
        let web_size = WebSize::new(options)?;
        let mut failures = 0;

        for url in &urls {
            if let Err(e) = validate_url(url) {
                error!("Skipping invalid URL {}", e);
                failures += 1;
                continue;
            }

            match web_size.measure(url).await {
                Ok(result) if args.json => {
                    let mut line = serde_json::to_value(result)?;
                    line["url"] = serde_json::Value::String(url.clone());
                    println!("{line}");
                }
                Ok(result) if !verbose => {
                    println!("Results for {url}:");
                    println!("- Raw Size: {:.2} KB", result.raw_size_kb);
                    println!("- Rendered Size: {:.2} KB", result.rendered_size_kb);
                    println!(
                        "- Render Time: {}",
                        format_duration(Duration::from_secs_f64(result.render_time_seconds))
                    );
                    if let Some(transfer_size_mb) = result.transfer_size_mb {
                        println!("- Transfer Size: {transfer_size_mb:.2} MB");
                    }
                }
                Ok(_) => {}
                Err(e) if e.is_timeout() => {
                    error!("Timed out measuring {}: {}", url, e);
                    failures += 1;
                }
                Err(e) => {
                    error!("Error measuring {}: {}", url, e);
                    failures += 1;
                }
            }
        }

        if failures > 0 {
            bail!("{} of {} measurements failed", failures, urls.len());
        }
        Ok(())
    }

    pub async fn validate_options_file(&self, path: &Path) -> anyhow::Result<()> {
        println!("Validating options: {}", path.display());

        let options = read_options_file(path).await?;
        validate_options(&options)?;

        println!("Options are valid:");
        println!("  User agent: {}", options.user_agent);
        println!("  Wait until: {}", options.wait_until);
        println!("  Verbose: {}", options.verbose);
        println!("  Chrome path: {}", options.chrome_path.as_deref().unwrap_or("auto-detect"));
        println!("  Render timeout: {}", describe_timeout(options.render_timeout));
        println!("  Fetch timeout: {}", describe_timeout(options.fetch_timeout));

        Ok(())
    }
}

fn describe_timeout(limit: Option<Duration>) -> String {
    limit.map_or_else(|| "none".to_string(), format_duration)
}

pub async fn read_options_file(path: &Path) -> anyhow::Result<WebSizeOptions> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid options in {}", path.display()))
}

/// Options from `--config` if given, defaults otherwise.
pub async fn load_options(args: &Cli) -> anyhow::Result<WebSizeOptions> {
    match &args.config {
        Some(path) => read_options_file(path).await,
        None => Ok(WebSizeOptions::default()),
    }
}

pub fn validate_options(options: &WebSizeOptions) -> anyhow::Result<()> {
    if options.user_agent.trim().is_empty() {
        bail!("User agent must not be empty");
    }

    if options.render_timeout.is_some_and(|t| t.is_zero()) {
        bail!("Render timeout must be greater than 0");
    }

    if options.fetch_timeout.is_some_and(|t| t.is_zero()) {
        bail!("Fetch timeout must be greater than 0");
    }

    Ok(())
}

pub fn setup_logging(debug: bool) -> anyhow::Result<()> {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!(e))
}
