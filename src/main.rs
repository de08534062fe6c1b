// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader as AsyncBufReader};

use livetrans::app_config::{self, Config, TranslationProvider};
use livetrans::history::HistoryRepository;
use livetrans::translation::{DictionaryEntry, LiveEvent};
use livetrans::{
    create_backend, AppError, DomainTag, LanguageSelector, LanguageTag, ManualOutcome, Orchestrator,
    RequestParams, Strategy,
};

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Gemini,
    #[value(name = "openai")]
    OpenAI,
    Mock,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Gemini => TranslationProvider::Gemini,
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
            CliTranslationProvider::Mock => TranslationProvider::Mock,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// Language and domain overrides shared by `translate` and `live`
#[derive(Args, Debug, Clone)]
struct LanguageArgs {
    /// Source language code or "auto"
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'vi', 'en', 'ja')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Domain (general, medical, technical, legal, business, gaming, travel, study, slang, idiom)
    #[arg(short, long)]
    domain: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate a text once, as the Translate button does
    Translate {
        /// Text to translate
        #[arg(value_name = "TEXT")]
        text: String,

        #[command(flatten)]
        languages: LanguageArgs,
    },

    /// Live mode: every stdin line replaces the input field
    Live {
        #[command(flatten)]
        languages: LanguageArgs,
    },

    /// Show, export or clear the translation history
    History {
        /// Number of records to show
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Delete every record
        #[arg(long, conflicts_with = "export")]
        clear: bool,

        /// Write the whole history to a text file
        #[arg(long, value_name = "PATH")]
        export: Option<PathBuf>,
    },

    /// Generate shell completions for livetrans
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// livetrans - live translation assistant
///
/// Translates text through a cloud language backend, with a debounced live
/// mode and a persisted history.
#[derive(Parser, Debug)]
#[command(name = "livetrans")]
#[command(version = "0.1.0")]
#[command(about = "Live translation assistant")]
#[command(long_about = "livetrans translates text through Gemini or OpenAI.

EXAMPLES:
    livetrans translate \"good morning\" -t vi          # Translate once
    livetrans translate lit -d slang                   # Interpret slang
    livetrans translate \"the server is down\" -d technical
    livetrans live -t ja                               # Each stdin line is an edit
    livetrans history -n 5                             # Recent translations
    livetrans history --export history.txt             # Export everything
    livetrans completions bash > livetrans.bash        # Generate bash completions

CONFIGURATION:
    Configuration is stored in livetrans.json by default. You can specify a
    different file with --config-path. If the file doesn't exist, a default one
    is created automatically. The API key can also come from LIVETRANS_API_KEY.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "livetrans.json")]
    config_path: String,

    /// Translation provider to use
    #[arg(short, long, global = true, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// API key for the selected provider
    #[arg(long, global = true, env = "LIVETRANS_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }

    // @returns: Symbol for log level
    fn symbol_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "✖",
            Level::Warn => "!",
            Level::Info => " ",
            Level::Debug => "·",
            Level::Trace => "›",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                Self::symbol_for_level(record.level()),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once; the level is updated after loading the config
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "livetrans", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(&cli)?;
    log::set_max_level(level_filter(&config.log_level));

    match cli.command {
        Commands::Translate { text, languages } => run_translate(&config, &text, &languages).await,
        Commands::Live { languages } => run_live(&config, &languages).await,
        Commands::History { limit, clear, export } => run_history(&config, limit, clear, export).await,
        Commands::Completions { .. } => Ok(()),
    }
}

/// Load the configuration file, creating a default one when missing, then
/// apply command line overrides
fn load_config(cli: &CommandLineOptions) -> Result<Config> {
    let config_path = &cli.config_path;
    let mut config = if Path::new(config_path).exists() {
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        config
    };

    if let Some(provider) = &cli.provider {
        config.translation.provider = provider.clone().into();
    }

    if let Some(api_key) = &cli.api_key {
        config.translation.active_provider_config_mut().api_key = api_key.clone();
    }

    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone().into();
    }

    Ok(config)
}

fn apply_language_args(config: &mut Config, languages: &LanguageArgs) {
    if let Some(source) = &languages.source_language {
        config.source_language = source.clone();
    }
    if let Some(target) = &languages.target_language {
        config.target_language = target.clone();
    }
    if let Some(domain) = &languages.domain {
        config.domain = Some(domain.clone());
    }
}

fn request_params(config: &Config) -> Result<RequestParams> {
    let source: LanguageSelector = config.source_selector()?;
    let target: LanguageTag = config.target()?;
    let domain: Option<DomainTag> = config.domain_tag()?;
    Ok(RequestParams::new(source, target, domain))
}

fn open_history(config: &Config) -> Result<HistoryRepository> {
    let path = config.history_db_path()?;
    HistoryRepository::open(&path).context(format!("Failed to open history database: {:?}", path))
}

fn build_orchestrator(config: &Config) -> Result<Orchestrator> {
    config.validate().context("Configuration validation failed")?;

    let backend = create_backend(&config.translation);
    let history = Arc::new(open_history(config)?);
    info!("Using {} backend", backend.name());

    Orchestrator::from_config(config, backend, history)
}

fn print_output(strategy: Strategy, output: &str) {
    if strategy == Strategy::DictionaryLookup {
        if let Some(entry) = DictionaryEntry::parse(output) {
            println!("Meaning:        {}", entry.meaning);
            println!("Part of speech: {}", entry.part_of_speech);
            println!("Pronunciation:  {}", entry.pronunciation);
            println!("Explanation:    {}", entry.explanation);
            for (index, example) in entry.examples.iter().enumerate() {
                match &example.translation {
                    Some(translation) => println!("  {}. {} – {}", index + 1, example.sentence, translation),
                    None => println!("  {}. {}", index + 1, example.sentence),
                }
            }
            return;
        }
    }
    println!("{}", output);
}

async fn run_translate(config: &Config, text: &str, languages: &LanguageArgs) -> Result<()> {
    let mut config = config.clone();
    apply_language_args(&mut config, languages);

    let orchestrator = build_orchestrator(&config)?;
    let params = request_params(&config)?;

    let outcome = orchestrator.submit_text(text, params).await?;
    orchestrator.flush_history().await;
    match &outcome {
        ManualOutcome::Translated(translation) => {
            info!(
                "{} → {} ({}{})",
                translation.source,
                translation.target,
                translation.strategy,
                if translation.from_cache { ", cached" } else { "" }
            );
            print_output(translation.strategy, &translation.output);
            Ok(())
        }
        ManualOutcome::Failed { error, .. } => {
            println!("{}", outcome.display_text());
            Err(AppError::Backend(error.clone()).into())
        }
    }
}

async fn run_live(config: &Config, languages: &LanguageArgs) -> Result<()> {
    let mut config = config.clone();
    apply_language_args(&mut config, languages);

    let orchestrator = build_orchestrator(&config)?;
    let params = request_params(&config)?;
    let (session, mut events) = orchestrator.live_session()?;

    info!("Live mode: type text, each line replaces the input. Ctrl-D to finish.");

    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                LiveEvent::Cleared => println!("(cleared)"),
                LiveEvent::Translated(result) => {
                    println!("{} → {}", result.source, result.target);
                    print_output(result.strategy, &result.output);
                }
                LiveEvent::Superseded { .. } => {}
                LiveEvent::Failed { error, .. } => eprintln!("Translation failed: {}", error),
            }
        }
    });

    let mut lines = AsyncBufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        session.on_live_edit(&line, params);
    }

    // Let the last debounce round, any in-flight call and queued appends finish
    session.wait_idle().await;
    orchestrator.flush_history().await;

    drop(session);
    drop(orchestrator);
    printer.await.context("Live event printer failed")?;
    Ok(())
}

async fn run_history(config: &Config, limit: Option<usize>, clear: bool, export: Option<PathBuf>) -> Result<()> {
    let history = open_history(config)?;

    if clear {
        let removed = history.clear().await?;
        println!("Removed {} records", removed);
        return Ok(());
    }

    if let Some(path) = export {
        let count = history.export_to_file(&path).await?;
        println!("Exported {} records to {:?}", count, path);
        return Ok(());
    }

    let limit = limit.unwrap_or(config.history.display_limit);
    let records = history.query(limit).await?;
    if records.is_empty() {
        println!("No translations yet");
        return Ok(());
    }

    for record in records {
        println!("{}", record.summary());
    }
    Ok(())
}
