use alinf::commands::add_aliases::{self, OptionOverrides};
use alinf::commands::{AcceptDefaults, LinePrompt, OptionsPrompt};
use alinf::config::Config;
use alinf::inflectors::{InflectionBatch, create_inflector};
use alinf::models::Settings;
use alinf_types::{InflectionOptions, InflectorKind, Notice};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

#[derive(Parser, Debug)]
#[command(name = "alinf", version, about = "Add inflected aliases to Markdown notes")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Inflect a note's name and aliases and store the forms as aliases
    AddAliases {
        /// Path to the note
        note: PathBuf,
        /// Include plural forms
        #[arg(long, overrides_with = "no_plural")]
        plural: bool,
        /// Singular forms only
        #[arg(long, overrides_with = "plural")]
        no_plural: bool,
        /// Inflect the note's file name
        #[arg(long, overrides_with = "no_inflect_file_name")]
        inflect_file_name: bool,
        /// Inflect only the existing aliases
        #[arg(long, overrides_with = "inflect_file_name")]
        no_inflect_file_name: bool,
        /// Inflector to use instead of the configured one
        #[arg(long, value_parser = parse_inflector)]
        inflector: Option<InflectorKind>,
        /// Skip the confirmation questions
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Look up the forms of a single phrase
    Inflect {
        phrase: String,
        /// Singular forms only
        #[arg(long)]
        no_plural: bool,
        /// Inflector to use instead of the configured one
        #[arg(long, value_parser = parse_inflector)]
        inflector: Option<InflectorKind>,
    },
    /// Show the effective settings
    Settings {
        /// Write the default settings file
        #[arg(long)]
        init: bool,
    },
}

fn parse_inflector(value: &str) -> Result<InflectorKind, String> {
    InflectorKind::from_str(value).map_err(|_| {
        let known: Vec<String> = alinf::models::settings::available_inflectors(true)
            .iter()
            .map(|k| k.to_string())
            .collect();
        format!("unknown inflector {:?} (expected one of: {})", value, known.join(", "))
    })
}

/// Pair of `--x` / `--no-x` flags; neither given keeps the resolved value.
fn flag_pair(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

fn print_notices(notices: &[Notice]) {
    for notice in notices {
        match notice {
            Notice::InflectorErrors(_) | Notice::Failed => eprintln!("{}", notice.message()),
            _ => println!("{}", notice.message()),
        }
    }
}

async fn add_aliases_command(
    mut settings: Settings,
    note: PathBuf,
    overrides: OptionOverrides,
    inflector: Option<InflectorKind>,
    yes: bool,
) -> ExitCode {
    if let Some(kind) = inflector {
        settings.inflector = kind;
    }
    if yes {
        settings.confirm_before_apply = false;
    }
    let inflector = create_inflector(&settings);

    let prompt: Box<dyn OptionsPrompt> = if settings.confirm_before_apply {
        Box::new(LinePrompt::stdio())
    } else {
        Box::new(AcceptDefaults)
    };

    match add_aliases::run(&note, &settings, inflector.as_ref(), prompt.as_ref(), overrides).await {
        None => {
            println!("Cancelled");
            ExitCode::SUCCESS
        }
        Some(report) => {
            print_notices(&report.notices);
            if report.notices.contains(&Notice::Failed) {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
    }
}

async fn inflect_command(
    mut settings: Settings,
    phrase: String,
    no_plural: bool,
    inflector: Option<InflectorKind>,
) -> ExitCode {
    if let Some(kind) = inflector {
        settings.inflector = kind;
    }
    let inflector = create_inflector(&settings);
    let options = InflectionOptions {
        include_plural: !no_plural,
        inflect_filename: true,
    };

    let mut batch = InflectionBatch::new(inflector.as_ref());
    for form in batch.get_inflections(&phrase, &options).await {
        println!("{}", form);
    }

    let errors = batch.into_errors();
    if errors.is_empty() {
        ExitCode::SUCCESS
    } else {
        eprintln!("{}", errors.join("\n\n"));
        ExitCode::FAILURE
    }
}

fn settings_command(config: &Config, settings: &Settings, init: bool) -> ExitCode {
    if init {
        if config.settings_path.exists() {
            eprintln!("Settings file already exists: {}", config.settings_path.display());
            return ExitCode::FAILURE;
        }
        if let Err(e) = Settings::default().save(&config.settings_path) {
            log::error!("[SETTINGS] {}", e);
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
        println!("Wrote {}", config.settings_path.display());
        return ExitCode::SUCCESS;
    }

    match settings.to_ron() {
        Ok(ron) => {
            println!("// {}", config.settings_path.display());
            println!("{}", ron);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let config = Config::from_env();
    let settings = config.load_settings();
    log::debug!("Settings loaded from {:?}", config.settings_path);

    match cli.command {
        Command::AddAliases {
            note,
            plural,
            no_plural,
            inflect_file_name,
            no_inflect_file_name,
            inflector,
            yes,
        } => {
            let overrides = OptionOverrides {
                include_plural: flag_pair(plural, no_plural),
                inflect_filename: flag_pair(inflect_file_name, no_inflect_file_name),
            };
            add_aliases_command(settings, note, overrides, inflector, yes).await
        }
        Command::Inflect {
            phrase,
            no_plural,
            inflector,
        } => inflect_command(settings, phrase, no_plural, inflector).await,
        Command::Settings { init } => settings_command(&config, &settings, init),
    }
}
