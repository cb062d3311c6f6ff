//! modelgrab CLI
//!
//! Downloads the openly licensed models of one author from a 3D-model
//! hosting platform, skipping anything already on disk.

mod commands;
mod logging;
mod output;
mod progress;
mod prompt;

use anyhow::Result;
use clap::{Parser, Subcommand};
use modelgrab_core::{ConfigSource, RunConfig};
use modelgrab_types::Settings;
use std::future::Future;
use std::path::{Path, PathBuf};

/// modelgrab - download an author's openly licensed 3D models
#[derive(Parser)]
#[command(name = "modelgrab")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Settings file (default: <config dir>/modelgrab/settings.json)
    #[arg(long, env = "MODELGRAB_SETTINGS", global = true)]
    settings: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Exit without waiting for Enter after an interactive run
    #[arg(long, global = true)]
    no_pause: bool,

    /// Without a subcommand, prompts for token, username and output directory
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum OutputFormat {
    Human,
    Json,
    Table,
}

#[derive(Subcommand)]
enum Commands {
    /// Download every model of a user whose license is allowed
    Download {
        /// Username whose models are downloaded
        #[arg(env = "MODELGRAB_USER")]
        username: String,

        /// API token
        #[arg(short, long, env = "MODELGRAB_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Output directory; a subdirectory per user is created inside it
        #[arg(short, long, env = "MODELGRAB_OUTPUT")]
        output: Option<PathBuf>,

        /// Allowed license token (repeatable, default: cc0, by, free standard, standard)
        #[arg(short, long = "license", value_name = "TOKEN")]
        licenses: Vec<String>,
    },

    /// List a user's models and whether their license is allowed
    List {
        /// Username whose catalog is listed
        #[arg(env = "MODELGRAB_USER")]
        username: String,

        /// API token (optional for listing)
        #[arg(short, long, env = "MODELGRAB_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Allowed license token (repeatable)
        #[arg(short, long = "license", value_name = "TOKEN")]
        licenses: Vec<String>,

        /// Output format
        #[arg(long, default_value = "human")]
        format: OutputFormat,
    },

    /// Show/reset settings
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show all settings
    Show {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the settings file location
    Path,

    /// Write default settings
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let settings_path = cli.settings.clone().or_else(modelgrab_core::default_settings_path);

    let Some(command) = cli.command else {
        // Settings loading is guarded too; the pause follows either way.
        if let Err(e) = until_interrupted(interactive(settings_path)).await {
            output::print_error(&e);
        }
        if !cli.no_pause {
            output::wait_for_enter();
        }
        // A prompt cancelled mid-read can still hold a blocking thread.
        std::process::exit(0);
    };

    let settings = load_settings(settings_path.as_deref()).await?;

    match command {
        Commands::Download {
            username,
            token,
            output,
            licenses,
        } => {
            let source = prompt::ArgsSource {
                token,
                username,
                output,
                licenses,
            };
            let config = modelgrab_core::resolve_run_config(&source, &settings)?;
            until_interrupted(commands::download(config)).await?
        }

        Commands::List {
            username,
            token,
            licenses,
            format,
        } => {
            until_interrupted(commands::list_models(
                &settings, &username, token, licenses, format,
            ))
            .await?
        }

        Commands::Config { action } => {
            commands::config_action(&settings, settings_path.as_deref(), action).await?
        }

        Commands::Completions { shell } => {
            use clap::CommandFactory;
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "modelgrab",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

async fn load_settings(path: Option<&Path>) -> Result<Settings> {
    match path {
        Some(path) => Ok(modelgrab_core::load_settings(path).await?),
        None => Ok(Settings::default()),
    }
}

/// The standalone flow: banner, prompts, then a full download run
async fn interactive(settings_path: Option<PathBuf>) -> Result<()> {
    let settings = load_settings(settings_path.as_deref()).await?;
    output::print_banner(&settings);

    let source = prompt::PromptSource::new(&settings);
    let config = resolve_blocking(source, settings).await?;
    output::print_selected_licenses(&config.licenses);

    commands::download(config).await
}

/// Resolve the run configuration on the blocking pool so Ctrl-C is still
/// observed while a prompt waits for input
async fn resolve_blocking<S>(source: S, settings: Settings) -> Result<RunConfig>
where
    S: ConfigSource + Send + 'static,
{
    let config = tokio::task::spawn_blocking(move || {
        modelgrab_core::resolve_run_config(&source, &settings)
    })
    .await??;
    Ok(config)
}

/// Run `task`, stopping early with a notice on Ctrl-C.
///
/// A file being written when the interrupt arrives is left as is.
async fn until_interrupted<F>(task: F) -> Result<()>
where
    F: Future<Output = Result<()>>,
{
    tokio::select! {
        // A prompt interrupted mid-read also fails; the notice wins.
        biased;
        _ = tokio::signal::ctrl_c() => {
            output::print_cancelled();
            Ok(())
        }
        result = task => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelgrab_core::FetchError;
    use std::time::Duration;

    struct SlowSource;

    impl ConfigSource for SlowSource {
        fn api_token(&self) -> Result<Option<String>, FetchError> {
            std::thread::sleep(Duration::from_millis(300));
            Ok(Some("t".to_string()))
        }

        fn username(&self) -> Result<String, FetchError> {
            Ok("artist".to_string())
        }

        fn output_dir(&self) -> Result<Option<PathBuf>, FetchError> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_waiting_prompt_leaves_runtime_responsive() {
        let prompts = resolve_blocking(SlowSource, Settings::default());

        tokio::select! {
            biased;
            _ = prompts => panic!("prompt resolution blocked the runtime"),
            _ = tokio::time::sleep(Duration::from_millis(20)) => {}
        }
    }

    #[tokio::test]
    async fn test_resolve_blocking_returns_config() {
        let source = prompt::ArgsSource {
            token: Some("t".to_string()),
            username: "artist".to_string(),
            output: Some(PathBuf::from("models")),
            licenses: vec![],
        };

        let config = resolve_blocking(source, Settings::default()).await.unwrap();
        assert_eq!(config.username, "artist");
        assert_eq!(config.account_dir(), PathBuf::from("models").join("artist"));
    }

    #[tokio::test]
    async fn test_bad_settings_file_surfaces_in_interactive_flow() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = interactive(Some(path)).await.unwrap_err();
        assert!(err.to_string().contains("Serialization error"));
    }
}
