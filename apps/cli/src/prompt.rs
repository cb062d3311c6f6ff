//! Sources of run configuration: command-line arguments or terminal prompts

use console::style;
use dialoguer::{Input, Password};
use modelgrab_core::{ConfigSource, FetchError};
use modelgrab_types::Settings;
use std::path::PathBuf;

/// Run inputs already collected by clap (flags and environment)
pub struct ArgsSource {
    pub token: Option<String>,
    pub username: String,
    pub output: Option<PathBuf>,
    pub licenses: Vec<String>,
}

impl ConfigSource for ArgsSource {
    fn api_token(&self) -> Result<Option<String>, FetchError> {
        Ok(self.token.clone())
    }

    fn username(&self) -> Result<String, FetchError> {
        Ok(self.username.clone())
    }

    fn output_dir(&self) -> Result<Option<PathBuf>, FetchError> {
        Ok(self.output.clone())
    }

    fn licenses(&self) -> Result<Option<Vec<String>>, FetchError> {
        if self.licenses.is_empty() {
            Ok(None)
        } else {
            Ok(Some(self.licenses.clone()))
        }
    }
}

/// Asks for each input on the terminal.
///
/// The license filter is not prompted for; the settings default applies.
pub struct PromptSource {
    default_output: PathBuf,
}

impl PromptSource {
    pub fn new(settings: &Settings) -> Self {
        Self {
            default_output: settings.default_output_dir.clone(),
        }
    }
}

fn prompt_error(e: dialoguer::Error) -> FetchError {
    FetchError::Config(format!("could not read input: {}", e))
}

impl ConfigSource for PromptSource {
    fn api_token(&self) -> Result<Option<String>, FetchError> {
        println!("To download models, you need an API token.");
        println!(
            "Get yours at: {}",
            style("https://sketchfab.com/settings/password").cyan()
        );
        println!();

        let token = Password::new()
            .with_prompt("Enter your API token")
            .allow_empty_password(true)
            .interact()
            .map_err(prompt_error)?;

        Ok(Some(token))
    }

    fn username(&self) -> Result<String, FetchError> {
        Input::<String>::new()
            .with_prompt("Enter username")
            .allow_empty(true)
            .interact_text()
            .map_err(prompt_error)
    }

    fn output_dir(&self) -> Result<Option<PathBuf>, FetchError> {
        let dir = Input::<String>::new()
            .with_prompt(format!(
                "Enter output directory (default: {})",
                self.default_output.display()
            ))
            .allow_empty(true)
            .interact_text()
            .map_err(prompt_error)?;

        let dir = dir.trim();
        Ok((!dir.is_empty()).then(|| PathBuf::from(dir)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelgrab_core::{resolve_run_config, LicenseFilter};

    #[test]
    fn test_args_source_without_token_is_rejected() {
        let source = ArgsSource {
            token: None,
            username: "artist".to_string(),
            output: None,
            licenses: vec![],
        };
        let err = resolve_run_config(&source, &Settings::default()).unwrap_err();
        assert!(matches!(err, FetchError::Config(_)));
    }

    #[test]
    fn test_args_source_licenses_fall_back_to_settings() {
        let settings = Settings {
            licenses: vec!["cc0".to_string()],
            ..Default::default()
        };
        let source = ArgsSource {
            token: Some("t".to_string()),
            username: "artist".to_string(),
            output: Some(PathBuf::from("models")),
            licenses: vec![],
        };

        let config = resolve_run_config(&source, &settings).unwrap();
        assert_eq!(config.licenses, LicenseFilter::new(["cc0"]));
        assert_eq!(config.account_dir(), PathBuf::from("models").join("artist"));
    }

    #[test]
    fn test_args_source_explicit_licenses() {
        let source = ArgsSource {
            token: Some("t".to_string()),
            username: "artist".to_string(),
            output: None,
            licenses: vec!["BY".to_string(), "Standard".to_string()],
        };

        let config = resolve_run_config(&source, &Settings::default()).unwrap();
        assert_eq!(config.licenses.to_string(), "BY, STANDARD");
    }
}
