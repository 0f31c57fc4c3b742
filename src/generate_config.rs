use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Select};
use owo_colors::OwoColorize;
use tracing::debug;

use crate::config::get_config_file_candidates;

const EXAMPLE_CONFIG: &str = include_str!("../assets/example_config.toml");

#[derive(thiserror::Error, Debug)]
pub enum GenerateConfigError {
    #[error("Interrupted by user")]
    Interrupted,
    #[error("File already exists. Not overwriting.")]
    AlreadyExist,
    #[error("Config couldn't be saved: {inner}")]
    CannotWriteFile {
        #[from]
        inner: std::io::Error,
    },
    #[error("Failed to obtain info from the user: {inner}")]
    CannotObtainData {
        #[from]
        inner: dialoguer::Error,
    },
}

pub fn generate_config(home_dir: &Path) -> Result<(), GenerateConfigError> {
    let mut interaction = DialoguerInteraction;
    generate_config_inner(&mut io::stdout(), &mut interaction, home_dir)
}

fn generate_config_inner<W: Write, I: GenerateConfigInteraction>(
    out: &mut W,
    interaction: &mut I,
    home_dir: &Path,
) -> Result<(), GenerateConfigError> {
    let candidates = get_config_file_candidates(home_dir);

    let path = interaction.select_path(&candidates)?;
    debug!("Checking the configuration file: {}", path.display());
    if path.exists() && !interaction.confirm_overwrite()? {
        return Err(GenerateConfigError::AlreadyExist);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    debug!("Writing configuration file: {}", path.display());
    fs::write(&path, EXAMPLE_CONFIG)?;

    writeln!(
        out,
        "\n{}",
        "Configuration file was successfully created!".bold()
    )?;
    writeln!(
        out,
        "Set the rclone remote in {} before running the sync command.",
        path.display().green()
    )?;

    Ok(())
}

trait GenerateConfigInteraction {
    fn select_path(&mut self, candidates: &[PathBuf]) -> Result<PathBuf, GenerateConfigError>;
    fn confirm_overwrite(&mut self) -> Result<bool, GenerateConfigError>;
}

struct DialoguerInteraction;

impl GenerateConfigInteraction for DialoguerInteraction {
    fn select_path(&mut self, candidates: &[PathBuf]) -> Result<PathBuf, GenerateConfigError> {
        let candidates_to_display = candidates
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>();

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Where should the configuration file live?")
            .items(&candidates_to_display)
            .default(0)
            .report(true)
            .clear(true)
            .interact_opt()?
            .ok_or(GenerateConfigError::Interrupted)?;

        candidates
            .get(selection)
            .cloned()
            .ok_or(GenerateConfigError::Interrupted)
    }

    fn confirm_overwrite(&mut self) -> Result<bool, GenerateConfigError> {
        let confirmation = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("File already exists. Overwrite?")
            .default(false)
            .show_default(true)
            .report(true)
            .wait_for_newline(false)
            .interact_opt()?
            .ok_or(GenerateConfigError::Interrupted)?;

        Ok(confirmation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, DEFAULT_SYNC_ROOT};

    struct TestsInteraction {
        select: usize,
        confirmation: Option<Result<bool, GenerateConfigError>>,
    }

    impl GenerateConfigInteraction for TestsInteraction {
        fn select_path(&mut self, candidates: &[PathBuf]) -> Result<PathBuf, GenerateConfigError> {
            Ok(candidates.get(self.select).unwrap().clone())
        }

        fn confirm_overwrite(&mut self) -> Result<bool, GenerateConfigError> {
            self.confirmation.take().unwrap()
        }
    }

    fn read_config(path: &Path) -> Result<Config, toml::de::Error> {
        let cfg_data = fs::read_to_string(path).unwrap();
        toml::from_str::<Config>(cfg_data.as_str())
    }

    #[test]
    fn test_example_config_matches_defaults() {
        let config = toml::from_str::<Config>(EXAMPLE_CONFIG).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.sync_root, DEFAULT_SYNC_ROOT);
    }

    #[test]
    fn test_generate_config_creates_config_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let root_path = tmp.path();

        let mut buffer = Vec::new();
        let mut interaction = TestsInteraction {
            select: 0,
            confirmation: None,
        };

        generate_config_inner(&mut buffer, &mut interaction, root_path).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        assert!(output.contains("Configuration file was successfully created!"));
        assert!(output.contains(".config"));
        assert!(read_config(&root_path.join(".config/cloudsaver.toml")).is_ok());
    }

    #[test]
    fn test_generate_config_rewrite_existing() {
        let tmp = tempfile::tempdir().unwrap();
        let root_path = tmp.path();
        fs::write(root_path.join(".cloudsaver.toml"), "Hello, World!").unwrap();

        let mut buffer = Vec::new();
        let mut interaction = TestsInteraction {
            select: 1,
            confirmation: Some(Ok(true)),
        };

        generate_config_inner(&mut buffer, &mut interaction, root_path).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        assert!(output.contains(".cloudsaver.toml"));
        assert!(read_config(&root_path.join(".cloudsaver.toml")).is_ok());
    }

    #[test]
    fn test_generate_config_keep_existing() {
        let tmp = tempfile::tempdir().unwrap();
        let root_path = tmp.path();
        fs::write(root_path.join(".cloudsaver.toml"), "Hello, World!").unwrap();

        let mut buffer = Vec::new();
        let mut interaction = TestsInteraction {
            select: 1,
            confirmation: Some(Ok(false)),
        };

        let results = generate_config_inner(&mut buffer, &mut interaction, root_path);
        assert!(matches!(results, Err(GenerateConfigError::AlreadyExist)));
        assert!(read_config(&root_path.join(".cloudsaver.toml")).is_err());
    }

    #[test]
    fn test_generate_config_can_be_interrupted() {
        let tmp = tempfile::tempdir().unwrap();
        let root_path = tmp.path();
        fs::write(root_path.join(".cloudsaver.toml"), "Hello, World!").unwrap();

        let mut buffer = Vec::new();
        let mut interaction = TestsInteraction {
            select: 1,
            confirmation: Some(Err(GenerateConfigError::Interrupted)),
        };

        let results = generate_config_inner(&mut buffer, &mut interaction, root_path);
        assert!(matches!(results, Err(GenerateConfigError::Interrupted)));
        assert!(read_config(&root_path.join(".cloudsaver.toml")).is_err());
    }
}
