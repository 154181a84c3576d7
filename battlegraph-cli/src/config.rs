/// Settings: the config file overlaid with command-line flags.
///
/// The file lives at ~/.config/battlegraph/config.toml unless `--config`
/// points elsewhere. Every field is optional; a flag given on the command
/// line replaces the file's value, and built-in defaults fill what is left.
use battlegraph_core::ChooserKind;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::bail;

pub const DEFAULT_CHOOSER: ChooserKind = ChooserKind::Random;
pub const DEFAULT_TRIALS: usize = 20;
pub const DEFAULT_CONCURRENCY: usize = 8;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Settings {
    pub chooser: Option<ChooserKind>,
    pub seed: Option<u64>,
    pub trials: Option<usize>,
    pub concurrency: Option<usize>,
}

const TEMPLATE: &str = "\
# battlegraph configuration
# Flags given on the command line replace these values.

# Strategy that picks the next pair to compare:
# random, minimum-degree, max-new-relations, guaranteed-gain,
# winner-oriented, ranking-top-down, bi-section, same-balance
# chooser = \"random\"

# Fixed seed for randomized choosers (omit for a fresh seed every run)
# seed = 42

# Simulation: tournaments played per chooser
# trials = 20

# Simulation: tournaments played in parallel
# concurrency = 8
";

impl Settings {
    /// Read the config file (`explicit`, or the default location) and put
    /// `flags` on top of it.
    pub fn resolve(explicit: Option<&Path>, flags: Settings) -> Settings {
        let file = match explicit {
            Some(path) => Settings::read(path),
            None => Settings::read(&default_path()),
        };
        flags.or(file)
    }

    /// Field-wise `Option::or`: values in `self` win.
    fn or(self, fallback: Settings) -> Settings {
        Settings {
            chooser: self.chooser.or(fallback.chooser),
            seed: self.seed.or(fallback.seed),
            trials: self.trials.or(fallback.trials),
            concurrency: self.concurrency.or(fallback.concurrency),
        }
    }

    /// A missing file is an empty config; an unreadable or malformed one ends
    /// the program.
    fn read(path: &Path) -> Settings {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file");
                return Settings::default();
            }
            Err(e) => bail(format!("Failed to read config at {}: {e}", path.display())),
        };
        toml::from_str(&content).unwrap_or_else(|e| bail(format!("Invalid config at {}: {e}", path.display())))
    }

    pub fn chooser(&self) -> ChooserKind {
        self.chooser.unwrap_or(DEFAULT_CHOOSER)
    }

    pub fn trials(&self) -> usize {
        self.trials.unwrap_or(DEFAULT_TRIALS)
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency.unwrap_or(DEFAULT_CONCURRENCY)
    }
}

fn default_path() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".config/battlegraph/config.toml"),
        None => bail("HOME is not set; pass --config <path>"),
    }
}

/// `battlegraph init`: write the commented template, never overwriting.
pub fn write_template() -> PathBuf {
    let path = default_path();
    if path.exists() {
        bail(format!("{} already exists", path.display()));
    }
    let written = path
        .parent()
        .map_or(Ok(()), std::fs::create_dir_all)
        .and_then(|()| std::fs::write(&path, TEMPLATE));
    if let Err(e) = written {
        bail(format!("Failed to write {}: {e}", path.display()));
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_is_empty_config() {
        let settings: Settings = toml::from_str(TEMPLATE).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.chooser(), DEFAULT_CHOOSER);
        assert_eq!(settings.trials(), DEFAULT_TRIALS);
    }

    #[test]
    fn test_template_lists_every_chooser() {
        for kind in ChooserKind::ALL {
            assert!(TEMPLATE.contains(kind.as_str()), "{kind} missing from template");
        }
    }

    #[test]
    fn test_parse_values() {
        let settings: Settings = toml::from_str("chooser = \"bi-section\"\nseed = 7\ntrials = 3\n").unwrap();
        assert_eq!(settings.chooser, Some(ChooserKind::BiSection));
        assert_eq!(settings.seed, Some(7));
        assert_eq!(settings.trials(), 3);
        assert_eq!(settings.concurrency(), DEFAULT_CONCURRENCY);
    }

    #[test]
    fn test_unknown_chooser_rejected() {
        assert!(toml::from_str::<Settings>("chooser = \"bubble\"").is_err());
    }

    #[test]
    fn test_flags_override_file() {
        let file = Settings { chooser: Some(ChooserKind::SameBalance), seed: Some(1), trials: Some(5), concurrency: None };
        let flags = Settings { seed: Some(9), ..Settings::default() };

        let merged = flags.or(file);
        assert_eq!(merged.chooser(), ChooserKind::SameBalance);
        assert_eq!(merged.seed, Some(9));
        assert_eq!(merged.trials(), 5);
        assert_eq!(merged.concurrency(), DEFAULT_CONCURRENCY);
    }

    #[test]
    fn test_missing_file_keeps_flags() {
        let flags = Settings { chooser: Some(ChooserKind::MinimumDegree), ..Settings::default() };
        let settings = Settings::resolve(Some(Path::new("/nonexistent/battlegraph/config.toml")), flags.clone());
        assert_eq!(settings, flags);
    }
}
