use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::diff::AlignMode;
use crate::git::CommitOrder;
use crate::navigation::LoadLimits;

pub const DEFAULT_HISTORY_LIMIT: usize = 256;
pub const DEFAULT_PAGE_SIZE: usize = 64;

/// Implements `Deserialize` through `FromStr` so config values are case-insensitive.
macro_rules! deserialize_from_str {
    ($ty:ty) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                <$ty>::from_str(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

#[derive(Debug, Clone, Copy, Serialize, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

deserialize_from_str!(Theme);

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            _ => Err(format!("Invalid theme: {s}. Must be 'dark' or 'light'")),
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Theme::Dark => write!(f, "dark"),
            Theme::Light => write!(f, "light"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Default, PartialEq, Eq)]
pub enum DiffMode {
    #[default]
    Inline,
    SideBySide,
}

deserialize_from_str!(DiffMode);

impl FromStr for DiffMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "inline" | "unified" => Ok(DiffMode::Inline),
            "side-by-side" | "side_by_side" | "split" => Ok(DiffMode::SideBySide),
            _ => Err(format!(
                "Invalid diff mode: {s}. Must be 'inline' or 'side-by-side'"
            )),
        }
    }
}

impl From<DiffMode> for AlignMode {
    fn from(mode: DiffMode) -> Self {
        match mode {
            DiffMode::Inline => AlignMode::Inline,
            DiffMode::SideBySide => AlignMode::SideBySide,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Default, PartialEq, Eq)]
pub enum HistoryOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

deserialize_from_str!(HistoryOrder);

impl FromStr for HistoryOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "newest-first" | "newest" => Ok(HistoryOrder::NewestFirst),
            "oldest-first" | "oldest" => Ok(HistoryOrder::OldestFirst),
            _ => Err(format!(
                "Invalid commit order: {s}. Must be 'newest-first' or 'oldest-first'"
            )),
        }
    }
}

impl From<HistoryOrder> for CommitOrder {
    fn from(order: HistoryOrder) -> Self {
        match order {
            HistoryOrder::NewestFirst => CommitOrder::NewestFirst,
            HistoryOrder::OldestFirst => CommitOrder::OldestFirst,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub debug: Option<bool>,
    pub theme: Option<Theme>,
    pub diff_mode: Option<DiffMode>,
    pub commit_order: Option<HistoryOrder>,
    pub history_limit: Option<usize>,
    pub page_size: Option<usize>,
    pub follow_renames: Option<bool>,
}

impl Config {
    pub fn load() -> color_eyre::eyre::Result<Self> {
        Self::load_from(&Self::get_config_path())
    }

    pub fn load_from(config_path: &Path) -> color_eyre::eyre::Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Upper bound on loaded history, at least 1
    pub fn get_history_limit(&self) -> usize {
        self.history_limit.unwrap_or(DEFAULT_HISTORY_LIMIT).max(1)
    }

    /// Commits fetched per load-more, at least 1
    pub fn get_page_size(&self) -> usize {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1)
    }

    pub fn get_follow_renames(&self) -> bool {
        self.follow_renames.unwrap_or(true)
    }

    pub fn get_theme(&self) -> Theme {
        self.theme.unwrap_or_default()
    }

    pub fn get_align_mode(&self) -> AlignMode {
        self.diff_mode.unwrap_or_default().into()
    }

    pub fn get_commit_order(&self) -> CommitOrder {
        self.commit_order.unwrap_or_default().into()
    }

    pub fn get_load_limits(&self) -> LoadLimits {
        LoadLimits {
            page_size: self.get_page_size(),
            max_commits: self.get_history_limit(),
        }
    }

    fn get_config_path() -> PathBuf {
        config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ghist")
            .join("config.json")
    }

    pub fn merge_with_args(&self, args: &Args) -> Self {
        Self {
            debug: if args.debug { Some(true) } else { self.debug },
            theme: args.theme.or(self.theme),
            diff_mode: args.diff_mode.or(self.diff_mode),
            commit_order: args.order.or(self.commit_order),
            history_limit: args.limit.or(self.history_limit),
            page_size: args.page_size.or(self.page_size),
            follow_renames: if args.no_follow {
                Some(false)
            } else {
                self.follow_renames
            },
        }
    }
}

#[derive(Debug, Clone, clap::Parser)]
#[command(name = "ghist", about = "Step through the git history of a file")]
pub struct Args {
    #[arg(help = "File whose history to show (omit for repository-wide history)")]
    pub file: Option<PathBuf>,

    #[arg(short, long, help = "Repository to use when no file is given (default: current directory)")]
    pub repo: Option<PathBuf>,

    #[arg(short = 'n', long, help = "Maximum number of commits to load (default: 256)")]
    pub limit: Option<usize>,

    #[arg(long, help = "Commits fetched each time more history is needed (default: 64)")]
    pub page_size: Option<usize>,

    #[arg(long, help = "History order (newest-first or oldest-first)")]
    pub order: Option<HistoryOrder>,

    #[arg(short = 'm', long, help = "Diff layout (inline or side-by-side)")]
    pub diff_mode: Option<DiffMode>,

    #[arg(long, help = "Theme to use (dark or light)")]
    pub theme: Option<Theme>,

    #[arg(long, help = "Do not follow the file across renames")]
    pub no_follow: bool,

    #[arg(short, long, help = "Enable debug logging")]
    pub debug: bool,

    #[arg(short = 'V', long, help = "Print version information and exit")]
    pub version: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.debug, None);
        assert_eq!(config.theme, None);
        assert_eq!(config.get_history_limit(), 256);
        assert_eq!(config.get_page_size(), 64);
        assert!(config.get_follow_renames());
        assert_eq!(config.get_align_mode(), AlignMode::Inline);
        assert_eq!(config.get_commit_order(), CommitOrder::NewestFirst);
    }

    #[test]
    fn test_merge_with_args() {
        let config = Config {
            debug: Some(false),
            theme: Some(Theme::Light),
            history_limit: Some(500),
            follow_renames: Some(true),
            ..Default::default()
        };

        let args = Args::parse_from([
            "ghist",
            "--debug",
            "--limit",
            "50",
            "--diff-mode",
            "side-by-side",
            "--no-follow",
        ]);

        let merged = config.merge_with_args(&args);

        assert_eq!(merged.debug, Some(true));
        assert_eq!(merged.theme, Some(Theme::Light));
        assert_eq!(merged.history_limit, Some(50));
        assert_eq!(merged.diff_mode, Some(DiffMode::SideBySide));
        assert_eq!(merged.follow_renames, Some(false));
    }

    #[test]
    fn test_merge_with_args_keeps_config_values() {
        let config = Config {
            page_size: Some(10),
            commit_order: Some(HistoryOrder::OldestFirst),
            ..Default::default()
        };

        let merged = config.merge_with_args(&Args::parse_from(["ghist"]));

        assert_eq!(merged.get_page_size(), 10);
        assert_eq!(merged.get_commit_order(), CommitOrder::OldestFirst);
        assert_eq!(merged.follow_renames, None);
    }

    #[test]
    fn test_limits_are_at_least_one() {
        let config = Config {
            history_limit: Some(0),
            page_size: Some(0),
            ..Default::default()
        };
        assert_eq!(
            config.get_load_limits(),
            LoadLimits {
                page_size: 1,
                max_commits: 1
            }
        );
    }

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from([
            "ghist",
            "src/main.rs",
            "--order",
            "oldest-first",
            "--theme",
            "light",
            "--page-size",
            "8",
        ]);

        assert_eq!(args.file, Some(PathBuf::from("src/main.rs")));
        assert_eq!(args.order, Some(HistoryOrder::OldestFirst));
        assert_eq!(args.theme, Some(Theme::Light));
        assert_eq!(args.page_size, Some(8));
        assert!(!args.no_follow);
    }

    #[test]
    fn test_args_parsing_minimal() {
        let args = Args::parse_from(["ghist"]);

        assert!(args.file.is_none());
        assert!(args.repo.is_none());
        assert!(!args.debug);
        assert!(!args.version);
        assert!(args.limit.is_none());
    }

    #[test]
    fn test_args_parsing_invalid_values() {
        assert!(Args::try_parse_from(["ghist", "--theme", "invalid"]).is_err());
        assert!(Args::try_parse_from(["ghist", "--diff-mode", "diagonal"]).is_err());
        assert!(Args::try_parse_from(["ghist", "--order", "random"]).is_err());
    }

    #[test]
    fn test_theme_from_str() {
        assert_eq!(Theme::from_str("dark").unwrap(), Theme::Dark);
        assert_eq!(Theme::from_str("LIGHT").unwrap(), Theme::Light);
        assert!(Theme::from_str("invalid").is_err());
        assert_eq!(Theme::Dark.to_string(), "dark");
    }

    #[test]
    fn test_config_deserialize_case_insensitive() {
        let json = r#"{"theme": "LiGhT", "diff_mode": "Side-By-Side", "commit_order": "OLDEST-FIRST"}"#;
        let config: Config = serde_json::from_str(json).unwrap();

        assert_eq!(config.theme, Some(Theme::Light));
        assert_eq!(config.diff_mode, Some(DiffMode::SideBySide));
        assert_eq!(config.commit_order, Some(HistoryOrder::OldestFirst));
        assert_eq!(config.debug, None);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let missing = Config::load_from(&path).unwrap();
        assert!(missing.history_limit.is_none());

        fs::write(&path, r#"{"history_limit": 32, "follow_renames": false}"#).unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.get_history_limit(), 32);
        assert!(!config.get_follow_renames());

        fs::write(&path, "{ not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
