use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;

use crate::error::Result;
use crate::gesture::DEFAULT_LONG_PRESS;

const APP_DIR: &str = "anota";

#[derive(Parser, Debug)]
#[command(name = "anota")]
#[command(about = "Browse, add and delete notes from the terminal")]
#[command(version)]
pub struct Cli {
    /// Path to the note database (defaults to $ANOTA_DB_PATH, then the data dir)
    #[arg(long, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Where log lines are written
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// How long a press must be held to count as a long-press
    #[arg(long, value_name = "MS", default_value_t = 500)]
    pub long_press_ms: u64,

    /// Redraw interval while idle
    #[arg(long, value_name = "MS", default_value_t = 50)]
    pub tick_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub log_file: PathBuf,
    pub long_press_timeout: Duration,
    pub tick_rate: Duration,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Self {
        Self {
            db_path: resolve_db_path(cli.db_path),
            log_file: cli
                .log_file
                .unwrap_or_else(|| data_dir().join("anota.log")),
            long_press_timeout: Duration::from_millis(cli.long_press_ms),
            tick_rate: Duration::from_millis(cli.tick_ms.max(1)),
        }
    }

    /// Creates the parent directories of the database and the log file.
    pub fn ensure_dirs(&self) -> Result<()> {
        for path in [&self.db_path, &self.log_file] {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: data_dir().join("notes.db"),
            log_file: data_dir().join("anota.log"),
            long_press_timeout: DEFAULT_LONG_PRESS,
            tick_rate: Duration::from_millis(50),
        }
    }
}

fn resolve_db_path(cli_db_path: Option<PathBuf>) -> PathBuf {
    cli_db_path
        .or_else(|| env::var_os("ANOTA_DB_PATH").map(PathBuf::from))
        .unwrap_or_else(|| data_dir().join("notes.db"))
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| Path::new(".").to_path_buf())
        .join(APP_DIR)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "anota",
            "--db-path",
            "/tmp/n.db",
            "--log-file",
            "/tmp/n.log",
            "--long-press-ms",
            "800",
        ])
        .unwrap();

        let config = Config::from_cli(cli);

        assert_eq!(config.db_path, PathBuf::from("/tmp/n.db"));
        assert_eq!(config.log_file, PathBuf::from("/tmp/n.log"));
        assert_eq!(config.long_press_timeout, Duration::from_millis(800));
        assert_eq!(config.tick_rate, Duration::from_millis(50));
    }

    #[test]
    fn defaults_live_in_the_data_dir() {
        let config = Config::from_cli(Cli::try_parse_from(["anota", "--db-path", "x.db"]).unwrap());

        assert!(config.log_file.ends_with("anota/anota.log"));
        assert_eq!(config.long_press_timeout, DEFAULT_LONG_PRESS);
    }

    #[test]
    fn ensure_dirs_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            db_path: dir.path().join("data/notes.db"),
            log_file: dir.path().join("logs/anota.log"),
            ..Config::default()
        };

        config.ensure_dirs().unwrap();

        assert!(dir.path().join("data").is_dir());
        assert!(dir.path().join("logs").is_dir());
    }

    #[test]
    fn ensure_dirs_reports_io_errors() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let config = Config {
            db_path: blocker.join("notes.db"),
            log_file: dir.path().join("anota.log"),
            ..Config::default()
        };

        assert!(matches!(config.ensure_dirs(), Err(crate::error::Error::Io(_))));
    }
}
