//! Board configuration, read once from the environment at startup.

use std::path::PathBuf;
use std::time::Duration;

use crate::board::{BoardLayout, InvalidLayout};
use crate::domain::{ARCHWAY_BUS_STOP, RouteConfig};
use crate::scheduler::DEFAULT_REFRESH_PERIOD;
use crate::tfl::{Credentials, TflConfig};

/// Default log file, relative to the working directory.
const DEFAULT_LOG_FILE: &str = "departure-board.log";

/// Errors in the startup configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// `BOARD_LAYOUT` is not a known layout
    #[error("BOARD_LAYOUT: {0}")]
    Layout(#[from] InvalidLayout),

    /// `BOARD_REFRESH_SECS` is not a positive integer
    #[error("BOARD_REFRESH_SECS must be a positive number of seconds, got {0:?}")]
    RefreshPeriod(String),
}

/// Everything the board needs to run.
#[derive(Debug, Clone)]
pub struct BoardConfig {
    /// HTTP client settings
    pub tfl: TflConfig,
    /// Routes in display order; the first starts active
    pub routes: Vec<RouteConfig>,
    /// How routes share the screen
    pub layout: BoardLayout,
    /// Time between refreshes
    pub refresh_period: Duration,
    /// Serve arrivals from this directory instead of the network
    pub mock_dir: Option<PathBuf>,
    /// Where tracing output goes
    pub log_file: PathBuf,
}

impl BoardConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to
    /// its value. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let credentials = Credentials::from_parts(var("TFL_APP_ID"), var("TFL_APP_KEY"));

        let mut tfl = TflConfig::new().with_credentials(credentials);
        if let Some(url) = var("BOARD_API_BASE_URL") {
            tfl = tfl.with_base_url(url);
        }

        let layout = match var("BOARD_LAYOUT") {
            Some(value) => value.parse()?,
            None => BoardLayout::default(),
        };

        let refresh_period = match var("BOARD_REFRESH_SECS") {
            Some(value) => parse_period(&value)?,
            None => DEFAULT_REFRESH_PERIOD,
        };

        let bus_stop = var("BOARD_BUS_STOP_ID").unwrap_or_else(|| ARCHWAY_BUS_STOP.to_string());

        Ok(Self {
            tfl,
            routes: vec![
                RouteConfig::archway_northern(),
                RouteConfig::archway_bus_41(bus_stop.trim()),
            ],
            layout,
            refresh_period,
            mock_dir: var("BOARD_MOCK_DIR").map(PathBuf::from),
            log_file: var("BOARD_LOG_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
        })
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            tfl: TflConfig::default(),
            routes: vec![
                RouteConfig::archway_northern(),
                RouteConfig::archway_bus_41(ARCHWAY_BUS_STOP),
            ],
            layout: BoardLayout::default(),
            refresh_period: DEFAULT_REFRESH_PERIOD,
            mock_dir: None,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

fn parse_period(value: &str) -> Result<Duration, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::RefreshPeriod(value.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::tfl::DEFAULT_BASE_URL;

    fn config_from(vars: &[(&str, &str)]) -> Result<BoardConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        BoardConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_with_empty_environment() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.tfl.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.tfl.timeout_secs, 10);
        assert!(config.tfl.credentials.is_none());
        assert_eq!(config.layout, BoardLayout::Toggle);
        assert_eq!(config.refresh_period, Duration::from_secs(15));
        assert_eq!(config.routes.len(), 2);
        assert_eq!(config.routes[0].line_id, "northern");
        assert_eq!(config.routes[1].stop_id, ARCHWAY_BUS_STOP);
        assert!(config.mock_dir.is_none());
        assert_eq!(config.log_file, PathBuf::from("departure-board.log"));
    }

    #[test]
    fn default_matches_empty_environment() {
        let from_env = config_from(&[]).unwrap();
        let default = BoardConfig::default();

        assert_eq!(from_env.routes, default.routes);
        assert_eq!(from_env.layout, default.layout);
        assert_eq!(from_env.refresh_period, default.refresh_period);
    }

    #[test]
    fn credentials_need_both_variables() {
        let config = config_from(&[("TFL_APP_ID", "abc")]).unwrap();
        assert!(config.tfl.credentials.is_none());

        let config = config_from(&[("TFL_APP_ID", "abc"), ("TFL_APP_KEY", "")]).unwrap();
        assert!(config.tfl.credentials.is_none());

        let config = config_from(&[("TFL_APP_ID", "abc"), ("TFL_APP_KEY", "def")]).unwrap();
        let credentials = config.tfl.credentials.unwrap();
        assert_eq!(credentials.app_id, "abc");
        assert_eq!(credentials.app_key, "def");
    }

    #[test]
    fn overrides() {
        let config = config_from(&[
            ("BOARD_LAYOUT", "split"),
            ("BOARD_REFRESH_SECS", "30"),
            ("BOARD_API_BASE_URL", "http://localhost:9000"),
            ("BOARD_BUS_STOP_ID", " 490000000X "),
            ("BOARD_MOCK_DIR", "mock"),
            ("BOARD_LOG_FILE", "/tmp/board.log"),
        ])
        .unwrap();

        assert_eq!(config.layout, BoardLayout::Split);
        assert_eq!(config.refresh_period, Duration::from_secs(30));
        assert_eq!(config.tfl.base_url, "http://localhost:9000");
        assert_eq!(config.routes[1].stop_id, "490000000X");
        assert_eq!(config.mock_dir, Some(PathBuf::from("mock")));
        assert_eq!(config.log_file, PathBuf::from("/tmp/board.log"));
    }

    #[test]
    fn invalid_layout_is_rejected() {
        let err = config_from(&[("BOARD_LAYOUT", "sideways")]).unwrap_err();
        assert!(matches!(err, ConfigError::Layout(_)));
        assert!(err.to_string().contains("sideways"));
    }

    #[test]
    fn invalid_refresh_period_is_rejected() {
        for bad in ["0", "-5", "soon"] {
            let err = config_from(&[("BOARD_REFRESH_SECS", bad)]).unwrap_err();
            assert_eq!(err, ConfigError::RefreshPeriod(bad.to_string()));
        }
    }
}
