use std::path::PathBuf;

const STORE_ENV_VAR: &str = "CALENDAR_STORE";
const DEFAULT_STORE_FILE: &str = "calendar-events.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub store_path: PathBuf,
}

impl Config {
    /// Resolve settings from the command line, then the environment, then defaults
    pub fn resolve(store_override: Option<PathBuf>) -> Self {
        let store_path = store_override
            .or_else(|| std::env::var_os(STORE_ENV_VAR).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_FILE));

        tracing::debug!("Using event store at {}", store_path.display());
        Self { store_path }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins() {
        let config = Config::resolve(Some(PathBuf::from("/tmp/events.json")));
        assert_eq!(config.store_path, PathBuf::from("/tmp/events.json"));
    }
}
