use std::net::SocketAddr;
use std::time::Duration;

/// Server configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    /// How long a jury decision stays on the displays.
    pub jury_decision_display: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let listen_addr = lookup("LIFTCAST_LISTEN_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8080".to_string())
            .parse()
            .map_err(|_| {
                ConfigError::Invalid("LIFTCAST_LISTEN_ADDR", "must be a valid socket address")
            })?;

        let jury_ms = lookup("LIFTCAST_JURY_DECISION_MS")
            .unwrap_or_else(|| "3000".to_string())
            .parse::<u64>()
            .map_err(|_| {
                ConfigError::Invalid(
                    "LIFTCAST_JURY_DECISION_MS",
                    "must be a whole number of milliseconds",
                )
            })?;

        Ok(Config {
            listen_addr,
            jury_decision_display: Duration::from_millis(jury_ms),
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Invalid(&'static str, &'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Invalid(var, msg) => write!(f, "Invalid value for {}: {}", var, msg),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.listen_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.jury_decision_display, Duration::from_millis(3000));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("LIFTCAST_LISTEN_ADDR", "127.0.0.1:9000"),
            ("LIFTCAST_JURY_DECISION_MS", "1500"),
        ])
        .unwrap();
        assert_eq!(config.listen_addr.port(), 9000);
        assert_eq!(config.jury_decision_display, Duration::from_millis(1500));
    }

    #[test]
    fn test_invalid_values() {
        let err = load(&[("LIFTCAST_LISTEN_ADDR", "nowhere")]).unwrap_err();
        assert!(err.to_string().contains("LIFTCAST_LISTEN_ADDR"));

        let err = load(&[("LIFTCAST_JURY_DECISION_MS", "-5")]).unwrap_err();
        assert!(err.to_string().contains("LIFTCAST_JURY_DECISION_MS"));
    }
}
