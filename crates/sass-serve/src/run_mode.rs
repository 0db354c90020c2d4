//! Production vs. development run mode.

/// Environment variable selecting the run mode
pub const RUN_MODE_ENV: &str = "SASS_SERVE_ENV";

/// Run mode, read once from [`RUN_MODE_ENV`].
///
/// Production switches on compressed output and public cache headers, and
/// turns off embedded source maps unless explicitly requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    Production,
    #[default]
    Development,
}

impl RunMode {
    /// Read the run mode from the environment. Anything other than
    /// `production` is development.
    pub fn from_env() -> Self {
        Self::from_value(std::env::var(RUN_MODE_ENV).ok().as_deref())
    }

    fn from_value(value: Option<&str>) -> Self {
        match value {
            Some("production") => RunMode::Production,
            _ => RunMode::Development,
        }
    }

    pub fn is_production(self) -> bool {
        self == RunMode::Production
    }
}
