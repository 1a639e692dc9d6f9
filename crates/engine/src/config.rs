use skipper_protocol::{PathMatcher, PatternError, TriggerEvent};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("input required and not supplied: {0}")]
    MissingInput(String),

    #[error("input '{input}' is not a JSON array of strings: '{raw}' ({source})")]
    InvalidStringArray {
        input: String,
        raw: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    InvalidPattern(#[from] PatternError),
}

/// Source of raw string inputs. Boolean and array parsing is shared by every provider.
pub trait ConfigProvider {
    fn get_string(&self, name: &str) -> Option<String>;

    /// Absent or empty input yields `default`. With a `true` default only `false`
    /// disables the flag; with a `false` default only `true` enables it.
    fn get_bool(&self, name: &str, default: bool) -> bool {
        match self.get_string(name) {
            None => default,
            Some(raw) if raw.is_empty() => default,
            Some(raw) if default => !raw.eq_ignore_ascii_case("false"),
            Some(raw) => raw.eq_ignore_ascii_case("true"),
        }
    }

    fn get_string_array(&self, name: &str) -> Result<Vec<String>, ConfigError> {
        let Some(raw) = self.get_string(name).filter(|raw| !raw.is_empty()) else {
            return Ok(Vec::new());
        };
        serde_json::from_str::<Vec<String>>(&raw).map_err(|source| {
            ConfigError::InvalidStringArray {
                input: name.to_string(),
                raw,
                source,
            }
        })
    }
}

/// In-memory provider, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct MapConfig {
    values: HashMap<String, String>,
}

impl MapConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.values.insert(name.to_string(), value.to_string());
        self
    }
}

impl ConfigProvider for MapConfig {
    fn get_string(&self, name: &str) -> Option<String> {
        self.values.get(name).map(|value| value.trim().to_string())
    }
}

/// Validated inputs for one invocation.
#[derive(Clone)]
pub struct Settings {
    pub github_token: String,
    pub do_not_skip: Vec<TriggerEvent>,
    pub cancel_others: bool,
    pub concurrent_skipping: bool,
    pub path_matcher: PathMatcher,
}

impl Settings {
    pub fn load(provider: &dyn ConfigProvider) -> Result<Self, ConfigError> {
        let github_token = provider
            .get_string("github_token")
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ConfigError::MissingInput("github_token".to_string()))?;
        let paths_ignore = provider.get_string_array("paths_ignore")?;
        let paths = provider.get_string_array("paths")?;
        let do_not_skip = provider
            .get_string_array("do_not_skip")?
            .into_iter()
            .map(TriggerEvent::from)
            .collect();
        let path_matcher = PathMatcher::new(&paths, &paths_ignore)?;

        Ok(Self {
            github_token,
            do_not_skip,
            cancel_others: provider.get_bool("cancel_others", true),
            concurrent_skipping: provider.get_bool("concurrent_skipping", true),
            path_matcher,
        })
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("github_token", &"***")
            .field("paths_ignore", &self.path_matcher.exclude_patterns())
            .field("paths", &self.path_matcher.include_patterns())
            .field("do_not_skip", &self.do_not_skip)
            .field("cancel_others", &self.cancel_others)
            .field("concurrent_skipping", &self.concurrent_skipping)
            .finish()
    }
}
