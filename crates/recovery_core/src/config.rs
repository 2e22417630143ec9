use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Top-level config
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CoachConfig {
    pub llm: LlmConfig,
    pub storage: StorageConfig,
    pub reminders: ReminderConfig,
    pub coach: SessionConfig,
}

impl CoachConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    /// After loading, env var overrides are applied.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let mut config: CoachConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML config")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Try to load from path; if file doesn't exist, return defaults with env overrides.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::info!("Config file not found or invalid ({}), using defaults", e);
                let mut cfg = Self::default();
                cfg.apply_env_overrides();
                cfg
            }
        }
    }

    /// Apply environment variable overrides on top of file-based config.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("LLM_PROVIDER") {
            self.llm.provider = v;
        }
        if let Ok(v) = std::env::var("LLM_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("LLM_BASE_URL") {
            self.llm.base_url = Some(v);
        }
        if let Ok(v) = std::env::var("LLM_MAX_TOKENS") {
            if let Ok(n) = v.parse() {
                self.llm.max_tokens = n;
            }
        }
        if let Ok(v) = std::env::var("LLM_TEMPERATURE") {
            if let Ok(n) = v.parse() {
                self.llm.temperature = n;
            }
        }
        if let Ok(v) = std::env::var("RECOVERY_DB_PATH") {
            self.storage.db_path = v;
        }
        if let Ok(v) = std::env::var("REMINDER_TICK_SECS") {
            if let Ok(n) = v.parse() {
                self.reminders.tick_interval_secs = n;
            }
        }
    }
}

// ============================================================================
// Sub-configs
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// `gemini`, `openai` or `mock`
    pub provider: String,
    pub model: String,
    pub base_url: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-2.5-flash".to_string(),
            base_url: None,
            max_tokens: 1024,
            temperature: 0.7,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: "recovery.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReminderConfig {
    pub enabled: bool,
    pub tick_interval_secs: u64,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tick_interval_secs: 300,
        }
    }
}

impl ReminderConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs.max(1))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Delay before the first-run welcome turn is seeded.
    pub welcome_delay_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            welcome_delay_ms: 1000,
        }
    }
}

impl SessionConfig {
    pub fn welcome_delay(&self) -> Duration {
        Duration::from_millis(self.welcome_delay_ms)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = CoachConfig::default();
        assert_eq!(cfg.llm.provider, "gemini");
        assert_eq!(cfg.llm.model, "gemini-2.5-flash");
        assert!((cfg.llm.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(cfg.storage.db_path, "recovery.db");
        assert!(cfg.reminders.enabled);
        assert_eq!(cfg.reminders.tick_interval(), Duration::from_secs(300));
        assert_eq!(cfg.coach.welcome_delay(), Duration::from_secs(1));
    }

    #[test]
    fn test_parse_minimal_toml() {
        let toml_str = r#"
[llm]
provider = "openai"
model = "gpt-4o-mini"
"#;
        let cfg: CoachConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.llm.provider, "openai");
        assert_eq!(cfg.llm.model, "gpt-4o-mini");
        // Defaults for unspecified fields
        assert_eq!(cfg.llm.max_tokens, 1024);
        assert_eq!(cfg.storage.db_path, "recovery.db");
    }

    #[test]
    fn test_parse_full_toml() {
        let toml_str = r#"
[llm]
provider = "gemini"
model = "gemini-2.5-pro"
base_url = "http://localhost:8080"
max_tokens = 2048
temperature = 0.4

[storage]
db_path = "data/coach.db"

[reminders]
enabled = false
tick_interval_secs = 60

[coach]
welcome_delay_ms = 0
"#;
        let cfg: CoachConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.llm.model, "gemini-2.5-pro");
        assert_eq!(cfg.llm.base_url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(cfg.llm.max_tokens, 2048);
        assert_eq!(cfg.storage.db_path, "data/coach.db");
        assert!(!cfg.reminders.enabled);
        assert_eq!(cfg.reminders.tick_interval_secs, 60);
        assert_eq!(cfg.coach.welcome_delay_ms, 0);
    }

    #[test]
    fn test_zero_tick_interval_is_clamped() {
        let cfg = ReminderConfig {
            enabled: true,
            tick_interval_secs: 0,
        };
        assert_eq!(cfg.tick_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_env_overrides_and_defaults() {
        // Part 1: env overrides
        std::env::set_var("LLM_MODEL", "gemini-2.0-flash");
        std::env::set_var("REMINDER_TICK_SECS", "30");

        let mut cfg = CoachConfig::default();
        cfg.apply_env_overrides();

        assert_eq!(cfg.llm.model, "gemini-2.0-flash");
        assert_eq!(cfg.reminders.tick_interval_secs, 30);

        // Clean up env vars before testing defaults
        std::env::remove_var("LLM_MODEL");
        std::env::remove_var("REMINDER_TICK_SECS");

        // Part 2: nonexistent path returns defaults (no env interference)
        let cfg = CoachConfig::load_or_default("/nonexistent/path.toml");
        assert_eq!(cfg.llm.model, "gemini-2.5-flash");
    }
}
