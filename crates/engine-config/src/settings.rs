use crate::{env::EnvManager, error::SettingsError};
use std::{str::FromStr, time::Duration};

pub const DEFAULT_LLM_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_LLM_MODEL: &str = "qwen/qwen3-32b";
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_ROW_CAP: usize = 20_000;

#[derive(Debug, Clone, PartialEq)]
pub struct LlmSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
}

/// Runtime configuration. Required values are checked lazily by the
/// accessors so commands that do not touch a collaborator can run without it.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub database_url: Option<String>,
    pub llm: LlmSettings,
    pub federation_row_cap: usize,
}

impl Settings {
    pub fn from_env(env: &EnvManager) -> Result<Self, SettingsError> {
        let api_key = env
            .get("LLM_API_KEY")
            .or_else(|| env.get("GROQ_API_KEY"))
            .map(String::from);

        let temperature: f32 = parse_or(env, "LLM_TEMPERATURE", 0.0)?;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(invalid("LLM_TEMPERATURE", &temperature.to_string(), "must be within 0..=2"));
        }

        let timeout_secs: u64 = parse_or(env, "LLM_TIMEOUT_SECS", DEFAULT_LLM_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(invalid("LLM_TIMEOUT_SECS", "0", "must be positive"));
        }

        let federation_row_cap: usize = parse_or(env, "FEDERATION_ROW_CAP", DEFAULT_ROW_CAP)?;
        if federation_row_cap == 0 {
            return Err(invalid("FEDERATION_ROW_CAP", "0", "must be positive"));
        }

        Ok(Settings {
            database_url: env.get("DATABASE_URL").map(String::from),
            llm: LlmSettings {
                api_key,
                base_url: env
                    .get("LLM_BASE_URL")
                    .unwrap_or(DEFAULT_LLM_BASE_URL)
                    .to_string(),
                model: env.get("LLM_MODEL").unwrap_or(DEFAULT_LLM_MODEL).to_string(),
                temperature,
                timeout: Duration::from_secs(timeout_secs),
            },
            federation_row_cap,
        })
    }

    pub fn database_url(&self) -> Result<&str, SettingsError> {
        self.database_url
            .as_deref()
            .ok_or_else(|| SettingsError::Missing("DATABASE_URL".into()))
    }

    pub fn llm_api_key(&self) -> Result<&str, SettingsError> {
        self.llm
            .api_key
            .as_deref()
            .ok_or_else(|| SettingsError::Missing("LLM_API_KEY".into()))
    }
}

fn parse_or<T>(env: &EnvManager, name: &str, default: T) -> Result<T, SettingsError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env.get(name) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|e: T::Err| invalid(name, raw, &e.to_string())),
    }
}

fn invalid(name: &str, value: &str, reason: &str) -> SettingsError {
    SettingsError::Invalid {
        name: name.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply() {
        let settings = Settings::from_env(&EnvManager::default()).unwrap();
        assert_eq!(settings.database_url, None);
        assert_eq!(settings.llm.base_url, DEFAULT_LLM_BASE_URL);
        assert_eq!(settings.llm.model, "qwen/qwen3-32b");
        assert_eq!(settings.llm.temperature, 0.0);
        assert_eq!(settings.llm.timeout, Duration::from_secs(120));
        assert_eq!(settings.federation_row_cap, 20_000);
        assert!(matches!(settings.database_url(), Err(SettingsError::Missing(_))));
        assert!(settings.llm_api_key().is_err());
    }

    #[test]
    fn reads_overrides() {
        let env = EnvManager::from_pairs([
            ("DATABASE_URL", "postgres://app@db/health?sslmode=require"),
            ("GROQ_API_KEY", "gsk_test"),
            ("LLM_MODEL", "llama-3.3-70b"),
            ("LLM_TIMEOUT_SECS", "30"),
            ("FEDERATION_ROW_CAP", "500"),
        ]);
        let settings = Settings::from_env(&env).unwrap();
        assert_eq!(settings.database_url().unwrap(), "postgres://app@db/health?sslmode=require");
        assert_eq!(settings.llm_api_key().unwrap(), "gsk_test");
        assert_eq!(settings.llm.model, "llama-3.3-70b");
        assert_eq!(settings.llm.timeout, Duration::from_secs(30));
        assert_eq!(settings.federation_row_cap, 500);
    }

    #[test]
    fn llm_api_key_takes_precedence() {
        let env = EnvManager::from_pairs([("GROQ_API_KEY", "old"), ("LLM_API_KEY", "new")]);
        assert_eq!(Settings::from_env(&env).unwrap().llm_api_key().unwrap(), "new");
    }

    #[test]
    fn rejects_invalid_numbers() {
        for (name, value) in [
            ("FEDERATION_ROW_CAP", "lots"),
            ("FEDERATION_ROW_CAP", "0"),
            ("LLM_TIMEOUT_SECS", "-1"),
            ("LLM_TEMPERATURE", "hot"),
            ("LLM_TEMPERATURE", "3.5"),
        ] {
            let env = EnvManager::from_pairs([(name, value)]);
            assert!(
                matches!(Settings::from_env(&env), Err(SettingsError::Invalid { .. })),
                "{name}={value}"
            );
        }
    }
}
