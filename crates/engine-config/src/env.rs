use crate::error::SettingsError;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Environment variable manager that loads from the process and .env files.
/// Values from a loaded file override the process environment.
#[derive(Debug, Clone, Default)]
pub struct EnvManager {
    vars: HashMap<String, String>,
}

impl EnvManager {
    pub fn new() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Load variables from a .env file
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), SettingsError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| SettingsError::EnvFileRead {
            path: path.to_path_buf(),
            source,
        })?;

        let loaded = self.parse_env_content(&content)?;
        debug!(path = %path.display(), vars = loaded, "Loaded env file");
        Ok(())
    }

    /// Value of `key`, treating empty values as unset.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.vars.insert(key.to_string(), value.to_string());
    }

    pub fn all(&self) -> &HashMap<String, String> {
        &self.vars
    }

    fn parse_env_content(&mut self, content: &str) -> Result<usize, SettingsError> {
        let mut loaded = 0;
        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let line = line.strip_prefix("export ").unwrap_or(line);
            let Some((key, value)) = line.split_once('=') else {
                return Err(SettingsError::EnvFileFormat {
                    line: line_num + 1,
                    reason: "malformed line (expected KEY=VALUE)".into(),
                });
            };

            let key = key.trim();
            if key.is_empty() {
                return Err(SettingsError::EnvFileFormat {
                    line: line_num + 1,
                    reason: "empty key".into(),
                });
            }

            self.vars.insert(key.to_string(), Self::unquote_value(value));
            loaded += 1;
        }

        Ok(loaded)
    }

    fn unquote_value(value: &str) -> String {
        let value = value.trim();

        for quote in ['"', '\''] {
            if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
                return value[1..value.len() - 1].to_string();
            }
        }

        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_basic_env() {
        let mut env = EnvManager::default();
        let content = r#"
# Comment
DATABASE_URL=postgres://localhost/health
export LLM_MODEL=qwen/qwen3-32b
        "#;

        assert_eq!(env.parse_env_content(content).unwrap(), 2);
        assert_eq!(env.get("DATABASE_URL"), Some("postgres://localhost/health"));
        assert_eq!(env.get("LLM_MODEL"), Some("qwen/qwen3-32b"));
    }

    #[test]
    fn test_parse_quoted_values() {
        let mut env = EnvManager::default();
        let content = r#"
QUOTED="value with spaces"
SINGLE='single quoted'
URL=postgres://u:p@h/db?sslmode=require
        "#;

        env.parse_env_content(content).unwrap();
        assert_eq!(env.get("QUOTED"), Some("value with spaces"));
        assert_eq!(env.get("SINGLE"), Some("single quoted"));
        assert_eq!(env.get("URL"), Some("postgres://u:p@h/db?sslmode=require"));
    }

    #[test]
    fn test_invalid_env_format() {
        let mut env = EnvManager::default();
        let err = env
            .parse_env_content("OK=1\nINVALID LINE WITHOUT EQUALS")
            .unwrap_err();
        assert!(matches!(err, SettingsError::EnvFileFormat { line: 2, .. }));
        assert!(env.parse_env_content("=value").is_err());
    }

    #[test]
    fn test_empty_value_is_unset() {
        let env = EnvManager::from_pairs([("LLM_API_KEY", "  ")]);
        assert_eq!(env.get("LLM_API_KEY"), None);
    }

    #[test]
    fn test_file_overrides_process_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "LLM_MODEL=llama-3.1-8b").unwrap();

        let mut env = EnvManager::from_pairs([("LLM_MODEL", "qwen/qwen3-32b")]);
        env.load_from_file(file.path()).unwrap();
        assert_eq!(env.get("LLM_MODEL"), Some("llama-3.1-8b"));
    }

    #[test]
    fn test_missing_file() {
        let mut env = EnvManager::default();
        assert!(matches!(
            env.load_from_file("/nonexistent/.env"),
            Err(SettingsError::EnvFileRead { .. })
        ));
    }
}
