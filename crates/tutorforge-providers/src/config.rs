//! Layered configuration (§9C): a `tutorforge.toml` file plus environment
//! variable overrides, reusing the `${VAR}` interpolation and search-path
//! convention the original provider configuration established.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level tutorforge configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TutorforgeConfig {
    #[serde(default)]
    pub llm_api_key: String,
    #[serde(default)]
    pub oracle_base_url: Option<String>,
    #[serde(default)]
    pub oracle_model: Option<String>,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
    #[serde(default)]
    pub allow_runtime_override: bool,
    #[serde(default = "default_sandbox_image")]
    pub sandbox_image: String,
    #[serde(default = "default_wall_clock_timeout_secs")]
    pub wall_clock_timeout_secs: u64,
    #[serde(default = "default_memory_limit_mb")]
    pub memory_limit_mb: u64,
    #[serde(default = "default_cpu_limit")]
    pub cpu_limit: f64,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_max_retries() -> u32 {
    3
}
fn default_retry_delay_secs() -> u64 {
    2
}
fn default_sandbox_image() -> String {
    "tutorforge-sandbox:latest".to_string()
}
fn default_wall_clock_timeout_secs() -> u64 {
    5
}
fn default_memory_limit_mb() -> u64 {
    256
}
fn default_cpu_limit() -> f64 {
    0.5
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

impl Default for TutorforgeConfig {
    fn default() -> Self {
        Self {
            llm_api_key: String::new(),
            oracle_base_url: None,
            oracle_model: None,
            max_retries: default_max_retries(),
            retry_delay_secs: default_retry_delay_secs(),
            allow_runtime_override: false,
            sandbox_image: default_sandbox_image(),
            wall_clock_timeout_secs: default_wall_clock_timeout_secs(),
            memory_limit_mb: default_memory_limit_mb(),
            cpu_limit: default_cpu_limit(),
            data_dir: default_data_dir(),
        }
    }
}

/// Resolves `${VAR}` references in a string against the process environment.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!("{}{}{}", &result[..start], value, &result[start + end + 1..]);
        } else {
            break;
        }
    }
    result
}

fn config_search_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("tutorforge"))
}

/// Loads configuration following the search order: explicit `path`,
/// `tutorforge.toml` in the current directory, then
/// `~/.config/tutorforge/config.toml`. `LLM_API_KEY`/`TUTORFORGE_LLM_API_KEY`
/// override whatever the file set, and `${VAR}` interpolation is applied to
/// the resulting key either way.
pub fn load_config(path: Option<&Path>) -> Result<TutorforgeConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("tutorforge.toml");
        if local.exists() {
            Some(local)
        } else if let Some(dir) = config_search_dir() {
            let global = dir.join("config.toml");
            global.exists().then_some(global)
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<TutorforgeConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => TutorforgeConfig::default(),
    };

    if let Ok(key) = std::env::var("TUTORFORGE_LLM_API_KEY").or_else(|_| std::env::var("LLM_API_KEY")) {
        config.llm_api_key = key;
    }
    config.llm_api_key = resolve_env_vars(&config.llm_api_key);

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_TUTORFORGE_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_TUTORFORGE_TEST_VAR}"), "hello");
        std::env::remove_var("_TUTORFORGE_TEST_VAR");
    }

    #[test]
    fn default_config_matches_documented_defaults() {
        let config = TutorforgeConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_delay_secs, 2);
        assert!(!config.allow_runtime_override);
        assert_eq!(config.sandbox_image, "tutorforge-sandbox:latest");
        assert_eq!(config.wall_clock_timeout_secs, 5);
        assert_eq!(config.memory_limit_mb, 256);
        assert_eq!(config.cpu_limit, 0.5);
    }

    #[test]
    fn parses_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tutorforge.toml");
        std::fs::write(
            &path,
            r#"
llm_api_key = "sk-test"
oracle_base_url = "http://localhost:9999"
max_retries = 5
"#,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.llm_api_key, "sk-test");
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.oracle_base_url.as_deref(), Some("http://localhost:9999"));
    }

    #[test]
    fn env_override_beats_file_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tutorforge.toml");
        std::fs::write(&path, "llm_api_key = \"from-file\"\n").unwrap();

        std::env::set_var("TUTORFORGE_LLM_API_KEY", "from-env");
        let config = load_config(Some(&path)).unwrap();
        std::env::remove_var("TUTORFORGE_LLM_API_KEY");

        assert_eq!(config.llm_api_key, "from-env");
    }
}
