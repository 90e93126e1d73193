use anyhow::{bail, Context};
use gnmi_set_core::{Code, DeleteMode, HandlerConfig};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines on stderr.
    #[default]
    Text,
    /// One JSON object per event on stderr.
    Json,
}

impl LogFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub format: LogFormat,
    /// `EnvFilter` directives; `RUST_LOG` wins when set.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            filter: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub handler: HandlerConfig,
    pub log: LogConfig,
    /// YAML file with entries to load into the cache at startup.
    pub seed: Option<PathBuf>,
}

impl ServerConfig {
    /// Load from `path`, or start from defaults when no file is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_yaml_str(&raw).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_yaml_str(raw: &str) -> anyhow::Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Apply `GNMI_SET_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> anyhow::Result<()> {
        self.apply_overrides(|name| env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable source.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("GNMI_SET_DELETE_MODE") {
            self.handler.delete_mode = DeleteMode::parse(&v)
                .with_context(|| format!("GNMI_SET_DELETE_MODE: unknown mode '{v}'"))?;
        }

        if let Some(v) = lookup("GNMI_SET_VALIDATION_CODE") {
            self.handler.validation_failure_code = parse_code(&v)
                .with_context(|| format!("GNMI_SET_VALIDATION_CODE: unknown code '{v}'"))?;
        }

        if let Some(v) = lookup("GNMI_SET_STRICT_ORIGIN") {
            self.handler.strict_origin = match v.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => bail!("GNMI_SET_STRICT_ORIGIN: expected a boolean, got '{v}'"),
            };
        }

        if let Some(v) = lookup("GNMI_SET_LOG_FORMAT") {
            self.log.format = LogFormat::parse(&v)
                .with_context(|| format!("GNMI_SET_LOG_FORMAT: unknown format '{v}'"))?;
        }

        if let Some(v) = lookup("GNMI_SET_SEED") {
            if !v.trim().is_empty() {
                self.seed = Some(PathBuf::from(v));
            }
        }

        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.handler
            .validate()
            .map_err(|msg| anyhow::anyhow!("handler config: {msg}"))
    }
}

fn parse_code(s: &str) -> Option<Code> {
    let normalized = s.trim().to_lowercase().replace('-', "_");
    serde_json::from_value(serde_json::Value::String(normalized)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn missing_file_means_defaults() {
        let cfg = ServerConfig::load(None).unwrap();
        assert_eq!(cfg, ServerConfig::default());
        assert_eq!(cfg.handler.delete_mode, DeleteMode::Unimplemented);
        assert_eq!(cfg.log.filter, "info");
    }

    #[test]
    fn loads_partial_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "handler:\n  validation_failure_code: invalid_argument\nlog:\n  format: json\nseed: /tmp/seed.yaml"
        )
        .unwrap();

        let cfg = ServerConfig::load(Some(file.path())).unwrap();
        assert_eq!(cfg.handler.validation_failure_code, Code::InvalidArgument);
        assert!(cfg.handler.strict_origin);
        assert_eq!(cfg.handler.max_operations, 64);
        assert_eq!(cfg.log.format, LogFormat::Json);
        assert_eq!(cfg.log.filter, "info");
        assert_eq!(cfg.seed, Some(PathBuf::from("/tmp/seed.yaml")));
    }

    #[test]
    fn unreadable_file_names_the_path() {
        let err = ServerConfig::load(Some(Path::new("/nonexistent/gnmi.yaml"))).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/gnmi.yaml"));
    }

    #[test]
    fn env_overrides_file_values() {
        let mut cfg = ServerConfig::from_yaml_str("handler:\n  strict_origin: true\n").unwrap();
        cfg.apply_overrides(vars(&[
            ("GNMI_SET_DELETE_MODE", "mark-dirty"),
            ("GNMI_SET_VALIDATION_CODE", "INVALID_ARGUMENT"),
            ("GNMI_SET_STRICT_ORIGIN", "off"),
            ("GNMI_SET_LOG_FORMAT", "json"),
            ("GNMI_SET_SEED", "seed.yaml"),
        ]))
        .unwrap();

        assert_eq!(cfg.handler.delete_mode, DeleteMode::MarkDirty);
        assert_eq!(cfg.handler.validation_failure_code, Code::InvalidArgument);
        assert!(!cfg.handler.strict_origin);
        assert_eq!(cfg.log.format, LogFormat::Json);
        assert_eq!(cfg.seed, Some(PathBuf::from("seed.yaml")));
    }

    #[test]
    fn bad_env_values_are_errors() {
        for (name, value) in [
            ("GNMI_SET_DELETE_MODE", "sometimes"),
            ("GNMI_SET_VALIDATION_CODE", "teapot"),
            ("GNMI_SET_STRICT_ORIGIN", "maybe"),
            ("GNMI_SET_LOG_FORMAT", "xml"),
        ] {
            let mut cfg = ServerConfig::default();
            let err = cfg.apply_overrides(vars(&[(name, value)])).unwrap_err();
            assert!(err.to_string().contains(name), "{err}");
        }
    }

    #[test]
    fn validate_rejects_non_error_code() {
        let mut cfg = ServerConfig::default();
        cfg.handler.validation_failure_code = Code::Ok;
        assert!(cfg.validate().is_err());
    }
}
