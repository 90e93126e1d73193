use crate::config::{LogFormat, ServerConfig};
use clap::{Parser, ValueEnum};
use gnmi_set_core::DeleteMode;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "gnmi-set-server",
    version,
    about = "Apply gNMI Set/Delete requests to a configuration cache over line-delimited JSON"
)]
pub struct Cli {
    /// YAML config file
    #[arg(long, env = "GNMI_SET_CONFIG")]
    pub config: Option<PathBuf>,

    /// YAML file with cache entries to load at startup
    #[arg(long)]
    pub seed: Option<PathBuf>,

    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,

    /// EnvFilter directives (RUST_LOG takes precedence)
    #[arg(long)]
    pub log_filter: Option<String>,

    #[arg(long, value_enum)]
    pub delete_mode: Option<DeleteModeArg>,
}

/// Command-line spelling of [`DeleteMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DeleteModeArg {
    /// Reject every delete
    Unimplemented,
    /// Validate the removal and mark the entry dirty
    #[value(alias = "mark_dirty")]
    MarkDirty,
}

impl From<DeleteModeArg> for DeleteMode {
    fn from(arg: DeleteModeArg) -> Self {
        match arg {
            DeleteModeArg::Unimplemented => DeleteMode::Unimplemented,
            DeleteModeArg::MarkDirty => DeleteMode::MarkDirty,
        }
    }
}

impl Cli {
    /// File, then environment, then flags.
    pub fn resolve(&self) -> anyhow::Result<ServerConfig> {
        let mut cfg = ServerConfig::load(self.config.as_deref())?;
        cfg.apply_env()?;
        self.apply_flags(&mut cfg);
        cfg.validate()?;
        Ok(cfg)
    }

    fn apply_flags(&self, cfg: &mut ServerConfig) {
        if let Some(seed) = &self.seed {
            cfg.seed = Some(seed.clone());
        }
        if let Some(format) = self.log_format {
            cfg.log.format = format;
        }
        if let Some(filter) = &self.log_filter {
            cfg.log.filter = filter.clone();
        }
        if let Some(mode) = self.delete_mode {
            cfg.handler.delete_mode = mode.into();
        }
    }
}
