//! # Service Configuration
//!
//! Command-line flags with environment fallbacks, converted into
//! [`AppConfig`] (HTTP) and [`ServiceConfig`] (validator).

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use mmdv_core::renderer::{DEFAULT_PROGRAM, DEFAULT_PUPPETEER_CONFIG};
use mmdv_core::{RendererConfig, ScratchDir, ServiceConfig};

use crate::state::{AppConfig, DEFAULT_BODY_LIMIT_BYTES, DEFAULT_PORT};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per event.
    Json,
}

/// Mermaid validation service.
///
/// Accepts diagram sources on `POST /validate`, renders them with the
/// Mermaid CLI, and reports whether rendering succeeded.
#[derive(Parser, Debug, Clone)]
#[command(name = "mmdv-api", version, about)]
pub struct ServeArgs {
    /// Interface to bind.
    #[arg(long, env = "MMDV_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to bind.
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Mermaid CLI executable.
    #[arg(long, env = "MMDC_PATH", default_value = DEFAULT_PROGRAM)]
    pub mmdc: PathBuf,

    /// Puppeteer configuration file passed to the Mermaid CLI.
    #[arg(long, env = "PUPPETEER_CONFIG", default_value = DEFAULT_PUPPETEER_CONFIG)]
    pub puppeteer_config: PathBuf,

    /// Scratch directory [default: <system temp>/mermaid-validation].
    #[arg(long, env = "SCRATCH_DIR")]
    pub scratch_dir: Option<PathBuf>,

    /// Seconds a render may run before it is killed.
    #[arg(long, env = "RENDER_TIMEOUT_SECS", default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: u64,

    /// Maximum simultaneous renders; unlimited when unset.
    #[arg(long, env = "MAX_CONCURRENT_RENDERS", value_parser = clap::value_parser!(u64).range(1..))]
    pub max_concurrent_renders: Option<u64>,

    /// Maximum request body size in bytes.
    #[arg(long, env = "BODY_LIMIT_BYTES", default_value_t = DEFAULT_BODY_LIMIT_BYTES)]
    pub body_limit_bytes: usize,

    /// Install the Prometheus recorder and serve `/metrics`.
    #[arg(long, env = "MMDV_METRICS_ENABLED", default_value_t = true, action = clap::ArgAction::Set)]
    pub metrics: bool,

    /// Log output format.
    #[arg(long, env = "MMDV_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl ServeArgs {
    /// HTTP-level configuration.
    pub fn app_config(&self) -> AppConfig {
        AppConfig {
            host: self.host,
            port: self.port,
            body_limit_bytes: self.body_limit_bytes,
        }
    }

    /// Validator configuration.
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            renderer: RendererConfig {
                program: self.mmdc.clone(),
                puppeteer_config: self.puppeteer_config.clone(),
                timeout: Duration::from_secs(self.timeout_secs),
            },
            scratch_dir: self
                .scratch_dir
                .clone()
                .map(ScratchDir::new)
                .unwrap_or_default(),
            max_concurrent_renders: self.max_concurrent_renders.map(|n| n as usize),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_deployment() {
        let args = ServeArgs::try_parse_from(["mmdv-api"]).unwrap();
        let app = args.app_config();
        assert_eq!(app, AppConfig::default());

        let service = args.service_config();
        assert_eq!(service.renderer, RendererConfig::default());
        assert_eq!(service.renderer.timeout, Duration::from_secs(10));
        assert_eq!(service.scratch_dir, ScratchDir::default());
        assert_eq!(service.max_concurrent_renders, None);
        assert!(args.metrics);
        assert_eq!(args.log_format, LogFormat::Text);
    }

    #[test]
    fn flags_override_defaults() {
        let args = ServeArgs::try_parse_from([
            "mmdv-api",
            "--port",
            "9000",
            "--mmdc",
            "/usr/local/bin/mmdc",
            "--scratch-dir",
            "/var/tmp/mmdv",
            "--timeout-secs",
            "3",
            "--max-concurrent-renders",
            "4",
            "--metrics",
            "false",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(args.app_config().port, 9000);
        assert!(!args.metrics);
        assert_eq!(args.log_format, LogFormat::Json);

        let service = args.service_config();
        assert_eq!(service.renderer.program, PathBuf::from("/usr/local/bin/mmdc"));
        assert_eq!(service.renderer.timeout, Duration::from_secs(3));
        assert_eq!(service.scratch_dir.path(), std::path::Path::new("/var/tmp/mmdv"));
        assert_eq!(service.max_concurrent_renders, Some(4));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        assert!(ServeArgs::try_parse_from(["mmdv-api", "--timeout-secs", "0"]).is_err());
    }
}
