//! CLI argument definitions for the Confidante server.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

/// Confidante: content and chat backend for the youth wellness site.
#[derive(Parser, Debug)]
#[command(name = "confidante", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// API server port.
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    /// Address to bind.
    #[arg(long = "host")]
    pub host: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Load and lint the dialogue and post content, then exit.
    #[arg(long = "check")]
    pub check: bool,
}

impl CliArgs {
    /// Priority: --config flag > CONFIDANTE_CONFIG env var > ~/.confidante/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("CONFIDANTE_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Priority: --port flag > CONFIDANTE_PORT env var > config file value.
    pub fn resolve_port(&self, config_port: u16) -> u16 {
        let env_port = std::env::var("CONFIDANTE_PORT").ok();
        pick_port(self.port, env_port.as_deref(), config_port)
    }

    pub fn resolve_host(&self, config_host: &str) -> String {
        self.host
            .clone()
            .unwrap_or_else(|| config_host.to_string())
    }

    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }
}

fn pick_port(flag: Option<u16>, env: Option<&str>, config_port: u16) -> u16 {
    if let Some(p) = flag {
        return p;
    }
    if let Some(p) = env.and_then(|v| v.parse::<u16>().ok()) {
        return p;
    }
    config_port
}

fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".confidante").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".confidante").join("config.toml");
    }
    PathBuf::from("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let args = CliArgs::parse_from([
            "confidante",
            "-c",
            "/etc/confidante.toml",
            "-p",
            "8080",
            "--host",
            "0.0.0.0",
            "-l",
            "debug",
            "--check",
        ]);
        assert_eq!(args.config, Some(PathBuf::from("/etc/confidante.toml")));
        assert_eq!(args.port, Some(8080));
        assert_eq!(args.resolve_host("127.0.0.1"), "0.0.0.0");
        assert_eq!(args.resolve_log_level("info"), "debug");
        assert!(args.check);
        assert_eq!(args.resolve_config_path(), PathBuf::from("/etc/confidante.toml"));
    }

    #[test]
    fn test_defaults_fall_through_to_config() {
        let args = CliArgs::parse_from(["confidante"]);
        assert_eq!(args.resolve_host("127.0.0.1"), "127.0.0.1");
        assert_eq!(args.resolve_log_level("warn"), "warn");
        assert!(!args.check);
    }

    #[test]
    fn test_port_priority() {
        assert_eq!(pick_port(Some(1), Some("2"), 3), 1);
        assert_eq!(pick_port(None, Some("2"), 3), 2);
        assert_eq!(pick_port(None, Some("not-a-port"), 3), 3);
        assert_eq!(pick_port(None, None, 3), 3);
    }
}
