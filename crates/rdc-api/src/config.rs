//! Server configuration
//!
//! Flags with environment fallbacks; nothing here is study logic, just the
//! knobs the process needs to come up.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Runtime configuration for the API server
#[derive(Debug, Clone, Parser)]
#[command(name = "rdc-api", version, about = "Research data collection API server")]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "RDC_BIND", default_value = "127.0.0.1:4000")]
    pub bind: SocketAddr,

    /// Directory holding the built client application
    #[arg(long, env = "RDC_STATIC_DIR", default_value = "survey-app/dist")]
    pub static_dir: PathBuf,

    /// JSON snapshot file; omit for an ephemeral in-memory store
    #[arg(long, env = "RDC_DATA_FILE")]
    pub data_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse() {
        let config = ServerConfig::try_parse_from(["rdc-api"]).unwrap();
        assert_eq!(config.bind.port(), 4000);
        assert!(config.data_file.is_none());
    }

    #[test]
    fn flags_override_defaults() {
        let config = ServerConfig::try_parse_from([
            "rdc-api",
            "--bind",
            "0.0.0.0:8080",
            "--data-file",
            "/var/lib/rdc/submissions.json",
        ])
        .unwrap();
        assert_eq!(config.bind.port(), 8080);
        assert!(config.data_file.is_some());
    }

    #[test]
    fn rejects_malformed_bind() {
        assert!(ServerConfig::try_parse_from(["rdc-api", "--bind", "not-an-addr"]).is_err());
    }
}
