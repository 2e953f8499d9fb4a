use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Patient Records";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Record document location, relative to the working directory
pub const DEFAULT_STORE_PATH: &str = "patients.json";

/// Listen address for the HTTP server
pub const DEFAULT_BIND_ADDR: SocketAddr =
    SocketAddr::new(std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST), 8000);

/// Log filter used when `RUST_LOG` is unset
pub fn default_log_filter() -> &'static str {
    "info,patient_records_core=info,patient_records_server=info,tower_http=info"
}

/// Server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub store_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR,
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_fixed_relative_path() {
        let config = ServerConfig::default();
        assert!(config.store_path.is_relative());
        assert_eq!(config.store_path, PathBuf::from("patients.json"));
    }

    #[test]
    fn default_bind_is_loopback() {
        assert!(DEFAULT_BIND_ADDR.ip().is_loopback());
        assert_eq!(DEFAULT_BIND_ADDR.port(), 8000);
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }
}
