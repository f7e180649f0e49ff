//! Configuration module

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Interface to bind
    pub bind_address: IpAddr,

    /// Multi-output regression artifact (.onnx or .json)
    pub regression_model_path: PathBuf,

    /// Compliance classification artifact (.onnx or .json)
    pub classification_model_path: PathBuf,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),

            bind_address: env::var("BIND_ADDRESS")
                .ok()
                .and_then(|a| a.parse().ok())
                .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),

            regression_model_path: env::var("REGRESSION_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("regression_model.onnx")),

            classification_model_path: env::var("CLASSIFICATION_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("classification_model.onnx")),

            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_addr() {
        let config = Config {
            port: 9090,
            bind_address: "127.0.0.1".parse().unwrap(),
            regression_model_path: PathBuf::from("r.json"),
            classification_model_path: PathBuf::from("c.json"),
            environment: "production".to_string(),
        };
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:9090");
        assert!(config.is_production());
    }
}
