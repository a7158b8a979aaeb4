//! Server module for running Terraform providers
//!
//! This module starts the provider's gRPC server with an ephemeral TLS
//! certificate and prints the go-plugin handshake line Terraform waits for.

use crate::error::{Result, TfplugError};
use crate::grpc::ProviderServer;
use crate::provider::ProviderV2;
use base64::Engine;
use rcgen::CertifiedKey;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::{Identity, Server, ServerTlsConfig};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const CORE_PROTOCOL_VERSION: u8 = 1;
const PLUGIN_PROTOCOL_VERSION: u8 = 6;

pub const MAGIC_COOKIE_KEY: &str = "TF_PLUGIN_MAGIC_COOKIE";
pub const MAGIC_COOKIE_VALUE: &str =
    "d602bf8f470bc67ca7faa0386276bbdd4330efaf76d1a219cb4d6991ca9872b2";

/// Log level used when `RUST_LOG` is not set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Server configuration for running a Terraform provider
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Maximum message size in bytes
    pub max_message_size: usize,
    /// Whether to install the stderr tracing subscriber
    pub enable_logging: bool,
    pub log_level: LogLevel,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_message_size: 256 << 20, // 256MB
            enable_logging: true,
            log_level: LogLevel::Info,
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    pub fn without_logging(mut self) -> Self {
        self.enable_logging = false;
        self
    }

    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }
}

/// Installs a tracing subscriber writing to stderr, leaving stdout to the
/// handshake. `RUST_LOG` overrides the given level.
///
/// Returns false when a global subscriber was already installed.
pub fn init_logging(level: LogLevel) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_filter()));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .with_target(true),
        )
        .try_init()
        .is_ok()
}

/// Fails unless the process was started by Terraform through go-plugin
pub fn check_magic_cookie() -> Result<()> {
    match std::env::var(MAGIC_COOKIE_KEY) {
        Ok(value) if value == MAGIC_COOKIE_VALUE => Ok(()),
        _ => Err(TfplugError::NotLaunchedByTerraform),
    }
}

/// The line go-plugin parses from stdout to connect to the server
pub fn handshake_line(port: u16, certificate_der: &[u8]) -> String {
    format!(
        "{}|{}|tcp|127.0.0.1:{}|grpc|{}",
        CORE_PROTOCOL_VERSION,
        PLUGIN_PROTOCOL_VERSION,
        port,
        base64::engine::general_purpose::STANDARD_NO_PAD.encode(certificate_der),
    )
}

/// Generates the ephemeral server certificate announced in the handshake
fn generate_identity() -> Result<(Identity, Vec<u8>)> {
    let CertifiedKey { cert, key_pair } =
        rcgen::generate_simple_self_signed(vec!["localhost".to_string()])?;

    let identity = Identity::from_pem(cert.pem(), key_pair.serialize_pem());
    Ok((identity, cert.der().to_vec()))
}

/// Main entry point for running a provider
pub async fn serve<P: ProviderV2 + 'static>(provider: P, config: ServerConfig) -> Result<()> {
    if config.enable_logging {
        init_logging(config.log_level);
    }

    check_magic_cookie()?;

    if let Ok(versions) = std::env::var("PLUGIN_PROTOCOL_VERSIONS") {
        if !versions
            .split(',')
            .any(|v| v.trim() == PLUGIN_PROTOCOL_VERSION.to_string())
        {
            tracing::warn!(
                offered = %versions,
                "Terraform did not offer plugin protocol {}",
                PLUGIN_PROTOCOL_VERSION
            );
        }
    }

    // Err means another crypto provider is already installed
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let (identity, certificate_der) = generate_identity()?;
    let tls_config = ServerTlsConfig::new().identity(identity);

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();

    println!("{}", handshake_line(port, &certificate_der));
    tracing::info!(port, "provider server listening");

    let service = ProviderServer::new(provider).into_service(config.max_message_size);

    Server::builder()
        .tls_config(tls_config)?
        .add_service(service)
        .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("interrupt received, shutting down");
        })
        .await?;

    Ok(())
}

/// Convenience function to run a provider with default configuration
pub async fn serve_default<P: ProviderV2 + 'static>(provider: P) -> Result<()> {
    serve(provider, ServerConfig::default()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use serial_test::serial;

    #[test]
    fn handshake_line_has_go_plugin_layout() {
        let line = handshake_line(41234, &[0x30, 0x82, 0x01]);
        let parts: Vec<&str> = line.split('|').collect();

        assert_eq!(parts.len(), 6);
        assert_eq!(parts[0], "1");
        assert_eq!(parts[1], "6");
        assert_eq!(parts[2], "tcp");
        assert_eq!(parts[3], "127.0.0.1:41234");
        assert_eq!(parts[4], "grpc");
        assert_eq!(
            base64::engine::general_purpose::STANDARD_NO_PAD
                .decode(parts[5])
                .unwrap(),
            vec![0x30, 0x82, 0x01]
        );
        assert!(!parts[5].ends_with('='));
    }

    #[test]
    #[serial]
    fn magic_cookie_is_required() {
        std::env::remove_var(MAGIC_COOKIE_KEY);
        assert!(matches!(
            check_magic_cookie(),
            Err(TfplugError::NotLaunchedByTerraform)
        ));

        std::env::set_var(MAGIC_COOKIE_KEY, "wrong");
        assert!(check_magic_cookie().is_err());

        std::env::set_var(MAGIC_COOKIE_KEY, MAGIC_COOKIE_VALUE);
        assert!(check_magic_cookie().is_ok());

        std::env::remove_var(MAGIC_COOKIE_KEY);
    }

    #[test]
    fn generated_certificate_is_der_encoded() {
        let (_identity, der) = generate_identity().unwrap();
        // DER certificates start with a SEQUENCE tag
        assert_eq!(der[0], 0x30);
    }

    #[test]
    fn server_config_builders_override_defaults() {
        let config = ServerConfig::new()
            .with_max_message_size(1024)
            .with_log_level(LogLevel::Debug)
            .without_logging();

        assert_eq!(config.max_message_size, 1024);
        assert_eq!(config.log_level, LogLevel::Debug);
        assert!(!config.enable_logging);
        assert_eq!(LogLevel::Debug.as_filter(), "debug");
    }
}
