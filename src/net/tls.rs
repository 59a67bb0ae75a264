//! TLS configuration and certificate loading.

use axum_server::tls_rustls::RustlsConfig;
use std::io::{Error, ErrorKind};
use std::path::Path;

use crate::config::TlsConfig;

/// Load the webhook listener's certificate and key.
pub async fn load_tls_config(config: &TlsConfig) -> Result<RustlsConfig, Error> {
    let cert_path = Path::new(&config.cert_path);
    let key_path = Path::new(&config.key_path);

    for (label, path) in [("Certificate", cert_path), ("Private key", key_path)] {
        if !path.exists() {
            return Err(Error::new(
                ErrorKind::NotFound,
                format!("{label} file not found: {}", path.display()),
            ));
        }
    }

    RustlsConfig::from_pem_file(cert_path, key_path).await
}
