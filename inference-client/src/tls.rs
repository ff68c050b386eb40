use std::fs;
use std::io::{BufRead, BufReader};

use tracing::warn;

use crate::config::{TrustStoreConfig, TrustStoreKind};
use crate::error::BuildError;

/// CA material used to verify the model server certificate.
///
/// Loaded once at client construction so a bad path or bundle fails the
/// process at startup instead of surfacing on the first scored record.
pub struct TrustStore {
    kind: TrustStoreKind,
    bytes: Vec<u8>,
    path: String,
}

impl TrustStore {
    /// Loads the store named by the config, or `None` when no path is set.
    ///
    /// A configured password file must exist and be readable even though
    /// PEM and DER bundles carry no passphrase; an unreadable file is a
    /// deployment mistake worth surfacing before records flow.
    pub fn load(config: &TrustStoreConfig) -> Result<Option<Self>, BuildError> {
        let path = config.path.trim();
        if path.is_empty() {
            return Ok(None);
        }

        let password_path = config.password_path.trim();
        if !password_path.is_empty() {
            let password = read_first_line(password_path)?;
            if !password.is_empty() {
                warn!(
                    kind = ?config.kind,
                    "trust store password ignored, pem and der bundles are not encrypted"
                );
            }
        }

        let bytes = fs::read(path).map_err(|source| BuildError::TrustStoreRead {
            path: path.to_string(),
            source,
        })?;

        Ok(Some(TrustStore {
            kind: config.kind,
            bytes,
            path: path.to_string(),
        }))
    }

    /// Root certificates for the http client. PEM bundles may carry several.
    pub fn reqwest_certificates(&self) -> Result<Vec<reqwest::Certificate>, BuildError> {
        match self.kind {
            TrustStoreKind::Pem => {
                let certificates = reqwest::Certificate::from_pem_bundle(&self.bytes)
                    .map_err(|e| self.invalid(e.to_string()))?;
                if certificates.is_empty() {
                    return Err(self.invalid("no certificates in bundle".to_string()));
                }
                Ok(certificates)
            }
            TrustStoreKind::Der => {
                let certificate = reqwest::Certificate::from_der(&self.bytes)
                    .map_err(|e| self.invalid(e.to_string()))?;
                Ok(vec![certificate])
            }
        }
    }

    /// Root certificate for the grpc channel, which accepts PEM only.
    pub fn tonic_certificate(&self) -> Result<tonic::transport::Certificate, BuildError> {
        match self.kind {
            TrustStoreKind::Pem => Ok(tonic::transport::Certificate::from_pem(&self.bytes)),
            TrustStoreKind::Der => Err(BuildError::DerOverGrpc),
        }
    }

    fn invalid(&self, reason: String) -> BuildError {
        BuildError::TrustStoreInvalid {
            path: self.path.clone(),
            reason,
        }
    }
}

/// The passphrase convention is one secret on the first line of the file.
fn read_first_line(path: &str) -> Result<String, BuildError> {
    let file = fs::File::open(path).map_err(|source| BuildError::TrustStoreRead {
        path: path.to_string(),
        source,
    })?;
    let mut line = String::new();
    BufReader::new(file)
        .read_line(&mut line)
        .map_err(|source| BuildError::TrustStoreRead {
            path: path.to_string(),
            source,
        })?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
