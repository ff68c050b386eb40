use std::str::FromStr;
use std::time::Duration;

use envconfig::Envconfig;

/// Wire protocol used to reach the model server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InferenceProtocol {
    #[default]
    Rest,
    Grpc,
}

impl FromStr for InferenceProtocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rest" | "http" => Ok(InferenceProtocol::Rest),
            "grpc" => Ok(InferenceProtocol::Grpc),
            _ => Err(format!("Invalid inference protocol: {}", s)),
        }
    }
}

/// Format of the CA bundle on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrustStoreKind {
    #[default]
    Pem,
    Der,
}

impl FromStr for TrustStoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pem" => Ok(TrustStoreKind::Pem),
            "der" => Ok(TrustStoreKind::Der),
            _ => Err(format!("Invalid trust store type: {}", s)),
        }
    }
}

#[derive(Envconfig, Debug, Clone)]
pub struct TrustStoreConfig {
    /// CA bundle the server certificate must chain to. Empty means system
    /// roots only.
    #[envconfig(from = "INFERENCE_TRUSTSTORE_PATH", default = "")]
    pub path: String,

    /// File whose first line holds the store passphrase. PEM and DER
    /// bundles are not encrypted, so the file is only checked for
    /// readability and its content is ignored.
    #[envconfig(from = "INFERENCE_TRUSTSTORE_PASSWORD_PATH", default = "")]
    pub password_path: String,

    #[envconfig(from = "INFERENCE_TRUSTSTORE_TYPE", default = "pem")]
    pub kind: TrustStoreKind,
}

impl TrustStoreConfig {
    pub fn disabled() -> Self {
        TrustStoreConfig {
            path: String::new(),
            password_path: String::new(),
            kind: TrustStoreKind::Pem,
        }
    }
}

#[derive(Envconfig, Debug, Clone)]
pub struct InferenceConfig {
    /// Address of the model server. Empty disables remote inference and
    /// callers fall back to whatever local strategy they carry.
    #[envconfig(from = "MODEL_PREDICTOR_URL", default = "")]
    pub predictor_url: String,

    #[envconfig(from = "INFERENCE_PROTOCOL", default = "rest")]
    pub protocol: InferenceProtocol,

    /// Budget for one whole inference call, connect included.
    #[envconfig(from = "INFERENCE_TIMEOUT_SECONDS", default = "30")]
    pub timeout_seconds: u64,

    #[envconfig(from = "INFERENCE_CONNECT_TIMEOUT_SECONDS", default = "5")]
    pub connect_timeout_seconds: u64,

    #[envconfig(nested = true)]
    pub truststore: TrustStoreConfig,
}

impl InferenceConfig {
    /// Whether a predictor address is configured at all.
    pub fn remote_enabled(&self) -> bool {
        !self.predictor_url.trim().is_empty()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    /// Settings for a plaintext endpoint, used by tests and local tooling.
    pub fn for_endpoint(url: impl Into<String>, protocol: InferenceProtocol) -> Self {
        InferenceConfig {
            predictor_url: url.into(),
            protocol,
            timeout_seconds: 5,
            connect_timeout_seconds: 2,
            truststore: TrustStoreConfig::disabled(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_parses_case_insensitively() {
        assert_eq!("rest".parse::<InferenceProtocol>(), Ok(InferenceProtocol::Rest));
        assert_eq!("REST".parse::<InferenceProtocol>(), Ok(InferenceProtocol::Rest));
        assert_eq!("http".parse::<InferenceProtocol>(), Ok(InferenceProtocol::Rest));
        assert_eq!("gRPC".parse::<InferenceProtocol>(), Ok(InferenceProtocol::Grpc));
        assert!("ftp".parse::<InferenceProtocol>().is_err());
    }

    #[test]
    fn trust_store_kind_parses() {
        assert_eq!("pem".parse::<TrustStoreKind>(), Ok(TrustStoreKind::Pem));
        assert_eq!(" DER ".parse::<TrustStoreKind>(), Ok(TrustStoreKind::Der));
        assert!("pkcs12".parse::<TrustStoreKind>().is_err());
    }

    #[test]
    fn empty_predictor_url_disables_remote() {
        let config = InferenceConfig::for_endpoint("", InferenceProtocol::Rest);
        assert!(!config.remote_enabled());
        let config = InferenceConfig::for_endpoint("http://models:8080", InferenceProtocol::Rest);
        assert!(config.remote_enabled());
    }
}
