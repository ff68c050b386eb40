use envconfig::Envconfig;
use inference_client::InferenceConfig;

#[derive(Envconfig, Debug, Clone)]
pub struct Config {
    #[envconfig(nested = true)]
    pub inference: InferenceConfig,

    /// Upper bound on records classified concurrently. Inference calls are
    /// the slow stage, so this is effectively the in-flight call budget.
    #[envconfig(default = "16")]
    pub max_in_flight_records: usize,

    /// Append file for raw event documents. Empty disables the raw index.
    #[envconfig(default = "")]
    pub raw_index_path: String,

    /// Append file for classified record documents. Empty disables it.
    #[envconfig(default = "")]
    pub risk_index_path: String,
}

impl Config {
    /// Reads configuration, applying floors the derive cannot express.
    pub fn init_with_defaults() -> Result<Self, envconfig::Error> {
        let mut config = Self::init_from_env()?;
        if config.max_in_flight_records == 0 {
            config.max_in_flight_records = 1;
        }
        Ok(config)
    }
}
