use crate::error::RecsysError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Recommendation service configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RecsysConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Artifact locations
    #[serde(default)]
    pub data: DataConfig,

    /// Column layout of user and item vectors
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Prediction and presentation settings
    #[serde(default)]
    pub prediction: PredictionConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host
    pub host: String,

    /// Server port (default: 8083)
    pub port: u16,

    /// Worker threads
    pub workers: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8083,
            workers: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory holding the exported training artifacts
    pub dir: PathBuf,

    /// Two-tower weights (`.json`) or exported network (`.onnx`)
    pub model_path: PathBuf,

    /// Fitted user/item/target scalers; identity scaling when unset
    pub scalers_path: Option<PathBuf>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./data"),
            model_path: PathBuf::from("./data/two_tower.json"),
            scalers_path: Some(PathBuf::from("./data/scalers.json")),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// First model-input column of a user row
    pub user_vector_start: usize,

    /// First model-input column of an item row
    pub item_vector_start: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            user_vector_start: 3,
            item_vector_start: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PredictionConfig {
    /// Scale user/item rows before prediction
    pub scale_data: bool,

    /// Default number of table rows
    pub max_rows: usize,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            scale_data: true,
            max_rows: 10,
        }
    }
}

impl RecsysConfig {
    /// Load configuration from `.env`, `config/recsys.*` and `RECSYS_*` variables
    ///
    /// Nested keys use a double underscore, e.g. `RECSYS_SERVER__PORT=9000`.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::layered(environment())
    }

    fn layered(env: config::Environment) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config/recsys").required(false))
            .add_source(env)
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RecsysError> {
        if self.server.port == 0 {
            return Err(RecsysError::Config(
                "server.port must be greater than 0".to_string(),
            ));
        }
        if self.prediction.max_rows == 0 {
            return Err(RecsysError::Config(
                "prediction.max_rows must be greater than 0".to_string(),
            ));
        }
        if self.server.workers == Some(0) {
            return Err(RecsysError::Config(
                "server.workers must be greater than 0 when set".to_string(),
            ));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("RECSYS")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
