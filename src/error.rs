#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("decode error: {reason}")]
    Decode { reason: String },

    #[error("schema mismatch: {file} is missing required column `{column}`")]
    SchemaMismatch { file: String, column: String },

    #[error("chain fetch error: {reason}")]
    ChainFetch { reason: String },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("unknown chain `{name}`")]
    UnknownChain { name: String },
}

impl Error {
    pub(crate) fn decode(reason: impl Into<String>) -> Self {
        Self::Decode {
            reason: reason.into(),
        }
    }

    pub(crate) fn chain_fetch(reason: impl Into<String>) -> Self {
        Self::ChainFetch {
            reason: reason.into(),
        }
    }
}
