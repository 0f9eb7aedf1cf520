use thiserror::Error;

#[derive(Error, Debug)]
pub enum MidsError {
    #[error("record service request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("record service returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("records file error: {0}")]
    Records(String),

    #[error("config parse error: {0}")]
    ConfigParse(String),

    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MidsError>;
