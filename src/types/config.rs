use crate::error::MidsError;
use crate::maturity::calculator::DEFAULT_MAX_CONCURRENT_REQUESTS;
use crate::service::gbif::DEFAULT_BASE_URL;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MidsConfig {
    pub api: Option<ApiConfig>,
    pub calculation: Option<CalculationConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalculationConfig {
    pub max_concurrent_requests: Option<usize>,
}

impl MidsConfig {
    pub fn base_url(&self) -> &str {
        self.api
            .as_ref()
            .and_then(|api| api.base_url.as_deref())
            .unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn timeout(&self) -> Duration {
        let secs = self
            .api
            .as_ref()
            .and_then(|api| api.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    pub fn max_concurrent_requests(&self) -> usize {
        self.calculation
            .as_ref()
            .and_then(|calculation| calculation.max_concurrent_requests)
            .unwrap_or(DEFAULT_MAX_CONCURRENT_REQUESTS)
    }

    pub fn validate(&self) -> Result<(), MidsError> {
        if let Some(api) = &self.api {
            if let Some(base_url) = &api.base_url {
                let trimmed = base_url.trim();
                if trimmed.is_empty() {
                    return Err(MidsError::ConfigParse(
                        "api.base_url must not be empty".to_string(),
                    ));
                }
                if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
                    return Err(MidsError::ConfigParse(format!(
                        "api.base_url must be an http(s) URL: {base_url}"
                    )));
                }
            }
            if api.timeout_secs == Some(0) {
                return Err(MidsError::ConfigParse(
                    "api.timeout_secs must be greater than 0".to_string(),
                ));
            }
        }

        if let Some(calculation) = &self.calculation {
            if calculation.max_concurrent_requests == Some(0) {
                return Err(MidsError::ConfigParse(
                    "calculation.max_concurrent_requests must be greater than 0".to_string(),
                ));
            }
        }

        Ok(())
    }
}
