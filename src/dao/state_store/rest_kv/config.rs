use super::error::{KvDaoError, KvResult};

/// Runtime configuration describing how to reach the REST key-value service.
#[derive(Debug, Clone)]
pub struct KvConfig {
    pub base_url: String,
    pub token: String,
}

impl KvConfig {
    /// Construct a configuration from an explicit endpoint and bearer token.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    /// Build a configuration by reading the expected environment variables.
    pub fn from_env() -> KvResult<Self> {
        let base_url = required_var("KV_REST_API_URL")?;
        let token = required_var("KV_REST_API_TOKEN")?;
        Ok(Self::new(base_url, token))
    }
}

fn required_var(var: &'static str) -> KvResult<String> {
    std::env::var(var)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or(KvDaoError::MissingEnvVar { var })
}
