use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, RequestBuilder, Url};
use serde_json::Value;

use crate::dao::{state_store::StateStore, storage::StorageResult};

use super::{
    config::KvConfig,
    error::{KvDaoError, KvResult},
    models::{CommandResponse, decode_stored},
};

/// State store speaking the Redis-over-REST dialect (`/get/{key}`, `/set/{key}`, `/ping`).
///
/// Documents are stored as JSON strings so other clients of the same database read them back as
/// objects.
#[derive(Clone)]
pub struct RestKvStore {
    client: Client,
    base_url: Arc<Url>,
    token: Arc<str>,
}

impl RestKvStore {
    /// Build the HTTP client. No request is sent until the first command.
    pub fn connect(config: KvConfig) -> KvResult<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|err| KvDaoError::InvalidBaseUrl {
            url: config.base_url.clone(),
            message: err.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(KvDaoError::InvalidBaseUrl {
                url: config.base_url,
                message: "URL cannot carry a path".into(),
            });
        }

        let client = Client::builder()
            .build()
            .map_err(|source| KvDaoError::ClientBuilder { source })?;

        Ok(Self {
            client,
            base_url: Arc::new(base_url),
            token: Arc::<str>::from(config.token),
        })
    }

    /// Append `segments` to the endpoint path, percent-encoding each one.
    fn command_url(&self, segments: &[&str]) -> Url {
        let mut url = Url::clone(&self.base_url);
        // cannot-be-a-base URLs are refused in `connect`
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        self.client
            .request(method, self.command_url(segments))
            .bearer_auth(self.token.as_ref())
    }

    async fn send_command(&self, builder: RequestBuilder, path: &str) -> KvResult<Option<Value>> {
        let response = builder
            .send()
            .await
            .map_err(|source| KvDaoError::RequestSend {
                path: path.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<CommandResponse>()
                .await
                .ok()
                .and_then(|payload| payload.error)
                .unwrap_or_else(|| "unexpected response status".into());
            return Err(KvDaoError::Rejected {
                path: path.to_string(),
                status,
                message,
            });
        }

        let payload = response
            .json::<CommandResponse>()
            .await
            .map_err(|source| KvDaoError::DecodeResponse {
                path: path.to_string(),
                source,
            })?;

        if let Some(message) = payload.error {
            return Err(KvDaoError::Rejected {
                path: path.to_string(),
                status,
                message,
            });
        }

        Ok(payload.result)
    }

    async fn get_value(&self, key: &str) -> KvResult<Option<Value>> {
        let path = format!("get/{key}");
        let result = self
            .send_command(self.request(Method::GET, &["get", key]), &path)
            .await?;
        Ok(result.and_then(decode_stored))
    }

    async fn set_value(&self, key: &str, value: &Value) -> KvResult<()> {
        let path = format!("set/{key}");
        let body = serde_json::to_string(value).map_err(|source| KvDaoError::SerializeValue {
            path: path.clone(),
            source,
        })?;

        self.send_command(self.request(Method::POST, &["set", key]).body(body), &path)
            .await
            .map(|_| ())
    }
}

impl StateStore for RestKvStore {
    fn backend(&self) -> &'static str {
        "rest-kv"
    }

    fn get(&self, key: &str) -> BoxFuture<'static, StorageResult<Option<Value>>> {
        let store = self.clone();
        let key = key.to_string();
        Box::pin(async move { store.get_value(&key).await.map_err(Into::into) })
    }

    fn set(&self, key: &str, value: Value) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        let key = key.to_string();
        Box::pin(async move { store.set_value(&key, &value).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            const PING: &str = "ping";
            store
                .send_command(store.request(Method::GET, &[PING]), PING)
                .await
                .map(|_| ())
                .map_err(Into::into)
        })
    }
}
