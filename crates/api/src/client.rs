use std::{env, time::Duration};

use async_trait::async_trait;
use booking::gateway::{Gateway, GatewayResult, Resource};
use model::WithId;
use serde::{de::DeserializeOwned, Serialize};
use utility::id::Id;

use crate::{ApiError, DEFAULT_TIMEOUT_SECONDS};

/// Connection settings for the reservation backend.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub proxy: Option<String>,
}

impl ApiConfig {
    pub fn new<S: Into<String>>(base_url: S) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
            proxy: None,
        }
    }

    /// Reads the connection settings from the environment.
    pub fn env() -> Result<Self, ApiError> {
        let base_url = env::var("BOOKING_API_URL").map_err(|_| {
            ApiError::InvalidConfig("BOOKING_API_URL is not set".to_owned())
        })?;
        let timeout = match env::var("BOOKING_API_TIMEOUT_SECONDS") {
            Ok(seconds) => seconds.parse().map(Duration::from_secs).map_err(|_| {
                ApiError::InvalidConfig(format!(
                    "BOOKING_API_TIMEOUT_SECONDS is not a number: '{}'",
                    seconds
                ))
            })?,
            Err(_) => Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        };
        let proxy = env::var("BOOKING_API_PROXY").ok();
        Ok(Self {
            base_url,
            timeout,
            proxy,
        })
    }
}

/// Thin CRUD client for the reservation backend. One attempt per call, no
/// retries; a slow backend runs into the configured timeout and counts as
/// unreachable.
pub struct ApiClient {
    config: ApiConfig,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        /* build the http client once, with optional proxy */
        let mut builder = reqwest::Client::builder().timeout(config.timeout);
        if let Some(proxy_url) = &config.proxy {
            log::info!("routing backend requests through proxy '{}'", proxy_url);
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }
        let http = builder.build()?;
        Ok(Self { config, http })
    }

    fn collection_url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn record_url(&self, path: &str, id: i64) -> String {
        format!(
            "{}/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path,
            id
        )
    }

    async fn parse<T: DeserializeOwned>(
        response: reqwest::Response,
        url: String,
    ) -> Result<T, ApiError> {
        match response.status() {
            status if status.is_success() => Ok(response.json().await?),
            reqwest::StatusCode::NOT_FOUND => Err(ApiError::NotFound { url }),
            other => match response.text().await {
                Ok(text) => Err(ApiError::InvalidResponse {
                    status_code: other,
                    url,
                    response: Some(text),
                }),
                Err(_) => Err(ApiError::InvalidResponse {
                    status_code: other,
                    url,
                    response: None,
                }),
            },
        }
    }

    async fn expect_success(response: reqwest::Response, url: String) -> Result<(), ApiError> {
        match response.status() {
            status if status.is_success() => Ok(()),
            reqwest::StatusCode::NOT_FOUND => Err(ApiError::NotFound { url }),
            other => match response.text().await {
                Ok(text) => Err(ApiError::InvalidResponse {
                    status_code: other,
                    url,
                    response: Some(text),
                }),
                Err(_) => Err(ApiError::InvalidResponse {
                    status_code: other,
                    url,
                    response: None,
                }),
            },
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: String) -> Result<T, ApiError> {
        log::debug!("GET {}", url);
        let response = self.http.get(&url).send().await?;
        Self::parse(response, url).await
    }

    async fn post<B, T>(&self, url: String, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        log::debug!("POST {}", url);
        let response = self.http.post(&url).json(body).send().await?;
        Self::parse(response, url).await
    }

    async fn put<B, T>(&self, url: String, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        log::debug!("PUT {}", url);
        let response = self.http.put(&url).json(body).send().await?;
        Self::parse(response, url).await
    }

    async fn delete(&self, url: String) -> Result<(), ApiError> {
        log::debug!("DELETE {}", url);
        let response = self.http.delete(&url).send().await?;
        Self::expect_success(response, url).await
    }
}

#[async_trait]
impl Gateway for ApiClient {
    async fn fetch_all<R: Resource>(&self) -> GatewayResult<Vec<WithId<R>>> {
        Ok(self.get(self.collection_url(R::PATH)).await?)
    }

    async fn fetch<R: Resource>(&self, id: Id<R>) -> GatewayResult<WithId<R>> {
        Ok(self.get(self.record_url(R::PATH, id.raw())).await?)
    }

    async fn create<R: Resource>(&self, content: R) -> GatewayResult<WithId<R>> {
        Ok(self.post(self.collection_url(R::PATH), &content).await?)
    }

    async fn update<R: Resource>(&self, record: WithId<R>) -> GatewayResult<WithId<R>> {
        Ok(self
            .put(self.record_url(R::PATH, record.id.raw()), &record)
            .await?)
    }

    async fn remove<R: Resource>(&self, id: Id<R>) -> GatewayResult<()> {
        Ok(self.delete(self.record_url(R::PATH, id.raw())).await?)
    }
}
