//! Blocking HTTP access to HAL APIs.
//!
//! Every call is a single request: no retries, no caching. Transport
//! failures and non-2xx responses surface as `LoadError::NetworkError`.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::ACCEPT;
use serde::Serialize;
use url::Url;

use crate::error::{ConfigError, LoadError};
use crate::loader::ResponseLoader;
use crate::registry::EntityMapperFactory;
use crate::resource::HalResource;

/// Default timeout for HTTP requests (10 seconds).
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Media type requested by default.
pub const HAL_JSON: &str = "application/hal+json";

/// Options for HTTP access.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub timeout: Duration,
    /// Value of the `Accept` header sent with every request.
    pub accept: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: HTTP_TIMEOUT,
            accept: HAL_JSON.to_string(),
        }
    }
}

impl ClientOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = accept.into();
        self
    }
}

/// Fetches HAL resources and loads them into [`HalResource`]s.
#[derive(Clone)]
pub struct HalClient {
    http: reqwest::blocking::Client,
    accept: String,
    loader: Arc<dyn ResponseLoader>,
    mappers: Option<Arc<EntityMapperFactory>>,
}

impl HalClient {
    /// Create a client that decodes responses with `loader`.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::NetworkError` if the HTTP client can't be built.
    pub fn new(
        loader: impl ResponseLoader + 'static,
        options: &ClientOptions,
    ) -> Result<Self, LoadError> {
        Ok(Self {
            http: build_http(options, "")?,
            accept: options.accept.clone(),
            loader: Arc::new(loader),
            mappers: None,
        })
    }

    /// Attach a mapper factory, registering its mappers if that hasn't
    /// happened yet.
    pub fn with_mappers(mut self, mappers: Arc<EntityMapperFactory>) -> Result<Self, ConfigError> {
        if !mappers.is_registered() {
            mappers.register_mappers()?;
        }
        self.mappers = Some(mappers);
        Ok(self)
    }

    /// A fresh, unloaded resource sharing this client's loader and mappers.
    pub fn resource(&self) -> HalResource {
        HalResource::with_shared(Arc::clone(&self.loader), self.mappers.clone())
    }

    /// GET `url` and return the response body.
    pub fn fetch_raw(&self, url: &str) -> Result<String, LoadError> {
        let url = parse_url(url)?;
        tracing::debug!(%url, "fetching resource");

        let response = self
            .http
            .get(url.clone())
            .header(ACCEPT, &self.accept)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|source| network_error(&url, source))?;

        response.text().map_err(|source| network_error(&url, source))
    }

    /// GET `url` and load the body as a resource.
    pub fn get_resource(&self, url: &str) -> Result<HalResource, LoadError> {
        let body = self.fetch_raw(url)?;
        let mut resource = self.resource();
        resource.load(&body)?;
        Ok(resource)
    }

    /// POST `entity` as JSON to `url` and load the response body as a resource.
    pub fn create<E: Serialize + ?Sized>(
        &self,
        url: &str,
        entity: &E,
    ) -> Result<HalResource, LoadError> {
        let url = parse_url(url)?;
        tracing::debug!(%url, "creating resource");

        let body = self
            .http
            .post(url.clone())
            .header(ACCEPT, &self.accept)
            .json(entity)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.text())
            .map_err(|source| network_error(&url, source))?;

        let mut resource = self.resource();
        resource.load(&body)?;
        Ok(resource)
    }
}

/// One-off GET of `url` without a client; used for reading URL sources.
pub fn fetch_text(url: &str, options: &ClientOptions) -> Result<String, LoadError> {
    let parsed = parse_url(url)?;
    build_http(options, url)?
        .get(parsed.clone())
        .header(ACCEPT, &options.accept)
        .send()
        .and_then(|r| r.error_for_status())
        .and_then(|r| r.text())
        .map_err(|source| network_error(&parsed, source))
}

fn build_http(options: &ClientOptions, url: &str) -> Result<reqwest::blocking::Client, LoadError> {
    reqwest::blocking::Client::builder()
        .timeout(options.timeout)
        .build()
        .map_err(|source| LoadError::NetworkError {
            url: url.to_string(),
            source,
        })
}

fn parse_url(url: &str) -> Result<Url, LoadError> {
    Url::parse(url).map_err(|source| LoadError::InvalidUrl {
        url: url.to_string(),
        source,
    })
}

fn network_error(url: &Url, source: reqwest::Error) -> LoadError {
    LoadError::NetworkError {
        url: url.to_string(),
        source,
    }
}
