use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, Proxy};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use thiserror::Error;

use crate::auth::HttpAuthService;
use crate::config::{Config, ProxyAuth};

const CLIENT_USER_AGENT: &str = concat!("campus-rewards-client/", env!("CARGO_PKG_VERSION"));
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const MIN_RETRY_INTERVAL: Duration = Duration::from_millis(500);
const MAX_RETRY_INTERVAL: Duration = Duration::from_secs(8);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid proxy {url}: {source}")]
    Proxy { url: String, source: reqwest::Error },

    #[error("Failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

fn apply_proxy_auth(proxy: Proxy, auth: Option<&ProxyAuth>) -> Proxy {
    let Some(auth) = auth else {
        return proxy;
    };
    if auth.username.is_empty() {
        return proxy;
    }
    proxy.basic_auth(&auth.username, &auth.password)
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers
}

pub fn build_http_client(config: &Config) -> Result<Client, ClientError> {
    let mut builder = Client::builder()
        .default_headers(default_headers())
        .connect_timeout(CONNECT_TIMEOUT);
    if !config.http_proxy.is_empty() {
        let proxy = Proxy::http(&config.http_proxy).map_err(|source| ClientError::Proxy {
            url: config.http_proxy.clone(),
            source,
        })?;
        builder = builder.proxy(apply_proxy_auth(proxy, config.http_proxy_auth.as_ref()));
    }
    if !config.https_proxy.is_empty() {
        let proxy = Proxy::https(&config.https_proxy).map_err(|source| ClientError::Proxy {
            url: config.https_proxy.clone(),
            source,
        })?;
        builder = builder.proxy(apply_proxy_auth(proxy, config.https_proxy_auth.as_ref()));
    }
    Ok(builder.build()?)
}

pub fn build_retry_client(client: Client, max_retries: u32) -> ClientWithMiddleware {
    // Exponential backoff with jitter between the two bounds
    let retry_policy = ExponentialBackoff::builder()
        .retry_bounds(MIN_RETRY_INTERVAL, MAX_RETRY_INTERVAL)
        .build_with_max_retries(max_retries);

    ClientBuilder::new(client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build()
}

/// Auth service talking to `config.api_base` with proxy and retry settings applied
pub fn auth_service(config: &Config) -> Result<HttpAuthService, ClientError> {
    let client = build_http_client(config)?;
    let client = Arc::new(build_retry_client(client, config.max_retries));
    log::debug!("Auth service configured for {}", config.api_base);
    Ok(HttpAuthService::new(client, config.api_base.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_proxy_is_reported() {
        let config = Config {
            http_proxy: "not a url".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            build_http_client(&config),
            Err(ClientError::Proxy { .. })
        ));
    }

    #[test]
    fn proxy_with_credentials_builds() {
        let config = Config {
            https_proxy: "http://proxy.campus.edu:3128".to_string(),
            https_proxy_auth: Some(ProxyAuth {
                username: "student".to_string(),
                password: "pw".to_string(),
            }),
            ..Config::default()
        };
        assert!(auth_service(&config).is_ok());
    }
}
