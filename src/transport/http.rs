//! # HTTP Transport
//!
//! Fetches resources with a plain `GET` and decodes the body as JSON.
use crate::config::FetchConfig;
use crate::error::{ConfigError, FetchError};
use crate::transport::Transport;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::fmt::{Debug, Display};
use std::marker::PhantomData;
use tracing::{debug, instrument};

/// Placeholder in the resource path that is replaced by the key.
pub const KEY_PLACEHOLDER: &str = "{key}";

/// A [`Transport`] over HTTP with JSON bodies.
///
/// The address of a key is `base_url` followed by `resource_path` with
/// `{key}` substituted, e.g. `http://localhost:8080` + `/api/users/{key}`.
/// The key is percent-encoded as one path segment, so `a/b` or `a#b` can never
/// reach another resource.
pub struct HttpTransport<K, R> {
    client: reqwest::Client,
    base_url: String,
    resource_path: String,
    _marker: PhantomData<fn(K) -> R>,
}

impl<K, R> HttpTransport<K, R> {
    /// Build a transport from a validated configuration.
    pub fn new(config: &FetchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_client(reqwest::Client::new(), config))
    }

    /// Build a transport that reuses an existing `reqwest::Client`.
    ///
    /// The configuration is trusted as-is; call [`FetchConfig::validate`] first
    /// when it comes from outside.
    pub fn with_client(client: reqwest::Client, config: &FetchConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            resource_path: config.resource_path.clone(),
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<K, R> Transport for HttpTransport<K, R>
where
    K: Clone + Send + Sync + Display + Debug + 'static,
    R: DeserializeOwned + Send + 'static,
{
    type Key = K;
    type Response = reqwest::Response;
    type Resource = R;

    fn address(&self, key: &K) -> Result<String, FetchError> {
        let key = key.to_string();
        // Empty and dot-only keys would resolve to a different path even when encoded.
        if key.is_empty() || key.chars().all(|c| c == '.') {
            return Err(FetchError::TransportFailure(format!(
                "key '{}' does not address a single resource",
                key
            )));
        }
        let path = self
            .resource_path
            .replace(KEY_PLACEHOLDER, &urlencoding::encode(&key));
        Ok(format!("{}{}", self.base_url, path))
    }

    #[instrument(skip(self))]
    async fn perform_remote_call(&self, address: &str) -> Result<reqwest::Response, FetchError> {
        let response = self
            .client
            .get(address)
            .send()
            .await
            .map_err(|e| FetchError::TransportFailure(e.to_string()))?;

        let status = response.status();
        debug!(%status, "Response received");
        if !status.is_success() {
            return Err(FetchError::TransportFailure(format!(
                "HTTP error! status: {}",
                status.as_u16()
            )));
        }
        Ok(response)
    }

    async fn decode(&self, response: reqwest::Response) -> Result<R, FetchError> {
        response
            .json::<R>()
            .await
            .map_err(|e| FetchError::DecodeFailure(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport<K>(base_url: &str, resource_path: &str) -> HttpTransport<K, serde_json::Value> {
        let config = FetchConfig {
            base_url: base_url.to_string(),
            resource_path: resource_path.to_string(),
            ..FetchConfig::default()
        };
        HttpTransport::new(&config).unwrap()
    }

    #[test]
    fn test_address_substitutes_key() {
        let transport = transport::<u64>("http://localhost:8080", "/api/users/{key}");
        assert_eq!(
            transport.address(&42).unwrap(),
            "http://localhost:8080/api/users/42"
        );
    }

    #[test]
    fn test_address_trims_trailing_slash_on_base() {
        let transport = transport::<u64>("http://localhost:8080/", "/items/{key}/detail");
        assert_eq!(
            transport.address(&7).unwrap(),
            "http://localhost:8080/items/7/detail"
        );
    }

    #[test]
    fn test_address_encodes_key_as_one_segment() {
        let transport = transport::<String>("http://localhost:8080", "/api/users/{key}");

        assert_eq!(
            transport.address(&"alice#evil".to_string()).unwrap(),
            "http://localhost:8080/api/users/alice%23evil"
        );
        assert_eq!(
            transport.address(&"alice/../bob".to_string()).unwrap(),
            "http://localhost:8080/api/users/alice%2F..%2Fbob"
        );
        assert_eq!(
            transport.address(&"a b?x=1".to_string()).unwrap(),
            "http://localhost:8080/api/users/a%20b%3Fx%3D1"
        );
    }

    #[test]
    fn test_address_rejects_keys_that_escape_the_segment() {
        let transport = transport::<String>("http://localhost:8080", "/api/users/{key}");

        for key in ["", ".", ".."] {
            assert!(
                matches!(
                    transport.address(&key.to_string()),
                    Err(FetchError::TransportFailure(_))
                ),
                "key {:?} should be rejected",
                key
            );
        }
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = FetchConfig {
            base_url: "http://localhost".to_string(),
            resource_path: "/api/users".to_string(),
            ..FetchConfig::default()
        };
        let result = HttpTransport::<u64, serde_json::Value>::new(&config);
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { field: "resource_path", .. })
        ));
    }
}
