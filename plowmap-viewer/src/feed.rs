//! Client HTTP des flux (véhicules, tronçons, métadonnées)

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Url;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::config::FeedConfig;

/// Les trois ressources interrogées à chaque tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Routes,
    Vehicles,
    Metadata,
}

impl Endpoint {
    pub const ALL: [Endpoint; 3] = [Endpoint::Routes, Endpoint::Vehicles, Endpoint::Metadata];

    pub fn name(self) -> &'static str {
        match self {
            Endpoint::Routes => "routes",
            Endpoint::Vehicles => "vehicles",
            Endpoint::Metadata => "metadata",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Erreurs d'un fetch
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Request to {endpoint} timed out")]
    Timeout { endpoint: Endpoint },

    #[error("HTTP {status} from {endpoint}")]
    Status { endpoint: Endpoint, status: u16 },

    #[error("Request to {endpoint} failed: {source}")]
    Transport {
        endpoint: Endpoint,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Invalid payload from {endpoint}: {reason}")]
    Decode { endpoint: Endpoint, reason: String },
}

/// Source des payloads bruts; implémentée par `HttpFeed`, simulée dans les tests
#[async_trait]
pub trait Feed: Send + Sync {
    async fn fetch(&self, endpoint: Endpoint) -> Result<Bytes, FeedError>;
}

/// Client HTTP avec cache-busting `?t=<epoch ms>`
pub struct HttpFeed {
    client: reqwest::Client,
    routes: Url,
    vehicles: Url,
    metadata: Url,
}

impl HttpFeed {
    pub fn new(config: &FeedConfig) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(FeedError::Client)?;

        Ok(Self {
            client,
            routes: parse_url(&config.routes_url)?,
            vehicles: parse_url(&config.vehicles_url)?,
            metadata: parse_url(&config.metadata_url)?,
        })
    }

    fn base_url(&self, endpoint: Endpoint) -> &Url {
        match endpoint {
            Endpoint::Routes => &self.routes,
            Endpoint::Vehicles => &self.vehicles,
            Endpoint::Metadata => &self.metadata,
        }
    }
}

#[async_trait]
impl Feed for HttpFeed {
    async fn fetch(&self, endpoint: Endpoint) -> Result<Bytes, FeedError> {
        let url = cache_busted(self.base_url(endpoint), chrono::Utc::now().timestamp_millis());
        debug!(endpoint = %endpoint, url = %url, "Fetching");

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FeedError::Timeout { endpoint }
            } else {
                FeedError::Transport {
                    endpoint,
                    source: e,
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }

        response.bytes().await.map_err(|e| FeedError::Transport {
            endpoint,
            source: e,
        })
    }
}

fn parse_url(url: &str) -> Result<Url, FeedError> {
    Url::parse(url).map_err(|e| FeedError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

/// Ajoute (ou remplace) le paramètre `t` pour contourner les caches intermédiaires
pub fn cache_busted(base: &Url, now_ms: i64) -> Url {
    let mut url = base.clone();
    let kept: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(k, _)| k != "t")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    {
        let mut query = url.query_pairs_mut();
        query.clear();
        for (k, v) in &kept {
            query.append_pair(k, v);
        }
        query.append_pair("t", &now_ms.to_string());
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_busted_appends_timestamp() {
        let base = Url::parse("https://store.transitstat.us/chicago_snowplows/shape").unwrap();
        let url = cache_busted(&base, 1736975045000);

        assert_eq!(
            url.as_str(),
            "https://store.transitstat.us/chicago_snowplows/shape?t=1736975045000"
        );
    }

    #[test]
    fn test_cache_busted_keeps_other_params_and_replaces_t() {
        let base = Url::parse("http://localhost:8080/meta?city=chicago&t=1").unwrap();
        let url = cache_busted(&base, 42);

        assert_eq!(url.as_str(), "http://localhost:8080/meta?city=chicago&t=42");
    }

    fn feed_config() -> FeedConfig {
        FeedConfig {
            routes_url: "http://localhost/r".to_string(),
            vehicles_url: "http://localhost/v".to_string(),
            metadata_url: "http://localhost/m".to_string(),
            timeout_secs: 1,
            user_agent: "test".to_string(),
        }
    }

    #[test]
    fn test_http_feed_rejects_invalid_url() {
        let config = FeedConfig {
            routes_url: "nope".to_string(),
            ..feed_config()
        };

        assert!(matches!(
            HttpFeed::new(&config),
            Err(FeedError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_http_feed_rejects_invalid_user_agent() {
        let config = FeedConfig {
            user_agent: "bad\nagent".to_string(),
            ..feed_config()
        };

        assert!(matches!(HttpFeed::new(&config), Err(FeedError::Client(_))));
    }

    #[test]
    fn test_http_feed_builds_with_valid_config() {
        assert!(HttpFeed::new(&feed_config()).is_ok());
    }

    #[test]
    fn test_endpoint_names() {
        assert_eq!(Endpoint::Routes.to_string(), "routes");
        assert_eq!(Endpoint::ALL.len(), 3);
    }
}
