//! Upstream clients for Pharos, Open Targets and AlphaFold DB.

pub mod alphafold;
pub mod opentargets;
pub mod pharos;

use anyhow::Result;
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::{config::Settings, error::LookupError};

/// Build the HTTP client shared by every upstream call of a run.
///
/// The timeout covers the whole request, so a stalled upstream cannot hold a batch.
pub fn http_client(settings: &Settings) -> Result<Client> {
    Ok(Client::builder()
        .user_agent(concat!("target-scope/", env!("CARGO_PKG_VERSION")))
        .timeout(settings.timeout())
        .gzip(true)
        .brotli(true)
        .build()?)
}

/// The three upstream clients a report needs, sharing one connection pool.
#[derive(Debug, Clone)]
pub struct Sources {
    pub targets: pharos::PharosClient,
    pub drugs: opentargets::OpenTargetsClient,
    pub structures: alphafold::AlphaFoldClient,
}

impl Sources {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let client = http_client(settings)?;
        Ok(Self {
            targets: pharos::PharosClient::new(client.clone(), &settings.pharos_url)
                .with_publication_limit(settings.max_publications),
            drugs: opentargets::OpenTargetsClient::new(client.clone(), &settings.opentargets_url),
            structures: alphafold::AlphaFoldClient::new(client, &settings.alphafold_url),
        })
    }
}

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a, V> {
    query: &'a str,
    variables: V,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: Option<String>,
}

/// POST a GraphQL query and return its `data` object.
///
/// Only `200 OK` is accepted; a non-empty `errors` array wins over any partial data.
pub(crate) async fn post_graphql<T, V>(
    client: &Client,
    endpoint: &str,
    query: &str,
    variables: V,
) -> Result<Option<T>, LookupError>
where
    T: DeserializeOwned,
    V: Serialize,
{
    debug!(%endpoint, "posting graphql query");
    let resp = client
        .post(endpoint)
        .json(&GraphQlRequest { query, variables })
        .send()
        .await?;
    let status = resp.status();
    if status != StatusCode::OK {
        return Err(LookupError::Http {
            status: status.as_u16(),
        });
    }

    let payload: GraphQlResponse<T> = resp.json().await?;
    if let Some(errors) = payload.errors.filter(|e| !e.is_empty()) {
        let message = errors
            .into_iter()
            .filter_map(|e| e.message)
            .collect::<Vec<_>>()
            .join("; ");
        return Err(LookupError::Remote {
            message: if message.is_empty() {
                "unspecified upstream error".to_string()
            } else {
                message
            },
        });
    }
    Ok(payload.data)
}

/// Accept a JSON string or number where upstreams disagree on the type.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
