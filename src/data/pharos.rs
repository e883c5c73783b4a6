//! Target metadata lookups against the Pharos GraphQL API.

use std::fmt;

use indexmap::IndexMap;
use reqwest::Client;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::json;
use tracing::{debug, instrument, warn};

use crate::{error::LookupError, genes::GeneSymbol};

/// Placeholder shown for fields the upstream left empty.
pub const NOT_AVAILABLE: &str = "N/A";

const TARGET_QUERY: &str = r#"
query getTarget($gene: String!, $top: Int!) {
  target(q: { sym: $gene }) {
    sym
    name
    tdl
    fam
    uniprot
    publications(top: $top) { pmid title journal date }
  }
}
"#;

/// Target development level as classified by the IDG programme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DevelopmentLevel {
    /// Targets of approved drugs.
    Tclin,
    /// Targets with potent small-molecule activity.
    Tchem,
    /// Targets with functional annotation.
    Tbio,
    /// Understudied targets.
    Tdark,
    Unknown(String),
}

impl DevelopmentLevel {
    pub fn from_code(code: Option<&str>) -> Self {
        match code.map(str::trim) {
            Some(c) if c.eq_ignore_ascii_case("tclin") => Self::Tclin,
            Some(c) if c.eq_ignore_ascii_case("tchem") => Self::Tchem,
            Some(c) if c.eq_ignore_ascii_case("tbio") => Self::Tbio,
            Some(c) if c.eq_ignore_ascii_case("tdark") => Self::Tdark,
            Some(c) if !c.is_empty() => Self::Unknown(c.to_string()),
            _ => Self::Unknown(NOT_AVAILABLE.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Self::Tclin => "Tclin",
            Self::Tchem => "Tchem",
            Self::Tbio => "Tbio",
            Self::Tdark => "Tdark",
            Self::Unknown(raw) => raw,
        }
    }
}

impl fmt::Display for DevelopmentLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for DevelopmentLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

/// Recent publication linked to a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Publication {
    pub id: String,
    pub title: String,
    pub journal: String,
    pub year: Option<String>,
}

/// Target metadata for one gene symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetRecord {
    pub symbol: String,
    pub display_name: String,
    pub development_level: DevelopmentLevel,
    pub family: String,
    pub primary_accession_id: Option<String>,
    pub publications: Vec<Publication>,
}

/// Client for the Pharos target endpoint.
#[derive(Debug, Clone)]
pub struct PharosClient {
    client: Client,
    endpoint: String,
    max_publications: usize,
}

impl PharosClient {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            max_publications: 10,
        }
    }

    pub fn with_publication_limit(mut self, max_publications: usize) -> Self {
        self.max_publications = max_publications;
        self
    }

    /// Look up every symbol in order; each result stands on its own.
    pub async fn lookup(
        &self,
        symbols: &[GeneSymbol],
    ) -> IndexMap<GeneSymbol, Result<TargetRecord, LookupError>> {
        let mut results = IndexMap::with_capacity(symbols.len());
        for symbol in symbols {
            if results.contains_key(symbol) {
                continue;
            }
            let result = self.lookup_one(symbol).await;
            results.insert(symbol.clone(), result);
        }
        results
    }

    #[instrument(skip(self), fields(gene = %symbol))]
    pub async fn lookup_one(&self, symbol: &GeneSymbol) -> Result<TargetRecord, LookupError> {
        let variables = json!({ "gene": symbol.as_str(), "top": self.max_publications });
        let data: Option<TargetData> =
            super::post_graphql(&self.client, &self.endpoint, TARGET_QUERY, variables)
                .await
                .inspect_err(|err| warn!(%err, "pharos lookup failed"))?;

        let Some(target) = data.and_then(|d| d.target) else {
            warn!("pharos returned no target");
            return Err(LookupError::NotFound);
        };
        let record = target.into_record(symbol, self.max_publications);
        debug!(
            level = %record.development_level,
            accession = ?record.primary_accession_id,
            publications = record.publications.len(),
            "resolved target"
        );
        Ok(record)
    }
}

#[derive(Debug, Deserialize)]
struct TargetData {
    target: Option<RawTarget>,
}

#[derive(Debug, Deserialize)]
struct RawTarget {
    sym: Option<String>,
    name: Option<String>,
    tdl: Option<String>,
    fam: Option<String>,
    uniprot: Option<String>,
    #[serde(default)]
    publications: Option<Vec<RawPublication>>,
}

#[derive(Debug, Deserialize)]
struct RawPublication {
    #[serde(default, deserialize_with = "super::lenient_string")]
    pmid: Option<String>,
    title: Option<String>,
    journal: Option<String>,
    date: Option<String>,
}

impl RawTarget {
    fn into_record(self, query: &GeneSymbol, max_publications: usize) -> TargetRecord {
        let publications = self
            .publications
            .unwrap_or_default()
            .into_iter()
            .take(max_publications)
            .map(RawPublication::into_publication)
            .collect();

        TargetRecord {
            symbol: non_blank(self.sym).unwrap_or_else(|| query.to_string()),
            display_name: or_not_available(self.name),
            development_level: DevelopmentLevel::from_code(self.tdl.as_deref()),
            family: or_not_available(self.fam),
            primary_accession_id: non_blank(self.uniprot),
            publications,
        }
    }
}

impl RawPublication {
    fn into_publication(self) -> Publication {
        Publication {
            id: or_not_available(self.pmid),
            title: or_not_available(self.title),
            journal: or_not_available(self.journal),
            year: non_blank(self.date).map(|d| d.chars().take(4).collect()),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn or_not_available(value: Option<String>) -> String {
    non_blank(value).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gene(raw: &str) -> GeneSymbol {
        GeneSymbol::parse(raw).unwrap()
    }

    async fn client_for(server: &MockServer) -> PharosClient {
        PharosClient::new(Client::new(), format!("{}/graphql", server.uri()))
    }

    #[test]
    fn development_level_parses_known_codes() {
        assert_eq!(DevelopmentLevel::from_code(Some("Tclin")), DevelopmentLevel::Tclin);
        assert_eq!(DevelopmentLevel::from_code(Some("tdark")), DevelopmentLevel::Tdark);
        assert_eq!(
            DevelopmentLevel::from_code(Some("Tnew")),
            DevelopmentLevel::Unknown("Tnew".into())
        );
        assert_eq!(DevelopmentLevel::from_code(None).code(), NOT_AVAILABLE);
    }

    #[tokio::test]
    async fn maps_target_fields_and_truncates_years() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_string_contains("\"gene\":\"EGFR\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "target": {
                        "sym": "EGFR",
                        "name": "Epidermal growth factor receptor",
                        "tdl": "Tclin",
                        "fam": "Kinase",
                        "uniprot": "P00533",
                        "publications": [
                            {
                                "pmid": 38000001,
                                "title": "EGFR in NSCLC",
                                "journal": "Nature",
                                "date": "2023-11-02"
                            },
                            {"pmid": "37000002", "title": null, "journal": "Cell", "date": null}
                        ]
                    }
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let record = client_for(&server).await.lookup_one(&gene("egfr")).await.unwrap();
        assert_eq!(record.symbol, "EGFR");
        assert_eq!(record.development_level, DevelopmentLevel::Tclin);
        assert_eq!(record.family, "Kinase");
        assert_eq!(record.primary_accession_id.as_deref(), Some("P00533"));
        assert_eq!(record.publications.len(), 2);
        assert_eq!(record.publications[0].id, "38000001");
        assert_eq!(record.publications[0].year.as_deref(), Some("2023"));
        assert_eq!(record.publications[1].title, NOT_AVAILABLE);
        assert_eq!(record.publications[1].year, None);
    }

    #[tokio::test]
    async fn missing_fields_fall_back_to_sentinel() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "target": { "sym": "ETS2" } }
            })))
            .mount(&server)
            .await;

        let record = client_for(&server).await.lookup_one(&gene("ets2")).await.unwrap();
        assert_eq!(record.display_name, NOT_AVAILABLE);
        assert_eq!(record.family, NOT_AVAILABLE);
        assert_eq!(record.primary_accession_id, None);
        assert!(record.publications.is_empty());
    }

    #[tokio::test]
    async fn non_ok_status_is_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client_for(&server).await.lookup_one(&gene("egfr")).await.unwrap_err();
        assert_eq!(err, LookupError::Http { status: 404 });
    }

    #[tokio::test]
    async fn graphql_errors_are_remote_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errors": [{"message": "Cannot query field"}, {"message": "second"}]
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).await.lookup_one(&gene("egfr")).await.unwrap_err();
        assert_eq!(
            err,
            LookupError::Remote {
                message: "Cannot query field; second".into()
            }
        );
    }

    #[tokio::test]
    async fn null_target_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "data": { "target": null } })),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).await.lookup_one(&gene("nope1")).await.unwrap_err();
        assert_eq!(err, LookupError::NotFound);
    }

    #[tokio::test]
    async fn unreachable_upstream_is_connection_error() {
        let endpoint = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            format!("http://{}/graphql", listener.local_addr().unwrap())
        };

        let client = PharosClient::new(Client::new(), endpoint);
        let err = client.lookup_one(&gene("egfr")).await.unwrap_err();
        assert!(matches!(err, LookupError::Connection(_)));
    }

    #[tokio::test]
    async fn batch_lookup_keeps_order_and_isolates_failures() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("\"gene\":\"BAD1\""))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "target": { "sym": "X", "tdl": "Tbio" } }
            })))
            .mount(&server)
            .await;

        let symbols = vec![gene("tp53"), gene("bad1"), gene("kras")];
        let results = client_for(&server).await.lookup(&symbols).await;
        let keys: Vec<&str> = results.keys().map(GeneSymbol::as_str).collect();
        assert_eq!(keys, vec!["TP53", "BAD1", "KRAS"]);
        assert!(results["TP53"].is_ok());
        assert_eq!(results["BAD1"], Err(LookupError::Http { status: 500 }));
        assert!(results["KRAS"].is_ok());
    }
}
