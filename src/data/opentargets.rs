//! Known-drug and disease-association counts from the Open Targets platform.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, instrument, warn};

use crate::error::LookupError;

const ASSOCIATION_QUERY: &str = r#"
query targetByUniprot($uId: [String!]!) {
  mapIds(queryTerms: $uId) {
    mappings {
      hits {
        object {
          ... on Target {
            knownDrugs { count rows { drug { name } phase status } }
            associatedDiseases { count }
          }
        }
      }
    }
  }
}
"#;

/// One clinical-candidate row for a target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrugRow {
    pub name: String,
    pub phase: Option<f64>,
    pub status: Option<String>,
}

impl DrugRow {
    /// Phase formatted for tables: `4`, `0.5`, or `N/A`.
    pub fn phase_label(&self) -> String {
        match self.phase {
            Some(p) if p.fract() == 0.0 => format!("{p:.0}"),
            Some(p) => p.to_string(),
            None => super::pharos::NOT_AVAILABLE.to_string(),
        }
    }
}

/// Drug and disease association summary for a target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrugAssociation {
    pub known_drug_count: u64,
    pub drugs: Vec<DrugRow>,
    pub associated_disease_count: u64,
}

impl DrugAssociation {
    /// First `n` drug rows, for views that only show a top list.
    pub fn top(&self, n: usize) -> &[DrugRow] {
        &self.drugs[..n.min(self.drugs.len())]
    }
}

/// Client for the Open Targets GraphQL endpoint.
#[derive(Debug, Clone)]
pub struct OpenTargetsClient {
    client: Client,
    endpoint: String,
}

impl OpenTargetsClient {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Fetch associations for an accession id.
    ///
    /// Every failure reads as "no data"; the cause is only logged.
    pub async fn fetch(&self, accession_id: Option<&str>) -> Option<DrugAssociation> {
        let accession_id = accession_id.map(str::trim).filter(|id| !id.is_empty())?;
        match self.try_fetch(accession_id).await {
            Ok(association) => Some(association),
            Err(err) => {
                warn!(accession = accession_id, %err, "no drug association data");
                None
            }
        }
    }

    #[instrument(skip(self))]
    async fn try_fetch(&self, accession_id: &str) -> Result<DrugAssociation, LookupError> {
        let variables = json!({ "uId": [accession_id] });
        let data: Option<MapIdsData> =
            super::post_graphql(&self.client, &self.endpoint, ASSOCIATION_QUERY, variables)
                .await?;

        let target = data
            .and_then(|d| d.map_ids)
            .and_then(|m| m.mappings.into_iter().next())
            .and_then(|m| m.hits.into_iter().next())
            .and_then(|h| h.object)
            .ok_or(LookupError::NotFound)?;

        let known = target.known_drugs.unwrap_or_default();
        let drugs: Vec<DrugRow> = known
            .rows
            .into_iter()
            .map(|row| DrugRow {
                name: row
                    .drug
                    .and_then(|d| d.name)
                    .unwrap_or_else(|| super::pharos::NOT_AVAILABLE.to_string()),
                phase: row.phase,
                status: row.status,
            })
            .collect();
        debug!(count = known.count, rows = drugs.len(), "resolved known drugs");

        Ok(DrugAssociation {
            known_drug_count: known.count,
            drugs,
            associated_disease_count: target.associated_diseases.map(|d| d.count).unwrap_or(0),
        })
    }
}

#[derive(Debug, Deserialize)]
struct MapIdsData {
    #[serde(rename = "mapIds")]
    map_ids: Option<MapIds>,
}

#[derive(Debug, Deserialize)]
struct MapIds {
    #[serde(default)]
    mappings: Vec<Mapping>,
}

#[derive(Debug, Deserialize)]
struct Mapping {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    object: Option<TargetObject>,
}

#[derive(Debug, Deserialize)]
struct TargetObject {
    #[serde(rename = "knownDrugs")]
    known_drugs: Option<KnownDrugs>,
    #[serde(rename = "associatedDiseases")]
    associated_diseases: Option<Count>,
}

#[derive(Debug, Default, Deserialize)]
struct KnownDrugs {
    #[serde(default)]
    count: u64,
    #[serde(default)]
    rows: Vec<KnownDrugRow>,
}

#[derive(Debug, Deserialize)]
struct KnownDrugRow {
    drug: Option<DrugName>,
    phase: Option<f64>,
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DrugName {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Count {
    #[serde(default)]
    count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> OpenTargetsClient {
        OpenTargetsClient::new(Client::new(), format!("{}/api/v4/graphql", server.uri()))
    }

    #[tokio::test]
    async fn maps_known_drugs_and_disease_count() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v4/graphql"))
            .and(body_string_contains("\"uId\":[\"P00533\"]"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "mapIds": { "mappings": [ { "hits": [ { "object": {
                    "knownDrugs": {
                        "count": 3,
                        "rows": [
                            {"drug": {"name": "OSIMERTINIB"}, "phase": 4.0, "status": "Completed"},
                            {"drug": {"name": "GEFITINIB"}, "phase": 0.5, "status": null},
                            {"drug": null, "phase": null, "status": "Recruiting"}
                        ]
                    },
                    "associatedDiseases": { "count": 1520 }
                } } ] } ] } }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let association = client_for(&server).fetch(Some("P00533")).await.unwrap();
        assert_eq!(association.known_drug_count, 3);
        assert_eq!(association.associated_disease_count, 1520);
        assert_eq!(association.drugs.len(), 3);
        assert_eq!(association.drugs[0].name, "OSIMERTINIB");
        assert_eq!(association.drugs[0].phase_label(), "4");
        assert_eq!(association.drugs[1].phase_label(), "0.5");
        assert_eq!(association.drugs[2].name, "N/A");
        assert_eq!(association.top(2).len(), 2);
        assert_eq!(association.top(10).len(), 3);
    }

    #[tokio::test]
    async fn target_without_drugs_reports_zero() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "mapIds": { "mappings": [ { "hits": [ { "object": {
                    "knownDrugs": null,
                    "associatedDiseases": { "count": 4 }
                } } ] } ] } }
            })))
            .mount(&server)
            .await;

        let association = client_for(&server).fetch(Some("Q9Y6K9")).await.unwrap();
        assert_eq!(association.known_drug_count, 0);
        assert!(association.drugs.is_empty());
        assert_eq!(association.associated_disease_count, 4);
    }

    #[tokio::test]
    async fn absent_accession_skips_the_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert_eq!(client.fetch(None).await, None);
        assert_eq!(client.fetch(Some("  ")).await, None);
    }

    #[tokio::test]
    async fn failures_collapse_to_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("P11111"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_string_contains("P22222"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "data": { "mapIds": { "mappings": [] } } })),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_string_contains("P33333"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert_eq!(client.fetch(Some("P11111")).await, None);
        assert_eq!(client.fetch(Some("P22222")).await, None);
        assert_eq!(client.fetch(Some("P33333")).await, None);
    }
}
