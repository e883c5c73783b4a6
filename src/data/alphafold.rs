//! Predicted-structure downloads from AlphaFold DB.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use urlencoding::encode;

use crate::error::LookupError;

/// Predicted structure for an accession id.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct StructurePrediction {
    pub source_url: Option<String>,
    /// Raw PDB file, passed through unmodified. Serialised as its size only.
    #[serde(rename = "size", serialize_with = "serialize_size")]
    pub file_bytes: Option<Vec<u8>>,
}

fn serialize_size<S: serde::Serializer>(
    bytes: &Option<Vec<u8>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(bytes.as_ref().map_or(0, Vec::len) as u64)
}

impl StructurePrediction {
    pub fn size(&self) -> usize {
        self.file_bytes.as_ref().map_or(0, Vec::len)
    }
}

/// Client for the AlphaFold DB prediction API.
#[derive(Debug, Clone)]
pub struct AlphaFoldClient {
    client: Client,
    base_url: String,
}

impl AlphaFoldClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn prediction_url(&self, accession_id: &str) -> String {
        format!(
            "{}/api/prediction/{}",
            self.base_url.trim_end_matches('/'),
            encode(accession_id)
        )
    }

    /// Resolve the structure file for an accession id.
    ///
    /// The file URL only comes from the prediction index, so this always takes two
    /// round trips. Any failure along the way reads as "no structure".
    pub async fn resolve(&self, accession_id: Option<&str>) -> Option<StructurePrediction> {
        let accession_id = accession_id.map(str::trim).filter(|id| !id.is_empty())?;
        match self.try_resolve(accession_id).await {
            Ok(Some(prediction)) => Some(prediction),
            Ok(None) => {
                debug!(accession = accession_id, "no alphafold prediction listed");
                None
            }
            Err(err) => {
                warn!(accession = accession_id, %err, "no structure data");
                None
            }
        }
    }

    #[instrument(skip(self))]
    async fn try_resolve(
        &self,
        accession_id: &str,
    ) -> Result<Option<StructurePrediction>, LookupError> {
        let resp = self.client.get(self.prediction_url(accession_id)).send().await?;
        if !resp.status().is_success() {
            return Err(LookupError::Http {
                status: resp.status().as_u16(),
            });
        }
        let entries: Vec<PredictionEntry> = resp.json().await?;
        let Some(pdb_url) = entries.into_iter().next().and_then(|e| e.pdb_url) else {
            return Ok(None);
        };

        let resp = self.client.get(&pdb_url).send().await?;
        if !resp.status().is_success() {
            return Err(LookupError::Http {
                status: resp.status().as_u16(),
            });
        }
        let bytes = resp.bytes().await?;
        info!(url = %pdb_url, size = bytes.len(), "downloaded predicted structure");

        Ok(Some(StructurePrediction {
            source_url: Some(pdb_url),
            file_bytes: Some(bytes.to_vec()),
        }))
    }
}

#[derive(Debug, Deserialize)]
struct PredictionEntry {
    #[serde(rename = "pdbUrl")]
    pdb_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PDB: &str = "HEADER    PREDICTED STRUCTURE\nATOM      1  N   MET A   1\nEND\n";

    #[tokio::test]
    async fn resolves_index_then_downloads_file() {
        let server = MockServer::start().await;
        let file_url = format!("{}/files/AF-P00533-F1-model_v4.pdb", server.uri());
        Mock::given(method("GET"))
            .and(path("/api/prediction/P00533"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{ "pdbUrl": file_url }])),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/files/AF-P00533-F1-model_v4.pdb"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PDB))
            .expect(1)
            .mount(&server)
            .await;

        let client = AlphaFoldClient::new(Client::new(), server.uri());
        let prediction = client.resolve(Some("P00533")).await.unwrap();
        assert_eq!(prediction.source_url.as_deref(), Some(file_url.as_str()));
        assert_eq!(prediction.file_bytes.as_deref(), Some(PDB.as_bytes()));
        assert_eq!(prediction.size(), PDB.len());
    }

    #[tokio::test]
    async fn empty_index_is_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/prediction/P00533"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let client = AlphaFoldClient::new(Client::new(), server.uri());
        assert_eq!(client.resolve(Some("P00533")).await, None);
    }

    #[tokio::test]
    async fn failed_file_download_is_absent() {
        let server = MockServer::start().await;
        let file_url = format!("{}/files/missing.pdb", server.uri());
        Mock::given(method("GET"))
            .and(path("/api/prediction/Q99999"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{ "pdbUrl": file_url }])),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/files/missing.pdb"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = AlphaFoldClient::new(Client::new(), server.uri());
        assert_eq!(client.resolve(Some("Q99999")).await, None);
    }

    #[tokio::test]
    async fn absent_accession_skips_the_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = AlphaFoldClient::new(Client::new(), server.uri());
        assert_eq!(client.resolve(None).await, None);
    }
}
