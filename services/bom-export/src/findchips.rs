//! FindChips API Client
//!
//! Client for the FindChips parts-search API used to price BOM rows.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{error, info};

use kicad_bom_utils::{BomError, BomResult, PricingConfig};

pub const SERVICE_NAME: &str = "FindChips";
const SEARCH_PATH: &str = "/v1/search";

/// FindChips API client.
///
/// One client, and so one connection pool, is reused for every lookup of a
/// pricing pass.
pub struct FindChipsClient {
    client: Client,
    base_url: String,
    api_key: String,
    result_limit: u32,
}

impl FindChipsClient {
    pub fn new(config: &PricingConfig, api_key: impl Into<String>) -> BomResult<Self> {
        let mut builder = Client::builder();
        if let Some(seconds) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            result_limit: config.result_limit,
        })
    }

    /// Query parameters for one part lookup
    fn search_params(&self, part_number: &str) -> Vec<(&'static str, String)> {
        vec![
            ("apiKey", self.api_key.clone()),
            ("part", part_number.to_string()),
            ("limit", self.result_limit.to_string()),
            ("hostedOnly", "false".to_string()),
            ("authorizedOnly", "false".to_string()),
            ("exactMatch", "true".to_string()),
        ]
    }

    /// Looks up one manufacturer part number.
    ///
    /// Any non-success status is an error; the caller decides whether to
    /// carry on.
    pub async fn search(&self, part_number: &str) -> BomResult<SearchResponse> {
        let params = self.search_params(part_number);
        let url = format!("{}{}", self.base_url, SEARCH_PATH);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                error!("Request to online pricing engine failed: {}", e);
                info!("params: {}", redacted(&params));
                BomError::external_service(SERVICE_NAME, format!("Request for {} failed: {}", part_number, e))
            })?;

        let status = response.status();
        if !status.is_success() {
            error!(
                "Error returned by online pricing engine: {}",
                status.canonical_reason().unwrap_or("unknown status")
            );
            info!("params: {}", redacted(&params));
            return Err(BomError::external_service(
                SERVICE_NAME,
                format!("HTTP {} for part {}", status, part_number),
            ));
        }

        info!("Online Pricing: Retrieved for {}", part_number);
        info!("params: {}", redacted(&params));

        response.json::<SearchResponse>().await.map_err(|e| {
            error!("Could not decode pricing response for {}: {}", part_number, e);
            BomError::external_service(SERVICE_NAME, format!("Invalid response for {}: {}", part_number, e))
        })
    }
}

/// Query string for the log, with the API key masked
fn redacted(params: &[(&str, String)]) -> String {
    params
        .iter()
        .map(|(key, value)| match *key {
            "apiKey" => format!("{}=***", key),
            _ => format!("{}={}", key, value),
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Search response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub response: Vec<SupplierResult>,
}

/// Parts offered by one distributor
#[derive(Debug, Clone, Deserialize)]
pub struct SupplierResult {
    pub distributor: Distributor,
    #[serde(default)]
    pub parts: Vec<PartResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Distributor {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PartResult {
    #[serde(rename = "distributorItemNo", default)]
    pub distributor_item_no: Option<serde_json::Value>,
    #[serde(default)]
    pub price: Vec<PriceBreak>,
}

impl PartResult {
    /// Distributor's own part number, whether sent as a string or a number
    pub fn item_number(&self) -> Option<String> {
        match self.distributor_item_no.as_ref()? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Unit price from a minimum order quantity upwards
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PriceBreak {
    pub quantity: u64,
    pub price: serde_json::Number,
    #[serde(default)]
    pub currency: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> FindChipsClient {
        let config = PricingConfig {
            base_url: server.uri(),
            ..Default::default()
        };
        FindChipsClient::new(&config, "secret-key").unwrap()
    }

    #[test]
    fn test_decode_response() {
        let body = json!({
            "response": [{
                "distributor": { "name": "Digi-Key", "id": 1 },
                "parts": [
                    {
                        "distributorItemNo": "311-10.0KLRCT-ND",
                        "price": [
                            { "quantity": 1, "price": 0.1, "currency": "USD" },
                            { "quantity": 10, "price": 0.013, "currency": "USD" }
                        ]
                    },
                    { "distributorItemNo": 12345 },
                    { "price": [] }
                ]
            }]
        });

        let decoded: SearchResponse = serde_json::from_value(body).unwrap();
        let supplier = &decoded.response[0];
        assert_eq!(supplier.distributor.name, "Digi-Key");
        assert_eq!(supplier.parts.len(), 3);
        assert_eq!(supplier.parts[0].item_number().as_deref(), Some("311-10.0KLRCT-ND"));
        assert_eq!(supplier.parts[0].price[1].price.to_string(), "0.013");
        assert_eq!(supplier.parts[1].item_number().as_deref(), Some("12345"));
        assert!(supplier.parts[1].price.is_empty());
        assert_eq!(supplier.parts[2].item_number(), None);
    }

    #[test]
    fn test_redacted_params() {
        let config = PricingConfig::default();
        let client = FindChipsClient::new(&config, "secret-key").unwrap();
        let text = redacted(&client.search_params("LM358"));

        assert_eq!(
            text,
            "apiKey=***&part=LM358&limit=15&hostedOnly=false&authorizedOnly=false&exactMatch=true"
        );
    }

    #[tokio::test]
    async fn test_search_sends_expected_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("apiKey", "secret-key"))
            .and(query_param("part", "NE555DR"))
            .and(query_param("limit", "15"))
            .and(query_param("hostedOnly", "false"))
            .and(query_param("authorizedOnly", "false"))
            .and(query_param("exactMatch", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let response = client_for(&server).search("NE555DR").await.unwrap();
        assert!(response.response.is_empty());
    }

    #[tokio::test]
    async fn test_search_non_success_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let error = client_for(&server).search("NE555DR").await.unwrap_err();
        assert_eq!(error.error_code(), "EXTERNAL_SERVICE_ERROR");
        assert!(error.to_string().contains("403"));
        assert!(error.is_recoverable());
    }

    #[tokio::test]
    async fn test_search_bad_body_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let error = client_for(&server).search("NE555DR").await.unwrap_err();
        assert!(error.is_recoverable());
    }
}
