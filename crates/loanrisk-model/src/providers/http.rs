use std::collections::BTreeMap;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::HttpClassifierConfig;
use crate::error::ProviderError;
use crate::traits::ClassifierProvider;
use crate::types::{PredictionRequest, PredictionResponse};

/// Remote model server speaking `POST {base_url}/v1/predict`.
#[derive(Clone)]
pub struct HttpClassifierProvider {
    config: HttpClassifierConfig,
    client: Client,
}

impl HttpClassifierProvider {
    pub fn new(config: HttpClassifierConfig) -> Result<Self, ProviderError> {
        if config.base_url.trim().is_empty() {
            return Err(ProviderError::Config(
                "classifier base url is empty".to_string(),
            ));
        }
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/predict", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait::async_trait]
impl ClassifierProvider for HttpClassifierProvider {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn predict(
        &self,
        request: PredictionRequest,
    ) -> Result<PredictionResponse, ProviderError> {
        let payload = PredictPayload {
            schema: &request.features.schema,
            model: self.config.model.as_deref(),
            features: request.features.named(),
        };

        let mut builder = self.client.post(self.endpoint()).json(&payload);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }
        let res = builder.send().await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "classifier endpoint returned an error");
            if status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY {
                return Err(ProviderError::RejectedFeatures(format!(
                    "status {}: {body}",
                    status.as_u16()
                )));
            }
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: PredictResponse = res.json().await?;
        let Some(probability) = parsed.probability else {
            return Err(ProviderError::InvalidResponse(
                "no probability in response".to_string(),
            ));
        };

        Ok(PredictionResponse {
            provider: self.name().to_string(),
            model: parsed
                .model
                .or_else(|| self.config.model.clone())
                .unwrap_or_else(|| "remote".to_string()),
            probability,
        })
    }
}

#[derive(Debug, Serialize)]
struct PredictPayload<'a> {
    schema: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    features: BTreeMap<&'static str, f64>,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    probability: Option<f64>,
    model: Option<String>,
}
