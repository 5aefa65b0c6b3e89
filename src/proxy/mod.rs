// Generative model proxy
// Forwards prompts to the Gemini generateContent API using a key held by the server


use std::time::Duration;

use anyhow::Context;
use serde::Serialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::GenerativeConfig;
use crate::{QaError, Result};

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

/// Blocking client for the upstream generative language API
#[derive(Debug, Clone)]
pub struct GenerativeClient {
    endpoint: Url,
    model: String,
    api_key_env: String,
    agent: ureq::Agent,
}

impl GenerativeClient {
    #[inline]
    pub fn new(config: &GenerativeConfig) -> Result<Self> {
        let endpoint = config
            .endpoint_url()
            .map_err(|e| QaError::Configuration(e.to_string()))?;

        // Upstream error statuses are read and reported, not turned into transport errors
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_seconds)))
            .http_status_as_error(false)
            .build()
            .into();

        Ok(Self {
            endpoint,
            model: config.model.clone(),
            api_key_env: config.api_key_env.clone(),
            agent,
        })
    }

    #[inline]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send `prompt` upstream and return its JSON response unchanged.
    ///
    /// The key is read from the environment on every call so it can be
    /// rotated without a restart.
    #[inline]
    pub fn generate(&self, prompt: &str) -> Result<serde_json::Value> {
        let api_key = std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(QaError::MissingApiKey)?;

        let url = self.request_url(&api_key)?;
        let request = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
        };
        let request_json =
            serde_json::to_string(&request).context("Failed to serialize generate request")?;

        debug!(
            "Forwarding prompt of {} characters to model {}",
            prompt.chars().count(),
            self.model
        );

        let mut response = self
            .agent
            .post(url.as_str())
            .header("Content-Type", "application/json")
            .send(&request_json)
            .map_err(|e| {
                let message = e.to_string().replace(&api_key, "***");
                warn!("Generative API request failed: {}", message);
                QaError::Network(message)
            })?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| QaError::Network(e.to_string().replace(&api_key, "***")))?;

        if !(200..300).contains(&status) {
            warn!("Generative API returned status {}", status);
            return Err(QaError::Upstream { status, body });
        }

        info!("Generative API answered with status {}", status);
        let value =
            serde_json::from_str(&body).context("Failed to parse generative API response")?;
        Ok(value)
    }

    fn request_url(&self, api_key: &str) -> Result<Url> {
        let base = self.endpoint.as_str().trim_end_matches('/');
        let mut url = Url::parse(&format!(
            "{}/v1beta/models/{}:generateContent",
            base, self.model
        ))
        .context("Failed to build generative API URL")?;
        url.query_pairs_mut().append_pair("key", api_key);
        Ok(url)
    }
}
