use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::Block;

const NOTION_VERSION: &str = "2022-06-28";
const REQUEST_TIMEOUT_SECS: u64 = 60;
const MAX_RETRIES: u32 = 3;
const BASE_BACKOFF_MS: u64 = 2000;

/// Page returned by `POST /pages`.
#[derive(Debug, Deserialize)]
pub struct CreatedPage {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// Minimal Notion client: page creation and child appends. Every call is
/// retried whole on rate limiting and server errors.
pub struct NotionClient {
    http: reqwest::Client,
    api_url: String,
    secret: String,
}

impl NotionClient {
    pub fn new(api_url: &str, secret: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            secret: secret.to_string(),
        })
    }

    pub async fn create_page(
        &self,
        parent_page_id: &str,
        title: &str,
        children: &[Block],
    ) -> Result<CreatedPage> {
        let body = page_request(parent_page_id, title, children);
        let value = self.send(Method::POST, "pages", &body).await?;
        serde_json::from_value(value).context("Unexpected response from page creation")
    }

    pub async fn append_children(&self, block_id: &str, children: &[Block]) -> Result<()> {
        let body = json!({ "children": children });
        self.send(Method::PATCH, &format!("blocks/{block_id}/children"), &body)
            .await?;
        Ok(())
    }

    async fn send(&self, method: Method, path: &str, body: &Value) -> Result<Value> {
        let url = format!("{}/{}", self.api_url, path);
        let mut attempt = 0;
        loop {
            debug!("{} {} (attempt {})", method, url, attempt + 1);
            let response = self
                .http
                .request(method.clone(), &url)
                .bearer_auth(&self.secret)
                .header("Notion-Version", NOTION_VERSION)
                .json(body)
                .send()
                .await;

            let reason = match response {
                Ok(resp) if resp.status().is_success() => {
                    return resp
                        .json()
                        .await
                        .with_context(|| format!("Invalid JSON from {} {}", method, path));
                }
                Ok(resp) if should_retry(resp.status()) => format!("HTTP {}", resp.status()),
                Ok(resp) => {
                    let status = resp.status();
                    let text = resp.text().await.unwrap_or_default();
                    bail!("{} {} failed with {}: {}", method, path, status, text);
                }
                Err(e) if e.is_timeout() || e.is_connect() => e.to_string(),
                Err(e) => {
                    return Err(e).with_context(|| format!("{} {} failed", method, path));
                }
            };

            if attempt == MAX_RETRIES {
                bail!(
                    "{} {} failed after {} attempts: {}",
                    method,
                    path,
                    MAX_RETRIES + 1,
                    reason
                );
            }

            let backoff = Duration::from_millis(BASE_BACKOFF_MS * 2u64.pow(attempt));
            warn!(
                "{} on {} {} (attempt {}/{}), backing off {:.1}s",
                reason,
                method,
                path,
                attempt + 1,
                MAX_RETRIES,
                backoff.as_secs_f64()
            );
            tokio::time::sleep(backoff).await;
            attempt += 1;
        }
    }
}

fn should_retry(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn page_request(parent_page_id: &str, title: &str, children: &[Block]) -> Value {
    json!({
        "parent": { "type": "page_id", "page_id": parent_page_id },
        "properties": {
            "title": [{ "type": "text", "text": { "content": title } }]
        },
        "children": children,
    })
}
