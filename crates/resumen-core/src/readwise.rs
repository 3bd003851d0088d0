use reqwest::Client;
use serde_json::json;
use tracing::info;

use crate::{
    config::Config,
    error::{ResumenError, Result},
    types::SaveConfirmation,
};

/// Save the rendered document to the read-later queue. Returns the service's
/// confirmation; any non-success status is fatal to the run.
pub async fn save_document(
    client: &Client,
    config: &Config,
    html: &str,
    title: &str,
    source_url: &str,
) -> Result<SaveConfirmation> {
    let url = format!("{}/api/v3/save/", config.endpoints.readwise_api);
    let payload = json!({
        "url": source_url,
        "html": html,
        "title": title,
        "author": "Video Resumen",
        "category": "video",
        "location": "new",
        "saved_using": "resumen",
    });

    let response = client
        .post(&url)
        .header(
            "Authorization",
            format!("Token {}", config.readwise_token),
        )
        .json(&payload)
        .timeout(config.timeouts.metadata)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ResumenError::Upstream {
            service: "readwise",
            reason: format!("HTTP {status}: {}", body.trim()),
        });
    }

    let confirmation: SaveConfirmation = response.json().await.unwrap_or_default();
    info!(id = ?confirmation.id, "document saved");
    Ok(confirmation)
}
