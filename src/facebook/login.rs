//! Long-lived token exchange.

use serde_json::Value as Json;
use tracing::{info, instrument};

use crate::framework::{Client, RequestDescriptor, ResourceError};

/// Exchanges a short-lived user token for a long-lived one and returns a copy
/// of `client` carrying it.
///
/// Blank app credentials are a `Request` error and nothing is sent. A refused
/// exchange, or an answer without `access_token`, is a `Login` error holding
/// the platform response.
#[instrument(skip_all, fields(app_id = app_id))]
pub async fn login(
    client: &Client,
    app_id: &str,
    app_secret: &str,
    short_lived_token: &str,
) -> Result<Client, ResourceError> {
    let missing: Vec<&str> = [("app_id", app_id), ("app_secret", app_secret)]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();
    if !missing.is_empty() {
        return Err(ResourceError::Request(format!(
            "Cannot log in without {}",
            missing.join(" and ")
        )));
    }

    let request = RequestDescriptor::get(client.url("oauth/access_token"))
        .param("client_id", app_id)
        .param("client_secret", app_secret)
        .param("grant_type", "fb_exchange_token")
        .param("fb_exchange_token", short_lived_token);
    let response = client.execute(&request).await;

    let token = response
        .is_success()
        .then(|| response.body().get("access_token").and_then(Json::as_str))
        .flatten()
        .map(str::to_string);
    match token {
        Some(token) => {
            info!("Exchanged access token");
            Ok(client.clone().with_access_token(token))
        }
        None => Err(ResourceError::Login {
            response: Box::new(response),
        }),
    }
}
