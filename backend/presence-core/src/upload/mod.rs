//! Optional upload of the full system info to a paste service.
//!
//! The returned link becomes a button on the presence display. Failure is
//! never fatal; callers log it and carry on without the button.

use crate::error::upload::UploadError;

use common::ErrorLocation;

use std::panic::Location;
use std::time::Duration;

use log::{debug, info};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use url::Url;

const PLAIN_TEXT: &str = "text/plain; charset=utf-8";

#[derive(Clone)]
pub struct PasteClient {
    endpoint: Url,
    client: Client,
}

impl PasteClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, UploadError> {
        let endpoint = Url::parse(endpoint)?;
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { endpoint, client })
    }

    /// POST `text` and return the link the service answers with.
    ///
    /// # Errors
    ///
    /// - [`UploadError::Http`] on transport failure or timeout
    /// - [`UploadError::Status`] unless the service answers 200 or 201
    /// - [`UploadError::InvalidResponse`] if the body is not an http(s) URL
    pub async fn upload(&self, text: &str) -> Result<Url, UploadError> {
        debug!("Uploading {} bytes to {}", text.len(), self.endpoint);

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, PLAIN_TEXT)
            .body(text.to_string())
            .send()
            .await?;

        let status = response.status().as_u16();
        if status != 200 && status != 201 {
            return Err(UploadError::Status {
                status_code: status,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let body = response.text().await?;
        let link = body.trim();

        let url = Url::parse(link).map_err(|e| UploadError::InvalidResponse {
            message: format!("Response is not a URL ({e})"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(UploadError::InvalidResponse {
                message: format!("Unexpected URL scheme: {}", url.scheme()),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        info!("Uploaded system info to {url}");
        Ok(url)
    }
}
