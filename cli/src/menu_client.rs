use std::time::Duration;

use anyhow::{Context, Result};
use tracing::debug;

use bistro_core::Error;
use bistro_core::models::MenuItem;
use bistro_core::remote::{MenuSource, parse_menu_document};

use crate::config::Config;

pub struct HttpMenuClient {
    client: reqwest::Client,
    url: String,
}

impl HttpMenuClient {
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_url(&config.menu_url, config.timeout, config.connect_timeout)
    }

    pub fn with_url(url: &str, timeout: Duration, connect_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(format!("bistro/{} (menu companion)", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    pub async fn fetch_menu_async(&self) -> bistro_core::Result<Vec<MenuItem>> {
        debug!(url = %self.url, "fetching menu document");
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::network(&self.url, describe(&e)))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::network(&self.url, format!("HTTP {status}")));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| Error::network(&self.url, describe(&e)))?;

        parse_menu_document(&body)
    }
}

fn describe(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        format!("could not connect: {err}")
    } else {
        err.to_string()
    }
}

impl MenuSource for HttpMenuClient {
    fn fetch_menu(&self) -> impl Future<Output = bistro_core::Result<Vec<MenuItem>>> + Send {
        self.fetch_menu_async()
    }
}
