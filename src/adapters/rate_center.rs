use crate::domain::model::RateCenterRecord;
use crate::domain::ports::RateCenterLookup;
use crate::utils::error::{LookupFailure, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// NPA-NXX prefix lookup against the public local-calling-guide service.
/// The response is a small XML document with one `prefixdata` element.
pub struct LocalCallingGuideClient {
    base_url: String,
    client: Client,
}

impl LocalCallingGuideClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }
}

#[async_trait]
impl RateCenterLookup for LocalCallingGuideClient {
    async fn lookup_rate_center(
        &self,
        npa: &str,
        nxx: &str,
    ) -> std::result::Result<RateCenterRecord, LookupFailure> {
        let url = format!("{}/xmlprefix.php?npa={}&nxx={}", self.base_url, npa, nxx);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LookupFailure::new(format!("rate-center lookup: {}", e)))?;

        if !response.status().is_success() {
            return Err(LookupFailure::new(format!(
                "rate-center lookup returned status {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| LookupFailure::new(format!("rate-center lookup: {}", e)))?;
        parse_prefix_data(&body)
    }
}

fn parse_prefix_data(xml: &str) -> std::result::Result<RateCenterRecord, LookupFailure> {
    let document = roxmltree::Document::parse(xml)
        .map_err(|e| LookupFailure::new(format!("rate-center XML: {}", e)))?;

    let prefixdata = document
        .descendants()
        .find(|node| node.has_tag_name("prefixdata"))
        .ok_or_else(|| LookupFailure::new("rate-center response has no prefixdata element"))?;

    let field = |tag: &str| -> String {
        prefixdata
            .children()
            .find(|node| node.has_tag_name(tag))
            .and_then(|node| node.text())
            .unwrap_or("")
            .trim()
            .to_string()
    };

    let rate_center = field("rc");
    if rate_center.is_empty() {
        return Err(LookupFailure::new("prefixdata carries no rate center"));
    }

    Ok(RateCenterRecord {
        rate_center,
        block: field("x"),
        region: field("region"),
        switch: field("switch"),
        ocn: field("ocn"),
    })
}
