use crate::domain::model::{AddressRecord, PhoneNumber, TrunkDids};
use crate::domain::ports::{DidRegistry, EmergencyRecords};
use crate::utils::error::{LookupFailure, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

const DID_PAGE_SIZE: usize = 1000;

/// uControl REST client, bound to one credential scope (911 or non-911).
/// Classification needs one instance per scope.
pub struct UControlClient {
    base_url: String,
    username: String,
    password: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct SipTrunk {
    #[serde(rename = "Number")]
    number: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TrunkDid {
    #[serde(rename = "Number")]
    number: Option<u64>,
}

impl UControlClient {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into(),
            username: username.into(),
            password: password.into(),
            client,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        what: &str,
    ) -> std::result::Result<T, LookupFailure> {
        let response = self
            .client
            .get(url)
            .basic_auth(&self.username, Some(&self.password))
            .header("Content-Type", "text/json")
            .header("Accept", "text/json")
            .send()
            .await
            .map_err(|e| LookupFailure::new(format!("{}: {}", what, e)))?;

        if !response.status().is_success() {
            return Err(LookupFailure::new(format!(
                "{} returned status {}",
                what,
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| LookupFailure::new(format!("{}: unparsable response: {}", what, e)))
    }

    async fn dids_for_trunk(&self, trunk: u64) -> std::result::Result<Vec<u64>, LookupFailure> {
        let mut numbers = Vec::new();
        let mut page_from = 0usize;
        loop {
            let url = format!(
                "{}/SipTrunks/{}/Dids?PageFrom={}&PageSize={}",
                self.base_url, trunk, page_from, DID_PAGE_SIZE
            );
            let page: Vec<TrunkDid> = self
                .get_json(&url, &format!("DID listing for trunk {}", trunk))
                .await?;
            let page_len = page.len();
            numbers.extend(page.into_iter().filter_map(|did| did.number));
            if page_len < DID_PAGE_SIZE {
                break;
            }
            page_from += DID_PAGE_SIZE;
        }
        Ok(numbers)
    }
}

#[async_trait]
impl DidRegistry for UControlClient {
    async fn lookup_dids(&self) -> std::result::Result<Vec<TrunkDids>, LookupFailure> {
        let url = format!("{}/SipTrunks", self.base_url);
        let trunks: Vec<SipTrunk> = self.get_json(&url, "SIP trunk listing").await?;

        let mut result = Vec::new();
        for trunk in trunks.into_iter().filter_map(|t| t.number) {
            let numbers = self.dids_for_trunk(trunk).await?;
            result.push(TrunkDids {
                trunk_id: trunk.to_string(),
                numbers,
            });
        }
        Ok(result)
    }
}

#[async_trait]
impl EmergencyRecords for UControlClient {
    async fn lookup_emergency_record(
        &self,
        number: &PhoneNumber,
    ) -> std::result::Result<Option<AddressRecord>, LookupFailure> {
        let url = format!("{}/V911s/{}", self.base_url, number);
        let response = self
            .client
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .header("Content-Type", "text/json")
            .header("Accept", "text/json")
            .send()
            .await
            .map_err(|e| LookupFailure::new(format!("911 record lookup: {}", e)))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(LookupFailure::new(format!(
                "911 record lookup returned status {}",
                response.status()
            )));
        }

        let record: AddressRecord = response
            .json()
            .await
            .map_err(|e| LookupFailure::new(format!("911 record lookup: unparsable response: {}", e)))?;
        Ok(Some(record))
    }
}
