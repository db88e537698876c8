use crate::config::PortOrderMetadata;
use crate::domain::model::{PhoneNumber, SubmissionReceipt};
use crate::domain::ports::{CredentialMinter, PortSubmitter};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::json;
use std::path::Path;
use std::time::Duration;

const CREDENTIAL_VALIDITY_SECONDS: i64 = 30;

/// OneVoice LNP order client. One POST per rate-center group; a transport
/// error is a hard failure, a carrier rejection comes back as a receipt.
pub struct OneVoiceClient {
    endpoint: String,
    client: Client,
}

impl OneVoiceClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }
}

#[async_trait]
impl PortSubmitter for OneVoiceClient {
    async fn submit_port_request(
        &self,
        numbers: &[PhoneNumber],
        metadata: &PortOrderMetadata,
        credential: &str,
    ) -> Result<SubmissionReceipt> {
        let payload = build_payload(numbers, metadata);
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(credential)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(SubmissionReceipt {
                success: true,
                errors: Vec::new(),
            });
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Ok(SubmissionReceipt {
                success: false,
                errors: vec![format!("authentication rejected (status {})", status)],
            });
        }

        let body = response.text().await.unwrap_or_default();
        Ok(SubmissionReceipt {
            success: false,
            errors: extract_errors(status, &body),
        })
    }
}

fn build_payload(numbers: &[PhoneNumber], metadata: &PortOrderMetadata) -> serde_json::Value {
    json!({
        "type": "lnp",
        "parameters": {
            "provider_type": "wireline",
            "requested_due_date": metadata.requested_due_date,
            "address": {
                "street_name": metadata.address.street_name,
                "street_number": metadata.address.street_number,
                "city": metadata.address.city,
                "region": metadata.address.region,
                "postal_code": metadata.address.postal_code,
            },
            "existing_account_num": metadata.existing_account_num,
            "local_service_provider": metadata.local_service_provider,
            "end_user_name": metadata.end_user_name,
            "dids": numbers,
            "did_ranges": [],
            "loa_date": metadata.loa_date,
            "customer_specific_object": {
                "transaction_id": metadata.customer.transaction_id,
                "customer_id": metadata.customer.customer_id,
            },
        },
    })
}

// The carrier reports rejections as {"errors": [...]} where entries may be
// plain strings or structured objects.
fn extract_errors(status: StatusCode, body: &str) -> Vec<String> {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(entries) = value.get("errors").and_then(|e| e.as_array()) {
            let errors: Vec<String> = entries
                .iter()
                .map(|entry| match entry.as_str() {
                    Some(text) => text.to_string(),
                    None => entry.to_string(),
                })
                .collect();
            if !errors.is_empty() {
                return errors;
            }
        }
    }
    vec![format!("port request rejected (status {}): {}", status, body)]
}

/// Mints the short-lived RS256 token OneVoice requires per call. Tokens are
/// valid for ~30 s, so nothing is cached here.
pub struct JwtMinter {
    encoding_key: EncodingKey,
    application_name: String,
    security_id: String,
}

#[derive(Serialize)]
struct OneVoiceClaims<'a> {
    iss: &'a str,
    aud: &'a str,
    exp: i64,
    sid: &'a str,
}

impl JwtMinter {
    pub fn from_pem_file(
        path: impl AsRef<Path>,
        application_name: impl Into<String>,
        security_id: impl Into<String>,
    ) -> Result<Self> {
        let pem = std::fs::read(path)?;
        let encoding_key = EncodingKey::from_rsa_pem(&pem)?;
        Ok(Self {
            encoding_key,
            application_name: application_name.into(),
            security_id: security_id.into(),
        })
    }
}

impl CredentialMinter for JwtMinter {
    fn mint(&self) -> Result<String> {
        let claims = OneVoiceClaims {
            iss: &self.application_name,
            aud: "OneVoice",
            exp: (Utc::now() + chrono::Duration::seconds(CREDENTIAL_VALIDITY_SECONDS)).timestamp(),
            sid: &self.security_id,
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::RS256),
            &claims,
            &self.encoding_key,
        )?;
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::carrier::{CustomerTag, ServiceAddress};
    use chrono::NaiveDate;
    use httpmock::prelude::*;

    fn metadata() -> PortOrderMetadata {
        PortOrderMetadata {
            end_user_name: "Acme Corp".to_string(),
            existing_account_num: "555-111-222".to_string(),
            local_service_provider: "AB12".to_string(),
            loa_date: NaiveDate::from_ymd_opt(2023, 9, 15).unwrap(),
            requested_due_date: NaiveDate::from_ymd_opt(2023, 10, 10).unwrap(),
            address: ServiceAddress {
                street_number: "456".to_string(),
                street_name: "Main St".to_string(),
                city: "Montreal".to_string(),
                region: "QC".to_string(),
                postal_code: "H3A1A1".to_string(),
            },
            customer: CustomerTag {
                transaction_id: "trans123".to_string(),
                customer_id: "cust456".to_string(),
            },
        }
    }

    fn numbers(raw: &[&str]) -> Vec<PhoneNumber> {
        raw.iter().map(|n| PhoneNumber::parse(n).unwrap()).collect()
    }

    #[test]
    fn test_payload_shape() {
        let payload = build_payload(&numbers(&["5145551111", "5145552222"]), &metadata());
        assert_eq!(payload["type"], "lnp");
        let parameters = &payload["parameters"];
        assert_eq!(parameters["provider_type"], "wireline");
        assert_eq!(parameters["dids"], json!(["5145551111", "5145552222"]));
        assert_eq!(parameters["did_ranges"], json!([]));
        assert_eq!(parameters["loa_date"], "2023-09-15");
        assert_eq!(parameters["requested_due_date"], "2023-10-10");
        assert_eq!(parameters["end_user_name"], "Acme Corp");
        assert_eq!(parameters["address"]["postal_code"], "H3A1A1");
        assert_eq!(
            parameters["customer_specific_object"]["transaction_id"],
            "trans123"
        );
    }

    #[test]
    fn test_extract_errors_from_structured_body() {
        let errors = extract_errors(
            StatusCode::BAD_REQUEST,
            r#"{"errors": ["LSP mismatch", {"code": 17, "detail": "bad LOA date"}]}"#,
        );
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0], "LSP mismatch");
        assert!(errors[1].contains("bad LOA date"));
    }

    #[test]
    fn test_extract_errors_falls_back_to_raw_body() {
        let errors = extract_errors(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("status 500"));
        assert!(errors[0].contains("boom"));
    }

    #[tokio::test]
    async fn test_successful_submission() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/v1/orders_lnp/")
                .header("Authorization", "Bearer token-0")
                .json_body_partial(r#"{"type": "lnp"}"#);
            then.status(200).json_body(json!({"order_id": "ord-1"}));
        });

        let client = OneVoiceClient::new(
            server.url("/api/v1/orders_lnp/"),
            Duration::from_secs(5),
        )
        .unwrap();
        let receipt = client
            .submit_port_request(&numbers(&["5145551111"]), &metadata(), "token-0")
            .await
            .unwrap();

        mock.assert();
        assert!(receipt.success);
        assert!(receipt.errors.is_empty());
    }

    #[tokio::test]
    async fn test_rejection_carries_structured_errors() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/v1/orders_lnp/");
            then.status(400)
                .json_body(json!({"errors": ["LSP mismatch"]}));
        });

        let client = OneVoiceClient::new(
            server.url("/api/v1/orders_lnp/"),
            Duration::from_secs(5),
        )
        .unwrap();
        let receipt = client
            .submit_port_request(&numbers(&["5145551111"]), &metadata(), "token-0")
            .await
            .unwrap();

        assert!(!receipt.success);
        assert_eq!(receipt.errors, vec!["LSP mismatch".to_string()]);
    }

    #[tokio::test]
    async fn test_expired_credential_is_a_clean_authentication_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/v1/orders_lnp/");
            then.status(401);
        });

        let client = OneVoiceClient::new(
            server.url("/api/v1/orders_lnp/"),
            Duration::from_secs(5),
        )
        .unwrap();
        let receipt = client
            .submit_port_request(&numbers(&["5145551111"]), &metadata(), "stale-token")
            .await
            .unwrap();

        assert!(!receipt.success);
        assert!(receipt.errors[0].contains("authentication rejected"));
    }
}
