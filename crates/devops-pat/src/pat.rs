//! PAT create/delete operations
//!
//! Wire format follows the `pats` endpoint of the Azure DevOps tokens API:
//! `POST {endpoint}?api-version=7.0-preview.1` to create and
//! `DELETE {endpoint}?api-version=7.0-preview.1&authorizationId={id}` to
//! revoke, both with bearer auth.

use chrono::{Months, SecondsFormat, Utc};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// API version pinned by the downstream contract.
pub const PAT_API_VERSION: &str = "7.0-preview.1";

/// A managed PAT. `id` is non-empty exactly when creation succeeded; the
/// `token` value cannot be read back from the API after issuance.
#[derive(Clone)]
pub struct PatRecord {
    pub name: String,
    pub scopes: String,
    pub id: String,
    pub token: String,
    pub valid_from: String,
    pub valid_to: String,
}

impl std::fmt::Debug for PatRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatRecord")
            .field("name", &self.name)
            .field("scopes", &self.scopes)
            .field("id", &self.id)
            .field("token", &"[REDACTED]")
            .field("valid_from", &self.valid_from)
            .field("valid_to", &self.valid_to)
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PatTokenBody {
    display_name: String,
    valid_to: String,
    scope: String,
    valid_from: String,
    authorization_id: String,
    token: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PatCreationResponse {
    pat_token: PatTokenBody,
    pat_token_error: Option<String>,
}

/// Create a PAT named `name` with the given scope string.
///
/// Expiration is a fixed policy of one year from now — rotation happens by
/// replacing the resource, not by extending it. The response body is decoded
/// even on failure so the server's `patTokenError` reaches the caller.
pub async fn create_pat(
    client: &reqwest::Client,
    endpoint: &str,
    bearer: &str,
    name: &str,
    scopes: &str,
) -> Result<PatRecord> {
    let valid_to = (Utc::now() + Months::new(12)).to_rfc3339_opts(SecondsFormat::Secs, true);

    debug!(name, scopes, valid_to, "creating PAT");
    let response = client
        .post(endpoint)
        .query(&[("api-version", PAT_API_VERSION)])
        .bearer_auth(bearer)
        .json(&serde_json::json!({
            "allOrgs": "false",
            "displayName": name,
            "scope": scopes,
            "validTo": valid_to,
        }))
        .send()
        .await
        .map_err(|e| Error::Http(format!("PAT create request failed: {e}")))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| Error::Http(format!("reading PAT create response failed: {e}")))?;

    if status.as_u16() != 200 {
        // Prefer the structured patTokenError when the body parses
        let message = serde_json::from_str::<PatCreationResponse>(&body)
            .ok()
            .and_then(|r| r.pat_token_error)
            .unwrap_or(body);
        return Err(Error::Api {
            status: status.as_u16(),
            message,
        });
    }

    let parsed: PatCreationResponse = serde_json::from_str(&body)
        .map_err(|e| Error::InvalidResponse(format!("PAT create body did not parse: {e}")))?;

    // The API reports some failures (bad scopes, policy blocks) as 200 with
    // an empty token and patTokenError set
    if parsed.pat_token.authorization_id.is_empty() {
        return Err(Error::Api {
            status: 200,
            message: parsed
                .pat_token_error
                .unwrap_or_else(|| "response contained no authorizationId".into()),
        });
    }

    info!(name, id = %parsed.pat_token.authorization_id, "PAT created");
    Ok(PatRecord {
        name: parsed.pat_token.display_name,
        scopes: parsed.pat_token.scope,
        id: parsed.pat_token.authorization_id,
        token: parsed.pat_token.token,
        valid_from: parsed.pat_token.valid_from,
        valid_to: parsed.pat_token.valid_to,
    })
}

/// Revoke the PAT with the given authorization id.
///
/// An empty id is a no-op success: the record was never created or is
/// already gone, and there is nothing to revoke. A failed delete leaves the
/// prior state untouched so the caller can retry.
pub async fn delete_pat(
    client: &reqwest::Client,
    endpoint: &str,
    bearer: &str,
    id: &str,
) -> Result<()> {
    if id.is_empty() {
        debug!("no PAT id, nothing to delete");
        return Ok(());
    }

    debug!(id, "deleting PAT");
    let response = client
        .delete(endpoint)
        .query(&[("api-version", PAT_API_VERSION), ("authorizationId", id)])
        .bearer_auth(bearer)
        .send()
        .await
        .map_err(|e| Error::Http(format!("PAT delete request failed: {e}")))?;

    let status = response.status().as_u16();
    if status != 200 && status != 204 {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));
        return Err(Error::Api {
            status,
            message: body,
        });
    }

    info!(id, "PAT deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn created_body() -> serde_json::Value {
        serde_json::json!({
            "patToken": {
                "displayName": "ci-token",
                "validTo": "2027-08-23T00:00:00Z",
                "scope": "vso.code vso.build_execute",
                "targetAccounts": ["org-1"],
                "validFrom": "2026-08-23T00:00:00Z",
                "authorizationId": "A1",
                "token": "P1",
            },
            "patTokenError": null,
        })
    }

    #[tokio::test]
    async fn create_with_200_maps_response_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/pats"))
            .and(query_param("api-version", PAT_API_VERSION))
            .and(header("Authorization", "Bearer T1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(created_body()))
            .expect(1)
            .mount(&server)
            .await;

        let record = create_pat(
            &reqwest::Client::new(),
            &format!("{}/pats", server.uri()),
            "T1",
            "ci-token",
            "vso.code vso.build_execute",
        )
        .await
        .unwrap();

        assert_eq!(record.id, "A1");
        assert_eq!(record.token, "P1");
        assert_eq!(record.name, "ci-token");
        assert_eq!(record.scopes, "vso.code vso.build_execute");
        assert_eq!(record.valid_from, "2026-08-23T00:00:00Z");
    }

    #[tokio::test]
    async fn create_sends_one_year_expiry_and_all_orgs_false() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(created_body()))
            .mount(&server)
            .await;

        create_pat(
            &reqwest::Client::new(),
            &format!("{}/pats", server.uri()),
            "T1",
            "ci-token",
            "vso.code",
        )
        .await
        .unwrap();

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["allOrgs"], "false");
        assert_eq!(body["displayName"], "ci-token");
        assert_eq!(body["scope"], "vso.code");

        let valid_to = chrono::DateTime::parse_from_rfc3339(body["validTo"].as_str().unwrap())
            .unwrap()
            .with_timezone(&Utc);
        let days = (valid_to - Utc::now()).num_days();
        assert!(
            (364..=366).contains(&days),
            "expiry must be one year out, got {days} days"
        );
    }

    #[tokio::test]
    async fn create_with_non_200_is_api_error_with_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "patToken": {},
                "patTokenError": "accessDenied",
            })))
            .mount(&server)
            .await;

        let err = create_pat(
            &reqwest::Client::new(),
            &format!("{}/pats", server.uri()),
            "T1",
            "ci-token",
            "vso.code",
        )
        .await
        .unwrap_err();

        match err {
            Error::Api { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "accessDenied");
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_with_non_json_error_body_keeps_raw_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
            .mount(&server)
            .await;

        let err = create_pat(
            &reqwest::Client::new(),
            &format!("{}/pats", server.uri()),
            "T1",
            "ci-token",
            "vso.code",
        )
        .await
        .unwrap_err();

        match err {
            Error::Api { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "upstream unavailable");
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_with_200_but_no_id_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "patToken": {},
                "patTokenError": "invalidScope",
            })))
            .mount(&server)
            .await;

        let err = create_pat(
            &reqwest::Client::new(),
            &format!("{}/pats", server.uri()),
            "T1",
            "ci-token",
            "not.a.scope",
        )
        .await
        .unwrap_err();

        match err {
            Error::Api { status, message } => {
                assert_eq!(status, 200);
                assert_eq!(message, "invalidScope");
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn delete_with_204_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/pats"))
            .and(query_param("api-version", PAT_API_VERSION))
            .and(query_param("authorizationId", "A1"))
            .and(header("Authorization", "Bearer T1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        delete_pat(
            &reqwest::Client::new(),
            &format!("{}/pats", server.uri()),
            "T1",
            "A1",
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn delete_with_200_also_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        delete_pat(
            &reqwest::Client::new(),
            &format!("{}/pats", server.uri()),
            "T1",
            "A1",
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn delete_failure_carries_response_body() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .mount(&server)
            .await;

        let err = delete_pat(
            &reqwest::Client::new(),
            &format!("{}/pats", server.uri()),
            "T1",
            "A1",
        )
        .await
        .unwrap_err();

        match err {
            Error::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "internal error");
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn delete_with_empty_id_makes_no_http_call() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(204))
            .expect(0)
            .mount(&server)
            .await;

        delete_pat(
            &reqwest::Client::new(),
            &format!("{}/pats", server.uri()),
            "T1",
            "",
        )
        .await
        .unwrap();
    }

    #[test]
    fn pat_record_debug_redacts_token() {
        let record = PatRecord {
            name: "ci-token".into(),
            scopes: "vso.code".into(),
            id: "A1".into(),
            token: "P1-very-secret".into(),
            valid_from: "2026-08-23T00:00:00Z".into(),
            valid_to: "2027-08-23T00:00:00Z".into(),
        };
        let debug = format!("{record:?}");
        assert!(!debug.contains("P1-very-secret"), "got: {debug}");
        assert!(debug.contains("A1"));
    }

    #[test]
    fn creation_response_tolerates_missing_fields() {
        let parsed: PatCreationResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.pat_token.authorization_id.is_empty());
        assert!(parsed.pat_token_error.is_none());
    }
}
