//! Remote spreadsheet endpoint client
//!
//! The endpoint is a single Apps Script web app exposing a map fetch
//! (`GET ?group=...`) and a per-cell upsert (`POST`). It cannot answer a
//! CORS preflight, so the POST body is JSON sent under a `text/plain`
//! content type; the wire shape is kept identical to the browser client's
//! so both stay interchangeable against the endpoint.

use crate::delivery::TrackingRecord;
use crate::error::Result;
use crate::sheet::map::SheetMap;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Classified result of one remote write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Cell written.
    Success,
    /// Endpoint temporarily cannot write (another writer holds the lock).
    Busy,
    /// Cached row no longer matches the roster; caller must reconcile.
    SyncRequired,
    /// Anything else: explicit error status, malformed body, HTTP failure.
    Error(String),
}

/// Transport to the remote spreadsheet endpoint.
///
/// `push` returns `Ok` for every response the endpoint produced, classified
/// into a [`DeliveryOutcome`]; `Err` is reserved for requests that never got
/// a response.
#[async_trait]
pub trait SheetTransport: Send + Sync {
    /// Fetch the authoritative map for a group. Structurally invalid
    /// responses are a soft failure (`Ok(None)`), not an error.
    async fn fetch_map(&self, group: &str) -> Result<Option<SheetMap>>;

    /// Send one tracking record to the endpoint.
    async fn push(&self, record: &TrackingRecord) -> Result<DeliveryOutcome>;
}

#[derive(Debug, Deserialize)]
struct MapEnvelope {
    data: Option<MapPayload>,
}

#[derive(Debug, Deserialize)]
struct MapPayload {
    problems: HashMap<String, u32>,
    students: HashMap<String, u32>,
    #[serde(default)]
    solved: HashMap<String, Vec<u32>>,
}

#[derive(Debug, Default, Deserialize)]
struct PostResponse {
    status: Option<String>,
    code: Option<String>,
    message: Option<String>,
}

/// Wire form of a tracking record. The endpoint's schema expects text cells
/// for attempts and time, so both are string-serialized; row/col stay
/// numeric.
#[derive(Debug, Serialize)]
struct WireRecord<'a> {
    group: &'a str,
    student_full_name: &'a str,
    problem_url: &'a str,
    github_link: &'a str,
    attempts: String,
    time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    row_index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    col_index: Option<u32>,
}

impl<'a> WireRecord<'a> {
    fn from_record(record: &'a TrackingRecord) -> Self {
        Self {
            group: &record.group,
            student_full_name: &record.student_full_name,
            problem_url: &record.problem_url,
            github_link: &record.github_link,
            attempts: record.attempts.to_string(),
            time: format_minutes(record.time_minutes),
            row_index: record.coordinate.map(|c| c.row),
            col_index: record.coordinate.map(|c| c.col),
        }
    }
}

fn format_minutes(minutes: f64) -> String {
    if minutes.fract() == 0.0 {
        format!("{}", minutes as u64)
    } else {
        format!("{minutes}")
    }
}

/// Map a raw endpoint response body to exactly one [`DeliveryOutcome`].
///
/// Strict tagged mapping: anything that does not parse, or parses but
/// carries no recognized status, classifies as `Error` rather than silently
/// falling through.
fn classify_response(body: &str) -> DeliveryOutcome {
    let parsed: PostResponse = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(_) => {
            let preview: String = body.chars().take(200).collect();
            return DeliveryOutcome::Error(format!("unrecognized endpoint response: {preview}"));
        }
    };
    if parsed.status.as_deref() == Some("success") {
        return DeliveryOutcome::Success;
    }
    if parsed.code.as_deref() == Some("SYNC_REQUIRED") {
        return DeliveryOutcome::SyncRequired;
    }
    if parsed.status.as_deref() == Some("busy") {
        return DeliveryOutcome::Busy;
    }
    DeliveryOutcome::Error(
        parsed
            .message
            .unwrap_or_else(|| "endpoint reported an error".to_string()),
    )
}

fn parse_map_body(body: &str) -> Option<SheetMap> {
    match serde_json::from_str::<MapEnvelope>(body) {
        Ok(MapEnvelope {
            data: Some(payload),
        }) => Some(SheetMap {
            problems: payload.problems,
            students: payload.students,
            solved: payload.solved,
        }),
        Ok(MapEnvelope { data: None }) => {
            warn!("map response missing data.problems or data.students");
            None
        }
        Err(e) => {
            let preview: String = body.chars().take(200).collect();
            warn!("map response was not JSON ({e}): {preview}");
            None
        }
    }
}

/// HTTP implementation of [`SheetTransport`] over reqwest.
pub struct HttpSheetTransport {
    client: Client,
    endpoint: String,
}

impl HttpSheetTransport {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl SheetTransport for HttpSheetTransport {
    async fn fetch_map(&self, group: &str) -> Result<Option<SheetMap>> {
        let group = group.trim();
        if group.is_empty() {
            return Ok(None);
        }
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("group", group)])
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            warn!("map fetch returned HTTP {status}");
            return Ok(None);
        }
        Ok(parse_map_body(&body))
    }

    async fn push(&self, record: &TrackingRecord) -> Result<DeliveryOutcome> {
        let body = serde_json::to_string(&WireRecord::from_record(record))?;
        debug!(group = %record.group, "posting tracking record");
        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "text/plain;charset=utf-8")
            .body(body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Ok(DeliveryOutcome::Error(format!(
                "endpoint returned HTTP {status}"
            )));
        }
        let body = response.text().await?;
        Ok(classify_response(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::map::CellRef;

    #[test]
    fn classifies_success_busy_and_sync() {
        assert_eq!(
            classify_response(r#"{"status":"success"}"#),
            DeliveryOutcome::Success
        );
        assert_eq!(
            classify_response(r#"{"status":"busy"}"#),
            DeliveryOutcome::Busy
        );
        assert_eq!(
            classify_response(r#"{"code":"SYNC_REQUIRED"}"#),
            DeliveryOutcome::SyncRequired
        );
    }

    #[test]
    fn sync_required_wins_over_other_statuses() {
        // The endpoint sets code alongside an error status; staleness must
        // be recognized so the engine reconciles instead of failing.
        assert_eq!(
            classify_response(r#"{"status":"error","code":"SYNC_REQUIRED"}"#),
            DeliveryOutcome::SyncRequired
        );
    }

    #[test]
    fn unrecognized_bodies_are_errors() {
        assert!(matches!(
            classify_response("<html>maintenance</html>"),
            DeliveryOutcome::Error(_)
        ));
        assert!(matches!(
            classify_response(r#"{"unexpected":true}"#),
            DeliveryOutcome::Error(_)
        ));
    }

    #[test]
    fn error_message_is_preserved() {
        match classify_response(r#"{"status":"error","message":"row out of range"}"#) {
            DeliveryOutcome::Error(message) => assert_eq!(message, "row out of range"),
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[test]
    fn parses_well_formed_map() {
        let body = r#"{"data":{"problems":{"1a":3},"students":{"Ada Lovelace":6},"solved":{"6":[3]}}}"#;
        let map = parse_map_body(body).unwrap();
        assert_eq!(map.problems.get("1a"), Some(&3));
        assert_eq!(map.students.get("Ada Lovelace"), Some(&6));
        assert_eq!(map.solved.get("6"), Some(&vec![3]));
    }

    #[test]
    fn rejects_structurally_invalid_maps() {
        assert!(parse_map_body(r#"{"data":{"problems":{}}}"#).is_none());
        assert!(parse_map_body(r#"{"error":"no such group"}"#).is_none());
        assert!(parse_map_body("not json at all").is_none());
    }

    #[test]
    fn wire_record_serializes_numbers_as_text_cells() {
        let record = TrackingRecord {
            group: "G71".to_string(),
            student_full_name: "Ada Lovelace".to_string(),
            problem_url: "https://codeforces.com/contest/1/problem/A".to_string(),
            github_link: "https://example/repo/blob/main/1A.cpp".to_string(),
            attempts: 2,
            time_minutes: 15.0,
            coordinate: Some(CellRef { row: 6, col: 3 }),
        };
        let value: serde_json::Value =
            serde_json::to_value(WireRecord::from_record(&record)).unwrap();
        assert_eq!(value["attempts"], "2");
        assert_eq!(value["time"], "15");
        assert_eq!(value["row_index"], 6);
        assert_eq!(value["col_index"], 3);
    }

    #[test]
    fn fractional_minutes_keep_their_precision() {
        assert_eq!(format_minutes(15.0), "15");
        assert_eq!(format_minutes(7.5), "7.5");
    }
}
