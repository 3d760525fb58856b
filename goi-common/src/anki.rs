//! AnkiConnect client
//!
//! Talks to the AnkiConnect add-on on a local Anki instance. Every call is
//! a POST of `{action, version: 6, params}`; a populated `error` field in
//! the response body is surfaced as [`Error::Anki`]. Requests are paced by
//! a courtesy rate limiter since the endpoint shares the desktop Anki
//! process.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::{Error, Result};

const ANKI_CONNECT_VERSION: u32 = 6;
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Rate limiter enforcing a minimum interval between requests
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval_ms: u64) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval: Duration::from_millis(min_interval_ms),
        }
    }

    /// Wait if necessary to comply with the rate limit
    async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::trace!("Rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

/// One note returned by `notesInfo`
#[derive(Debug, Clone, Deserialize)]
pub struct NoteInfo {
    /// Store-assigned note id
    #[serde(rename = "noteId")]
    pub note_id: i64,
    /// Model the note was created with
    #[serde(rename = "modelName", default)]
    pub model_name: String,
    /// Tags attached to the note
    #[serde(default)]
    pub tags: Vec<String>,
    /// Field name → field content
    #[serde(default)]
    pub fields: HashMap<String, NoteFieldValue>,
}

impl NoteInfo {
    /// Field content by name, empty string when the field is absent.
    pub fn field(&self, name: &str) -> &str {
        self.fields.get(name).map(|f| f.value.as_str()).unwrap_or("")
    }
}

/// Value slot of one note field
#[derive(Debug, Clone, Deserialize)]
pub struct NoteFieldValue {
    pub value: String,
    #[serde(default)]
    pub order: i64,
}

/// Note search terms for `findNotes`
#[derive(Debug, Clone, Default)]
pub struct NoteQuery {
    pub deck: Option<String>,
    pub tags: Vec<String>,
    pub keywords: Vec<String>,
    pub predicates: Vec<String>,
}

impl NoteQuery {
    /// Build the store's query string. Deck, tag and keyword terms are
    /// quoted, with `_` and `*` escaped so they match literally.
    pub fn to_query_string(&self) -> String {
        let mut terms = Vec::new();
        if let Some(deck) = &self.deck {
            terms.push(format!("\"deck:{}\"", escape_term(deck)));
        }
        for tag in &self.tags {
            terms.push(format!("\"tag:{}\"", escape_term(tag)));
        }
        for keyword in &self.keywords {
            terms.push(format!("\"{}\"", escape_term(keyword)));
        }
        terms.extend(self.predicates.iter().cloned());
        terms.join(" ")
    }
}

/// Escape the store's search wildcards so a term matches literally
fn escape_term(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if c == '_' || c == '*' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Request envelope sent to AnkiConnect
#[derive(Debug, Serialize)]
struct AnkiRequest<'a> {
    action: &'a str,
    version: u32,
    params: Value,
}

/// Response envelope from AnkiConnect
#[derive(Debug, Deserialize)]
struct AnkiResponse {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<String>,
}

/// AnkiConnect client
pub struct AnkiClient {
    http_client: reqwest::Client,
    endpoint: String,
    rate_limiter: Arc<RateLimiter>,
}

impl AnkiClient {
    pub fn new(endpoint: &str, rate_limit_ms: u64) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http_client,
            endpoint: endpoint.to_string(),
            rate_limiter: Arc::new(RateLimiter::new(rate_limit_ms)),
        })
    }

    /// Invoke one AnkiConnect action
    pub async fn invoke(&self, action: &str, params: Value) -> Result<Value> {
        self.rate_limiter.wait().await;

        tracing::debug!(action = %action, "Querying AnkiConnect");

        let request = AnkiRequest {
            action,
            version: ANKI_CONNECT_VERSION,
            params,
        };

        let response: AnkiResponse = self
            .http_client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?
            .json()
            .await?;

        if let Some(message) = response.error {
            tracing::error!(action = %action, error = %message, "AnkiConnect action failed");
            return Err(Error::Anki {
                action: action.to_string(),
                message,
            });
        }

        Ok(response.result)
    }

    /// Create a deck if it does not already exist; returns the deck id
    pub async fn create_deck(&self, deck: &str) -> Result<i64> {
        let result = self.invoke("createDeck", json!({ "deck": deck })).await?;
        Ok(result.as_i64().unwrap_or_default())
    }

    /// Names of all models known to the store
    pub async fn model_names(&self) -> Result<Vec<String>> {
        let result = self.invoke("modelNames", json!({})).await?;
        Ok(serde_json::from_value(result)?)
    }

    /// Create a model with a single card template
    pub async fn create_model(
        &self,
        model_name: &str,
        fields: &[&str],
        css: &str,
        card_name: &str,
        front: &str,
        back: &str,
    ) -> Result<()> {
        self.invoke(
            "createModel",
            json!({
                "modelName": model_name,
                "inOrderFields": fields,
                "css": css,
                "cardTemplates": [
                    {
                        "Name": card_name,
                        "Front": front,
                        "Back": back,
                    },
                ],
            }),
        )
        .await?;
        Ok(())
    }

    /// Replace the front/back templates of an existing model's card
    pub async fn update_model_templates(
        &self,
        model_name: &str,
        card_name: &str,
        front: &str,
        back: &str,
    ) -> Result<()> {
        self.invoke(
            "updateModelTemplates",
            json!({
                "model": {
                    "name": model_name,
                    "templates": {
                        (card_name): {
                            "Front": front,
                            "Back": back,
                        },
                    },
                },
            }),
        )
        .await?;
        Ok(())
    }

    /// Replace the styling of an existing model
    pub async fn update_model_styling(&self, model_name: &str, css: &str) -> Result<()> {
        self.invoke(
            "updateModelStyling",
            json!({
                "model": {
                    "name": model_name,
                    "css": css,
                },
            }),
        )
        .await?;
        Ok(())
    }

    /// Note ids matching a query
    pub async fn find_notes(&self, query: &NoteQuery) -> Result<Vec<i64>> {
        let result = self
            .invoke("findNotes", json!({ "query": query.to_query_string() }))
            .await?;
        Ok(serde_json::from_value(result)?)
    }

    /// Full note contents for a set of note ids
    pub async fn notes_info(&self, note_ids: &[i64]) -> Result<Vec<NoteInfo>> {
        let result = self.invoke("notesInfo", json!({ "notes": note_ids })).await?;
        Ok(serde_json::from_value(result)?)
    }

    /// Notes matching a query, fetched in one findNotes + notesInfo round trip
    pub async fn query_notes(&self, query: &NoteQuery) -> Result<Vec<NoteInfo>> {
        let note_ids = self.find_notes(query).await?;
        if note_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.notes_info(&note_ids).await
    }

    /// Add a note; returns the new note id, or None when the store
    /// rejected it as a duplicate
    pub async fn add_note(
        &self,
        deck: &str,
        model: &str,
        fields: &HashMap<String, String>,
        tags: &[&str],
    ) -> Result<Option<i64>> {
        let result = self
            .invoke(
                "addNote",
                json!({
                    "note": {
                        "deckName": deck,
                        "modelName": model,
                        "fields": fields,
                        "options": {
                            "allowDuplicate": false,
                            "duplicateScope": "deck",
                        },
                        "tags": tags,
                    },
                }),
            )
            .await?;
        Ok(result.as_i64())
    }

    /// Overwrite the fields of an existing note
    pub async fn update_note_fields(
        &self,
        note_id: i64,
        fields: &HashMap<String, String>,
    ) -> Result<()> {
        self.invoke(
            "updateNoteFields",
            json!({
                "note": {
                    "id": note_id,
                    "fields": fields,
                },
            }),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = AnkiClient::new(crate::config::DEFAULT_ENDPOINT, 100);
        assert!(client.is_ok());
    }

    #[test]
    fn test_request_envelope() {
        let request = AnkiRequest {
            action: "createDeck",
            version: ANKI_CONNECT_VERSION,
            params: json!({ "deck": "Vocabulary" }),
        };
        let encoded = serde_json::to_value(&request).unwrap();
        assert_eq!(encoded["action"], "createDeck");
        assert_eq!(encoded["version"], 6);
        assert_eq!(encoded["params"]["deck"], "Vocabulary");
    }

    #[test]
    fn test_response_error_detection() {
        let body = r#"{"result": null, "error": "deck was not found"}"#;
        let response: AnkiResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.error.as_deref(), Some("deck was not found"));

        let body = r#"{"result": [1502298033753], "error": null}"#;
        let response: AnkiResponse = serde_json::from_str(body).unwrap();
        assert!(response.error.is_none());
        assert_eq!(response.result[0], 1502298033753i64);
    }

    #[test]
    fn test_query_string_escaping() {
        let query = NoteQuery {
            deck: Some("Data::Core 6K".to_string()),
            tags: vec!["scraper-new".to_string()],
            keywords: vec!["食*".to_string(), "no_te".to_string()],
            predicates: vec!["is:due".to_string()],
        };
        assert_eq!(
            query.to_query_string(),
            r#""deck:Data::Core 6K" "tag:scraper-new" "食\*" "no\_te" is:due"#
        );
    }

    #[test]
    fn test_note_field_lookup() {
        let body = r#"{
            "noteId": 1502298033753,
            "modelName": "Vocabulary_model",
            "tags": ["new"],
            "fields": {
                "expression": {"value": "食べる", "order": 1}
            }
        }"#;
        let note: NoteInfo = serde_json::from_str(body).unwrap();
        assert_eq!(note.field("expression"), "食べる");
        assert_eq!(note.field("missing"), "");
    }

    #[tokio::test]
    async fn test_rate_limiter_timing() {
        let limiter = RateLimiter::new(50);

        let start = Instant::now();
        limiter.wait().await;
        let first_elapsed = start.elapsed();

        limiter.wait().await;
        let second_elapsed = start.elapsed();

        assert!(first_elapsed < Duration::from_millis(40));
        assert!(second_elapsed >= Duration::from_millis(45));
    }
}
