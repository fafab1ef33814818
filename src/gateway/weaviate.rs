//! Weaviate document gateway.
//!
//! Reads through the GraphQL `Get` endpoint and deletes through the REST objects
//! endpoint. Full scans page with the `after` id cursor, which is not subject to
//! the server's `QUERY_MAXIMUM_RESULTS` window; name-filtered reads page by
//! `offset` because Weaviate rejects `after` combined with `where`. Property names come from configuration and
//! are validated once at construction; query text is only ever produced by
//! [`GetQuery`].

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::time::Duration;

use super::pacing::Pacer;
use super::DocumentGateway;
use crate::config::WeaviateConfig;
use crate::dedup::types::DocumentRecord;
use crate::error::GatewayError;

/// Weaviate-backed [`DocumentGateway`].
pub struct WeaviateGateway {
    client: Client,
    base_url: String,
    fields: FieldMap,
    page_size: usize,
    pacer: Pacer,
}

/// Mapping from [`DocumentRecord`] fields to Weaviate property names.
#[derive(Debug, Clone)]
pub struct FieldMap {
    pub class: String,
    pub name: String,
    pub content: String,
    pub uploaded_at: String,
    pub source: String,
    pub path: String,
    pub doc_type: String,
}

impl FieldMap {
    fn from_config(config: &WeaviateConfig) -> Result<Self, GatewayError> {
        let fields = Self {
            class: config.class.clone(),
            name: config.name_property.clone(),
            content: config.content_property.clone(),
            uploaded_at: config.uploaded_at_property.clone(),
            source: config.source_property.clone(),
            path: config.path_property.clone(),
            doc_type: config.type_property.clone(),
        };
        for ident in fields.identifiers() {
            if !is_graphql_name(ident) {
                return Err(GatewayError::Config(format!(
                    "'{ident}' is not a valid Weaviate class or property name"
                )));
            }
        }
        Ok(fields)
    }

    fn identifiers(&self) -> [&str; 7] {
        [
            self.class.as_str(),
            self.name.as_str(),
            self.content.as_str(),
            self.uploaded_at.as_str(),
            self.source.as_str(),
            self.path.as_str(),
            self.doc_type.as_str(),
        ]
    }

    fn properties(&self) -> Vec<&str> {
        self.identifiers()[1..].to_vec()
    }

    /// Convert one GraphQL result object. Objects without an id are unusable.
    fn to_record(&self, object: &Map<String, Value>) -> Option<DocumentRecord> {
        let id = object_id(object)?;

        Some(DocumentRecord {
            id: id.to_string(),
            name: string_prop(object, &self.name).unwrap_or_default(),
            content: string_prop(object, &self.content),
            uploaded_at: string_prop(object, &self.uploaded_at).and_then(|s| parse_timestamp(&s)),
            source: string_prop(object, &self.source),
            path: string_prop(object, &self.path),
            doc_type: string_prop(object, &self.doc_type),
        })
    }
}

/// A GraphQL `Get` query over one class.
#[derive(Debug, Clone)]
pub struct GetQuery<'a> {
    pub class: &'a str,
    pub properties: Vec<&'a str>,
    pub limit: usize,
    pub offset: usize,
    /// Cursor: return objects after this id. Replaces `offset` when set.
    pub after: Option<&'a str>,
    /// `(property, value)` exact-match filter.
    pub equals: Option<(&'a str, &'a str)>,
}

impl GetQuery<'_> {
    pub fn to_graphql(&self) -> String {
        let mut args = vec![format!("limit: {}", self.limit)];
        match self.after {
            Some(id) => args.push(format!("after: {}", Value::String(id.to_string()))),
            None => args.push(format!("offset: {}", self.offset)),
        }
        if let Some((property, value)) = self.equals {
            // JSON string literals are valid GraphQL string literals.
            let literal = Value::String(value.to_string()).to_string();
            args.push(format!(
                "where: {{ path: [\"{property}\"], operator: Equal, valueText: {literal} }}"
            ));
        }
        format!(
            "{{ Get {{ {class}({args}) {{ {props} _additional {{ id }} }} }} }}",
            class = self.class,
            args = args.join(", "),
            props = self.properties.join(" "),
        )
    }
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<GetData>,
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GetData {
    #[serde(rename = "Get", default)]
    get: Option<HashMap<String, Option<Vec<Map<String, Value>>>>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

impl GraphQlResponse {
    /// Objects for `class`, with every missing level treated as empty.
    fn into_objects(self, class: &str) -> Result<Vec<Map<String, Value>>, GatewayError> {
        if let Some(errors) = self.errors.filter(|e| !e.is_empty()) {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(GatewayError::Decode(messages.join("; ")));
        }
        Ok(self
            .data
            .and_then(|d| d.get)
            .and_then(|mut classes| classes.remove(class))
            .flatten()
            .unwrap_or_default())
    }
}

impl WeaviateGateway {
    pub fn new(config: &WeaviateConfig) -> Result<Self, GatewayError> {
        let fields = FieldMap::from_config(config)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = config.api_key.as_deref().filter(|k| !k.is_empty()) {
            let value = HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| GatewayError::Config(format!("invalid API key: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let pacer = Pacer::new(Duration::from_millis(config.min_request_interval_ms));
        tracing::debug!(
            url = %config.url,
            class = %fields.class,
            interval_ms = pacer.interval().as_millis() as u64,
            "weaviate gateway configured"
        );

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            fields,
            page_size: config.page_size.max(1),
            pacer,
        })
    }

    /// One page of records plus the raw object count and the id of the last raw
    /// object, which drive pagination.
    async fn fetch_page(
        &self,
        offset: usize,
        after: Option<&str>,
        name_filter: Option<&str>,
    ) -> Result<Page, GatewayError> {
        let query = GetQuery {
            class: &self.fields.class,
            properties: self.fields.properties(),
            limit: self.page_size,
            offset,
            after,
            equals: name_filter.map(|name| (self.fields.name.as_str(), name)),
        };

        self.pacer.wait().await;
        let response = self
            .client
            .post(format!("{}/v1/graphql", self.base_url))
            .json(&json!({ "query": query.to_graphql() }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: GraphQlResponse = response.json().await?;
        let objects = body.into_objects(&self.fields.class)?;
        let page_len = objects.len();
        let last_id = objects.last().and_then(object_id).map(str::to_owned);
        let records: Vec<DocumentRecord> = objects
            .iter()
            .filter_map(|o| self.fields.to_record(o))
            .collect();
        if records.len() < page_len {
            tracing::warn!(
                skipped = page_len - records.len(),
                offset,
                "objects without an id were skipped"
            );
        }
        Ok(Page {
            records,
            len: page_len,
            last_id,
        })
    }
}

struct Page {
    records: Vec<DocumentRecord>,
    len: usize,
    last_id: Option<String>,
}

#[async_trait]
impl DocumentGateway for WeaviateGateway {
    async fn fetch_candidates(
        &self,
        name_filter: Option<&str>,
    ) -> Result<Vec<DocumentRecord>, GatewayError> {
        let mut records = Vec::new();
        let mut offset = 0;
        let mut cursor: Option<String> = None;
        loop {
            let after = if name_filter.is_none() { cursor.as_deref() } else { None };
            let page = self.fetch_page(offset, after, name_filter).await?;
            records.extend(page.records);
            tracing::debug!(offset, page_len = page.len, total = records.len(), "fetched page");
            if page.len < self.page_size {
                break;
            }
            if name_filter.is_some() {
                offset += self.page_size;
            } else {
                cursor = Some(page.last_id.ok_or_else(|| {
                    GatewayError::Decode("page ended with an object without an id".into())
                })?);
            }
        }
        Ok(records)
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), GatewayError> {
        self.pacer.wait().await;
        let response = self
            .client
            .delete(format!(
                "{}/v1/objects/{}/{}",
                self.base_url, self.fields.class, id
            ))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        if status == StatusCode::NOT_FOUND {
            return Err(GatewayError::NotFound(id.to_string()));
        }
        let body = response.text().await.unwrap_or_default();
        Err(GatewayError::Status {
            status: status.as_u16(),
            body,
        })
    }

    fn describe(&self) -> String {
        format!("weaviate {} ({})", self.base_url, self.fields.class)
    }
}

fn object_id(object: &Map<String, Value>) -> Option<&str> {
    object
        .get("_additional")
        .and_then(|a| a.get("id"))
        .and_then(Value::as_str)
}

/// String-valued property; any other JSON type counts as absent.
fn string_prop(object: &Map<String, Value>, property: &str) -> Option<String> {
    object.get(property).and_then(Value::as_str).map(str::to_owned)
}

/// ISO-8601 upload date. Values without an offset, including bare dates, are
/// read as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn is_graphql_name(ident: &str) -> bool {
    let mut chars = ident.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
