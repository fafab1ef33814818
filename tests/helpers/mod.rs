#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use docsweep::dedup::types::DocumentRecord;
use docsweep::dedup::PlanSettings;
use docsweep::error::GatewayError;
use docsweep::gateway::DocumentGateway;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Fixed reference time so recency scores are reproducible.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap()
}

/// Default scoring and similarity settings pinned to [`fixed_now`].
pub fn test_settings() -> PlanSettings {
    PlanSettings::default().at(fixed_now())
}

/// Record with a name and content and nothing else.
pub fn doc(id: &str, name: &str, content: &str) -> DocumentRecord {
    DocumentRecord::new(id, name).with_content(content)
}

/// In-memory gateway that records every call.
#[derive(Default)]
pub struct RecordingGateway {
    pub documents: Mutex<Vec<DocumentRecord>>,
    pub delete_calls: Mutex<Vec<String>>,
    pub fail_ids: HashSet<String>,
    pub fail_fetch: bool,
    /// Set after the first delete call, to simulate an interrupt mid-run.
    pub abort_after_first: Option<Arc<AtomicBool>>,
}

impl RecordingGateway {
    pub fn with_documents(documents: Vec<DocumentRecord>) -> Self {
        Self {
            documents: Mutex::new(documents),
            ..Self::default()
        }
    }

    pub fn failing_on(mut self, ids: &[&str]) -> Self {
        self.fail_ids = ids.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn deletes(&self) -> Vec<String> {
        self.delete_calls.lock().unwrap().clone()
    }

    pub fn remaining_ids(&self) -> Vec<String> {
        self.documents
            .lock()
            .unwrap()
            .iter()
            .map(|d| d.id.clone())
            .collect()
    }
}

#[async_trait]
impl DocumentGateway for RecordingGateway {
    async fn fetch_candidates(
        &self,
        name_filter: Option<&str>,
    ) -> Result<Vec<DocumentRecord>, GatewayError> {
        if self.fail_fetch {
            return Err(GatewayError::Status {
                status: 500,
                body: "internal error".into(),
            });
        }
        Ok(self
            .documents
            .lock()
            .unwrap()
            .iter()
            .filter(|d| name_filter.map_or(true, |n| d.name == n))
            .cloned()
            .collect())
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), GatewayError> {
        self.delete_calls.lock().unwrap().push(id.to_string());
        if let Some(flag) = &self.abort_after_first {
            flag.store(true, Ordering::SeqCst);
        }
        if self.fail_ids.contains(id) {
            return Err(GatewayError::Status {
                status: 503,
                body: "unavailable".into(),
            });
        }
        let mut documents = self.documents.lock().unwrap();
        match documents.iter().position(|d| d.id == id) {
            Some(pos) => {
                documents.remove(pos);
                Ok(())
            }
            None => Err(GatewayError::NotFound(id.to_string())),
        }
    }

    fn describe(&self) -> String {
        "recording".into()
    }
}
