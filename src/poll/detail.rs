//! Poll detail and vote records

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// One answer a viewer can pick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollOption {
    pub id: String,
    pub label: String,
}

impl PollOption {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Full poll as served by the poll service
///
/// Option order is display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollDetail {
    pub id: String,
    pub question: String,
    pub options: Vec<PollOption>,
}

impl PollDetail {
    /// Check the invariants the wire format cannot express
    pub fn validate(&self) -> Result<(), FetchError> {
        if self.id.is_empty() {
            return Err(FetchError::SchemaMismatch("empty poll id".into()));
        }

        let mut seen = HashSet::with_capacity(self.options.len());
        for option in &self.options {
            if !seen.insert(option.id.as_str()) {
                return Err(FetchError::SchemaMismatch(format!(
                    "duplicate option id {:?} in poll {}",
                    option.id, self.id
                )));
            }
        }
        Ok(())
    }

    /// Find an option by id
    pub fn option(&self, option_id: &str) -> Option<&PollOption> {
        self.options.iter().find(|o| o.id == option_id)
    }
}

/// `GET /polls/{id}` response body
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PollResponse {
    pub data: PollDetail,
}

/// A single vote, as posted to `/polls/{id}/votes`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    /// Selected option id
    pub answer: String,
    pub user_id: String,
}
