//! Metadata envelope types
//!
//! An envelope is the validated form of one cue. The payload is an enum
//! variant, so the discriminant and the payload shape cannot disagree.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::poll::{PollDetail, PollOption};

/// Discriminant of a metadata cue (the `type` field on the wire)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataType {
    /// Interactive poll, detail fetched separately
    Poll,
    /// Product offer with a call to action
    AddToBasket,
}

impl MetadataType {
    /// Wire tag for this type
    pub fn as_str(&self) -> &'static str {
        match self {
            MetadataType::Poll => "poll",
            MetadataType::AddToBasket => "add_to_basket",
        }
    }

    /// Look up a wire tag. Matching is exact and case-sensitive.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "poll" => Some(MetadataType::Poll),
            "add_to_basket" => Some(MetadataType::AddToBasket),
            _ => None,
        }
    }
}

impl std::fmt::Display for MetadataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of a `poll` cue
///
/// Normally only the identifier travels in the cue and the question and
/// options are fetched. Older cues carry the poll inline, possibly without an
/// id; such a poll is shown as is but cannot take votes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PollReference {
    pub id: String,
    #[serde(flatten)]
    pub inline: Option<InlinePoll>,
}

/// Question and options carried by the cue itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlinePoll {
    pub question: String,
    pub options: Vec<PollOption>,
}

impl PollReference {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            inline: None,
        }
    }

    /// Poll that needs no fetch
    pub fn inline(
        id: impl Into<String>,
        question: impl Into<String>,
        options: Vec<PollOption>,
    ) -> Self {
        Self {
            id: id.into(),
            inline: Some(InlinePoll {
                question: question.into(),
                options,
            }),
        }
    }

    /// Full detail, when the cue carried it
    pub fn inline_detail(&self) -> Option<PollDetail> {
        self.inline.as_ref().map(|poll| PollDetail {
            id: self.id.clone(),
            question: poll.question.clone(),
            options: poll.options.clone(),
        })
    }
}

/// Product advertised by an `add_to_basket` cue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub description: String,
    /// Image reference, fetched by the host's image loader
    #[serde(rename = "imageURL")]
    pub image_url: String,
    /// Pre-formatted price, displayed verbatim
    pub price: String,
}

/// Payload of an `add_to_basket` cue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketOffer {
    pub product: Product,
}

/// Typed cue payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Metadata {
    Poll(PollReference),
    AddToBasket(BasketOffer),
}

impl Metadata {
    /// Discriminant of this payload
    pub fn metadata_type(&self) -> MetadataType {
        match self {
            Metadata::Poll(_) => MetadataType::Poll,
            Metadata::AddToBasket(_) => MetadataType::AddToBasket,
        }
    }
}

/// Decoded and validated cue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataEnvelope {
    /// Schema version tag, absent in the flat cue layout
    pub version: Option<String>,
    pub metadata: Metadata,
}

impl MetadataEnvelope {
    /// Create an unversioned envelope
    pub fn new(metadata: Metadata) -> Self {
        Self {
            version: None,
            metadata,
        }
    }

    /// Shorthand for a poll envelope
    pub fn poll(id: impl Into<String>) -> Self {
        Self::new(Metadata::Poll(PollReference::new(id)))
    }

    /// Shorthand for a basket envelope
    pub fn basket(product: Product) -> Self {
        Self::new(Metadata::AddToBasket(BasketOffer { product }))
    }

    /// Set the schema version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn metadata_type(&self) -> MetadataType {
        self.metadata.metadata_type()
    }

    /// Poll id, if this is a poll envelope
    pub fn poll_id(&self) -> Option<&str> {
        match &self.metadata {
            Metadata::Poll(reference) => Some(&reference.id),
            Metadata::AddToBasket(_) => None,
        }
    }

    /// Encode back to cue text in the networked layout
    pub fn to_cue_text(&self) -> String {
        let data = match &self.metadata {
            Metadata::Poll(reference) => json!(reference),
            Metadata::AddToBasket(offer) => json!(offer),
        };

        let mut cue = json!({
            "type": self.metadata_type(),
            "data": data,
        });
        if let Some(version) = &self.version {
            cue["version"] = json!(version);
        }
        cue.to_string()
    }
}
