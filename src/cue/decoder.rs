//! Cue decoder
//!
//! Turns untrusted cue text into a [`MetadataEnvelope`]. The decoder is a
//! total function: every input string yields either an envelope or a
//! [`DecodeError`], never a panic. It performs no logging; the caller decides
//! how to report failures.
//!
//! Two layouts are accepted:
//!
//! ```text
//! networked: {"version":"1","type":"poll","data":{"id":"abc"}}
//! flat:      {"type":"add_to_basket","product":{...}}
//! ```
//!
//! The flat layout is only consulted when `data` is absent. Flat products may
//! omit their id. In either layout a poll may carry `question` and `options`
//! inline, in which case its id is optional.

use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::envelope::{BasketOffer, Metadata, MetadataEnvelope, MetadataType, PollReference, Product};
use crate::error::DecodeError;
use crate::poll::PollOption;

const FIELD_TYPE: &str = "type";
const FIELD_VERSION: &str = "version";
const FIELD_DATA: &str = "data";

/// Decode one cue
pub fn decode(raw: &str) -> Result<MetadataEnvelope, DecodeError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| DecodeError::Malformed(e.to_string()))?;

    let mut fields = match value {
        Value::Object(fields) => fields,
        other => {
            return Err(DecodeError::Malformed(format!(
                "expected an object, found {}",
                json_kind(&other)
            )))
        }
    };

    let kind = match fields.remove(FIELD_TYPE) {
        Some(Value::String(tag)) => {
            MetadataType::from_tag(&tag).ok_or(DecodeError::UnknownType(Some(tag)))?
        }
        _ => return Err(DecodeError::UnknownType(None)),
    };

    let version = read_version(kind, fields.remove(FIELD_VERSION))?;

    // Networked layout nests the payload; flat layout leaves it at the root.
    let (payload, flat) = match fields.remove(FIELD_DATA) {
        Some(data) => (data, false),
        None => (Value::Object(fields), true),
    };

    let metadata = match kind {
        MetadataType::Poll => Metadata::Poll(read_poll(read_payload(kind, payload)?)?),
        MetadataType::AddToBasket if flat => {
            Metadata::AddToBasket(read_payload::<FlatBasketOffer>(kind, payload)?.into())
        }
        MetadataType::AddToBasket => {
            Metadata::AddToBasket(read_payload::<BasketOffer>(kind, payload)?)
        }
    };

    Ok(MetadataEnvelope { version, metadata })
}

#[derive(Deserialize)]
struct PollPayload {
    #[serde(default)]
    id: String,
    question: Option<String>,
    options: Option<Vec<PollOption>>,
}

fn read_poll(payload: PollPayload) -> Result<PollReference, DecodeError> {
    let kind = MetadataType::Poll;
    let PollPayload {
        id,
        question,
        options,
    } = payload;

    match (question, options) {
        (None, None) if id.is_empty() => Err(mismatch(kind, "empty poll id")),
        (None, None) => Ok(PollReference::new(id)),
        (Some(question), Some(options)) => {
            let duplicate = {
                let mut seen = HashSet::with_capacity(options.len());
                options
                    .iter()
                    .find(|o| !seen.insert(o.id.as_str()))
                    .map(|o| o.id.clone())
            };
            if let Some(option_id) = duplicate {
                return Err(mismatch(kind, format!("duplicate option id {:?}", option_id)));
            }
            Ok(PollReference::inline(id, question, options))
        }
        _ => Err(mismatch(kind, "inline poll needs both question and options")),
    }
}

/// Basket payload of the flat layout, where the product id is optional
#[derive(Deserialize)]
struct FlatBasketOffer {
    product: FlatProduct,
}

#[derive(Deserialize)]
struct FlatProduct {
    #[serde(default)]
    id: String,
    description: String,
    #[serde(rename = "imageURL")]
    image_url: String,
    price: String,
}

impl From<FlatBasketOffer> for BasketOffer {
    fn from(offer: FlatBasketOffer) -> Self {
        let FlatProduct {
            id,
            description,
            image_url,
            price,
        } = offer.product;

        BasketOffer {
            product: Product {
                id,
                description,
                image_url,
                price,
            },
        }
    }
}

fn read_version(kind: MetadataType, version: Option<Value>) -> Result<Option<String>, DecodeError> {
    match version {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(mismatch(
            kind,
            format!("version must be a string, found {}", json_kind(&other)),
        )),
    }
}

fn read_payload<T: DeserializeOwned>(kind: MetadataType, payload: Value) -> Result<T, DecodeError> {
    if !payload.is_object() {
        return Err(mismatch(
            kind,
            format!("payload must be an object, found {}", json_kind(&payload)),
        ));
    }
    serde_json::from_value(payload).map_err(|e| mismatch(kind, e.to_string()))
}

fn mismatch(kind: MetadataType, reason: impl Into<String>) -> DecodeError {
    DecodeError::SchemaMismatch {
        kind,
        reason: reason.into(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Maximum number of characters of cue text kept for diagnostics
pub const PREVIEW_CHARS: usize = 64;

/// Bounded prefix of cue text for log lines
pub fn preview(raw: &str) -> &str {
    match raw.char_indices().nth(PREVIEW_CHARS) {
        Some((end, _)) => &raw[..end],
        None => raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASKET_CUE: &str = r#"{"type":"add_to_basket","data":{"product":{"id":"p1","description":"Shorts","imageURL":"http://x/y.jpg","price":"£36.00"}}}"#;

    #[test]
    fn test_decode_poll() {
        let envelope = decode(r#"{"type":"poll","data":{"id":"abc"}}"#).unwrap();

        assert_eq!(envelope.metadata_type(), MetadataType::Poll);
        assert_eq!(envelope.metadata, Metadata::Poll(PollReference::new("abc")));
        assert_eq!(envelope.version, None);
    }

    #[test]
    fn test_decode_basket() {
        let envelope = decode(BASKET_CUE).unwrap();

        match envelope.metadata {
            Metadata::AddToBasket(offer) => {
                assert_eq!(offer.product.id, "p1");
                assert_eq!(offer.product.description, "Shorts");
                assert_eq!(offer.product.image_url, "http://x/y.jpg");
                assert_eq!(offer.product.price, "£36.00");
            }
            other => panic!("Expected basket, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_version() {
        let envelope = decode(r#"{"version":"1.2","type":"poll","data":{"id":"abc"}}"#).unwrap();
        assert_eq!(envelope.version.as_deref(), Some("1.2"));

        let envelope = decode(r#"{"version":2,"type":"poll","data":{"id":"abc"}}"#).unwrap();
        assert_eq!(envelope.version.as_deref(), Some("2"));

        let result = decode(r#"{"version":[1],"type":"poll","data":{"id":"abc"}}"#);
        assert!(matches!(result, Err(DecodeError::SchemaMismatch { .. })));
    }

    #[test]
    fn test_decode_flat_layout() {
        let cue = r#"{"type":"add_to_basket","product":{"id":"p9","description":"SPEED EVOLVE 5\" 2 IN 1 SHORTS","price":"£36.00","imageURL":"https://cdn.example/shorts.jpg"}}"#;
        let envelope = decode(cue).unwrap();

        let expected = MetadataEnvelope::basket(Product {
            id: "p9".into(),
            description: "SPEED EVOLVE 5\" 2 IN 1 SHORTS".into(),
            image_url: "https://cdn.example/shorts.jpg".into(),
            price: "£36.00".into(),
        });
        assert_eq!(envelope, expected);

        let envelope = decode(r#"{"type":"poll","id":"flat"}"#).unwrap();
        assert_eq!(envelope.poll_id(), Some("flat"));
    }

    #[test]
    fn test_decode_legacy_demo_cues() {
        let basket = r#"{"type":"add_to_basket","product":{"description":"SPEED EVOLVE 5\" 2 IN 1 SHORTS","price":"Â£36.00","imageURL":"https://cdn.shopify.com/s/files/1/0098/8822/products/Speed52In1Short_M_BlackA1A9HA1A9H-BBBB.A1-Edit_BK_855x.jpg?v=1649254796"}}"#;
        match decode(basket).unwrap().metadata {
            Metadata::AddToBasket(offer) => {
                assert_eq!(offer.product.id, "");
                assert_eq!(offer.product.description, "SPEED EVOLVE 5\" 2 IN 1 SHORTS");
                assert_eq!(offer.product.price, "Â£36.00");
                assert!(offer.product.image_url.ends_with("?v=1649254796"));
            }
            other => panic!("Expected basket, got {:?}", other),
        }

        let poll = r#"{"type":"poll","question":"Time for DRG?","options":[{"id":"abc","label":"Yes"},{"id":"def","label":"No"}]}"#;
        let envelope = decode(poll).unwrap();
        let expected = PollReference::inline(
            "",
            "Time for DRG?",
            vec![PollOption::new("abc", "Yes"), PollOption::new("def", "No")],
        );
        assert_eq!(envelope.metadata, Metadata::Poll(expected));
    }

    #[test]
    fn test_nested_product_requires_id() {
        let raw = r#"{"type":"add_to_basket","data":{"product":{"description":"d","imageURL":"u","price":"1"}}}"#;
        assert!(matches!(decode(raw), Err(DecodeError::SchemaMismatch { .. })));
    }

    #[test]
    fn test_inline_poll_shapes() {
        let with_id = r#"{"type":"poll","data":{"id":"abc","question":"Q?","options":[{"id":"y","label":"Yes"}]}}"#;
        let envelope = decode(with_id).unwrap();
        assert_eq!(envelope.poll_id(), Some("abc"));
        match &envelope.metadata {
            Metadata::Poll(reference) => assert!(reference.inline.is_some()),
            other => panic!("Expected poll, got {:?}", other),
        }
        assert_eq!(decode(&envelope.to_cue_text()).unwrap(), envelope);

        let cases = [
            r#"{"type":"poll","question":"Q?"}"#,
            r#"{"type":"poll","options":[]}"#,
            r#"{"type":"poll","question":"Q?","options":[{"id":"y"}]}"#,
            r#"{"type":"poll","question":"Q?","options":[{"id":"y","label":"a"},{"id":"y","label":"b"}]}"#,
        ];
        for raw in cases {
            assert!(
                matches!(decode(raw), Err(DecodeError::SchemaMismatch { .. })),
                "expected SchemaMismatch for {}",
                raw
            );
        }
    }

    #[test]
    fn test_malformed() {
        for raw in ["", "{", "not json", r#"{"type":"poll""#, "\u{0}", "[1,2"] {
            assert!(
                matches!(decode(raw), Err(DecodeError::Malformed(_))),
                "expected Malformed for {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_non_object_is_malformed() {
        for raw in ["42", "\"poll\"", "null", "[]", "true"] {
            assert!(matches!(decode(raw), Err(DecodeError::Malformed(_))));
        }
    }

    #[test]
    fn test_unknown_type() {
        assert_eq!(
            decode(r#"{"type":"quiz","data":{"id":"abc"}}"#),
            Err(DecodeError::UnknownType(Some("quiz".into())))
        );
        assert_eq!(
            decode(r#"{"type":"POLL","data":{"id":"abc"}}"#),
            Err(DecodeError::UnknownType(Some("POLL".into())))
        );
        assert_eq!(decode(r#"{"data":{"id":"abc"}}"#), Err(DecodeError::UnknownType(None)));
        assert_eq!(decode(r#"{"type":7}"#), Err(DecodeError::UnknownType(None)));
        assert_eq!(decode("{}"), Err(DecodeError::UnknownType(None)));
    }

    #[test]
    fn test_schema_mismatch() {
        let cases = [
            r#"{"type":"poll","data":{}}"#,
            r#"{"type":"poll","data":{"id":5}}"#,
            r#"{"type":"poll","data":{"id":""}}"#,
            r#"{"type":"poll","data":"abc"}"#,
            r#"{"type":"add_to_basket","data":{"product":{"id":"p1"}}}"#,
            r#"{"type":"add_to_basket","data":{"id":"abc"}}"#,
            r#"{"type":"add_to_basket"}"#,
        ];
        for raw in cases {
            assert!(
                matches!(decode(raw), Err(DecodeError::SchemaMismatch { .. })),
                "expected SchemaMismatch for {}",
                raw
            );
        }
    }

    #[test]
    fn test_mismatch_reports_kind() {
        match decode(r#"{"type":"add_to_basket","data":{}}"#) {
            Err(DecodeError::SchemaMismatch { kind, .. }) => {
                assert_eq!(kind, MetadataType::AddToBasket)
            }
            other => panic!("Expected SchemaMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_poll_payload_cannot_carry_basket() {
        // A poll tag with a basket-shaped payload has no `id`
        let raw = r#"{"type":"poll","data":{"product":{"id":"p1","description":"d","imageURL":"u","price":"1"}}}"#;
        assert!(matches!(decode(raw), Err(DecodeError::SchemaMismatch { .. })));
    }

    #[test]
    fn test_large_garbage_does_not_panic() {
        let garbage: String = std::iter::repeat("{\"a\":[").take(10_000).collect();
        assert!(decode(&garbage).is_err());

        let long_id = "x".repeat(1 << 16);
        let raw = format!(r#"{{"type":"poll","data":{{"id":"{}"}}}}"#, long_id);
        assert_eq!(decode(&raw).unwrap().poll_id(), Some(long_id.as_str()));
    }

    #[test]
    fn test_roundtrip_cue_text() {
        let envelope = decode(BASKET_CUE).unwrap().with_version("3");
        assert_eq!(decode(&envelope.to_cue_text()).unwrap(), envelope);
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("short"), "short");

        let long = "é".repeat(100);
        assert_eq!(preview(&long).chars().count(), PREVIEW_CHARS);
    }
}
