//! Basket overlay
//!
//! Stateless: the card is a direct projection of the offer. Price and image
//! URL are passed through untouched.

use crate::cue::BasketOffer;

/// Label of the call-to-action button
pub const BUY_NOW_LABEL: &str = "Buy now";

/// What the basket overlay draws
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasketCard {
    pub product_id: String,
    pub description: String,
    /// Pre-formatted price, never re-formatted
    pub price: String,
    pub image_url: String,
    pub call_to_action: &'static str,
}

impl BasketCard {
    pub fn from_offer(offer: &BasketOffer) -> Self {
        let product = &offer.product;
        Self {
            product_id: product.id.clone(),
            description: product.description.clone(),
            price: product.price.clone(),
            image_url: product.image_url.clone(),
            call_to_action: BUY_NOW_LABEL,
        }
    }
}
