//! Metadata dispatcher
//!
//! Maps the active envelope to the overlay variant that renders it. The match
//! over [`Metadata`] is exhaustive, so a new metadata type cannot reach the
//! overlay without a renderer being chosen for it here.

use super::basket::BasketCard;
use crate::cue::{BasketOffer, Metadata, MetadataEnvelope, PollReference};
use crate::poll::{PollCard, PollView};

/// Renderer selected for the active envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch<'a> {
    /// No overlay container at all
    Nothing,
    Poll(&'a PollReference),
    Basket(&'a BasketOffer),
}

/// Select the renderer for `active`
pub fn dispatch(active: Option<&MetadataEnvelope>) -> Dispatch<'_> {
    let Some(envelope) = active else {
        return Dispatch::Nothing;
    };

    match &envelope.metadata {
        Metadata::Poll(reference) => Dispatch::Poll(reference),
        Metadata::AddToBasket(offer) => Dispatch::Basket(offer),
    }
}

/// Fully resolved overlay output
///
/// `Nothing` means no container is shown, which is different from a
/// container with no content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewDescriptor {
    Nothing,
    Poll(PollCard),
    Basket(BasketCard),
}

impl ViewDescriptor {
    pub fn is_nothing(&self) -> bool {
        matches!(self, ViewDescriptor::Nothing)
    }
}

/// Resolve what the overlay shows for `active`
///
/// The poll variant shows its card only once `poll` has loaded the detail
/// for the referenced poll.
pub fn render(active: Option<&MetadataEnvelope>, poll: &PollView) -> ViewDescriptor {
    match dispatch(active) {
        Dispatch::Nothing => ViewDescriptor::Nothing,
        Dispatch::Poll(reference) => match poll.render() {
            Some(card) if card.poll_id == reference.id => ViewDescriptor::Poll(card),
            _ => ViewDescriptor::Nothing,
        },
        Dispatch::Basket(offer) => ViewDescriptor::Basket(BasketCard::from_offer(offer)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cue::Product;
    use crate::poll::{PollDetail, PollOption};

    fn product() -> Product {
        Product {
            id: "p1".into(),
            description: "Shorts".into(),
            image_url: "http://x/y.jpg".into(),
            price: "£36.00".into(),
        }
    }

    fn loaded(id: &str) -> PollView {
        let mut view = PollView::default();
        let ticket = view.enter(id);
        view.complete(
            &ticket,
            Ok(PollDetail {
                id: id.into(),
                question: "Time for DRG?".into(),
                options: vec![PollOption::new("abc", "Yes"), PollOption::new("def", "No")],
            }),
        );
        view
    }

    #[test]
    fn test_dispatch() {
        assert_eq!(dispatch(None), Dispatch::Nothing);

        let poll = MetadataEnvelope::poll("abc");
        assert!(matches!(dispatch(Some(&poll)), Dispatch::Poll(r) if r.id == "abc"));

        let basket = MetadataEnvelope::basket(product());
        assert!(matches!(dispatch(Some(&basket)), Dispatch::Basket(o) if o.product.id == "p1"));
    }

    #[test]
    fn test_render_nothing() {
        assert_eq!(render(None, &PollView::default()), ViewDescriptor::Nothing);
        assert!(render(None, &loaded("abc")).is_nothing());
    }

    #[test]
    fn test_render_basket() {
        let basket = MetadataEnvelope::basket(product());
        match render(Some(&basket), &PollView::default()) {
            ViewDescriptor::Basket(card) => {
                assert_eq!(card.description, "Shorts");
                assert_eq!(card.price, "£36.00");
            }
            other => panic!("Expected basket card, got {:?}", other),
        }
    }

    #[test]
    fn test_render_poll_requires_matching_detail() {
        let active = MetadataEnvelope::poll("abc");

        // Not loaded yet
        assert!(render(Some(&active), &PollView::default()).is_nothing());

        // Loaded, but for a different poll
        assert!(render(Some(&active), &loaded("xyz")).is_nothing());

        match render(Some(&active), &loaded("abc")) {
            ViewDescriptor::Poll(card) => {
                assert_eq!(card.question, "Time for DRG?");
                assert_eq!(card.options.len(), 2);
            }
            other => panic!("Expected poll card, got {:?}", other),
        }
    }

    #[test]
    fn test_render_is_repeatable() {
        let active = MetadataEnvelope::basket(product());
        let view = PollView::default();
        assert_eq!(render(Some(&active), &view), render(Some(&active), &view));
    }
}
