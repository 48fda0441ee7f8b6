//! Placeholder lookup.

use crate::template::deck::{Deck, ShapeRef};
use crate::template::error::Result;
use crate::template::label::Label;
use tracing::debug;

/// Shapes whose text is exactly `{tag}` on the slides the label selects.
///
/// Matches come in slide order, then in the deck's shape order within a
/// slide. Case and whitespace must match; shapes without text never match.
pub fn find<D: Deck + ?Sized>(deck: &D, label: &Label) -> Result<Vec<ShapeRef>> {
    let wanted = label.placeholder_text();
    let mut matches = Vec::new();

    for slide in label.selector().indices(deck.slide_count())? {
        for shape in deck.shapes(slide)? {
            if deck.shape_text(shape)?.as_deref() == Some(wanted.as_str()) {
                matches.push(shape);
            }
        }
    }

    debug!(label = %label, matches = matches.len(), "resolved placeholder label");
    Ok(matches)
}
