//! Full-page text reconstruction.

use std::cmp::Ordering;

use crate::types::TextRegion;

/// Join region texts top-to-bottom, then left-to-right.
///
/// Regions are ordered by the y and then x coordinate of their top-left corner. Regions with
/// empty or whitespace-only text are dropped and the rest are joined with `\n`. The input
/// order does not affect the result.
pub fn reading_order_text(regions: &[TextRegion]) -> String {
    let mut ordered: Vec<&TextRegion> = regions.iter().filter(|region| !region.text.trim().is_empty()).collect();
    ordered.sort_by(|a, b| compare(a, b));

    ordered
        .iter()
        .map(|region| region.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

fn compare(a: &TextRegion, b: &TextRegion) -> Ordering {
    let (a_corner, b_corner) = (a.bbox.top_left(), b.bbox.top_left());
    a_corner
        .y
        .total_cmp(&b_corner.y)
        .then_with(|| a_corner.x.total_cmp(&b_corner.x))
        // Identical corners: fall back to the text so the output stays deterministic.
        .then_with(|| a.text.cmp(&b.text))
}
