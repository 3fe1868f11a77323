use super::TargetRequirement;
use crate::index::PageIndex;
use crate::matcher::DESCRIPTIVE_ATTRIBUTES;
use legend_common::normalize_whitespace;

/// Texts on the page closest to a locator target that matched nothing.
///
/// Candidates are everything a strategy could have matched: captions, ids,
/// names, labels and descriptive attributes of controls the requirement
/// allows. Best similarity first, ties in document order.
pub fn suggest(
    index: &PageIndex,
    target: &str,
    requirement: TargetRequirement,
    threshold: f64,
    max: usize,
) -> Vec<String> {
    if max == 0 {
        return vec![];
    }

    let wanted = normalize_whitespace(target).to_lowercase();
    let mut scored: Vec<(f64, String)> = Vec::new();

    for control in index
        .controls()
        .iter()
        .filter(|c| requirement.accepts(c.kind))
    {
        let texts = [control.attr("id"), control.attr("name")]
            .into_iter()
            .flatten()
            .chain(DESCRIPTIVE_ATTRIBUTES.iter().filter_map(|k| control.attr(k)))
            .chain(index.label_text(control))
            .chain(std::iter::once(control.caption.as_str()))
            .map(normalize_whitespace)
            .filter(|t| !t.is_empty());

        for text in texts {
            let similarity = strsim::normalized_levenshtein(&wanted, &text.to_lowercase());
            if similarity >= threshold && !scored.iter().any(|(_, t)| *t == text) {
                scored.push((similarity, text));
            }
        }
    }

    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.into_iter().take(max).map(|(_, text)| text).collect()
}
