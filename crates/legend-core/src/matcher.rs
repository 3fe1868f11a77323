//! Match strategies, one per [`FoundType`].
//!
//! Every strategy follows the same recipe: pick the eligible controls, read
//! one piece of text per control ([`Matcher::attribute_values`]), prepare it
//! for distance measurement ([`Matcher::process_text_for_distance`]), test the
//! target pattern, and append a weighted entry on success. Controls that do
//! not match contribute nothing.

use crate::control::ControlKind;
use crate::found_type::FoundType;
use crate::index::{IndexedControl, PageIndex};
use crate::pattern::{SearchPattern, char_len};
use crate::resolution::TargetRequirement;
use crate::span::FindSpot;
use crate::weighted::WeightedControlList;
use legend_common::normalize_whitespace;
use std::borrow::Cow;

/// Attributes consulted by [`Matcher::ByAttribute`], in order.
pub const DESCRIPTIVE_ATTRIBUTES: &[&str] = &["title", "aria-label", "placeholder", "alt"];

/// Everything a strategy needs for one pass. Borrowed, never mutated.
#[derive(Debug, Clone, Copy)]
pub struct MatchContext<'a> {
    pub index: &'a PageIndex,
    /// Innermost path node, if the locator has a path.
    pub path: Option<&'a SearchPattern>,
    pub path_spot: Option<FindSpot>,
    pub target: &'a SearchPattern,
    pub requirement: TargetRequirement,
}

impl MatchContext<'_> {
    fn boundary(&self) -> usize {
        self.path_spot.map_or(0, |spot| spot.end)
    }

    fn is_after_path(&self, control: &IndexedControl) -> bool {
        self.path_spot
            .is_none_or(|spot| control.span.start >= spot.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
    ById,
    ByName,
    ByLabel,
    ByLabelElement,
    ByLabelTextBefore,
    ByLabelTextAfter,
    ByAttribute,
    ByText,
}

impl Matcher {
    pub const fn for_found_type(found_type: FoundType) -> Self {
        match found_type {
            FoundType::ById => Matcher::ById,
            FoundType::ByName => Matcher::ByName,
            FoundType::ByLabel => Matcher::ByLabel,
            FoundType::ByLabelElement => Matcher::ByLabelElement,
            FoundType::ByLabelTextBefore => Matcher::ByLabelTextBefore,
            FoundType::ByLabelTextAfter => Matcher::ByLabelTextAfter,
            FoundType::ByAttribute => Matcher::ByAttribute,
            FoundType::ByText => Matcher::ByText,
        }
    }

    pub const fn found_type(self) -> FoundType {
        match self {
            Matcher::ById => FoundType::ById,
            Matcher::ByName => FoundType::ByName,
            Matcher::ByLabel => FoundType::ByLabel,
            Matcher::ByLabelElement => FoundType::ByLabelElement,
            Matcher::ByLabelTextBefore => FoundType::ByLabelTextBefore,
            Matcher::ByLabelTextAfter => FoundType::ByLabelTextAfter,
            Matcher::ByAttribute => FoundType::ByAttribute,
            Matcher::ByText => FoundType::ByText,
        }
    }

    /// Which control kinds this strategy looks at.
    pub fn applies_to(self, kind: ControlKind) -> bool {
        match self {
            Matcher::ById | Matcher::ByAttribute => true,
            Matcher::ByName => kind.is_form_field() || kind == ControlKind::Button,
            Matcher::ByLabel | Matcher::ByText => kind.has_caption(),
            Matcher::ByLabelElement => kind.is_form_field(),
            Matcher::ByLabelTextBefore => {
                matches!(kind, ControlKind::TextField | ControlKind::Select)
            }
            Matcher::ByLabelTextAfter => {
                matches!(kind, ControlKind::Checkbox | ControlKind::Radio)
            }
        }
    }

    /// The text this strategy matches the target against. Empty values are
    /// dropped.
    pub fn attribute_values<'a>(
        self,
        ctx: &MatchContext<'a>,
        control: &'a IndexedControl,
    ) -> Vec<Cow<'a, str>> {
        let values: Vec<Cow<'a, str>> = match self {
            Matcher::ById => control.attr("id").map(Cow::Borrowed).into_iter().collect(),
            Matcher::ByName => control.attr("name").map(Cow::Borrowed).into_iter().collect(),
            Matcher::ByLabel | Matcher::ByText => vec![Cow::Borrowed(control.caption.as_str())],
            Matcher::ByLabelElement => ctx
                .index
                .label_text(control)
                .map(Cow::Borrowed)
                .into_iter()
                .collect(),
            Matcher::ByLabelTextBefore => {
                vec![Cow::Borrowed(
                    ctx.index.label_text_before(control, ctx.boundary()),
                )]
            }
            Matcher::ByLabelTextAfter => {
                vec![Cow::Borrowed(
                    ctx.index.label_text_after(control, ctx.boundary()),
                )]
            }
            Matcher::ByAttribute => DESCRIPTIVE_ATTRIBUTES
                .iter()
                .filter_map(|key| control.attr(key))
                .map(|v| Cow::Owned(normalize_whitespace(v)))
                .chain(control.inner_alts.iter().map(|alt| Cow::Borrowed(alt.as_str())))
                .collect(),
        };

        values.into_iter().filter(|v| !v.is_empty()).collect()
    }

    /// Prepare attribute text for distance measurement.
    ///
    /// Only label-text-before does anything here: it drops everything up to
    /// and including the last occurrence of the path node, so the distance
    /// runs from the end of the label rather than from the start of the block.
    /// Applying it twice gives the same text.
    pub fn process_text_for_distance<'t>(self, ctx: &MatchContext<'_>, text: &'t str) -> &'t str {
        match (self, ctx.path) {
            (Matcher::ByLabelTextBefore, Some(path)) => match path.last_occurrence(text) {
                Some(spot) => text[spot.end..].trim_start(),
                None => text,
            },
            _ => text,
        }
    }

    /// `(distance, label distance)` for one attribute value, `None` if the
    /// target does not match.
    ///
    /// The distance is the gap from the path to the control. Label strategies
    /// also measure the gap between the target and the control inside the
    /// label; without a path that gap is the distance itself.
    fn score(
        self,
        ctx: &MatchContext<'_>,
        control: &IndexedControl,
        value: &str,
    ) -> Option<(usize, usize)> {
        let target = ctx.target;
        let processed = self.process_text_for_distance(ctx, value);
        let from_path = || ctx.index.distance_from(ctx.path_spot, control);
        let in_label = match self {
            Matcher::ById | Matcher::ByName | Matcher::ByLabel | Matcher::ByAttribute => {
                return target.matches(processed).then(|| (from_path(), 0));
            }
            Matcher::ByText => {
                return (target.is_contained_in(processed) && !target.matches(processed))
                    .then(|| (from_path(), 0));
            }
            Matcher::ByLabelElement => target
                .is_contained_in(processed)
                .then(|| target.no_of_chars_after_last_occurrence(processed)),
            Matcher::ByLabelTextBefore => {
                if !target.is_contained_in(value) {
                    return None;
                }
                // A target overlapping the trimmed path counts from the path's end.
                if target.is_match_all() || !target.is_contained_in(processed) {
                    Some(char_len(processed))
                } else {
                    Some(target.no_of_chars_after_last_occurrence(processed))
                }
            }
            Matcher::ByLabelTextAfter => target
                .is_contained_in(processed)
                .then(|| target.no_of_chars_before_first_occurrence(processed)),
        }?;

        Some(match ctx.path_spot {
            Some(_) => (from_path(), in_label),
            None => (in_label, 0),
        })
    }

    /// Append an entry for every eligible control that matches.
    pub fn collect(self, ctx: &MatchContext<'_>, list: &mut WeightedControlList) {
        let found_type = self.found_type();
        for control in ctx.index.controls() {
            if !self.applies_to(control.kind)
                || !ctx.requirement.accepts(control.kind)
                || !ctx.is_after_path(control)
            {
                continue;
            }

            let best = self
                .attribute_values(ctx, control)
                .iter()
                .filter_map(|value| self.score(ctx, control, value))
                .min();

            if let Some((distance, label_distance)) = best {
                list.add_scored(control, found_type, distance, label_distance);
            }
        }
    }
}
