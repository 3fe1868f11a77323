//! Page Text Index
//!
//! A read-only view of one page snapshot: the flattened visible text plus, for
//! every control, where its own content sits in that text. Everything the
//! match strategies need (text before/after a control, associated labels,
//! path spots) is answered from here without touching the document again.
//!
//! Flattening rules:
//! - whitespace runs collapse to one space;
//! - block-level elements (see [`BLOCK_TAGS`]) are surrounded by a newline,
//!   which is the block boundary;
//! - every control is surrounded by a word separator;
//! - hidden elements contribute nothing.
//!
//! The text before a control starts at the later of its block start and the
//! end of the previous control. The text after a control ends at the earlier
//! of its block end and the start of the next control.

use crate::control::ControlKind;
use crate::pattern::{SearchPattern, char_len};
use crate::span::FindSpot;
use legend_common::normalizer::push_normalized;
use legend_common::{Element, Node, PageSnapshot, normalize_whitespace};
use std::collections::HashMap;
use tracing::debug;

/// Tags whose start and end are block boundaries.
pub const BLOCK_TAGS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "body",
    "br",
    "dd",
    "div",
    "dl",
    "dt",
    "fieldset",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hr",
    "li",
    "main",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "tbody",
    "td",
    "tfoot",
    "th",
    "thead",
    "tr",
    "ul",
];

const BLOCK_BOUNDARY: char = '\n';

/// A control as seen by the index.
#[derive(Debug, Clone)]
pub struct IndexedControl {
    /// Provider handle, never synthesized.
    pub id: u32,
    pub tag: String,
    pub kind: ControlKind,
    /// Position among controls in document order.
    pub order: usize,
    /// The control's own content in the page text.
    pub span: FindSpot,
    /// Displayed text: content text, or `value` for button-like inputs.
    pub caption: String,
    pub attributes: HashMap<String, String>,
    /// `alt` texts of images nested in the control.
    pub inner_alts: Vec<String>,
    pub disabled: bool,
    label: Option<String>,
    before: FindSpot,
    after: FindSpot,
}

impl IndexedControl {
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

#[derive(Debug)]
struct LabelEntry {
    span: FindSpot,
    for_id: Option<String>,
    nested: Option<usize>,
}

#[derive(Debug)]
pub struct PageIndex {
    generation: u64,
    url: String,
    text: String,
    controls: Vec<IndexedControl>,
}

impl PageIndex {
    pub fn build(snapshot: &PageSnapshot) -> Self {
        let mut builder = Builder::default();
        for node in &snapshot.nodes {
            builder.walk(node);
        }
        let index = builder.finish(snapshot);
        debug!(
            url = %index.url,
            generation = index.generation,
            controls = index.controls.len(),
            chars = index.text.len(),
            "Built page text index"
        );
        index
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// The flattened page text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// All controls in document order.
    pub fn controls(&self) -> &[IndexedControl] {
        &self.controls
    }

    pub fn control(&self, id: u32) -> Option<&IndexedControl> {
        self.controls.iter().find(|c| c.id == id)
    }

    pub fn slice(&self, spot: FindSpot) -> &str {
        spot.slice(&self.text)
    }

    /// Span of text preceding the control within its block.
    pub fn text_before(&self, control: &IndexedControl) -> FindSpot {
        control.before
    }

    /// Span of text following the control within its block.
    pub fn text_after(&self, control: &IndexedControl) -> FindSpot {
        control.after
    }

    /// Text before the control, cut so nothing in front of `boundary` is used.
    ///
    /// `boundary` is usually the end of the path spot, so a label already
    /// consumed by the path is not matched a second time.
    pub fn label_text_before(&self, control: &IndexedControl, boundary: usize) -> &str {
        let spot = self.text_before(control);
        let start = spot.start.max(boundary).min(spot.end);
        self.slice(self.trim(FindSpot::new(start, spot.end)))
    }

    /// Text after the control, starting no earlier than `boundary`.
    pub fn label_text_after(&self, control: &IndexedControl, boundary: usize) -> &str {
        let spot = self.text_after(control);
        let start = spot.start.max(boundary).min(spot.end);
        self.slice(self.trim(FindSpot::new(start, spot.end)))
    }

    /// Text of the `<label>` associated with the control, if any.
    pub fn label_text<'c>(&self, control: &'c IndexedControl) -> Option<&'c str> {
        control.label.as_deref()
    }

    /// Locate a path: each node is searched after the end of the previous one.
    ///
    /// Returns the spot from the start of the first node to the end of the
    /// last, or `None` when any node is missing. An empty path has no spot.
    pub fn find_path(&self, path: &[SearchPattern]) -> Option<FindSpot> {
        let mut from = 0;
        let mut found: Option<FindSpot> = None;
        for pattern in path {
            let spot = pattern.first_occurrence(&self.text[from..])?.offset(from);
            from = spot.end;
            found = Some(found.map_or(spot, |f| f.union(spot)));
        }
        found
    }

    /// Characters between the end of the path spot and the control.
    pub fn distance_from(&self, path_spot: Option<FindSpot>, control: &IndexedControl) -> usize {
        match path_spot {
            Some(spot) if spot.end < control.span.start => {
                let between = self.trim(FindSpot::new(spot.end, control.span.start));
                char_len(self.slice(between))
            }
            _ => 0,
        }
    }

    fn trim(&self, spot: FindSpot) -> FindSpot {
        trim_spot(&self.text, spot)
    }
}

/// Shrink a spot so it neither starts nor ends with whitespace.
fn trim_spot(text: &str, spot: FindSpot) -> FindSpot {
    let slice = spot.slice(text);
    let leading = slice.len() - slice.trim_start().len();
    if leading == slice.len() {
        return FindSpot::empty_at(spot.start);
    }
    let trailing = slice.len() - slice.trim_end().len();
    FindSpot::new(spot.start + leading, spot.end - trailing)
}

#[derive(Default)]
struct Builder {
    text: String,
    controls: Vec<IndexedControl>,
    labels: Vec<LabelEntry>,
    open_labels: Vec<usize>,
    open_captions: Vec<usize>,
}

impl Builder {
    fn walk(&mut self, node: &Node) {
        match node {
            Node::Text { text } => push_normalized(&mut self.text, text),
            Node::Element(elem) => self.walk_element(elem),
        }
    }

    fn walk_element(&mut self, elem: &Element) {
        if elem.is_hidden() {
            return;
        }

        let is_block = BLOCK_TAGS.contains(&elem.tag.as_str());
        if is_block {
            self.boundary();
        }

        // Images inside buttons and links decorate their parent.
        let kind = match ControlKind::classify(elem) {
            Some(ControlKind::Image) if !self.open_captions.is_empty() => None,
            other => other,
        };

        if elem.tag == "img"
            && let (Some(&parent), Some(alt)) = (self.open_captions.last(), elem.get_attr("alt"))
        {
            self.controls[parent]
                .inner_alts
                .push(normalize_whitespace(alt));
        }

        match kind {
            Some(kind) => self.walk_control(elem, kind),
            None if elem.tag == "label" => self.walk_label(elem),
            None => self.walk_children(elem),
        }

        if is_block {
            self.boundary();
        }
    }

    fn walk_control(&mut self, elem: &Element, kind: ControlKind) {
        // Recorded before the separator: a later block boundary may turn that
        // separator into a newline, which must stay in front of the control.
        let start = self.text.len();
        push_normalized(&mut self.text, " ");
        let order = self.controls.len();

        for &label in &self.open_labels {
            self.labels[label].nested.get_or_insert(order);
        }

        self.controls.push(IndexedControl {
            id: elem.id,
            tag: elem.tag.clone(),
            kind,
            order,
            span: FindSpot::empty_at(start),
            caption: String::new(),
            attributes: elem.attributes.clone(),
            inner_alts: vec![],
            disabled: elem.state.disabled,
            label: None,
            before: FindSpot::empty_at(start),
            after: FindSpot::empty_at(start),
        });

        if elem.tag == "input" && kind == ControlKind::Button {
            if let Some(value) = elem.get_attr("value") {
                push_normalized(&mut self.text, value);
            }
        } else {
            if kind.has_caption() {
                self.open_captions.push(order);
            }
            self.walk_children(elem);
            if kind.has_caption() {
                self.open_captions.pop();
            }
        }

        let span = trim_spot(&self.text, FindSpot::new(start, self.content_end(start)));
        let control = &mut self.controls[order];
        control.span = span;
        control.caption = normalize_whitespace(span.slice(&self.text));
        push_normalized(&mut self.text, " ");
    }

    fn walk_label(&mut self, elem: &Element) {
        let start = self.text.len();
        let label = self.labels.len();
        self.labels.push(LabelEntry {
            span: FindSpot::empty_at(start),
            for_id: elem.get_attr("for").map(str::to_string),
            nested: None,
        });

        self.open_labels.push(label);
        self.walk_children(elem);
        self.open_labels.pop();

        let end = self.content_end(start);
        self.labels[label].span = FindSpot::new(start, end);
    }

    fn walk_children(&mut self, elem: &Element) {
        for child in &elem.children {
            self.walk(child);
        }
    }

    /// Current end of text, excluding a trailing separator.
    fn content_end(&self, start: usize) -> usize {
        let end = self.text.len();
        if end > start && self.text.ends_with([' ', BLOCK_BOUNDARY]) {
            end - 1
        } else {
            end
        }
    }

    /// End the current block. A pending separator is replaced in place so no
    /// recorded offset moves past the end of the text.
    fn boundary(&mut self) {
        if self.text.ends_with(' ') {
            self.text.pop();
            self.text.push(BLOCK_BOUNDARY);
        } else if !self.text.is_empty() && !self.text.ends_with(BLOCK_BOUNDARY) {
            self.text.push(BLOCK_BOUNDARY);
        }
    }

    /// Record the text before and after each control. Both stop at the block
    /// edge and at the neighbouring control, whichever is nearer.
    fn bound_neighbours(&mut self) {
        let text = &self.text;
        let count = self.controls.len();

        let mut latest_end = 0;
        for i in 0..count {
            let span = self.controls[i].span;
            let previous_end = if latest_end <= span.start {
                latest_end
            } else {
                // A control nested in an earlier one ends past this start.
                self.controls[..i]
                    .iter()
                    .map(|c| c.span.end)
                    .filter(|&end| end <= span.start)
                    .max()
                    .unwrap_or(0)
            };
            latest_end = latest_end.max(span.end);

            let block_start = text[..span.start]
                .rfind(BLOCK_BOUNDARY)
                .map_or(0, |pos| pos + BLOCK_BOUNDARY.len_utf8());
            self.controls[i].before = trim_spot(
                text,
                FindSpot::new(block_start.max(previous_end), span.start),
            );
        }

        let mut earliest_start = text.len();
        for i in (0..count).rev() {
            let span = self.controls[i].span;
            let next_start = if earliest_start >= span.end {
                earliest_start
            } else {
                self.controls[i + 1..]
                    .iter()
                    .map(|c| c.span.start)
                    .find(|&start| start >= span.end)
                    .unwrap_or(text.len())
            };
            earliest_start = earliest_start.min(span.start);

            let block_end = text[span.end..]
                .find(BLOCK_BOUNDARY)
                .map_or(text.len(), |pos| span.end + pos);
            self.controls[i].after =
                trim_spot(text, FindSpot::new(span.end, block_end.min(next_start)));
        }
    }

    fn finish(mut self, snapshot: &PageSnapshot) -> PageIndex {
        for label in &self.labels {
            let target = match &label.for_id {
                Some(for_id) => self
                    .controls
                    .iter()
                    .position(|c| c.attr("id") == Some(for_id.as_str())),
                None => label.nested,
            };
            let Some(target) = target else {
                continue;
            };

            let control_span = self.controls[target].span;
            let text = if label.span.start <= control_span.start
                && control_span.end <= label.span.end
            {
                format!(
                    "{} {}",
                    &self.text[label.span.start..control_span.start],
                    &self.text[control_span.end..label.span.end]
                )
            } else {
                label.span.slice(&self.text).to_string()
            };
            let text = normalize_whitespace(&text);

            let control = &mut self.controls[target];
            if control.label.is_none() && !text.is_empty() {
                control.label = Some(text);
            }
        }

        self.bound_neighbours();

        PageIndex {
            generation: snapshot.generation,
            url: snapshot.url.clone(),
            text: self.text,
            controls: self.controls,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use legend_common::Element;

    fn index(nodes: Vec<Node>) -> PageIndex {
        PageIndex::build(&PageSnapshot::new(nodes))
    }

    fn input(id: u32) -> Element {
        Element::new(id, "input").attr("id", &format!("in{id}"))
    }

    #[test]
    fn test_flatten_normalizes_and_breaks_blocks() {
        let idx = index(vec![
            Element::new(1, "h1").text("  Sign   in ").into(),
            Element::new(2, "p").text("Welcome").child(Element::new(3, "b").text(" back")).into(),
        ]);
        assert_eq!(idx.text(), "Sign in\nWelcome back\n");
    }

    #[test]
    fn test_control_span_and_caption() {
        let idx = index(vec![
            Node::text("Please"),
            Element::new(1, "button").text(" Save  changes ").into(),
            Node::text("now"),
        ]);
        let button = idx.control(1).unwrap();
        assert_eq!(button.caption, "Save changes");
        assert_eq!(idx.slice(button.span), "Save changes");
        assert_eq!(idx.text(), "Please Save changes now");
    }

    #[test]
    fn test_submit_input_caption_from_value() {
        let idx = index(vec![
            Element::new(1, "input")
                .attr("type", "submit")
                .attr("value", "Log in")
                .into(),
        ]);
        assert_eq!(idx.control(1).unwrap().caption, "Log in");
    }

    #[test]
    fn test_text_before_bounded_by_block_and_previous_control() {
        let idx = index(vec![
            Element::new(10, "p").text("Intro text").into(),
            Element::new(11, "div")
                .text("User Name:")
                .child(input(1))
                .text("Password:")
                .child(input(2))
                .into(),
        ]);
        let user = idx.control(1).unwrap();
        let pass = idx.control(2).unwrap();
        assert_eq!(idx.slice(idx.text_before(user)), "User Name:");
        assert_eq!(idx.slice(idx.text_before(pass)), "Password:");
        assert_eq!(idx.slice(idx.text_after(user)), "Password:");
        assert_eq!(idx.slice(idx.text_after(pass)), "");
    }

    fn scanned_before(idx: &PageIndex, control: &IndexedControl) -> FindSpot {
        let block_start = idx.text[..control.span.start]
            .rfind(BLOCK_BOUNDARY)
            .map_or(0, |pos| pos + 1);
        let previous_end = idx.controls[..control.order]
            .iter()
            .map(|c| c.span.end)
            .filter(|&end| end <= control.span.start)
            .max()
            .unwrap_or(0);
        trim_spot(&idx.text, FindSpot::new(block_start.max(previous_end), control.span.start))
    }

    fn scanned_after(idx: &PageIndex, control: &IndexedControl) -> FindSpot {
        let from = control.span.end;
        let block_end = idx.text[from..]
            .find(BLOCK_BOUNDARY)
            .map_or(idx.text.len(), |pos| from + pos);
        let next_start = idx.controls[control.order + 1..]
            .iter()
            .map(|c| c.span.start)
            .find(|&start| start >= from)
            .unwrap_or(idx.text.len());
        trim_spot(&idx.text, FindSpot::new(from, block_end.min(next_start)))
    }

    #[test]
    fn test_neighbour_bounds_with_nested_controls() {
        let idx = index(vec![
            Element::new(10, "div")
                .text("Agree to")
                .child(
                    Element::new(1, "a")
                        .attr("href", "/terms")
                        .text("the terms")
                        .child(Element::new(2, "input").attr("type", "checkbox"))
                        .text("and rules"),
                )
                .text("below")
                .child(input(3))
                .text("then")
                .child(Element::new(4, "button").text("Send"))
                .into(),
            Element::new(11, "p").text("Footer").child(input(5)).into(),
        ]);
        assert_eq!(idx.controls().len(), 5);
        for control in idx.controls() {
            assert_eq!(idx.text_before(control), scanned_before(&idx, control), "before #{}", control.id);
            assert_eq!(idx.text_after(control), scanned_after(&idx, control), "after #{}", control.id);
        }
        assert_eq!(idx.slice(idx.text_before(idx.control(1).unwrap())), "Agree to");
        assert_eq!(idx.slice(idx.text_before(idx.control(5).unwrap())), "Footer");
    }

    #[test]
    fn test_br_is_a_block_boundary() {
        let idx = index(vec![
            Node::text("First"),
            Element::new(5, "br").into(),
            Node::text("Second"),
            input(1).into(),
        ]);
        assert_eq!(idx.slice(idx.text_before(idx.control(1).unwrap())), "Second");
    }

    #[test]
    fn test_label_text_before_respects_boundary() {
        let idx = index(vec![Node::text("Account User Name:"), input(1).into()]);
        let control = idx.control(1).unwrap();
        assert_eq!(idx.label_text_before(control, 0), "Account User Name:");
        assert_eq!(idx.label_text_before(control, 7), "User Name:");
        assert_eq!(idx.label_text_before(control, 1000), "");
    }

    #[test]
    fn test_label_for_association() {
        let idx = index(vec![
            Element::new(1, "label").attr("for", "email").text("E-Mail").into(),
            Element::new(2, "input").attr("id", "email").into(),
        ]);
        assert_eq!(idx.label_text(idx.control(2).unwrap()), Some("E-Mail"));
    }

    #[test]
    fn test_wrapping_label_excludes_control_caption() {
        let idx = index(vec![
            Element::new(1, "label")
                .text("Remember me")
                .child(Element::new(2, "input").attr("type", "checkbox"))
                .into(),
        ]);
        assert_eq!(idx.label_text(idx.control(2).unwrap()), Some("Remember me"));
    }

    #[test]
    fn test_hidden_elements_skipped() {
        let idx = index(vec![
            Element::new(1, "div").text("secret").hidden().into(),
            Element::new(2, "input").attr("type", "hidden").into(),
            Node::text("visible"),
        ]);
        assert_eq!(idx.text(), "visible");
        assert!(idx.controls().is_empty());
    }

    #[test]
    fn test_image_inside_link_decorates_link() {
        let idx = index(vec![
            Element::new(1, "a")
                .attr("href", "/")
                .child(Element::new(2, "img").attr("alt", "Home"))
                .into(),
        ]);
        assert_eq!(idx.controls().len(), 1);
        assert_eq!(idx.controls()[0].inner_alts, vec!["Home".to_string()]);
    }

    #[test]
    fn test_find_path_sequential() {
        let idx = index(vec![Node::text("Login Name Account Name")]);
        let path = [
            SearchPattern::compile("Account").unwrap(),
            SearchPattern::compile("Name").unwrap(),
        ];
        assert_eq!(idx.find_path(&path), Some(FindSpot::new(11, 23)));
        assert_eq!(idx.find_path(&[]), None);
        let missing = [SearchPattern::compile("Logout").unwrap()];
        assert_eq!(idx.find_path(&missing), None);
    }

    #[test]
    fn test_distance_from_path_spot() {
        let idx = index(vec![Node::text("Login form: please"), input(1).into()]);
        let control = idx.control(1).unwrap();
        let spot = idx.find_path(&[SearchPattern::compile("Login").unwrap()]);
        assert_eq!(idx.distance_from(spot, control), "form: please".len());
        assert_eq!(idx.distance_from(None, control), 0);
    }

    #[test]
    fn test_empty_document() {
        let idx = index(vec![]);
        assert_eq!(idx.text(), "");
        assert!(idx.controls().is_empty());
    }
}
