use legend_core::protocol::{Element, PageSnapshot};
use legend_core::{
    DocumentProvider, PageIndex, ProviderError, ResolutionEngine, ResolutionError, Session,
    StaticProvider, TargetRequirement,
};
use std::sync::Arc;

/// A page that can be "re-rendered" between steps.
struct LivePage {
    generation: u64,
    button_text: String,
    fail: bool,
}

impl LivePage {
    fn new(button_text: &str) -> Self {
        Self {
            generation: 1,
            button_text: button_text.to_string(),
            fail: false,
        }
    }

    fn rerender(&mut self, button_text: &str) {
        self.generation += 1;
        self.button_text = button_text.to_string();
    }
}

impl DocumentProvider for LivePage {
    fn generation(&self) -> u64 {
        self.generation
    }

    fn snapshot(&self) -> Result<PageSnapshot, ProviderError> {
        if self.fail {
            return Err(ProviderError("browser went away".to_string()));
        }
        Ok(PageSnapshot::new(vec![
            Element::new(1, "button").text(&self.button_text).into(),
        ])
        .with_generation(self.generation))
    }
}

#[test]
fn test_index_built_on_first_use() {
    let mut session = Session::new(LivePage::new("Save"), ResolutionEngine::default());
    assert!(session.index().is_none());

    let control = session
        .resolve("Save", TargetRequirement::Clickable)
        .unwrap()
        .into_control()
        .unwrap();
    assert_eq!(control.id, 1);
    assert_eq!(session.index().map(|i| i.generation()), Some(1));
}

#[test]
fn test_stale_index_fails_fast_until_refresh() {
    let mut session = Session::new(LivePage::new("Save"), ResolutionEngine::default());
    session.resolve("Save", TargetRequirement::Any).unwrap();

    session.provider_mut().rerender("Saved");
    let err = session.resolve("Saved", TargetRequirement::Any).unwrap_err();
    assert_eq!(
        err,
        ResolutionError::StaleIndex {
            index_generation: 1,
            document_generation: 2,
        }
    );

    let old = session.index().unwrap();
    let fresh = session.refresh().unwrap();
    assert_eq!(fresh.generation(), 2);
    // The published index is replaced, never patched.
    assert_eq!(old.generation(), 1);
    assert!(old.text().contains("Save"));
    assert!(!old.text().contains("Saved"));

    let control = session
        .resolve("Saved", TargetRequirement::Any)
        .unwrap()
        .into_control()
        .unwrap();
    assert_eq!(control.id, 1);
}

#[test]
fn test_provider_failure_surfaces() {
    let mut page = LivePage::new("Save");
    page.fail = true;
    let mut session = Session::new(page, ResolutionEngine::default());

    let err = session.resolve("Save", TargetRequirement::Any).unwrap_err();
    assert_eq!(
        err,
        ResolutionError::Provider(ProviderError("browser went away".to_string()))
    );
    assert_eq!(err.to_string(), "Document provider failed: browser went away");
}

#[test]
fn test_static_provider_never_goes_stale() {
    let snapshot = PageSnapshot::new(vec![Element::new(1, "button").text("Go").into()]);
    let mut session = Session::new(StaticProvider::new(snapshot), ResolutionEngine::default());

    for _ in 0..3 {
        assert!(session.resolve("Go", TargetRequirement::Any).unwrap().is_found());
    }
}

#[test]
fn test_shared_index_across_threads() {
    let index: Arc<PageIndex> = Arc::new(PageIndex::build(&PageSnapshot::new(vec![
        Element::new(1, "button").text("Save").into(),
        Element::new(2, "button").text("Cancel").into(),
        Element::new(3, "a").attr("href", "/help").text("Help").into(),
    ])));
    let engine = ResolutionEngine::default();

    let results: Vec<(String, u32)> = std::thread::scope(|scope| {
        let handles: Vec<_> = ["Save", "Cancel", "Help"]
            .into_iter()
            .map(|locator| {
                let index = Arc::clone(&index);
                let engine = &engine;
                scope.spawn(move || {
                    let control = engine
                        .resolve(&index, locator, TargetRequirement::Clickable)
                        .unwrap()
                        .into_control()
                        .unwrap();
                    (locator.to_string(), control.id)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(
        results,
        vec![
            ("Save".to_string(), 1),
            ("Cancel".to_string(), 2),
            ("Help".to_string(), 3),
        ]
    );
}
