use super::requirement::TargetRequirement;
use super::result::{Resolution, ResolutionError, ResolvedControl};
use super::suggest::suggest;
use crate::config::ResolverConfig;
use crate::found_type::FoundType;
use crate::index::PageIndex;
use crate::locator::Locator;
use crate::matcher::{MatchContext, Matcher};
use crate::weighted::{Decision, RankedControl, WeightedControlList};
use tracing::{debug, info};

/// Drives the match strategies for one locator against one page index.
///
/// The engine holds configuration only; every pass borrows an immutable
/// index, so one engine and one index can serve many passes in parallel.
#[derive(Debug, Clone)]
pub struct ResolutionEngine {
    config: ResolverConfig,
    strategies: Vec<Matcher>,
}

impl Default for ResolutionEngine {
    fn default() -> Self {
        Self::new(ResolverConfig::default())
    }
}

impl ResolutionEngine {
    pub fn new(config: ResolverConfig) -> Self {
        let mut found_types = config.strategies.clone();
        found_types.sort();
        found_types.dedup();
        let strategies = found_types
            .into_iter()
            .map(Matcher::for_found_type)
            .collect();
        Self { config, strategies }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Strategies in the order they run.
    pub fn strategies(&self) -> Vec<FoundType> {
        self.strategies.iter().map(|m| m.found_type()).collect()
    }

    /// Parse a locator with this engine's case policy.
    pub fn compile(&self, locator: &str) -> Result<Locator, ResolutionError> {
        Ok(Locator::parse_with(locator, self.config.case_sensitive)?)
    }

    /// Compile and resolve. Malformed locators fail before the index is read.
    pub fn resolve(
        &self,
        index: &PageIndex,
        locator: &str,
        requirement: TargetRequirement,
    ) -> Result<Resolution, ResolutionError> {
        let locator = self.compile(locator)?;
        Ok(self.resolve_locator(index, &locator, requirement))
    }

    pub fn resolve_locator(
        &self,
        index: &PageIndex,
        locator: &Locator,
        requirement: TargetRequirement,
    ) -> Resolution {
        let list = self.collect(index, locator, requirement);
        let resolution = match list.decide(self.config.tie_break) {
            Decision::Unique(ranked) => Resolution::Found {
                locator: locator.source().to_string(),
                control: to_resolved(index, &ranked),
            },
            Decision::Ambiguous(tied) => Resolution::Ambiguous {
                locator: locator.source().to_string(),
                candidates: tied.iter().map(|r| to_resolved(index, r)).collect(),
            },
            Decision::NotFound => Resolution::NotFound {
                locator: locator.source().to_string(),
                suggestions: suggest(
                    index,
                    locator.target().original(),
                    requirement,
                    self.config.suggestion_threshold,
                    self.config.max_suggestions,
                ),
            },
        };

        match &resolution {
            Resolution::Found { control, .. } => {
                info!(locator = %locator, control = %control, "Resolved control")
            }
            Resolution::NotFound { .. } => info!(locator = %locator, "No control found"),
            Resolution::Ambiguous { candidates, .. } => info!(
                locator = %locator,
                candidates = candidates.len(),
                "Ambiguous locator"
            ),
        }

        resolution
    }

    /// Run every strategy and return the collected entries, unranked.
    ///
    /// An empty list means the path was missing or nothing matched.
    pub fn collect(
        &self,
        index: &PageIndex,
        locator: &Locator,
        requirement: TargetRequirement,
    ) -> WeightedControlList {
        let mut list = WeightedControlList::new();

        let path_spot = index.find_path(locator.path());
        if locator.has_path() && path_spot.is_none() {
            debug!(locator = %locator, "Path not found on page");
            return list;
        }

        let ctx = MatchContext {
            index,
            path: locator.path_pattern(),
            path_spot,
            target: locator.target(),
            requirement,
        };

        for matcher in &self.strategies {
            let mut found = WeightedControlList::new();
            matcher.collect(&ctx, &mut found);
            if !found.is_empty() {
                debug!(
                    strategy = %matcher.found_type(),
                    entries = found.len(),
                    "Strategy contributed candidates"
                );
            }
            list.add_all(found);
        }

        list
    }
}

fn to_resolved(index: &PageIndex, ranked: &RankedControl) -> ResolvedControl {
    // Entries are only ever created from this index's controls.
    let control = &index.controls()[ranked.best.order];
    ResolvedControl {
        id: control.id,
        tag: control.tag.clone(),
        kind: control.kind,
        found_type: ranked.best.found_type,
        distance: ranked.best.distance,
        found_by: ranked.found_by.clone(),
        disabled: control.disabled,
    }
}
