//! Per-orphan resolution pipeline
//!
//! Stages run in a fixed order and the first one that reaches a decision
//! wins:
//!
//! 1. exact object at the reconstructed path
//! 2. run folder or technology objects, then their parent collections
//! 3. ancestor collections of the reconstructed path
//! 4. store-wide checksum search
//! 5. still lost
//!
//! A store read failure ends the current stage only, but it also rules out
//! the ancestor walk: a nearby collection is never a reason to move an
//! orphan whose better placements could not be checked. Uncertainty always
//! falls towards keeping the orphan.

use std::sync::Arc;

use lnf_config::Config;
use lnf_errors::Error;
use lnf_events::{AppEvent, EventEmitter, EventSender, ResolveEvent, ResolveStep};
use lnf_store::Store;
use lnf_types::{
    CanonicalCandidate, Decision, Evidence, MoveReason, OrphanObject, Technology, TechnologyMatch,
};

use crate::classify::TechnologyClassifier;
use crate::fallback::ContentFallbackSearch;
use crate::locate::CandidateLocator;
use crate::multiplicity::{MultiplicityResolver, ParentOutcome};
use crate::reconstruct::PathReconstructor;
use crate::subject::Subject;
use crate::verify::IdentityVerifier;

/// Knobs the pipeline reads from configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverSettings {
    pub canonical_root: String,
    pub holding_collection: String,
    pub holding_prefix_depth: usize,
    pub checksum_key: String,
    pub technologies: Vec<Technology>,
    pub technology_match: TechnologyMatch,
    pub ancestor_search: bool,
}

impl ResolverSettings {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            canonical_root: config.store.canonical_root.clone(),
            holding_collection: config.store.holding_collection.clone(),
            holding_prefix_depth: config.store.holding_prefix_depth,
            checksum_key: config.store.checksum_key.clone(),
            technologies: config.resolve.technologies.clone(),
            technology_match: config.resolve.technology_match,
            ancestor_search: config.resolve.ancestor_search,
        }
    }
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Outcome of resolving one orphan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub decision: Decision,
    pub technology: Option<Technology>,
    /// Store reads that failed and made a stage give up
    pub read_failures: usize,
}

/// Decides the fate of orphans, one call per orphan
///
/// Cheap to clone; clones share the store and event channel.
#[derive(Clone)]
pub struct Resolver {
    store: Arc<dyn Store>,
    classifier: TechnologyClassifier,
    reconstructor: PathReconstructor,
    locator: CandidateLocator,
    multiplicity: MultiplicityResolver,
    verifier: IdentityVerifier,
    fallback: ContentFallbackSearch,
    ancestor_search: bool,
    tx: Option<EventSender>,
}

impl EventEmitter for Resolver {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}

impl Resolver {
    #[must_use]
    pub fn new(store: Arc<dyn Store>, settings: &ResolverSettings) -> Self {
        Self {
            classifier: TechnologyClassifier::new(
                settings.technologies.clone(),
                settings.technology_match,
            ),
            reconstructor: PathReconstructor::new(
                settings.canonical_root.clone(),
                settings.holding_prefix_depth,
            ),
            locator: CandidateLocator::new(settings.canonical_root.clone(), settings.technology_match),
            multiplicity: MultiplicityResolver::new(store.clone()),
            verifier: IdentityVerifier::new(store.clone(), settings.checksum_key.clone()),
            fallback: ContentFallbackSearch::new(
                store.clone(),
                settings.checksum_key.clone(),
                settings.canonical_root.clone(),
                settings.holding_collection.clone(),
            ),
            ancestor_search: settings.ancestor_search,
            store,
            tx: None,
        }
    }

    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    #[must_use]
    pub fn classifier(&self) -> &TechnologyClassifier {
        &self.classifier
    }

    /// Wrap an orphan for resolution against this resolver's store
    #[must_use]
    pub fn subject(&self, orphan: OrphanObject) -> Subject {
        Subject::new(orphan, self.store.clone())
    }

    pub async fn resolve(&self, orphan: OrphanObject) -> Resolution {
        self.resolve_subject(&self.subject(orphan)).await
    }

    /// Run every stage for an already wrapped orphan
    pub async fn resolve_subject(&self, subject: &Subject) -> Resolution {
        let mut attempt = Attempt {
            resolver: self,
            subject,
            label: subject.label(),
            read_failures: 0,
        };
        self.emit(AppEvent::Resolve(ResolveEvent::OrphanStarted {
            orphan: attempt.label.clone(),
        }));

        let technology = self.classifier.classify(subject.orphan().held_path());
        let decision = attempt.decide(technology).await;
        self.emit_decision(&attempt.label, decision.kind());

        Resolution {
            decision,
            technology,
            read_failures: attempt.read_failures,
        }
    }
}

/// What the exact reconstructed-path probe left behind
enum Reconstructed {
    Decided(Decision),
    /// Probed cleanly and nothing is there; ancestors may still hold it
    Absent(CanonicalCandidate),
    Unusable,
}

/// Book-keeping for one orphan passing through the stages
struct Attempt<'a> {
    resolver: &'a Resolver,
    subject: &'a Subject,
    label: String,
    read_failures: usize,
}

impl Attempt<'_> {
    async fn decide(&mut self, technology: Option<Technology>) -> Decision {
        let reconstructed = match self.reconstructed().await {
            Reconstructed::Decided(decision) => return decision,
            other => other,
        };

        let structural = match technology {
            Some(tech) if !tech.uses_run_folders() => self.technology_path(tech).await,
            _ => self.run_folders().await,
        };
        if let Some(decision) = structural {
            return decision;
        }

        match reconstructed {
            Reconstructed::Absent(candidate) if self.read_failures == 0 => {
                if let Some(decision) = self.ancestor_walk(&candidate).await {
                    return decision;
                }
            }
            Reconstructed::Absent(_) => self.skipped(
                ResolveStep::AncestorWalk,
                "an earlier store read failed",
            ),
            _ => {}
        }

        if let Some(decision) = self.content_search().await {
            return decision;
        }

        Decision::StillLost {
            orphan: self.orphan().location().clone(),
        }
    }

    fn orphan(&self) -> &OrphanObject {
        self.subject.orphan()
    }

    fn skipped(&self, step: ResolveStep, reason: impl Into<String>) {
        self.resolver.emit_step_skipped(&self.label, step, reason);
    }

    fn read_failed(&mut self, step: ResolveStep, error: &Error) {
        self.read_failures += 1;
        self.resolver
            .emit_store_read_failed(&self.label, step, error);
    }

    async fn reconstructed(&mut self) -> Reconstructed {
        let candidate = match self.resolver.reconstructor.reconstruct(self.orphan()) {
            Ok(candidate) => candidate,
            Err(e) => {
                self.skipped(ResolveStep::Reconstruct, e.to_string());
                return Reconstructed::Unusable;
            }
        };

        let exists = match self.probe(ResolveStep::Reconstruct, &[&candidate]).await {
            Ok(found) => found.is_some(),
            Err(e) => {
                self.read_failed(ResolveStep::Reconstruct, &e);
                return Reconstructed::Unusable;
            }
        };
        if !exists {
            return Reconstructed::Absent(candidate);
        }
        match self.verify(&candidate).await {
            Some(decision) => Reconstructed::Decided(decision),
            None => Reconstructed::Unusable,
        }
    }

    async fn ancestor_walk(&mut self, candidate: &CanonicalCandidate) -> Option<Decision> {
        let resolver = self.resolver;
        let ancestors = resolver
            .reconstructor
            .ancestors(candidate, resolver.ancestor_search);
        if ancestors.is_empty() {
            self.skipped(
                ResolveStep::AncestorWalk,
                "reconstructed path lies directly in the canonical root",
            );
            return None;
        }
        match resolver.multiplicity.deepest_existing(&ancestors).await {
            Ok(Some(collection)) => Some(Decision::Move {
                orphan: self.orphan().location().clone(),
                target: collection,
                reason: MoveReason::Collection,
            }),
            Ok(None) => {
                self.skipped(ResolveStep::AncestorWalk, "no ancestor collection exists");
                None
            }
            Err(e) => {
                self.read_failed(ResolveStep::AncestorWalk, &e);
                None
            }
        }
    }

    async fn run_folders(&mut self) -> Option<Decision> {
        let resolver = self.resolver;
        let folders = match resolver.locator.run_folders(self.orphan()) {
            Ok(folders) => folders,
            Err(e) => {
                self.skipped(ResolveStep::RunFolder, e.to_string());
                return None;
            }
        };
        let ordered = folders.in_order();

        match self.probe(ResolveStep::RunFolder, &ordered).await {
            Err(e) => {
                self.read_failed(ResolveStep::RunFolder, &e);
                return None;
            }
            Ok(Some(found)) => return self.verify(found).await,
            Ok(None) => {}
        }

        match resolver.multiplicity.resolve_parents(&ordered).await {
            Ok(ParentOutcome::Move(target)) => Some(Decision::Move {
                orphan: self.orphan().location().clone(),
                target: target.collection().to_string(),
                reason: MoveReason::RunFolder,
            }),
            Ok(ParentOutcome::Ambiguous { direct, archived }) => Some(Decision::KeepAmbiguous {
                orphan: self.orphan().location().clone(),
                direct,
                archived,
            }),
            Ok(ParentOutcome::Unresolved) => {
                self.skipped(
                    ResolveStep::RunFolder,
                    format!("no run folder for run {}", folders.run_id),
                );
                None
            }
            Err(e) => {
                self.read_failed(ResolveStep::RunFolder, &e);
                None
            }
        }
    }

    async fn technology_path(&mut self, technology: Technology) -> Option<Decision> {
        let resolver = self.resolver;
        let candidate = match resolver
            .locator
            .technology_candidate(self.orphan(), technology)
        {
            Ok(candidate) => candidate,
            Err(e) => {
                self.skipped(ResolveStep::TechnologySplice, e.to_string());
                return None;
            }
        };

        match self.probe(ResolveStep::TechnologySplice, &[&candidate]).await {
            Err(e) => {
                self.read_failed(ResolveStep::TechnologySplice, &e);
                return None;
            }
            Ok(Some(found)) => return self.verify(found).await,
            Ok(None) => {}
        }

        match resolver.multiplicity.resolve_parents(&[&candidate]).await {
            Ok(ParentOutcome::Move(target)) => Some(Decision::Move {
                orphan: self.orphan().location().clone(),
                target: target.collection().to_string(),
                reason: MoveReason::Collection,
            }),
            Ok(ParentOutcome::Unresolved | ParentOutcome::Ambiguous { .. }) => {
                self.skipped(
                    ResolveStep::TechnologySplice,
                    format!("no {technology} collection at {}", candidate.collection()),
                );
                None
            }
            Err(e) => {
                self.read_failed(ResolveStep::TechnologySplice, &e);
                None
            }
        }
    }

    async fn content_search(&mut self) -> Option<Decision> {
        match self.resolver.fallback.search(self.subject).await {
            Ok(outcome) => {
                if outcome.rejected > 0 {
                    self.resolver
                        .emit(AppEvent::Resolve(ResolveEvent::ContentSearchMisses {
                            orphan: self.label.clone(),
                            returned: outcome.rejected,
                        }));
                }
                outcome.matched.map(|existing| Decision::Remove {
                    orphan: self.orphan().location().clone(),
                    existing,
                    evidence: Evidence::ContentSearch,
                })
            }
            Err(e) => {
                self.read_failed(ResolveStep::ContentSearch, &e);
                None
            }
        }
    }

    /// First candidate whose object exists, checked in order
    async fn probe<'c>(
        &self,
        step: ResolveStep,
        candidates: &[&'c CanonicalCandidate],
    ) -> Result<Option<&'c CanonicalCandidate>, Error> {
        for &candidate in candidates {
            let exists = self.resolver.store.object_exists(&candidate.path).await?;
            self.resolver
                .emit_candidate_probed(&self.label, step, candidate.path.full_path(), exists);
            if exists {
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }

    async fn verify(&mut self, existing: &CanonicalCandidate) -> Option<Decision> {
        match self.resolver.verifier.verify(self.subject, existing).await {
            Ok(decision) => Some(decision),
            Err(e) => {
                self.read_failed(ResolveStep::Verify, &e);
                None
            }
        }
    }
}
