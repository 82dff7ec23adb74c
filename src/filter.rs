use std::sync::Arc;
use std::time::Instant;

use itertools::Itertools;
use strum_macros::Display;
use tracing::{debug, info, warn};

use crate::config::FilterConfig;
use crate::directory::{DirectoryLookup, Entry};
use crate::error::FilterError;
use crate::exemption::{Exemption, NoExemptions, PatternExemption};
use crate::metrics::{EvaluationStats, MetricsSink, NoOpSink};
use crate::timers::{PhaseDurations, PhaseTimer};
use crate::types::{
    Candidate, CandidateKind, CandidateSet, Identifier, IdentifyingAttribute, Namespace,
    Partition, Target, TargetClassifier, TargetKind,
};

/// Result of the classification-label check for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub(crate) enum LabelCheck {
    /// Entry carries no labels.
    Unlabelled,
    /// At least one label equals the target namespace.
    Matched,
    /// Labels present, none equal the target namespace.
    Mismatched,
    /// Entry could not be read.
    NotFound,
}

impl LabelCheck {
    fn excludes(self) -> bool {
        matches!(self, LabelCheck::Mismatched | LabelCheck::NotFound)
    }
}

/// Decides which proposed hosts and host-groups may join a target.
///
/// A target named `ns.something` admits a candidate only if
/// - a host-group candidate is named `ns` or `ns.*` (case-insensitive), and
/// - the candidate has no classification labels or one of them is exactly `ns`.
///
/// One denial rejects the whole request. Cloneable and thread-safe; it holds
/// no state between evaluations.
#[derive(Clone)]
pub struct NamespaceFilter {
    directory: Arc<dyn DirectoryLookup>,
    config: Arc<FilterConfig>,
    classifier: Arc<TargetClassifier>,
    exemption: Arc<dyn Exemption>,
    metrics: Arc<dyn MetricsSink>,
}

impl NamespaceFilter {
    /// Filter with the default configuration.
    pub fn new(directory: Arc<dyn DirectoryLookup>) -> Result<Self, FilterError> {
        Self::with_config(directory, FilterConfig::default())
    }

    pub fn with_config(
        directory: Arc<dyn DirectoryLookup>,
        config: FilterConfig,
    ) -> Result<Self, FilterError> {
        config.validate()?;
        let classifier = config.target_classifier()?;
        let patterns = config.exempt_patterns()?;
        let exemption: Arc<dyn Exemption> = if patterns.is_empty() {
            Arc::new(NoExemptions)
        } else {
            Arc::new(PatternExemption::new(patterns))
        };

        Ok(Self {
            directory,
            config: Arc::new(config),
            classifier: Arc::new(classifier),
            exemption,
            metrics: Arc::new(NoOpSink),
        })
    }

    /// Replace the exemption hook.
    pub fn with_exemption(mut self, exemption: Arc<dyn Exemption>) -> Self {
        self.exemption = exemption;
        self
    }

    pub fn with_metrics_sink(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.metrics = sink;
        self
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Work out the target's kind, canonical name and namespace.
    ///
    /// Rules are named by an opaque unique id, so their canonical name is read
    /// from the directory. Any lookup miss leaves the target without a
    /// namespace.
    pub fn resolve_target(&self, id: &Identifier) -> Target {
        let kind = self.classifier.classify(id);
        let name = match id.components() {
            Some((IdentifyingAttribute::UniqueId, _)) => {
                let name_attr = self.config.name_attribute.as_str();
                self.lookup(id, "target", &[name_attr])
                    .and_then(|entry| entry.first(name_attr).map(str::to_string))
            }
            Some((_, name)) => Some(name.to_string()),
            None => {
                warn!(
                    event = "Filter",
                    phase = "Namespace",
                    target = %id,
                    "target identifier has no identifying attribute"
                );
                None
            }
        };
        Target::new(id.clone(), kind, name)
    }

    /// Partition `proposed` into accepted and rejected candidates for `target`.
    ///
    /// Never fails: directory errors count as missing entries, which deny the
    /// candidate (or, for the target, leave it without a namespace).
    pub fn evaluate(&self, target: &Identifier, proposed: &CandidateSet) -> Partition {
        let started = Instant::now();
        let mut phases = PhaseDurations::default();

        debug!(
            event = "Filter",
            phase = "Request",
            target = %target,
            hosts = proposed.hosts().len(),
            host_groups = proposed.host_groups().len()
        );

        let resolved = {
            let _timer = PhaseTimer::new(&mut phases.resolve_namespace);
            self.resolve_target(target)
        };

        let Some(namespace) = resolved.namespace() else {
            info!(
                event = "Filter",
                phase = "Namespace",
                target = %target,
                name = resolved.name().unwrap_or_default(),
                "target has no namespace, admitting all candidates"
            );
            let partition = Partition::accept_all(proposed);
            self.record(&resolved, proposed, 0, &partition, started, phases);
            return partition;
        };

        let denied: Vec<Candidate> = {
            let _timer = PhaseTimer::new(&mut phases.classify);
            proposed
                .candidates()
                .filter(|candidate| self.is_denied(namespace, candidate))
                .collect()
        };

        let partition = {
            let _timer = PhaseTimer::new(&mut phases.enforce);
            enforce(resolved.kind(), proposed, &denied)
        };

        debug!(
            event = "Filter",
            phase = "Result",
            target = %target,
            namespace = %namespace,
            kind = %resolved.kind(),
            denied = denied.len(),
            accepted = partition.accepted_count(),
            rejected = partition.rejected_count()
        );

        self.record(&resolved, proposed, denied.len(), &partition, started, phases);
        partition
    }

    /// Both checks run for every candidate; failing either denies it.
    fn is_denied(&self, namespace: &Namespace, candidate: &Candidate) -> bool {
        if self.exemption.is_exempt(candidate) {
            debug!(
                event = "Filter",
                phase = "Candidate",
                candidate = %candidate.id(),
                "candidate exempt from namespace checks"
            );
            return false;
        }

        let by_name = excluded_by_name(namespace, candidate);
        let labels = self.check_labels(namespace, candidate);
        let denied = by_name || labels.excludes();

        debug!(
            event = "Filter",
            phase = "Candidate",
            candidate = %candidate.id(),
            kind = %candidate.kind(),
            excluded_by_name = by_name,
            labels = %labels,
            denied
        );
        denied
    }

    fn check_labels(&self, namespace: &Namespace, candidate: &Candidate) -> LabelCheck {
        let attr = self.config.classification_attribute.as_str();
        let Some(entry) = self.lookup(candidate.id(), "candidate", &[attr]) else {
            return LabelCheck::NotFound;
        };
        label_check(namespace, entry.values(attr))
    }

    /// One directory read. Misses and failures both come back as `None`.
    fn lookup(&self, id: &Identifier, role: &'static str, requested: &[&str]) -> Option<Entry> {
        let Some((attribute, value)) = id.components() else {
            warn!(
                event = "Filter",
                phase = "Lookup",
                role,
                identifier = %id,
                "identifier cannot be resolved to an entry"
            );
            return None;
        };

        match self.directory.find_one(id, attribute, value, requested) {
            Ok(Some(entry)) => Some(entry),
            Ok(None) => {
                warn!(
                    event = "Filter",
                    phase = "Lookup",
                    role,
                    identifier = %id,
                    "entry not found"
                );
                None
            }
            Err(err) => {
                warn!(
                    event = "Filter",
                    phase = "Lookup",
                    role,
                    identifier = %id,
                    error = %err,
                    "directory lookup failed"
                );
                None
            }
        }
    }

    fn record(
        &self,
        target: &Target,
        proposed: &CandidateSet,
        denied: usize,
        partition: &Partition,
        started: Instant,
        phases: PhaseDurations,
    ) {
        let duration = started.elapsed();
        let stats = EvaluationStats {
            duration,
            target: target.id().to_string(),
            namespace: target.namespace().map(|ns| ns.to_string()),
            candidates: proposed.len(),
            denied,
            filtered: denied > 0 && !partition.has_accepted(),
        };
        self.metrics.on_evaluation(&stats);
        self.metrics
            .on_evaluation_phases(&stats, &phases.into_phases(duration));
    }
}

/// Host-groups must be named after the namespace or prefixed by it.
/// Hosts are never excluded by name.
pub(crate) fn excluded_by_name(namespace: &Namespace, candidate: &Candidate) -> bool {
    match candidate.kind() {
        CandidateKind::Host => false,
        CandidateKind::HostGroup => !candidate
            .name()
            .is_some_and(|name| namespace.owns_name(name)),
    }
}

pub(crate) fn label_check(namespace: &Namespace, labels: &[String]) -> LabelCheck {
    if labels.is_empty() {
        LabelCheck::Unlabelled
    } else if labels.iter().any(|label| namespace.matches_label(label)) {
        LabelCheck::Matched
    } else {
        LabelCheck::Mismatched
    }
}

/// All-or-nothing: any denial clears both accepted lists. Denied candidates
/// are reported by kind, except hosts denied for a privilege rule, which the
/// rule's membership write cannot accept in its rejected list.
pub(crate) fn enforce(kind: TargetKind, proposed: &CandidateSet, denied: &[Candidate]) -> Partition {
    if denied.is_empty() {
        return Partition::accept_all(proposed);
    }

    let mut partition = Partition::default();
    for candidate in denied.iter().unique() {
        match candidate.kind() {
            CandidateKind::Host if kind == TargetKind::PrivilegeRule => {
                debug!(
                    event = "Filter",
                    phase = "Enforce",
                    candidate = %candidate.id(),
                    "denied host withheld from privilege rule rejections"
                );
            }
            CandidateKind::Host => partition.rejected_hosts.push(candidate.id().clone()),
            CandidateKind::HostGroup => partition
                .rejected_host_groups
                .push(candidate.id().clone()),
        }
    }
    partition
}

#[cfg(test)]
mod tests;
