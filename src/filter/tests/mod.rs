use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use insta::assert_json_snapshot;
use yare::parameterized;

use super::*;
use crate::metrics::EvaluationPhases;
use crate::tests::fixtures::*;


fn hostgroup_target() -> Identifier {
    hostgroup_id("foo.hgroup")
}

fn namespace() -> Namespace {
    Namespace::from_canonical_name("foo.hgroup").unwrap()
}

#[parameterized(
    unlabelled = { &[], LabelCheck::Unlabelled },
    matching = { &["foo"], LabelCheck::Matched },
    matching_among_others = { &["bar", "foo"], LabelCheck::Matched },
    other_namespace = { &["bar"], LabelCheck::Mismatched },
    different_case = { &["FOO"], LabelCheck::Mismatched },
    full_name_is_not_namespace = { &["foo.hgroup"], LabelCheck::Mismatched },
)]
fn test_label_check(labels: &[&str], expected: LabelCheck) {
    let labels: Vec<String> = labels.iter().map(|l| l.to_string()).collect();
    assert_eq!(label_check(&namespace(), &labels), expected);
    assert_eq!(expected.excludes(), matches!(expected, LabelCheck::Mismatched));
}

#[test]
fn test_not_found_excludes() {
    assert!(LabelCheck::NotFound.excludes());
}

#[parameterized(
    host_never_excluded = { Candidate::host(host_id("bar.example.com")), false },
    group_exact = { Candidate::host_group(hostgroup_id("foo")), false },
    group_prefixed = { Candidate::host_group(hostgroup_id("foo.cand")), false },
    group_prefixed_upper = { Candidate::host_group(hostgroup_id("FOO.cand")), false },
    group_other_namespace = { Candidate::host_group(hostgroup_id("bar.cand")), true },
    group_without_namespace = { Candidate::host_group(hostgroup_id("cand_hostgroup")), true },
    group_unparseable = { Candidate::host_group("foo.cand"), true },
)]
fn test_excluded_by_name(candidate: Candidate, expected: bool) {
    assert_eq!(excluded_by_name(&namespace(), &candidate), expected);
}

#[test]
fn test_enforce_without_denials_accepts_everything() {
    let proposed = CandidateSet::new([host_id("a.example.com")], [hostgroup_id("foo.g")]);
    let partition = enforce(TargetKind::HostGroup, &proposed, &[]);
    assert_eq!(partition, Partition::accept_all(&proposed));
}

#[parameterized(
    host_group_target = { TargetKind::HostGroup, 1 },
    access_rule_target = { TargetKind::AccessRule, 1 },
    privilege_rule_target = { TargetKind::PrivilegeRule, 0 },
)]
fn test_enforce_reports_denied_hosts_by_target_kind(kind: TargetKind, rejected_hosts: usize) {
    let denied_host = host_id("bad.example.com");
    let denied_group = hostgroup_id("bar.g");
    let proposed = CandidateSet::new(
        [host_id("good.example.com"), denied_host.clone()],
        [denied_group.clone()],
    );
    let denied = vec![Candidate::host(denied_host), Candidate::host_group(denied_group.clone())];

    let partition = enforce(kind, &proposed, &denied);

    assert!(partition.accepted_hosts.is_empty());
    assert!(partition.accepted_host_groups.is_empty());
    assert_eq!(partition.rejected_hosts.len(), rejected_hosts);
    assert_eq!(partition.rejected_host_groups, vec![denied_group]);
}

#[test]
fn test_enforce_reports_duplicates_once() {
    let host = host_id("dup.example.com");
    let proposed = CandidateSet::new([host.clone(), host.clone()], Vec::<Identifier>::new());
    let denied = vec![Candidate::host(host.clone()), Candidate::host(host.clone())];
    let partition = enforce(TargetKind::HostGroup, &proposed, &denied);
    assert_eq!(partition.rejected_hosts, vec![host]);
}

#[test]
fn test_resolve_hostgroup_target_uses_embedded_name() {
    let directory = Arc::new(CountingDirectory::new(base_directory()));
    let filter = NamespaceFilter::new(directory.clone()).unwrap();

    let target = filter.resolve_target(&hostgroup_target());

    assert_eq!(target.kind(), TargetKind::HostGroup);
    assert_eq!(target.name(), Some("foo.hgroup"));
    assert_eq!(target.namespace().map(Namespace::as_str), Some("foo"));
    assert_eq!(directory.calls(), 0);
}

#[parameterized(
    access_rule = { hbacrule_id("hbac-1"), TargetKind::AccessRule, Some("foo.hbacrule"), Some("foo") },
    privilege_rule = { sudorule_id("sudo-1"), TargetKind::PrivilegeRule, Some("foo.sudorule"), Some("foo") },
    privilege_rule_without_namespace = { sudorule_id("sudo-2"), TargetKind::PrivilegeRule, Some("sudorule"), None },
    missing_rule = { hbacrule_id("gone"), TargetKind::AccessRule, None, None },
)]
fn test_resolve_rule_target_reads_name(
    id: Identifier,
    kind: TargetKind,
    name: Option<&str>,
    namespace: Option<&str>,
) {
    let directory = Arc::new(CountingDirectory::new(base_directory()));
    let filter = NamespaceFilter::new(directory.clone()).unwrap();

    let target = filter.resolve_target(&id);

    assert_eq!(target.kind(), kind);
    assert_eq!(target.name(), name);
    assert_eq!(target.namespace().map(Namespace::as_str), namespace);
    assert_eq!(directory.calls(), 1);
}

#[test]
fn test_resolve_target_with_malformed_identifier() {
    let filter = filter_for(base_directory());
    let target = filter.resolve_target(&Identifier::new("foo.hgroup"));
    assert!(target.namespace().is_none());
}

#[test]
fn test_one_lookup_per_candidate_even_when_denied_by_name() {
    let directory = Arc::new(CountingDirectory::new(
        base_directory()
            .with_entry(host_entry("candhost.example.com", &[]))
            .with_entry(hostgroup_entry("bar.cand", &[])),
    ));
    let filter = NamespaceFilter::new(directory.clone()).unwrap();
    let proposed = CandidateSet::new(
        [host_id("candhost.example.com")],
        [hostgroup_id("bar.cand")],
    );

    filter.evaluate(&hostgroup_target(), &proposed);

    assert_eq!(directory.calls(), 2);
    assert_eq!(
        directory.seen(),
        vec![host_id("candhost.example.com"), hostgroup_id("bar.cand")]
    );
}

#[test]
fn test_rule_target_costs_one_extra_lookup() {
    let directory = Arc::new(CountingDirectory::new(
        base_directory().with_entry(host_entry("candhost.example.com", &[])),
    ));
    let filter = NamespaceFilter::new(directory.clone()).unwrap();
    let proposed = CandidateSet::default().with_host(host_id("candhost.example.com"));

    filter.evaluate(&hbacrule_id("hbac-1"), &proposed);

    assert_eq!(directory.calls(), 2);
}

#[test]
fn test_pass_through_skips_candidate_lookups() {
    let directory = Arc::new(CountingDirectory::new(base_directory()));
    let filter = NamespaceFilter::new(directory.clone()).unwrap();
    let proposed = CandidateSet::default()
        .with_host(host_id("missing.example.com"))
        .with_host_group(hostgroup_id("bar.cand"));

    let partition = filter.evaluate(&hostgroup_id("hgroup"), &proposed);

    assert_eq!(partition, Partition::accept_all(&proposed));
    assert_eq!(directory.calls(), 0);
}

#[test]
fn test_directory_outage_denies_every_candidate() {
    let filter = NamespaceFilter::new(Arc::new(FailingDirectory)).unwrap();
    let proposed = CandidateSet::new(
        [host_id("candhost.example.com")],
        [hostgroup_id("foo.cand")],
    );

    let partition = filter.evaluate(&hostgroup_target(), &proposed);

    assert!(!partition.has_accepted());
    assert_eq!(partition.rejected_hosts, proposed.hosts());
    assert_eq!(partition.rejected_host_groups, proposed.host_groups());
}

#[test]
fn test_directory_outage_leaves_rule_target_unfiltered() {
    let filter = NamespaceFilter::new(Arc::new(FailingDirectory)).unwrap();
    let proposed = CandidateSet::default().with_host(host_id("candhost.example.com"));

    let partition = filter.evaluate(&sudorule_id("sudo-1"), &proposed);

    assert_eq!(partition, Partition::accept_all(&proposed));
}

#[test]
fn test_logs_missing_namespace_at_info() {
    let filter = filter_for(base_directory());
    let proposed = CandidateSet::default().with_host(host_id("candhost.example.com"));

    let logs = capture_logs(|| {
        filter.evaluate(&hostgroup_id("hgroup"), &proposed);
    });

    assert!(logs.contains("INFO"), "logs: {logs}");
    assert!(logs.contains("target has no namespace"), "logs: {logs}");
}

#[test]
fn test_logs_directory_failure_at_warn() {
    let filter = NamespaceFilter::new(Arc::new(FailingDirectory)).unwrap();
    let proposed = CandidateSet::default().with_host(host_id("candhost.example.com"));

    let logs = capture_logs(|| {
        filter.evaluate(&hostgroup_target(), &proposed);
    });

    assert!(logs.contains("WARN"), "logs: {logs}");
    assert!(logs.contains("directory lookup failed"), "logs: {logs}");
    assert!(logs.contains("connection refused"), "logs: {logs}");
}

#[test]
fn test_custom_classification_attribute() {
    let directory = base_directory().with_entry(
        Entry::new(host_id("candhost.example.com"))
            .with_values("userclass", ["bar"])
            .with_values("businessCategory", ["foo"]),
    );
    let config = FilterConfig::builder()
        .classification_attribute("businessCategory")
        .build()
        .unwrap();
    let filter = NamespaceFilter::with_config(Arc::new(directory), config).unwrap();
    let proposed = CandidateSet::default().with_host(host_id("candhost.example.com"));

    let partition = filter.evaluate(&hostgroup_target(), &proposed);

    assert_eq!(partition, Partition::accept_all(&proposed));
    assert_eq!(filter.config().classification_attribute, "businessCategory");
}

#[test]
fn test_configured_exemption_admits_matching_candidate() {
    let directory =
        base_directory().with_entry(host_entry("ips.candhost.example.com", &["bar"]));
    let config = FilterConfig::builder()
        .exempt_name_pattern(r"^ips\.")
        .build()
        .unwrap();
    let filter = NamespaceFilter::with_config(Arc::new(directory), config).unwrap();
    let proposed = CandidateSet::default().with_host(host_id("ips.candhost.example.com"));

    let partition = filter.evaluate(&hostgroup_target(), &proposed);

    assert_eq!(partition, Partition::accept_all(&proposed));
}

#[test]
fn test_default_has_no_exemptions() {
    let directory =
        base_directory().with_entry(host_entry("ips.candhost.example.com", &["bar"]));
    let filter = filter_for(directory);
    let proposed = CandidateSet::default().with_host(host_id("ips.candhost.example.com"));

    let partition = filter.evaluate(&hostgroup_target(), &proposed);

    assert_eq!(partition.rejected_hosts, proposed.hosts());
}

struct ExemptEverything;

impl Exemption for ExemptEverything {
    fn is_exempt(&self, _candidate: &Candidate) -> bool {
        true
    }
}

#[test]
fn test_injected_exemption() {
    let filter = filter_for(base_directory()).with_exemption(Arc::new(ExemptEverything));
    let proposed = CandidateSet::default().with_host_group(hostgroup_id("bar.cand"));

    let partition = filter.evaluate(&hostgroup_target(), &proposed);

    assert_eq!(partition, Partition::accept_all(&proposed));
}

#[derive(Default)]
struct RecordingSink {
    evaluations: AtomicUsize,
    filtered: AtomicUsize,
    phases: AtomicUsize,
    last_namespace: std::sync::Mutex<Option<String>>,
}

impl MetricsSink for RecordingSink {
    fn on_evaluation(&self, stats: &EvaluationStats) {
        self.evaluations.fetch_add(1, Ordering::SeqCst);
        if stats.filtered {
            self.filtered.fetch_add(1, Ordering::SeqCst);
        }
        *self.last_namespace.lock().unwrap() = stats.namespace.clone();
    }

    fn on_evaluation_phases(&self, _stats: &EvaluationStats, phases: &EvaluationPhases) {
        assert!(phases.total_ms >= phases.classify_ms);
        self.phases.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_metrics_sink_receives_every_evaluation() {
    let sink = Arc::new(RecordingSink::default());
    let filter = filter_for(base_directory().with_entry(host_entry("candhost.example.com", &["bar"])))
        .with_metrics_sink(sink.clone());
    let proposed = CandidateSet::default().with_host(host_id("candhost.example.com"));

    filter.evaluate(&hostgroup_target(), &proposed);
    filter.evaluate(&hostgroup_id("hgroup"), &proposed);

    assert_eq!(sink.evaluations.load(Ordering::SeqCst), 2);
    assert_eq!(sink.phases.load(Ordering::SeqCst), 2);
    assert_eq!(sink.filtered.load(Ordering::SeqCst), 1);
    assert_eq!(*sink.last_namespace.lock().unwrap(), None);
}

#[test]
fn test_concurrent_evaluation() {
    use std::thread;

    let filter = filter_for(
        base_directory()
            .with_entry(host_entry("good.example.com", &["foo"]))
            .with_entry(host_entry("bad.example.com", &["bar"])),
    );

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let filter = filter.clone();
            thread::spawn(move || {
                let fqdn = if i % 2 == 0 { "good.example.com" } else { "bad.example.com" };
                let proposed = CandidateSet::default().with_host(host_id(fqdn));
                for _ in 0..50 {
                    let partition = filter.evaluate(&hostgroup_target(), &proposed);
                    assert_eq!(partition.has_accepted(), i % 2 == 0);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_partition_snapshot_for_mixed_denial() {
    let filter = filter_for(
        base_directory()
            .with_entry(host_entry("candhost.example.com", &[]))
            .with_entry(hostgroup_entry("bar.cand", &[])),
    );
    let proposed = CandidateSet::new(
        [host_id("candhost.example.com")],
        [hostgroup_id("bar.cand")],
    );

    let partition = filter.evaluate(&hostgroup_target(), &proposed);

    assert_json_snapshot!(partition, @r#"
    {
      "accepted_hosts": [],
      "accepted_host_groups": [],
      "rejected_hosts": [],
      "rejected_host_groups": [
        "cn=bar.cand,cn=hostgroups,cn=accounts,dc=example,dc=com"
      ]
    }
    "#);
}
