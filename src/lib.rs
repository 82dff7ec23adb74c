// src/lib.rs
pub use config::{FilterConfig, FilterConfigBuilder};
pub use directory::{DirectoryLookup, Entry, InMemoryDirectory};
pub use error::FilterError;
pub use exemption::{Exemption, NoExemptions, PatternExemption};
pub use filter::NamespaceFilter;
pub use loader::load_config;
pub use metrics::{EvaluationPhases, EvaluationStats, MetricsSink};
pub use operations::{AddMembers, MemberAddOutcome, MembershipOperation, MembershipWriter};
pub use types::{
    Candidate, CandidateKind, CandidateSet, Identifier, IdentifyingAttribute, Namespace,
    Partition, RejectionSummary, Target, TargetClassifier, TargetKind,
};

pub mod config;
mod directory;
mod error;
mod exemption;
mod filter;
mod loader;
pub mod metrics;
mod operations;
mod timers;
mod types;
