//! Data model for admission requests.
//!
//! Every value here is built fresh for one evaluation and dropped after it;
//! nothing is cached across requests.

mod candidate;
mod identifier;
mod partition;
mod target;

pub use candidate::{Candidate, CandidateKind, CandidateSet};
pub use identifier::{Identifier, IdentifyingAttribute};
pub use partition::{Partition, RejectionSummary};
pub use target::{Namespace, Target, TargetClassifier, TargetKind};
