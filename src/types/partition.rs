//! The accepted/rejected split produced by one evaluation.

use std::fmt::{Display, Formatter, Result as FmtResult};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::candidate::CandidateSet;
use super::identifier::Identifier;

/// Outcome of evaluating a candidate set against a target.
///
/// The accepted lists are what the caller writes; the rejected lists are
/// what it reports back to the user.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Partition {
    pub accepted_hosts: Vec<Identifier>,
    pub accepted_host_groups: Vec<Identifier>,
    pub rejected_hosts: Vec<Identifier>,
    pub rejected_host_groups: Vec<Identifier>,
}

impl Partition {
    /// Accept every proposed candidate, reject nothing.
    pub fn accept_all(proposed: &CandidateSet) -> Self {
        Self {
            accepted_hosts: proposed.hosts().to_vec(),
            accepted_host_groups: proposed.host_groups().to_vec(),
            ..Default::default()
        }
    }

    pub fn accepted_count(&self) -> usize {
        self.accepted_hosts.len() + self.accepted_host_groups.len()
    }

    pub fn rejected_count(&self) -> usize {
        self.rejected_hosts.len() + self.rejected_host_groups.len()
    }

    pub fn has_accepted(&self) -> bool {
        self.accepted_count() > 0
    }

    pub fn rejected(&self) -> impl Iterator<Item = &Identifier> {
        self.rejected_hosts
            .iter()
            .chain(self.rejected_host_groups.iter())
    }

    /// Summarise the rejections against the number of proposed candidates.
    pub fn summary(&self, proposed: usize) -> RejectionSummary {
        RejectionSummary {
            proposed,
            rejected: self.rejected().cloned().collect(),
        }
    }
}

/// User-facing report, e.g. `1 of 3 candidates rejected: cn=bar.web,...`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RejectionSummary {
    pub proposed: usize,
    pub rejected: Vec<Identifier>,
}

impl RejectionSummary {
    pub fn is_empty(&self) -> bool {
        self.rejected.is_empty()
    }
}

impl Display for RejectionSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.rejected.is_empty() {
            return write!(f, "0 of {} candidates rejected", self.proposed);
        }
        write!(
            f,
            "{} of {} candidates rejected: {}",
            self.rejected.len(),
            self.proposed,
            self.rejected.iter().join(", ")
        )
    }
}
