//! Membership-add operations guarded by the namespace filter.
//!
//! Each operation is handed its [`NamespaceFilter`] and a
//! [`MembershipWriter`] at construction. `execute` evaluates the proposed
//! members, writes only the accepted ones and reports the rest.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, EnumIter, EnumString};
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::error::FilterError;
use crate::filter::NamespaceFilter;
use crate::types::{CandidateSet, Identifier, Partition, RejectionSummary, TargetKind};

/// The three operations that add hosts or host-groups to a target.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    EnumString,
    AsRefStr,
    EnumIter,
    strum_macros::Display,
)]
pub enum MembershipOperation {
    #[strum(serialize = "hostgroup-add-member")]
    HostGroupAddMember,
    #[strum(serialize = "hbacrule-add-host")]
    AccessRuleAddHost,
    #[strum(serialize = "sudorule-add-host")]
    PrivilegeRuleAddHost,
}

impl MembershipOperation {
    /// The kind of target this operation writes to.
    pub fn target_kind(&self) -> TargetKind {
        match self {
            MembershipOperation::HostGroupAddMember => TargetKind::HostGroup,
            MembershipOperation::AccessRuleAddHost => TargetKind::AccessRule,
            MembershipOperation::PrivilegeRuleAddHost => TargetKind::PrivilegeRule,
        }
    }
}

/// Performs the actual membership write once the filter has spoken.
pub trait MembershipWriter: Send + Sync {
    /// Add the given members and return how many were added.
    fn add_members(
        &self,
        target: &Identifier,
        hosts: &[Identifier],
        host_groups: &[Identifier],
    ) -> Result<usize, FilterError>;
}

/// What an add operation did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MemberAddOutcome {
    pub operation: MembershipOperation,
    pub target: Identifier,
    pub proposed: usize,
    pub added: usize,
    pub partition: Partition,
}

impl MemberAddOutcome {
    pub fn summary(&self) -> RejectionSummary {
        self.partition.summary(self.proposed)
    }
}

impl Display for MemberAddOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "Number of members added {}", self.added)?;
        let summary = self.summary();
        if !summary.is_empty() {
            write!(f, "\n{summary}")?;
        }
        Ok(())
    }
}

/// An add-members operation with the filter as a pre-condition.
pub struct AddMembers<W: MembershipWriter> {
    operation: MembershipOperation,
    filter: NamespaceFilter,
    writer: W,
}

impl<W: MembershipWriter> AddMembers<W> {
    pub fn new(operation: MembershipOperation, filter: NamespaceFilter, writer: W) -> Self {
        Self {
            operation,
            filter,
            writer,
        }
    }

    pub fn operation(&self) -> MembershipOperation {
        self.operation
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Filter `proposed` for `target` and write whatever survives.
    ///
    /// Only writer failures surface as errors; the filter itself cannot fail.
    pub fn execute(
        &self,
        target: &Identifier,
        proposed: &CandidateSet,
    ) -> Result<MemberAddOutcome, FilterError> {
        let partition = self.filter.evaluate(target, proposed);

        let added = if partition.has_accepted() {
            self.writer.add_members(
                target,
                &partition.accepted_hosts,
                &partition.accepted_host_groups,
            )?
        } else {
            debug!(
                event = "Operation",
                operation = %self.operation,
                target = %target,
                "nothing to write"
            );
            0
        };

        let outcome = MemberAddOutcome {
            operation: self.operation,
            target: target.clone(),
            proposed: proposed.len(),
            added,
            partition,
        };

        info!(
            event = "Operation",
            operation = %self.operation,
            target = %target,
            proposed = outcome.proposed,
            added,
            rejected = outcome.partition.rejected_count()
        );

        Ok(outcome)
    }
}
