//! Proposed members and the sets they arrive in.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use super::identifier::Identifier;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, EnumString, Display,
)]
#[strum(serialize_all = "PascalCase")]
pub enum CandidateKind {
    Host,
    HostGroup,
}

/// A host or host-group proposed for membership in a target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct Candidate {
    kind: CandidateKind,
    id: Identifier,
}

impl Candidate {
    pub fn new(kind: CandidateKind, id: impl Into<Identifier>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    pub fn host(id: impl Into<Identifier>) -> Self {
        Self::new(CandidateKind::Host, id)
    }

    pub fn host_group(id: impl Into<Identifier>) -> Self {
        Self::new(CandidateKind::HostGroup, id)
    }

    pub fn kind(&self) -> CandidateKind {
        self.kind
    }

    pub fn id(&self) -> &Identifier {
        &self.id
    }

    /// Canonical name embedded in the identifier (host name or group name).
    pub fn name(&self) -> Option<&str> {
        self.id.name()
    }

    pub fn is_host_group(&self) -> bool {
        self.kind == CandidateKind::HostGroup
    }
}

/// The hosts and host-groups a caller proposes to add in one request.
///
/// Order is preserved; evaluation visits hosts first, then host-groups.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CandidateSet {
    #[serde(default)]
    hosts: Vec<Identifier>,
    #[serde(default)]
    host_groups: Vec<Identifier>,
}

impl CandidateSet {
    pub fn new<H, G>(hosts: H, host_groups: G) -> Self
    where
        H: IntoIterator,
        H::Item: Into<Identifier>,
        G: IntoIterator,
        G::Item: Into<Identifier>,
    {
        Self {
            hosts: hosts.into_iter().map(Into::into).collect(),
            host_groups: host_groups.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_host(mut self, id: impl Into<Identifier>) -> Self {
        self.hosts.push(id.into());
        self
    }

    pub fn with_host_group(mut self, id: impl Into<Identifier>) -> Self {
        self.host_groups.push(id.into());
        self
    }

    pub fn hosts(&self) -> &[Identifier] {
        &self.hosts
    }

    pub fn host_groups(&self) -> &[Identifier] {
        &self.host_groups
    }

    pub fn len(&self) -> usize {
        self.hosts.len() + self.host_groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty() && self.host_groups.is_empty()
    }

    /// Every candidate in evaluation order.
    pub fn candidates(&self) -> impl Iterator<Item = Candidate> + '_ {
        self.hosts
            .iter()
            .map(|id| Candidate::host(id.clone()))
            .chain(self.host_groups.iter().map(|id| Candidate::host_group(id.clone())))
    }
}
