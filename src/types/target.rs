//! Targets receiving new members, and the namespace derived from their name.

use std::fmt::{Display, Formatter, Result as FmtResult};

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::error::FilterError;

use super::identifier::Identifier;

static NAMESPACE_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\w+)\.\w+").expect("namespace pattern must compile"));

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, EnumString, Display,
)]
#[strum(serialize_all = "PascalCase")]
pub enum TargetKind {
    HostGroup,
    AccessRule,
    PrivilegeRule,
}

/// The unit of membership segregation: the text before the first `.` in a
/// canonical name such as `foo.webservers`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct Namespace(String);

impl Namespace {
    /// Derive the namespace from a canonical name. Names without a dotted
    /// prefix carry no namespace.
    pub fn from_canonical_name(name: &str) -> Option<Self> {
        NAMESPACE_PREFIX
            .captures(name)
            .and_then(|caps| caps.get(1))
            .map(|m| Namespace(m.as_str().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when `name` is this namespace or is prefixed by `"{namespace}."`,
    /// ignoring case.
    pub fn owns_name(&self, name: &str) -> bool {
        let namespace = self.0.to_lowercase();
        let name = name.to_lowercase();
        name == namespace
            || name
                .strip_prefix(namespace.as_str())
                .is_some_and(|rest| rest.starts_with('.'))
    }

    /// Classification labels must match exactly, case included.
    pub fn matches_label(&self, label: &str) -> bool {
        self.0 == label
    }
}

impl Display for Namespace {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

/// Decides a target's kind from the container its identifier lives in.
#[derive(Debug, Clone)]
pub struct TargetClassifier {
    privilege_rule: Regex,
    access_rule: Regex,
}

impl TargetClassifier {
    pub fn new(privilege_rule: &str, access_rule: &str) -> Result<Self, FilterError> {
        Ok(Self {
            privilege_rule: RegexBuilder::new(privilege_rule)
                .case_insensitive(true)
                .build()?,
            access_rule: RegexBuilder::new(access_rule)
                .case_insensitive(true)
                .build()?,
        })
    }

    pub fn classify(&self, id: &Identifier) -> TargetKind {
        if self.privilege_rule.is_match(id.as_str()) {
            TargetKind::PrivilegeRule
        } else if self.access_rule.is_match(id.as_str()) {
            TargetKind::AccessRule
        } else {
            TargetKind::HostGroup
        }
    }
}

/// A resolved target: its kind, canonical name (when known) and namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Target {
    id: Identifier,
    kind: TargetKind,
    name: Option<String>,
    namespace: Option<Namespace>,
}

impl Target {
    pub fn new(id: Identifier, kind: TargetKind, name: Option<String>) -> Self {
        let namespace = name.as_deref().and_then(Namespace::from_canonical_name);
        Self {
            id,
            kind,
            name,
            namespace,
        }
    }

    pub fn id(&self) -> &Identifier {
        &self.id
    }

    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn namespace(&self) -> Option<&Namespace> {
        self.namespace.as_ref()
    }
}
