//! Directory identifiers and the attribute kinds that locate them.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use crate::error::FilterError;

/// Leading component shared by host, host-group and rule identifiers.
static LEADING_COMPONENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(cn|fqdn|ipaUniqueID)=([^,]+),.+")
        .expect("leading component pattern must compile")
});

/// The attribute used to resolve an identifier to exactly one entry.
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
    Display,
)]
#[strum(ascii_case_insensitive)]
pub enum IdentifyingAttribute {
    /// Common name, used by host-groups.
    #[strum(serialize = "cn")]
    #[serde(rename = "cn")]
    CommonName,
    /// Fully qualified host name, used by hosts.
    #[strum(serialize = "fqdn")]
    #[serde(rename = "fqdn")]
    HostName,
    /// Opaque unique id, used by access and privilege rules.
    #[strum(serialize = "ipaUniqueID")]
    #[serde(rename = "ipaUniqueID")]
    UniqueId,
}

/// A hierarchical, path-like identifier naming one directory entry,
/// e.g. `fqdn=web01.example.com,cn=computers,cn=accounts,dc=example,dc=com`.
///
/// Identifiers are opaque: they compare by string value only.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    pub fn new(value: impl Into<String>) -> Self {
        Identifier(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split the leading component into its identifying attribute and value.
    ///
    /// Returns `None` when the identifier does not have the
    /// `attribute=value,parent` shape or the attribute is not one we can
    /// look entries up by.
    pub fn components(&self) -> Option<(IdentifyingAttribute, &str)> {
        let caps = LEADING_COMPONENT.captures(&self.0)?;
        let attribute = caps.get(1)?.as_str().parse().ok()?;
        Some((attribute, caps.get(2)?.as_str()))
    }

    pub fn identifying_attribute(&self) -> Option<IdentifyingAttribute> {
        self.components().map(|(attribute, _)| attribute)
    }

    /// The value of the leading component, e.g. the host name or group name.
    pub fn name(&self) -> Option<&str> {
        self.components().map(|(_, name)| name)
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Identifier {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(FilterError::InvalidIdentifier(
                "identifier must not be empty".to_string(),
            ));
        }
        Ok(Identifier::new(s))
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Identifier::new(value)
    }
}

impl From<String> for Identifier {
    fn from(value: String) -> Self {
        Identifier(value)
    }
}
