//! Filter configuration: attribute names and container patterns.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::FilterError;
use crate::types::TargetClassifier;

pub const DEFAULT_NAME_ATTRIBUTE: &str = "cn";
pub const DEFAULT_CLASSIFICATION_ATTRIBUTE: &str = "userclass";
pub const DEFAULT_PRIVILEGE_RULE_CONTAINER: &str = r"cn=sudorules,cn=sudo,dc=";
pub const DEFAULT_ACCESS_RULE_CONTAINER: &str = r"cn=hbac,dc=";

/// Settings for a [`NamespaceFilter`](crate::NamespaceFilter).
///
/// Every field has a default, so an empty JSON object is a valid
/// configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Attribute holding a target's canonical name.
    pub name_attribute: String,
    /// Attribute holding a candidate's classification labels.
    pub classification_attribute: String,
    /// Case-insensitive pattern matched against target identifiers to find
    /// privilege (sudo) rules.
    pub privilege_rule_container: String,
    /// Case-insensitive pattern matched against target identifiers to find
    /// access (HBAC) rules.
    pub access_rule_container: String,
    /// Candidate name patterns exempt from namespace checks. Empty unless
    /// explicitly configured.
    pub exempt_name_patterns: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            name_attribute: DEFAULT_NAME_ATTRIBUTE.to_string(),
            classification_attribute: DEFAULT_CLASSIFICATION_ATTRIBUTE.to_string(),
            privilege_rule_container: DEFAULT_PRIVILEGE_RULE_CONTAINER.to_string(),
            access_rule_container: DEFAULT_ACCESS_RULE_CONTAINER.to_string(),
            exempt_name_patterns: Vec::new(),
        }
    }
}

impl FilterConfig {
    pub fn builder() -> FilterConfigBuilder {
        FilterConfigBuilder::new()
    }

    /// Check attribute names are present and every pattern compiles.
    pub fn validate(&self) -> Result<(), FilterError> {
        if self.name_attribute.trim().is_empty() {
            return Err(FilterError::InvalidConfig(
                "name_attribute must not be empty".to_string(),
            ));
        }
        if self.classification_attribute.trim().is_empty() {
            return Err(FilterError::InvalidConfig(
                "classification_attribute must not be empty".to_string(),
            ));
        }
        self.target_classifier()?;
        self.exempt_patterns()?;
        Ok(())
    }

    pub(crate) fn target_classifier(&self) -> Result<TargetClassifier, FilterError> {
        TargetClassifier::new(&self.privilege_rule_container, &self.access_rule_container)
    }

    pub(crate) fn exempt_patterns(&self) -> Result<Vec<Regex>, FilterError> {
        self.exempt_name_patterns
            .iter()
            .map(|p| Regex::new(p).map_err(FilterError::from))
            .collect()
    }
}

/// Builder for [`FilterConfig`], validating on [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct FilterConfigBuilder {
    config: FilterConfig,
}

impl FilterConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name_attribute(mut self, attr: impl Into<String>) -> Self {
        self.config.name_attribute = attr.into();
        self
    }

    pub fn classification_attribute(mut self, attr: impl Into<String>) -> Self {
        self.config.classification_attribute = attr.into();
        self
    }

    pub fn privilege_rule_container(mut self, pattern: impl Into<String>) -> Self {
        self.config.privilege_rule_container = pattern.into();
        self
    }

    pub fn access_rule_container(mut self, pattern: impl Into<String>) -> Self {
        self.config.access_rule_container = pattern.into();
        self
    }

    pub fn exempt_name_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.exempt_name_patterns.push(pattern.into());
        self
    }

    pub fn build(self) -> Result<FilterConfig, FilterError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
