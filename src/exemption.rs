use regex::Regex;

use crate::types::Candidate;

/// Hook consulted before the namespace checks. An exempt candidate is
/// admitted without a name or attribute check.
///
/// The filter ships with [`NoExemptions`]; nothing is exempt unless an
/// embedder installs another implementation or configures
/// `exempt_name_patterns`.
pub trait Exemption: Send + Sync {
    fn is_exempt(&self, candidate: &Candidate) -> bool;
}

/// Exempts nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExemptions;

impl Exemption for NoExemptions {
    fn is_exempt(&self, _candidate: &Candidate) -> bool {
        false
    }
}

/// Exempts candidates whose canonical name matches any configured pattern.
#[derive(Debug, Clone)]
pub struct PatternExemption {
    patterns: Vec<Regex>,
}

impl PatternExemption {
    pub fn new(patterns: Vec<Regex>) -> Self {
        Self { patterns }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Exemption for PatternExemption {
    fn is_exempt(&self, candidate: &Candidate) -> bool {
        let Some(name) = candidate.name() else {
            return false;
        };
        self.patterns.iter().any(|re| re.is_match(name))
    }
}
