// ── Destination rule model ──
//
// Rules from the local file and rules issued by the panel share one type.
// Origin is carried as a variant rather than a magic id, so merge logic can
// never mistake a local rule for a panel rule it is allowed to replace.

use std::fmt;

use regex::Regex;

use crate::error::Error;

/// Wire identity of rules loaded from the local file.
pub const LOCAL_RULE_ID: i64 = -1;

/// Where a [`DestinationRule`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleOrigin {
    /// Read from the node's rule file. Fixed for the process lifetime.
    Local,
    /// Issued by the panel under its own id.
    Remote(u32),
}

impl RuleOrigin {
    /// Numeric id as the panel protocol spells it: `-1` for local rules.
    pub fn id(self) -> i64 {
        match self {
            Self::Local => LOCAL_RULE_ID,
            Self::Remote(id) => i64::from(id),
        }
    }

    pub fn is_local(self) -> bool {
        matches!(self, Self::Local)
    }
}

impl fmt::Display for RuleOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Remote(id) => write!(f, "{id}"),
        }
    }
}

/// A compiled destination-matching rule.
#[derive(Debug, Clone)]
pub struct DestinationRule {
    origin: RuleOrigin,
    pattern: Regex,
}

impl DestinationRule {
    /// Wrap an already compiled pattern as a local rule.
    pub fn local(pattern: Regex) -> Self {
        Self {
            origin: RuleOrigin::Local,
            pattern,
        }
    }

    /// Compile a rule issued by the panel.
    pub fn remote(id: u32, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            origin: RuleOrigin::Remote(id),
            pattern: Regex::new(pattern)?,
        })
    }

    pub fn origin(&self) -> RuleOrigin {
        self.origin
    }

    /// Shorthand for `origin().id()`.
    pub fn id(&self) -> i64 {
        self.origin.id()
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    /// Source text the pattern was compiled from.
    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn is_match(&self, destination: &str) -> bool {
        self.pattern.is_match(destination)
    }
}

/// Rules in evaluation order: local rules first, then the panel's.
///
/// The local half is fixed at construction; only the remote half can be
/// swapped out.
#[derive(Debug, Clone, Default)]
pub struct RuleList {
    local: Vec<DestinationRule>,
    remote: Vec<DestinationRule>,
}

impl RuleList {
    pub fn new(local: Vec<DestinationRule>) -> Self {
        Self {
            local,
            remote: Vec::new(),
        }
    }

    pub fn local(&self) -> &[DestinationRule] {
        &self.local
    }

    pub fn remote(&self) -> &[DestinationRule] {
        &self.remote
    }

    /// Replace every remote rule at once. Rejects the whole batch if any
    /// entry claims local origin, leaving the current rules untouched.
    pub fn replace_remote(&mut self, rules: Vec<DestinationRule>) -> Result<(), Error> {
        if let Some(rule) = rules.iter().find(|r| r.origin().is_local()) {
            return Err(Error::RemoteRuleOrigin {
                pattern: rule.as_str().to_owned(),
            });
        }
        self.remote = rules;
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &DestinationRule> {
        self.local.iter().chain(self.remote.iter())
    }

    pub fn len(&self) -> usize {
        self.local.len() + self.remote.len()
    }

    pub fn is_empty(&self) -> bool {
        self.local.is_empty() && self.remote.is_empty()
    }

    /// First rule, in evaluation order, whose pattern matches `destination`.
    pub fn find_match(&self, destination: &str) -> Option<&DestinationRule> {
        self.iter().find(|rule| rule.is_match(destination))
    }
}
