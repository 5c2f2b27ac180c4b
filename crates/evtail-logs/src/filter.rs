use std::collections::HashSet;

use evtail_types::{LogEntry, Severity};

use crate::RetrievalError;

/// Source and severity filter for log entries
///
/// An absent set matches everything; a present set matches only its
/// members. Source names compare case-insensitively.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterSpec {
    /// Lowercased source names to include (None = all)
    sources: Option<HashSet<String>>,

    /// Severities to include (None = all)
    severities: Option<HashSet<Severity>>,
}

impl FilterSpec {
    /// Filter that matches every entry
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to the given sources
    pub fn with_sources<I, S>(mut self, sources: I) -> Result<Self, RetrievalError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = HashSet::new();
        for source in sources {
            let source = source.as_ref().trim();
            if source.is_empty() {
                return Err(RetrievalError::InvalidArgument(
                    "source names must not be blank".to_string(),
                ));
            }
            set.insert(fold_case(source));
        }
        self.sources = Some(set);
        Ok(self)
    }

    /// Restrict to the given severities
    pub fn with_severities<I>(mut self, severities: I) -> Self
    where
        I: IntoIterator<Item = Severity>,
    {
        self.severities = Some(severities.into_iter().collect());
        self
    }

    /// Check if a log entry passes both filters
    pub fn matches(&self, entry: &LogEntry) -> bool {
        if let Some(severities) = &self.severities {
            if !severities.contains(&entry.severity) {
                return false;
            }
        }

        match &self.sources {
            Some(sources) => sources.contains(&fold_case(&entry.source)),
            None => true,
        }
    }

    /// Check if filter is empty (matches everything)
    pub fn is_empty(&self) -> bool {
        self.sources.is_none() && self.severities.is_none()
    }

    pub fn sources(&self) -> Option<&HashSet<String>> {
        self.sources.as_ref()
    }

    pub fn severities(&self) -> Option<&HashSet<Severity>> {
        self.severities.as_ref()
    }
}

fn fold_case(s: &str) -> String {
    s.to_lowercase()
}
