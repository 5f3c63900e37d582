use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Set of subject identifiers (user or group names) granted by a role binding.
///
/// Identifiers are opaque strings compared byte-for-byte: no trimming, no case
/// folding. Storage sees a sorted array; duplicates in stored data collapse on
/// load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectSet(BTreeSet<String>);

impl SubjectSet {
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, subject: &str) -> bool {
        self.0.contains(subject)
    }

    pub fn insert(&mut self, subject: impl Into<String>) -> bool {
        self.0.insert(subject.into())
    }

    /// True if any of `subjects` is a member.
    pub fn has_any(&self, subjects: &SubjectSet) -> bool {
        // Walk the smaller side.
        if self.len() <= subjects.len() {
            self.0.iter().any(|s| subjects.contains(s))
        } else {
            subjects.0.iter().any(|s| self.contains(s))
        }
    }

    pub fn intersection(&self, other: &SubjectSet) -> SubjectSet {
        Self(self.0.intersection(&other.0).cloned().collect())
    }

    pub fn difference(&self, other: &SubjectSet) -> SubjectSet {
        Self(self.0.difference(&other.0).cloned().collect())
    }

    pub fn union(&self, other: &SubjectSet) -> SubjectSet {
        Self(self.0.union(&other.0).cloned().collect())
    }

    /// Iterate members in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for SubjectSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>> Extend<S> for SubjectSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().map(Into::into));
    }
}

impl core::fmt::Display for SubjectSet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut first = true;
        for subject in &self.0 {
            if !first {
                f.write_str(",")?;
            }
            f.write_str(subject)?;
            first = false;
        }
        Ok(())
    }
}
