use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use thiserror::Error;

use crate::container::ContainerError;
use crate::registry::LeafError;

/// Why one item of a tree was skipped.
///
/// None of these abort a load: the offending item is left as it was and
/// the walk continues with its siblings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Issue {
    /// The tree names a field the class does not declare.
    #[error("`{class}` has no property `{field}`")]
    SchemaDrift { class: String, field: String },
    /// The class declares a field the tree does not contain.
    #[error("property `{field}` is missing from the tree")]
    MissingField { field: String },
    #[error("type `{0}` is not registered")]
    Unregistered(String),
    #[error(transparent)]
    Leaf(#[from] LeafError),
    #[error(transparent)]
    Container(#[from] ContainerError),
    #[error("`{class}` has no zero-argument constructor")]
    ConstructorMismatch { class: String },
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("fixed-size container holds {expected} elements, the tree has {found}")]
    LengthMismatch { expected: usize, found: usize },
    #[error("`{value}` is not a variant of `{enum_name}`")]
    UnknownVariant { enum_name: String, value: String },
    #[error("recursion limit of {max} reached")]
    RecursionLimitExceeded { max: usize },
}

impl Issue {
    /// `true` for issues caused by the tree and the class disagreeing on fields.
    #[inline]
    pub fn is_schema_drift(&self) -> bool {
        matches!(self, Self::SchemaDrift { .. } | Self::MissingField { .. })
    }
}

/// One skipped item and where it sits in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    pub path: String,
    pub issue: Issue,
}

impl fmt::Display for ReportEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.issue)
    }
}

/// Everything skipped during one serialization or deserialization.
///
/// Entries are also logged as they are recorded: missing fields at debug
/// level, everything else as warnings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    entries: Vec<ReportEntry>,
}

impl Report {
    #[inline]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub(super) fn record(&mut self, path: impl fmt::Display, issue: Issue) {
        let entry = ReportEntry {
            path: alloc::format!("{path}"),
            issue,
        };
        match entry.issue {
            Issue::MissingField { .. } => log::debug!("{entry}"),
            _ => log::warn!("{entry}"),
        }
        self.entries.push(entry);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when nothing was skipped.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReportEntry> {
        self.entries.iter()
    }

    pub fn has_schema_drift(&self) -> bool {
        self.entries.iter().any(|entry| entry.issue.is_schema_drift())
    }

    /// The entries whose issue matches `predicate`.
    pub fn filter<'a>(
        &'a self,
        mut predicate: impl FnMut(&Issue) -> bool + 'a,
    ) -> impl Iterator<Item = &'a ReportEntry> {
        self.entries.iter().filter(move |entry| predicate(&entry.issue))
    }

    pub fn into_entries(self) -> Vec<ReportEntry> {
        self.entries
    }
}

impl IntoIterator for Report {
    type Item = ReportEntry;
    type IntoIter = alloc::vec::IntoIter<ReportEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
