//! Non-fatal findings collected during a conversion run.
//!
//! Every diagnostic is also logged through `tracing` as it is recorded.

use std::fmt;

use tracing::{debug, warn};

/// How loudly a finding is logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Expected outcome worth tracing, such as a rename.
    Debug,
    /// Information was lost or guessed.
    Warning,
}

/// What a diagnostic is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A property type could not be resolved; the property was dropped.
    UnresolvedType,
    /// An initializer was not a constant expression; a null default was used.
    UnresolvedInitializer,
    /// A union-membership lookup matched more than one union.
    AmbiguousUnion,
    /// A node was renamed to avoid a display-name collision.
    Renamed,
    /// A union was collapsed into a primitive.
    LossyUnion,
    /// An enum member value was non-integral or outside the `int` range.
    NonIntegralEnum,
}

impl DiagnosticKind {
    /// Severity this kind is logged at.
    pub const fn severity(self) -> Severity {
        match self {
            Self::Renamed | Self::LossyUnion => Severity::Debug,
            Self::UnresolvedType
            | Self::UnresolvedInitializer
            | Self::AmbiguousUnion
            | Self::NonIntegralEnum => Severity::Warning,
        }
    }

    /// Stable kebab-case label.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnresolvedType => "unresolved-type",
            Self::UnresolvedInitializer => "unresolved-initializer",
            Self::AmbiguousUnion => "ambiguous-union",
            Self::Renamed => "renamed",
            Self::LossyUnion => "lossy-union",
            Self::NonIntegralEnum => "non-integral-enum",
        }
    }
}

/// One non-fatal finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Category.
    pub kind: DiagnosticKind,
    /// Declaration or member the finding is about.
    pub subject: String,
    /// Human-readable detail.
    pub message: String,
}

impl Diagnostic {
    /// Severity of the kind.
    pub const fn severity(&self) -> Severity {
        self.kind.severity()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind.as_str(), self.subject, self.message)
    }
}

/// Ordered collection of diagnostics for one run.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record and log a diagnostic.
    pub fn report(
        &mut self,
        kind: DiagnosticKind,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) {
        let diagnostic = Diagnostic {
            kind,
            subject: subject.into(),
            message: message.into(),
        };
        match diagnostic.severity() {
            Severity::Debug => debug!(
                kind = kind.as_str(),
                subject = %diagnostic.subject,
                "{}",
                diagnostic.message
            ),
            Severity::Warning => warn!(
                kind = kind.as_str(),
                subject = %diagnostic.subject,
                "{}",
                diagnostic.message
            ),
        }
        self.items.push(diagnostic);
    }

    /// Findings in report order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    /// Number of findings.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing was reported.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Findings at [`Severity::Warning`].
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items
            .iter()
            .filter(|d| d.severity() == Severity::Warning)
    }

    /// Findings of one kind.
    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(move |d| d.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_and_filter() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.report(DiagnosticKind::Renamed, "User", "renamed to User1");
        diagnostics.report(DiagnosticKind::UnresolvedType, "User.owner", "unknown type Owner");

        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics.warnings().count(), 1);
        assert_eq!(diagnostics.of_kind(DiagnosticKind::Renamed).count(), 1);
        assert_eq!(
            diagnostics.iter().next().map(ToString::to_string).as_deref(),
            Some("[renamed] User: renamed to User1")
        );
    }
}
