//! Diagnostics collected while checking a protection topology.
//!
//! Topology checks do not stop at the first problem: every inconsistency is
//! recorded with a severity and the entity it refers to, so a caller can
//! print the whole list and decide whether to proceed. Errors make a
//! topology unusable; warnings describe something the simulator tolerates
//! (for example a bus claimed by two zones, where the first zone wins).
//!
//! # Example
//!
//! ```
//! use gat_core::diagnostics::{Category, Diagnostics};
//!
//! let mut diag = Diagnostics::new();
//! diag.warning(Category::Membership, "bus claimed by several zones", Some("Bus 5"));
//! diag.error(Category::Identity, "duplicate device id", Some("67-B4"));
//!
//! assert_eq!(diag.warning_count(), 1);
//! assert_eq!(diag.error_count(), 1);
//! ```

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Tolerated, the simulator picks a deterministic interpretation
    Warning,
    /// The topology cannot be simulated as described
    Error,
}

/// What part of the topology an issue concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Duplicate zone or device ids
    Identity,
    /// Zone/bus/device ownership
    Membership,
    /// Pickup and delay values
    Settings,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Identity => "identity",
            Category::Membership => "membership",
            Category::Settings => "settings",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticIssue {
    pub severity: Severity,
    pub category: Category,
    pub message: String,
    /// Zone, bus or device the issue points at, e.g. "Bus 5" or "87T-TR1"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
}

impl fmt::Display for DiagnosticIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "[{severity}:{}] {}", self.category.as_str(), self.message)?;
        match &self.entity {
            Some(entity) => write!(f, " ({entity})"),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<DiagnosticIssue>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, severity: Severity, category: Category, message: impl Into<String>, entity: Option<&str>) {
        self.issues.push(DiagnosticIssue {
            severity,
            category,
            message: message.into(),
            entity: entity.map(str::to_string),
        });
    }

    pub fn warning(&mut self, category: Category, message: impl Into<String>, entity: Option<&str>) {
        self.record(Severity::Warning, category, message, entity);
    }

    pub fn error(&mut self, category: Category, message: impl Into<String>, entity: Option<&str>) {
        self.record(Severity::Error, category, message, entity);
    }

    pub fn errors(&self) -> impl Iterator<Item = &DiagnosticIssue> {
        self.with_severity(Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &DiagnosticIssue> {
        self.with_severity(Severity::Warning)
    }

    fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &DiagnosticIssue> {
        self.issues.iter().filter(move |issue| issue.severity == severity)
    }

    pub fn in_category(&self, category: Category) -> impl Iterator<Item = &DiagnosticIssue> {
        self.issues.iter().filter(move |issue| issue.category == category)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// One-line summary, e.g. "1 warning, 2 errors".
    pub fn summary(&self) -> String {
        let count = |n: usize, word: &str| format!("{n} {word}{}", if n == 1 { "" } else { "s" });
        match (self.warning_count(), self.error_count()) {
            (0, 0) => "No issues".to_string(),
            (w, 0) => count(w, "warning"),
            (0, e) => count(e, "error"),
            (w, e) => format!("{}, {}", count(w, "warning"), count(e, "error")),
        }
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Diagnostics: {}", self.summary())?;
        for issue in &self.issues {
            writeln!(f, "  {issue}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_summary() {
        let mut diag = Diagnostics::new();
        assert!(diag.is_clean());
        assert_eq!(diag.summary(), "No issues");

        diag.warning(Category::Membership, "zone covers no buses", Some("Zone Z3"));
        assert_eq!(diag.summary(), "1 warning");
        assert!(!diag.has_errors());

        diag.error(Category::Identity, "duplicate device id", Some("67-B4"));
        diag.error(Category::Settings, "time delay must be positive", None);
        assert_eq!(diag.summary(), "1 warning, 2 errors");
        assert!(diag.has_errors());
        assert_eq!(diag.in_category(Category::Settings).count(), 1);
    }

    #[test]
    fn test_issue_display() {
        let mut diag = Diagnostics::new();
        diag.warning(Category::Membership, "bus overlap", Some("Bus 5"));
        assert_eq!(diag.issues[0].to_string(), "[warning:membership] bus overlap (Bus 5)");
    }

    #[test]
    fn test_serialization() {
        let mut diag = Diagnostics::new();
        diag.error(Category::Settings, "pickup current must be positive", Some("67-B5"));

        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(json["issues"][0]["severity"], "error");
        assert_eq!(json["issues"][0]["category"], "settings");
        assert_eq!(json["issues"][0]["entity"], "67-B5");
    }
}
