use crate::flow::FlowNode;
use itertools::Itertools;
use tracing::debug;

mod checks;
mod issue;

pub use checks::{AutoFix, ChangeCheck, DebugCheck, InjectCheck, NodeCheck, PAYLOAD_TYPE_TOKENS};
pub use issue::{Issue, IssueKind, Severity};

/// Outcome of one validation pass.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub issues: Vec<Issue>,
    pub fixes: Vec<AutoFix>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    /// One-line summary for diagnostic logs.
    pub fn summary(&self) -> String {
        self.issues.iter().map(ToString::to_string).join("; ")
    }
}

/// Flags structurally or semantically suspect nodes.
///
/// The validator reports; it does not decide. Whether a non-empty report blocks an
/// import is up to the import coordinator's abort policy.
pub struct Validator {
    checks: Vec<Box<dyn NodeCheck>>,
}

pub struct ValidatorBuilder {
    checks: Vec<Box<dyn NodeCheck>>,
}

impl ValidatorBuilder {
    pub fn new() -> Self {
        Self {
            checks: checks::default_checks(),
        }
    }
    /// Starts without the built-in inject/change/debug checks.
    pub fn empty() -> Self {
        Self { checks: Vec::new() }
    }
    pub fn with_check(mut self, check: Box<dyn NodeCheck>) -> Self {
        self.checks.push(check);
        self
    }
    pub fn build(self) -> Validator {
        Validator {
            checks: self.checks,
        }
    }
}

impl Default for ValidatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for Validator {
    fn default() -> Self {
        ValidatorBuilder::new().build()
    }
}

impl Validator {
    pub fn builder() -> ValidatorBuilder {
        ValidatorBuilder::new()
    }

    /// Validates every node against each check whose fragment occurs in its type.
    ///
    /// Nodes are only touched by a check's `autofix`; with the built-in checks that is the
    /// inject payload default.
    pub fn validate(&self, nodes: &mut [FlowNode]) -> ValidationReport {
        let mut report = ValidationReport::default();
        for node in nodes.iter_mut() {
            let kind = node.kind();
            for check in self.checks.iter().filter(|c| kind.contains(c.type_fragment())) {
                if let Some(fix) = check.autofix(node) {
                    debug!(node = %fix.node_id, fix = fix.description, "auto-corrected node");
                    report.fixes.push(fix);
                }
                check.check(node, &mut report.issues);
            }
        }
        report
    }
}
