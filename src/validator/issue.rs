use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Worth telling the user, but the editor would accept the node as is.
    Info,
    /// The node would be imported in a broken or surprising state.
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    MissingRules,
    RuleMissingT,
    RuleTypeLooksLikePayloadType,
    RuleSetMissingTo,
    DebugNotActive,
}

impl IssueKind {
    pub fn code(&self) -> &'static str {
        match self {
            IssueKind::MissingRules => "missing_rules",
            IssueKind::RuleMissingT => "rule_missing_t",
            IssueKind::RuleTypeLooksLikePayloadType => "rule_type_looks_like_payload_type",
            IssueKind::RuleSetMissingTo => "rule_set_missing_to",
            IssueKind::DebugNotActive => "debug_not_active",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            IssueKind::DebugNotActive => Severity::Info,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A structural or semantic problem found on one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub node_id: String,
    pub node_type: String,
    pub kind: IssueKind,
    /// Index into the node's `rules` when the problem is rule-specific.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_index: Option<usize>,
    pub severity: Severity,
}

impl Issue {
    pub fn new(node_id: &str, node_type: &str, kind: IssueKind) -> Self {
        Self {
            node_id: node_id.to_string(),
            node_type: node_type.to_string(),
            kind,
            rule_index: None,
            severity: kind.severity(),
        }
    }

    pub fn at_rule(mut self, index: usize) -> Self {
        self.rule_index = Some(index);
        self
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.node_id, self.node_type, self.kind)?;
        if let Some(index) = self.rule_index {
            write!(f, " at rule {}", index)?;
        }
        Ok(())
    }
}
