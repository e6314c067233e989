use super::issue::{Issue, IssueKind};
use crate::flow::FlowNode;
use serde_json::Value;

/// Payload-type tokens that models often put in a change rule's `t` by mistake.
pub const PAYLOAD_TYPE_TOKENS: [&str; 6] = ["str", "num", "bool", "json", "date", "jsonata"];

/// An in-place correction applied by a check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoFix {
    pub node_id: String,
    pub description: &'static str,
}

/// Defines the contract for validating nodes whose lower-cased type contains a fragment.
pub trait NodeCheck: Send + Sync {
    /// Lower-case fragment matched against the node type.
    fn type_fragment(&self) -> &str;

    /// Correction applied before checking. Only checks whose nodes the editor cannot import
    /// otherwise should override this.
    fn autofix(&self, _node: &mut FlowNode) -> Option<AutoFix> {
        None
    }

    fn check(&self, node: &FlowNode, issues: &mut Vec<Issue>);
}

/// Inject nodes need a payload and payload type before the editor will import them.
pub struct InjectCheck;

impl NodeCheck for InjectCheck {
    fn type_fragment(&self) -> &str {
        "inject"
    }

    fn autofix(&self, node: &mut FlowNode) -> Option<AutoFix> {
        match node.get("payload") {
            None | Some(Value::Null) => {
                node.extra
                    .insert("payload".to_string(), Value::String(String::new()));
                node.extra
                    .insert("payloadType".to_string(), Value::String("str".to_string()));
                Some(AutoFix {
                    node_id: node.id.clone(),
                    description: "filled missing inject payload with an empty string",
                })
            }
            Some(_) => None,
        }
    }

    fn check(&self, _node: &FlowNode, _issues: &mut Vec<Issue>) {}
}

/// Change nodes must carry rules, and every rule needs a transform kind.
pub struct ChangeCheck;

impl NodeCheck for ChangeCheck {
    fn type_fragment(&self) -> &str {
        "change"
    }

    fn check(&self, node: &FlowNode, issues: &mut Vec<Issue>) {
        let issue = |kind| Issue::new(&node.id, &node.node_type, kind);

        let rules = match node.get("rules") {
            Some(Value::Array(rules)) if !rules.is_empty() => rules,
            _ => {
                issues.push(issue(IssueKind::MissingRules));
                return;
            }
        };

        for (index, rule) in rules.iter().enumerate() {
            let t = rule
                .get("t")
                .and_then(Value::as_str)
                .filter(|t| !t.is_empty());
            let Some(t) = t else {
                issues.push(issue(IssueKind::RuleMissingT).at_rule(index));
                continue;
            };

            if PAYLOAD_TYPE_TOKENS.contains(&t) {
                issues.push(issue(IssueKind::RuleTypeLooksLikePayloadType).at_rule(index));
            }
            if t == "set" && matches!(rule.get("to"), None | Some(Value::Null)) {
                issues.push(issue(IssueKind::RuleSetMissingTo).at_rule(index));
            }
        }
    }
}

/// Debug nodes that are inactive or not routed to the sidebar show nothing to the user.
pub struct DebugCheck;

impl NodeCheck for DebugCheck {
    fn type_fragment(&self) -> &str {
        "debug"
    }

    fn check(&self, node: &FlowNode, issues: &mut Vec<Issue>) {
        let enabled = |key| node.get(key).and_then(Value::as_bool) == Some(true);
        if !(enabled("active") && enabled("tosidebar")) {
            issues.push(Issue::new(&node.id, &node.node_type, IssueKind::DebugNotActive));
        }
    }
}

pub(super) fn default_checks() -> Vec<Box<dyn NodeCheck>> {
    vec![Box::new(InjectCheck), Box::new(ChangeCheck), Box::new(DebugCheck)]
}
