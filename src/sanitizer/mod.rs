use crate::flow::{FlowNode, ImportBatch, RemapTable, SanitizeWarning, Wires};
use crate::host::FlowHost;
use crate::layout;
use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

mod ids;

pub use ids::{IdGenerator, RandomIds, SequentialIds};
use ids::fresh_id;

/// How ids from a message are reconciled with the ids already in the document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemapPolicy {
    /// Keep authored ids; rename only those that collide with the document or with an
    /// earlier node of the same batch.
    #[default]
    Conservative,
    /// Give every node a fresh id and rewrite internal wires through the remap table.
    Aggressive,
}

/// What the sanitizer needs to know about the host, captured up front so that
/// sanitizing stays a pure transform.
#[derive(Debug, Clone, Default)]
pub struct SanitizeContext {
    pub existing_ids: AHashSet<String>,
    pub active_workspace: Option<String>,
}

impl SanitizeContext {
    pub fn capture<H: FlowHost + ?Sized>(host: &H) -> Self {
        Self {
            existing_ids: host.node_ids(),
            active_workspace: host.active_workspace().filter(|ws| !ws.is_empty()),
        }
    }
}

/// Turns raw candidate records into an [`ImportBatch`].
pub struct Sanitizer {
    policy: RemapPolicy,
    ids: Box<dyn IdGenerator>,
    auto_layout: bool,
}

pub struct SanitizerBuilder {
    policy: RemapPolicy,
    ids: Box<dyn IdGenerator>,
    auto_layout: bool,
}

impl SanitizerBuilder {
    pub fn new() -> Self {
        Self {
            policy: RemapPolicy::default(),
            ids: Box::new(RandomIds),
            auto_layout: false,
        }
    }
    pub fn with_policy(mut self, policy: RemapPolicy) -> Self {
        self.policy = policy;
        self
    }
    pub fn with_id_generator(mut self, ids: Box<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }
    /// Place nodes that carry no numeric `x`/`y` on the layout grid.
    pub fn with_auto_layout(mut self, enabled: bool) -> Self {
        self.auto_layout = enabled;
        self
    }
    pub fn build(self) -> Sanitizer {
        Sanitizer {
            policy: self.policy,
            ids: self.ids,
            auto_layout: self.auto_layout,
        }
    }
}

impl Default for SanitizerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        SanitizerBuilder::new().build()
    }
}

/// A candidate that survived the type filter, before ids are final.
struct Draft {
    original_id: Option<String>,
    node: FlowNode,
}

impl Sanitizer {
    pub fn builder() -> SanitizerBuilder {
        SanitizerBuilder::new()
    }

    pub fn policy(&self) -> RemapPolicy {
        self.policy
    }

    /// Runs the sanitation steps in order: type filter, id assignment, remap, wire
    /// normalization, tab exclusion, dangling-wire pruning, workspace assignment and
    /// the diagnostic snapshot.
    ///
    /// Never fails. An empty result is for the caller to judge.
    pub fn sanitize(&mut self, candidates: Vec<Value>, ctx: &SanitizeContext) -> ImportBatch {
        let total = candidates.len();
        let drafts: Vec<Draft> = candidates.into_iter().filter_map(into_draft).collect();
        if drafts.len() < total {
            debug!(dropped = total - drafts.len(), "dropped records without a usable type");
        }

        let (nodes, remap) = self.assign_ids(drafts, ctx);
        let mut nodes = rewrite_wires(nodes, &remap, self.policy);

        let before = nodes.len();
        nodes.retain(|n| !n.is_tab());
        if nodes.len() < before {
            debug!(dropped = before - nodes.len(), "dropped tab nodes");
        }

        prune_dangling(&mut nodes);

        let mut warnings = Vec::new();
        match ctx.active_workspace.as_deref() {
            Some(workspace) => {
                for node in &mut nodes {
                    node.z = Some(workspace.to_string());
                }
            }
            None => warnings.push(SanitizeWarning::WorkspaceUnresolved),
        }

        if self.auto_layout {
            layout::place_unpositioned(&mut nodes);
        }

        ImportBatch::new(nodes, remap, warnings)
    }

    fn assign_ids(
        &mut self,
        drafts: Vec<Draft>,
        ctx: &SanitizeContext,
    ) -> (Vec<FlowNode>, RemapTable) {
        let mut taken = ctx.existing_ids.clone();
        let mut remap = RemapTable::new();
        let mut nodes = Vec::with_capacity(drafts.len());

        for Draft {
            original_id,
            mut node,
        } in drafts
        {
            let keep = match (&original_id, self.policy) {
                (Some(id), RemapPolicy::Conservative) => !taken.contains(id),
                _ => false,
            };
            node.id = match (&original_id, keep) {
                (Some(id), true) => id.clone(),
                _ => fresh_id(self.ids.as_mut(), &taken),
            };
            taken.insert(node.id.clone());

            if let Some(original) = &original_id {
                if !remap.insert(original, &node.id) {
                    debug!(id = %original, renamed = %node.id, "duplicate id in batch");
                }
            }
            nodes.push(node);
        }

        (nodes, remap)
    }
}

fn into_draft(candidate: Value) -> Option<Draft> {
    let Value::Object(mut fields) = candidate else {
        return None;
    };
    let node_type = fields.remove("type").and_then(coerce_type)?;
    let original_id = fields.remove("id").and_then(coerce_id);
    let wires = normalize_wires(fields.remove("wires"));
    let z = fields.remove("z").and_then(coerce_id);

    Some(Draft {
        original_id,
        node: FlowNode {
            id: String::new(),
            node_type,
            wires,
            z,
            extra: fields,
        },
    })
}

fn coerce_type(value: Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn coerce_id(value: Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Coerces `wires` to a list of ports, each a list of string targets.
fn normalize_wires(value: Option<Value>) -> Wires {
    let Some(Value::Array(ports)) = value else {
        return Vec::new();
    };
    ports
        .into_iter()
        .map(|port| match port {
            Value::Array(targets) => targets.into_iter().filter_map(target_id).collect(),
            _ => Vec::new(),
        })
        .collect()
}

fn target_id(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn rewrite_wires(mut nodes: Vec<FlowNode>, remap: &RemapTable, policy: RemapPolicy) -> Vec<FlowNode> {
    for node in &mut nodes {
        for port in &mut node.wires {
            *port = port
                .drain(..)
                .filter_map(|target| match (remap.resolve(&target), policy) {
                    (Some(renamed), _) => Some(renamed.to_string()),
                    (None, RemapPolicy::Conservative) => Some(target),
                    (None, RemapPolicy::Aggressive) => None,
                })
                .collect();
        }
    }
    nodes
}

/// Drops every wire target that is not a node of this batch. Ports keep their position.
fn prune_dangling(nodes: &mut [FlowNode]) {
    let ids: AHashSet<String> = nodes.iter().map(|n| n.id.clone()).collect();
    let mut pruned = 0usize;
    for node in nodes.iter_mut() {
        for port in &mut node.wires {
            let before = port.len();
            port.retain(|target| ids.contains(target));
            pruned += before - port.len();
        }
    }
    if pruned > 0 {
        debug!(pruned, "removed dangling wire targets");
    }
}

