use crate::catalog::DefinitionSource;
use crate::error::{ResolveError, Result};
use crate::logic::dimension_cache::FeatureDimensionCache;
use crate::logic::extract::{is_scalar, CompositeRefs};
use crate::logic::running_instances::RunningInstanceStore;
use crate::model::{
    definition_name, feature_reference, parse_samples_count, DefinitionKind, ExecuteRequest,
    Node, NodeId,
};
use itertools::Itertools;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// How a resolver fetches and checks definitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverOptions {
    pub kind: DefinitionKind,
    /// Owner address every lookup is scoped to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Abort when a name reappears among its own ancestors.
    pub detect_cycles: bool,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            kind: DefinitionKind::Particle,
            address: None,
            detect_cycles: true,
        }
    }
}

/// Work item on the resolution stack.
#[derive(Debug, Clone)]
struct PendingNode {
    parent: Option<NodeId>,
    /// Full path of the parent, empty for the root.
    path: String,
    name: String,
    /// Placeholder for an empty child slot; emitted without a fetch.
    scalar_leaf: bool,
}

/// Mutable state of one resolution pass.
///
/// Ids come from `next_id`, bumped once per pop, so `nodes[id]` is always
/// the node with that id.
struct ResolutionSession {
    next_id: NodeId,
    stack: Vec<PendingNode>,
    nodes: Vec<Node>,
    requested: Vec<String>,
    running_instances: RunningInstanceStore,
    dimensions: FeatureDimensionCache,
}

impl ResolutionSession {
    fn new(root_name: &str) -> Self {
        Self {
            next_id: 0,
            stack: vec![PendingNode {
                parent: None,
                path: String::new(),
                name: root_name.to_string(),
                scalar_leaf: false,
            }],
            nodes: Vec::new(),
            requested: Vec::new(),
            running_instances: RunningInstanceStore::new(),
            dimensions: FeatureDimensionCache::new(),
        }
    }

    fn assign_id(&mut self) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn emit(&mut self, node: Node, requested: String) {
        self.running_instances.seed(node.id);
        self.nodes.push(node);
        self.requested.push(requested);
    }

    /// Fails if `name` was already requested by `parent` or one of its ancestors.
    fn check_cycle(&self, parent: Option<NodeId>, name: &str) -> Result<()> {
        let mut chain = Vec::new();
        let mut cursor = parent;
        let mut found = false;
        while let Some(id) = cursor {
            chain.push(self.requested[id].as_str());
            if self.requested[id] == name {
                found = true;
                break;
            }
            cursor = self.nodes[id].parent;
        }

        if !found {
            return Ok(());
        }

        let chain = chain
            .into_iter()
            .rev()
            .chain(std::iter::once(name))
            .join(" -> ");
        Err(ResolveError::Cycle {
            name: name.to_string(),
            chain,
        })
    }
}

/// Output of a resolution pass: pre-ordered nodes and their running instances.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTree {
    pub root: String,
    pub kind: DefinitionKind,
    pub nodes: Vec<Node>,
    pub running_instances: RunningInstanceStore,
}

impl ResolvedTree {
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter().filter(move |node| node.parent == Some(id))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Builds the execute request for this tree from a user-entered samples count.
    pub fn execute_request(&self, samples_count: &str) -> Result<ExecuteRequest> {
        let samples_count = parse_samples_count(samples_count)
            .ok_or_else(|| ResolveError::InvalidSamplesCount(samples_count.trim().to_string()))?;

        Ok(ExecuteRequest {
            kind: self.kind,
            name: self.root.clone(),
            samples_count,
            running_instances: self.running_instances.to_request_list(),
        })
    }
}

/// Depth-first resolver that rebuilds a definition tree from the catalog.
///
/// Traversal uses an explicit stack: children are pushed last-to-first so
/// they pop, and get ids, left-to-right. Each fetch is awaited before the
/// next pop so ids are deterministic.
pub struct TreeResolver<S: DefinitionSource> {
    source: S,
    options: ResolverOptions,
}

impl<S: DefinitionSource> TreeResolver<S> {
    pub fn new(source: S, options: ResolverOptions) -> Self {
        Self { source, options }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn resolve(&self, root_name: &str) -> Result<ResolvedTree> {
        self.resolve_with_cancel(root_name, &CancellationToken::new())
            .await
    }

    /// Resolves `root_name`, giving up with `Cancelled` once `cancel` fires.
    pub async fn resolve_with_cancel(
        &self,
        root_name: &str,
        cancel: &CancellationToken,
    ) -> Result<ResolvedTree> {
        let root = root_name.trim();
        if root.is_empty() {
            return Err(ResolveError::EmptyRootName);
        }

        let kind = self.options.kind;
        let address = self.options.address.as_deref();
        let cancelled = || {
            warn!("Resolution of {} cancelled", root);
            ResolveError::Cancelled {
                root: root.to_string(),
            }
        };

        let mut session = ResolutionSession::new(root);

        while let Some(pending) = session.stack.pop() {
            if cancel.is_cancelled() {
                return Err(cancelled());
            }

            let id = session.assign_id();

            if pending.scalar_leaf {
                let node = Node {
                    id,
                    parent: pending.parent,
                    name: format!("{}/{}", pending.path, pending.name),
                    scalar: true,
                };
                session.emit(node, pending.name);
                continue;
            }

            if self.options.detect_cycles {
                session.check_cycle(pending.parent, &pending.name)?;
            }

            debug!("Resolving {} {} as node {}", kind, pending.name, id);
            let definition = self
                .source
                .fetch_definition(kind, &pending.name, address)
                .await
                .map_err(|e| ResolveError::fetch(&pending.name, e))?;
            if cancel.is_cancelled() {
                return Err(cancelled());
            }

            let particle_name = definition_name(&definition, &pending.name).to_string();
            let full_path = format!("{}/{}", pending.path, particle_name);

            let refs = CompositeRefs::parse(&definition);
            let expected = if refs.needs_dimensions() {
                let feature_name = feature_reference(&definition);
                let count = session
                    .dimensions
                    .dimensions_of(&self.source, feature_name)
                    .await
                    .map_err(|e| ResolveError::fetch(feature_name.unwrap_or_default(), e))?;
                Some(count)
            } else {
                None
            };
            let children = refs.into_names(expected);
            let scalar = is_scalar(&children);

            for (index, child) in children.into_iter().enumerate().rev() {
                let pending_child = if child.is_empty() {
                    PendingNode {
                        parent: Some(id),
                        path: full_path.clone(),
                        name: format!("{}_{}", particle_name, index),
                        scalar_leaf: true,
                    }
                } else {
                    PendingNode {
                        parent: Some(id),
                        path: full_path.clone(),
                        name: child,
                        scalar_leaf: false,
                    }
                };
                session.stack.push(pending_child);
            }

            let node = Node {
                id,
                parent: pending.parent,
                name: full_path,
                scalar,
            };
            session.emit(node, pending.name);
        }

        info!(
            "Resolved {} {} into {} nodes",
            kind,
            root,
            session.nodes.len()
        );

        Ok(ResolvedTree {
            root: root.to_string(),
            kind,
            nodes: session.nodes,
            running_instances: session.running_instances,
        })
    }
}
