use crate::catalog::{CatalogClient, HttpTransport, ReqwestTransport};
use crate::error::{ResolveError, Result};
use crate::logic::resolve::{ResolvedTree, ResolverOptions, TreeResolver};
use crate::model::{ExecuteOutcome, Node, NodeId, RunningInstance};
use log::{debug, info};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Default)]
struct PlannerState {
    current: Option<ResolvedTree>,
    in_flight: Option<CancellationToken>,
}

/// Holds the tree the user is working on, their running-instance edits,
/// and turns both into execute requests.
///
/// Starting a new `load` cancels any pass still in flight; a cancelled
/// pass never replaces the current tree.
pub struct ExecutionPlanner<T: HttpTransport = ReqwestTransport> {
    client: Arc<CatalogClient<T>>,
    resolver: TreeResolver<Arc<CatalogClient<T>>>,
    state: Mutex<PlannerState>,
}

impl<T: HttpTransport> ExecutionPlanner<T> {
    pub fn new(client: Arc<CatalogClient<T>>, options: ResolverOptions) -> Self {
        Self {
            resolver: TreeResolver::new(client.clone(), options),
            client,
            state: Mutex::new(PlannerState::default()),
        }
    }

    pub fn client(&self) -> &CatalogClient<T> {
        &self.client
    }

    /// Resolves `root_name` and makes it the current tree.
    pub async fn load(&self, root_name: &str) -> Result<Vec<Node>> {
        if root_name.trim().is_empty() {
            return Err(ResolveError::EmptyRootName);
        }

        let token = CancellationToken::new();
        {
            let mut state = self.state.lock();
            if let Some(previous) = state.in_flight.replace(token.clone()) {
                debug!("Superseding in-flight resolution");
                previous.cancel();
            }
            state.current = None;
        }

        let result = self.resolver.resolve_with_cancel(root_name, &token).await;

        let mut state = self.state.lock();
        if token.is_cancelled() {
            return Err(ResolveError::Cancelled {
                root: root_name.trim().to_string(),
            });
        }
        state.in_flight = None;

        let tree = result?;
        let nodes = tree.nodes.clone();
        state.current = Some(tree);
        Ok(nodes)
    }

    /// Cancels the pass in flight, if any.
    pub fn cancel(&self) {
        if let Some(token) = self.state.lock().in_flight.take() {
            token.cancel();
        }
    }

    pub fn current(&self) -> Option<ResolvedTree> {
        self.state.lock().current.clone()
    }

    /// Replaces the running instance of one node of the current tree.
    pub fn edit(&self, id: NodeId, instance: RunningInstance) -> Result<()> {
        let mut state = self.state.lock();
        let tree = state.current.as_mut().ok_or(ResolveError::NothingLoaded)?;
        tree.running_instances.set(id, instance)
    }

    pub fn running_instances_json(&self) -> Result<serde_json::Value> {
        let state = self.state.lock();
        let tree = state.current.as_ref().ok_or(ResolveError::NothingLoaded)?;
        Ok(tree.running_instances.to_json())
    }

    /// Sends the current tree and its running instances to `POST /execute`.
    pub async fn execute(&self, samples_count: &str) -> Result<ExecuteOutcome> {
        let request = {
            let state = self.state.lock();
            let tree = state.current.as_ref().ok_or(ResolveError::NothingLoaded)?;
            tree.execute_request(samples_count)?
        };

        let outcome = self.client.execute(&request).await?;
        info!("Execute {} returned HTTP {}", request.name, outcome.status);
        Ok(outcome)
    }
}
