//! Mutation client backed by a `TreeRepository`
//!
//! Each request is spawned onto the tokio runtime and forgotten; failures are
//! logged, and the next render shows whatever the store holds.

use crate::drag::controller::{MoveIntent, MutationClient};
use crate::services::TreeRepository;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Sends move intents to a repository on a runtime handle
pub struct RepositoryClient {
    repository: TreeRepository,
    runtime: Handle,
    last_request: Option<JoinHandle<()>>,
}

impl RepositoryClient {
    pub fn new(repository: TreeRepository, runtime: Handle) -> Self {
        Self {
            repository,
            runtime,
            last_request: None,
        }
    }

    /// Client on the runtime of the calling task
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn current(repository: TreeRepository) -> Self {
        Self::new(repository, Handle::current())
    }

    /// Handle of the most recent request, for callers that do want to wait
    pub fn take_last_request(&mut self) -> Option<JoinHandle<()>> {
        self.last_request.take()
    }
}

impl MutationClient for RepositoryClient {
    fn request_move(&mut self, intent: MoveIntent) {
        let repository = self.repository.clone();
        let position = usize::try_from(intent.position).unwrap_or(usize::MAX);

        let handle = self.runtime.spawn(async move {
            match repository
                .move_node(&intent.id, intent.parent_id.as_deref(), position)
                .await
            {
                Ok(placement) => tracing::debug!(
                    "Drag move of {} settled at {} (position {})",
                    placement.id,
                    placement.path,
                    placement.position
                ),
                Err(e) => tracing::warn!("Drag move of {} failed: {}", intent.id, e),
            }
        });
        self.last_request = Some(handle);
    }
}
