//! Drag Controller Tests
//!
//! Drives the gesture state machine over rows read back from the rendered
//! list, then checks what reached the mutation client and the store.

#[cfg(test)]
mod drag_controller_tests {
    use anyhow::Result;
    use deftree_core::api::fragments::render_list;
    use deftree_core::db::{DatabaseService, TursoStore};
    use deftree_core::drag::{
        parse_list_items, Bounds, DragController, DragState, DropOutcome, HoverZone, MoveIntent,
        MutationClient, RenderedNode, RepositoryClient,
    };
    use deftree_core::services::{NewNode, TreeRepository};
    use std::sync::Arc;
    use tempfile::TempDir;

    const ROW: Bounds = Bounds {
        top: 200.0,
        height: 40.0,
    };
    const MIDDLE: f64 = 220.0;
    const BOTTOM: f64 = 238.0;

    /// Records every intent it receives
    #[derive(Default)]
    struct RecordingClient {
        calls: Vec<MoveIntent>,
    }

    impl MutationClient for RecordingClient {
        fn request_move(&mut self, intent: MoveIntent) {
            self.calls.push(intent);
        }
    }

    async fn create_test_repository() -> Result<(TreeRepository, TempDir)> {
        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("test.db");
        let db = Arc::new(DatabaseService::new(db_path).await?);
        Ok((TreeRepository::new(Arc::new(TursoStore::new(db))), temp_dir))
    }

    async fn add(repository: &TreeRepository, id: &str, parent: Option<&str>) -> Result<()> {
        let mut new_node = NewNode::new(format!("Node {}", id)).with_id(id);
        new_node.parent_id = parent.map(str::to_string);
        repository.create_node(new_node).await?;
        Ok(())
    }

    /// Render the first page and read the rows back the way a browser would
    async fn rendered_rows(repository: &TreeRepository) -> Result<Vec<RenderedNode>> {
        let page = repository.list_page(0, 100).await?;
        Ok(parse_list_items(&render_list(&page))?)
    }

    fn row(rows: &[RenderedNode], id: &str) -> RenderedNode {
        rows.iter()
            .find(|r| r.id == id)
            .cloned()
            .unwrap_or_else(|| panic!("row {} is not rendered", id))
    }

    #[tokio::test]
    async fn test_drop_inside_sibling_root_requests_one_move() -> Result<()> {
        let (repository, _temp_dir) = create_test_repository().await?;
        add(&repository, "1", None).await?;
        add(&repository, "2", Some("1")).await?;
        add(&repository, "3", None).await?;
        let rows = rendered_rows(&repository).await?;

        let mut client = RecordingClient::default();
        let mut controller = DragController::default();

        controller.begin(row(&rows, "2"));
        assert_eq!(controller.hover(row(&rows, "3"), ROW, MIDDLE), HoverZone::Inside);
        let outcome = controller.drop(&rows, &mut client);

        let expected = MoveIntent {
            id: "2".to_string(),
            parent_id: Some("3".to_string()),
            position: 0,
        };
        assert_eq!(outcome, DropOutcome::Requested(expected.clone()));
        assert_eq!(client.calls, vec![expected]);
        assert!(matches!(controller.state(), DragState::Applied { intent: Some(_) }));
        Ok(())
    }

    #[tokio::test]
    async fn test_drop_back_into_own_slot_requests_nothing() -> Result<()> {
        let (repository, _temp_dir) = create_test_repository().await?;
        add(&repository, "1", None).await?;
        add(&repository, "2", None).await?;
        let rows = rendered_rows(&repository).await?;

        let mut client = RecordingClient::default();
        let mut controller = DragController::default();

        // Gap above 2 is just below 1
        controller.begin(row(&rows, "2"));
        assert_eq!(controller.hover(row(&rows, "1"), ROW, BOTTOM), HoverZone::After);
        assert_eq!(controller.drop(&rows, &mut client), DropOutcome::Unchanged);
        controller.end();

        // Top band of 2 itself is its own row, which is never a target
        controller.begin(row(&rows, "2"));
        assert_eq!(controller.hover(row(&rows, "2"), ROW, ROW.top), HoverZone::Invalid);
        assert_eq!(controller.drop(&rows, &mut client), DropOutcome::Cancelled);
        controller.end();

        assert!(client.calls.is_empty());
        assert_eq!(controller.state(), &DragState::Idle);
        Ok(())
    }

    #[tokio::test]
    async fn test_drop_inside_appends_after_rendered_children() -> Result<()> {
        let (repository, _temp_dir) = create_test_repository().await?;
        add(&repository, "1", None).await?;
        add(&repository, "2", Some("1")).await?;
        add(&repository, "3", Some("1")).await?;
        add(&repository, "4", None).await?;
        let rows = rendered_rows(&repository).await?;

        let mut client = RecordingClient::default();
        let mut controller = DragController::default();
        controller.begin(row(&rows, "4"));
        controller.hover(row(&rows, "1"), ROW, MIDDLE);
        controller.drop(&rows, &mut client);

        assert_eq!(client.calls.len(), 1);
        assert_eq!(client.calls[0].parent_id.as_deref(), Some("1"));
        assert_eq!(client.calls[0].position, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_ancestor_cannot_be_dropped_into_descendant() -> Result<()> {
        let (repository, _temp_dir) = create_test_repository().await?;
        add(&repository, "1", None).await?;
        add(&repository, "2", Some("1")).await?;
        add(&repository, "3", Some("2")).await?;
        let rows = rendered_rows(&repository).await?;

        let mut client = RecordingClient::default();
        let mut controller = DragController::default();
        controller.begin(row(&rows, "1"));

        for target in ["2", "3"] {
            for pointer_y in [ROW.top, MIDDLE, BOTTOM] {
                assert_eq!(
                    controller.hover(row(&rows, target), ROW, pointer_y),
                    HoverZone::Invalid
                );
            }
        }
        assert_eq!(controller.drop(&rows, &mut client), DropOutcome::Cancelled);
        assert!(client.calls.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_repository_client_applies_the_move() -> Result<()> {
        let (repository, _temp_dir) = create_test_repository().await?;
        add(&repository, "1", None).await?;
        add(&repository, "2", Some("1")).await?;
        add(&repository, "3", None).await?;
        let rows = rendered_rows(&repository).await?;

        let mut client = RepositoryClient::current(repository.clone());
        let mut controller = DragController::default();
        controller.begin(row(&rows, "3"));
        controller.hover(row(&rows, "2"), ROW, ROW.top);
        controller.drop(&rows, &mut client);

        if let Some(request) = client.take_last_request() {
            request.await?;
        }

        let rows = rendered_rows(&repository).await?;
        let moved = row(&rows, "3");
        assert_eq!(moved.parent_id.as_deref(), Some("1"));
        assert_eq!(moved.position, 0);
        assert_eq!(moved.path, "1/3");
        assert_eq!(row(&rows, "2").position, 1);
        Ok(())
    }
}
