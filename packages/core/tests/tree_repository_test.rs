//! Tree Repository Integration Tests
//!
//! Exercises create/rename/delete/move against a real libsql database and
//! re-derives every path and sibling position from the stored rows after
//! each mutation.

#[cfg(test)]
mod tree_repository_tests {
    use anyhow::Result;
    use deftree_core::db::{DatabaseService, DomainEvent, TursoStore};
    use deftree_core::models::{Tree, ValidationError};
    use deftree_core::services::{flatten, NewNode, TreeRepository, TreeServiceError};
    use std::sync::Arc;
    use tempfile::TempDir;

    async fn create_test_repository() -> Result<(TreeRepository, TempDir)> {
        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("test.db");
        let db = Arc::new(DatabaseService::new(db_path).await?);
        Ok((TreeRepository::new(Arc::new(TursoStore::new(db))), temp_dir))
    }

    async fn add(
        repository: &TreeRepository,
        id: &str,
        parent: Option<&str>,
    ) -> Result<()> {
        let mut new_node = NewNode::new(format!("Node {}", id)).with_id(id);
        new_node.parent_id = parent.map(str::to_string);
        repository.create_node(new_node).await?;
        Ok(())
    }

    /// 1
    /// ├── 2
    /// │   ├── 4
    /// │   └── 5
    /// └── 3
    /// 6
    /// 7
    async fn seed(repository: &TreeRepository) -> Result<()> {
        for (id, parent) in [
            ("1", None),
            ("2", Some("1")),
            ("3", Some("1")),
            ("4", Some("2")),
            ("5", Some("2")),
            ("6", None),
            ("7", None),
        ] {
            add(repository, id, parent).await?;
        }
        Ok(())
    }

    async fn assert_consistent(repository: &TreeRepository) -> Result<Tree> {
        let tree = repository.fetch_tree().await?;
        if let Err(violations) = tree.check_invariants() {
            panic!("tree invariants violated: {:?}", violations);
        }
        Ok(tree)
    }

    fn children(tree: &Tree, parent: Option<&str>) -> Vec<String> {
        tree.children_of(parent).to_vec()
    }

    #[tokio::test]
    async fn test_fetch_tree_orders_children_by_position() -> Result<()> {
        let (repository, _temp_dir) = create_test_repository().await?;
        seed(&repository).await?;

        let tree = assert_consistent(&repository).await?;
        assert_eq!(children(&tree, None), vec!["1", "6", "7"]);
        assert_eq!(children(&tree, Some("2")), vec!["4", "5"]);

        let order: Vec<String> = flatten(&tree).into_iter().map(|e| e.id).collect();
        assert_eq!(order, vec!["1", "2", "4", "5", "3", "6", "7"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_subtree_shifts_higher_sibling() -> Result<()> {
        let (repository, _temp_dir) = create_test_repository().await?;
        seed(&repository).await?;

        // Node 2 has two descendants; sibling 3 sits above it
        let removed = repository.delete("2").await?;
        assert_eq!(removed, vec!["2", "4", "5"]);

        let tree = assert_consistent(&repository).await?;
        assert_eq!(tree.len(), 4);
        for id in ["2", "4", "5"] {
            assert!(!tree.contains(id));
        }
        assert_eq!(tree.get("3").map(|n| n.position), Some(0));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_root_shifts_later_roots() -> Result<()> {
        let (repository, _temp_dir) = create_test_repository().await?;
        seed(&repository).await?;

        repository.delete("1").await?;

        let tree = assert_consistent(&repository).await?;
        assert_eq!(children(&tree, None), vec!["6", "7"]);
        assert_eq!(tree.get("7").map(|n| n.position), Some(1));
        Ok(())
    }

    #[tokio::test]
    async fn test_rename_with_oversized_label_writes_nothing() -> Result<()> {
        let (repository, _temp_dir) = create_test_repository().await?;
        seed(&repository).await?;
        let mut events = repository.subscribe_to_events();

        let label = "x".repeat(250);
        let err = repository.rename("2", &label).await.unwrap_err();
        assert!(matches!(
            err,
            TreeServiceError::Validation(ValidationError::LabelTooLong { length: 250, max: 191 })
        ));

        let tree = repository.fetch_tree().await?;
        assert_eq!(tree.get("2").map(|n| n.label.as_str()), Some("Node 2"));
        assert!(events.try_recv().is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_rename_at_bound_succeeds() -> Result<()> {
        let (repository, _temp_dir) = create_test_repository().await?;
        seed(&repository).await?;

        let label = "é".repeat(191);
        let node = repository.rename("4", &label).await?;
        assert_eq!(node.label, label);
        assert_eq!(node.path, "1/2/4");
        Ok(())
    }

    #[tokio::test]
    async fn test_move_reparents_and_rewrites_descendant_paths() -> Result<()> {
        let (repository, _temp_dir) = create_test_repository().await?;
        seed(&repository).await?;

        let placement = repository.move_node("2", Some("6"), 0).await?;
        assert_eq!(placement.path, "6/2");
        assert_eq!(placement.position, 0);

        let tree = assert_consistent(&repository).await?;
        assert_eq!(tree.get("4").map(|n| n.path.as_str()), Some("6/2/4"));
        assert_eq!(tree.get("5").map(|n| n.path.as_str()), Some("6/2/5"));
        // Descendant positions are untouched
        assert_eq!(tree.get("5").map(|n| n.position), Some(1));
        // Old sibling closed the gap
        assert_eq!(tree.get("3").map(|n| n.position), Some(0));
        Ok(())
    }

    #[tokio::test]
    async fn test_move_to_root_and_within_parent() -> Result<()> {
        let (repository, _temp_dir) = create_test_repository().await?;
        seed(&repository).await?;

        repository.move_node("4", None, 1).await?;
        let tree = assert_consistent(&repository).await?;
        assert_eq!(children(&tree, None), vec!["1", "4", "6", "7"]);
        assert_eq!(tree.get("4").map(|n| n.path.as_str()), Some("4"));

        // Rendered position 3 is the gap after 6; 1 moves there
        repository.move_node("1", None, 3).await?;
        let tree = assert_consistent(&repository).await?;
        assert_eq!(children(&tree, None), vec!["4", "6", "1", "7"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_move_position_is_clamped() -> Result<()> {
        let (repository, _temp_dir) = create_test_repository().await?;
        seed(&repository).await?;

        let placement = repository.move_node("3", Some("2"), 99).await?;
        assert_eq!(placement.position, 2);
        assert_consistent(&repository).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_move_rejects_cycles() -> Result<()> {
        let (repository, _temp_dir) = create_test_repository().await?;
        seed(&repository).await?;

        for parent in ["1", "2", "4"] {
            let err = repository.move_node("1", Some(parent), 0).await.unwrap_err();
            assert!(
                matches!(err, TreeServiceError::Cycle { .. }),
                "moving 1 under {} should be a cycle, got {:?}",
                parent,
                err
            );
        }

        let tree = assert_consistent(&repository).await?;
        assert_eq!(tree.get("1").map(|n| n.path.as_str()), Some("1"));
        Ok(())
    }

    #[tokio::test]
    async fn test_similar_id_prefix_is_not_a_cycle() -> Result<()> {
        let (repository, _temp_dir) = create_test_repository().await?;
        add(&repository, "1", None).await?;
        add(&repository, "10", None).await?;

        let placement = repository.move_node("1", Some("10"), 0).await?;
        assert_eq!(placement.path, "10/1");
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_ids_are_not_found() -> Result<()> {
        let (repository, _temp_dir) = create_test_repository().await?;
        seed(&repository).await?;

        assert!(matches!(
            repository.move_node("99", None, 0).await,
            Err(TreeServiceError::NotFound { .. })
        ));
        assert!(matches!(
            repository.move_node("2", Some("99"), 0).await,
            Err(TreeServiceError::NotFound { .. })
        ));
        assert!(matches!(
            repository.delete("99").await,
            Err(TreeServiceError::NotFound { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_move_event_reports_affected_rows() -> Result<()> {
        let (repository, _temp_dir) = create_test_repository().await?;
        seed(&repository).await?;
        let mut events = repository.subscribe_to_events();

        repository.move_node("2", None, 1).await?;

        match events.try_recv()? {
            DomainEvent::NodeMoved { placement, affected } => {
                assert_eq!(placement.path, "2");
                // 2, its two children, old sibling 3, shifted roots 6 and 7
                assert_eq!(affected, 6);
            }
            other => panic!("Expected NodeMoved, got {:?}", other),
        }
        Ok(())
    }

    /// Opposing moves race; the second to take the write lock sees the first
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_racing_opposite_moves_cannot_loop() -> Result<()> {
        let (repository, _temp_dir) = create_test_repository().await?;
        seed(&repository).await?;

        let first = tokio::spawn({
            let repository = repository.clone();
            async move { repository.move_node("6", Some("7"), 0).await }
        });
        let second = tokio::spawn({
            let repository = repository.clone();
            async move { repository.move_node("7", Some("6"), 0).await }
        });
        let results = [first.await?, second.await?];

        let moved = results.iter().filter(|r| r.is_ok()).count();
        let refused = results
            .iter()
            .filter(|r| matches!(r, Err(TreeServiceError::Cycle { .. })))
            .count();
        assert_eq!((moved, refused), (1, 1));

        let tree = assert_consistent(&repository).await?;
        assert_eq!(flatten(&tree).len(), 7);
        Ok(())
    }
}
