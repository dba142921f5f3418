//! HTTP Adapter Tests
//!
//! Sends requests straight into the router with `tower::ServiceExt::oneshot`.

#[cfg(test)]
mod api_tests {
    use anyhow::Result;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use deftree_core::api::{create_router, AppState, HttpError, ROLE_HEADER};
    use deftree_core::db::{DatabaseService, TursoStore};
    use deftree_core::drag::parse_list_items;
    use deftree_core::models::FlatEntry;
    use deftree_core::services::{NewNode, Page, TreeRepository};
    use deftree_core::TreeConfig;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::ServiceExt;

    async fn create_test_app() -> Result<(Router, TreeRepository, TempDir)> {
        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("test.db");
        let db = Arc::new(DatabaseService::new(db_path).await?);
        let repository = TreeRepository::new(Arc::new(TursoStore::new(db)));

        for (id, parent) in [("1", None), ("2", Some("1")), ("3", Some("1")), ("4", None)] {
            let mut new_node = NewNode::new(format!("Node {}", id)).with_id(id);
            new_node.parent_id = parent.map(str::to_string);
            repository.create_node(new_node).await?;
        }

        let state = AppState::new(repository.clone(), TreeConfig::default());
        Ok((create_router(state), repository, temp_dir))
    }

    fn json_request(method: Method, uri: &str, role: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(role) = role {
            builder = builder.header(ROLE_HEADER, role);
        }
        builder
            .body(Body::from(body.to_string()))
            .expect("valid request")
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("valid request")
    }

    async fn body_text(response: axum::response::Response) -> Result<String> {
        let bytes = response.into_body().collect().await?.to_bytes();
        Ok(String::from_utf8(bytes.to_vec())?)
    }

    #[tokio::test]
    async fn test_health() -> Result<()> {
        let (app, _repository, _temp_dir) = create_test_app().await?;

        let response = app.oneshot(get("/api/health")).await?;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_text(response).await?)?;
        assert_eq!(body["status"], "ok");
        Ok(())
    }

    #[tokio::test]
    async fn test_tree_page_json() -> Result<()> {
        let (app, _repository, _temp_dir) = create_test_app().await?;

        let response = app.oneshot(get("/api/tree?offset=1&limit=2")).await?;
        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = serde_json::from_str(&body_text(response).await?)?;
        assert_eq!(body["totalCount"], 4);
        assert_eq!(body["nextOffset"], 3);
        assert_eq!(body["hasMore"], true);
        assert_eq!(body["items"][0]["id"], "2");
        assert_eq!(body["items"][0]["depth"], 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_fragment_carries_node_attributes() -> Result<()> {
        let (app, _repository, _temp_dir) = create_test_app().await?;

        let response = app.oneshot(get("/api/tree/fragment?offset=-5")).await?;
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await?;
        let rows = parse_list_items(&html)?;
        let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4"]);
        assert_eq!(rows[2].parent_id.as_deref(), Some("1"));
        assert_eq!(rows[2].position, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_mutations_require_allowed_role() -> Result<()> {
        let (app, repository, _temp_dir) = create_test_app().await?;
        let before = repository.list_page(0, 100).await?;

        let requests = [
            json_request(Method::PATCH, "/api/nodes/2", None, json!({ "title": "Renamed" })),
            json_request(Method::DELETE, "/api/nodes/1", Some("viewer"), json!({})),
            json_request(
                Method::POST,
                "/api/nodes/2/move",
                Some("guest"),
                json!({ "parentId": "4", "position": 0 }),
            ),
            json_request(Method::POST, "/api/nodes", None, json!({ "label": "New" })),
        ];

        for request in requests {
            let response = app.clone().oneshot(request).await?;
            assert_eq!(response.status(), StatusCode::FORBIDDEN);
            let html = body_text(response).await?;
            assert!(html.contains("deftree-notice"));
        }

        let after = repository.list_page(0, 100).await?;
        assert_eq!(before, after);
        Ok(())
    }

    #[tokio::test]
    async fn test_rename_and_validation() -> Result<()> {
        let (app, _repository, _temp_dir) = create_test_app().await?;

        let response = app
            .clone()
            .oneshot(json_request(
                Method::PATCH,
                "/api/nodes/2",
                Some("editor"),
                json!({ "title": "  Buttons " }),
            ))
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_text(response).await?)?;
        assert_eq!(body["label"], "Buttons");
        assert_eq!(body["path"], "1/2");

        let response = app
            .oneshot(json_request(
                Method::PATCH,
                "/api/nodes/2",
                Some("editor"),
                json!({ "title": "x".repeat(250) }),
            ))
            .await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: HttpError = serde_json::from_str(&body_text(response).await?)?;
        assert_eq!(error.code, "VALIDATION_ERROR");
        Ok(())
    }

    #[tokio::test]
    async fn test_move_cycle_and_not_found() -> Result<()> {
        let (app, _repository, _temp_dir) = create_test_app().await?;

        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/nodes/1/move",
                Some("admin"),
                json!({ "parentId": "2", "position": 0 }),
            ))
            .await?;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = app
            .oneshot(json_request(
                Method::DELETE,
                "/api/nodes/missing",
                Some("admin"),
                json!({}),
            ))
            .await?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_move_and_delete() -> Result<()> {
        let (app, repository, _temp_dir) = create_test_app().await?;

        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/nodes",
                Some("editor"),
                json!({ "id": "5", "parentId": "4", "label": "Card" }),
            ))
            .await?;
        assert_eq!(response.status(), StatusCode::CREATED);

        // Empty parentId moves to root
        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/nodes/5/move",
                Some("editor"),
                json!({ "parentId": "", "position": 0 }),
            ))
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        let placement: Value = serde_json::from_str(&body_text(response).await?)?;
        assert_eq!(placement["path"], "5");
        assert_eq!(placement["parentId"], Value::Null);

        let response = app
            .oneshot(json_request(Method::DELETE, "/api/nodes/1", Some("admin"), json!({})))
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_text(response).await?)?;
        assert_eq!(body["removed"], json!(["1", "2", "3"]));

        let page: Page<FlatEntry> = repository.list_page(0, 10).await?;
        let ids: Vec<&str> = page.items.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["5", "4"]);
        Ok(())
    }
}
