use database::{NewWorkspace, SqliteWorkspaceRepository, WorkspaceError, WorkspaceId, WorkspaceRepository};
use workspace_core::AgentKey;

async fn create_test_repository() -> SqliteWorkspaceRepository {
    let repo = SqliteWorkspaceRepository::new(":memory:").await.unwrap();
    repo.migrate().await.unwrap();
    repo
}

#[tokio::test]
async fn test_repository_creation_and_health() {
    let repo = create_test_repository().await;

    assert!(repo.health_check().await.is_ok());
    assert!(repo.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_full_workspace_lifecycle() {
    let repo = create_test_repository().await;

    let workspace = repo
        .create(NewWorkspace::new("  Q3 outbound  "))
        .await
        .unwrap();
    assert_eq!(workspace.name, "Q3 outbound", "Names are stored trimmed");
    assert!(!workspace.onboarding_completed);

    repo.set_selection(&workspace.id, AgentKey::Mike, Some("Gmail"))
        .await
        .unwrap();

    let completed = repo
        .complete_onboarding(&workspace.id, &mocks::create_onboarding_record())
        .await
        .unwrap();
    assert!(completed.onboarding_completed);
    assert_eq!(
        completed.onboarding.as_ref().and_then(|r| r.get("jobTitles")),
        Some("VP Sales, Head of Growth")
    );
    assert_eq!(
        completed.selections.get(&AgentKey::Mike).map(String::as_str),
        Some("Gmail")
    );

    repo.delete(&workspace.id).await.unwrap();
    assert!(repo.get(&workspace.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_selections_cascade_on_delete() {
    let repo = create_test_repository().await;
    let workspace = repo.create(NewWorkspace::new("Cascade")).await.unwrap();
    repo.set_selection(&workspace.id, AgentKey::Leo, Some("Apollo"))
        .await
        .unwrap();

    repo.delete(&workspace.id).await.unwrap();

    let orphans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM workspace_selections")
        .fetch_one(repo.pool())
        .await
        .unwrap();
    assert_eq!(orphans, 0);
}

#[tokio::test]
async fn test_unknown_agent_rows_are_skipped() {
    let repo = create_test_repository().await;
    let workspace = repo.create(NewWorkspace::new("Legacy")).await.unwrap();

    sqlx::query("INSERT INTO workspace_selections (workspace_id, agent, tool) VALUES (?, 'zed', 'Fax')")
        .bind(workspace.id.as_str())
        .execute(repo.pool())
        .await
        .unwrap();

    let loaded = repo.get(&workspace.id).await.unwrap().unwrap();
    assert!(loaded.selections.is_empty());
}

#[tokio::test]
async fn test_validation_errors() {
    let repo = create_test_repository().await;

    let too_long = "x".repeat(121);
    let result = repo.create(NewWorkspace::new(too_long)).await;
    assert!(matches!(result, Err(WorkspaceError::Validation(_))));

    let result = repo.rename(&WorkspaceId::from("missing"), "Name").await;
    assert!(matches!(result, Err(WorkspaceError::NotFound(_))));
}

#[tokio::test]
async fn test_file_database_persists_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("workspaces.db");
    let url = path.to_string_lossy().to_string();

    let id = {
        let repo = SqliteWorkspaceRepository::new(&url).await.unwrap();
        repo.migrate().await.unwrap();
        let workspace = repo.create(NewWorkspace::new("Durable")).await.unwrap();
        repo.pool().close().await;
        workspace.id
    };

    let repo = SqliteWorkspaceRepository::new(&url).await.unwrap();
    repo.migrate().await.unwrap();
    let loaded = repo.get(&id).await.unwrap().unwrap();
    assert_eq!(loaded.name, "Durable");
}
