//! Contract test helpers for validating trait implementations
//!
//! Provides standardized tests that any WorkspaceRepository implementation
//! should pass, ensuring the SQLite repository and the mock behave alike.

use crate::{create_onboarding_record, WorkspaceBuilder};
use workspace_core::wizard::OnboardingRecord;
use workspace_core::{AgentKey, NewWorkspace, WorkspaceError, WorkspaceId, WorkspaceRepository};

/// Test any WorkspaceRepository implementation with comprehensive contract tests
///
/// Expects an empty repository.
pub async fn test_repository_contract<R: WorkspaceRepository>(repo: &R) {
    test_create_contract(repo).await;
    test_rename_contract(repo).await;
    test_selection_contract(repo).await;
    test_onboarding_contract(repo).await;
    test_list_contract(repo).await;
    test_delete_contract(repo).await;
    test_health_check_contract(repo).await;
}

/// Test workspace creation contract
pub async fn test_create_contract<R: WorkspaceRepository>(repo: &R) {
    let new_workspace = NewWorkspace::new("Contract create");
    let workspace = repo
        .create(new_workspace.clone())
        .await
        .expect("Create should succeed");

    assert_eq!(workspace.id, new_workspace.id, "Created workspace should keep its id");
    assert_eq!(workspace.name, "Contract create");
    assert!(
        !workspace.onboarding_completed,
        "New workspace should start in onboarding"
    );
    assert!(workspace.onboarding.is_none());
    assert!(workspace.selections.is_empty());

    // Duplicate id rejected
    let duplicate = repo.create(new_workspace).await;
    assert!(
        matches!(duplicate, Err(WorkspaceError::Validation(_))),
        "Expected Validation error for duplicate id, got: {duplicate:?}"
    );

    // Blank name rejected
    let blank = repo.create(NewWorkspace::new("   ")).await;
    assert!(
        blank.as_ref().is_err_and(|e| e.is_validation()),
        "Expected validation error for blank name, got: {blank:?}"
    );

    let fetched = repo
        .get(&workspace.id)
        .await
        .expect("Get should succeed")
        .expect("Created workspace should be found");
    assert_eq!(fetched.name, workspace.name);

    let missing = repo
        .get(&WorkspaceId::from("does-not-exist"))
        .await
        .expect("Get should succeed");
    assert!(missing.is_none());
}

/// Test rename contract
pub async fn test_rename_contract<R: WorkspaceRepository>(repo: &R) {
    let workspace = repo
        .create(NewWorkspace::new("Before rename"))
        .await
        .expect("Create should succeed");

    let renamed = repo
        .rename(&workspace.id, "After rename")
        .await
        .expect("Rename should succeed");
    assert_eq!(renamed.name, "After rename");
    assert_eq!(renamed.id, workspace.id);

    let result = repo.rename(&WorkspaceId::from("does-not-exist"), "x").await;
    assert!(
        result.as_ref().is_err_and(|e| e.is_not_found()),
        "Expected NotFound error, got: {result:?}"
    );

    let result = repo.rename(&workspace.id, "").await;
    assert!(result.as_ref().is_err_and(|e| e.is_validation()));
}

/// Test selection mirroring contract
pub async fn test_selection_contract<R: WorkspaceRepository>(repo: &R) {
    let workspace = repo
        .create(NewWorkspace::new("Selections"))
        .await
        .expect("Create should succeed");

    repo.set_selection(&workspace.id, AgentKey::Leo, Some("Apollo"))
        .await
        .expect("Set selection should succeed");
    repo.set_selection(&workspace.id, AgentKey::Emma, Some("Slack"))
        .await
        .expect("Set selection should succeed");
    repo.set_selection(&workspace.id, AgentKey::Leo, Some("Clay"))
        .await
        .expect("Overwriting a selection should succeed");
    repo.set_selection(&workspace.id, AgentKey::Emma, None)
        .await
        .expect("Clearing a selection should succeed");

    let stored = repo.get(&workspace.id).await.unwrap().unwrap();
    assert_eq!(stored.selections.len(), 1);
    assert_eq!(stored.selections.get(&AgentKey::Leo).map(String::as_str), Some("Clay"));

    let result = repo
        .set_selection(&WorkspaceId::from("does-not-exist"), AgentKey::Leo, Some("Apollo"))
        .await;
    assert!(result.as_ref().is_err_and(|e| e.is_not_found()));
}

/// Test onboarding completion contract: stored once, never flips back
pub async fn test_onboarding_contract<R: WorkspaceRepository>(repo: &R) {
    let workspace = repo
        .create(NewWorkspace::new("Onboarding"))
        .await
        .expect("Create should succeed");

    let record = create_onboarding_record();
    let completed = repo
        .complete_onboarding(&workspace.id, &record)
        .await
        .expect("Completing onboarding should succeed");
    assert!(completed.onboarding_completed);
    assert_eq!(completed.onboarding.as_ref(), Some(&record));

    let other = OnboardingRecord {
        fields: [("targetCustomers".to_string(), "1".to_string())].into(),
    };
    let again = repo
        .complete_onboarding(&workspace.id, &other)
        .await
        .expect("Second completion should succeed");
    assert!(again.onboarding_completed);
    assert_eq!(
        again.onboarding.as_ref(),
        Some(&record),
        "Second completion must not replace the stored record"
    );

    let result = repo
        .complete_onboarding(&WorkspaceId::from("does-not-exist"), &record)
        .await;
    assert!(result.as_ref().is_err_and(|e| e.is_not_found()));
}

/// Test listing contract
pub async fn test_list_contract<R: WorkspaceRepository>(repo: &R) {
    let before = repo.list().await.expect("List should succeed").len();

    let template = WorkspaceBuilder::new().with_name("Listed").build();
    let created = repo
        .create(NewWorkspace {
            id: WorkspaceId::generate(),
            name: template.name,
        })
        .await
        .expect("Create should succeed");

    let all = repo.list().await.expect("List should succeed");
    assert_eq!(all.len(), before + 1);
    assert_eq!(
        all.last().map(|w| &w.id),
        Some(&created.id),
        "Newest workspace should be listed last"
    );
    crate::assert_workspaces_sorted_by_creation(&all);
}

/// Test deletion contract
pub async fn test_delete_contract<R: WorkspaceRepository>(repo: &R) {
    let workspace = repo
        .create(NewWorkspace::new("Doomed"))
        .await
        .expect("Create should succeed");
    repo.set_selection(&workspace.id, AgentKey::Sara, Some("HubSpot"))
        .await
        .expect("Set selection should succeed");

    repo.delete(&workspace.id).await.expect("Delete should succeed");
    assert!(repo.get(&workspace.id).await.unwrap().is_none());

    let result = repo.delete(&workspace.id).await;
    assert!(
        result.as_ref().is_err_and(|e| e.is_not_found()),
        "Deleting twice should report NotFound, got: {result:?}"
    );
}

/// Test health check contract
pub async fn test_health_check_contract<R: WorkspaceRepository>(repo: &R) {
    repo.health_check()
        .await
        .expect("Health check should succeed for a working repository");
}
