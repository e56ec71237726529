use std::sync::Arc;

use gatehouse_core::AppError;
use gatehouse_domain::ViewScope;

use crate::test_support::{FakeRolePermissionRepository, actor};

use super::AccessControlService;

fn service(entries: &[(&str, bool)]) -> AccessControlService {
    AccessControlService::new(Arc::new(FakeRolePermissionRepository::with_role(
        "sales", entries,
    )))
}

#[tokio::test]
async fn require_permission_allows_granted_role() {
    let service = service(&[("products.edit", true)]);

    let result = service
        .require_permission(&actor("alice", "sales"), "products.edit")
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn require_permission_denies_missing_and_false_grants() {
    let service = service(&[("products.delete", false)]);
    let alice = actor("alice", "sales");

    let missing = service.require_permission(&alice, "products.edit").await;
    assert!(matches!(missing, Err(AppError::Forbidden(_))));

    let revoked = service.require_permission(&alice, "products.delete").await;
    assert!(matches!(revoked, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn unknown_role_is_denied_everything() {
    let service = service(&[("products.view", true)]);
    let stranger = actor("mallory", "contractor");

    assert!(matches!(
        service.is_allowed(&stranger, "products.view").await,
        Ok(false)
    ));
    assert!(matches!(
        service.view_scope(&stranger, "products").await,
        Ok(ViewScope::None)
    ));
}

#[tokio::test]
async fn require_view_scope_rejects_hidden_module() {
    let service = service(&[("leads.view", true), ("leads.view_assigned", true)]);
    let alice = actor("alice", "sales");

    assert!(matches!(
        service.require_view_scope(&alice, "leads").await,
        Ok(ViewScope::Assigned)
    ));
    assert!(matches!(
        service.require_view_scope(&alice, "products").await,
        Err(AppError::Forbidden(_))
    ));
}

#[tokio::test]
async fn corrupted_snapshot_still_resolves_with_tie_break() {
    let service = service(&[
        ("leads.view", true),
        ("leads.view_all", true),
        ("leads.view_assigned", true),
    ]);

    let scope = service.view_scope(&actor("alice", "sales"), "leads").await;
    assert!(matches!(scope, Ok(ViewScope::All)));
}

#[tokio::test]
async fn assigned_scope_only_reveals_own_records() {
    let service = service(&[("leads.view", true), ("leads.view_assigned", true)]);
    let alice = actor("alice", "sales");

    assert!(matches!(
        service.can_view_record(&alice, "leads", Some("alice")).await,
        Ok(true)
    ));
    assert!(matches!(
        service.can_view_record(&alice, "leads", Some("bob")).await,
        Ok(false)
    ));
    assert!(matches!(
        service.can_view_record(&alice, "leads", None).await,
        Ok(false)
    ));
}
