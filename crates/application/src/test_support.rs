use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use gatehouse_core::{AppResult, RoleId, UserIdentity};
use gatehouse_domain::{Entitlement, PermissionWrite, RolePermissions};
use tokio::sync::Mutex;

use crate::{AuditEvent, AuditRepository, Clock, EntitlementRepository, RolePermissionRepository};

pub fn actor(subject: &str, role_id: &str) -> UserIdentity {
    let role_id = RoleId::new(role_id).unwrap_or_else(|error| panic!("role id: {error}"));
    UserIdentity::new(subject, subject, role_id)
}

#[derive(Default)]
pub struct FakeRolePermissionRepository {
    pub snapshots: Mutex<HashMap<String, RolePermissions>>,
    pub batches: Mutex<Vec<(String, Vec<PermissionWrite>)>>,
}

impl FakeRolePermissionRepository {
    pub fn with_role(role_id: &str, entries: &[(&str, bool)]) -> Self {
        Self {
            snapshots: Mutex::new(HashMap::from([(
                role_id.to_owned(),
                RolePermissions::from_iter(entries.iter().copied()),
            )])),
            batches: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl RolePermissionRepository for FakeRolePermissionRepository {
    async fn find_role_permissions(&self, role_id: &RoleId) -> AppResult<RolePermissions> {
        Ok(self
            .snapshots
            .lock()
            .await
            .get(role_id.as_str())
            .cloned()
            .unwrap_or_default())
    }

    async fn apply_permission_writes(
        &self,
        role_id: &RoleId,
        writes: Vec<PermissionWrite>,
    ) -> AppResult<RolePermissions> {
        let mut snapshots = self.snapshots.lock().await;
        let snapshot = snapshots.entry(role_id.as_str().to_owned()).or_default();
        for write in &writes {
            snapshot.set(write.key.clone(), write.value);
        }
        let updated = snapshot.clone();

        self.batches
            .lock()
            .await
            .push((role_id.as_str().to_owned(), writes));
        Ok(updated)
    }
}

#[derive(Default)]
pub struct FakeEntitlementRepository {
    pub entitlements: Mutex<HashMap<String, Entitlement>>,
}

impl FakeEntitlementRepository {
    pub fn with_entitlement(subject: &str, entitlement: Entitlement) -> Self {
        Self {
            entitlements: Mutex::new(HashMap::from([(subject.to_owned(), entitlement)])),
        }
    }
}

#[async_trait]
impl EntitlementRepository for FakeEntitlementRepository {
    async fn find_entitlement(&self, subject: &str) -> AppResult<Option<Entitlement>> {
        Ok(self.entitlements.lock().await.get(subject).cloned())
    }

    async fn save_entitlement(&self, subject: &str, entitlement: Entitlement) -> AppResult<()> {
        self.entitlements
            .lock()
            .await
            .insert(subject.to_owned(), entitlement);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeAuditRepository {
    pub events: Mutex<Vec<AuditEvent>>,
}

#[async_trait]
impl AuditRepository for FakeAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.events.lock().await.push(event);
        Ok(())
    }
}

pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self {
            millis: AtomicI64::new(instant.timestamp_millis()),
        }
    }

    pub fn advance(&self, duration: Duration) {
        self.millis
            .fetch_add(duration.num_milliseconds(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.millis.load(Ordering::SeqCst)).unwrap_or_default()
    }
}
