//! Lookups into external registries.
//!
//! User accounts and the vehicle registry live outside this crate; the engine
//! only needs existence checks and role-based fan-out, expressed as these two
//! traits. The in-memory implementations back the test suites.

use crate::auth::{Role, UserRef};
use crate::db::StoreError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Read-only view of the user directory.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Looks up a user by id.
    async fn get_user(&self, id: Uuid) -> Result<Option<UserRef>, StoreError>;

    /// All active users holding the given role.
    async fn users_with_role(&self, role: Role) -> Result<Vec<UserRef>, StoreError>;
}

/// Existence check against the external vehicle registry.
#[async_trait]
pub trait VehicleLookup: Send + Sync {
    async fn vehicle_exists(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// In-memory [`Directory`].
#[derive(Default)]
pub struct MemoryDirectory {
    users: Arc<RwLock<HashMap<Uuid, UserRef>>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, user: UserRef) {
        self.users.write().await.insert(user.id, user);
    }
}

#[async_trait]
impl Directory for MemoryDirectory {
    async fn get_user(&self, id: Uuid) -> Result<Option<UserRef>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn users_with_role(&self, role: Role) -> Result<Vec<UserRef>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .filter(|u| u.role == role && u.active)
            .cloned()
            .collect())
    }
}

/// In-memory [`VehicleLookup`].
#[derive(Default)]
pub struct MemoryVehicleLookup {
    vehicles: Arc<RwLock<HashMap<Uuid, ()>>>,
}

impl MemoryVehicleLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, id: Uuid) {
        self.vehicles.write().await.insert(id, ());
    }
}

#[async_trait]
impl VehicleLookup for MemoryVehicleLookup {
    async fn vehicle_exists(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.vehicles.read().await.contains_key(&id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role, active: bool) -> UserRef {
        UserRef {
            id: Uuid::new_v4(),
            name: "someone".to_string(),
            role,
            active,
        }
    }

    #[tokio::test]
    async fn users_with_role_excludes_inactive() {
        let dir = MemoryDirectory::new();
        dir.insert(user(Role::Admin, true)).await;
        dir.insert(user(Role::Admin, false)).await;
        dir.insert(user(Role::Investigator, true)).await;

        let admins = dir.users_with_role(Role::Admin).await.unwrap();
        assert_eq!(admins.len(), 1);
        assert!(admins[0].active);
    }

    #[tokio::test]
    async fn vehicle_lookup() {
        let registry = MemoryVehicleLookup::new();
        let id = Uuid::new_v4();
        registry.insert(id).await;

        assert!(registry.vehicle_exists(id).await.unwrap());
        assert!(!registry.vehicle_exists(Uuid::new_v4()).await.unwrap());
    }
}
