use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::models::{IdentityRecord, NewWorkout, Workout};

/// Lookup and creation of identity records.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Case-sensitive exact match on username.
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<IdentityRecord>, StoreError>;

    async fn insert(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<IdentityRecord, StoreError>;
}

/// Workout persistence. Every call is scoped to the owning identity.
#[async_trait]
pub trait WorkoutStore: Send + Sync {
    async fn create(&self, owner_id: i64, workout: NewWorkout) -> Result<Workout, StoreError>;

    async fn find_for_owner(
        &self,
        owner_id: i64,
        workout_id: i64,
    ) -> Result<Option<Workout>, StoreError>;

    async fn list_for_owner(&self, owner_id: i64) -> Result<Vec<Workout>, StoreError>;

    /// Returns false when nothing owned by `owner_id` had that id.
    async fn delete_for_owner(&self, owner_id: i64, workout_id: i64) -> Result<bool, StoreError>;
}

#[derive(Default)]
struct UserTable {
    by_username: HashMap<String, IdentityRecord>,
    last_id: i64,
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<UserTable>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryUserStore {
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<IdentityRecord>, StoreError> {
        Ok(self.users.lock().await.by_username.get(username).cloned())
    }

    async fn insert(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<IdentityRecord, StoreError> {
        let mut table = self.users.lock().await;
        if table.by_username.contains_key(username) {
            return Err(StoreError::DuplicateUsername);
        }
        table.last_id += 1;
        let user = IdentityRecord {
            id: table.last_id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        };
        table.by_username.insert(username.to_string(), user.clone());
        Ok(user)
    }
}

#[derive(Default)]
struct WorkoutTable {
    rows: BTreeMap<i64, Workout>,
    last_id: i64,
}

#[derive(Default)]
pub struct MemoryWorkoutStore {
    workouts: Mutex<WorkoutTable>,
}

impl MemoryWorkoutStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkoutStore for MemoryWorkoutStore {
    async fn create(&self, owner_id: i64, workout: NewWorkout) -> Result<Workout, StoreError> {
        let mut table = self.workouts.lock().await;
        table.last_id += 1;
        let row = Workout {
            id: table.last_id,
            name: workout.name,
            description: workout.description,
            user_id: owner_id,
        };
        table.rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_for_owner(
        &self,
        owner_id: i64,
        workout_id: i64,
    ) -> Result<Option<Workout>, StoreError> {
        let table = self.workouts.lock().await;
        Ok(table
            .rows
            .get(&workout_id)
            .filter(|w| w.user_id == owner_id)
            .cloned())
    }

    async fn list_for_owner(&self, owner_id: i64) -> Result<Vec<Workout>, StoreError> {
        let table = self.workouts.lock().await;
        Ok(table
            .rows
            .values()
            .filter(|w| w.user_id == owner_id)
            .cloned()
            .collect())
    }

    async fn delete_for_owner(&self, owner_id: i64, workout_id: i64) -> Result<bool, StoreError> {
        let mut table = self.workouts.lock().await;
        let owned = table
            .rows
            .get(&workout_id)
            .is_some_and(|w| w.user_id == owner_id);
        if owned {
            table.rows.remove(&workout_id);
        }
        Ok(owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leg_day() -> NewWorkout {
        NewWorkout {
            name: "Leg day".to_string(),
            description: Some("squats".to_string()),
        }
    }

    #[tokio::test]
    async fn usernames_are_unique_and_case_sensitive() {
        let store = MemoryUserStore::new();
        let alice = store.insert("alice", "hash-a").await.unwrap();
        assert_eq!(alice.id, 1);

        assert!(matches!(
            store.insert("alice", "hash-b").await,
            Err(StoreError::DuplicateUsername)
        ));
        assert!(store.find_by_username("Alice").await.unwrap().is_none());

        let upper = store.insert("Alice", "hash-c").await.unwrap();
        assert_eq!(upper.id, 2);
        assert_eq!(store.find_by_username("alice").await.unwrap(), Some(alice));
    }

    #[tokio::test]
    async fn workouts_are_scoped_to_their_owner() {
        let store = MemoryWorkoutStore::new();
        let mine = store.create(1, leg_day()).await.unwrap();
        store.create(2, leg_day()).await.unwrap();

        assert_eq!(store.list_for_owner(1).await.unwrap(), vec![mine.clone()]);
        assert!(store.find_for_owner(2, mine.id).await.unwrap().is_none());
        assert!(!store.delete_for_owner(2, mine.id).await.unwrap());

        assert!(store.delete_for_owner(1, mine.id).await.unwrap());
        assert!(store.find_for_owner(1, mine.id).await.unwrap().is_none());
        assert!(!store.delete_for_owner(1, mine.id).await.unwrap());
    }
}
