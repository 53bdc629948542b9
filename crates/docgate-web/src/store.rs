use std::time::{SystemTime, UNIX_EPOCH};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// A stored user document.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub created_at: u64,
    pub updated_at: u64,
}

impl User {
    pub fn new(username: String, password_hash: String) -> Self {
        let now = unix_now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            username,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Document store holding user records.
pub trait UserStore: Send + Sync {
    /// Inserts `user`. Returns `false` if the username is already taken.
    fn insert(&self, user: User) -> bool;
    fn get(&self, id: &str) -> Option<User>;
    fn find_by_username(&self, username: &str) -> Option<User>;
    /// All users, oldest first.
    fn list(&self) -> Vec<User>;
    /// Removes and returns the user with `id`.
    fn delete(&self, id: &str) -> Option<User>;
}

/// In-process [`UserStore`] keyed by id, with a username index.
#[derive(Default)]
pub struct MemoryUserStore {
    users: DashMap<String, User>,
    usernames: DashMap<String, String>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserStore for MemoryUserStore {
    fn insert(&self, user: User) -> bool {
        match self.usernames.entry(user.username.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(user.id.clone());
                tracing::debug!("User inserted: id={}, username={}", user.id, user.username);
                self.users.insert(user.id.clone(), user);
                true
            }
        }
    }

    fn get(&self, id: &str) -> Option<User> {
        self.users.get(id).map(|u| u.clone())
    }

    fn find_by_username(&self, username: &str) -> Option<User> {
        let id = self.usernames.get(username)?.clone();
        self.get(&id)
    }

    fn list(&self) -> Vec<User> {
        let mut users: Vec<User> = self.users.iter().map(|u| u.clone()).collect();
        users.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.username.cmp(&b.username))
        });
        users
    }

    fn delete(&self, id: &str) -> Option<User> {
        let (_, user) = self.users.remove(id)?;
        self.usernames.remove(&user.username);
        tracing::debug!("User deleted: id={id}");
        Some(user)
    }
}
