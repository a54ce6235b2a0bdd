use std::ops::{Deref, DerefMut};

use tracing::warn;

use shipyard_core::{Entity, EntityKind};

use crate::errors::StoreResult;

/// Trait implemented by stores that persist fleet entities.
pub trait Repository {
    /// Human-readable store location for logs and reports.
    fn location(&self) -> String;

    /// Append an entity; fails when its identity already exists or a
    /// foreign key does not resolve.
    fn insert(&mut self, entity: &Entity) -> StoreResult<()>;

    /// All entities of a kind, ascending by identity field.
    fn select(&self, kind: EntityKind) -> StoreResult<Vec<Entity>>;

    /// Replace the row sharing the entity's identity value.
    fn update(&mut self, entity: &Entity) -> StoreResult<()>;

    /// Independent copy of the current state; later writes to either side
    /// are not visible to the other.
    fn create_snapshot(&self, name: &str) -> StoreResult<Self>
    where
        Self: Sized;

    /// Remove the backing storage of this store.
    fn destroy(&mut self) -> StoreResult<()>;
}

/// Snapshot that is destroyed when the guard goes out of scope.
pub struct ScopedSnapshot<R: Repository> {
    inner: R,
}

impl<R: Repository> ScopedSnapshot<R> {
    pub fn create(source: &R, name: &str) -> StoreResult<Self> {
        let inner = source.create_snapshot(name)?;
        Ok(Self { inner })
    }
}

impl<R: Repository> Deref for ScopedSnapshot<R> {
    type Target = R;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<R: Repository> DerefMut for ScopedSnapshot<R> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

impl<R: Repository> Drop for ScopedSnapshot<R> {
    fn drop(&mut self) {
        let location = self.inner.location();
        if let Err(err) = self.inner.destroy() {
            warn!(location = %location, error = %err, "failed to discard snapshot");
        }
    }
}
