use dashmap::DashMap;
use serenity::model::id::GuildId;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

/// One async mutex per guild. Holding the guard serialises queue-mutating work for that
/// guild while leaving other guilds untouched. Clones share the same locks.
#[derive(Clone, Default)]
pub struct GuildLocks {
    locks: Arc<DashMap<GuildId, Arc<Mutex<()>>>>,
}

impl GuildLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, guild_id: GuildId) -> OwnedMutexGuard<()> {
        // Clone the Arc out so the map shard is not held while waiting.
        let lock = Arc::clone(&self.locks.entry(guild_id).or_default());
        if lock.try_lock().is_err() {
            debug!("Waiting for in-flight request in guild {}", guild_id);
        }
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_guild_waits() {
        let locks = GuildLocks::new();
        let guild = GuildId::new(1);

        let guard = locks.lock(guild).await;
        let second = tokio::time::timeout(Duration::from_millis(20), locks.lock(guild)).await;
        assert!(second.is_err());

        drop(guard);
        let third = tokio::time::timeout(Duration::from_millis(20), locks.lock(guild)).await;
        assert!(third.is_ok());
    }

    #[tokio::test]
    async fn clones_share_guild_locks() {
        let locks = GuildLocks::new();
        let shared = locks.clone();
        let guild = GuildId::new(1);

        let _guard = locks.lock(guild).await;
        let second = tokio::time::timeout(Duration::from_millis(20), shared.lock(guild)).await;

        assert!(second.is_err());
    }

    #[tokio::test]
    async fn different_guilds_do_not_block() {
        let locks = GuildLocks::new();

        let _first = locks.lock(GuildId::new(1)).await;
        let second = tokio::time::timeout(Duration::from_millis(20), locks.lock(GuildId::new(2))).await;

        assert!(second.is_ok());
    }
}
