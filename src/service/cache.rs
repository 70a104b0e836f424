//! Read-through cache seam for hydrated teams.

use async_trait::async_trait;

use crate::models::Team;

#[async_trait]
pub trait TeamCache: Send + Sync {
    async fn add_entry(&self, team: &Team);

    async fn get_entry(&self, team_id: i64) -> Option<Team>;

    async fn invalidate(&self, team_id: i64);
}

/// Cache that never holds anything; every lookup is a miss.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

#[async_trait]
impl TeamCache for NoopCache {
    async fn add_entry(&self, _team: &Team) {}

    async fn get_entry(&self, _team_id: i64) -> Option<Team> {
        None
    }

    async fn invalidate(&self, _team_id: i64) {}
}
