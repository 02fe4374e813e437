pub mod interactions;
pub mod memory;
pub mod postgres;
pub mod redis;
pub mod seed;
pub mod users;

pub use interactions::{InteractionStore, PgInteractionStore};
pub use memory::MemoryStore;
pub use postgres::{create_pool, run_migrations};
pub use seed::{seed_demo_data, SeedSummary};
pub use self::redis::{create_redis_client, Cache, CacheKey, CacheWriterHandle};
pub use users::{PgUserStore, UserStore};
