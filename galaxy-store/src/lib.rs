pub mod analytics;
pub mod app_config;
pub mod booking_repo;
pub mod flight_repo;
pub mod kv;
pub mod redis_repo;
pub mod seed;
pub mod store;

pub use kv::{KvStore, MemoryKv};
pub use redis_repo::RedisClient;
pub use seed::{sample_flights, seed_sample_flights};
pub use store::GalaxyStore;
