pub mod config;
pub mod profile;
pub mod store;

pub use config::{load_engine_config, ConfigError, EngineConfig};
pub use profile::{
    dedup_products, Availability, BrandProfile, CompetitorCandidate, ContactDetails, FaqRecord,
    ImportantLinks, PolicyRecord, ProductRecord, SocialHandles,
};
pub use store::{ProfileStore, ProfileSummary};
