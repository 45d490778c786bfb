//! Persistence interface consumed by callers of the engine.
//!
//! The engine itself never reads prior state; profiles flow one way, out.
//! Store errors are the caller's to log, nothing in the extraction pipeline
//! depends on a save completing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::profile::BrandProfile;

/// One row of [`ProfileStore::list`] output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub storefront_url: String,
    pub brand_name: Option<String>,
    pub total_products: usize,
    pub extracted_at: DateTime<Utc>,
}

impl From<&BrandProfile> for ProfileSummary {
    fn from(profile: &BrandProfile) -> Self {
        Self {
            storefront_url: profile.storefront_url.clone(),
            brand_name: profile.brand_name.clone(),
            total_products: profile.total_products,
            extracted_at: profile.extracted_at,
        }
    }
}

/// Storage keyed by storefront URL. Saving an existing URL replaces the
/// stored profile.
pub trait ProfileStore {
    fn save(&mut self, profile: BrandProfile);
    fn load(&self, storefront_url: &str) -> Option<BrandProfile>;
    /// Returns `true` if a profile was present and removed.
    fn delete(&mut self, storefront_url: &str) -> bool;
    fn list(&self) -> Vec<ProfileSummary>;
}
