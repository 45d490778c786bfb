//! Extraction orchestrator.
//!
//! `InsightsEngine` owns the run's fetcher and drives one storefront through
//! validation, homepage extraction, catalog discovery, hero selection, and
//! FAQ discovery into a single [`BrandProfile`]. Individual extractors never
//! fail the run; only malformed input and an unreachable homepage do.

use std::time::Duration;

use scraper::Html;
use shopsight_core::{BrandProfile, EngineConfig};

use crate::catalog::discover_catalog;
use crate::competitor::{self, CompetitorAnalysis, CompetitorInsight};
use crate::detect::{extract_runtime_data, is_shopify};
use crate::error::EngineError;
use crate::extract::{
    discover_faqs, extract_brand, extract_contact_details, extract_important_links,
    extract_page_faqs, extract_policies, extract_social_handles,
};
use crate::extract::faq::dedup_faqs;
use crate::fetch::Fetcher;
use crate::hero::{hero_products_by_position, rank_hero_products};
use crate::text::{is_valid_http_url, normalize_shop_url};

pub struct InsightsEngine {
    fetcher: Fetcher,
}

impl InsightsEngine {
    /// Builds an engine with one pooled fetcher for the whole run.
    ///
    /// # Errors
    ///
    /// Returns the underlying error when the HTTP client cannot be built.
    pub fn new(config: &EngineConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            fetcher: Fetcher::new(config)?,
        })
    }

    /// Extracts the complete profile of one storefront.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidUrl`] when the input does not normalize to an
    /// http(s) URL, [`EngineError::Unreachable`] when the homepage cannot be
    /// fetched by any strategy. Everything downstream degrades to empty
    /// fields instead of failing.
    pub async fn extract_insights(&self, storefront_url: &str) -> Result<BrandProfile, EngineError> {
        let url = normalize_shop_url(storefront_url);
        if !is_valid_http_url(&url) {
            return Err(EngineError::InvalidUrl {
                url: storefront_url.to_owned(),
            });
        }
        tracing::info!(url, "extracting storefront profile");

        let Some(homepage) = self.fetcher.fetch(&url).await else {
            return Err(EngineError::Unreachable { url });
        };

        if !is_shopify(&homepage, &url) {
            tracing::warn!(url, "no storefront platform signatures found, extracting anyway");
        }
        let runtime = extract_runtime_data(&homepage);

        let mut profile = BrandProfile::new(url.clone());

        // Html is not Send; parse and extract in one sync block per use so it
        // never lives across an await.
        let page_faqs = {
            let doc = Html::parse_document(&homepage);

            let facts = extract_brand(&doc, &url, &runtime);
            profile.brand_name = facts.name;
            profile.brand_description = facts.description;
            profile.logo_url = facts.logo_url;
            profile.currencies_supported = facts.currencies;
            profile.payment_methods = facts.payment_methods;

            profile.social_handles = extract_social_handles(&doc);
            profile.contact_details = extract_contact_details(&doc, &url);

            let policies = extract_policies(&doc, &url);
            profile.privacy_policy = policies.privacy_policy;
            profile.return_policy = policies.return_policy;
            profile.refund_policy = policies.refund_policy;
            profile.terms_of_service = policies.terms_of_service;

            profile.important_links = extract_important_links(&doc, &url);
            extract_page_faqs(&doc)
        };

        let catalog = discover_catalog(&self.fetcher, &url, &homepage).await;

        let mut heroes = rank_hero_products(&catalog);
        if heroes.is_empty() {
            tracing::debug!(url, "no tagged hero products, falling back to homepage position");
            heroes = {
                let doc = Html::parse_document(&homepage);
                hero_products_by_position(&doc, &url)
            };
        }

        let mut faqs = page_faqs;
        faqs.extend(discover_faqs(&self.fetcher, &url).await);
        profile.faqs = dedup_faqs(faqs);

        profile.total_products = catalog.len();
        profile.hero_products = heroes;
        profile.product_catalog = catalog;

        tracing::info!(
            url,
            products = profile.total_products,
            heroes = profile.hero_products.len(),
            faqs = profile.faqs.len(),
            "profile extracted"
        );
        Ok(profile)
    }

    /// Discovers competitors for a storefront and profiles each one.
    ///
    /// `brand_name` seeds the search queries; callers that already extracted
    /// a profile pass its brand name, others can derive one with
    /// [`competitor::display_name_from_url`]. Candidates are analyzed
    /// sequentially with a configured delay between them; a candidate whose
    /// extraction fails is logged and skipped.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidUrl`] for malformed input. Candidate failures
    /// never propagate.
    pub async fn analyze_competitors(
        &self,
        brand_name: &str,
        storefront_url: &str,
        max_competitors: usize,
    ) -> Result<CompetitorAnalysis, EngineError> {
        let url = normalize_shop_url(storefront_url);
        if !is_valid_http_url(&url) {
            return Err(EngineError::InvalidUrl {
                url: storefront_url.to_owned(),
            });
        }
        tracing::info!(url, brand_name, "analyzing competitors");

        let candidates =
            competitor::find_competitors(&self.fetcher, brand_name, &url, max_competitors).await;

        let delay = Duration::from_millis(self.fetcher.config().competitor_delay_ms);
        let mut insights: Vec<CompetitorInsight> = Vec::new();
        for candidate in &candidates {
            match self.extract_insights(&candidate.url).await {
                Ok(profile) => insights.push(CompetitorInsight {
                    competitor_name: candidate.name.clone(),
                    competitor_url: candidate.url.clone(),
                    profile,
                }),
                Err(err) => {
                    tracing::warn!(url = candidate.url, error = %err, "competitor analysis failed, skipping");
                }
            }
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        let analysis_summary = competitor::summarize(&insights);
        Ok(CompetitorAnalysis {
            original_brand: brand_name.to_owned(),
            original_url: url,
            competitors_found: candidates.len(),
            competitors_analyzed: insights.len(),
            competitor_insights: insights,
            analysis_summary,
        })
    }
}
