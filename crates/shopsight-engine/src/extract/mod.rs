//! Field extractors over a parsed homepage.
//!
//! Every extractor is infallible: it takes the document (plus whatever
//! context it needs) and degrades to an empty result when the page does not
//! carry the data. Cascading strategies are ordered selector lists, not
//! control flow.

pub mod brand;
pub mod contact;
pub mod faq;
pub mod links;
pub mod policy;
pub mod products;
pub mod social;

pub use brand::{extract_brand, BrandFacts};
pub use contact::extract_contact_details;
pub use faq::{discover_faqs, extract_page_faqs};
pub use links::extract_important_links;
pub use policy::{extract_policies, PolicySet};
pub use products::extract_page_products;
pub use social::extract_social_handles;
