//! Migration pipeline for shop records.
//!
//! Every migration follows the same linear shape:
//!
//! 1. fetch the whole collection through a [`ShopStore`]
//! 2. pick one shop with a selector ([`PredicateChain`] or
//!    [`select_single_tenant`])
//! 3. derive the corrected fields with a pure transform
//! 4. send only the changed fields as a partial update and classify the answer

mod error;
mod migrations;
mod pipeline;
pub mod select;
mod store;
pub mod transform;

pub use error::{MigrateError, SelectError};
pub use migrations::{
    DEFAULT_BANNER_SUFFIX, DEFAULT_FEATURED_VIDEO_URL, FeaturedVideoLink, Migration,
    MigrationSettings, MirrorBannerMedia, available_migrations, find_migration,
};
pub use pipeline::{
    MigrationPlan, MigrationReport, Prepared, apply_plan, plan, prepare_migration, run_migration,
};
pub use select::{PredicateChain, Selection, TenantPolicy, select_single_tenant};
pub use store::ShopStore;
