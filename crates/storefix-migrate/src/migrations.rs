//! Named shop migrations.
//!
//! Each migration pairs a selector with a transform. The pipeline in
//! [`crate::pipeline`] drives them; migrations themselves never do I/O.

use storefix_rest::{Shop, ShopPatch};

use crate::select::{PredicateChain, Selection, TenantPolicy, banner_with_suffix, has_banner};
use crate::transform::{FEATURED_VIDEO_KEY, fan_out_media, merge_link};
use crate::{MigrateError, SelectError, select_single_tenant};

/// Featured video linked when no other URL is configured.
pub const DEFAULT_FEATURED_VIDEO_URL: &str = "https://www.youtube.com/watch?v=kYF9un26R7I";

/// Banner suffix preferred by [`MirrorBannerMedia`].
pub const DEFAULT_BANNER_SUFFIX: &str = ".mp4";

// =============================================================================
// Migration Framework Types
// =============================================================================

/// A one-shot correction applied to a single shop.
pub trait Migration: Send + Sync {
    /// Unique name for this migration.
    fn name(&self) -> &'static str;

    /// Human-readable description.
    fn description(&self) -> &'static str;

    /// Pick the shop to correct.
    fn select<'a>(&self, shops: &'a [Shop]) -> Result<Selection<'a>, SelectError>;

    /// Compute the corrected fields for the selected shop.
    fn transform(&self, shop: &Shop) -> ShopPatch;
}

/// Knobs shared by the built-in migrations.
#[derive(Debug, Clone)]
pub struct MigrationSettings {
    pub banner_suffix: String,
    pub featured_video_url: String,
    pub tenant_policy: TenantPolicy,
}

impl Default for MigrationSettings {
    fn default() -> Self {
        Self {
            banner_suffix: DEFAULT_BANNER_SUFFIX.to_string(),
            featured_video_url: DEFAULT_FEATURED_VIDEO_URL.to_string(),
            tenant_policy: TenantPolicy::Strict,
        }
    }
}

// =============================================================================
// Migration: Mirror Banner Media
// =============================================================================

/// Point the gallery and all product images at the shop's banner.
///
/// Prefers a shop whose banner has the configured suffix, then any shop
/// with a banner.
pub struct MirrorBannerMedia {
    chain: PredicateChain,
}

impl MirrorBannerMedia {
    pub fn new(banner_suffix: impl Into<String>) -> Self {
        let banner_suffix: String = banner_suffix.into();
        Self {
            chain: PredicateChain::new()
                .then("banner-suffix", banner_with_suffix(banner_suffix))
                .then("any-banner", has_banner),
        }
    }
}

impl Migration for MirrorBannerMedia {
    fn name(&self) -> &'static str {
        "mirror-banner-media"
    }

    fn description(&self) -> &'static str {
        "Set every gallery image and product imageUrl to the shop banner"
    }

    fn select<'a>(&self, shops: &'a [Shop]) -> Result<Selection<'a>, SelectError> {
        self.chain.select(shops)
    }

    fn transform(&self, shop: &Shop) -> ShopPatch {
        let Some(banner) = shop.banner() else {
            return ShopPatch::default();
        };
        let (gallery, products) = fan_out_media(&shop.gallery_images, &shop.products, banner);

        ShopPatch {
            gallery_images: Some(gallery),
            products: Some(products),
            ..Default::default()
        }
    }
}

// =============================================================================
// Migration: Featured Video Link
// =============================================================================

/// Add the featured video to the social links of the single tenant shop.
pub struct FeaturedVideoLink {
    url: String,
    policy: TenantPolicy,
}

impl FeaturedVideoLink {
    pub fn new(url: impl Into<String>, policy: TenantPolicy) -> Self {
        Self {
            url: url.into(),
            policy,
        }
    }
}

impl Migration for FeaturedVideoLink {
    fn name(&self) -> &'static str {
        "featured-video-link"
    }

    fn description(&self) -> &'static str {
        "Set social_links.featured_video on the single tenant shop"
    }

    fn select<'a>(&self, shops: &'a [Shop]) -> Result<Selection<'a>, SelectError> {
        select_single_tenant(shops, self.policy)
    }

    fn transform(&self, shop: &Shop) -> ShopPatch {
        ShopPatch {
            social_links: Some(merge_link(
                &shop.social_links,
                FEATURED_VIDEO_KEY,
                &self.url,
            )),
            ..Default::default()
        }
    }
}

// =============================================================================
// Migration Registry
// =============================================================================

/// Get all available migrations.
pub fn available_migrations(settings: &MigrationSettings) -> Vec<Box<dyn Migration>> {
    vec![
        Box::new(MirrorBannerMedia::new(settings.banner_suffix.clone())),
        Box::new(FeaturedVideoLink::new(
            settings.featured_video_url.clone(),
            settings.tenant_policy,
        )),
    ]
}

/// Look up a migration by name.
pub fn find_migration(
    settings: &MigrationSettings,
    name: &str,
) -> Result<Box<dyn Migration>, MigrateError> {
    available_migrations(settings)
        .into_iter()
        .find(|m| m.name() == name)
        .ok_or_else(|| MigrateError::UnknownMigration(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use storefix_rest::ShopId;

    #[test]
    fn test_registry_names_unique() {
        let migrations = available_migrations(&MigrationSettings::default());
        let names: Vec<_> = migrations.iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["mirror-banner-media", "featured-video-link"]);
    }

    #[test]
    fn test_find_unknown_migration() {
        let err = find_migration(&MigrationSettings::default(), "nope")
            .err()
            .unwrap();
        assert!(matches!(err, MigrateError::UnknownMigration(name) if name == "nope"));
    }

    #[test]
    fn test_mirror_banner_respects_suffix_setting() {
        let mut webm = Shop::new(1);
        webm.banner_url = Some("https://x/a.webm".to_string());
        let mut mp4 = Shop::new(2);
        mp4.banner_url = Some("https://x/b.mp4".to_string());
        let shops = vec![mp4, webm];

        let migration = MirrorBannerMedia::new(".webm");
        let selection = migration.select(&shops).unwrap();
        assert_eq!(selection.shop.id, ShopId::Int(1));
        assert_eq!(selection.tier, "banner-suffix");
    }

    #[test]
    fn test_mirror_banner_transform_without_banner() {
        let migration = MirrorBannerMedia::new(".mp4");
        assert!(migration.transform(&Shop::new(1)).is_empty());
    }

    #[test]
    fn test_featured_video_transform_only_touches_links() {
        let mut shop = Shop::new(9);
        shop.gallery_images = vec!["g".to_string()];
        shop.social_links = json!({"twitter": "t"}).as_object().cloned().unwrap();

        let patch = FeaturedVideoLink::new("https://v", TenantPolicy::Strict).transform(&shop);
        assert_eq!(patch.gallery_images, None);
        assert_eq!(patch.products, None);
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({"social_links": {"twitter": "t", "featured_video": "https://v"}})
        );
    }
}
