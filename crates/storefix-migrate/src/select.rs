//! Record selection.
//!
//! Two policies are provided:
//!
//! - [`PredicateChain`]: an ordered list of named tiers. Each tier scans the
//!   collection in server order and the first match wins; the next tier is
//!   only tried when the previous one matched nothing.
//! - [`select_single_tenant`]: the collection is expected to hold exactly one
//!   shop.

use storefix_rest::Shop;
use tracing::{debug, warn};

use crate::SelectError;

type ShopPredicate = Box<dyn Fn(&Shop) -> bool + Send + Sync>;

/// A shop picked by a selector, with the tier that matched it.
#[derive(Debug, Clone, Copy)]
pub struct Selection<'a> {
    pub shop: &'a Shop,
    pub tier: &'static str,
}

struct Tier {
    name: &'static str,
    predicate: ShopPredicate,
}

/// Ordered predicate tiers tried one after another.
#[derive(Default)]
pub struct PredicateChain {
    tiers: Vec<Tier>,
}

impl PredicateChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a tier that is tried after all tiers added so far.
    pub fn then(
        mut self,
        name: &'static str,
        predicate: impl Fn(&Shop) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.tiers.push(Tier {
            name,
            predicate: Box::new(predicate),
        });
        self
    }

    /// Tier names in the order they are tried.
    pub fn tier_names(&self) -> Vec<&'static str> {
        self.tiers.iter().map(|t| t.name).collect()
    }

    /// Pick the first shop matching the earliest tier that matches anything.
    pub fn select<'a>(&self, shops: &'a [Shop]) -> Result<Selection<'a>, SelectError> {
        for tier in &self.tiers {
            if let Some(shop) = shops.iter().find(|s| (tier.predicate)(s)) {
                debug!(id = %shop.id, tier = tier.name, "selected shop");
                return Ok(Selection {
                    shop,
                    tier: tier.name,
                });
            }
            debug!(tier = tier.name, scanned = shops.len(), "no shop matched tier");
        }

        Err(SelectError::NotFound {
            criteria: self.tier_names().join(", then "),
        })
    }
}

impl std::fmt::Debug for PredicateChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredicateChain")
            .field("tiers", &self.tier_names())
            .finish()
    }
}

/// Matches shops with a non-empty banner ending in `suffix`.
pub fn banner_with_suffix(suffix: impl Into<String>) -> impl Fn(&Shop) -> bool + Send + Sync {
    let suffix = suffix.into();
    move |shop: &Shop| shop.banner().is_some_and(|b| b.ends_with(&suffix))
}

/// Matches shops with any non-empty banner.
pub fn has_banner(shop: &Shop) -> bool {
    shop.banner().is_some()
}

/// How positional selection treats a collection with several shops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TenantPolicy {
    /// Exactly one shop is required.
    #[default]
    Strict,
    /// Take the first shop and log a warning if there are more.
    FirstRecord,
}

/// Tier name reported for positional selection.
pub const SINGLE_TENANT_TIER: &str = "single-tenant";

/// Treat the collection as holding a single tenant and return it.
pub fn select_single_tenant(
    shops: &[Shop],
    policy: TenantPolicy,
) -> Result<Selection<'_>, SelectError> {
    let shop = shops.first().ok_or(SelectError::EmptyCollection)?;

    if shops.len() > 1 {
        match policy {
            TenantPolicy::Strict => {
                return Err(SelectError::AmbiguousTenant { count: shops.len() });
            }
            TenantPolicy::FirstRecord => {
                warn!(
                    count = shops.len(),
                    id = %shop.id,
                    "collection holds several shops, using the first"
                );
            }
        }
    }

    Ok(Selection {
        shop,
        tier: SINGLE_TENANT_TIER,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefix_rest::ShopId;

    fn shop(id: i64, banner: Option<&str>) -> Shop {
        let mut shop = Shop::new(id);
        shop.banner_url = banner.map(String::from);
        shop
    }

    fn banner_chain() -> PredicateChain {
        PredicateChain::new()
            .then("mp4-banner", banner_with_suffix(".mp4"))
            .then("any-banner", has_banner)
    }

    #[test]
    fn test_primary_tier_wins_over_earlier_fallback() {
        let shops = vec![
            shop(1, Some("https://x/a.png")),
            shop(2, Some("https://x/b.mp4")),
        ];
        let selection = banner_chain().select(&shops).unwrap();
        assert_eq!(selection.shop.id, ShopId::Int(2));
        assert_eq!(selection.tier, "mp4-banner");
    }

    #[test]
    fn test_first_primary_match_in_order() {
        let shops = vec![
            shop(1, None),
            shop(2, Some("https://x/b.mp4")),
            shop(3, Some("https://x/c.mp4")),
        ];
        let selection = banner_chain().select(&shops).unwrap();
        assert_eq!(selection.shop.id, ShopId::Int(2));
    }

    #[test]
    fn test_fallback_tier() {
        let shops = vec![
            shop(1, Some("")),
            shop(2, Some("https://x/b.jpg")),
            shop(3, Some("https://x/c.gif")),
        ];
        let selection = banner_chain().select(&shops).unwrap();
        assert_eq!(selection.shop.id, ShopId::Int(2));
        assert_eq!(selection.tier, "any-banner");
    }

    #[test]
    fn test_empty_banner_never_matches() {
        let shops = vec![shop(1, None), shop(2, Some(""))];
        let err = banner_chain().select(&shops).unwrap_err();
        assert_eq!(
            err,
            SelectError::NotFound {
                criteria: "mp4-banner, then any-banner".to_string()
            }
        );
    }

    #[test]
    fn test_empty_chain_finds_nothing() {
        let shops = vec![shop(1, Some("https://x/a.mp4"))];
        assert!(PredicateChain::new().select(&shops).is_err());
    }

    #[test]
    fn test_single_tenant() {
        let shops = vec![shop(9, None)];
        let selection = select_single_tenant(&shops, TenantPolicy::Strict).unwrap();
        assert_eq!(selection.shop.id, ShopId::Int(9));
        assert_eq!(selection.tier, SINGLE_TENANT_TIER);
    }

    #[test]
    fn test_single_tenant_empty() {
        assert_eq!(
            select_single_tenant(&[], TenantPolicy::FirstRecord).unwrap_err(),
            SelectError::EmptyCollection
        );
    }

    #[test]
    fn test_single_tenant_ambiguous() {
        let shops = vec![shop(1, None), shop(2, None)];
        assert_eq!(
            select_single_tenant(&shops, TenantPolicy::Strict).unwrap_err(),
            SelectError::AmbiguousTenant { count: 2 }
        );

        let selection = select_single_tenant(&shops, TenantPolicy::FirstRecord).unwrap();
        assert_eq!(selection.shop.id, ShopId::Int(1));
    }
}
