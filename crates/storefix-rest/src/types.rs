//! Wire types for shop records.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::{GALLERY_IMAGES_FIELD, PRODUCTS_FIELD, SOCIAL_LINKS_FIELD};

/// A product entry. Products are open objects; only `imageUrl` is ever touched.
pub type Product = Map<String, Value>;

/// Social link mapping (link name to URL).
pub type SocialLinks = Map<String, Value>;

/// Opaque primary key of a shop row.
///
/// The store may key rows by integer or by string (e.g. UUID), so both are
/// accepted and rendered back verbatim for the `id=eq.<id>` filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ShopId {
    Int(i64),
    Text(String),
}

impl std::fmt::Display for ShopId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShopId::Int(n) => write!(f, "{}", n),
            ShopId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for ShopId {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<&str> for ShopId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// One tenant's shop as read from the collection.
///
/// Columns other than the ones below are ignored on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shop {
    pub id: ShopId,
    #[serde(default)]
    pub banner_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub gallery_images: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub products: Vec<Product>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub social_links: SocialLinks,
}

impl Shop {
    /// Create a shop with only an id set.
    pub fn new(id: impl Into<ShopId>) -> Self {
        Self {
            id: id.into(),
            banner_url: None,
            gallery_images: Vec::new(),
            products: Vec::new(),
            social_links: Map::new(),
        }
    }

    /// The banner reference, if present and non-empty.
    pub fn banner(&self) -> Option<&str> {
        self.banner_url.as_deref().filter(|s| !s.is_empty())
    }
}

/// Treat an explicit JSON `null` the same as a missing column.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Partial update body. Only fields that are `Some` are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShopPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gallery_images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<Product>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_links: Option<SocialLinks>,
}

impl ShopPatch {
    /// True when the patch would not change anything.
    pub fn is_empty(&self) -> bool {
        self.gallery_images.is_none() && self.products.is_none() && self.social_links.is_none()
    }

    /// Names of the columns this patch writes, in a stable order.
    pub fn field_names(&self) -> Vec<&'static str> {
        [
            self.gallery_images.is_some().then_some(GALLERY_IMAGES_FIELD),
            self.products.is_some().then_some(PRODUCTS_FIELD),
            self.social_links.is_some().then_some(SOCIAL_LINKS_FIELD),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Drop every field whose new value equals the shop's current value.
    pub fn without_unchanged(mut self, current: &Shop) -> Self {
        if self.gallery_images.as_ref() == Some(&current.gallery_images) {
            self.gallery_images = None;
        }
        if self.products.as_ref() == Some(&current.products) {
            self.products = None;
        }
        if self.social_links.as_ref() == Some(&current.social_links) {
            self.social_links = None;
        }
        self
    }
}

/// How the store answered a partial update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    /// The store acknowledged the update with a 2xx status.
    Success { status: u16 },
    /// The store rejected or errored; the raw body is kept for the operator.
    Failure { status: u16, body: String },
}

impl PatchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PatchOutcome::Success { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_shop_null_columns() {
        let shop: Shop = serde_json::from_value(json!({
            "id": 7,
            "banner_url": null,
            "gallery_images": null,
            "products": null,
            "social_links": null,
            "name": "ignored"
        }))
        .unwrap();

        assert_eq!(shop.id, ShopId::Int(7));
        assert_eq!(shop.banner(), None);
        assert!(shop.gallery_images.is_empty());
        assert!(shop.products.is_empty());
        assert!(shop.social_links.is_empty());
    }

    #[test]
    fn test_shop_missing_columns() {
        let shop: Shop = serde_json::from_value(json!({"id": "a1b2"})).unwrap();
        assert_eq!(shop.id, ShopId::Text("a1b2".to_string()));
        assert!(shop.products.is_empty());
    }

    #[test]
    fn test_empty_banner_is_absent() {
        let mut shop = Shop::new(1);
        shop.banner_url = Some(String::new());
        assert_eq!(shop.banner(), None);

        shop.banner_url = Some("https://x/a.mp4".to_string());
        assert_eq!(shop.banner(), Some("https://x/a.mp4"));
    }

    #[test]
    fn test_shop_id_display() {
        assert_eq!(ShopId::Int(42).to_string(), "42");
        assert_eq!(
            ShopId::from("0b6c7d1e-uuid").to_string(),
            "0b6c7d1e-uuid"
        );
    }

    #[test]
    fn test_patch_serializes_only_present_fields() {
        let patch = ShopPatch {
            gallery_images: Some(vec!["g".to_string()]),
            ..Default::default()
        };
        let body = serde_json::to_value(&patch).unwrap();
        assert_eq!(body, json!({"gallery_images": ["g"]}));
        assert_eq!(patch.field_names(), vec!["gallery_images"]);
    }

    #[test]
    fn test_patch_without_unchanged() {
        let mut shop = Shop::new(1);
        shop.gallery_images = vec!["same".to_string()];

        let patch = ShopPatch {
            gallery_images: Some(vec!["same".to_string()]),
            products: Some(vec![]),
            social_links: Some(Map::from_iter([("k".to_string(), json!("v"))])),
        }
        .without_unchanged(&shop);

        assert_eq!(patch.gallery_images, None);
        assert_eq!(patch.products, None);
        assert!(patch.social_links.is_some());
        assert!(!patch.is_empty());
    }
}
