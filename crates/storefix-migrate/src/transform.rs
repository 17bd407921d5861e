//! Pure field transforms.
//!
//! Nothing here touches the network or mutates its inputs; every function
//! returns fresh values for the fields a migration intends to write.

use serde_json::Value;
use storefix_rest::{PRODUCT_IMAGE_KEY, Product, SocialLinks};

/// Gallery length used when the shop has no gallery yet.
pub const DEFAULT_GALLERY_LEN: usize = 3;

/// Key under `social_links` holding the featured video.
pub const FEATURED_VIDEO_KEY: &str = "featured_video";

/// Replace every gallery entry with `source`.
///
/// An empty gallery is filled with [`DEFAULT_GALLERY_LEN`] copies.
pub fn fan_out_gallery(gallery: &[String], source: &str) -> Vec<String> {
    let len = if gallery.is_empty() {
        DEFAULT_GALLERY_LEN
    } else {
        gallery.len()
    };
    vec![source.to_string(); len]
}

/// Overwrite `imageUrl` on every product, keeping all other keys and the order.
pub fn fan_out_products(products: &[Product], source: &str) -> Vec<Product> {
    products
        .iter()
        .map(|product| {
            let mut product = product.clone();
            product.insert(
                PRODUCT_IMAGE_KEY.to_string(),
                Value::String(source.to_string()),
            );
            product
        })
        .collect()
}

/// Point the gallery and every product image at the same media reference.
pub fn fan_out_media(
    gallery: &[String],
    products: &[Product],
    source: &str,
) -> (Vec<String>, Vec<Product>) {
    (
        fan_out_gallery(gallery, source),
        fan_out_products(products, source),
    )
}

/// Return `links` with `key` set to `value`; other keys are untouched.
pub fn merge_link(links: &SocialLinks, key: &str, value: &str) -> SocialLinks {
    let mut merged = links.clone();
    merged.insert(key.to_string(), Value::String(value.to_string()));
    merged
}
