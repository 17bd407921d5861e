//! Table and column constants.

/// Default table holding one row per tenant shop.
pub const SHOP_TABLE: &str = "shops";

/// Path prefix of the REST API under the project URL.
pub const REST_PREFIX: &str = "/rest/v1";

/// Column holding the gallery media references.
pub const GALLERY_IMAGES_FIELD: &str = "gallery_images";

/// Column holding the product list.
pub const PRODUCTS_FIELD: &str = "products";

/// Column holding the social link mapping.
pub const SOCIAL_LINKS_FIELD: &str = "social_links";

/// Key inside a product object holding its media reference.
pub const PRODUCT_IMAGE_KEY: &str = "imageUrl";
