//! Storage seam between the pipeline and the remote collection.

use async_trait::async_trait;
use storefix_rest::{PatchOutcome, RestClient, RestError, Shop, ShopId, ShopPatch};

/// Read-all and patch-one access to the shop collection.
#[async_trait]
pub trait ShopStore: Send + Sync {
    /// Fetch the full collection in server order.
    async fn list_shops(&self) -> Result<Vec<Shop>, RestError>;

    /// Apply a partial update to one shop.
    async fn patch_shop(&self, id: &ShopId, patch: &ShopPatch) -> Result<PatchOutcome, RestError>;
}

#[async_trait]
impl ShopStore for RestClient {
    async fn list_shops(&self) -> Result<Vec<Shop>, RestError> {
        self.list_records().await
    }

    async fn patch_shop(&self, id: &ShopId, patch: &ShopPatch) -> Result<PatchOutcome, RestError> {
        self.patch_record(id, patch).await
    }
}
