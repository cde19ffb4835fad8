use crate::model::*;
use async_trait::async_trait;

/// Users, media records and settings behind the admin screens.
#[async_trait]
pub trait BackOfficeStorage: Send + Sync {
    async fn list_users(&self) -> Result<Vec<UserProfile>, GenericError>;

    async fn list_media(&self) -> Result<Vec<MediaAsset>, GenericError>;

    async fn create_media(&self, asset: &NewMediaAsset) -> Result<MediaAsset, GenericError>;

    async fn delete_media(&self, media_id: ModelId) -> Result<bool, GenericError>;

    async fn get_settings(&self) -> Result<StoreSettings, GenericError>;

    async fn upsert_settings(
        &self,
        settings: &StoreSettings,
    ) -> Result<StoreSettings, GenericError>;
}
