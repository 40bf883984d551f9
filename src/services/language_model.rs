use async_trait::async_trait;

use crate::domain::scores::NormalizedResponse;
use crate::error::AppResult;

#[async_trait]
pub trait LanguageModelService: Send + Sync {
    async fn process(&self, request: &str) -> AppResult<NormalizedResponse>;
}
