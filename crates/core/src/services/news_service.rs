use std::sync::Arc;

use crate::errors::CoreError;
use crate::models::news::NewsArticle;
use crate::providers::registry::ProviderRegistry;

/// Most articles returned by one request.
pub const NEWS_LIMIT: usize = 12;

pub struct NewsService {
    registry: Arc<ProviderRegistry>,
}

impl NewsService {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self { registry }
    }

    /// Latest market headlines. Any upstream problem becomes
    /// `UpstreamUnavailable`; callers answer with an empty list.
    pub async fn latest(&self) -> Result<Vec<NewsArticle>, CoreError> {
        let feed = self
            .registry
            .news_feed()
            .ok_or_else(|| CoreError::UpstreamUnavailable("No news feed configured".into()))?;

        match feed.latest_news(NEWS_LIMIT).await {
            Ok(mut articles) => {
                articles.retain(|a| !a.title.trim().is_empty() && !a.url.trim().is_empty());
                articles.truncate(NEWS_LIMIT);
                Ok(articles)
            }
            Err(e) => {
                tracing::warn!(error = %e, "News feed failed");
                Err(CoreError::UpstreamUnavailable(
                    "News service temporarily unavailable".into(),
                ))
            }
        }
    }
}
