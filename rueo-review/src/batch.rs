//! Concurrent review of many articles
//!
//! Articles are independent, so a dictionary file is reviewed on the tokio
//! blocking pool with at most `limit` articles in flight. The shared
//! configuration is read-only.

use crate::data::ArticleReview;
use crate::error::{ReviewError, ReviewResult};
use crate::review_article;
use rueo_markup::MarkupConfig;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Result of reviewing one article of a batch
#[derive(Debug)]
pub struct ArticleOutcome {
    /// Position of the article in the input
    pub index: usize,
    pub result: ReviewResult<ArticleReview>,
}

/// Review every article, at most `limit` at a time
///
/// An article that fails does not stop the others.
///
/// # Returns
/// One outcome per article, in input order
pub async fn review_batch(
    articles: Vec<String>,
    config: Arc<MarkupConfig>,
    limit: usize,
) -> Vec<ArticleOutcome> {
    let semaphore = Arc::new(Semaphore::new(limit.max(1)));
    let total = articles.len();
    let mut tasks = JoinSet::new();

    for (index, article) in articles.into_iter().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        let config = Arc::clone(&config);
        tasks.spawn(async move {
            let result = match semaphore.acquire_owned().await {
                Ok(_permit) => tokio::task::spawn_blocking(move || review_article(&article, &config))
                    .await
                    .unwrap_or_else(|e| Err(ReviewError::Other(format!("review task failed: {}", e)))),
                Err(e) => Err(ReviewError::Other(format!("batch limiter closed: {}", e))),
            };
            ArticleOutcome { index, result }
        });
    }

    let mut outcomes = Vec::with_capacity(total);
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(outcome) => {
                if let Err(e) = &outcome.result {
                    tracing::warn!(article = outcome.index, error = %e, "article review failed");
                }
                outcomes.push(outcome);
            }
            Err(e) => tracing::error!(error = %e, "review task panicked"),
        }
    }
    outcomes.sort_by_key(|outcome| outcome.index);

    tracing::info!(
        articles = total,
        failed = outcomes.iter().filter(|o| o.result.is_err()).count(),
        "batch reviewed"
    );
    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_review_batch_keeps_input_order() {
        let articles = vec![
            "[abak/o] счёты.".to_string(),
            "[abat/o] аббат.".to_string(),
            "[abdik/i] отрекаться.".to_string(),
        ];
        let outcomes = review_batch(articles, Arc::new(MarkupConfig::default()), 2).await;
        assert_eq!(outcomes.len(), 3);
        let headwords: Vec<String> = outcomes
            .iter()
            .map(|o| o.result.as_ref().unwrap().headword.clone())
            .collect();
        assert_eq!(headwords, vec!["abak/o", "abat/o", "abdik/i"]);
        assert_eq!(outcomes[2].result.as_ref().unwrap().groups[0].items, vec!["отрекаться"]);
    }

    #[tokio::test]
    async fn test_review_batch_empty_and_zero_limit() {
        let outcomes = review_batch(Vec::new(), Arc::new(MarkupConfig::default()), 0).await;
        assert!(outcomes.is_empty());

        let outcomes =
            review_batch(vec!["без заголовка".to_string()], Arc::new(MarkupConfig::default()), 0)
                .await;
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].result.is_ok());
    }
}
