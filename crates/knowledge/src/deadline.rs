//! Time budget for calls to external model services.

use docbrain_core::{AppError, AppResult};
use std::future::Future;
use std::time::Duration;

/// Run `fut`, failing with [`AppError::Timeout`] once `limit` elapses.
pub async fn with_deadline<T, F>(operation: &str, limit: Duration, fut: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(operation, limit_secs = limit.as_secs_f64(), "External call timed out");
            Err(AppError::timeout(operation, limit))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_passes_result_through() {
        let value = with_deadline("noop", Duration::from_secs(1), async { Ok(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out() {
        let result: AppResult<()> = with_deadline("embedding", Duration::from_secs(5), async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        })
        .await;

        assert!(matches!(result, Err(AppError::Timeout { .. })));
    }
}
