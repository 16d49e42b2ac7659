use super::{Interceptor, Next};
use crate::transport::TransportError;
use async_trait::async_trait;
use std::time::Duration;
use tracing::warn;

/// Re-sends a request on transport failures and 5xx responses.
///
/// Only requests whose body can be cloned are retried; anything else gets a
/// single attempt.
#[derive(Debug, Clone)]
pub struct RetryInterceptor {
    max_retries: u32,
    delay: Duration,
}

impl RetryInterceptor {
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    fn should_retry(result: &Result<reqwest::Response, TransportError>) -> bool {
        match result {
            Ok(resp) => resp.status().is_server_error(),
            Err(_) => true,
        }
    }
}

impl Default for RetryInterceptor {
    fn default() -> Self {
        Self::new(2, Duration::from_millis(200))
    }
}

#[async_trait]
impl Interceptor for RetryInterceptor {
    async fn intercept(
        &self,
        request: reqwest::Request,
        next: Next<'_>,
    ) -> Result<reqwest::Response, TransportError> {
        let mut attempt = 0;
        let mut current = request;
        loop {
            let spare = if attempt < self.max_retries {
                current.try_clone()
            } else {
                None
            };

            let result = next.run(current).await;
            let Some(again) = spare else {
                return result;
            };
            if !Self::should_retry(&result) {
                return result;
            }

            attempt += 1;
            match &result {
                Ok(resp) => warn!(
                    attempt,
                    max = self.max_retries,
                    status = resp.status().as_u16(),
                    "retrying after server error"
                ),
                Err(e) => warn!(attempt, max = self.max_retries, error = %e, "retrying after transport error"),
            }
            // Drain the failed response before the next attempt.
            drop(result);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            current = again;
        }
    }
}
