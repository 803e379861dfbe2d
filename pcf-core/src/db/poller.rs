//! Polls a submitted calculation until the backend reports a final status.

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use super::repository::{PcfRepository, RepositoryError};
use crate::models::Calculation;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PollError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("calculation {id} still running after {attempts} polls")]
    TimedOut { id: String, attempts: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: 120,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CalculationPoller {
    config: PollConfig,
}

impl CalculationPoller {
    pub fn new(config: PollConfig) -> Self {
        Self { config }
    }

    /// Fetches calculation `id` every `interval` until it is completed or
    /// failed, and returns the final record.
    ///
    /// `on_update` sees the first observation and every status change after
    /// it; callers forward these to the session so the wizard can react.
    ///
    /// # Errors
    ///
    /// * [`PollError::Repository`] as soon as a fetch fails.
    /// * [`PollError::TimedOut`] after `max_attempts` non-final observations
    ///   (at least one fetch is always made).
    pub async fn poll<F>(
        &self,
        repo: &dyn PcfRepository,
        id: &str,
        mut on_update: F,
    ) -> Result<Calculation, PollError>
    where
        F: FnMut(&Calculation),
    {
        let mut last_status = None;
        let max_attempts = self.config.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            let calculation = repo.get_calculation(id).await?;

            if last_status != Some(calculation.status) {
                debug!(id, attempt, status = calculation.status.as_str(), "calculation status");
                last_status = Some(calculation.status);
                on_update(&calculation);
            }

            if calculation.status.is_terminal() {
                return Ok(calculation);
            }

            tokio::time::sleep(self.config.interval).await;
        }

        warn!(id, attempts = max_attempts, "gave up polling calculation");
        Err(PollError::TimedOut {
            id: id.to_string(),
            attempts: max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::{BomItem, CalculationStatus, Product};

    /// Replays a fixed status script, repeating the last entry forever.
    struct ScriptedRepository {
        script: Vec<CalculationStatus>,
        calls: Mutex<usize>,
    }

    impl ScriptedRepository {
        fn new(script: Vec<CalculationStatus>) -> Self {
            Self {
                script,
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl PcfRepository for ScriptedRepository {
        async fn search_products(&self, _query: &str) -> Result<Vec<Product>, RepositoryError> {
            unimplemented!()
        }
        async fn get_product(&self, _id: &str) -> Result<Product, RepositoryError> {
            unimplemented!()
        }
        async fn get_product_bom(
            &self,
            _product_id: &str,
        ) -> Result<Vec<BomItem>, RepositoryError> {
            unimplemented!()
        }
        async fn submit_calculation(
            &self,
            _product_id: &str,
            _items: &[BomItem],
        ) -> Result<Calculation, RepositoryError> {
            unimplemented!()
        }
        async fn get_calculation(&self, id: &str) -> Result<Calculation, RepositoryError> {
            if id != "calc-1" {
                return Err(RepositoryError::NotFound);
            }
            let mut calls = self.calls.lock().unwrap();
            let status = self.script[(*calls).min(self.script.len() - 1)];
            *calls += 1;
            Ok(Calculation {
                status,
                ..Calculation::pending(id)
            })
        }
    }

    fn fast_poller(max_attempts: u32) -> CalculationPoller {
        CalculationPoller::new(PollConfig {
            interval: Duration::from_millis(1),
            max_attempts,
        })
    }

    #[tokio::test]
    async fn poll_reports_each_status_change_once() {
        use CalculationStatus::*;
        let repo = ScriptedRepository::new(vec![Pending, Pending, InProgress, InProgress, Completed]);
        let mut seen = Vec::new();

        let result = fast_poller(10)
            .poll(&repo, "calc-1", |calc| seen.push(calc.status))
            .await
            .unwrap();

        assert_eq!(result.status, Completed);
        assert_eq!(seen, vec![Pending, InProgress, Completed]);
        assert_eq!(repo.calls(), 5);
    }

    #[tokio::test]
    async fn poll_stops_on_failure() {
        use CalculationStatus::*;
        let repo = ScriptedRepository::new(vec![Pending, Failed]);

        let result = fast_poller(10).poll(&repo, "calc-1", |_| {}).await.unwrap();

        assert_eq!(result.status, Failed);
        assert_eq!(repo.calls(), 2);
    }

    #[tokio::test]
    async fn poll_times_out_after_max_attempts() {
        let repo = ScriptedRepository::new(vec![CalculationStatus::InProgress]);

        let result = fast_poller(3).poll(&repo, "calc-1", |_| {}).await;

        assert_eq!(
            result,
            Err(PollError::TimedOut {
                id: "calc-1".to_string(),
                attempts: 3
            })
        );
        assert_eq!(repo.calls(), 3);
    }

    #[tokio::test]
    async fn zero_max_attempts_still_fetches_once() {
        let repo = ScriptedRepository::new(vec![CalculationStatus::Completed]);

        let result = fast_poller(0).poll(&repo, "calc-1", |_| {}).await.unwrap();

        assert_eq!(result.status, CalculationStatus::Completed);
        assert_eq!(repo.calls(), 1);
    }

    #[tokio::test]
    async fn poll_propagates_repository_errors() {
        let repo = ScriptedRepository::new(vec![CalculationStatus::Pending]);

        let result = fast_poller(3).poll(&repo, "unknown", |_| {}).await;

        assert_eq!(result, Err(PollError::Repository(RepositoryError::NotFound)));
    }
}
