//! Balance service - totals a customer's accounts and keeps a history of
//! those totals.
//!
//! Balances live in the Account Service; this service only reads them, with
//! the caller's credentials, and appends one snapshot per lookup.

use std::sync::Arc;

use crate::{
    clients::account::AccountClient,
    error::AppError,
    models::{
        balance::{BalanceByCustomerResponse, BalanceHistoryResponse},
        credential::Credentials,
    },
    stores::BalanceStore,
};

pub struct BalanceService {
    store: Arc<dyn BalanceStore>,
    accounts: Arc<dyn AccountClient>,
}

impl BalanceService {
    pub fn new(store: Arc<dyn BalanceStore>, accounts: Arc<dyn AccountClient>) -> Self {
        Self { store, accounts }
    }

    /// Current balances of every account a customer holds, and their total.
    ///
    /// # Process
    ///
    /// 1. List the customer's accounts via the Account Service
    /// 2. Sum the balances
    /// 3. Record the total as a new snapshot
    ///
    /// A customer with no accounts has a total of zero, which is recorded too.
    pub async fn balance_by_customer(
        &self,
        customer_id: i64,
        credentials: &Credentials,
    ) -> Result<BalanceByCustomerResponse, AppError> {
        let listed = self
            .accounts
            .get_accounts_by_customer(customer_id, credentials)
            .await?;

        let total_balance = listed
            .balances
            .iter()
            .try_fold(0i64, |sum, balance| sum.checked_add(*balance))
            .ok_or_else(|| AppError::Internal("balance total overflows".to_string()))?;

        let snapshot = self.store.record(customer_id, total_balance).await?;
        tracing::info!(
            customer_id,
            accounts = listed.account_ids.len(),
            total_balance,
            balance_id = snapshot.balance_id,
            "balance snapshot recorded"
        );

        Ok(BalanceByCustomerResponse {
            message: "success".to_string(),
            customer_id,
            account_ids: listed.account_ids,
            balances: listed.balances,
            total_balance,
        })
    }

    /// The customer's most recent snapshots, newest first.
    ///
    /// # Errors
    ///
    /// - `Validation`: `number_of_records` is zero or negative
    pub async fn balance_history(
        &self,
        customer_id: i64,
        number_of_records: i64,
    ) -> Result<BalanceHistoryResponse, AppError> {
        if number_of_records <= 0 {
            return Err(AppError::Validation(
                "numberOfRecords must be positive".to_string(),
            ));
        }

        let snapshots = self.store.latest(customer_id, number_of_records).await?;
        Ok(BalanceHistoryResponse::new(customer_id, &snapshots))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        stores::AccountStore,
        test_support::{InProcessAccountClient, MemoryAccountStore, MemoryBalanceStore},
    };
    use rstest::{fixture, rstest};

    struct Harness {
        ledger: Arc<MemoryAccountStore>,
        accounts: Arc<InProcessAccountClient>,
        snapshots: Arc<MemoryBalanceStore>,
        service: BalanceService,
    }

    #[fixture]
    fn harness() -> Harness {
        let ledger = Arc::new(MemoryAccountStore::default());
        let accounts = Arc::new(InProcessAccountClient::new(ledger.clone()));
        let snapshots = Arc::new(MemoryBalanceStore::default());
        Harness {
            service: BalanceService::new(snapshots.clone(), accounts.clone()),
            ledger,
            accounts,
            snapshots,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn totals_every_account_of_the_customer(harness: Harness) {
        let first = harness.ledger.seed(3, 100);
        let second = harness.ledger.seed(3, -25);
        harness.ledger.seed(4, 1_000);

        let response = harness
            .service
            .balance_by_customer(3, &Credentials::Anonymous)
            .await
            .unwrap();

        assert_eq!(response.account_ids, vec![first, second]);
        assert_eq!(response.balances, vec![100, -25]);
        assert_eq!(response.total_balance, 75);
        assert_eq!(harness.snapshots.len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn customer_without_accounts_totals_zero(harness: Harness) {
        let response = harness
            .service
            .balance_by_customer(9, &Credentials::Anonymous)
            .await
            .unwrap();

        assert!(response.account_ids.is_empty());
        assert_eq!(response.total_balance, 0);
        assert_eq!(harness.snapshots.len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn lookup_forwards_credentials(harness: Harness) {
        let credentials = Credentials::Token("abc.def".to_string());

        harness
            .service
            .balance_by_customer(3, &credentials)
            .await
            .unwrap();

        assert_eq!(harness.accounts.seen_credentials(), vec![credentials]);
    }

    #[rstest]
    #[tokio::test]
    async fn history_is_newest_first_and_limited(harness: Harness) {
        let account = harness.ledger.seed(3, 10);
        let service = &harness.service;
        service.balance_by_customer(3, &Credentials::Anonymous).await.unwrap();
        harness.ledger.adjust_balance(account, 5).await.unwrap();
        service.balance_by_customer(3, &Credentials::Anonymous).await.unwrap();
        harness.ledger.adjust_balance(account, 5).await.unwrap();
        service.balance_by_customer(3, &Credentials::Anonymous).await.unwrap();
        service.balance_by_customer(8, &Credentials::Anonymous).await.unwrap();

        let history = service.balance_history(3, 2).await.unwrap();

        assert_eq!(history.customer_id, 3);
        assert_eq!(history.total_balances, vec![20, 15]);
        assert_eq!(history.record_timestamps.len(), 2);
        assert!(history.record_timestamps[0] >= history.record_timestamps[1]);
    }

    #[rstest]
    #[case(0)]
    #[case(-1)]
    #[tokio::test]
    async fn history_needs_a_positive_count(harness: Harness, #[case] count: i64) {
        let err = harness.service.balance_history(3, count).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[rstest]
    #[tokio::test]
    async fn overflowing_total_records_nothing(harness: Harness) {
        harness.ledger.seed(3, i64::MAX);
        harness.ledger.seed(3, 1);

        let err = harness
            .service
            .balance_by_customer(3, &Credentials::Anonymous)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Internal(_)));
        assert_eq!(harness.snapshots.len(), 0);
    }
}
