use crate::domain::financing::{Financing, Notification, Payment};
use crate::domain::ports::{FinancingStore, NotificationStore, PaymentStore};
use crate::error::{FinancingError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for financings.
///
/// The version check in `update` runs under the write lock, so concurrent
/// transitions on the same record cannot both succeed.
#[derive(Default, Clone)]
pub struct InMemoryFinancingStore {
    financings: Arc<RwLock<HashMap<u32, Financing>>>,
}

impl InMemoryFinancingStore {
    /// Creates a new, empty in-memory financing store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FinancingStore for InMemoryFinancingStore {
    async fn insert(&self, financing: Financing) -> Result<()> {
        let mut financings = self.financings.write().await;
        if financings.contains_key(&financing.id) {
            return Err(FinancingError::AlreadyExists(financing.id));
        }
        financings.insert(financing.id, financing);
        Ok(())
    }

    async fn get(&self, id: u32) -> Result<Option<Financing>> {
        let financings = self.financings.read().await;
        Ok(financings.get(&id).cloned())
    }

    async fn update(&self, financing: Financing, expected_version: u64) -> Result<()> {
        let mut financings = self.financings.write().await;
        let stored = financings
            .get(&financing.id)
            .ok_or(FinancingError::NotFound(financing.id))?;
        if stored.version != expected_version {
            return Err(FinancingError::VersionConflict {
                id: financing.id,
                expected: expected_version,
                found: stored.version,
            });
        }
        financings.insert(financing.id, financing);
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<Financing>> {
        let financings = self.financings.read().await;
        let mut all: Vec<Financing> = financings.values().cloned().collect();
        all.sort_by_key(|f| f.id);
        Ok(all)
    }
}

/// In-memory installment plans keyed by financing id.
#[derive(Default, Clone)]
pub struct InMemoryPaymentStore {
    plans: Arc<RwLock<HashMap<u32, Vec<Payment>>>>,
}

impl InMemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn store_schedule(&self, financing: u32, payments: Vec<Payment>) -> Result<()> {
        let mut plans = self.plans.write().await;
        plans.insert(financing, payments);
        Ok(())
    }

    async fn for_financing(&self, financing: u32) -> Result<Vec<Payment>> {
        let plans = self.plans.read().await;
        Ok(plans.get(&financing).cloned().unwrap_or_default())
    }

    async fn mark_paid(&self, financing: u32, period: u32) -> Result<Payment> {
        let mut plans = self.plans.write().await;
        let plan = plans
            .get_mut(&financing)
            .map(Vec::as_mut_slice)
            .unwrap_or_default();
        Payment::settle(plan, financing, period)
    }
}

/// In-memory notification inbox, in push order per farmer.
#[derive(Default, Clone)]
pub struct InMemoryNotificationStore {
    inbox: Arc<RwLock<Vec<Notification>>>,
}

impl InMemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotificationStore for InMemoryNotificationStore {
    async fn push(&self, notification: Notification) -> Result<()> {
        self.inbox.write().await.push(notification);
        Ok(())
    }

    async fn for_farmer(&self, farmer: u32) -> Result<Vec<Notification>> {
        let inbox = self.inbox.read().await;
        Ok(inbox.iter().filter(|n| n.farmer == farmer).cloned().collect())
    }
}
