use super::financing::{Financing, Notification, Payment};
use crate::error::Result;
use async_trait::async_trait;

/// Persistence for financing records.
#[async_trait]
pub trait FinancingStore: Send + Sync {
    /// Stores a new financing; fails with `AlreadyExists` if the id is taken.
    async fn insert(&self, financing: Financing) -> Result<()>;
    async fn get(&self, id: u32) -> Result<Option<Financing>>;
    /// Replaces a stored financing only if its stored version is still
    /// `expected_version`; otherwise fails with `VersionConflict`.
    async fn update(&self, financing: Financing, expected_version: u64) -> Result<()>;
    async fn get_all(&self) -> Result<Vec<Financing>>;
}

/// Persistence for installment plans.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Replaces the whole plan of `financing`.
    async fn store_schedule(&self, financing: u32, payments: Vec<Payment>) -> Result<()>;
    async fn for_financing(&self, financing: u32) -> Result<Vec<Payment>>;
    /// Settles one installment and returns it as stored.
    async fn mark_paid(&self, financing: u32, period: u32) -> Result<Payment>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn push(&self, notification: Notification) -> Result<()>;
    async fn for_farmer(&self, farmer: u32) -> Result<Vec<Notification>>;
}

pub type FinancingStoreBox = Box<dyn FinancingStore>;
pub type PaymentStoreBox = Box<dyn PaymentStore>;
pub type NotificationStoreBox = Box<dyn NotificationStore>;
pub type FinancingStoreFactory = Box<dyn Fn() -> FinancingStoreBox + Send + Sync>;
