use crate::domain::financing::{Financing, Notification, Payment};
use crate::domain::ports::{FinancingStore, NotificationStore, PaymentStore};
use crate::error::{FinancingError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, Options};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for financing records.
pub const CF_FINANCINGS: &str = "financings";
/// Column Family for installment plans, one JSON array per financing.
pub const CF_PAYMENTS: &str = "payments";
/// Column Family for notifications, one JSON array per farmer.
pub const CF_NOTIFICATIONS: &str = "notifications";

/// A persistent store implementation using RocksDB.
///
/// Implements every persistence port over separate Column Families. Keys are
/// big-endian `u32` ids and values are JSON.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
/// Read-modify-write sequences (version checks, notification appends) are
/// serialized through a shared async mutex.
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families exist.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = [CF_FINANCINGS, CF_PAYMENTS, CF_NOTIFICATIONS]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            FinancingError::Internal(Box::new(std::io::Error::other(format!(
                "{name} column family not found"
            ))))
        })
    }

    fn read<T: DeserializeOwned>(&self, cf_name: &str, key: u32) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        match self.db.get_cf(cf, key.to_be_bytes())? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn write<T: Serialize>(&self, cf_name: &str, key: u32, value: &T) -> Result<()> {
        let cf = self.cf(cf_name)?;
        let bytes = serde_json::to_vec(value).map_err(|e| {
            FinancingError::Internal(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Serialization error: {e}"),
            )))
        })?;
        self.db.put_cf(cf, key.to_be_bytes(), bytes)?;
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| {
        FinancingError::Internal(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Deserialization error: {e}"),
        )))
    })
}

#[async_trait]
impl FinancingStore for RocksDBStore {
    async fn insert(&self, financing: Financing) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        if self.read::<Financing>(CF_FINANCINGS, financing.id)?.is_some() {
            return Err(FinancingError::AlreadyExists(financing.id));
        }
        self.write(CF_FINANCINGS, financing.id, &financing)
    }

    async fn get(&self, id: u32) -> Result<Option<Financing>> {
        self.read(CF_FINANCINGS, id)
    }

    async fn update(&self, financing: Financing, expected_version: u64) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let stored: Financing = self
            .read(CF_FINANCINGS, financing.id)?
            .ok_or(FinancingError::NotFound(financing.id))?;
        if stored.version != expected_version {
            return Err(FinancingError::VersionConflict {
                id: financing.id,
                expected: expected_version,
                found: stored.version,
            });
        }
        self.write(CF_FINANCINGS, financing.id, &financing)
    }

    async fn get_all(&self) -> Result<Vec<Financing>> {
        let cf = self.cf(CF_FINANCINGS)?;
        let mut financings = Vec::new();

        // Big-endian keys iterate in id order.
        for item in self.db.iterator_cf(cf, rocksdb::IteratorMode::Start) {
            let (_key, value) = item?;
            financings.push(decode(&value)?);
        }

        Ok(financings)
    }
}

#[async_trait]
impl PaymentStore for RocksDBStore {
    async fn store_schedule(&self, financing: u32, payments: Vec<Payment>) -> Result<()> {
        self.write(CF_PAYMENTS, financing, &payments)
    }

    async fn for_financing(&self, financing: u32) -> Result<Vec<Payment>> {
        Ok(self.read(CF_PAYMENTS, financing)?.unwrap_or_default())
    }

    async fn mark_paid(&self, financing: u32, period: u32) -> Result<Payment> {
        let _guard = self.write_lock.lock().await;
        let mut plan: Vec<Payment> = self.read(CF_PAYMENTS, financing)?.unwrap_or_default();
        let paid = Payment::settle(&mut plan, financing, period)?;
        self.write(CF_PAYMENTS, financing, &plan)?;
        Ok(paid)
    }
}

#[async_trait]
impl NotificationStore for RocksDBStore {
    async fn push(&self, notification: Notification) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut inbox: Vec<Notification> = self
            .read(CF_NOTIFICATIONS, notification.farmer)?
            .unwrap_or_default();
        let farmer = notification.farmer;
        inbox.push(notification);
        self.write(CF_NOTIFICATIONS, farmer, &inbox)
    }

    async fn for_farmer(&self, farmer: u32) -> Result<Vec<Notification>> {
        Ok(self.read(CF_NOTIFICATIONS, farmer)?.unwrap_or_default())
    }
}
