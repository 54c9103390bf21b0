//! In-memory implementation of the Store trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;

use carbonmeter_core::{
    DeviceBinding, DeviceId, Ed25519PublicKey, EnergyReading, OffsetRecord, WalletAddress,
};

use crate::error::Result;
use crate::traits::{InsertResult, Store};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    /// Readings keyed by (device, timestamp); BTreeMap keeps them
    /// timestamp-ordered per device.
    readings: BTreeMap<(DeviceId, i64), EnergyReading>,

    /// Bindings keyed by device id.
    bindings: HashMap<DeviceId, DeviceBinding>,

    /// Uniqueness index: public key -> device it is bound to.
    key_index: HashMap<Ed25519PublicKey, DeviceId>,

    /// Uniqueness index: bound wallet addresses.
    wallet_index: HashSet<String>,

    /// Offset records in insertion order.
    offsets: Vec<OffsetRecord>,
}

impl MemoryStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
        }
    }

    /// Number of stored readings (test helper).
    pub fn reading_count(&self) -> usize {
        self.inner.read().unwrap().readings.len()
    }

    /// Number of stored bindings (test helper).
    pub fn binding_count(&self) -> usize {
        self.inner.read().unwrap().bindings.len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_reading(&self, reading: &EnergyReading) -> Result<InsertResult> {
        let mut inner = self.inner.write().unwrap();
        let key = (reading.device_id, reading.timestamp);

        match inner.readings.get(&key) {
            Some(existing) if existing == reading => Ok(InsertResult::AlreadyExists),
            Some(_) => Ok(InsertResult::Conflict),
            None => {
                inner.readings.insert(key, reading.clone());
                Ok(InsertResult::Inserted)
            }
        }
    }

    async fn get_reading(
        &self,
        device_id: &DeviceId,
        timestamp: i64,
    ) -> Result<Option<EnergyReading>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.readings.get(&(*device_id, timestamp)).cloned())
    }

    async fn list_readings(&self, device_id: &DeviceId) -> Result<Vec<EnergyReading>> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .readings
            .range((*device_id, i64::MIN)..=(*device_id, i64::MAX))
            .map(|(_, r)| r.clone())
            .collect())
    }

    async fn insert_binding(&self, binding: &DeviceBinding) -> Result<()> {
        let mut inner = self.inner.write().unwrap();

        if inner.bindings.contains_key(&binding.device_id) {
            return Err(crate::StoreError::Conflict {
                field: "device_id",
                value: binding.device_id.to_hex(),
            });
        }
        if inner.key_index.contains_key(&binding.public_key) {
            return Err(crate::StoreError::Conflict {
                field: "public_key",
                value: binding.public_key.to_hex(),
            });
        }
        if inner.wallet_index.contains(binding.wallet_address.as_str()) {
            return Err(crate::StoreError::Conflict {
                field: "wallet_address",
                value: binding.wallet_address.to_string(),
            });
        }

        inner.key_index.insert(binding.public_key, binding.device_id);
        inner
            .wallet_index
            .insert(binding.wallet_address.as_str().to_string());
        inner.bindings.insert(binding.device_id, binding.clone());
        Ok(())
    }

    async fn get_binding(&self, device_id: &DeviceId) -> Result<Option<DeviceBinding>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.bindings.get(device_id).cloned())
    }

    async fn find_device_for_key(&self, key: &Ed25519PublicKey) -> Result<Option<DeviceId>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.key_index.get(key).copied())
    }

    async fn is_wallet_bound(&self, wallet: &WalletAddress) -> Result<bool> {
        let inner = self.inner.read().unwrap();
        Ok(inner.wallet_index.contains(wallet.as_str()))
    }

    async fn insert_offset(&self, record: &OffsetRecord) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        inner.offsets.push(record.clone());
        Ok(())
    }

    async fn list_offsets(&self, device_id: &DeviceId) -> Result<Vec<OffsetRecord>> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .offsets
            .iter()
            .filter(|r| &r.device_id == device_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carbonmeter_core::{CableType, Keypair, Region, WalletAddress};

    fn make_reading(device: u8, timestamp: i64, kwh: f64) -> EnergyReading {
        EnergyReading {
            device_id: DeviceId::from_bytes([device; 32]),
            kwh,
            timestamp,
            verified: true,
            cable_type: CableType::TypeC,
            region: Region::Eu,
        }
    }

    fn make_binding(device: u8, wallet: &str) -> DeviceBinding {
        let keypair = Keypair::from_seed(&[device; 32]);
        DeviceBinding {
            device_id: DeviceId::from_bytes([device; 32]),
            public_key: keypair.public_key(),
            wallet_address: WalletAddress::new(wallet).unwrap(),
            registered_at: 1_000_000_000,
            verified: true,
        }
    }

    #[tokio::test]
    async fn test_reading_insert_and_get() {
        let store = MemoryStore::new();
        let reading = make_reading(0x01, 1_000, 0.5);

        let result = store.insert_reading(&reading).await.unwrap();
        assert_eq!(result, InsertResult::Inserted);

        let retrieved = store
            .get_reading(&reading.device_id, 1_000)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(retrieved, reading);
    }

    #[tokio::test]
    async fn test_reading_insert_idempotent() {
        let store = MemoryStore::new();
        let reading = make_reading(0x01, 1_000, 0.5);

        assert_eq!(
            store.insert_reading(&reading).await.unwrap(),
            InsertResult::Inserted
        );
        assert_eq!(
            store.insert_reading(&reading).await.unwrap(),
            InsertResult::AlreadyExists
        );

        let different = make_reading(0x01, 1_000, 0.7);
        assert_eq!(
            store.insert_reading(&different).await.unwrap(),
            InsertResult::Conflict
        );
        assert_eq!(store.reading_count(), 1);
    }

    #[tokio::test]
    async fn test_list_readings_ordered_per_device() {
        let store = MemoryStore::new();
        store.insert_reading(&make_reading(0x01, 30, 0.3)).await.unwrap();
        store.insert_reading(&make_reading(0x01, 10, 0.1)).await.unwrap();
        store.insert_reading(&make_reading(0x02, 20, 0.2)).await.unwrap();

        let device = DeviceId::from_bytes([0x01; 32]);
        let readings = store.list_readings(&device).await.unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].timestamp, 10);
        assert_eq!(readings[1].timestamp, 30);
    }

    #[tokio::test]
    async fn test_binding_uniqueness_backstop() {
        let store = MemoryStore::new();
        let binding = make_binding(0x01, "W1");
        store.insert_binding(&binding).await.unwrap();

        // Same device again.
        let err = store.insert_binding(&binding).await.unwrap_err();
        assert!(matches!(
            err,
            crate::StoreError::Conflict {
                field: "device_id",
                ..
            }
        ));

        // Different device, same wallet.
        let other = make_binding(0x02, "W1");
        let err = store.insert_binding(&other).await.unwrap_err();
        assert!(matches!(
            err,
            crate::StoreError::Conflict {
                field: "wallet_address",
                ..
            }
        ));

        assert_eq!(store.binding_count(), 1);
    }

    #[tokio::test]
    async fn test_uniqueness_queries() {
        let store = MemoryStore::new();
        let binding = make_binding(0x01, "W1");
        store.insert_binding(&binding).await.unwrap();

        assert_eq!(
            store
                .find_device_for_key(&binding.public_key)
                .await
                .unwrap(),
            Some(binding.device_id)
        );
        assert!(store
            .is_wallet_bound(&WalletAddress::new("W1").unwrap())
            .await
            .unwrap());
        assert!(!store
            .is_wallet_bound(&WalletAddress::new("W2").unwrap())
            .await
            .unwrap());
    }
}
