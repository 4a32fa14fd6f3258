//! On-disk encoding: one version byte followed by a postcard body.

use crate::core::store::error::StoreError;
pub use v1 as latest_record;

pub mod v1;

pub trait RecordVariant {
    const VERSION: u8;
}

#[derive(Debug, Clone)]
pub enum VersionedRecord {
    V1(v1::Record),
}

impl VersionedRecord {
    pub fn decode(data: &[u8]) -> Result<Self, StoreError> {
        let (version, body) = data
            .split_first()
            .ok_or_else(|| StoreError::Corrupted("empty record".to_string()))?;

        match *version {
            v1::Record::VERSION => postcard::from_bytes::<v1::Record>(body)
                .map(VersionedRecord::V1)
                .map_err(|e| StoreError::Corrupted(format!("invalid v1 record: {e}"))),
            version => Err(StoreError::Corrupted(format!(
                "unsupported record version: {version}"
            ))),
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, StoreError> {
        match self {
            VersionedRecord::V1(v1) => postcard::to_extend(v1, vec![v1::Record::VERSION])
                .map_err(|e| StoreError::Corrupted(format!("failed to encode record: {e}"))),
        }
    }

    pub fn into_latest(self) -> latest_record::Record {
        match self {
            VersionedRecord::V1(v) => v,
        }
    }
}
