use crate::types::{PasteId, Timestamp};
use redb::TypeName;
use std::cmp::Ordering;

/// Entry of the expiry index: ordered by deadline, then by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiryKey {
    /// `created_at + ttl_seconds` of the indexed record.
    pub expires_at: Timestamp,
    pub id: PasteId,
}

fn extract_millis(data: &[u8]) -> (i64, &[u8]) {
    let (millis, rest) = data
        .split_first_chunk::<8>()
        .expect("expiry key shorter than its timestamp");
    (i64::from_be_bytes(*millis), rest)
}

impl redb::Key for ExpiryKey {
    fn compare(data1: &[u8], data2: &[u8]) -> Ordering {
        let (millis1, id1) = extract_millis(data1);
        let (millis2, id2) = extract_millis(data2);

        millis1
            .cmp(&millis2)
            .then_with(|| <PasteId as redb::Key>::compare(id1, id2))
    }
}

impl redb::Value for ExpiryKey {
    type SelfType<'a> = ExpiryKey;
    type AsBytes<'a> = Vec<u8>;

    fn fixed_width() -> Option<usize> {
        None
    }

    fn from_bytes<'a>(data: &'a [u8]) -> Self::SelfType<'a>
    where
        Self: 'a,
    {
        let (millis, id) = extract_millis(data);

        ExpiryKey {
            expires_at: Timestamp::from_millis(millis),
            id: <PasteId as redb::Value>::from_bytes(id),
        }
    }

    fn as_bytes<'a, 'b: 'a>(value: &'a Self::SelfType<'b>) -> Self::AsBytes<'a>
    where
        Self: 'b,
    {
        let mut bytes = Vec::with_capacity(8 + value.id.len());
        bytes.extend_from_slice(&value.expires_at.as_millis().to_be_bytes());
        bytes.extend_from_slice(<PasteId as redb::Value>::as_bytes(&value.id));
        bytes
    }

    fn type_name() -> TypeName {
        TypeName::new("paste::ExpiryKey")
    }
}
