use nutype::nutype;
use rand::Rng;
use rand::distr::Alphanumeric;
use redb::TypeName;
use std::cmp::Ordering;
use std::str;

pub const MAX_ID_LENGTH: usize = 64;

/// Length of freshly generated ids. 62^10 possible values.
pub const DEFAULT_ID_LENGTH: usize = 10;

fn is_url_safe(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Short opaque paste identifier, safe to embed in a URL path segment.
#[nutype(
    new_unchecked,
    validate(not_empty, len_char_max = MAX_ID_LENGTH, predicate = is_url_safe),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        AsRef,
        Deref,
        TryFrom,
        Into,
        Hash,
        Borrow,
        Display,
        Serialize,
        Deserialize,
    )
)]
pub struct PasteId(String);

impl PasteId {
    /// Draws a random alphanumeric id of `len` characters.
    ///
    /// Collisions against existing ids are not checked; the id space is
    /// large enough that they are not expected in practice.
    pub fn generate(len: usize) -> Self {
        let len = len.clamp(1, MAX_ID_LENGTH);
        let id: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(len)
            .map(char::from)
            .collect();

        // SAFETY: `Alphanumeric` only yields [A-Za-z0-9] and len is within bounds.
        unsafe { Self::new_unchecked(id) }
    }
}

impl redb::Key for PasteId {
    fn compare(data1: &[u8], data2: &[u8]) -> Ordering {
        data1.cmp(data2)
    }
}

impl redb::Value for PasteId {
    type SelfType<'a> = Self;
    type AsBytes<'a> = &'a [u8];

    fn fixed_width() -> Option<usize> {
        None
    }

    fn from_bytes<'a>(data: &'a [u8]) -> Self::SelfType<'a>
    where
        Self: 'a,
    {
        let s = str::from_utf8(data).expect("invalid UTF-8 in paste id");
        // SAFETY: only ids that passed validation are ever written.
        unsafe { Self::new_unchecked(s.to_owned()) }
    }

    fn as_bytes<'a, 'b: 'a>(value: &'a Self::SelfType<'b>) -> Self::AsBytes<'a>
    where
        Self: 'b,
    {
        value.as_bytes()
    }

    fn type_name() -> TypeName {
        TypeName::new("paste::PasteId")
    }
}
