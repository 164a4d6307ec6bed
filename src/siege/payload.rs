//! Keys and values for generated PUT requests

use bytes::Bytes;
use rand::distr::Alphanumeric;
use rand::Rng;

/// Length of a generated key: a 128-bit identifier in lowercase hex
pub const KEY_LEN: usize = 32;

/// Byte used for fixed (non-random) values
pub const FILLER: u8 = b'*';

/// A fresh random 128-bit key rendered as 32 hex characters
pub fn generate_key() -> Bytes {
    let id: u128 = rand::rng().random();
    Bytes::from(format!("{:032x}", id))
}

/// `size` bytes of filler
pub fn filler_value(size: usize) -> Bytes {
    Bytes::from(vec![FILLER; size])
}

/// `size` random alphanumeric bytes, so text-only servers accept them
pub fn random_value(size: usize) -> Bytes {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(size)
        .collect::<Vec<u8>>()
        .into()
}

/// Produces the key/value pair for each cycle
#[derive(Debug, Clone)]
pub struct Payloads {
    value_size: usize,

    /// Pre-built value, `None` when every request gets a fresh random one
    fixed: Option<Bytes>,
}

impl Payloads {
    pub fn new(value_size: usize, random_values: bool) -> Self {
        let fixed = (!random_values).then(|| filler_value(value_size));
        Self { value_size, fixed }
    }

    pub fn next_key(&self) -> Bytes {
        generate_key()
    }

    /// The shared filler value (a cheap refcount clone) or a fresh random one
    pub fn next_value(&self) -> Bytes {
        match &self.fixed {
            Some(value) => value.clone(),
            None => random_value(self.value_size),
        }
    }

    pub fn value_size(&self) -> usize {
        self.value_size
    }
}
