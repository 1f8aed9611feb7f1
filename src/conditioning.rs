//! Conditioning records passed to the external sampler
//!
//! A conditioning record is a list of entries, each an embedding tensor plus
//! a map of named extras. This crate only ever writes the concat latent and
//! concat mask keys; every other key is carried through untouched.

use std::collections::HashMap;

use burn::prelude::*;

/// Key holding the latent the sampler concatenates to its input
pub const CONCAT_LATENT_IMAGE: &str = "concat_latent_image";
/// Key holding the per-slot fixed/free mask
pub const CONCAT_MASK: &str = "concat_mask";

/// A value stored in a conditioning entry's metadata
#[derive(Debug, Clone)]
pub enum ConditioningValue<B: Backend> {
    Tensor(Tensor<B, 5>),
    Float(f64),
    Int(i64),
    Bool(bool),
    Text(String),
}

impl<B: Backend> ConditioningValue<B> {
    pub fn as_tensor(&self) -> Option<&Tensor<B, 5>> {
        match self {
            ConditioningValue::Tensor(tensor) => Some(tensor),
            _ => None,
        }
    }
}

/// One (embedding, metadata) pair
#[derive(Debug, Clone)]
pub struct ConditioningEntry<B: Backend> {
    /// Text embeddings [batch, seq_len, hidden]
    pub cond: Tensor<B, 3>,
    pub values: HashMap<String, ConditioningValue<B>>,
}

impl<B: Backend> ConditioningEntry<B> {
    pub fn new(cond: Tensor<B, 3>) -> Self {
        Self {
            cond,
            values: HashMap::new(),
        }
    }

    pub fn with_value(mut self, key: impl Into<String>, value: ConditioningValue<B>) -> Self {
        self.values.insert(key.into(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ConditioningValue<B>> {
        self.values.get(key)
    }

    /// Concat latent set by the segment composer, if any
    pub fn concat_latent(&self) -> Option<&Tensor<B, 5>> {
        self.get(CONCAT_LATENT_IMAGE).and_then(ConditioningValue::as_tensor)
    }

    /// Concat mask set by the segment composer, if any
    pub fn concat_mask(&self) -> Option<&Tensor<B, 5>> {
        self.get(CONCAT_MASK).and_then(ConditioningValue::as_tensor)
    }
}

/// Ordered list of conditioning entries
pub type Conditioning<B> = Vec<ConditioningEntry<B>>;

/// Return a copy of `conditioning` with `values` set on every entry.
///
/// Existing keys are replaced, new keys are added, everything else is kept.
/// The input is left untouched.
pub fn conditioning_set_values<B: Backend>(
    conditioning: &[ConditioningEntry<B>],
    values: &[(&str, ConditioningValue<B>)],
) -> Conditioning<B> {
    conditioning
        .iter()
        .map(|entry| {
            let mut entry = entry.clone();
            for (key, value) in values {
                entry.values.insert((*key).to_string(), value.clone());
            }
            entry
        })
        .collect()
}
