// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::hash::{hash_code, write_bytes, Hashable};
use crate::key_value::KeyValue;
use serde::{Deserialize, Deserializer, Serialize};
use std::hash::{Hash, Hasher};

/// Describes an instance of an application or service that emits tracing data.
///
/// The tags are kept in canonical (sorted) order, so two processes built from the same service
/// name and the same multiset of tags are equal and share a [`Process::hash_code`] regardless of
/// the order the tags were supplied in. Duplicate tags are kept.
///
/// `T` is the tag type, [`KeyValue`] unless stated otherwise. Construction only needs `T: Ord`
/// and comparison `T: PartialEq`.
#[derive(Clone, Debug, Serialize)]
#[serde(bound(serialize = "T: Serialize"))]
pub struct Process<T = KeyValue> {
    #[serde(rename = "serviceName")]
    service_name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tags: Vec<T>,
}

impl<T: Ord> Process<T> {
    /// Creates a new Process for the given service name and tags.
    ///
    /// The tags vector is moved into the process and sorted in place, without copying. Because
    /// the process owns it, nobody else can observe or mutate it afterwards. The sort is stable,
    /// already sorted input keeps its order.
    pub fn new(service_name: impl Into<String>, mut tags: Vec<T>) -> Self {
        tags.sort();
        Process {
            service_name: service_name.into(),
            tags,
        }
    }
}

impl<T> Process<T> {
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Tags in canonical order.
    pub fn tags(&self) -> &[T] {
        &self.tags
    }

    pub fn into_parts(self) -> (String, Vec<T>) {
        (self.service_name, self.tags)
    }

    /// Compares two processes by value: same service name, and the same tags at every position.
    pub fn equal(&self, other: &Self) -> bool
    where
        T: PartialEq,
    {
        if self.service_name != other.service_name {
            return false;
        }
        if self.tags.len() != other.tags.len() {
            return false;
        }
        self.tags.iter().zip(&other.tags).all(|(a, b)| a == b)
    }

    /// Stable 64-bit hash of the canonical form, see [`crate::hash_code`].
    pub fn hash_code(&self) -> u64
    where
        T: Hashable,
    {
        hash_code(self)
    }
}

impl<T> Default for Process<T> {
    fn default() -> Self {
        Process {
            service_name: String::new(),
            tags: Vec::new(),
        }
    }
}

impl<T: PartialEq> PartialEq for Process<T> {
    fn eq(&self, other: &Self) -> bool {
        self.equal(other)
    }
}

impl<T: Eq> Eq for Process<T> {}

impl<T: Hash> Hash for Process<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.service_name.hash(state);
        self.tags.hash(state);
    }
}

impl<T: Hashable> Hashable for Process<T> {
    fn hash_into<H: Hasher>(&self, state: &mut H) {
        write_bytes(state, self.service_name.as_bytes());
        self.tags.hash_into(state);
    }
}

// Decoded processes go through `Process::new` so the tags are canonical even when the producer
// did not sort them. A missing or null `tags` field is an empty list.
impl<'de, T> Deserialize<'de> for Process<T>
where
    T: Deserialize<'de> + Ord,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(rename = "Process")]
        struct Encoded<T> {
            #[serde(rename = "serviceName")]
            service_name: String,
            tags: Option<Vec<T>>,
        }

        let encoded = Encoded::<T>::deserialize(deserializer)?;
        Ok(Process::new(encoded.service_name, encoded.tags.unwrap_or_default()))
    }
}
