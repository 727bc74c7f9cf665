// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::hash::Hashable;
use crate::key_value::KeyValue;
use crate::process::Process;
use std::collections::HashMap;
use tracing::debug;

struct Entry<T> {
    key: String,
    process: Process<T>,
}

/// Deduplicates processes and hands out short reference keys (`p1`, `p2`, ...), so a payload
/// carrying many spans can reference each distinct process once.
///
/// Processes are bucketed by hash code and then compared with [`Process::equal`], so two
/// different processes colliding on the hash still get different keys.
pub struct ProcessHashtable<T = KeyValue> {
    count: usize,
    processes: HashMap<u64, Vec<Entry<T>>>,
    hash_fn: fn(&Process<T>) -> u64,
}

impl<T: Hashable> ProcessHashtable<T> {
    pub fn new() -> Self {
        Self::with_hasher(Process::hash_code)
    }
}

impl<T: Hashable> Default for ProcessHashtable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ProcessHashtable<T> {
    /// Uses `hash_fn` instead of [`Process::hash_code`] to bucket processes.
    pub fn with_hasher(hash_fn: fn(&Process<T>) -> u64) -> Self {
        ProcessHashtable {
            count: 0,
            processes: HashMap::new(),
            hash_fn,
        }
    }

    /// Returns the key of `process`, storing a copy under a new key if no equal process was added
    /// before.
    pub fn add(&mut self, process: &Process<T>) -> String
    where
        T: PartialEq + Clone,
    {
        let hash = (self.hash_fn)(process);
        let bucket = self.processes.entry(hash).or_default();
        if let Some(entry) = bucket.iter().find(|entry| entry.process.equal(process)) {
            return entry.key.clone();
        }
        if !bucket.is_empty() {
            debug!(
                hash,
                service_name = process.service_name(),
                bucket_size = bucket.len(),
                "Process hash collision"
            );
        }

        self.count += 1;
        let key = format!("p{}", self.count);
        debug!(key = %key, service_name = process.service_name(), "New process key");
        bucket.push(Entry {
            key: key.clone(),
            process: process.clone(),
        });
        key
    }

    pub fn get(&self, key: &str) -> Option<&Process<T>> {
        self.entries()
            .find(|entry| entry.key == key)
            .map(|entry| &entry.process)
    }

    /// Number of distinct processes.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns key to process for every distinct process added so far.
    pub fn mapping(&self) -> HashMap<&str, &Process<T>> {
        self.entries()
            .map(|entry| (entry.key.as_str(), &entry.process))
            .collect()
    }

    pub fn into_mapping(self) -> HashMap<String, Process<T>> {
        self.processes
            .into_values()
            .flatten()
            .map(|entry| (entry.key, entry.process))
            .collect()
    }

    fn entries(&self) -> impl Iterator<Item = &Entry<T>> {
        self.processes.values().flatten()
    }
}
