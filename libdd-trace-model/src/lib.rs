// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

//! Data model for the process (service) that emits tracing data.
//!
//! A [`Process`] is a service name plus a list of [`KeyValue`] tags kept in canonical (sorted)
//! order, which makes value comparison a positional walk and lets equal processes produce the
//! same [`hash_code`].

pub mod config;
pub mod hash;
pub mod key_value;
pub mod process;
pub mod process_hashtable;

pub use hash::{hash_code, Hashable};
pub use key_value::{KeyValue, KeyValuesExt, Value, ValueType, ValueTypeParseError};
pub use process::Process;
pub use process_hashtable::ProcessHashtable;
