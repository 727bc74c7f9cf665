// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::key_value::KeyValue;
use crate::process::Process;
use std::env;
use tracing::{debug, warn};

pub const DEFAULT_SERVICE_NAME: &str = "unnamed-service";

const ENV_SERVICE: &str = "DD_SERVICE";
const ENV_ENV: &str = "DD_ENV";
const ENV_VERSION: &str = "DD_VERSION";
const ENV_TAGS: &str = "DD_TAGS";

const TAG_ENV: &str = "env";
const TAG_VERSION: &str = "version";

/// Process description read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessConfig {
    pub service_name: String,
    pub env: Option<String>,
    pub version: Option<String>,
    /// Tags from `DD_TAGS`, in the order they were listed.
    pub tags: Vec<KeyValue>,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        ProcessConfig {
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            env: None,
            version: None,
            tags: Vec::new(),
        }
    }
}

impl ProcessConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env_value(name, env::var(name)))
    }

    /// Reads the configuration through `lookup`, which maps a variable name to its value. Empty
    /// values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let str_not_empty = |name: &str| lookup(name).filter(|s| !s.is_empty());

        let tags = match str_not_empty(ENV_TAGS) {
            Some(raw) => {
                let tags = parse_tags_lenient(&raw);
                debug!(count = tags.len(), "Parsed {ENV_TAGS}");
                tags
            }
            None => Vec::new(),
        };

        ProcessConfig {
            service_name: str_not_empty(ENV_SERVICE)
                .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string()),
            env: str_not_empty(ENV_ENV),
            version: str_not_empty(ENV_VERSION),
            tags,
        }
    }

    /// Parses a list of `key:value` tags separated by commas or spaces. Values may contain
    /// colons. Fails on the first malformed tag.
    pub fn parse_tags(raw: &str) -> anyhow::Result<Vec<KeyValue>> {
        chunks(raw).map(parse_tag).collect()
    }

    /// Builds the canonical process. `env` and `version` replace any tag with the same key
    /// coming from `DD_TAGS`.
    pub fn into_process(self) -> Process {
        let ProcessConfig {
            service_name,
            env,
            version,
            mut tags,
        } = self;
        for (key, value) in [(TAG_ENV, env), (TAG_VERSION, version)] {
            if let Some(value) = value {
                tags.retain(|kv| kv.key != key);
                tags.push(KeyValue::string(key, value));
            }
        }
        Process::new(service_name, tags)
    }
}

/// Values that are not valid unicode are treated as unset.
fn env_value(name: &str, value: Result<String, env::VarError>) -> Option<String> {
    match value {
        Ok(value) => Some(value),
        Err(env::VarError::NotPresent) => None,
        Err(e @ env::VarError::NotUnicode(_)) => {
            warn!("Ignoring {name}: {e}");
            None
        }
    }
}

fn chunks(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(&[',', ' '][..]).filter(|chunk| !chunk.is_empty())
}

fn parse_tag(chunk: &str) -> anyhow::Result<KeyValue> {
    let Some((key, value)) = chunk.split_once(':') else {
        anyhow::bail!("tag '{chunk}' is missing a colon");
    };
    anyhow::ensure!(!key.is_empty(), "tag '{chunk}' has an empty key");
    anyhow::ensure!(!value.is_empty(), "tag '{chunk}' has an empty value");
    Ok(KeyValue::string(key, value))
}

fn parse_tags_lenient(raw: &str) -> Vec<KeyValue> {
    chunks(raw)
        .filter_map(|chunk| match parse_tag(chunk) {
            Ok(tag) => Some(tag),
            Err(e) => {
                warn!("Skipping malformed {ENV_TAGS} entry: {e}");
                None
            }
        })
        .collect()
}
