use std::collections::HashMap;

use crate::providers::{CiError, Field, PROVIDERS, ProviderSpec};

/// A read-only view of the process environment, taken once per query.
#[derive(Debug, Clone)]
pub struct EnvSnapshot {
    env_vars: HashMap<String, String>,
}

impl EnvSnapshot {
    pub fn current() -> Self {
        Self {
            env_vars: std::env::vars().collect(),
        }
    }

    /// Build a snapshot from explicit pairs instead of the process
    /// environment. Handy for tests and for resolving against a synthetic
    /// environment.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            env_vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.env_vars.get(key).map(String::as_str)
    }

    /// Presence test, distinguishing an unset key from an empty value.
    pub fn contains(&self, key: &str) -> bool {
        self.env_vars.contains_key(key)
    }
}

/// A provider matched against one snapshot. Lives for a single query;
/// nothing is cached across queries.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedProvider<'a> {
    spec: &'static ProviderSpec,
    snapshot: &'a EnvSnapshot,
}

impl ResolvedProvider<'_> {
    pub fn name(&self) -> &'static str {
        self.spec.name
    }

    /// The PR identifier, or `None` on a non-PR build. The built-in PR
    /// rules are total, so this only carries `Result` for uniformity with
    /// the other facts.
    pub fn pull_request(&self) -> Result<Option<String>, CiError> {
        self.spec
            .pr
            .eval(self.snapshot, self.spec.name, Field::PullRequest)
    }

    pub fn repository(&self) -> Result<Option<String>, CiError> {
        self.spec
            .repo
            .eval(self.snapshot, self.spec.name, Field::Repository)
    }

    pub fn commit_sha(&self) -> Result<Option<String>, CiError> {
        self.spec
            .commit_sha
            .eval(self.snapshot, self.spec.name, Field::CommitSha)
    }
}

/// Scan the provider table in priority order and return the first entry
/// whose detection variable is present in the snapshot.
///
/// Detection looks at presence only; a falsy-looking value still counts.
pub fn resolve(snapshot: &EnvSnapshot) -> Option<ResolvedProvider<'_>> {
    for spec in PROVIDERS {
        if snapshot.contains(spec.detection_var) {
            log::debug!("CI {} detected via {}", spec.name, spec.detection_var);
            return Some(ResolvedProvider { spec, snapshot });
        }
    }
    log::debug!("no CI detected");
    None
}
