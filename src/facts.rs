use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::providers::CiError;
use crate::resolver::{EnvSnapshot, resolve};

/// Everything cisense knows about one environment snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
pub struct CiFacts {
    pub is_ci: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    pub is_pr: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_sha: Option<String>,
}

impl CiFacts {
    /// Collect all facts for one snapshot. A fault on any single fact
    /// (missing companion variable, malformed value, failed git lookup)
    /// propagates; callers that only need one fact should go through the
    /// resolver instead.
    pub fn collect(snapshot: &EnvSnapshot) -> Result<Self, CiError> {
        let Some(provider) = resolve(snapshot) else {
            return Ok(Self::default());
        };
        let pull_request = provider.pull_request()?;
        Ok(Self {
            is_ci: true,
            provider: Some(provider.name().to_string()),
            is_pr: pull_request.is_some(),
            pull_request,
            repository: provider.repository()?,
            commit_sha: provider.commit_sha()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(pairs: &[(&str, &str)]) -> EnvSnapshot {
        EnvSnapshot::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn outside_ci_everything_is_absent() {
        let facts = CiFacts::collect(&snapshot(&[])).unwrap();
        assert_eq!(facts, CiFacts::default());
        assert!(!facts.is_ci);
        assert!(!facts.is_pr);
    }

    #[test]
    fn collects_a_full_travis_pr_build() {
        let facts = CiFacts::collect(&snapshot(&[
            ("TRAVIS", "true"),
            ("TRAVIS_PULL_REQUEST", "38"),
            ("TRAVIS_REPO_SLUG", "acme/widgets"),
            ("TRAVIS_PULL_REQUEST_SHA", "decafbad"),
        ]))
        .unwrap();

        assert!(facts.is_ci);
        assert_eq!(facts.provider.as_deref(), Some("Travis CI"));
        assert!(facts.is_pr);
        assert_eq!(facts.pull_request.as_deref(), Some("38"));
        assert_eq!(facts.repository.as_deref(), Some("acme/widgets"));
        assert_eq!(facts.commit_sha.as_deref(), Some("decafbad"));
    }

    #[test]
    fn false_sentinel_means_not_a_pr() {
        let facts = CiFacts::collect(&snapshot(&[
            ("TRAVIS", "true"),
            ("TRAVIS_PULL_REQUEST", "false"),
            ("TRAVIS_REPO_SLUG", "acme/widgets"),
            ("TRAVIS_PULL_REQUEST_SHA", "decafbad"),
        ]))
        .unwrap();

        assert!(facts.is_ci);
        assert!(!facts.is_pr);
        assert_eq!(facts.pull_request, None);
    }

    #[test]
    fn missing_companion_var_propagates() {
        let err = CiFacts::collect(&snapshot(&[("TRAVIS", "true")])).unwrap_err();
        assert!(err.to_string().contains("TRAVIS_REPO_SLUG"));
    }

    #[test]
    fn absent_fields_are_skipped_in_json() {
        let facts = CiFacts::default();
        let json = serde_json::to_string(&facts).unwrap();
        assert!(json.contains("\"is_ci\":false"));
        assert!(!json.contains("provider"));
        assert!(!json.contains("pull_request"));
        assert!(!json.contains("repository"));
        assert!(!json.contains("commit_sha"));
    }

    #[test]
    fn facts_round_trip_through_json() {
        let facts = CiFacts {
            is_ci: true,
            provider: Some("Drone CI".to_string()),
            is_pr: true,
            pull_request: Some("7".to_string()),
            repository: Some("acme/widgets".to_string()),
            commit_sha: Some("decafbad".to_string()),
        };
        let json = serde_json::to_string(&facts).unwrap();
        let back: CiFacts = serde_json::from_str(&json).unwrap();
        assert_eq!(back, facts);
    }
}
