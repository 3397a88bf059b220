use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::resolver::EnvSnapshot;
use crate::vcs;

/// The facts a provider can be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    PullRequest,
    Repository,
    CommitSha,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Field::PullRequest => "pull request",
            Field::Repository => "repository",
            Field::CommitSha => "commit sha",
        };
        f.write_str(s)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CiError {
    /// A provider was detected but a variable its extractor unconditionally
    /// expects is unset. Distinct from "no CI": detection already succeeded.
    #[error("{provider} was detected but {var} is not set (needed for the {field})")]
    MissingVar {
        provider: &'static str,
        field: Field,
        var: &'static str,
    },
    #[error("{provider} set {var}={value:?}, which does not look like {expected}")]
    MalformedValue {
        provider: &'static str,
        field: Field,
        var: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("version control lookup failed: {0}")]
    Vcs(#[from] vcs::VcsError),
}

// CODEBUILD_SOURCE_REPO_URL=https://github.com/owner/repo.git
static GITHUB_REPO_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r".+github\.com/(?P<repo>.+/.+)\.git").expect("hardcoded pattern compiles")
});

/// How one fact is pulled out of an environment snapshot.
///
/// PR rules only ever use the total variants (`Optional`, `FalseIsAbsent`,
/// `SplitSegment`): a missing PR indicator means "not a PR build", never an
/// error. Repo and commit rules use the fallible variants, where a missing
/// variable under an already-detected provider is a [`CiError::MissingVar`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractRule {
    /// The variable must be set once the provider is detected.
    Required(&'static str),
    /// Missing variable maps to absence.
    Optional(&'static str),
    /// Missing variable or the literal value `"false"` maps to absence.
    FalseIsAbsent(&'static str),
    /// Two required variables joined with `/` (owner + repo name).
    Join(&'static str, &'static str),
    /// Split an optional variable on `/` and take one segment; absent when
    /// the variable is unset or has too few segments.
    SplitSegment(&'static str, usize),
    /// Required variable holding a GitHub clone URL; the captured
    /// `owner/repo` is the fact value.
    GithubRepoUrl(&'static str),
    /// No environment variable carries the value; ask git instead.
    VcsHead,
}

impl ExtractRule {
    pub fn eval(
        &self,
        snap: &EnvSnapshot,
        provider: &'static str,
        field: Field,
    ) -> Result<Option<String>, CiError> {
        match *self {
            ExtractRule::Required(var) => match snap.get(var) {
                Some(value) => Ok(Some(value.to_string())),
                None => Err(CiError::MissingVar {
                    provider,
                    field,
                    var,
                }),
            },
            ExtractRule::Optional(var) => Ok(snap.get(var).map(str::to_string)),
            ExtractRule::FalseIsAbsent(var) => Ok(snap
                .get(var)
                .filter(|value| *value != "false")
                .map(str::to_string)),
            ExtractRule::Join(owner_var, name_var) => {
                let owner = ExtractRule::Required(owner_var).eval(snap, provider, field)?;
                let name = ExtractRule::Required(name_var).eval(snap, provider, field)?;
                Ok(owner.zip(name).map(|(o, n)| format!("{}/{}", o, n)))
            }
            ExtractRule::SplitSegment(var, index) => Ok(snap
                .get(var)
                .and_then(|value| value.split('/').nth(index))
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)),
            ExtractRule::GithubRepoUrl(var) => {
                let url = match snap.get(var) {
                    Some(url) => url,
                    None => {
                        return Err(CiError::MissingVar {
                            provider,
                            field,
                            var,
                        });
                    }
                };
                match GITHUB_REPO_URL.captures(url).and_then(|c| c.name("repo")) {
                    Some(repo) => Ok(Some(repo.as_str().to_string())),
                    None => Err(CiError::MalformedValue {
                        provider,
                        field,
                        var,
                        value: url.to_string(),
                        expected: "a github.com clone URL ending in .git",
                    }),
                }
            }
            ExtractRule::VcsHead => Ok(Some(vcs::head_commit()?)),
        }
    }
}

/// One supported CI platform: a detection variable plus one extraction rule
/// per fact.
#[derive(Debug, Clone, Copy)]
pub struct ProviderSpec {
    pub name: &'static str,
    pub detection_var: &'static str,
    pub pr: ExtractRule,
    pub repo: ExtractRule,
    pub commit_sha: ExtractRule,
}

/// The built-in providers, in resolution priority order.
///
/// Order is load-bearing: nested or cross-provider environments can export
/// more than one detection variable, and the first present entry wins.
pub const PROVIDERS: &[ProviderSpec] = &[
    // https://docs.travis-ci.com/user/environment-variables
    ProviderSpec {
        name: "Travis CI",
        detection_var: "TRAVIS",
        pr: ExtractRule::FalseIsAbsent("TRAVIS_PULL_REQUEST"),
        repo: ExtractRule::Required("TRAVIS_REPO_SLUG"),
        commit_sha: ExtractRule::Required("TRAVIS_PULL_REQUEST_SHA"),
    },
    // https://circleci.com/docs/1.0/environment-variables
    // CIRCLE_PR_NUMBER only exists on forked-PR builds.
    ProviderSpec {
        name: "Circle CI",
        detection_var: "CIRCLECI",
        pr: ExtractRule::Optional("CIRCLE_PR_NUMBER"),
        repo: ExtractRule::Join("CIRCLE_PROJECT_USERNAME", "CIRCLE_PROJECT_REPONAME"),
        commit_sha: ExtractRule::Required("CIRCLE_SHA1"),
    },
    // https://www.appveyor.com/docs/environment-variables
    ProviderSpec {
        name: "AppVeyor",
        detection_var: "APPVEYOR",
        pr: ExtractRule::Optional("APPVEYOR_PULL_REQUEST_NUMBER"),
        repo: ExtractRule::Required("APPVEYOR_REPO_NAME"),
        commit_sha: ExtractRule::Required("APPVEYOR_REPO_COMMIT"),
    },
    // http://docs.shippable.com/ci/env-vars/#stdEnv
    ProviderSpec {
        name: "Shippable",
        detection_var: "SHIPPABLE",
        pr: ExtractRule::Optional("PULL_REQUEST"),
        repo: ExtractRule::Required("SHIPPABLE_REPO_SLUG"),
        commit_sha: ExtractRule::Required("COMMIT"),
    },
    // https://semaphoreci.com/docs/available-environment-variables.html
    ProviderSpec {
        name: "Semaphore",
        detection_var: "SEMAPHORE",
        pr: ExtractRule::Optional("PULL_REQUEST_NUMBER"),
        repo: ExtractRule::Required("SEMAPHORE_REPO_SLUG"),
        commit_sha: ExtractRule::Required("REVISION"),
    },
    // https://docs.aws.amazon.com/codebuild/latest/userguide/build-env-ref-env-vars.html
    // CODEBUILD_SOURCE_VERSION=pr/1; no variable carries the commit.
    ProviderSpec {
        name: "CodeBuild",
        detection_var: "CODEBUILD_BUILD_ID",
        pr: ExtractRule::SplitSegment("CODEBUILD_SOURCE_VERSION", 1),
        repo: ExtractRule::GithubRepoUrl("CODEBUILD_SOURCE_REPO_URL"),
        commit_sha: ExtractRule::VcsHead,
    },
    // https://docs.microsoft.com/en-us/azure/devops/pipelines/build/variables
    // Variables with '.' in the name have the dot replaced with underscore
    // in the actual environment.
    ProviderSpec {
        name: "Azure DevOps",
        detection_var: "AZURE_HTTP_USER_AGENT",
        pr: ExtractRule::Optional("SYSTEM_PULLREQUEST_PULLREQUESTNUMBER"),
        repo: ExtractRule::Required("BUILD_REPOSITORY_ID"),
        commit_sha: ExtractRule::Required("BUILD_SOURCEVERSION"),
    },
    // https://docs.tea-ci.org/usage/variables/
    ProviderSpec {
        name: "Drone CI",
        detection_var: "DRONE",
        pr: ExtractRule::Optional("DRONE_PULL_REQUEST"),
        repo: ExtractRule::Required("DRONE_REPO"),
        commit_sha: ExtractRule::Required("DRONE_COMMIT"),
    },
    // https://docs.github.com/en/actions/reference/environment-variables
    // On PRs, GITHUB_REF takes the format refs/pull/:prNumber/merge.
    ProviderSpec {
        name: "GitHub Actions",
        detection_var: "GITHUB_ACTIONS",
        pr: ExtractRule::SplitSegment("GITHUB_REF", 2),
        repo: ExtractRule::Required("GITHUB_REPOSITORY"),
        commit_sha: ExtractRule::Required("GITHUB_SHA"),
    },
];
