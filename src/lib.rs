//! Detect which CI platform the current process is running under and expose
//! a uniform set of facts about the build.
//!
//! Detection scans a fixed, priority-ordered table of providers; the first
//! one whose detection variable is present in the environment wins. Every
//! accessor re-reads the environment, so results always reflect the current
//! process state.
//!
//! ```no_run
//! if cisense::is_ci() {
//!     println!("building on {}", cisense::provider_name().unwrap());
//!     if let Some(pr) = cisense::pull_request()? {
//!         println!("pull request #{pr}");
//!     }
//! }
//! # Ok::<(), cisense::CiError>(())
//! ```

pub mod facts;
pub mod providers;
pub mod resolver;
pub mod vcs;

pub use providers::{CiError, Field};

use resolver::{EnvSnapshot, resolve};

/// True iff some provider's detection variable is present.
pub fn is_ci() -> bool {
    resolve(&EnvSnapshot::current()).is_some()
}

/// True iff a provider is detected and its PR extractor yields a value.
pub fn is_pr() -> bool {
    let snap = EnvSnapshot::current();
    match resolve(&snap) {
        Some(provider) => matches!(provider.pull_request(), Ok(Some(_))),
        None => false,
    }
}

/// Display name of the detected provider, e.g. `"Travis CI"`.
pub fn provider_name() -> Option<&'static str> {
    resolve(&EnvSnapshot::current()).map(|p| p.name())
}

/// The PR identifier under test, or `None` outside CI or on a non-PR build.
pub fn pull_request() -> Result<Option<String>, CiError> {
    let snap = EnvSnapshot::current();
    match resolve(&snap) {
        Some(provider) => provider.pull_request(),
        None => Ok(None),
    }
}

/// The source repository identifier, or `None` outside CI.
pub fn repository() -> Result<Option<String>, CiError> {
    let snap = EnvSnapshot::current();
    match resolve(&snap) {
        Some(provider) => provider.repository(),
        None => Ok(None),
    }
}

/// The commit SHA under test, or `None` outside CI. On CodeBuild this shells
/// out to `git rev-parse HEAD`; a failure there surfaces as
/// [`CiError::Vcs`] without affecting the other facts.
pub fn commit_sha() -> Result<Option<String>, CiError> {
    let snap = EnvSnapshot::current();
    match resolve(&snap) {
        Some(provider) => provider.commit_sha(),
        None => Ok(None),
    }
}
