//! Environment snapshots.
//!
//! Task bodies never read the process environment directly. The caller takes
//! a snapshot (usually [`Env::from_process`] with command-line `KEY=VALUE`
//! overrides layered on top) and passes it down at execution time.

use std::collections::BTreeMap;

/// Run only this test file instead of the configured list.
pub const TEST: &str = "TEST";
/// Options handed to rcov verbatim, replacing the configured `rcov_opts`.
pub const RCOVOPTS: &str = "RCOVOPTS";
/// Explicit path to the rcov executable.
pub const RCOVPATH: &str = "RCOVPATH";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Env {
    vars: BTreeMap<String, String>,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the current process environment. Non-UTF-8 names or values
    /// are converted lossily.
    pub fn from_process() -> Self {
        let vars = std::env::vars_os()
            .map(|(key, value)| {
                (
                    key.to_string_lossy().into_owned(),
                    value.to_string_lossy().into_owned(),
                )
            })
            .collect();
        Self { vars }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.vars.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Absorb `KEY=VALUE` words into the snapshot and hand back every other
    /// word in its original order.
    ///
    /// A word counts as an assignment when it contains `=` and the part before
    /// it is a non-empty name, so `TEST=a=b.rb` sets `TEST` to `a=b.rb`.
    pub fn apply_assignments<I, S>(&mut self, words: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut rest = Vec::new();
        for word in words {
            let word = word.into();
            match word.split_once('=') {
                Some((key, value)) if is_variable_name(key) => {
                    tracing::debug!(key, value, "environment override");
                    self.set(key, value);
                }
                _ => rest.push(word),
            }
        }
        rest
    }
}

/// `[A-Za-z0-9_]+`, so flag-looking words such as `--trace=x` stay task names.
fn is_variable_name(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

impl<K, V> FromIterator<(K, V)> for Env
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}
