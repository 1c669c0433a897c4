//! Credential tokens injected as session cookies.
//!
//! The site gates everything behind a logged-in session carried by a fixed
//! set of cookies. Values come from the environment; the core never
//! interprets them beyond cookie injection.

use tracing::{debug, warn};

/// Cookie name → environment variable supplying its value.
///
/// The Kakao SSO tokens use their cookie names verbatim as variable names;
/// the site access token follows the conventional upper-case form.
pub const CREDENTIAL_TOKENS: &[(&str, &str)] = &[
    ("_kau", "_kau"),
    ("_kahai", "_kahai"),
    ("_karmt", "_karmt"),
    ("_kawlt", "_kawlt"),
    ("access_token", "ACCESS_TOKEN"),
];

/// One named credential with a present value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub name: String,
    pub value: String,
}

/// The populated subset of the fixed credential tokens.
///
/// Missing entries are a per-token warning at load time; whether an entirely
/// empty set is fatal is the authenticator's call.
#[derive(Debug, Clone, Default)]
pub struct CredentialSet {
    tokens: Vec<Credential>,
}

impl CredentialSet {
    /// Load the fixed token set from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load the fixed token set through an arbitrary lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut tokens = Vec::new();
        for (cookie_name, env_var) in CREDENTIAL_TOKENS {
            match lookup(env_var).filter(|v| !v.is_empty()) {
                Some(value) => {
                    debug!("credential token present: {cookie_name}");
                    tokens.push(Credential {
                        name: (*cookie_name).to_string(),
                        value,
                    });
                }
                None => warn!("missing credential token: {cookie_name} (from {env_var})"),
            }
        }
        Self { tokens }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Credential> {
        self.tokens.iter()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_credential_set_loads_with_the_present_tokens() {
        let set = CredentialSet::from_lookup(|var| {
            if var == "ACCESS_TOKEN" {
                None
            } else {
                Some(format!("value-for-{var}"))
            }
        });
        assert_eq!(set.len(), 4);
        assert!(set.iter().all(|c| c.name != "access_token"));
    }

    #[test]
    fn empty_environment_yields_an_empty_set() {
        let set = CredentialSet::from_lookup(|_| None);
        assert!(set.is_empty());
    }

    #[test]
    fn blank_values_count_as_missing() {
        let set = CredentialSet::from_lookup(|_| Some(String::new()));
        assert!(set.is_empty());
    }

    #[test]
    fn cookie_names_follow_the_fixed_table() {
        let set = CredentialSet::from_lookup(|_| Some("x".into()));
        let names: Vec<_> = set.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["_kau", "_kahai", "_karmt", "_kawlt", "access_token"]);
    }
}
