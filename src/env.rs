//! Process environment variable helpers

use std::env;

use crate::error::{Error, Result};

/// Reject input that `std::env::set_var` would panic on
fn validate(name: &str, value: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidEnvVar("name is empty".to_string()));
    }
    if name.contains('=') {
        return Err(Error::InvalidEnvVar(format!("name `{}` contains '='", name)));
    }
    if name.contains('\0') {
        return Err(Error::InvalidEnvVar(format!(
            "name `{}` contains a NUL byte",
            name.escape_default()
        )));
    }
    if value.contains('\0') {
        return Err(Error::InvalidEnvVar(format!(
            "value of `{}` contains a NUL byte",
            name
        )));
    }
    Ok(())
}

/// Set a variable in the current process environment
pub fn set_env_var(name: &str, value: &str) -> Result<()> {
    validate(name, value)?;
    tracing::trace!("Setting environment variable {}", name);
    env::set_var(name, value);
    Ok(())
}

/// Value of a variable, `None` if it is unset or not valid unicode
pub fn get_env_var(name: &str) -> Option<String> {
    env::var(name).ok()
}

/// Remove a variable; does nothing if it is unset or the name is invalid
pub fn unset_env_var(name: &str) {
    if validate(name, "").is_ok() && env_var_exists(name) {
        env::remove_var(name);
    }
}

pub fn env_var_exists(name: &str) -> bool {
    validate(name, "").is_ok() && env::var_os(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_env_variables() {
        let name = "CPPLIBHUB_DUMMY_ENV_VAR";
        unset_env_var(name);

        assert!(!env_var_exists(name));
        assert_eq!(get_env_var(name), None);

        set_env_var(name, "exists").unwrap();
        assert!(env_var_exists(name));
        assert_eq!(get_env_var(name).as_deref(), Some("exists"));

        unset_env_var(name);
        assert!(!env_var_exists(name));

        // Unsetting twice is fine
        unset_env_var(name);
    }

    #[test]
    #[serial]
    fn test_empty_value_still_exists() {
        let name = "CPPLIBHUB_EMPTY_ENV_VAR";
        set_env_var(name, "").unwrap();
        assert!(env_var_exists(name));
        assert_eq!(get_env_var(name).as_deref(), Some(""));
        unset_env_var(name);
    }

    #[test]
    #[serial]
    fn test_invalid_names_and_values_are_errors() {
        assert!(matches!(set_env_var("", "x"), Err(Error::InvalidEnvVar(_))));
        assert!(matches!(set_env_var("A=B", "x"), Err(Error::InvalidEnvVar(_))));
        assert!(matches!(set_env_var("A\0B", "x"), Err(Error::InvalidEnvVar(_))));
        assert!(matches!(
            set_env_var("CPPLIBHUB_NUL_VALUE", "a\0b"),
            Err(Error::InvalidEnvVar(_))
        ));
        assert!(!env_var_exists("CPPLIBHUB_NUL_VALUE"));

        // Invalid names never panic on lookup or removal either
        assert!(!env_var_exists(""));
        assert!(!env_var_exists("A=B"));
        assert_eq!(get_env_var("A=B"), None);
        unset_env_var("");
        unset_env_var("A=B");
    }
}
