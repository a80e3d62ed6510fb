//! Integration tests for the Sentinel core library.

use sentinel_core::error::{ConfigError, Error, PermissionError, Result};
use sentinel_core::types::{Identity, Principal, ResourcePath, DEFAULT_SEPARATOR};
use sentinel_core::utils::LogLevel;

/// A principal backed by a session rather than a plain name.
struct Session {
    user: String,
    token: u64,
}

impl Principal for Session {
    fn name(&self) -> &str {
        &self.user
    }
}

fn guard(principal: &dyn Principal, resource: &str, denied: &[&str]) -> Result<()> {
    let path = ResourcePath::parse(resource, DEFAULT_SEPARATOR);
    let blocked = path
        .ancestors()
        .any(|(_, name)| denied.contains(&name.as_str()));

    if blocked {
        return Err(PermissionError::Forbidden(format!("{} on {}", principal.name(), resource)).into());
    }
    Ok(())
}

#[test]
fn test_custom_principal_through_dyn() {
    let session = Session {
        user: "alice".to_string(),
        token: 7,
    };
    assert_eq!(session.token, 7);

    assert!(guard(&session, "Sales.Invoice", &["Hr"]).is_ok());

    let err = guard(&session, "Hr.Payslip.Read", &["Hr"]).unwrap_err();
    assert!(matches!(err, Error::Permission(PermissionError::Forbidden(_))));
    assert!(err.to_string().contains("alice on Hr.Payslip.Read"));
}

#[test]
fn test_identity_and_path_together() {
    let identity = Identity::new("bob");
    let path = ResourcePath::parse("A.B.C", DEFAULT_SEPARATOR);

    let keys: Vec<String> = path
        .ancestors()
        .map(|(_, name)| format!("{}:{}", identity.name(), name))
        .collect();
    assert_eq!(keys, vec!["bob:A.B.C", "bob:A.B", "bob:A"]);
}

#[test]
fn test_log_level_parse_error_is_config_error() {
    let err: Error = "loud".parse::<LogLevel>().unwrap_err().into();
    assert!(matches!(err, Error::Config(ConfigError::Invalid(_))));
}
