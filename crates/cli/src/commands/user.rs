//! User management commands.
//!
//! ```bash
//! # Create or update a user
//! mh-cli user create -k user_2abc -e owner@example.com -r owner
//!
//! # Change a user's role
//! mh-cli user role -k user_2abc -r super_admin
//! ```

use menuhub_core::{Email, UserKey, UserRole};
use menuhub_server::db::UserRepository;
use menuhub_server::models::user::UpsertUser;

use super::{CommandError, connect};

fn parse_key(key: &str) -> Result<UserKey, CommandError> {
    UserKey::new(key).ok_or_else(|| CommandError::Input(format!("invalid user key: {key}")))
}

fn parse_role(role: &str) -> Result<UserRole, CommandError> {
    role.parse().map_err(|_| {
        CommandError::Input(format!(
            "invalid role: {role}. Valid roles: super_admin, owner, manager, admin"
        ))
    })
}

/// Create a user, or update the one with the same key.
///
/// # Errors
///
/// Returns `CommandError` for an invalid key, email or role, or if the
/// database write fails.
pub async fn create(
    key: &str,
    email: Option<&str>,
    name: Option<&str>,
    role: &str,
) -> Result<(), CommandError> {
    let key = parse_key(key)?;
    let role = parse_role(role)?;
    let email = email
        .map(Email::parse)
        .transpose()
        .map_err(|e| CommandError::Input(e.to_string()))?;
    let (first_name, last_name) = match name.map(str::trim) {
        Some(full) => match full.split_once(' ') {
            Some((first, last)) => (Some(first.to_owned()), Some(last.trim().to_owned())),
            None => (Some(full.to_owned()), None),
        },
        None => (None, None),
    };
    let input = UpsertUser {
        email,
        first_name,
        last_name,
        restaurant_name: None,
        role: Some(role),
    }
    .normalized()?;

    let pool = connect().await?;
    let user = UserRepository::new(&pool).upsert(&key, &input).await?;
    tracing::info!(user = %user.id, role = %user.role, "User saved");
    Ok(())
}

/// Change a user's role.
///
/// # Errors
///
/// Returns `CommandError` for an invalid key or role, or
/// `CommandError::Repository` if the user does not exist.
pub async fn set_role(key: &str, role: &str) -> Result<(), CommandError> {
    let key = parse_key(key)?;
    let role = parse_role(role)?;

    let pool = connect().await?;
    let user = UserRepository::new(&pool).set_role(&key, role).await?;
    tracing::info!(user = %user.id, role = %user.role, "Role updated");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_role() {
        assert_eq!(parse_role("owner").unwrap(), UserRole::Owner);
        assert!(matches!(parse_role("root"), Err(CommandError::Input(_))));
    }

    #[test]
    fn test_parse_key_rejects_blank() {
        assert!(parse_key("user_2abc").is_ok());
        assert!(parse_key("  ").is_err());
    }
}
