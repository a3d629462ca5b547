use serde::{Deserialize, Serialize};
use std::fmt;

use super::claims::{decode_claims, Claims, Credential, DecodeError};

/// Closed role set. Anything outside it is not a role; there is no default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Engineer,
    Sales,
    Accountant,
    Admin,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Engineer, Role::Sales, Role::Accountant, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Engineer => "engineer",
            Role::Sales => "sales",
            Role::Accountant => "accountant",
            Role::Admin => "admin",
        }
    }

    /// Fail-closed parse: unknown strings are `None`, never a fallback role.
    pub fn parse(raw: &str) -> Option<Role> {
        match raw {
            "engineer" => Some(Role::Engineer),
            "sales" => Some(Role::Sales),
            "accountant" => Some(Role::Accountant),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticated identity at a point in time. Derived from the credential on
/// every use and never cached independently, so a logout or token swap in
/// one view is visible in the next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub user: Option<String>,
    pub role: Role,
    pub claims: Claims,
}

impl Identity {
    /// Strict derivation with a distinct error per failure shape.
    pub fn try_from_credential(credential: &Credential) -> Result<Identity, DecodeError> {
        let claims = decode_claims(credential)?;
        let raw_role = claims.role.as_deref().ok_or(DecodeError::MissingRole)?;
        let role = Role::parse(raw_role)
            .ok_or_else(|| DecodeError::UnknownRole(raw_role.to_string()))?;
        Ok(Identity { user: claims.sub.clone(), role, claims })
    }

    /// Derivation as the guard sees it: every failure collapses to `None`.
    /// Never partially reports ("logged in but no role" cannot happen).
    pub fn from_credential(credential: &Credential) -> Option<Identity> {
        match Self::try_from_credential(credential) {
            Ok(identity) => Some(identity),
            Err(err) => {
                tracing::debug!("identity.decode rejected: {}", err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;

    fn token_for(payload: &serde_json::Value) -> Credential {
        let engine = &base64::engine::general_purpose::URL_SAFE_NO_PAD;
        let header = engine.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = engine.encode(serde_json::to_vec(payload).unwrap());
        Credential::new(format!("{header}.{body}.sig"))
    }

    #[test]
    fn derives_identity_from_role_claim() {
        let cred = token_for(&serde_json::json!({"sub": "carol", "role": "accountant"}));
        let identity = Identity::from_credential(&cred).unwrap();
        assert_eq!(identity.user.as_deref(), Some("carol"));
        assert_eq!(identity.role, Role::Accountant);
    }

    #[test]
    fn unknown_role_is_not_an_identity() {
        let cred = token_for(&serde_json::json!({"sub": "mallory", "role": "superuser"}));
        assert!(Identity::from_credential(&cred).is_none());
        assert!(matches!(
            Identity::try_from_credential(&cred),
            Err(DecodeError::UnknownRole(r)) if r == "superuser"
        ));
    }

    #[test]
    fn missing_role_is_not_an_identity() {
        let cred = token_for(&serde_json::json!({"sub": "trent"}));
        assert!(matches!(Identity::try_from_credential(&cred), Err(DecodeError::MissingRole)));
        assert!(Identity::from_credential(&cred).is_none());
    }

    #[test]
    fn role_parse_round_trips() {
        for role in Role::ALL {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("Admin"), None);
        assert_eq!(Role::parse(""), None);
    }
}
