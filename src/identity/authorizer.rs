use serde::{Deserialize, Serialize};
use std::fmt;

use super::principal::Role;

/// Named permission gating a UI surface or route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ViewProjects,
    UseMeasure,
    ViewQuotes,
    ViewAccounting,
    ViewHr,
    ViewActivity,
}

impl Capability {
    pub const ALL: [Capability; 6] = [
        Capability::ViewProjects,
        Capability::UseMeasure,
        Capability::ViewQuotes,
        Capability::ViewAccounting,
        Capability::ViewHr,
        Capability::ViewActivity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ViewProjects => "view_projects",
            Capability::UseMeasure => "use_measure",
            Capability::ViewQuotes => "view_quotes",
            Capability::ViewAccounting => "view_accounting",
            Capability::ViewHr => "view_hr",
            Capability::ViewActivity => "view_activity",
        }
    }

    pub fn parse(raw: &str) -> Option<Capability> {
        Capability::ALL.into_iter().find(|c| c.as_str() == raw)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The complete authorization policy, as a static table. Every arm is
/// deny-by-default: a capability is granted only to the roles named here.
pub fn can(role: Role, capability: Capability) -> bool {
    match capability {
        // Every authenticated role reaches projects and the measure tool.
        Capability::ViewProjects | Capability::UseMeasure => true,
        Capability::ViewQuotes => matches!(role, Role::Sales | Role::Admin),
        Capability::ViewAccounting => matches!(role, Role::Accountant | Role::Admin),
        Capability::ViewHr | Capability::ViewActivity => matches!(role, Role::Admin),
    }
}

/// Granted set for a role, in declaration order. Drives nav rendering.
pub fn capabilities_for(role: Role) -> Vec<Capability> {
    Capability::ALL.into_iter().filter(|c| can(role, *c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_holds_every_capability() {
        assert_eq!(capabilities_for(Role::Admin), Capability::ALL.to_vec());
    }

    #[test]
    fn engineer_is_scoped_to_projects_and_measure() {
        assert_eq!(
            capabilities_for(Role::Engineer),
            vec![Capability::ViewProjects, Capability::UseMeasure]
        );
    }

    #[test]
    fn capability_parse_round_trips() {
        for cap in Capability::ALL {
            assert_eq!(Capability::parse(cap.as_str()), Some(cap));
        }
        assert_eq!(Capability::parse("view_everything"), None);
    }
}
