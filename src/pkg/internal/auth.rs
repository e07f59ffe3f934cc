use crate::pkg::internal::lifecycle::{JobRole, parse_role};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Identity forwarded by the gateway in front of the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
    /// `None` for a role string we do not recognise; such callers get no
    /// permissions.
    pub role: Option<JobRole>,
}

impl Caller {
    pub fn new(user_id: &str, role: Option<JobRole>) -> Self {
        Caller {
            user_id: user_id.to_string(),
            role,
        }
    }

    /// Returns `None` when no user id was forwarded.
    pub fn from_parts(user_id: Option<&str>, role: Option<&str>) -> Option<Self> {
        let user_id = user_id.map(str::trim).filter(|u| !u.is_empty())?;
        let role = role.and_then(|r| parse_role(r.trim()));
        Some(Caller::new(user_id, role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_parse_exactly() {
        let caller = Caller::from_parts(Some("u-1"), Some("employer")).unwrap();
        assert_eq!(caller.user_id, "u-1");
        assert_eq!(caller.role, Some(JobRole::Employer));
        let caller = Caller::from_parts(Some("u-2"), Some(" admin ")).unwrap();
        assert_eq!(caller.role, Some(JobRole::Admin));
    }

    #[test]
    fn other_spellings_of_known_roles_get_no_role() {
        for spelling in ["Employer", "ADMIN", " Admin ", "CANDIDATE"] {
            let caller = Caller::from_parts(Some("u-1"), Some(spelling)).unwrap();
            assert_eq!(caller.role, None, "{spelling}");
        }
    }

    #[test]
    fn unknown_or_missing_role_is_kept_as_none() {
        let caller = Caller::from_parts(Some("u-1"), Some("guest")).unwrap();
        assert_eq!(caller.role, None);
        let caller = Caller::from_parts(Some("u-1"), None).unwrap();
        assert_eq!(caller.role, None);
    }

    #[test]
    fn missing_user_id_yields_no_caller() {
        assert!(Caller::from_parts(None, Some("admin")).is_none());
        assert!(Caller::from_parts(Some("   "), Some("admin")).is_none());
    }
}
