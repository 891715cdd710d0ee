use serde::{Deserialize, Serialize};

/// Closed role set. Unknown role strings are carried verbatim and grant no
/// capabilities anywhere (deny-by-default).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    SuperAdmin,
    CompanyAdmin,
    CompanyUser,
    LaborStaff,
    CompanyLogistics,
    UniversityLogistics,
    Unknown(String),
}

impl Role {
    pub fn parse(value: &str) -> Self {
        match value {
            "super_admin" => Role::SuperAdmin,
            "company_admin" => Role::CompanyAdmin,
            "company_user" => Role::CompanyUser,
            // "lab_staff" is the pre-v7 wire name
            "labor_staff" | "lab_staff" => Role::LaborStaff,
            "company_logistics" => Role::CompanyLogistics,
            "university_logistics" => Role::UniversityLogistics,
            other => Role::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::CompanyAdmin => "company_admin",
            Role::CompanyUser => "company_user",
            Role::LaborStaff => "labor_staff",
            Role::CompanyLogistics => "company_logistics",
            Role::UniversityLogistics => "university_logistics",
            Role::Unknown(value) => value,
        }
    }

    pub fn is_logistics(&self) -> bool {
        matches!(self, Role::CompanyLogistics | Role::UniversityLogistics)
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Role::parse(&value)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_roles() {
        assert_eq!(Role::parse("super_admin"), Role::SuperAdmin);
        assert_eq!(Role::parse("university_logistics"), Role::UniversityLogistics);
    }

    #[test]
    fn test_legacy_lab_staff_alias() {
        assert_eq!(Role::parse("lab_staff"), Role::LaborStaff);
        assert_eq!(Role::parse("labor_staff"), Role::LaborStaff);
    }

    #[test]
    fn test_unknown_role_round_trips() {
        let role = Role::parse("intern");
        assert_eq!(role, Role::Unknown("intern".to_string()));
        assert_eq!(role.as_str(), "intern");
    }

    #[test]
    fn test_serde_uses_wire_names() {
        let json = serde_json::to_string(&Role::LaborStaff).unwrap();
        assert_eq!(json, "\"labor_staff\"");
        let back: Role = serde_json::from_str("\"company_logistics\"").unwrap();
        assert_eq!(back, Role::CompanyLogistics);
    }
}
