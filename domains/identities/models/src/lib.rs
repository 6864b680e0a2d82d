use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Authority {
    Admin,
    User,
}

impl Authority {
    /// Text form stored in the `identity.authority` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Authority::Admin => "ADMIN",
            Authority::User => "USER",
        }
    }

    pub fn from_str_or_user(value: &str) -> Self {
        match value {
            "ADMIN" => Authority::Admin,
            _ => Authority::User,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Identity {
    pub id: Uuid,
    pub authority: Authority,
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub enabled: bool,
    pub firstname: String,
    pub lastname: String,
    pub patronymic: String,
    pub image_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authority_column_round_trip() {
        assert_eq!(Authority::Admin.as_str(), "ADMIN");
        assert_eq!(Authority::from_str_or_user("ADMIN"), Authority::Admin);
        assert_eq!(Authority::from_str_or_user("USER"), Authority::User);
        assert_eq!(Authority::from_str_or_user("junk"), Authority::User);
    }
}
