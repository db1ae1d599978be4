/// User record and request/response bodies

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{Identity, Role, TokenPair};

const DEFAULT_RECORDS_PER_PAGE: usize = 10;
const DEFAULT_PAGE: usize = 1;

/// A user as held by the user store
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct User {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub role: Role,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub token: Option<String>,
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.user_id.clone(),
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            role: self.role,
        }
    }
}

/// Token fields persisted against a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredTokens {
    pub token: String,
    pub refresh_token: String,
    pub updated_at: DateTime<Utc>,
}

impl StoredTokens {
    pub fn new(pair: &TokenPair, updated_at: DateTime<Utc>) -> Self {
        Self {
            token: pair.access_token.clone(),
            refresh_token: pair.refresh_token.clone(),
            updated_at,
        }
    }
}

/// POST /signup body
#[derive(Deserialize)]
pub struct SignupRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    #[serde(alias = "user_type")]
    pub role: Role,
}

/// POST /login body
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub inserted_id: String,
}

/// One page of users plus the overall count
#[derive(Debug, Serialize)]
pub struct UserPage {
    pub total_count: u64,
    pub user_items: Vec<User>,
}

/// Raw `recordPerPage` / `page` query parameters
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(rename = "recordPerPage")]
    pub record_per_page: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub record_per_page: usize,
    pub page: usize,
}

impl Pagination {
    /// Missing, unparsable, or sub-1 values fall back to the defaults.
    pub fn from_query(query: &PageQuery) -> Self {
        Self {
            record_per_page: parse_positive(query.record_per_page.as_deref())
                .unwrap_or(DEFAULT_RECORDS_PER_PAGE),
            page: parse_positive(query.page.as_deref()).unwrap_or(DEFAULT_PAGE),
        }
    }

    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.record_per_page)
    }

    pub fn limit(&self) -> usize {
        self.record_per_page
    }
}

fn parse_positive(raw: Option<&str>) -> Option<usize> {
    raw.and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|value| *value >= 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(record_per_page: Option<&str>, page: Option<&str>) -> PageQuery {
        PageQuery {
            record_per_page: record_per_page.map(str::to_string),
            page: page.map(str::to_string),
        }
    }

    #[test]
    fn test_pagination_defaults() {
        let pagination = Pagination::from_query(&PageQuery::default());

        assert_eq!(pagination, Pagination { record_per_page: 10, page: 1 });
        assert_eq!(pagination.offset(), 0);
    }

    #[test]
    fn test_pagination_clamps_invalid_values() {
        let cases = vec![
            (query(Some("0"), Some("0")), 10, 1),
            (query(Some("-5"), Some("-1")), 10, 1),
            (query(Some("abc"), Some("2.5")), 10, 1),
            (query(Some("25"), Some("3")), 25, 3),
        ];

        for (query, per_page, page) in cases {
            let pagination = Pagination::from_query(&query);
            assert_eq!(pagination.record_per_page, per_page);
            assert_eq!(pagination.page, page);
        }
    }

    #[test]
    fn test_pagination_offset() {
        let pagination = Pagination::from_query(&query(Some("10"), Some("2")));

        assert_eq!(pagination.offset(), 10);
        assert_eq!(pagination.limit(), 10);
    }

    #[test]
    fn test_signup_accepts_user_type_alias() {
        let body = serde_json::json!({
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email": "a@x.com",
            "phone": "5551234",
            "password": "secret123",
            "user_type": "ADMIN"
        });
        let request: SignupRequest = serde_json::from_value(body).unwrap();

        assert_eq!(request.role, Role::Admin);
    }

    #[test]
    fn test_password_hash_is_never_serialized() {
        let user = User {
            user_id: "u1".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "a@x.com".to_string(),
            phone: "5551234".to_string(),
            role: Role::User,
            password_hash: "$2b$04$secret".to_string(),
            token: None,
            refresh_token: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let value = serde_json::to_value(&user).unwrap();

        assert!(value.get("password_hash").is_none());
        assert_eq!(value["role"], "USER");
    }
}
