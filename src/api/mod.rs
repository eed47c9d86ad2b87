//! Backend access: request/response types and the [`UserApi`] seam.
//!
//! Screens talk to the backend only through [`UserApi`], so they can be driven
//! by the HTTP client in production and by an in-memory stub in tests.

pub mod http;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::model::{Gender, UserRecord, UserRole, UserStatus};

pub use http::HttpUserApi;

/// The envelope every non-search endpoint answers with.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BaseResponse<T> {
    pub code: i64,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl<T> BaseResponse<T> {
    pub fn ok(data: T) -> Self {
        Self { code: 0, data: Some(data), message: Some("ok".into()), description: Some(String::new()) }
    }

    pub fn fail(code: i64, description: impl Into<String>) -> Self {
        Self { code, data: None, message: None, description: Some(description.into()) }
    }

    fn refusal(&self) -> ApiError {
        ApiError::business(self.code, self.description.clone())
    }

    /// Unwrap a payload-carrying reply: `code == 0` and a payload present.
    pub fn into_data(self) -> ApiResult<T> {
        if self.code != 0 {
            return Err(self.refusal());
        }
        let code = self.code;
        let description = self.description;
        self.data.ok_or(ApiError::Business { code, description })
    }
}

impl BaseResponse<Value> {
    /// Mutation contract: `code == 0` and a truthy payload.
    pub fn confirm(self) -> ApiResult<Value> {
        match self.data {
            Some(ref data) if self.code == 0 && is_truthy(data) => Ok(data.clone()),
            _ => Err(self.refusal()),
        }
    }
}

/// Script-style truthiness of a JSON value.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Query for `/api/user/search`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchQuery {
    pub user_account: Option<String>,
    pub current: u32,
    pub page_size: u32,
}

impl SearchQuery {
    pub fn first_page(page_size: u32) -> Self {
        Self { user_account: None, current: 1, page_size: page_size.max(1) }
    }

    /// Query-string pairs, omitting an empty account filter.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(3);
        if let Some(account) = self.user_account.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            params.push(("userAccount", account.to_string()));
        }
        params.push(("current", self.current.to_string()));
        params.push(("pageSize", self.page_size.to_string()));
        params
    }
}

/// Reply of `/api/user/search`. Missing fields decode to an empty, failed page.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub data: Option<Vec<UserRecord>>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub success: Option<bool>,
}

impl SearchPage {
    pub fn succeeded(&self) -> bool {
        self.success.unwrap_or(false)
    }
}

/// Partial update body for `/api/user/update`. Unset fields are omitted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_status: Option<UserStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_role: Option<UserRole>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub user_account: String,
    pub user_password: String,
}

/// Body for `/api/user/register`; field rules mirror the registration form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 3, message = "用户账号至少3个字符！"))]
    pub user_account: String,
    #[validate(length(min = 6, message = "密码至少6个字符！"))]
    pub user_password: String,
    pub check_password: String,
}

/// The operations the console needs from the backend.
pub trait UserApi {
    fn search_users(&self, query: &SearchQuery) -> ApiResult<SearchPage>;

    fn update_user(&self, update: &UserUpdate) -> ApiResult<BaseResponse<Value>>;

    fn delete_user(&self, id: i64) -> ApiResult<BaseResponse<Value>>;

    fn current_user(&self) -> ApiResult<BaseResponse<UserRecord>>;

    fn login(&self, request: &LoginRequest) -> ApiResult<BaseResponse<UserRecord>>;

    fn register(&self, request: &RegisterRequest) -> ApiResult<BaseResponse<Value>>;

    fn logout(&self) -> ApiResult<BaseResponse<Value>>;
}
