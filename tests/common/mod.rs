// In-memory backend shared by the integration tests.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use serde_json::{Value, json};
use user_center_tui::api::{BaseResponse, LoginRequest, RegisterRequest, SearchPage, SearchQuery, UserApi, UserUpdate};
use user_center_tui::model::{Gender, UserRecord, UserRole, UserStatus};
use user_center_tui::{ApiError, ApiResult};

/// How the next mutation (update, delete, register) should fail.
#[derive(Clone, Debug)]
pub enum Failure {
    Business { code: i64, description: Option<&'static str> },
    Transport,
}

#[derive(Default)]
pub struct StubApi {
    pub users: RefCell<Vec<UserRecord>>,
    /// Id of the record `/api/user/current` answers with.
    pub me: Cell<Option<i64>>,
    pub fail_next: RefCell<Option<Failure>>,
    /// Answer searches with `success: false`.
    pub search_unsuccessful: Cell<bool>,
    /// Store emails lowercased, like a backend that normalises input.
    pub normalise_email: Cell<bool>,
    pub calls: RefCell<Vec<&'static str>>,
    pub updates: RefCell<Vec<UserUpdate>>,
    pub deletes: RefCell<Vec<i64>>,
    pub registrations: RefCell<Vec<RegisterRequest>>,
}

pub fn user(id: i64, account: &str, role: UserRole) -> UserRecord {
    UserRecord {
        id: Some(id),
        user_account: Some(account.to_string()),
        username: Some(format!("name-{account}")),
        avatar_url: None,
        gender: Some(Gender::Male),
        phone: Some("13800000000".to_string()),
        email: Some(format!("{account}@example.com")),
        user_status: Some(UserStatus::Normal),
        user_role: Some(role),
        create_time: Some("2024-03-01 10:00:00".to_string()),
    }
}

impl StubApi {
    /// One admin (id 1, logged in) and `regular` regular users with ids 2.. .
    pub fn seeded(regular: i64) -> Self {
        let stub = Self::default();
        let mut users = vec![user(1, "admin", UserRole::Admin)];
        users.extend((0..regular).map(|i| user(i + 2, &format!("user{:02}", i + 2), UserRole::Regular)));
        *stub.users.borrow_mut() = users;
        stub.me.set(Some(1));
        stub
    }

    pub fn fail_next(&self, failure: Failure) {
        *self.fail_next.borrow_mut() = Some(failure);
    }

    pub fn record(&self, id: i64) -> Option<UserRecord> {
        self.users.borrow().iter().find(|u| u.id == Some(id)).cloned()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls.borrow().iter().filter(|c| **c == call).count()
    }

    fn injected<T>(&self) -> Option<ApiResult<BaseResponse<T>>> {
        match self.fail_next.borrow_mut().take()? {
            Failure::Business { code, description } => Some(Ok(BaseResponse {
                code,
                data: None,
                message: None,
                description: description.map(str::to_string),
            })),
            Failure::Transport => Some(Err(ApiError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "stub backend unreachable",
            )))),
        }
    }
}

impl UserApi for StubApi {
    fn search_users(&self, query: &SearchQuery) -> ApiResult<SearchPage> {
        self.calls.borrow_mut().push("search");
        if self.search_unsuccessful.get() {
            return Ok(SearchPage { data: None, total: None, success: Some(false) });
        }
        let filter = query.user_account.clone().unwrap_or_default();
        let matching: Vec<UserRecord> = self
            .users
            .borrow()
            .iter()
            .filter(|u| u.user_account.as_deref().unwrap_or("").contains(&filter))
            .cloned()
            .collect();
        let size = query.page_size as usize;
        let skip = (query.current.saturating_sub(1) as usize) * size;
        Ok(SearchPage {
            total: Some(matching.len() as u64),
            data: Some(matching.into_iter().skip(skip).take(size).collect()),
            success: Some(true),
        })
    }

    fn update_user(&self, update: &UserUpdate) -> ApiResult<BaseResponse<Value>> {
        self.calls.borrow_mut().push("update");
        self.updates.borrow_mut().push(update.clone());
        if let Some(reply) = self.injected() {
            return reply;
        }
        let mut users = self.users.borrow_mut();
        let Some(record) = users.iter_mut().find(|u| u.id == Some(update.id)) else {
            return Ok(BaseResponse::fail(40400, "用户不存在"));
        };
        if let Some(v) = &update.user_account {
            record.user_account = Some(v.clone());
        }
        if let Some(v) = &update.username {
            record.username = Some(v.clone());
        }
        if let Some(v) = &update.email {
            let v = if self.normalise_email.get() { v.to_lowercase() } else { v.clone() };
            record.email = Some(v);
        }
        if let Some(v) = &update.phone {
            record.phone = Some(v.clone());
        }
        if update.gender.is_some() {
            record.gender = update.gender;
        }
        if update.user_status.is_some() {
            record.user_status = update.user_status;
        }
        if update.user_role.is_some() {
            record.user_role = update.user_role;
        }
        Ok(BaseResponse::ok(json!(1)))
    }

    fn delete_user(&self, id: i64) -> ApiResult<BaseResponse<Value>> {
        self.calls.borrow_mut().push("delete");
        self.deletes.borrow_mut().push(id);
        if let Some(reply) = self.injected() {
            return reply;
        }
        let mut users = self.users.borrow_mut();
        let before = users.len();
        users.retain(|u| u.id != Some(id));
        Ok(BaseResponse::ok(json!(users.len() < before)))
    }

    fn current_user(&self) -> ApiResult<BaseResponse<UserRecord>> {
        self.calls.borrow_mut().push("current");
        match self.me.get().and_then(|id| self.record(id)) {
            Some(record) => Ok(BaseResponse::ok(record)),
            None => Ok(BaseResponse::fail(40100, "未登录")),
        }
    }

    fn login(&self, request: &LoginRequest) -> ApiResult<BaseResponse<UserRecord>> {
        self.calls.borrow_mut().push("login");
        let found = self.users.borrow().iter().find(|u| u.user_account.as_deref() == Some(request.user_account.as_str())).cloned();
        match found {
            Some(record) => {
                self.me.set(record.id);
                Ok(BaseResponse::ok(record))
            }
            None => Ok(BaseResponse::fail(40000, "用户不存在或密码错误")),
        }
    }

    fn register(&self, request: &RegisterRequest) -> ApiResult<BaseResponse<Value>> {
        self.calls.borrow_mut().push("register");
        self.registrations.borrow_mut().push(request.clone());
        if let Some(reply) = self.injected() {
            return reply;
        }
        let mut users = self.users.borrow_mut();
        if users.iter().any(|u| u.user_account.as_deref() == Some(request.user_account.as_str())) {
            return Ok(BaseResponse::fail(40000, "账号重复"));
        }
        let id = users.iter().filter_map(|u| u.id).max().unwrap_or(0) + 1;
        users.push(UserRecord {
            id: Some(id),
            user_account: Some(request.user_account.clone()),
            user_role: Some(UserRole::Regular),
            ..Default::default()
        });
        Ok(BaseResponse::ok(json!(id)))
    }

    fn logout(&self) -> ApiResult<BaseResponse<Value>> {
        self.calls.borrow_mut().push("logout");
        self.me.set(None);
        Ok(BaseResponse::ok(json!(1)))
    }
}

/// Lets a test keep a handle on the stub after boxing it into `AppState`.
pub struct SharedStub(pub std::rc::Rc<StubApi>);

impl UserApi for SharedStub {
    fn search_users(&self, query: &SearchQuery) -> ApiResult<SearchPage> {
        self.0.search_users(query)
    }

    fn update_user(&self, update: &UserUpdate) -> ApiResult<BaseResponse<Value>> {
        self.0.update_user(update)
    }

    fn delete_user(&self, id: i64) -> ApiResult<BaseResponse<Value>> {
        self.0.delete_user(id)
    }

    fn current_user(&self) -> ApiResult<BaseResponse<UserRecord>> {
        self.0.current_user()
    }

    fn login(&self, request: &LoginRequest) -> ApiResult<BaseResponse<UserRecord>> {
        self.0.login(request)
    }

    fn register(&self, request: &RegisterRequest) -> ApiResult<BaseResponse<Value>> {
        self.0.register(request)
    }

    fn logout(&self) -> ApiResult<BaseResponse<Value>> {
        self.0.logout()
    }
}
