//! Form drafts and the small state machines around them.
//!
//! A draft is the transient, screen-local copy of a record's editable fields.
//! It is created when a form opens and dropped on cancel or successful save;
//! nothing in it is persisted until the whole draft is submitted.

use validator::{Validate, ValidateEmail, ValidationErrors};

use crate::api::{RegisterRequest, UserUpdate};
use crate::model::{Gender, UserRecord, UserRole, UserStatus};

pub const INVALID_EMAIL: &str = "请输入有效邮箱";
pub const ACCOUNT_REQUIRED: &str = "用户账号是必填项！";
pub const PASSWORD_REQUIRED: &str = "密码是必填项！";
pub const CHECK_REQUIRED: &str = "确认密码是必填项！";
pub const PASSWORD_MISMATCH: &str = "两次输入的密码不一致！";

/// Lifecycle of an edit modal: `Closed → Editing → Saved | Cancelled`.
///
/// `Saved` and `Cancelled` are closed states that remember how the last
/// session of the form ended. A failed submit keeps the state in `Editing`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditorState<D> {
    Closed,
    Editing(D),
    Saved,
    Cancelled,
}

impl<D> Default for EditorState<D> {
    fn default() -> Self {
        Self::Closed
    }
}

impl<D> EditorState<D> {
    pub fn open(&mut self, draft: D) {
        *self = Self::Editing(draft);
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Self::Editing(_))
    }

    pub fn draft(&self) -> Option<&D> {
        match self {
            Self::Editing(d) => Some(d),
            _ => None,
        }
    }

    pub fn draft_mut(&mut self) -> Option<&mut D> {
        match self {
            Self::Editing(d) => Some(d),
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        if self.is_open() {
            *self = Self::Cancelled;
        }
    }

    pub fn mark_saved(&mut self) {
        if self.is_open() {
            *self = Self::Saved;
        }
    }
}

/// The row a delete confirmation is about.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeleteTarget {
    pub id: i64,
    pub label: String,
}

/// Delete confirmation: `Idle → Pending → Idle`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ConfirmState {
    #[default]
    Idle,
    Pending(DeleteTarget),
}

impl ConfirmState {
    pub fn target(&self) -> Option<&DeleteTarget> {
        match self {
            Self::Pending(t) => Some(t),
            Self::Idle => None,
        }
    }

    /// Leave the pending state, handing back what was pending.
    pub fn take(&mut self) -> Option<DeleteTarget> {
        match std::mem::take(self) {
            Self::Pending(t) => Some(t),
            Self::Idle => None,
        }
    }
}

/// Editable fields, in display order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Field {
    Account,
    Username,
    Email,
    Phone,
    Gender,
    Status,
    Role,
}

impl Field {
    pub fn label(self) -> &'static str {
        match self {
            Field::Account => "用户账号",
            Field::Username => "用户名",
            Field::Email => "邮箱",
            Field::Phone => "手机号",
            Field::Gender => "性别",
            Field::Status => "用户状态",
            Field::Role => "角色",
        }
    }

    pub fn is_select(self) -> bool {
        matches!(self, Field::Gender | Field::Status | Field::Role)
    }

    pub fn is_read_only(self) -> bool {
        matches!(self, Field::Account)
    }
}

/// Which form a draft belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DraftScope {
    /// Admin editing any row of the user list.
    Admin,
    /// A user editing their own profile.
    SelfService,
}

impl DraftScope {
    pub fn fields(self) -> &'static [Field] {
        match self {
            DraftScope::Admin => &[
                Field::Account,
                Field::Username,
                Field::Email,
                Field::Phone,
                Field::Gender,
                Field::Status,
                Field::Role,
            ],
            DraftScope::SelfService => &[Field::Username, Field::Email, Field::Phone, Field::Gender],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserDraft {
    pub scope: DraftScope,
    pub account: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub gender: Option<Gender>,
    pub status: Option<UserStatus>,
    pub role: Option<UserRole>,
    pub focus: usize,
    /// Inline message of the last failed validation.
    pub error: Option<String>,
}

impl UserDraft {
    /// Pre-populate a draft from a record; missing text becomes empty input.
    pub fn from_record(record: &UserRecord, scope: DraftScope) -> Self {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        let (status, role) = match scope {
            DraftScope::Admin => (record.user_status, record.user_role),
            DraftScope::SelfService => (None, None),
        };
        Self {
            scope,
            account: text(&record.user_account),
            username: text(&record.username),
            email: text(&record.email),
            phone: text(&record.phone),
            gender: record.gender,
            status,
            role,
            focus: 0,
            error: None,
        }
    }

    pub fn fields(&self) -> &'static [Field] {
        self.scope.fields()
    }

    pub fn focused(&self) -> Field {
        let fields = self.fields();
        fields[self.focus.min(fields.len() - 1)]
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.fields().len();
    }

    pub fn focus_prev(&mut self) {
        let n = self.fields().len();
        self.focus = (self.focus + n - 1) % n;
    }

    fn text_mut(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::Username => Some(&mut self.username),
            Field::Email => Some(&mut self.email),
            Field::Phone => Some(&mut self.phone),
            _ => None,
        }
    }

    pub fn input_char(&mut self, c: char) {
        let field = self.focused();
        if let Some(buf) = self.text_mut(field) {
            buf.push(c);
        }
    }

    pub fn backspace(&mut self) {
        let field = self.focused();
        if let Some(buf) = self.text_mut(field) {
            buf.pop();
        }
    }

    /// Step a select field through `unset → choices… → unset`.
    pub fn cycle(&mut self, forward: bool) {
        match self.focused() {
            Field::Gender => self.gender = step(self.gender, &Gender::CHOICES, forward),
            Field::Status => self.status = step(self.status, &UserStatus::CHOICES, forward),
            Field::Role => self.role = step(self.role, &UserRole::CHOICES, forward),
            _ => {}
        }
    }

    /// Display value of a field inside the form.
    pub fn value(&self, field: Field) -> String {
        match field {
            Field::Account => self.account.clone(),
            Field::Username => self.username.clone(),
            Field::Email => self.email.clone(),
            Field::Phone => self.phone.clone(),
            Field::Gender => self.gender.map(Gender::label).filter(|s| !s.is_empty()).unwrap_or_else(|| "请选择性别".into()),
            Field::Status => self.status.map(UserStatus::label).unwrap_or_else(|| "请选择用户状态".into()),
            Field::Role => self.role.map(UserRole::label).unwrap_or_else(|| "请选择角色".into()),
        }
    }

    /// Field rules. An empty email is allowed; a non-empty one must parse.
    pub fn validate(&self) -> Result<(), String> {
        if !self.email.is_empty() && !self.email.validate_email() {
            return Err(INVALID_EMAIL.to_string());
        }
        Ok(())
    }

    /// Partial update for record `id`: every field of this form, with cleared
    /// selects left out.
    pub fn to_update(&self, id: i64) -> UserUpdate {
        let mut update = UserUpdate {
            id,
            username: Some(self.username.clone()),
            email: Some(self.email.clone()),
            phone: Some(self.phone.clone()),
            gender: self.gender,
            ..Default::default()
        };
        if self.scope == DraftScope::Admin {
            update.user_account = Some(self.account.clone());
            update.user_status = self.status;
            update.user_role = self.role;
        }
        update
    }
}

fn step<T: Copy + PartialEq>(current: Option<T>, choices: &[T], forward: bool) -> Option<T> {
    let pos = current.and_then(|c| choices.iter().position(|x| *x == c));
    let next = match (pos, forward) {
        (None, true) => Some(0),
        (None, false) => Some(choices.len() - 1),
        (Some(i), true) if i + 1 < choices.len() => Some(i + 1),
        (Some(i), false) if i > 0 => Some(i - 1),
        _ => None,
    };
    next.map(|i| choices[i])
}

/// Fields of the registration form.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RegisterField {
    Account,
    Password,
    Check,
}

impl RegisterField {
    pub const ALL: [RegisterField; 3] = [RegisterField::Account, RegisterField::Password, RegisterField::Check];

    pub fn placeholder(self) -> &'static str {
        match self {
            RegisterField::Account => "请输入用户账号",
            RegisterField::Password => "请输入密码",
            RegisterField::Check => "请确认密码",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegisterForm {
    pub account: String,
    pub password: String,
    pub check: String,
    pub focus: usize,
}

impl RegisterForm {
    pub fn focused(&self) -> RegisterField {
        RegisterField::ALL[self.focus.min(RegisterField::ALL.len() - 1)]
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % RegisterField::ALL.len();
    }

    pub fn focus_prev(&mut self) {
        let n = RegisterField::ALL.len();
        self.focus = (self.focus + n - 1) % n;
    }

    fn buffer_mut(&mut self) -> &mut String {
        match self.focused() {
            RegisterField::Account => &mut self.account,
            RegisterField::Password => &mut self.password,
            RegisterField::Check => &mut self.check,
        }
    }

    pub fn input_char(&mut self, c: char) {
        self.buffer_mut().push(c);
    }

    pub fn backspace(&mut self) {
        self.buffer_mut().pop();
    }

    /// Run the field rules in display order, then the password match.
    /// Returns the request body, or the first message to show.
    pub fn validate(&self) -> Result<RegisterRequest, String> {
        let request = RegisterRequest {
            user_account: self.account.clone(),
            user_password: self.password.clone(),
            check_password: self.check.clone(),
        };
        let errors = request.validate().err();
        let rule = |field: &str| errors.as_ref().and_then(|e| first_message(e, field));

        if request.user_account.is_empty() {
            return Err(ACCOUNT_REQUIRED.into());
        }
        if let Some(msg) = rule("user_account") {
            return Err(msg);
        }
        if request.user_password.is_empty() {
            return Err(PASSWORD_REQUIRED.into());
        }
        if let Some(msg) = rule("user_password") {
            return Err(msg);
        }
        if request.check_password.is_empty() {
            return Err(CHECK_REQUIRED.into());
        }
        if request.user_password != request.check_password {
            return Err(PASSWORD_MISMATCH.into());
        }
        Ok(request)
    }
}

fn first_message(errors: &ValidationErrors, field: &str) -> Option<String> {
    errors
        .field_errors()
        .get(field)
        .and_then(|list| list.first())
        .map(|e| e.message.as_ref().map(|m| m.to_string()).unwrap_or_else(|| e.code.to_string()))
}
