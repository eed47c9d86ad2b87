use tracing::{info, warn};

use super::Notice;
use crate::api::UserApi;
use crate::form::RegisterForm;

const REGISTER_OK: &str = "注册成功！";
const REGISTER_FAILED: &str = "注册失败";
const REGISTER_RETRY: &str = "注册失败，请重试！";

/// Account registration. Client-side rules reject a submission before any
/// request is made.
#[derive(Debug, Default)]
pub struct RegisterScreen {
    pub form: RegisterForm,
    pub error: Option<String>,
    /// Account of the last successful registration.
    pub registered: Option<String>,
}

impl RegisterScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submit(&mut self, api: &dyn UserApi) -> Notice {
        let request = match self.form.validate() {
            Ok(request) => request,
            Err(msg) => {
                self.error = Some(msg.clone());
                return Notice::error(msg);
            }
        };
        self.error = None;

        match api.register(&request) {
            Ok(reply) if reply.code == 0 => {
                info!(account = %request.user_account, "account registered");
                self.registered = Some(request.user_account);
                self.form = RegisterForm::default();
                Notice::success(REGISTER_OK)
            }
            Ok(reply) => {
                let msg = crate::error::ApiError::business(reply.code, reply.description)
                    .user_message(REGISTER_FAILED, REGISTER_RETRY);
                self.error = Some(msg.clone());
                Notice::error(msg)
            }
            Err(e) => {
                warn!(error = %e, "registration request failed");
                let msg = e.user_message(REGISTER_FAILED, REGISTER_RETRY);
                self.error = Some(msg.clone());
                Notice::error(msg)
            }
        }
    }
}
