//! The current user's own profile.
//!
//! Self-edit writes through `/api/user/update` and then re-reads
//! `/api/user/current`; the session is replaced with what the backend
//! returns, never with the values typed into the form.

use tracing::{info, warn};

use super::Notice;
use crate::api::UserApi;
use crate::error::ApiError;
use crate::form::{DraftScope, EditorState, UserDraft};
use crate::session::Session;

const SAVE_OK: &str = "保存成功";
const SAVE_FAILED: &str = "保存失败";
const SAVE_RETRY: &str = "保存失败，请重试";

#[derive(Debug, Default)]
pub struct ProfileScreen {
    pub editor: EditorState<UserDraft>,
}

impl ProfileScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// The screen is being shown: refresh the session unconditionally, so
    /// writes made from other tabs are picked up.
    pub fn mount(&mut self, api: &dyn UserApi, session: &mut Session) {
        self.refresh(api, session);
    }

    /// Re-read the current user and swap it into the session. A failure is
    /// logged and otherwise ignored; the previous record stays in place.
    pub fn refresh(&self, api: &dyn UserApi, session: &mut Session) -> bool {
        match api.current_user().and_then(|r| r.into_data()) {
            Ok(record) => {
                session.replace(record);
                true
            }
            Err(e) => {
                warn!(error = %e, "current user refresh failed");
                false
            }
        }
    }

    /// Editing needs at least an account or a username to show.
    pub fn can_edit(session: &Session) -> bool {
        session
            .current()
            .is_some_and(|u| crate::model::non_empty(&u.user_account).is_some() || crate::model::non_empty(&u.username).is_some())
    }

    pub fn open_edit(&mut self, session: &Session) -> bool {
        if !Self::can_edit(session) {
            return false;
        }
        let Some(user) = session.current() else { return false };
        self.editor.open(UserDraft::from_record(user, DraftScope::SelfService));
        true
    }

    pub fn cancel_edit(&mut self) {
        self.editor.cancel();
    }

    pub fn submit_edit(&mut self, api: &dyn UserApi, session: &mut Session) -> Option<Notice> {
        let draft = self.editor.draft_mut()?;
        if let Err(msg) = draft.validate() {
            draft.error = Some(msg.clone());
            return Some(Notice::error(ApiError::Validation(msg).user_message(SAVE_FAILED, SAVE_RETRY)));
        }
        draft.error = None;
        let Some(id) = session.current().and_then(|u| u.id) else {
            return Some(Notice::error(SAVE_RETRY));
        };
        let update = draft.to_update(id);

        match api.update_user(&update).and_then(|r| r.confirm()) {
            Ok(_) => {
                info!(id, "profile updated");
                self.editor.mark_saved();
                self.refresh(api, session);
                Some(Notice::success(SAVE_OK))
            }
            Err(e) => {
                warn!(id, error = %e, "profile update failed");
                Some(Notice::error(e.user_message(SAVE_FAILED, SAVE_RETRY)))
            }
        }
    }
}
