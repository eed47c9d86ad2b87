//! Admin user list: paginated search, edit and delete.
//!
//! Rows are never patched locally. Every successful write is followed by a
//! reload of the current page, and a failed write leaves the rows as they were.

use tracing::{info, warn};

use super::Notice;
use crate::api::{SearchQuery, UserApi};
use crate::error::ApiError;
use crate::form::{ConfirmState, DeleteTarget, DraftScope, EditorState, UserDraft};
use crate::model::UserRecord;
use crate::session::Session;

pub const DEFAULT_PAGE_SIZE: u32 = 20;

const SAVE_OK: &str = "保存成功";
const SAVE_FAILED: &str = "保存失败";
const SAVE_RETRY: &str = "保存失败，请重试";
const DELETE_OK: &str = "删除成功";
const DELETE_FAILED: &str = "删除失败";
const DELETE_RETRY: &str = "删除失败，请重试";

/// Draft plus the row it was opened for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowEdit {
    pub target_id: i64,
    pub draft: UserDraft,
}

#[derive(Debug)]
pub struct UserListScreen {
    pub query: SearchQuery,
    pub rows: Vec<UserRecord>,
    pub total: u64,
    /// Whether the last search came back with the success flag set.
    pub loaded: bool,
    pub selected: usize,
    pub editor: EditorState<RowEdit>,
    pub confirm: ConfirmState,
}

impl Default for UserListScreen {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl UserListScreen {
    pub fn new(page_size: u32) -> Self {
        Self {
            query: SearchQuery::first_page(page_size),
            rows: Vec::new(),
            total: 0,
            loaded: false,
            selected: 0,
            editor: EditorState::Closed,
            confirm: ConfirmState::Idle,
        }
    }

    /// Fetch the page described by `query`. Any failure, including a reply
    /// without the success flag, renders as an empty page.
    ///
    /// A page past the end (its last row was just deleted) steps back to the
    /// last page that exists.
    pub fn load(&mut self, api: &dyn UserApi) {
        match api.search_users(&self.query) {
            Ok(page) if page.succeeded() => {
                self.rows = page.data.unwrap_or_default();
                self.total = page.total.unwrap_or(self.rows.len() as u64);
                self.loaded = true;
                if self.rows.is_empty() && self.query.current > self.page_count() {
                    self.query.current = self.page_count();
                    self.selected = 0;
                    return self.load(api);
                }
            }
            Ok(_) => {
                self.clear_rows();
            }
            Err(e) => {
                warn!(error = %e, "user search failed");
                self.clear_rows();
            }
        }
        self.selected = self.selected.min(self.rows.len().saturating_sub(1));
    }

    fn clear_rows(&mut self) {
        self.rows.clear();
        self.total = 0;
        self.loaded = false;
    }

    /// Apply an account filter and go back to page 1.
    pub fn search(&mut self, api: &dyn UserApi, account: &str) {
        let account = account.trim();
        self.query.user_account = if account.is_empty() { None } else { Some(account.to_string()) };
        self.query.current = 1;
        self.selected = 0;
        self.load(api);
    }

    pub fn page_count(&self) -> u32 {
        let size = u64::from(self.query.page_size.max(1));
        (self.total.div_ceil(size)).max(1) as u32
    }

    pub fn next_page(&mut self, api: &dyn UserApi) -> bool {
        if self.query.current >= self.page_count() {
            return false;
        }
        self.query.current += 1;
        self.selected = 0;
        self.load(api);
        true
    }

    pub fn prev_page(&mut self, api: &dyn UserApi) -> bool {
        if self.query.current <= 1 {
            return false;
        }
        self.query.current -= 1;
        self.selected = 0;
        self.load(api);
        true
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.rows.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected_row(&self) -> Option<&UserRecord> {
        self.rows.get(self.selected)
    }

    /// Row actions are only offered to admins.
    pub fn can_manage(session: &Session) -> bool {
        session.is_admin()
    }

    /// Open the edit form for the selected row. Returns whether it opened.
    pub fn open_edit(&mut self, session: &Session) -> bool {
        if !Self::can_manage(session) {
            return false;
        }
        let Some(record) = self.selected_row() else { return false };
        let Some(target_id) = record.id else { return false };
        let draft = UserDraft::from_record(record, DraftScope::Admin);
        self.editor.open(RowEdit { target_id, draft });
        true
    }

    pub fn cancel_edit(&mut self) {
        self.editor.cancel();
    }

    /// Validate and submit the open form. On success the form closes and the
    /// current page is reloaded; on failure the form stays open untouched.
    pub fn submit_edit(&mut self, api: &dyn UserApi) -> Option<Notice> {
        let edit = self.editor.draft_mut()?;
        if let Err(msg) = edit.draft.validate() {
            edit.draft.error = Some(msg.clone());
            return Some(Notice::error(ApiError::Validation(msg).user_message(SAVE_FAILED, SAVE_RETRY)));
        }
        edit.draft.error = None;
        let update = edit.draft.to_update(edit.target_id);

        match api.update_user(&update).and_then(|r| r.confirm()) {
            Ok(_) => {
                info!(id = update.id, "user updated");
                self.editor.mark_saved();
                self.load(api);
                Some(Notice::success(SAVE_OK))
            }
            Err(e) => {
                warn!(id = update.id, error = %e, "user update failed");
                Some(Notice::error(e.user_message(SAVE_FAILED, SAVE_RETRY)))
            }
        }
    }

    /// Ask for confirmation before deleting the selected row.
    pub fn request_delete(&mut self, session: &Session) -> bool {
        if !Self::can_manage(session) {
            return false;
        }
        let Some(record) = self.selected_row() else { return false };
        let Some(id) = record.id else { return false };
        let label = record.user_account.clone().unwrap_or_else(|| id.to_string());
        self.confirm = ConfirmState::Pending(DeleteTarget { id, label });
        true
    }

    pub fn cancel_delete(&mut self) {
        self.confirm = ConfirmState::Idle;
    }

    /// Issue the delete for the pending target, then reload on success.
    pub fn confirm_delete(&mut self, api: &dyn UserApi) -> Option<Notice> {
        let target = self.confirm.take()?;
        let result: Result<_, ApiError> = api.delete_user(target.id).and_then(|r| r.confirm());
        match result {
            Ok(_) => {
                info!(id = target.id, "user deleted");
                self.load(api);
                Some(Notice::success(DELETE_OK))
            }
            Err(e) => {
                warn!(id = target.id, error = %e, "user delete failed");
                Some(Notice::error(e.user_message(DELETE_FAILED, DELETE_RETRY)))
            }
        }
    }
}
