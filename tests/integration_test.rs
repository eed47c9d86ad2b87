// Integration tests for user-center-tui

mod common;

use std::rc::Rc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::TestBackend;

use common::{SharedStub, StubApi};
use user_center_tui::app::keymap::{KeyAction, Keymap};
use user_center_tui::app::update::handle_key;
use user_center_tui::app::{ActiveModal, ActiveTab, AppState, InputMode, Theme};
use user_center_tui::form::PASSWORD_MISMATCH;
use user_center_tui::ui;

fn temp_path(tag: &str) -> std::path::PathBuf {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nonce = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    std::env::temp_dir().join(format!("uct_{tag}_{}_{}.conf", std::process::id(), nonce))
}

fn key(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
}

fn code(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn type_text(app: &mut AppState, text: &str) {
    for c in text.chars() {
        assert!(handle_key(app, key(c)));
    }
}

/// App over a seeded stub (admin id 1 plus `regular` users), logged in as `account`.
fn app_as(account: &str, regular: i64) -> (AppState, Rc<StubApi>) {
    let stub = Rc::new(StubApi::seeded(regular));
    stub.me.set(None);
    let mut app = AppState::new(Box::new(SharedStub(Rc::clone(&stub))), Theme::mocha(), Keymap::default(), 10);
    assert!(app.login(account, "12345678"));
    app.enter_tab(ActiveTab::Profile);
    (app, stub)
}

fn screen_text(app: &AppState) -> String {
    let mut terminal = Terminal::new(TestBackend::new(160, 40)).unwrap();
    terminal.draw(|f| ui::render(f, app)).unwrap();
    let text: String = terminal.backend().buffer().content.iter().map(|c| c.symbol()).collect();
    // wide glyphs leave padding cells behind them
    text.replace(' ', "")
}

// 1) Theme config roundtrip and init
#[test]
fn theme_roundtrip_and_init() {
    let path = temp_path("theme");
    let path_str = path.to_string_lossy().to_string();

    let t = Theme::mocha();
    t.write_file(&path_str).expect("write theme");
    let t2 = Theme::from_file(&path_str).expect("read theme");
    assert_eq!(format!("{:?}", t.text), format!("{:?}", t2.text));
    assert_eq!(format!("{:?}", t.error), format!("{:?}", t2.error));
    assert_eq!(format!("{:?}", t.header_bg), format!("{:?}", t2.header_bg));

    let init = temp_path("theme_init");
    let init_str = init.to_string_lossy().to_string();
    let _created = Theme::load_or_init(&init_str);
    assert!(init.exists());

    let _ = std::fs::remove_file(&path);
    let _ = std::fs::remove_file(&init);
}

// 2) Keybindings file: defaults survive, custom lines add bindings
#[test]
fn keymap_file_roundtrip_and_overrides() {
    let path = temp_path("keys");
    let path_str = path.to_string_lossy().to_string();
    Keymap::default().write_file(&path_str).expect("write keymap");
    let loaded = Keymap::from_file(&path_str).expect("read keymap");
    assert_eq!(loaded.resolve(&key('q')), Some(KeyAction::Quit));
    assert_eq!(loaded.resolve(&code(KeyCode::PageDown)), Some(KeyAction::NextPage));

    std::fs::write(&path, "# custom\nRefresh = x\nNotAnAction = y\nQuit = Ctrl+w\n").expect("write custom");
    let custom = Keymap::from_file(&path_str).expect("read custom");
    assert_eq!(custom.resolve(&key('x')), Some(KeyAction::Refresh));
    assert_eq!(custom.resolve(&key('y')), None);
    assert_eq!(
        custom.resolve(&KeyEvent::new(KeyCode::Char('w'), KeyModifiers::CONTROL)),
        Some(KeyAction::Quit)
    );
    assert_eq!(custom.resolve(&key('r')), Some(KeyAction::Refresh));

    let _ = std::fs::remove_file(&path);
}

// 3) console.conf roundtrip, defaults and bad values
#[test]
fn console_config_roundtrip_and_init() {
    use user_center_tui::app::config::ConsoleConfig;

    let path = temp_path("console");
    let created = ConsoleConfig::load_or_init(&path);
    assert_eq!(created, ConsoleConfig::default());
    assert_eq!(created.page_size, 20);
    assert!(path.exists());

    std::fs::write(&path, "base_url = http://backend:9000\npage_size = nope\ntimeout_secs = 0\n").expect("write");
    let cfg = ConsoleConfig::from_file(&path).expect("read");
    assert_eq!(cfg.base_url, "http://backend:9000");
    assert_eq!(cfg.page_size, 20);
    assert_eq!(cfg.timeout_secs, 1);

    let _ = std::fs::remove_file(&path);
}

// 4) Admin flow driven by keys: switch tab, select, delete with confirmation
#[test]
fn admin_deletes_a_user_through_the_keyboard() {
    let (mut app, stub) = app_as("admin", 3);
    assert_eq!(stub.count("current"), 1);
    assert!(handle_key(&mut app, code(KeyCode::Tab)));
    assert_eq!(app.active_tab, ActiveTab::Users);
    assert_eq!(app.users.rows.len(), 4);

    handle_key(&mut app, key('j'));
    handle_key(&mut app, key('d'));
    assert_eq!(app.input_mode, InputMode::Modal);
    assert_eq!(app.active_modal(), Some(ActiveModal::ConfirmDelete));
    assert!(screen_text(&app).contains("确认删除该用户吗？"));

    handle_key(&mut app, key('y'));
    assert_eq!(app.input_mode, InputMode::Normal);
    assert_eq!(*stub.deletes.borrow(), vec![2]);
    assert_eq!(app.users.rows.len(), 3);
    assert_eq!(app.notice.as_ref().map(|n| n.message.as_str()), Some("删除成功"));
}

// 5) Search prompt filters by account and resets paging
#[test]
fn search_prompt_filters_rows() {
    let (mut app, _stub) = app_as("admin", 14);
    handle_key(&mut app, code(KeyCode::Tab));
    handle_key(&mut app, code(KeyCode::Right));
    assert_eq!(app.users.query.current, 2);

    handle_key(&mut app, key('/'));
    assert_eq!(app.input_mode, InputMode::Search);
    type_text(&mut app, "user07");
    handle_key(&mut app, code(KeyCode::Enter));
    assert_eq!(app.input_mode, InputMode::Normal);
    assert_eq!(app.users.query.current, 1);
    assert_eq!(app.users.rows.len(), 1);
    assert!(screen_text(&app).contains("user07"));
}

// 6) Edit form: focus, type, submit; Esc cancels without a request
#[test]
fn edit_form_submits_typed_values() {
    let (mut app, stub) = app_as("admin", 2);
    handle_key(&mut app, code(KeyCode::Tab));
    handle_key(&mut app, key('j'));

    handle_key(&mut app, key('e'));
    assert_eq!(app.active_modal(), Some(ActiveModal::EditUser));
    handle_key(&mut app, code(KeyCode::Esc));
    assert_eq!(app.active_modal(), None);
    assert_eq!(stub.count("update"), 0);

    handle_key(&mut app, key('e'));
    handle_key(&mut app, code(KeyCode::Down));
    type_text(&mut app, "X");
    handle_key(&mut app, code(KeyCode::Enter));
    assert_eq!(app.active_modal(), None);
    assert_eq!(app.notice.as_ref().map(|n| n.message.as_str()), Some("保存成功"));
    assert_eq!(stub.record(2).and_then(|u| u.username).as_deref(), Some("name-user02X"));
}

// 7) Regular users see no user list and get a notice instead of row actions
#[test]
fn regular_user_cannot_manage_users() {
    let (mut app, stub) = app_as("user02", 2);
    handle_key(&mut app, code(KeyCode::Tab));
    assert_eq!(stub.count("search"), 0);
    assert!(app.users.rows.is_empty());
    assert!(screen_text(&app).contains("无权限"));

    handle_key(&mut app, key('d'));
    assert_eq!(app.active_modal(), Some(ActiveModal::App));
    handle_key(&mut app, code(KeyCode::Esc));
    assert_eq!(app.input_mode, InputMode::Normal);
}

// 8) Register tab takes plain keys as text and validates before sending
#[test]
fn register_tab_types_into_the_form() {
    let (mut app, stub) = app_as("admin", 0);
    handle_key(&mut app, code(KeyCode::BackTab));
    assert_eq!(app.active_tab, ActiveTab::Register);

    type_text(&mut app, "quinn");
    handle_key(&mut app, code(KeyCode::Down));
    type_text(&mut app, "secret1");
    handle_key(&mut app, code(KeyCode::Down));
    type_text(&mut app, "secret2");
    assert_eq!(app.register.form.account, "quinn");

    let text = screen_text(&app);
    assert!(!text.contains("secret1"));
    assert!(text.contains("*******"));

    handle_key(&mut app, code(KeyCode::Enter));
    assert_eq!(app.notice.as_ref().map(|n| n.message.as_str()), Some(PASSWORD_MISMATCH));
    assert_eq!(stub.count("register"), 0);
}

// 9) Quit keys, and logout clears the session
#[test]
fn quit_keys_and_logout() {
    let (mut app, stub) = app_as("admin", 0);
    assert!(!handle_key(&mut app, key('q')));
    assert!(!handle_key(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));

    app.logout();
    assert!(!app.session.is_logged_in());
    assert_eq!(stub.count("logout"), 1);
    app.logout();
    assert_eq!(stub.count("logout"), 1);
}

// 10) Profile card and help render
#[test]
fn profile_and_help_render() {
    let (mut app, _stub) = app_as("admin", 0);
    let text = screen_text(&app);
    assert!(text.contains("name-admin"));
    assert!(text.contains("admin@example.com"));

    handle_key(&mut app, key('?'));
    assert!(screen_text(&app).contains("Help"));
    handle_key(&mut app, code(KeyCode::Esc));
    handle_key(&mut app, key('K'));
    assert!(app.show_keybinds);
    assert!(screen_text(&app).contains("Keybindings"));
}

// 11) Failed login leaves the console logged out with a notice
#[test]
fn failed_login_sets_notice() {
    let stub = Rc::new(StubApi::seeded(0));
    let mut app = AppState::new(Box::new(SharedStub(Rc::clone(&stub))), Theme::dark(), Keymap::default(), 10);
    assert!(!app.login("ghost", "12345678"));
    assert!(!app.session.is_logged_in());
    assert_eq!(app.notice.as_ref().map(|n| n.message.as_str()), Some("用户不存在或密码错误"));
}

// 12) Editing your own row on the user list shows up when the profile is reopened
#[test]
fn profile_rereads_after_self_row_edit() {
    let (mut app, stub) = app_as("admin", 1);
    handle_key(&mut app, code(KeyCode::Tab));
    handle_key(&mut app, key('e'));
    assert_eq!(app.active_modal(), Some(ActiveModal::EditUser));
    handle_key(&mut app, code(KeyCode::Down));
    type_text(&mut app, "Z");
    handle_key(&mut app, code(KeyCode::Enter));
    assert_eq!(stub.record(1).and_then(|u| u.username).as_deref(), Some("name-adminZ"));

    handle_key(&mut app, code(KeyCode::BackTab));
    assert_eq!(app.active_tab, ActiveTab::Profile);
    assert_eq!(stub.count("current"), 2);
    assert_eq!(app.session.current().cloned(), stub.record(1));
    assert!(screen_text(&app).contains("name-adminZ"));
}

// 13) A missing keybinds file is created at the given path with the defaults
#[test]
fn keymap_init_writes_to_the_given_path() {
    let path = temp_path("keys_init");
    let path_str = path.to_string_lossy().to_string();
    assert!(!path.exists());

    let km = Keymap::load_or_init(&path_str);
    assert!(path.exists());
    assert_eq!(km.resolve(&key('q')), Some(KeyAction::Quit));
    let written = std::fs::read_to_string(&path).expect("read keymap");
    assert!(written.contains("Quit = q"));

    let _ = std::fs::remove_file(&path);
}

// 14) A failed search shows an empty table marked as failed
#[test]
fn failed_search_marks_the_table() {
    let (mut app, stub) = app_as("admin", 2);
    stub.search_unsuccessful.set(true);
    handle_key(&mut app, code(KeyCode::Tab));
    assert!(app.users.rows.is_empty());
    let text = screen_text(&app);
    assert!(text.contains("加载失败"));
    assert!(!text.contains("user02"));
}
