//! `reqwest`-backed implementation of [`UserApi`].
//!
//! The backend keeps its session in a cookie, so a single client with a
//! cookie store is shared by every call made during a run.

use std::time::Duration;

use reqwest::blocking::{Client, ClientBuilder, RequestBuilder};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::{BaseResponse, LoginRequest, RegisterRequest, SearchPage, SearchQuery, UserApi, UserUpdate};
use crate::error::ApiResult;
use crate::model::UserRecord;

const SEARCH_PATH: &str = "api/user/search";
const UPDATE_PATH: &str = "api/user/update";
const DELETE_PATH: &str = "api/user/delete";
const CURRENT_PATH: &str = "api/user/current";
const LOGIN_PATH: &str = "api/user/login";
const REGISTER_PATH: &str = "api/user/register";
const LOGOUT_PATH: &str = "api/user/logout";

#[derive(Debug)]
pub struct HttpUserApi {
    client: Client,
    base: Url,
}

impl HttpUserApi {
    /// Build a client for the backend rooted at `base_url` (e.g. `http://localhost:8080`).
    pub fn new(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        Ok(Self { client: Self::make_client(timeout)?, base: normalize_base(base_url)? })
    }

    fn make_client(timeout: Duration) -> ApiResult<Client> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = ClientBuilder::new()
            .cookie_store(true)
            .timeout(timeout)
            .default_headers(default_headers)
            .build()?;
        Ok(client)
    }

    fn endpoint(&self, path: &str) -> ApiResult<Url> {
        Ok(self.base.join(path)?)
    }

    fn get(&self, path: &str) -> ApiResult<RequestBuilder> {
        let url = self.endpoint(path)?;
        debug!(method = "GET", %url, "backend request");
        Ok(self.client.get(url))
    }

    fn post(&self, path: &str) -> ApiResult<RequestBuilder> {
        let url = self.endpoint(path)?;
        debug!(method = "POST", %url, "backend request");
        Ok(self.client.post(url).header(CONTENT_TYPE, "application/json"))
    }

    /// Send and decode. HTTP error statuses still carry a JSON envelope on this
    /// backend, so the body is decoded regardless of status.
    fn send<T: DeserializeOwned>(request: RequestBuilder) -> ApiResult<T> {
        let response = request.send()?;
        let status = response.status();
        let body = response.text()?;
        debug!(%status, bytes = body.len(), "backend response");
        Ok(serde_json::from_str(&body)?)
    }
}

/// Ensure the base URL ends with `/` so relative joins keep any path prefix.
fn normalize_base(base_url: &str) -> ApiResult<Url> {
    let trimmed = base_url.trim();
    let with_slash = if trimmed.ends_with('/') { trimmed.to_string() } else { format!("{trimmed}/") };
    Ok(Url::parse(&with_slash)?)
}

impl UserApi for HttpUserApi {
    fn search_users(&self, query: &SearchQuery) -> ApiResult<SearchPage> {
        Self::send(self.get(SEARCH_PATH)?.query(&query.params()))
    }

    fn update_user(&self, update: &UserUpdate) -> ApiResult<BaseResponse<Value>> {
        Self::send(self.post(UPDATE_PATH)?.json(update))
    }

    fn delete_user(&self, id: i64) -> ApiResult<BaseResponse<Value>> {
        Self::send(self.post(DELETE_PATH)?.json(&id))
    }

    fn current_user(&self) -> ApiResult<BaseResponse<UserRecord>> {
        Self::send(self.get(CURRENT_PATH)?)
    }

    fn login(&self, request: &LoginRequest) -> ApiResult<BaseResponse<UserRecord>> {
        Self::send(self.post(LOGIN_PATH)?.json(request))
    }

    fn register(&self, request: &RegisterRequest) -> ApiResult<BaseResponse<Value>> {
        Self::send(self.post(REGISTER_PATH)?.json(request))
    }

    fn logout(&self) -> ApiResult<BaseResponse<Value>> {
        Self::send(self.post(LOGOUT_PATH)?)
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread::JoinHandle;

    use serde_json::json;

    use super::*;
    use crate::error::ApiError;
    use crate::model::{UserRole, UserStatus};

    /// Request line and body seen by [`serve_once`].
    struct Seen {
        request_line: String,
        body: String,
    }

    /// Accept one connection on a free local port, record it and answer with
    /// `status` and the JSON `reply`. Returns the base URL to point a client at.
    fn serve_once(status: &'static str, reply: &'static str) -> (String, JoinHandle<Seen>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let handle = std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap();
                    }
                }
            }
            let mut body = vec![0u8; content_length];
            reader.read_exact(&mut body).unwrap();

            let mut stream = reader.into_inner();
            write!(
                stream,
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{reply}",
                reply.len()
            )
            .unwrap();
            stream.flush().unwrap();
            Seen { request_line: request_line.trim_end().to_string(), body: String::from_utf8(body).unwrap() }
        });
        (base, handle)
    }

    fn client(base: &str) -> HttpUserApi {
        HttpUserApi::new(base, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn base_url_keeps_path_prefix() {
        let base = normalize_base("http://localhost:8080/center").unwrap();
        assert_eq!(base.join(SEARCH_PATH).unwrap().as_str(), "http://localhost:8080/center/api/user/search");
        let base = normalize_base("http://localhost:8080/").unwrap();
        assert_eq!(base.join(DELETE_PATH).unwrap().as_str(), "http://localhost:8080/api/user/delete");
    }

    #[test]
    fn rejects_garbage_base_url() {
        assert!(HttpUserApi::new("not a url", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn search_is_a_get_with_paging_query() {
        let (base, server) = serve_once("200 OK", r#"{"data":[{"id":1,"userAccount":"admin"}],"total":1,"success":true}"#);
        let query = SearchQuery { user_account: Some("adm".into()), current: 2, page_size: 5 };
        let page = client(&base).search_users(&query).unwrap();
        let seen = server.join().unwrap();

        assert_eq!(seen.request_line, "GET /api/user/search?userAccount=adm&current=2&pageSize=5 HTTP/1.1");
        assert!(page.succeeded());
        assert_eq!(page.total, Some(1));
        assert_eq!(page.data.unwrap()[0].user_account.as_deref(), Some("admin"));
    }

    #[test]
    fn update_posts_camel_case_json() {
        let (base, server) = serve_once("200 OK", r#"{"code":0,"data":true}"#);
        let update = UserUpdate {
            id: 7,
            username: Some("neo".into()),
            user_status: Some(UserStatus::Disabled),
            user_role: Some(UserRole::Admin),
            ..Default::default()
        };
        let reply = client(&base).update_user(&update).unwrap();
        let seen = server.join().unwrap();

        assert_eq!(seen.request_line, "POST /api/user/update HTTP/1.1");
        let body: Value = serde_json::from_str(&seen.body).unwrap();
        assert_eq!(body, json!({"id": 7, "username": "neo", "userStatus": 1, "userRole": 1}));
        assert!(reply.confirm().is_ok());
    }

    #[test]
    fn delete_posts_a_bare_id() {
        let (base, server) = serve_once("200 OK", r#"{"code":0,"data":true}"#);
        client(&base).delete_user(42).unwrap();
        let seen = server.join().unwrap();

        assert_eq!(seen.request_line, "POST /api/user/delete HTTP/1.1");
        assert_eq!(seen.body, "42");
    }

    #[test]
    fn current_is_a_plain_get() {
        let (base, server) = serve_once("200 OK", r#"{"code":0,"data":{"id":3,"username":"me"}}"#);
        let me = client(&base).current_user().unwrap().into_data().unwrap();
        let seen = server.join().unwrap();

        assert_eq!(seen.request_line, "GET /api/user/current HTTP/1.1");
        assert!(seen.body.is_empty());
        assert_eq!(me.id, Some(3));
    }

    #[test]
    fn error_status_with_envelope_is_a_business_failure() {
        let (base, server) =
            serve_once("400 Bad Request", r#"{"code":40000,"data":null,"description":"邮箱已存在"}"#);
        let reply = client(&base).delete_user(5).unwrap();
        server.join().unwrap();

        assert_eq!(reply.code, 40000);
        match reply.confirm() {
            Err(ApiError::Business { code, description }) => {
                assert_eq!(code, 40000);
                assert_eq!(description.as_deref(), Some("邮箱已存在"));
            }
            other => panic!("expected a business failure, got {other:?}"),
        }
    }
}
