//! Session HTTP client for the AI Executive Team API.
//!
//! Every outbound request flows through [`SessionClient::request`], which
//! attaches the bearer token, applies the bounded retry policy to the
//! identity-check endpoint, and on a rejected session clears stored
//! credentials and (subject to the redirect guard) forces navigation to
//! the sign-in screen with the interrupted path as the return target.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use reqwest::{multipart, Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::auth::{Navigator, RedirectGuard, SessionStore};
use crate::config::Config;
use crate::models::{
    Conversation, Document, DocumentReceipt, DocumentSearchResponse, Executive, LoginResponse,
    Message, NewUser, UserProfile, UserUpdate,
};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Prefix of the authentication endpoints. 401s from these bypass the
/// redirect policy so the login page can render the failure inline, and
/// request logging is suppressed for them.
const AUTH_PREFIX: &str = "/auth/";

/// OAuth2 token login endpoint (form-encoded credentials)
const LOGIN_PATH: &str = "/auth/login/access-token";

/// Account registration endpoint
const REGISTER_PATH: &str = "/auth/register";

/// Canonical identity-check endpoint, used for session bootstrap and the
/// token-validity probe
const IDENTITY_PATH: &str = "/users/me";

/// Request body variants the client can replay across retry attempts.
pub enum Payload {
    Empty,
    Json(serde_json::Value),
    Form(Vec<(String, String)>),
}

/// Per-call overrides merged into the request.
#[derive(Default)]
pub struct RequestOptions {
    pub headers: Vec<(String, String)>,
    pub timeout: Option<Duration>,
}

/// Session-aware API client.
/// Clone is cheap - the policy state and connection pool are shared.
#[derive(Clone)]
pub struct SessionClient {
    inner: Arc<Inner>,
}

struct Inner {
    http: Client,
    config: Config,
    store: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
    /// Failed-attempt counts per URL; entries are removed once a request
    /// succeeds or gives up.
    retry_ledger: Mutex<HashMap<String, u32>>,
    guard: RedirectGuard,
}

impl SessionClient {
    pub fn new(
        config: Config,
        store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let guard = RedirectGuard::new(Duration::from_millis(config.redirect.cooldown_ms));

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                config,
                store,
                navigator,
                retry_ledger: Mutex::new(HashMap::new()),
                guard,
            }),
        })
    }

    /// Clear retry and redirect bookkeeping. Called on logout; tests use it
    /// to start from a known state.
    pub fn reset(&self) {
        self.inner.retry_ledger.lock().clear();
        self.inner.guard.reset();
    }

    /// Shared session state, for UIs that read the cached profile or
    /// consume the pending return path directly.
    pub fn store(&self) -> Arc<dyn SessionStore> {
        Arc::clone(&self.inner.store)
    }

    // ===== Request pipeline =====

    /// Issue a request against the configured base address. The path is
    /// appended verbatim - callers must match the server's trailing-slash
    /// convention. The bearer token is re-read from the store on every
    /// attempt so a concurrent re-login is picked up mid-retry.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        payload: Payload,
        options: RequestOptions,
    ) -> Result<Response, ApiError> {
        let url = format!("{}{}", self.inner.config.base_url, path);

        loop {
            match self.attempt(&method, &url, path, &payload, &options).await {
                Ok(response) => {
                    self.clear_attempts(&url);
                    return Ok(response);
                }
                Err(err) => {
                    let attempts = self.record_attempt(&url);
                    if let Some(delay) = self.retry_delay(path, &err, attempts) {
                        warn!(
                            url = %url,
                            attempt = attempts,
                            delay_ms = delay.as_millis() as u64,
                            error = %err,
                            "Request failed, backing off"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    self.clear_attempts(&url);
                    if matches!(err, ApiError::Unauthorized(_)) {
                        self.handle_unauthorized(&method, path);
                    }
                    return Err(err);
                }
            }
        }
    }

    async fn attempt(
        &self,
        method: &Method,
        url: &str,
        path: &str,
        payload: &Payload,
        options: &RequestOptions,
    ) -> Result<Response, ApiError> {
        let mut request = self.inner.http.request(method.clone(), url);

        if let Some(token) = self.inner.store.token() {
            request = request.bearer_auth(token);
        }

        match payload {
            Payload::Empty => {}
            Payload::Json(value) => request = request.json(value),
            Payload::Form(fields) => request = request.form(fields),
        }

        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(timeout) = options.timeout {
            request = request.timeout(timeout);
        }

        // Credentials travel through the auth endpoints; keep them out of
        // the logs entirely.
        if !is_auth_path(path) {
            debug!(method = %method, path, "Sending request");
        }

        let response = request.send().await.map_err(classify_send_error)?;
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_status(status, &body))
    }

    /// Single-attempt multipart request. Multipart bodies are consumed on
    /// send and cannot be replayed, so uploads are never retried.
    pub async fn upload<T: DeserializeOwned>(
        &self,
        path: &str,
        form: multipart::Form,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.inner.config.base_url, path);
        let mut request = self.inner.http.post(&url).multipart(form);

        if let Some(token) = self.inner.store.token() {
            request = request.bearer_auth(token);
        }
        debug!(path, "Sending multipart request");

        let outcome = match request.send().await.map_err(classify_send_error) {
            Ok(response) if response.status().is_success() => Ok(response),
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                Err(ApiError::from_status(status, &body))
            }
            Err(err) => Err(err),
        };

        match outcome {
            Ok(response) => Self::decode(response, path).await,
            Err(err) => {
                if matches!(err, ApiError::Unauthorized(_)) {
                    self.handle_unauthorized(&Method::POST, path);
                }
                Err(err)
            }
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response, path: &str) -> Result<T, ApiError> {
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("{path}: {e}")))
    }

    // ===== Typed convenience wrappers =====

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .request(Method::GET, path, Payload::Empty, RequestOptions::default())
            .await?;
        Self::decode(response, path).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let value = serde_json::to_value(body).map_err(ApiError::Encode)?;
        let response = self
            .request(Method::POST, path, Payload::Json(value), RequestOptions::default())
            .await?;
        Self::decode(response, path).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let value = serde_json::to_value(body).map_err(ApiError::Encode)?;
        let response = self
            .request(Method::PUT, path, Payload::Json(value), RequestOptions::default())
            .await?;
        Self::decode(response, path).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .request(Method::DELETE, path, Payload::Empty, RequestOptions::default())
            .await?;
        Self::decode(response, path).await
    }

    // ===== Retry policy =====

    /// Decide whether the failed attempt should be retried, and after what
    /// delay. Only allow-listed paths qualify, and only for client-side
    /// timeouts or a 401 (a concurrent re-login may have refreshed the
    /// token by the time the retry fires).
    fn retry_delay(&self, path: &str, err: &ApiError, attempts: u32) -> Option<Duration> {
        let retry = &self.inner.config.retry;
        if attempts > retry.max_retries {
            return None;
        }
        if !retry.endpoints.iter().any(|endpoint| endpoint == path) {
            return None;
        }
        match err {
            ApiError::Timeout | ApiError::Unauthorized(_) => {}
            _ => return None,
        }
        Some(Duration::from_millis(
            retry.initial_backoff_ms * 2u64.pow(attempts - 1),
        ))
    }

    fn record_attempt(&self, url: &str) -> u32 {
        let mut ledger = self.inner.retry_ledger.lock();
        let entry = ledger.entry(url.to_string()).or_insert(0);
        *entry += 1;
        *entry
    }

    fn clear_attempts(&self, url: &str) {
        self.inner.retry_ledger.lock().remove(url);
    }

    // ===== Redirect policy =====

    /// A non-auth endpoint rejected the session. The token and cached
    /// profile are dropped unconditionally; navigation to the sign-in
    /// screen happens only when the cooldown has elapsed, the app is
    /// visible, and the failed request was an active user action rather
    /// than a background read.
    fn handle_unauthorized(&self, method: &Method, path: &str) {
        if is_auth_path(path) {
            return;
        }

        let redirect = &self.inner.config.redirect;
        self.inner.store.clear_session();

        let current = self.inner.navigator.current_path();
        if on_login_screen(&current, &redirect.login_screen) {
            debug!(path, "Session rejected while already on the sign-in screen");
            return;
        }
        self.inner.store.set_return_path(&current);

        let exempt = redirect
            .exempt_methods
            .iter()
            .any(|m| m.eq_ignore_ascii_case(method.as_str()));
        if exempt {
            debug!(path, method = %method, "Session rejected on a background read, redirect deferred");
            return;
        }
        if !self.inner.navigator.is_visible() {
            debug!(path, "Application not visible, redirect deferred");
            return;
        }
        if !self.inner.guard.try_acquire() {
            debug!(path, "Redirect suppressed by cooldown");
            return;
        }

        let target = login_redirect_target(&redirect.login_screen, &current);
        warn!(path, to = %target, "Session rejected, redirecting to sign-in");
        self.inner.navigator.navigate(&target);
    }

    // ===== Session operations =====

    /// Exchange credentials for a token. On success the token and a
    /// minimal profile are written to the session store; the pending
    /// return path is left for the caller to consume.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let fields = vec![
            ("username".to_string(), email.to_string()),
            ("password".to_string(), password.to_string()),
        ];
        let response = self
            .request(Method::POST, LOGIN_PATH, Payload::Form(fields), RequestOptions::default())
            .await?;
        let login: LoginResponse = Self::decode(response, LOGIN_PATH).await?;

        self.inner.store.set_token(&login.access_token);
        self.inner.store.set_profile(&UserProfile {
            id: login.user_id,
            email: login.email.clone(),
            full_name: None,
            is_active: true,
            is_superuser: login.is_superuser,
        });
        Ok(login)
    }

    pub async fn register(&self, new_user: &NewUser) -> Result<UserProfile, ApiError> {
        self.post(REGISTER_PATH, new_user).await
    }

    /// Client-side sign-out: the server holds no session state to revoke.
    pub fn logout(&self) {
        self.inner.store.clear_session();
        self.reset();
    }

    /// Path saved when a forced re-authentication interrupted the user,
    /// cleared on read.
    pub fn take_return_path(&self) -> Option<String> {
        self.inner.store.take_return_path()
    }

    /// Probe the identity endpoint to classify the stored token. Failures
    /// other than a 401 keep the session alive when
    /// `keep_session_on_network_error` is set - a flaky connection is not
    /// proof the token is bad.
    pub async fn token_is_valid(&self) -> bool {
        if self.inner.store.token().is_none() {
            return false;
        }
        let result = self
            .request(Method::GET, IDENTITY_PATH, Payload::Empty, RequestOptions::default())
            .await;
        probe_verdict(
            result.err().as_ref(),
            self.inner.config.keep_session_on_network_error,
        )
    }

    // ===== Users =====

    pub async fn me(&self) -> Result<UserProfile, ApiError> {
        self.get(IDENTITY_PATH).await
    }

    pub async fn list_users(&self, skip: u32, limit: u32) -> Result<Vec<UserProfile>, ApiError> {
        self.get(&format!("/users/?skip={skip}&limit={limit}")).await
    }

    pub async fn update_user(
        &self,
        user_id: i64,
        update: &UserUpdate,
    ) -> Result<UserProfile, ApiError> {
        self.put(&format!("/users/{user_id}"), update).await
    }

    pub async fn delete_user(&self, user_id: i64) -> Result<UserProfile, ApiError> {
        self.delete(&format!("/users/{user_id}")).await
    }

    // ===== Documents =====

    pub async fn list_documents(&self, skip: u32, limit: u32) -> Result<Vec<Document>, ApiError> {
        self.get(&format!("/documents/?skip={skip}&limit={limit}")).await
    }

    pub async fn upload_document(
        &self,
        title: &str,
        description: Option<&str>,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<DocumentReceipt, ApiError> {
        let part = multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)?;
        let mut form = multipart::Form::new()
            .text("title", title.to_string())
            .part("file", part);
        if let Some(description) = description {
            form = form.text("description", description.to_string());
        }
        self.upload("/documents/", form).await
    }

    pub async fn search_documents(
        &self,
        query: &str,
        top_k: u32,
    ) -> Result<DocumentSearchResponse, ApiError> {
        let body = serde_json::json!({ "query": query, "top_k": top_k });
        self.post("/documents/search", &body).await
    }

    // ===== Conversations =====

    pub async fn list_conversations(
        &self,
        user_id: Option<i64>,
        skip: u32,
        limit: u32,
    ) -> Result<Vec<Conversation>, ApiError> {
        let mut path = format!("/conversations/?skip={skip}&limit={limit}");
        if let Some(user_id) = user_id {
            path.push_str(&format!("&user_id={user_id}"));
        }
        self.get(&path).await
    }

    pub async fn create_conversation(
        &self,
        user_id: i64,
        title: Option<&str>,
    ) -> Result<Conversation, ApiError> {
        let body = serde_json::json!({ "user_id": user_id, "title": title });
        self.post("/conversations/", &body).await
    }

    pub async fn send_message(
        &self,
        conversation_id: i64,
        content: &str,
    ) -> Result<Message, ApiError> {
        let body = serde_json::json!({
            "conversation_id": conversation_id,
            "content": content,
            "sender_type": "user",
        });
        self.post(&format!("/conversations/{conversation_id}/messages"), &body)
            .await
    }

    /// Submit a task for the AI CEO to work on within a conversation.
    pub async fn submit_task(
        &self,
        conversation_id: i64,
        description: &str,
    ) -> Result<Message, ApiError> {
        let body = serde_json::json!({
            "conversation_id": conversation_id,
            "task_description": description,
        });
        self.post(&format!("/conversations/{conversation_id}/task"), &body)
            .await
    }

    // ===== Executives =====

    pub async fn list_executives(&self, skip: u32, limit: u32) -> Result<Vec<Executive>, ApiError> {
        self.get(&format!("/executives/?skip={skip}&limit={limit}")).await
    }
}

// ============================================================================
// Policy helpers
// ============================================================================

fn is_auth_path(path: &str) -> bool {
    path.starts_with(AUTH_PREFIX)
}

fn on_login_screen(current: &str, login_screen: &str) -> bool {
    current == login_screen
        || (current.starts_with(login_screen)
            && current[login_screen.len()..].starts_with('?'))
}

fn login_redirect_target(login_screen: &str, return_to: &str) -> String {
    format!("{}?redirect={}", login_screen, urlencoding::encode(return_to))
}

fn classify_send_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Network(err)
    }
}

/// Classify the identity-probe outcome. `None` means the probe succeeded.
fn probe_verdict(error: Option<&ApiError>, keep_on_network_error: bool) -> bool {
    match error {
        None => true,
        Some(ApiError::Unauthorized(_)) => false,
        Some(_) => keep_on_network_error,
    }
}
