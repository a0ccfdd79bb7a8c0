//! Serve command - runs the Docshare web server.
//!
//! Every protected handler starts with [`guard`], which runs the session's
//! identity through the Role Gate and turns a denial into the rendered 401 or
//! 403 response. Handlers never propagate errors; each failure path resolves
//! to a page with a status code.

use std::time::Duration;

use axum::{
    Form, Json, Router,
    body::Body,
    extract::{DefaultBodyLimit, Multipart, Path, State, multipart::MultipartRejection},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use docshare::{
    Instance,
    auth::{Access, SessionIdentity},
    backend::database::SqlxBackend,
    files::FileError,
    user::{Role, User},
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};
use tokio::signal::unix::{SignalKind, signal};
use tokio_util::io::ReaderStream;
use tower_cookies::{Cookie, CookieManagerLayer, Cookies, Key, cookie::SameSite};
use url::Url;

use crate::backend::open_instance;
use crate::cli::ServeArgs;
use crate::session::SessionStore;
use crate::templates::{self, Notice};

const SESSION_COOKIE: &str = "docshare_session";
const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(600);

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    instance: Instance,
    sessions: SessionStore,
    cookie_key: Key,
    public_url: Option<Url>,
}

impl AppState {
    /// Build the state; the cookie signing key is derived from `secret`.
    pub fn new(
        instance: Instance,
        sessions: SessionStore,
        secret: &str,
        public_url: Option<Url>,
    ) -> Self {
        let digest = Sha512::digest(secret.as_bytes());
        Self {
            instance,
            sessions,
            cookie_key: Key::from(digest.as_slice()),
            public_url,
        }
    }
}

/// Login form data
#[derive(Deserialize)]
struct LoginForm {
    username: String,
    #[serde(default)]
    password: String,
}

/// Signup form data
#[derive(Deserialize)]
struct SignupForm {
    username: String,
    #[serde(default)]
    password: String,
}

/// Build the application router.
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(handle_index))
        .route("/health", get(handle_health))
        .route("/login", get(handle_login_page).post(handle_login_submit))
        .route("/signup", get(handle_signup_page).post(handle_signup_submit))
        .route("/logout", post(handle_logout))
        .route(
            "/upload-file",
            get(handle_upload_page).post(handle_upload_submit),
        )
        .route("/client-files", get(handle_client_files))
        .route("/download-file/{filename}", get(handle_download_file))
        .route("/download/{filename}", get(handle_download))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CookieManagerLayer::new())
        .with_state(state)
}

/// Run the Docshare server
pub async fn run(args: &ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.secret_key.is_empty() {
        return Err("--secret-key / DOCSHARE_SECRET_KEY must not be empty".into());
    }

    let instance = open_instance(&args.storage).await?;
    let sessions = SessionStore::new(Duration::from_secs(args.session_ttl));
    let app_state = AppState::new(
        instance.clone(),
        sessions.clone(),
        &args.secret_key,
        args.public_url.clone(),
    );
    let app = router(app_state, args.max_upload_bytes);

    // Expired sessions are also dropped on access; this bounds memory for
    // sessions that are never used again.
    let purge_sessions = sessions.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_PURGE_INTERVAL);
        loop {
            interval.tick().await;
            let purged = purge_sessions.purge_expired().await;
            if purged > 0 {
                let remaining = purge_sessions.session_count().await;
                tracing::debug!(purged, remaining, "Purged expired sessions");
            }
        }
    });

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        addr = %local_addr,
        backend = instance.backend().kind_label(),
        upload_dir = %instance.storage().root().display(),
        "Docshare server listening"
    );
    println!("Docshare listening on http://{local_addr}");
    println!();
    println!("Available endpoints:");
    println!("  GET      /                        - Landing page");
    println!("  GET/POST /login                   - Login");
    println!("  GET/POST /signup                  - Create a client account");
    println!("  POST     /logout                  - End the session");
    println!("  GET/POST /upload-file             - Upload a document (operation)");
    println!("  GET      /client-files            - List documents (client)");
    println!("  GET      /download-file/<name>    - Download reference (client)");
    println!("  GET      /download/<name>         - Document bytes (client)");
    println!("  GET      /health                  - Health check");
    println!();
    println!("Press Ctrl+C to shutdown");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(sql) = instance.backend().as_any().downcast_ref::<SqlxBackend>() {
        sql.pool().close().await;
        tracing::info!("Closed database connections");
    }

    println!("Server shut down");
    Ok(())
}

/// Resolve on SIGTERM or SIGINT.
async fn shutdown_signal() {
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(e) => {
            tracing::warn!("Failed to set up SIGTERM handler: {e}");
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for SIGINT: {e}");
            }
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => tracing::info!("Received SIGTERM, initiating graceful shutdown..."),
        _ = tokio::signal::ctrl_c() => tracing::info!("Received SIGINT, initiating graceful shutdown..."),
    }
}

// ============================================================================
// Sessions and Gates
// ============================================================================

/// The session token and identity carried by the request, if any.
async fn current_session(state: &AppState, cookies: &Cookies) -> Option<(String, SessionIdentity)> {
    let cookie = cookies.signed(&state.cookie_key).get(SESSION_COOKIE)?;
    let token = cookie.value().to_string();
    let identity = state.sessions.get_identity(&token).await?;
    Some((token, identity))
}

fn session_cookie(token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie
}

fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::from(SESSION_COOKIE);
    cookie.set_path("/");
    cookie
}

fn unauthenticated() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Html(templates::login_page(Some(Notice::Error(
            "Authentication failed",
        )))),
    )
        .into_response()
}

fn internal_error(message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(templates::error_page(message)),
    )
        .into_response()
}

/// Session Gate plus Role Gate for one request.
///
/// A session that no longer resolves is destroyed so its cookie stops working.
async fn guard(state: &AppState, cookies: &Cookies, role: Role) -> Result<User, Response> {
    let session = current_session(state, cookies).await;
    let identity = session.as_ref().map(|(_, identity)| identity);

    match state.instance.check_role(identity, role).await {
        Ok(Access::Granted(user)) => Ok(user),
        Ok(Access::Unauthenticated) => {
            if let Some((token, _)) = &session {
                state.sessions.destroy_session(token).await;
                cookies.signed(&state.cookie_key).remove(removal_cookie());
            }
            Err(unauthenticated())
        }
        Ok(Access::Forbidden { .. }) => {
            Err((StatusCode::FORBIDDEN, Html(templates::forbidden_page())).into_response())
        }
        Err(e) => {
            tracing::error!(error = %e, "Gate check failed");
            Err(internal_error("Could not verify your session"))
        }
    }
}

// ============================================================================
// Authentication Handlers
// ============================================================================

/// Handler for GET / - Landing page
async fn handle_index(State(state): State<AppState>, cookies: Cookies) -> Html<String> {
    let user = match current_session(&state, &cookies).await {
        Some((_, identity)) => match state.instance.check_session(Some(&identity)).await {
            Ok(Access::Granted(user)) => Some(user),
            _ => None,
        },
        None => None,
    };
    Html(templates::landing_page(user.as_ref()))
}

/// Handler for GET /login - Show login page
async fn handle_login_page() -> Html<String> {
    Html(templates::login_page(None))
}

/// Handler for POST /login - Process login
async fn handle_login_submit(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<LoginForm>,
) -> Response {
    match state.instance.login(&form.username, &form.password).await {
        Ok(user) => {
            if let Some((old_token, _)) = current_session(&state, &cookies).await {
                state.sessions.destroy_session(&old_token).await;
            }
            let token = state
                .sessions
                .create_session(SessionIdentity::for_user(&user))
                .await;
            cookies
                .signed(&state.cookie_key)
                .add(session_cookie(token));

            let target = match user.role {
                Role::Operation => "/upload-file",
                Role::Client => "/client-files",
            };
            Redirect::to(target).into_response()
        }
        Err(e) if e.is_authentication_error() => (
            StatusCode::UNAUTHORIZED,
            Html(templates::login_page(Some(Notice::Error(
                "Invalid credentials",
            )))),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Login failed");
            internal_error("Login is currently unavailable")
        }
    }
}

/// Handler for POST /logout - Logout and destroy session
async fn handle_logout(State(state): State<AppState>, cookies: Cookies) -> Redirect {
    if let Some((token, identity)) = current_session(&state, &cookies).await {
        state.sessions.destroy_session(&token).await;
        tracing::info!(username = %identity.username, "Logged out");
    }
    cookies.signed(&state.cookie_key).remove(removal_cookie());
    Redirect::to("/login")
}

/// Handler for GET /signup - Show signup page
async fn handle_signup_page() -> Html<String> {
    Html(templates::signup_page(None))
}

/// Handler for POST /signup - Create a client account
async fn handle_signup_submit(
    State(state): State<AppState>,
    Form(form): Form<SignupForm>,
) -> Response {
    match state.instance.signup(&form.username, &form.password).await {
        Ok(_) => Redirect::to("/login").into_response(),
        Err(e) if e.is_conflict() => {
            Html(templates::signup_page(Some("Username already exists"))).into_response()
        }
        Err(e) if e.is_validation_error() => {
            Html(templates::signup_page(Some("Username cannot be empty"))).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Signup failed");
            internal_error("Signup is currently unavailable")
        }
    }
}

// ============================================================================
// Upload Handlers
// ============================================================================

/// Handler for GET /upload-file - Show the upload form
async fn handle_upload_page(State(state): State<AppState>, cookies: Cookies) -> Response {
    match guard(&state, &cookies, Role::Operation).await {
        Ok(user) => Html(templates::upload_page(&user, None)).into_response(),
        Err(denied) => denied,
    }
}

/// Handler for POST /upload-file - Accept an upload
///
/// The gate runs before the body is read, so a rejected request writes nothing.
/// A body that is not multipart is only reported once the gate has passed.
async fn handle_upload_submit(
    State(state): State<AppState>,
    cookies: Cookies,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let user = match guard(&state, &cookies, Role::Operation).await {
        Ok(user) => user,
        Err(denied) => return denied,
    };

    let mut multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            tracing::debug!(%rejection, "Upload without a multipart body");
            return upload_response(&user, StatusCode::OK, Notice::Error("No file uploaded"));
        }
    };

    let render = |status: StatusCode, notice: Notice<'_>| upload_response(&user, status, notice);

    // A missing part is reported as an empty filename, which the upload rejects as NoFile.
    let mut filename = String::new();
    let mut bytes = Vec::new();
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("file") => {
                filename = field.file_name().unwrap_or_default().to_string();
                match field.bytes().await {
                    Ok(data) => bytes = data.to_vec(),
                    Err(e) => {
                        return upload_response(&user, e.status(), Notice::Error(&e.body_text()));
                    }
                }
                break;
            }
            Ok(Some(_)) => continue,
            Ok(None) => break,
            Err(e) => return upload_response(&user, e.status(), Notice::Error(&e.body_text())),
        }
    }

    match state.instance.upload(&user, &filename, &bytes).await {
        Ok(_) => render(StatusCode::OK, Notice::Success("File uploaded")),
        Err(docshare::Error::File(FileError::NoFile)) => {
            render(StatusCode::OK, Notice::Error("No file uploaded"))
        }
        Err(docshare::Error::File(FileError::BadFileType { .. })) => render(
            StatusCode::OK,
            Notice::Error("Only .pptx, .docx, .xlsx are allowed"),
        ),
        Err(docshare::Error::File(FileError::InvalidFilename)) => {
            render(StatusCode::OK, Notice::Error("Filename is not usable"))
        }
        Err(e) => {
            tracing::error!(error = %e, "Upload failed");
            render(
                StatusCode::INTERNAL_SERVER_ERROR,
                Notice::Error("Failed to store the file"),
            )
        }
    }
}

fn upload_response(user: &User, status: StatusCode, notice: Notice<'_>) -> Response {
    (status, Html(templates::upload_page(user, Some(notice)))).into_response()
}

// ============================================================================
// Retrieval Handlers
// ============================================================================

/// Handler for GET /client-files - List uploaded files
async fn handle_client_files(State(state): State<AppState>, cookies: Cookies) -> Response {
    if let Err(denied) = guard(&state, &cookies, Role::Client).await {
        return denied;
    }

    match state.instance.list_files().await {
        Ok(files) => Html(templates::client_files_page(&files)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Listing files failed");
            internal_error("Could not list files")
        }
    }
}

/// Base URL for download references: the configured public URL, else the request Host.
fn reference_base(state: &AppState, headers: &HeaderMap) -> Option<Url> {
    if let Some(url) = &state.public_url {
        return Some(url.clone());
    }
    let host = headers.get(header::HOST)?.to_str().ok()?;
    Url::parse(&format!("http://{host}/")).ok()
}

/// Handler for GET /download-file/{filename} - Show the download reference
async fn handle_download_file(
    State(state): State<AppState>,
    cookies: Cookies,
    headers: HeaderMap,
    Path(filename): Path<String>,
) -> Response {
    if let Err(denied) = guard(&state, &cookies, Role::Client).await {
        return denied;
    }

    let Some(base) = reference_base(&state, &headers) else {
        return (
            StatusCode::BAD_REQUEST,
            Html(templates::download_page(
                &filename,
                None,
                Some("Missing Host header"),
            )),
        )
            .into_response();
    };

    match state.instance.download_url(&base, &filename).await {
        Ok(url) => Html(templates::download_page(&filename, Some(&url), None)).into_response(),
        Err(e) if e.is_not_found() => (
            StatusCode::NOT_FOUND,
            Html(templates::download_page(&filename, None, Some("File not found"))),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, filename = %filename, "Locating file failed");
            internal_error("Could not locate the file")
        }
    }
}

fn content_type_for(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => "application/octet-stream",
    }
}

/// Handler for GET /download/{filename} - Stream the file bytes
async fn handle_download(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(filename): Path<String>,
) -> Response {
    if let Err(denied) = guard(&state, &cookies, Role::Client).await {
        return denied;
    }

    let stored = match state.instance.fetch_file(&filename).await {
        Ok(stored) => stored,
        Err(e) if e.is_not_found() => {
            return (
                StatusCode::NOT_FOUND,
                Html(templates::download_page(&filename, None, Some("File not found"))),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!(error = %e, filename = %filename, "Opening file failed");
            return internal_error("Could not read the file");
        }
    };

    // Stored names only contain [A-Za-z0-9_.-], so they need no quoting beyond the quotes.
    let disposition = match HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        stored.filename
    )) {
        Ok(value) => value,
        Err(_) => HeaderValue::from_static("attachment"),
    };

    let mut response = Body::from_stream(ReaderStream::new(stored.file)).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_DISPOSITION, disposition);
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(content_type_for(&stored.filename)),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(stored.len));
    response
}

// ============================================================================
// Health
// ============================================================================

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    backend: &'static str,
}

/// Handler for GET /health - Health check endpoint
async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        backend: state.instance.backend().kind_label(),
    })
}
