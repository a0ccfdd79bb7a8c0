//! HTML templates for web interface
//!
//! Simple inline HTML templates without a template engine. Every interpolated
//! value goes through [`html_escape`].

use docshare::{constants::ALLOWED_EXTENSIONS, files::UploadedFile, user::User};
use url::Url;

/// Common CSS styles for all pages
const COMMON_STYLES: &str = r#"
    body {
        font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
        max-width: 800px;
        margin: 40px auto;
        padding: 0 20px;
        background: #f5f5f5;
    }
    .container {
        background: white;
        padding: 30px;
        border-radius: 8px;
        box-shadow: 0 2px 4px rgba(0,0,0,0.1);
    }
    h1 {
        color: #333;
        border-bottom: 2px solid #0066cc;
        padding-bottom: 10px;
    }
    .form-group {
        margin: 15px 0;
    }
    label {
        display: block;
        font-weight: bold;
        margin-bottom: 5px;
        color: #333;
    }
    input[type="text"],
    input[type="password"] {
        width: 100%;
        padding: 10px;
        border: 1px solid #ddd;
        border-radius: 4px;
        font-size: 14px;
        box-sizing: border-box;
    }
    button {
        background: #0066cc;
        color: white;
        padding: 10px 20px;
        border: none;
        border-radius: 4px;
        cursor: pointer;
        font-size: 14px;
        font-weight: bold;
    }
    .logout-btn {
        background: #999;
        float: right;
    }
    table {
        width: 100%;
        border-collapse: collapse;
        margin: 20px 0;
    }
    th, td {
        text-align: left;
        padding: 12px;
        border-bottom: 1px solid #ddd;
    }
    th {
        background: #f0f0f0;
    }
    .error {
        color: #d9534f;
        background: #f2dede;
        padding: 10px;
        border-radius: 4px;
        margin: 10px 0;
    }
    .success {
        color: #3c763d;
        background: #dff0d8;
        padding: 10px;
        border-radius: 4px;
        margin: 10px 0;
    }
    .code {
        font-family: monospace;
        background: #f5f5f5;
        padding: 2px 6px;
        border-radius: 3px;
    }
"#;

/// A one-line message shown above a form.
#[derive(Debug, Clone, Copy)]
pub enum Notice<'a> {
    Success(&'a str),
    Error(&'a str),
}

fn notice_html(notice: Option<Notice<'_>>) -> String {
    match notice {
        Some(Notice::Success(msg)) => format!(r#"<div class="success">{}</div>"#, html_escape(msg)),
        Some(Notice::Error(msg)) => format!(r#"<div class="error">{}</div>"#, html_escape(msg)),
        None => String::new(),
    }
}

const LOGOUT_FORM: &str = r#"<form method="POST" action="/logout" style="display: inline;">
                <button type="submit" class="logout-btn">Logout</button>
            </form>"#;

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Docshare - {title}</title>
    <style>{COMMON_STYLES}</style>
</head>
<body>
    <div class="container">
        {body}
    </div>
</body>
</html>"#,
        title = html_escape(title),
    )
}

/// Render the landing page
pub fn landing_page(user: Option<&User>) -> String {
    let body = match user {
        Some(user) => format!(
            r#"<h1>Docshare {LOGOUT_FORM}</h1>
        <p>Logged in as <span class="code">{}</span> ({}).</p>
        <ul>
            <li><a href="/upload-file">Upload a document</a></li>
            <li><a href="/client-files">Browse documents</a></li>
        </ul>"#,
            html_escape(&user.username),
            user.role,
        ),
        None => r#"<h1>Docshare</h1>
        <p>Share PowerPoint, Word and Excel documents.</p>
        <ul>
            <li><a href="/login">Login</a></li>
            <li><a href="/signup">Create an account</a></li>
        </ul>"#
            .to_string(),
    };
    page("Home", &body)
}

/// Render the login page
pub fn login_page(notice: Option<Notice<'_>>) -> String {
    let body = format!(
        r#"<h1>Login</h1>
        {notice}
        <form method="POST" action="/login">
            <div class="form-group">
                <label for="username">Username:</label>
                <input type="text" id="username" name="username" required autofocus>
            </div>
            <div class="form-group">
                <label for="password">Password:</label>
                <input type="password" id="password" name="password">
            </div>
            <button type="submit">Login</button>
        </form>
        <p style="margin-top: 20px; text-align: center;">
            Don't have an account? <a href="/signup">Sign up here</a>
        </p>"#,
        notice = notice_html(notice),
    );
    page("Login", &body)
}

/// Render the signup page
pub fn signup_page(error: Option<&str>) -> String {
    let body = format!(
        r#"<h1>Create Account</h1>
        {notice}
        <form method="POST" action="/signup">
            <div class="form-group">
                <label for="username">Username:</label>
                <input type="text" id="username" name="username" required autofocus>
            </div>
            <div class="form-group">
                <label for="password">Password:</label>
                <input type="password" id="password" name="password">
            </div>
            <button type="submit">Sign up</button>
        </form>
        <p style="margin-top: 20px; text-align: center;">
            Already have an account? <a href="/login">Login here</a>
        </p>"#,
        notice = notice_html(error.map(Notice::Error)),
    );
    page("Sign up", &body)
}

/// Render the upload form
pub fn upload_page(user: &User, notice: Option<Notice<'_>>) -> String {
    let accept: Vec<String> = ALLOWED_EXTENSIONS.iter().map(|e| format!(".{e}")).collect();
    let body = format!(
        r#"<h1>Upload Document {LOGOUT_FORM}</h1>
        <p>Uploading as <span class="code">{username}</span>.</p>
        {notice}
        <form method="POST" action="/upload-file" enctype="multipart/form-data">
            <div class="form-group">
                <label for="file">Document ({accept_list}):</label>
                <input type="file" id="file" name="file" accept="{accept_attr}">
            </div>
            <button type="submit">Upload</button>
        </form>"#,
        username = html_escape(&user.username),
        notice = notice_html(notice),
        accept_list = html_escape(&accept.join(", ")),
        accept_attr = html_escape(&accept.join(",")),
    );
    page("Upload", &body)
}

/// Render the file list for clients
pub fn client_files_page(files: &[UploadedFile]) -> String {
    let listing = if files.is_empty() {
        r#"<p style="color: #666; font-style: italic;">No documents uploaded yet.</p>"#
            .to_string()
    } else {
        let rows: String = files
            .iter()
            .map(|f| {
                format!(
                    r#"<tr>
                    <td><a href="/download-file/{href}">{name}</a></td>
                    <td>{uploader}</td>
                </tr>"#,
                    href = html_escape(&path_segment(&f.filename)),
                    name = html_escape(&f.filename),
                    uploader = html_escape(&f.uploader),
                )
            })
            .collect();
        format!(
            r#"<table>
            <tr>
                <th>File</th>
                <th>Uploaded by</th>
            </tr>
            {rows}
        </table>"#
        )
    };

    let body = format!(r#"<h1>Documents {LOGOUT_FORM}</h1>
        {listing}"#);
    page("Documents", &body)
}

/// Render the download confirmation page
///
/// Shows the reference when `url` is present, otherwise the `error`.
pub fn download_page(filename: &str, url: Option<&Url>, error: Option<&str>) -> String {
    let content = match url {
        Some(url) => format!(
            r#"<p>Your download of <span class="code">{name}</span> is ready.</p>
        <p><a href="{href}">Download {name}</a></p>"#,
            name = html_escape(filename),
            href = html_escape(url.as_str()),
        ),
        None => notice_html(Some(Notice::Error(error.unwrap_or("File not found")))),
    };
    let body = format!(
        r#"<h1>Download</h1>
        {content}
        <p><a href="/client-files">Back to documents</a></p>"#
    );
    page("Download", &body)
}

/// Render the page shown when the Role Gate denies a request
pub fn forbidden_page() -> String {
    page(
        "Forbidden",
        r#"<h1>Access denied</h1>
        <p>Your account is not allowed to use this page.</p>
        <p><a href="/">Home</a></p>"#,
    )
}

/// Render a generic failure page
pub fn error_page(message: &str) -> String {
    let body = format!(
        r#"<h1>Something went wrong</h1>
        {}
        <p><a href="/">Home</a></p>"#,
        notice_html(Some(Notice::Error(message)))
    );
    page("Error", &body)
}

/// Percent-encode a filename for use as one path segment.
fn path_segment(name: &str) -> String {
    let Ok(mut url) = Url::parse("http://localhost/") else {
        return name.to_string();
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.clear().push(name);
    }
    url.path().trim_start_matches('/').to_string()
}

/// Escape HTML special characters
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
