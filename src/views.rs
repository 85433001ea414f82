// Server-rendered pages
//
// Plain format!-built HTML. Every user-controlled value goes through `escape`.

use axum::response::Html;
use chrono::{DateTime, Utc};

use crate::auth::{middleware::AuthenticatedUser, models::PageMessage};
use crate::invites::models::Invite;
use crate::tasks::models::{Task, TaskStatus};

/// Escape text for use in HTML element content and quoted attributes
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Human-readable text for the codes carried in `?error=` / `?success=`
fn describe(code: &str) -> &'static str {
    match code {
        "missing_fields" => "Please fill in all fields.",
        "invalid_credentials" => "Invalid email or password.",
        "invalid_invite" => "This invite link is not valid.",
        "invite_expired" => "This invite has expired or was already used.",
        "email_mismatch" => "The email must match the address the invite was sent to.",
        "password_mismatch" => "Passwords do not match.",
        "password_too_short" => "Password must be at least 8 characters.",
        "invalid_email" => "Please enter a valid email address.",
        "email_exists" => "An account with this email already exists.",
        "missing_email" => "Please enter an email address.",
        "invite_created" => "Invite created.",
        "task_created" => "Task created.",
        "task_updated" => "Task updated.",
        "task_deleted" => "Task deleted.",
        "invalid_task" => "Please check the task fields.",
        _ => "Something went wrong.",
    }
}

fn flash(message: &PageMessage) -> String {
    let mut out = String::new();
    if let Some(code) = message.error.as_deref() {
        out.push_str(&format!(r#"<p class="flash error">{}</p>"#, describe(code)));
    }
    if let Some(code) = message.success.as_deref() {
        out.push_str(&format!(r#"<p class="flash success">{}</p>"#, describe(code)));
    }
    out
}

fn layout(title: &str, user: Option<&AuthenticatedUser>, body: &str) -> Html<String> {
    let nav = match user {
        Some(user) => {
            let admin_link = if user.is_admin() {
                r#"<a href="/admin/invites">Invites</a>"#
            } else {
                ""
            };
            format!(
                r#"<nav><a href="/">Tasks</a> {admin_link} <span>{email}</span>
<form method="post" action="/logout"><button type="submit">Log out</button></form></nav>"#,
                email = escape(&user.email),
            )
        }
        None => String::new(),
    };

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>{title}</title></head>
<body>
{nav}
<main>
<h1>{title}</h1>
{body}
</main>
</body>
</html>"#,
        title = escape(title),
    ))
}

fn date(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

pub fn login_page(message: &PageMessage) -> Html<String> {
    let body = format!(
        r#"{flash}
<form method="post" action="/login">
<label>Email <input type="email" name="email" required></label>
<label>Password <input type="password" name="password" required></label>
<button type="submit">Log in</button>
</form>"#,
        flash = flash(message),
    );
    layout("Log in", None, &body)
}

pub fn register_page(invite: &Invite, message: &PageMessage) -> Html<String> {
    let body = format!(
        r#"{flash}
<form method="post" action="/register/{token}">
<label>Name <input type="text" name="name" required></label>
<label>Email <input type="email" name="email" value="{email}" required></label>
<label>Password <input type="password" name="password" minlength="8" required></label>
<label>Confirm password <input type="password" name="confirm_password" minlength="8" required></label>
<button type="submit">Create account</button>
</form>"#,
        flash = flash(message),
        token = escape(&invite.token),
        email = escape(&invite.email),
    );
    layout("Register", None, &body)
}

pub fn dashboard(user: &AuthenticatedUser, tasks: &[Task], message: &PageMessage) -> Html<String> {
    let rows: String = tasks
        .iter()
        .map(|task| {
            format!(
                r#"<tr><td>{title}</td><td>{status}</td><td>{due}</td>
<td><a href="/tasks/{id}/edit">Edit</a>
<form method="post" action="/tasks/{id}/delete"><button type="submit">Delete</button></form></td></tr>"#,
                title = escape(&task.title),
                status = task.status,
                due = date(task.due_date),
                id = task.id,
            )
        })
        .collect();

    let list = if tasks.is_empty() {
        "<p>No tasks yet.</p>".to_string()
    } else {
        format!(
            "<table><thead><tr><th>Title</th><th>Status</th><th>Due</th><th></th></tr></thead><tbody>{rows}</tbody></table>"
        )
    };

    let body = format!(
        r#"{flash}<p><a href="/tasks/new">New task</a></p>{list}"#,
        flash = flash(message),
    );
    layout("My tasks", Some(user), &body)
}

/// Create form when `task` is `None`, edit form otherwise
pub fn task_form(user: &AuthenticatedUser, task: Option<&Task>, message: &PageMessage) -> Html<String> {
    let (title, action) = match task {
        Some(task) => ("Edit task", format!("/tasks/{}", task.id)),
        None => ("New task", "/tasks".to_string()),
    };
    let current = task.map(|t| t.status).unwrap_or_default();

    let options: String = TaskStatus::ALL
        .iter()
        .map(|status| {
            let selected = if *status == current { " selected" } else { "" };
            format!(r#"<option value="{s}"{selected}>{s}</option>"#, s = status.as_str())
        })
        .collect();

    let body = format!(
        r#"{flash}
<form method="post" action="{action}">
<label>Title <input type="text" name="title" value="{task_title}" required></label>
<label>Description <textarea name="description">{description}</textarea></label>
<label>Status <select name="status">{options}</select></label>
<label>Due date <input type="date" name="due_date" value="{due}"></label>
<button type="submit">Save</button>
</form>
<p><a href="/">Back</a></p>"#,
        flash = flash(message),
        task_title = task.map(|t| escape(&t.title)).unwrap_or_default(),
        description = task.map(|t| escape(&t.description)).unwrap_or_default(),
        due = date(task.and_then(|t| t.due_date)),
    );
    layout(title, Some(user), &body)
}

pub fn invites_page(user: &AuthenticatedUser, invites: &[Invite], message: &PageMessage) -> Html<String> {
    let now = Utc::now();
    let rows: String = invites
        .iter()
        .map(|invite| {
            let state = if invite.used_at.is_some() {
                "used"
            } else if invite.is_valid_at(now) {
                "pending"
            } else {
                "expired"
            };
            format!(
                r#"<tr><td>{email}</td><td>{state}</td><td>{expires}</td><td><code>/register/{token}</code></td></tr>"#,
                email = escape(&invite.email),
                expires = invite.expires_at.format("%Y-%m-%d %H:%M"),
                token = escape(&invite.token),
            )
        })
        .collect();

    let body = format!(
        r#"{flash}
<form method="post" action="/admin/invites">
<label>Email <input type="email" name="email" required></label>
<button type="submit">Create invite</button>
</form>
<table><thead><tr><th>Email</th><th>State</th><th>Expires</th><th>Link</th></tr></thead>
<tbody>{rows}</tbody></table>"#,
        flash = flash(message),
    );
    layout("Invites", Some(user), &body)
}

/// Standalone page for requests that cannot continue (bad invite link, missing task)
pub fn error_page(title: &str, detail: &str) -> Html<String> {
    layout(title, None, &format!("<p>{}</p>", escape(detail)))
}
