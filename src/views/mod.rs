//! Server-rendered views.
//!
//! DESIGN
//! ======
//! Views are Leptos components rendered to HTML strings per request; there
//! is no hydration. Each page takes everything it shows as props (the
//! session-derived username included), so views never reach back into the
//! backend on their own.

pub mod composer;
pub mod feed;
pub mod landing;
pub mod nav;

use leptos::prelude::*;

/// One-shot messages carried across a redirect in the `notice` query param.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    PostCreated,
    LoginRequired,
}

impl Notice {
    #[must_use]
    pub fn from_query(raw: Option<&str>) -> Option<Self> {
        match raw? {
            "post-created" => Some(Self::PostCreated),
            "login-required" => Some(Self::LoginRequired),
            _ => None,
        }
    }

    #[must_use]
    pub fn query_value(self) -> &'static str {
        match self {
            Self::PostCreated => "post-created",
            Self::LoginRequired => "login-required",
        }
    }

    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::PostCreated => "Post created successfully!",
            Self::LoginRequired => "You need to log in to like a post.",
        }
    }
}

/// Wrap a page body in the HTML document shell and render it.
#[must_use]
pub fn document(title: &str, body: AnyView) -> String {
    let title = format!("{title} · Feedboard");
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <title>{title}</title>
            </head>
            <body>{body}</body>
        </html>
    }
    .to_html()
}

/// Flash banner for a redirect notice.
#[component]
pub fn NoticeBanner(notice: Option<Notice>) -> impl IntoView {
    notice.map(|notice| {
        view! { <p class="notice" role="status">{notice.message()}</p> }
    })
}
