//! Post composer page.

use leptos::prelude::*;

use super::document;
use super::nav::NavBar;

/// Render the composer. `content` refills the textarea after a failed submit.
#[must_use]
pub fn render(username: Option<String>, error: Option<String>, content: String) -> String {
    let body = view! {
        <NavBar username=username/>
        <main class="composer">
            <h1>"Create a Post"</h1>
            {error.map(|message| view! { <p class="error" role="alert">{message}</p> })}
            <form method="post" action="/create-post">
                <textarea name="content" placeholder="What's on your mind?" required=true>{content}</textarea>
                <button type="submit">"Post"</button>
            </form>
        </main>
    };
    document("Create a Post", body.into_any())
}
