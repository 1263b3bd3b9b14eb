//! Landing page: email + password sign-in.

use leptos::prelude::*;

use super::{Notice, NoticeBanner, document};

#[component]
fn SignInForm(email: String, error: Option<String>) -> impl IntoView {
    view! {
        <form method="post" action="/login" class="sign-in">
            {error.map(|message| view! { <p class="error" role="alert">{message}</p> })}
            <label>
                "Email"
                <input type="email" name="email" value=email required=true/>
            </label>
            <label>
                "Password"
                <input type="password" name="password" required=true/>
            </label>
            <button type="submit">"Sign in"</button>
        </form>
    }
}

/// Render the landing page. `email` refills the form after a failed attempt.
#[must_use]
pub fn render(notice: Option<Notice>, error: Option<String>, email: String) -> String {
    let body = view! {
        <main class="landing">
            <h1>"Welcome"</h1>
            <NoticeBanner notice=notice/>
            <SignInForm email=email error=error/>
        </main>
    };
    document("Sign in", body.into_any())
}
