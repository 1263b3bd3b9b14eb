//! Navigation bar: feed / composer links, identity chip, logout.

use leptos::prelude::*;

/// Top navigation. The identity chip is shown only when a username resolved.
#[component]
pub fn NavBar(username: Option<String>) -> impl IntoView {
    view! {
        <nav class="navbar">
            <div class="navbar__links">
                <a href="/feed">"Feed"</a>
                <a href="/create-post">"Create Post"</a>
            </div>
            <div class="navbar__session">
                {username.map(|name| view! { <span class="navbar__user">{name}</span> })}
                <form method="post" action="/logout">
                    <button type="submit" class="navbar__logout">"Logout"</button>
                </form>
            </div>
        </nav>
    }
}
