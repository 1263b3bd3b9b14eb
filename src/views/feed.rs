//! Feed page: post cards with like buttons and counts.

use leptos::prelude::*;

use super::nav::NavBar;
use super::{Notice, NoticeBanner, document};
use crate::services::feed::FeedPost;

/// Uppercased first character of a username, for the avatar badge.
#[must_use]
pub fn avatar_initial(username: &str) -> String {
    username
        .chars()
        .next()
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_default()
}

#[component]
fn PostCard(post: FeedPost) -> impl IntoView {
    let initial = avatar_initial(&post.username);
    let posted_at = post.created_at.format("%Y-%m-%d %H:%M UTC").to_string();
    let like_action = format!("/feed/{}/like", post.id);
    let likes = format!("{} Likes", post.like_count);
    let anchor = format!("post-{}", post.id);

    view! {
        <article class="post" id=anchor>
            <header class="post__author">
                <span class="post__avatar">{initial}</span>
                <div>
                    <p class="post__username">{post.username}</p>
                    <p class="post__time">{posted_at}</p>
                </div>
            </header>
            <p class="post__content">{post.content}</p>
            <footer class="post__likes">
                <form method="post" action=like_action>
                    <button type="submit">"Like"</button>
                </form>
                <span class="post__like-count">{likes}</span>
            </footer>
        </article>
    }
}

#[component]
fn PostList(posts: Vec<FeedPost>) -> impl IntoView {
    if posts.is_empty() {
        return view! { <p class="feed__empty">"No posts to show."</p> }.into_any();
    }
    view! {
        <div class="feed__posts">
            {posts.into_iter().map(|post| view! { <PostCard post=post/> }).collect_view()}
        </div>
    }
    .into_any()
}

/// Render the feed page for an authenticated user.
#[must_use]
pub fn render(username: Option<String>, notice: Option<Notice>, posts: Vec<FeedPost>) -> String {
    let body = view! {
        <NavBar username=username/>
        <main class="feed">
            <h1>"Feed"</h1>
            <NoticeBanner notice=notice/>
            <PostList posts=posts/>
        </main>
    };
    document("Feed", body.into_any())
}
