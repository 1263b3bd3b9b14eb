use super::*;
use crate::backend::memory::MemoryBackend;
use crate::services::session::current_session;

async fn signed_in(backend: &MemoryBackend) -> Session {
    backend.add_user("tok", "ada");
    current_session(backend, "tok").await.unwrap().unwrap()
}

#[tokio::test]
async fn no_session_is_rejected_without_insert() {
    let backend = MemoryBackend::new();
    let err = create_post(&backend, None, "hello").await.unwrap_err();
    assert!(matches!(err, PostError::NotAuthenticated));
    assert_eq!(err.inline_message(), "You must be logged in to create a post.");
    assert_eq!(backend.call_count("insert_post"), 0);
}

#[tokio::test]
async fn blank_content_is_rejected_without_insert() {
    let backend = MemoryBackend::new();
    let session = signed_in(&backend).await;
    let err = create_post(&backend, Some(&session), "   \n").await.unwrap_err();
    assert!(matches!(err, PostError::EmptyContent));
    assert_eq!(backend.call_count("insert_post"), 0);
}

#[tokio::test]
async fn insert_attaches_user_id() {
    let backend = MemoryBackend::new();
    let session = signed_in(&backend).await;
    create_post(&backend, Some(&session), "first post").await.unwrap();

    let posts = backend.posts();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].user_id, session.user.id);
    assert_eq!(posts[0].content, "first post");
    assert_eq!(backend.call_count("insert_post"), 1);
}

#[tokio::test]
async fn backend_message_is_shown_inline() {
    let backend = MemoryBackend::new();
    let session = signed_in(&backend).await;
    backend.fail_on("insert_post");
    let err = create_post(&backend, Some(&session), "hello").await.unwrap_err();
    assert_eq!(err.inline_message(), "insert_post failed");
    assert!(err.retryable());
}

#[test]
fn transport_error_is_generic_inline() {
    let err = PostError::Backend(BackendError::Request("connection reset".into()));
    assert_eq!(err.inline_message(), UNEXPECTED_ERROR);
    let err = PostError::Backend(BackendError::Parse("eof".into()));
    assert_eq!(err.inline_message(), UNEXPECTED_ERROR);
}
