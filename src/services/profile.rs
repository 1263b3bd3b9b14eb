//! Profile lookup for the navigation bar identity chip.

use tracing::warn;

use super::session::Session;
use crate::backend::Backend;
use crate::error::ErrorCode;

/// Username of the signed-in user, or `None` when signed out or when the
/// lookup fails (failures are logged; the bar renders without a chip).
pub async fn display_name(backend: &dyn Backend, session: Option<&Session>) -> Option<String> {
    let session = session?;
    match backend
        .fetch_profile_username(&session.token, session.user.id)
        .await
    {
        Ok(username) => Some(username).filter(|name| !name.is_empty()),
        Err(e) => {
            warn!(error = %e, code = e.error_code(), user_id = %session.user.id, "username lookup failed");
            None
        }
    }
}
