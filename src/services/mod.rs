//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules compose backend calls into the app's operations so route
//! handlers stay focused on forms, cookies, redirects, and rendering.

pub mod feed;
pub mod post;
pub mod profile;
pub mod session;
