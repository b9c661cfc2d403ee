//! Helpers shared by the dashboard and report pages.

pub mod decrypt;
pub mod escape;
pub mod toast;

pub use escape::escape_html;
pub use toast::Toast;
