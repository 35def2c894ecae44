pub mod api_key;
pub mod password;
mod session;

pub use self::session::{Claims, SESSION_COOKIE, SessionKeys};
