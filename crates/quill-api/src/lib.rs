pub mod auth;
pub mod comments;
pub mod convert;
pub mod cors;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod posts;
pub mod router;
pub mod session;
pub mod state;
pub mod token;
pub mod users;
pub mod validate;
