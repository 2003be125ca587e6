//! Sign up, log in and log out, and the middleware that guards the owner's routes.

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod sign_up;
mod token;

pub(crate) use cookie::DEFAULT_COOKIE_DURATION;
pub use log_in::post_log_in;
pub use log_out::get_log_out;
pub use middleware::auth_guard;
pub use sign_up::post_sign_up;

#[cfg(test)]
pub(crate) use cookie::COOKIE_TOKEN;
