//! # wirehome-adapter-http-axum
//!
//! HTTP facade for the hub core. Handlers stay thin: they translate requests
//! into registry and bus operations and map [`WirehomeError`] kinds onto
//! status codes. The long-poll endpoint (`/api/v1/message_bus/wait_for`) is
//! the only handler that suspends.
//!
//! [`WirehomeError`]: wirehome_domain::error::WirehomeError

pub mod api;
pub mod error;
pub mod router;
pub mod state;
