//! HTTP request handlers.

pub mod classes;
pub mod http;
pub mod schedules;

pub use classes::*;
pub use http::*;
pub use schedules::*;
