//! Authentication: register, login, refresh, JWT and password hashing.

mod handlers;
mod jwt;
pub mod password;

pub use handlers::{login, me, refresh, register};
pub use jwt::{Claims, HmacJwtManager, JwtManager, TokenType};
