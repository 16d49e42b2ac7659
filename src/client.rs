//! Client handle and request factory.
//!
//! Implementation details are split into submodules under `src/client/`.

mod auth;
mod core;

pub use self::auth::Credentials;
pub use self::core::Client;
