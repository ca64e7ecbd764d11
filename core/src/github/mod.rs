//! GitHub App authentication
//!
//! Mints App JWTs and exchanges them for installation access tokens.

pub mod installation;
pub mod jwt;

pub use installation::{InstallationToken, InstallationTokenBroker, INSTALLATION_TOKEN_ERROR};
pub use jwt::{AppJwt, AppJwtMinter};
