//! Common utilities and shared types for yatube.
//!
//! This crate provides foundational components used across all yatube crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **JWT**: Access/refresh token issuance and validation via [`JwtKeys`]
//! - **Storage**: File storage backends for post images
//!
//! # Example
//!
//! ```no_run
//! use yatube_common::{AppResult, Config, JwtKeys};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let keys = JwtKeys::from_config(&config.auth);
//!     let pair = keys.issue_pair(1, "leo")?;
//!     println!("access token: {}", pair.access);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod jwt;
pub mod storage;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use jwt::{Claims, JwtKeys, TokenPair, TokenType};
pub use storage::{LocalStorage, StorageBackend, StoredFile};
