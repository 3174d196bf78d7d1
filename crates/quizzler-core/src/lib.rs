//! # Quizzler Core
//!
//! Foundational types shared by every Quizzler crate.
//!
//! - [`errors`]: the HTTP-facing [`AppError`] and its JSON rendering
//!
//! # Example
//!
//! ```ignore
//! use quizzler_core::AppError;
//!
//! let error = AppError::unauthorized("Invalid token");
//! ```

pub mod errors;

pub use errors::AppError;
