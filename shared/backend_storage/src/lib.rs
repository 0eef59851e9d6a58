//! Row storage for the Bookshare backend
//!
//! This crate wraps the DynamoDB tables behind the service: book shares,
//! likes, comments and user profiles. Each module owns one table and exposes
//! a thin typed client over the raw item API.

pub mod book_like;
pub mod book_share;
pub mod comment;
pub mod profile;
