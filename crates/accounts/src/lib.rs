//! Accounts domain module.
//!
//! Customer and administrator accounts plus customer reviews. Orders refer to
//! users by id only; nothing here knows about orders or stock.

pub mod admin;
pub mod review;
pub mod user;

pub use admin::Admin;
pub use review::Review;
pub use user::{NewUser, User, is_valid_email};
