//! # Providers
//!
//! External collaborators behind traits: AI services (`ai`) and vector storage (`db`).

pub mod ai;
pub mod db;
