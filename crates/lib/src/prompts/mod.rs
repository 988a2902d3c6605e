//! # Prompt Template Modules
//!
//! This module holds the prompt templates used by the agronomist gateway.

pub mod tasks;
