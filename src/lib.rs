//! Small terminal habit tracker. Habits are kept in a single JSON file and can be managed either
//! through an interactive menu or through one-shot commands.
//!

pub mod cli;
pub mod storage;
pub mod utils;
