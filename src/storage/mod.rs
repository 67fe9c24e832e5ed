//!  Storage is organized through [habit_storage::JsonHabitStorage].
//!  The basic idea is:
//!   - All habits live in a single JSON file, keyed by habit id.
//!   - Every operation reloads the whole file and writes the whole collection back.

pub mod entities;
pub mod habit_storage;
