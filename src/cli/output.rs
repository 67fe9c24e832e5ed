use std::io::Write;

use anyhow::Result;

use crate::storage::entities::{Habit, Habits};

pub fn format_habit(habit: &Habit) -> String {
    format!(
        "ID: {}, Name: {}, Frequency: {}, Target: {}, Completion Rate: {}",
        habit.id,
        habit.name,
        habit.frequency,
        habit.target,
        habit.completion_percentage()
    )
}

/// Prints every habit on its own line, ordered by id.
pub fn write_habits(output: &mut impl Write, habits: &Habits) -> Result<()> {
    if habits.is_empty() {
        writeln!(output, "No habits found.")?;
        return Ok(());
    }
    for habit in habits.values() {
        writeln!(output, "{}", format_habit(habit))?;
    }
    Ok(())
}
