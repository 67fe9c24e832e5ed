use std::io::Write;

use anyhow::{Result, bail};
use chrono::NaiveDate;

use crate::storage::{entities::Habit, habit_storage::HabitStorage};

use super::output::{format_habit, write_habits};

pub async fn list_habits(storage: impl HabitStorage, output: &mut impl Write) -> Result<()> {
    let habits = storage.load().await?;
    write_habits(output, &habits)
}

pub async fn add_habit(storage: impl HabitStorage, habit: Habit, output: &mut impl Write) -> Result<()> {
    let id = habit.id.clone();
    if !storage.add(habit).await? {
        bail!("Habit ID {id} already exists. Please choose a different ID.");
    }
    writeln!(output, "Habit added successfully.")?;
    Ok(())
}

pub async fn check_in_habit(
    storage: impl HabitStorage,
    id: &str,
    date: NaiveDate,
    completed: bool,
    output: &mut impl Write,
) -> Result<()> {
    let Some(habit) = storage.check_in(id, date, completed).await? else {
        bail!("Habit ID {id} not found.");
    };
    if completed {
        writeln!(output, "Habit '{}' checked in for {date}.", habit.name)?;
    } else {
        writeln!(output, "Habit '{}' marked as missed for {date}.", habit.name)?;
    }
    writeln!(output, "{}", format_habit(&habit))?;
    Ok(())
}

pub async fn delete_habit(storage: impl HabitStorage, id: &str, output: &mut impl Write) -> Result<()> {
    if !storage.delete(id).await? {
        bail!("Habit ID {id} not found.");
    }
    writeln!(output, "Habit deleted successfully.")?;
    Ok(())
}
