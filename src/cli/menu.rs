use std::io::Write;

use anyhow::Result;
use tokio::io::AsyncBufRead;
use tracing::{debug, info};

use crate::{
    storage::{
        entities::Habit,
        habit_storage::HabitStorage,
    },
    utils::clock::Clock,
};

use super::{
    output::write_habits,
    prompt::{InputClosed, Prompter},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    List,
    Add,
    CheckIn,
    Delete,
    Exit,
}

impl MenuChoice {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "1" => Some(Self::List),
            "2" => Some(Self::Add),
            "3" => Some(Self::CheckIn),
            "4" => Some(Self::Delete),
            "5" => Some(Self::Exit),
            _ => None,
        }
    }
}

/// Interactive numbered menu. Habits are reloaded from storage for every action, nothing is kept
/// between iterations.
pub struct Menu<S, R, W> {
    storage: S,
    prompter: Prompter<R, W>,
    clock: Box<dyn Clock>,
}

impl<S: HabitStorage, R: AsyncBufRead + Unpin, W: Write> Menu<S, R, W> {
    pub fn new(storage: S, prompter: Prompter<R, W>, clock: Box<dyn Clock>) -> Self {
        Self {
            storage,
            prompter,
            clock,
        }
    }

    /// Runs until exit is chosen or input is closed. Storage failures end the loop with an error.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            self.print_menu()?;
            let result = match self.prompter.read_line("Enter your choice (1-5): ").await {
                Ok(choice) => match MenuChoice::parse(&choice) {
                    Some(MenuChoice::Exit) => {
                        self.prompter.say("Exiting Habit Tracker. Goodbye!")?;
                        return Ok(());
                    }
                    Some(choice) => self.process(choice).await,
                    None => self
                        .prompter
                        .complain("Invalid choice. Please enter a number between 1 and 5."),
                },
                Err(e) => Err(e),
            };

            match result {
                Ok(()) => {}
                Err(e) if e.is::<InputClosed>() => {
                    debug!("Input closed, leaving menu");
                    self.prompter.say("")?;
                    return Ok(());
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn print_menu(&mut self) -> Result<()> {
        self.prompter.say("\nHabit Tracker Menu:")?;
        self.prompter.say("1. Show Habits")?;
        self.prompter.say("2. Add Habit")?;
        self.prompter.say("3. Check In Habit")?;
        self.prompter.say("4. Delete Habit")?;
        self.prompter.say("5. Exit")?;
        Ok(())
    }

    async fn process(&mut self, choice: MenuChoice) -> Result<()> {
        debug!("Menu choice {choice:?}");
        match choice {
            MenuChoice::List => self.show_habits().await,
            MenuChoice::Add => self.add_habit().await,
            MenuChoice::CheckIn => self.check_in_habit().await,
            MenuChoice::Delete => self.delete_habit().await,
            MenuChoice::Exit => Ok(()),
        }
    }

    async fn show_habits(&mut self) -> Result<()> {
        let habits = self.storage.load().await?;
        write_habits(self.prompter.output(), &habits)
    }

    async fn add_habit(&mut self) -> Result<()> {
        let habits = self.storage.load().await?;
        let id = self.prompter.prompt_non_empty("Enter habit ID: ").await?;
        if habits.contains_key(&id) {
            return self
                .prompter
                .complain("Habit ID already exists. Please choose a different ID.");
        }
        let name = self.prompter.prompt_non_empty("Enter habit name: ").await?;
        let frequency = self
            .prompter
            .prompt_frequency("Enter habit frequency (daily/weekly): ")
            .await?;
        let target = self
            .prompter
            .prompt_integer("Enter habit target (number of times to complete): ")
            .await?;

        if self.storage.add(Habit::new(id, name, frequency, target)).await? {
            self.prompter.success("Habit added successfully.")
        } else {
            self.prompter
                .complain("Habit ID already exists. Please choose a different ID.")
        }
    }

    async fn check_in_habit(&mut self) -> Result<()> {
        let habits = self.storage.load().await?;
        let id = self.prompter.prompt_non_empty("Enter habit ID to check in: ").await?;
        if !habits.contains_key(&id) {
            return self.prompter.complain("Habit ID not found.");
        }
        let date = self
            .prompter
            .prompt_date("Check-in date (empty for today): ", self.clock.now())
            .await?;
        let completed = self
            .prompter
            .prompt_yes_no("Completed? (Y/n): ", true)
            .await?;

        match self.storage.check_in(&id, date, completed).await? {
            Some(habit) if completed => self
                .prompter
                .success(format!("Habit '{}' checked in for {date}.", habit.name)),
            Some(habit) => self
                .prompter
                .say(format!("Habit '{}' marked as missed for {date}.", habit.name)),
            None => self.prompter.complain("Habit ID not found."),
        }
    }

    async fn delete_habit(&mut self) -> Result<()> {
        let id = self.prompter.prompt_non_empty("Enter habit ID to delete: ").await?;
        if self.storage.delete(&id).await? {
            info!("Deleted {id} from menu");
            self.prompter.success("Habit deleted successfully.")
        } else {
            self.prompter.complain("Habit ID not found.")
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::{Local, NaiveDate, TimeZone};
    use tempfile::tempdir;

    use crate::{
        storage::{
            entities::{Frequency, Habit},
            habit_storage::{HabitStorage, JsonHabitStorage},
        },
        utils::{clock::MockClock, logging::TEST_LOGGING},
    };

    use super::{Menu, Prompter};

    fn fixed_clock() -> Box<MockClock> {
        let mut clock = MockClock::new();
        clock
            .expect_now()
            .returning(|| Local.with_ymd_and_hms(2024, 1, 3, 20, 0, 0).unwrap());
        Box::new(clock)
    }

    async fn run_menu(storage: &JsonHabitStorage, input: impl AsRef<[u8]>) -> Result<String> {
        *TEST_LOGGING;
        let mut output = Vec::new();
        let prompter = Prompter::new(input.as_ref(), &mut output, false);
        Menu::new(storage, prompter, fixed_clock()).run().await?;
        Ok(String::from_utf8(output)?)
    }

    #[tokio::test]
    async fn test_add_check_in_and_list() -> Result<()> {
        let dir = tempdir()?;
        let storage = JsonHabitStorage::new(dir.path().join("habits.json"));

        let input = "2\nwater\nDrink water\nfortnightly\ndaily\nlots\n8\n\
                     3\nwater\n2024-01-01\ny\n\
                     3\nwater\n2024-01-02\n\n\
                     3\nwater\n\nn\n\
                     1\n5\n";
        let output = run_menu(&storage, input).await?;

        assert!(output.contains("Invalid frequency"));
        assert!(output.contains("Please enter a valid integer"));
        assert!(output.contains("Habit added successfully."));
        assert!(output.contains("Habit 'Drink water' checked in for 2024-01-01."));
        assert!(output.contains("Habit 'Drink water' marked as missed for 2024-01-03."));
        assert!(output.contains(
            "ID: water, Name: Drink water, Frequency: daily, Target: 8, Completion Rate: 66.67%"
        ));
        assert!(output.ends_with("Exiting Habit Tracker. Goodbye!\n"));

        let habits = storage.load().await?;
        let habit = &habits["water"];
        assert_eq!(habit.history.len(), 3);
        assert_eq!(
            habit.history.get(&NaiveDate::from_ymd_opt(2024, 1, 3).unwrap()),
            Some(&false)
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_add_duplicate_is_rejected() -> Result<()> {
        let dir = tempdir()?;
        let storage = JsonHabitStorage::new(dir.path().join("habits.json"));
        let existing = Habit::new("water", "Drink water", Frequency::Daily, 8);
        storage.add(existing.clone()).await?;

        let output = run_menu(&storage, "2\nwater\n5\n").await?;

        assert!(output.contains("Habit ID already exists"));
        assert_eq!(storage.load().await?["water"], existing);
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_ids() -> Result<()> {
        let dir = tempdir()?;
        let storage = JsonHabitStorage::new(dir.path().join("habits.json"));
        storage
            .add(Habit::new("gym", "Gym", Frequency::Weekly, 3))
            .await?;
        let before = storage.load().await?;

        let output = run_menu(&storage, "3\nmissing\n4\nmissing\n5\n").await?;

        assert_eq!(output.matches("Habit ID not found.").count(), 2);
        assert_eq!(storage.load().await?, before);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete() -> Result<()> {
        let dir = tempdir()?;
        let storage = JsonHabitStorage::new(dir.path().join("habits.json"));
        storage
            .add(Habit::new("gym", "Gym", Frequency::Weekly, 3))
            .await?;

        let output = run_menu(&storage, "4\ngym\n1\n5\n").await?;

        assert!(output.contains("Habit deleted successfully."));
        assert!(output.contains("No habits found."));
        assert!(storage.load().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_choice_and_closed_input() -> Result<()> {
        let dir = tempdir()?;
        let storage = JsonHabitStorage::new(dir.path().join("habits.json"));

        let output = run_menu(&storage, "9\nabc\n2\nhalfway\n").await?;

        assert_eq!(
            output
                .matches("Invalid choice. Please enter a number between 1 and 5.")
                .count(),
            2
        );
        assert!(storage.load().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_utf8_choice_is_not_fatal() -> Result<()> {
        let dir = tempdir()?;
        let storage = JsonHabitStorage::new(dir.path().join("habits.json"));

        let output = run_menu(&storage, b"\xff\xfe\n5\n").await?;

        assert!(output.contains("Input is not valid text. Please try again."));
        assert!(output.ends_with("Exiting Habit Tracker. Goodbye!\n"));
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_storage_is_fatal() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("habits.json");
        std::fs::write(&path, "[1, 2, 3]")?;
        let storage = JsonHabitStorage::new(path);

        assert!(run_menu(&storage, "1\n5\n").await.is_err());
        Ok(())
    }
}
