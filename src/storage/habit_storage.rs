use std::{
    future::Future,
    io::ErrorKind,
    ops::Deref,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::entities::{Habit, Habits};

/// Interface for abstracting storage of habits. Every operation works on the whole collection:
/// it's read from disk, changed and written back.
pub trait HabitStorage {
    /// Reads all habits. A missing file is treated as an empty collection.
    fn load(&self) -> impl Future<Output = Result<Habits>>;

    /// Overwrites stored habits with `habits`.
    fn save(&self, habits: &Habits) -> impl Future<Output = Result<()>>;

    /// Inserts a new habit. Returns `false` without touching the storage if the id is taken.
    fn add(&self, habit: Habit) -> impl Future<Output = Result<bool>>;

    /// Records a check-in for `id`. Returns the updated habit, or `None` if there is no such
    /// habit.
    fn check_in(
        &self,
        id: &str,
        date: NaiveDate,
        completed: bool,
    ) -> impl Future<Output = Result<Option<Habit>>>;

    /// Removes a habit. Returns `false` if nothing was removed.
    fn delete(&self, id: &str) -> impl Future<Output = Result<bool>>;
}

impl<T: Deref> HabitStorage for T
where
    T::Target: HabitStorage,
{
    fn load(&self) -> impl Future<Output = Result<Habits>> {
        self.deref().load()
    }

    fn save(&self, habits: &Habits) -> impl Future<Output = Result<()>> {
        self.deref().save(habits)
    }

    fn add(&self, habit: Habit) -> impl Future<Output = Result<bool>> {
        self.deref().add(habit)
    }

    fn check_in(
        &self,
        id: &str,
        date: NaiveDate,
        completed: bool,
    ) -> impl Future<Output = Result<Option<Habit>>> {
        self.deref().check_in(id, date, completed)
    }

    fn delete(&self, id: &str) -> impl Future<Output = Result<bool>> {
        self.deref().delete(id)
    }
}

/// The main realization of [HabitStorage]. Keeps all habits in a single JSON file.
///
/// Writes aren't atomic, the file is truncated and rewritten in place.
pub struct JsonHabitStorage {
    path: PathBuf,
}

impl JsonHabitStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn serialize(habits: &Habits) -> Result<Vec<u8>> {
        let mut buffer = Vec::<u8>::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        habits.serialize(&mut serializer)?;
        Ok(buffer)
    }
}

impl HabitStorage for JsonHabitStorage {
    #[instrument(skip(self))]
    async fn load(&self) -> Result<Habits> {
        debug!("Loading habits from {:?}", self.path);
        let content = match tokio::fs::read(&self.path).await {
            Ok(v) => v,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("{:?} doesn't exist yet", self.path);
                return Ok(Habits::new());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read habits from {:?}", self.path))
            }
        };

        let habits = serde_json::from_slice::<Habits>(&content)
            .with_context(|| format!("Failed to parse habits stored in {:?}", self.path))?;

        for (key, habit) in &habits {
            if *key != habit.id {
                warn!("Habit stored under {key} has a different id {}", habit.id);
            }
        }

        Ok(habits)
    }

    #[instrument(skip(self, habits))]
    async fn save(&self, habits: &Habits) -> Result<()> {
        debug!("Saving {} habits into {:?}", habits.len(), self.path);
        if let Some(parent) = self.path.parent().filter(|v| !v.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory {parent:?} for habits"))?;
        }
        let buffer = Self::serialize(habits)?;
        tokio::fs::write(&self.path, buffer)
            .await
            .with_context(|| format!("Failed to write habits into {:?}", self.path))?;
        Ok(())
    }

    #[instrument(skip(self, habit), fields(id = %habit.id))]
    async fn add(&self, habit: Habit) -> Result<bool> {
        let mut habits = self.load().await?;
        if habits.contains_key(&habit.id) {
            warn!("Habit {} already exists", habit.id);
            return Ok(false);
        }
        info!("Adding habit {}", habit.id);
        habits.insert(habit.id.clone(), habit);
        self.save(&habits).await?;
        Ok(true)
    }

    #[instrument(skip(self))]
    async fn check_in(&self, id: &str, date: NaiveDate, completed: bool) -> Result<Option<Habit>> {
        let mut habits = self.load().await?;
        let Some(habit) = habits.get_mut(id) else {
            warn!("Can't check in unknown habit {id}");
            return Ok(None);
        };
        habit.check_in(date, completed);
        let habit = habit.clone();
        info!("Checked in {id} for {date}, completed: {completed}");
        self.save(&habits).await?;
        Ok(Some(habit))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> Result<bool> {
        let mut habits = self.load().await?;
        if habits.remove(id).is_none() {
            debug!("Nothing to delete for {id}");
            return Ok(false);
        }
        info!("Deleting habit {id}");
        self.save(&habits).await?;
        Ok(true)
    }
}
