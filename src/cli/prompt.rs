use std::{
    fmt::Display,
    io::Write,
};

use ansi_term::Colour;
use anyhow::Result;
use chrono::{DateTime, Local, NaiveDate};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::{storage::entities::Frequency, utils::time::parse_check_in_date};

/// Returned when input ends while a prompt is waiting for an answer.
#[derive(Debug)]
pub struct InputClosed;

impl Display for InputClosed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Input was closed")
    }
}

impl std::error::Error for InputClosed {}

/// Line based console dialog. Every `prompt_*` method keeps asking until the answer is valid,
/// so the only errors it returns are I/O errors and [InputClosed].
pub struct Prompter<R, W> {
    input: R,
    output: W,
    styled: bool,
}

impl<R: AsyncBufRead + Unpin, W: Write> Prompter<R, W> {
    /// `styled` enables colored messages and should only be set for terminals.
    pub fn new(input: R, output: W, styled: bool) -> Self {
        Self {
            input,
            output,
            styled,
        }
    }

    pub fn say(&mut self, message: impl Display) -> Result<()> {
        writeln!(self.output, "{message}")?;
        Ok(())
    }

    pub fn complain(&mut self, message: impl Display) -> Result<()> {
        if self.styled {
            writeln!(self.output, "{}", Colour::Red.paint(message.to_string()))?;
        } else {
            writeln!(self.output, "{message}")?;
        }
        Ok(())
    }

    pub fn success(&mut self, message: impl Display) -> Result<()> {
        if self.styled {
            writeln!(self.output, "{}", Colour::Green.paint(message.to_string()))?;
        } else {
            writeln!(self.output, "{message}")?;
        }
        Ok(())
    }

    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    /// Reads one trimmed line of input. Lines that aren't valid UTF-8 are asked again.
    pub async fn read_line(&mut self, prompt: &str) -> Result<String> {
        loop {
            write!(self.output, "{prompt}")?;
            self.output.flush()?;
            let mut buffer = Vec::new();
            if self.input.read_until(b'\n', &mut buffer).await? == 0 {
                return Err(InputClosed.into());
            }
            match String::from_utf8(buffer) {
                Ok(line) => return Ok(line.trim().to_string()),
                Err(_) => self.complain("Input is not valid text. Please try again.")?,
            }
        }
    }

    pub async fn prompt_non_empty(&mut self, prompt: &str) -> Result<String> {
        loop {
            let value = self.read_line(prompt).await?;
            if !value.is_empty() {
                return Ok(value);
            }
            self.complain("Input cannot be empty. Please try again.")?;
        }
    }

    pub async fn prompt_integer(&mut self, prompt: &str) -> Result<i64> {
        loop {
            match self.read_line(prompt).await?.parse::<i64>() {
                Ok(v) => return Ok(v),
                Err(_) => self.complain("Invalid input. Please enter a valid integer.")?,
            }
        }
    }

    pub async fn prompt_frequency(&mut self, prompt: &str) -> Result<Frequency> {
        loop {
            match self.read_line(prompt).await?.parse::<Frequency>() {
                Ok(v) => return Ok(v),
                Err(e) => self.complain(e)?,
            }
        }
    }

    /// Empty answer means the date of `now`.
    pub async fn prompt_date(&mut self, prompt: &str, now: DateTime<Local>) -> Result<NaiveDate> {
        loop {
            let value = self.read_line(prompt).await?;
            if value.is_empty() {
                return Ok(now.date_naive());
            }
            match parse_check_in_date(&value, now) {
                Ok(v) => return Ok(v),
                Err(e) => self.complain(e)?,
            }
        }
    }

    pub async fn prompt_yes_no(&mut self, prompt: &str, default: bool) -> Result<bool> {
        loop {
            let value = self.read_line(prompt).await?.to_lowercase();
            match value.as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => self.complain("Please answer y or n.")?,
            }
        }
    }
}
