use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::{execute, queue};
use std::io::{self, BufRead, Stdin, Stdout, Write};

/// Line-oriented prompt on stdout/stdin with crossterm styling.
pub struct Terminal {
    stdout: Stdout,
    stdin: Stdin,
}

impl Terminal {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            stdin: io::stdin(),
        }
    }

    pub fn heading(&mut self, text: &str) -> io::Result<()> {
        queue!(
            self.stdout,
            Print("\n"),
            SetAttribute(Attribute::Bold),
            SetForegroundColor(Color::Cyan),
            Print(text),
            ResetColor,
            SetAttribute(Attribute::Reset),
            Print("\n")
        )?;
        self.stdout.flush()
    }

    pub fn line(&mut self, text: &str) -> io::Result<()> {
        execute!(self.stdout, Print(text), Print("\n"))
    }

    pub fn hint(&mut self, text: &str) -> io::Result<()> {
        self.colored(Color::DarkGrey, text)
    }

    pub fn error(&mut self, text: &str) -> io::Result<()> {
        self.colored(Color::Red, text)
    }

    pub fn success(&mut self, text: &str) -> io::Result<()> {
        self.colored(Color::Green, text)
    }

    /// Prints `label` and reads one line. `None` on end of input.
    pub fn prompt(&mut self, label: &str, current: Option<&str>) -> io::Result<Option<String>> {
        queue!(
            self.stdout,
            SetAttribute(Attribute::Bold),
            Print(label),
            SetAttribute(Attribute::Reset)
        )?;
        if let Some(current) = current.filter(|text| !text.is_empty()) {
            queue!(
                self.stdout,
                SetForegroundColor(Color::DarkGrey),
                Print(format!(" [{current}]")),
                ResetColor
            )?;
        }
        queue!(self.stdout, Print(": "))?;
        self.stdout.flush()?;

        let mut input = String::new();
        if self.stdin.lock().read_line(&mut input)? == 0 {
            return Ok(None);
        }
        Ok(Some(input.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn colored(&mut self, color: Color, text: &str) -> io::Result<()> {
        execute!(
            self.stdout,
            SetForegroundColor(color),
            Print(text),
            ResetColor,
            Print("\n")
        )
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}
