use anyhow::Result;
use clap::ValueEnum;
use colored::{Color, Colorize};
use comfy_table::{Table, presets};
use serde::Serialize;
use std::io::Write;

/// How command results are rendered on stdout.
#[derive(Clone, Copy, Debug, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Formatted table output (default)
    #[default]
    Table,
    /// JSON output for scripting
    Json,
    /// Compact single-line output
    Compact,
}

/// Flags shared by every subcommand.
#[derive(Clone, Debug, Default)]
pub struct GlobalOptions {
    pub output_format: OutputFormat,
    pub quiet: bool,
    /// Also lowers the default log filter to `debug`
    pub verbose: bool,
    pub no_color: bool,
}

impl GlobalOptions {
    /// Empty table using the border preset for the current color mode.
    pub fn table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(if self.no_color {
            presets::ASCII_FULL
        } else {
            presets::UTF8_FULL_CONDENSED
        });
        table
    }
}

/// Results that can be shown in every `OutputFormat`.
pub trait TableDisplay {
    fn to_table(&self, options: &GlobalOptions) -> Table;
    fn to_compact(&self) -> String;
}

#[derive(Clone, Copy)]
enum Tone {
    Success,
    Warning,
    Info,
}

impl Tone {
    fn icon(self) -> &'static str {
        match self {
            Tone::Success => "✓",
            Tone::Warning => "⚠",
            Tone::Info => "ℹ",
        }
    }

    fn color(self) -> Color {
        match self {
            Tone::Success => Color::Green,
            Tone::Warning => Color::Yellow,
            Tone::Info => Color::Blue,
        }
    }
}

pub struct OutputManager {
    pub options: GlobalOptions,
}

impl OutputManager {
    pub fn new(options: GlobalOptions) -> Self {
        Self { options }
    }

    /// True when stdout is reserved for machine-readable output
    pub fn is_json(&self) -> bool {
        self.options.output_format == OutputFormat::Json
    }

    /// Status lines are suppressed when quiet or when stdout carries JSON.
    fn chatty(&self) -> bool {
        !self.options.quiet && !self.is_json()
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.options.no_color {
            text.to_string()
        } else {
            text.color(color).to_string()
        }
    }

    pub fn display<T>(&self, data: &T) -> Result<()>
    where
        T: Serialize + TableDisplay,
    {
        if self.options.quiet {
            return Ok(());
        }
        let rendered = match self.options.output_format {
            OutputFormat::Json => serde_json::to_string_pretty(data)?,
            OutputFormat::Table => data.to_table(&self.options).to_string(),
            OutputFormat::Compact => data.to_compact(),
        };
        println!("{rendered}");
        Ok(())
    }

    fn say(&self, tone: Tone, message: &str) {
        if self.chatty() {
            let color = tone.color();
            println!("{} {}", self.paint(tone.icon(), color), self.paint(message, color));
        }
    }

    pub fn success(&self, message: &str) {
        self.say(Tone::Success, message);
    }

    pub fn warning(&self, message: &str) {
        self.say(Tone::Warning, message);
    }

    pub fn info(&self, message: &str) {
        self.say(Tone::Info, message);
    }

    pub fn heading(&self, text: &str) {
        if !self.chatty() {
            return;
        }
        if self.options.no_color {
            println!("\n{text}\n{}", "=".repeat(text.chars().count()));
        } else {
            println!("\n{}", text.color(Color::BrightBlue).bold());
        }
    }

    pub fn key_value(&self, key: &str, value: &str) {
        if self.chatty() {
            println!("{}: {}", self.paint(key, Color::BrightCyan), value);
        }
    }

    /// Transient status shown while waiting on Redis; erase with `clear_line`.
    pub fn progress(&self, message: &str) {
        if self.chatty() {
            print!("\r⟳ {}", self.paint(message, Color::Cyan));
            std::io::stdout().flush().ok();
        }
    }

    pub fn clear_line(&self) {
        if self.chatty() {
            print!("\r{:width$}\r", "", width = 80);
            std::io::stdout().flush().ok();
        }
    }
}
