use colored::Colorize;
use console::Term;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Display utilities for the CLI interface
#[derive(Debug, Clone)]
pub struct DisplayHelper {
    pub use_color: bool,
}

impl DisplayHelper {
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    /// Color only when stdout is a terminal, `NO_COLOR` is unset and the
    /// user did not pass `--no-color`
    pub fn detect(no_color: bool) -> Self {
        let use_color =
            !no_color && Term::stdout().is_term() && std::env::var_os("NO_COLOR").is_none();
        Self::new(use_color)
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.use_color {
            println!("{} {}", "✓".green().bold(), message);
        } else {
            println!("[SUCCESS] {}", message);
        }
    }

    /// Print an error message to stderr
    pub fn error(&self, message: &str) {
        if self.use_color {
            eprintln!("{} {}", "✗".red().bold(), message);
        } else {
            eprintln!("[ERROR] {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.use_color {
            println!("{} {}", "⚠".yellow().bold(), message);
        } else {
            println!("[WARNING] {}", message);
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.use_color {
            println!("{} {}", "::".blue().bold(), message);
        } else {
            println!("[INFO] {}", message);
        }
    }

    pub fn print_indented(&self, message: &str, level: usize) {
        println!("{}{}", "    ".repeat(level), message);
    }

    pub fn format_project(&self, name: &str) -> String {
        if self.use_color {
            name.cyan().bold().to_string()
        } else {
            name.to_string()
        }
    }

    pub fn format_path(&self, path: &str) -> String {
        if self.use_color {
            path.underline().to_string()
        } else {
            path.to_string()
        }
    }

    /// Create a progress bar on stderr
    ///
    /// Hidden when colors are off or stderr is not a terminal so piped output
    /// stays clean.
    pub fn create_progress_bar(&self, len: u64, message: &str) -> ProgressBar {
        if !self.use_color || !Term::stderr().is_term() {
            return ProgressBar::with_draw_target(Some(len), ProgressDrawTarget::hidden());
        }

        let pb = ProgressBar::with_draw_target(Some(len), ProgressDrawTarget::stderr());
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{msg} {spinner:.green} [{wide_bar:.cyan/blue}] {pos}/{len} ({percent}%)")
        {
            pb.set_style(style.progress_chars("=> "));
        }
        pb.set_message(message.to_string());
        pb
    }
}
