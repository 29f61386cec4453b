//! Colored terminal output for release commands.

use std::io::Write;
use termcolor::{BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

/// Output manager for consistent colored terminal output
#[derive(Debug)]
pub struct OutputManager {
    bufwtr: BufferWriter,
    verbose: bool,
    quiet: bool,
}

impl Clone for OutputManager {
    fn clone(&self) -> Self {
        Self::new(self.verbose, self.quiet)
    }
}

impl OutputManager {
    /// Create a new output manager
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            bufwtr: BufferWriter::stdout(ColorChoice::Auto),
            verbose,
            quiet,
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) -> std::io::Result<()> {
        self.tagged("ℹ", &fg(Color::Cyan, false), None, message)
    }

    /// Print a success message
    pub fn success(&self, message: &str) -> std::io::Result<()> {
        self.tagged("✓", &fg(Color::Green, true), None, message)
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) -> std::io::Result<()> {
        self.tagged(
            "⚠",
            &fg(Color::Yellow, true),
            Some(&fg(Color::Yellow, false)),
            message,
        )
    }

    /// Print an error message to stderr, even in quiet mode
    pub fn error(&self, message: &str) {
        let bufwtr = BufferWriter::stderr(ColorChoice::Auto);
        let mut buffer = bufwtr.buffer();

        let written = buffer
            .set_color(&fg(Color::Red, true))
            .and_then(|_| write!(&mut buffer, "✗"))
            .and_then(|_| buffer.set_color(&fg(Color::Red, false)))
            .and_then(|_| writeln!(&mut buffer, " {}", message))
            .and_then(|_| buffer.reset())
            .and_then(|_| bufwtr.print(&buffer));

        if written.is_err() {
            eprintln!("✗ {}", message);
        }
    }

    /// Print a message only in verbose mode
    pub fn verbose(&self, message: &str) -> std::io::Result<()> {
        if !self.verbose {
            return Ok(());
        }
        self.tagged(
            "→",
            &fg(Color::Blue, false),
            Some(&fg(Color::White, false)),
            message,
        )
    }

    /// Print a section header
    pub fn section(&self, title: &str) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }

        let mut buffer = self.bufwtr.buffer();
        writeln!(&mut buffer)?;
        buffer.set_color(&fg(Color::Cyan, true))?;
        writeln!(&mut buffer, "═══ {} ═══", title)?;
        buffer.reset()?;
        self.bufwtr.print(&buffer)
    }

    /// Print indented text
    pub fn indent(&self, message: &str) -> std::io::Result<()> {
        self.plain(&format!("    {}", message))
    }

    /// Print a plain message
    pub fn println(&self, message: &str) -> std::io::Result<()> {
        self.plain(message)
    }

    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Check if quiet mode is enabled
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    fn plain(&self, message: &str) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }

        let mut buffer = self.bufwtr.buffer();
        writeln!(&mut buffer, "{}", message)?;
        self.bufwtr.print(&buffer)
    }

    fn tagged(
        &self,
        symbol: &str,
        symbol_color: &ColorSpec,
        text_color: Option<&ColorSpec>,
        message: &str,
    ) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }

        let mut buffer = self.bufwtr.buffer();
        buffer.set_color(symbol_color)?;
        write!(&mut buffer, "{}", symbol)?;
        buffer.reset()?;
        if let Some(color) = text_color {
            buffer.set_color(color)?;
        }
        writeln!(&mut buffer, " {}", message)?;
        buffer.reset()?;
        self.bufwtr.print(&buffer)
    }
}

fn fg(color: Color, bold: bool) -> ColorSpec {
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(color)).set_bold(bold);
    spec
}
