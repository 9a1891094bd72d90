use std::io::{IsTerminal, Write};

use termcolor::{BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};
use zibrai::diagnostics::{Diagnostic, Phase};

pub fn print_diagnostic(diagnostic: &Diagnostic) {
    let (prefix, color) = match diagnostic.phase {
        Phase::Syntax => ("error", Color::Red),
        Phase::Runtime => ("runtime error", Color::Magenta),
    };
    print_colourful_prefix(prefix, color, &diagnostic.to_string());
}

pub fn print_fatal_error(text: &str) {
    print_colourful_prefix("fatal error", Color::Red, text);
}

fn print_colourful_prefix(prefix: &str, color: Color, text: &str) {
    let buffer_writer = stderr_buffer_writer();
    let mut buffer = buffer_writer.buffer();
    let _ = buffer.set_color(
        ColorSpec::new()
            .set_intense(true)
            .set_bold(true)
            .set_fg(Some(color)),
    );
    let _ = write!(buffer, "{prefix}");
    let _ = buffer.set_color(&ColorSpec::new());
    let _ = writeln!(buffer, ": {text}");
    let _ = buffer_writer.print(&buffer);
}

fn stderr_buffer_writer() -> BufferWriter {
    BufferWriter::stderr(color_choice())
}

fn colour_forced() -> bool {
    if let Ok(force) = std::env::var("FORCE_COLOR") {
        !force.is_empty()
    } else {
        false
    }
}

fn color_choice() -> ColorChoice {
    if colour_forced() {
        ColorChoice::Always
    } else if std::io::stderr().is_terminal() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}
