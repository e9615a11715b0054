use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::{error, info};

use super::{Alignment, Composer, ComposerError, Event, Outcome};

pub const HELP: &str = "\
Commands:
  text <text>       set the watermark text
  size <n>          set the font size (digits only)
  color <c>         set the color (#rgb, #rrggbb, #rrggbbaa, a name, or auto)
  align <preset>    center, top left, top right, bottom left, bottom right
  angle <n>         set the rotation in degrees (digits only)
  load [path]       load a PNG or JPEG image (no path cancels)
  save [path]       save the composed view as .png/.jpg/.jpeg (no path cancels)
  show              print the current settings
  presets           list the alignment presets
  help              show this message
  quit              leave the session";

/// One line of input from the interactive session
#[derive(Debug, Clone)]
pub enum Command {
    Event(Event),
    Show,
    Presets,
    Help,
    Quit,
    Empty,
}

fn optional_path(argument: &str) -> Option<PathBuf> {
    if argument.is_empty() {
        None
    } else {
        Some(PathBuf::from(argument))
    }
}

pub fn parse_command(line: &str) -> Result<Command, ComposerError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Command::Empty);
    }

    let (verb, argument) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "text" => Command::Event(Event::TextChanged(argument.to_string())),
        "size" => Command::Event(Event::FontSizeInput(argument.to_string())),
        "angle" => Command::Event(Event::AngleInput(argument.to_string())),
        "color" | "colour" => {
            let color = if argument.is_empty() {
                None
            } else {
                Some(argument.parse()?)
            };
            Command::Event(Event::ColorChosen(color))
        }
        "align" => Command::Event(Event::AlignmentSelected(argument.parse()?)),
        "load" => Command::Event(Event::LoadImage(optional_path(argument))),
        "save" => Command::Event(Event::SaveImage(optional_path(argument))),
        "show" => Command::Show,
        "presets" => Command::Presets,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => return Err(ComposerError::InvalidCommand(verb.to_string())),
    };

    Ok(command)
}

pub fn describe_presets() -> String {
    Alignment::ALL
        .iter()
        .map(|alignment| {
            let placement = alignment.placement();
            format!(
                "{:<13} ({}, {}) anchor {:?}",
                alignment.name(),
                placement.x,
                placement.y,
                placement.anchor
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn describe_state(composer: &Composer) -> String {
    let watermark = composer.watermark();
    let image = match composer.image() {
        Some(loaded) => format!(
            "{} ({} shown at {})",
            loaded.path.display(),
            loaded.original_size,
            loaded.size()
        ),
        None => "none".to_string(),
    };
    format!(
        "text: {:?}\nsize: {}\ncolor: {}\nalign: {}\nangle: {}\nimage: {}\nview: {}",
        watermark.text,
        watermark.font_size,
        watermark.color,
        watermark.alignment,
        watermark.angle,
        image,
        composer.view_size()
    )
}

fn describe_outcome(outcome: &Outcome) -> Option<String> {
    match outcome {
        Outcome::Updated | Outcome::Scheduled | Outcome::Ignored => None,
        Outcome::Cancelled => Some("cancelled".to_string()),
        Outcome::Loaded(size) => Some(format!("loaded, showing at {}", size)),
        Outcome::Saved(path) => Some(format!("saved {}", path.display())),
    }
}

/// Run a parsed command, returning the message to print (if any)
fn execute(composer: &mut Composer, command: Command) -> Result<Option<String>, ComposerError> {
    match command {
        Command::Event(event) => Ok(describe_outcome(&composer.dispatch(event)?)),
        Command::Show => Ok(Some(describe_state(composer))),
        Command::Presets => Ok(Some(describe_presets())),
        Command::Help => Ok(Some(HELP.to_string())),
        Command::Empty | Command::Quit => Ok(None),
    }
}

/// Read commands line by line and feed them to the composer until `quit` or EOF.
///
/// Failures are reported on `output` and the session keeps going.
pub fn run_session<R: BufRead, W: Write>(
    composer: &mut Composer,
    input: R,
    mut output: W,
) -> std::io::Result<()> {
    info!("Starting interactive session");

    for line in input.lines() {
        let result = match parse_command(&line?) {
            Ok(Command::Quit) => break,
            Ok(command) => execute(composer, command),
            Err(e) => Err(e),
        };

        match result {
            Ok(Some(message)) => writeln!(output, "{}", message)?,
            Ok(None) => {}
            Err(e) => {
                error!("{}", e);
                writeln!(output, "error: {}", e)?;
            }
        }
        output.flush()?;
    }

    info!("Session ended");
    Ok(())
}
