use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use watermark_composer::{
    Config,
    composer::{Alignment, Composer, Event, Outcome, WatermarkColor, commands},
    startup_checks,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Global options that apply to all commands
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,

    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Edit interactively, one command per line on stdin (default if no command specified)
    Session,

    /// Load an image, apply the watermark and save the result in one go
    Compose {
        /// PNG or JPEG image to load
        #[arg(short, long)]
        input: PathBuf,

        /// Destination; .png, .jpg or .jpeg selects the format
        #[arg(short, long)]
        output: PathBuf,

        #[arg(long)]
        text: Option<String>,

        /// Font size in pixels
        #[arg(long)]
        size: Option<String>,

        /// #rgb, #rrggbb, #rrggbbaa, a color name, or "auto"
        #[arg(long)]
        color: Option<WatermarkColor>,

        /// center, top-left, top-right, bottom-left or bottom-right
        #[arg(long)]
        align: Option<Alignment>,

        /// Rotation in degrees, anticlockwise
        #[arg(long)]
        angle: Option<String>,
    },

    /// List the alignment presets
    Presets,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Set up logging first
    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Logs go to stderr so the session's replies on stdout stay readable
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Some(Commands::Presets) => {
            println!("{}", commands::describe_presets());
            Ok(())
        }
        Some(Commands::Compose {
            input,
            output,
            text,
            size,
            color,
            align,
            angle,
        }) => {
            let mut composer = create_composer(&cli.config)?;

            let mut events = Vec::new();
            events.extend(text.map(Event::TextChanged));
            events.extend(size.map(Event::FontSizeInput));
            events.extend(color.map(|c| Event::ColorChosen(Some(c))));
            events.extend(align.map(Event::AlignmentSelected));
            events.extend(angle.map(Event::AngleInput));
            events.push(Event::LoadImage(Some(input)));
            events.push(Event::SaveImage(Some(output)));

            for event in events {
                let name = event.name();
                if composer.dispatch(event)? == Outcome::Ignored {
                    tracing::warn!("Ignored non-numeric value for {}", name);
                }
            }
            Ok(())
        }
        Some(Commands::Session) | None => {
            let mut composer = create_composer(&cli.config)?;
            println!("{}", commands::HELP);
            let stdin = std::io::stdin();
            commands::run_session(&mut composer, stdin.lock(), std::io::stdout())?;
            Ok(())
        }
    }
}

fn create_composer(config_path: &Path) -> Result<Composer, Box<dyn std::error::Error>> {
    let config = Config::load(config_path)?;
    info!("Configuration loaded from: {:?}", config_path);
    info!("Font: {:?}", config.font.path);

    match startup_checks::perform_startup_checks(&config) {
        Ok(()) => {}
        Err(errors) => {
            for error in &errors {
                tracing::error!("Startup check failed: {}", error);
            }
            if errors.iter().any(|e| e.is_critical()) {
                tracing::error!("Critical startup check failed, exiting");
                return Err("Critical startup check failed".into());
            } else {
                tracing::warn!("Non-critical startup checks failed, continuing");
            }
        }
    }

    Ok(Composer::new(config)?)
}
