//! hashnote CLI
//!
//! Runs the content pipeline over stdin/stdout:
//!
//! ```text
//! echo '<p>hi</p>' | hashnote encode        # markup -> share token
//! echo 'H4sIA...' | hashnote decode         # share token -> sanitized markup
//! hashnote sanitize < note.html
//! ```
//!
//! Logging goes to stderr and is controlled by `RUST_LOG`
//! (default: `hashnote=info`).

use std::io::{self, Read, Write};

use clap::{Parser, Subcommand};
use hashnote::codec::{CodecOptions, ContentCodec, DEFAULT_LEVEL, DEFAULT_MAX_DECOMPRESSED_BYTES};
use hashnote::{escape_html, sanitize, unescape_html};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "hashnote")]
#[command(version)]
#[command(about = "Encode notes into URL-fragment share tokens and back", long_about = None)]
struct Cli {
    /// gzip level (0-9)
    #[arg(long, global = true, default_value_t = DEFAULT_LEVEL)]
    level: u32,

    /// Largest document `decode` will produce, in bytes
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_DECOMPRESSED_BYTES)]
    max_bytes: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress markup from stdin into a share token
    Encode,
    /// Decode a share token from stdin and print sanitized markup
    Decode {
        /// Print the decoded markup without sanitizing it
        #[arg(long)]
        raw: bool,
    },
    /// Sanitize markup from stdin
    Sanitize,
    /// Escape plain text from stdin for literal display
    Escape,
    /// Print the text content of markup from stdin
    Unescape,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hashnote=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let options = CodecOptions {
        level: cli.level,
        max_decompressed_bytes: cli.max_bytes,
    };

    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;

    let output = match cli.command {
        Commands::Encode => ContentCodec::probe(options)?.compress(&input)?,
        Commands::Decode { raw } => {
            let markup = ContentCodec::probe(options)?.decompress(input.trim())?;
            if raw { markup } else { sanitize(&markup) }
        }
        Commands::Sanitize => sanitize(&input),
        Commands::Escape => escape_html(&input),
        Commands::Unescape => unescape_html(&input),
    };

    let mut stdout = io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    stdout.write_all(b"\n")?;
    Ok(())
}
