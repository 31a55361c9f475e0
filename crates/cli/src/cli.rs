use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "slideshow-cache")]
#[command(about = "Inspect and maintain an on-disk HTTP response cache")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        long,
        global = true,
        env = "SLIDESHOW_CACHE_DIR",
        help = "Cache root directory (defaults to the platform cache directory)"
    )]
    pub root: Option<PathBuf>,

    #[arg(
        short = 'l',
        long,
        global = true,
        help = "Set logging level",
        default_value = "warn",
        value_enum
    )]
    pub level: crate::tracing::LogLevel,

    #[arg(
        long,
        global = true,
        help = "Log output format",
        default_value = "compact",
        value_enum
    )]
    pub log_format: crate::tracing::TracingFormat,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "List cached keys with status code and body path")]
    List,
    #[command(about = "Print the stored metadata for a key as JSON")]
    Show {
        #[arg(help = "Cache key, usually the request URL")]
        key: String,
    },
    #[command(about = "Write the cached body for a key to stdout")]
    Cat {
        #[arg(help = "Cache key, usually the request URL")]
        key: String,
    },
    #[command(about = "Cache a local file as the response for a key")]
    Put {
        #[arg(help = "Cache key, usually the request URL")]
        key: String,
        #[arg(help = "File holding the response body")]
        file: PathBuf,
        #[arg(
            long = "header",
            short = 'H',
            help = "Response header in 'Name: value' form (repeatable)"
        )]
        headers: Vec<String>,
        #[arg(long, help = "Response status line", default_value = "HTTP/1.1 200 OK")]
        status_line: String,
    },
    #[command(about = "Forget a key (body files are kept)")]
    Remove {
        #[arg(help = "Cache key, usually the request URL")]
        key: String,
    },
}

pub fn parse() -> Cli {
    Cli::parse()
}
