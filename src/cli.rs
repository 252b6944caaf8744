use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    /// Skip the busy port check
    #[clap(long, short)]
    pub force: bool,

    /// enable debug output
    #[clap(long, short)]
    pub debug: bool,

    /// UART device or 'auto'
    #[clap(long, short, default_value = "auto")]
    pub port: String,

    /// UART baud rate, must match the instrument setting
    #[clap(long, short, default_value_t = 9600)]
    pub baudrate: u32,

    /// Use json-formatted output
    #[clap(long, short)]
    pub json: bool,

    /// Drop buffered input after this many bytes without a line end
    #[clap(long, default_value_t = 4096)]
    pub max_line: usize,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print readings as the instrument sends them
    Monitor {
        /// Print the raw record instead of the decoded reading
        #[clap(long)]
        raw: bool,

        /// Only show quantities matching this regular expression
        #[clap(long, short)]
        quantity: Option<String>,
    },

    /// Decode a captured byte stream
    Replay {
        file: PathBuf,

        /// Bytes fed to the decoder per read
        #[clap(long, default_value_t = 64)]
        chunk_size: usize,
    },

    /// Decode records given on the command line
    Parse {
        #[clap(required = true)]
        lines: Vec<String>,
    },

    /// List quantity codes with a dedicated extractor
    ListSensors,
}
