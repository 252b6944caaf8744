mod cli;

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::{generate, shells::Bash};
use log::error;
use regex::Regex;

use multiline::frame::{FrameAssembler, FrameError};
use multiline::port::{self, PortSettings};
use multiline::sensors::{self, REGISTRY};
use multiline::{read_instrument, Decoded, Decoder};

use cli::{Cli, Commands};

#[derive(Clone, Copy)]
enum OutputFormat {
    Plain,
    Json,
}

/// How each decoded record is printed.
struct Printer {
    fmt: OutputFormat,
    raw: bool,
    quantity: Option<Regex>,
}

impl Printer {
    /// Failed records are already logged by the decoder and are skipped.
    fn print(&self, decoded: std::result::Result<Decoded, FrameError>) -> Result<()> {
        let decoded = match decoded {
            Ok(decoded) => decoded,
            Err(_) => return Ok(()),
        };
        let mut out = io::stdout().lock();

        if self.raw {
            write!(out, "{}", decoded.line)?;
            return Ok(out.flush()?);
        }

        let reading = match decoded.reading {
            Ok(reading) => reading,
            Err(_) => return Ok(()),
        };
        if let Some(re) = &self.quantity {
            if !re.is_match(&reading.quantity) {
                return Ok(());
            }
        }

        match self.fmt {
            OutputFormat::Plain => writeln!(out, "{}", reading)?,
            OutputFormat::Json => writeln!(out, "{}", json::stringify(reading.to_json()))?,
        }
        Ok(())
    }
}

/// Limits every read to `chunk` bytes.
struct Chunked<R> {
    inner: R,
    chunk: usize,
}

impl<R: Read> Read for Chunked<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.chunk);
        self.inner.read(&mut buf[..n])
    }
}

fn make_decoder(max_line: usize) -> Decoder<'static> {
    Decoder::new(
        FrameAssembler::new().with_max_len(max_line),
        sensors::Dispatcher::default(),
    )
}

fn cmd_monitor(cli: &Cli, printer: &Printer) -> Result<String> {
    let settings = PortSettings::default().with_baudrate(cli.baudrate);
    let mut port = port::open_port(&cli.port, &settings, cli.force)
        .with_context(|| format!("Can't open port '{}'", cli.port))?;
    let mut decoder = make_decoder(cli.max_line);

    read_instrument(port.as_mut(), &mut decoder, |d| printer.print(d))?;
    Ok(String::new())
}

fn cmd_replay(cli: &Cli, printer: &Printer, path: &Path, chunk_size: usize) -> Result<String> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut source = Chunked {
        inner: file,
        chunk: chunk_size.max(1),
    };
    let mut decoder = make_decoder(cli.max_line);

    read_instrument(&mut source, &mut decoder, |d| printer.print(d))
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(String::new())
}

/// Decode every line on its own. Returns the rendered readings and the
/// number of lines that failed.
fn parse_lines(lines: &[String], fmt: OutputFormat) -> (String, usize) {
    let mut readings = Vec::new();
    let mut failed = 0;

    for line in lines {
        match sensors::parse_sensor(line) {
            Ok(reading) => readings.push(reading),
            Err(e) => {
                error!("Failed to parse {:?}: {}", line, e);
                failed += 1;
            }
        }
    }

    let out = match fmt {
        OutputFormat::Plain => readings
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<String>>()
            .join("\n"),
        OutputFormat::Json => match readings.as_slice() {
            [reading] => json::stringify(reading.to_json()),
            _ => json::stringify(
                readings
                    .iter()
                    .map(|r| r.to_json())
                    .collect::<Vec<_>>(),
            ),
        },
    };
    (out, failed)
}

fn cmd_parse(lines: &[String], fmt: OutputFormat) -> Result<String> {
    let (out, failed) = parse_lines(lines, fmt);
    if failed == 0 {
        return Ok(out);
    }

    if !out.is_empty() {
        println!("{}", out);
    }
    Err(anyhow!("{} of {} line(s) failed to parse", failed, lines.len()))
}

fn cmd_list_sensors(fmt: OutputFormat) -> Result<String> {
    let codes = REGISTRY.codes();
    Ok(match fmt {
        OutputFormat::Plain => codes.join("\n"),
        OutputFormat::Json => json::stringify(codes),
    })
}

fn do_main() -> Result<String> {
    if std::env::var("GENERATE_COMPLETION").is_ok() {
        generate(
            Bash,
            &mut cli::Cli::command(),
            "multiline-tool",
            &mut io::stdout(),
        );

        return Ok(String::default());
    }

    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(if cli.debug {
        "debug"
    } else {
        "info"
    }))
    .format_timestamp(None)
    .format_target(false)
    .init();

    let fmt = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Plain
    };

    match &cli.command {
        Commands::Monitor { raw, quantity } => {
            let quantity = quantity
                .as_deref()
                .map(Regex::new)
                .transpose()
                .context("Bad quantity filter")?;
            let printer = Printer {
                fmt,
                raw: *raw,
                quantity,
            };
            cmd_monitor(&cli, &printer)
        }
        Commands::Replay { file, chunk_size } => {
            let printer = Printer {
                fmt,
                raw: false,
                quantity: None,
            };
            cmd_replay(&cli, &printer, file, *chunk_size)
        }
        Commands::Parse { lines } => cmd_parse(lines, fmt),
        Commands::ListSensors => cmd_list_sensors(fmt),
    }
}

fn main() {
    match do_main() {
        Ok(s) if s.is_empty() => (),
        Ok(s) => println!("{}", s),
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TURBIDITY: &str = "Multi 3630 IDS; 19410634;1;29.04.2020 10:35:33;414.3;FNU;TRB;;;;;;;VisoTurb 900-P; 19B103894;";
    const PH: &str = "Multi 3630 IDS; 19410634;1;29.04.2020 10:35:34;7.702;;pH;16.6;\u{b0}C;Temp;;100%;;SenTix 940; C200817020;";

    fn lines(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn bad_line_does_not_hide_good_ones() {
        let (out, failed) = parse_lines(&lines(&[TURBIDITY, "garbage", PH]), OutputFormat::Plain);

        assert_eq!(failed, 1);
        let printed: Vec<_> = out.lines().collect();
        assert_eq!(printed.len(), 2);
        assert!(printed[0].contains("turbidity"));
        assert!(printed[1].contains("pH"));
    }

    #[test]
    fn json_shape() {
        let (one, _) = parse_lines(&lines(&[TURBIDITY]), OutputFormat::Json);
        assert!(json::parse(&one).unwrap().is_object());

        let (two, _) = parse_lines(&lines(&[TURBIDITY, PH]), OutputFormat::Json);
        assert_eq!(json::parse(&two).unwrap().len(), 2);

        let (none, failed) = parse_lines(&lines(&["garbage"]), OutputFormat::Json);
        assert_eq!(failed, 1);
        assert_eq!(none, "[]");
    }

    #[test]
    fn parse_reports_failures() {
        assert!(cmd_parse(&lines(&[TURBIDITY]), OutputFormat::Plain).is_ok());
        let err = cmd_parse(&lines(&["garbage", TURBIDITY]), OutputFormat::Plain).unwrap_err();
        assert_eq!(err.to_string(), "1 of 2 line(s) failed to parse");
    }
}
