//! CLI argument parsing for the relay server

use std::io::{BufRead, IsTerminal, Write};
use std::path::PathBuf;

use clap::Parser;

use relay_utils::Result;

use crate::config::ServerConfig;

/// Line-oriented JSON chat relay
#[derive(Parser, Debug, Default)]
#[command(name = "relay-server")]
#[command(about = "Multi-client chat relay speaking newline-delimited JSON")]
#[command(version)]
pub struct Cli {
    /// Host address to listen on
    #[arg(long, env = "RELAY_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "RELAY_PORT")]
    pub port: Option<u16>,

    /// Configuration file (defaults to the XDG config location)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Never prompt for omitted values
    #[arg(long)]
    pub no_prompt: bool,

    /// Print the default configuration file and exit
    #[arg(long)]
    pub print_default_config: bool,
}

impl Cli {
    /// Fill in the listen address
    ///
    /// Flags win. Anything still missing is prompted for when stdin is a
    /// terminal, with the configured value offered as the default.
    pub fn apply_to(&self, server: &mut ServerConfig) -> Result<()> {
        let interactive = !self.no_prompt && std::io::stdin().is_terminal();

        if interactive && (self.host.is_none() || self.port.is_none()) {
            let stdin = std::io::stdin();
            let mut input = stdin.lock();
            let mut output = std::io::stderr();
            self.resolve(server, Some((&mut input, &mut output)))
        } else {
            self.resolve::<std::io::Empty, std::io::Sink>(server, None)
        }
    }

    fn resolve<R, W>(&self, server: &mut ServerConfig, prompt: Option<(&mut R, &mut W)>) -> Result<()>
    where
        R: BufRead,
        W: Write,
    {
        if let Some(host) = &self.host {
            server.host = host.clone();
        }
        if let Some(port) = self.port {
            server.port = port;
        }

        let Some((input, output)) = prompt else {
            return Ok(());
        };

        if self.host.is_none() {
            server.host = prompt_value(input, output, "Host address", &server.host)?;
        }
        if self.port.is_none() {
            server.port = prompt_port(input, output, server.port)?;
        }
        Ok(())
    }
}

/// Ask for a value, returning `default` on an empty answer
fn prompt_value<R, W>(input: &mut R, output: &mut W, label: &str, default: &str) -> Result<String>
where
    R: BufRead,
    W: Write,
{
    write!(output, "{} [{}]: ", label, default)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(default.to_string());
    }

    let answer = line.trim();
    if answer.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(answer.to_string())
    }
}

/// Ask for a port until the answer parses
fn prompt_port<R, W>(input: &mut R, output: &mut W, default: u16) -> Result<u16>
where
    R: BufRead,
    W: Write,
{
    let default_text = default.to_string();
    loop {
        let answer = prompt_value(input, output, "Host port", &default_text)?;
        match answer.parse::<u16>() {
            Ok(port) => return Ok(port),
            Err(_) => {
                writeln!(output, "Error: '{}' is not a valid port.", answer)?;
            }
        }
    }
}
