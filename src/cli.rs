use anstyle::AnsiColor;
use clap::builder::styling::Styles;
use clap::{Parser, ValueEnum};

use crate::session::Mode;

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default())
    .usage(AnsiColor::Green.on_default())
    .literal(AnsiColor::Cyan.on_default())
    .placeholder(AnsiColor::Red.on_default());

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Get,
    Put,
}

#[derive(Parser, Debug)]
#[command(name = "tftpc")]
#[command(about = "A simple TFTP client", long_about = None)]
#[command(styles = STYLES)]
pub struct Cli {
    /// Transfer mode
    #[arg(value_enum)]
    pub mode: Mode,

    /// Transfer direction
    #[arg(value_enum)]
    pub action: Action,

    /// Server hostname or IP address
    pub server: String,

    /// File to transfer
    pub filename: String,

    /// Server port
    #[arg(short, long, default_value_t = crate::TFTP_PORT)]
    pub port: u16,

    /// Local port (0 picks an ephemeral one)
    #[arg(short, long, default_value_t = 0)]
    pub local_port: u16,

    /// Timeout (s)
    #[arg(short, long, default_value_t = crate::DEF_TIMEOUT_SEC)]
    pub timeout: u64,

    /// Max retries per packet
    #[arg(short, long, default_value_t = crate::MAX_RETRY_COUNT)]
    pub retry: u8,
}
