use clap::Parser;
use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::net::lookup_host;
use tokio::time::{Duration, Instant};

use tftpc::{Action, ByteSink, ByteSource, Cli, ErrorKind, TransferError, TransferSession};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}.");
            ExitCode::from(err.kind.code())
        }
    }
}

async fn run(args: Cli) -> Result<(), TransferError> {
    let server = resolve(&args.server, args.port)
        .await
        .map_err(|kind| kind.after(0))?;
    let mut session = TransferSession::new(
        server,
        args.local_port,
        args.mode,
        Duration::from_secs(args.timeout),
        args.retry,
    )
    .await?;

    let start = Instant::now();
    let bytes = match args.action {
        Action::Put => {
            let mut source = FileSource(PathBuf::from(&args.filename));
            let bytes = session.upload(&args.filename, &mut source).await?;
            println!("{bytes} bytes written.");
            println!("PUT successful");
            bytes
        }
        Action::Get => {
            let mut sink = FileSink(PathBuf::from(&args.filename));
            let bytes = session.download(&args.filename, &mut sink).await?;
            println!("{bytes} bytes retrieved.");
            println!("GET successful");
            bytes
        }
    };

    let cost = start.elapsed();
    println!(
        "cost: {:.3}s, speed: {:.2} MB/s",
        cost.as_secs_f64(),
        bytes as f64 / cost.as_secs_f64() / 1024.0 / 1024.0
    );
    Ok(())
}

async fn resolve(host: &str, port: u16) -> Result<SocketAddr, ErrorKind> {
    let mut addrs = lookup_host((host, port))
        .await
        .map_err(|_| ErrorKind::HostNotFound)?;
    addrs.next().ok_or(ErrorKind::HostNotFound)
}

struct FileSource(PathBuf);

impl ByteSource for FileSource {
    fn read_all(&mut self) -> Result<Vec<u8>, ErrorKind> {
        fs::read(&self.0).map_err(|e| match e.kind() {
            std::io::ErrorKind::PermissionDenied => ErrorKind::AccessViolation,
            _ => ErrorKind::FileNotFound,
        })
    }
}

struct FileSink(PathBuf);

impl ByteSink for FileSink {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), ErrorKind> {
        fs::write(&self.0, bytes).map_err(|e| match e.kind() {
            std::io::ErrorKind::PermissionDenied => ErrorKind::AccessViolation,
            _ => ErrorKind::DiskFull,
        })
    }
}
