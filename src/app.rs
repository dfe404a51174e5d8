use std::path::PathBuf;

use anyhow::{Context, Result, ensure};
use clap::{Parser, Subcommand};
use pkcs7pad::config::{APP_NAME, DEFAULT_BLOCK_SIZE, MAX_BLOCK_SIZE, MIN_BLOCK_SIZE};
use pkcs7pad::file::{read_input, write_output};
use pkcs7pad::padding::{BlockSize, Pkcs7Padding, unpad};
use pkcs7pad::types::Operation;
use tracing::level_filters::LevelFilter;
use tracing::{debug, info};

#[derive(Subcommand)]
pub enum Commands {
    /// Append PKCS#7 padding.
    Pad {
        /// Input file path (stdin when omitted or "-").
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file path (stdout when omitted or "-").
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Cipher block size in bytes, between 1 and 255.
        #[arg(short, long, default_value_t = DEFAULT_BLOCK_SIZE)]
        block_size: usize,

        /// Read and write hex instead of raw bytes.
        #[arg(long)]
        hex: bool,
    },

    /// Validate and strip PKCS#7 padding.
    Unpad {
        /// Input file path (stdin when omitted or "-").
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file path (stdout when omitted or "-").
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Read and write hex instead of raw bytes.
        #[arg(long)]
        hex: bool,
    },
}

#[derive(Parser)]
#[command(name = APP_NAME, version, about = "Apply or strip PKCS#7 padding (RFC 5652).")]
pub struct App {
    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

impl App {
    pub fn init() -> Result<Self> {
        let app = Self::parse();
        let level = if app.verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };
        let subscriber = tracing_subscriber::fmt().with_writer(std::io::stderr).with_max_level(level).with_file(true).with_line_number(true).finish();
        tracing::subscriber::set_global_default(subscriber)?;
        Ok(app)
    }

    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Pad { input, output, block_size, hex } => Self::pad(input, output, block_size, hex).with_context(|| format!("{} failed", Operation::Pad)),
            Commands::Unpad { input, output, hex } => Self::unpad(input, output, hex).with_context(|| format!("{} failed", Operation::Unpad)),
        }
    }

    fn pad(input: Option<PathBuf>, output: Option<PathBuf>, block_size: usize, hex: bool) -> Result<()> {
        // User input must never reach the panicking constructor.
        ensure!((MIN_BLOCK_SIZE..=MAX_BLOCK_SIZE).contains(&block_size), "invalid block size: expected {MIN_BLOCK_SIZE}..={MAX_BLOCK_SIZE}, got {block_size}");
        let block_size = BlockSize::new(block_size);
        let padder = Pkcs7Padding::new(block_size);

        let mut data = read_input(input.as_deref(), hex)?;
        let input_len = data.len();
        padder.pad_in_place(&mut data);
        info!(operation = %Operation::Pad, block_size = block_size.get(), input_len, output_len = data.len(), "padded");

        write_output(output.as_deref(), &data, hex)
    }

    fn unpad(input: Option<PathBuf>, output: Option<PathBuf>, hex: bool) -> Result<()> {
        let data = read_input(input.as_deref(), hex)?;
        debug!(operation = %Operation::Unpad, input_len = data.len(), "read input");

        let unpadded = unpad(&data)?;
        info!(operation = %Operation::Unpad, input_len = data.len(), output_len = unpadded.len(), "unpadded");

        write_output(output.as_deref(), unpadded, hex)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pkcs7pad::padding::BadPadding;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_parse_pad_defaults() {
        let app = App::try_parse_from([APP_NAME, "pad"]).unwrap();
        match app.command {
            Commands::Pad { input, output, block_size, hex } => {
                assert!(input.is_none());
                assert!(output.is_none());
                assert_eq!(block_size, DEFAULT_BLOCK_SIZE);
                assert!(!hex);
            }
            Commands::Unpad { .. } => panic!("expected pad"),
        }
    }

    #[test]
    fn test_parse_unpad_with_flags() {
        let app = App::try_parse_from([APP_NAME, "-v", "unpad", "-i", "in.bin", "-o", "out.bin", "--hex"]).unwrap();
        assert!(app.verbose);
        assert!(matches!(app.command, Commands::Unpad { hex: true, .. }));
    }

    #[test]
    fn test_pad_then_unpad_files() {
        let dir = tempdir().unwrap();
        let plain = dir.path().join("plain.bin");
        let padded = dir.path().join("padded.bin");
        let restored = dir.path().join("restored.bin");
        fs::write(&plain, b"YELLOW SUBMARINE").unwrap();

        App::pad(Some(plain), Some(padded.clone()), 20, false).unwrap();
        assert_eq!(fs::read(&padded).unwrap(), b"YELLOW SUBMARINE\x04\x04\x04\x04");

        App::unpad(Some(padded), Some(restored.clone()), false).unwrap();
        assert_eq!(fs::read(&restored).unwrap(), b"YELLOW SUBMARINE");
    }

    #[test]
    fn test_pad_rejects_block_size_without_panicking() {
        let dir = tempdir().unwrap();
        let plain = dir.path().join("plain.bin");
        fs::write(&plain, b"data").unwrap();

        let err = App::pad(Some(plain.clone()), None, 0, false).unwrap_err();
        assert_eq!(err.to_string(), "invalid block size: expected 1..=255, got 0");

        let err = App::pad(Some(plain), None, 256, false).unwrap_err();
        assert_eq!(err.to_string(), "invalid block size: expected 1..=255, got 256");
    }

    #[test]
    fn test_unpad_reports_generic_error() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("bad.hex");
        fs::write(&input, "01020302").unwrap();

        let err = App::unpad(Some(input), Some(dir.path().join("out.bin")), true).unwrap_err();
        assert_eq!(err.downcast_ref::<BadPadding>(), Some(&BadPadding));
        assert!(!dir.path().join("out.bin").exists());
    }
}
