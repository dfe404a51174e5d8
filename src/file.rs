//! Input and output plumbing for the command-line front end.
//!
//! A missing path, or `-`, means stdin/stdout. With `hex` enabled the data
//! is exchanged as a single line of lowercase hex instead of raw bytes.

use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};

const STDIO_PATH: &str = "-";

#[inline]
fn is_stdio(path: Option<&Path>) -> bool {
    path.is_none_or(|p| p.as_os_str() == STDIO_PATH)
}

/// Reads the whole input, decoding it from hex when requested.
pub fn read_input(path: Option<&Path>, hex: bool) -> Result<Vec<u8>> {
    let raw = match path.filter(|_| !is_stdio(path)) {
        Some(path) => fs::read(path).with_context(|| format!("failed to read file: {}", path.display()))?,
        None => {
            let mut buf = Vec::new();
            io::stdin().lock().read_to_end(&mut buf).context("failed to read stdin")?;
            buf
        }
    };

    if !hex {
        return Ok(raw);
    }

    decode_hex(&raw)
}

/// Writes `data` to the output, encoding it as hex when requested.
pub fn write_output(path: Option<&Path>, data: &[u8], hex: bool) -> Result<()> {
    let encoded;
    let bytes = if hex {
        encoded = format!("{}\n", ::hex::encode(data));
        encoded.as_bytes()
    } else {
        data
    };

    match path.filter(|_| !is_stdio(path)) {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).with_context(|| format!("failed to create directory: {}", parent.display()))?;
            }

            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(path)
                .with_context(|| format!("failed to create file: {}", path.display()))?;

            let mut writer = BufWriter::new(file);
            writer.write_all(bytes).with_context(|| format!("failed to write file: {}", path.display()))?;
            writer.flush().with_context(|| format!("failed to flush file: {}", path.display()))
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(bytes).context("failed to write stdout")?;
            stdout.flush().context("failed to flush stdout")
        }
    }
}

fn decode_hex(raw: &[u8]) -> Result<Vec<u8>> {
    let text = std::str::from_utf8(raw).context("hex input is not valid utf-8")?;
    let digits: String = text.split_whitespace().collect();
    ::hex::decode(digits).context("invalid hex input")
}
