use chrono::Local;
use std::env;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

const WRITE_BUFFER: usize = 256 * 1024; // 256KB

/// `$XDG_DATA_HOME/segsieve`, else `$HOME/.local/share/segsieve`, else `./segsieve`.
pub fn data_dir() -> PathBuf {
    data_dir_from(env::var("XDG_DATA_HOME").ok(), env::var("HOME").ok())
}

/// Resolve the data directory from the two environment values; an empty
/// `XDG_DATA_HOME` counts as unset.
pub fn data_dir_from(xdg_data_home: Option<String>, home: Option<String>) -> PathBuf {
    let base = xdg_data_home
        .filter(|path| !path.is_empty())
        .map(PathBuf::from)
        .or_else(|| home.map(|home| PathBuf::from(home).join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    base.join("segsieve")
}

fn create_for_write(path: &Path) -> std::io::Result<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;
    Ok(BufWriter::with_capacity(WRITE_BUFFER, file))
}

/// Write one prime per line, then a blank line and the elapsed time
pub fn save_primes(path: &Path, primes: &[usize], elapsed: Duration) -> std::io::Result<()> {
    let mut writer = create_for_write(path)?;

    // itoa for speed
    let mut itoa_buf = itoa::Buffer::new();
    for &prime in primes {
        writer.write_all(itoa_buf.format(prime).as_bytes())?;
        writer.write_all(b"\n")?;
    }

    write!(writer, "\nElapsed: {:.2} seconds", elapsed.as_secs_f64())?;
    writer.flush()
}

/// Binary format: 8 bytes per prime (little-endian u64)
pub fn save_primes_binary(path: &Path, primes: &[usize]) -> std::io::Result<()> {
    let mut writer = create_for_write(path)?;

    for &prime in primes {
        writer.write_all(&(prime as u64).to_le_bytes())?;
    }

    writer.flush()
}

/// Read primes written by `save_primes`, skipping lines that are not numbers.
pub fn load_primes(path: &Path) -> std::io::Result<Vec<usize>> {
    let reader = BufReader::new(File::open(path)?);

    let mut primes = Vec::new();
    for line in reader.lines() {
        if let Ok(prime) = line?.trim().parse::<usize>() {
            primes.push(prime);
        }
    }
    Ok(primes)
}

pub fn log_execution(
    dir: &Path,
    subcommand: &str,
    count: usize,
    variation: u32,
    duration_us: u128,
) -> std::io::Result<()> {
    fs::create_dir_all(dir)?;

    let log_path = dir.join("execution_log.txt");
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;

    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");

    writeln!(
        file,
        "{} | {} | {} | v{} | {}us",
        timestamp, subcommand, count, variation, duration_us
    )?;

    Ok(())
}
