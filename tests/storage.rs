use std::fs;
use std::time::Duration;

use segsieve::{first_n_primes, storage};
use temp_dir::TempDir;

#[test]
fn text_output_reloads_without_the_elapsed_line() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("primes_sieve.txt");
    let primes = first_n_primes(100).unwrap();

    storage::save_primes(&path, &primes, Duration::from_millis(1250)).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("2\n3\n5\n"));
    assert!(content.ends_with("541\n\nElapsed: 1.25 seconds"));
    assert_eq!(storage::load_primes(&path).unwrap(), primes);
}

#[test]
fn binary_output_is_little_endian_u64() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("primes_sieve.bin");

    storage::save_primes_binary(&path, &[2, 3, 65_537]).unwrap();

    let bytes = fs::read(&path).unwrap();
    assert_eq!(bytes.len(), 24);
    let values: Vec<u64> = bytes
        .chunks_exact(8)
        .map(|chunk| u64::from_le_bytes(chunk.try_into().unwrap()))
        .collect();
    assert_eq!(values, vec![2, 3, 65_537]);
}

#[test]
fn execution_log_appends() {
    let dir = TempDir::new().unwrap();

    storage::log_execution(dir.path(), "primes", 10, 3, 1234).unwrap();
    storage::log_execution(dir.path(), "primes", 20, 1, 99).unwrap();

    let log = fs::read_to_string(dir.path().join("execution_log.txt")).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with(" | primes | 10 | v3 | 1234us"));
    assert!(lines[1].ends_with(" | primes | 20 | v1 | 99us"));
}

#[test]
fn data_dir_is_named_after_the_tool() {
    assert!(storage::data_dir().ends_with("segsieve"));
}
