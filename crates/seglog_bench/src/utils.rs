//! Benchmark utilities.

use rand::Rng;
use seglog_core::{Config, Log, Record};
use tempfile::TempDir;

/// Generate random record data of the specified size.
pub fn random_data(size: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..size).map(|_| rng.gen()).collect()
}

/// Generate a batch of records with the given value size.
pub fn generate_records(count: usize, value_size: usize) -> Vec<Record> {
    (0..count)
        .map(|_| Record::new(random_data(value_size)))
        .collect()
}

/// Open a log in a fresh temporary directory.
///
/// The directory is deleted when the returned guard is dropped.
pub fn temp_log(config: Config) -> (TempDir, Log) {
    let dir = TempDir::new().unwrap();
    let log = Log::open(dir.path(), config).unwrap();
    (dir, log)
}

/// Open a log holding `count` records of `value_size` bytes.
pub fn populated_log(config: Config, count: usize, value_size: usize) -> (TempDir, Log) {
    let (dir, log) = temp_log(config);
    for record in generate_records(count, value_size) {
        log.append(record).unwrap();
    }
    (dir, log)
}
