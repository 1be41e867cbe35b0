use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::{HarnessError, Result};

/// Default device read for seeds.
pub const DEFAULT_ENTROPY_PATH: &str = "/dev/random";

/// Supplies the seed for the operand generator.
pub trait SeedSource {
    fn seed(&mut self) -> Result<u64>;
}

/// Reads eight bytes from an entropy device or file.
#[derive(Debug, Clone)]
pub struct DeviceSeed {
    path: PathBuf,
}

impl DeviceSeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DeviceSeed { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for DeviceSeed {
    fn default() -> Self {
        Self::new(DEFAULT_ENTROPY_PATH)
    }
}

impl SeedSource for DeviceSeed {
    fn seed(&mut self) -> Result<u64> {
        let mut file =
            File::open(&self.path).map_err(|source| HarnessError::EntropySourceUnavailable {
                path: self.path.clone(),
                source,
            })?;
        let mut buf = [0u8; 8];
        file.read_exact(&mut buf)
            .map_err(|source| HarnessError::EntropyReadFailed {
                path: self.path.clone(),
                source,
            })?;
        Ok(u64::from_ne_bytes(buf))
    }
}

/// A constant seed, for reproducible runs.
#[derive(Debug, Clone, Copy)]
pub struct FixedSeed(pub u64);

impl SeedSource for FixedSeed {
    fn seed(&mut self) -> Result<u64> {
        Ok(self.0)
    }
}
