//! Neighbor Table Source
//!
//! Reads the kernel's link-layer neighbor cache at `/proc/net/arp`.
//! Permission denial is expected on hardened devices and maps to
//! `SourceError::PermissionDenied`, which the discovery layer turns into
//! an `Unavailable` signal - never a threat.

use std::io::ErrorKind;
use std::path::PathBuf;

use super::{NeighborTableSource, SourceError};

const NEIGHBOR_TABLE_PATH: &str = "/proc/net/arp";

pub struct ProcNeighborTable {
    path: PathBuf,
}

impl ProcNeighborTable {
    pub fn new() -> Self {
        Self {
            path: PathBuf::from(NEIGHBOR_TABLE_PATH),
        }
    }

    /// Read from an alternate location (tests, containers)
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for ProcNeighborTable {
    fn default() -> Self {
        Self::new()
    }
}

impl NeighborTableSource for ProcNeighborTable {
    fn read_table(&self) -> Result<String, SourceError> {
        let path = self.path.display().to_string();
        std::fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            ErrorKind::PermissionDenied => SourceError::PermissionDenied { path },
            ErrorKind::NotFound => SourceError::NotFound { path },
            _ => SourceError::Io {
                path,
                message: e.to_string(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_reads_table_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "IP address       HW type     Flags       HW address            Mask     Device").unwrap();
        writeln!(file, "192.168.1.1      0x1         0x2         aa:bb:cc:dd:ee:ff     *        wlan0").unwrap();

        let source = ProcNeighborTable::with_path(file.path());
        let text = source.read_table().unwrap();
        assert!(text.contains("aa:bb:cc:dd:ee:ff"));
    }

    #[test]
    fn test_missing_table_is_not_found() {
        let source = ProcNeighborTable::with_path("/nonexistent/neighbor/table");
        match source.read_table() {
            Err(SourceError::NotFound { .. }) => {}
            other => panic!("expected NotFound, got {:?}", other.map(|_| ())),
        }
    }
}
