use std::fmt;

/// The `BeginString` (8) values this codec recognizes.
///
/// Comparison against the wire bytes happens in `fixcore::cursor`, which
/// packs values up to 7 bytes into a little-endian `u64` for a single
/// branchless compare; `Version` itself is just the decoded
/// result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Version {
    Fix42,
    Fix43,
    Fix44,
    Fixt11,
}

impl Version {
    pub const fn as_str(self) -> &'static str {
        match self {
            Version::Fix42 => "FIX.4.2",
            Version::Fix43 => "FIX.4.3",
            Version::Fix44 => "FIX.4.4",
            Version::Fixt11 => "FIXT.1.1",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "FIX.4.2" => Some(Version::Fix42),
            "FIX.4.3" => Some(Version::Fix43),
            "FIX.4.4" => Some(Version::Fix44),
            "FIXT.1.1" => Some(Version::Fixt11),
            _ => None,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
