//! Caller-supplied validation flags and wire-format configuration,
//! shared by the `Decoder` and `Encoder` via `config_mut()`.

use crate::cursor::SOH;

/// Tunables shared by the parser and serializer.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// The inter-field delimiter. `0x01` (SOH) on the wire; test
    /// harnesses commonly use `|`.
    pub separator: u8,
    /// Verify the `CheckSum` (10) trailer against a computed checksum.
    pub validate_checksum: bool,
    /// Verify the `BodyLength` (9) header against the measured body.
    pub validate_length: bool,
    /// Reject unknown tags instead of capturing them in `unparsed`.
    pub strict_mode: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            separator: SOH,
            validate_checksum: true,
            validate_length: true,
            strict_mode: false,
        }
    }
}

impl Config {
    pub fn with_separator(mut self, separator: u8) -> Self {
        self.separator = separator;
        self
    }

    pub fn strict(mut self) -> Self {
        self.strict_mode = true;
        self
    }

    pub fn without_validation(mut self) -> Self {
        self.validate_checksum = false;
        self.validate_length = false;
        self
    }
}
