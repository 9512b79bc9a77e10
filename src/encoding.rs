use std::str::FromStr;

use crate::error::SplitError;

pub(crate) const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Text encoding applied to both the input and every output file.
///
/// `Utf8Sig` is the BOM-carrying UTF-8 variant that spreadsheet tools expect:
/// a leading byte-order mark is stripped on read and written at the start of
/// each output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    Utf8Sig,
}

impl Encoding {
    pub(crate) fn strips_bom(self) -> bool {
        matches!(self, Encoding::Utf8Sig)
    }

    pub(crate) fn writes_bom(self) -> bool {
        matches!(self, Encoding::Utf8Sig)
    }
}

impl FromStr for Encoding {
    type Err = SplitError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Encoding::Utf8),
            "utf-8-sig" | "utf8-sig" => Ok(Encoding::Utf8Sig),
            other => Err(SplitError::Config(format!(
                "unsupported encoding \"{other}\" (expected utf-8 or utf-8-sig)"
            ))),
        }
    }
}
