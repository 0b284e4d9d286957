//! crates/ea_core/src/ids.rs
//! Roster identifiers and canonical output IDs.
//! Roster ids are free text (non-empty, no control characters, bounded
//! length); output ids keep strict ASCII shapes. No I/O.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Errors returned when validating or parsing IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdError {
    Empty,
    NonAscii,
    TooLong,
    ControlChar,
    BadShape,
}

impl fmt::Display for IdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdError::Empty => write!(f, "identifier must not be empty"),
            IdError::NonAscii => write!(f, "identifier must be ASCII without NUL"),
            IdError::TooLong => write!(f, "identifier is too long"),
            IdError::ControlChar => write!(f, "identifier must not contain control characters"),
            IdError::BadShape => write!(f, "identifier has an invalid shape"),
        }
    }
}

impl std::error::Error for IdError {}

const HEX64_LEN: usize = 64;
/// Counted in chars, matching `maxLength` in the input schemas.
pub const TOKEN_MAX_CHARS: usize = 128;

#[inline]
fn is_ascii_no_nul(s: &str) -> bool {
    !s.as_bytes().iter().any(|&b| b == 0 || b > 0x7F)
}

/// Lowercase hex (length must be exactly 64).
#[inline]
pub fn is_valid_sha256(s: &str) -> bool {
    s.len() == HEX64_LEN
        && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Roster id: any non-empty text up to `TOKEN_MAX_CHARS` chars without
/// control characters (`21/CS/045`, `Computer Science`).
#[inline]
pub fn is_valid_token(s: &str) -> bool {
    check_token(s).is_ok()
}

fn check_token(s: &str) -> Result<(), IdError> {
    if s.is_empty() { return Err(IdError::Empty); }
    if s.chars().any(char::is_control) { return Err(IdError::ControlChar); }
    if s.chars().count() > TOKEN_MAX_CHARS { return Err(IdError::TooLong); }
    Ok(())
}

macro_rules! string_newtype {
    ($(#[$m:meta])* $name:ident, $check:path) => {
        $(#[$m])*
        #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            #[inline] pub fn as_str(&self) -> &str { &self.0 }
        }

        impl fmt::Display for $name {
            #[inline]
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
        }

        impl FromStr for $name {
            type Err = IdError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $check(s)?;
                Ok($name(s.to_owned()))
            }
        }

        impl TryFrom<&str> for $name {
            type Error = IdError;
            #[inline]
            fn try_from(value: &str) -> Result<Self, Self::Error> { value.parse() }
        }

        impl TryFrom<String> for $name {
            type Error = IdError;
            fn try_from(value: String) -> Result<Self, Self::Error> {
                $check(&value)?;
                Ok($name(value))
            }
        }

        impl From<$name> for String {
            #[inline]
            fn from(v: $name) -> String { v.0 }
        }

        impl AsRef<str> for $name {
            #[inline]
            fn as_ref(&self) -> &str { &self.0 }
        }
    }
}

// === Roster tokens ===

string_newtype!(
    /// Student roll number as issued by the registrar.
    RollNumber,
    check_token
);
string_newtype!(
    /// Department identifier (home or elective).
    DepartmentId,
    check_token
);

// === Prefixed output IDs: RES, RUN ===

fn check_res(s: &str) -> Result<(), IdError> {
    if !is_ascii_no_nul(s) { return Err(IdError::NonAscii); }
    match s.strip_prefix("RES:") {
        Some(hex) if is_valid_sha256(hex) => Ok(()),
        _ => Err(IdError::BadShape),
    }
}

/// Strict RFC3339 "YYYY-MM-DDTHH:MM:SSZ"
#[inline]
fn is_rfc3339_utc_20(ts: &str) -> bool {
    let b = ts.as_bytes();
    if b.len() != 20 { return false; }
    let digits = |r: core::ops::Range<usize>| b[r].iter().all(u8::is_ascii_digit);
    digits(0..4)
        && b[4] == b'-'
        && digits(5..7)
        && b[7] == b'-'
        && digits(8..10)
        && b[10] == b'T'
        && digits(11..13)
        && b[13] == b':'
        && digits(14..16)
        && b[16] == b':'
        && digits(17..19)
        && b[19] == b'Z'
}

fn check_run(s: &str) -> Result<(), IdError> {
    if !is_ascii_no_nul(s) { return Err(IdError::NonAscii); }
    // "RUN:" + ts(20) + "-" + hex64
    if s.len() != 4 + 20 + 1 + HEX64_LEN { return Err(IdError::BadShape); }
    let ok = s.starts_with("RUN:")
        && is_rfc3339_utc_20(&s[4..24])
        && &s[24..25] == "-"
        && is_valid_sha256(&s[25..]);
    if ok { Ok(()) } else { Err(IdError::BadShape) }
}

string_newtype!(
    /// "RES:" + 64-hex lowercase
    ResultId,
    check_res
);
string_newtype!(
    /// "RUN:" + <RFC3339 UTC 'YYYY-MM-DDTHH:MM:SSZ'> + "-" + 64-hex lowercase
    RunId,
    check_run
);

impl ResultId {
    #[inline] pub fn as_hex(&self) -> &str { &self.0[4..] }
}

impl RunId {
    /// Fast accessor to the embedded timestamp (RFC3339 UTC).
    #[inline]
    pub fn timestamp_utc(&self) -> &str { &self.0[4..24] }
}

// === Tests ===

#[cfg(test)]
mod tests {
    use super::*;

    const HEX: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    #[test]
    fn tokens() {
        for ok in ["cs", "EXISTING_STUDENT_1", "21/CS/045", "Computer Science", "Génie civil", "-"] {
            assert!(is_valid_token(ok), "{ok}");
            let _r: RollNumber = ok.parse().unwrap();
            let _d: DepartmentId = ok.parse().unwrap();
        }
        assert_eq!("".parse::<RollNumber>(), Err(IdError::Empty));
        assert_eq!("a\tb".parse::<DepartmentId>(), Err(IdError::ControlChar));
        assert_eq!("a\0".parse::<RollNumber>(), Err(IdError::ControlChar));
        assert!("é".repeat(TOKEN_MAX_CHARS).parse::<DepartmentId>().is_ok());
        assert_eq!("x".repeat(TOKEN_MAX_CHARS + 1).parse::<DepartmentId>(), Err(IdError::TooLong));
    }

    #[test]
    fn serde_accepts_free_text_ids() {
        let d: DepartmentId = serde_json::from_str("\"Computer Science\"").unwrap();
        assert_eq!(d.as_str(), "Computer Science");
        let r: RollNumber = serde_json::from_str("\"21/CS/045\"").unwrap();
        assert_eq!(serde_json::to_string(&r).unwrap(), "\"21/CS/045\"");
        assert!(serde_json::from_str::<DepartmentId>("\"\"").is_err());
        assert!(serde_json::from_str::<RollNumber>("\"line\\nbreak\"").is_err());
    }

    #[test]
    fn res_and_run() {
        let res: ResultId = format!("RES:{HEX}").parse().unwrap();
        assert_eq!(res.as_hex(), HEX);

        let run: RunId = format!("RUN:2025-08-12T14:00:00Z-{HEX}").parse().unwrap();
        assert_eq!(run.timestamp_utc(), "2025-08-12T14:00:00Z");

        assert!("RES:DEADBEEF".parse::<ResultId>().is_err());
        assert!(format!("RUN:2025-08-12 14:00:00Z-{HEX}").parse::<RunId>().is_err());
        assert!(format!("RUN:2025-08-12T14:00:00Z:{HEX}").parse::<RunId>().is_err());
    }
}
