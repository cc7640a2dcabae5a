//! Decodes the out-of-band seek command `AESDCHAR_IOCSEEKTO:X,Y\n` that repositions a
//! connection's read cursor instead of being appended to the log.

use once_cell::sync::Lazy;
use regex::bytes::Regex;

static SEEK_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^AESDCHAR_IOCSEEKTO:([0-9]+),([0-9]+)\n$").expect("valid regex"));

/// A decoded seek command: reposition the cursor to byte `write_cmd_offset` within the
/// committed entry at logical index `write_cmd`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeekCommand {
    pub write_cmd: u64,
    pub write_cmd_offset: u64,
}

/// Attempts to decode `chunk` as a seek command. The decoder operates on a single chunk as
/// received over the wire; it never reassembles a command across multiple reads. A chunk
/// that is shorter than the framing header, missing its trailing newline, or that fails to
/// parse as two decimal integers is simply not a control command (`None`) — callers treat
/// it as an ordinary byte chunk to append to the log.
pub fn decode(chunk: &[u8]) -> Option<SeekCommand> {
    let captures = SEEK_PATTERN.captures(chunk)?;
    let write_cmd = parse_u64(&captures[1])?;
    let write_cmd_offset = parse_u64(&captures[2])?;
    Some(SeekCommand {
        write_cmd,
        write_cmd_offset,
    })
}

fn parse_u64(bytes: &[u8]) -> Option<u64> {
    std::str::from_utf8(bytes).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_well_formed_command() {
        let cmd = decode(b"AESDCHAR_IOCSEEKTO:2,1\n").unwrap();
        assert_eq!(cmd.write_cmd, 2);
        assert_eq!(cmd.write_cmd_offset, 1);
    }

    #[test]
    fn rejects_missing_trailing_newline() {
        assert!(decode(b"AESDCHAR_IOCSEEKTO:2,1").is_none());
    }

    #[test]
    fn rejects_missing_comma() {
        assert!(decode(b"AESDCHAR_IOCSEEKTO:21\n").is_none());
    }

    #[test]
    fn rejects_non_numeric_fields() {
        assert!(decode(b"AESDCHAR_IOCSEEKTO:a,b\n").is_none());
    }

    #[test]
    fn treats_partial_header_as_ordinary_chunk() {
        assert!(decode(b"AESDCHAR_IOC").is_none());
    }

    #[test]
    fn rejects_trailing_garbage_after_newline() {
        assert!(decode(b"AESDCHAR_IOCSEEKTO:2,1\nextra").is_none());
    }

    #[test]
    fn ordinary_data_is_not_a_command() {
        assert!(decode(b"hello\n").is_none());
    }
}
