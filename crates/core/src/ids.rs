//! Comma-separated message/chat id lists
//!
//! Id lists travel as plain strings: in environment variables, in the
//! web-app URL query and in the payload the web app sends back.

use std::num::IntErrorKind;
use thiserror::Error;

/// Error raised when an id list contains a value that cannot be represented
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdListError {
    /// Entry is numeric but does not fit into an `i64`
    #[error("id out of range: {0}")]
    OutOfRange(String),
}

/// Parse a comma-separated list of ids
///
/// Empty entries, zero and non-numeric entries are skipped, so `""`, `","`
/// and `"not an id"` all yield an empty list. Only numbers too large for
/// an `i64` are reported as errors.
pub fn parse_id_list(input: &str) -> Result<Vec<i64>, IdListError> {
    let mut ids = Vec::new();

    for raw in input.split(',') {
        let raw = raw.trim();
        match raw.parse::<i64>() {
            Ok(0) => continue,
            Ok(id) => ids.push(id),
            Err(e) => match e.kind() {
                IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                    return Err(IdListError::OutOfRange(raw.to_string()));
                }
                _ => continue,
            },
        }
    }

    Ok(ids)
}

/// Join ids back into the comma-separated wire form
pub fn join_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_garbage() {
        assert_eq!(parse_id_list("this is not int").unwrap(), Vec::<i64>::new());
        assert_eq!(parse_id_list(",").unwrap(), Vec::<i64>::new());
        assert_eq!(parse_id_list("").unwrap(), Vec::<i64>::new());
        assert_eq!(parse_id_list("0,7").unwrap(), vec![7]);
    }

    #[test]
    fn test_parse_ids() {
        assert_eq!(parse_id_list("123,456").unwrap(), vec![123, 456]);
        assert_eq!(parse_id_list(" 1 , -2 ").unwrap(), vec![1, -2]);
    }

    #[test]
    fn test_parse_overflow_is_error() {
        let err = parse_id_list("1,99999999999999999999").unwrap_err();
        assert_eq!(err, IdListError::OutOfRange("99999999999999999999".to_string()));
    }

    #[test]
    fn test_join_ids() {
        assert_eq!(join_ids(&[1234, 1235, 1236]), "1234,1235,1236");
        assert_eq!(join_ids(&[]), "");
    }
}
