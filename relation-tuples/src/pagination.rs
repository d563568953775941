//! Pagination options handed to the storage collaborator
//!
//! Page tokens are opaque: they are forwarded verbatim and never decoded here.
//! Page sizes are forwarded as-is; bounding them is the collaborator's concern.

use std::num::IntErrorKind;

use crate::error::{RelationTupleError, Result};

/// Page size used on the HTTP path when the caller does not provide one
pub const DEFAULT_PAGE_SIZE: i64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaginationOption {
    /// Continuation cursor from a previous response
    Token(String),
    /// Upper bound on tuples per page
    Size(i64),
}

pub fn with_token(token: impl Into<String>) -> PaginationOption {
    PaginationOption::Token(token.into())
}

pub fn with_size(size: i64) -> PaginationOption {
    PaginationOption::Size(size)
}

/// Resolved view over an option list; later options override earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationOptions {
    pub token: Option<String>,
    pub size: Option<i64>,
}

impl PaginationOptions {
    pub fn from_options(options: &[PaginationOption]) -> Self {
        options.iter().fold(Self::default(), |mut resolved, option| {
            match option {
                PaginationOption::Token(token) => resolved.token = Some(token.clone()),
                PaginationOption::Size(size) => resolved.size = Some(*size),
            }
            resolved
        })
    }

    /// Token to resume from; an empty token means the first page.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|token| !token.is_empty())
    }
}

/// Options for the form/query-string path.
///
/// Empty inputs count as absent. A missing page size is replaced by
/// `default_size`.
///
/// # Errors
///
/// Returns [`RelationTupleError::InvalidPageSize`] when `page_size` is not an
/// integer literal.
pub fn from_url_params(
    page_token: Option<&str>,
    page_size: Option<&str>,
    default_size: i64,
) -> Result<Vec<PaginationOption>> {
    let mut options = Vec::with_capacity(2);

    if let Some(token) = page_token.filter(|token| !token.is_empty()) {
        options.push(with_token(token));
    }

    match page_size.filter(|size| !size.is_empty()) {
        Some(size) => options.push(with_size(parse_go_int(size)?)),
        None => options.push(with_size(default_size)),
    }

    Ok(options)
}

/// Options for the protocol-message path.
///
/// Both fields are forwarded unconditionally; a zero page size tells the
/// collaborator the caller has no preference.
pub fn from_proto(page_size: i32, page_token: &str) -> Vec<PaginationOption> {
    vec![with_size(i64::from(page_size)), with_token(page_token)]
}

/// Parses an integer literal the way Go's `strconv.ParseInt(s, 0, 64)` does:
/// optional sign, `0x`/`0o`/`0b` prefixes, legacy leading-zero octal, and
/// underscores between digits.
///
/// # Errors
///
/// Returns [`RelationTupleError::InvalidPageSize`] on malformed input or when
/// the value does not fit in an `i64`.
pub fn parse_go_int(input: &str) -> Result<i64> {
    let invalid = |reason: &str| RelationTupleError::InvalidPageSize {
        value: input.to_string(),
        reason: reason.to_string(),
    };

    let (negative, unsigned) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input.strip_prefix('+').unwrap_or(input)),
    };

    let (radix, digits) = split_base_prefix(unsigned);
    if !underscores_ok(digits, radix != 10) {
        return Err(invalid("invalid syntax"));
    }

    let cleaned: String = digits.chars().filter(|c| *c != '_').collect();
    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(invalid("invalid syntax"));
    }

    let magnitude = u64::from_str_radix(&cleaned, radix).map_err(|err| match err.kind() {
        IntErrorKind::PosOverflow => invalid("value out of range"),
        _ => invalid("invalid syntax"),
    })?;

    let value = if negative {
        0_i64.checked_sub_unsigned(magnitude)
    } else {
        i64::try_from(magnitude).ok()
    };

    value.ok_or_else(|| invalid("value out of range"))
}

fn split_base_prefix(s: &str) -> (u32, &str) {
    let Some(rest) = s.strip_prefix('0') else {
        return (10, s);
    };

    let radix = match rest.chars().next() {
        Some('x' | 'X') => Some(16),
        Some('o' | 'O') => Some(8),
        Some('b' | 'B') => Some(2),
        _ => None,
    };

    if let Some(radix) = radix {
        if let Some(digits) = rest.get(1..).filter(|digits| !digits.is_empty()) {
            return (radix, digits);
        }
    }

    if rest.is_empty() {
        (10, s)
    } else {
        (8, rest)
    }
}

/// Underscores must separate digits: never doubled or trailing, and only
/// leading when a base prefix precedes them.
fn underscores_ok(digits: &str, prefixed: bool) -> bool {
    let mut after_digit = prefixed;
    let mut last_underscore = false;

    for c in digits.chars() {
        if c == '_' {
            if !after_digit {
                return false;
            }
            after_digit = false;
            last_underscore = true;
        } else {
            after_digit = true;
            last_underscore = false;
        }
    }

    !last_underscore
}
