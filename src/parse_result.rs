use crate::seq::Seq;

/*========================================*/
/*          Parse Result                  */
/*========================================*/

/// The two ways a parse can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The input didn't match, but some other alternative might.
    Expected,
    /// The input can't match at all here, e.g. it ended where a token was required.
    Unexpected,
}

/// The outcome of running a parser. Every variant carries the input left over for whoever
/// parses next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseResult<T, U> {
    /// The parse succeeded with `value`. `next` is the input after what was consumed.
    Success { value: U, next: Seq<T> },
    /// A specific alternative didn't match. Recoverable: an enclosing `or` tries the next one.
    ExpectedFailure { message: String, next: Seq<T> },
    /// A structural impossibility, principally running out of input.
    UnexpectedFailure { message: String, next: Seq<T> },
}

impl<T, U> ParseResult<T, U> {
    /// The remaining input.
    pub fn next(&self) -> &Seq<T> {
        match self {
            ParseResult::Success { next, .. }
            | ParseResult::ExpectedFailure { next, .. }
            | ParseResult::UnexpectedFailure { next, .. } => next,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ParseResult::Success { .. })
    }

    pub fn value(&self) -> Option<&U> {
        match self {
            ParseResult::Success { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<U> {
        match self {
            ParseResult::Success { value, .. } => Some(value),
            _ => None,
        }
    }

    /// The failure message, if this is a failure.
    pub fn message(&self) -> Option<&str> {
        match self {
            ParseResult::Success { .. } => None,
            ParseResult::ExpectedFailure { message, .. }
            | ParseResult::UnexpectedFailure { message, .. } => Some(message),
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            ParseResult::Success { .. } => None,
            ParseResult::ExpectedFailure { .. } => Some(FailureKind::Expected),
            ParseResult::UnexpectedFailure { .. } => Some(FailureKind::Unexpected),
        }
    }

    /// Transform the success value with `func`. Failures pass through untouched.
    pub fn map_value<V>(self, func: impl FnOnce(U) -> V) -> ParseResult<T, V> {
        match self {
            ParseResult::Success { value, next } => ParseResult::Success {
                value: func(value),
                next,
            },
            ParseResult::ExpectedFailure { message, next } => {
                ParseResult::ExpectedFailure { message, next }
            }
            ParseResult::UnexpectedFailure { message, next } => {
                ParseResult::UnexpectedFailure { message, next }
            }
        }
    }
}

#[test]
fn test_accessors() {
    let input = Seq::from("ab");
    let success: ParseResult<char, char> = ParseResult::Success {
        value: 'a',
        next: input.tail(),
    };
    assert!(success.is_success());
    assert_eq!(success.value(), Some(&'a'));
    assert_eq!(success.message(), None);
    assert_eq!(success.failure_kind(), None);
    assert_eq!(success.next(), &input.tail());
    assert_eq!(success.map_value(|c| c.to_ascii_uppercase()).into_value(), Some('A'));

    let failure: ParseResult<char, char> = ParseResult::UnexpectedFailure {
        message: "EOS".to_owned(),
        next: input.clone(),
    };
    assert!(!failure.is_success());
    assert_eq!(failure.message(), Some("EOS"));
    assert_eq!(failure.failure_kind(), Some(FailureKind::Unexpected));
    let failure = failure.map_value(|c| c as u32);
    assert_eq!(failure.next(), &input);
    assert_eq!(failure.into_value(), None);
}
