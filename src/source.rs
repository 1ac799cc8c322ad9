//! Single-pass token sources that a [`Seq`](crate::Seq) is built from.

use std::cell::RefCell;
use std::fmt;
use std::io::{self, BufReader, Bytes, Read};
use std::iter::Peekable;
use std::rc::Rc;

/// Something that hands out tokens one at a time, and can't go back.
///
/// A [`Seq`](crate::Seq) calls `pull` at most once per position, and never again after it has
/// returned `None`.
pub trait Source<T> {
    fn pull(&mut self) -> Option<T>;
}

impl<T, I: Iterator<Item = T>> Source<T> for I {
    fn pull(&mut self) -> Option<T> {
        self.next()
    }
}

/*========================================*/
/*          CharReader                    */
/*========================================*/

/// Decodes the bytes of a reader as UTF-8 characters, one character per pull.
///
/// Reads are buffered, so pulling a character doesn't cost a read call. Malformed input
/// decodes to `U+FFFD`. An I/O error ends the input, and is kept in the reader's
/// [`ReadStatus`] so that a cut-off stream isn't mistaken for a complete one.
pub struct CharReader<R: Read> {
    bytes: Peekable<Bytes<BufReader<R>>>,
    status: ReadStatus,
}

impl<R: Read> CharReader<R> {
    pub fn new(reader: R) -> CharReader<R> {
        CharReader {
            bytes: BufReader::new(reader).bytes().peekable(),
            status: ReadStatus::default(),
        }
    }

    /// A handle on this reader's I/O error, if it runs into one. Stays valid after the
    /// reader has been handed off to a [`Seq`](crate::Seq).
    pub fn status(&self) -> ReadStatus {
        self.status.clone()
    }

    fn next_byte(&mut self) -> Option<u8> {
        match self.bytes.next() {
            Some(Ok(byte)) => Some(byte),
            Some(Err(err)) => {
                self.status.record(err);
                None
            }
            None => None,
        }
    }

    /// Consume the next byte only if it continues a multi-byte character.
    fn next_continuation(&mut self) -> Option<u8> {
        match self.bytes.peek() {
            Some(Ok(byte)) if (*byte & 0xC0) == 0x80 => self.next_byte(),
            _ => None,
        }
    }
}

impl<R: Read> Iterator for CharReader<R> {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        let first = self.next_byte()?;
        let width = match first {
            0x00..=0x7F => return Some(first as char),
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => return Some(char::REPLACEMENT_CHARACTER),
        };
        let mut buf = [first, 0, 0, 0];
        for slot in buf.iter_mut().take(width).skip(1) {
            match self.next_continuation() {
                Some(byte) => *slot = byte,
                None => return Some(char::REPLACEMENT_CHARACTER),
            }
        }
        let decoded = std::str::from_utf8(&buf[..width])
            .ok()
            .and_then(|s| s.chars().next());
        Some(decoded.unwrap_or(char::REPLACEMENT_CHARACTER))
    }
}

/*========================================*/
/*          ReadStatus                    */
/*========================================*/

/// Where a [`CharReader`] leaves the I/O error that ended its input early.
///
/// Check it once parsing is done: a parse that "succeeded" on input that was cut short by
/// an error only saw part of the input.
#[derive(Clone, Default)]
pub struct ReadStatus(Rc<RefCell<Option<io::Error>>>);

impl ReadStatus {
    /// Keeps only the first error; nothing is read after it anyway.
    fn record(&self, err: io::Error) {
        let mut slot = self.0.borrow_mut();
        if slot.is_none() {
            *slot = Some(err);
        }
    }

    pub fn is_ok(&self) -> bool {
        self.0.borrow().is_none()
    }

    /// Take the error the reader ran into, if any.
    pub fn take_error(&self) -> Option<io::Error> {
        self.0.borrow_mut().take()
    }
}

impl fmt::Debug for ReadStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &*self.0.borrow() {
            Some(err) => write!(f, "ReadStatus(Err({}))", err),
            None => write!(f, "ReadStatus(Ok)"),
        }
    }
}

#[test]
fn test_char_reader() {
    let reader = CharReader::new("a\r\nλ".as_bytes());
    assert_eq!(reader.collect::<Vec<_>>(), vec!['a', '\r', '\n', 'λ']);

    // Truncated three-byte character at the end of input.
    let reader = CharReader::new(&[b'x', 0xE2, 0x82][..]);
    assert_eq!(reader.collect::<String>(), "x\u{FFFD}");
}

#[cfg(test)]
pub(crate) struct FailingReader {
    pub(crate) data: Vec<u8>,
}

#[cfg(test)]
impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.data.is_empty() {
            return Err(io::Error::new(io::ErrorKind::Other, "disk gone"));
        }
        let len = self.data.len().min(buf.len());
        buf[..len].copy_from_slice(&self.data[..len]);
        self.data.drain(..len);
        Ok(len)
    }
}

#[test]
fn test_char_reader_keeps_read_error() {
    let reader = CharReader::new(FailingReader {
        data: b"ok".to_vec(),
    });
    let status = reader.status();
    assert!(status.is_ok());
    assert_eq!(reader.collect::<String>(), "ok");
    assert!(!status.is_ok());
    assert_eq!(
        status.take_error().map(|err| err.to_string()),
        Some("disk gone".to_owned())
    );

    let reader = CharReader::new("fine".as_bytes());
    let status = reader.status();
    assert_eq!(reader.count(), 4);
    assert!(status.is_ok());
    assert!(status.take_error().is_none());
}
