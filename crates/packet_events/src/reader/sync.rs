use std::io::{BufRead, BufReader, ErrorKind, Read};

const CHUNK_SIZE_BYTES: usize = 8192;

#[derive(Debug, Eq, PartialEq)]
pub enum BoundedLine {
    Line {
        line_number: usize,
        bytes: Vec<u8>,
    },
    LineTooLong {
        line_number: usize,
        observed_bytes: usize,
        max_line_bytes: usize,
    },
    IoError {
        line_number: usize,
    },
}

/// Splits a byte stream on `\n` while holding at most `max_line_bytes` of any one line.
///
/// Bytes of an oversized line are consumed and dropped; the line is still counted so
/// line numbers stay aligned with the input. The first read error ends iteration.
pub struct SyncBoundedLineReader<R: Read> {
    reader: BufReader<R>,
    max_line_bytes: usize,
    line_number: usize,
    done: bool,
}

impl<R: Read> SyncBoundedLineReader<R> {
    pub fn new(reader: R, max_line_bytes: usize) -> Self {
        Self {
            reader: BufReader::with_capacity(CHUNK_SIZE_BYTES, reader),
            max_line_bytes,
            line_number: 0,
            done: false,
        }
    }

    fn next_line_number(&mut self) -> usize {
        self.line_number += 1;
        self.line_number
    }
}

impl<R: Read> Iterator for SyncBoundedLineReader<R> {
    type Item = BoundedLine;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut bytes = Vec::new();
        let mut observed_bytes = 0usize;
        let mut too_long = false;
        let mut saw_bytes = false;

        loop {
            let available = match self.reader.fill_buf() {
                Ok(available) => available,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(_) => {
                    self.done = true;
                    self.line_number += 1;
                    return Some(BoundedLine::IoError {
                        line_number: self.line_number,
                    });
                }
            };
            if available.is_empty() {
                self.done = true;
                if !saw_bytes {
                    return None;
                }
                break;
            }
            saw_bytes = true;

            let newline = available.iter().position(|b| *b == b'\n');
            let segment_len = newline.unwrap_or(available.len());
            observed_bytes = observed_bytes.saturating_add(segment_len);
            if !too_long && observed_bytes > self.max_line_bytes {
                too_long = true;
                bytes = Vec::new();
            }
            if !too_long {
                bytes.extend_from_slice(&available[..segment_len]);
            }

            let consumed = segment_len + usize::from(newline.is_some());
            self.reader.consume(consumed);
            if newline.is_some() {
                break;
            }
        }

        let line_number = self.next_line_number();
        Some(if too_long {
            BoundedLine::LineTooLong {
                line_number,
                observed_bytes,
                max_line_bytes: self.max_line_bytes,
            }
        } else {
            BoundedLine::Line { line_number, bytes }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn oversized_line_is_discarded_and_iteration_continues() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"ok\n");
        bytes.extend_from_slice(&[b'a'; 50]);
        bytes.extend_from_slice(b"\nnext\n");

        let reader = SyncBoundedLineReader::new(io::Cursor::new(bytes), 16);
        let lines: Vec<_> = reader.collect();

        assert_eq!(
            lines,
            vec![
                BoundedLine::Line {
                    line_number: 1,
                    bytes: b"ok".to_vec()
                },
                BoundedLine::LineTooLong {
                    line_number: 2,
                    observed_bytes: 50,
                    max_line_bytes: 16
                },
                BoundedLine::Line {
                    line_number: 3,
                    bytes: b"next".to_vec()
                },
            ]
        );
    }

    #[test]
    fn final_line_without_newline_is_returned() {
        let reader = SyncBoundedLineReader::new(io::Cursor::new(b"a\n\nb".to_vec()), 16);
        let lines: Vec<_> = reader.collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[2],
            BoundedLine::Line {
                line_number: 3,
                bytes: b"b".to_vec()
            }
        );
    }

    #[test]
    fn line_spanning_many_chunks_is_reassembled() {
        let mut bytes = vec![b'x'; CHUNK_SIZE_BYTES * 2 + 10];
        bytes.push(b'\n');
        let reader = SyncBoundedLineReader::new(io::Cursor::new(bytes), CHUNK_SIZE_BYTES * 4);
        let lines: Vec<_> = reader.collect();
        let [BoundedLine::Line { bytes, .. }] = lines.as_slice() else {
            panic!("expected one line, got {lines:?}");
        };
        assert_eq!(bytes.len(), CHUNK_SIZE_BYTES * 2 + 10);
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
        }
    }

    #[test]
    fn read_error_is_reported_once() {
        let mut reader = SyncBoundedLineReader::new(FailingReader, 16);
        assert_eq!(reader.next(), Some(BoundedLine::IoError { line_number: 1 }));
        assert_eq!(reader.next(), None);
    }
}
