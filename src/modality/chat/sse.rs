use crate::error::AppError;

/// Accumulates raw upstream bytes and hands out complete lines.
///
/// Bytes after the last `\n` stay buffered until the next push, so lines (and
/// multi-byte characters) split across network chunks are reassembled before
/// decoding. An unterminated line longer than `max_line` fails the buffer.
#[derive(Debug)]
pub struct LineBuffer {
    pending: Vec<u8>,
    max_line: usize,
}

impl LineBuffer {
    pub fn new(max_line: usize) -> Self {
        Self {
            pending: Vec::new(),
            max_line,
        }
    }

    /// Append a chunk and return every line it completed, without terminators.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<String>, AppError> {
        self.pending.extend_from_slice(chunk);

        let Some(last_newline) = self.pending.iter().rposition(|&b| b == b'\n') else {
            return self.check_pending().map(|_| Vec::new());
        };

        let rest = self.pending.split_off(last_newline + 1);
        let mut complete = std::mem::replace(&mut self.pending, rest);
        complete.pop();
        self.check_pending()?;

        complete.split(|&b| b == b'\n').map(decode_line).collect()
    }

    fn check_pending(&self) -> Result<(), AppError> {
        if self.pending.len() > self.max_line {
            return Err(AppError::Codec(format!(
                "Upstream line exceeds {} bytes",
                self.max_line
            )));
        }
        Ok(())
    }

    /// Drain whatever is left once the upstream has ended.
    pub fn finish(&mut self) -> Result<Option<String>, AppError> {
        if self.pending.is_empty() {
            return Ok(None);
        }
        let rest = std::mem::take(&mut self.pending);
        decode_line(&rest).map(Some)
    }
}

fn decode_line(line: &[u8]) -> Result<String, AppError> {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8(line.to_vec())
        .map_err(|e| AppError::Codec(format!("Invalid UTF-8 in upstream stream: {}", e)))
}

/// Payload of an SSE `data:` line, if this is one.
pub fn data_payload(line: &str) -> Option<&str> {
    line.strip_prefix("data: ")
        .or_else(|| line.strip_prefix("data:"))
        .map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_complete_lines() {
        let mut buf = LineBuffer::new(1024);
        let lines = buf.push(b"data: a\n\ndata: b\n").unwrap();
        assert_eq!(lines, vec!["data: a", "", "data: b"]);
        assert_eq!(buf.finish().unwrap(), None);
    }

    #[test]
    fn carries_partial_line_across_chunks() {
        let mut buf = LineBuffer::new(1024);
        assert!(buf.push(b"data: {\"candi").unwrap().is_empty());
        assert!(buf.push(b"dates\":[]}").unwrap().is_empty());
        let lines = buf.push(b"\r\ndata: next").unwrap();
        assert_eq!(lines, vec!["data: {\"candidates\":[]}"]);
        assert_eq!(buf.finish().unwrap().as_deref(), Some("data: next"));
        assert_eq!(buf.finish().unwrap(), None);
    }

    #[test]
    fn reassembles_split_multibyte_characters() {
        let text = "data: héllo ✓\n".as_bytes();
        // split inside the three-byte check mark
        let cut = text.len() - 3;
        let mut buf = LineBuffer::new(1024);
        assert!(buf.push(&text[..cut]).unwrap().is_empty());
        assert_eq!(buf.push(&text[cut..]).unwrap(), vec!["data: héllo ✓"]);
    }

    #[test]
    fn invalid_utf8_line_is_an_error() {
        let mut buf = LineBuffer::new(1024);
        assert!(matches!(
            buf.push(b"data: \xff\xfe\n"),
            Err(AppError::Codec(_))
        ));
    }

    #[test]
    fn oversized_partial_line_is_an_error() {
        let mut buf = LineBuffer::new(8);
        assert!(buf.push(b"data: ab").unwrap().is_empty());
        assert!(matches!(buf.push(b"cdef"), Err(AppError::Codec(_))));

        let mut buf = LineBuffer::new(8);
        assert!(matches!(
            buf.push(b"data: ok\ndata: too long"),
            Err(AppError::Codec(_))
        ));
    }

    #[test]
    fn data_payload_accepts_both_prefix_forms() {
        assert_eq!(data_payload("data: {}"), Some("{}"));
        assert_eq!(data_payload("data:{}"), Some("{}"));
        assert_eq!(data_payload("event: ping"), None);
        assert_eq!(data_payload(""), None);
    }
}
