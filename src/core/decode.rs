//! Incremental UTF-8 decoding
//!
//! PTY reads arrive in arbitrary chunks, so a multi-byte character can be
//! split across two reads. `Utf8Decoder` carries the incomplete tail of one
//! chunk over to the next and only ever yields whole characters.

/// Longest possible UTF-8 sequence.
const MAX_SEQ: usize = 4;

/// Stateful byte → char decoder.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `bytes`, calling `emit` once per complete character.
    ///
    /// Invalid sequences are replaced with U+FFFD. An incomplete sequence at
    /// the end of `bytes` is held back until the next call.
    pub fn feed<F: FnMut(char)>(&mut self, bytes: &[u8], mut emit: F) {
        self.pending.extend_from_slice(bytes);

        let mut start = 0;
        while start < self.pending.len() {
            match std::str::from_utf8(&self.pending[start..]) {
                Ok(s) => {
                    s.chars().for_each(&mut emit);
                    start = self.pending.len();
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    if let Ok(s) = std::str::from_utf8(&self.pending[start..start + valid]) {
                        s.chars().for_each(&mut emit);
                    }
                    start += valid;

                    match e.error_len() {
                        Some(bad) => {
                            emit(char::REPLACEMENT_CHARACTER);
                            start += bad;
                        }
                        // Incomplete sequence at the end: wait for more bytes
                        None => break,
                    }
                }
            }
        }

        self.pending.drain(..start);
        debug_assert!(self.pending.len() < MAX_SEQ);
    }

    /// Flush a dangling partial sequence (stream ended mid-character).
    pub fn finish<F: FnMut(char)>(&mut self, mut emit: F) {
        if !self.pending.is_empty() {
            self.pending.clear();
            emit(char::REPLACEMENT_CHARACTER);
        }
    }
}
