//! Incremental decoding of streamed reply bodies.
//!
//! Bytes arrive in arbitrary chunks. [`ChunkDecoder`] turns them into text
//! fragments with the `data:` framing removed, [`ReplyStream`] exposes those
//! fragments lazily, and [`ReplyAccumulator`] assembles the final reply text.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::{self, BoxStream, Stream, StreamExt};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::QueryError;

/// Framing marker the service prefixes to every streamed piece of text.
pub const DATA_PREFIX: &str = "data:";

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").unwrap());

/// Collapse runs of two or more whitespace characters into one space and trim.
pub fn normalize_reply(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, " ").trim().to_string()
}

/// Stateful UTF-8 decoder.
///
/// A multi-byte sequence cut by a chunk boundary is held until the rest of it
/// arrives. Invalid sequences become U+FFFD.
#[derive(Debug, Default, Clone)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one chunk, keeping an incomplete trailing sequence for later.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let mut bytes = std::mem::take(&mut self.pending);
        bytes.extend_from_slice(chunk);

        let mut out = String::with_capacity(bytes.len());
        let mut rest = bytes.as_slice();
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    break;
                }
                Err(err) => {
                    let (valid, after) = rest.split_at(err.valid_up_to());
                    // valid_up_to marks a boundary, so this cannot fail
                    out.push_str(std::str::from_utf8(valid).unwrap_or_default());
                    match err.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                        None => {
                            self.pending = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// Flush whatever is still pending. An unfinished sequence becomes U+FFFD.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            String::new()
        } else {
            self.pending.clear();
            char::REPLACEMENT_CHARACTER.to_string()
        }
    }
}

/// Turns raw body chunks into text fragments with `data:` framing removed.
#[derive(Debug, Default, Clone)]
pub struct ChunkDecoder {
    utf8: Utf8Decoder,
    /// Tail of the previous chunk that might be the start of `data:`
    carry: String,
}

impl ChunkDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let mut text = std::mem::take(&mut self.carry);
        text.push_str(&self.utf8.decode(chunk));

        let hold = partial_prefix_len(&text);
        self.carry = text.split_off(text.len() - hold);
        strip_framing(&text)
    }

    pub fn finish(&mut self) -> String {
        let mut text = std::mem::take(&mut self.carry);
        text.push_str(&self.utf8.finish());
        strip_framing(&text)
    }
}

fn strip_framing(text: &str) -> String {
    text.replace(DATA_PREFIX, "")
}

/// Length of the longest suffix of `text` that is a proper prefix of `data:`.
fn partial_prefix_len(text: &str) -> usize {
    (1..DATA_PREFIX.len())
        .rev()
        .find(|&len| text.ends_with(&DATA_PREFIX[..len]))
        .unwrap_or(0)
}

/// Accumulates fragments into the final reply text.
#[derive(Debug, Default, Clone)]
pub struct ReplyAccumulator {
    text_buffer: String,
    fragments: usize,
}

impl ReplyAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, fragment: &str) {
        if !fragment.is_empty() {
            self.fragments += 1;
        }
        self.text_buffer.push_str(fragment);
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments
    }

    /// Normalized reply text.
    pub fn finish(self) -> String {
        normalize_reply(&self.text_buffer)
    }
}

/// Lazy, finite, non-restartable sequence of decoded reply fragments.
pub struct ReplyStream {
    inner: BoxStream<'static, Result<String, QueryError>>,
}

impl ReplyStream {
    /// Wrap a stream of raw body chunks.
    ///
    /// The stream ends after the body is exhausted or after the first error.
    pub fn from_chunks<S, B, E>(chunks: S) -> Self
    where
        S: Stream<Item = Result<B, E>> + Send + 'static,
        B: AsRef<[u8]> + Send + 'static,
        E: Into<QueryError> + 'static,
    {
        let body = chunks.map(|chunk| chunk.map_err(Into::into)).boxed();

        let inner = stream::unfold(Some((body, ChunkDecoder::new())), |state| async move {
            let (mut body, mut decoder) = state?;
            loop {
                match body.next().await {
                    Some(Ok(chunk)) => {
                        let text = decoder.decode(chunk.as_ref());
                        if !text.is_empty() {
                            return Some((Ok(text), Some((body, decoder))));
                        }
                    }
                    Some(Err(err)) => return Some((Err(err), None)),
                    None => {
                        let rest = decoder.finish();
                        return if rest.is_empty() {
                            None
                        } else {
                            Some((Ok(rest), None))
                        };
                    }
                }
            }
        })
        .boxed();

        Self { inner }
    }

    /// Drain the stream, calling `on_fragment` for each piece, and return the
    /// normalized reply.
    pub async fn collect_reply<F>(mut self, mut on_fragment: F) -> Result<String, QueryError>
    where
        F: FnMut(&str),
    {
        let mut accumulator = ReplyAccumulator::new();
        while let Some(fragment) = self.next().await {
            let fragment = fragment?;
            on_fragment(&fragment);
            accumulator.push(&fragment);
        }
        log::debug!("reply assembled from {} fragments", accumulator.fragment_count());
        Ok(accumulator.finish())
    }
}

impl Stream for ReplyStream {
    type Item = Result<String, QueryError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}
