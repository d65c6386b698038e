//! Post-processing of generated text streams.
//!
//! Reasoning models emit their chain of thought inline as
//! `<think>...</think>` spans. The filter here removes those spans from a
//! chunked stream, even when a tag is split across chunk boundaries, so
//! clients only ever see the final answer.

use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};

use wavesearch_core::{Result, TextStream};

const OPEN_TAG: &str = "<think>";
const CLOSE_TAG: &str = "</think>";

/// Stateful filter that strips `<think>...</think>` spans from text chunks.
///
/// Chunks are fed in order with [`push`](Self::push); text that cannot yet
/// be classified (a possible partial tag at a chunk boundary) is held back
/// until the next chunk or [`finish`](Self::finish) resolves it.
#[derive(Debug, Default)]
pub struct ThinkingContentFilter {
    in_thinking: bool,
    carry: String,
}

impl ThinkingContentFilter {
    /// Create a filter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next chunk, returning the text safe to emit.
    pub fn push(&mut self, chunk: &str) -> String {
        self.carry.push_str(chunk);
        let mut output = String::new();

        loop {
            if self.in_thinking {
                if let Some(pos) = self.carry.find(CLOSE_TAG) {
                    self.carry.drain(..pos + CLOSE_TAG.len());
                    self.in_thinking = false;
                } else {
                    let keep = Self::partial_tag_suffix(&self.carry, CLOSE_TAG);
                    let drop_to = self.carry.len() - keep;
                    self.carry.drain(..drop_to);
                    break;
                }
            } else if let Some(pos) = self.carry.find(OPEN_TAG) {
                output.push_str(&self.carry[..pos]);
                self.carry.drain(..pos + OPEN_TAG.len());
                self.in_thinking = true;
            } else {
                let keep = Self::partial_tag_suffix(&self.carry, OPEN_TAG);
                let emit_to = self.carry.len() - keep;
                output.push_str(&self.carry[..emit_to]);
                self.carry.drain(..emit_to);
                break;
            }
        }

        output
    }

    /// Flush held-back text once the stream has ended.
    ///
    /// An unterminated thinking span is dropped entirely; a held-back
    /// partial tag that never completed turns out to be ordinary text.
    pub fn finish(&mut self) -> String {
        if self.in_thinking {
            self.carry.clear();
            String::new()
        } else {
            std::mem::take(&mut self.carry)
        }
    }

    /// Length of the longest strict tag prefix that `text` ends with.
    ///
    /// Tags are ASCII, so the returned length always lands on a char
    /// boundary of `text`.
    fn partial_tag_suffix(text: &str, tag: &str) -> usize {
        (1..tag.len())
            .rev()
            .find(|&len| text.ends_with(&tag[..len]))
            .unwrap_or(0)
    }

    /// Wrap a text stream so thinking spans never reach the consumer.
    pub fn filter_stream(stream: TextStream) -> TextStream {
        Box::pin(FilteredTextStream {
            inner: stream,
            filter: Self::new(),
            done: false,
        })
    }
}

struct FilteredTextStream {
    inner: TextStream,
    filter: ThinkingContentFilter,
    done: bool,
}

impl Stream for FilteredTextStream {
    type Item = Result<String>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if self.done {
                return Poll::Ready(None);
            }

            match self.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(chunk))) => {
                    let output = self.filter.push(&chunk);
                    // Fully-filtered chunks yield nothing; poll on rather
                    // than emitting empty strings.
                    if !output.is_empty() {
                        return Poll::Ready(Some(Ok(output)));
                    }
                }
                Poll::Ready(Some(Err(e))) => return Poll::Ready(Some(Err(e))),
                Poll::Ready(None) => {
                    self.done = true;
                    let output = self.filter.finish();
                    if !output.is_empty() {
                        return Poll::Ready(Some(Ok(output)));
                    }
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
