//! Async adapters over the chunk-absorbing parser.
//!
//! The parser itself performs no I/O and knows nothing about runtimes; these
//! adapters connect it to the two async ecosystems the workspace supports:
//!
//! - **tokio** (`tokio` feature): [`tokio_impl::ChunkPump`] drains a channel
//!   of byte chunks into a parser and sends finished values onward.
//! - **futures** (`futures` feature): [`futures_impl::ValueStream`] adapts
//!   any `Stream` of chunks into a `Stream` of parsed values.
//!
//! Both serialize access to one parser instance; they add no sharing and no
//! internal concurrency.

use thiserror::Error;

use crate::error::ParseError;

/// Error type for async streaming operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// The downstream channel was closed before the input ended.
    #[error("channel closed unexpectedly")]
    ChannelClosed,
    /// The parser rejected the input.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[cfg(feature = "tokio")]
pub mod tokio_impl {
    //! Tokio-based pump: chunks in via mpsc, values out via mpsc.

    use ::tokio::sync::mpsc;

    use super::StreamError;
    use crate::stream::{ParseMode, StreamParser};
    use crate::traits::Build;

    /// Drives a [`StreamParser`] from a channel of byte chunks.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let (chunk_tx, chunk_rx) = mpsc::channel(32);
    /// let (value_tx, mut value_rx) = mpsc::channel(16);
    ///
    /// tokio::spawn(async move {
    ///     let parser = StreamParser::new(ParseMode::ValueStream, TreeBuilder);
    ///     ChunkPump::new(parser, chunk_rx, value_tx).run().await
    /// });
    ///
    /// while let Some(value) = value_rx.recv().await {
    ///     process(value);
    /// }
    /// ```
    pub struct ChunkPump<B: Build> {
        parser: StreamParser<B>,
        chunk_rx: mpsc::Receiver<Vec<u8>>,
        value_tx: mpsc::Sender<B::Value>,
    }

    impl<B: Build> ChunkPump<B> {
        pub fn new(
            parser: StreamParser<B>,
            chunk_rx: mpsc::Receiver<Vec<u8>>,
            value_tx: mpsc::Sender<B::Value>,
        ) -> Self {
            Self {
                parser,
                chunk_rx,
                value_tx,
            }
        }

        /// Convenience constructor building the parser internally.
        pub fn with_mode(
            mode: ParseMode,
            builder: B,
            chunk_rx: mpsc::Receiver<Vec<u8>>,
            value_tx: mpsc::Sender<B::Value>,
        ) -> Self {
            Self::new(StreamParser::new(mode, builder), chunk_rx, value_tx)
        }

        /// Absorb chunks until the channel closes, then finish the input.
        ///
        /// Values are sent as soon as their bytes have been seen. A parse
        /// error stops the pump immediately.
        pub async fn run(mut self) -> Result<(), StreamError> {
            loop {
                match self.chunk_rx.recv().await {
                    Some(chunk) => {
                        for value in self.parser.absorb(&chunk)? {
                            self.value_tx
                                .send(value)
                                .await
                                .map_err(|_| StreamError::ChannelClosed)?;
                        }
                    }
                    None => {
                        for value in self.parser.finish()? {
                            self.value_tx
                                .send(value)
                                .await
                                .map_err(|_| StreamError::ChannelClosed)?;
                        }
                        return Ok(());
                    }
                }
            }
        }
    }
}

#[cfg(feature = "futures")]
pub mod futures_impl {
    //! Runtime-agnostic stream adapter.

    use core::pin::Pin;
    use core::task::{Context, Poll};
    use std::collections::VecDeque;

    use futures_core::Stream;

    use crate::error::ParseError;
    use crate::stream::StreamParser;
    use crate::traits::Build;

    /// Adapts a `Stream` of byte chunks into a `Stream` of parsed values.
    ///
    /// Each polled chunk is absorbed; values completed by it are yielded one
    /// by one. When the inner stream ends the parser is finished and any
    /// remaining values (or the truncation error) are yielded last.
    pub struct ValueStream<S, B: Build> {
        inner: S,
        parser: Option<StreamParser<B>>,
        pending: VecDeque<B::Value>,
    }

    impl<S, B: Build> ValueStream<S, B> {
        pub fn new(inner: S, parser: StreamParser<B>) -> Self {
            Self {
                inner,
                parser: Some(parser),
                pending: VecDeque::new(),
            }
        }
    }

    impl<S, B, C> Stream for ValueStream<S, B>
    where
        S: Stream<Item = C> + Unpin,
        B: Build + Unpin,
        B::Value: Unpin,
        B::Frame: Unpin,
        C: AsRef<[u8]>,
    {
        type Item = Result<B::Value, ParseError>;

        fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
            let this = self.get_mut();
            loop {
                if let Some(value) = this.pending.pop_front() {
                    return Poll::Ready(Some(Ok(value)));
                }
                // A parse error or a finished input retires the parser.
                let Some(parser) = this.parser.as_mut() else {
                    return Poll::Ready(None);
                };
                match Pin::new(&mut this.inner).poll_next(cx) {
                    Poll::Ready(Some(chunk)) => match parser.absorb(chunk.as_ref()) {
                        Ok(values) => this.pending.extend(values),
                        Err(err) => {
                            this.parser = None;
                            return Poll::Ready(Some(Err(err)));
                        }
                    },
                    Poll::Ready(None) => {
                        let finished = parser.finish();
                        this.parser = None;
                        match finished {
                            Ok(values) => this.pending.extend(values),
                            Err(err) => return Poll::Ready(Some(Err(err))),
                        }
                    }
                    Poll::Pending => return Poll::Pending,
                }
            }
        }
    }
}
