//! Packet stream decoding

use futures::{Stream, ready};
use pin_project_lite::pin_project;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};
use tracing::debug;

use crate::dispatch::Dispatcher;
use crate::types::{Decoded, RawPacket};

/// Extension trait to decode any stream of framed packets.
pub trait DecodeExt: Stream<Item = RawPacket> {
    /// Decode every packet with the shared standard dispatcher.
    fn decoded(self) -> Decoding<Self>
    where
        Self: Sized,
    {
        Decoding::new(self, Dispatcher::shared())
    }

    /// Decode every packet with `dispatcher`.
    fn decoded_with(self, dispatcher: Arc<Dispatcher>) -> Decoding<Self>
    where
        Self: Sized,
    {
        Decoding::new(self, dispatcher)
    }
}

impl<T: Stream<Item = RawPacket>> DecodeExt for T {}

pin_project! {
    /// A stream combinator yielding one [`Decoded`] per packet, in order.
    pub struct Decoding<S> {
        #[pin]
        stream: S,
        dispatcher: Arc<Dispatcher>,
        cancelled: Option<Pin<Box<WaitForCancellationFutureOwned>>>,
        done: bool,
    }
}

impl<S> Decoding<S> {
    pub fn new(stream: S, dispatcher: Arc<Dispatcher>) -> Self {
        Self { stream, dispatcher, cancelled: None, done: false }
    }

    /// End the stream once `token` is cancelled.
    ///
    /// A packet already handed to the dispatcher is still yielded; nothing
    /// is decoded after cancellation is observed.
    pub fn with_cancellation(self, token: CancellationToken) -> Self {
        Self { cancelled: Some(Box::pin(token.cancelled_owned())), ..self }
    }
}

impl<S: Stream<Item = RawPacket>> Stream for Decoding<S> {
    type Item = Decoded;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();
        if *this.done {
            return Poll::Ready(None);
        }

        if let Some(cancelled) = this.cancelled.as_mut() {
            if cancelled.as_mut().poll(cx).is_ready() {
                debug!("Packet stream cancelled");
                *this.done = true;
                return Poll::Ready(None);
            }
        }

        match ready!(this.stream.as_mut().poll_next(cx)) {
            Some(packet) => Poll::Ready(Some(this.dispatcher.decode_packet(&packet))),
            None => {
                *this.done = true;
                Poll::Ready(None)
            }
        }
    }
}
