//! Streams which know how many records are left.
//!
//! We count batch input up front, then attach that count to the record
//! stream so the progress bar can show a real length.

use std::{
    pin::Pin,
    task::{Context, Poll},
};

use futures::Stream;

/// A size hint, as returned by [`Stream::size_hint`].
pub type SizeHint = (usize, Option<usize>);

/// A [`Stream`] with a known size hint, counted down as items arrive.
pub struct SizeHintStream<S> {
    inner: S,
    remaining: SizeHint,
}

impl<S> Stream for SizeHintStream<S>
where
    S: Stream + Unpin,
{
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let polled = Pin::new(&mut this.inner).poll_next(cx);
        if let Poll::Ready(Some(_)) = &polled {
            let (lower, upper) = this.remaining;
            this.remaining = (
                lower.saturating_sub(1),
                upper.map(|upper| upper.saturating_sub(1)),
            );
        }
        polled
    }

    fn size_hint(&self) -> SizeHint {
        self.remaining
    }
}

/// Adds [`WithSizeHintExt::with_size_hint`] to every [`Stream`].
pub trait WithSizeHintExt: Stream + Sized {
    /// Report `size_hint` until items start arriving.
    fn with_size_hint(self, size_hint: SizeHint) -> SizeHintStream<Self> {
        SizeHintStream {
            inner: self,
            remaining: size_hint,
        }
    }
}

impl<S: Stream> WithSizeHintExt for S {}

#[cfg(test)]
mod tests {
    use futures::{StreamExt as _, stream};

    use super::*;

    #[tokio::test]
    async fn test_size_hint_counts_down() {
        let mut records = stream::iter(["a", "b"]).with_size_hint((2, Some(2)));
        assert_eq!(records.size_hint(), (2, Some(2)));
        assert_eq!(records.next().await, Some("a"));
        assert_eq!(records.size_hint(), (1, Some(1)));
        assert_eq!(records.next().await, Some("b"));
        assert_eq!(records.next().await, None);
        assert_eq!(records.size_hint(), (0, Some(0)));
    }

    #[tokio::test]
    async fn test_unknown_size_stays_unknown() {
        let mut records = stream::iter([1, 2, 3]).with_size_hint((0, None));
        records.next().await;
        assert_eq!(records.size_hint(), (0, None));
    }
}
