//! Pass-through response body that reports when it is done.
//!
//! Frames are forwarded untouched. The completion hook runs exactly once with
//! the number of data bytes seen: at end of stream, on a body error, or when
//! the body is dropped early (client went away, connection abandoned).
//! An optional first-data hook runs when the first data frame passes through
//! and never runs for a body that yields no data.

use std::pin::Pin;
use std::task::{ready, Context, Poll};

use axum::body::Body;
use axum::response::Response;
use bytes::Bytes;
use http_body::{Frame, SizeHint};
use pin_project_lite::pin_project;

type OnFinish = Box<dyn FnOnce(u64) + Send>;
type OnFirstData = Box<dyn FnOnce() + Send>;

pub struct BodyTap {
    bytes: u64,
    on_first_data: Option<OnFirstData>,
    on_finish: Option<OnFinish>,
}

impl BodyTap {
    pub fn new(on_finish: impl FnOnce(u64) + Send + 'static) -> Self {
        Self {
            bytes: 0,
            on_first_data: None,
            on_finish: Some(Box::new(on_finish)),
        }
    }

    pub fn on_first_data(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.on_first_data = Some(Box::new(f));
        self
    }

    fn record(&mut self, n: usize) {
        if let Some(f) = self.on_first_data.take() {
            f();
        }
        self.bytes += n as u64;
    }

    fn finish(&mut self) {
        if let Some(f) = self.on_finish.take() {
            f(self.bytes);
        }
    }
}

impl Drop for BodyTap {
    fn drop(&mut self) {
        self.finish();
    }
}

pin_project! {
    pub struct TapBody<B> {
        #[pin]
        inner: B,
        tap: BodyTap,
    }
}

impl<B> TapBody<B> {
    pub fn new(inner: B, tap: BodyTap) -> Self {
        Self { inner, tap }
    }
}

impl<B> http_body::Body for TapBody<B>
where
    B: http_body::Body<Data = Bytes>,
{
    type Data = Bytes;
    type Error = B::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.project();
        let polled = ready!(this.inner.poll_frame(cx));
        match &polled {
            Some(Ok(frame)) => {
                if let Some(data) = frame.data_ref() {
                    this.tap.record(data.len());
                }
            }
            Some(Err(_)) | None => this.tap.finish(),
        }
        Poll::Ready(polled)
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

/// Wrap the body of `resp`; `on_finish` receives the total body bytes.
pub fn tap_response(resp: Response, on_finish: impl FnOnce(u64) + Send + 'static) -> Response {
    tap_response_with(resp, BodyTap::new(on_finish))
}

/// Wrap the body of `resp`; `on_first` runs when the first data frame is
/// polled, never if the body ends without data.
pub fn tap_first_data(resp: Response, on_first: impl FnOnce() + Send + 'static) -> Response {
    tap_response_with(resp, BodyTap::new(|_| {}).on_first_data(on_first))
}

fn tap_response_with(resp: Response, tap: BodyTap) -> Response {
    resp.map(|body| Body::new(TapBody::new(body, tap)))
}
