use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::task::{Context, Poll};

use http::{Request, Response, StatusCode};
use http_body::Body;
use pin_project::pin_project;
use tokio::sync::Notify;
use tower::{Layer, Service};

struct Inner {
    is_shutting_down: AtomicBool,
    in_flight_count: AtomicUsize,
    idle: Notify,
}

/// Shared state for tracking shutdown status and in-flight requests
#[derive(Clone)]
pub struct ShutdownState {
    inner: Arc<Inner>,
}

impl Default for ShutdownState {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownState {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                is_shutting_down: AtomicBool::new(false),
                in_flight_count: AtomicUsize::new(0),
                idle: Notify::new(),
            }),
        }
    }

    /// Stop admitting requests. Requests already running are allowed to finish.
    pub fn start_shutdown(&self) {
        self.inner.is_shutting_down.store(true, Ordering::SeqCst);
    }

    pub fn is_shutting_down(&self) -> bool {
        self.inner.is_shutting_down.load(Ordering::SeqCst)
    }

    pub fn in_flight_count(&self) -> usize {
        self.inner.in_flight_count.load(Ordering::SeqCst)
    }

    /// Resolves once no request is in flight.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.inner.idle.notified();
            if self.in_flight_count() == 0 {
                return;
            }
            notified.await;
        }
    }

    fn enter(&self) -> InFlightGuard {
        self.inner.in_flight_count.fetch_add(1, Ordering::SeqCst);
        InFlightGuard {
            state: self.clone(),
        }
    }
}

/// Decrements the in-flight count when the request completes or is dropped.
struct InFlightGuard {
    state: ShutdownState,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let previous = self
            .state
            .inner
            .in_flight_count
            .fetch_sub(1, Ordering::SeqCst);
        if previous == 1 {
            self.state.inner.idle.notify_waiters();
        }
    }
}

/// Tower layer that rejects new requests with 503 once shutdown has started
#[derive(Clone)]
pub struct GracefulShutdownLayer {
    state: ShutdownState,
}

impl GracefulShutdownLayer {
    pub fn new(state: ShutdownState) -> Self {
        Self { state }
    }
}

impl<S> Layer<S> for GracefulShutdownLayer {
    type Service = GracefulShutdownService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        GracefulShutdownService {
            inner,
            state: self.state.clone(),
        }
    }
}

#[derive(Clone)]
pub struct GracefulShutdownService<S> {
    inner: S,
    state: ShutdownState,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for GracefulShutdownService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    ResBody: Body + Default,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = GracefulShutdownFuture<S::Future, ResBody, S::Error>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        if self.state.is_shutting_down() {
            let mut response = Response::new(ResBody::default());
            *response.status_mut() = StatusCode::SERVICE_UNAVAILABLE;

            return GracefulShutdownFuture {
                kind: FutureKind::Rejected(Some(response)),
                _guard: None,
                _error: std::marker::PhantomData,
            };
        }

        GracefulShutdownFuture {
            _guard: Some(self.state.enter()),
            kind: FutureKind::Inner(self.inner.call(req)),
            _error: std::marker::PhantomData,
        }
    }
}

#[pin_project]
pub struct GracefulShutdownFuture<F, B, E> {
    #[pin]
    kind: FutureKind<F, B>,
    _guard: Option<InFlightGuard>,
    _error: std::marker::PhantomData<fn() -> E>,
}

#[pin_project(project = FutureKindProj)]
enum FutureKind<F, B> {
    Inner(#[pin] F),
    Rejected(Option<Response<B>>),
}

impl<F, B, E> Future for GracefulShutdownFuture<F, B, E>
where
    F: Future<Output = Result<Response<B>, E>>,
    B: Body + Default,
{
    type Output = Result<Response<B>, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();

        match this.kind.project() {
            FutureKindProj::Inner(fut) => {
                let result = futures::ready!(fut.poll(cx));
                // Release the in-flight slot as soon as the response is ready.
                this._guard.take();
                Poll::Ready(result)
            }
            FutureKindProj::Rejected(response) => {
                Poll::Ready(Ok(response.take().unwrap_or_default()))
            }
        }
    }
}
