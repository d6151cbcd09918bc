// Middleware chain for request processing

use crate::error::HttpError;
use crate::request::{Request, Response};
use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, trace};

pub type BoxFuture = Pin<Box<dyn Future<Output = Result<Response, HttpError>> + Send>>;

/// The rest of the chain, handler included.
pub type Next = Box<dyn FnOnce(Request) -> BoxFuture + Send>;

/// Final request handler.
pub type HandlerFn = Arc<dyn Fn(Request) -> BoxFuture + Send + Sync>;

/// Wrap an async function as a [`HandlerFn`].
pub fn handler<F, Fut>(f: F) -> HandlerFn
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, HttpError>> + Send + 'static,
{
    Arc::new(move |req| -> BoxFuture { Box::pin(f(req)) })
}

#[async_trait]
pub trait Middleware: Send + Sync {
    /// Process the request and optionally pass it on through `next`.
    async fn handle(&self, req: Request, next: Next) -> Result<Response, HttpError>;
}

/// Middleware chain executor
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    middlewares: Arc<Vec<Arc<dyn Middleware>>>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn use_middleware<M: Middleware + 'static>(&mut self, middleware: M) {
        self.push(Arc::new(middleware));
    }

    /// Add an already shared middleware, e.g. one whose state is also
    /// inspected elsewhere.
    pub fn push(&mut self, middleware: Arc<dyn Middleware>) {
        let mut mws = (*self.middlewares).clone();
        mws.push(middleware);
        self.middlewares = Arc::new(mws);
    }

    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    /// Run `req` through every middleware, then `handler`.
    pub async fn apply(&self, req: Request, handler: HandlerFn) -> Result<Response, HttpError> {
        debug!(
            middleware_count = self.middlewares.len(),
            path = %req.path,
            method = %req.method,
            "Executing middleware chain"
        );
        self.execute_from(0, req, handler).await
    }

    fn execute_from(&self, index: usize, req: Request, handler: HandlerFn) -> BoxFuture {
        if index >= self.middlewares.len() {
            trace!("Middleware chain complete, calling handler");
            handler(req)
        } else {
            let middleware = self.middlewares[index].clone();
            let chain = self.clone();

            trace!(middleware_index = index, "Executing middleware");
            Box::pin(async move {
                middleware
                    .handle(
                        req,
                        Box::new(move |req| chain.execute_from(index + 1, req, handler)),
                    )
                    .await
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Tag(&'static str);

    #[async_trait]
    impl Middleware for Tag {
        async fn handle(&self, mut req: Request, next: Next) -> Result<Response, HttpError> {
            let mut seen = req.attribute::<Vec<&'static str>>("seen").cloned().unwrap_or_default();
            seen.push(self.0);
            req.attributes.insert("seen", seen);
            next(req).await
        }
    }

    struct Reject;

    #[async_trait]
    impl Middleware for Reject {
        async fn handle(&self, _req: Request, _next: Next) -> Result<Response, HttpError> {
            Ok(Response::bad_request())
        }
    }

    fn echo_seen() -> HandlerFn {
        handler(|req: Request| async move {
            let seen = req.attribute::<Vec<&'static str>>("seen").cloned().unwrap_or_default();
            Response::ok().with_json(&seen)
        })
    }

    #[tokio::test]
    async fn test_runs_in_order() {
        let mut chain = MiddlewareChain::new();
        chain.use_middleware(Tag("first"));
        chain.use_middleware(Tag("second"));
        assert_eq!(chain.len(), 2);

        let response = chain.apply(Request::get("/"), echo_seen()).await.unwrap();
        assert_eq!(response.json().unwrap(), serde_json::json!(["first", "second"]));
    }

    #[tokio::test]
    async fn test_short_circuit() {
        let mut chain = MiddlewareChain::new();
        chain.use_middleware(Reject);
        chain.use_middleware(Tag("never"));

        let response = chain.apply(Request::get("/"), echo_seen()).await.unwrap();
        assert_eq!(response.status, 400);
    }

    #[tokio::test]
    async fn test_empty_chain_calls_handler() {
        let chain = MiddlewareChain::new();
        assert!(chain.is_empty());
        let response = chain.apply(Request::get("/"), echo_seen()).await.unwrap();
        assert_eq!(response.status, 200);
    }
}
