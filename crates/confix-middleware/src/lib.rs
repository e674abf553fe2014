//! # Confix Middleware
//!
//! The pipeline engine every Confix command runs on.
//!
//! A [`Pipeline`] is an ordered list of [`Middleware`] stages wrapped around
//! one terminal [`Handler`]. Each run gets a fresh [`MiddlewareContext`]
//! carrying the cancellation token, a status sink, a [`RunLogger`] and the
//! typed [`Features`] registry stages use to hand state to each other.
//!
//! ```text
//! LoadConfiguration → Environment → Variables → ... → Handler
//!        │                 │            │                │
//!        └── set ──────────┴── set ─────┴─────── get ────┘
//!                         Features
//! ```
//!
//! ## Guarantees
//!
//! - Stages run strictly in registration order, one at a time
//! - Cancellation is checked before every stage and before the handler
//! - The handler's declared features are verified before its body runs
//! - A context executes once; features stay readable after the run
//!
//! ## Example
//!
//! ```
//! use confix_middleware::{FnHandler, FnMiddleware, MiddlewareContext, Pipeline};
//!
//! struct Greeting(String);
//!
//! # tokio_test::block_on(async {
//! let pipeline = Pipeline::builder()
//!     .use_middleware(FnMiddleware::new("greeting", |ctx, next| {
//!         Box::pin(async move {
//!             ctx.features_mut().set(Greeting("hello".to_string()));
//!             next.run(ctx).await
//!         })
//!     }))
//!     .use_handler(
//!         FnHandler::new(|ctx| {
//!             Box::pin(async move {
//!                 let greeting = ctx.features().get::<Greeting>()?;
//!                 ctx.logger().information(&greeting.0);
//!                 Ok(())
//!             })
//!         })
//!         .requires::<Greeting>(),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let mut ctx = MiddlewareContext::default();
//! pipeline.execute(&mut ctx).await.unwrap();
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/confix-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod context;
pub mod features;
pub mod handler;
pub mod logger;
pub mod middleware;
pub mod pipeline;
pub mod stages;
pub mod status;

// Re-export main types at crate root
pub use context::{MiddlewareContext, RunState};
pub use features::{FeatureKey, Features};
pub use handler::{FnHandler, Handler};
pub use logger::RunLogger;
pub use middleware::{BoxFuture, FnMiddleware, Middleware, Next};
pub use pipeline::{BoxedMiddleware, Pipeline, PipelineBuilder};
pub use stages::{Elapsed, TimingMiddleware};
pub use status::{StatusSink, TracingStatusSink};
