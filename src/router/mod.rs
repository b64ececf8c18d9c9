//! # Router Module
//!
//! Path-pattern routing with specificity ranking.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Compiling patterns such as `/users/:id/posts/*rest` into typed segments
//! - Matching a method and decoded path against every registered route
//! - Choosing the most specific match and binding its parameters in order
//!
//! ## Ranking
//!
//! Literal segments weigh 3, `:param` segments 2 and a trailing `*wildcard` 1. When
//! several routes match, the highest total wins, so `/users/new` (6) beats
//! `/users/:id` (5) whatever the registration order. Equal scores go to the route
//! registered first.
//!
//! ## Example
//!
//! ```rust
//! use embedroute::router::Router;
//! use http::Method;
//!
//! let mut router = Router::new();
//! router.register(Method::GET, "/users/:id/posts/*rest", "posts").unwrap();
//!
//! let m = router.route_path(&Method::GET, "/users/42/posts/a/b/c").unwrap();
//! assert_eq!(m.get_path_param("id"), Some("42"));
//! assert_eq!(m.get_path_param("rest"), Some("a/b/c"));
//! ```
//!
//! The table is built during start-up and only read afterwards, so a shared
//! `&Router` can serve any number of worker threads.

mod core;
mod pattern;

pub use self::core::{DynamicRoute, ParamVec, RouteMatch, Router, MAX_INLINE_PARAMS};
pub use pattern::{split_path, PathSegments, RoutePattern, Segment};
