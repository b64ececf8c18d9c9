//! Handler traits stored by the dispatcher.
//!
//! Any `Fn` closure with the right signature is a handler, so registration reads
//! `dispatcher.on(Method::GET, "/users/:id", |req, res| { ... })`.

use crate::error::ServeError;
use crate::server::{Request, Response};
use crate::static_files::StaticInfo;

/// Handles a request matched by a dynamic route.
///
/// Returning `Ok(())` without sending anything is a bug and becomes a 500; an `Err`
/// becomes its status when nothing was committed yet.
pub trait RouteHandler: Send + Sync {
    fn invoke(&self, req: &Request, res: &mut Response<'_>) -> Result<(), ServeError>;
}

impl<F> RouteHandler for F
where
    F: Fn(&Request, &mut Response<'_>) -> Result<(), ServeError> + Send + Sync,
{
    fn invoke(&self, req: &Request, res: &mut Response<'_>) -> Result<(), ServeError> {
        self(req, res)
    }
}

/// Handles a request whose path resolved to an existing static asset.
///
/// The resolved asset is attached to `res`, so the usual body is a few template
/// settings followed by [`Response::send_static`].
pub trait StaticHandler: Send + Sync {
    fn invoke(
        &self,
        info: &StaticInfo,
        req: &Request,
        res: &mut Response<'_>,
    ) -> Result<(), ServeError>;
}

impl<F> StaticHandler for F
where
    F: Fn(&StaticInfo, &Request, &mut Response<'_>) -> Result<(), ServeError> + Send + Sync,
{
    fn invoke(
        &self,
        info: &StaticInfo,
        req: &Request,
        res: &mut Response<'_>,
    ) -> Result<(), ServeError> {
        self(info, req, res)
    }
}

/// Static handler that sends every asset as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct SendStatic;

impl StaticHandler for SendStatic {
    fn invoke(&self, _: &StaticInfo, _: &Request, res: &mut Response<'_>) -> Result<(), ServeError> {
        res.send_static()
    }
}
