use std::{future::Future, pin::Pin, sync::Arc};

use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    web,
};
use futures::future::{Ready, ok};

use common::{
    env_config::Config,
    error::{AppError, Res},
    jwt::{self, JwtClaims},
};

/// Decodes the bearer token, if any, and stores the outcome in the request
/// extensions as `Res<JwtClaims>` for the auth guard and the request logger.
pub struct ExtractionMiddleware {}

impl ExtractionMiddleware {
    pub fn new() -> Self {
        Self {}
    }
}

impl<S, B> Transform<S, ServiceRequest> for ExtractionMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<actix_web::body::BoxBody>;
    type Error = Error;
    type Transform = ExtractionMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(ExtractionMiddlewareService {
            service: Arc::new(service),
        })
    }
}

pub struct ExtractionMiddlewareService<S> {
    service: Arc<S>,
}

impl<S, B> Service<ServiceRequest> for ExtractionMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<actix_web::body::BoxBody>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // retrieve token from authorization header
        let bearer = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| token.trim().to_owned());

        let secret = req
            .app_data::<web::Data<Arc<Config>>>()
            .map(|config| config.jwt_config.secret.clone());
        let srv = Arc::clone(&self.service);

        Box::pin(async move {
            if let Some(token) = bearer {
                let claims_res = match secret {
                    Some(secret) => jwt::validate_jwt(&token, &secret),
                    None => Err(AppError::Internal("Missing server configuration".to_string())),
                };
                if let Err(err) = &claims_res {
                    log::debug!("Rejected bearer token: {}", err);
                }
                req.extensions_mut().insert::<Res<JwtClaims>>(claims_res);
            }
            srv.call(req).await.map(|res| res.map_into_boxed_body())
        })
    }
}
