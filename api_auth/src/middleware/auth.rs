use std::{future::Future, pin::Pin, sync::Arc};

use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use common::jwt;
use futures::future::{Ready, ok};

pub struct AuthMiddleware {}

impl AuthMiddleware {
    pub fn new() -> Self {
        AuthMiddleware {}
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<actix_web::body::BoxBody>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthMiddlewareService {
            service: Arc::new(service),
        })
    }
}

pub struct AuthMiddlewareService<S> {
    service: Arc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<actix_web::body::BoxBody>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = Arc::clone(&self.service);

        Box::pin(async move {
            match jwt::get_jwt_claims_or_error(&req) {
                Err(response) => Ok(req.into_response(response)),
                Ok(claims) => {
                    // handlers read the identity through web::ReqData<JwtClaims>
                    req.extensions_mut().insert(claims);
                    srv.call(req).await.map(|res| res.map_into_boxed_body())
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{App, HttpResponse, http::StatusCode, test, web};
    use common::{
        env_config::Config,
        jwt::JwtClaims,
        test_support::{bearer_for, expired_bearer_for, test_config},
    };
    use uuid::Uuid;

    use super::*;

    async fn whoami(claims: web::ReqData<JwtClaims>) -> HttpResponse {
        HttpResponse::Ok().body(claims.email.clone())
    }

    async fn call(authorization: Option<String>) -> (StatusCode, String) {
        let config: Arc<Config> = Arc::new(test_config());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(config))
                .wrap(AuthMiddleware::new())
                .wrap(extractor::middleware())
                .route("/", web::get().to(whoami)),
        )
        .await;

        let mut req = test::TestRequest::get().uri("/");
        if let Some(value) = authorization {
            req = req.insert_header(("Authorization", value));
        }
        let res = test::call_service(&app, req.to_request()).await;
        let status = res.status();
        let body = test::read_body(res).await;
        (status, String::from_utf8_lossy(&body).to_string())
    }

    #[actix_web::test]
    async fn passes_claims_to_the_handler() {
        let (status, body) = call(Some(bearer_for(Uuid::new_v4(), "a@x.com"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "a@x.com");
    }

    #[actix_web::test]
    async fn missing_token_is_unauthorized() {
        let (status, body) = call(None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("No authorization token provided"));
    }

    #[actix_web::test]
    async fn expired_token_is_unauthorized() {
        let (status, _) = call(Some(expired_bearer_for(Uuid::new_v4(), "a@x.com"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn garbage_token_is_unauthorized() {
        let (status, _) = call(Some("Bearer not-a-jwt".to_string())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
