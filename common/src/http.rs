use actix_web::{HttpResponse, Responder};
use serde::Serialize;

use super::error::Res;

/// JSON success bodies for handlers returning `Res<impl Responder>`.
pub struct Success;

impl Success {
    /// 201 Created.
    pub fn created<T: Serialize>(body: T) -> Res<impl Responder> {
        Ok(HttpResponse::Created().json(body))
    }

    /// 200 OK.
    pub fn ok<T: Serialize>(body: T) -> Res<impl Responder> {
        Ok(HttpResponse::Ok().json(body))
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test::TestRequest};

    use super::*;

    #[test]
    fn created_and_ok_set_the_status() {
        let req = TestRequest::default().to_http_request();

        let created = Success::created(serde_json::json!({ "success": true }))
            .unwrap()
            .respond_to(&req);
        let ok = Success::ok(serde_json::json!({})).unwrap().respond_to(&req);

        assert_eq!(created.status(), StatusCode::CREATED);
        assert_eq!(ok.status(), StatusCode::OK);
    }
}
