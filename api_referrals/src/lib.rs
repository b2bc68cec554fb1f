use actix_web::web;

pub mod routes {
    pub mod dashboard;
}
pub mod services {
    pub mod metrics;
    pub mod referral;
}
mod dtos {
    pub(crate) mod dashboard;
}

/// Dashboard routes. Must be wrapped by the auth guard.
pub fn mount_dashboard() -> actix_web::Scope {
    web::scope("/dashboard").service(routes::dashboard::get_dashboard)
}
