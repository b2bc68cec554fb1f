use actix_web::web;

pub mod routes {
    pub mod invite;
}
pub mod services {
    pub mod email;
    pub mod invite;
}
mod dtos {
    pub(crate) mod invite;
}

/// Invite routes. Must be wrapped by the auth guard.
pub fn mount_invites() -> actix_web::Scope {
    web::scope("/invites").service(routes::invite::post_invite)
}
