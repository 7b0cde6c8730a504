pub mod health;
pub mod tasks;
pub mod users;

use actix_web::{http::header, web, HttpResponse, HttpResponseBuilder};

/// `303 See Other` pointing at `location`; callers may attach cookies before finishing.
pub fn see_other(location: &str) -> HttpResponseBuilder {
    let mut builder = HttpResponse::SeeOther();
    builder.insert_header((header::LOCATION, location));
    builder
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(health::health)
        .service(users::index)
        .service(users::register)
        .service(users::login_page)
        .service(users::login)
        .service(users::logout)
        .service(users::home)
        .service(
            web::scope("/tasks")
                .service(tasks::create_task)
                .service(tasks::list_tasks)
                .service(tasks::get_task)
                .service(tasks::edit_task)
                .service(tasks::before_delete)
                .service(tasks::delete_task)
                .service(tasks::cancel_delete),
        );
}
