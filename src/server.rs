use std::io;
use std::io::ErrorKind;
use std::path::{Component, Path};
use std::sync::Arc;

use ntex::web;
use ntex::web::HttpRequest;
use ntex_files::NamedFile;
use spdlog::{error, info};

use crate::config::Config;
use crate::query_string::QueryString;
use crate::site::{LinkStyle, Site};

struct AppState {
    site: Site,
}

fn query(req: &HttpRequest) -> QueryString {
    match req.uri().query() {
        Some(query_str) => QueryString::from(query_str),
        None => QueryString::empty(),
    }
}

fn html_response(what: &str, rendered: io::Result<String>) -> web::HttpResponse {
    match rendered {
        Ok(body) => web::HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(body),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!("Not found: {} - {}", what, e);
            web::HttpResponse::NotFound()
                .content_type("text/html; charset=utf-8")
                .body(format!("Not found: {}", what))
        }
        Err(e) => {
            error!("Error rendering {}: {}", what, e);
            web::HttpResponse::InternalServerError()
                .body(format!("Error rendering {}: {}", what, e))
        }
    }
}

/// Only plain relative paths may be served from a directory.
fn is_safe_path(path: &str) -> bool {
    !path.is_empty() && Path::new(path).components().all(|c| matches!(c, Component::Normal(_)))
}

fn serve_file(base_dir: &Path, file: &str) -> Result<NamedFile, web::Error> {
    if !is_safe_path(file) {
        return Err(web::error::ErrorUnauthorized("Access forbidden").into());
    }
    Ok(NamedFile::open(base_dir.join(file))?)
}

#[web::get("/")]
async fn index(state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    html_response("index", state.site.render_index())
}

#[web::get("/about")]
async fn about(state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    html_response("about", state.site.render_about())
}

#[web::get("/contact")]
async fn contact(req: HttpRequest, state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    let success = query(&req).is_set("success");
    html_response("contact", state.site.render_contact(success))
}

#[web::get("/blog")]
async fn blog_list(req: HttpRequest, state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    let qs = query(&req);
    html_response("blog", state.site.render_blog_list(qs.get_tag(), qs.get_page()))
}

#[web::get("/blog/{slug}")]
async fn blog_post(slug: web::types::Path<String>, state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    let slug = slug.into_inner();
    html_response(&format!("post {}", slug), state.site.render_post(&slug))
}

#[web::get("/photos")]
async fn photo_list(req: HttpRequest, state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    html_response("photos", state.site.render_photo_list(query(&req).get_tag()))
}

#[web::get("/photos/web/{file}*")]
async fn photo_files(path: web::types::Path<String>, state: web::types::State<Arc<AppState>>) -> Result<NamedFile, web::Error> {
    serve_file(&state.site.config.images.web_dir, &path.into_inner())
}

#[web::get("/photos/{id}")]
async fn photo(req: HttpRequest, id: web::types::Path<String>, state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    let id = id.into_inner();
    html_response(&format!("photo {}", id), state.site.render_photo(&id, query(&req).get_tag()))
}

#[web::get("/feed.xml")]
async fn feed(state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    match state.site.render_feed() {
        Ok(xml) => web::HttpResponse::Ok()
            .content_type("application/rss+xml; charset=utf-8")
            .body(xml),
        Err(e) => {
            error!("Error rendering feed: {}", e);
            web::HttpResponse::InternalServerError()
                .body(format!("Error rendering feed: {}", e))
        }
    }
}

#[web::get("/public/{file_name}")]
async fn public_files(path: web::types::Path<String>, state: web::types::State<Arc<AppState>>) -> Result<NamedFile, web::Error> {
    serve_file(&state.site.config.paths.public_dir, &path.into_inner())
}

pub async fn server_run(config: Config) -> io::Result<()> {
    let bind_addr = config.server.address.clone();
    let bind_port = config.server.port;
    let app_state = Arc::new(AppState {
        site: Site::new(config, LinkStyle::Query),
    });

    web::HttpServer::new(move || {
        web::App::new()
            .state(app_state.clone())
            .service(index)
            .service(about)
            .service(contact)
            .service(blog_list)
            .service(blog_post)
            .service(photo_list)
            .service(photo_files)
            .service(photo)
            .service(feed)
            .service(public_files)
    })
        .bind((bind_addr, bind_port))?
        .run()
        .await
}
