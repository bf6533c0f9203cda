use actix_web::{
    http::{header, StatusCode},
    web, HttpResponse, Responder,
};
use log::{debug, info};

use crate::{
    config::Config, errors::AppError, models::ShortenRequestDto, services::ShortenerService,
};

/// Static page rendered when a code has no mapping
const NOT_FOUND_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Short link not found</title>
<style>
body{font-family:system-ui,-apple-system,sans-serif;display:flex;align-items:center;justify-content:center;min-height:100vh;margin:0;background:#f6f8fa;color:#24292f;}
main{text-align:center;max-width:420px;padding:32px;}
h1{font-size:4rem;margin:0 0 8px;}
p{color:#57606a;line-height:1.5;}
a{color:#0969da;text-decoration:none;font-weight:600;}
</style>
</head>
<body>
<main>
<h1>404</h1>
<p>This short link does not exist or has expired. Check the address and try again.</p>
<p><a href="/">Back to the front page</a></p>
</main>
</body>
</html>
"#;

/// Create short link route handler
pub async fn shorten_handler(
    dto: web::Json<ShortenRequestDto>,
    service: web::Data<ShortenerService>,
) -> Result<impl Responder, AppError> {
    let created = service.shorten(dto.into_inner()).await?;
    Ok(HttpResponse::Created().json(created))
}

/// Redirect route handler for the path form (`/s/{code}`)
pub async fn redirect_handler(
    path: web::Path<String>,
    service: web::Data<ShortenerService>,
    config: web::Data<Config>,
) -> HttpResponse {
    let code = path.into_inner();
    debug!("Redirect requested for code: {}", code);
    resolve_to_response(&code, &service, &config).await
}

/// Resolves a code and builds either the redirect or the 404 page.
///
/// Shared between the `/s/{code}` path form and the `/?s={code}` query form.
pub async fn resolve_to_response(
    code: &str,
    service: &ShortenerService,
    config: &Config,
) -> HttpResponse {
    match service.resolve(code).await {
        Ok(target) => {
            info!("Redirecting '{}' to '{}'", code, target);

            // Config loading already constrained this to 301/302/307/308
            let status = StatusCode::from_u16(config.shortener.redirect_status)
                .unwrap_or(StatusCode::FOUND);

            HttpResponse::build(status)
                .insert_header((header::LOCATION, target))
                .insert_header((header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"))
                .finish()
        }
        Err(_) => not_found_page(),
    }
}

/// The 404 page is static, so intermediaries may cache it briefly
fn not_found_page() -> HttpResponse {
    HttpResponse::NotFound()
        .insert_header((header::CACHE_CONTROL, "public, max-age=300"))
        .content_type("text/html; charset=utf-8")
        .body(NOT_FOUND_PAGE)
}
