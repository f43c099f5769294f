//! HTTP surface (feature `server`).

use crate::{
    error::PosterError,
    models::{
        GenerationRequest, ImagesResponse, PosterImageRequest, PosterRequest, TextToImageRequest,
    },
    studio::PosterStudio,
};
use actix_cors::Cors;
use actix_web::{get, post, web, App, HttpResponse, HttpServer, Responder};
use serde_json::json;

fn failure(error: &PosterError) -> HttpResponse {
    log::error!("❌ Request failed: {}", error);
    if let Some(attempts) = error.attempts() {
        for attempt in attempts {
            log::error!(
                "   tier {} {}: {} ({})",
                attempt.tier,
                attempt.provider,
                attempt.kind,
                attempt.message
            );
        }
    }
    HttpResponse::InternalServerError().json(ImagesResponse::failure(error))
}

#[get("/")]
async fn root() -> impl Responder {
    HttpResponse::Ok().json(json!({"status": "ok", "message": "Backend is running!"}))
}

#[get("/healthz")]
async fn healthz() -> impl Responder {
    HttpResponse::Ok().json(json!({"status": "healthy"}))
}

/// POST /generate-fields - poster copy for the selected fields
#[post("/generate-fields")]
async fn generate_fields(
    studio: web::Data<PosterStudio>,
    body: web::Json<PosterRequest>,
) -> HttpResponse {
    match studio.generate_fields(&body).await {
        Ok(fields) => HttpResponse::Ok().json(json!({
            "status": "success",
            "data": fields,
            "message": "Poster fields generated.",
        })),
        Err(e) => failure(&e),
    }
}

/// POST /generate-poster - one square poster image from finished copy
#[post("/generate-poster")]
async fn generate_poster(
    studio: web::Data<PosterStudio>,
    body: web::Json<PosterImageRequest>,
) -> HttpResponse {
    match studio.generate_poster(&body).await {
        Ok(mut outcome) => match outcome.images.pop() {
            Some(image) => HttpResponse::Ok().json(json!({
                "status": "success",
                "image_base64": image.data,
                "provider_used": outcome.provider_used,
            })),
            None => failure(&PosterError::Response("poster produced no image".into())),
        },
        Err(e) => failure(&e),
    }
}

/// POST /generate-images - up to three images through the tiered planner
#[post("/generate-images")]
async fn generate_images(
    studio: web::Data<PosterStudio>,
    body: web::Json<TextToImageRequest>,
) -> HttpResponse {
    let request: GenerationRequest = body.into_inner().into();
    match studio.generate_images(&request).await {
        Ok(outcome) => HttpResponse::Ok().json(ImagesResponse::success(outcome)),
        Err(e) => failure(&e),
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(root)
        .service(healthz)
        .service(generate_fields)
        .service(generate_poster)
        .service(generate_images);
}

/// Browser frontends are served from another origin, so every origin, method
/// and header is allowed.
pub fn cors() -> Cors {
    Cors::permissive()
}

pub async fn run(studio: PosterStudio, port: u16) -> std::io::Result<()> {
    let studio = web::Data::new(studio);
    log::info!("🌐 Listening on 0.0.0.0:{}", port);
    HttpServer::new(move || {
        App::new()
            .wrap(cors())
            .app_data(studio.clone())
            .configure(configure)
    })
        .bind(("0.0.0.0", port))?
        .run()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clients::ExternalClients,
        config::Config,
        testing::{abcd_registry, MemoryFetcher, ScriptedImageBackend, ScriptedReasoner},
    };
    use actix_web::{
        http::{header, Method, StatusCode},
        test,
    };
    use std::sync::Arc;

    fn studio(failing: &[&str]) -> web::Data<PosterStudio> {
        studio_with(failing, ScriptedReasoner::unavailable())
    }

    fn studio_with(failing: &[&str], reasoner: ScriptedReasoner) -> web::Data<PosterStudio> {
        let clients = ExternalClients {
            images: Arc::new(ScriptedImageBackend::failing(failing)),
            reasoning: Arc::new(reasoner),
            fetcher: Arc::new(MemoryFetcher::default()),
        };
        web::Data::new(PosterStudio::new(
            Arc::new(abcd_registry()),
            clients,
            &Config::new(),
        ))
    }

    #[actix_web::test]
    async fn test_healthz() {
        let app = test::init_service(App::new().configure(configure)).await;
        let resp = test::call_service(&app, test::TestRequest::get().uri("/healthz").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_generate_fields_returns_data() {
        let reasoner = ScriptedReasoner::replying(
            r#"{"custom_prompt": "A coding night", "cta": "Join", "testimonial": "Great"}"#,
        );
        let app = test::init_service(
            App::new()
                .app_data(studio_with(&[], reasoner))
                .configure(configure),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/generate-fields")
            .set_json(json!({"main_prompt": "Hackathon", "include_cta": true}))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["status"], "success");
        assert_eq!(body["data"]["cta"], "Join");
        assert!(body["data"]["testimonial"].is_null());
        assert!(body["message"].is_string());
    }

    #[actix_web::test]
    async fn test_cors_preflight_is_allowed() {
        let app = test::init_service(App::new().wrap(cors()).configure(configure)).await;
        let req = test::TestRequest::default()
            .method(Method::OPTIONS)
            .uri("/generate-images")
            .insert_header((header::ORIGIN, "http://localhost:4200"))
            .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "POST"))
            .insert_header((header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_success());
        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|v| v.to_str().ok()),
            Some("http://localhost:4200")
        );
    }

    #[actix_web::test]
    async fn test_generate_images() {
        let app = test::init_service(App::new().app_data(studio(&[])).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/generate-images")
            .set_json(json!({"main_prompt": "a red fox", "aspect_ratio": "16:9", "count": 2}))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["provider_used"], "C");
        assert_eq!(body["images"].as_array().map(|a| a.len()), Some(2));
    }

    #[actix_web::test]
    async fn test_exhaustion_is_500_with_generic_message() {
        let app = test::init_service(
            App::new()
                .app_data(studio(&["vendor/c", "vendor/d"]))
                .configure(configure),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/generate-images")
            .set_json(json!({"main_prompt": "a red fox", "aspect_ratio": "9:16"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(
            body["message"],
            "Our models are busy right now, try again later."
        );
    }
}
