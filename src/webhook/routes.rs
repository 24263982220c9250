use crate::consts;
use ntex::web;

/// Configures the WhatsApp webhook routes.
///
/// # Routes
/// - `GET /webhook` - verification handshake
/// - `POST /webhook` - message receiver
pub fn whatsapp(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/webhook").service((super::whatsapp::verify, super::whatsapp::receive)),
    );
}

/// Static informational page
#[web::get("/")]
pub async fn index() -> web::HttpResponse {
    web::HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(consts::INDEX_PAGE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ntex::http::StatusCode;
    use ntex::web::test;

    #[ntex::test]
    async fn test_index_page() {
        let app = test::init_service(web::App::new().service(index)).await;

        let req = test::TestRequest::get().uri("/").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        assert!(String::from_utf8_lossy(&body).contains("Nothing to see here"));
    }
}
