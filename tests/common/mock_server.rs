//! Mock HTTP server for template and image sources.

use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

/// Wrapper around wiremock MockServer with convenience methods
pub struct MockTemplateServer {
    pub server: MockServer,
}

impl MockTemplateServer {
    /// Start a new mock server
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    /// Base URL templates are fetched from (`{base}/{id}.svg`)
    pub fn template_base_url(&self) -> String {
        format!("{}/templates", self.server.uri())
    }

    /// URL for a hosted image
    pub fn image_url(&self, name: &str) -> String {
        format!("{}/images/{}", self.server.uri(), name)
    }

    /// Serve raw SVG template source for a template id
    pub async fn mock_template(&self, id: &str, svg: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/templates/{id}.svg")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(svg)
                    .insert_header("content-type", "image/svg+xml"),
            )
            .mount(&self.server)
            .await;
    }

    /// Serve a PNG image body
    pub async fn mock_image(&self, name: &str, bytes: Vec<u8>) {
        Mock::given(method("GET"))
            .and(path(format!("/images/{name}")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(bytes)
                    .insert_header("content-type", "image/png"),
            )
            .mount(&self.server)
            .await;
    }

    /// Mock an endpoint that returns an error status
    pub async fn mock_error(&self, endpoint: &str, status: u16) {
        Mock::given(method("GET"))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }
}

/// A tiny valid PNG (1x1 white pixel) for image-serving mocks.
pub fn one_pixel_png() -> Vec<u8> {
    use base64::Engine as _;
    base64::engine::general_purpose::STANDARD
        .decode("iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8BQDwAEhQGAhKmMIQAAAABJRU5ErkJggg==")
        .expect("static base64 decodes")
}
