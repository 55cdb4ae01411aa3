use axum::response::Response;
use http_body_util::BodyExt;

const BOUNDARY: &str = "image-upload-test-boundary";

/// One part of a `multipart/form-data` body
pub struct FormPart {
    pub name: String,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

pub fn image_part(filename: &str, content_type: &str, data: &[u8]) -> FormPart {
    FormPart {
        name: "image".to_string(),
        filename: Some(filename.to_string()),
        content_type: Some(content_type.to_string()),
        data: data.to_vec(),
    }
}

pub fn text_part(name: &str, value: &str) -> FormPart {
    FormPart {
        name: name.to_string(),
        filename: None,
        content_type: None,
        data: value.as_bytes().to_vec(),
    }
}

/// Encodes `parts`, returning the `Content-Type` header value and the body
pub fn multipart_body(parts: &[FormPart]) -> (String, Vec<u8>) {
    let mut body = Vec::new();

    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());

        let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.name);
        if let Some(filename) = &part.filename {
            disposition.push_str(&format!("; filename=\"{filename}\""));
        }
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(b"\r\n");

        if let Some(content_type) = &part.content_type {
            body.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
        }

        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(&part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

/// Small PNG-looking payload; the service never inspects image contents
pub fn generate_test_image(size: usize, seed: u8) -> Vec<u8> {
    let mut data = b"\x89PNG\r\n\x1a\n".to_vec();
    data.extend((0..size).map(|i| (i as u8).wrapping_add(seed)));
    data
}

/// Parse response body as UTF-8 text
pub async fn parse_text_body(response: Response) -> String {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(body.to_vec()).unwrap()
}

/// Parse response body to JSON
pub async fn parse_response_body(response: Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}
