use axum::extract::Multipart;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// An uploaded statement with its data and metadata.
pub struct UploadedFile {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Parsed form fields from the multipart upload.
pub struct FormFields {
    pub file: UploadedFile,
    pub password: Option<String>,
}

/// Parse a multipart form upload into structured form fields.
///
/// The `file` part must declare `application/pdf`; anything else is
/// rejected before its body is read. An empty `password` counts as absent.
pub async fn parse_multipart(mut multipart: Multipart) -> Result<FormFields, String> {
    let mut file: Option<UploadedFile> = None;
    let mut password: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Failed to read form field: {}", e))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                if !is_pdf_content_type(field.content_type()) {
                    return Err("File must be a PDF".to_string());
                }
                let filename = field.file_name().unwrap_or("statement.pdf").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| format!("Failed to read file data: {}", e))?
                    .to_vec();

                file = Some(UploadedFile { filename, data });
            }
            "password" => {
                let val = field
                    .text()
                    .await
                    .map_err(|e| format!("Failed to read password: {}", e))?;
                if !val.is_empty() {
                    password = Some(val);
                }
            }
            _ => {
                // Ignore unknown fields
                let _ = field.bytes().await;
            }
        }
    }

    let file = file.ok_or("No file uploaded")?;

    Ok(FormFields { file, password })
}

/// Compare the MIME essence, ignoring parameters such as `; charset=...`.
fn is_pdf_content_type(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.split(';').next())
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case(PDF_CONTENT_TYPE))
}
