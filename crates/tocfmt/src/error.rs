#[derive(thiserror::Error, Debug, serde::Deserialize, serde::Serialize)]
pub enum Error {
    #[error("File '{0}' not found")]
    NotFound(String),

    #[error("Input file must be a .docx document: {0}")]
    NotDocx(String),

    #[error("Invalid layout: {0}")]
    InvalidLayout(String),
}
