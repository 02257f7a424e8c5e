#[derive(Debug, thiserror::Error)]
pub enum ScannerError {
    #[error("{scanner}: io error reading {path}: {source}")]
    Io {
        scanner: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{scanner}: {message}")]
    Rejected { scanner: &'static str, message: String },
}
