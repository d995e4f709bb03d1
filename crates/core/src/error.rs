use cards_files::FilesError;

#[derive(Debug, thiserror::Error)]
pub enum CardError {
    #[error("an image is required to create a card")]
    MissingImage,
    #[error("only images are permitted")]
    InvalidImage,
    #[error("image of {size} bytes exceeds the limit of {limit} bytes")]
    ImageTooLarge { size: u64, limit: u64 },
    #[error("card not found: {0}")]
    NotFound(String),
    #[error("file storage error: {0}")]
    Files(FilesError),
    #[error("card store lock poisoned")]
    StorePoisoned,
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<FilesError> for CardError {
    fn from(err: FilesError) -> Self {
        match err {
            FilesError::NotAnImage => CardError::InvalidImage,
            FilesError::TooLarge { size, limit } => CardError::ImageTooLarge { size, limit },
            other => CardError::Files(other),
        }
    }
}

pub type CardResult<T> = std::result::Result<T, CardError>;
