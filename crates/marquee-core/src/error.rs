use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarqueeError {
    #[error("config error: {0}")]
    Config(String),

    #[error("dictionary error: {0}")]
    Dictionary(#[from] marquee_parse::DictionaryError),

    #[error("API error: {0}")]
    Api(#[from] marquee_api::TmdbError),

    #[error("poster error: {0}")]
    Poster(#[from] marquee_api::PosterError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
