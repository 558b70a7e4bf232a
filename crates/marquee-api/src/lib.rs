pub mod poster;
pub mod tmdb;
pub mod traits;

pub use poster::{HttpPosterDownloader, PosterError};
pub use tmdb::{TmdbClient, TmdbError};
pub use traits::{MediaKind, PosterDownloader, SearchCandidate, TitleSearch};
