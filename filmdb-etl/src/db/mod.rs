//! Store writer
//!
//! Idempotent writes for canonical movies, genre/director lookup entities,
//! their links, and rating events. Functions take a `SqliteConnection` so
//! the caller decides the transaction boundary.

pub mod directors;
pub mod genres;
pub mod movies;
pub mod ratings;

pub use directors::{get_or_create_director, link_movie_director};
pub use genres::{get_or_create_genre, link_movie_genre};
pub use movies::{load_movie, upsert_movie, StoredMovie};
pub use ratings::{load_ratings, RatingLoadStats};
