mod news;
mod traits;

pub use news::SqliteNewsRepository;
pub use traits::{InsertOutcome, ListNewsParams, NewsRepository};
