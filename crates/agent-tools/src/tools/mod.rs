//! Built-in collaborator implementations.

mod gif_search;
mod html;
mod web_search;

pub use gif_search::TenorGifs;
pub use html::{decode_entities, strip_tags};
pub use web_search::{parse_results, DuckDuckGoSearch};
