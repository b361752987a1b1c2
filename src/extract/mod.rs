//! Pattern-based extraction from the route site's pages
//!
//! Extraction is best-effort: a pattern that does not match yields an
//! empty or default value, never an error. Only the nested fetches done by
//! [`parse_routes`] and [`extract_image`] can fail.

mod image;
mod listing;
pub mod normalize;
mod routes;
mod wiki;

pub use image::extract_image;
pub use listing::{parse_listing, ListItem};
pub use normalize::{fix_punctuation, format_tag, normalize_name, path_component};
pub use routes::{next_page_url, parse_route_description, parse_route_rows, parse_routes, RouteRow};
pub use wiki::{field_value, WikiInfo};
