pub mod citation;
pub mod error;
pub mod request;
pub mod sections;

pub use citation::{Citation, citations_from};
pub use error::ValidationError;
pub use request::{InventionRequest, Mode, PassageMetadata, PriorArtPassage};
pub use sections::{ParsedDocument, Section, extract_claims, normalize_section_name, parse_sections};
