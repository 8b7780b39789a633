pub mod heuristics;
pub mod normalize;
pub mod verifier;

pub use heuristics::{find_secondary, SecondaryLink};
pub use normalize::{is_pdf_content, normalize_candidate, rewrite_alias};
pub use verifier::PdfVerifier;
