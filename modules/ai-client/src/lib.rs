pub mod claude;
pub mod error;
pub mod gemini;
pub mod traits;
pub mod util;

pub use claude::Claude;
pub use error::AiError;
pub use gemini::Gemini;
pub use traits::{CompletionModel, ContentPart};
pub use util::{extract_json, strip_code_blocks, truncate_to_char_boundary};
