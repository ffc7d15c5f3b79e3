pub mod document_reader;
pub mod prompt;
pub mod result_writer;
pub mod retry;

pub use document_reader::read_paragraphs;
pub use prompt::{build_prompt, no_error_sentinel};
pub use result_writer::{save_json, ResultWriter};
pub use retry::{failure_text, is_failure_text, RetryPolicy, COMPLETION_FAILED_MARKER};
