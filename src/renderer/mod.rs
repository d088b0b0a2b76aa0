mod markdown;
mod syntax;
mod transcript;

pub use markdown::MarkdownRenderer;
pub use syntax::CodeHighlighter;
pub use transcript::TranscriptRenderer;
