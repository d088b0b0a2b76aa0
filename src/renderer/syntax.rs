use std::sync::OnceLock;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::{as_24_bit_terminal_escaped, LinesWithEndings};

static HIGHLIGHTER: OnceLock<CodeHighlighter> = OnceLock::new();

const THEME: &str = "base16-ocean.dark";

/// Loaded once; syntect's default sets are expensive to build.
pub struct CodeHighlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
}

impl CodeHighlighter {
    pub fn global() -> &'static CodeHighlighter {
        HIGHLIGHTER.get_or_init(Self::new)
    }

    fn new() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
        }
    }

    fn syntax_for(&self, language: &str) -> &SyntaxReference {
        self.syntax_set
            .find_syntax_by_token(language)
            .or_else(|| self.syntax_set.find_syntax_by_extension(language))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text())
    }

    fn theme(&self) -> Option<&Theme> {
        self.theme_set.themes.get(THEME)
    }

    /// Terminal-escaped rendition of `code`, every line prefixed by `indent`.
    /// Falls back to the raw text for lines syntect cannot handle.
    pub fn highlight(&self, code: &str, language: &str, indent: &str) -> String {
        let mut output = String::with_capacity(code.len() * 2);
        let mut highlighter = self
            .theme()
            .map(|theme| HighlightLines::new(self.syntax_for(language), theme));

        for line in LinesWithEndings::from(code) {
            output.push_str(indent);
            let highlighted = highlighter
                .as_mut()
                .and_then(|h| h.highlight_line(line, &self.syntax_set).ok());
            match highlighted {
                Some(ranges) => output.push_str(&as_24_bit_terminal_escaped(&ranges[..], false)),
                None => output.push_str(line),
            }
        }
        if !output.ends_with('\n') {
            output.push('\n');
        }
        // Reset so colours do not bleed into the following text.
        output.push_str("\x1B[0m");
        output
    }
}
