use crate::renderer::CodeHighlighter;
use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag};
use textwrap::{wrap, Options};

const CODE_INDENT: &str = "    ";

/// Renders assistant replies (markdown) for an ANSI terminal.
pub struct MarkdownRenderer {
    width: usize,
}

impl MarkdownRenderer {
    pub fn new(width: usize) -> Self {
        Self { width }
    }

    pub fn render(&self, text: &str) -> String {
        let mut state = RenderState::new(self.width);
        for event in Parser::new(text) {
            state.handle(event);
        }
        state.finish()
    }
}

struct CodeBlock {
    language: String,
    source: String,
}

struct RenderState {
    width: usize,
    output: String,
    line: String,
    code: Option<CodeBlock>,
    // One entry per open list; `Some(n)` is the next number of an ordered list.
    lists: Vec<Option<u64>>,
    marker: Option<String>,
}

impl RenderState {
    fn new(width: usize) -> Self {
        Self {
            width,
            output: String::new(),
            line: String::with_capacity(256),
            code: None,
            lists: Vec::new(),
            marker: None,
        }
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                self.flush();
                let language = match kind {
                    CodeBlockKind::Fenced(info) => {
                        info.split_whitespace().next().unwrap_or("txt").to_string()
                    }
                    CodeBlockKind::Indented => "txt".to_string(),
                };
                self.code = Some(CodeBlock {
                    language,
                    source: String::new(),
                });
            }
            Event::End(Tag::CodeBlock(_)) => {
                if let Some(block) = self.code.take() {
                    self.output.push('\n');
                    self.output.push_str(&CodeHighlighter::global().highlight(
                        &block.source,
                        &block.language,
                        CODE_INDENT,
                    ));
                    self.output.push('\n');
                }
            }
            Event::Text(text) => match self.code.as_mut() {
                Some(block) => block.source.push_str(&text),
                None => self.line.push_str(&text),
            },
            Event::Start(Tag::Heading(..)) => {
                self.flush();
                self.line.push_str("\x1B[1m");
            }
            Event::End(Tag::Heading(..)) => {
                self.line.push_str("\x1B[22m");
                self.flush();
                self.output.push('\n');
            }
            Event::Start(Tag::List(start)) => {
                self.flush();
                self.lists.push(start);
            }
            Event::End(Tag::List(_)) => {
                self.flush();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.output.push('\n');
                }
            }
            Event::Start(Tag::Item) => {
                self.flush();
                let marker = match self.lists.last_mut() {
                    Some(Some(next)) => {
                        let marker = format!("{}. ", next);
                        *next += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                self.marker = Some(marker);
            }
            Event::End(Tag::Item) | Event::Start(Tag::Paragraph) | Event::HardBreak => {
                self.flush()
            }
            Event::End(Tag::Paragraph) => {
                self.flush();
                if self.lists.is_empty() {
                    self.output.push('\n');
                }
            }
            Event::Start(Tag::Emphasis) => self.line.push_str("\x1B[3m"),
            Event::End(Tag::Emphasis) => self.line.push_str("\x1B[23m"),
            Event::Start(Tag::Strong) => self.line.push_str("\x1B[1m"),
            Event::End(Tag::Strong) => self.line.push_str("\x1B[22m"),
            Event::Code(code) => {
                self.line.push('`');
                self.line.push_str(&code);
                self.line.push('`');
            }
            Event::SoftBreak => self.line.push(' '),
            Event::Rule => {
                self.flush();
                self.output.push_str("  ");
                self.output.push_str(&"─".repeat(self.width.saturating_sub(4).min(40)));
                self.output.push_str("\n\n");
            }
            _ => {}
        }
    }

    fn flush(&mut self) {
        let text = self.line.trim();
        if text.is_empty() {
            self.line.clear();
            return;
        }

        let base = "  ".repeat(self.lists.len().max(1));
        let (initial, subsequent) = match self.marker.take() {
            Some(marker) => {
                let hanging = " ".repeat(base.len() + marker.chars().count());
                (format!("{}{}", base, marker), hanging)
            }
            None => (base.clone(), base),
        };
        let options = Options::new(self.width)
            .initial_indent(&initial)
            .subsequent_indent(&subsequent);

        for line in wrap(text, &options) {
            self.output.push_str(&line);
            self.output.push('\n');
        }
        self.line.clear();
    }

    fn finish(mut self) -> String {
        self.flush();
        self.output.trim_end().to_string()
    }
}
