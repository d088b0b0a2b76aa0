use crate::conversation::Conversation;
use crate::models::{ChatError, Role, Turn};
use crate::renderer::MarkdownRenderer;
use colored::*;
use textwrap::{wrap, Options};

/// Draws a whole conversation the way a chat widget would: one labelled
/// block per turn, oldest first.
pub struct TranscriptRenderer {
    markdown: MarkdownRenderer,
    width: usize,
}

impl TranscriptRenderer {
    pub fn new(width: usize) -> Self {
        Self {
            markdown: MarkdownRenderer::new(width),
            width,
        }
    }

    pub fn render(&self, conversation: &Conversation) -> String {
        let mut output = String::new();
        for turn in conversation {
            output.push_str(&self.render_turn(turn));
            output.push_str("\n\n");
        }
        output.trim_end().to_string()
    }

    pub fn render_turn(&self, turn: &Turn) -> String {
        let time = turn.sent_at().format("%H:%M").to_string();
        match turn.role() {
            Role::User => format!(
                "{} {}\n{}",
                "You".blue().bold(),
                time.dimmed(),
                self.plain(turn.content())
            ),
            Role::Assistant if ChatError::is_error_reply(turn.content()) => format!(
                "{} {}\n{}",
                "CodeMentor".cyan().bold(),
                time.dimmed(),
                self.plain(turn.content()).red()
            ),
            Role::Assistant => format!(
                "{} {}\n{}",
                "CodeMentor".cyan().bold(),
                time.dimmed(),
                self.markdown.render(turn.content()).cyan()
            ),
            Role::System => self.plain(turn.content()).dimmed().to_string(),
        }
    }

    fn plain(&self, text: &str) -> String {
        let options = Options::new(self.width)
            .initial_indent("  ")
            .subsequent_indent("  ");
        wrap(text.trim_end(), &options).join("\n")
    }
}
