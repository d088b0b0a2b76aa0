use super::commands::{Command, COMMAND_BOX};
use crate::config::API_KEY_VAR;
use crate::conversation::{ChatHandler, Conversation};
use crate::models::{Result, Temperature};
use crate::renderer::{MarkdownRenderer, TranscriptRenderer};
use crate::transport::Transport;
use colored::*;
use log::info;
use rustyline::{config::Configurer, error::ReadlineError, DefaultEditor};
use std::io::{self, Write};
use std::path::PathBuf;
use terminal_size::{terminal_size, Width};

const HISTORY_FILE: &str = ".codementor_history";

const WELCOME_MESSAGE: &str = "# 🤖 CodeMentor – Programming Tutor\n\n\
Ask me about programming concepts and I will explain them with simple \
examples. I can help with:\n\n\
- Python and C++ fundamentals\n\
- Algorithms and data structures\n";

fn missing_key_message() -> String {
    format!(
        "⚠️ **Warning**: {var} environment variable is not set.\n\n\
To use this chatbot, you need to set your GROQ API key:\n\n\
- **Windows**: `set {var}=your_api_key_here`\n\
- **Linux/Mac**: `export {var}=your_api_key_here`\n\n\
Get your API key from https://console.groq.com",
        var = API_KEY_VAR
    )
}

/// Line-oriented stand-in for a chat widget: reads input, forwards it to the
/// handler and redraws the transcript.
pub struct TerminalUI<T: Transport> {
    handler: ChatHandler<T>,
    conversation: Conversation,
    temperature: Temperature,
    transcript: TranscriptRenderer,
    notices: MarkdownRenderer,
    editor: DefaultEditor,
    history_file: PathBuf,
    width: usize,
}

impl<T: Transport> TerminalUI<T> {
    pub fn new(handler: ChatHandler<T>) -> Result<Self> {
        let width = match terminal_size() {
            Some((Width(w), _)) => (w as usize).saturating_sub(2).max(20),
            None => 80,
        };

        let mut editor = DefaultEditor::new()?;
        editor.set_max_history_size(100)?;

        let history_file = dirs::home_dir()
            .map(|home| home.join(HISTORY_FILE))
            .unwrap_or_else(|| HISTORY_FILE.into());

        if history_file.exists() {
            let _ = editor.load_history(&history_file);
        }

        Ok(Self {
            handler,
            conversation: Conversation::new(),
            temperature: Temperature::default(),
            transcript: TranscriptRenderer::new(width),
            notices: MarkdownRenderer::new(width),
            editor,
            history_file,
            width,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        self.redraw()?;

        loop {
            let prompt = format!("{}", "> ".blue().bold());
            match self.editor.readline(&prompt) {
                Ok(line) => {
                    let command = line
                        .parse::<Command>()
                        .unwrap_or_else(|_| Command::Message(line));
                    match command {
                        Command::Exit => break,
                        Command::Clear => {
                            self.conversation = self.handler.clear();
                            self.redraw()?;
                        }
                        Command::Help => self.show_command_box(),
                        Command::ShowTemperature => {
                            let current = format!("Response creativity: {}", self.temperature);
                            println!("{}", current.green());
                        }
                        Command::SetTemperature(value) => self.set_temperature(value),
                        Command::Message(input) => self.handle_message(input).await?,
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("Use 'exit' to quit");
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => {
                    println!("Error: {}", err);
                    break;
                }
            }
        }

        let _ = self.editor.save_history(&self.history_file);
        Ok(())
    }

    fn set_temperature(&mut self, value: f32) {
        match Temperature::new(value) {
            Ok(temperature) => {
                self.temperature = temperature;
                info!("Temperature set to {}", temperature);
                println!("{}", format!("Response creativity set to {}", temperature).green());
            }
            Err(err) => println!("{}", err.to_string().red()),
        }
    }

    async fn handle_message(&mut self, input: String) -> Result<()> {
        if !input.trim().is_empty() {
            self.editor.add_history_entry(input.trim())?;
            print!("{}", "Thinking...".yellow());
            io::stdout().flush()?;
        }

        let before = self.conversation.len();
        let conversation = std::mem::take(&mut self.conversation);
        let (_input, conversation) = self
            .handler
            .submit(&input, conversation, self.temperature)
            .await;
        self.conversation = conversation;

        if self.conversation.len() != before {
            self.redraw()?;
        }
        Ok(())
    }

    fn redraw(&self) -> Result<()> {
        clearscreen::clear()?;
        if self.conversation.is_empty() {
            println!("{}", self.notices.render(WELCOME_MESSAGE).cyan());
            println!();
            if !self.handler.client().config().has_credential() {
                println!("{}", self.notices.render(&missing_key_message()).yellow());
                println!();
            }
            self.show_command_box();
        } else {
            println!("{}", self.transcript.render(&self.conversation));
            println!();
            println!("{}", "─".repeat(self.width.min(60)).dimmed());
        }
        io::stdout().flush()?;
        Ok(())
    }

    fn show_command_box(&self) {
        println!("{}", COMMAND_BOX.green());
        println!();
    }
}
