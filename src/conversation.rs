use crate::client::ChatClient;
use crate::models::{Temperature, Turn};
use crate::transport::{ReqwestTransport, Transport};
use log::debug;

/// Chronological list of turns for one session. Owned by the caller and
/// threaded through [`ChatHandler::submit`] by value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Turn> {
        self.turns.iter()
    }
}

impl FromIterator<Turn> for Conversation {
    fn from_iter<I: IntoIterator<Item = Turn>>(iter: I) -> Self {
        Self {
            turns: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Conversation {
    type Item = &'a Turn;
    type IntoIter = std::slice::Iter<'a, Turn>;

    fn into_iter(self) -> Self::IntoIter {
        self.turns.iter()
    }
}

/// The two callbacks a front end wires up: submitting text and clearing the
/// chat.
pub struct ChatHandler<T = ReqwestTransport> {
    client: ChatClient<T>,
}

impl<T: Transport> ChatHandler<T> {
    pub fn new(client: ChatClient<T>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ChatClient<T> {
        &self.client
    }

    /// Appends the user's turn and the reply (or error text) and hands back
    /// an empty input field with the updated conversation. Blank input
    /// leaves the conversation untouched.
    pub async fn submit(
        &self,
        user_text: &str,
        mut conversation: Conversation,
        temperature: Temperature,
    ) -> (String, Conversation) {
        if user_text.trim().is_empty() {
            return (String::new(), conversation);
        }

        conversation.push(Turn::user(user_text));
        debug!("Submitting turn {} of conversation", conversation.len());

        let reply = self.client.send(conversation.turns(), temperature).await;
        conversation.push(Turn::assistant(reply));

        (String::new(), conversation)
    }

    pub fn clear(&self) -> Conversation {
        Conversation::new()
    }
}
