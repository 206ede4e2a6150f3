use crate::api::models::{ChatTurn, Sender};
use once_cell::sync::Lazy;
use regex::Regex;

static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://[^\s*]+").expect("valid url regex"));
static BOLD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("valid bold regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnBody {
    Plain(String),
    Markup(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnAction {
    Copy,
    Speak,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTurn {
    pub sender: Sender,
    pub body: TurnBody,
    /// Visible text of the message, without any action controls.
    pub copy_text: String,
    /// Raw text handed to the speech synthesizer.
    pub speech_text: String,
    pub actions: Vec<TurnAction>,
}

pub fn render(turn: &ChatTurn) -> RenderedTurn {
    match turn.sender {
        Sender::User => RenderedTurn {
            sender: Sender::User,
            body: TurnBody::Plain(turn.text.clone()),
            copy_text: turn.text.trim().to_string(),
            speech_text: turn.text.clone(),
            actions: vec![TurnAction::Copy],
        },
        Sender::Bot => RenderedTurn {
            sender: Sender::Bot,
            body: TurnBody::Markup(format_bot_text(&turn.text)),
            copy_text: visible_text(&turn.text),
            speech_text: turn.text.clone(),
            actions: vec![TurnAction::Copy, TurnAction::Speak],
        },
    }
}

/// Escape, then links, then bold, then line breaks. Escaping has to come
/// first or the inserted tags would be escaped too.
pub fn format_bot_text(text: &str) -> String {
    let escaped = glib::markup_escape_text(text);
    let linked = URL_RE.replace_all(escaped.as_str(), r#"<a href="${0}">${0}</a>"#);
    let bolded = BOLD_RE.replace_all(&linked, "<b>${1}</b>");
    bolded.replace("\r\n", "\n")
}

fn visible_text(text: &str) -> String {
    BOLD_RE.replace_all(text, "${1}").trim().to_string()
}
