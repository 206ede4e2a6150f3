use crate::api::models::Sender;
use crate::render::{RenderedTurn, TurnAction, TurnBody};
use crate::session::ChatView;
use crate::voice::Synthesizer;
use gtk4 as gtk;
use gtk4::prelude::*;
use std::rc::Rc;
use std::time::Duration;

const INPUT_PLACEHOLDER: &str = "Ask anything... (Type or Speak)";
const COPY_ICON: &str = "edit-copy-symbolic";

pub const QUICK_QUESTIONS: &[&str] = &[
    "What courses does SVU offer?",
    "What are the library timings?",
    "How do I apply for a hostel?",
    "Where is the examination section?",
];

/// Widgets of the chat page. Cheap to clone: every field is a GTK handle.
#[derive(Clone)]
pub struct ChatWidgets {
    root: gtk::Box,
    scroller: gtk::ScrolledWindow,
    messages_box: gtk::Box,
    placeholder: gtk::Box,
    typing: gtk::Box,
    pub entry: gtk::Entry,
    pub send_btn: gtk::Button,
    pub mic_btn: gtk::Button,
    pub quick_buttons: Vec<(gtk::Button, &'static str)>,
    synthesizer: Rc<Synthesizer>,
}

impl ChatWidgets {
    pub fn new(synthesizer: Rc<Synthesizer>, can_listen: bool) -> Self {
        let root = gtk::Box::new(gtk::Orientation::Vertical, 6);
        root.set_margin_top(8);
        root.set_margin_bottom(8);
        root.set_margin_start(8);
        root.set_margin_end(8);

        let scroller = gtk::ScrolledWindow::builder()
            .vexpand(true)
            .hexpand(true)
            .hscrollbar_policy(gtk::PolicyType::Never)
            .build();
        let content = gtk::Box::new(gtk::Orientation::Vertical, 12);

        // Welcome screen, shown while the conversation is empty
        let placeholder = gtk::Box::new(gtk::Orientation::Vertical, 8);
        placeholder.set_valign(gtk::Align::Center);
        placeholder.set_vexpand(true);
        let title = gtk::Label::new(Some("SVU Campus Assistant"));
        title.add_css_class("title-1");
        placeholder.append(&title);
        let subtitle = gtk::Label::new(Some("Ask about admissions, departments, hostels and more."));
        subtitle.add_css_class("dim-label");
        placeholder.append(&subtitle);
        let mut quick_buttons = Vec::new();
        for question in QUICK_QUESTIONS {
            let btn = gtk::Button::with_label(question);
            btn.add_css_class("pill");
            btn.set_halign(gtk::Align::Center);
            placeholder.append(&btn);
            quick_buttons.push((btn, *question));
        }
        content.append(&placeholder);

        let messages_box = gtk::Box::new(gtk::Orientation::Vertical, 10);
        content.append(&messages_box);

        let typing = gtk::Box::new(gtk::Orientation::Horizontal, 6);
        let spinner = gtk::Spinner::new();
        spinner.start();
        typing.append(&spinner);
        let typing_lbl = gtk::Label::new(Some("Assistant is typing…"));
        typing_lbl.add_css_class("dim-label");
        typing.append(&typing_lbl);
        typing.set_visible(false);
        content.append(&typing);

        scroller.set_child(Some(&content));
        root.append(&scroller);

        // Input row
        let input_row = gtk::Box::new(gtk::Orientation::Horizontal, 6);
        let entry = gtk::Entry::new();
        entry.set_hexpand(true);
        entry.set_placeholder_text(Some(INPUT_PLACEHOLDER));
        let mic_btn = gtk::Button::from_icon_name("audio-input-microphone-symbolic");
        mic_btn.set_tooltip_text(Some("Speak"));
        mic_btn.set_visible(can_listen);
        let send_btn = gtk::Button::with_label("Send");
        send_btn.add_css_class("suggested-action");
        input_row.append(&entry);
        input_row.append(&mic_btn);
        input_row.append(&send_btn);
        root.append(&input_row);

        Self {
            root,
            scroller,
            messages_box,
            placeholder,
            typing,
            entry,
            send_btn,
            mic_btn,
            quick_buttons,
            synthesizer,
        }
    }

    pub fn widget(&self) -> gtk::Widget {
        self.root.clone().upcast()
    }

    pub fn set_listening(&self, listening: bool) {
        if listening {
            self.mic_btn.add_css_class("destructive-action");
            self.entry.set_placeholder_text(Some("Listening..."));
        } else {
            self.mic_btn.remove_css_class("destructive-action");
            self.entry.set_placeholder_text(Some(INPUT_PLACEHOLDER));
        }
    }

    fn action_button(&self, action: TurnAction, turn: &RenderedTurn) -> Option<gtk::Button> {
        match action {
            TurnAction::Copy => {
                let btn = gtk::Button::from_icon_name(COPY_ICON);
                btn.set_tooltip_text(Some("Copy Text"));
                let text = turn.copy_text.clone();
                btn.connect_clicked(move |b| copy_to_clipboard(b, &text));
                Some(btn)
            }
            TurnAction::Speak => {
                if !self.synthesizer.is_available() {
                    return None;
                }
                let btn = gtk::Button::from_icon_name("audio-volume-high-symbolic");
                btn.set_tooltip_text(Some("Read Aloud"));
                let synthesizer = self.synthesizer.clone();
                let text = turn.speech_text.clone();
                btn.connect_clicked(move |_| synthesizer.speak(&text));
                Some(btn)
            }
        }
    }
}

fn copy_to_clipboard(btn: &gtk::Button, text: &str) {
    btn.clipboard().set_text(text);
    btn.set_icon_name("object-select-symbolic");
    let btn = btn.clone();
    glib::timeout_add_local_once(Duration::from_millis(1500), move || {
        btn.set_icon_name(COPY_ICON);
    });
}

impl ChatView for ChatWidgets {
    fn set_placeholder_visible(&self, visible: bool) {
        self.placeholder.set_visible(visible);
    }

    fn append_turn(&self, turn: &RenderedTurn) {
        let row = gtk::Box::new(gtk::Orientation::Horizontal, 8);
        let bubble = gtk::Box::new(gtk::Orientation::Vertical, 4);
        bubble.add_css_class("card");

        let label = gtk::Label::new(None);
        label.set_wrap(true);
        label.set_wrap_mode(gtk::pango::WrapMode::WordChar);
        label.set_selectable(true);
        label.set_xalign(0.0);
        label.set_margin_top(8);
        label.set_margin_start(10);
        label.set_margin_end(10);
        match &turn.body {
            TurnBody::Plain(text) => label.set_text(text),
            TurnBody::Markup(markup) => label.set_markup(markup),
        }
        bubble.append(&label);

        let actions = gtk::Box::new(gtk::Orientation::Horizontal, 2);
        actions.set_margin_bottom(4);
        actions.set_margin_start(6);
        actions.set_margin_end(6);
        for action in &turn.actions {
            if let Some(btn) = self.action_button(*action, turn) {
                btn.add_css_class("flat");
                actions.append(&btn);
            }
        }
        bubble.append(&actions);

        match turn.sender {
            Sender::Bot => {
                let avatar = gtk::Image::from_icon_name("help-browser-symbolic");
                avatar.set_valign(gtk::Align::Start);
                avatar.set_pixel_size(24);
                row.append(&avatar);
                row.set_halign(gtk::Align::Start);
            }
            Sender::User => {
                actions.set_halign(gtk::Align::End);
                row.set_halign(gtk::Align::End);
            }
        }
        row.append(&bubble);
        self.messages_box.append(&row);
    }

    fn remove_all_turns(&self) {
        while let Some(child) = self.messages_box.first_child() {
            self.messages_box.remove(&child);
        }
    }

    fn set_typing_visible(&self, visible: bool) {
        self.typing.set_visible(visible);
    }

    fn clear_input(&self) {
        self.entry.set_text("");
    }

    fn focus_input(&self) {
        self.entry.grab_focus();
    }

    fn scroll_to_bottom(&self) {
        // Wait for the new rows to be allocated before reading the range.
        let scroller = self.scroller.clone();
        glib::idle_add_local_once(move || {
            let adj = scroller.vadjustment();
            adj.set_value(adj.upper());
        });
    }
}
