use crate::api::client::ApiClient;
use crate::app::Settings;
use crate::session::{submit_user_message, ChatSession};
use crate::storage::{HistoryStore, SqliteStore, Theme, ThemeStore};
use crate::ui::admin_panel::AdminPanel;
use crate::ui::chat_view::ChatWidgets;
use crate::voice::{ListenState, VoiceIo};
use adw::prelude::*;
use adw::Application;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

type Session = ChatSession<Rc<SqliteStore>, ChatWidgets>;

fn apply_theme(theme: Theme) {
    let scheme = match theme {
        Theme::Dark => adw::ColorScheme::ForceDark,
        Theme::Light => adw::ColorScheme::ForceLight,
    };
    adw::StyleManager::default().set_color_scheme(scheme);
}

/// Sends `text` through the session without blocking the main loop.
fn submit(session: &Rc<RefCell<Session>>, client: &Rc<ApiClient>, text: String) {
    let session = session.clone();
    let client = client.clone();
    glib::spawn_future_local(async move {
        submit_user_message(&*session, &*client, &text).await;
    });
}

pub fn show_main_window(app: &Application, settings: &Settings, store: Rc<SqliteStore>) {
    let window = adw::ApplicationWindow::builder()
        .application(app)
        .title("SVU Campus Assistant")
        .default_width(960)
        .default_height(640)
        .build();

    let themes = ThemeStore::new(store.clone());
    let theme = Rc::new(Cell::new(themes.load()));
    apply_theme(theme.get());

    let voice = Rc::new(VoiceIo::detect(&settings.speech));
    let client = Rc::new(ApiClient::new(&settings.api_url));
    log::info!("Using assistant backend at {}", client.base_url());

    let overlay = adw::ToastOverlay::new();
    let stack = adw::ViewStack::new();

    let chat = ChatWidgets::new(voice.synthesizer.clone(), voice.recognizer.is_available());
    stack.add_titled_with_icon(&chat.widget(), Some("chat"), "Chat", "user-available-symbolic");
    let session = Rc::new(RefCell::new(ChatSession::restore(
        HistoryStore::new(store.clone()),
        chat.clone(),
    )));

    let admin = AdminPanel::new((*client).clone());
    stack.add_titled_with_icon(&admin.widget(), Some("admin"), "Admin", "preferences-system-symbolic");
    overlay.set_child(Some(&stack));

    let container = gtk4::Box::new(gtk4::Orientation::Vertical, 0);
    let header = adw::HeaderBar::new();
    let switcher = adw::ViewSwitcher::builder()
        .stack(&stack)
        .policy(adw::ViewSwitcherPolicy::Wide)
        .build();
    header.set_title_widget(Some(&switcher));

    let locations_btn = gtk4::Button::with_label("Locations");
    header.pack_start(&locations_btn);
    let theme_btn = gtk4::Button::with_label(theme.get().toggle_label());
    header.pack_end(&theme_btn);
    let clear_btn = gtk4::Button::from_icon_name("user-trash-symbolic");
    clear_btn.set_tooltip_text(Some("Clear conversation"));
    header.pack_end(&clear_btn);

    container.append(&header);
    container.append(&overlay);
    window.set_content(Some(&container));
    window.present();
    chat.entry.grab_focus();

    // Typed input
    {
        let session = session.clone();
        let client = client.clone();
        let entry = chat.entry.clone();
        let send: Rc<dyn Fn()> = Rc::new(move || submit(&session, &client, entry.text().to_string()));
        {
            let send = send.clone();
            chat.send_btn.connect_clicked(move |_| (send)());
        }
        {
            let send = send.clone();
            chat.entry.connect_activate(move |_| (send)());
        }
    }

    for (btn, question) in &chat.quick_buttons {
        let session = session.clone();
        let client = client.clone();
        let question = *question;
        btn.connect_clicked(move |_| submit(&session, &client, question.to_string()));
    }

    // Voice input: a transcript is submitted as if typed
    {
        let session = session.clone();
        let client = client.clone();
        let voice = voice.clone();
        let chat_for_mic = chat.clone();
        chat.mic_btn.connect_clicked(move |_| {
            if voice.recognizer.state() == ListenState::Listening {
                voice.recognizer.stop();
                return;
            }
            let capture = voice.recognizer.listen();
            chat_for_mic.set_listening(true);
            let session = session.clone();
            let client = client.clone();
            let chat = chat_for_mic.clone();
            glib::spawn_future_local(async move {
                let transcript = capture.await;
                chat.set_listening(false);
                if let Some(text) = transcript {
                    chat.entry.set_text(&text);
                    submit_user_message(&*session, &*client, &text).await;
                }
            });
        });
    }

    {
        let session = session.clone();
        clear_btn.connect_clicked(move |_| session.borrow_mut().clear_conversation());
    }

    {
        let theme = theme.clone();
        theme_btn.connect_clicked(move |btn| {
            let next = theme.get().toggled();
            theme.set(next);
            apply_theme(next);
            themes.save(next);
            btn.set_label(next.toggle_label());
        });
    }

    {
        let voice = voice.clone();
        window.connect_close_request(move |_| {
            voice.synthesizer.cancel();
            glib::Propagation::Proceed
        });
    }

    {
        let window = window.clone();
        locations_btn.connect_clicked(move |_| crate::ui::locations::show_locations_window(&window));
    }

    {
        let admin_for_switch = admin.clone();
        stack.connect_visible_child_name_notify(move |s| {
            if s.visible_child_name().as_deref() == Some("admin") {
                admin_for_switch.reload();
            }
        });
    }

    {
        let window = window.clone();
        let admin_for_dialog = admin.clone();
        let client = client.clone();
        admin.add_btn.connect_clicked(move |_| {
            let admin = admin_for_dialog.clone();
            let on_saved: Rc<dyn Fn()> = Rc::new(move || admin.reload());
            crate::ui::faq_dialog::show_faq_dialog(&window, (*client).clone(), on_saved);
        });
    }
}
