use crate::api::client::ApiClient;
use crate::api::models::FaqEntry;
use adw::prelude::*;
use gtk4 as gtk;
use std::rc::Rc;

pub fn show_faq_dialog(parent: &impl IsA<gtk::Window>, client: ApiClient, on_saved: Rc<dyn Fn()>) {
    let window = adw::Window::builder()
        .transient_for(parent)
        .modal(true)
        .title("Add FAQ")
        .default_width(420)
        .default_height(320)
        .build();

    let toast_overlay = adw::ToastOverlay::new();

    let root = gtk::Box::new(gtk::Orientation::Vertical, 12);
    root.set_margin_top(24);
    root.set_margin_bottom(24);
    root.set_margin_start(24);
    root.set_margin_end(24);

    let question_entry = gtk::Entry::new();
    question_entry.set_placeholder_text(Some("Question"));
    question_entry.set_hexpand(true);
    root.append(&question_entry);

    let answer_view = gtk::TextView::new();
    answer_view.set_wrap_mode(gtk::WrapMode::WordChar);
    answer_view.set_vexpand(true);
    let answer_frame = gtk::Frame::new(Some("Answer"));
    answer_frame.set_child(Some(&answer_view));
    root.append(&answer_frame);

    let save_btn = gtk::Button::with_label("Save");
    save_btn.add_css_class("suggested-action");
    save_btn.set_halign(gtk::Align::End);
    root.append(&save_btn);

    toast_overlay.set_child(Some(&root));
    let container = gtk::Box::new(gtk::Orientation::Vertical, 0);
    container.append(&adw::HeaderBar::new());
    container.append(&toast_overlay);
    window.set_content(Some(&container));

    {
        let window = window.clone();
        save_btn.connect_clicked(move |_| {
            let buffer = answer_view.buffer();
            let entry = FaqEntry {
                question: question_entry.text().trim().to_string(),
                answer: buffer
                    .text(&buffer.start_iter(), &buffer.end_iter(), false)
                    .trim()
                    .to_string(),
            };
            let client = client.clone();
            let overlay = toast_overlay.clone();
            let window = window.clone();
            let on_saved = on_saved.clone();
            glib::spawn_future_local(async move {
                let res = crate::utils::run_on_runtime(async move { client.save_faq(&entry).await }).await;
                match res {
                    Ok(Ok(())) => {
                        on_saved();
                        window.close();
                    }
                    Ok(Err(e)) => overlay.add_toast(adw::Toast::new(&e.to_string())),
                    Err(e) => {
                        log::error!("FAQ save task failed: {}", e);
                        overlay.add_toast(adw::Toast::new("Could not save the FAQ."));
                    }
                }
            });
        });
    }

    window.present();
}
