use crate::api::client::ApiClient;
use crate::api::models::FaqEntry;
use crate::faq::{filter_faqs, FaqListing, NO_FAQS_MESSAGE};
use gtk4 as gtk;
use gtk4::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

/// FAQ list with a search box. The list is fetched from the backend every
/// time the panel is shown and filtered locally while typing.
pub struct AdminPanel {
    root: gtk::Box,
    search: gtk::SearchEntry,
    list: gtk::ListBox,
    pub add_btn: gtk::Button,
    faqs: RefCell<Vec<FaqEntry>>,
    client: ApiClient,
}

impl AdminPanel {
    pub fn new(client: ApiClient) -> Rc<Self> {
        let root = gtk::Box::new(gtk::Orientation::Vertical, 6);
        root.set_margin_top(8);
        root.set_margin_bottom(8);
        root.set_margin_start(8);
        root.set_margin_end(8);

        let header = gtk::Box::new(gtk::Orientation::Horizontal, 6);
        let title = gtk::Label::new(Some("Frequently Asked Questions"));
        title.add_css_class("heading");
        title.set_halign(gtk::Align::Start);
        title.set_hexpand(true);
        header.append(&title);
        let add_btn = gtk::Button::with_label("Add FAQ");
        add_btn.add_css_class("suggested-action");
        header.append(&add_btn);
        root.append(&header);

        let search = gtk::SearchEntry::new();
        search.set_placeholder_text(Some("Search FAQs"));
        root.append(&search);

        let scroller = gtk::ScrolledWindow::builder().vexpand(true).build();
        let list = gtk::ListBox::new();
        list.set_selection_mode(gtk::SelectionMode::None);
        list.add_css_class("boxed-list");
        scroller.set_child(Some(&list));
        root.append(&scroller);

        let panel = Rc::new(Self {
            root,
            search,
            list,
            add_btn,
            faqs: RefCell::new(Vec::new()),
            client,
        });
        {
            let panel_for_search = panel.clone();
            panel.search.connect_search_changed(move |_| panel_for_search.refresh());
        }
        panel
    }

    pub fn widget(&self) -> gtk::Widget {
        self.root.clone().upcast()
    }

    pub fn reload(self: &Rc<Self>) {
        let panel = self.clone();
        let client = self.client.clone();
        glib::spawn_future_local(async move {
            let faqs = match crate::utils::run_on_runtime(async move { client.faqs().await }).await {
                Ok(faqs) => faqs,
                Err(e) => {
                    log::error!("FAQ load task failed: {}", e);
                    Vec::new()
                }
            };
            *panel.faqs.borrow_mut() = faqs;
            panel.refresh();
        });
    }

    fn refresh(&self) {
        let query = self.search.text();
        let filtered = filter_faqs(&self.faqs.borrow(), &query);
        self.set_items(&filtered);
    }

    fn set_items(&self, items: &[FaqEntry]) {
        while let Some(child) = self.list.first_child() {
            self.list.remove(&child);
        }
        match FaqListing::from_entries(items) {
            FaqListing::Empty => {
                let label = gtk::Label::new(Some(NO_FAQS_MESSAGE));
                label.add_css_class("dim-label");
                label.set_margin_top(20);
                label.set_margin_bottom(20);
                self.list.append(&label);
            }
            FaqListing::Cards(cards) => {
                for markup in cards {
                    let row = gtk::ListBoxRow::new();
                    let label = gtk::Label::new(None);
                    label.set_markup(&markup);
                    label.set_wrap(true);
                    label.set_xalign(0.0);
                    label.set_margin_top(8);
                    label.set_margin_bottom(8);
                    label.set_margin_start(8);
                    label.set_margin_end(8);
                    row.set_child(Some(&label));
                    self.list.append(&row);
                }
            }
        }
    }
}
