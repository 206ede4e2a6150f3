use crate::locations::{map_search_url, LOCATIONS};
use adw::prelude::*;
use gtk4 as gtk;

fn open_location(name: &str) -> Result<(), String> {
    let url = map_search_url(name).map_err(|e| e.to_string())?;
    log::debug!("Opening map for {}: {}", name, url);
    gtk::gio::AppInfo::launch_default_for_uri(url.as_str(), None::<&gtk::gio::AppLaunchContext>)
        .map_err(|e| e.to_string())
}

pub fn show_locations_window(parent: &impl IsA<gtk::Window>) {
    let window = adw::Window::builder()
        .transient_for(parent)
        .modal(true)
        .title("Campus Locations")
        .default_width(420)
        .default_height(560)
        .build();

    let overlay = adw::ToastOverlay::new();
    let scroller = gtk::ScrolledWindow::builder()
        .vexpand(true)
        .hscrollbar_policy(gtk::PolicyType::Never)
        .build();
    let list = gtk::Box::new(gtk::Orientation::Vertical, 2);
    list.set_margin_top(8);
    list.set_margin_bottom(8);
    list.set_margin_start(8);
    list.set_margin_end(8);

    for name in LOCATIONS {
        let btn = gtk::Button::with_label(name);
        btn.add_css_class("flat");
        if let Some(label) = btn.child().and_downcast::<gtk::Label>() {
            label.set_xalign(0.0);
            label.set_wrap(true);
        }
        let overlay = overlay.clone();
        btn.connect_clicked(move |_| {
            if let Err(e) = open_location(name) {
                log::error!("Could not open map for {}: {}", name, e);
                overlay.add_toast(adw::Toast::new("Could not open the map."));
            }
        });
        list.append(&btn);
    }
    scroller.set_child(Some(&list));
    overlay.set_child(Some(&scroller));

    let container = gtk::Box::new(gtk::Orientation::Vertical, 0);
    container.append(&adw::HeaderBar::new());
    container.append(&overlay);
    window.set_content(Some(&container));
    window.present();
}
