mod api;
mod app;
mod error;
mod faq;
mod locations;
mod render;
mod session;
mod storage;
mod ui;
mod utils;
mod voice;

use adw::prelude::*;
use adw::Application;

static GLIB_LOGGER: glib::GlibLogger =
    glib::GlibLogger::new(glib::GlibLoggerFormat::Plain, glib::GlibLoggerDomain::CrateTarget);

fn main() -> glib::ExitCode {
    // Records go through g_log; G_MESSAGES_DEBUG=all shows debug output.
    if log::set_logger(&GLIB_LOGGER).is_ok() {
        log::set_max_level(log::LevelFilter::Debug);
    }

    let app = Application::builder()
        .application_id("com.example.CampusAssistant")
        .build();
    let activation = crate::app::Activation::default();
    app.connect_activate(move |app| crate::app::activate(app, &activation));
    app.run()
}
