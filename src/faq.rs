use crate::api::models::FaqEntry;

pub const NO_FAQS_MESSAGE: &str = "No FAQs found matching your search.";

/// Case-insensitive substring match on question or answer.
pub fn filter_faqs(entries: &[FaqEntry], query: &str) -> Vec<FaqEntry> {
    let query = query.trim().to_lowercase();
    entries
        .iter()
        .filter(|e| {
            query.is_empty()
                || e.question.to_lowercase().contains(&query)
                || e.answer.to_lowercase().contains(&query)
        })
        .cloned()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaqListing {
    Empty,
    /// Pango markup, one card per entry.
    Cards(Vec<String>),
}

impl FaqListing {
    pub fn from_entries(entries: &[FaqEntry]) -> Self {
        if entries.is_empty() {
            return FaqListing::Empty;
        }
        FaqListing::Cards(entries.iter().map(card_markup).collect())
    }
}

fn card_markup(entry: &FaqEntry) -> String {
    format!(
        "<b>{}</b>\n{}",
        glib::markup_escape_text(&entry.question),
        glib::markup_escape_text(&entry.answer)
    )
}
