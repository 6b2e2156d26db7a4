//! Built-in critical message render used when no abort handler runs.

use std::io::{self, Write};

/// Presents a fatal message to the client.
pub trait CriticalRenderer {
    fn render_critical(&mut self, title: &str, message: &str);
}

/// Writes a minimal HTML error box.
#[derive(Debug)]
pub struct HtmlBox<W> {
    out: W,
}

impl HtmlBox<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> HtmlBox<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> CriticalRenderer for HtmlBox<W> {
    fn render_critical(&mut self, title: &str, message: &str) {
        let html = format!(
            "<div class=\"router-critical\" role=\"alert\">\n  <strong>{}</strong>\n  <p>{}</p>\n</div>\n",
            escape(title),
            escape(message)
        );
        if let Err(e) = self.out.write_all(html.as_bytes()).and_then(|_| self.out.flush()) {
            tracing::warn!(error = %e, "Failed to write critical message");
        }
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
