//! HTML for the single stylist page.
//!
//! The page is rendered server-side in one pass: sidebar form, wardrobe preview and
//! the recommendation panel. User input goes through [`html_escape`]; the model's
//! reply is Markdown and goes through [`render_markdown`], which never passes raw HTML.

use crate::llm::models::BackendKind;
use crate::stylist::Suggestion;
use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};

pub const DEFAULT_OCCASION: &str = "A semi-formal evening dinner party on a cool autumn night.";
pub const OCCASION_PLACEHOLDER: &str =
    "Example: Casual Saturday lunch with friends, mid-afternoon.";

/// What the page shows for this request
#[derive(Debug, Clone)]
pub enum PageState {
    /// Fresh page, nothing submitted
    Idle,
    /// Submission was rejected before any backend call
    Warning {
        message: String,
        preview: Option<String>,
    },
    /// One backend call was made; show its outcome
    Showing {
        preview: Option<String>,
        suggestion: Suggestion,
    },
}

/// Per-backend look and copy
#[derive(Debug, Clone)]
pub struct Theme {
    pub kind: BackendKind,
    pub model: String,
}

impl Theme {
    pub fn new(kind: BackendKind, model: impl Into<String>) -> Self {
        Self {
            kind,
            model: model.into(),
        }
    }

    pub fn title(&self) -> String {
        format!("The Muse - now powered by {}", self.kind.display_name())
    }

    fn waiting_text(&self) -> String {
        match self.kind {
            BackendKind::Local => format!(
                "Waiting for image upload. Ensure Ollama is running and {} is pulled!",
                self.model
            ),
            BackendKind::Cloud => "Waiting for image upload...".to_string(),
        }
    }

    fn spinner_text(&self) -> String {
        match self.kind {
            BackendKind::Local => {
                format!("Analyzing wardrobe with {} and styling the look...", self.model)
            }
            BackendKind::Cloud => "Analyzing wardrobe and styling the perfect look...".to_string(),
        }
    }

    fn css(&self) -> &'static str {
        match self.kind {
            BackendKind::Local => LOCAL_CSS,
            BackendKind::Cloud => CLOUD_CSS,
        }
    }
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Markdown to HTML for model replies.
///
/// Raw HTML blocks and inline tags come out as escaped text; `javascript:`,
/// `vbscript:` and `data:` link and image targets are replaced with `#`.
pub fn render_markdown(text: &str) -> String {
    let parser = Parser::new_ext(text, Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH)
        .map(|event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            }) => Event::Start(Tag::Link {
                link_type,
                dest_url: safe_url(dest_url),
                title,
                id,
            }),
            Event::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            }) => Event::Start(Tag::Image {
                link_type,
                dest_url: safe_url(dest_url),
                title,
                id,
            }),
            other => other,
        });

    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

fn safe_url(url: CowStr<'_>) -> CowStr<'_> {
    let scheme = url.trim_start().to_ascii_lowercase();
    if ["javascript:", "vbscript:", "data:"]
        .iter()
        .any(|prefix| scheme.starts_with(prefix))
    {
        CowStr::Borrowed("#")
    } else {
        url
    }
}

/// Render the whole page. `occasion` refills the textarea.
pub fn render(theme: &Theme, state: &PageState, occasion: &str) -> String {
    let title = html_escape(&theme.title());

    let warning = match state {
        PageState::Warning { message, .. } => {
            format!(r#"<div class="alert warning">{}</div>"#, html_escape(message))
        }
        _ => String::new(),
    };

    let preview_uri = match state {
        PageState::Warning { preview, .. } | PageState::Showing { preview, .. } => {
            preview.as_deref()
        }
        PageState::Idle => None,
    };

    let preview = match preview_uri {
        Some(data_uri) => format!(
            r#"<img class="preview" src="{}" alt="Your Wardrobe"><p class="caption">Your Wardrobe</p>"#,
            html_escape(data_uri)
        ),
        None => format!(
            r#"<div class="alert info">{}</div>"#,
            html_escape(&theme.waiting_text())
        ),
    };

    let recommendation = match state {
        PageState::Showing { suggestion, .. } => {
            let class = if suggestion.is_ready() {
                "suggestion"
            } else {
                "suggestion failed"
            };
            format!(
                r#"<div class="{}">{}</div>"#,
                class,
                render_markdown(suggestion.text())
            )
        }
        _ => String::new(),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<style>{base_css}{theme_css}</style>
</head>
<body>
<aside class="sidebar">
  <h2>Input Your Wardrobe &amp; Occasion</h2>
  <form id="stylist-form" method="post" action="/suggest" enctype="multipart/form-data">
    <label for="wardrobe">Upload a clear image of your wardrobe:</label>
    <input type="file" id="wardrobe" name="wardrobe" accept=".jpg,.jpeg,.png,image/jpeg,image/png">
    <hr>
    <label for="occasion">Describe the occasion, time of day, and formality:</label>
    <textarea id="occasion" name="occasion" rows="4" placeholder="{placeholder}">{occasion}</textarea>
    <p class="ready">Ready to get styled?</p>
    <button type="submit">Get Outfit Suggestion</button>
  </form>
  {warning}
</aside>
<main>
  <h1>{title}</h1>
  <p>Upload your wardrobe photo and tell me the occasion. I'll suggest the perfect outfit!</p>
  <div class="columns">
    <section class="preview-column">
      <h2>Wardrobe Preview</h2>
      {preview}
    </section>
    <section class="result-column">
      <h2>Stylist's Recommendation</h2>
      <div id="spinner" class="spinner" hidden>{spinner}</div>
      {recommendation}
    </section>
  </div>
</main>
<script>
document.getElementById("stylist-form").addEventListener("submit", function () {{
  document.getElementById("spinner").hidden = false;
  this.querySelector("button").disabled = true;
}});
</script>
</body>
</html>
"#,
        title = title,
        base_css = BASE_CSS,
        theme_css = theme.css(),
        placeholder = html_escape(OCCASION_PLACEHOLDER),
        occasion = html_escape(occasion),
        warning = warning,
        preview = preview,
        spinner = html_escape(&theme.spinner_text()),
        recommendation = recommendation,
    )
}

const BASE_CSS: &str = r#"
body { margin: 0; display: flex; min-height: 100vh; font-family: system-ui, sans-serif; }
.sidebar { width: 320px; padding: 24px; box-sizing: border-box; }
.sidebar label { display: block; margin: 12px 0 6px; }
.sidebar textarea { width: 100%; box-sizing: border-box; border-radius: 8px; padding: 12px; }
.sidebar button { width: 100%; margin-top: 12px; cursor: pointer; }
.ready { text-align: center; }
main { flex: 1; padding: 32px; }
.columns { display: grid; grid-template-columns: 1fr 1.5fr; gap: 32px; }
.preview { max-width: 100%; border-radius: 12px; }
.caption { text-align: center; font-size: 0.9rem; }
.alert { border-radius: 10px; padding: 15px; margin-top: 16px; }
.suggestion { padding: 0 15px; border-radius: 10px; }
.spinner { font-style: italic; margin-bottom: 12px; }
"#;

const LOCAL_CSS: &str = r#"
body { background-color: #6c62c0; color: white; }
h1 { color: #ffffff; text-shadow: 2px 2px 4px rgba(255, 255, 255, 0.3); }
h2 { color: #ffecff; border-bottom: 2px solid #c9ace6; padding-bottom: 5px; }
.sidebar { background-color: #5a51a3; border-right: 5px solid #c9ace6; box-shadow: 5px 0 15px rgba(0, 0, 0, 0.25); }
.sidebar button { background-color: #b19cd9; color: #000; border-radius: 8px; padding: 10px 20px; font-weight: bold; border: none; }
.sidebar button:hover { background-color: #d8c9ff; }
.ready { color: #5D3FD3; }
.alert { box-shadow: 0 4px 8px rgba(0, 0, 0, 0.20); background: #5a51a3; }
.suggestion { border: 2px solid #6c62c0; background-color: #6c62c0; }
"#;

const CLOUD_CSS: &str = r#"
body { background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; }
h1 { color: white; font-size: 2.5rem; }
h2 { color: white; }
main { background: white; color: #333; border-radius: 20px; margin: 20px; box-shadow: 0 20px 60px rgba(0,0,0,0.3); }
main h1, main h2 { color: #764ba2; }
.sidebar textarea { border: 2px solid #e0e0e0; }
.sidebar input[type=file] { border: 3px dashed #667eea; border-radius: 15px; padding: 20px; background: #f2bdf9; color: #333; }
.sidebar button { background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; border: none; border-radius: 10px; padding: 15px 30px; font-size: 1.1rem; font-weight: 600; }
.alert { background-color: #CEA2FD; color: #333; border: 2px solid #667eea; border-left: 5px solid #667eea; }
.preview { box-shadow: 0 4px 12px rgba(0,0,0,0.15); }
.suggestion { border: 2px solid #667eea; }
"#;
