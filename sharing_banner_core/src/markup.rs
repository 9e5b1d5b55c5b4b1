//! Banner markup.

use crate::{config::BannerConfig, context::PageContext};

/// Class of the banner's root element.
pub const BANNER_CLASS: &str = "sharing-banner";

/// Class added to the root element while the banner is expanded.
pub const EXPANDED_CLASS: &str = "sharing-banner--expanded";

/// Token replaced by the site collection URL.
pub const SITE_URL_TOKEN: &str = "{siteurl}";

/// Token replaced by the web URL.
pub const WEB_URL_TOKEN: &str = "{weburl}";

/// Replace every `{siteurl}` and `{weburl}` in `text` with the (escaped)
/// URLs from `context`.
#[must_use]
pub fn substitute_tokens(text: &str, context: &PageContext) -> String {
    text.replace(SITE_URL_TOKEN, &escape_html(&context.site_url))
        .replace(WEB_URL_TOKEN, &escape_html(&context.web_url))
}

/// Escape `&`, `<`, `>`, `"` and `'`.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Render the banner for `context`.
///
/// The stylesheet keeps the root collapsed (zero height) unless an inline
/// height overrides it, so dropping the override collapses the banner
/// again with the same transition. The message is trusted admin markup and
/// is inserted as-is after token substitution; style values are escaped.
#[must_use]
pub fn render(config: &BannerConfig, context: &PageContext) -> String {
    let message = substitute_tokens(&config.message, context);
    format!(
        concat!(
            "<style>",
            ".{banner}{{height:0;overflow:hidden;display:flex;align-items:center;",
            "justify-content:center;transition:height 0.3s ease-in-out;}}",
            ".{expanded}{{box-shadow:0 1px 2px rgba(0,0,0,0.1);}}",
            "</style>",
            "<div class=\"{banner}\" role=\"status\" ",
            "style=\"background-color:{background};color:{color};font-size:{size};\">",
            "<span class=\"{banner}__message\">{message}</span>",
            "</div>"
        ),
        banner = BANNER_CLASS,
        expanded = EXPANDED_CLASS,
        background = escape_html(&config.background_color),
        color = escape_html(&config.text_color),
        size = escape_html(&config.text_font_size),
        message = message,
    )
}
