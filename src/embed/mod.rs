//! Embedded static resources.
//!
//! - `serve::SLIDE_HTML` - reveal.js page used when a slide has no `slide.tmpl`
//! - `serve::LISTING_HTML` - web-root directory listing

mod template;

pub use template::{Template, TemplateVars};

pub mod serve {
    use super::{Template, TemplateVars};

    /// Name the built-in slide page is reported under in render errors.
    pub const SLIDE_HTML_NAME: &str = "builtin:slide.html";

    /// Built-in slide page, rendered with the slide metadata.
    pub const SLIDE_HTML: &str = include_str!("serve/slide.html");

    /// Variables for listing.html.
    pub struct ListingVars<'a> {
        pub title: &'a str,
        pub entries: &'a str,
    }

    impl TemplateVars for ListingVars<'_> {
        fn apply(&self, content: &str) -> String {
            content
                .replace("__TITLE__", self.title)
                .replace("__ENTRIES__", self.entries)
        }
    }

    /// Directory listing page.
    pub const LISTING_HTML: Template<ListingVars<'static>> =
        Template::new(include_str!("serve/listing.html"));
}
