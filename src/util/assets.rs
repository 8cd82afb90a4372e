use std::{borrow::Cow, sync::OnceLock};

use rust_embed::RustEmbed;

/// Embed the entire `assets/` directory into the binary.
#[derive(RustEmbed)]
#[folder = "assets"]
struct EmbeddedAssets;

static MAIN_CSS: OnceLock<String> = OnceLock::new();

/// Returns the contents of `assets/main.css` as a static string.
pub fn main_css() -> &'static str {
    MAIN_CSS
        .get_or_init(|| load_text("main.css"))
        .as_str()
}

/// A missing stylesheet only costs styling, so it degrades to empty.
fn load_text(path: &str) -> String {
    match EmbeddedAssets::get(path).map(|file| file.data) {
        Some(Cow::Borrowed(bytes)) => String::from_utf8_lossy(bytes).into_owned(),
        Some(Cow::Owned(bytes)) => String::from_utf8_lossy(&bytes).into_owned(),
        None => {
            log::warn!("Embedded asset {path} not found");
            String::new()
        }
    }
}
