//! Social-media preview pages.
//!
//! Chat clients unfurl these pages instead of embedding the raw image, so
//! each page is little more than OpenGraph/Twitter meta tags pointing at
//! the CDN.

use crate::emotes::Emote;
use crate::emotes::image::{ImageFormat, ImageSize, image_url};

/// Escape HTML special characters, including quotes for attribute values.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render the preview page for one emote.
///
/// The image link points straight at the CDN rather than back through the
/// relay. Animated emotes link the gif so the unfurl actually moves.
pub fn render(emote: &Emote, cdn_base: &str) -> String {
    let format = if emote.animated {
        ImageFormat::Gif
    } else {
        ImageFormat::Webp
    };
    let image = image_url(cdn_base, &emote.id, ImageSize::X3, format);

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{name}</title>
<meta property="og:title" content="{name}">
<meta property="og:description" content="by {owner}">
<meta property="og:image" content="{image}">
<meta property="og:type" content="website">
<meta name="twitter:card" content="summary_large_image">
<meta name="twitter:image" content="{image}">
</head>
<body>
<img src="{image}" alt="{name}">
</body>
</html>
"#,
        name = html_escape(&emote.name),
        owner = html_escape(&emote.owner),
        image = image,
    )
}
