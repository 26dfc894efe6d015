//! HTML emitted in place of diagram blocks.
//!
//! [`TagFormat`] picks how a [`RenderedArtifact`] is embedded:
//! - [`Object`](TagFormat::Object): `<object>` element referencing the image
//! - [`Img`](TagFormat::Img): `<img>` element (default)
//! - [`Svg`](TagFormat::Svg): the SVG markup itself, inlined
//!
//! Embedded bytes become a base64 `data:` URI for `Object` and `Img`.
//! `Svg` needs embedded SVG bytes and otherwise falls back to `Img`.

use std::sync::LazyLock;

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use regex::Regex;

use crate::block::DisplayOptions;
use crate::render::{ArtifactSource, RenderedArtifact};

/// Start of the root SVG element (skips any XML prolog or doctype).
static SVG_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<svg\b").expect("valid svg open regex"));

/// Existing `class` attribute of an element.
static CLASS_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\sclass="([^"]*)""#).expect("valid class attribute regex"));

/// Class marking every emitted diagram element.
const DIAGRAM_CLASS: &str = "kroki";

/// How rendered diagrams are embedded in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagFormat {
    Object,
    #[default]
    Img,
    Svg,
}

impl TagFormat {
    /// Parse a format name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "object" => Some(Self::Object),
            "img" => Some(Self::Img),
            "svg" => Some(Self::Svg),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Img => "img",
            Self::Svg => "svg",
        }
    }
}

/// Media type for an output extension.
#[must_use]
pub fn media_type(extension: &str) -> &'static str {
    match extension {
        "png" => "image/png",
        "svg" => "image/svg+xml",
        "jpeg" => "image/jpeg",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// Render the HTML that replaces a diagram block.
#[must_use]
pub fn render_tag(format: TagFormat, artifact: &RenderedArtifact, display: &DisplayOptions) -> String {
    match format {
        TagFormat::Object => object_tag(artifact, display),
        TagFormat::Img => img_tag(artifact, display),
        TagFormat::Svg => inline_svg(artifact, display).unwrap_or_else(|| {
            tracing::debug!(
                extension = %artifact.extension,
                "inline SVG needs embedded SVG data, using <img>"
            );
            img_tag(artifact, display)
        }),
    }
}

fn object_tag(artifact: &RenderedArtifact, display: &DisplayOptions) -> String {
    let style = match display.style() {
        s if s.is_empty() => "max-width:100%".to_owned(),
        s => format!("max-width:100%;{s}"),
    };
    format!(
        r#"<object class="{DIAGRAM_CLASS}" type="{}" data="{}" style="{}"></object>"#,
        media_type(&artifact.extension),
        escape_html(&image_src(artifact)),
        escape_html(&style)
    )
}

fn img_tag(artifact: &RenderedArtifact, display: &DisplayOptions) -> String {
    let style = display.style();
    let style_attr = if style.is_empty() {
        String::new()
    } else {
        format!(r#" style="{}""#, escape_html(&style))
    };
    format!(
        r#"<img alt="Kroki" src="{}"{style_attr}>"#,
        escape_html(&image_src(artifact))
    )
}

fn inline_svg(artifact: &RenderedArtifact, display: &DisplayOptions) -> Option<String> {
    let ArtifactSource::Embedded(bytes) = &artifact.source else {
        return None;
    };
    if artifact.extension != "svg" {
        return None;
    }
    let svg = std::str::from_utf8(bytes).ok()?;
    let open = SVG_OPEN_RE.find(svg)?;

    let style = display.style();
    let style_attr = if style.is_empty() {
        String::new()
    } else {
        format!(r#" style="{}""#, escape_html(&style))
    };

    // Everything after the `<svg` token of the root element
    let rest = svg[open.end()..].trim_end();
    let head_end = rest.find('>').unwrap_or(rest.len());
    let Some(class) = CLASS_ATTR_RE
        .captures(&rest[..head_end])
        .and_then(|caps| caps.get(1))
    else {
        return Some(format!(r#"<svg class="{DIAGRAM_CLASS}"{style_attr}{rest}"#));
    };
    // Merge into the root element's own class list
    Some(format!(
        "<svg{style_attr}{}{DIAGRAM_CLASS} {}",
        &rest[..class.start()],
        &rest[class.start()..]
    ))
}

/// `src` value for an artifact: its URL or a `data:` URI.
fn image_src(artifact: &RenderedArtifact) -> String {
    match &artifact.source {
        ArtifactSource::Url(url) => url.clone(),
        ArtifactSource::Embedded(bytes) => format!(
            "data:{};base64,{}",
            media_type(&artifact.extension),
            BASE64_STANDARD.encode(bytes)
        ),
    }
}

/// Placeholder shown in place of a diagram that failed.
///
/// Every part is HTML-escaped.
#[must_use]
pub fn error_placeholder(message: &str, response: Option<&str>, source: Option<&str>) -> String {
    format!(
        r#"<details open=""><summary>{}</summary><p>{}</p><pre><code>{}</code></pre></details>"#,
        escape_html(message),
        escape_html(response.unwrap_or_default()),
        escape_html(source.unwrap_or_default())
    )
}

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::DisplayAlign;
    use pretty_assertions::assert_eq;

    fn svg_artifact(svg: &str) -> RenderedArtifact {
        RenderedArtifact::embedded("svg", svg.as_bytes().to_vec())
    }

    fn url_artifact() -> RenderedArtifact {
        RenderedArtifact::url("svg", "https://kroki.io/mermaid/svg/eNpLyUwvSizI")
    }

    #[test]
    fn test_tag_format_parse() {
        assert_eq!(TagFormat::parse("object"), Some(TagFormat::Object));
        assert_eq!(TagFormat::parse("img"), Some(TagFormat::Img));
        assert_eq!(TagFormat::parse("svg"), Some(TagFormat::Svg));
        assert_eq!(TagFormat::parse("png"), None);
        assert_eq!(TagFormat::default(), TagFormat::Img);
        assert_eq!(TagFormat::Object.as_str(), "object");
    }

    #[test]
    fn test_media_types() {
        assert_eq!(media_type("png"), "image/png");
        assert_eq!(media_type("svg"), "image/svg+xml");
        assert_eq!(media_type("jpeg"), "image/jpeg");
        assert_eq!(media_type("pdf"), "application/pdf");
    }

    #[test]
    fn test_img_with_url() {
        let tag = render_tag(TagFormat::Img, &url_artifact(), &DisplayOptions::default());
        assert_eq!(
            tag,
            r#"<img alt="Kroki" src="https://kroki.io/mermaid/svg/eNpLyUwvSizI">"#
        );
    }

    #[test]
    fn test_img_with_embedded_png() {
        let artifact = RenderedArtifact::embedded("png", vec![0x89, b'P', b'N', b'G']);
        let tag = render_tag(TagFormat::Img, &artifact, &DisplayOptions::default());
        assert_eq!(tag, r#"<img alt="Kroki" src="data:image/png;base64,iVBORw==">"#);
    }

    #[test]
    fn test_img_with_display_style() {
        let display = DisplayOptions {
            width: Some("300px".to_owned()),
            ..DisplayOptions::default()
        };
        let tag = render_tag(TagFormat::Img, &url_artifact(), &display);
        assert!(tag.ends_with(r#" style="width: 300px">"#), "{tag}");
    }

    #[test]
    fn test_object_tag() {
        let display = DisplayOptions {
            align: Some(DisplayAlign::Center),
            ..DisplayOptions::default()
        };
        let tag = render_tag(TagFormat::Object, &url_artifact(), &display);
        assert_eq!(
            tag,
            r#"<object class="kroki" type="image/svg+xml" data="https://kroki.io/mermaid/svg/eNpLyUwvSizI" style="max-width:100%;display: block; margin-left: auto; margin-right: auto"></object>"#
        );
    }

    #[test]
    fn test_inline_svg_strips_prolog_and_adds_attrs() {
        let artifact = svg_artifact(
            "<?xml version=\"1.0\"?>\n<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"10\"><g/></svg>\n",
        );
        let display = DisplayOptions {
            height: Some("5em".to_owned()),
            ..DisplayOptions::default()
        };
        let tag = render_tag(TagFormat::Svg, &artifact, &display);
        assert_eq!(
            tag,
            r#"<svg class="kroki" style="height: 5em" xmlns="http://www.w3.org/2000/svg" width="10"><g/></svg>"#
        );
    }

    #[test]
    fn test_inline_svg_keeps_root_class_and_id() {
        let artifact = svg_artifact(
            r#"<svg id="mermaid-1" class="flowchart" xmlns="http://www.w3.org/2000/svg"><g class="node"/></svg>"#,
        );
        let tag = render_tag(TagFormat::Svg, &artifact, &DisplayOptions::default());
        assert_eq!(
            tag,
            r#"<svg id="mermaid-1" class="kroki flowchart" xmlns="http://www.w3.org/2000/svg"><g class="node"/></svg>"#
        );
    }

    #[test]
    fn test_tags_do_not_carry_ids() {
        let svg = svg_artifact(r#"<svg xmlns="http://www.w3.org/2000/svg"><g/></svg>"#);
        for (format, artifact) in [
            (TagFormat::Object, url_artifact()),
            (TagFormat::Img, url_artifact()),
            (TagFormat::Svg, svg),
        ] {
            let tag = render_tag(format, &artifact, &DisplayOptions::default());
            assert!(!tag.contains(" id="), "{tag}");
        }
    }

    #[test]
    fn test_inline_svg_falls_back_to_img() {
        let tag = render_tag(TagFormat::Svg, &url_artifact(), &DisplayOptions::default());
        assert!(tag.starts_with("<img "), "{tag}");

        let png = RenderedArtifact::embedded("png", vec![1, 2, 3]);
        let tag = render_tag(TagFormat::Svg, &png, &DisplayOptions::default());
        assert!(tag.starts_with(r#"<img alt="Kroki" src="data:image/png;base64,"#), "{tag}");

        let not_svg = svg_artifact("plain text");
        let tag = render_tag(TagFormat::Svg, &not_svg, &DisplayOptions::default());
        assert!(tag.starts_with("<img "), "{tag}");
    }

    #[test]
    fn test_error_placeholder_escapes() {
        let html = error_placeholder(
            "diagram error (HTTP 400)",
            Some("Error 400: <unexpected>"),
            Some("graph TD; A-->B & C"),
        );
        assert_eq!(
            html,
            r#"<details open=""><summary>diagram error (HTTP 400)</summary><p>Error 400: &lt;unexpected&gt;</p><pre><code>graph TD; A--&gt;B &amp; C</code></pre></details>"#
        );
    }

    #[test]
    fn test_error_placeholder_without_details() {
        assert_eq!(
            error_placeholder("can't read file", None, None),
            r#"<details open=""><summary>can&#x27;t read file</summary><p></p><pre><code></code></pre></details>"#
        );
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<script>"), "&lt;script&gt;");
        assert_eq!(escape_html("a & b"), "a &amp; b");
        assert_eq!(escape_html(r#""quoted""#), "&quot;quoted&quot;");
        assert_eq!(escape_html("it's"), "it&#x27;s");
    }
}
