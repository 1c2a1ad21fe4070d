//! Static HTML pages for the produced courses

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::catalog::{Catalog, CourseCatalogEntry};

const PAGE_HEAD: &str = r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width" />"#;

/// Human readable name for a language code, falling back to the code.
pub fn language_label(code: &str) -> String {
    let name = match code.split(['-', '_']).next().unwrap_or(code) {
        "ar" => "Arabic",
        "de" => "German",
        "en" => "English",
        "es" => "Spanish",
        "fr" => "French",
        "it" => "Italian",
        "ja" => "Japanese",
        "ko" => "Korean",
        "nl" => "Dutch",
        "pl" => "Polish",
        "pt" => "Portuguese",
        "ru" => "Russian",
        "tr" => "Turkish",
        "uk" => "Ukrainian",
        "zh" => "Chinese",
        _ => return code.to_string(),
    };
    match code.split_once(['-', '_']) {
        Some((_, region)) if !region.is_empty() => format!("{name} ({region})"),
        _ => name.to_string(),
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Relative location of a course page from the site root.
pub fn course_page_href(entry: &CourseCatalogEntry) -> String {
    format!("courses/{}.html", entry.id)
}

/// One page listing every part of a course with a player and a download link.
///
/// `audio_prefix` is prepended to each part file name in links.
pub fn render_course_page(entry: &CourseCatalogEntry, audio_prefix: &str) -> String {
    let title = format!(
        "{} for {} speakers",
        entry.title,
        language_label(&entry.translation_language)
    );
    let mut html = String::new();
    let _ = writeln!(html, "{PAGE_HEAD}");
    let _ = writeln!(html, "    <title>{}</title>\n  </head>\n<body>", escape_html(&title));
    let _ = writeln!(html, "<h1>{}</h1>", escape_html(&title));
    let _ = writeln!(
        html,
        "<p>Version {} &middot; {} parts</p>",
        escape_html(&entry.version),
        entry.parts.len()
    );
    for (i, part) in entry.parts.iter().enumerate() {
        let href = escape_html(&format!("{audio_prefix}{part}"));
        let _ = writeln!(
            html,
            r#"<div class="audio-item">
    <h2>Part {}</h2>
    <audio controls preload="none">
        <source src="{href}" type="audio/mpeg">
        Your browser does not support the audio element.
    </audio>
    <a href="{href}" download>Download part {}</a>
</div>"#,
            i + 1,
            i + 1
        );
    }
    html.push_str("<p><a href=\"../index.html\">All courses</a></p>\n</body>\n</html>\n");
    html
}

/// Index page grouping courses by source language.
pub fn render_index(entries: &[CourseCatalogEntry]) -> String {
    let mut groups: BTreeMap<&str, Vec<&CourseCatalogEntry>> = BTreeMap::new();
    for entry in entries {
        groups.entry(entry.source_language.as_str()).or_default().push(entry);
    }

    let mut html = String::new();
    let _ = writeln!(html, "{PAGE_HEAD}");
    html.push_str("    <title>Audio language courses</title>\n  </head>\n<body>\n");
    html.push_str("<h1>Audio language courses</h1>\n");
    if groups.is_empty() {
        html.push_str("<p>No courses available yet.</p>\n");
    }
    for (source, courses) in groups {
        let _ = writeln!(
            html,
            "<section class=\"category\">\n<h2>{}</h2>\n<ul>",
            escape_html(&language_label(source))
        );
        for entry in courses {
            let _ = writeln!(
                html,
                "  <li><a href=\"{}\">{}</a> <span class=\"for\">for {} speakers</span></li>",
                escape_html(&course_page_href(entry)),
                escape_html(&entry.title),
                escape_html(&language_label(&entry.translation_language))
            );
        }
        html.push_str("</ul>\n</section>\n");
    }
    html.push_str("</body>\n</html>\n");
    html
}

/// Write the index page and one page per catalog entry.
///
/// Course pages land in `pages_dir` and link to parts in `audio_dir_name`,
/// a sibling of `pages_dir`.
pub fn write_site(
    catalog: &Catalog,
    index_path: &Path,
    pages_dir: &Path,
    audio_dir_name: &str,
) -> Result<()> {
    fs::create_dir_all(pages_dir)
        .with_context(|| format!("failed to create pages directory {:?}", pages_dir))?;
    let prefix = format!("../{audio_dir_name}/");
    for entry in &catalog.courses {
        let path = pages_dir.join(format!("{}.html", entry.id));
        fs::write(&path, render_course_page(entry, &prefix))
            .with_context(|| format!("failed to write course page {:?}", path))?;
    }
    fs::write(index_path, render_index(&catalog.courses))
        .with_context(|| format!("failed to write index page {:?}", index_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn entry(source: &str, target: &str, title: &str) -> CourseCatalogEntry {
        CourseCatalogEntry {
            id: format!("{}_{}", source.to_lowercase(), target),
            title: title.to_string(),
            source_language: source.to_string(),
            translation_language: target.to_string(),
            version: "1".to_string(),
            parts: vec![
                format!("{source}_{target}_1_course.mp3"),
                format!("{source}_{target}_2_course.mp3"),
            ],
        }
    }

    #[test]
    fn labels_known_and_unknown_codes() {
        assert_eq!(language_label("en-US"), "English (US)");
        assert_eq!(language_label("fr"), "French");
        assert_eq!(language_label("xx-YY"), "xx-YY");
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn course_page_links_every_part() {
        let html = render_course_page(&entry("es-ES", "en-US", "Spanish"), "../output_audio/");
        assert!(html.contains("../output_audio/es-ES_en-US_1_course.mp3"));
        assert!(html.contains("../output_audio/es-ES_en-US_2_course.mp3"));
        assert!(html.contains("Spanish for English (US) speakers"));
        assert_eq!(html.matches("<audio").count(), 2);
    }

    #[test]
    fn index_groups_by_source_language() {
        let entries = vec![
            entry("fr-FR", "en-US", "French"),
            entry("es-ES", "en-US", "Spanish"),
            entry("es-ES", "de-DE", "Spanish"),
        ];
        let html = render_index(&entries);
        let spanish = html.find("<h2>Spanish (ES)</h2>").unwrap();
        let french = html.find("<h2>French (FR)</h2>").unwrap();
        assert!(spanish < french, "groups are ordered by language code");
        assert_eq!(html.matches("<li>").count(), 3);
    }

    #[test]
    fn title_is_escaped() {
        let html = render_index(&[entry("es-ES", "en-US", "<script>")]);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn writes_index_and_pages() {
        let temp = tempdir().unwrap();
        let catalog = Catalog::new(vec![entry("es-ES", "en-US", "Spanish")]);
        let pages = temp.path().join("courses");
        write_site(&catalog, &temp.path().join("index.html"), &pages, "output_audio").unwrap();
        assert!(temp.path().join("index.html").is_file());
        assert!(pages.join("es-es_en-US.html").is_file());
    }
}
