//! Export Formatter
//!
//! Renders a curriculum as a self-contained, print-ready HTML dossier.
//! Every interpolated text field goes through [`html_escape`].

use crate::types::{Curriculum, Module};
use chrono::{TimeZone, Utc};
use rand::Rng;

const ID_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const ID_LEN: usize = 9;

/// Header details that are not part of the curriculum itself
#[derive(Debug, Clone, PartialEq)]
pub struct DossierMeta {
    /// `EP-` followed by nine uppercase base-36 characters
    pub id: String,
    pub date: String,
    pub print_delay_ms: u64,
}

impl DossierMeta {
    pub fn generate(now_millis: i64, print_delay_ms: u64) -> Self {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..ID_LEN)
            .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
            .collect();

        let date = Utc
            .timestamp_millis_opt(now_millis)
            .single()
            .map(|dt| dt.format("%B %-d, %Y").to_string())
            .unwrap_or_default();

        Self {
            id: format!("EP-{}", suffix),
            date,
            print_delay_ms,
        }
    }
}

/// Escape HTML special characters
pub fn html_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn render_list(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        return format!(r#"<li class="empty">{}</li>"#, empty);
    }
    items
        .iter()
        .map(|item| format!("<li>{}</li>", html_escape(item)))
        .collect::<Vec<String>>()
        .join("\n")
}

fn render_reasoning(curriculum: &Curriculum) -> String {
    match curriculum.adaptive_focus_reasoning.as_deref() {
        Some(reasoning) => format!(
            r#"<div class="reasoning">
            <h3>Adaptive Focus</h3>
            <p>{}</p>
        </div>"#,
            html_escape(reasoning)
        ),
        None => String::new(),
    }
}

fn render_module(number: usize, module: &Module) -> String {
    let topics = module
        .topics
        .iter()
        .map(|t| {
            format!(
                "<li><strong>{}</strong>: {}</li>",
                html_escape(&t.name),
                html_escape(&t.description)
            )
        })
        .collect::<Vec<String>>()
        .join("\n");

    format!(
        r#"<section class="module" data-module-id="{}">
            <div class="module-header">
                <span class="module-number">{:02}</span>
                <h3>{}</h3>
                <span class="module-meta">{} &middot; {}</span>
            </div>
            <div class="module-body">
                <h4>Topics</h4>
                <ul>{}</ul>
                <h4>Learning Outcomes</h4>
                <ul>{}</ul>
                <div class="alignment">
                    <div><span class="label">Industry</span> {}</div>
                    <div><span class="label">Academic</span> {}</div>
                </div>
            </div>
        </section>"#,
        html_escape(&module.id),
        number,
        html_escape(&module.title),
        html_escape(&module.duration),
        module.level,
        topics,
        render_list(&module.learning_outcomes, "None listed"),
        html_escape(&module.industry_alignment),
        html_escape(&module.academic_alignment)
    )
}

fn render_modules(modules: &[Module]) -> String {
    modules
        .iter()
        .enumerate()
        .map(|(i, module)| render_module(i + 1, module))
        .collect::<Vec<String>>()
        .join("\n")
}

const STYLE: &str = r#"
        body { font-family: Georgia, 'Times New Roman', serif; color: #1f2933; margin: 0; padding: 40px; }
        .brand { display: flex; justify-content: space-between; border-bottom: 3px solid #1f2933; padding-bottom: 12px; }
        .brand .name { font-weight: bold; letter-spacing: 0.2em; text-transform: uppercase; }
        .brand .meta { font-family: monospace; font-size: 12px; text-align: right; }
        .title h1 { font-size: 32px; margin: 24px 0 8px; }
        .title .role { font-style: italic; color: #52606d; }
        .reasoning { border-left: 4px solid #3e4c59; background: #f5f7fa; padding: 8px 16px; margin: 24px 0; }
        .module { page-break-inside: avoid; border-top: 1px solid #cbd2d9; padding: 16px 0; }
        .module-header { display: flex; align-items: baseline; gap: 12px; }
        .module-number { font-family: monospace; color: #7b8794; }
        .module-meta { margin-left: auto; font-size: 12px; color: #52606d; }
        .alignment { display: flex; gap: 24px; font-size: 13px; }
        .label { font-weight: bold; text-transform: uppercase; font-size: 11px; }
        .lists { display: flex; gap: 48px; margin-top: 24px; }
        .empty { color: #9aa5b1; }
        footer { margin-top: 40px; font-size: 11px; color: #7b8794; text-align: center; }
        @media print { body { padding: 0; } }
"#;

/// Render the full dossier document
pub fn render_dossier(curriculum: &Curriculum, meta: &DossierMeta) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>{title} - Curriculum Dossier</title>
    <style>{style}</style>
</head>
<body>
    <header class="brand">
        <div class="name">EduPath Curriculum Dossier</div>
        <div class="meta">
            <div>{id}</div>
            <div>{date}</div>
        </div>
    </header>
    <div class="title">
        <h1>{title}</h1>
        <p class="overview">{overview}</p>
        <p class="role">Target role: {role} &middot; {duration} &middot; Industry relevance {score:.0}/100</p>
    </div>
    {reasoning}
    <main>
        {modules}
    </main>
    <div class="lists">
        <div>
            <h3>Prerequisites</h3>
            <ul>{prerequisites}</ul>
        </div>
        <div>
            <h3>Suggested Certifications</h3>
            <ul>{certifications}</ul>
        </div>
    </div>
    <footer>Generated by EduPath &middot; {id}</footer>
    <script>
        window.onload = function () {{
            setTimeout(function () {{ window.print(); }}, {delay});
        }};
    </script>
</body>
</html>
"#,
        title = html_escape(&curriculum.specialization),
        style = STYLE,
        id = html_escape(&meta.id),
        date = html_escape(&meta.date),
        overview = html_escape(&curriculum.overview),
        role = html_escape(&curriculum.target_role),
        duration = html_escape(&curriculum.total_duration),
        score = curriculum.industry_relevance_score,
        reasoning = render_reasoning(curriculum),
        modules = render_modules(&curriculum.modules),
        prerequisites = render_list(&curriculum.prerequisites, "None"),
        certifications = render_list(&curriculum.suggested_certifications, "None"),
        delay = meta.print_delay_ms
    )
}
