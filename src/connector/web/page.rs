use pulldown_cmark::{html, Event, Parser};

use crate::domain::Turn;

/// Static look of the chat page.
#[derive(Debug, Clone)]
pub struct PageConfig {
    pub title: String,
    pub icon: String,
    pub placeholder: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title: "Asistente Virtual".to_string(),
            icon: "💎".to_string(),
            placeholder: "Escribe aquí...".to_string(),
        }
    }
}

const STYLE: &str = "\
body{font-family:system-ui,sans-serif;max-width:46rem;margin:0 auto;padding:1rem;}\
.chat{display:flex;flex-direction:column;gap:.75rem;margin-bottom:6rem;}\
.turn{display:flex;gap:.5rem;align-items:flex-start;}\
.avatar{font-size:1.4rem;}\
.content{padding:.25rem .75rem;border-radius:.5rem;background:#f0f2f6;overflow-x:auto;}\
.content p{margin:.35rem 0;}\
.turn.assistant .content{background:#fff8e6;}\
.error{background:#ffe5e5;color:#7d1a1a;padding:.75rem;border-radius:.5rem;}\
form.input{position:fixed;bottom:0;left:0;right:0;display:flex;gap:.5rem;\
max-width:46rem;margin:0 auto;padding:1rem;background:#fff;}\
form.input input{flex:1;padding:.6rem;}";

/// Render the full chat page.
///
/// Output depends only on the arguments, so rendering an unchanged transcript
/// twice yields identical bytes.
pub fn render_page(config: &PageConfig, turns: &[Turn], notice: Option<&str>) -> String {
    let mut html = String::with_capacity(1024 + turns.len() * 256);
    let title = escape_html(&config.title);
    let icon = escape_html(&config.icon);

    html.push_str("<!DOCTYPE html>\n<html lang=\"es\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!("<title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n"));
    html.push_str(&format!("<h1>{icon} {title}</h1>\n"));
    html.push_str(
        "<form method=\"post\" action=\"/reset\">\
<button type=\"submit\">Nueva conversación</button></form>\n",
    );

    html.push_str("<main class=\"chat\" id=\"chat\">\n");
    for turn in turns {
        html.push_str(&render_turn(turn));
    }
    if let Some(message) = notice {
        html.push_str(&format!(
            "<div class=\"error\" role=\"alert\">Error: {}</div>\n",
            escape_html(message)
        ));
    }
    html.push_str("</main>\n");

    html.push_str(&format!(
        "<form class=\"input\" method=\"post\" action=\"/chat\">\
<input type=\"text\" name=\"prompt\" placeholder=\"{}\" autocomplete=\"off\" autofocus required>\
<button type=\"submit\">Enviar</button></form>\n",
        escape_html(&config.placeholder)
    ));
    html.push_str("<script>window.scrollTo(0, document.body.scrollHeight);</script>\n");
    html.push_str("</body>\n</html>\n");
    html
}

fn render_turn(turn: &Turn) -> String {
    let role = turn.role();
    format!(
        "<div class=\"turn {}\"><span class=\"avatar\">{}</span>\
<div class=\"content\">{}</div></div>\n",
        role.as_str(),
        role.avatar(),
        render_markdown(turn.content())
    )
}

/// Markdown to HTML. Raw HTML in the source is shown as text, never emitted.
fn render_markdown(text: &str) -> String {
    let events = Parser::new(text).map(|event| match event {
        Event::Html(raw) => Event::Text(raw),
        other => other,
    });
    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, events);
    out
}

fn escape_html(text: &str) -> String {
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
