//! HTML rendering for the single-page UI.

use crate::error::AskError;
use crate::pipeline::Answer;
use std::fmt::Write as _;

pub const PAGE_TITLE: &str = "I can Retrieve Any SQL query";
pub const HEADER: &str = "Groq App To Retrieve SQL Data";
pub const INPUT_LABEL: &str = "Input: ";
pub const SUBMIT_LABEL: &str = "Ask the question";
pub const RESPONSE_HEADING: &str = "The Response is";
pub const EMPTY_MESSAGE: &str = "No data found or an error occurred.";

const STYLE: &str = r#"
    .result-text {
        font-size: 20px;
        color: white;
        font-family: 'Arial', sans-serif;
        background-color: #2c3e50;
        padding: 10px;
        border-radius: 5px;
        margin-top: 10px;
    }
"#;

/// What goes under the form.
pub enum Body<'a> {
    Blank,
    Answer(&'a Answer),
    Error(&'a AskError),
}

/// Escapes text for use in element content and attribute values.
pub fn escape_html(text: &str) -> String {
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

/// Renders the full page, keeping `question` in the input box.
pub fn render(question: &str, body: Body<'_>) -> String {
    let mut html = String::new();

    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <h2>{HEADER}</h2>\n\
         <form method=\"post\" action=\"/ask\">\n\
         <label for=\"input\">{INPUT_LABEL}</label>\n\
         <input type=\"text\" id=\"input\" name=\"question\" value=\"{question}\">\n\
         <button type=\"submit\">{SUBMIT_LABEL}</button>\n\
         </form>\n",
        title = escape_html(PAGE_TITLE),
        question = escape_html(question),
    );

    match body {
        Body::Blank => {}
        Body::Answer(answer) if answer.is_empty() => {
            let _ = writeln!(html, "<p>{EMPTY_MESSAGE}</p>");
        }
        Body::Answer(answer) => {
            let _ = writeln!(html, "<h3>{RESPONSE_HEADING}</h3>");
            for line in answer.lines() {
                let _ = writeln!(html, "<p class=\"result-text\">{}</p>", escape_html(&line));
            }
        }
        Body::Error(e) => {
            let _ = writeln!(
                html,
                "<p class=\"error\">{}: {}</p>",
                e.category(),
                escape_html(&e.to_string())
            );
        }
    }

    html.push_str("</body>\n</html>\n");
    html
}
