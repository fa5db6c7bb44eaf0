//! README generation for archived solutions
//!
//! LeetCode READMEs are rendered from the question's HTML description into
//! markdown that matches the problem page: examples in fenced code blocks,
//! constraints as a bullet list, superscripts for complexity notation.
//! Entity decoding and tag stripping are kept separate so comparison
//! operators like `<=` in constraints survive.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Deserialize;

/// Question metadata supplied by the capture side for LeetCode problems.
#[derive(Debug, Clone, Deserialize)]
pub struct LeetcodeQuestion {
    pub question_frontend_id: String,
    pub title: String,
    pub title_slug: String,
    pub difficulty: String,
    /// Raw HTML problem description.
    pub content: String,
}

/// Input for a Codeforces README (same structure as the problem page).
#[derive(Debug, Clone, Default)]
pub struct CodeforcesReadme {
    pub contest_id: u32,
    pub index: String,
    pub name: String,
    pub question_url: String,
    pub time_limit: Option<String>,
    pub memory_limit: Option<String>,
    pub statement: Option<String>,
}

static TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"</?[a-zA-Z][^>]*>").unwrap());
static PRE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<pre>(.*?)</pre>").unwrap());
static STRONG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<strong>(.*?)</strong>").unwrap());
static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<b>(.*?)</b>").unwrap());
static SUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<sup>([^<]*)</sup>").unwrap());
static LIST_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<li>(.*?)</li>").unwrap());
static CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<code>(.*?)</code>").unwrap());
static PARA: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<p>(.*?)</p>").unwrap());
static WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static PRE_NEWLINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*").unwrap());
static TRAILING_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+\n").unwrap());
static BLANK_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());
static BOLD_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*([^*]+):\s*\*\*").unwrap());

/// Decode common HTML entities. Does not touch tags.
fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&hellip;", "...")
        .replace("&amp;", "&")
}

/// Strip HTML tags only, leaving `<=` and `>=` in constraints intact.
fn strip_tags(html: &str) -> String {
    TAGS.replace_all(html, " ").into_owned()
}

fn superscript(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '0' => '⁰',
            '2' => '²',
            '3' => '³',
            '4' => '⁴',
            '5' => '⁵',
            '6' => '⁶',
            '7' => '⁷',
            '8' => '⁸',
            '9' => '⁹',
            other => other,
        })
        .collect()
}

fn inline_text(html: &str) -> String {
    let t = strip_tags(html);
    decode_entities(WS.replace_all(t.trim(), " ").as_ref())
}

/// Convert a problem description from HTML to markdown.
pub fn html_to_markdown(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }

    // Code blocks first so their contents escape later passes.
    let md = PRE.replace_all(html, |caps: &Captures| {
        // Inline markup inside an example block carries no layout, so tags
        // are removed without a placeholder space.
        let text = TAGS.replace_all(&caps[1], "");
        let text = PRE_NEWLINE.replace_all(&text, "\n");
        format!("\n```\n{}\n```\n\n", decode_entities(text.trim()))
    });

    let md = STRONG.replace_all(&md, |caps: &Captures| format!("**{}**", inline_text(&caps[1])));
    let md = BOLD.replace_all(&md, |caps: &Captures| format!("**{}**", inline_text(&caps[1])));

    // Superscripts, e.g. 10<sup>4</sup> -> 10⁴.
    let md = SUP.replace_all(&md, |caps: &Captures| superscript(&caps[1]));

    // List items keep inline code for variables and bounds.
    let md = LIST_ITEM.replace_all(&md, |caps: &Captures| {
        let inner = CODE.replace_all(&caps[1], |c: &Captures| format!("`{}`", inline_text(&c[1])));
        format!("\n- {}", inline_text(&inner))
    });

    let md = CODE.replace_all(&md, |caps: &Captures| format!("`{}`", inline_text(&caps[1])));
    let md = PARA.replace_all(&md, |caps: &Captures| format!("\n\n{}\n\n", inline_text(&caps[1])));

    let md = decode_entities(&strip_tags(&md));

    let md = md.replace("\r\n", "\n");
    let md = TRAILING_WS.replace_all(&md, "\n");
    let md = BLANK_RUNS.replace_all(&md, "\n\n");
    let md = md.trim();

    // "**Follow-up: **" would not render bold on GitHub.
    BOLD_LABEL.replace_all(md, "**$1:**").into_owned()
}

/// LeetHub-style README for a LeetCode problem.
pub fn build_leetcode_readme(question: &LeetcodeQuestion, problem_url: &str) -> String {
    let content = html_to_markdown(&question.content);
    format!(
        "# {}. {}\n\n**Difficulty:** {}\n\n**Problem:** [{}]({})\n\n---\n\n{}",
        question.question_frontend_id,
        question.title,
        question.difficulty,
        question.title,
        problem_url,
        content
    )
}

/// README for a Codeforces problem.
pub fn build_codeforces_readme(input: &CodeforcesReadme) -> String {
    let title = format!("{}{} {}", input.contest_id, input.index, input.name);
    let mut lines = vec![
        format!("# {title}"),
        String::new(),
        format!("**Problem:** [{title}]({})", input.question_url),
    ];
    if let Some(limit) = &input.time_limit {
        lines.push(String::new());
        lines.push(format!("**time limit per test:** {limit}"));
    }
    if let Some(limit) = &input.memory_limit {
        lines.push(String::new());
        lines.push(format!("**memory limit per test:** {limit}"));
    }
    if input.time_limit.is_some() || input.memory_limit.is_some() {
        lines.push(String::new());
    }
    if let Some(statement) = input.statement.as_deref().map(str::trim) {
        if !statement.is_empty() {
            lines.push("---".to_string());
            lines.push(String::new());
            lines.push(statement.to_string());
            lines.push(String::new());
        }
    }
    lines.join("\n")
}

/// Minimal README when only a title and URL are available.
pub fn build_minimal_readme(title: &str, problem_url: &str) -> String {
    format!("# {title}\n\n**Problem:** [{title}]({problem_url})")
}
