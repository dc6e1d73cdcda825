//! Markdown and social-post templates.
//!
//! Every function here is pure; the date is always passed in.

use crate::extract::extract_sources;
use chrono::NaiveDate;

const KEY_POINT_CHARS: usize = 150;
const DEFAULT_KEY_POINT: &str = "Research insights";
const DEFAULT_SOURCE: &str = "no sources cited";

const DEFAULT_FINDINGS: [&str; 3] = [
    "Findings are limited to the retrieved documents.",
    "Each claim was checked against the passage it cites.",
    "See the executive summary for the surrounding context.",
];

/// Tags appended to every newsroom post.
pub const NEWSROOM_TAGS: [&str; 6] = ["AI", "Agents", "Newsroom", "Automation", "Python", "LLM"];

struct BriefSections {
    summary: Vec<String>,
    takeaways: Vec<String>,
}

/// Split stage output into summary lines and the takeaway bullets that
/// follow a "Key Takeaway" marker.
fn split_sections(content: &str) -> BriefSections {
    let mut summary = Vec::new();
    let mut takeaways = Vec::new();
    let mut in_takeaways = false;

    for line in content.lines() {
        if line.contains("Key Takeaway") || line.contains("key takeaway") {
            in_takeaways = true;
            continue;
        }

        let trimmed = line.trim();
        if in_takeaways {
            if trimmed.starts_with('-') {
                takeaways.push(trimmed.to_string());
            }
        } else if !trimmed.is_empty() && !line.starts_with('#') {
            summary.push(trimmed.to_string());
        }
    }

    BriefSections { summary, takeaways }
}

/// Render the research brief.
pub fn format_brief(query: &str, content: &str, date: NaiveDate) -> String {
    let sections = split_sections(content);
    let mut brief = format!(
        "---\n<div align=\"center\">\n\n\
# 🔬 Research Brief\n\n\
### {query}\n\n\
**Generated:** {date}  \n\
**Research Assistant:** newsdesk\n\n\
---\n\n\
</div>\n\n\
## 📋 Executive Summary\n\n\
{summary}\n\n\
---\n\n\
## 🎯 Key Findings\n\n",
        query = query,
        date = date.format("%B %d, %Y"),
        summary = sections.summary.iter().take(3).cloned().collect::<Vec<_>>().join("\n"),
    );

    if sections.takeaways.is_empty() {
        for (i, finding) in DEFAULT_FINDINGS.iter().enumerate() {
            brief.push_str(&format!("{}. **{}**\n\n", i + 1, finding));
        }
    } else {
        for (i, takeaway) in sections.takeaways.iter().take(3).enumerate() {
            let text = takeaway.trim_start_matches(|c: char| c == '-' || c == ' ' || c == '•');
            brief.push_str(&format!("{}. **{}**\n\n", i + 1, text.trim()));
        }
    }

    brief.push_str(
        "---\n\n\
## 📚 Methodology\n\n\
This research brief was generated using:\n\
- **Retrieval-augmented generation:** semantic search over the document corpus\n\
- **Staged pipeline:** Research → Fact-Check → Edit → Publish\n\
- **Source verification:** claims are checked against retrieved passages\n\n\
---\n\n\
## 📖 Sources\n\n",
    );

    let sources = extract_sources(content);
    if sources.is_empty() {
        brief.push_str(&format!("- 📄 `{}`\n", DEFAULT_SOURCE));
    } else {
        for source in &sources {
            brief.push_str(&format!("- 📄 `{}`\n", source));
        }
    }

    brief.push_str(
        "\n---\n\n\
## 🤖 Pipeline\n\n\
1. 🔍 **Researcher** - extracts key facts with citations\n\
2. ✅ **Fact Checker** - verifies claims against sources\n\
3. ✍️ **Editor** - writes the summary and takeaways\n\
4. 📱 **Publisher** - formats for each channel\n\n\
---\n\n\
<div align=\"center\">\n\n\
*Generated by newsdesk*\n\n\
</div>\n",
    );

    brief
}

/// Render the long-form social post for a research brief.
pub fn social_post(query: &str, content: &str) -> String {
    let first_point = content
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or(DEFAULT_KEY_POINT);
    let key_point: String = first_point.chars().take(KEY_POINT_CHARS).collect();

    format!(
        "🔬 Researched with a staged retrieval pipeline: \"{query}\"\n\n\
🤖 Four stages worked in sequence:\n\
1️⃣ Researcher → extracted facts from the documents\n\
2️⃣ Fact Checker → verified every claim\n\
3️⃣ Editor → wrote the brief\n\
4️⃣ Publisher → formatted the outputs\n\n\
Key Finding: {key_point}...\n\n\
💡 Every claim in the brief cites the document it came from.\n\n\
#AI #MachineLearning #RAG #MultiAgent #Research\n",
        query = query,
        key_point = key_point,
    )
}

/// Render the newsroom card.
pub fn news_card(
    title: &str,
    summary: &str,
    bullets: &[String],
    image_alt: &str,
    link: &str,
    date: NaiveDate,
) -> String {
    let bullets_md = bullets
        .iter()
        .map(|b| format!("- {}", b))
        .collect::<Vec<_>>()
        .join("\n");

    let mut card = format!(
        "# {title}\n_Date: {date}_\n\n{summary}\n\n\
**Key Takeaways**\n{bullets}\n\n\
_Illustration: {alt}_\n",
        title = title,
        date = date.format("%Y-%m-%d"),
        summary = summary.trim(),
        bullets = bullets_md,
        alt = image_alt,
    );

    if !link.is_empty() {
        card.push_str(&format!("\nSource: {}\n", link));
    }

    card
}

/// Render the short newsroom post.
pub fn short_post(title: &str, one_liner: &str, tags: &[&str]) -> String {
    let tags_str = tags
        .iter()
        .map(|t| format!("#{}", t))
        .collect::<Vec<_>>()
        .join(" ");
    format!("📰 {}\n\n{}\n\n{}\n", title, one_liner, tags_str)
}
