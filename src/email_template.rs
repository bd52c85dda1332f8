//! HTML body of the call summary email.

use std::collections::BTreeSet;

const NO_SKILLS: &str = "No specific skills detected";

/// Render the summary email.  Interpolated values are HTML-escaped; transcript line breaks
/// become `<br>`.
pub fn render(
    recipient_name: &str,
    summary: &str,
    skills: &BTreeSet<String>,
    transcript: &str,
) -> String {
    let skills_text = if skills.is_empty() {
        NO_SKILLS.to_string()
    } else {
        skills
            .iter()
            .map(|s| escape_html(s))
            .collect::<Vec<String>>()
            .join(", ")
    };
    let transcript_html = transcript
        .lines()
        .map(escape_html)
        .collect::<Vec<String>>()
        .join("<br>");
    let name = escape_html(recipient_name);
    let summary = escape_html(summary);

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Your Hackbuddy Call Summary</title>
    <style>
        body {{ font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px; }}
        .header {{ background: linear-gradient(135deg, #4F46E5, #7C3AED); color: white; padding: 20px; border-radius: 8px 8px 0 0; text-align: center; }}
        .content {{ background-color: #ffffff; border: 1px solid #e0e0e0; border-top: none; border-radius: 0 0 8px 8px; padding: 20px; }}
        .section {{ margin-bottom: 25px; }}
        h1 {{ font-size: 24px; margin: 0; }}
        h2 {{ font-size: 20px; color: #4F46E5; margin-top: 0; border-bottom: 1px solid #e0e0e0; padding-bottom: 8px; }}
        .skills {{ background-color: #f5f7ff; padding: 15px; border-radius: 6px; margin-bottom: 20px; }}
        .skills-list {{ font-weight: 500; color: #4F46E5; }}
        .transcript {{ background-color: #f9f9f9; padding: 15px; border-radius: 6px; max-height: 300px; overflow-y: auto; font-size: 14px; }}
        .footer {{ text-align: center; font-size: 12px; color: #888; margin-top: 20px; }}
    </style>
</head>
<body>
    <div class="header">
        <h1>Your Hackbuddy Call Summary</h1>
    </div>
    <div class="content">
        <div class="section">
            <p>Hello {name},</p>
            <p>Thank you for using Hackbuddy! Here's a summary of your recent call with our AI assistant.</p>
        </div>
        <div class="section">
            <h2>Call Summary</h2>
            <p>{summary}</p>
        </div>
        <div class="section">
            <h2>Skills Mentioned</h2>
            <div class="skills">
                <p>Based on your conversation, we identified these skills:</p>
                <p class="skills-list">{skills_text}</p>
            </div>
        </div>
        <div class="section">
            <h2>Full Transcript</h2>
            <div class="transcript">{transcript_html}</div>
        </div>
        <div class="footer">
            <p>This is an automated message from Hackbuddy. Please do not reply to this email.</p>
        </div>
    </div>
</body>
</html>
"#
    )
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
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
