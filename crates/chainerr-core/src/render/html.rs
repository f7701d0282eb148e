use std::fmt::Write;

use crate::cause::CauseRecord;
use crate::render::args::format_arg_list;
use crate::render::{RenderConfig, RenderFormat};
use crate::trace::StackFrame;

/// Escape `& < > " '` for html text and attribute values.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

pub(super) fn render(causes: &[CauseRecord], trace: &[StackFrame], config: &RenderConfig) -> String {
    let mut out = String::new();
    out.push_str("<table border=\"1\" cellspacing=\"0\">\n");
    for (i, cause) in causes.iter().enumerate() {
        let _ = writeln!(
            out,
            r##"<tr><td colspan="3" bgcolor="#ff9999">{} <b>{}</b>: {} in <b>{}</b> on line <b>{}</b></td></tr>"##,
            "-".repeat(i),
            escape_html(&cause.class),
            escape_html(&cause.message),
            escape_html(&cause.file),
            escape_html(&cause.line)
        );
    }

    out.push_str(concat!(
        r##"<tr><td colspan="3" bgcolor="#aaaaaa" align="center"><b>Exception trace</b></td></tr>"##,
        "\n",
        r##"<tr><td align="center" bgcolor="#cccccc" width="20"><b>#</b></td>"##,
        r##"<td align="center" bgcolor="#cccccc"><b>Function</b></td>"##,
        r##"<td align="center" bgcolor="#cccccc"><b>Location</b></td></tr>"##,
        "\n",
    ));

    for (i, frame) in trace.iter().enumerate() {
        let args = frame
            .args
            .as_deref()
            .map(|args| format_arg_list(args, RenderFormat::Html, config.max_arg_len))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            r#"<tr><td align="center">{}</td><td>{}({})</td><td>{}:{}</td></tr>"#,
            i,
            escape_html(&frame.qualified_name()),
            args,
            escape_html(frame.file_or_unknown()),
            frame.line_or_unknown()
        );
    }

    let _ = writeln!(
        out,
        r#"<tr><td align="center">{}</td><td>{{main}}</td><td>&nbsp;</td></tr>"#,
        trace.len()
    );
    out.push_str("</table>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#039;&amp;&#039;&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }
}
