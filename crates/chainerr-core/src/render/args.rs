//! Human-readable rendering of captured call arguments.

use crate::render::RenderFormat;
use crate::render::html::escape_html;
use crate::trace::ArgValue;

/// Strings longer than this are cut in trace output.
pub const DEFAULT_MAX_ARG_LEN: usize = 16;

const TEXT_ELLIPSIS: &str = "...";
const HTML_ELLIPSIS: &str = "&hellip;";

/// Render one argument for the given output format.
pub fn format_arg(arg: &ArgValue, format: RenderFormat, max_len: usize) -> String {
    match arg {
        ArgValue::Null => "null".to_string(),
        ArgValue::Array(_) => "Array".to_string(),
        ArgValue::Object { type_name } => match format {
            RenderFormat::Text => format!("Object({type_name})"),
            RenderFormat::Html => format!("Object({})", escape_html(type_name)),
        },
        ArgValue::Bool(value) => value.to_string(),
        ArgValue::Int(value) => value.to_string(),
        ArgValue::Float(value) => value.to_string(),
        ArgValue::Str(value) => quote_str(value, format, max_len),
    }
}

/// Render an argument list, comma separated.
pub fn format_arg_list(args: &[ArgValue], format: RenderFormat, max_len: usize) -> String {
    args.iter()
        .map(|arg| format_arg(arg, format, max_len))
        .collect::<Vec<_>>()
        .join(", ")
}

fn quote_str(value: &str, format: RenderFormat, max_len: usize) -> String {
    let head: String = value.chars().take(max_len).collect();
    let truncated = value.chars().nth(max_len).is_some();
    let mut out = match format {
        RenderFormat::Text => head,
        RenderFormat::Html => escape_html(&head),
    };
    if truncated {
        out.push_str(match format {
            RenderFormat::Text => TEXT_ELLIPSIS,
            RenderFormat::Html => HTML_ELLIPSIS,
        });
    }
    format!("'{out}'")
}
