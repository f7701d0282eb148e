use std::fmt::Write;

use crate::cause::CauseRecord;
use crate::render::args::format_arg_list;
use crate::render::{RenderConfig, RenderFormat};
use crate::trace::StackFrame;

pub(super) fn render(causes: &[CauseRecord], trace: &[StackFrame], config: &RenderConfig) -> String {
    let mut out = String::new();
    for (i, cause) in causes.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}{}: {} in {} on line {}",
            config.indent_unit.repeat(i),
            cause.class,
            cause.message,
            cause.file,
            cause.line
        );
    }

    for (i, frame) in trace.iter().enumerate() {
        let args = frame
            .args
            .as_deref()
            .map(|args| format_arg_list(args, RenderFormat::Text, config.max_arg_len))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "#{} {}:{} {}({})",
            i,
            frame.file_or_unknown(),
            frame.line_or_unknown(),
            frame.qualified_name(),
            args
        );
    }
    let _ = write!(out, "#{} {{main}}", trace.len());
    out
}
