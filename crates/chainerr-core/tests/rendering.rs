use chainerr_core::{
    ArgValue, ChainableError, ErrorRef, ObserverRegistry, RenderConfig, StackFrame, set_html_error,
};
use pretty_assertions::assert_eq;
use serial_test::serial;

fn store_failure(registry: &ObserverRegistry) -> ChainableError {
    let root = ChainableError::builder("disk full")
        .class("IoError")
        .trace(vec![
            StackFrame::new("write")
                .with_class("Disk")
                .with_location("disk.rs", 10),
        ])
        .registry(registry)
        .build();

    ChainableError::builder("save failed")
        .class("StoreError")
        .cause(root)
        .trace(vec![
            StackFrame::new("save")
                .with_class("Store")
                .with_location("store.rs", 42)
                .with_args(vec![
                    ArgValue::from("12345678901234567890_text_of_17chars"),
                    ArgValue::Int(3),
                    ArgValue::Null,
                ]),
            StackFrame::new("main").with_location("main.rs", 5),
        ])
        .registry(registry)
        .build()
}

#[test]
fn text_rendering_golden() {
    let err = store_failure(&ObserverRegistry::new());
    assert_eq!(
        err.to_text(),
        "StoreError: save failed in store.rs on line 42\n \
         IoError: disk full in disk.rs on line 10\n\
         #0 store.rs:42 Store::save('1234567890123456...', 3, null)\n\
         #1 main.rs:5 main()\n\
         #2 {main}"
    );
}

#[test]
fn html_rendering_golden() {
    let err = store_failure(&ObserverRegistry::new());
    let expected = r##"<table border="1" cellspacing="0">
<tr><td colspan="3" bgcolor="#ff9999"> <b>StoreError</b>: save failed in <b>store.rs</b> on line <b>42</b></td></tr>
<tr><td colspan="3" bgcolor="#ff9999">- <b>IoError</b>: disk full in <b>disk.rs</b> on line <b>10</b></td></tr>
<tr><td colspan="3" bgcolor="#aaaaaa" align="center"><b>Exception trace</b></td></tr>
<tr><td align="center" bgcolor="#cccccc" width="20"><b>#</b></td><td align="center" bgcolor="#cccccc"><b>Function</b></td><td align="center" bgcolor="#cccccc"><b>Location</b></td></tr>
<tr><td align="center">0</td><td>Store::save('1234567890123456&hellip;', 3, null)</td><td>store.rs:42</td></tr>
<tr><td align="center">1</td><td>main()</td><td>main.rs:5</td></tr>
<tr><td align="center">2</td><td>{main}</td><td>&nbsp;</td></tr>
</table>"##;
    assert_eq!(err.to_html(), expected);
}

#[test]
fn text_ends_with_trace_after_all_causes() {
    let registry = ObserverRegistry::new();
    let inner = ChainableError::builder("inner").registry(&registry).build();
    let err = ChainableError::builder("outer")
        .causes(vec![
            ErrorRef::from(inner),
            ErrorRef::native(std::io::Error::other("leaf")),
        ])
        .registry(&registry)
        .build();

    let text = err.to_text();
    assert!(text.ends_with("{main}"), "{text}");

    let lines: Vec<&str> = text.lines().collect();
    let first_trace = lines
        .iter()
        .position(|line| line.starts_with('#'))
        .unwrap();
    assert_eq!(first_trace, 3);
    assert!(lines[..first_trace].iter().all(|line| line.contains(" on line ")));
    assert!(lines[first_trace..].iter().all(|line| line.starts_with('#')));
}

#[test]
fn html_escapes_script_in_message() {
    let err = ChainableError::builder("<script>alert('x')</script>")
        .trace(vec![StackFrame::new("handler").with_args(vec![ArgValue::from("<script>")])])
        .registry(&ObserverRegistry::new())
        .build();

    let html = err.to_html();
    assert!(!html.contains("<script>"), "{html}");
    assert!(html.contains("&lt;script&gt;alert(&#039;x&#039;)&lt;/script&gt;"));
    assert!(html.contains("<td>handler('&lt;script&gt;')</td><td>unknown:unknown</td>"));
}

#[test]
fn missing_frame_data_renders_placeholders() {
    let err = ChainableError::builder("bare")
        .trace(vec![StackFrame::new("anon")])
        .registry(&ObserverRegistry::new())
        .build();

    assert_eq!(
        err.to_text(),
        "ChainableError: bare in unknown on line unknown\n#0 unknown:unknown anon()\n#1 {main}"
    );
}

#[test]
fn custom_indent_and_arg_length() {
    let err = store_failure(&ObserverRegistry::new());
    let text = err.render(
        &RenderConfig::text()
            .with_indent_unit("..")
            .with_max_arg_len(4),
    );
    assert!(text.contains("\n..IoError: disk full"));
    assert!(text.contains("Store::save('1234...', 3, null)"));
}

#[test]
#[serial]
fn display_follows_html_flag() {
    let err = store_failure(&ObserverRegistry::new());

    set_html_error(false);
    assert_eq!(err.to_string(), err.to_text());

    set_html_error(true);
    assert_eq!(err.to_string(), err.to_html());

    set_html_error(false);
}
