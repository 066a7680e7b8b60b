//! End-to-end template scenarios.

use std::cell::RefCell;
use std::fs;
use std::io::Write;
use std::rc::Rc;

use weft::{
    status_code, Binding, BufferSource, Captured, EngineConfig, FunctionTag, IncludeTag, MockEnv,
    Registry, Result, ShellError, Tag, TagHeader, TemplateError, TypedTag, ValueTag,
};

fn render(registry: &mut Registry, template: &str) -> (String, Result<()>) {
    let mut out = Vec::new();
    let result = registry.evaluate_str(template, &mut out);
    (String::from_utf8(out).unwrap(), result)
}

// =============================================================================
// Basic rendering
// =============================================================================

#[test]
fn hello_world() {
    let mut registry = Registry::new();
    registry.set("place", "world");
    assert_eq!(registry.render_str("hello <!--%place%-->!").unwrap(), "hello world!");
}

#[test]
fn empty_flag_hides_body() {
    let mut registry = Registry::new();
    registry.set("flag", "");
    assert_eq!(registry.render_str("<!--%IF=flag=yes%-->").unwrap(), "");
}

#[test]
fn unclosed_tag_is_reported() {
    let mut registry = Registry::new();
    let (out, result) = render(&mut registry, "<!--%IF=x");
    assert!(out.contains("[unclosed tag]"));
    assert!(matches!(result, Err(TemplateError::UnclosedTag { offset: 0 })));
    assert_eq!(status_code(&result), -1);
}

#[test]
fn nested_span_reaches_outer_handler_verbatim() {
    struct Capture(TagHeader);

    impl Tag for Capture {
        fn header(&self) -> &TagHeader {
            &self.0
        }
        fn header_mut(&mut self) -> &mut TagHeader {
            &mut self.0
        }
        fn matches(&self, span: &[u8]) -> bool {
            span.starts_with(b" OUTER")
        }
        fn evaluate(&self, span: &[u8], _: &mut Registry, out: &mut dyn Write) -> Result<()> {
            out.write_all(b"{")?;
            out.write_all(span)?;
            out.write_all(b"}")?;
            Ok(())
        }
    }

    let mut registry = Registry::new();
    registry.add(Capture(TagHeader::new("capture")));
    let out = registry
        .render_str("a<!--% OUTER <!--% INNER %--> %-->b")
        .unwrap();
    assert_eq!(out, "a{ OUTER <!--% INNER %--> }b");
}

#[test]
fn relational_tags_select_branches() {
    let mut registry = Registry::new();
    registry.set("plan", "pro");
    let template = "<!--%IF_EQ=plan=pro=Pro%--><!--%IF_NOT_EQ=plan=pro=Free%--> plan";
    assert_eq!(registry.render_str(template).unwrap(), "Pro plan");
    registry.set("plan", "basic");
    assert_eq!(registry.render_str(template).unwrap(), "Free plan");
}

// =============================================================================
// REPEAT2
// =============================================================================

#[test]
fn repeat_over_three_records() {
    let mut registry = Registry::new();
    registry.set("letters", "a,b,c");
    let out = registry
        .render_str("<ul><!--%REPEAT2=letters=letter=,=<li><!--%letter%--></li>%--></ul>")
        .unwrap();
    assert_eq!(out, "<ul><li>a</li><li>b</li><li>c</li></ul>");
}

#[test]
fn repeat_body_may_use_conditionals_on_the_record() {
    let mut registry = Registry::new();
    registry.set("names", "ann;bob;cid;");
    let out = registry
        .render_str(
            "<!--%REPEAT2=names=n=;=<!--%IF_EQ=row_num=2=*%--><!--%n%--> %-->",
        )
        .unwrap();
    assert_eq!(out, "ann *bob cid ");
}

#[test]
fn repeat_with_custom_field_delimiter() {
    let mut registry = Registry::new();
    registry.set_field_delimiter("|").unwrap();
    registry.add(weft::RepeatTag::new());
    registry.set("xs", "1=2=3");
    let out = registry.render_str("<!--%REPEAT2|xs|x|=|<<!--%x%-->>%-->").unwrap();
    assert_eq!(out, "<1><2><3>");
}

#[test]
fn repeat_limit_from_config() {
    let config = EngineConfig::from_yaml("max_repeat_iterations: 2").unwrap();
    let mut registry = Registry::with_config(config).unwrap();
    registry.set("xs", "a,b,c");
    let (out, result) = render(&mut registry, "<!--%REPEAT2=xs=x=,=<!--%x%-->%-->");
    assert_eq!(out, "ab");
    assert!(matches!(result, Err(TemplateError::IterationLimit { limit: 2, .. })));
    assert!(registry.get("x").is_none());
}

// =============================================================================
// Files
// =============================================================================

#[test]
fn page_with_header_include() {
    let dir = tempfile::tempdir().unwrap();
    let header = dir.path().join("header.tmpl");
    let page = dir.path().join("page.tmpl");
    fs::write(&header, "<h1><!--%title%--></h1>").unwrap();
    fs::write(&page, "<!--%header%-->\n<p><!--%ENV=GREETING%--></p>").unwrap();

    let mut registry = Registry::new();
    registry.set_env(MockEnv::new().with_var("GREETING", "hi"));
    registry.add_all([
        Binding::text("title", "Welcome"),
        Binding::Tag(Box::new(IncludeTag::named(
            "header",
            header.to_string_lossy().into_owned(),
        ))),
    ]);

    let mut out = Vec::new();
    registry.evaluate_file(&page, &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "<h1>Welcome</h1>\n<p>hi</p>");
}

#[test]
fn evaluate_source_from_buffer() {
    let mut registry = Registry::new();
    registry.set("a", "1");
    let mut source = BufferSource::new(b"<!--%a%-->+<!--%a%-->".to_vec());
    let mut out = Vec::new();
    registry.evaluate_source(&mut source, &mut out).unwrap();
    assert_eq!(out, b"1+1");
}

#[test]
fn missing_file_returns_open_error_without_output() {
    let mut registry = Registry::new();
    let mut out = Vec::new();
    let result = registry.evaluate_file("/no/such/dir/page.tmpl", &mut out);
    assert!(out.is_empty());
    assert_eq!(status_code(&result), -2);
}

// =============================================================================
// Host integration
// =============================================================================

#[test]
fn pre_scan_hook_writes_headers_from_context() {
    #[derive(Default)]
    struct Headers(Vec<String>);

    let mut registry = Registry::new();
    registry.set_context(Headers::default());
    registry.add(TypedTag::new("HEADER", |fields, registry, _| {
        if let Some(headers) = registry.context_mut::<Headers>() {
            headers.0.push(fields.get_str(1).into_owned());
        }
        Ok(())
    }));
    registry.set_pre_scan_hook(|registry, out| {
        if let Some(headers) = registry.context::<Headers>() {
            for header in &headers.0 {
                writeln!(out, "{header}")?;
            }
        }
        writeln!(out)?;
        Ok(())
    });

    registry.context_mut::<Headers>().unwrap().0.push("X-Early: 1".into());
    let out = registry.render_str("body<!--%HEADER=X-Late: 2%-->").unwrap();
    assert_eq!(out, "X-Early: 1\n\nbody");

    let out = registry.render_str("again").unwrap();
    assert_eq!(out, "X-Early: 1\nX-Late: 2\n\nagain");
}

#[test]
fn function_tags_can_mutate_the_registry_mid_render() {
    let mut registry = Registry::new();
    registry.add(FunctionTag::named("login", |registry, _| {
        registry.set("user", "ada");
        Ok(())
    }));
    let out = registry
        .render_str("[<!--%IF=user=early%-->]<!--%login%-->[<!--%IF=user=<!--%user%-->%-->]")
        .unwrap();
    assert_eq!(out, "[][ada]");
}

#[test]
fn exec_output_is_inlined() {
    let calls = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&calls);
    let mut registry = Registry::new();
    registry.set_command_runner(move |command: &str| -> std::result::Result<Captured, ShellError> {
        *counter.borrow_mut() += 1;
        Ok(Captured::from_stdout(command.to_uppercase()))
    });
    registry.set("cmd", "whoami");
    let out = registry
        .render_str("<!--%EXEC=cmd%--> / <!--%EXEC_SHARED=nothing%-->")
        .unwrap();
    assert_eq!(out, "WHOAMI / ");
    assert_eq!(*calls.borrow(), 1);
}

#[test]
fn scoped_bindings_shadow_during_nested_render() {
    let mut registry = Registry::new();
    registry.set("who", "registry");
    registry.add(FunctionTag::named("guest", |registry, out| {
        registry.scoped(|registry| {
            registry.bind(ValueTag::new("who", "guest"));
            registry.evaluate_str("<!--%who%-->", out)
        })
    }));
    let out = registry.render_str("<!--%who%-->,<!--%guest%-->,<!--%who%-->").unwrap();
    assert_eq!(out, "registry,guest,registry");
}
