//! Rendering through the command-line front end.

use std::fs;
use std::io::Cursor;

use clap::Parser;
use weft_cli::{build_registry, render, Cli};

fn cli(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("weft").chain(args.iter().copied())).unwrap()
}

fn render_stdin(args: &[&str], template: &str) -> (String, anyhow::Result<()>) {
    let mut out = Vec::new();
    let result = render(&cli(args), &mut Cursor::new(template.as_bytes()), &mut out);
    (String::from_utf8(out).unwrap(), result)
}

#[test]
fn renders_stdin_with_set_bindings() {
    let (out, result) = render_stdin(&["-s", "place=world"], "hello <!--%place%-->!");
    result.unwrap();
    assert_eq!(out, "hello world!");
}

#[test]
fn later_sets_win() {
    let (out, result) = render_stdin(&["-s", "a=1", "-s", "a=2"], "<!--%a%-->");
    result.unwrap();
    assert_eq!(out, "2");
}

#[test]
fn unclosed_tag_fails_but_keeps_output() {
    let (out, result) = render_stdin(&[], "ok <!--%IF=x");
    assert!(result.is_err());
    assert_eq!(out, "ok [unclosed tag]");
}

#[test]
fn delimiter_overrides() {
    let (out, result) = render_stdin(
        &["--start", "{{", "--end", "}}", "--field", ":", "-s", "on=1"],
        "{{IF:on:yes}} <!--%on%-->",
    );
    result.unwrap();
    assert_eq!(out, "yes <!--%on%-->");
}

#[test]
fn extensions_flag_registers_escape_tags() {
    let template = "<!--%ESCAPE-HTML=<!--%v%-->%-->";
    let (plain, _) = render_stdin(&["-s", "v=<b>"], template);
    assert_eq!(plain, "");
    let (escaped, result) = render_stdin(&["--extensions", "-s", "v=<b>"], template);
    result.unwrap();
    assert_eq!(escaped, "&lt;b&gt;");
}

#[test]
fn iteration_limit_flag() {
    let template = "<!--%REPEAT2=xs=x=,=.%-->";
    let (out, result) = render_stdin(&["-s", "xs=a", "--max-iterations", "3"], template);
    assert!(result.is_err());
    assert_eq!(out, "...");
}

#[test]
fn html_mode_writes_headers_and_cookies() {
    let (out, result) = render_stdin(&["--no-cache", "--cookie", "sid=42"], "<p>hi</p>");
    result.unwrap();
    assert_eq!(
        out,
        "Content-type: text/html\n\
         Pragma: no-cache\n\
         Expires: Thu, 1 Jan 1970 00:00:01 GMT\n\
         Set-Cookie: sid=42; PATH=/\n\
         \n\
         <p>hi</p>"
    );
}

#[test]
fn config_vars_and_template_files() {
    let dir = tempfile::tempdir().unwrap();
    let footer = dir.path().join("footer.tmpl");
    let config = dir.path().join("weft.yaml");
    let vars = dir.path().join("vars.json");
    let page = dir.path().join("page.tmpl");

    fs::write(&footer, "-- <!--%site%-->").unwrap();
    fs::write(
        &config,
        format!(
            "tags:\n  site: Example\n  title: From config\nincludes:\n  footer: {}\n",
            footer.display()
        ),
    )
    .unwrap();
    fs::write(&vars, r#"{"title": "From vars", "n": 3}"#).unwrap();
    fs::write(&page, "<!--%title%--> (<!--%n%-->)\n<!--%footer%-->").unwrap();

    let args = cli(&[
        "-c",
        config.to_str().unwrap(),
        "--vars",
        vars.to_str().unwrap(),
        page.to_str().unwrap(),
    ]);
    let mut out = Vec::new();
    render(&args, &mut Cursor::new(Vec::new()), &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "From vars (3)\n-- Example");
}

#[test]
fn missing_template_is_an_error() {
    let args = cli(&["/no/such/template.tmpl"]);
    let mut out = Vec::new();
    let err = render(&args, &mut Cursor::new(Vec::new()), &mut out).unwrap_err();
    assert!(format!("{err:#}").contains("/no/such/template.tmpl"));
}

#[test]
fn invalid_delimiters_are_rejected() {
    assert!(build_registry(&cli(&["--start", ""])).is_err());
}

#[test]
fn unbounded_clears_the_limit() {
    let registry = build_registry(&cli(&["--unbounded"])).unwrap();
    assert_eq!(registry.max_repeat_iterations(), None);
    let registry = build_registry(&cli(&[])).unwrap();
    assert_eq!(registry.max_repeat_iterations(), Some(weft::DEFAULT_MAX_REPEAT_ITERATIONS));
}
