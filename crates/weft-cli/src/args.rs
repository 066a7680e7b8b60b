use std::path::PathBuf;

use clap::Parser;

/// Render a weft template.
#[derive(Debug, Parser)]
#[command(name = "weft", author, version, about, long_about = None)]
pub struct Cli {
    /// Template file; reads standard input when omitted or `-`
    pub template: Option<PathBuf>,

    /// Bind NAME to VALUE (repeatable)
    #[arg(short, long = "set", value_name = "NAME=VALUE", value_parser = parse_binding)]
    pub set: Vec<(String, String)>,

    /// Flat name/value map to bind, JSON (`.json`) or YAML
    #[arg(long, value_name = "FILE")]
    pub vars: Option<PathBuf>,

    /// YAML configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Opening tag delimiter
    #[arg(long, value_name = "DELIM")]
    pub start: Option<String>,

    /// Closing tag delimiter
    #[arg(long, value_name = "DELIM")]
    pub end: Option<String>,

    /// Field delimiter inside tags
    #[arg(long, value_name = "DELIM")]
    pub field: Option<String>,

    /// Maximum passes a REPEAT2 or STRUCT loop may make
    #[arg(long, value_name = "N", conflicts_with = "unbounded")]
    pub max_iterations: Option<usize>,

    /// Let loops run without an iteration limit
    #[arg(long)]
    pub unbounded: bool,

    /// Kill EXEC commands that run longer than this
    #[arg(long, value_name = "MS")]
    pub exec_timeout_ms: Option<u64>,

    /// Register ESCAPE-JS, ESCAPE-HTML and STRUCT
    #[arg(long)]
    pub extensions: bool,

    /// Write an HTTP header block before the output
    #[arg(long)]
    pub html: bool,

    /// Add no-cache headers (implies --html)
    #[arg(long)]
    pub no_cache: bool,

    /// Set a cookie in the header block (implies --html, repeatable)
    #[arg(long, value_name = "NAME=VALUE[:TTL]", value_parser = parse_cookie)]
    pub cookie: Vec<CookieArg>,

    /// Output file (default: standard output)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn html_mode(&self) -> bool {
        self.html || self.no_cache || !self.cookie.is_empty()
    }

    /// The template path, or `None` for standard input.
    pub fn template_path(&self) -> Option<&PathBuf> {
        self.template.as_ref().filter(|path| path.as_os_str() != "-")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieArg {
    pub name: String,
    pub value: String,
    pub ttl: Option<u64>,
}

pub fn parse_binding(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, _)) if name.is_empty() => Err("name must not be empty".to_string()),
        Some((name, value)) => Ok((name.to_string(), value.to_string())),
        None => Err(format!("expected NAME=VALUE, got `{raw}`")),
    }
}

/// `NAME=VALUE` or `NAME=VALUE:TTL`; a suffix that is not a number stays part
/// of the value.
pub fn parse_cookie(raw: &str) -> Result<CookieArg, String> {
    let (name, rest) = parse_binding(raw)?;
    let (value, ttl) = match rest.rsplit_once(':') {
        Some((value, ttl)) => match ttl.parse::<u64>() {
            Ok(ttl) => (value.to_string(), Some(ttl)),
            Err(_) => (rest.clone(), None),
        },
        None => (rest.clone(), None),
    };
    Ok(CookieArg { name, value, ttl })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bindings() {
        assert_eq!(parse_binding("a=1"), Ok(("a".into(), "1".into())));
        assert_eq!(parse_binding("a=b=c"), Ok(("a".into(), "b=c".into())));
        assert_eq!(parse_binding("a="), Ok(("a".into(), String::new())));
        assert!(parse_binding("=1").is_err());
        assert!(parse_binding("plain").is_err());
    }

    #[test]
    fn cookies() {
        assert_eq!(
            parse_cookie("sid=abc:3600"),
            Ok(CookieArg { name: "sid".into(), value: "abc".into(), ttl: Some(3600) })
        );
        assert_eq!(
            parse_cookie("sid=abc"),
            Ok(CookieArg { name: "sid".into(), value: "abc".into(), ttl: None })
        );
        assert_eq!(
            parse_cookie("url=http://x"),
            Ok(CookieArg { name: "url".into(), value: "http://x".into(), ttl: None })
        );
    }

    #[test]
    fn parses_a_full_command_line() {
        let cli = Cli::try_parse_from([
            "weft", "-s", "a=1", "--set", "b=2", "--field", "|", "--cookie", "k=v:10", "page.tmpl",
        ])
        .unwrap();
        assert_eq!(cli.set.len(), 2);
        assert_eq!(cli.field.as_deref(), Some("|"));
        assert!(cli.html_mode());
        assert_eq!(cli.template_path(), Some(&PathBuf::from("page.tmpl")));
    }

    #[test]
    fn dash_means_stdin() {
        let cli = Cli::try_parse_from(["weft", "-"]).unwrap();
        assert!(cli.template_path().is_none());
        assert!(!cli.html_mode());
    }

    #[test]
    fn limit_flags_conflict() {
        assert!(Cli::try_parse_from(["weft", "--max-iterations", "3", "--unbounded"]).is_err());
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
