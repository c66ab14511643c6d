use std::io::Read;
use std::path::PathBuf;

use bbdown_engine::bbdown::{self, StreamListing};
use bbdown_engine::config;
use bbdown_engine::paths::AppPaths;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default, PartialEq, Eq)]
struct CliArgs {
    base_dir: Option<PathBuf>,
    from_stdin: bool,
    json: bool,
    tools: bool,
    url: Option<String>,
}

fn main() -> Result<(), String> {
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(cli) = parse_args(&args)? else {
        print_help();
        return Ok(());
    };

    let paths = || AppPaths::new(cli.base_dir.clone().unwrap_or_else(default_base_dir));

    if cli.tools {
        let paths = paths();
        let prefs = config::load_preferences(&paths).map_err(|e| e.to_string())?;
        println!("BBDown: {}", prefs.bbdown_cmd(&paths).display());
        println!("ffmpeg: {}", paths.ffmpeg_cmd().display());
        println!("aria2c: {}", paths.aria2c_cmd().display());
        return Ok(());
    }

    let listing = if cli.from_stdin {
        let mut raw = Vec::new();
        std::io::stdin()
            .read_to_end(&mut raw)
            .map_err(|e| format!("failed to read stdin: {e}"))?;
        bbdown::listing_from_stdout("", &raw)
    } else {
        let url = cli.url.as_deref().unwrap_or_default();
        let paths = paths();
        let prefs = config::load_preferences(&paths).map_err(|e| e.to_string())?;
        bbdown::fetch_stream_list(&paths, &prefs, url).map_err(|e| e.to_string())?
    };

    if cli.json {
        let out = serde_json::to_string_pretty(&listing.streams).map_err(|e| e.to_string())?;
        println!("{out}");
    } else {
        print!("{}", render_listing(&listing));
    }

    Ok(())
}

/// Returns `None` when help was requested. `args` excludes the program name.
fn parse_args(args: &[String]) -> Result<Option<CliArgs>, String> {
    if args.iter().any(|a| a == "-h" || a == "--help") {
        return Ok(None);
    }

    let mut cli = CliArgs::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--base-dir" => {
                i += 1;
                let v = args
                    .get(i)
                    .ok_or_else(|| "--base-dir requires a value".to_string())?;
                cli.base_dir = Some(PathBuf::from(v));
            }
            "--stdin" => cli.from_stdin = true,
            "--json" => cli.json = true,
            "--tools" => cli.tools = true,
            other if other.starts_with('-') => {
                return Err(format!("unknown arg: {other} (try --help)"))
            }
            other => {
                if cli.url.is_some() {
                    return Err(format!("unexpected extra argument: {other}"));
                }
                cli.url = Some(other.to_string());
            }
        }
        i += 1;
    }

    let sources = [cli.from_stdin, cli.url.is_some(), cli.tools]
        .iter()
        .filter(|set| **set)
        .count();
    match sources {
        0 => Err("nothing to do (pass a URL, --stdin or --tools)".to_string()),
        1 => Ok(Some(cli)),
        _ => Err("pass only one of a URL, --stdin or --tools".to_string()),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn default_base_dir() -> PathBuf {
    if let Ok(v) = std::env::var("BBDOWN_GUI_BASE_DIR") {
        let t = v.trim();
        if !t.is_empty() {
            return PathBuf::from(t);
        }
    }
    AppPaths::default_resource_dir()
}

fn render_listing(listing: &StreamListing) -> String {
    let mut out = String::from("Extracted Streams:\n");
    for stream in &listing.streams {
        out.push_str(&format!(
            "Index: {}, Tags: {}, URL: {}\n",
            stream.index,
            render_tag_list(&stream.tags),
            stream.url
        ));
    }
    out
}

/// Renders tags as `['DASH', 'HEVC']`, the way the GUI's log shows a list.
fn render_tag_list(tags: &[String]) -> String {
    let items: Vec<String> = tags.iter().map(|t| quote_tag(t)).collect();
    format!("[{}]", items.join(", "))
}

fn quote_tag(tag: &str) -> String {
    let quote = if tag.contains('\'') && !tag.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(tag.len() + 2);
    out.push(quote);
    for ch in tag.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

fn print_help() {
    println!(
        r#"bbdown_streams

Lists the streams BBDown reports for a video (BBDown -info).

Usage:
  bbdown_streams https://www.bilibili.com/video/BV1VUzTB3Ecb
  BBDown -info <url> | bbdown_streams --stdin --json

Options:
  --base-dir <path>  Directory holding utils/BBDown (default: $BBDOWN_GUI_BASE_DIR, else the executable's dir)
  --stdin            Parse BBDown output from stdin instead of running BBDown
  --json             Print records as a JSON array
  --tools            Print where BBDown, ffmpeg and aria2c resolve to
  RUST_LOG=debug     Show tool invocation details on stderr
"#
    );
}
