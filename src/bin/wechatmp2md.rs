//! Command-line converter: article URL or saved page in, Markdown out.
//!
//! Usage: `wechatmp2md <url-or-file> [output-dir] [--image url|save|base64] [--proxy host:port] [--json]`
//!
//! Writes `<output-dir>/<title>.md` plus any images saved as files. With
//! `--json` the article model is printed to stdout instead.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;
use wechatmp2markdown::markdown::format_article;
use wechatmp2markdown::{fetch_article, parse_file, Article, ImagePolicy, Options};

const USAGE: &str =
    "usage: wechatmp2md <url-or-file> [output-dir] [--image url|save|base64] [--proxy host:port] [--json]";

struct Args {
    input: String,
    output_dir: PathBuf,
    options: Options,
    json: bool,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut positional = Vec::new();
    let mut options = Options::default();
    let mut json = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--image" => {
                let value = args.next().ok_or("--image needs a value")?;
                options.image_policy = ImagePolicy::from_arg(&value);
            }
            "--proxy" => {
                options.proxy = Some(args.next().ok_or("--proxy needs a value")?);
            }
            "--json" => json = true,
            "-h" | "--help" => return Err(USAGE.to_string()),
            flag if flag.starts_with("--") => return Err(format!("unknown option {flag}\n{USAGE}")),
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let input = positional.next().ok_or(USAGE)?;
    let output_dir = positional.next().map_or_else(|| PathBuf::from("."), PathBuf::from);
    Ok(Args {
        input,
        output_dir,
        options,
        json,
    })
}

/// File name for the article, with path separators and reserved characters
/// replaced.
fn file_stem(title: &str) -> String {
    let stem: String = title
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let stem = stem.trim();
    if stem.is_empty() {
        "article".to_string()
    } else {
        stem.to_string()
    }
}

fn convert(args: &Args) -> wechatmp2markdown::Result<Article> {
    if args.input.starts_with("http://") || args.input.starts_with("https://") {
        fetch_article(&args.input, &args.options)
    } else {
        parse_file(&args.input, &args.options)
    }
}

fn write_output(dir: &Path, article: &Article) -> std::io::Result<PathBuf> {
    let output = format_article(article);
    std::fs::create_dir_all(dir)?;
    for (name, bytes) in &output.images {
        std::fs::write(dir.join(name), bytes)?;
    }
    let path = dir.join(format!("{}.md", file_stem(article.title_text())));
    std::fs::write(&path, output.markdown)?;
    Ok(path)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::FAILURE;
        }
    };

    let article = match convert(&args) {
        Ok(article) => article,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if args.json {
        return match serde_json::to_string_pretty(&article) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: {e}");
                ExitCode::FAILURE
            }
        };
    }

    match write_output(&args.output_dir, &article) {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
