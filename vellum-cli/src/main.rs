//! Vellum CLI
//!
//! Inspect what the live editor does with a document without running an
//! editor: the canonical markup and offset map, the editable region behind
//! a token, the style rules that apply to it and the page the preview
//! would show.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use serde::Serialize;
use vellum_common::protocol::{
    DEFAULT_IDENTITY_ATTRIBUTE, Envelope, PreviewMessage, PreviewSettings,
};
use vellum_css::{CssRuleDescriptor, CssRuleIndex, MediaEnvironment};
use vellum_editor::identity::find_token;
use vellum_editor::{
    DEFAULT_TOKEN_PREFIX, EditorRange, IdentityScheme, LineIndex, SourceTextLocator, canonicalize,
};
use vellum_html::parse_fragment;
use vellum_preview::{PreviewRuntime, RuntimeConfig};

/// Origin the CLI plays the editor under when driving a preview runtime.
const CLI_EDITOR_ORIGIN: &str = "vellum://editor";
/// Origin of the preview runtime the CLI drives.
const CLI_PREVIEW_ORIGIN: &str = "vellum://preview";

/// Vellum - canonicalization and preview inspector for the live editor
#[derive(Parser, Debug)]
#[command(name = "vellum")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Show canonical markup and the token-to-source map
    vellum canonicalize page.html

    # Same, with a custom identity scheme, as JSON
    vellum canonicalize page.html --attribute data-id --prefix n --json

    # Editable inner text and opening tag of element v3
    vellum text page.html v3
    vellum attrs page.html v3

    # Style rules that apply to v3 at a phone-sized viewport
    vellum rules site.css page.html v3 --width 375 --height 667

    # Every rule in a stylesheet
    vellum index site.css

    # The page the preview frame would build, content in a shadow root
    vellum preview page.html --css site.css --shadow
"#)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Identity attribute written onto every element
    #[arg(long, global = true, value_name = "NAME", default_value = DEFAULT_IDENTITY_ATTRIBUTE)]
    attribute: String,

    /// Prefix of minted identity tokens
    #[arg(long, global = true, value_name = "PREFIX", default_value = DEFAULT_TOKEN_PREFIX)]
    prefix: String,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Canonicalize an HTML file and print its offset map
    Canonicalize {
        /// HTML source file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Print the editable inner text of the element a token names
    Text {
        /// HTML source file
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Identity token
        token: String,
    },
    /// Print the editable opening tag of the element a token names
    Attrs {
        /// HTML source file
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Identity token
        token: String,
    },
    /// List the style rules that apply to the element a token names
    Rules {
        /// Stylesheet file
        #[arg(value_name = "CSS")]
        css: PathBuf,
        /// HTML source file
        #[arg(value_name = "HTML")]
        html: PathBuf,
        /// Identity token
        token: String,
        /// Viewport width for media queries (default: 1280)
        #[arg(long, default_value = "1280")]
        width: f64,
        /// Viewport height for media queries (default: 720)
        #[arg(long, default_value = "720")]
        height: f64,
    },
    /// List every style rule in a stylesheet
    Index {
        /// Stylesheet file
        #[arg(value_name = "CSS")]
        css: PathBuf,
    },
    /// Print the preview page for an HTML file
    Preview {
        /// HTML source file
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Stylesheet to apply
        #[arg(long, value_name = "CSS")]
        css: Option<PathBuf>,
        /// Attach the content under a shadow root
        #[arg(long)]
        shadow: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let scheme = IdentityScheme::new(&cli.attribute, &cli.prefix)?;
    match &cli.command {
        Command::Canonicalize { file } => run_canonicalize(&cli, &scheme, file),
        Command::Text { file, token } => run_text(&cli, &scheme, file, token),
        Command::Attrs { file, token } => run_attrs(&cli, &scheme, file, token),
        Command::Rules {
            css,
            html,
            token,
            width,
            height,
        } => run_rules(
            &cli,
            &scheme,
            css,
            html,
            token,
            &MediaEnvironment::with_viewport(*width, *height),
        ),
        Command::Index { css } => run_index(&cli, css),
        Command::Preview { file, css, shadow } => {
            run_preview(&scheme, file, css.as_deref(), *shadow)
        }
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn format_range(range: EditorRange) -> String {
    format!(
        "{}:{}-{}:{}",
        range.start_line_number, range.start_column, range.end_line_number, range.end_column
    )
}

fn run_canonicalize(cli: &Cli, scheme: &IdentityScheme, file: &Path) -> Result<()> {
    let html = read(file)?;
    let result = canonicalize(&html, scheme);
    if cli.json {
        return print_json(&result);
    }

    if let Some(error) = &result.error {
        println!("{} {error}", "warning:".yellow().bold());
    }

    println!("=== Canonical HTML ===");
    println!("{}", result.canonical_html);

    println!("\n=== Offset Map ===");
    let lines = LineIndex::new(&html);
    for (token, range) in result.entries_by_offset() {
        println!(
            "  {:<8} {:<16} bytes {}..{}",
            token.cyan(),
            format_range(lines.range(range)),
            range.start,
            range.end
        );
    }
    println!("\n{} elements", result.map.len());
    Ok(())
}

fn run_text(cli: &Cli, scheme: &IdentityScheme, file: &Path, token: &str) -> Result<()> {
    let html = read(file)?;
    let locator = SourceTextLocator::new(scheme.clone());
    let located = locator
        .editable_text(&html, token)
        .ok_or_else(|| anyhow!("{token} has no editable inner text"))?;
    if cli.json {
        return print_json(&located);
    }

    let lines = LineIndex::new(&html);
    println!("=== Text of {} ===", token.cyan());
    println!("{}", located.text);
    println!(
        "\n{} (bytes {}..{})",
        format_range(lines.range(located.range)),
        located.range.start,
        located.range.end
    );
    Ok(())
}

fn run_attrs(cli: &Cli, scheme: &IdentityScheme, file: &Path, token: &str) -> Result<()> {
    let html = read(file)?;
    let locator = SourceTextLocator::new(scheme.clone());
    let located = locator
        .editable_attributes(&html, token)
        .ok_or_else(|| anyhow!("{token} names no element in {}", file.display()))?;
    if cli.json {
        return print_json(&located);
    }

    let lines = LineIndex::new(&html);
    println!("=== Opening tag of {} ===", token.cyan());
    println!("<{}>", located.tag_name.bold());
    for attribute in &located.attributes {
        println!("  {} = {:?}", attribute.name.green(), attribute.value);
    }
    if let Some(identity) = &located.identity {
        println!("  {} = {:?} (identity)", identity.name.dimmed(), identity.value);
    }
    println!(
        "\n{} (bytes {}..{}){}{}",
        format_range(lines.range(located.range)),
        located.range.start,
        located.range.end,
        if located.is_void { ", void" } else { "" },
        if located.self_closing { ", self-closing" } else { "" }
    );
    Ok(())
}

fn print_rules(css: &str, rules: &[CssRuleDescriptor]) {
    let lines = LineIndex::new(css);
    for rule in rules {
        let location = rule
            .range()
            .map_or_else(String::new, |range| format_range(lines.range(range)));
        print!("  {:<16} {}", location, rule.selector_text.green());
        for query in &rule.media_queries {
            print!("  {} {query}", "@media".dimmed());
        }
        println!();
    }
}

fn run_rules(
    cli: &Cli,
    scheme: &IdentityScheme,
    css_path: &Path,
    html_path: &Path,
    token: &str,
    env: &MediaEnvironment,
) -> Result<()> {
    let css = read(css_path)?;
    let html = read(html_path)?;
    let tree = parse_fragment(&html)?;
    let assignment = find_token(&tree, scheme, html.len(), token)
        .ok_or_else(|| anyhow!("{token} names no element in {}", html_path.display()))?;
    let rules = CssRuleIndex::parse(&css).matching(&tree, assignment.node, env);
    if cli.json {
        return print_json(&rules);
    }

    println!(
        "=== Rules for {} ({}x{}) ===",
        token.cyan(),
        env.width,
        env.height
    );
    print_rules(&css, &rules);
    println!("\n{} matching rules", rules.len());
    Ok(())
}

fn run_index(cli: &Cli, css_path: &Path) -> Result<()> {
    let css = read(css_path)?;
    let index = CssRuleIndex::parse(&css);
    if cli.json {
        return print_json(index.rules());
    }

    println!("=== Rule Index ===");
    print_rules(&css, index.rules());
    println!("\n{} rules", index.rules().len());
    Ok(())
}

fn run_preview(
    scheme: &IdentityScheme,
    file: &Path,
    css_path: Option<&Path>,
    shadow_mode: bool,
) -> Result<()> {
    let html = read(file)?;
    let css = css_path.map(read).transpose()?.unwrap_or_default();
    let result = canonicalize(&html, scheme);
    if let Some(error) = &result.error {
        log::warn!("previewing raw source: {error}");
    }

    let settings = PreviewSettings {
        identity_attribute: scheme.attribute.clone(),
        shadow_mode,
        ..PreviewSettings::default()
    };
    let mut runtime = PreviewRuntime::new(
        RuntimeConfig::new(CLI_PREVIEW_ORIGIN, CLI_EDITOR_ORIGIN),
        Vec::new(),
    );
    for message in [
        PreviewMessage::Init {
            session_id: "cli:1".to_string(),
            settings,
        },
        PreviewMessage::Render {
            canonical_html: result.canonical_html,
            css_text: css,
            shadow_mode,
            highlight: false,
        },
    ] {
        runtime.handle_message(Envelope {
            origin: CLI_EDITOR_ORIGIN.to_string(),
            message,
        });
    }

    println!("{}", runtime.document_html());
    Ok(())
}
