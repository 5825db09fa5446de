//! magrender - render magazine descriptions to HTML or PDF

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use log::{info, LevelFilter};

use magrender::{Dom, Magazine, MagazineRenderer, RenderConfig, SerializeOptions};

#[derive(Parser)]
#[command(name = "magrender")]
#[command(version, about = "Declarative magazine renderer", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a magazine description to a standalone HTML document
    Html {
        /// Magazine description (JSON)
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Render, fit in headless Chrome and print to PDF (needs the `cdp` feature)
    Pdf {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        /// Paper size for every page (defaults to the first page's size)
        #[arg(long)]
        paper: Option<String>,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Validate a description without rendering it
    Check {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        #[command(flatten)]
        render: RenderArgs,
    },
}

#[derive(clap::Args)]
struct RenderArgs {
    /// Document dialect
    #[arg(long, value_enum, default_value_t = Dialect::Magazine)]
    dialect: Dialect,

    /// JSON render configuration (overrides --dialect)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Skip the overflow fitting pass
    #[arg(long)]
    no_fit: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Dialect {
    /// Landscape flip, `content` main region, plain tags
    Magazine,
    /// Rotation, `body` main region, prefixed tags
    Pages,
}

impl RenderArgs {
    fn to_config(&self) -> magrender::Result<RenderConfig> {
        let mut cfg = match &self.config {
            Some(path) => RenderConfig::from_json_file(path)?,
            None => match self.dialect {
                Dialect::Magazine => RenderConfig::magazine(),
                Dialect::Pages => RenderConfig::pages(),
            },
        };
        if self.no_fit {
            cfg.resolve_overflow = false;
        }
        Ok(cfg)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env().filter_level(level).init();

    let result = match cli.command {
        Commands::Html { input, output, render } => html(&input, output.as_deref(), &render),
        Commands::Pdf {
            input,
            output,
            paper,
            render,
        } => pdf(&input, &output, paper.as_deref(), &render),
        Commands::Check { input, render } => check(&input, &render),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn read_magazine(path: &Path) -> magrender::Result<Magazine> {
    let data = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

fn html(input: &Path, output: Option<&Path>, args: &RenderArgs) -> magrender::Result<()> {
    let cfg = args.to_config()?;
    let magazine = read_magazine(input)?;
    let html = magrender::render_html(&magazine, &cfg)?;
    match output {
        Some(path) => {
            std::fs::write(path, &html)?;
            info!("wrote {}", path.display());
        }
        None => print!("{html}"),
    }
    Ok(())
}

#[cfg(feature = "cdp")]
fn pdf(input: &Path, output: &Path, paper: Option<&str>, args: &RenderArgs) -> magrender::Result<()> {
    use magrender::cdp::CdpExporter;
    use magrender::export::{export_to_file, ExportConfig};
    use magrender::model::PageSize;

    let cfg = args.to_config()?;
    let magazine = read_magazine(input)?;
    let paper = match paper {
        Some(name) => Some(
            PageSize::parse(name).ok_or_else(|| magrender::Error::ConfigError(format!("unknown paper size '{name}'")))?,
        ),
        None => None,
    };

    let mut exporter = CdpExporter::new(ExportConfig {
        paper,
        ..Default::default()
    })?;
    let written = export_to_file(&mut exporter, &magazine, &cfg, output);
    exporter.close()?;
    println!("{}: {} bytes", output.display(), written?);
    Ok(())
}

#[cfg(not(feature = "cdp"))]
fn pdf(_input: &Path, _output: &Path, _paper: Option<&str>, _args: &RenderArgs) -> magrender::Result<()> {
    Err(magrender::Error::ExportError(
        "PDF export needs a build with the `cdp` feature".into(),
    ))
}

fn check(input: &Path, args: &RenderArgs) -> magrender::Result<()> {
    let cfg = args.to_config()?;
    let magazine = read_magazine(input)?;

    let mut dom = Dom::new("body");
    let root = dom.root();
    let built = MagazineRenderer::new(cfg)?.build(&mut dom, root, &magazine)?;

    println!("{}: ok", input.display());
    println!("Pages: {}", built.pages().len());
    for (ty, count) in built.section_counts(&dom) {
        println!("  {ty}: {count}");
    }
    info!(
        "{} bytes of HTML",
        dom.to_html(built.container(), SerializeOptions::default()).len()
    );
    Ok(())
}
