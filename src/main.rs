use std::io::{self, BufRead};
use std::path::PathBuf;

use clap::Parser;

/// Headless greeting-card editor: replay a command script, export the card.
#[derive(Parser, Debug)]
#[command(name = "cardpress", version, about)]
struct Args {
    /// Command script (line-delimited JSON); reads stdin when omitted
    #[arg(long)]
    script: Option<PathBuf>,

    /// Output path for the exported image
    #[arg(long, default_value = "export.png")]
    out: PathBuf,

    /// Export as JPEG at the given quality (1-100) instead of PNG
    #[arg(long, value_name = "QUALITY")]
    jpeg: Option<u8>,

    /// List the background catalog and exit
    #[arg(long)]
    list_assets: bool,

    /// Download catalog backgrounds before rendering
    #[cfg(feature = "fetch")]
    #[arg(long)]
    preload: bool,
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("cardpress: {:#}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "soft-raster")]
fn run(args: Args) -> anyhow::Result<()> {
    use cardpress::raster::SoftRasterizer;
    use cardpress::{CardEditor, EditorConfig, ExportFormat, PointerEvent, CATALOG};
    use serde::Deserialize;

    if args.list_assets {
        for asset in CATALOG {
            println!("{}\t{:?}\t{}", asset.id, asset.alignment, asset.url);
        }
        return Ok(());
    }

    // One JSON command per line, in the order a user session would
    // produce them.
    #[derive(Deserialize)]
    #[serde(tag = "cmd", rename_all = "snake_case")]
    enum ScriptCommand {
        Pointer { event: PointerEvent },
        Draft { text: String },
        Commit,
        Background { reference: String },
        Export,
    }

    let config = EditorConfig {
        export_format: match args.jpeg {
            Some(quality) => ExportFormat::Jpeg { quality },
            None => ExportFormat::Png,
        },
        ..Default::default()
    };
    let asset_timeout = config.asset_timeout_ms;
    let mut editor = CardEditor::new(config)?;
    let mut raster = SoftRasterizer::new();

    #[cfg(feature = "fetch")]
    if args.preload {
        let loaded = cardpress::background::preload_catalog(raster.assets_mut(), asset_timeout)?;
        eprintln!("Preloaded {} background asset(s)", loaded);
    }
    #[cfg(not(feature = "fetch"))]
    let _ = asset_timeout;

    let reader: Box<dyn BufRead> = match &args.script {
        Some(path) => Box::new(io::BufReader::new(std::fs::File::open(path)?)),
        None => Box::new(io::BufReader::new(io::stdin())),
    };

    let mut exported = false;
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let cmd: ScriptCommand = match serde_json::from_str(&line) {
            Ok(c) => c,
            Err(e) => {
                // Malformed lines are skipped, not fatal
                log::warn!("Skipping malformed command {:?}: {}", line, e);
                continue;
            }
        };
        match cmd {
            ScriptCommand::Pointer { event } => editor.handle_pointer(event),
            ScriptCommand::Draft { text } => editor.set_draft(text),
            ScriptCommand::Commit => {
                editor.commit();
            }
            ScriptCommand::Background { reference } => {
                if !editor.select_background(&reference) {
                    log::warn!("Unknown background reference {:?}", reference);
                }
            }
            ScriptCommand::Export => {
                let artifact = editor.export_as_image(&mut raster)?;
                artifact.write_to(&args.out)?;
                eprintln!("Wrote {} ({} bytes)", args.out.display(), artifact.len());
                exported = true;
            }
        }
    }

    // A script without an explicit export still produces the card.
    if !exported {
        let artifact = editor.export_as_image(&mut raster)?;
        artifact.write_to(&args.out)?;
        eprintln!("Wrote {} ({} bytes)", args.out.display(), artifact.len());
    }

    Ok(())
}

#[cfg(not(feature = "soft-raster"))]
fn run(_args: Args) -> anyhow::Result<()> {
    anyhow::bail!("the cardpress binary requires the `soft-raster` feature")
}
