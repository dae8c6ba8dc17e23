mod app;
mod ontology;
mod util;

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Dataset JSON with the starting ontology and extracted Q&A units.
    /// Defaults to the embedded maintenance-knowledge sample.
    #[arg(long)]
    data: Option<PathBuf>,
}

fn main() -> eframe::Result<()> {
    let args = Args::parse();
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "ontograph",
        options,
        Box::new(move |cc| Ok(Box::new(app::OntographApp::new(cc, args.data.clone())))),
    )
}
