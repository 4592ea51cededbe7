use std::path::PathBuf;

use clap::Subcommand;

use super::{clear_engine, open_controller};

#[derive(Subcommand)]
pub enum DataAction {
    /// Write subjects, sessions and marks as JSON
    Export {
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Replace all study data with an exported file
    Import { file: PathBuf },
}

pub fn run(action: DataAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut controller = open_controller()?;

    match action {
        DataAction::Export { output } => {
            let json = controller.export_json()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    eprintln!("exported to {}", path.display());
                }
                None => println!("{json}"),
            }
        }
        DataAction::Import { file } => {
            let json = std::fs::read_to_string(&file)?;
            controller.import_json(&json)?;
            clear_engine(&controller)?;
            let state = controller.state();
            println!(
                "imported {} subjects, {} sessions",
                state.subjects.len(),
                state.sessions.len()
            );
        }
    }
    Ok(())
}
