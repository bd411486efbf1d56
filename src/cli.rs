//! Minimal CLI: scan → generate constructor files
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser};

use crate::{run, Options, PackageGroup};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// scan Go packages for //genconstructor markers and emit one constructor
/// file per package
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(flatten)]
    input_settings: InputSettings,

    /// name of the generated file placed in each package directory
    #[arg(long, default_value = "constructor_gen.go")]
    out_name: String,

    /// generator name embedded in the DO NOT EDIT header
    #[arg(long, default_value = "go-genconstructor")]
    generator_name: String,

    /// print assembled files to stdout instead of writing them
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// root directory to scan for Go packages
    #[arg(long, short, default_value = ".")]
    dir: PathBuf,

    /// only scan files whose name matches this glob (e.g. 'model_*.go')
    #[arg(long)]
    include: Option<String>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> anyhow::Result<()> {
        let mut options = Options::new().with_generator_name(&self.generator_name);
        if let Some(raw) = &self.input_settings.include {
            let pattern = glob::Pattern::new(raw)
                .with_context(|| format!("invalid --include pattern `{raw}`"))?;
            options = options.with_file_filter(move |name| pattern.matches(name));
        }

        let out_name = self.out_name.clone();
        let dry_run = self.dry_run;
        let new_writer = move |group: &PackageGroup| -> std::io::Result<Box<dyn Write>> {
            let out_path = group.dir.join(&out_name);
            if dry_run {
                println!("// ---- {} ({})", group.name, out_path.display());
                Ok(Box::new(std::io::stdout()))
            } else {
                eprintln!("writing {}", out_path.display());
                Ok(Box::new(File::create(out_path)?))
            }
        };

        run(&self.input_settings.dir, new_writer, &options).with_context(|| {
            format!(
                "constructor generation failed under {}",
                self.input_settings.dir.display()
            )
        })
    }
}
