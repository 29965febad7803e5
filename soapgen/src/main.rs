use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use structopt::StructOpt;
use thiserror::Error;

use soapgen_codegen::{self as codegen, render, ClassDefinition, GeneratorOptions};
use soapgen_wsdl as wsdl;

#[derive(Debug, Error)]
enum Error {
    #[error("Error parsing WSDL")]
    ParseError(#[from] wsdl::error::Error),

    #[error("Error generating classes")]
    CodegenError(#[from] codegen::Error),

    #[error("Error reading configuration")]
    ConfigError(#[from] serde_yaml::Error),

    #[error("Error writing intermediate representation")]
    JsonError(#[from] serde_json::Error),

    #[error("Error configuring the log")]
    LogError(#[from] log::SetLoggerError),

    #[error("Unknown output format {0}, expected php or ir")]
    UnknownFormat(String),

    #[error("Error")]
    IoError(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Emit {
    Php,
    Ir,
}

impl std::str::FromStr for Emit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "php" => Ok(Emit::Php),
            "ir" => Ok(Emit::Ir),
            other => Err(Error::UnknownFormat(other.to_owned())),
        }
    }
}

/// Generates client classes from a WSDL or XSD document.
#[derive(StructOpt)]
struct Args {
    /// Log every generated class.
    #[structopt(long)]
    verbose: bool,

    /// YAML file holding generator options, overridden by the flags below.
    #[structopt(long, parse(from_os_str))]
    config: Option<PathBuf>,

    /// Do not inject validation guards into setters.
    #[structopt(long)]
    no_validation: bool,

    #[structopt(long)]
    prefix: Option<String>,

    #[structopt(long)]
    suffix: Option<String>,

    #[structopt(long)]
    namespace: Option<String>,

    /// `php` writes one file per class, `ir` a single JSON document.
    #[structopt(long, default_value = "php")]
    emit: Emit,

    #[structopt(short, long, default_value = "./generated", parse(from_os_str))]
    output: PathBuf,

    input: String,
}

impl Args {
    fn options(&self) -> Result<GeneratorOptions, Error> {
        let mut options = match &self.config {
            Some(path) => serde_yaml::from_reader(File::open(path)?)?,
            None => GeneratorOptions::default(),
        };

        if self.no_validation {
            options.validation = false;
        }
        if let Some(prefix) = &self.prefix {
            options.prefix = prefix.clone();
        }
        if let Some(suffix) = &self.suffix {
            options.suffix = suffix.clone();
        }
        if let Some(namespace) = &self.namespace {
            options.namespace = Some(namespace.clone());
        }

        Ok(options)
    }
}

fn setup_log(verbose: bool) -> Result<(), Error> {
    let colors = fern::colors::ColoredLevelConfig::new()
        .error(fern::colors::Color::Red)
        .warn(fern::colors::Color::Yellow)
        .trace(fern::colors::Color::BrightBlack);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "\x1B[{}m{}: {}\x1B[0m",
                colors.get_color(&record.level()).to_fg_str(),
                record.level(),
                message
            ))
        })
        .level(if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .chain(io::stderr())
        .apply()?;

    Ok(())
}

fn write_php(classes: &[ClassDefinition], output: &Path) -> Result<(), Error> {
    fs::create_dir_all(output)?;

    for class in classes {
        let path = output.join(render::file_name(class));
        let mut file = File::create(&path)?;
        write!(&mut file, "{}", render::render(class))?;
        log::debug!("wrote {}", path.display());
    }

    Ok(())
}

fn write_ir(classes: &[ClassDefinition], output: &Path) -> Result<(), Error> {
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }

    let file = File::create(output)?;
    serde_json::to_writer_pretty(file, classes)?;
    log::debug!("wrote {}", output.display());
    Ok(())
}

#[paw::main]
fn main(args: Args) -> Result<(), Error> {
    setup_log(args.verbose)?;

    let options = args.options()?;
    let classes = codegen::from_url(&args.input, &options)?;

    match args.emit {
        Emit::Php => write_php(&classes, &args.output)?,
        Emit::Ir => write_ir(&classes, &args.output)?,
    }

    log::info!("{} classes generated from {}", classes.len(), args.input);
    Ok(())
}
