use std::path::PathBuf;

use clap::{command, Args, Parser, Subcommand};
use ddf_world::{
    config::Config, datapoints::UnmappedGeoPolicy, ddf::DdfWriter, entities::JoinGaps, DdfWorld,
};
use enum_dispatch::enum_dispatch;
use log::{debug, info};
use polars::frame::DataFrame;
use spinners::{Spinner, Spinners};

use crate::display::{display_gaps, display_summary, Written};
use crate::error::DdfCliResult;

const DEFAULT_PROGRESS_SPINNER: Spinners = Spinners::Dots;
const COMPLETE_PROGRESS_STRING: &str = "✔";
const RUNNING_TAIL_STRING: &str = "...";
const LOADING_SOURCES_STRING: &str = "Loading sources";
const CODE_MAP_FILE: &str = "country_code_map.csv";

fn start_spinner(quiet: bool, message: &str) -> Option<Spinner> {
    (!quiet).then(|| {
        Spinner::with_timer(
            DEFAULT_PROGRESS_SPINNER,
            message.to_string() + RUNNING_TAIL_STRING,
        )
    })
}

fn stop_spinner(spinner: Option<Spinner>) {
    if let Some(mut s) = spinner {
        s.stop_with_symbol(COMPLETE_PROGRESS_STRING);
    }
}

fn load(config: Config, quiet: bool) -> DdfCliResult<(DdfWorld, DdfWriter)> {
    let sp = start_spinner(quiet, LOADING_SOURCES_STRING);
    let writer = DdfWriter::new(&config.output_dir)?;
    let ddf = DdfWorld::new_with_config(config)?;
    stop_spinner(sp);
    Ok((ddf, writer))
}

fn written(path: PathBuf, df: &DataFrame) -> Written {
    Written {
        path,
        shape: df.shape(),
    }
}

fn write_concepts(ddf: &DdfWorld, writer: &DdfWriter) -> DdfCliResult<Vec<Written>> {
    let mut concepts = ddf.concepts()?;
    let path = writer.write_concepts(&mut concepts)?;
    Ok(vec![written(path, &concepts)])
}

fn write_entities(
    ddf: &DdfWorld,
    writer: &DdfWriter,
    code_map: bool,
) -> DdfCliResult<(Vec<Written>, JoinGaps)> {
    let mut files = vec![];
    for (level, mut df) in ddf.entities_groups()? {
        let path = writer.write_entities(&level, &mut df)?;
        files.push(written(path, &df));
    }
    let mut countries = ddf.entities_country()?;
    let path = writer.write_entities(ddf_world::COL::COUNTRY, &mut countries.table)?;
    files.push(written(path, &countries.table));
    if code_map {
        let mut df = ddf.country_code_map()?.to_df()?;
        let path = writer.write_table(CODE_MAP_FILE, &mut df)?;
        files.push(written(path, &df));
    }
    Ok((files, countries.gaps))
}

fn write_datapoints(ddf: &DdfWorld, writer: &DdfWriter) -> DdfCliResult<Vec<Written>> {
    let index = ddf.concept_index()?;
    let geo = ddf.geo_mapping()?;
    let mut files = vec![];
    for item in ddf.datapoints(&index, &geo) {
        let (concept, mut df) = item?;
        let path = writer.write_datapoints(&concept, &mut df)?;
        files.push(written(path, &df));
    }
    Ok(files)
}

/// Trait that defines what to run when a given subcommand is invoked.
#[enum_dispatch]
pub trait RunCommand {
    fn run(&self, config: Config) -> DdfCliResult<()>;
}

/// The `concepts` command writes the concept catalogue.
#[derive(Args, Debug)]
pub struct ConceptsCommand {
    #[arg(from_global)]
    quiet: bool,
}

impl RunCommand for ConceptsCommand {
    fn run(&self, config: Config) -> DdfCliResult<()> {
        info!("Running `concepts` subcommand");
        let (ddf, writer) = load(config, self.quiet)?;
        let sp = start_spinner(self.quiet, "Writing concepts");
        let files = write_concepts(&ddf, &writer)?;
        stop_spinner(sp);
        display_summary(&files);
        Ok(())
    }
}

/// The `entities` command writes one entity set per grouping level and the country entity set.
#[derive(Args, Debug)]
pub struct EntitiesCommand {
    #[arg(
        long = "code-map",
        default_value_t = false,
        help = "Also write the ISO3 to country code mapping"
    )]
    code_map: bool,
    #[arg(from_global)]
    quiet: bool,
}

impl RunCommand for EntitiesCommand {
    fn run(&self, config: Config) -> DdfCliResult<()> {
        info!("Running `entities` subcommand");
        let (ddf, writer) = load(config, self.quiet)?;
        let sp = start_spinner(self.quiet, "Writing entities");
        let (files, gaps) = write_entities(&ddf, &writer, self.code_map)?;
        stop_spinner(sp);
        display_summary(&files);
        display_gaps(&gaps);
        Ok(())
    }
}

/// The `datapoints` command writes one datapoint table per indicator file with a concept.
#[derive(Args, Debug)]
pub struct DatapointsCommand {
    #[arg(
        long = "unmapped-geo",
        value_name = "drop|keep|fail",
        help = "What to do with rows whose geography has no country code"
    )]
    unmapped_geo: Option<UnmappedGeoPolicy>,
    #[arg(from_global)]
    quiet: bool,
}

impl RunCommand for DatapointsCommand {
    fn run(&self, mut config: Config) -> DdfCliResult<()> {
        info!("Running `datapoints` subcommand");
        if let Some(policy) = self.unmapped_geo {
            config.unmapped_geo = policy;
        }
        let (ddf, writer) = load(config, self.quiet)?;
        let sp = start_spinner(self.quiet, "Writing datapoints");
        let files = write_datapoints(&ddf, &writer)?;
        stop_spinner(sp);
        display_summary(&files);
        Ok(())
    }
}

/// The `all` command writes the complete dataset.
#[derive(Args, Debug)]
pub struct AllCommand {
    #[arg(from_global)]
    quiet: bool,
}

impl RunCommand for AllCommand {
    fn run(&self, config: Config) -> DdfCliResult<()> {
        info!("Running `all` subcommand");
        let (ddf, writer) = load(config, self.quiet)?;
        let sp = start_spinner(self.quiet, "Writing dataset");
        let mut files = write_concepts(&ddf, &writer)?;
        let (entities, gaps) = write_entities(&ddf, &writer, false)?;
        files.extend(entities);
        files.extend(write_datapoints(&ddf, &writer)?);
        stop_spinner(sp);
        debug!("{files:#?}");
        display_summary(&files);
        display_gaps(&gaps);
        Ok(())
    }
}

/// The entrypoint for the CLI.
#[derive(Parser, Debug)]
#[command(version, about = "Build the world indicators DDF dataset", long_about = None, name = "ddf-world")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
    #[arg(long, global = true, help = "Config file to use instead of the default location")]
    pub config: Option<PathBuf>,
    #[arg(short = 's', long, global = true, help = "Directory to read the sources from")]
    pub source_dir: Option<PathBuf>,
    #[arg(short = 'o', long, global = true, help = "Directory to write the DDF files to")]
    pub output_dir: Option<PathBuf>,
    #[arg(
        short = 'q',
        long = "quiet",
        help = "\
            Do not print progress spinner to stdout. Summaries and logs (when `RUST_LOG`\n\
            is set) will still be printed.",
        global = true
    )]
    quiet: bool,
}

impl Cli {
    /// Apply the directory arguments on top of the loaded config.
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(source_dir) = &self.source_dir {
            config.source_dir = source_dir.clone();
        }
        if let Some(output_dir) = &self.output_dir {
            config.output_dir = output_dir.clone();
        }
        config
    }
}

/// Commands contains the list of subcommands available for use in the CLI.
#[derive(Subcommand, Debug)]
#[enum_dispatch(RunCommand)]
pub enum Commands {
    /// Write the concept catalogue
    Concepts(ConceptsCommand),
    /// Write the group and country entity sets
    Entities(EntitiesCommand),
    /// Write the datapoint tables
    Datapoints(DatapointsCommand),
    /// Write the complete dataset
    All(AllCommand),
}
