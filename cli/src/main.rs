use anyhow::bail;
use clap::Parser;
use magcross::DEFAULT_MAX_DIST;
use std::path::PathBuf;
use workflow::config::WorkflowConfig;
use workflow::runner::Runner;

mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Find line crossings in aeromagnetic survey data")]
struct Args {
    /// Survey CSV with line, fidcount, easting, northing, gpsalt, magcom and maguncom columns
    #[arg(long)]
    input: Option<PathBuf>,
    /// Run on a generated survey grid instead of --input
    #[arg(long, default_value_t = false)]
    synthetic: bool,
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    #[arg(long, default_value_t = DEFAULT_MAX_DIST)]
    max_dist: f64,
    /// Group candidates by (first line, second line) as enumerated instead of by line pair
    #[arg(long, default_value_t = false)]
    directed: bool,
    /// Run the proximity query on the calling thread only
    #[arg(long, default_value_t = false)]
    sequential: bool,
    /// Write the crossing table to this CSV file
    #[arg(long)]
    output: Option<PathBuf>,
    /// Print the summary as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.input.is_none() && !args.synthetic {
        bail!("nothing to process: pass --input <csv> or --synthetic");
    }

    let workflow_config = if let Some(path) = &args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(args.max_dist, args.directed, args.sequential)
    };

    let runner = Runner::new(workflow_config);
    let data = runner.load_survey(args.input.as_deref())?;
    let crossings = runner.execute(&data)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&crossings.summary())?);
    } else {
        println!("{crossings}");
    }

    if let Some(path) = &args.output {
        runner.write_crossings(&crossings, path)?;
    }

    Ok(())
}
