use clap::{Args, Parser, Subcommand, ValueEnum};
use qcbatch::core::generation::obabel::ForceField;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "qcbatch CLI - A command-line interface for qcbatch, a parallel batch driver for quantum-chemistry calculations carried out by external programs such as xtb.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Override the maximum number of work units executed in parallel.
    /// Defaults to the number of logical cores, capped at 30.
    #[arg(short = 'j', long = "workers", global = true, value_name = "NUM")]
    pub workers: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the configured calculation chain for a batch of structures.
    Run(RunArgs),
    /// Generate 3-D structures from a SMILES file using OpenBabel.
    Generate(GenerateArgs),
    /// Collect optimized structures from a finished batch into one directory.
    Collect(CollectArgs),
    /// Write a commented sample configuration file.
    Init(InitArgs),
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to a directory of .xyz structures, or to a single .xyz file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Directory that will hold one working directory per structure.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Path to the configuration file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Override the artifact the optimization step must produce before
    /// dependent steps run.
    #[arg(long, value_name = "NAME")]
    pub expected_output: Option<String>,
}

/// Arguments for the `generate` subcommand.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Path to the input .smi file, one SMILES string per line.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Tag appended to the generated batch directory name.
    #[arg(short, long, required = true, value_name = "TAG")]
    pub tag: String,

    /// Directory under which the timestamped batch directory is created.
    #[arg(short, long, value_name = "PATH", default_value = ".")]
    pub output_root: PathBuf,

    /// Optional configuration file providing [generation] defaults.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Force field for the post-embedding minimization.
    #[arg(long, value_name = "NAME")]
    pub force_field: Option<ForceFieldArg>,

    /// Number of force-field minimization steps.
    #[arg(long, value_name = "INT")]
    pub optimization_steps: Option<u32>,

    /// Skip the force-field minimization entirely.
    #[arg(long)]
    pub no_optimize: bool,
}

/// Arguments for the `collect` subcommand.
#[derive(Args, Debug)]
pub struct CollectArgs {
    /// Batch output directory produced by `qcbatch run`.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub batch_dir: PathBuf,

    /// Directory receiving the merged structures and the index.csv dataset.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub export_dir: PathBuf,

    /// Name of the optimized structure file inside each unit directory.
    #[arg(long, value_name = "NAME", default_value = "xtbopt.xyz")]
    pub optimized_output: String,
}

/// Arguments for the `init` subcommand.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Where to write the sample configuration.
    #[arg(short, long, value_name = "PATH", default_value = "qcbatch.toml")]
    pub output: PathBuf,

    /// Overwrite the file if it already exists.
    #[arg(long)]
    pub force: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForceFieldArg {
    #[value(name = "MMFF94")]
    Mmff94,
    #[value(name = "UFF")]
    Uff,
    #[value(name = "GAFF")]
    Gaff,
}

impl From<ForceFieldArg> for ForceField {
    fn from(arg: ForceFieldArg) -> Self {
        match arg {
            ForceFieldArg::Mmff94 => ForceField::Mmff94,
            ForceFieldArg::Uff => ForceField::Uff,
            ForceFieldArg::Gaff => ForceField::Gaff,
        }
    }
}
