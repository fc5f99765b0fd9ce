use crate::cli::InitArgs;
use crate::error::{CliError, Result};
use std::fs;

/// Template written by `qcbatch init`. The `{}` placeholder is replaced
/// with the staged input filename when each command runs.
const SAMPLE_CONFIG: &str = r#"# qcbatch configuration.
#
# Commands run in order inside each structure's working directory. `{}` is
# replaced with the staged input filename; commands without a placeholder
# run verbatim, which lets later steps consume earlier steps' artifacts.

[calculation]
commands = [
    "xtb {} --opt normal --gbsa benzene",
    "xtb xtbopt.xyz --vipea --gbsa benzene",
]

# File the first step must produce before later steps run. Only checked
# when more than one command is configured.
expected-output = "xtbopt.xyz"

# Worker processes for the batch. Defaults to the machine's CPU count,
# capped at 30.
# max-workers = 8

[generation]
force-field = "MMFF94"
optimization-steps = 1000
"#;

pub fn run(args: InitArgs) -> Result<()> {
    if args.output.exists() && !args.force {
        return Err(CliError::Argument(format!(
            "'{}' already exists (use --force to overwrite)",
            args.output.display()
        )));
    }

    fs::write(&args.output, SAMPLE_CONFIG)?;
    println!("Sample configuration written to {}", args.output.display());

    Ok(())
}
