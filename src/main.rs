#[macro_use]
extern crate clap;

use {
    anyhow::{bail, Context, Result},
    clap::ArgMatches,
    log::{error, info},
    simplelog::{Config as LogConfig, LevelFilter, TermLogger, TerminalMode},
    std::{fs::File, io, path::PathBuf},
    wrf2iff::{
        iff::{reader, RecordReader},
        parameters::{Endianness, Parameters},
    },
};

#[quit::main]
fn main() {
    let matches = clap_app!(wrf2iff =>
        (version: crate_version!())
        (about: "Converts WRF model output into Intermediate Format Files, one per time step.")
        (@arg PARAMETERS: -p --parameters +takes_value "Path to file containing conversion parameters.")
        (@arg QUIET: -q --quiet "Only log progress, warnings and errors.")
        (@subcommand convert =>
            (about: "Converts a WRF output file.")
            (@arg SOURCE: +required "WRF output file.")
            (@arg OUTPUT_DIR: "Directory receiving the IFF files, overrides the parameters file.")
        )
        (@subcommand dump =>
            (about: "Prints the header, projection and first value of every record of an IFF file.")
            (@arg FILE: +required "IFF file.")
            (@arg VARIABLE: --variable +takes_value "Only print records of this field.")
            (@arg BYTE_ORDER: --("byte-order") +takes_value "Byte order of the file, big (default) or little.")
        )
        (@subcommand copy =>
            (about: "Re-encodes every record of an IFF file, optionally converting its byte order.")
            (@arg INPUT: +required "IFF file to read.")
            (@arg OUTPUT: +required "IFF file to write.")
            (@arg FROM: --from +takes_value "Byte order of the input, big (default) or little.")
            (@arg TO: --to +takes_value "Byte order of the output, big (default) or little.")
        )
    )
    .get_matches();

    let level = if matches.is_present("QUIET") {
        LevelFilter::Info
    } else {
        LevelFilter::Debug
    };
    if let Err(e) = TermLogger::init(level, LogConfig::default(), TerminalMode::Mixed) {
        eprintln!("Failed to initialize logger: {}", e);
        quit::with_code(1);
    }

    run_subcommand(&matches).unwrap_or_else(|e| {
        error!("Error: \"{:#}\"", e);
        quit::with_code(1);
    });
}

fn load_parameters(path: Option<&str>) -> Result<Parameters> {
    let path = match path {
        Some(path) => path,
        None => {
            info!("No parameters file supplied, using defaults");
            return Ok(Parameters::default());
        }
    };

    let file = File::open(path).with_context(|| format!("Failed to open {}", path))?;
    let params = serde_yaml::from_reader::<_, Parameters>(file)
        .with_context(|| format!("Failed to parse parameters from {}", path))?;

    info!(
        "Successfully loaded conversion parameters from \"{}\": \n{:#?}",
        path, params
    );

    Ok(params)
}

fn byte_order(matches: &ArgMatches, name: &str) -> Result<Endianness> {
    match matches.value_of(name) {
        Some(order) => order.parse().map_err(anyhow::Error::msg),
        None => Ok(Endianness::Big),
    }
}

fn run_subcommand(matches: &ArgMatches) -> Result<()> {
    let (subcmd, sub) = match matches.subcommand() {
        (name, Some(sub)) => (name, sub),
        _ => bail!("No subcommand selected"),
    };

    info!("Starting {}", subcmd);

    match subcmd {
        "convert" => {
            let mut params = load_parameters(matches.value_of("PARAMETERS"))?;
            if let Some(dir) = sub.value_of("OUTPUT_DIR") {
                params.environment.output_directory = PathBuf::from(dir);
            }

            let source = sub.value_of("SOURCE").context("Source file not supplied")?;
            let paths = convert(source, &params)?;
            info!("Wrote {} files", paths.len());
        }
        "dump" => {
            let file = sub.value_of("FILE").context("IFF file not supplied")?;
            let records = RecordReader::open(file, byte_order(sub, "BYTE_ORDER")?)?;

            let stdout = io::stdout();
            let n = reader::dump(records, &mut stdout.lock(), sub.value_of("VARIABLE"))
                .with_context(|| format!("Failed to dump {}", file))?;
            info!("Described {} records", n);
        }
        "copy" => {
            let input = sub.value_of("INPUT").context("Input file not supplied")?;
            let output = sub.value_of("OUTPUT").context("Output file not supplied")?;

            reader::copy(
                input,
                output,
                byte_order(sub, "FROM")?,
                byte_order(sub, "TO")?,
            )
            .with_context(|| format!("Failed to copy {} to {}", input, output))?;
        }
        _ => {
            // Should be unreachable due to clap catching this error
            bail!("Unrecognized subcommand");
        }
    }

    info!("Finished {}", subcmd);

    Ok(())
}

#[cfg(feature = "netcdf")]
fn convert(source: &str, params: &Parameters) -> Result<Vec<PathBuf>> {
    let grid = wrf2iff::grid::ncfile::NetcdfGrid::open(source)?;
    info!("Opened {}", source);

    wrf2iff::pipeline::convert(&grid, params)
        .with_context(|| format!("Failed to convert {}", source))
}

#[cfg(not(feature = "netcdf"))]
fn convert(source: &str, _params: &Parameters) -> Result<Vec<PathBuf>> {
    bail!(
        "Cannot read {}: built without the \"netcdf\" feature",
        source
    )
}
