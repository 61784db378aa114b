use feedspeed::config::Config;
use feedspeed::physics::PowerConstants;
use feedspeed::script::{self, ScriptError};
use feedspeed::{LoadError, ReferenceTable, Session};
use std::io::Read;
use std::path::PathBuf;
use tracing::warn;

#[derive(Debug)]
enum Error {
    Io(std::io::Error),
    Load(LoadError),
    Script(ScriptError),
    Usage(String),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<LoadError> for Error {
    fn from(e: LoadError) -> Self {
        Error::Load(e)
    }
}

#[derive(Default)]
struct Args {
    config: Option<PathBuf>,
    table: Option<PathBuf>,
    power: Option<PathBuf>,
    script: Option<PathBuf>,
}

fn parse_args() -> Result<Args, Error> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .map(PathBuf::from)
                .ok_or_else(|| Error::Usage(format!("{} needs a path", flag)))
        };
        match arg.as_str() {
            "--config" => args.config = Some(value("--config")?),
            "--table" => args.table = Some(value("--table")?),
            "--power" => args.power = Some(value("--power")?),
            "-h" | "--help" => return Err(Error::Usage(String::new())),
            _ if args.script.is_none() && !arg.starts_with("--") => {
                args.script = Some(PathBuf::from(arg))
            }
            _ => return Err(Error::Usage(format!("unexpected argument: {}", arg))),
        }
    }
    Ok(args)
}

fn usage() {
    eprintln!("Usage: feedspeed [--config <file.json>] [--table <file.csv>] [--power <file.yaml>] [script]");
    eprintln!();
    eprintln!("Reads session commands from the script, or stdin. Example:");
    eprintln!("  material Plywood");
    eprintln!("  tool HSS");
    eprintln!("  operation \"End Milling\"");
    eprintln!("  doc 0.25");
    eprintln!("  dia 4 mm");
    eprintln!("  teeth 2");
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(Error::Usage(message)) => {
            if !message.is_empty() {
                eprintln!("{}", message);
            }
            usage();
            std::process::exit(2);
        }
        Err(e) => return Err(e),
    };

    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    // Load reference data
    let table_path = args.table.unwrap_or_else(|| config.reference_table.clone());
    let table = ReferenceTable::from_path(&table_path)?;

    let power_path = args.power.or_else(|| config.power_constants.clone());
    let power_constants = match power_path {
        Some(path) if path.exists() => Some(PowerConstants::from_path(&path)?),
        Some(path) => {
            warn!(path = %path.display(), "power constants not found, power estimates unavailable");
            None
        }
        None => None,
    };

    // Read and parse the whole script before touching the session
    let (name, source) = match &args.script {
        Some(path) => (path.display().to_string(), std::fs::read_to_string(path)?),
        None => {
            let mut source = String::new();
            std::io::stdin().read_to_string(&mut source)?;
            ("<stdin>".to_string(), source)
        }
    };
    let statements = match script::parse(&source) {
        Ok(statements) => statements,
        Err(e) => {
            eprint!("{}", e.render(&name, &source));
            return Err(Error::Script(e));
        }
    };

    let mut session = Session::with_config(&table, &config);
    if let Some(constants) = &power_constants {
        session = session.with_power_constants(constants);
    }

    for line in script::run(&mut session, &statements) {
        println!("{}", line);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plywood_script() {
        let table =
            ReferenceTable::from_reader(include_str!("../data/feed_speed_reference.csv").as_bytes())
                .expect("shipped table loads");
        let constants = PowerConstants::from_yaml(include_str!("../data/power_constants.yaml"))
            .expect("shipped constants load");

        let source = r#"
material Plywood
tool HSS
operation "End Milling"
doc 0.25
teeth 2
dia 4 mm
power
"#;
        let statements = script::parse(source).expect("parse failed");
        let mut session = Session::with_config(&table, &Config::default())
            .with_power_constants(&constants);
        let out = script::run(&mut session, &statements);

        assert_eq!(out.len(), 7);
        assert!(out[5].starts_with("feed="), "got {}", out[5]);
        assert!(out[6].starts_with("power:"), "got {}", out[6]);
        assert!(session.operation().rpm.is_some());
        assert!(session.operation().motor_power.is_some());
    }
}
