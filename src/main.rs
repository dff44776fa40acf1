//! hamlize - HTML to Haml converter

use std::fs;
use std::io::{self, Read, Write};
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use log::{LevelFilter, Log, Metadata, Record};

use hamlize::dom::NodeSnapshot;
use hamlize::{Options, util};

#[derive(Parser)]
#[command(name = "hamlize")]
#[command(version, about = "Convert HTML and ERB templates to Haml", long_about = None)]
#[command(after_help = "EXAMPLES:
    hamlize page.html page.haml       Convert a file
    cat page.html | hamlize           Read stdin, write stdout
    hamlize -e view.html.erb          Render ERB markers as script lines
    hamlize --dump-tree page.html     Show the parsed tree as JSON")]
struct Cli {
    /// Input file, or - for stdin
    #[arg(value_name = "INPUT", default_value = "-")]
    input: String,

    /// Output file (defaults to stdout)
    #[arg(value_name = "OUTPUT")]
    output: Option<String>,

    /// Render loud/silent/block ERB markers as Haml script
    #[arg(short, long)]
    erb: bool,

    /// Parse the input as XHTML
    #[arg(short, long)]
    xhtml: bool,

    /// Use (name="value") attributes
    #[arg(long)]
    html_attributes: bool,

    /// Use {name: "value"} attributes
    #[arg(long)]
    ruby19_attributes: bool,

    /// Print the parsed tree as JSON instead of converting
    #[arg(long)]
    dump_tree: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

/// Writes log records to stderr.
struct StderrLogger {
    level: LevelFilter,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}: {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let logger = Box::new(StderrLogger { level });
    if log::set_boxed_logger(logger).is_ok() {
        log::set_max_level(level);
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let options = Options::new()
        .with_erb(cli.erb)
        .with_xhtml(cli.xhtml)
        .with_ruby19_style_attributes(cli.ruby19_attributes)
        .with_html_style_attributes(cli.html_attributes);

    let bytes = read_input(&cli.input).map_err(|e| format!("{}: {e}", cli.input))?;

    let output = if cli.dump_tree {
        let source = util::decode_input(&bytes).map_err(|e| e.to_string())?;
        let dom = hamlize::dom::parse(&source, &options).map_err(|e| e.to_string())?;
        let snapshot = NodeSnapshot::of(&dom, options.max_depth).map_err(|e| e.to_string())?;
        let mut json = serde_json::to_string_pretty(&snapshot).map_err(|e| e.to_string())?;
        json.push('\n');
        json
    } else {
        hamlize::convert_bytes(&bytes, &options).map_err(|e| e.to_string())?
    };

    write_output(cli.output.as_deref(), &output).map_err(|e| e.to_string())
}

fn read_input(path: &str) -> io::Result<Vec<u8>> {
    if path == "-" {
        let mut bytes = Vec::new();
        io::stdin().read_to_end(&mut bytes)?;
        Ok(bytes)
    } else {
        fs::read(path)
    }
}

fn write_output(path: Option<&str>, output: &str) -> io::Result<()> {
    match path {
        Some(path) if path != "-" => fs::write(path, output),
        _ => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(output.as_bytes())?;
            stdout.flush()
        }
    }
}
