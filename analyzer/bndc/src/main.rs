//! Bundle analyzer CLI.

use std::path::Path;

use bndc::commands::{analyze, diff, dump, explain, snapshot, Outcome};
use bndc::{init_tracing, parse_options, CliOptions};

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];

    match command.as_str() {
        "analyze" => {
            let options = options_with_inputs(&args, 1, "bndc analyze <dir> [--external] [--jobs=N]");
            finish(&analyze(Path::new(&options.inputs[0]), &options));
        }
        "diff" => {
            let options = options_with_inputs(
                &args,
                2,
                "bndc diff <newer> <older> [--ignore=..] [--exports=..] [--older-exports=..] [--all] [-o <file>]",
            );
            finish(&diff(
                Path::new(&options.inputs[0]),
                Path::new(&options.inputs[1]),
                &options,
            ));
        }
        "snapshot" => {
            let options = options_with_inputs(&args, 1, "bndc snapshot <dir> -o <file>");
            finish(&snapshot(Path::new(&options.inputs[0]), &options));
        }
        "dump" => {
            let options = options_with_inputs(&args, 1, "bndc dump <file.class>");
            finish(&dump(Path::new(&options.inputs[0])));
        }
        "explain" | "--explain" => {
            if args.len() < 3 {
                eprintln!("Usage: bndc explain <ERROR_CODE>");
                eprintln!("Example: bndc explain B1001");
                std::process::exit(1);
            }
            finish(&explain(&args[2]));
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" | "-V" => {
            println!("bndc {}", env!("CARGO_PKG_VERSION"));
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

/// Parse the arguments after the command, exiting on a malformed command
/// line or when fewer than `inputs` paths were given.
fn options_with_inputs(args: &[String], inputs: usize, usage: &str) -> CliOptions {
    let options = match parse_options(&args[2..]) {
        Ok(options) => options,
        Err(diagnostic) => {
            eprintln!("{diagnostic}");
            eprintln!();
            eprintln!("Usage: {usage}");
            std::process::exit(1);
        }
    };
    if options.inputs.len() != inputs {
        eprintln!("Usage: {usage}");
        std::process::exit(1);
    }
    init_tracing(options.verbose);
    options
}

fn finish(outcome: &Outcome) {
    print!("{}", outcome.stdout);
    for diagnostic in &outcome.diagnostics {
        eprintln!("{diagnostic}");
    }
    std::process::exit(outcome.exit_code());
}

fn print_usage() {
    println!("bndc - package dependency and API baseline analysis for compiled classes");
    println!();
    println!("Usage: bndc <command> [options]");
    println!();
    println!("Commands:");
    println!("  analyze <dir>            Print Export-Package uses, imports and cycles");
    println!("  diff <newer> <older>     Compare two class directories or snapshots");
    println!("  snapshot <dir> -o <file> Save the API and manifest tree of a directory");
    println!("  dump <file.class>        Show what the reader sees in one class file");
    println!("  explain <code>           Explain a diagnostic code (e.g., B1001)");
    println!("  help                     Show this help message");
    println!("  version                  Show version information");
    println!();
    println!("Options:");
    println!("  --jobs=N                 Reader threads (default: one per core)");
    println!("  --external               Keep edges to packages outside the input");
    println!("  --exports=a,b;version=1  Exported packages (default: all)");
    println!("  --older-exports=..       Exports of the older side of diff (default: --exports)");
    println!("  --bundle-version=V       Bundle-Version of the bundle (newer side of diff)");
    println!("  --older-bundle-version=V Bundle-Version of the older side of diff");
    println!("  --ignore=p*              Mark matching names as IGNORED in diffs");
    println!("  --all                    Show unchanged nodes in diff output");
    println!("  -o <file>                Output file for snapshot, or the serialized diff");
    println!("  --deny-warnings          Treat warnings as errors");
    println!("  --error-limit=N          Stop reporting after N errors (0 = no limit)");
    println!("  -v, --verbose            Debug logging to stderr (BND_LOG overrides)");
    println!();
    println!("Examples:");
    println!("  bndc analyze target/classes");
    println!("  bndc snapshot target/classes -o api-1.0.snap");
    println!("  bndc diff target/classes api-1.0.snap");
    println!("  bndc explain B1001");
}
