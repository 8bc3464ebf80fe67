//! Silvera compiler CLI.

use silvac::commands::{explain_error, run_check};
use silvac::parse_check_args;
use silvac::tracing_setup::init_tracing;
use silvera_resolve::RestStrategyKind;

fn main() {
    init_tracing();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];
    match command.as_str() {
        "check" => {
            let parsed = match parse_check_args(&args[2..]) {
                Ok(parsed) => parsed,
                Err(e) => {
                    eprintln!("error: {e}");
                    eprintln!("Usage: silvera check <project-dir> [--strategy=<name>] [--first-port=<n>]");
                    std::process::exit(1);
                }
            };
            std::process::exit(run_check(&parsed));
        }
        "--explain" | "explain" => {
            if args.len() < 3 {
                eprintln!("Usage: silvera explain <ERROR_CODE>");
                eprintln!("Example: silvera explain E3002");
                std::process::exit(1);
            }
            std::process::exit(explain_error(&args[2]));
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" | "-V" => {
            println!("Silvera {}", env!("CARGO_PKG_VERSION"));
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("Silvera architecture compiler");
    println!();
    println!("Usage: silvera <command> [options]");
    println!();
    println!("Commands:");
    println!("  check <project-dir>  Load and resolve a project");
    println!("  explain <code>       Explain an error code (e.g., E3002)");
    println!("  help                 Show this help message");
    println!("  version              Show version information");
    println!();
    println!("Check options:");
    println!("  --strategy=<name>    REST verb strategy (default: default)");
    println!("  --first-port=<n>     First port handed to deployments (default: 8080)");
    println!();
    println!("Strategies:");
    for kind in RestStrategyKind::ALL {
        println!("  {kind}");
    }
    println!();
    println!("Environment:");
    println!("  RUST_LOG=silvera_resolve=debug   Trace resolution passes");
    println!("  SILVERA_LOG_TREE=1               Render traces as a span tree");
}
