//! Spel CLI
//!
//! Evaluate, render and assign chained expressions from the command line.

use spelc::commands::{self, Output, Report};

fn print_usage() {
    println!("Usage: spel [-v|--verbose] [--profile] <command> [args]");
    println!();
    println!("Commands:");
    println!("  eval <expr> [--root <json>]          Evaluate and print the value and its type");
    println!("  render <expr>                        Print the structural rendering");
    println!("  set <expr> <value> --root <json>     Assign and print the updated root");
    println!();
    println!("Options:");
    println!("  -v, --verbose    Print an evaluation trace to stderr");
    println!("  --profile        Print evaluation counters to stderr");
}

fn usage_error(usage: &str) -> ! {
    eprintln!("Usage: spel {usage}");
    std::process::exit(1);
}

fn main() {
    let mut verbose = false;
    let mut profile = false;
    let mut root: Option<String> = None;
    let mut positional: Vec<String> = Vec::new();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-v" | "--verbose" => verbose = true,
            "--profile" => profile = true,
            "-h" | "--help" => {
                print_usage();
                return;
            }
            "--root" => match args.next() {
                Some(json) => root = Some(json),
                None => usage_error("... --root <json>"),
            },
            _ => {
                if let Some(json) = arg.strip_prefix("--root=") {
                    root = Some(json.to_string());
                } else {
                    positional.push(arg);
                }
            }
        }
    }

    spelc::init_tracing(verbose);

    let Some((command, rest)) = positional.split_first() else {
        print_usage();
        return;
    };

    let result = match (command.as_str(), rest) {
        ("eval", [expr]) => commands::eval(expr, root.as_deref()),
        ("eval", _) => usage_error("eval <expr> [--root <json>]"),
        ("render", [expr]) => commands::render(expr),
        ("render", _) => usage_error("render <expr>"),
        ("set", [expr, value]) => match root.as_deref() {
            Some(root) => commands::set(expr, value, root),
            None => usage_error("set <expr> <value> --root <json>"),
        },
        ("set", _) => usage_error("set <expr> <value> --root <json>"),
        (other, _) => {
            eprintln!("error: unknown command '{other}'");
            print_usage();
            std::process::exit(1);
        }
    };

    finish(result, profile);
}

fn finish(result: Result<Output, Report>, profile: bool) {
    match result {
        Ok(output) => {
            println!("{}", output.text);
            if let (true, Some(counters)) = (profile, output.counters) {
                eprintln!("nodes evaluated:   {}", counters.nodes_evaluated);
                eprintln!("context pushes:    {}", counters.context_pushes);
                eprintln!("context pops:      {}", counters.context_pops);
                eprintln!("max context depth: {}", counters.max_context_depth);
            }
        }
        Err(report) => {
            eprintln!("{report}");
            std::process::exit(1);
        }
    }
}
