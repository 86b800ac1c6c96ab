//! Cub parser CLI.
//!
//! Parses Cub sources (or type annotations) and prints the canonical tree
//! dump. Exit code 1 signals a syntax error or a usage mistake.

use cub_peg::ParseOptions;

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    match args[1].as_str() {
        "parse" => {
            if args.len() < 3 {
                eprintln!("Usage: cub parse <file.cub> [--urn <name>]");
                std::process::exit(1);
            }
            let path = &args[2];
            let mut urn = path.as_str();
            let mut i = 3;
            while i < args.len() {
                if args[i] == "--urn" && i + 1 < args.len() {
                    urn = &args[i + 1];
                    i += 2;
                } else {
                    eprintln!("error: unknown option `{}`", args[i]);
                    std::process::exit(1);
                }
            }
            parse_file(path, urn);
        }
        "type" => {
            if args.len() < 3 {
                eprintln!("Usage: cub type <annotation>");
                std::process::exit(1);
            }
            parse_annotation(&args[2]);
        }
        "help" | "--help" | "-h" => print_usage(),
        command => {
            eprintln!("error: unknown command `{command}`");
            print_usage();
            std::process::exit(1);
        }
    }
}

fn parse_file(path: &str, urn: &str) {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("error: cannot read `{path}`: {e}");
            std::process::exit(1);
        }
    };
    let parser = match cub_grammar::parser() {
        Ok(parser) => parser,
        Err(e) => {
            eprintln!("error: broken grammar table: {e}");
            std::process::exit(1);
        }
    };
    let options = ParseOptions {
        urn: Some(urn),
        ..ParseOptions::default()
    };
    let tree = parser.parse_with(&source, &options);
    if tree.is_syntax_error() {
        eprintln!("{}", tree.message("Syntax Error"));
        std::process::exit(1);
    }
    println!("{tree}");
}

fn parse_annotation(annotation: &str) {
    let parser = match cub_grammar::type_parser() {
        Ok(parser) => parser,
        Err(e) => {
            eprintln!("error: broken grammar table: {e}");
            std::process::exit(1);
        }
    };
    let tree = parser.parse(annotation);
    if tree.is_syntax_error() {
        eprintln!("{}", tree.message("Syntax Error"));
        std::process::exit(1);
    }
    println!("{tree}");
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_env("CUB_LOG").unwrap_or_else(|_| EnvFilter::new("off"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_usage() {
    println!("Usage: cub <command> [arguments]");
    println!();
    println!("Commands:");
    println!("  parse <file.cub> [--urn <name>]   Parse a source file and dump its tree");
    println!("  type <annotation>                 Parse a type annotation and dump its tree");
    println!("  help                              Show this message");
    println!();
    println!("Set CUB_LOG (e.g. CUB_LOG=trace) to see engine traces on stderr.");
}
