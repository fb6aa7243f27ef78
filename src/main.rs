use erdsql::{DdlOptions, Dialect, SchemaEngine, parse_document};
use erdsql::sql::DialectOptions;
use std::env;
use std::fs;
use std::process;
use tracing_subscriber::EnvFilter;

fn usage(program: &str) -> ! {
    eprintln!("Usage: {} <schema.scst> [options]", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -o, --output <file>    Output file (default: stdout)");
    eprintln!("  -d, --dialect <name>   mysql, postgresql, oracle, sqlserver, sqlite (default: mysql)");
    eprintln!("  -t, --table <id>       Table to include; repeatable (default: all tables)");
    eprintln!("      --drop             Emit DROP TABLE before each CREATE TABLE");
    eprintln!("      --comments         Emit header and per-table comments");
    eprintln!("      --schema <name>    Qualify table names with a schema");
    process::exit(1);
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        usage(&args[0]);
    }

    let input_path = &args[1];
    let mut output_path: Option<String> = None;
    let mut options = DdlOptions::default();
    let mut table_ids: Vec<String> = Vec::new();

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "-o" | "--output" => {
                i += 1;
                if i < args.len() {
                    output_path = Some(args[i].clone());
                }
            }
            "-d" | "--dialect" => {
                i += 1;
                if i < args.len() {
                    options.dialect = Dialect::from_str(&args[i]).unwrap_or_else(|| {
                        eprintln!("Unknown dialect: {}", args[i]);
                        process::exit(1);
                    });
                }
            }
            "-t" | "--table" => {
                i += 1;
                if i < args.len() {
                    table_ids.push(args[i].clone());
                }
            }
            "--drop" => options.include_drop_statements = true,
            "--comments" => options.include_comments = true,
            "--schema" => {
                i += 1;
                if i < args.len() {
                    options
                        .dialect_options
                        .get_or_insert_with(DialectOptions::default)
                        .schema = Some(args[i].clone());
                    options.include_schema_prefix = true;
                }
            }
            "-h" | "--help" => usage(&args[0]),
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let input = match fs::read_to_string(input_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to read {}: {}", input_path, e);
            process::exit(1);
        }
    };

    let document = match parse_document(&input) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("{}: {}", input_path, e);
            process::exit(1);
        }
    };

    let mut engine = SchemaEngine::default();
    engine.load_document(document);

    if table_ids.is_empty() {
        table_ids = engine.tables().map(|t| t.id.clone()).collect();
    }

    let sql = engine.generate_ddl(&table_ids, options);

    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(&path, &sql) {
                eprintln!("Failed to write {}: {}", path, e);
                process::exit(1);
            }
        }
        None => print!("{}", sql),
    }
}
